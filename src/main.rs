//! Stepwise CLI: answer one question against an instruction corpus.
//!
//! ```text
//! stepwise <corpus.json> <question...>
//! ```
//!
//! With `STEPWISE_INDEX_PATH` set, a saved index is reused when it holds exactly the
//! corpus file's records, and rebuilt and saved otherwise.

use std::path::PathBuf;

use anyhow::{Context, bail};
use mimalloc::MiMalloc;

use stepwise::{Assistant, Config, QueryOptions, parse_corpus};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let Some(corpus_path) = args.next().map(PathBuf::from) else {
        bail!("usage: stepwise <corpus.json> <question...>");
    };
    let query = args.collect::<Vec<_>>().join(" ");
    if query.trim().is_empty() {
        bail!("usage: stepwise <corpus.json> <question...>");
    }

    let config = Config::from_env()?;
    tracing::info!(
        vector_search = config.vector_search,
        index_path = ?config.index_path,
        "Stepwise starting"
    );

    let mut assistant = Assistant::from_config(&config)?;

    let raw = std::fs::read_to_string(&corpus_path)
        .with_context(|| format!("failed to read {}", corpus_path.display()))?;
    let corpus = parse_corpus(&raw)
        .with_context(|| format!("invalid corpus in {}", corpus_path.display()))?;

    match config.index_path.as_ref().filter(|_| config.vector_search) {
        Some(prefix) => {
            let source = assistant
                .load_or_restore(corpus, prefix)
                .with_context(|| format!("failed to prepare index at {}", prefix.display()))?;
            tracing::info!(?source, prefix = %prefix.display(), "Vector index ready");
        }
        None => assistant.load(corpus)?,
    }

    let response = assistant
        .answer_question(&query, &QueryOptions::default())
        .await;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
