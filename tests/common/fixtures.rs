//! Shared corpus and mock backends for integration tests.

use std::sync::Arc;

use stepwise::{
    Assistant, EmbeddingIndex, HybridRanker, InstructionRecord, MockEmbedder, MockTextGenerator,
    RankerConfig, RelevanceJudge, ResponseComposer, parse_corpus,
};

pub const PAY_QUERY: &str = "how do I pay for my order";

pub const CART_INSTRUCTION: &str = "Open a product page and press Add to cart.";
pub const CHECKOUT_INSTRUCTION: &str = "Open the cart, press Checkout and confirm the payment.";

pub const SHOP_CORPUS_JSON: &str = r#"[
    {
        "task_name": "Add to cart",
        "full_path": "/catalog/product",
        "instruction": "Open a product page and press Add to cart.",
        "section": "catalog"
    },
    {
        "task_name": "Checkout",
        "full_path": "/cart/checkout",
        "instruction": "Open the cart, press Checkout and confirm the payment.",
        "description": "Pays for the order"
    }
]"#;

pub fn shop_corpus() -> Vec<InstructionRecord> {
    parse_corpus(SHOP_CORPUS_JSON).expect("fixture corpus is valid")
}

/// Query at `[1, 0]`; checkout at cosine 0.6, cart at cosine 0.3.
pub fn shop_embedder() -> Arc<MockEmbedder> {
    Arc::new(
        MockEmbedder::new(2)
            .with_vector(PAY_QUERY, vec![1.0, 0.0])
            .with_vector(format!("Add to cart. {CART_INSTRUCTION}"), vec![0.3, 0.953_939_2])
            .with_vector(format!("Checkout. {CHECKOUT_INSTRUCTION}"), vec![0.6, 0.8]),
    )
}

/// Judge scoring checkout 0.9 and everything else 0.1.
pub fn shop_judge() -> Arc<MockTextGenerator> {
    Arc::new(MockTextGenerator::from_fn(|prompt| {
        if prompt.contains("Task: Checkout") {
            Ok("Here you go:\n{\"relevance_score\": 0.9, \"instruction\": \"Go to the cart and press Checkout.\", \"reasoning\": \"Paying happens at checkout\", \"description\": \"1. Open cart 2. Checkout\"}".to_string())
        } else {
            Ok("{\"relevance_score\": 0.1, \"instruction\": \"Add the product.\", \"reasoning\": \"Not about paying\", \"description\": \"\"}".to_string())
        }
    }))
}

pub struct Harness {
    pub assistant: Assistant,
    pub embedder: Arc<MockEmbedder>,
    pub judge: Arc<MockTextGenerator>,
    pub composer: Arc<MockTextGenerator>,
}

pub fn shop_harness() -> Harness {
    let embedder = shop_embedder();
    let judge = shop_judge();
    let composer = Arc::new(MockTextGenerator::replying(
        "You can pay from the cart: press Checkout and confirm.",
    ));

    let ranker = HybridRanker::new(RelevanceJudge::new(judge.clone()))
        .with_index(EmbeddingIndex::cosine(embedder.clone()))
        .with_config(RankerConfig::default().with_min_similarity(0.0));

    Harness {
        assistant: Assistant::new(ranker, ResponseComposer::new(composer.clone())),
        embedder,
        judge,
        composer,
    }
}
