//! Three-part index persistence keyed by a shared path prefix.
//!
//! | artifact                | contents                               | encoding |
//! |-------------------------|----------------------------------------|----------|
//! | `{prefix}_data.json`    | embedding texts, records, normalization | JSON     |
//! | `{prefix}_index.rkyv`   | native index structure                 | rkyv     |
//! | `{prefix}_model.json`   | embedding model identifier             | JSON     |
//!
//! Restoring re-creates the embedder from the stored identifier. Whether that
//! embedder matches the one used at build time is not checked.

use std::ffi::OsString;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use memmap2::Mmap;
use rkyv::rancor::Error as RkyvError;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::{IndexError, IndexResult};
use super::native::NativeIndex;
use super::store::{EmbeddingIndex, IndexSnapshot, Normalization};
use crate::embedding::{Embedder, EmbeddingError};
use crate::record::InstructionRecord;

pub const DATA_SUFFIX: &str = "_data.json";
pub const INDEX_SUFFIX: &str = "_index.rkyv";
pub const MODEL_SUFFIX: &str = "_model.json";

#[derive(Serialize, Deserialize)]
struct IndexData {
    texts: Vec<String>,
    records: Vec<InstructionRecord>,
    normalization: Normalization,
}

/// Contents of the model-identifier artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub model_id: String,
    pub normalization: Normalization,
}

/// Appends an artifact suffix to a path prefix.
pub fn artifact_path(prefix: &Path, suffix: &str) -> PathBuf {
    let mut path: OsString = prefix.as_os_str().to_owned();
    path.push(suffix);
    PathBuf::from(path)
}

/// Returns `true` when all three artifacts exist for `prefix`.
pub fn artifacts_exist(prefix: &Path) -> bool {
    [DATA_SUFFIX, INDEX_SUFFIX, MODEL_SUFFIX]
        .iter()
        .all(|suffix| artifact_path(prefix, suffix).exists())
}

/// Reads only the model-identifier artifact.
pub fn read_model_info(prefix: &Path) -> IndexResult<ModelInfo> {
    read_json(&artifact_path(prefix, MODEL_SUFFIX))
}

impl EmbeddingIndex {
    /// Writes the three artifacts for the current generation.
    pub fn save(&self, prefix: impl AsRef<Path>) -> IndexResult<()> {
        let prefix = prefix.as_ref();
        let snapshot = self.snapshot.as_ref().ok_or(IndexError::NotBuilt)?;

        if let Some(parent) = prefix.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| IndexError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        write_json(
            &artifact_path(prefix, DATA_SUFFIX),
            &IndexData {
                texts: snapshot.texts.clone(),
                records: snapshot.records.clone(),
                normalization: self.normalization,
            },
        )?;

        let index_path = artifact_path(prefix, INDEX_SUFFIX);
        let bytes = rkyv::to_bytes::<RkyvError>(&snapshot.native).map_err(|e| {
            IndexError::Serialization {
                path: index_path.clone(),
                reason: e.to_string(),
            }
        })?;
        std::fs::write(&index_path, &bytes).map_err(|source| IndexError::Io {
            path: index_path.clone(),
            source,
        })?;

        write_json(
            &artifact_path(prefix, MODEL_SUFFIX),
            &ModelInfo {
                model_id: self.embedder.model_id().to_string(),
                normalization: self.normalization,
            },
        )?;

        info!(
            prefix = %prefix.display(),
            records = snapshot.len(),
            "Vector index saved"
        );
        Ok(())
    }

    /// Restores an index, re-creating its embedder from the stored model identifier.
    pub fn restore<F>(prefix: impl AsRef<Path>, make_embedder: F) -> IndexResult<Self>
    where
        F: FnOnce(&str) -> Result<Arc<dyn Embedder>, EmbeddingError>,
    {
        let prefix = prefix.as_ref();

        let model: ModelInfo = read_model_info(prefix)?;
        let embedder = make_embedder(&model.model_id)?;

        let data: IndexData = read_json(&artifact_path(prefix, DATA_SUFFIX))?;
        let native = read_native(&artifact_path(prefix, INDEX_SUFFIX))?;
        native
            .check()
            .map_err(|reason| IndexError::Inconsistent { reason })?;

        if data.texts.len() != data.records.len() || data.records.len() != native.len() {
            return Err(IndexError::Inconsistent {
                reason: format!(
                    "{} texts, {} records, {} vectors",
                    data.texts.len(),
                    data.records.len(),
                    native.len()
                ),
            });
        }

        info!(
            prefix = %prefix.display(),
            model_id = %model.model_id,
            records = data.records.len(),
            kind = %native.kind(),
            "Vector index restored"
        );

        Ok(Self {
            embedder,
            normalization: data.normalization,
            snapshot: Some(IndexSnapshot {
                texts: data.texts,
                records: data.records,
                native,
            }),
        })
    }
}

fn open(path: &Path) -> IndexResult<File> {
    File::open(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            IndexError::ArtifactNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IndexError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> IndexResult<T> {
    let file = open(path)?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| {
        IndexError::Serialization {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> IndexResult<()> {
    let io_error = |source| IndexError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_error)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, value).map_err(|e| IndexError::Serialization {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    writer.flush().map_err(io_error)
}

fn read_native(path: &Path) -> IndexResult<NativeIndex> {
    let file = open(path)?;
    // SAFETY: the artifact is only read here and is not modified while mapped.
    let mmap = unsafe { Mmap::map(&file) }.map_err(|source| IndexError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    rkyv::from_bytes::<NativeIndex, RkyvError>(&mmap).map_err(|e| IndexError::Serialization {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
