use super::*;
use crate::embedding::{Embedder, EmbeddingError, MockEmbedder};
use crate::record::InstructionRecord;
use std::sync::Arc;

fn corpus() -> Vec<InstructionRecord> {
    vec![
        InstructionRecord::new("Checkout", "/cart/checkout", "Open the cart and press Pay."),
        InstructionRecord::new("Cart", "/cart", "Press the cart icon in the header."),
        InstructionRecord::new("Login", "/login", "Enter your email and password."),
        InstructionRecord::new("Invoices", "/billing/invoices", "Open Billing, then Invoices."),
    ]
}

fn built(embedder: MockEmbedder, normalization: Normalization) -> EmbeddingIndex {
    let mut index = EmbeddingIndex::new(Arc::new(embedder), normalization);
    index.build(&corpus()).expect("index builds");
    index
}

mod build_tests {
    use super::*;

    #[test]
    fn test_unbuilt_index_returns_nothing() {
        let index = EmbeddingIndex::cosine(Arc::new(MockEmbedder::new(8)));
        assert!(!index.is_built());
        assert!(index.search("anything", 5).expect("search").is_empty());
        assert!(index.kind().is_none());
    }

    #[test]
    fn test_build_records_positions_and_texts() {
        let index = built(MockEmbedder::new(8), Normalization::Cosine);
        assert_eq!(index.len(), 4);
        assert_eq!(index.kind(), Some(IndexKind::Flat));
        assert_eq!(index.record(2).map(|r| r.task_name.as_str()), Some("Login"));
        assert_eq!(index.text(0), Some("Checkout. Open the cart and press Pay."));
        assert!(index.record(4).is_none());
    }

    #[test]
    fn test_build_embeds_corpus_in_one_batch() {
        let embedder = Arc::new(MockEmbedder::new(8));
        let mut index = EmbeddingIndex::cosine(embedder.clone());
        index.build(&corpus()).expect("builds");
        assert_eq!(embedder.call_count(), 1);
        assert_eq!(embedder.inputs().len(), 4);
    }

    #[test]
    fn test_empty_corpus_keeps_previous_generation() {
        let mut index = built(MockEmbedder::new(8), Normalization::Cosine);
        index.build(&[]).expect("empty build succeeds");
        assert_eq!(index.len(), 4);

        let mut fresh = EmbeddingIndex::cosine(Arc::new(MockEmbedder::new(8)));
        fresh.build(&[]).expect("empty build succeeds");
        assert!(!fresh.is_built());
        assert!(fresh.search("Checkout", 3).expect("search").is_empty());
    }

    #[test]
    fn test_failed_build_keeps_previous_generation() {
        struct FlakyEmbedder {
            inner: MockEmbedder,
            fail: std::sync::atomic::AtomicBool,
        }

        impl Embedder for FlakyEmbedder {
            fn model_id(&self) -> &str {
                self.inner.model_id()
            }
            fn dimension(&self) -> usize {
                self.inner.dimension()
            }
            fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
                if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
                    return Err(EmbeddingError::InferenceFailed {
                        reason: "offline".to_string(),
                    });
                }
                self.inner.embed_batch(texts)
            }
        }

        let embedder = Arc::new(FlakyEmbedder {
            inner: MockEmbedder::new(8),
            fail: std::sync::atomic::AtomicBool::new(false),
        });
        let mut index = EmbeddingIndex::cosine(embedder.clone());
        index.build(&corpus()).expect("first build");

        embedder.fail.store(true, std::sync::atomic::Ordering::SeqCst);
        let err = index.build(&corpus()[..1]).unwrap_err();
        assert!(matches!(err, IndexError::Embedding(_)));
        assert_eq!(index.len(), 4);
    }

    #[test]
    fn test_large_corpus_uses_inverted_file() {
        let records: Vec<InstructionRecord> = (0..10_000)
            .map(|i| InstructionRecord::new(format!("Task {i}"), format!("/t/{i}"), "Do it."))
            .collect();
        let mut index = EmbeddingIndex::cosine(Arc::new(MockEmbedder::new(16)));
        index.build(&records).expect("builds");

        let kind = index.kind().expect("built");
        assert!(kind.is_approximate());
        assert_eq!(
            kind,
            IndexKind::InvertedFile {
                clusters: 100,
                probes: 10
            }
        );

        let hits = index.search("Task 1234. Do it.", 5).expect("search");
        assert!(hits.len() <= 5);
        assert_eq!(hits[0].0, 1234);
        assert!((hits[0].1 - 1.0).abs() < 1e-3);
    }
}

mod search_tests {
    use super::*;

    #[test]
    fn test_positions_in_range_and_capped() {
        let index = built(MockEmbedder::new(8), Normalization::Cosine);
        let hits = index.search("how do I pay", 10).expect("search");
        assert!(hits.len() <= index.len());
        assert!(hits.iter().all(|(position, _)| *position < index.len()));
        assert!(hits.windows(2).all(|w| w[0].1 >= w[1].1));
    }

    #[test]
    fn test_cosine_self_similarity_is_one() {
        let index = built(MockEmbedder::new(8), Normalization::Cosine);
        let text = index.text(1).expect("text").to_string();
        let hits = index.search(&text, 1).expect("search");
        assert_eq!(hits[0].0, 1);
        assert!((hits[0].1 - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_cosine_uses_pinned_geometry() {
        let embedder = MockEmbedder::new(2)
            .with_vector("where is checkout", vec![1.0, 0.0])
            .with_vector("Checkout. Open the cart and press Pay.", vec![0.6, 0.8])
            .with_vector("Cart. Press the cart icon in the header.", vec![0.3, 0.953_939_2])
            .with_vector("Login. Enter your email and password.", vec![-1.0, 0.0])
            .with_vector("Invoices. Open Billing, then Invoices.", vec![0.0, -1.0]);
        let index = built(embedder, Normalization::Cosine);

        let hits = index.search("where is checkout", 4).expect("search");
        assert_eq!(hits.len(), 2, "non-positive similarities are dropped");
        assert_eq!(hits[0].0, 0);
        assert!((hits[0].1 - 0.6).abs() < 1e-4);
        assert_eq!(hits[1].0, 1);
        assert!((hits[1].1 - 0.3).abs() < 1e-4);
    }

    #[test]
    fn test_euclidean_similarity_is_inverse_distance() {
        let embedder = MockEmbedder::new(2)
            .with_vector("origin", vec![0.0, 0.0])
            .with_vector("Checkout. Open the cart and press Pay.", vec![1.0, 0.0])
            .with_vector("Cart. Press the cart icon in the header.", vec![0.0, 2.0])
            .with_vector("Login. Enter your email and password.", vec![0.0, 0.0])
            .with_vector("Invoices. Open Billing, then Invoices.", vec![3.0, 0.0]);
        let index = built(embedder, Normalization::Euclidean);

        let hits = index.search("origin", 4).expect("search");
        assert_eq!(hits.len(), 4);
        assert_eq!(hits[0], (2, 1.0));
        assert_eq!(hits[1].0, 0);
        assert!((hits[1].1 - 0.5).abs() < 1e-6);
        assert_eq!(hits[2].0, 1);
        assert!((hits[2].1 - 0.2).abs() < 1e-6);
        assert!((hits[3].1 - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_query_embedding_failure_propagates() {
        let mut index = EmbeddingIndex::cosine(Arc::new(MockEmbedder::new(4)));
        index.build(&corpus()).expect("builds");
        index.embedder = Arc::new(MockEmbedder::new(4).failing("gone"));
        assert!(matches!(
            index.search("x", 3).unwrap_err(),
            IndexError::Embedding(_)
        ));
    }

    #[test]
    fn test_query_dimension_mismatch() {
        let mut index = EmbeddingIndex::cosine(Arc::new(MockEmbedder::new(4)));
        index.build(&corpus()).expect("builds");
        index.embedder = Arc::new(MockEmbedder::new(6));
        assert!(matches!(
            index.search("x", 3).unwrap_err(),
            IndexError::DimensionMismatch {
                expected: 4,
                actual: 6
            }
        ));
    }

    #[test]
    fn test_l2_normalize_leaves_zero_vector() {
        let mut zero = vec![0.0, 0.0];
        l2_normalize(&mut zero);
        assert_eq!(zero, vec![0.0, 0.0]);

        let mut v = vec![3.0, 4.0];
        l2_normalize(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-6 && (v[1] - 0.8).abs() < 1e-6);
    }
}

mod persist_tests {
    use super::*;

    fn mock_factory(model_id: &str) -> Result<Arc<dyn Embedder>, EmbeddingError> {
        Ok(Arc::new(MockEmbedder::new(8).with_model_id(model_id)))
    }

    #[test]
    fn test_save_and_restore_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let prefix = dir.path().join("nested").join("faq");

        let index = built(
            MockEmbedder::new(8).with_model_id("mock-model"),
            Normalization::Cosine,
        );
        index.save(&prefix).expect("saves");
        assert!(artifacts_exist(&prefix));
        assert!(artifact_path(&prefix, DATA_SUFFIX).ends_with("faq_data.json"));

        let info = read_model_info(&prefix).expect("model info");
        assert_eq!(info.model_id, "mock-model");
        assert_eq!(info.normalization, Normalization::Cosine);

        let mut seen = None;
        let restored = EmbeddingIndex::restore(&prefix, |id| {
            seen = Some(id.to_string());
            mock_factory(id)
        })
        .expect("restores");
        assert_eq!(seen.as_deref(), Some("mock-model"));
        assert_eq!(restored.len(), index.len());
        assert_eq!(restored.records(), index.records());

        let before = index.search("how do I pay", 3).expect("search");
        let after = restored.search("how do I pay", 3).expect("search");
        assert_eq!(before, after);
    }

    #[test]
    fn test_save_unbuilt_index_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let index = EmbeddingIndex::cosine(Arc::new(MockEmbedder::new(8)));
        assert!(matches!(
            index.save(dir.path().join("x")).unwrap_err(),
            IndexError::NotBuilt
        ));
    }

    #[test]
    fn test_restore_missing_artifacts() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = EmbeddingIndex::restore(dir.path().join("absent"), mock_factory).unwrap_err();
        assert!(matches!(err, IndexError::ArtifactNotFound { .. }));
        assert!(!artifacts_exist(&dir.path().join("absent")));
    }

    #[test]
    fn test_restore_factory_error_propagates() {
        let dir = tempfile::tempdir().expect("tempdir");
        let prefix = dir.path().join("faq");
        built(MockEmbedder::new(8), Normalization::Cosine)
            .save(&prefix)
            .expect("saves");

        let err = EmbeddingIndex::restore(&prefix, |_| {
            Err(EmbeddingError::ModelNotFound {
                path: "missing".into(),
            })
        })
        .unwrap_err();
        assert!(matches!(err, IndexError::Embedding(_)));
    }

    #[test]
    fn test_restore_detects_inconsistent_artifacts() {
        let dir = tempfile::tempdir().expect("tempdir");
        let full = dir.path().join("full");
        let small = dir.path().join("small");

        built(MockEmbedder::new(8), Normalization::Cosine)
            .save(&full)
            .expect("saves");
        let mut one = EmbeddingIndex::cosine(Arc::new(MockEmbedder::new(8)));
        one.build(&corpus()[..1]).expect("builds");
        one.save(&small).expect("saves");

        std::fs::copy(
            artifact_path(&small, INDEX_SUFFIX),
            artifact_path(&full, INDEX_SUFFIX),
        )
        .expect("copy");

        let err = EmbeddingIndex::restore(&full, mock_factory).unwrap_err();
        assert!(matches!(err, IndexError::Inconsistent { .. }));
    }

    #[test]
    fn test_restore_rejects_list_entry_past_vectors() {
        let dir = tempfile::tempdir().expect("tempdir");
        let prefix = dir.path().join("faq");
        built(MockEmbedder::new(8), Normalization::Cosine)
            .save(&prefix)
            .expect("saves");

        let vectors: Vec<Vec<f32>> = (0..4)
            .map(|i| {
                let mut v = vec![0.1; 8];
                v[i] = 1.0;
                v
            })
            .collect();
        let mut native = NativeIndex::build(
            IndexKind::InvertedFile {
                clusters: 2,
                probes: 2,
            },
            Metric::InnerProduct,
            8,
            &vectors,
        );
        if let NativeIndex::InvertedFile(ivf) = &mut native {
            ivf.lists[0].push(999);
        }
        let bytes = rkyv::to_bytes::<rkyv::rancor::Error>(&native).expect("serializes");
        std::fs::write(artifact_path(&prefix, INDEX_SUFFIX), &bytes).expect("write");

        match EmbeddingIndex::restore(&prefix, mock_factory).unwrap_err() {
            IndexError::Inconsistent { reason } => assert!(reason.contains("999"), "{reason}"),
            other => panic!("expected Inconsistent, got {other}"),
        }
    }

    #[test]
    fn test_restore_corrupt_index_blob() {
        let dir = tempfile::tempdir().expect("tempdir");
        let prefix = dir.path().join("faq");
        built(MockEmbedder::new(8), Normalization::Cosine)
            .save(&prefix)
            .expect("saves");
        std::fs::write(artifact_path(&prefix, INDEX_SUFFIX), b"not an index").expect("write");

        let err = EmbeddingIndex::restore(&prefix, mock_factory).unwrap_err();
        assert!(matches!(err, IndexError::Serialization { .. }));
    }
}
