use super::*;
use std::path::PathBuf;

mod config_tests {
    use super::*;

    #[test]
    fn test_embedder_config_default() {
        let config = EmbedderConfig::default();
        assert_eq!(config.embedding_dim, SENTENCE_EMBEDDING_DIM);
        assert_eq!(config.max_seq_len, SENTENCE_MAX_SEQ_LEN);
        assert!(!config.testing_stub);
        assert!(config.model_path.as_os_str().is_empty());
    }

    #[test]
    fn test_stub_model_id_round_trip() {
        let config = EmbedderConfig::stub(64);
        assert_eq!(config.model_id(), "stub:64");

        let restored = EmbedderConfig::from_model_id(&config.model_id()).expect("parses");
        assert!(restored.testing_stub);
        assert_eq!(restored.embedding_dim, 64);
    }

    #[test]
    fn test_model_id_for_directory() {
        let config = EmbedderConfig::from_model_id("/models/minilm").expect("parses");
        assert!(!config.testing_stub);
        assert_eq!(config.model_path, PathBuf::from("/models/minilm"));
        assert_eq!(config.model_id(), "/models/minilm");
    }

    #[test]
    fn test_bad_stub_model_id() {
        let err = EmbedderConfig::from_model_id("stub:many").unwrap_err();
        assert!(matches!(err, EmbeddingError::InvalidConfig { .. }));
    }

    #[test]
    fn test_validate_requires_model_path() {
        let err = EmbedderConfig::default().validate().unwrap_err();
        assert!(matches!(err, EmbeddingError::InvalidConfig { .. }));
    }

    #[test]
    fn test_validate_missing_model_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = EmbedderConfig::new(dir.path()).validate().unwrap_err();
        match err {
            EmbeddingError::ModelNotFound { path } => {
                assert!(path.ends_with("config.json"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_validate_zero_stub_dimension() {
        let err = EmbedderConfig::stub(0).validate().unwrap_err();
        assert!(matches!(err, EmbeddingError::InvalidConfig { .. }));
    }

    #[test]
    fn test_validate_zero_seq_len() {
        let err = EmbedderConfig::stub(8)
            .with_max_seq_len(0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, EmbeddingError::InvalidConfig { .. }));
    }
}

mod stub_tests {
    use super::*;

    fn stub(dim: usize) -> SentenceEmbedder {
        SentenceEmbedder::load(EmbedderConfig::stub(dim)).expect("stub loads")
    }

    #[test]
    fn test_missing_model_is_fatal() {
        let err = SentenceEmbedder::load(EmbedderConfig::new("/nonexistent/model")).unwrap_err();
        assert!(matches!(err, EmbeddingError::ModelNotFound { .. }));
    }

    #[test]
    fn test_stub_dimension_and_id() {
        let embedder = stub(32);
        assert!(embedder.is_stub());
        assert_eq!(embedder.dimension(), 32);
        assert_eq!(embedder.model_id(), "stub:32");
    }

    #[test]
    fn test_stub_is_deterministic() {
        let a = stub(16).embed("reset my password").expect("embeds");
        let b = stub(16).embed("reset my password").expect("embeds");
        assert_eq!(a, b);
    }

    #[test]
    fn test_stub_differs_per_text() {
        let embedder = stub(16);
        let a = embedder.embed("reset my password").expect("embeds");
        let b = embedder.embed("download invoice").expect("embeds");
        assert_ne!(a, b);
    }

    #[test]
    fn test_stub_values_in_range() {
        let vector = stub(128).embed("range check").expect("embeds");
        assert!(vector.iter().all(|v| (-1.0..=1.0).contains(v)));
    }

    #[test]
    fn test_batch_matches_single() {
        let embedder = stub(8);
        let batch = embedder.embed_batch(&["one", "two"]).expect("embeds");
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[1], embedder.embed("two").expect("embeds"));
    }

    #[test]
    fn test_empty_batch() {
        assert!(stub(8).embed_batch(&[]).expect("embeds").is_empty());
    }

    #[test]
    fn test_from_model_id_stub() {
        let embedder = SentenceEmbedder::from_model_id("stub:24").expect("loads");
        assert_eq!(embedder.dimension(), 24);
    }

    #[test]
    fn test_debug_output() {
        let debug = format!("{:?}", stub(8));
        assert!(debug.contains("SentenceEmbedder"));
        assert!(debug.contains("Stub"));
    }
}
