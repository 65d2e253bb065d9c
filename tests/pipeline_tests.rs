//! End-to-end pipeline scenarios with deterministic test backends.

use std::sync::Arc;

use askdoc::config::PipelineConfig;
use askdoc::document::Document;
use askdoc::embedding::EmbeddingProvider;
use askdoc::error::{AskdocError, Result};
use askdoc::generation::{AnswerGenerator, ChatModel, DEFAULT_NOT_FOUND_SENTINEL};
use askdoc::memory::InMemoryVectorStore;
use askdoc::pipeline::Pipeline;
use askdoc::session::Session;
use async_trait::async_trait;

const DIM: usize = 256;

/// Deterministic bag-of-words embedder: each word of four or more
/// characters hashes into one of DIM buckets. Identical text always embeds
/// identically, and texts sharing content words score higher than
/// unrelated texts.
struct BagOfWordsEmbedder;

#[async_trait]
impl EmbeddingProvider for BagOfWordsEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; DIM];
        let words = text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.len() >= 4)
            .map(str::to_string)
            .collect::<Vec<_>>();
        for word in words {
            let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
            for byte in word.bytes() {
                hash ^= u64::from(byte);
                hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
            }
            vector[(hash % DIM as u64) as usize] += 1.0;
        }
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        DIM
    }
}

/// Chat model that quotes the attendance figure when the prompt's context
/// contains it, and otherwise emits the not-found sentinel. Stands in for
/// a grounded low-temperature model.
struct ExtractiveModel;

#[async_trait]
impl ChatModel for ExtractiveModel {
    async fn invoke(&self, prompt: &str) -> Result<String> {
        if prompt.contains("75%") {
            Ok("The attendance requirement is at least 75% to sit for the exam.".to_string())
        } else {
            Ok(DEFAULT_NOT_FOUND_SENTINEL.to_string())
        }
    }
}

/// Chat model that always fails like an unreachable backend.
struct FailingModel;

#[async_trait]
impl ChatModel for FailingModel {
    async fn invoke(&self, _prompt: &str) -> Result<String> {
        Err(AskdocError::Generation {
            backend: "test".into(),
            message: "connection refused".into(),
        })
    }
}

fn pipeline_with(config: PipelineConfig, model: Option<Arc<dyn ChatModel>>) -> Pipeline {
    let mut builder = Pipeline::builder()
        .config(config)
        .embedder(Arc::new(BagOfWordsEmbedder))
        .store(Arc::new(InMemoryVectorStore::new()));
    if let Some(model) = model {
        builder = builder.generator(AnswerGenerator::new(model));
    }
    builder.build().unwrap()
}

fn rules_config() -> PipelineConfig {
    PipelineConfig::builder().chunk_size(500).chunk_overlap(50).top_k(3).build().unwrap()
}

#[tokio::test]
async fn embedding_is_deterministic_for_identical_text() {
    let embedder = BagOfWordsEmbedder;
    let a = embedder.embed("Attendance must be at least 75% to sit for the exam.").await.unwrap();
    let b = embedder.embed("Attendance must be at least 75% to sit for the exam.").await.unwrap();
    assert_eq!(a, b);
    assert_eq!(a.len(), embedder.dimensions());
}

#[tokio::test]
async fn query_before_ingest_is_index_not_ready() {
    let pipeline = pipeline_with(rules_config(), Some(Arc::new(ExtractiveModel)));

    let err = pipeline.retrieve("anything", None).await.unwrap_err();
    assert!(matches!(err, AskdocError::IndexNotReady));

    let err = pipeline.answer("anything").await.unwrap_err();
    assert!(matches!(err, AskdocError::IndexNotReady));
}

#[tokio::test]
async fn ingest_flips_readiness() {
    let pipeline = pipeline_with(rules_config(), None);
    assert!(!pipeline.is_ready().await.unwrap());

    pipeline
        .ingest(&[Document::new("rules", "Attendance must be at least 75%.")])
        .await
        .unwrap();
    assert!(pipeline.is_ready().await.unwrap());
}

#[tokio::test]
async fn whitespace_only_ingest_is_an_input_error() {
    let pipeline = pipeline_with(rules_config(), None);
    let err = pipeline
        .ingest(&[Document::new("scan_p1", "   \n\n "), Document::new("scan_p2", "\t")])
        .await
        .unwrap_err();
    assert!(matches!(err, AskdocError::Input(_)));
    // The failed ingest did not partially populate the index.
    assert!(!pipeline.is_ready().await.unwrap());
}

#[tokio::test]
async fn verbatim_text_retrieves_its_own_chunk_first() {
    let pipeline = pipeline_with(rules_config(), None);
    pipeline
        .ingest(&[
            Document::new("rules_1", "Attendance must be at least 75% to sit for the exam."),
            Document::new("rules_2", "Courses may be dropped until the end of week six."),
            Document::new("rules_3", "The minimum CGPA for good standing is 5.0."),
        ])
        .await
        .unwrap();

    let results = pipeline
        .retrieve("Courses may be dropped until the end of week six.", None)
        .await
        .unwrap();

    assert!(!results.is_empty());
    assert!(results[0].chunk.text.contains("week six"));
    for window in results.windows(2) {
        assert!(window[0].score >= window[1].score);
    }
}

#[tokio::test]
async fn retrieve_honors_k_override() {
    let pipeline = pipeline_with(rules_config(), None);
    let documents: Vec<Document> = (0..10)
        .map(|i| Document::new(format!("doc_{i}"), format!("rule number {i} about fees")))
        .collect();
    pipeline.ingest(&documents).await.unwrap();

    let results = pipeline.retrieve("rule about fees", Some(5)).await.unwrap();
    assert!(results.len() <= 5);
    let results = pipeline.retrieve("rule about fees", None).await.unwrap();
    assert!(results.len() <= 3); // configured top_k
}

#[tokio::test]
async fn attendance_question_is_answered_from_context() {
    let pipeline = pipeline_with(rules_config(), Some(Arc::new(ExtractiveModel)));
    pipeline
        .ingest(&[Document::new("rules", "Attendance must be at least 75% to sit for the exam.")])
        .await
        .unwrap();

    let results = pipeline.retrieve("What is the attendance requirement?", None).await.unwrap();
    assert!(results.iter().any(|r| r.chunk.text.contains("75%")));

    let answer = pipeline.answer("What is the attendance requirement?").await.unwrap();
    assert!(answer.text.contains("75%"));
    assert!(!answer.text.contains(DEFAULT_NOT_FOUND_SENTINEL));
    assert!(answer.context_used.contains("75%"));
}

#[tokio::test]
async fn unrelated_question_yields_the_sentinel() {
    // A similarity threshold keeps chunks that share no vocabulary with
    // the question out of the context block entirely.
    let config = PipelineConfig::builder()
        .chunk_size(500)
        .chunk_overlap(50)
        .top_k(3)
        .similarity_threshold(0.3)
        .build()
        .unwrap();
    let pipeline = pipeline_with(config, Some(Arc::new(ExtractiveModel)));
    pipeline
        .ingest(&[Document::new("rules", "Attendance must be at least 75% to sit for the exam.")])
        .await
        .unwrap();

    let answer = pipeline.answer("What is the capital of France?").await.unwrap();
    assert_eq!(answer.text, DEFAULT_NOT_FOUND_SENTINEL);
}

#[tokio::test]
async fn answering_without_a_generator_is_a_config_error() {
    let pipeline = pipeline_with(rules_config(), None);
    pipeline.ingest(&[Document::new("rules", "some rule text")]).await.unwrap();

    let err = pipeline.answer("a question").await.unwrap_err();
    assert!(matches!(err, AskdocError::Config(_)));
}

#[tokio::test]
async fn session_records_turns_only_on_success() {
    let pipeline = Arc::new(pipeline_with(rules_config(), Some(Arc::new(FailingModel))));
    pipeline
        .ingest(&[Document::new("rules", "Attendance must be at least 75%.")])
        .await
        .unwrap();

    let mut session = Session::new(Arc::clone(&pipeline));
    let err = session.ask("What is the attendance requirement?").await.unwrap_err();
    assert!(matches!(err, AskdocError::Generation { .. }));
    assert!(session.history().is_empty());
}

#[tokio::test]
async fn session_accumulates_and_resets_history() {
    let pipeline = Arc::new(pipeline_with(rules_config(), Some(Arc::new(ExtractiveModel))));
    pipeline
        .ingest(&[Document::new("rules", "Attendance must be at least 75%.")])
        .await
        .unwrap();

    let mut session = Session::new(pipeline);
    session.ask("What is the attendance requirement?").await.unwrap();
    assert_eq!(session.history().len(), 2);
    assert_eq!(session.history()[0].content, "What is the attendance requirement?");

    session.ask("And what about exams?").await.unwrap();
    assert_eq!(session.history().len(), 4);

    session.reset();
    assert!(session.history().is_empty());
}
