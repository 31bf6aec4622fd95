//! Upload → ask → answer through the public API, fully offline.
//!
//! Uses the `lexical` checkpoint and generated PDFs, so no API key or
//! network access is needed.

mod common;

use common::{build_pdf, image_only_pdf, text_pdf, TestPage};
use edgequake_pdfqa::qa::lexical::LexicalAnswerer;
use edgequake_pdfqa::{
    answer_question, ModelLoader, ModelRegistry, PdfQaError, QaConfig, QuestionAnswerer, Session,
    SessionProgressCallback, SessionState,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn lexical() -> QaConfig {
    QaConfig::builder().checkpoint("lexical").build().unwrap()
}

#[derive(Default)]
struct CountingLoader {
    loads: AtomicUsize,
}

impl ModelLoader for CountingLoader {
    fn load(&self, _config: &QaConfig) -> Result<Arc<dyn QuestionAnswerer>, PdfQaError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(LexicalAnswerer))
    }
}

fn counted_session() -> (Session, Arc<CountingLoader>) {
    let loader = Arc::new(CountingLoader::default());
    let registry = Arc::new(ModelRegistry::with_loader(loader.clone()));
    (Session::with_registry(lexical(), registry), loader)
}

#[tokio::test]
async fn answers_capital_of_france() {
    let answer = answer_question(
        "What is the capital of France?",
        "The capital of France is Paris.",
        &lexical(),
    )
    .await
    .unwrap();
    assert!(answer.text.contains("Paris"));
}

#[tokio::test]
async fn empty_context_is_rejected() {
    let err = answer_question("What is the capital of France?", "   ", &lexical())
        .await
        .unwrap_err();
    assert!(matches!(err, PdfQaError::EmptyContext));
}

#[tokio::test]
async fn full_flow_over_a_pdf() {
    let bytes = build_pdf(&[
        TestPage::Text(&["Annual report of the Example Society."]),
        TestPage::Text(&["The capital of France is Paris."]),
    ]);
    let (mut session, _) = counted_session();

    session.upload(&bytes).await.unwrap();
    assert_eq!(session.state(), SessionState::DocumentLoaded);

    let result = session.ask("What is the capital of France?").await.unwrap();
    let answer = result.answer.expect("an answer");
    assert_eq!(answer.text, "Paris");

    let text = &session.document().unwrap().text;
    let span: String = text
        .chars()
        .skip(answer.start)
        .take(answer.end - answer.start)
        .collect();
    assert_eq!(span, "Paris");
}

#[tokio::test]
async fn model_loads_once_across_questions() {
    let (mut session, loader) = counted_session();
    session
        .upload(&text_pdf(&["The capital of France is Paris. Bees make honey."]))
        .await
        .unwrap();

    session.ask("What is the capital of France?").await.unwrap();
    session.ask("What do bees make?").await.unwrap();
    session.ask("Who makes honey?").await.unwrap();

    assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn model_is_shared_between_sessions() {
    let loader = Arc::new(CountingLoader::default());
    let registry = Arc::new(ModelRegistry::with_loader(loader.clone()));
    let bytes = text_pdf(&["The capital of France is Paris."]);

    for _ in 0..3 {
        let mut session = Session::with_registry(lexical(), Arc::clone(&registry));
        session.upload(&bytes).await.unwrap();
        session.ask("What is the capital of France?").await.unwrap();
    }
    assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn blank_question_is_validation_error() {
    let (mut session, loader) = counted_session();
    session
        .upload(&text_pdf(&["The capital of France is Paris."]))
        .await
        .unwrap();

    let err = session.ask("  ").await.unwrap_err();
    assert!(matches!(err, PdfQaError::EmptyQuestion));
    assert_eq!(err.to_string(), "Please enter a question.");
    assert_eq!(session.state(), SessionState::DocumentLoaded);
    assert_eq!(loader.loads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn scanned_pdf_is_rejected_on_upload() {
    let (mut session, _) = counted_session();
    let err = session.upload(&image_only_pdf()).await.unwrap_err();
    assert!(matches!(err, PdfQaError::EmptyExtraction { pages: 1 }));
    assert_eq!(session.state(), SessionState::Idle);
}

#[tokio::test]
async fn corrupt_upload_keeps_previous_document() {
    let (mut session, _) = counted_session();
    session
        .upload(&text_pdf(&["The capital of France is Paris."]))
        .await
        .unwrap();

    let err = session.upload(b"not a pdf at all").await.unwrap_err();
    assert!(matches!(err, PdfQaError::InvalidDocument { .. }));
    assert_eq!(session.state(), SessionState::DocumentLoaded);

    let result = session.ask("What is the capital of France?").await.unwrap();
    assert_eq!(result.answer.unwrap().text, "Paris");
}

#[tokio::test]
async fn unanswerable_question_has_display_text() {
    let (mut session, _) = counted_session();
    session
        .upload(&text_pdf(&["Bees make honey."]))
        .await
        .unwrap();

    let result = session.ask("Who painted the Mona Lisa?").await.unwrap();
    assert!(result.answer.is_none());
    assert!(!result.display_text().is_empty());
}

#[derive(Default)]
struct Events {
    pages: AtomicUsize,
    answers: AtomicUsize,
}

impl SessionProgressCallback for Events {
    fn on_page_extracted(&self, _page_num: usize, _total_pages: usize, _chars: usize) {
        self.pages.fetch_add(1, Ordering::SeqCst);
    }

    fn on_answer_complete(&self, _question: &str, found: bool) {
        if found {
            self.answers.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[tokio::test]
async fn progress_events_fire() {
    let events = Arc::new(Events::default());
    let config = QaConfig::builder()
        .checkpoint("lexical")
        .progress_callback(events.clone())
        .build()
        .unwrap();
    let registry = Arc::new(ModelRegistry::with_loader(Arc::new(CountingLoader::default())));
    let mut session = Session::with_registry(config, registry);

    session
        .upload(&text_pdf(&["One", "The capital of France is Paris."]))
        .await
        .unwrap();
    session.ask("What is the capital of France?").await.unwrap();

    assert_eq!(events.pages.load(Ordering::SeqCst), 2);
    assert_eq!(events.answers.load(Ordering::SeqCst), 1);
}
