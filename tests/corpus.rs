//! Corpus management integration tests

use std::sync::Arc;

use parley::remote::UploadFile;
use parley::session::{PipelineState, SessionState};
use parley::{CorpusManager, Stage};

mod common;
use common::{MockService, service_err};

fn corpus(service: &Arc<MockService>) -> CorpusManager<MockService> {
    CorpusManager::new(Arc::clone(service))
}

fn files(names: &[&str]) -> Vec<UploadFile> {
    names
        .iter()
        .map(|n| UploadFile::new(*n, vec![0u8; 8]))
        .collect()
}

#[tokio::test]
async fn test_upload_success_adds_server_names() {
    let service = Arc::new(MockService::new());
    service.push_upload(Ok(vec!["a.pdf".to_string(), "b.txt".to_string()]));

    let mut state = SessionState::new();
    let ran = corpus(&service)
        .upload(&mut state, &files(&["a.pdf", "b.txt"]))
        .await;

    assert!(ran);
    assert_eq!(state.documents(), ["a.pdf", "b.txt"]);
    assert!(state.error().is_none());
    assert!(!state.corpus_busy());
}

#[tokio::test]
async fn test_upload_success_clears_error_banner() {
    let service = Arc::new(MockService::new());
    service.push_upload(Ok(vec!["a.pdf".to_string()]));

    let mut state = SessionState::new();
    state.set_error("stale failure");

    corpus(&service).upload(&mut state, &files(&["a.pdf"])).await;

    assert!(state.error().is_none());
}

#[tokio::test]
async fn test_upload_failure_leaves_documents_unchanged() {
    let service = Arc::new(MockService::new());
    service.push_upload(Err(service_err(Stage::Upload)));

    let mut state = SessionState::new();
    state.add_documents(vec!["existing.pdf".to_string()]);

    corpus(&service).upload(&mut state, &files(&["new.pdf"])).await;

    assert_eq!(state.documents(), ["existing.pdf"]);
    assert!(state.error().unwrap().contains("uploading"));
    assert!(!state.corpus_busy());
}

#[tokio::test]
async fn test_empty_upload_is_noop() {
    let service = Arc::new(MockService::new());
    let mut state = SessionState::new();

    let ran = corpus(&service).upload(&mut state, &[]).await;

    assert!(!ran);
    assert!(state.documents().is_empty());
    assert!(state.error().is_none());
}

#[tokio::test]
async fn test_corpus_busy_rejects_operations() {
    let service = Arc::new(MockService::new());
    let mut state = SessionState::new();
    state.set_corpus_busy(true);

    let c = corpus(&service);
    assert!(!c.upload(&mut state, &files(&["a.pdf"])).await);
    assert!(!c.delete(&mut state, "a.pdf").await);
    assert!(state.documents().is_empty());
}

#[tokio::test]
async fn test_corpus_busy_does_not_block_conversation() {
    let service = Arc::new(MockService::new());
    service.push_query(Ok(common::answer("still works", &[])));
    service.push_synthesize(Ok(parley::audio::AudioClip::wav(vec![0])));

    let mut state = SessionState::new();
    state.set_corpus_busy(true);

    let orch = parley::TurnOrchestrator::new(Arc::clone(&service));
    let outcome = orch.text_turn(&mut state, "question during upload").await;

    assert_eq!(outcome, parley::TurnOutcome::Completed);
    assert_eq!(state.turns().len(), 2);
    assert_eq!(state.pipeline(), PipelineState::Idle);
}

#[tokio::test]
async fn test_delete_removes_only_after_confirmation() {
    let service = Arc::new(MockService::new());
    service.push_delete(Ok(()));

    let mut state = SessionState::new();
    state.add_documents(vec!["a.pdf".to_string(), "b.txt".to_string()]);

    corpus(&service).delete(&mut state, "a.pdf").await;

    assert_eq!(state.documents(), ["b.txt"]);
    assert!(state.error().is_none());
}

#[tokio::test]
async fn test_delete_failure_leaves_documents_unchanged() {
    let service = Arc::new(MockService::new());
    service.push_delete(Err(service_err(Stage::Delete)));

    let mut state = SessionState::new();
    state.add_documents(vec!["a.pdf".to_string()]);

    corpus(&service).delete(&mut state, "a.pdf").await;

    assert_eq!(state.documents(), ["a.pdf"]);
    assert!(state.error().unwrap().contains("deleting"));
}

#[tokio::test]
async fn test_delete_of_unknown_name_reflects_server_verdict() {
    let service = Arc::new(MockService::new());
    // Server accepts the delete even though the client never cached it
    service.push_delete(Ok(()));

    let mut state = SessionState::new();
    corpus(&service).delete(&mut state, "ghost.pdf").await;

    assert!(state.documents().is_empty());
    assert!(state.error().is_none());
}

#[tokio::test]
async fn test_upload_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.txt");
    std::fs::write(&path, b"quarterly numbers").unwrap();

    let file = UploadFile::from_path(&path).unwrap();
    assert_eq!(file.name, "report.txt");
    assert_eq!(file.bytes, b"quarterly numbers");

    let service = Arc::new(MockService::new());
    service.push_upload(Ok(vec!["report.txt".to_string()]));

    let mut state = SessionState::new();
    corpus(&service).upload(&mut state, &[file]).await;

    assert_eq!(state.documents(), ["report.txt"]);
}
