//! Shared test utilities
//!
//! A scripted mock of the remote service boundary so the orchestration
//! pipeline can be tested without a backend or audio hardware.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use parley::audio::AudioClip;
use parley::remote::{QueryAnswer, RemoteService, UploadFile};
use parley::{Error, Result, Stage};

/// Scripted remote service: each operation pops its next scripted result,
/// and panics if called without one (catching unexpected calls).
#[derive(Default)]
pub struct MockService {
    transcribe: Mutex<VecDeque<Result<String>>>,
    query: Mutex<VecDeque<Result<QueryAnswer>>>,
    synthesize: Mutex<VecDeque<Result<AudioClip>>>,
    upload: Mutex<VecDeque<Result<Vec<String>>>>,
    delete: Mutex<VecDeque<Result<()>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_transcribe(&self, result: Result<String>) {
        self.transcribe.lock().unwrap().push_back(result);
    }

    pub fn push_query(&self, result: Result<QueryAnswer>) {
        self.query.lock().unwrap().push_back(result);
    }

    pub fn push_synthesize(&self, result: Result<AudioClip>) {
        self.synthesize.lock().unwrap().push_back(result);
    }

    pub fn push_upload(&self, result: Result<Vec<String>>) {
        self.upload.lock().unwrap().push_back(result);
    }

    pub fn push_delete(&self, result: Result<()>) {
        self.delete.lock().unwrap().push_back(result);
    }
}

#[async_trait]
impl RemoteService for MockService {
    async fn transcribe(&self, _clip: &AudioClip) -> Result<String> {
        self.transcribe
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected transcribe call")
    }

    async fn query(&self, _text: &str) -> Result<QueryAnswer> {
        self.query
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected query call")
    }

    async fn synthesize(&self, _text: &str) -> Result<AudioClip> {
        self.synthesize
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected synthesize call")
    }

    async fn upload_documents(&self, _files: &[UploadFile]) -> Result<Vec<String>> {
        self.upload
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected upload call")
    }

    async fn delete_document(&self, _filename: &str) -> Result<()> {
        self.delete
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected delete call")
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

/// A stage error as the HTTP client would produce it
pub fn service_err(stage: Stage) -> Error {
    Error::Service {
        stage,
        message: "500 Internal Server Error".to_string(),
    }
}

/// A scripted answer with sources
pub fn answer(text: &str, sources: &[&str]) -> QueryAnswer {
    QueryAnswer {
        answer: text.to_string(),
        sources: sources.iter().map(ToString::to_string).collect(),
    }
}
