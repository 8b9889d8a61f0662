//! Remote service boundary
//!
//! The backend exposes speech-to-text, retrieval-augmented query,
//! text-to-speech, and corpus management over HTTP. [`RemoteService`] is
//! the seam the orchestrators program against; [`ApiClient`] is the
//! reqwest-backed implementation.

mod http;

use async_trait::async_trait;

pub use http::ApiClient;

use crate::Result;
use crate::audio::AudioClip;

/// A retrieval-augmented answer with its cited source documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryAnswer {
    pub answer: String,
    pub sources: Vec<String>,
}

/// A file staged for corpus upload
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    /// Stage a file from its name and contents
    #[must_use]
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Stage a file read from disk, named after its final path component
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read
    pub fn from_path(path: &std::path::Path) -> Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.bin".to_string());
        let bytes = std::fs::read(path)?;
        Ok(Self { name, bytes })
    }
}

/// The remote operations the conversation pipeline depends on
///
/// Each call is a single request/response with no retry; retries are the
/// caller's responsibility (a user-initiated re-attempt).
#[async_trait]
pub trait RemoteService: Send + Sync {
    /// Transcribe an audio clip to text
    async fn transcribe(&self, clip: &AudioClip) -> Result<String>;

    /// Answer a question against the uploaded corpus
    async fn query(&self, text: &str) -> Result<QueryAnswer>;

    /// Synthesize speech for an answer
    async fn synthesize(&self, text: &str) -> Result<AudioClip>;

    /// Upload documents to the corpus; returns the server-confirmed names
    async fn upload_documents(&self, files: &[UploadFile]) -> Result<Vec<String>>;

    /// Delete a document from the corpus
    async fn delete_document(&self, filename: &str) -> Result<()>;

    /// Check backend liveness
    async fn health_check(&self) -> Result<()>;
}
