//! Corpus management
//!
//! Upload and delete documents against the backend, reconciling the local
//! document-name cache only after server confirmation. Carries its own
//! busy flag, independent of the conversation pipeline, so document
//! management never blocks chat.

use std::sync::Arc;

use crate::remote::{RemoteService, UploadFile};
use crate::session::SessionState;

/// Orchestrates document upload/delete against the remote service
pub struct CorpusManager<S> {
    service: Arc<S>,
}

impl<S: RemoteService> CorpusManager<S> {
    /// Create a manager over a remote service
    #[must_use]
    pub fn new(service: Arc<S>) -> Self {
        Self { service }
    }

    /// Upload a set of files to the corpus
    ///
    /// An empty file set or an already-running corpus operation is a
    /// no-op; returns whether the upload ran. On success the
    /// server-returned names are appended to the local cache (the client
    /// does not deduplicate) and the error banner is cleared; on failure
    /// the cache is unchanged.
    pub async fn upload(&self, state: &mut SessionState, files: &[UploadFile]) -> bool {
        if files.is_empty() {
            return false;
        }
        if state.corpus_busy() {
            tracing::debug!("corpus operation in flight, upload rejected");
            return false;
        }

        state.set_corpus_busy(true);

        match self.service.upload_documents(files).await {
            Ok(names) => {
                tracing::info!(files = ?names, "documents uploaded");
                state.add_documents(names);
                state.clear_error();
            }
            Err(e) => {
                tracing::warn!(error = %e, "upload failed");
                state.set_error(format!("Error uploading documents: {e}"));
            }
        }

        state.set_corpus_busy(false);
        true
    }

    /// Delete a document from the corpus
    ///
    /// The remote delete runs first; the local cache entry is removed only
    /// on server confirmation. No optimistic-then-rollback. Returns
    /// whether the delete ran.
    pub async fn delete(&self, state: &mut SessionState, filename: &str) -> bool {
        if state.corpus_busy() {
            tracing::debug!("corpus operation in flight, delete rejected");
            return false;
        }

        state.set_corpus_busy(true);

        match self.service.delete_document(filename).await {
            Ok(()) => {
                tracing::info!(filename, "document deleted");
                state.remove_document(filename);
            }
            Err(e) => {
                tracing::warn!(error = %e, filename, "delete failed");
                state.set_error(format!("Error deleting document: {e}"));
            }
        }

        state.set_corpus_busy(false);
        true
    }
}
