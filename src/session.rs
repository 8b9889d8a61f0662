//! Conversation session state
//!
//! A single owned state object holding the turn log, pipeline flags,
//! pending response audio, the local document cache, and the error banner.
//! The orchestrator and corpus manager mutate it by `&mut` reference; there
//! is exactly one writer per field and no ambient globals.

use crate::audio::AudioClip;

/// Author of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One message in the conversation, immutable once appended
#[derive(Debug, Clone)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    /// Source documents cited by the answer; only ever present on
    /// assistant turns
    pub sources: Vec<String>,
}

/// Conversation pipeline state; exactly one is active at any instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineState {
    #[default]
    Idle,
    /// Microphone is held and buffering audio
    Capturing,
    /// A remote turn sequence is in flight
    Busy,
}

/// In-memory session state for one conversation
///
/// Created empty at startup and lives for the process lifetime; nothing
/// here is persisted.
#[derive(Debug, Default)]
pub struct SessionState {
    turns: Vec<Turn>,
    pipeline: PipelineState,
    pending_audio: Option<AudioClip>,
    documents: Vec<String>,
    error: Option<String>,
    corpus_busy: bool,
}

impl SessionState {
    /// Create an empty session
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The turn log, in append (= display = chronological) order
    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Append a user turn
    pub fn push_user_turn(&mut self, content: impl Into<String>) {
        self.turns.push(Turn {
            role: Role::User,
            content: content.into(),
            sources: Vec::new(),
        });
    }

    /// Append an assistant turn with its cited sources
    pub fn push_assistant_turn(&mut self, content: impl Into<String>, sources: Vec<String>) {
        self.turns.push(Turn {
            role: Role::Assistant,
            content: content.into(),
            sources,
        });
    }

    /// Current pipeline state
    #[must_use]
    pub const fn pipeline(&self) -> PipelineState {
        self.pipeline
    }

    /// Transition the pipeline state
    pub fn set_pipeline(&mut self, state: PipelineState) {
        self.pipeline = state;
    }

    /// Synthesized response audio, if any
    #[must_use]
    pub const fn pending_audio(&self) -> Option<&AudioClip> {
        self.pending_audio.as_ref()
    }

    /// Install a new response clip, dropping any superseded one
    ///
    /// At most one synthesized clip is alive at a time; the previous
    /// clip's buffer is released here.
    pub fn set_pending_audio(&mut self, clip: AudioClip) {
        self.pending_audio = Some(clip);
    }

    /// Local view of the uploaded document names, in arrival order
    ///
    /// This is an optimistic cache; the authoritative copy is server-side
    /// and the cache is only mutated after server confirmation.
    #[must_use]
    pub fn documents(&self) -> &[String] {
        &self.documents
    }

    /// Append server-confirmed document names (no client-side dedup)
    pub fn add_documents(&mut self, names: impl IntoIterator<Item = String>) {
        self.documents.extend(names);
    }

    /// Remove a server-confirmed deleted document from the cache
    pub fn remove_document(&mut self, name: &str) {
        self.documents.retain(|d| d != name);
    }

    /// Active error banner, if any
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Set the error banner, overwriting any previous one
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    /// Dismiss the error banner
    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Whether a corpus upload/delete is in flight
    ///
    /// Independent of [`PipelineState`]: document management never blocks
    /// conversation turns.
    #[must_use]
    pub const fn corpus_busy(&self) -> bool {
        self.corpus_busy
    }

    /// Set the corpus busy flag
    pub fn set_corpus_busy(&mut self, busy: bool) {
        self.corpus_busy = busy;
    }
}
