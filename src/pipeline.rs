//! Turn orchestration
//!
//! Drives one conversation turn through the remote pipeline:
//! transcribe (voice path only) → record user turn → query → record
//! assistant turn → synthesize. Every failure is converted into the error
//! banner at this boundary; nothing propagates to the rendering layer.

use std::sync::Arc;

use crate::audio::AudioClip;
use crate::remote::RemoteService;
use crate::session::{PipelineState, SessionState};

/// Result of submitting a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The turn sequence ran to a terminal outcome (success or a surfaced
    /// failure)
    Completed,
    /// The pipeline was not idle, or the input was blank; nothing happened
    Rejected,
}

/// The conversation turn state machine
///
/// Enforces at-most-one-turn-in-flight: the pipeline flag is a logical
/// mutex, and a submission while it is held is rejected rather than
/// queued. Partial results survive later-stage failures — a transcribed or
/// answered turn is never rolled back.
pub struct TurnOrchestrator<S> {
    service: Arc<S>,
}

impl<S: RemoteService> TurnOrchestrator<S> {
    /// Create an orchestrator over a remote service
    #[must_use]
    pub fn new(service: Arc<S>) -> Self {
        Self { service }
    }

    /// Run a voice turn from a finished capture clip
    ///
    /// Transcribes first; only a successful transcription appends the user
    /// turn. On transcription failure the utterance is lost (there is no
    /// text to record) and the failure is surfaced on the banner.
    pub async fn voice_turn(&self, state: &mut SessionState, clip: AudioClip) -> TurnOutcome {
        if state.pipeline() != PipelineState::Idle {
            tracing::debug!("pipeline busy, voice turn rejected");
            return TurnOutcome::Rejected;
        }

        state.set_pipeline(PipelineState::Busy);

        match self.service.transcribe(&clip).await {
            Ok(text) => {
                tracing::info!(transcript = %text, "voice input transcribed");
                state.push_user_turn(text.clone());
                self.answer(state, &text).await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "transcription failed");
                state.set_error(format!("Error processing voice input: {e}"));
            }
        }

        state.set_pipeline(PipelineState::Idle);
        TurnOutcome::Completed
    }

    /// Run a text turn from typed input
    ///
    /// The user turn is appended before any remote call, so the user's own
    /// message renders even if the downstream query fails. Blank input is
    /// rejected.
    pub async fn text_turn(&self, state: &mut SessionState, text: &str) -> TurnOutcome {
        if state.pipeline() != PipelineState::Idle {
            tracing::debug!("pipeline busy, text turn rejected");
            return TurnOutcome::Rejected;
        }

        let text = text.trim();
        if text.is_empty() {
            return TurnOutcome::Rejected;
        }

        state.push_user_turn(text);
        state.set_pipeline(PipelineState::Busy);

        self.answer(state, text).await;

        state.set_pipeline(PipelineState::Idle);
        TurnOutcome::Completed
    }

    /// Query the corpus and synthesize the spoken answer
    ///
    /// The assistant turn is kept even when synthesis fails afterwards:
    /// the text response is still delivered if only the audio is lost.
    async fn answer(&self, state: &mut SessionState, question: &str) {
        let reply = match self.service.query(question).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(error = %e, "query failed");
                state.set_error(format!("Error processing query: {e}"));
                return;
            }
        };

        tracing::info!(sources = reply.sources.len(), "answer received");
        state.push_assistant_turn(reply.answer.clone(), reply.sources);

        match self.service.synthesize(&reply.answer).await {
            Ok(clip) => {
                tracing::debug!(audio_bytes = clip.bytes.len(), "response audio ready");
                state.set_pending_audio(clip);
            }
            Err(e) => {
                tracing::warn!(error = %e, "synthesis failed, keeping text answer");
                state.set_error(format!("Error generating response audio: {e}"));
            }
        }
    }
}
