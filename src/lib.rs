//! Parley - voice console client for retrieval-augmented question answering
//!
//! This library provides the client-side orchestration for a voice-enabled
//! QA assistant:
//! - Audio capture and playback
//! - The remote service boundary (STT, query, TTS, corpus management)
//! - Conversation session state
//! - The turn orchestration pipeline
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                  Console / CLI                    │
//! │    typed text  │  mic gesture  │  corpus cmds    │
//! └───────────────────────┬──────────────────────────┘
//!                         │
//! ┌───────────────────────▼──────────────────────────┐
//! │        TurnOrchestrator  │  CorpusManager         │
//! │              SessionState (&mut)                  │
//! └───────────────────────┬──────────────────────────┘
//!                         │
//! ┌───────────────────────▼──────────────────────────┐
//! │          Backend API (RemoteService)              │
//! │    /api/stt │ /api/query │ /api/tts │ /api/upload │
//! └──────────────────────────────────────────────────┘
//! ```

pub mod audio;
pub mod config;
pub mod corpus;
pub mod error;
pub mod pipeline;
pub mod remote;
pub mod session;

pub use audio::{AudioCaptureSession, AudioClip, AudioPlayback};
pub use config::Config;
pub use corpus::CorpusManager;
pub use error::{Error, Result, Stage};
pub use pipeline::{TurnOrchestrator, TurnOutcome};
pub use remote::{ApiClient, QueryAnswer, RemoteService, UploadFile};
pub use session::{PipelineState, Role, SessionState, Turn};
