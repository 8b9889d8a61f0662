use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

use parley::audio::{AudioCaptureSession, AudioPlayback};
use parley::remote::{ApiClient, RemoteService, UploadFile};
use parley::session::{PipelineState, Role, SessionState};
use parley::{Config, CorpusManager, TurnOrchestrator};

/// Parley - voice console for retrieval-augmented question answering
#[derive(Parser)]
#[command(name = "parley", version, about)]
struct Cli {
    /// Backend API base URL
    #[arg(long, env = "PARLEY_API_URL")]
    api_url: Option<String>,

    /// Per-request timeout in seconds (0 disables the bound)
    #[arg(long, env = "PARLEY_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable voice features (for hosts without audio hardware)
    #[arg(long, env = "PARLEY_DISABLE_VOICE")]
    no_voice: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Ask a single question and print the answer
    Ask {
        /// The question text
        text: String,
        /// Also play the synthesized answer audio
        #[arg(long)]
        speak: bool,
    },
    /// Check backend liveness
    Health,
    /// Test microphone input
    TestMic {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
    /// Upload documents to the corpus
    Upload {
        /// Files to upload
        paths: Vec<PathBuf>,
    },
    /// Delete a document from the corpus
    Delete {
        /// Server-side filename
        filename: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn,parley=warn",
        1 => "info,parley=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.api_url.as_deref(), cli.timeout_secs, cli.no_voice);
    tracing::debug!(?config, "loaded configuration");

    let service = Arc::new(ApiClient::new(config.api_url.clone(), config.request_timeout)?);

    match cli.command {
        Some(Command::Ask { text, speak }) => cmd_ask(&service, &text, speak).await,
        Some(Command::Health) => cmd_health(&service).await,
        Some(Command::TestMic { duration }) => cmd_test_mic(duration).await,
        Some(Command::Upload { paths }) => cmd_upload(&service, &paths).await,
        Some(Command::Delete { filename }) => cmd_delete(&service, &filename).await,
        None => run_console(service, &config).await,
    }
}

/// One-shot text turn
async fn cmd_ask(service: &Arc<ApiClient>, text: &str, speak: bool) -> anyhow::Result<()> {
    let orchestrator = TurnOrchestrator::new(Arc::clone(service));
    let mut state = SessionState::new();

    orchestrator.text_turn(&mut state, text).await;

    if let Some(banner) = state.error() {
        anyhow::bail!("{banner}");
    }

    if let Some(turn) = state.turns().iter().rev().find(|t| t.role == Role::Assistant) {
        println!("{}", turn.content);
        if !turn.sources.is_empty() {
            println!("\nSources: {}", turn.sources.join(", "));
        }
    }

    if speak {
        if let Some(clip) = state.pending_audio() {
            AudioPlayback::new().play_wav(&clip.bytes)?;
        }
    }

    Ok(())
}

/// Check backend liveness
async fn cmd_health(service: &Arc<ApiClient>) -> anyhow::Result<()> {
    service.health_check().await?;
    println!("backend is healthy");
    Ok(())
}

/// Test microphone input with a level meter
async fn cmd_test_mic(duration: u64) -> anyhow::Result<()> {
    println!("Testing microphone for {duration} seconds...");
    println!("Speak into your microphone!\n");

    let mut capture = AudioCaptureSession::new();
    capture.start()?;

    for i in 0..duration {
        tokio::time::sleep(Duration::from_secs(1)).await;

        let samples = capture.peek_buffer();
        let energy = calculate_rms(&samples);
        let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);

        // Visual meter
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let meter_len = (energy * 100.0).min(50.0) as usize;
        let meter: String = "█".repeat(meter_len) + &" ".repeat(50 - meter_len);

        println!(
            "[{:2}s] RMS: {:.4} | Peak: {:.4} | [{}]",
            i + 1,
            energy,
            peak,
            meter
        );

        // Clear buffer each second
        capture.clear_buffer();
    }

    capture.stop()?;

    println!("\n---");
    println!("If you saw movement in the meter, your mic is working.");

    Ok(())
}

/// Calculate RMS energy
#[allow(clippy::cast_precision_loss)]
fn calculate_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

/// One-shot corpus upload
async fn cmd_upload(service: &Arc<ApiClient>, paths: &[PathBuf]) -> anyhow::Result<()> {
    if paths.is_empty() {
        anyhow::bail!("no files given");
    }

    let files = paths
        .iter()
        .map(|p| UploadFile::from_path(p))
        .collect::<parley::Result<Vec<_>>>()?;

    let corpus = CorpusManager::new(Arc::clone(service));
    let mut state = SessionState::new();
    corpus.upload(&mut state, &files).await;

    if let Some(banner) = state.error() {
        anyhow::bail!("{banner}");
    }

    for name in state.documents() {
        println!("uploaded: {name}");
    }
    Ok(())
}

/// One-shot corpus delete
async fn cmd_delete(service: &Arc<ApiClient>, filename: &str) -> anyhow::Result<()> {
    let corpus = CorpusManager::new(Arc::clone(service));
    let mut state = SessionState::new();
    corpus.delete(&mut state, filename).await;

    if let Some(banner) = state.error() {
        anyhow::bail!("{banner}");
    }

    println!("deleted: {filename}");
    Ok(())
}

/// Interactive conversation console
async fn run_console(service: Arc<ApiClient>, config: &Config) -> anyhow::Result<()> {
    let orchestrator = TurnOrchestrator::new(Arc::clone(&service));
    let corpus = CorpusManager::new(Arc::clone(&service));
    let mut state = SessionState::new();
    let mut capture = AudioCaptureSession::new();

    println!("parley — type a question, or :help for commands");
    if !config.voice.enabled {
        println!("(voice disabled)");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    // Turns already printed to the console
    let mut rendered = 0;

    loop {
        let prompt = if capture.is_capturing() {
            "recording (:record to finish)> "
        } else {
            "> "
        };
        stdout.write_all(prompt.as_bytes()).await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();

        match line {
            "" => {}
            ":quit" | ":q" => break,
            ":help" => print_help(),
            ":record" => {
                if !config.voice.enabled {
                    println!("voice is disabled");
                    continue;
                }
                toggle_recording(&orchestrator, &mut capture, &mut state).await;
            }
            ":play" => {
                if !config.voice.enabled {
                    println!("voice is disabled");
                    continue;
                }
                match state.pending_audio() {
                    Some(clip) => {
                        if let Err(e) = AudioPlayback::new().play_wav(&clip.bytes) {
                            state.set_error(format!("Error playing audio: {e}"));
                        }
                    }
                    None => println!("no response audio yet"),
                }
            }
            ":docs" => {
                if state.documents().is_empty() {
                    println!("no documents uploaded");
                }
                for name in state.documents() {
                    println!("  {name}");
                }
            }
            ":dismiss" => state.clear_error(),
            _ if line.starts_with(":upload") => {
                let paths: Vec<PathBuf> = line
                    .split_whitespace()
                    .skip(1)
                    .map(PathBuf::from)
                    .collect();
                upload_paths(&corpus, &mut state, &paths).await;
            }
            _ if line.starts_with(":delete") => {
                match line.split_whitespace().nth(1) {
                    Some(name) => {
                        corpus.delete(&mut state, name).await;
                    }
                    None => println!("usage: :delete <filename>"),
                }
            }
            _ if line.starts_with(':') => println!("unknown command, :help for commands"),
            question => {
                orchestrator.text_turn(&mut state, question).await;
            }
        }

        rendered = render(&state, rendered);
    }

    Ok(())
}

fn print_help() {
    println!("  <text>            ask a question");
    println!("  :record           start/finish a voice recording");
    println!("  :play             play the last response audio");
    println!("  :upload <paths>   upload documents to the corpus");
    println!("  :delete <name>    delete a document");
    println!("  :docs             list uploaded documents");
    println!("  :dismiss          dismiss the error banner");
    println!("  :quit             exit");
}

/// Start capture, or finish it and feed the clip to the voice path
async fn toggle_recording(
    orchestrator: &TurnOrchestrator<ApiClient>,
    capture: &mut AudioCaptureSession,
    state: &mut SessionState,
) {
    if capture.is_capturing() {
        match capture.stop() {
            Ok(Some(clip)) => {
                state.set_pipeline(PipelineState::Idle);
                orchestrator.voice_turn(state, clip).await;
            }
            Ok(None) => state.set_pipeline(PipelineState::Idle),
            Err(e) => {
                state.set_pipeline(PipelineState::Idle);
                state.set_error(format!("Error finishing recording: {e}"));
            }
        }
    } else {
        if state.pipeline() != PipelineState::Idle {
            return;
        }
        match capture.start() {
            Ok(()) => {
                state.set_pipeline(PipelineState::Capturing);
                state.clear_error();
                println!("recording... :record again to finish");
            }
            Err(e) => {
                state.set_error(format!(
                    "Microphone access denied. Please check your audio devices. ({e})"
                ));
            }
        }
    }
}

async fn upload_paths(
    corpus: &CorpusManager<ApiClient>,
    state: &mut SessionState,
    paths: &[PathBuf],
) {
    if paths.is_empty() {
        println!("usage: :upload <paths>");
        return;
    }

    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        match UploadFile::from_path(path) {
            Ok(file) => files.push(file),
            Err(e) => {
                state.set_error(format!("Error reading {}: {e}", path.display()));
                return;
            }
        }
    }

    if corpus.upload(state, &files).await {
        println!("{} document(s) in corpus", state.documents().len());
    }
}

/// Print turns appended since the last render, then the error banner
fn render(state: &SessionState, rendered: usize) -> usize {
    for turn in &state.turns()[rendered..] {
        match turn.role {
            Role::User => println!("you: {}", turn.content),
            Role::Assistant => {
                println!("assistant: {}", turn.content);
                if !turn.sources.is_empty() {
                    println!("  sources: {}", turn.sources.join(", "));
                }
            }
        }
    }

    if let Some(banner) = state.error() {
        println!("! {banner}  (:dismiss to clear)");
    }

    state.turns().len()
}
