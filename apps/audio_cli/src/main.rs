use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use client_core::{
    config::{load_settings, parse_api_url},
    AudioFile, AudioServiceApi, ClientEvent, HttpAudioService, SessionController, SessionState,
    UploadController, UploadPhase, UploadSnapshot,
};
use shared::domain::AuthMode;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    Login,
    Register,
}

impl From<Mode> for AuthMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Login => AuthMode::Login,
            Mode::Register => AuthMode::Register,
        }
    }
}

/// Sign in to the audio service and optionally upload one WAV file.
#[derive(Parser, Debug)]
struct Args {
    /// Overrides `api_url` from audio_client.toml / AUDIO_API_URL.
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    username: String,
    #[arg(long, value_enum, default_value_t = Mode::Login)]
    mode: Mode,
    #[arg(long)]
    file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    let args = Args::parse();

    let api_url = args
        .server_url
        .clone()
        .unwrap_or_else(|| load_settings().api_url);
    let api_url = parse_api_url(&api_url)?;
    let api: Arc<dyn AudioServiceApi> = Arc::new(HttpAudioService::new(api_url.as_str())?);

    let session = SessionController::new(api.clone());
    let uploads = UploadController::new(api, session.clone());
    let renderer = tokio::spawn(render_events(session.subscribe_events()));

    let outcome = run(&args, &session, &uploads).await;

    uploads.reset().await;
    session.logout().await;
    drop(uploads);
    drop(session);
    renderer.await.context("event renderer stopped unexpectedly")?;

    outcome
}

async fn run(
    args: &Args,
    session: &SessionController,
    uploads: &UploadController,
) -> Result<()> {
    if args.username.is_empty() {
        return Err(anyhow!("--username must not be empty"));
    }

    let signed_in = session
        .authenticate(&args.username, args.mode.into())
        .await;
    if let Some(message) = signed_in.last_error {
        return Err(anyhow!(message));
    }

    let Some(path) = &args.file else {
        return Ok(());
    };
    let file = AudioFile::from_path(path).await?;
    if !file.has_accepted_extension() {
        warn!(
            filename = %file.filename,
            "file does not look like a WAV file; the service will likely reject it"
        );
    }

    uploads.select_file(file).await;
    let attempt = uploads.upload().await;
    match attempt {
        UploadSnapshot {
            phase: UploadPhase::Succeeded,
            ..
        } => Ok(()),
        UploadSnapshot {
            last_error: Some(message),
            ..
        } => Err(anyhow!(message)),
        other => Err(anyhow!("upload did not complete (state {:?})", other.phase)),
    }
}

async fn render_events(mut rx: broadcast::Receiver<ClientEvent>) {
    loop {
        match rx.recv().await {
            Ok(event) => render(&event),
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "renderer fell behind; some state changes were not shown");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

fn render(event: &ClientEvent) {
    match event {
        ClientEvent::SessionChanged(snapshot) => match &snapshot.state {
            SessionState::Authenticated(session) => {
                println!("Welcome, {}!", session.username);
                println!("User ID: {}", session.user_id());
            }
            SessionState::Anonymous => match &snapshot.last_error {
                Some(message) => println!("{message}"),
                None => println!("Logged out."),
            },
        },
        ClientEvent::UploadChanged(snapshot) => match snapshot.phase {
            UploadPhase::Idle => {}
            UploadPhase::FileSelected => {
                if let Some(name) = &snapshot.selected_file {
                    println!("Selected {name}");
                }
            }
            UploadPhase::Uploading => println!("Uploading..."),
            UploadPhase::Succeeded => {
                if let Some(url) = &snapshot.result_url {
                    println!("Download URL: {url}");
                }
            }
            UploadPhase::Failed => {
                if let Some(message) = &snapshot.last_error {
                    println!("{message}");
                }
            }
        },
    }
}
