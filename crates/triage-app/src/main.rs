//! Triage application binary - composition root.
//!
//! 1. Parse CLI flags and load configuration from TOML
//! 2. Load the symptom vocabulary and doctor table
//! 3. Wire the lazily loaded model, session store and orchestrator
//! 4. Run a line-oriented chat on stdin/stdout

mod cli;

use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinError;

use triage_chat::{ChatError, TriageOrchestrator, TriageReply};
use triage_core::config::TriageConfig;
use triage_core::error::TriageError;
use triage_knowledge::{DoctorTable, SymptomVocabulary};
use triage_model::{DiseaseClassifier, JsonArtifactLoader, ModelHandle};
use triage_session::SessionStore;

use cli::CliArgs;

/// Read the config file, keeping the failure so it can be reported once
/// logging is up.
fn load_config(path: &Path) -> (TriageConfig, Option<TriageError>) {
    match TriageConfig::load(path) {
        Ok(config) => (config, None),
        Err(e) => (TriageConfig::default(), Some(e)),
    }
}

/// Build the orchestrator from validated configuration.
fn build_orchestrator(
    config: &TriageConfig,
) -> Result<TriageOrchestrator, Box<dyn std::error::Error>> {
    let symptoms_path = config.resolve_path(&config.reference.symptoms_path);
    let vocabulary = SymptomVocabulary::from_json_file(&symptoms_path)?;
    let doctors_path = config.resolve_path(&config.reference.doctors_path);
    let doctors = DoctorTable::from_json_file(&doctors_path)?;

    // Artifacts are read on the first diagnosis, not here.
    let model = Arc::new(ModelHandle::new(JsonArtifactLoader::from_config(config)));

    Ok(TriageOrchestrator::new(
        config,
        Arc::new(SessionStore::new(config.session.token_bytes)),
        Arc::new(vocabulary),
        DiseaseClassifier::new(model),
        Arc::new(doctors),
    ))
}

/// Unwrap a blocking turn's join result.
fn join_turn(
    joined: Result<Result<TriageReply, ChatError>, JoinError>,
) -> Result<TriageReply, ChatError> {
    joined.unwrap_or_else(|e| {
        tracing::error!(error = %e, "Chat turn aborted");
        Err(ChatError::TurnAborted(e.to_string()))
    })
}

/// Run one turn off the async runtime; the orchestrator blocks on locks and
/// model loading.
async fn run_turn(
    orchestrator: &Arc<TriageOrchestrator>,
    token: Option<String>,
    line: String,
) -> Result<TriageReply, ChatError> {
    let orch = Arc::clone(orchestrator);
    let joined =
        tokio::task::spawn_blocking(move || orch.handle_message(token.as_deref(), &line)).await;
    join_turn(joined)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let (mut config, config_error) = load_config(&config_file);
    args.apply(&mut config);

    // Tracing. RUST_LOG wins over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.general.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting triage v{}", env!("CARGO_PKG_VERSION"));
    match config_error {
        Some(e) => tracing::warn!(
            path = %config_file.display(),
            error = %e,
            "Failed to load config, using defaults"
        ),
        None => tracing::info!(path = %config_file.display(), "Configuration loaded"),
    }
    config.validate()?;

    let orchestrator = Arc::new(build_orchestrator(&config)?);

    let greeting = orchestrator.start_session()?;
    println!("{}", greeting.message);
    let mut token = Some(greeting.token.as_str().to_string());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim().to_string();
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            break;
        }
        if line.is_empty() {
            continue;
        }

        match run_turn(&orchestrator, token.clone(), line).await {
            Ok(reply) => {
                println!("{}", reply.message);
                token = Some(reply.token.as_str().to_string());
            }
            Err(e) => {
                tracing::debug!(error = %e, "Turn rejected");
                println!("{}", e.user_message());
                if e.requires_restart() {
                    token = None;
                }
            }
        }
    }

    orchestrator.shutdown()?;
    tracing::info!("Triage session ended");
    Ok(())
}
