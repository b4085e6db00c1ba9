pub mod commands;
pub mod config;
pub mod editor;
pub mod error;
pub mod layout;
pub mod models;
pub mod persistence;
pub mod replay;
pub mod state;

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;

use config::AppConfig;
use error::AppError;
use persistence::{HttpBackend, MemoryBackend};
use replay::Script;
use state::AppState;

/// Directory the log file is written to: `[logging] directory` when set,
/// otherwise the OS data dir:
///   Linux    ~/.local/share/parkmap/
///   macOS    ~/Library/Application Support/parkmap/
///   Windows  %LOCALAPPDATA%\parkmap\
pub fn log_dir(config: &AppConfig) -> PathBuf {
    config
        .logging
        .directory
        .clone()
        .unwrap_or_else(|| dirs::data_local_dir().unwrap_or_default().join("parkmap"))
}

/// Install the global tracing subscriber, writing to `parkmap.log`.
///
/// The level comes from `RUST_LOG` and defaults to INFO. Keep the returned
/// guard alive for as long as logs should be flushed.
pub fn init_tracing(config: &AppConfig) -> Result<WorkerGuard, AppError> {
    let dir = log_dir(config);
    std::fs::create_dir_all(&dir)?;

    let file_appender = tracing_appender::rolling::never(&dir, "parkmap.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // A subscriber may already be installed (e.g. by an embedding host).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(non_blocking)
        .try_init();

    Ok(guard)
}

/// Entry point of the `parkmap` binary: replay the script named on the
/// command line and print one JSON result line per command.
pub fn run() -> Result<(), AppError> {
    let args = match replay::parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(msg) => return Err(AppError::InvalidInput(format!("{msg}\n{}", replay::usage()))),
    };

    let config = match &args.config {
        Some(path) => config::load(path)?,
        None => config::load_default()?,
    };
    let _tracing_guard = init_tracing(&config)?;
    tracing::info!(script = %args.script.display(), "parkmap starting");

    let script = Script::load(&args.script)?;
    let state = AppState::new(config);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let mut stdout = std::io::stdout().lock();
    let failures = match script.offline_lot {
        Some(lot) => {
            let backend = MemoryBackend::new(lot);
            runtime.block_on(replay::replay(
                &state,
                &backend,
                script.commands,
                args.fail_fast,
                &mut stdout,
            ))?
        }
        None => {
            let backend = HttpBackend::new(&state.config.api)?;
            runtime.block_on(replay::replay(
                &state,
                &backend,
                script.commands,
                args.fail_fast,
                &mut stdout,
            ))?
        }
    };

    if failures > 0 {
        return Err(AppError::InvalidInput(format!(
            "{failures} command(s) failed"
        )));
    }
    Ok(())
}
