//! Replaying a JSON script of [`EditorCommand`]s.
//!
//! A script is either a bare JSON array of commands or an object naming its
//! commands and, optionally, an `offlineLot`. With an offline lot the
//! commands run against a [`MemoryBackend`](crate::persistence::MemoryBackend)
//! seeded with it; otherwise they go to the configured HTTP API.
//!
//! ```json
//! {
//!   "offlineLot": { "id": "lot-1", "totalFloors": 2,
//!                   "capacities": [{ "vehicleType": "CAR", "capacity": 10 }] },
//!   "commands": [
//!     { "command": "open", "lotId": "lot-1" },
//!     { "command": "set_mode", "mode": "area" }
//!   ]
//! }
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::commands::{dispatch, session, EditorCommand};
use crate::error::AppError;
use crate::models::ParkingLot;
use crate::persistence::LayoutBackend;
use crate::state::AppState;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Script {
    #[serde(default)]
    pub offline_lot: Option<ParkingLot>,
    pub commands: Vec<EditorCommand>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ScriptFile {
    Commands(Vec<EditorCommand>),
    Full(Script),
}

impl Script {
    pub fn parse(text: &str) -> Result<Self, AppError> {
        let file: ScriptFile = serde_json::from_str(text)
            .map_err(|e| AppError::InvalidInput(format!("invalid script: {e}")))?;
        Ok(match file {
            ScriptFile::Commands(commands) => Script {
                offline_lot: None,
                commands,
            },
            ScriptFile::Full(script) => script,
        })
    }

    pub fn load(path: &Path) -> Result<Self, AppError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| AppError::Io(format!("cannot read {}: {e}", path.display())))?;
        Self::parse(&text)
    }
}

// ── Command line ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct ReplayArgs {
    pub script: PathBuf,
    pub config: Option<PathBuf>,
    /// Stop at the first failing command.
    pub fail_fast: bool,
}

pub fn usage() -> &'static str {
    "usage: parkmap [--config PATH] [--fail-fast] <script.json>\n"
}

/// Parse arguments (without the program name).
pub fn parse_args<I>(args: I) -> Result<ReplayArgs, String>
where
    I: IntoIterator<Item = String>,
{
    let mut script: Option<PathBuf> = None;
    let mut config: Option<PathBuf> = None;
    let mut fail_fast = false;

    let mut args = args.into_iter();
    while let Some(a) = args.next() {
        match a.as_str() {
            "--config" => {
                let v = args.next().ok_or("--config requires PATH")?;
                config = Some(PathBuf::from(v));
            }
            "--fail-fast" => fail_fast = true,
            s if s.starts_with("--") => return Err(format!("unknown option {s}")),
            _ if script.is_some() => return Err(format!("unexpected argument {a}")),
            _ => script = Some(PathBuf::from(a)),
        }
    }

    Ok(ReplayArgs {
        script: script.ok_or("missing script path")?,
        config,
        fail_fast,
    })
}

// ── Replay ────────────────────────────────────────────────────────────────────

/// Run `commands` in order, writing one JSON line per command to `out`,
/// then a `final` line with the editor snapshot if an editor is open.
/// Returns the number of commands that failed.
pub async fn replay<B, W>(
    state: &AppState,
    backend: &B,
    commands: Vec<EditorCommand>,
    fail_fast: bool,
    out: &mut W,
) -> Result<usize, AppError>
where
    B: LayoutBackend + Clone + Send + Sync + 'static,
    W: Write,
{
    let total = commands.len();
    let mut failures = 0;
    for (step, command) in commands.into_iter().enumerate() {
        let line = match dispatch(state, backend, command).await {
            Ok(result) => json!({ "step": step, "ok": result }),
            Err(e) => {
                warn!(step, error = %e, "command failed");
                failures += 1;
                json!({ "step": step, "error": e })
            }
        };
        writeln!(out, "{line}")?;
        if fail_fast && failures > 0 {
            break;
        }
    }
    if let Ok(snapshot) = session::get_snapshot(&state.editor) {
        writeln!(out, "{}", json!({ "final": snapshot }))?;
    }
    info!(total, failures, "replay finished");
    Ok(failures)
}
