//! Application-level error type returned by all command handlers.
//!
//! `AppError` is serialized to `{ kind, message }` JSON payloads so a host UI
//! can pattern-match on a stable `kind` string and show `message` as the
//! user-facing notice.

use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::editor::LayoutError;
use crate::persistence::{BackendError, SaveReport};

/// Top-level error returned by command handlers.
///
/// Serialized as `{ "kind": "<variant>", "message": "<human-readable text>" }`.
/// A failed save also carries the partial `report`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Drawing more spots than the lot has registered.
    #[error("{0}")]
    CapacityExceeded(String),

    /// A rectangle is below the minimum size for what it was meant to be.
    #[error("{0}")]
    GeometryTooSmall(String),

    /// An area has no free grid cell left.
    #[error("{0}")]
    AreaFull(String),

    /// No (or the wrong kind of) area or spot is selected.
    #[error("{0}")]
    InvalidSelection(String),

    /// Structural edits are refused in the lot's current status.
    #[error("{0}")]
    StateLocked(String),

    /// A floor, area or spot call failed during save. `message` names the
    /// entity; `report` lists what was sent before the failure.
    #[error("{message}")]
    BackendCreateFailure {
        message: String,
        report: Box<SaveReport>,
    },

    /// Any other collaborator call failed.
    #[error("{0}")]
    Backend(String),

    /// Input rejected by a floor or area rule.
    #[error("{0}")]
    InvalidInput(String),

    /// A requested floor, area or spot was not found.
    #[error("{0}")]
    NotFound(String),

    /// No layout editor is open.
    #[error("layout editor is not open")]
    EditorClosed,

    /// Configuration could not be read or failed validation.
    #[error("{0}")]
    Config(String),

    /// A generic I/O error, stringified so it remains serializable.
    #[error("{0}")]
    Io(String),

    /// Shared state became unusable (a poisoned lock, an unserializable
    /// result).
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// Stable variant name hosts match on.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CapacityExceeded(_) => "CapacityExceeded",
            Self::GeometryTooSmall(_) => "GeometryTooSmall",
            Self::AreaFull(_) => "AreaFull",
            Self::InvalidSelection(_) => "InvalidSelection",
            Self::StateLocked(_) => "StateLocked",
            Self::BackendCreateFailure { .. } => "BackendCreateFailure",
            Self::Backend(_) => "Backend",
            Self::InvalidInput(_) => "InvalidInput",
            Self::NotFound(_) => "NotFound",
            Self::EditorClosed => "EditorClosed",
            Self::Config(_) => "Config",
            Self::Io(_) => "Io",
            Self::Internal(_) => "Internal",
        }
    }
}

impl Serialize for AppError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let report = match self {
            Self::BackendCreateFailure { report, .. } => Some(report),
            _ => None,
        };
        let fields = if report.is_some() { 3 } else { 2 };
        let mut out = serializer.serialize_struct("AppError", fields)?;
        out.serialize_field("kind", self.kind())?;
        out.serialize_field("message", &self.to_string())?;
        if let Some(report) = report {
            out.serialize_field("report", report)?;
        }
        out.end()
    }
}

impl From<LayoutError> for AppError {
    /// Map editor rule violations onto the user-facing error kinds.
    fn from(e: LayoutError) -> Self {
        let message = e.to_string();
        match e {
            LayoutError::CapacityExceeded { .. } => Self::CapacityExceeded(message),
            LayoutError::GeometryTooSmall { .. } | LayoutError::AreaTooSmall { .. } => {
                Self::GeometryTooSmall(message)
            }
            LayoutError::AreaFull(_) => Self::AreaFull(message),
            LayoutError::InvalidSelection(_) => Self::InvalidSelection(message),
            LayoutError::StateLocked { .. } => Self::StateLocked(message),
            LayoutError::FloorNotFound(_)
            | LayoutError::AreaNotFound(_)
            | LayoutError::SpotNotFound(_) => Self::NotFound(message),
            LayoutError::VehicleTypeNotAllowed(_)
            | LayoutError::NoVehicleTypeSelected
            | LayoutError::FloorLimitReached { .. }
            | LayoutError::LastFloor
            | LayoutError::FloorPersisted(_)
            | LayoutError::EmptySourceFloor(_)
            | LayoutError::InvalidInput(_) => Self::InvalidInput(message),
        }
    }
}

impl From<BackendError> for AppError {
    fn from(e: BackendError) -> Self {
        Self::Backend(e.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
