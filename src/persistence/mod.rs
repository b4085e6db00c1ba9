//! Talking to the parking-lot backend: loading a layout, flushing local
//! changes to floors, areas and spots, and resetting a lot's map.

pub mod executor;
pub mod http;
pub mod loader;
pub mod memory;
pub mod plan;
pub mod types;

use std::future::Future;

pub use executor::{execute, CreatedArea, CreatedFloor, FailedEntity, SaveFailure, SaveReport};
pub use http::HttpBackend;
pub use loader::{delete_backend_floors, load_layout};
pub use memory::{BackendCall, MemoryBackend};
pub use plan::{
    build_plan, AreaStep, AreaUpdateStep, FloorStep, FloorTarget, PlanWarning, SavePlan,
};
pub use types::{
    AreaCreateRequest, AreaRecord, AreaUpdateRequest, CapacityRequest, Created,
    FloorCreateRequest, FloorRecord, FloorUpdateRequest, SpotRecord, SpotRequest,
};

use crate::models::{LotStatus, ParkingLot};

// ── Errors ───────────────────────────────────────────────────────────────────

/// A failed call to the layout backend.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BackendError {
    /// The request never produced a response (connect, timeout, TLS, ...).
    #[error("request failed: {0}")]
    Http(String),

    /// The server answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),

    /// A fan-out task panicked or was cancelled.
    #[error("background task failed: {0}")]
    Task(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Http(e.to_string())
        }
    }
}

impl From<tokio::task::JoinError> for BackendError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::Task(e.to_string())
    }
}

// ── Collaborator ─────────────────────────────────────────────────────────────

/// The remote store of parking lots, floors, areas and spots.
///
/// Implementations are cheap to clone so the loader can fan requests out
/// across tasks.
pub trait LayoutBackend {
    fn get_parking_lot(
        &self,
        lot_id: &str,
    ) -> impl Future<Output = Result<ParkingLot, BackendError>> + Send;

    fn update_lot_status(
        &self,
        lot_id: &str,
        status: LotStatus,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    fn list_floors(
        &self,
        lot_id: &str,
    ) -> impl Future<Output = Result<Vec<FloorRecord>, BackendError>> + Send;

    fn create_floor(
        &self,
        lot_id: &str,
        request: &FloorCreateRequest,
    ) -> impl Future<Output = Result<Created, BackendError>> + Send;

    fn update_floor(
        &self,
        floor_id: &str,
        request: &FloorUpdateRequest,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    fn delete_floor(&self, floor_id: &str)
        -> impl Future<Output = Result<(), BackendError>> + Send;

    fn list_areas(
        &self,
        floor_id: &str,
    ) -> impl Future<Output = Result<Vec<AreaRecord>, BackendError>> + Send;

    fn create_area(
        &self,
        floor_id: &str,
        request: &AreaCreateRequest,
    ) -> impl Future<Output = Result<Created, BackendError>> + Send;

    fn update_area(
        &self,
        area_id: &str,
        request: &AreaUpdateRequest,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// Delete an area together with its spots.
    fn delete_area(&self, area_id: &str)
        -> impl Future<Output = Result<(), BackendError>> + Send;

    fn list_spots(
        &self,
        area_id: &str,
    ) -> impl Future<Output = Result<Vec<SpotRecord>, BackendError>> + Send;

    fn delete_spot(&self, spot_id: &str)
        -> impl Future<Output = Result<(), BackendError>> + Send;
}
