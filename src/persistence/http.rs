//! REST implementation of [`LayoutBackend`] on top of `reqwest`.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::types::{Envelope, LotStatusUpdate};
use super::{
    AreaCreateRequest, AreaRecord, AreaUpdateRequest, BackendError, Created, FloorCreateRequest,
    FloorRecord, FloorUpdateRequest, LayoutBackend, SpotRecord,
};
use crate::config::ApiConfig;
use crate::models::{LotStatus, ParkingLot};

/// HTTP client bound to one API base URL.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &ApiConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, BackendError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(BackendError::Status {
            status: status.as_u16(),
            message: error_message(&body)
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_else(|| "request rejected".to_string()),
        })
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, BackendError> {
        let response = self.send(request).await?;
        let bytes = response.bytes().await?;
        let envelope: Envelope<T> = serde_json::from_slice(&bytes)
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        Ok(envelope.into_inner())
    }
}

/// Pull a human-readable message out of an error body: a JSON `message` or
/// `error` field, else the trimmed text itself.
fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        for key in ["message", "error"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                return Some(text.to_string());
            }
        }
    }
    Some(trimmed.to_string())
}

impl LayoutBackend for HttpBackend {
    async fn get_parking_lot(&self, lot_id: &str) -> Result<ParkingLot, BackendError> {
        debug!(lot_id, "GET parking lot");
        self.send_json(self.client.get(self.url(&format!("parking-lots/{lot_id}"))))
            .await
    }

    async fn update_lot_status(&self, lot_id: &str, status: LotStatus) -> Result<(), BackendError> {
        debug!(lot_id, status = status.as_token(), "PUT parking lot status");
        let request = self
            .client
            .put(self.url(&format!("parking-lots/{lot_id}")))
            .json(&LotStatusUpdate { status });
        self.send(request).await.map(|_| ())
    }

    async fn list_floors(&self, lot_id: &str) -> Result<Vec<FloorRecord>, BackendError> {
        let request = self
            .client
            .get(self.url("floors"))
            .query(&[("parkingLotId", lot_id)]);
        self.send_json(request).await
    }

    async fn create_floor(
        &self,
        lot_id: &str,
        request: &FloorCreateRequest,
    ) -> Result<Created, BackendError> {
        debug!(lot_id, floor = request.floor_number, "POST floor");
        let builder = self
            .client
            .post(self.url(&format!("floors/{lot_id}")))
            .json(request);
        self.send_json(builder).await
    }

    async fn update_floor(
        &self,
        floor_id: &str,
        request: &FloorUpdateRequest,
    ) -> Result<(), BackendError> {
        debug!(floor_id, floor = request.floor_number, "PUT floor");
        let builder = self
            .client
            .put(self.url(&format!("floors/{floor_id}")))
            .json(request);
        self.send(builder).await.map(|_| ())
    }

    async fn delete_floor(&self, floor_id: &str) -> Result<(), BackendError> {
        debug!(floor_id, "DELETE floor");
        let request = self.client.delete(self.url(&format!("floors/{floor_id}")));
        self.send(request).await.map(|_| ())
    }

    async fn list_areas(&self, floor_id: &str) -> Result<Vec<AreaRecord>, BackendError> {
        let request = self
            .client
            .get(self.url("areas"))
            .query(&[("floorId", floor_id)]);
        self.send_json(request).await
    }

    async fn create_area(
        &self,
        floor_id: &str,
        request: &AreaCreateRequest,
    ) -> Result<Created, BackendError> {
        debug!(floor_id, area = %request.name, "POST area");
        let builder = self
            .client
            .post(self.url(&format!("areas/{floor_id}")))
            .json(request);
        self.send_json(builder).await
    }

    async fn update_area(
        &self,
        area_id: &str,
        request: &AreaUpdateRequest,
    ) -> Result<(), BackendError> {
        debug!(area_id, area = %request.name, "PUT area");
        let builder = self
            .client
            .put(self.url(&format!("areas/{area_id}")))
            .json(request);
        self.send(builder).await.map(|_| ())
    }

    async fn delete_area(&self, area_id: &str) -> Result<(), BackendError> {
        debug!(area_id, "DELETE area");
        let request = self.client.delete(self.url(&format!("areas/{area_id}")));
        self.send(request).await.map(|_| ())
    }

    async fn list_spots(&self, area_id: &str) -> Result<Vec<SpotRecord>, BackendError> {
        let request = self
            .client
            .get(self.url("spots"))
            .query(&[("areaId", area_id)]);
        self.send_json(request).await
    }

    async fn delete_spot(&self, spot_id: &str) -> Result<(), BackendError> {
        debug!(spot_id, "DELETE spot");
        let request = self.client.delete(self.url(&format!("spots/{spot_id}")));
        self.send(request).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(base: &str) -> HttpBackend {
        HttpBackend::new(&ApiConfig {
            base_url: base.to_string(),
            timeout_secs: 5,
        })
        .expect("client")
    }

    #[test]
    fn url_joins_without_double_slashes() {
        let b = backend("http://localhost:8080/api/");
        assert_eq!(b.base_url(), "http://localhost:8080/api");
        assert_eq!(b.url("/floors/7"), "http://localhost:8080/api/floors/7");
        assert_eq!(b.url("areas"), "http://localhost:8080/api/areas");
    }

    #[test]
    fn error_message_prefers_json_message_field() {
        assert_eq!(
            error_message(r#"{"message": "floor exists", "code": 409}"#).as_deref(),
            Some("floor exists")
        );
        assert_eq!(
            error_message(r#"{"error": "bad lot"}"#).as_deref(),
            Some("bad lot")
        );
        assert_eq!(error_message("  gateway down \n").as_deref(), Some("gateway down"));
        assert_eq!(error_message("   "), None);
    }
}
