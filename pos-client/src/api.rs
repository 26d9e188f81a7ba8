//! REST client for the POS backend's layout endpoints.
//!
//! Every route lives under `/api`. Reads return bare JSON arrays of rows;
//! writes return `{ "success": true, "id"?: n }` and failures come back as a
//! non-2xx status with `{ "error": "..." }`.

use std::time::Duration;

use floorplan::doc::{EntityId, MapObject, MapObjectPatch, NewMapObject, NewTable, Table, Zone};
use floorplan::layout::TableLayout;
use reqwest::Method;
use reqwest::header::HeaderValue;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::ClientError;

pub const API_PREFIX: &str = "/api";
pub const ADMIN_SECRET_HEADER: &str = "x-admin-secret";

/// Write acknowledgement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub success: bool,
    /// Row id, present on creates.
    #[serde(default)]
    pub id: Option<EntityId>,
}

#[derive(Serialize)]
struct BatchLayout<'a> {
    layouts: &'a [TableLayout],
}

/// Typed client for the backend's zone, table, and map-object endpoints.
#[derive(Debug, Clone)]
pub struct PosApi {
    http: reqwest::Client,
    base_url: String,
    admin_secret: Option<HeaderValue>,
}

impl PosApi {
    /// Build a client from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidBaseUrl`] for a non-HTTP base URL,
    /// [`ClientError::InvalidHeader`] if the secret is not a valid header
    /// value, and [`ClientError::HttpClientBuild`] if the TLS stack fails to
    /// initialize.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let base_url = config.base_url.trim_end_matches('/').to_owned();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::InvalidBaseUrl(base_url));
        }
        let admin_secret = config.admin_secret.as_deref().map(HeaderValue::from_str).transpose()?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ClientError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url, admin_secret })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // --- Zones ---

    pub async fn list_zones(&self) -> Result<Vec<Zone>, ClientError> {
        self.call(Method::GET, "/zones", None).await
    }

    pub async fn create_zone(&self, name: &str) -> Result<Ack, ClientError> {
        self.ack(Method::POST, "/zones", Some(serde_json::json!({ "name": name }))).await
    }

    pub async fn delete_zone(&self, id: EntityId) -> Result<Ack, ClientError> {
        self.ack(Method::DELETE, &format!("/zones/{id}"), None).await
    }

    // --- Tables ---

    pub async fn list_tables(&self) -> Result<Vec<Table>, ClientError> {
        self.call(Method::GET, "/tables", None).await
    }

    /// Create a table. A hut is always created with four seats.
    pub async fn create_table(&self, table: NewTable) -> Result<Ack, ClientError> {
        let body = serde_json::to_value(table.normalized())?;
        self.ack(Method::POST, "/tables", Some(body)).await
    }

    pub async fn delete_table(&self, id: EntityId) -> Result<Ack, ClientError> {
        self.ack(Method::DELETE, &format!("/tables/{id}"), None).await
    }

    /// Set a table's service status (`available`, `occupied`, ...).
    pub async fn set_table_status(&self, id: EntityId, status: &str) -> Result<Ack, ClientError> {
        let body = serde_json::json!({ "status": status });
        self.ack(Method::POST, &format!("/tables/{id}/status"), Some(body)).await
    }

    /// Ask staff to bring the bill to `table_name`.
    pub async fn call_bill(&self, table_name: &str) -> Result<Ack, ClientError> {
        let path = format!("/tables/{}/call-bill", urlencoding::encode(table_name));
        self.ack(Method::POST, &path, Some(Value::Object(serde_json::Map::new()))).await
    }

    /// Write geometry, shape, and seats for many tables in one transaction.
    pub async fn batch_layout(&self, layouts: &[TableLayout]) -> Result<Ack, ClientError> {
        let body = serde_json::to_value(BatchLayout { layouts })?;
        self.ack(Method::POST, "/tables/batch-layout", Some(body)).await
    }

    // --- Map objects ---

    pub async fn list_objects(&self) -> Result<Vec<MapObject>, ClientError> {
        self.call(Method::GET, "/map-objects", None).await
    }

    pub async fn create_object(&self, object: &NewMapObject) -> Result<Ack, ClientError> {
        let body = serde_json::to_value(object)?;
        self.ack(Method::POST, "/map-objects", Some(body)).await
    }

    /// Update only the fields present in `patch`.
    pub async fn patch_object(&self, id: EntityId, patch: &MapObjectPatch) -> Result<Ack, ClientError> {
        let body = serde_json::to_value(patch)?;
        self.ack(Method::PATCH, &format!("/map-objects/{id}"), Some(body)).await
    }

    pub async fn delete_object(&self, id: EntityId) -> Result<Ack, ClientError> {
        self.ack(Method::DELETE, &format!("/map-objects/{id}"), None).await
    }

    // --- Transport ---

    async fn ack(&self, method: Method, path: &str, body: Option<Value>) -> Result<Ack, ClientError> {
        let ack: Ack = self.call(method, path, body).await?;
        if !ack.success {
            return Err(ClientError::Rejected { path: path.to_owned() });
        }
        Ok(ack)
    }

    async fn call<T: DeserializeOwned>(&self, method: Method, path: &str, body: Option<Value>) -> Result<T, ClientError> {
        let url = format!("{}{API_PREFIX}{path}", self.base_url);
        let is_write = method != Method::GET;
        let mut request = self.http.request(method.clone(), url);
        if is_write {
            if let Some(secret) = &self.admin_secret {
                request = request.header(ADMIN_SECRET_HEADER, secret.clone());
            }
        }
        if let Some(json) = body {
            request = request.json(&json);
        }

        tracing::debug!(%method, path, "pos api request");
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::warn!(%method, path, status = status.as_u16(), "pos api request failed");
            return Err(ClientError::Status {
                method: method.to_string(),
                path: path.to_owned(),
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        serde_json::from_str(&text).map_err(|source| ClientError::Decode { path: path.to_owned(), source })
    }
}

/// The backend's `{ "error": "..." }` message, or the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(ToOwned::to_owned))
        .unwrap_or_else(|| body.trim().to_owned())
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
