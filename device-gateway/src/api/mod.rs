//! REST operations against the hub.
//!
//! Every public method makes at most one request and returns an
//! [`ApiResponse`]: nothing here returns `Err` or panics on a bad network,
//! a non-2xx status or an unexpected body. There are no retries; callers
//! decide what to do with a failed response.

mod automations;
mod devices;
mod rooms;
mod telemetry;
mod voice;

pub use voice::DEFAULT_AUDIO_MIME;

use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use smart_home_common::ApiResponse;

use crate::client::DeviceGatewayClient;
use crate::error::{Error, Result};

impl DeviceGatewayClient {
    /// GET `segments` with optional query pairs; absent values are left out.
    pub(crate) async fn get_json(
        &self,
        segments: &[&str],
        query: &[(&str, Option<String>)],
    ) -> Result<Value> {
        let url = self.endpoint(segments)?;
        let present: Vec<(&str, &str)> = query
            .iter()
            .filter_map(|(k, v)| v.as_deref().map(|v| (*k, v)))
            .collect();

        let request = self.http_client.get(url).query(&present);
        read_json(send(request).await?).await
    }

    /// Send `body` as JSON with `method`.
    pub(crate) async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> Result<Value> {
        let url = self.endpoint(segments)?;
        let request = self.http_client.request(method, url).json(body);
        read_json(send(request).await?).await
    }

    /// POST with no body.
    pub(crate) async fn post_empty(&self, segments: &[&str]) -> Result<Value> {
        let url = self.endpoint(segments)?;
        read_json(send(self.http_client.post(url)).await?).await
    }
}

/// Send the request and turn non-2xx statuses into [`Error::Status`].
pub(crate) async fn send(request: RequestBuilder) -> Result<Response> {
    let response = request.send().await?;
    let status = response.status();
    tracing::debug!("{} {}", status.as_u16(), response.url());

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Status { status, body });
    }
    Ok(response)
}

/// Body as JSON; an empty body reads as `null`.
async fn read_json(response: Response) -> Result<Value> {
    let bytes = response.bytes().await?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(&bytes)?)
}

/// Decode `key` out of a wrapper object like `{"devices": [...]}`, or the whole
/// body when the hub answers without the wrapper.
pub(crate) fn extract<T: DeserializeOwned>(body: Value, key: &str) -> Result<T> {
    let inner = match body {
        Value::Object(mut map) if map.contains_key(key) => map.remove(key).unwrap_or(Value::Null),
        other => other,
    };
    Ok(serde_json::from_value(inner)?)
}

/// Fold an internal result into the public response shape, logging failures.
pub(crate) fn respond<T>(operation: &str, result: Result<T>) -> ApiResponse<T> {
    match result {
        Ok(data) => ApiResponse::ok(data),
        Err(e) => {
            tracing::warn!("{} failed: {}", operation, e);
            ApiResponse::err(e.to_string())
        }
    }
}
