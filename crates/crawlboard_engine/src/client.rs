use std::time::Duration;

use crawlboard_core::{Record, RecordId, Status};
use engine_logging::engine_debug;
use reqwest::header::CONTENT_TYPE;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::{ApiError, FailureKind};

pub const DEFAULT_API_KEY_HEADER: &str = "X-API-SECRET";

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Shared secret attached to every request when set.
    pub api_key: Option<String>,
    pub api_key_header: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            api_key: None,
            api_key_header: DEFAULT_API_KEY_HEADER.to_string(),
        }
    }
}

/// REST surface of the crawl backend.
#[async_trait::async_trait]
pub trait CrawlApi: Send + Sync {
    /// `GET /urls`
    async fn list_records(&self) -> Result<Vec<Record>, ApiError>;
    /// `GET /urls/{id}`
    async fn get_record(&self, id: &RecordId) -> Result<Record, ApiError>;
    /// `POST /urls`
    async fn create_record(&self, url: &str) -> Result<Record, ApiError>;
    /// `POST /urls/{id}/reanalyze`
    async fn reanalyze_record(&self, id: &RecordId) -> Result<Record, ApiError>;
    /// `POST /urls/{id}/stop`
    async fn stop_record(&self, id: &RecordId) -> Result<Record, ApiError>;
    /// `DELETE /urls/{id}`
    async fn delete_record(&self, id: &RecordId) -> Result<(), ApiError>;
}

/// Start and stop answer with either the whole record or only its new
/// status.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecordReply {
    Full(Record),
    StatusOnly { status: Status },
}

#[derive(Debug, Clone)]
pub struct ReqwestApi {
    settings: ApiSettings,
    base_url: Url,
    client: reqwest::Client,
}

impl ReqwestApi {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        let base_url = Url::parse(&settings.base_url)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::new(
                FailureKind::InvalidUrl,
                format!("{} cannot be used as a base url", settings.base_url),
            ));
        }
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self {
            settings,
            base_url,
            client,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::new(FailureKind::InvalidUrl, "base url cannot have a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let request = match &self.settings.api_key {
            Some(key) => request.header(self.settings.api_key_header.as_str(), key.as_str()),
            None => request,
        };
        let response = request.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            return Err(ApiError::new(
                FailureKind::HttpStatus(status.as_u16()),
                rejection_message(status, &body),
            ));
        }
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = self.send(request).await?;
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        serde_json::from_slice(&body)
            .map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))
    }

    /// A status-only acknowledgement is followed by a fetch of the record.
    async fn send_for_record(
        &self,
        request: RequestBuilder,
        id: &RecordId,
    ) -> Result<Record, ApiError> {
        match self.send_json::<RecordReply>(request).await? {
            RecordReply::Full(record) => Ok(record),
            RecordReply::StatusOnly { status } => {
                engine_debug!("id={} acknowledged as {}; fetching record", id, status);
                self.get_record(id).await
            }
        }
    }
}

#[async_trait::async_trait]
impl CrawlApi for ReqwestApi {
    async fn list_records(&self) -> Result<Vec<Record>, ApiError> {
        let url = self.endpoint(&["urls"])?;
        // A backend with no records may answer `null`.
        let records: Option<Vec<Record>> = self.send_json(self.client.get(url)).await?;
        Ok(records.unwrap_or_default())
    }

    async fn get_record(&self, id: &RecordId) -> Result<Record, ApiError> {
        let url = self.endpoint(&["urls", id.as_str()])?;
        self.send_json(self.client.get(url)).await
    }

    async fn create_record(&self, url: &str) -> Result<Record, ApiError> {
        let endpoint = self.endpoint(&["urls"])?;
        let body = serde_json::json!({ "url": url }).to_string();
        let request = self
            .client
            .post(endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        self.send_json(request).await
    }

    async fn reanalyze_record(&self, id: &RecordId) -> Result<Record, ApiError> {
        let url = self.endpoint(&["urls", id.as_str(), "reanalyze"])?;
        self.send_for_record(self.client.post(url), id).await
    }

    async fn stop_record(&self, id: &RecordId) -> Result<Record, ApiError> {
        let url = self.endpoint(&["urls", id.as_str(), "stop"])?;
        self.send_for_record(self.client.post(url), id).await
    }

    async fn delete_record(&self, id: &RecordId) -> Result<(), ApiError> {
        let url = self.endpoint(&["urls", id.as_str()])?;
        self.send(self.client.delete(url)).await?;
        Ok(())
    }
}

/// Prefer the backend's `{"error": "..."}` text over the bare status line.
fn rejection_message(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("error")
                .and_then(|error| error.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| status.to_string())
        })
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ApiError::new(FailureKind::Decode, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_keeps_base_path_and_escapes_ids() {
        let api = ReqwestApi::new(ApiSettings {
            base_url: "http://localhost:8080/api/".to_string(),
            ..ApiSettings::default()
        })
        .unwrap();
        let url = api.endpoint(&["urls", "a b", "stop"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/urls/a%20b/stop");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = ReqwestApi::new(ApiSettings {
            base_url: "not a url".to_string(),
            ..ApiSettings::default()
        })
        .unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidUrl);
    }

    #[test]
    fn rejection_message_prefers_error_field() {
        let message = rejection_message(StatusCode::BAD_REQUEST, br#"{"error":"invalid input"}"#);
        assert_eq!(message, "invalid input");
        let message = rejection_message(StatusCode::NOT_FOUND, b"");
        assert_eq!(message, "Not Found");
    }
}
