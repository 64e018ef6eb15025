//! HTTP client for the festival server.
//!
//! Implements every server-facing seam of the library: notification
//! polling, user popups, and chronicle upload and deletion.

use async_trait::async_trait;
use reqwest::header::COOKIE;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response, Url};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use crate::chronicle::{ChronicleFile, ChronicleStore};
use crate::config::{Config, DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_UPLOAD_PATH};
use crate::error::{FestivalError, FestivalResult};
use crate::notification::{Notification, NotificationSource, RawNotification, Watermark};
use crate::popover::PopupSource;

/// Multipart field carrying an uploaded file.
const UPLOAD_FIELD: &str = "file";

#[derive(Serialize)]
struct DeleteImageRequest<'a> {
    #[serde(rename = "fileName")]
    file_name: &'a str,
    festival: &'a str,
    user: &'a str,
}

/// Client for the festival web application.
#[derive(Clone)]
pub struct FestivalClient {
    client: reqwest::Client,
    base_url: String,
    cookie: Option<String>,
    upload_path: String,
}

impl FestivalClient {
    /// Create a client from configuration.
    pub fn new(config: &Config) -> FestivalResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Url::parse(&config.base_url)
            .map_err(|e| FestivalError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;

        debug!(base_url = %config.base_url, "FestivalClient initialized");
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            cookie: config.cookie.clone(),
            upload_path: config.upload_path.clone(),
        })
    }

    /// Create a client with default settings against a custom base URL.
    pub fn with_url(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
            cookie: None,
            upload_path: DEFAULT_UPLOAD_PATH.to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build an endpoint URL from raw path segments, percent-encoding each.
    fn endpoint(&self, segments: &[&str]) -> FestivalResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| FestivalError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| FestivalError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.cookie {
            Some(cookie) => request.header(COOKIE, cookie),
            None => request,
        }
    }

    fn check(endpoint: &str, response: Response) -> FestivalResult<Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(FestivalError::UnexpectedStatus {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            })
        }
    }

    /// `GET /notifications?since=...`
    pub async fn notifications(&self, since: Watermark) -> FestivalResult<Vec<Notification>> {
        let url = self.endpoint(&["notifications"])?;
        debug!(url = %url, since = %since, "Polling notifications");

        let response = self
            .authorized(self.client.get(url).query(&[("since", since.value())]))
            .send()
            .await?;
        let response = Self::check("/notifications", response)?;
        let raw: Vec<RawNotification> = response.json().await?;

        Ok(raw.into_iter().map(Notification::from).collect())
    }

    /// `GET /user/{username}/popup`
    pub async fn user_popup(&self, username: &str) -> FestivalResult<String> {
        let url = self.endpoint(&["user", username.trim(), "popup"])?;
        debug!(url = %url, "Fetching user popup");

        let response = self.authorized(self.client.get(url)).send().await?;
        let response = Self::check("/user/{username}/popup", response)?;
        Ok(response.text().await?)
    }

    /// `POST /chronicle/delete_image`
    pub async fn delete_image(&self, file: &ChronicleFile) -> FestivalResult<String> {
        let url = self.endpoint(&["chronicle", "delete_image"])?;
        let body = DeleteImageRequest {
            file_name: &file.file_name,
            festival: &file.festival_id,
            user: &file.user_id,
        };
        debug!(url = %url, file = %file, "Deleting chronicle image");

        let response = self
            .authorized(self.client.post(url).json(&body))
            .send()
            .await?;
        let response = Self::check("/chronicle/delete_image", response)?;
        Ok(response.text().await?)
    }

    /// Multipart upload to the configured upload path; returns the file reference.
    pub async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> FestivalResult<String> {
        let segments: Vec<&str> = self
            .upload_path
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();
        let url = self.endpoint(&segments)?;
        debug!(url = %url, file = %file_name, size = bytes.len(), "Uploading file");

        let form = Form::new().part(
            UPLOAD_FIELD,
            Part::bytes(bytes).file_name(file_name.to_string()),
        );
        let response = self
            .authorized(self.client.post(url).multipart(form))
            .send()
            .await?;
        let response = Self::check(&self.upload_path, response)?;
        Ok(response.text().await?.trim().to_string())
    }
}

impl Default for FestivalClient {
    fn default() -> Self {
        Self::with_url(DEFAULT_BASE_URL)
    }
}

#[async_trait]
impl NotificationSource for FestivalClient {
    async fn fetch_since(&self, since: Watermark) -> FestivalResult<Vec<Notification>> {
        self.notifications(since).await
    }
}

#[async_trait]
impl PopupSource for FestivalClient {
    async fn user_popup(&self, username: &str) -> FestivalResult<String> {
        FestivalClient::user_popup(self, username).await
    }
}

#[async_trait]
impl ChronicleStore for FestivalClient {
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> FestivalResult<String> {
        FestivalClient::upload(self, file_name, bytes).await
    }

    async fn delete_image(&self, file: &ChronicleFile) -> FestivalResult<String> {
        FestivalClient::delete_image(self, file).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_encodes_segments() {
        let client = FestivalClient::with_url("http://localhost:5000/");
        let url = client.endpoint(&["user", "jane doe", "popup"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/user/jane%20doe/popup");
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = FestivalClient::with_url("https://example.org/festival");
        let url = client.endpoint(&["notifications"]).unwrap();
        assert_eq!(url.as_str(), "https://example.org/festival/notifications");
    }

    #[test]
    fn test_new_rejects_bad_url() {
        let config = Config {
            base_url: "not a url".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            FestivalClient::new(&config),
            Err(FestivalError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_delete_body_shape() {
        let body = DeleteImageRequest {
            file_name: "a.png",
            festival: "2",
            user: "1",
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"fileName": "a.png", "festival": "2", "user": "1"})
        );
    }
}
