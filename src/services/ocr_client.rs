use std::time::{Duration, Instant};

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::response::WireOcrBody;
use crate::models::{HealthResponse, OcrResult, UploadFile};

pub const PDF_ENDPOINT: &str = "upload-pdf";
pub const IMAGE_ENDPOINT: &str = "upload-image";
pub const HEALTH_ENDPOINT: &str = "health";

/// Client for the remote OCR backend. One call per upload, no retries.
#[derive(Debug, Clone)]
pub struct OcrClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl OcrClient {
    pub fn new(base_url: &Url, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn from_config(config: &Config) -> AppResult<Self> {
        let base_url = config.api_base_url()?;
        info!(base_url = %base_url, timeout_secs = config.request_timeout_seconds, "OCR client configured");
        Self::new(&base_url, config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// PDFs go to the document endpoint, everything else to the image one.
    pub fn endpoint_for(&self, file: &UploadFile) -> String {
        let path = if file.is_pdf() { PDF_ENDPOINT } else { IMAGE_ENDPOINT };
        format!("{}/{}", self.base_url, path)
    }

    pub async fn submit(&self, file: &UploadFile) -> AppResult<OcrResult> {
        let start = Instant::now();
        let endpoint = self.endpoint_for(file);

        info!(
            file_name = %file.name,
            file_size = file.size,
            mime_type = %file.mime_type,
            endpoint = %endpoint,
            "Uploading file for OCR"
        );

        let part = Part::stream(file.content.clone())
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)
            .map_err(|e| AppError::validation(format!("Invalid MIME type {}: {}", file.mime_type, e)))?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(&endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.transport_failure(e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_failure(e))?;

        debug!(
            status = %status,
            body_len = body.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Response received"
        );

        if !status.is_success() {
            let detail = serde_json::from_slice::<Value>(&body)
                .ok()
                .and_then(|v| detail_message(&v));
            let message = detail.unwrap_or_else(|| format!("server responded with status {}", status));
            error!(status = %status, error_message = %message, "OCR request failed");
            return Err(AppError::transport(message));
        }

        let value: Value = serde_json::from_slice(&body).map_err(|e| {
            warn!("Response body is not JSON: {}", e);
            AppError::InvalidResponse
        })?;

        let result = parse_ocr_body(value)?;
        if !result.is_consistent() {
            warn!(
                total_words = result.total_words,
                total_characters = result.total_characters,
                "Page counts do not add up to the reported totals"
            );
        }

        info!(
            file_name = %result.filename,
            pages = result.page_count(),
            words = result.total_words,
            characters = result.total_characters,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "OCR completed"
        );
        Ok(result)
    }

    /// Liveness probe. Every failure is reported as `false`.
    pub async fn check_health(&self) -> bool {
        let url = format!("{}/{}", self.base_url, HEALTH_ENDPOINT);
        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(url = %url, "Health check failed: {}", e);
                return false;
            }
        };

        match response.json::<HealthResponse>().await {
            Ok(health) => {
                debug!(status = %health.status, service = ?health.service, "Health check answered");
                health.is_healthy()
            }
            Err(e) => {
                debug!("Health check returned an unreadable body: {}", e);
                false
            }
        }
    }

    fn transport_failure(&self, err: reqwest::Error) -> AppError {
        if err.is_timeout() {
            warn!("OCR request timed out after {:?}", self.timeout);
            return AppError::transport(format!("request timed out after {:?}", self.timeout));
        }
        error!("OCR request failed: {}", err);
        AppError::transport(err.to_string())
    }
}

/// Validates a decoded response body and turns it into a result.
pub fn parse_ocr_body(value: Value) -> AppResult<OcrResult> {
    if !value.is_object() {
        return Err(AppError::InvalidResponse);
    }

    if value.get("success").and_then(Value::as_bool) != Some(true) {
        return Err(AppError::processing_failed(detail_message(&value)));
    }

    let wire: WireOcrBody = serde_json::from_value(value).map_err(|e| {
        warn!("Success body has an unexpected shape: {}", e);
        AppError::InvalidResponse
    })?;
    Ok(wire.into_result())
}

/// Extracts a server-supplied `detail`, rendering structured details as JSON.
pub fn detail_message(value: &Value) -> Option<String> {
    match value.get("detail")? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
