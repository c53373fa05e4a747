//! Extraction service client
//!
//! `POST {server}/upload` with multipart fields `file` and `mode`, answered by
//! `{ "success": bool, "data"?: {...}, "error"?: string }`.

use crate::error::ExtractionError;
use crate::model::{ExtractionResult, ProcessingMode, UploadedFile};
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;

/// Message used when the service fails without saying why
pub const FALLBACK_ERROR: &str = "Failed to extract data from image";

/// Remote extraction engine
///
/// Calls block; the orchestrator runs them on a worker thread.
pub trait ExtractionService: Send + Sync {
    fn extract(
        &self,
        file: &UploadedFile,
        mode: ProcessingMode,
    ) -> Result<ExtractionResult, ExtractionError>;

    /// Probe the service, returning its banner text
    fn check_health(&self) -> Result<String, ExtractionError>;
}

#[derive(Debug, Deserialize)]
struct ResponseEnvelope {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    data: Option<ExtractionResult>,
    #[serde(default)]
    error: Option<String>,
}

/// Map an HTTP status and body to the extraction outcome
///
/// The body is read regardless of status: the service reports rejected
/// uploads as 400 with `{"error": ...}` and processing failures as 500 with
/// `success: false`.
pub fn interpret_response(status: u16, body: &str) -> Result<ExtractionResult, ExtractionError> {
    let ok_status = (200..300).contains(&status);

    let envelope = match serde_json::from_str::<ResponseEnvelope>(body) {
        Ok(envelope) => envelope,
        Err(e) if ok_status => {
            return Err(ExtractionError::Server(format!(
                "Unreadable response from the extraction service: {}",
                e
            )))
        }
        Err(_) => {
            return Err(ExtractionError::Server(format!(
                "Request failed with status code {}",
                status
            )))
        }
    };

    if envelope.success == Some(true) {
        return envelope.data.ok_or_else(|| {
            ExtractionError::Server("The extraction service reported success but sent no data".to_string())
        });
    }

    match envelope.error {
        Some(message) if !message.trim().is_empty() => Err(ExtractionError::Server(message)),
        _ if envelope.success.is_none() && !ok_status => Err(ExtractionError::Server(format!(
            "Request failed with status code {}",
            status
        ))),
        _ => Err(ExtractionError::Server(FALLBACK_ERROR.to_string())),
    }
}

/// HTTP implementation of `ExtractionService`
pub struct HttpExtractionService {
    client: Client,
    health_client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpExtractionService {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        health_timeout: Duration,
    ) -> Result<Self, ExtractionError> {
        let client = Client::builder().timeout(timeout).build()?;
        let health_client = Client::builder().timeout(health_timeout).build()?;
        Ok(Self {
            client,
            health_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn upload_url(&self) -> String {
        format!("{}/upload", self.base_url)
    }

    fn map_send_error(&self, err: reqwest::Error) -> ExtractionError {
        if err.is_timeout() {
            ExtractionError::Timeout(self.timeout.as_secs())
        } else {
            err.into()
        }
    }
}

impl ExtractionService for HttpExtractionService {
    fn extract(
        &self,
        file: &UploadedFile,
        mode: ProcessingMode,
    ) -> Result<ExtractionResult, ExtractionError> {
        let part = Part::bytes(file.bytes.to_vec())
            .file_name(file.name.clone())
            .mime_str(&file.mime)?;
        let form = Form::new()
            .part("file", part)
            .text("mode", mode.as_str());

        let url = self.upload_url();
        tracing::debug!(%url, %mode, file = %file.name, "sending extraction request");

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status().as_u16();
        let body = response.text().map_err(|e| self.map_send_error(e))?;
        tracing::debug!(status, bytes = body.len(), "extraction response received");

        interpret_response(status, &body)
    }

    fn check_health(&self) -> Result<String, ExtractionError> {
        let response = self
            .health_client
            .get(format!("{}/", self.base_url))
            .send()?;
        let status = response.status();
        let body = response.text()?;

        if status.is_success() {
            Ok(body.trim().to_string())
        } else {
            Err(ExtractionError::Server(format!(
                "Health check failed with status code {}",
                status.as_u16()
            )))
        }
    }
}
