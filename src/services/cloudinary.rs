// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cloudinary unsigned-upload client.
//!
//! Uploads use a client-exposed, unsigned preset; there is no credential that
//! would allow deleting an asset afterwards.

use crate::config::CloudinaryConfig;
use crate::error::AppError;
use crate::models::{MediaKind, Session, UploadResult};
use crate::services::storage::MediaStorage;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://api.cloudinary.com/v1_1";

/// Cloudinary media endpoint client.
#[derive(Clone)]
pub struct CloudinaryClient {
    http: reqwest::Client,
    base_url: String,
    config: CloudinaryConfig,
}

impl CloudinaryClient {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self::with_base_url(config, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(config: CloudinaryConfig, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            config,
        }
    }

    /// Upload endpoint and preset for an asset kind. Audio is a `video`
    /// resource on Cloudinary.
    fn target(&self, kind: MediaKind) -> (String, &str) {
        let (resource_type, preset) = match kind {
            MediaKind::Image => ("image", self.config.image_preset.as_str()),
            MediaKind::Audio => ("video", self.config.audio_preset.as_str()),
        };
        let url = format!(
            "{}/{}/{}/upload",
            self.base_url, self.config.cloud_name, resource_type
        );
        (url, preset)
    }
}

#[async_trait]
impl MediaStorage for CloudinaryClient {
    async fn upload(
        &self,
        _session: &Session,
        kind: MediaKind,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadResult, AppError> {
        let (url, preset) = self.target(kind);
        let filename = path.rsplit('/').next().unwrap_or(path).to_string();

        let part = Part::bytes(bytes)
            .file_name(filename)
            .mime_str(content_type)
            .map_err(|e| AppError::BadRequest(format!("Invalid content type: {}", e)))?;
        let form = Form::new()
            .part("file", part)
            .text("upload_preset", preset.to_string());

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::provider("media/upload-failed", e.to_string()))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| format!("HTTP {}: {}", status, body));
            tracing::warn!(%status, ?kind, "Cloudinary upload failed");
            return Err(AppError::provider("media/upload-failed", message));
        }

        let uploaded: UploadResponse = serde_json::from_str(&body).map_err(|e| {
            AppError::provider("media/upload-failed", format!("JSON parse error: {}", e))
        })?;

        tracing::info!(?kind, public_id = %uploaded.public_id, "Uploaded media to Cloudinary");

        Ok(UploadResult {
            url: uploaded.secure_url.unwrap_or_default(),
            path: uploaded.public_id,
        })
    }

    async fn delete(&self, _session: &Session, path: &str) -> Result<(), AppError> {
        tracing::warn!(
            path,
            "Cloudinary assets cannot be deleted with an unsigned preset; skipping"
        );
        Err(AppError::provider(
            AppError::UNSUPPORTED,
            "Cloudinary: unsigned uploads cannot be deleted by the client.",
        ))
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    #[serde(default)]
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorMessage,
}

#[derive(Debug, Deserialize)]
struct ErrorMessage {
    message: String,
}
