// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Media storage port, object path conventions, and the Firebase Storage client.

use crate::error::AppError;
use crate::models::media::VOICE_FILENAME;
use crate::models::{MediaKind, Session, UploadResult};
use async_trait::async_trait;
use dashmap::DashMap;
use serde::Deserialize;
use std::sync::Arc;

const DEFAULT_BASE_URL: &str = "https://firebasestorage.googleapis.com/v0";

/// Storage path for a profile photo: `profile_photos/{uid}/{filename}`.
pub fn photo_path(uid: &str, filename: &str) -> String {
    format!("profile_photos/{}/{}", uid, filename)
}

/// Storage path for the (single) voice intro: `voice_intros/{uid}/intro.webm`.
pub fn voice_path(uid: &str) -> String {
    format!("voice_intros/{}/{}", uid, VOICE_FILENAME)
}

/// Blob store or media endpoint that holds uploaded profile media.
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Upload `bytes` and return the URL to persist.
    async fn upload(
        &self,
        session: &Session,
        kind: MediaKind,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadResult, AppError>;

    /// Delete the object at `path`. Fails with `storage/object-not-found` if absent.
    async fn delete(&self, session: &Session, path: &str) -> Result<(), AppError>;
}

/// Firebase Storage REST client.
#[derive(Clone)]
pub struct FirebaseStorageClient {
    http: reqwest::Client,
    base_url: String,
    bucket: String,
}

impl FirebaseStorageClient {
    /// For local development with emulator, set FIREBASE_STORAGE_EMULATOR_HOST.
    pub fn new(bucket: String) -> Self {
        let base_url = match std::env::var("FIREBASE_STORAGE_EMULATOR_HOST") {
            Ok(host) => {
                tracing::info!(host = %host, "Using Firebase Storage emulator");
                format!("http://{}/v0", host)
            }
            Err(_) => DEFAULT_BASE_URL.to_string(),
        };
        Self::with_base_url(bucket, base_url)
    }

    pub fn with_base_url(bucket: String, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            bucket,
        }
    }

    fn object_url(&self, path: &str) -> String {
        format!(
            "{}/b/{}/o/{}",
            self.base_url,
            self.bucket,
            urlencoding::encode(path)
        )
    }

    /// Public download URL for an object with the given access token.
    pub fn download_url(&self, path: &str, token: &str) -> String {
        format!("{}?alt=media&token={}", self.object_url(path), token)
    }
}

#[async_trait]
impl MediaStorage for FirebaseStorageClient {
    async fn upload(
        &self,
        session: &Session,
        _kind: MediaKind,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadResult, AppError> {
        let url = format!("{}/b/{}/o", self.base_url, self.bucket);
        let size = bytes.len();

        let response = self
            .http
            .post(&url)
            .query(&[("name", path)])
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Firebase {}", session.id_token),
            )
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| AppError::provider("storage/unknown", e.to_string()))?;

        if !response.status().is_success() {
            return Err(status_error(response.status(), path));
        }

        let metadata: ObjectMetadata = response.json().await.map_err(|e| {
            AppError::provider("storage/unknown", format!("JSON parse error: {}", e))
        })?;

        // downloadTokens is a comma-separated list; any of them grants access.
        let url = metadata
            .download_tokens
            .as_deref()
            .and_then(|tokens| tokens.split(',').next())
            .filter(|token| !token.is_empty())
            .map(|token| self.download_url(&metadata.name, token))
            .unwrap_or_default();

        tracing::info!(path, size, "Uploaded object to Firebase Storage");

        Ok(UploadResult {
            url,
            path: metadata.name,
        })
    }

    async fn delete(&self, session: &Session, path: &str) -> Result<(), AppError> {
        let response = self
            .http
            .delete(self.object_url(path))
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Firebase {}", session.id_token),
            )
            .send()
            .await
            .map_err(|e| AppError::provider("storage/unknown", e.to_string()))?;

        if !response.status().is_success() {
            return Err(status_error(response.status(), path));
        }

        tracing::debug!(path, "Deleted object from Firebase Storage");
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectMetadata {
    name: String,
    download_tokens: Option<String>,
}

fn status_error(status: reqwest::StatusCode, path: &str) -> AppError {
    match status.as_u16() {
        404 => AppError::provider(
            AppError::OBJECT_NOT_FOUND,
            format!(
                "Firebase Storage: Object '{}' does not exist. (storage/object-not-found)",
                path
            ),
        ),
        401 => AppError::provider(
            "storage/unauthenticated",
            "Firebase Storage: User is not authenticated, please authenticate using Firebase Authentication and try again. (storage/unauthenticated)",
        ),
        403 => AppError::provider(
            "storage/unauthorized",
            format!(
                "Firebase Storage: User does not have permission to access '{}'. (storage/unauthorized)",
                path
            ),
        ),
        _ => AppError::provider(
            "storage/unknown",
            format!(
                "Firebase Storage: An unknown error occurred, please check the error payload for server response. (storage/unknown) HTTP {}",
                status
            ),
        ),
    }
}

/// In-process media storage for offline mode and tests. Clones share data.
#[derive(Clone, Default)]
pub struct MemoryMediaStorage {
    objects: Arc<DashMap<String, (String, Vec<u8>)>>,
    failing: Arc<DashMap<MediaKind, String>>,
    failing_deletes: Arc<DashMap<String, String>>,
}

impl MemoryMediaStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.objects.contains_key(path)
    }

    pub fn object(&self, path: &str) -> Option<Vec<u8>> {
        self.objects.get(path).map(|o| o.1.clone())
    }

    /// Make uploads of `kind` fail with a `storage/unknown` error.
    pub fn fail_uploads(&self, kind: MediaKind, message: &str) {
        self.failing.insert(kind, message.to_string());
    }

    /// Make deletes of `path` fail with a `storage/unauthorized` error.
    pub fn fail_delete(&self, path: &str, message: &str) {
        self.failing_deletes
            .insert(path.to_string(), message.to_string());
    }
}

#[async_trait]
impl MediaStorage for MemoryMediaStorage {
    async fn upload(
        &self,
        _session: &Session,
        kind: MediaKind,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadResult, AppError> {
        if let Some(message) = self.failing.get(&kind) {
            return Err(AppError::provider("storage/unknown", message.value().clone()));
        }
        self.objects
            .insert(path.to_string(), (content_type.to_string(), bytes));
        Ok(UploadResult {
            url: format!("memory://{}", path),
            path: path.to_string(),
        })
    }

    async fn delete(&self, _session: &Session, path: &str) -> Result<(), AppError> {
        if let Some(message) = self.failing_deletes.get(path) {
            return Err(AppError::provider(
                "storage/unauthorized",
                message.value().clone(),
            ));
        }
        match self.objects.remove(path) {
            Some(_) => Ok(()),
            None => Err(status_error(reqwest::StatusCode::NOT_FOUND, path)),
        }
    }
}
