// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! The Firebase web API key and Cloudinary presets are client-exposed values,
//! not secrets; they are read from the environment like any other setting.

use crate::workflow::LoadMode;
use std::env;
use std::path::PathBuf;

/// Default cap on a profile save body (photo plus voice intro).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Which hosted store owns uploaded profile media (both photo and voice).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaBackend {
    FirebaseStorage,
    Cloudinary,
}

impl std::str::FromStr for MediaBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firebase" | "firebase-storage" | "storage" => Ok(MediaBackend::FirebaseStorage),
            "cloudinary" => Ok(MediaBackend::Cloudinary),
            _ => Err(ConfigError::Invalid("MEDIA_BACKEND", s.to_string())),
        }
    }
}

/// Cloudinary unsigned-upload settings.
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    /// Preset used for `image` uploads (profile photos)
    pub image_preset: String,
    /// Preset used for `video` uploads (voice intros)
    pub audio_preset: String,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Firebase web API key (public)
    pub firebase_api_key: String,
    /// Firebase / GCP project ID
    pub firebase_project_id: String,
    /// Firebase Storage bucket
    pub storage_bucket: String,
    /// Backend for photo and voice uploads
    pub media_backend: MediaBackend,
    /// Cloudinary settings (required when `media_backend` is Cloudinary)
    pub cloudinary: Option<CloudinaryConfig>,
    /// Page the OAuth provider returns to after federated sign-in
    pub oauth_continue_uri: String,
    /// Largest accepted profile form body, in bytes
    pub max_upload_bytes: usize,
    /// Directory holding the HTML pages
    pub static_dir: PathBuf,
    /// Profile loader behavior for the landing page
    pub load_mode: LoadMode,
    /// Server port
    pub port: u16,
}

impl Config {
    /// Config for tests only.
    pub fn test_default() -> Self {
        Self {
            firebase_api_key: "test-api-key".to_string(),
            firebase_project_id: "test-project".to_string(),
            storage_bucket: "test-project.firebasestorage.app".to_string(),
            media_backend: MediaBackend::FirebaseStorage,
            cloudinary: None,
            oauth_continue_uri: "http://localhost:8080/index.html".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            static_dir: PathBuf::from("web"),
            load_mode: LoadMode::Edit,
            port: 8080,
        }
    }

    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let firebase_project_id = required("FIREBASE_PROJECT_ID")?;

        let media_backend = match env::var("MEDIA_BACKEND") {
            Ok(v) => v.parse()?,
            Err(_) => MediaBackend::FirebaseStorage,
        };

        let cloudinary = match env::var("CLOUDINARY_CLOUD_NAME") {
            Ok(cloud_name) => Some(CloudinaryConfig {
                cloud_name: cloud_name.trim().to_string(),
                image_preset: required("CLOUDINARY_IMAGE_PRESET")?,
                audio_preset: required("CLOUDINARY_AUDIO_PRESET")?,
            }),
            Err(_) => None,
        };

        if media_backend == MediaBackend::Cloudinary && cloudinary.is_none() {
            return Err(ConfigError::Missing("CLOUDINARY_CLOUD_NAME"));
        }

        let load_mode = match env::var("LOAD_MODE") {
            Ok(v) => v
                .parse()
                .map_err(|_| ConfigError::Invalid("LOAD_MODE", v.clone()))?,
            Err(_) => LoadMode::Edit,
        };

        Ok(Self {
            firebase_api_key: required("FIREBASE_API_KEY")?,
            storage_bucket: env::var("FIREBASE_STORAGE_BUCKET")
                .unwrap_or_else(|_| format!("{}.firebasestorage.app", firebase_project_id)),
            firebase_project_id,
            media_backend,
            cloudinary,
            oauth_continue_uri: env::var("OAUTH_CONTINUE_URI")
                .unwrap_or_else(|_| "http://localhost:8080/index.html".to_string()),
            max_upload_bytes: match env::var("MAX_UPLOAD_BYTES") {
                Ok(v) => v
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::Invalid("MAX_UPLOAD_BYTES", v.clone()))?,
                Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
            },
            static_dir: env::var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("web")),
            load_mode,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .map(|v| v.trim().to_string())
        .map_err(|_| ConfigError::Missing(name))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("FIREBASE_API_KEY", "key123");
        env::set_var("FIREBASE_PROJECT_ID", "yourverse-test");
        env::remove_var("FIREBASE_STORAGE_BUCKET");
        env::remove_var("MEDIA_BACKEND");
        env::remove_var("CLOUDINARY_CLOUD_NAME");
        env::remove_var("LOAD_MODE");
        env::remove_var("MAX_UPLOAD_BYTES");
        env::remove_var("OAUTH_CONTINUE_URI");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.firebase_api_key, "key123");
        assert_eq!(
            config.storage_bucket,
            "yourverse-test.firebasestorage.app"
        );
        assert_eq!(config.media_backend, MediaBackend::FirebaseStorage);
        assert_eq!(config.load_mode, LoadMode::Edit);
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(config.oauth_continue_uri, "http://localhost:8080/index.html");
    }

    #[test]
    fn media_backend_parses_known_names() {
        assert_eq!(
            "cloudinary".parse::<MediaBackend>().unwrap(),
            MediaBackend::Cloudinary
        );
        assert_eq!(
            " Firebase ".parse::<MediaBackend>().unwrap(),
            MediaBackend::FirebaseStorage
        );
        assert!("s3".parse::<MediaBackend>().is_err());
    }
}
