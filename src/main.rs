// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Yourverse server
//!
//! Serves the profile pages and runs the account and profile flows against
//! Firebase Authentication, Cloud Firestore, and the configured media store.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use yourverse::{
    config::{Config, MediaBackend},
    db::FirestoreDb,
    services::{
        CloudinaryClient, FirebaseAuthClient, FirebaseStorageClient, FirebaseTokenVerifier,
        MediaStorage,
    },
    workflow::Backends,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Structured JSON logging
    init_logging()?;

    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Yourverse");

    let db = FirestoreDb::new(&config.firebase_project_id).await?;

    let identity = Arc::new(FirebaseAuthClient::new(config.firebase_api_key.clone()));

    let media: Arc<dyn MediaStorage> = match config.media_backend {
        MediaBackend::FirebaseStorage => {
            tracing::info!(bucket = %config.storage_bucket, "Media stored in Firebase Storage");
            Arc::new(FirebaseStorageClient::new(config.storage_bucket.clone()))
        }
        MediaBackend::Cloudinary => {
            let cloudinary = config.cloudinary.clone().ok_or_else(|| {
                anyhow::anyhow!("MEDIA_BACKEND=cloudinary requires CLOUDINARY_CLOUD_NAME")
            })?;
            tracing::info!(cloud = %cloudinary.cloud_name, "Media stored in Cloudinary");
            Arc::new(CloudinaryClient::new(cloudinary))
        }
    };

    let verifier = Arc::new(FirebaseTokenVerifier::new(&config.firebase_project_id)?);

    let state = Arc::new(AppState {
        config: config.clone(),
        backends: Backends {
            identity,
            profiles: Arc::new(db),
            media,
        },
        verifier,
    });

    let app = yourverse::routes::create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> anyhow::Result<()> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("yourverse=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
