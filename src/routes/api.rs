// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile and account API routes for signed-in users.
//! The auth middleware is applied in routes/mod.rs for these routes.

use super::PageEffects;
use crate::error::{AppError, Result};
use crate::middleware::auth::clear_session;
use crate::models::{AudioClip, PhotoSelection, ProfileForm, Session};
use crate::workflow::{eraser, loader, saver, EffectLog, LoadMode, PageContext, PendingMedia};
use crate::AppState;
use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        DefaultBodyLimit, Multipart, Query, State,
    },
    http::StatusCode,
    routing::{delete, get},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use std::sync::Arc;

/// `max_upload_bytes` caps the profile save body (photo plus voice parts).
pub fn routes(max_upload_bytes: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/profile",
            get(load_profile)
                .post(save_profile)
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/api/account", delete(delete_account))
}

fn page(state: &AppState, session: Session, log: Arc<EffectLog>) -> PageContext {
    PageContext::with_session(state.backends.clone(), log, session)
}

// ─── Profile ────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoadParams {
    #[serde(default)]
    mode: Option<LoadMode>,
}

/// Fill the landing page from the stored profile.
async fn load_profile(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Query(params): Query<LoadParams>,
) -> Json<PageEffects> {
    let log = Arc::new(EffectLog::new());
    let ctx = page(&state, session, log.clone());

    let mode = params.mode.unwrap_or(state.config.load_mode);
    loader::load_profile(&ctx, mode).await;

    Json(PageEffects::from_outcome(&log, &Ok::<(), AppError>(())))
}

/// Save the profile form.
///
/// Multipart fields: `age`, `hobbies`, `skills`, an optional `photo` file,
/// and zero or more `voice` parts holding recorded chunks in order. An
/// unreadable or oversized body answers with the effects of a failed save.
async fn save_profile(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Json<PageEffects> {
    let log = Arc::new(EffectLog::new());
    let mut ctx = page(&state, session, log.clone());

    let parsed = match multipart {
        Ok(multipart) => read_profile_form(multipart, state.config.max_upload_bytes).await,
        Err(rejection) => Err(AppError::BadRequest(format!(
            "invalid form data: {}",
            rejection.body_text()
        ))),
    };

    let outcome = match parsed {
        Ok((form, pending)) => {
            ctx.pending = pending;
            saver::save_profile(&mut ctx, &form).await.map(|_| ())
        }
        Err(e) => Err(saver::reject_save(&ctx, e)),
    };

    Json(PageEffects::from_outcome(&log, &outcome))
}

async fn read_profile_form(
    mut multipart: Multipart,
    limit: usize,
) -> Result<(ProfileForm, PendingMedia)> {
    let invalid = |e: MultipartError| bad_multipart(e, limit);

    let mut form = ProfileForm::default();
    let mut pending = PendingMedia::default();
    let mut voice_chunks = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(invalid)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "age" => form.age = field.text().await.map_err(invalid)?,
            "hobbies" => form.hobbies = field.text().await.map_err(invalid)?,
            "skills" => form.skills = field.text().await.map_err(invalid)?,
            "photo" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(invalid)?;
                // An empty file input still sends a part
                if !filename.is_empty() && !bytes.is_empty() {
                    pending.photo =
                        Some(PhotoSelection::new(filename, content_type, bytes.to_vec()));
                }
            }
            "voice" => voice_chunks.push(field.bytes().await.map_err(invalid)?),
            other => tracing::debug!(field = other, "Ignoring unknown form field"),
        }
    }

    if !voice_chunks.is_empty() {
        pending.audio = Some(AudioClip::from_chunks(voice_chunks));
    }

    Ok((form, pending))
}

fn bad_multipart(e: MultipartError, limit: usize) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::BadRequest(format!(
            "upload exceeds the {} MB limit",
            limit.div_ceil(1024 * 1024)
        ));
    }
    AppError::BadRequest(format!("invalid form data: {e}"))
}

// ─── Account Deletion ────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DeleteAccountRequest {
    /// The user's answer to the confirmation prompt
    #[serde(default)]
    confirmed: bool,
}

/// Delete the account and everything stored for it.
async fn delete_account(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    jar: CookieJar,
    Json(request): Json<DeleteAccountRequest>,
) -> (CookieJar, Json<PageEffects>) {
    tracing::info!(uid = %session.uid, confirmed = request.confirmed, "Account deletion requested");

    let log = Arc::new(EffectLog::with_confirmation(request.confirmed));
    let ctx = page(&state, session, log.clone());

    let outcome = eraser::delete_account(&ctx).await;
    let jar = match outcome {
        Ok(true) => clear_session(jar),
        _ => jar,
    };

    (jar, Json(PageEffects::from_outcome(&log, &outcome)))
}
