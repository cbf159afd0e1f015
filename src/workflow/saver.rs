// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile save: upload pending media, then merge-write the record.
//!
//! Uploads run before the write and any failure aborts the save, so a
//! profile never points at media that failed to upload.

use super::{BusyControl, Control, Navigation, PageContext, Route};
use crate::error::AppError;
use crate::models::{MediaKind, ProfileForm, ProfileUpdate, Session};
use crate::services::storage::{photo_path, voice_path};
use validator::Validate;

pub const NOT_LOGGED_IN: &str = "You're not logged in.";
pub const SAVING: &str = "Saving...";
pub const SAVE_LABEL: &str = "Save & View Dashboard";
pub const NO_UPLOAD_URL: &str = "upload returned no URL";

/// Save the form plus any pending media and move on to the dashboard.
///
/// Returns the update that was written.
pub async fn save_profile(
    ctx: &mut PageContext,
    form: &ProfileForm,
) -> Result<ProfileUpdate, AppError> {
    let Some(session) = ctx.current_session() else {
        ctx.surface.alert(NOT_LOGGED_IN);
        return Err(AppError::Precondition(NOT_LOGGED_IN.to_string()));
    };

    let _busy = BusyControl::new(ctx.surface.clone(), Control::Save, SAVING, SAVE_LABEL);

    match upload_and_merge(ctx, &session, form).await {
        Ok(update) => {
            tracing::info!(
                uid = %session.uid,
                fields = ?update.field_paths(),
                "Profile saved"
            );
            ctx.pending = Default::default();
            ctx.surface.navigate(Navigation::assign(Route::Dashboard));
            Ok(update)
        }
        Err(e) => {
            tracing::error!(uid = %session.uid, error = %e, "Error saving profile");
            ctx.surface.alert(&format!("Error: {}", e.user_message()));
            Err(e)
        }
    }
}

/// Report a save whose form never reached the workflow (malformed or
/// oversized body). The page sees the same effects as a failed save.
pub fn reject_save(ctx: &PageContext, error: AppError) -> AppError {
    let _busy = BusyControl::new(ctx.surface.clone(), Control::Save, SAVING, SAVE_LABEL);
    let uid = ctx.current_session().map(|s| s.uid).unwrap_or_default();
    tracing::warn!(uid = %uid, error = %error, "Profile form rejected");
    ctx.surface.alert(&format!("Error: {}", error.user_message()));
    error
}

async fn upload_and_merge(
    ctx: &PageContext,
    session: &Session,
    form: &ProfileForm,
) -> Result<ProfileUpdate, AppError> {
    form.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let mut update = ProfileUpdate::from(form);
    let media = &ctx.backends.media;

    if let Some(photo) = &ctx.pending.photo {
        let path = photo_path(&session.uid, &photo.filename);
        let uploaded = media
            .upload(
                session,
                MediaKind::Image,
                &path,
                &photo.content_type,
                photo.bytes.clone(),
            )
            .await?;
        update.photo_url = Some(non_empty_url(uploaded.url)?);
    }

    if let Some(audio) = &ctx.pending.audio {
        let path = voice_path(&session.uid);
        let uploaded = media
            .upload(
                session,
                MediaKind::Audio,
                &path,
                &audio.mime,
                audio.bytes.clone(),
            )
            .await?;
        update.voice_url = Some(non_empty_url(uploaded.url)?);
    }

    ctx.backends
        .profiles
        .merge_profile(&session.uid, &update)
        .await?;

    Ok(update)
}

fn non_empty_url(url: String) -> Result<String, AppError> {
    if url.is_empty() {
        return Err(AppError::Precondition(NO_UPLOAD_URL.to_string()));
    }
    Ok(url)
}
