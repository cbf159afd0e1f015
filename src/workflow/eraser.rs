// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account deletion across media storage, profile store, and identity.
//!
//! Steps run in a fixed order and are not compensated: a failure part way
//! leaves earlier deletions in place and the user retries.
//!
//! The profile photo is not deleted. Its storage path includes the original
//! file name, which is not kept in the profile record.

use super::{BusyControl, Control, Navigation, PageContext, Route};
use crate::error::AppError;
use crate::models::Session;
use crate::services::storage::voice_path;

pub const NO_USER: &str = "No user is currently logged in.";
pub const CONFIRM_PROMPT: &str =
    "Are you sure you want to delete your account? This action is permanent and cannot be undone.";
pub const DELETING: &str = "Deleting Account...";
pub const DELETE_LABEL: &str = "Logout & Delete Account";
pub const DELETED: &str = "Your account has been successfully deleted.";
pub const REAUTH_REQUIRED: &str =
    "This is a sensitive operation and requires you to log in again before deleting your account.";

/// Delete the signed-in account after confirmation.
///
/// Returns `Ok(false)` when the user declines the prompt.
pub async fn delete_account(ctx: &PageContext) -> Result<bool, AppError> {
    let Some(session) = ctx.current_session() else {
        ctx.surface.alert(NO_USER);
        return Err(AppError::Precondition(NO_USER.to_string()));
    };

    if !ctx.surface.confirm(CONFIRM_PROMPT) {
        return Ok(false);
    }

    let _busy = BusyControl::new(ctx.surface.clone(), Control::Delete, DELETING, DELETE_LABEL);

    match erase(ctx, &session).await {
        Ok(()) => {
            tracing::info!(uid = %session.uid, "Account deleted");
            ctx.session.publish(None);
            ctx.surface.alert(DELETED);
            ctx.surface.navigate(Navigation::replace(Route::Login));
            Ok(true)
        }
        Err(e) => {
            tracing::error!(uid = %session.uid, error = %e, "Error deleting account");
            if e.is_requires_recent_login() {
                ctx.surface.alert(REAUTH_REQUIRED);
            } else {
                ctx.surface
                    .alert(&format!("Failed to delete account: {}", e.user_message()));
            }
            Err(e)
        }
    }
}

async fn erase(ctx: &PageContext, session: &Session) -> Result<(), AppError> {
    let backends = &ctx.backends;

    // 1. Voice intro (deterministic path); absence is fine.
    let path = voice_path(&session.uid);
    match backends.media.delete(session, &path).await {
        Ok(()) => tracing::info!(path = %path, "Voice intro deleted"),
        Err(e) if e.is_tolerated_on_delete() => {
            tracing::info!(path = %path, reason = %e, "No voice intro to delete")
        }
        Err(e) => return Err(e),
    }

    // 2. Profile record.
    backends.profiles.delete_profile(&session.uid).await?;
    tracing::info!(uid = %session.uid, "Profile document deleted");

    // 3. Identity last; the steps above need the session to still be valid.
    backends.identity.delete_account(session).await
}
