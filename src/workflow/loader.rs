// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile loading for the landing page.

use super::{Field, Navigation, PageContext, Route};
use serde::Deserialize;

/// Landing-page behavior for returning users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadMode {
    /// Always show the editable profile.
    #[default]
    Edit,
    /// Send users with a completed profile straight to the dashboard.
    Redirect,
}

impl std::str::FromStr for LoadMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "edit" => Ok(LoadMode::Edit),
            "redirect" => Ok(LoadMode::Redirect),
            other => Err(format!("unknown load mode: {other}")),
        }
    }
}

/// Populate the page from the stored profile.
///
/// Failures are logged and leave the form at its defaults. Returns the
/// redirect issued for a returning user, if any.
pub async fn load_profile(ctx: &PageContext, mode: LoadMode) -> Option<Navigation> {
    let session = ctx.current_session()?;
    ctx.surface
        .set_welcome(&format!("Welcome, {}!", session.greeting_name()));

    let record = match ctx.backends.profiles.get_profile(&session.uid).await {
        Ok(Some(record)) => record,
        Ok(None) => {
            tracing::debug!(uid = %session.uid, "No profile yet");
            return None;
        }
        Err(e) => {
            tracing::error!(uid = %session.uid, error = %e, "Error loading profile");
            return None;
        }
    };

    if mode == LoadMode::Redirect && record.is_complete() {
        let navigation = Navigation::replace(Route::Dashboard);
        ctx.surface.navigate(navigation);
        return Some(navigation);
    }

    ctx.surface.set_field(Field::Age, &record.age);
    ctx.surface.set_field(Field::Hobbies, &record.hobbies);
    ctx.surface.set_field(Field::Skills, &record.skills);

    if let Some(url) = record.photo_url.as_deref().filter(|u| !u.is_empty()) {
        ctx.surface.set_photo_preview(url);
    }
    if let Some(url) = record.voice_url.as_deref().filter(|u| !u.is_empty()) {
        ctx.surface.set_voice_playback(url);
    }

    None
}
