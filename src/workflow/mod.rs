// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client-side profile session workflow.
//!
//! Every operation takes an explicit [`PageContext`] (session, pending media,
//! recorder state, collaborators) and reports user-visible effects through a
//! [`PageSurface`]. Nothing here touches ambient global state.

pub mod capture;
pub mod credentials;
pub mod eraser;
pub mod guard;
pub mod loader;
pub mod saver;

pub use capture::{Microphone, VoiceRecorder};
pub use guard::{Navigation, NavigationMode, Route, RouteAccess, SessionGuard};
pub use loader::LoadMode;

use crate::db::ProfileStore;
use crate::models::{AudioClip, PhotoSelection, Session};
use crate::services::{IdentityService, MediaStorage, SessionState};
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Interactive controls whose state the workflow toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/generated/")
)]
#[serde(rename_all = "camelCase")]
pub enum Control {
    Save,
    Delete,
    Record,
    Stop,
}

/// Editable profile form fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/generated/")
)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Age,
    Hobbies,
    Skills,
}

/// One user-visible effect produced by a workflow operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/generated/")
)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Effect {
    /// Inline form message
    Message { text: String, is_error: bool },
    /// Blocking alert
    Alert { text: String },
    /// Blocking yes/no prompt and the answer it received
    Confirm { prompt: String, confirmed: bool },
    Navigate { path: String, replace: bool },
    Control {
        control: Control,
        enabled: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    Field { field: Field, value: String },
    PhotoPreview { src: String },
    /// Set the playback source and reveal the audio widget
    VoicePlayback { src: String },
    Welcome { text: String },
    ResetForm,
}

/// Presentation port: where workflow effects land.
pub trait PageSurface: Send + Sync {
    fn show_message(&self, text: &str, is_error: bool);
    fn alert(&self, text: &str);
    fn confirm(&self, prompt: &str) -> bool;
    fn navigate(&self, navigation: Navigation);
    fn set_control(&self, control: Control, enabled: bool, label: Option<&str>);
    fn set_field(&self, field: Field, value: &str);
    fn set_photo_preview(&self, src: &str);
    fn set_voice_playback(&self, src: &str);
    fn set_welcome(&self, text: &str);
    fn reset_form(&self);
}

/// Surface that records effects in order, for replay by the browser or
/// inspection in tests. `confirm` answers with a preset value.
#[derive(Debug, Default)]
pub struct EffectLog {
    effects: Mutex<Vec<Effect>>,
    confirm_answer: bool,
}

impl EffectLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log whose confirm prompts are answered with `answer`.
    pub fn with_confirmation(answer: bool) -> Self {
        Self {
            effects: Mutex::new(Vec::new()),
            confirm_answer: answer,
        }
    }

    pub fn effects(&self) -> Vec<Effect> {
        self.effects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Alerts raised so far, in order.
    pub fn alerts(&self) -> Vec<String> {
        self.effects()
            .into_iter()
            .filter_map(|e| match e {
                Effect::Alert { text } => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Last navigation, if any.
    pub fn navigation(&self) -> Option<(String, bool)> {
        self.effects().into_iter().rev().find_map(|e| match e {
            Effect::Navigate { path, replace } => Some((path, replace)),
            _ => None,
        })
    }

    fn push(&self, effect: Effect) {
        self.effects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(effect);
    }
}

impl PageSurface for EffectLog {
    fn show_message(&self, text: &str, is_error: bool) {
        self.push(Effect::Message {
            text: text.to_string(),
            is_error,
        });
    }

    fn alert(&self, text: &str) {
        self.push(Effect::Alert {
            text: text.to_string(),
        });
    }

    fn confirm(&self, prompt: &str) -> bool {
        self.push(Effect::Confirm {
            prompt: prompt.to_string(),
            confirmed: self.confirm_answer,
        });
        self.confirm_answer
    }

    fn navigate(&self, navigation: Navigation) {
        self.push(Effect::Navigate {
            path: navigation.target.path().to_string(),
            replace: navigation.mode == NavigationMode::Replace,
        });
    }

    fn set_control(&self, control: Control, enabled: bool, label: Option<&str>) {
        self.push(Effect::Control {
            control,
            enabled,
            label: label.map(str::to_string),
        });
    }

    fn set_field(&self, field: Field, value: &str) {
        self.push(Effect::Field {
            field,
            value: value.to_string(),
        });
    }

    fn set_photo_preview(&self, src: &str) {
        self.push(Effect::PhotoPreview {
            src: src.to_string(),
        });
    }

    fn set_voice_playback(&self, src: &str) {
        self.push(Effect::VoicePlayback {
            src: src.to_string(),
        });
    }

    fn set_welcome(&self, text: &str) {
        self.push(Effect::Welcome {
            text: text.to_string(),
        });
    }

    fn reset_form(&self) {
        self.push(Effect::ResetForm);
    }
}

/// Disables a control with a busy label; re-enables it with its idle label
/// when dropped, whichever way the operation ends.
pub struct BusyControl {
    surface: Arc<dyn PageSurface>,
    control: Control,
    idle_label: &'static str,
}

impl BusyControl {
    pub fn new(
        surface: Arc<dyn PageSurface>,
        control: Control,
        busy_label: &str,
        idle_label: &'static str,
    ) -> Self {
        surface.set_control(control, false, Some(busy_label));
        Self {
            surface,
            control,
            idle_label,
        }
    }
}

impl Drop for BusyControl {
    fn drop(&mut self) {
        self.surface
            .set_control(self.control, true, Some(self.idle_label));
    }
}

/// Media selected or recorded on the page but not yet uploaded.
#[derive(Debug, Clone, Default)]
pub struct PendingMedia {
    pub photo: Option<PhotoSelection>,
    pub audio: Option<AudioClip>,
}

/// Hosted collaborators shared by every page context.
#[derive(Clone)]
pub struct Backends {
    pub identity: Arc<dyn IdentityService>,
    pub profiles: Arc<dyn ProfileStore>,
    pub media: Arc<dyn MediaStorage>,
}

/// Session-scoped state for one page lifetime.
pub struct PageContext {
    pub backends: Backends,
    pub surface: Arc<dyn PageSurface>,
    pub session: SessionState,
    pub pending: PendingMedia,
    pub recorder: VoiceRecorder,
}

impl PageContext {
    pub fn new(backends: Backends, surface: Arc<dyn PageSurface>) -> Self {
        Self {
            backends,
            surface,
            session: SessionState::default(),
            pending: PendingMedia::default(),
            recorder: VoiceRecorder::default(),
        }
    }

    /// Context that starts with an established session.
    pub fn with_session(
        backends: Backends,
        surface: Arc<dyn PageSurface>,
        session: Session,
    ) -> Self {
        let ctx = Self::new(backends, surface);
        ctx.session.publish(Some(session));
        ctx
    }

    pub fn current_session(&self) -> Option<Session> {
        self.session.current()
    }
}
