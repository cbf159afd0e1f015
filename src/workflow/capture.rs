// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Local media capture: photo selection preview and voice recording.
//!
//! Nothing here talks to the network; results wait in
//! [`PendingMedia`](super::PendingMedia) until a save.
//!
//! This is the reference model of capture: the browser page (`web/app.js`)
//! mirrors these state transitions against the real camera roll and
//! `MediaRecorder`, and posts the results as `photo` and `voice` parts.

use super::{Control, PageContext};
use crate::error::AppError;
use crate::models::{AudioClip, PhotoSelection};
use async_trait::async_trait;

pub const MICROPHONE_DENIED: &str = "Could not access microphone. Please check permissions.";

/// Audio input device.
#[async_trait]
pub trait Microphone: Send + Sync {
    /// Ask for access; an error means the user or platform refused.
    async fn request_access(&self) -> Result<(), AppError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecorderState {
    #[default]
    Idle,
    Recording,
}

/// Chunked in-memory voice recorder.
#[derive(Debug, Default)]
pub struct VoiceRecorder {
    state: RecorderState,
    chunks: Vec<Vec<u8>>,
}

impl VoiceRecorder {
    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state == RecorderState::Recording
    }
}

/// Photo picked: show it as an inline preview and keep it for the next save.
pub fn select_photo(ctx: &mut PageContext, photo: PhotoSelection) {
    tracing::debug!(
        filename = %photo.filename,
        size = photo.bytes.len(),
        "Photo selected"
    );
    ctx.surface.set_photo_preview(&photo.preview_data_url());
    ctx.pending.photo = Some(photo);
}

/// Start recording once the microphone is granted.
///
/// A denial raises an alert and leaves the recorder idle.
pub async fn start_recording(
    ctx: &mut PageContext,
    microphone: &dyn Microphone,
) -> Result<(), AppError> {
    if ctx.recorder.is_recording() {
        return Ok(());
    }

    if let Err(e) = microphone.request_access().await {
        tracing::error!(error = %e, "Microphone access error");
        ctx.surface.alert(MICROPHONE_DENIED);
        return Err(AppError::Precondition(MICROPHONE_DENIED.to_string()));
    }

    // A new take discards any earlier, unsaved recording.
    ctx.recorder.chunks.clear();
    ctx.pending.audio = None;
    ctx.recorder.state = RecorderState::Recording;

    ctx.surface.set_control(Control::Record, false, None);
    ctx.surface.set_control(Control::Stop, true, None);
    Ok(())
}

/// Buffer one chunk of recorded audio. Ignored unless recording.
pub fn push_chunk(ctx: &mut PageContext, chunk: &[u8]) {
    if ctx.recorder.is_recording() {
        ctx.recorder.chunks.push(chunk.to_vec());
    }
}

/// Finish the take: assemble the clip, offer playback, and keep it pending.
pub fn stop_recording(ctx: &mut PageContext) -> Option<AudioClip> {
    if !ctx.recorder.is_recording() {
        return None;
    }

    let clip = AudioClip::from_chunks(ctx.recorder.chunks.drain(..));
    ctx.recorder.state = RecorderState::Idle;

    tracing::debug!(size = clip.bytes.len(), "Recording stopped");

    ctx.surface.set_voice_playback(&clip.playback_url());
    ctx.surface.set_control(Control::Record, true, None);
    ctx.surface.set_control(Control::Stop, false, None);

    ctx.pending.audio = Some(clip.clone());
    Some(clip)
}
