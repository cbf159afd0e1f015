// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Pending media held locally until a profile save uploads it.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

/// MIME type of recorded voice intros.
pub const VOICE_MIME: &str = "audio/webm";

/// Fixed object name for a user's voice intro; one per user.
pub const VOICE_FILENAME: &str = "intro.webm";

/// Kind of asset being stored; selects the upload preset/resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Audio,
}

/// Image file chosen in the photo picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoSelection {
    /// Original file name, used in the storage path
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl PhotoSelection {
    pub fn new(filename: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Inline preview source; never uploaded.
    pub fn preview_data_url(&self) -> String {
        data_url(&self.content_type, &self.bytes)
    }
}

/// Voice recording assembled from recorder chunks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl AudioClip {
    /// Concatenate recorded chunks into a single clip.
    pub fn from_chunks<I, C>(chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: AsRef<[u8]>,
    {
        let bytes = chunks
            .into_iter()
            .fold(Vec::new(), |mut acc, chunk| {
                acc.extend_from_slice(chunk.as_ref());
                acc
            });
        Self {
            bytes,
            mime: VOICE_MIME.to_string(),
        }
    }

    /// Local playback source for the recorded clip.
    pub fn playback_url(&self) -> String {
        data_url(&self.mime, &self.bytes)
    }
}

/// Remote location of an uploaded asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    /// Public (secure) download URL persisted in the profile
    pub url: String,
    /// Storage path or public ID on the backend
    pub path: String,
}

fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, BASE64.encode(bytes))
}
