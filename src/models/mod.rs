// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod media;
pub mod profile;
pub mod session;

pub use media::{AudioClip, MediaKind, PhotoSelection, UploadResult};
pub use profile::{ProfileForm, ProfileRecord, ProfileUpdate};
pub use session::Session;
