// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile record stored in Firestore (`users/{uid}`).

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Stored profile. Scalar fields are free text exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub hobbies: String,
    #[serde(default)]
    pub skills: String,
    #[serde(rename = "photoURL", default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(rename = "voiceURL", default, skip_serializing_if = "Option::is_none")]
    pub voice_url: Option<String>,
}

impl ProfileRecord {
    /// A profile with a non-empty age counts as completed.
    pub fn is_complete(&self) -> bool {
        !self.age.is_empty()
    }

    /// Apply a merge-write: only fields present in `update` change.
    pub fn merge(&mut self, update: &ProfileUpdate) {
        if let Some(age) = &update.age {
            self.age = age.clone();
        }
        if let Some(hobbies) = &update.hobbies {
            self.hobbies = hobbies.clone();
        }
        if let Some(skills) = &update.skills {
            self.skills = skills.clone();
        }
        if let Some(url) = &update.photo_url {
            self.photo_url = Some(url.clone());
        }
        if let Some(url) = &update.voice_url {
            self.voice_url = Some(url.clone());
        }
    }
}

/// Merge-write payload. Absent fields are neither serialized nor listed in the
/// update mask, so previously stored values survive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hobbies: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<String>,
    #[serde(rename = "photoURL", skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(rename = "voiceURL", skip_serializing_if = "Option::is_none")]
    pub voice_url: Option<String>,
}

impl ProfileUpdate {
    /// Firestore field paths present in this update.
    pub fn field_paths(&self) -> Vec<&'static str> {
        let mut paths = Vec::with_capacity(5);
        if self.age.is_some() {
            paths.push("age");
        }
        if self.hobbies.is_some() {
            paths.push("hobbies");
        }
        if self.skills.is_some() {
            paths.push("skills");
        }
        if self.photo_url.is_some() {
            paths.push("photoURL");
        }
        if self.voice_url.is_some() {
            paths.push("voiceURL");
        }
        paths
    }
}

/// Scalar values from the profile form.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
pub struct ProfileForm {
    #[serde(default)]
    #[validate(length(max = 16))]
    pub age: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub hobbies: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub skills: String,
}

impl From<&ProfileForm> for ProfileUpdate {
    fn from(form: &ProfileForm) -> Self {
        Self {
            age: Some(form.age.clone()),
            hobbies: Some(form.hobbies.clone()),
            skills: Some(form.skills.clone()),
            photo_url: None,
            voice_url: None,
        }
    }
}
