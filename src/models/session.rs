// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Signed-in principal issued by the identity provider.

use std::fmt;

/// Authenticated session for the lifetime of one page (or one request).
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    /// Provider user ID; also the profile document ID
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub email_verified: bool,
    /// Firebase ID token used for follow-up identity and storage calls
    pub id_token: String,
    /// Long-lived token that renews `id_token` once it expires
    pub refresh_token: Option<String>,
}

impl Session {
    /// Name shown in the welcome banner: display name, else email.
    pub fn greeting_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .or(self.email.as_deref())
            .unwrap_or("")
    }
}

// Keep the ID token out of logs.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("uid", &self.uid)
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .field("email_verified", &self.email_verified)
            .finish_non_exhaustive()
    }
}
