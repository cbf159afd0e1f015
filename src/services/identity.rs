// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity provider port and session-change notifications.

use crate::error::AppError;
use crate::models::Session;
use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::watch;

/// Supported federated sign-in providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FederatedProvider {
    Google,
    GitHub,
}

impl FederatedProvider {
    /// Provider ID understood by the identity service.
    pub fn provider_id(self) -> &'static str {
        match self {
            FederatedProvider::Google => "google.com",
            FederatedProvider::GitHub => "github.com",
        }
    }

    /// Short name used in URLs and cookies.
    pub fn as_str(self) -> &'static str {
        match self {
            FederatedProvider::Google => "google",
            FederatedProvider::GitHub => "github",
        }
    }
}

impl std::str::FromStr for FederatedProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "google" => Ok(FederatedProvider::Google),
            "github" => Ok(FederatedProvider::GitHub),
            other => Err(format!("unknown provider: {other}")),
        }
    }
}

/// Where to send the browser to start a federated sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthRedirect {
    /// Provider authorization URL
    pub auth_uri: String,
    /// Identity service handle tying the provider's response to this attempt
    pub session_id: String,
}

/// Provider response to a federated sign-in started with [`AuthRedirect`].
///
/// The identity service exchanges whatever the provider returned (an
/// authorization code for GitHub and Google) for a session.
#[derive(Clone)]
pub struct FederatedCredential {
    pub provider: FederatedProvider,
    /// Full callback URL the provider sent the browser back to
    pub request_uri: String,
    /// `session_id` from the matching [`AuthRedirect`]
    pub session_id: String,
}

/// Fresh tokens issued for a refresh token.
#[derive(Clone)]
pub struct RefreshedTokens {
    pub id_token: String,
    pub refresh_token: String,
}

impl std::fmt::Debug for RefreshedTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshedTokens").finish_non_exhaustive()
    }
}

/// Operations delegated to the hosted identity provider.
#[async_trait]
pub trait IdentityService: Send + Sync {
    async fn create_account(&self, email: &str, password: &str) -> Result<Session, AppError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AppError>;

    /// Authorization URL for `provider` that returns the browser to `continue_uri`.
    async fn create_auth_uri(
        &self,
        provider: FederatedProvider,
        continue_uri: &str,
    ) -> Result<AuthRedirect, AppError>;

    async fn sign_in_with_provider(
        &self,
        credential: &FederatedCredential,
    ) -> Result<Session, AppError>;

    /// Exchange a refresh token for a new ID token (and refresh token).
    async fn refresh_session(&self, refresh_token: &str) -> Result<RefreshedTokens, AppError>;

    async fn update_display_name(
        &self,
        session: &Session,
        display_name: &str,
    ) -> Result<(), AppError>;

    async fn send_verification_email(&self, session: &Session) -> Result<(), AppError>;

    async fn send_password_reset(&self, email: &str) -> Result<(), AppError>;

    /// Delete the signed-in identity. Fails with `auth/requires-recent-login`
    /// when the session is too old.
    async fn delete_account(&self, session: &Session) -> Result<(), AppError>;
}

/// Current session plus change notifications, scoped to one page context.
///
/// Subscribers see the current value immediately and every later change.
pub struct SessionState {
    tx: watch::Sender<Option<Session>>,
}

impl SessionState {
    pub fn new(initial: Option<Session>) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    pub fn current(&self) -> Option<Session> {
        self.tx.borrow().clone()
    }

    /// Publish a sign-in (`Some`) or sign-out (`None`).
    pub fn publish(&self, session: Option<Session>) {
        tracing::debug!(
            uid = session.as_ref().map(|s| s.uid.as_str()),
            "Session changed"
        );
        self.tx.send_replace(session);
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.tx.subscribe()
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(None)
    }
}
