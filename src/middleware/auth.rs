// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session authentication middleware.
//!
//! The browser session is the Firebase ID token, carried in the
//! `yourverse_token` cookie or an `Authorization: Bearer` header. The
//! matching refresh token lives in `yourverse_refresh` and renews the ID
//! token once it expires.

use crate::error::AppError;
use crate::models::Session;
use crate::services::{FederatedProvider, TokenError};
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;

/// Session cookie name.
pub const SESSION_COOKIE: &str = "yourverse_token";

/// Refresh token cookie name.
pub const REFRESH_COOKIE: &str = "yourverse_refresh";

/// Pending federated sign-in, `{provider}:{session_id}`.
pub const OAUTH_COOKIE: &str = "yourverse_oauth";

const OAUTH_COOKIE_PATH: &str = "/auth/federated";

/// Token from the session cookie, else from a bearer header.
pub fn session_token(jar: &CookieJar, headers: &HeaderMap) -> Option<String> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// Verify the request's token, renewing it when it has expired and a
/// refresh token is available.
///
/// The returned jar carries the renewed cookies, or removals when the
/// session cannot be recovered.
pub async fn authenticate(
    state: &AppState,
    jar: CookieJar,
    headers: &HeaderMap,
) -> (Result<Session, AppError>, CookieJar) {
    let Some(token) = session_token(&jar, headers) else {
        return (Err(AppError::Unauthorized), jar);
    };
    let refresh_token = jar.get(REFRESH_COOKIE).map(|c| c.value().to_string());

    match state.verifier.verify(&token).await {
        Ok(mut session) => {
            session.refresh_token = refresh_token;
            (Ok(session), jar)
        }
        Err(TokenError::Expired) => match refresh_token {
            Some(refresh_token) => renew(state, jar, &refresh_token).await,
            None => {
                tracing::debug!("Session token expired without a refresh token");
                (Err(AppError::InvalidToken), clear_session(jar))
            }
        },
        Err(TokenError::Invalid(reason)) => {
            tracing::debug!(reason = %reason, "Rejected session token");
            (Err(AppError::InvalidToken), jar)
        }
        Err(TokenError::Transient(reason)) => {
            tracing::warn!(reason = %reason, "Could not verify session token");
            (Err(AppError::Unavailable(reason)), jar)
        }
    }
}

/// Exchange the refresh token for a new ID token and verify it.
async fn renew(
    state: &AppState,
    jar: CookieJar,
    refresh_token: &str,
) -> (Result<Session, AppError>, CookieJar) {
    let tokens = match state.backends.identity.refresh_session(refresh_token).await {
        Ok(tokens) => tokens,
        Err(e) if e.code() == Some("auth/network-request-failed") => {
            tracing::warn!(error = %e, "Session refresh unreachable");
            return (Err(AppError::Unavailable(e.user_message())), jar);
        }
        Err(e) => {
            tracing::info!(error = %e, "Session refresh rejected");
            return (Err(AppError::InvalidToken), clear_session(jar));
        }
    };

    match state.verifier.verify(&tokens.id_token).await {
        Ok(mut session) => {
            tracing::debug!(uid = %session.uid, "Session renewed");
            session.refresh_token = Some(tokens.refresh_token);
            let jar = store_session(jar, &session);
            (Ok(session), jar)
        }
        Err(TokenError::Transient(reason)) => {
            tracing::warn!(reason = %reason, "Could not verify renewed token");
            (Err(AppError::Unavailable(reason)), jar)
        }
        Err(_) => {
            tracing::warn!("Renewed session token failed verification");
            (Err(AppError::InvalidToken), clear_session(jar))
        }
    }
}

/// Verify the request's token, if any. Unrecoverable or unverifiable tokens
/// count as no session.
pub async fn resolve_session(
    state: &AppState,
    jar: CookieJar,
    headers: &HeaderMap,
) -> (Option<Session>, CookieJar) {
    let (outcome, jar) = authenticate(state, jar, headers).await;
    (outcome.ok(), jar)
}

/// Middleware that requires a valid session.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let (outcome, jar) = authenticate(&state, jar, request.headers()).await;
    let session = match outcome {
        Ok(session) => session,
        Err(e) => return (jar, e).into_response(),
    };

    request.extensions_mut().insert(session);
    let response = next.run(request).await;

    // Cookies set by the handler (account deletion) win over a renewal.
    if response.headers().contains_key(header::SET_COOKIE) {
        response
    } else {
        (jar, response).into_response()
    }
}

fn auth_cookie(name: &'static str, value: String, path: &'static str) -> Cookie<'static> {
    Cookie::build((name, value))
        .path(path)
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .build()
}

fn removal(name: &'static str, path: &'static str) -> Cookie<'static> {
    let mut cookie = auth_cookie(name, String::new(), path);
    cookie.make_removal();
    cookie
}

/// Session cookie holding `id_token`.
pub fn session_cookie(id_token: String) -> Cookie<'static> {
    auth_cookie(SESSION_COOKIE, id_token, "/")
}

/// Refresh cookie; attributes match [`session_cookie`].
pub fn refresh_cookie(refresh_token: String) -> Cookie<'static> {
    auth_cookie(REFRESH_COOKIE, refresh_token, "/")
}

/// Store a signed-in session's tokens.
pub fn store_session(jar: CookieJar, session: &Session) -> CookieJar {
    let jar = jar.add(session_cookie(session.id_token.clone()));
    match &session.refresh_token {
        Some(refresh_token) => jar.add(refresh_cookie(refresh_token.clone())),
        None => jar.remove(removal(REFRESH_COOKIE, "/")),
    }
}

/// Remove both session cookies.
pub fn clear_session(jar: CookieJar) -> CookieJar {
    jar.remove(removal(SESSION_COOKIE, "/"))
        .remove(removal(REFRESH_COOKIE, "/"))
}

/// Remember a started federated sign-in until the provider returns.
pub fn store_oauth_state(
    jar: CookieJar,
    provider: FederatedProvider,
    session_id: &str,
) -> CookieJar {
    jar.add(auth_cookie(
        OAUTH_COOKIE,
        format!("{}:{}", provider.as_str(), session_id),
        OAUTH_COOKIE_PATH,
    ))
}

/// Take the pending federated sign-in, removing its cookie.
pub fn take_oauth_state(jar: CookieJar) -> (Option<(FederatedProvider, String)>, CookieJar) {
    let pending = jar.get(OAUTH_COOKIE).and_then(|cookie| {
        let (provider, session_id) = cookie.value().split_once(':')?;
        let provider = provider.parse().ok()?;
        (!session_id.is_empty()).then(|| (provider, session_id.to_string()))
    });
    (pending, jar.remove(removal(OAUTH_COOKIE, OAUTH_COOKIE_PATH)))
}
