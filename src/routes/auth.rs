// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account credential routes: register, login, federated sign-in, password
//! reset, logout.

use super::PageEffects;
use crate::middleware::auth::{clear_session, store_oauth_state, store_session, take_oauth_state};
use crate::services::{FederatedCredential, FederatedProvider};
use crate::workflow::credentials::{self, LoginForm, PasswordResetForm, RegisterForm};
use crate::workflow::{EffectLog, PageContext, Route};
use crate::AppState;
use axum::{
    extract::{Path, State},
    response::Redirect,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/federated", post(federated))
        .route("/auth/federated/{provider}", get(begin_federated))
        .route("/auth/password-reset", post(password_reset))
        .route("/auth/logout", get(logout))
}

fn page(state: &AppState) -> (Arc<EffectLog>, PageContext) {
    let log = Arc::new(EffectLog::new());
    let ctx = PageContext::new(state.backends.clone(), log.clone());
    (log, ctx)
}

/// Session cookies for a signed-in context, removals otherwise.
fn with_session_cookie(jar: CookieJar, ctx: &PageContext) -> CookieJar {
    match ctx.current_session() {
        Some(session) => store_session(jar, &session),
        None => clear_session(jar),
    }
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(form): Json<RegisterForm>,
) -> Json<PageEffects> {
    let (log, ctx) = page(&state);
    let outcome = credentials::register(&ctx, &form).await;
    Json(PageEffects::from_outcome(&log, &outcome))
}

async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(form): Json<LoginForm>,
) -> (CookieJar, Json<PageEffects>) {
    let (log, ctx) = page(&state);
    let outcome = credentials::login(&ctx, &form).await;
    (
        with_session_cookie(jar, &ctx),
        Json(PageEffects::from_outcome(&log, &outcome)),
    )
}

/// Send the browser to the provider's consent page.
///
/// Failures return to the login page with the message in `signInError`.
async fn begin_federated(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(provider): Path<FederatedProvider>,
) -> (CookieJar, Redirect) {
    let (_log, ctx) = page(&state);
    match credentials::begin_federated_sign_in(&ctx, provider, &state.config.oauth_continue_uri)
        .await
    {
        Ok(redirect) => (
            store_oauth_state(jar, provider, &redirect.session_id),
            Redirect::to(&redirect.auth_uri),
        ),
        Err(e) => {
            let target = format!(
                "{}?signInError={}",
                Route::Login.path(),
                urlencoding::encode(&e.user_message())
            );
            (jar, Redirect::to(&target))
        }
    }
}

/// Provider return, as posted by the page it landed on.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FederatedReturn {
    /// Full URL the provider redirected to, query included
    request_uri: String,
}

async fn federated(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(form): Json<FederatedReturn>,
) -> (CookieJar, Json<PageEffects>) {
    let (log, ctx) = page(&state);
    let (pending, jar) = take_oauth_state(jar);

    let outcome = match pending {
        Some((provider, session_id)) => {
            let credential = FederatedCredential {
                provider,
                request_uri: form.request_uri,
                session_id,
            };
            credentials::federated_sign_in(&ctx, &credential).await
        }
        None => Err(credentials::federated_sign_in_expired(&ctx)),
    };

    (
        with_session_cookie(jar, &ctx),
        Json(PageEffects::from_outcome(&log, &outcome)),
    )
}

async fn password_reset(
    State(state): State<Arc<AppState>>,
    Json(form): Json<PasswordResetForm>,
) -> Json<PageEffects> {
    let (log, ctx) = page(&state);
    let outcome = credentials::request_password_reset(&ctx, &form).await;
    Json(PageEffects::from_outcome(&log, &outcome))
}

/// Sign out and return to the login page.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (CookieJar, Redirect) {
    let (log, ctx) = page(&state);
    credentials::sign_out(&ctx);

    let target = log
        .navigation()
        .map(|(path, _)| path)
        .unwrap_or_else(|| Route::Login.path().to_string());

    (clear_session(jar), Redirect::to(&target))
}
