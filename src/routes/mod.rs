// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP route handlers.
//!
//! Form and API handlers run one workflow operation against an
//! [`EffectLog`] and return the recorded effects for the page to apply.

pub mod api;
pub mod auth;
pub mod pages;

use crate::error::AppError;
use crate::middleware::auth::require_auth;
use crate::workflow::{Effect, EffectLog};
use crate::AppState;
use axum::http::{header, Method};
use axum::{middleware, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/generated/")
)]
pub struct HealthResponse {
    pub status: String,
    pub build_id: String,
}

/// Effects produced by one workflow operation.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/generated/")
)]
pub struct PageEffects {
    pub ok: bool,
    /// Provider error code (`auth/...`, `storage/...`) on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub effects: Vec<Effect>,
}

impl PageEffects {
    pub fn from_outcome<T>(log: &EffectLog, outcome: &Result<T, AppError>) -> Self {
        match outcome {
            Ok(_) => Self {
                ok: true,
                code: None,
                effects: log.effects(),
            },
            Err(e) => Self {
                ok: false,
                code: e.code().map(str::to_string),
                effects: log.effects(),
            },
        }
    }
}

/// Health check response
async fn health_check() -> Json<HealthResponse> {
    let build_id = option_env!("BUILD_ID").unwrap_or("unknown").to_string();
    Json(HealthResponse {
        status: "ok".to_string(),
        build_id,
    })
}

/// Build the complete router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS layer - pages are same-origin; allow localhost for dev
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::AllowOrigin::predicate(
            |origin: &axum::http::HeaderValue, _request_parts: &axum::http::request::Parts| {
                let origin_str = origin.to_str().unwrap_or("");
                origin_str.starts_with("http://localhost")
                    || origin_str.starts_with("http://127.0.0.1")
            },
        ))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .merge(pages::routes(&state.config.static_dir))
        .merge(auth::routes());

    // Protected routes (auth required)
    let protected_routes =
        api::routes(state.config.max_upload_bytes).route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(middleware::from_fn(
            crate::middleware::security::add_security_headers,
        ))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

#[cfg(all(test, feature = "binding-generation"))]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn bindings_export_into_web_generated() {
        assert_eq!(
            PageEffects::output_path(),
            Some(PathBuf::from("web/generated/PageEffects.ts"))
        );
        assert_eq!(
            Effect::output_path(),
            Some(PathBuf::from("web/generated/Effect.ts"))
        );
    }
}
