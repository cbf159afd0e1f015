// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Guarded HTML pages.

use crate::middleware::auth::resolve_session;
use crate::workflow::{Route, SessionGuard};
use crate::AppState;
use axum::{
    extract::{Request, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use std::path::Path;
use std::sync::Arc;
use tower::ServiceExt;
use tower_http::services::ServeFile;

/// Page script, served unguarded.
pub const SCRIPT_PATH: &str = "/app.js";

/// One route per page in the route table, plus the page script.
pub fn routes(static_dir: &Path) -> Router<Arc<AppState>> {
    let pages = Route::ALL.into_iter().fold(Router::new(), |router, route| {
        router.route(
            route.path(),
            get(
                move |State(state): State<Arc<AppState>>, jar: CookieJar, request: Request| {
                    serve_page(state, route, jar, request)
                },
            ),
        )
    });

    pages.route_service(SCRIPT_PATH, ServeFile::new(static_dir.join("app.js")))
}

/// Apply the session guard, then serve the page file.
async fn serve_page(
    state: Arc<AppState>,
    route: Route,
    jar: CookieJar,
    request: Request,
) -> Response {
    let (session, jar) = resolve_session(&state, jar, request.headers()).await;

    if let Some(navigation) = SessionGuard::evaluate(route, session.as_ref()) {
        tracing::debug!(
            from = route.path(),
            to = navigation.target.path(),
            "Guard redirect"
        );
        return (jar, Redirect::to(navigation.target.path())).into_response();
    }

    let file = state.config.static_dir.join(route.page_file());
    match ServeFile::new(file).oneshot(request).await {
        Ok(response) => (jar, response).into_response(),
        Err(never) => match never {},
    }
}
