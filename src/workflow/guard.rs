// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Route table and session guard.

use super::PageSurface;
use crate::models::Session;
use std::sync::Arc;
use tokio::sync::watch;

/// Who may stay on a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    /// Unauthenticated area; signed-in users are sent to the landing page.
    Public,
    /// Authenticated area; anonymous users are sent to the login page.
    Authenticated,
    /// Never redirected by the guard.
    Open,
}

/// Named pages of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Root,
    Login,
    Register,
    Home,
    Dashboard,
}

impl Route {
    pub const ALL: [Route; 5] = [
        Route::Root,
        Route::Login,
        Route::Register,
        Route::Home,
        Route::Dashboard,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Route::Root => "/",
            Route::Login => "/index.html",
            Route::Register => "/register.html",
            Route::Home => "/home.html",
            Route::Dashboard => "/dashboard.html",
        }
    }

    pub fn access(self) -> RouteAccess {
        match self {
            Route::Root | Route::Login | Route::Register => RouteAccess::Public,
            Route::Home => RouteAccess::Authenticated,
            Route::Dashboard => RouteAccess::Open,
        }
    }

    /// HTML file served for this route.
    pub fn page_file(self) -> &'static str {
        match self {
            Route::Root | Route::Login => "index.html",
            Route::Register => "register.html",
            Route::Home => "home.html",
            Route::Dashboard => "dashboard.html",
        }
    }

    pub fn from_path(path: &str) -> Option<Route> {
        Route::ALL.into_iter().find(|r| r.path() == path)
    }
}

/// How a navigation affects history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationMode {
    /// Regular navigation; adds a history entry.
    Assign,
    /// Replaces the current history entry.
    Replace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigation {
    pub target: Route,
    pub mode: NavigationMode,
}

impl Navigation {
    pub fn assign(target: Route) -> Self {
        Self {
            target,
            mode: NavigationMode::Assign,
        }
    }

    pub fn replace(target: Route) -> Self {
        Self {
            target,
            mode: NavigationMode::Replace,
        }
    }
}

/// Redirects between the authenticated and unauthenticated areas.
pub struct SessionGuard;

impl SessionGuard {
    /// Redirect (if any) for `route` given the current session.
    pub fn evaluate(route: Route, session: Option<&Session>) -> Option<Navigation> {
        match (route.access(), session) {
            (RouteAccess::Public, Some(_)) => Some(Navigation::replace(Route::Home)),
            (RouteAccess::Authenticated, None) => Some(Navigation::replace(Route::Login)),
            _ => None,
        }
    }

    /// Follow session changes for a page showing `route`.
    ///
    /// The current value is evaluated immediately (initial load), then once
    /// per change. Returns when the first redirect is issued, since the page
    /// is being left, or when the session source goes away.
    pub async fn watch(
        mut sessions: watch::Receiver<Option<Session>>,
        route: Route,
        surface: Arc<dyn PageSurface>,
    ) -> Option<Navigation> {
        loop {
            let redirect = {
                let session = sessions.borrow_and_update();
                Self::evaluate(route, session.as_ref())
            };

            if let Some(navigation) = redirect {
                tracing::debug!(
                    from = route.path(),
                    to = navigation.target.path(),
                    "Session guard redirect"
                );
                surface.navigate(navigation);
                return Some(navigation);
            }

            if sessions.changed().await.is_err() {
                return None;
            }
        }
    }
}
