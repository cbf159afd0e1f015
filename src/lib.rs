// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Yourverse: personal profiles with a photo and a recorded voice intro.
//!
//! The [`workflow`] module holds the page-level flows (sign-in, profile
//! load and save, account deletion) over hosted identity, document, and
//! media services. The HTTP shell in [`routes`] runs those flows for the
//! browser and serves the pages.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod workflow;

use config::Config;
use services::FirebaseTokenVerifier;
use std::sync::Arc;
use workflow::Backends;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub backends: Backends,
    pub verifier: Arc<FirebaseTokenVerifier>,
}
