// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile storage: Firestore and an in-process store.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryProfileStore;

use crate::error::AppError;
use crate::models::{ProfileRecord, ProfileUpdate};
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    /// Profile records (keyed by uid)
    pub const USERS: &str = "users";
}

/// Per-user profile document storage.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch the profile for `uid`, if one exists.
    async fn get_profile(&self, uid: &str) -> Result<Option<ProfileRecord>, AppError>;

    /// Merge-write: create the record if missing, otherwise update only the
    /// fields present in `update`.
    async fn merge_profile(&self, uid: &str, update: &ProfileUpdate) -> Result<(), AppError>;

    /// Delete the profile. Deleting a missing record succeeds.
    async fn delete_profile(&self, uid: &str) -> Result<(), AppError>;
}
