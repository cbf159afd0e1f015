// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process profile store for offline mode and tests.

use super::ProfileStore;
use crate::error::AppError;
use crate::models::{ProfileRecord, ProfileUpdate};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Profile store backed by a concurrent map. Clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryProfileStore {
    records: Arc<DashMap<String, ProfileRecord>>,
    writes: Arc<AtomicUsize>,
    fail_with: Arc<DashMap<&'static str, String>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record directly, bypassing the write counter.
    pub fn insert(&self, uid: &str, record: ProfileRecord) {
        self.records.insert(uid.to_string(), record);
    }

    /// Current record for `uid`, without going through the trait.
    pub fn snapshot(&self, uid: &str) -> Option<ProfileRecord> {
        self.records.get(uid).map(|r| r.value().clone())
    }

    /// Number of merge-writes performed.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make the named operation (`get`, `merge`, `delete`) fail with `message`.
    pub fn fail_on(&self, operation: &'static str, message: &str) {
        self.fail_with.insert(operation, message.to_string());
    }

    fn check(&self, operation: &'static str) -> Result<(), AppError> {
        match self.fail_with.get(operation) {
            Some(message) => Err(AppError::Database(message.value().clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn get_profile(&self, uid: &str) -> Result<Option<ProfileRecord>, AppError> {
        self.check("get")?;
        Ok(self.snapshot(uid))
    }

    async fn merge_profile(&self, uid: &str, update: &ProfileUpdate) -> Result<(), AppError> {
        self.check("merge")?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.records
            .entry(uid.to_string())
            .or_default()
            .merge(update);
        Ok(())
    }

    async fn delete_profile(&self, uid: &str) -> Result<(), AppError> {
        self.check("delete")?;
        self.records.remove(uid);
        Ok(())
    }
}
