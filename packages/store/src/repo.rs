//! # ClipStore — the session store abstraction
//!
//! All reads and writes of clip records go through the [`ClipStore`] trait, so the
//! services work unchanged against the in-memory store ([`crate::MemoryStore`],
//! used by tests and single-process deployments) or a database-backed store.
//!
//! Implementations must make each method atomic for a single record: an
//! [`apply`](ClipStore::apply) either lands completely or not at all, and readers
//! never observe half-written records. There is no cross-record transaction and
//! no versioning; concurrent writers to the same session race and the last write
//! wins.

use std::future::Future;

use thiserror::Error;

use crate::models::ClipSession;
use crate::update::ClipUpdate;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A record with this session id already exists.
    #[error("Session id already exists: {0}")]
    Duplicate(String),
    /// The backing store is unreachable or rejected the operation.
    #[error("Store unavailable: {0}")]
    Backend(String),
}

/// Async storage for clip sessions.
pub trait ClipStore: Clone + Send + Sync + 'static {
    /// Insert a new record. Fails with [`StoreError::Duplicate`] if the id is taken.
    fn insert(
        &self,
        clip: ClipSession,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Look up a record by session id.
    fn find(
        &self,
        session_id: &str,
    ) -> impl Future<Output = Result<Option<ClipSession>, StoreError>> + Send;

    /// Atomically apply an update and return the new record, or `None` if no
    /// record matches.
    fn apply(
        &self,
        session_id: &str,
        update: &ClipUpdate,
    ) -> impl Future<Output = Result<Option<ClipSession>, StoreError>> + Send;
}
