//! # Database module — PostgreSQL storage for clip sessions
//!
//! Entirely gated behind `#[cfg(feature = "server")]` so client builds never pull
//! in SQLx.
//!
//! ## Design
//!
//! [`LazyPool`] wraps a [`tokio::sync::OnceCell`]. The first call to
//! [`LazyPool::get`] opens a pool with `max_connections` connections, runs the
//! embedded migrations in `migrations/`, and caches the pool for every later
//! caller. The handle is created by the server at startup and injected into
//! [`PgClipStore`]; nothing here is a global.
//!
//! ## Re-exports
//!
//! - [`LazyPool`] — acquire-on-first-use connection handle.
//! - [`PgClipStore`] — [`store::ClipStore`] over the `clips` table.

#[cfg(feature = "server")]
mod clips;
#[cfg(feature = "server")]
mod pool;

#[cfg(feature = "server")]
pub use clips::PgClipStore;
#[cfg(feature = "server")]
pub use pool::LazyPool;
