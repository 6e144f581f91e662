//! # API crate — services and transports for HostClip
//!
//! Everything between the domain model in `store` and the `hostclip` binary.
//! Client-side pieces compile without features; the HTTP server, Postgres
//! storage and configuration need `server`.
//!
//! ## Modules
//!
//! | Module | Feature gate | Purpose |
//! |--------|-------------|---------|
//! | [`clip`] | — | `ClipService`: read a clip, validate and apply updates |
//! | [`client`] | — | `ClipClient`: the HTTP API from the other side |
//! | [`error`] | — | `ClipError` and its HTTP status mapping |
//! | [`models`] | — | Response bodies shared by server and client |
//! | [`payload`] | — | JSON and multipart update payloads |
//! | [`poller`] | — | Interval poller with one-shot notifications |
//! | [`backend`] | `server` | Memory or Postgres store, chosen from settings |
//! | [`db`] | `server` | Lazily connected PostgreSQL pool and `PgClipStore` |
//! | [`routes`] | `server` | axum router for `/session` and `/health` |
//! | [`session`] | `server` | `SessionService`: new ids, share URLs and QR codes |
//! | [`settings`] | `server` | Layered configuration (`hostclip.toml`, env) |
//! | [`state`] | `server` | Shared handler state |

pub mod clip;
pub mod client;
pub mod db;
pub mod error;
pub mod models;
pub mod payload;
pub mod poller;

#[cfg(feature = "server")]
pub mod backend;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "server")]
pub mod session;
#[cfg(feature = "server")]
pub mod settings;
#[cfg(feature = "server")]
pub mod state;

pub use clip::ClipService;
pub use client::{ClientError, ClipClient};
pub use error::ClipError;
pub use models::{ClipEnvelope, ErrorBody, Health, SessionCreated};
pub use payload::{ClipPayload, JsonImages, StructuredPayload};
pub use poller::{
    ClipSource, Draft, DraftResolution, Notifier, PollEvent, PollState, Poller, TickOutcome,
};

pub use store::{ClipInfo, ClipState};

#[cfg(feature = "server")]
pub use backend::Backend;
#[cfg(feature = "server")]
pub use session::{NewSession, SessionService};
#[cfg(feature = "server")]
pub use settings::Settings;
#[cfg(feature = "server")]
pub use state::{AppState, SharedState};
