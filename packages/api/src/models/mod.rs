//! Wire envelopes shared by the HTTP routes and the client.

mod responses;

pub use responses::{ClipEnvelope, ErrorBody, Health, SessionCreated};
