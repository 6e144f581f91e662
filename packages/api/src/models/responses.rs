//! # Response bodies for the session endpoints
//!
//! Every body carries a `success` flag so older browser clients that only look
//! at the flag keep working; failures additionally use a non-2xx status code
//! (see [`crate::ClipError`]). Field names are camelCase on the wire.
//!
//! | Struct | Endpoint |
//! |--------|----------|
//! | [`SessionCreated`] | `GET /session` |
//! | [`ClipEnvelope`] | `GET /session/{id}`, `PUT /session/{id}` |
//! | [`ErrorBody`] | any failure |
//! | [`Health`] | `GET /health` |

use serde::{Deserialize, Serialize};
use store::ClipInfo;

/// A newly created session and the link to share it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionCreated {
    pub success: bool,
    pub session_id: String,
    pub session_url: String,
    /// QR code of `session_url` as a `data:image/svg+xml;base64,` URI.
    pub qr_image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClipEnvelope {
    pub success: bool,
    pub clip: ClipInfo,
}

impl ClipEnvelope {
    pub fn new(clip: ClipInfo) -> Self {
        Self {
            success: true,
            clip,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Health {
    pub success: bool,
}
