//! # Domain models for clipboard sessions
//!
//! Defines the single persistent entity, [`ClipSession`], and its client-facing
//! projection [`ClipInfo`]. `ClipInfo` is `Serialize + Deserialize` with camelCase
//! field names so it can be returned by the HTTP API and decoded by the client.
//!
//! ## Types
//!
//! | Struct | Represents |
//! |--------|-----------|
//! | [`ClipSession`] | A full stored record: identifier, text, image gallery and creation time. |
//! | [`ClipInfo`] | `{sessionId, text, images}` — what readers see. |
//! | [`ClipState`] | Whether a clip still holds its creation placeholder. |
//!
//! A fresh session always starts with [`PLACEHOLDER_TEXT`] and no images. Pollers
//! compare against the placeholder to detect the first real save.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Text stored in a session before anyone saves real content.
pub const PLACEHOLDER_TEXT: &str = "Demo-text";

/// A stored clipboard session.
#[derive(Clone, Debug, PartialEq)]
pub struct ClipSession {
    pub session_id: String,
    pub text: String,
    /// Data-URI encoded images, in insertion order.
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl ClipSession {
    /// Create a record in the placeholder state.
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            text: PLACEHOLDER_TEXT.to_string(),
            images: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Convert to ClipInfo for client consumption.
    pub fn to_info(&self) -> ClipInfo {
        ClipInfo {
            session_id: self.session_id.clone(),
            text: self.text.clone(),
            images: self.images.clone(),
        }
    }
}

/// Clip contents safe to send to any holder of the session id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipInfo {
    pub session_id: String,
    pub text: String,
    #[serde(default)]
    pub images: Vec<String>,
}

/// The two observable states of a clip.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClipState {
    Placeholder,
    Populated,
}

impl ClipInfo {
    pub fn state(&self) -> ClipState {
        if self.text == PLACEHOLDER_TEXT && self.images.is_empty() {
            ClipState::Placeholder
        } else {
            ClipState::Populated
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_placeholder() {
        let clip = ClipSession::new("abc");
        assert_eq!(clip.text, PLACEHOLDER_TEXT);
        assert!(clip.images.is_empty());
        assert_eq!(clip.to_info().state(), ClipState::Placeholder);
    }

    #[test]
    fn test_image_alone_populates() {
        let mut info = ClipSession::new("abc").to_info();
        info.images.push("data:image/png;base64,AAAA".to_string());
        assert_eq!(info.state(), ClipState::Populated);
    }

    #[test]
    fn test_info_uses_camel_case() {
        let info = ClipSession::new("abc").to_info();
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["sessionId"], "abc");
        assert_eq!(json["text"], PLACEHOLDER_TEXT);
        assert!(json["images"].as_array().unwrap().is_empty());
    }
}
