//! # Update payloads
//!
//! `PUT /session/{id}` accepts two encodings, represented by [`ClipPayload`]:
//!
//! - **Structured** (`application/json`): `{"text": "...", "images": [...]}`. The
//!   `images` value is optional and may be an array of data URIs (replaces the
//!   gallery) or a single data-URI string (appended to the gallery).
//! - **Multipart** (`multipart/form-data`): a `text` field plus zero or more
//!   `images` file parts. One or more parts replace the gallery; none leaves it
//!   untouched.
//!
//! [`ClipPayload::into_update`] validates and encodes every image up front and
//! only then produces a [`ClipUpdate`], so an invalid image rejects the whole
//! payload before anything is written.

use serde::{Deserialize, Serialize};
use store::{encode_upload, validate_data_uri, ClipUpdate, ImageUpload, ImagesUpdate};

use crate::error::ClipError;

/// JSON body of a structured update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StructuredPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<JsonImages>,
}

/// The two shapes `images` may take in a JSON body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum JsonImages {
    Many(Vec<String>),
    One(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClipPayload {
    Structured(StructuredPayload),
    Multipart {
        text: Option<String>,
        images: Vec<ImageUpload>,
    },
}

impl ClipPayload {
    pub fn text(text: impl Into<String>) -> Self {
        ClipPayload::Structured(StructuredPayload {
            text: Some(text.into()),
            images: None,
        })
    }

    /// Validate and encode into a store update.
    pub fn into_update(self) -> Result<ClipUpdate, ClipError> {
        match self {
            ClipPayload::Structured(StructuredPayload { text, images }) => {
                let images = match images {
                    None => None,
                    Some(JsonImages::Many(uris)) => Some(ImagesUpdate::Replace(
                        uris.iter()
                            .map(|uri| validate_data_uri(uri))
                            .collect::<Result<Vec<_>, _>>()?,
                    )),
                    Some(JsonImages::One(uri)) => {
                        Some(ImagesUpdate::Append(validate_data_uri(&uri)?))
                    }
                };
                Ok(ClipUpdate { text, images })
            }
            ClipPayload::Multipart { text, images } => {
                let images = if images.is_empty() {
                    None
                } else {
                    Some(ImagesUpdate::Replace(
                        images
                            .iter()
                            .map(encode_upload)
                            .collect::<Result<Vec<_>, _>>()?,
                    ))
                };
                Ok(ClipUpdate { text, images })
            }
        }
    }
}
