//! # Session creation
//!
//! [`SessionService::create_session`] mints a UUID v4 identifier, stores a
//! placeholder record under it, and returns the shareable session URL together
//! with a QR code of that URL. The QR is an SVG document wrapped in a
//! `data:image/svg+xml;base64,` URI so browsers can drop it straight into an
//! `<img src>`.
//!
//! Identifiers are assumed collision-free; if the store nevertheless reports a
//! duplicate, a fresh id is drawn up to [`MAX_ID_ATTEMPTS`] times before giving up.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use qrcode::render::svg;
use qrcode::QrCode;
use store::{ClipSession, ClipStore, StoreError};
use uuid::Uuid;

use crate::error::ClipError;

pub const MAX_ID_ATTEMPTS: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct NewSession {
    pub session_id: String,
    pub session_url: String,
    pub qr_image: String,
}

/// Creates sessions and their share links.
#[derive(Clone, Debug)]
pub struct SessionService<S> {
    store: S,
    public_url: String,
}

impl<S: ClipStore> SessionService<S> {
    pub fn new(store: S, public_url: &str) -> Self {
        Self {
            store,
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn session_url(&self, session_id: &str) -> String {
        format!("{}/session/{}", self.public_url, session_id)
    }

    pub async fn create_session(&self) -> Result<NewSession, ClipError> {
        let session_id = self.insert_fresh(|| Uuid::new_v4().to_string()).await?;
        tracing::info!(%session_id, "clip session saved");

        let session_url = self.session_url(&session_id);
        let qr_image = qr_data_uri(&session_url)?;
        tracing::debug!(%session_url, "QR code generated");

        Ok(NewSession {
            session_id,
            session_url,
            qr_image,
        })
    }

    async fn insert_fresh(
        &self,
        mut next_id: impl FnMut() -> String,
    ) -> Result<String, ClipError> {
        for attempt in 1..=MAX_ID_ATTEMPTS {
            let session_id = next_id();
            match self.store.insert(ClipSession::new(session_id.clone())).await {
                Ok(()) => return Ok(session_id),
                Err(StoreError::Duplicate(_)) => {
                    tracing::warn!(%session_id, attempt, "session id collision, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(ClipError::Persistence(format!(
            "no unique session id after {MAX_ID_ATTEMPTS} attempts"
        )))
    }
}

/// Encode `url` as an SVG QR code data URI.
pub fn qr_data_uri(url: &str) -> Result<String, ClipError> {
    let code = QrCode::new(url.as_bytes())
        .map_err(|e| ClipError::Encoding(format!("QR encoding failed: {e}")))?;
    let image = code
        .render::<svg::Color<'_>>()
        .min_dimensions(200, 200)
        .dark_color(svg::Color("#000000"))
        .light_color(svg::Color("#ffffff"))
        .build();
    Ok(format!(
        "data:image/svg+xml;base64,{}",
        STANDARD.encode(image.as_bytes())
    ))
}
