//! # HTTP client for a HostClip server
//!
//! [`ClipClient`] speaks the same JSON and multipart encodings the browser page
//! uses. Non-2xx answers are decoded from the `{success: false, message}` body
//! into [`ClientError::Api`].
//!
//! Image uploads are checked on the client before sending: files over 2 MiB or
//! not PNG/JPEG are dropped with a warning, so one bad file does not reject the
//! whole save on the server.

use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use store::{ClipInfo, ImageKind, ImageUpload};
use thiserror::Error;

use crate::models::{ClipEnvelope, ErrorBody, SessionCreated};
use crate::payload::StructuredPayload;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Clone, Debug)]
pub struct ClipClient {
    http: Client,
    base_url: String,
}

impl ClipClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: Client::builder()
                .timeout(Duration::from_secs(30))
                .connect_timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn session_endpoint(&self, session_id: &str) -> String {
        format!("{}/session/{}", self.base_url, session_id)
    }

    /// `GET /session`
    pub async fn create_session(&self) -> Result<SessionCreated, ClientError> {
        let resp = self
            .http
            .get(format!("{}/session", self.base_url))
            .send()
            .await?;
        decode(resp).await
    }

    /// `GET /session/{id}`
    pub async fn get_clip(&self, session_id: &str) -> Result<ClipInfo, ClientError> {
        let resp = self.http.get(self.session_endpoint(session_id)).send().await?;
        Ok(decode::<ClipEnvelope>(resp).await?.clip)
    }

    /// Save text only, as JSON. The gallery is left alone.
    pub async fn save_text(&self, session_id: &str, text: &str) -> Result<ClipInfo, ClientError> {
        let body = StructuredPayload {
            text: Some(text.to_string()),
            images: None,
        };
        let resp = self
            .http
            .put(self.session_endpoint(session_id))
            .json(&body)
            .send()
            .await?;
        Ok(decode::<ClipEnvelope>(resp).await?.clip)
    }

    /// Save text and images as multipart. Invalid uploads are skipped; if none
    /// remain the server keeps the current gallery.
    pub async fn save_with_images(
        &self,
        session_id: &str,
        text: Option<&str>,
        uploads: Vec<ImageUpload>,
    ) -> Result<ClipInfo, ClientError> {
        let mut form = Form::new();
        if let Some(text) = text {
            form = form.text("text", text.to_string());
        }

        for (index, upload) in uploads.into_iter().enumerate() {
            let kind = match upload.validate() {
                Ok(kind) => kind,
                Err(e) => {
                    tracing::warn!(index, "skipping image: {}", e);
                    continue;
                }
            };
            let part = Part::bytes(upload.bytes)
                .file_name(format!("image-{index}.{}", extension(kind)))
                .mime_str(kind.mime())?;
            form = form.part("images", part);
        }

        let resp = self
            .http
            .put(self.session_endpoint(session_id))
            .multipart(form)
            .send()
            .await?;
        Ok(decode::<ClipEnvelope>(resp).await?.clip)
    }
}

/// Read an image file, guessing its content type from the extension.
pub async fn load_image(path: &Path) -> Result<ImageUpload, ClientError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| ClientError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let content_type = mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string());
    Ok(ImageUpload {
        content_type,
        bytes,
    })
}

fn extension(kind: ImageKind) -> &'static str {
    match kind {
        ImageKind::Png => "png",
        ImageKind::Jpeg => "jpg",
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.json::<T>().await?);
    }

    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|err| err.message)
        .unwrap_or(body);
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}


#[cfg(all(test, feature = "server"))]
mod end_to_end {
    use super::*;
    use crate::backend::Backend;
    use crate::routes::router;
    use crate::settings::Settings;
    use crate::state::AppState;
    use store::{ClipState, MemoryStore, PLACEHOLDER_TEXT};

    const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    async fn spawn_server() -> ClipClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let mut settings = Settings::default();
        settings.server.public_url = format!("http://{addr}");
        let state = AppState::new(Backend::Memory(MemoryStore::new()), &settings.server);
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });

        ClipClient::new(&format!("http://{addr}"))
    }

    #[tokio::test]
    async fn test_share_and_save_over_http() {
        let client = spawn_server().await;

        let created = client.create_session().await.unwrap();
        assert!(created.success);
        assert!(created.session_url.ends_with(&created.session_id));

        let clip = client.get_clip(&created.session_id).await.unwrap();
        assert_eq!(clip.text, PLACEHOLDER_TEXT);
        assert_eq!(clip.state(), ClipState::Placeholder);

        let clip = client.save_text(&created.session_id, "über").await.unwrap();
        assert_eq!(clip.text, "über");

        let clip = client
            .save_with_images(
                &created.session_id,
                Some("with picture"),
                vec![
                    ImageUpload::new("image/png", PNG_BYTES.to_vec()),
                    ImageUpload::new("image/gif", b"GIF89a".to_vec()),
                ],
            )
            .await
            .unwrap();
        assert_eq!(clip.text, "with picture");
        assert_eq!(clip.images, vec!["data:image/png;base64,iVBORw0KGgo="]);
        assert_eq!(clip.state(), ClipState::Populated);
    }

    #[tokio::test]
    async fn test_unknown_session_maps_to_api_error() {
        let client = spawn_server().await;
        let err = client.get_clip("nope").await.unwrap_err();
        match err {
            ClientError::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Clip not found: nope");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
