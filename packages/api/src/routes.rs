//! # HTTP routes
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | `GET` | `/health` | liveness probe |
//! | `GET` | `/session` | create a session, return id, URL and QR |
//! | `GET` | `/session/{session_id}` | read a clip |
//! | `PUT` | `/session/{session_id}` | update a clip (JSON or multipart) |
//!
//! The update body is decoded by the [`FromRequest`] impl for [`ClipPayload`],
//! which dispatches on `Content-Type`. Request bodies are capped by
//! `server.max_body_bytes` rather than axum's 2 MB default so that an oversized
//! image reaches validation and gets a proper 400.

use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, FromRequest, Multipart, Path, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::routing::get;
use axum::{Json, Router};
use store::ImageUpload;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::ClipError;
use crate::models::{ClipEnvelope, Health, SessionCreated};
use crate::payload::{ClipPayload, StructuredPayload};
use crate::state::SharedState;

pub fn router(state: SharedState) -> Router {
    let body_limit = state.max_body_bytes;

    Router::new()
        .route("/health", get(health))
        .route("/session", get(create_session))
        .route("/session/{session_id}", get(get_clip).put(update_clip))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<Health> {
    Json(Health { success: true })
}

async fn create_session(
    State(state): State<SharedState>,
) -> Result<Json<SessionCreated>, ClipError> {
    let created = state.sessions.create_session().await?;
    Ok(Json(SessionCreated {
        success: true,
        session_id: created.session_id,
        session_url: created.session_url,
        qr_image: created.qr_image,
    }))
}

async fn get_clip(
    State(state): State<SharedState>,
    Path(session_id): Path<String>,
) -> Result<Json<ClipEnvelope>, ClipError> {
    let clip = state.clips.get_clip(&session_id).await?;
    Ok(Json(ClipEnvelope::new(clip)))
}

async fn update_clip(
    State(state): State<SharedState>,
    Path(session_id): Path<String>,
    payload: ClipPayload,
) -> Result<Json<ClipEnvelope>, ClipError> {
    let clip = state.clips.update_clip(&session_id, payload).await?;
    Ok(Json(ClipEnvelope::new(clip)))
}

impl<S> FromRequest<S> for ClipPayload
where
    S: Send + Sync,
{
    type Rejection = ClipError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("application/json") {
            let Json(body) = Json::<StructuredPayload>::from_request(req, state)
                .await
                .map_err(|e| ClipError::Validation(e.body_text()))?;
            Ok(ClipPayload::Structured(body))
        } else if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| ClipError::Validation(e.body_text()))?;
            read_multipart(multipart).await
        } else {
            Err(ClipError::Validation(format!(
                "Unsupported content type: {content_type:?}"
            )))
        }
    }
}

fn multipart_error(e: MultipartError) -> ClipError {
    ClipError::Validation(e.body_text())
}

/// Collect the `text` field and every non-empty `images` part.
async fn read_multipart(mut multipart: Multipart) -> Result<ClipPayload, ClipError> {
    let mut text = None;
    let mut images = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("text") => text = Some(field.text().await.map_err(multipart_error)?),
            Some("images") => {
                let content_type = field.content_type().map(str::to_owned);
                let bytes = field.bytes().await.map_err(multipart_error)?;
                // Empty file inputs still submit a zero-length part
                if bytes.is_empty() {
                    continue;
                }
                images.push(ImageUpload {
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            _ => {}
        }
    }

    Ok(ClipPayload::Multipart { text, images })
}
