//! Read and update operations on an existing clip session.

use store::{ClipInfo, ClipStore};

use crate::error::ClipError;
use crate::payload::ClipPayload;

/// Reads and mutates a session's text and image gallery.
#[derive(Clone, Debug)]
pub struct ClipService<S> {
    store: S,
}

impl<S: ClipStore> ClipService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Get the current contents of a session.
    pub async fn get_clip(&self, session_id: &str) -> Result<ClipInfo, ClipError> {
        self.store
            .find(session_id)
            .await?
            .map(|clip| clip.to_info())
            .ok_or_else(|| ClipError::NotFound(session_id.to_string()))
    }

    /// Validate a payload and apply it in one store write.
    pub async fn update_clip(
        &self,
        session_id: &str,
        payload: ClipPayload,
    ) -> Result<ClipInfo, ClipError> {
        let update = payload.into_update()?;

        let updated = self
            .store
            .apply(session_id, &update)
            .await?
            .ok_or_else(|| ClipError::NotFound(session_id.to_string()))?;

        tracing::debug!(
            session_id,
            text_changed = update.text.is_some(),
            images = updated.images.len(),
            "clip updated"
        );
        Ok(updated.to_info())
    }
}
