//! Partial updates applied to a stored clip.

use crate::models::ClipSession;

/// How an update touches the image gallery.
#[derive(Clone, Debug, PartialEq)]
pub enum ImagesUpdate {
    /// Replace the whole gallery. An empty vector clears it.
    Replace(Vec<String>),
    /// Push one image onto the end of the gallery.
    Append(String),
}

/// A validated change to a clip. Fields left as `None` are untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClipUpdate {
    pub text: Option<String>,
    pub images: Option<ImagesUpdate>,
}

impl ClipUpdate {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            images: None,
        }
    }

    pub fn with_images(mut self, images: ImagesUpdate) -> Self {
        self.images = Some(images);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.images.is_none()
    }
}

impl ClipSession {
    /// Apply an update in place. Text always replaces; images follow [`ImagesUpdate`].
    pub fn apply(&mut self, update: &ClipUpdate) {
        if let Some(text) = &update.text {
            self.text = text.clone();
        }
        match &update.images {
            Some(ImagesUpdate::Replace(images)) => self.images = images.clone(),
            Some(ImagesUpdate::Append(image)) => self.images.push(image.clone()),
            None => {}
        }
    }
}
