pub mod images;
pub mod models;
pub mod repo;
pub mod update;

mod memory;
pub use memory::MemoryStore;

pub use images::{encode_upload, validate_data_uri, ImageError, ImageKind, ImageUpload, MAX_IMAGE_BYTES};
pub use models::{ClipInfo, ClipSession, ClipState, PLACEHOLDER_TEXT};
pub use repo::{ClipStore, StoreError};
pub use update::{ClipUpdate, ImagesUpdate};
