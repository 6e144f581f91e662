use std::sync::Arc;

use crate::backend::Backend;
use crate::clip::ClipService;
use crate::session::SessionService;
use crate::settings::Server;

pub type SharedState = Arc<AppState>;

/// Everything the HTTP handlers need, built once at startup.
pub struct AppState {
    pub sessions: SessionService<Backend>,
    pub clips: ClipService<Backend>,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(backend: Backend, server: &Server) -> SharedState {
        Arc::new(Self {
            sessions: SessionService::new(backend.clone(), &server.public_url),
            clips: ClipService::new(backend),
            max_body_bytes: server.max_body_bytes,
        })
    }
}
