use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::models::ClipSession;
use crate::repo::{ClipStore, StoreError};
use crate::update::ClipUpdate;

/// In-memory ClipStore for testing and single-process deployments.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    clips: Arc<Mutex<HashMap<String, ClipSession>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().map(|clips| clips.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, ClipSession>>, StoreError> {
        self.clips
            .lock()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))
    }
}

impl ClipStore for MemoryStore {
    async fn insert(&self, clip: ClipSession) -> Result<(), StoreError> {
        let mut clips = self.lock()?;
        match clips.entry(clip.session_id.clone()) {
            Entry::Occupied(entry) => Err(StoreError::Duplicate(entry.key().clone())),
            Entry::Vacant(entry) => {
                entry.insert(clip);
                Ok(())
            }
        }
    }

    async fn find(&self, session_id: &str) -> Result<Option<ClipSession>, StoreError> {
        Ok(self.lock()?.get(session_id).cloned())
    }

    async fn apply(
        &self,
        session_id: &str,
        update: &ClipUpdate,
    ) -> Result<Option<ClipSession>, StoreError> {
        let mut clips = self.lock()?;
        Ok(clips.get_mut(session_id).map(|clip| {
            clip.apply(update);
            clip.clone()
        }))
    }
}
