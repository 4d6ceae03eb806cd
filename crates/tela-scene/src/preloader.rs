use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::SceneError;
use tela_surface::ImageHandle;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Slot {
    Pending,
    Ready(ImageHandle),
    Failed,
    Aborted,
}

/// Image registry with failure-tolerant readiness.
///
/// The embedder registers the keys it intends to load, then reports each
/// outcome. Failures and aborts count as processed: a scene whose assets
/// partially fail still becomes ready and renders what it has, it never
/// hangs on the progress screen.
#[derive(Debug, Default)]
pub struct ImagePreloader {
    slots: HashMap<String, Slot>,
}

impl ImagePreloader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Announce a key that will be loaded.
    pub fn register(&mut self, key: impl Into<String>) {
        self.slots.insert(key.into(), Slot::Pending);
    }

    fn mark(&mut self, key: &str, slot: Slot) -> Result<(), SceneError> {
        match self.slots.get_mut(key) {
            Some(s) => {
                *s = slot;
                Ok(())
            }
            None => Err(SceneError::UnknownImage(key.to_string())),
        }
    }

    pub fn mark_loaded(&mut self, key: &str, handle: ImageHandle) -> Result<(), SceneError> {
        debug!(key, "image loaded");
        self.mark(key, Slot::Ready(handle))
    }

    pub fn mark_failed(&mut self, key: &str) -> Result<(), SceneError> {
        warn!(key, "image failed to load");
        self.mark(key, Slot::Failed)
    }

    pub fn mark_aborted(&mut self, key: &str) -> Result<(), SceneError> {
        warn!(key, "image load aborted");
        self.mark(key, Slot::Aborted)
    }

    fn counts(&self) -> (usize, usize, usize, usize) {
        let mut loaded = 0;
        let mut failed = 0;
        let mut aborted = 0;
        for slot in self.slots.values() {
            match slot {
                Slot::Ready(_) => loaded += 1,
                Slot::Failed => failed += 1,
                Slot::Aborted => aborted += 1,
                Slot::Pending => {}
            }
        }
        (self.slots.len(), loaded, failed, aborted)
    }

    /// Fraction of registered images with a final outcome. An empty
    /// registry is complete.
    pub fn progress(&self) -> f64 {
        let (total, loaded, failed, aborted) = self.counts();
        if total == 0 {
            return 1.0;
        }
        (loaded + failed + aborted) as f64 / total as f64
    }

    pub fn is_ready(&self) -> bool {
        self.progress() >= 1.0
    }

    /// A successfully loaded image. Missing keys and non-loaded outcomes
    /// both read as unknown.
    pub fn image(&self, key: &str) -> Result<ImageHandle, SceneError> {
        match self.slots.get(key) {
            Some(Slot::Ready(handle)) => Ok(*handle),
            _ => Err(SceneError::UnknownImage(key.to_string())),
        }
    }

    /// Human-readable load summary for diagnostics.
    pub fn summary(&self) -> String {
        let (total, loaded, failed, aborted) = self.counts();
        format!("images: {loaded}/{total} loaded, {failed} failed, {aborted} aborted")
    }
}
