use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::Duration;

use crate::detection::infrastructure::model_resolver;
use crate::shared::constants::{FACE_MESH_MODEL_NAME, FACE_MESH_MODEL_URL};

/// Shared face-mesh model cache that resolves the model once in the
/// background. Concurrent session starts wait on the same in-flight
/// resolution instead of each issuing their own download.
pub struct ModelCache {
    slot: Arc<ModelSlot>,
}

struct ModelSlot {
    result: Mutex<Option<Result<PathBuf, String>>>,
    ready: Condvar,
    progress: Arc<Mutex<(u64, u64)>>,
}

impl ModelCache {
    /// Create a new `ModelCache` and begin resolving in the background.
    pub fn new() -> Arc<Self> {
        let cache = Arc::new(Self {
            slot: Arc::new(ModelSlot::new()),
        });

        let slot = cache.slot.clone();
        thread::spawn(move || {
            slot.resolve(FACE_MESH_MODEL_NAME, FACE_MESH_MODEL_URL);
        });

        cache
    }

    /// Wait for the face-mesh model path. Calls `on_progress(downloaded,
    /// total)` while a download is in progress. Returns early if
    /// `cancelled` is set.
    pub fn wait_for_face_mesh(
        &self,
        on_progress: &dyn Fn(u64, u64),
        cancelled: &AtomicBool,
    ) -> Result<PathBuf, String> {
        self.slot.wait(on_progress, cancelled)
    }
}

impl ModelSlot {
    fn new() -> Self {
        Self {
            result: Mutex::new(None),
            ready: Condvar::new(),
            progress: Arc::new(Mutex::new((0, 0))),
        }
    }

    fn resolve(&self, name: &str, url: &str) {
        let progress_mutex = self.progress.clone();
        let result = model_resolver::resolve(
            name,
            url,
            None,
            Some(Box::new(move |downloaded, total| {
                *progress_mutex.lock().unwrap() = (downloaded, total);
            })),
        );
        *self.result.lock().unwrap() = Some(result.map_err(|e| e.to_string()));
        self.ready.notify_all();
    }

    fn wait(
        &self,
        on_progress: &dyn Fn(u64, u64),
        cancelled: &AtomicBool,
    ) -> Result<PathBuf, String> {
        let mut guard = self.result.lock().unwrap();
        loop {
            if cancelled.load(Ordering::Relaxed) {
                return Err("Cancelled".into());
            }
            if let Some(ref result) = *guard {
                return result.clone();
            }
            // Forward download progress while waiting
            if let Ok(progress) = self.progress.try_lock() {
                let (dl, total) = *progress;
                if total > 0 {
                    on_progress(dl, total);
                }
            }
            let (new_guard, _) = self
                .ready
                .wait_timeout(guard, Duration::from_millis(100))
                .unwrap();
            guard = new_guard;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_wait_returns_early() {
        // A slot that never resolves; the cancelled flag must break the wait.
        let slot = ModelSlot::new();
        let cancelled = AtomicBool::new(true);
        let result = slot.wait(&|_, _| {}, &cancelled);
        assert!(result.is_err());
    }

    #[test]
    fn test_resolved_slot_is_shared_by_waiters() {
        let slot = Arc::new(ModelSlot::new());
        *slot.result.lock().unwrap() = Some(Ok(PathBuf::from("/tmp/face_mesh_468.onnx")));

        let cancelled = AtomicBool::new(false);
        for _ in 0..3 {
            let path = slot.wait(&|_, _| {}, &cancelled).unwrap();
            assert_eq!(path, PathBuf::from("/tmp/face_mesh_468.onnx"));
        }
    }
}
