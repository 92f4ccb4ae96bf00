use std::future::Future;
use std::sync::{Arc, Mutex};

use crate::engine::splat::{self, SplatCloud};
use crate::viewer::ViewerError;

use super::fetch::{display_name, fetch_bytes};

type LoadResult = Result<SplatCloud, ViewerError>;

/// One-shot slot a background load resolves into.
///
/// The viewer polls it once per frame; [`PendingLoad::take`] hands the result
/// out exactly once, after which the slot reports nothing.
#[derive(Clone, Default)]
pub struct PendingLoad {
    slot: Arc<Mutex<Option<LoadResult>>>,
}

impl PendingLoad {
    /// A load whose result is already known.
    pub fn resolved(result: LoadResult) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(result))),
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn spawn(future: impl Future<Output = LoadResult> + 'static) -> Self {
        let pending = Self::default();
        let guard = ResolveGuard::new(&pending);
        wasm_bindgen_futures::spawn_local(async move {
            guard.resolve(future.await);
        });
        pending
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn spawn(future: impl Future<Output = LoadResult> + Send + 'static) -> Self {
        use bevy::tasks::{AsyncComputeTaskPool, TaskPool};

        let pending = Self::default();
        let guard = ResolveGuard::new(&pending);
        AsyncComputeTaskPool::get_or_init(TaskPool::default)
            .spawn(async move {
                guard.resolve(future.await);
            })
            .detach();
        pending
    }

    /// Fetch `url` and decode it in the background.
    pub fn from_url(url: &str) -> Self {
        let url = url.to_string();
        Self::spawn(async move {
            let bytes = fetch_bytes(&url).await?;
            decode_named(display_name(&url), &bytes)
        })
    }

    /// Decode bytes that are already in memory in the background.
    pub fn from_bytes(name: &str, bytes: Vec<u8>) -> Self {
        let name = name.to_string();
        Self::spawn(async move { decode_named(&name, &bytes) })
    }

    /// Read a local file and decode it in the background.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_path(path: std::path::PathBuf) -> Self {
        Self::spawn(async move {
            let bytes = super::fetch::read_path(&path)?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            decode_named(&name, &bytes)
        })
    }

    pub fn take(&self) -> Option<LoadResult> {
        self.slot.lock().ok().and_then(|mut slot| slot.take())
    }
}

/// Owned by a spawned load. Dropping it unresolved, when the task panics or is
/// cancelled, fills the slot with [`ViewerError::LoadAborted`].
struct ResolveGuard {
    slot: Arc<Mutex<Option<LoadResult>>>,
    resolved: bool,
}

impl ResolveGuard {
    fn new(pending: &PendingLoad) -> Self {
        Self {
            slot: pending.slot.clone(),
            resolved: false,
        }
    }

    fn resolve(mut self, result: LoadResult) {
        self.store(result);
        self.resolved = true;
    }

    fn store(&self, result: LoadResult) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(result);
        }
    }
}

impl Drop for ResolveGuard {
    fn drop(&mut self) {
        if !self.resolved {
            self.store(Err(ViewerError::LoadAborted));
        }
    }
}

fn decode_named(name: &str, bytes: &[u8]) -> LoadResult {
    splat::decode(name, bytes).map_err(|source| ViewerError::Decode {
        name: name.to_string(),
        source,
    })
}
