//! Shared instance holder.
//!
//! A [`Holder`] lazily builds exactly one value and hands out the same `Arc`
//! to every caller. The process-wide executor lives in one behind
//! [`shared()`]; tests either create their own holder or swap the global
//! occupant for the duration of a [`Substitution`] guard.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::client::ApiClient;
use crate::config::Config;

/// Observable lifecycle of a [`Holder`].
///
/// Construction happens under the holder's write lock, so callers never
/// observe a half-built value: they either see `Uninitialized` or wait and
/// then see `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HolderState {
    Uninitialized,
    Ready,
}

type Factory<T> = Box<dyn Fn() -> T + Send + Sync>;

/// Lazily constructed, shared, replaceable single instance.
pub struct Holder<T> {
    slot: RwLock<Option<Arc<T>>>,
    factory: Factory<T>,
    constructions: AtomicUsize,
}

impl<T> Holder<T> {
    /// Create a holder; `factory` runs on first access only.
    pub fn new(factory: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Self {
            slot: RwLock::new(None),
            factory: Box::new(factory),
            constructions: AtomicUsize::new(0),
        }
    }

    /// The shared instance, constructing it with the default factory if needed.
    pub fn get(&self) -> Arc<T> {
        self.get_or_init(|| (self.factory)())
    }

    /// The shared instance, constructing it with `init` if nothing is held yet.
    /// When an instance already exists `init` is not called.
    pub fn get_or_init(&self, init: impl FnOnce() -> T) -> Arc<T> {
        if let Some(existing) = self.slot.read().as_ref() {
            return Arc::clone(existing);
        }

        let mut slot = self.slot.write();
        // Another caller may have finished construction while we waited.
        if let Some(existing) = slot.as_ref() {
            return Arc::clone(existing);
        }
        let instance = Arc::new(init());
        let count = self.constructions.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(constructions = count, "Constructed shared instance");
        *slot = Some(Arc::clone(&instance));
        instance
    }

    pub fn state(&self) -> HolderState {
        if self.slot.read().is_some() {
            HolderState::Ready
        } else {
            HolderState::Uninitialized
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.state() == HolderState::Ready
    }

    /// How many times a value has been built by this holder (installed
    /// substitutes are not counted).
    pub fn constructions(&self) -> usize {
        self.constructions.load(Ordering::SeqCst)
    }

    /// Put `replacement` in place until the returned guard is dropped, then
    /// restore whatever was held before (including "nothing").
    #[must_use = "the substitute is removed when the guard is dropped"]
    pub fn install(&self, replacement: Arc<T>) -> Substitution<'_, T> {
        let previous = self.slot.write().replace(replacement);
        debug!(had_previous = previous.is_some(), "Installed substitute instance");
        Substitution {
            holder: self,
            previous: Some(previous),
        }
    }

    /// Drop the held instance; the next `get` constructs a fresh one.
    pub fn reset(&self) {
        self.slot.write().take();
    }
}

impl<T> fmt::Debug for Holder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Holder")
            .field("state", &self.state())
            .field("constructions", &self.constructions())
            .finish()
    }
}

/// Guard returned by [`Holder::install`].
pub struct Substitution<'a, T> {
    holder: &'a Holder<T>,
    previous: Option<Option<Arc<T>>>,
}

impl<T> Substitution<'_, T> {
    /// Restore the previous occupant now.
    pub fn restore(mut self) {
        self.put_back();
    }

    fn put_back(&mut self) {
        if let Some(previous) = self.previous.take() {
            *self.holder.slot.write() = previous;
            debug!("Restored previous shared instance");
        }
    }
}

impl<T> Drop for Substitution<'_, T> {
    fn drop(&mut self) {
        self.put_back();
    }
}

// ---------------------------------------------------------------------------
// Process-wide executor
// ---------------------------------------------------------------------------

static SHARED_CLIENT: LazyLock<Holder<ApiClient>> = LazyLock::new(|| {
    Holder::new(|| {
        let path = Config::default_path();
        let config = Config::load_or_default(&path);
        info!(
            base_url = %config.client.base_url,
            config = %path.display(),
            "Creating shared API client"
        );
        ApiClient::from_config(&config.client)
    })
});

/// The process-wide holder of the executor.
pub fn global() -> &'static Holder<ApiClient> {
    &SHARED_CLIENT
}

/// The process-wide executor, built from `SWITCHBOARD_CONFIG` on first use.
pub fn shared() -> Arc<ApiClient> {
    SHARED_CLIENT.get()
}

/// The process-wide executor, built by `init` if this is the first access.
pub fn shared_or_init(init: impl FnOnce() -> ApiClient) -> Arc<ApiClient> {
    SHARED_CLIENT.get_or_init(init)
}
