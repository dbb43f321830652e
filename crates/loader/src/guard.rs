//! Scoped release of a loader chain

use crate::loader::Loader;
use sealgen_core::Result;
use std::ops::Deref;

/// Owns a loader chain for one request and cleans it up exactly once.
///
/// Call [`LoaderGuard::release`] on the success path to observe cleanup
/// errors. A guard dropped without release (early return or unwinding)
/// cleans up in `Drop` and logs any failure.
pub struct LoaderGuard {
    loader: Box<dyn Loader>,
    released: bool,
}

impl LoaderGuard {
    pub fn new(loader: Box<dyn Loader>) -> Self {
        Self {
            loader,
            released: false,
        }
    }

    /// Clean up now and report the result
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        self.loader.cleanup()
    }
}

impl Deref for LoaderGuard {
    type Target = dyn Loader;

    fn deref(&self) -> &Self::Target {
        self.loader.as_ref()
    }
}

impl Drop for LoaderGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.loader.cleanup() {
            tracing::warn!(root = %self.loader.root().display(), error = %e, "Loader cleanup failed");
        }
    }
}
