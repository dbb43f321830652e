use crate::resource::ResourceRef;
use sealgen_core::Result;
use std::path::Path;

/// Resolves resource references relative to a root
pub trait Loader: Send + Sync {
    /// Root against which relative references resolve
    fn root(&self) -> &Path;

    /// Loader of the same kind rooted at `path`, resolved against this root
    fn descend(&self, path: &str) -> Result<Box<dyn Loader>>;

    /// Load the content a reference points at
    ///
    /// # Returns
    /// * `Ok(bytes)` - the resource content
    /// * `Err(Error::Load)` - the resource could not be resolved or read
    fn load(&self, resource: &ResourceRef) -> Result<Vec<u8>>;

    /// Release whatever the loader holds. Called once by the owner of the chain.
    fn cleanup(&self) -> Result<()>;
}
