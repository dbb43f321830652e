//! Loader decorator that opens sealed envelopes

use crate::loader::Loader;
use crate::resource::ResourceRef;
use sealgen_core::{Error, Result};
use sealgen_envelope::Decryptor;
use std::path::Path;
use std::sync::Arc;

/// Wraps a raw loader; sealed content comes out as plaintext and anything
/// that is not an envelope comes out unchanged
pub struct DecryptingLoader {
    inner: Box<dyn Loader>,
    decryptor: Arc<dyn Decryptor>,
}

impl DecryptingLoader {
    pub fn new(inner: Box<dyn Loader>, decryptor: Arc<dyn Decryptor>) -> Self {
        Self { inner, decryptor }
    }
}

impl Loader for DecryptingLoader {
    fn root(&self) -> &Path {
        self.inner.root()
    }

    fn descend(&self, path: &str) -> Result<Box<dyn Loader>> {
        let inner = self.inner.descend(path)?;
        Ok(Box::new(DecryptingLoader::new(inner, Arc::clone(&self.decryptor))))
    }

    fn load(&self, resource: &ResourceRef) -> Result<Vec<u8>> {
        let raw = self.inner.load(resource)?;
        let format = resource.format();

        match self.decryptor.decrypt(&raw, format) {
            Ok(Some(plaintext)) => {
                tracing::debug!(path = %resource.path, %format, "Opened sealed resource");
                Ok(plaintext)
            }
            Ok(None) => {
                tracing::trace!(path = %resource.path, %format, "Resource is not sealed");
                Ok(raw)
            }
            Err(e) => Err(Error::decryption(&resource.path, e.to_string())),
        }
    }

    fn cleanup(&self) -> Result<()> {
        self.inner.cleanup()
    }
}
