//! Map-backed loader

use crate::loader::Loader;
use crate::resource::ResourceRef;
use sealgen_core::{Error, Result};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Serves staged content from memory.
///
/// Descended loaders share the same content and cleanup counter.
#[derive(Debug, Clone)]
pub struct InMemoryLoader {
    root: PathBuf,
    files: Arc<HashMap<PathBuf, Vec<u8>>>,
    cleanups: Arc<AtomicUsize>,
}

impl InMemoryLoader {
    pub fn new<I, P, C>(files: I) -> Self
    where
        I: IntoIterator<Item = (P, C)>,
        P: AsRef<Path>,
        C: Into<Vec<u8>>,
    {
        let files = files
            .into_iter()
            .map(|(path, content)| (normalize(Path::new("/"), path.as_ref()), content.into()))
            .collect();
        Self {
            root: PathBuf::from("/"),
            files: Arc::new(files),
            cleanups: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of times `cleanup` ran on this loader or any loader descended from it
    #[must_use]
    pub fn cleanup_count(&self) -> usize {
        self.cleanups.load(Ordering::SeqCst)
    }
}

/// Lexically join and normalize; `..` never climbs above `/`
fn normalize(root: &Path, path: &Path) -> PathBuf {
    let mut out = PathBuf::from("/");
    for component in root.join(path).components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::ParentDir => {
                out.pop();
            }
            _ => {}
        }
    }
    out
}

impl Loader for InMemoryLoader {
    fn root(&self) -> &Path {
        &self.root
    }

    fn descend(&self, path: &str) -> Result<Box<dyn Loader>> {
        let root = normalize(&self.root, Path::new(path));
        if !self.files.keys().any(|file| file.starts_with(&root) && file != &root) {
            return Err(Error::load(path, "no such directory"));
        }
        Ok(Box::new(Self {
            root,
            files: Arc::clone(&self.files),
            cleanups: Arc::clone(&self.cleanups),
        }))
    }

    fn load(&self, resource: &ResourceRef) -> Result<Vec<u8>> {
        self.files
            .get(&normalize(&self.root, Path::new(&resource.path)))
            .cloned()
            .ok_or_else(|| Error::load(&resource.path, "no such file"))
    }

    fn cleanup(&self) -> Result<()> {
        self.cleanups.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
