//! File system loader

use crate::loader::Loader;
use crate::resource::ResourceRef;
use sealgen_core::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

/// Where a file loader may read from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadRestrictions {
    /// Targets must resolve inside the loader root
    #[default]
    RootOnly,
    /// Any readable path
    None,
}

impl FromStr for LoadRestrictions {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rootonly" | "root-only" | "root_only" => Ok(Self::RootOnly),
            "none" => Ok(Self::None),
            other => Err(Error::configuration(format!(
                "unknown load restrictor '{other}', expected root-only or none"
            ))),
        }
    }
}

/// Loads resources from disk relative to a canonical root directory
#[derive(Debug, Clone)]
pub struct FileLoader {
    root: PathBuf,
    restrictions: LoadRestrictions,
    /// Roots already visited in this descend chain, including `root`
    visited: Arc<Vec<PathBuf>>,
}

impl FileLoader {
    pub fn new(root: impl AsRef<Path>, restrictions: LoadRestrictions) -> Result<Self> {
        let root = canonical_dir(root.as_ref())?;
        Ok(Self {
            visited: Arc::new(vec![root.clone()]),
            root,
            restrictions,
        })
    }

    #[must_use]
    pub fn restrictions(&self) -> LoadRestrictions {
        self.restrictions
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let target = self.root.join(path);
        let canonical = target
            .canonicalize()
            .map_err(|e| Error::load_with_source(path, "cannot resolve path", e))?;

        if self.restrictions == LoadRestrictions::RootOnly && !canonical.starts_with(&self.root) {
            return Err(Error::load(
                path,
                format!("path is outside of root '{}'", self.root.display()),
            ));
        }
        Ok(canonical)
    }
}

fn canonical_dir(path: &Path) -> Result<PathBuf> {
    let canonical = path
        .canonicalize()
        .map_err(|e| Error::file_system(path, "canonicalize root", e))?;
    if !canonical.is_dir() {
        return Err(Error::configuration(format!(
            "loader root '{}' is not a directory",
            path.display()
        )));
    }
    Ok(canonical)
}

impl Loader for FileLoader {
    fn root(&self) -> &Path {
        &self.root
    }

    fn descend(&self, path: &str) -> Result<Box<dyn Loader>> {
        let candidate = self.resolve(path)?;
        if !candidate.is_dir() {
            return Err(Error::load(path, "not a directory"));
        }
        if let Some(seen) = self.visited.iter().find(|seen| seen.starts_with(&candidate)) {
            return Err(Error::load(
                path,
                format!(
                    "cycle detected: candidate root '{}' contains visited root '{}'",
                    candidate.display(),
                    seen.display()
                ),
            ));
        }

        let mut visited = self.visited.as_ref().clone();
        visited.push(candidate.clone());
        tracing::debug!(root = %candidate.display(), "Descended into directory");
        Ok(Box::new(Self {
            root: candidate,
            restrictions: self.restrictions,
            visited: Arc::new(visited),
        }))
    }

    fn load(&self, resource: &ResourceRef) -> Result<Vec<u8>> {
        let target = self.resolve(&resource.path)?;
        fs::read(&target).map_err(|e| Error::load_with_source(&resource.path, "cannot read file", e))
    }

    fn cleanup(&self) -> Result<()> {
        Ok(())
    }
}
