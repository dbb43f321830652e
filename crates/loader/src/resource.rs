//! References to loadable resources

use crate::format::classify_as;
use sealgen_core::Format;
use std::fmt;

/// How a resource is consumed by the assembler
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SourceRole {
    /// Content becomes a single secret value
    #[default]
    File,
    /// Content is parsed as `KEY=VALUE` lines
    EnvFile,
}

/// A path relative to a loader root, tagged with the role it is loaded for
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceRef {
    pub path: String,
    pub role: SourceRole,
}

impl ResourceRef {
    pub fn new(path: impl Into<String>, role: SourceRole) -> Self {
        Self {
            path: path.into(),
            role,
        }
    }

    pub fn file(path: impl Into<String>) -> Self {
        Self::new(path, SourceRole::File)
    }

    pub fn env_file(path: impl Into<String>) -> Self {
        Self::new(path, SourceRole::EnvFile)
    }

    /// Envelope format for this reference, derived from its name and role
    #[must_use]
    pub fn format(&self) -> Format {
        classify_as(&self.path, self.role)
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}
