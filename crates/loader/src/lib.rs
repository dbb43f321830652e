//! Resource loading for secret sources.
//!
//! A [`Loader`] resolves resource references relative to a root. The raw
//! loaders ([`FileLoader`], [`InMemoryLoader`]) return bytes as stored;
//! [`DecryptingLoader`] decorates any of them so that sealed envelopes are
//! opened on the way out and everything else passes through unchanged.

mod decrypting;
mod file;
mod format;
mod guard;
mod loader;
mod memory;
mod resource;

pub use decrypting::DecryptingLoader;
pub use file::{FileLoader, LoadRestrictions};
pub use format::{classify, classify_as};
pub use guard::LoaderGuard;
pub use loader::Loader;
pub use memory::InMemoryLoader;
pub use resource::{ResourceRef, SourceRole};
