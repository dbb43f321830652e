//! Envelope encryption for sealed secret sources
//!
//! Sealed files keep their shape: every scalar value of a YAML, JSON or
//! dotenv document is encrypted on its own, and a metadata section carries the
//! wrapped data key for each recipient master key plus a MAC over all
//! plaintext values. Binary content is sealed as a single value.
//!
//! The generator only sees this crate through the [`Decryptor`] trait.

mod cipher;
mod engine;
mod error;
mod keyring;
mod metadata;
mod store;
mod tree;

pub use engine::{Decryptor, SealEngine};
pub use error::{EnvelopeError, EnvelopeResult};
pub use keyring::{Keyring, MasterKey};
pub use metadata::{ENVELOPE_VERSION, METADATA_KEY};
