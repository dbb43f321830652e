//! Secret generation from sealed and plain sources.
//!
//! [`SecretRequest::bind`] reads a generator config, and
//! [`GeneratorContext::generate`] turns it into an [`AssembledSecret`] by
//! running the [`Assembler`] over either a [`DecryptingLoader`] (sealed
//! subtypes) or the raw loader.
//!
//! [`DecryptingLoader`]: sealgen_loader::DecryptingLoader

mod assembler;
mod dispatcher;
mod request;
mod secret;
mod sources;

pub use assembler::{Assembler, KeyValues, KvAssembler};
pub use dispatcher::GeneratorContext;
pub use request::SecretRequest;
pub use secret::{AssembledSecret, Manifest};
pub use sources::{parse_env_lines, parse_literal, validate_key, FileSource, Sources};
