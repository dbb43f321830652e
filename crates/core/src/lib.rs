//! Core domain types, errors, and constants for `sealgen`.
//!
//! ## Key Components
//!
//! - **`errors`**: the primary `Error` enum and `Result` alias. Every failure a
//!   generation request can hit maps onto one of its variants, so callers get a
//!   single error taxonomy regardless of which crate raised it.
//! - **`types`**: small closed enums shared by the loader, the envelope engine
//!   and the generator (`Format`, `Subtype`, `Behavior`).
//! - **`constants`**: environment variable names, manifest constants and the
//!   fixed TLS key schema.

pub mod constants;
pub mod errors;
pub mod types;

pub use self::{
    constants::*,
    errors::{Error, Result, ResultExt},
    types::*,
};
