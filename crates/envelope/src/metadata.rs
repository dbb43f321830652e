//! Envelope metadata and the MAC over plaintext values

use crate::cipher::{open_value, seal_value, DataKey, ValueType};
use crate::error::{EnvelopeError, EnvelopeResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};

/// Top-level key holding the metadata section in sealed documents
pub const METADATA_KEY: &str = "sealgen";

/// Envelope layout version written by this crate
pub const ENVELOPE_VERSION: &str = "1";

/// Data key wrapped for one master key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct WrappedKey {
    pub id: String,
    pub enc: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Metadata {
    /// The key group: every recipient able to open the document
    pub keys: Vec<WrappedKey>,
    pub lastmodified: String,
    pub mac: String,
    pub version: String,
}

impl Metadata {
    pub(crate) fn check_version(&self) -> EnvelopeResult<()> {
        if self.version == ENVELOPE_VERSION {
            Ok(())
        } else {
            Err(EnvelopeError::malformed(format!(
                "unsupported envelope version '{}'",
                self.version
            )))
        }
    }

    /// Ids of the key group, for error reporting
    pub(crate) fn key_ids(&self) -> String {
        self.keys
            .iter()
            .map(|k| k.id.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub(crate) fn verify_mac(&self, data_key: &DataKey, computed: &str) -> EnvelopeResult<()> {
        let (stored, _) =
            open_value(data_key, &self.mac, &self.lastmodified).map_err(|_| EnvelopeError::MacMismatch)?;
        if stored == computed.as_bytes() {
            Ok(())
        } else {
            Err(EnvelopeError::MacMismatch)
        }
    }
}

/// SHA-512 over plaintext values in document order
pub(crate) struct MacBuilder {
    hasher: Sha512,
}

impl MacBuilder {
    pub(crate) fn new() -> Self {
        Self {
            hasher: Sha512::new(),
        }
    }

    pub(crate) fn update(&mut self, plaintext: &[u8]) {
        self.hasher.update(plaintext);
    }

    pub(crate) fn finish(self) -> String {
        hex::encode_upper(self.hasher.finalize())
    }
}

/// Encrypt the MAC, binding it to the modification timestamp
pub(crate) fn seal_mac(data_key: &DataKey, mac: &str, lastmodified: &str) -> EnvelopeResult<String> {
    seal_value(data_key, mac.as_bytes(), ValueType::Str, lastmodified)
}
