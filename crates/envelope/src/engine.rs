//! Sealing and opening whole documents

use crate::cipher::{open_value, random_key, seal_value, unwrap_data_key, wrap_data_key, DataKey, ValueType};
use crate::error::{EnvelopeError, EnvelopeResult};
use crate::keyring::{Keyring, MasterKey};
use crate::metadata::{seal_mac, MacBuilder, Metadata, WrappedKey, ENVELOPE_VERSION};
use crate::store::{store_for, Body};
use crate::tree::{open_tree, seal_tree};
use chrono::{SecondsFormat, Utc};
use sealgen_core::Format;

/// AAD for the single value of a binary envelope
const BLOB_AAD: &str = "data:";

/// Decryption contract consumed by the loader
pub trait Decryptor: Send + Sync {
    /// Open `data` as an envelope of the given format
    ///
    /// # Returns
    /// * `Ok(Some(plaintext))` - content was an envelope and was opened
    /// * `Ok(None)` - content is not an encrypted envelope
    /// * `Err(error)` - an envelope was recognized but could not be opened
    fn decrypt(&self, data: &[u8], format: Format) -> EnvelopeResult<Option<Vec<u8>>>;
}

/// Envelope engine backed by a local keyring
#[derive(Debug)]
pub struct SealEngine {
    keyring: Keyring,
}

impl SealEngine {
    pub fn new(keyring: Keyring) -> Self {
        Self { keyring }
    }

    pub fn keyring(&self) -> &Keyring {
        &self.keyring
    }

    /// Seal for every key in the keyring
    pub fn seal(&self, plaintext: &[u8], format: Format) -> EnvelopeResult<Vec<u8>> {
        let recipients: Vec<&MasterKey> = self.keyring.iter().collect();
        self.seal_with(plaintext, format, &recipients)
    }

    /// Seal for the named keys only
    pub fn seal_for(&self, plaintext: &[u8], format: Format, key_ids: &[&str]) -> EnvelopeResult<Vec<u8>> {
        let recipients = key_ids
            .iter()
            .map(|id| {
                self.keyring
                    .get(id)
                    .ok_or_else(|| EnvelopeError::UnknownKey((*id).to_string()))
            })
            .collect::<EnvelopeResult<Vec<_>>>()?;
        self.seal_with(plaintext, format, &recipients)
    }

    fn seal_with(&self, plaintext: &[u8], format: Format, recipients: &[&MasterKey]) -> EnvelopeResult<Vec<u8>> {
        if recipients.is_empty() {
            return Err(EnvelopeError::Keyring("no keys to seal for".into()));
        }

        let store = store_for(format);
        if store.split(plaintext)?.is_some() {
            return Err(EnvelopeError::plaintext(format, "content is already sealed"));
        }

        let data_key = random_key();
        let mut mac = MacBuilder::new();
        let sealed = match store.load_plain(plaintext)? {
            Body::Tree(mut value) => {
                seal_tree(&mut value, &data_key, &mut mac)?;
                Body::Tree(value)
            }
            Body::Blob(bytes) => {
                mac.update(&bytes);
                Body::Blob(seal_value(&data_key, &bytes, ValueType::Bytes, BLOB_AAD)?.into_bytes())
            }
        };

        let lastmodified = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let keys = recipients
            .iter()
            .map(|master| {
                Ok(WrappedKey {
                    id: master.id().to_string(),
                    enc: wrap_data_key(master, &data_key)?,
                })
            })
            .collect::<EnvelopeResult<Vec<_>>>()?;
        let metadata = Metadata {
            keys,
            mac: seal_mac(&data_key, &mac.finish(), &lastmodified)?,
            lastmodified,
            version: ENVELOPE_VERSION.to_string(),
        };

        tracing::debug!(%format, recipients = recipients.len(), "Sealed document");
        store.emit_sealed(&sealed, &metadata)
    }

    /// Unwrap the data key with the first key group entry this keyring holds
    fn data_key(&self, metadata: &Metadata) -> EnvelopeResult<DataKey> {
        let mut failure = None;
        for wrapped in &metadata.keys {
            let Some(master) = self.keyring.get(&wrapped.id) else {
                continue;
            };
            match unwrap_data_key(master, &wrapped.enc) {
                Ok(data_key) => return Ok(data_key),
                Err(e) => {
                    tracing::debug!(key = %wrapped.id, error = %e, "Key group entry did not unwrap");
                    failure.get_or_insert(e);
                }
            }
        }
        Err(failure.unwrap_or_else(|| EnvelopeError::NoMatchingKey {
            ids: metadata.key_ids(),
        }))
    }

    pub fn open(&self, data: &[u8], format: Format) -> EnvelopeResult<Option<Vec<u8>>> {
        let store = store_for(format);
        let Some((body, metadata)) = store.split(data)? else {
            return Ok(None);
        };
        metadata.check_version()?;
        let data_key = self.data_key(&metadata)?;

        let mut mac = MacBuilder::new();
        let plain = match body {
            Body::Tree(mut value) => {
                open_tree(&mut value, &data_key, &mut mac)?;
                Body::Tree(value)
            }
            Body::Blob(token) => {
                let token = String::from_utf8(token)
                    .map_err(|_| EnvelopeError::malformed("sealed token is not UTF-8"))?;
                let (bytes, _) = open_value(&data_key, &token, BLOB_AAD)?;
                mac.update(&bytes);
                Body::Blob(bytes)
            }
        };
        metadata.verify_mac(&data_key, &mac.finish())?;

        store.emit_plain(&plain).map(Some)
    }
}

impl Decryptor for SealEngine {
    fn decrypt(&self, data: &[u8], format: Format) -> EnvelopeResult<Option<Vec<u8>>> {
        self.open(data, format)
    }
}
