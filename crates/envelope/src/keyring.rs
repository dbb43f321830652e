//! Named master keys used to wrap per-document data keys

use crate::cipher::{random_key, KEY_LEN};
use crate::error::{EnvelopeError, EnvelopeResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::Path;
use zeroize::Zeroizing;

/// A 256-bit master key identified by a stable id
pub struct MasterKey {
    id: String,
    key: Zeroizing<[u8; KEY_LEN]>,
}

impl MasterKey {
    pub fn new(id: impl Into<String>, key: [u8; KEY_LEN]) -> Self {
        Self {
            id: id.into(),
            key: Zeroizing::new(key),
        }
    }

    /// Generate a fresh random key
    pub fn generate(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            key: random_key(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn bytes(&self) -> &[u8; KEY_LEN] {
        &self.key
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MasterKey")
            .field("id", &self.id)
            .field("key", &"<redacted>")
            .finish()
    }
}

#[derive(Serialize, Deserialize)]
struct KeyringFile {
    #[serde(default)]
    keys: Vec<KeyEntry>,
}

#[derive(Serialize, Deserialize)]
struct KeyEntry {
    id: String,
    key: String,
}

/// Ordered set of master keys, unique by id
#[derive(Debug, Default)]
pub struct Keyring {
    keys: Vec<MasterKey>,
}

impl Keyring {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key; ids must be unique and non-empty
    pub fn insert(&mut self, key: MasterKey) -> EnvelopeResult<()> {
        if key.id.trim().is_empty() {
            return Err(EnvelopeError::Keyring("key id must not be empty".into()));
        }
        if self.get(&key.id).is_some() {
            return Err(EnvelopeError::Keyring(format!(
                "key '{}' already exists",
                key.id
            )));
        }
        self.keys.push(key);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&MasterKey> {
        self.keys.iter().find(|k| k.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(|k| k.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &MasterKey> {
        self.keys.iter()
    }

    /// Parse a keyring document
    pub fn from_yaml(content: &str) -> EnvelopeResult<Self> {
        let file: KeyringFile = serde_yaml::from_str(content)
            .map_err(|e| EnvelopeError::Keyring(format!("invalid keyring document: {e}")))?;

        let mut keyring = Keyring::new();
        for entry in file.keys {
            let raw = Zeroizing::new(STANDARD.decode(entry.key.trim()).map_err(|e| {
                EnvelopeError::Keyring(format!("key '{}' is not valid base64: {e}", entry.id))
            })?);
            let key: [u8; KEY_LEN] = raw.as_slice().try_into().map_err(|_| {
                EnvelopeError::Keyring(format!(
                    "key '{}' must be {KEY_LEN} bytes, got {}",
                    entry.id,
                    raw.len()
                ))
            })?;
            keyring.insert(MasterKey::new(entry.id, key))?;
        }
        Ok(keyring)
    }

    pub fn to_yaml(&self) -> EnvelopeResult<Zeroizing<String>> {
        let file = KeyringFile {
            keys: self
                .keys
                .iter()
                .map(|k| KeyEntry {
                    id: k.id.clone(),
                    key: STANDARD.encode(k.key.as_slice()),
                })
                .collect(),
        };
        serde_yaml::to_string(&file)
            .map(Zeroizing::new)
            .map_err(|e| EnvelopeError::Keyring(format!("cannot serialize keyring: {e}")))
    }

    pub fn load(path: &Path) -> EnvelopeResult<Self> {
        let content = Zeroizing::new(fs::read_to_string(path)?);
        let keyring = Self::from_yaml(&content)?;
        tracing::debug!(path = %path.display(), keys = keyring.len(), "Loaded keyring");
        Ok(keyring)
    }

    /// Write the keyring, readable by the owner only on unix
    pub fn save(&self, path: &Path) -> EnvelopeResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = self.to_yaml()?;

        let mut options = fs::OpenOptions::new();
        options.create(true).write(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
        Ok(())
    }
}
