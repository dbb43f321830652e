//! AES-256-GCM primitives: data key wrapping and `ENC[...]` value tokens

use crate::error::{EnvelopeError, EnvelopeResult};
use crate::keyring::MasterKey;
use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;
use zeroize::Zeroizing;

pub(crate) const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;
const TOKEN_PREFIX: &str = "ENC[AES256_GCM,";

/// Per-document symmetric key
pub(crate) type DataKey = Zeroizing<[u8; KEY_LEN]>;

pub(crate) fn random_key() -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    OsRng.fill_bytes(&mut *key);
    key
}

fn random_nonce() -> [u8; NONCE_LEN] {
    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);
    nonce
}

fn encrypt(key: &[u8; KEY_LEN], nonce: &[u8; NONCE_LEN], msg: &[u8], aad: &[u8]) -> EnvelopeResult<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|_| EnvelopeError::Crypto("invalid AES key".into()))?;
    cipher
        .encrypt(Nonce::from_slice(nonce), Payload { msg, aad })
        .map_err(|_| EnvelopeError::Crypto("failed to encrypt payload".into()))
}

fn decrypt(key: &[u8; KEY_LEN], nonce: &[u8], sealed: &[u8], aad: &[u8]) -> Option<Vec<u8>> {
    if nonce.len() != NONCE_LEN {
        return None;
    }
    let cipher = Aes256Gcm::new_from_slice(key).ok()?;
    cipher
        .decrypt(Nonce::from_slice(nonce), Payload { msg: sealed, aad })
        .ok()
}

/// Wrap a data key for one recipient; the key id is bound as AAD
pub(crate) fn wrap_data_key(master: &MasterKey, data_key: &DataKey) -> EnvelopeResult<String> {
    let nonce = random_nonce();
    let sealed = encrypt(master.bytes(), &nonce, data_key.as_slice(), master.id().as_bytes())?;
    let mut out = nonce.to_vec();
    out.extend_from_slice(&sealed);
    Ok(STANDARD.encode(out))
}

pub(crate) fn unwrap_data_key(master: &MasterKey, enc: &str) -> EnvelopeResult<DataKey> {
    let unwrap_error = || EnvelopeError::KeyUnwrap {
        id: master.id().to_string(),
    };

    let raw = STANDARD.decode(enc.trim()).map_err(|_| unwrap_error())?;
    if raw.len() <= NONCE_LEN {
        return Err(unwrap_error());
    }
    let (nonce, sealed) = raw.split_at(NONCE_LEN);
    let plain = Zeroizing::new(
        decrypt(master.bytes(), nonce, sealed, master.id().as_bytes()).ok_or_else(unwrap_error)?,
    );
    let key: [u8; KEY_LEN] = plain.as_slice().try_into().map_err(|_| unwrap_error())?;
    Ok(Zeroizing::new(key))
}

/// Original type of a sealed scalar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValueType {
    Str,
    Int,
    Float,
    Bool,
    Bytes,
}

impl ValueType {
    fn as_str(&self) -> &'static str {
        match self {
            ValueType::Str => "str",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::Bool => "bool",
            ValueType::Bytes => "bytes",
        }
    }

    fn parse(s: &str) -> EnvelopeResult<Self> {
        match s {
            "str" => Ok(ValueType::Str),
            "int" => Ok(ValueType::Int),
            "float" => Ok(ValueType::Float),
            "bool" => Ok(ValueType::Bool),
            "bytes" => Ok(ValueType::Bytes),
            other => Err(EnvelopeError::malformed(format!("unknown value type '{other}'"))),
        }
    }
}

/// Parsed `ENC[AES256_GCM,data:..,iv:..,tag:..,type:..]`
struct ValueToken {
    data: Vec<u8>,
    iv: Vec<u8>,
    tag: Vec<u8>,
    value_type: ValueType,
}

impl ValueToken {
    fn parse(token: &str) -> EnvelopeResult<Self> {
        let body = token
            .strip_prefix(TOKEN_PREFIX)
            .and_then(|rest| rest.strip_suffix(']'))
            .ok_or_else(|| EnvelopeError::malformed("value is not an encrypted token"))?;

        let (mut data, mut iv, mut tag, mut value_type) = (None, None, None, None);
        for field in body.split(',') {
            let (name, value) = field
                .split_once(':')
                .ok_or_else(|| EnvelopeError::malformed(format!("bad token field '{field}'")))?;
            let decode = |v: &str| {
                STANDARD
                    .decode(v)
                    .map_err(|e| EnvelopeError::malformed(format!("bad base64 in '{name}': {e}")))
            };
            match name {
                "data" => data = Some(decode(value)?),
                "iv" => iv = Some(decode(value)?),
                "tag" => tag = Some(decode(value)?),
                "type" => value_type = Some(ValueType::parse(value)?),
                other => {
                    return Err(EnvelopeError::malformed(format!(
                        "unknown token field '{other}'"
                    )))
                }
            }
        }

        let missing = |name: &str| EnvelopeError::malformed(format!("token is missing '{name}'"));
        Ok(Self {
            data: data.ok_or_else(|| missing("data"))?,
            iv: iv.ok_or_else(|| missing("iv"))?,
            tag: tag.ok_or_else(|| missing("tag"))?,
            value_type: value_type.ok_or_else(|| missing("type"))?,
        })
    }
}

impl fmt::Display for ValueToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{TOKEN_PREFIX}data:{},iv:{},tag:{},type:{}]",
            STANDARD.encode(&self.data),
            STANDARD.encode(&self.iv),
            STANDARD.encode(&self.tag),
            self.value_type.as_str()
        )
    }
}

pub(crate) fn is_token(value: &str) -> bool {
    value.starts_with(TOKEN_PREFIX) && value.ends_with(']')
}

/// Encrypt one scalar; `aad` is the value's key path
pub(crate) fn seal_value(
    key: &DataKey,
    plaintext: &[u8],
    value_type: ValueType,
    aad: &str,
) -> EnvelopeResult<String> {
    let nonce = random_nonce();
    let mut data = encrypt(key, &nonce, plaintext, aad.as_bytes())?;
    let tag = data.split_off(data.len() - TAG_LEN);
    Ok(ValueToken {
        data,
        iv: nonce.to_vec(),
        tag,
        value_type,
    }
    .to_string())
}

pub(crate) fn open_value(key: &DataKey, token: &str, aad: &str) -> EnvelopeResult<(Vec<u8>, ValueType)> {
    let token = ValueToken::parse(token)?;
    let mut sealed = token.data;
    sealed.extend_from_slice(&token.tag);
    let plain = decrypt(key, &token.iv, &sealed, aad.as_bytes()).ok_or_else(|| {
        EnvelopeError::Crypto(format!("value at '{aad}' failed authentication"))
    })?;
    Ok((plain, token.value_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_roundtrip_binds_path() {
        let key = random_key();
        let token = seal_value(&key, b"admin", ValueType::Str, "ROUTER_PASSWORD:").unwrap();
        assert!(is_token(&token));

        let (plain, value_type) = open_value(&key, &token, "ROUTER_PASSWORD:").unwrap();
        assert_eq!(plain, b"admin");
        assert_eq!(value_type, ValueType::Str);

        // Moving a value to another key must fail authentication
        assert!(matches!(
            open_value(&key, &token, "DB_PASSWORD:"),
            Err(EnvelopeError::Crypto(_))
        ));
    }

    #[test]
    fn test_wrong_data_key_fails() {
        let token = seal_value(&random_key(), b"x", ValueType::Str, "a:").unwrap();
        assert!(open_value(&random_key(), &token, "a:").is_err());
    }

    #[test]
    fn test_wrapped_key_is_bound_to_id() {
        let data_key = random_key();
        let ops = MasterKey::new("ops", [1u8; KEY_LEN]);
        let enc = wrap_data_key(&ops, &data_key).unwrap();
        assert_eq!(*unwrap_data_key(&ops, &enc).unwrap(), *data_key);

        let renamed = MasterKey::new("ci", [1u8; KEY_LEN]);
        assert!(matches!(
            unwrap_data_key(&renamed, &enc),
            Err(EnvelopeError::KeyUnwrap { .. })
        ));
    }

    #[test]
    fn test_malformed_tokens() {
        assert!(ValueToken::parse("ENC[AES256_GCM,data:AA==]").is_err());
        assert!(ValueToken::parse("plain").is_err());
        assert!(ValueToken::parse("ENC[AES256_GCM,data:AA==,iv:AA==,tag:AA==,type:date]").is_err());
    }
}
