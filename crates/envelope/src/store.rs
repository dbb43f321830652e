//! Per-format parsing and emission of plain and sealed documents

use crate::error::{EnvelopeError, EnvelopeResult};
use crate::metadata::{Metadata, WrappedKey, METADATA_KEY};
use sealgen_core::Format;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Document contents independent of the on-disk format
pub(crate) enum Body {
    /// Structured document; leaves are plaintext or `ENC[...]` tokens
    Tree(Value),
    /// Raw bytes when plain, the token text when sealed
    Blob(Vec<u8>),
}

pub(crate) trait Store: Sync {
    /// Split sealed content into body and metadata, or `None` when the
    /// content is not an envelope of this format
    fn split(&self, data: &[u8]) -> EnvelopeResult<Option<(Body, Metadata)>>;

    fn load_plain(&self, data: &[u8]) -> EnvelopeResult<Body>;

    fn emit_plain(&self, body: &Body) -> EnvelopeResult<Vec<u8>>;

    fn emit_sealed(&self, body: &Body, metadata: &Metadata) -> EnvelopeResult<Vec<u8>>;
}

pub(crate) fn store_for(format: Format) -> &'static dyn Store {
    match format {
        Format::Yaml => &YamlStore,
        Format::Json => &JsonStore,
        Format::Dotenv => &DotenvStore,
        Format::Binary => &BinaryStore,
    }
}

fn expect_tree(body: &Body, format: Format) -> EnvelopeResult<&Value> {
    match body {
        Body::Tree(value) => Ok(value),
        Body::Blob(_) => Err(EnvelopeError::plaintext(format, "expected a structured document")),
    }
}

/// Split the metadata section off a parsed mapping
fn split_tree(value: Value) -> EnvelopeResult<Option<(Body, Metadata)>> {
    let Value::Object(mut map) = value else {
        return Ok(None);
    };
    let Some(section) = map.remove(METADATA_KEY) else {
        return Ok(None);
    };
    let metadata: Metadata = serde_json::from_value(section)
        .map_err(|e| EnvelopeError::malformed(format!("invalid '{METADATA_KEY}' section: {e}")))?;
    Ok(Some((Body::Tree(Value::Object(map)), metadata)))
}

fn with_metadata(value: &Value, metadata: &Metadata, format: Format) -> EnvelopeResult<Value> {
    let Value::Object(map) = value else {
        return Err(EnvelopeError::plaintext(format, "top level must be a mapping"));
    };
    let mut map = map.clone();
    let section = serde_json::to_value(metadata)
        .map_err(|e| EnvelopeError::malformed(format!("cannot serialize metadata: {e}")))?;
    map.insert(METADATA_KEY.to_string(), section);
    Ok(Value::Object(map))
}

fn to_tab_indented_json(value: &Value) -> EnvelopeResult<Vec<u8>> {
    let mut out = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"\t"));
    value
        .serialize(&mut serializer)
        .map_err(|e| EnvelopeError::malformed(format!("cannot emit JSON: {e}")))?;
    Ok(out)
}

struct YamlStore;

impl Store for YamlStore {
    fn split(&self, data: &[u8]) -> EnvelopeResult<Option<(Body, Metadata)>> {
        match serde_yaml::from_slice::<Value>(data) {
            Ok(value) => split_tree(value),
            Err(_) => Ok(None),
        }
    }

    fn load_plain(&self, data: &[u8]) -> EnvelopeResult<Body> {
        let value: Value = serde_yaml::from_slice(data)
            .map_err(|e| EnvelopeError::plaintext(Format::Yaml, e.to_string()))?;
        if !value.is_object() {
            return Err(EnvelopeError::plaintext(Format::Yaml, "top level must be a mapping"));
        }
        Ok(Body::Tree(value))
    }

    fn emit_plain(&self, body: &Body) -> EnvelopeResult<Vec<u8>> {
        serde_yaml::to_string(expect_tree(body, Format::Yaml)?)
            .map(String::into_bytes)
            .map_err(|e| EnvelopeError::malformed(format!("cannot emit YAML: {e}")))
    }

    fn emit_sealed(&self, body: &Body, metadata: &Metadata) -> EnvelopeResult<Vec<u8>> {
        let value = with_metadata(expect_tree(body, Format::Yaml)?, metadata, Format::Yaml)?;
        serde_yaml::to_string(&value)
            .map(String::into_bytes)
            .map_err(|e| EnvelopeError::malformed(format!("cannot emit YAML: {e}")))
    }
}

struct JsonStore;

impl Store for JsonStore {
    fn split(&self, data: &[u8]) -> EnvelopeResult<Option<(Body, Metadata)>> {
        match serde_json::from_slice::<Value>(data) {
            Ok(value) => split_tree(value),
            Err(_) => Ok(None),
        }
    }

    fn load_plain(&self, data: &[u8]) -> EnvelopeResult<Body> {
        let value: Value = serde_json::from_slice(data)
            .map_err(|e| EnvelopeError::plaintext(Format::Json, e.to_string()))?;
        if !value.is_object() {
            return Err(EnvelopeError::plaintext(Format::Json, "top level must be an object"));
        }
        Ok(Body::Tree(value))
    }

    fn emit_plain(&self, body: &Body) -> EnvelopeResult<Vec<u8>> {
        to_tab_indented_json(expect_tree(body, Format::Json)?)
    }

    fn emit_sealed(&self, body: &Body, metadata: &Metadata) -> EnvelopeResult<Vec<u8>> {
        let value = with_metadata(expect_tree(body, Format::Json)?, metadata, Format::Json)?;
        let mut out = to_tab_indented_json(&value)?;
        out.push(b'\n');
        Ok(out)
    }
}

/// `KEY=VALUE` lines; metadata is flattened into `sealgen_*` keys
struct DotenvStore;

const DOTENV_META_PREFIX: &str = "sealgen_";
const DOTENV_KEYS_PREFIX: &str = "sealgen_keys__list_";
/// Only a document carrying this key is treated as an envelope
const DOTENV_VERSION_KEY: &str = "sealgen_version";

impl DotenvStore {
    /// Parse into ordered pairs; comments and blank lines are dropped
    fn parse(data: &[u8]) -> EnvelopeResult<Vec<(String, String)>> {
        let text = std::str::from_utf8(data)
            .map_err(|_| EnvelopeError::plaintext(Format::Dotenv, "content is not UTF-8"))?;
        let mut pairs = Vec::new();
        for (index, line) in text.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() || line.trim_start().starts_with('#') {
                continue;
            }
            let (key, value) = line.split_once('=').ok_or_else(|| {
                EnvelopeError::plaintext(
                    Format::Dotenv,
                    format!("line {} is not a KEY=VALUE pair", index + 1),
                )
            })?;
            pairs.push((key.trim().to_string(), value.replace("\\n", "\n")));
        }
        Ok(pairs)
    }

    fn render(map: &Map<String, Value>) -> EnvelopeResult<String> {
        let mut out = String::new();
        for (key, value) in map {
            let Value::String(value) = value else {
                return Err(EnvelopeError::plaintext(
                    Format::Dotenv,
                    format!("value of '{key}' is not a string"),
                ));
            };
            out.push_str(key);
            out.push('=');
            out.push_str(&value.replace('\n', "\\n"));
            out.push('\n');
        }
        Ok(out)
    }

    fn metadata_from(fields: BTreeMap<String, String>) -> EnvelopeResult<Metadata> {
        let mut keys: BTreeMap<usize, (Option<String>, Option<String>)> = BTreeMap::new();
        let mut scalars = BTreeMap::new();
        for (name, value) in fields {
            if let Some(rest) = name.strip_prefix(DOTENV_KEYS_PREFIX) {
                let (index, field) = rest
                    .split_once("__map_")
                    .and_then(|(i, f)| i.parse::<usize>().ok().map(|i| (i, f)))
                    .ok_or_else(|| EnvelopeError::malformed(format!("bad metadata key '{name}'")))?;
                let entry = keys.entry(index).or_default();
                match field {
                    "id" => entry.0 = Some(value),
                    "enc" => entry.1 = Some(value),
                    other => {
                        return Err(EnvelopeError::malformed(format!(
                            "unknown key group field '{other}'"
                        )))
                    }
                }
            } else if let Some(field) = name.strip_prefix(DOTENV_META_PREFIX) {
                scalars.insert(field.to_string(), value);
            }
        }

        let mut take = |field: &str| {
            scalars
                .remove(field)
                .ok_or_else(|| EnvelopeError::malformed(format!("metadata is missing '{field}'")))
        };
        let (lastmodified, mac, version) = (take("lastmodified")?, take("mac")?, take("version")?);
        let keys = keys
            .into_iter()
            .map(|(index, entry)| match entry {
                (Some(id), Some(enc)) => Ok(WrappedKey { id, enc }),
                _ => Err(EnvelopeError::malformed(format!("key group entry {index} is incomplete"))),
            })
            .collect::<EnvelopeResult<Vec<_>>>()?;

        Ok(Metadata {
            keys,
            lastmodified,
            mac,
            version,
        })
    }
}

impl Store for DotenvStore {
    fn split(&self, data: &[u8]) -> EnvelopeResult<Option<(Body, Metadata)>> {
        let Ok(pairs) = Self::parse(data) else {
            return Ok(None);
        };

        if !pairs.iter().any(|(key, _)| key == DOTENV_VERSION_KEY) {
            return Ok(None);
        }

        let mut map = Map::new();
        let mut fields = BTreeMap::new();
        for (key, value) in pairs {
            let duplicate = if key.starts_with(DOTENV_META_PREFIX) {
                fields.insert(key.clone(), value).is_some()
            } else {
                map.insert(key.clone(), Value::String(value)).is_some()
            };
            if duplicate {
                return Err(EnvelopeError::malformed(format!(
                    "key '{key}' appears more than once"
                )));
            }
        }
        Ok(Some((Body::Tree(Value::Object(map)), Self::metadata_from(fields)?)))
    }

    fn load_plain(&self, data: &[u8]) -> EnvelopeResult<Body> {
        let mut map = Map::new();
        for (key, value) in Self::parse(data)? {
            if key.starts_with(DOTENV_META_PREFIX) {
                return Err(EnvelopeError::plaintext(
                    Format::Dotenv,
                    format!("key '{key}' uses the reserved '{DOTENV_META_PREFIX}' prefix"),
                ));
            }
            if map.contains_key(&key) {
                return Err(EnvelopeError::plaintext(
                    Format::Dotenv,
                    format!("key '{key}' appears more than once"),
                ));
            }
            map.insert(key, Value::String(value));
        }
        Ok(Body::Tree(Value::Object(map)))
    }

    fn emit_plain(&self, body: &Body) -> EnvelopeResult<Vec<u8>> {
        match expect_tree(body, Format::Dotenv)? {
            Value::Object(map) => Ok(Self::render(map)?.into_bytes()),
            _ => Err(EnvelopeError::plaintext(Format::Dotenv, "expected KEY=VALUE pairs")),
        }
    }

    fn emit_sealed(&self, body: &Body, metadata: &Metadata) -> EnvelopeResult<Vec<u8>> {
        let mut out = self.emit_plain(body)?;
        let mut push = |key: String, value: &str| {
            out.extend_from_slice(format!("{key}={value}\n").as_bytes());
        };
        for (index, key) in metadata.keys.iter().enumerate() {
            push(format!("{DOTENV_KEYS_PREFIX}{index}__map_enc"), &key.enc);
            push(format!("{DOTENV_KEYS_PREFIX}{index}__map_id"), &key.id);
        }
        push(format!("{DOTENV_META_PREFIX}lastmodified"), &metadata.lastmodified);
        push(format!("{DOTENV_META_PREFIX}mac"), &metadata.mac);
        push(format!("{DOTENV_META_PREFIX}version"), &metadata.version);
        Ok(out)
    }
}

/// Opaque bytes sealed as a single `data` value inside a JSON wrapper
struct BinaryStore;

impl Store for BinaryStore {
    fn split(&self, data: &[u8]) -> EnvelopeResult<Option<(Body, Metadata)>> {
        let Ok(Value::Object(mut map)) = serde_json::from_slice::<Value>(data) else {
            return Ok(None);
        };
        let Some(section) = map.remove(METADATA_KEY) else {
            return Ok(None);
        };
        let metadata: Metadata = serde_json::from_value(section)
            .map_err(|e| EnvelopeError::malformed(format!("invalid '{METADATA_KEY}' section: {e}")))?;
        match map.remove("data") {
            Some(Value::String(token)) => Ok(Some((Body::Blob(token.into_bytes()), metadata))),
            _ => Err(EnvelopeError::malformed("binary envelope has no 'data' value")),
        }
    }

    fn load_plain(&self, data: &[u8]) -> EnvelopeResult<Body> {
        Ok(Body::Blob(data.to_vec()))
    }

    fn emit_plain(&self, body: &Body) -> EnvelopeResult<Vec<u8>> {
        match body {
            Body::Blob(bytes) => Ok(bytes.clone()),
            Body::Tree(_) => Err(EnvelopeError::plaintext(Format::Binary, "expected raw bytes")),
        }
    }

    fn emit_sealed(&self, body: &Body, metadata: &Metadata) -> EnvelopeResult<Vec<u8>> {
        let Body::Blob(token) = body else {
            return Err(EnvelopeError::plaintext(Format::Binary, "expected raw bytes"));
        };
        let token = String::from_utf8(token.clone())
            .map_err(|_| EnvelopeError::malformed("sealed token is not UTF-8"))?;
        let mut map = Map::new();
        map.insert("data".to_string(), Value::String(token));
        let section = serde_json::to_value(metadata)
            .map_err(|e| EnvelopeError::malformed(format!("cannot serialize metadata: {e}")))?;
        map.insert(METADATA_KEY.to_string(), section);

        let mut out = serde_json::to_vec_pretty(&Value::Object(map))
            .map_err(|e| EnvelopeError::malformed(format!("cannot emit JSON: {e}")))?;
        out.push(b'\n');
        Ok(out)
    }
}
