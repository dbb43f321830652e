//! Parsing of literal, file and env-file sources

use sealgen_core::{Error, Result, MAX_SECRET_KEY_LEN};
use std::path::Path;

/// Sources a secret is assembled from, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sources {
    /// `KEY=VALUE`
    pub literals: Vec<String>,
    /// `[alias=]path`
    pub files: Vec<String>,
    /// Paths of env files
    pub envs: Vec<String>,
}

impl Sources {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty() && self.files.is_empty() && self.envs.is_empty()
    }
}

/// A file source split into the key it produces and the path to load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSource {
    pub key: String,
    pub path: String,
}

impl FileSource {
    pub fn parse(source: &str) -> Result<Self> {
        let Some((alias, path)) = source.split_once('=') else {
            return Ok(Self {
                key: basename(source),
                path: source.to_string(),
            });
        };
        if path.contains('=') {
            return Err(Error::assembly(
                source,
                "key names or file paths cannot contain '='",
            ));
        }
        if alias.is_empty() {
            return Err(Error::assembly(source, "key name for file path is missing"));
        }
        if path.is_empty() {
            return Err(Error::assembly(source, "file path for key name is missing"));
        }
        Ok(Self {
            key: alias.to_string(),
            path: path.to_string(),
        })
    }
}

fn basename(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

/// Split a `KEY=VALUE` literal, unquoting the value
pub fn parse_literal(source: &str) -> Result<(String, Vec<u8>)> {
    let (key, value) = source
        .split_once('=')
        .ok_or_else(|| Error::assembly(source, "invalid literal source, expected key=value"))?;
    if key.is_empty() {
        return Err(Error::assembly(source, "literal source has an empty key"));
    }
    Ok((key.to_string(), unquote(value).as_bytes().to_vec()))
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Parse env-file content into ordered pairs.
///
/// A bare `KEY` takes its value from `lookup` and is skipped when that
/// yields nothing.
pub fn parse_env_lines<F>(content: &[u8], origin: &str, lookup: F) -> Result<Vec<(String, Vec<u8>)>>
where
    F: Fn(&str) -> Option<String>,
{
    let text = std::str::from_utf8(content)
        .map_err(|e| Error::assembly(origin, format!("content is not valid UTF-8: {e}")))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut pairs = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim_end_matches('\r').trim_start();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (key, value) = match line.split_once('=') {
            Some((key, value)) => (key, Some(value.to_string())),
            None => (line, None),
        };
        if !is_env_var_name(key) {
            return Err(Error::assembly(
                origin,
                format!("line {}: '{key}' is not a valid environment variable name", index + 1),
            ));
        }
        match value.or_else(|| lookup(key)) {
            Some(value) => pairs.push((key.to_string(), value.into_bytes())),
            None => tracing::debug!(key, origin, "Skipping unset environment variable"),
        }
    }
    Ok(pairs)
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_')
}

/// `[-._a-zA-Z][-._a-zA-Z0-9]*`
fn is_env_var_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_key_char(first) && !first.is_ascii_digit() => chars.all(is_key_char),
        _ => false,
    }
}

/// Check a secret data key
pub fn validate_key(key: &str, origin: &str) -> Result<()> {
    let problem = if key.is_empty() {
        Some("key must not be empty".to_string())
    } else if key.len() > MAX_SECRET_KEY_LEN {
        Some(format!("key must be at most {MAX_SECRET_KEY_LEN} characters"))
    } else if !key.chars().all(is_key_char) {
        Some("key must consist of alphanumeric characters, '-', '_' or '.'".to_string())
    } else if key == "." || key == ".." {
        Some(format!("key must not be '{key}'"))
    } else if key.starts_with("..") {
        Some("key must not start with '..'".to_string())
    } else {
        None
    };

    match problem {
        Some(problem) => Err(Error::assembly(origin, format!("'{key}' is not a valid key name: {problem}"))),
        None => Ok(()),
    }
}
