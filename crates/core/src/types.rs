//! Shared domain types

use crate::constants::{SECRET_TYPE_OPAQUE, SECRET_TYPE_TLS};
use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Content format of a resource, as far as envelope handling is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Yaml,
    Json,
    Dotenv,
    /// Opaque bytes, including PEM material
    Binary,
}

impl Format {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Yaml => "yaml",
            Format::Json => "json",
            Format::Dotenv => "dotenv",
            Format::Binary => "binary",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(Format::Yaml),
            "json" => Ok(Format::Json),
            "dotenv" | "env" => Ok(Format::Dotenv),
            "binary" => Ok(Format::Binary),
            other => Err(Error::configuration(format!("unknown format '{other}'"))),
        }
    }
}

/// Generator subtype selected by the request's `type` field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subtype {
    /// Decrypt sources, emit an `Opaque` secret
    Sealed,
    /// Decrypt sources, emit a TLS key pair secret
    SealedTls,
    /// No decryption; the declared type is passed through verbatim
    Plain(String),
}

impl Subtype {
    /// Parse a declared type. Matching is case-insensitive and never fails.
    #[must_use]
    pub fn parse(declared: &str) -> Self {
        match declared.trim().to_ascii_lowercase().as_str() {
            "sealed" => Subtype::Sealed,
            "sealed/tls" => Subtype::SealedTls,
            _ => Subtype::Plain(declared.to_string()),
        }
    }

    /// Whether sources must be read through the decrypting loader
    #[must_use]
    pub fn decrypts(&self) -> bool {
        matches!(self, Subtype::Sealed | Subtype::SealedTls)
    }

    /// The `type` written to the output manifest
    #[must_use]
    pub fn secret_type(&self) -> &str {
        match self {
            Subtype::Sealed => SECRET_TYPE_OPAQUE,
            Subtype::SealedTls => SECRET_TYPE_TLS,
            Subtype::Plain(declared) if declared.trim().is_empty() => SECRET_TYPE_OPAQUE,
            Subtype::Plain(declared) => declared,
        }
    }
}

impl Default for Subtype {
    fn default() -> Self {
        Subtype::Plain(String::new())
    }
}

impl fmt::Display for Subtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subtype::Sealed => f.write_str("Sealed"),
            Subtype::SealedTls => f.write_str("Sealed/tls"),
            Subtype::Plain(declared) => f.write_str(declared),
        }
    }
}

/// Merge policy token handed through to the host framework
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Behavior {
    #[default]
    Unspecified,
    Create,
    Replace,
    Merge,
}

impl Behavior {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Behavior::Unspecified => "",
            Behavior::Create => "create",
            Behavior::Replace => "replace",
            Behavior::Merge => "merge",
        }
    }
}

impl FromStr for Behavior {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "unspecified" => Ok(Behavior::Unspecified),
            "create" => Ok(Behavior::Create),
            "replace" => Ok(Behavior::Replace),
            "merge" => Ok(Behavior::Merge),
            other => Err(Error::configuration(format!(
                "unknown behavior '{other}', expected one of create, replace, merge"
            ))),
        }
    }
}

impl fmt::Display for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_subtype_is_case_insensitive() {
        assert_eq!(Subtype::parse("Sealed"), Subtype::Sealed);
        assert_eq!(Subtype::parse("SEALED"), Subtype::Sealed);
        assert_eq!(Subtype::parse("Sealed/tls"), Subtype::SealedTls);
        assert_eq!(Subtype::parse("sealed/TLS"), Subtype::SealedTls);
    }

    #[test]
    fn test_plain_subtype_keeps_declared_type() {
        let subtype = Subtype::parse("kubernetes.io/basic-auth");
        assert!(!subtype.decrypts());
        assert_eq!(subtype.secret_type(), "kubernetes.io/basic-auth");
        assert_eq!(Subtype::parse("").secret_type(), SECRET_TYPE_OPAQUE);
    }

    #[test]
    fn test_sealed_output_types() {
        assert_eq!(Subtype::Sealed.secret_type(), SECRET_TYPE_OPAQUE);
        assert_eq!(Subtype::SealedTls.secret_type(), SECRET_TYPE_TLS);
    }

    #[test]
    fn test_behavior_tokens() {
        assert_eq!("merge".parse::<Behavior>().unwrap(), Behavior::Merge);
        assert_eq!("Create".parse::<Behavior>().unwrap(), Behavior::Create);
        assert_eq!("".parse::<Behavior>().unwrap(), Behavior::Unspecified);
        assert!(matches!(
            "upsert".parse::<Behavior>(),
            Err(Error::Configuration { .. })
        ));
    }

    proptest! {
        #[test]
        fn test_unknown_types_never_decrypt(declared in "[a-zA-Z0-9./-]{0,24}") {
            let subtype = Subtype::parse(&declared);
            let lowered = declared.to_ascii_lowercase();
            if lowered != "sealed" && lowered != "sealed/tls" {
                prop_assert!(!subtype.decrypts());
            }
        }
    }
}
