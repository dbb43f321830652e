//! Generator configuration binding

use crate::sources::Sources;
use sealgen_core::{Behavior, Error, Result, Subtype, GENERATOR_API_VERSION, GENERATOR_KIND};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Configuration document as written by users
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct GeneratorConfig {
    api_version: Option<String>,
    kind: Option<String>,
    metadata: Option<ConfigMetadata>,
    name: Option<String>,
    namespace: Option<String>,
    #[serde(rename = "type")]
    secret_type: Option<String>,
    behavior: Option<String>,
    literals: Option<Vec<String>>,
    files: Option<Vec<String>>,
    envs: Option<Vec<String>>,
    labels: Option<BTreeMap<String, String>>,
    annotations: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigMetadata {
    name: Option<String>,
    namespace: Option<String>,
}

/// A bound generation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretRequest {
    pub name: String,
    pub namespace: String,
    pub subtype: Subtype,
    pub behavior: Behavior,
    pub sources: Sources,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
}

/// Explicit value when non-empty, otherwise the fallback
fn or_default(explicit: Option<String>, fallback: Option<String>) -> String {
    explicit
        .filter(|value| !value.is_empty())
        .or(fallback)
        .unwrap_or_default()
}

impl SecretRequest {
    /// Bind a YAML generator config.
    ///
    /// `name` and `namespace` fall back to `metadata.name` and
    /// `metadata.namespace` when absent or empty.
    pub fn bind(config: &[u8]) -> Result<Self> {
        let config: GeneratorConfig = serde_yaml::from_slice(config)
            .map_err(|e| Error::configuration(format!("invalid generator config: {e}")))?;

        if let Some(kind) = config.kind.as_deref() {
            if kind != GENERATOR_KIND {
                return Err(Error::configuration(format!(
                    "unexpected kind '{kind}', expected {GENERATOR_KIND}"
                )));
            }
        }

        let metadata = config.metadata.unwrap_or_default();
        if let Some(api_version) = config.api_version.as_deref() {
            if api_version != GENERATOR_API_VERSION {
                tracing::warn!(
                    api_version,
                    expected = GENERATOR_API_VERSION,
                    "Generator config has an unexpected apiVersion"
                );
            }
        }

        let name = or_default(config.name, metadata.name);
        if name.is_empty() {
            return Err(Error::configuration("generator config has no name"));
        }
        let behavior = config.behavior.as_deref().unwrap_or_default().parse::<Behavior>()?;

        tracing::debug!(%name, "Bound generator config");
        Ok(Self {
            name,
            namespace: or_default(config.namespace, metadata.namespace),
            subtype: config
                .secret_type
                .as_deref()
                .map(Subtype::parse)
                .unwrap_or_default(),
            behavior,
            sources: Sources {
                literals: config.literals.unwrap_or_default(),
                files: config.files.unwrap_or_default(),
                envs: config.envs.unwrap_or_default(),
            },
            labels: config.labels.unwrap_or_default(),
            annotations: config.annotations.unwrap_or_default(),
        })
    }
}
