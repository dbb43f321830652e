//! Generated secrets and their manifest form

use crate::assembler::KeyValues;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use sealgen_core::{
    Behavior, Error, Result, BEHAVIOR_ANNOTATION, SECRET_API_VERSION, SECRET_KIND,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// Output of one generation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledSecret {
    pub name: String,
    pub namespace: String,
    pub secret_type: String,
    pub behavior: Behavior,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
    pub data: KeyValues,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    api_version: &'static str,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    data: BTreeMap<String, String>,
    kind: &'static str,
    metadata: ManifestMetadata,
    #[serde(rename = "type")]
    secret_type: String,
}

#[derive(Debug, Serialize)]
struct ManifestMetadata {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    annotations: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    labels: BTreeMap<String, String>,
    name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    namespace: String,
}

impl AssembledSecret {
    /// Kubernetes `Secret` with base64 values and sorted keys
    #[must_use]
    pub fn to_manifest(&self) -> Manifest {
        let mut annotations = self.annotations.clone();
        if self.behavior != Behavior::Unspecified {
            annotations.insert(BEHAVIOR_ANNOTATION.to_string(), self.behavior.to_string());
        }

        Manifest {
            api_version: SECRET_API_VERSION,
            data: self
                .data
                .iter()
                .map(|(key, value)| (key.clone(), BASE64.encode(value)))
                .collect(),
            kind: SECRET_KIND,
            metadata: ManifestMetadata {
                annotations,
                labels: self.labels.clone(),
                name: self.name.clone(),
                namespace: self.namespace.clone(),
            },
            secret_type: self.secret_type.clone(),
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(&self.to_manifest())
            .map_err(|e| Error::render(&self.name, e.to_string()))
    }
}
