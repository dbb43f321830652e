//! Format classification from resource names

use crate::resource::SourceRole;
use sealgen_core::Format;

/// Classify a resource identifier loaded as a file source
#[must_use]
pub fn classify(identifier: &str) -> Format {
    classify_as(identifier, SourceRole::File)
}

/// Classify a resource identifier for the role it is loaded in.
///
/// Only the last path component is inspected and matching ignores case.
/// A name without an extension is dotenv when it is read as an env file and
/// binary otherwise.
#[must_use]
pub fn classify_as(identifier: &str, role: SourceRole) -> Format {
    let name = identifier
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(identifier)
        .to_ascii_lowercase();

    if name.ends_with(".yaml") || name.ends_with(".yml") {
        return Format::Yaml;
    }
    if name.ends_with(".json") {
        return Format::Json;
    }
    if name.ends_with(".env") {
        return Format::Dotenv;
    }

    let has_extension = name
        .rfind('.')
        .is_some_and(|dot| dot > 0 && dot + 1 < name.len());
    match role {
        SourceRole::EnvFile if !has_extension => Format::Dotenv,
        _ => Format::Binary,
    }
}
