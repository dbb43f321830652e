//! Building the key/value mapping of a secret from its sources

use crate::sources::{parse_env_lines, parse_literal, validate_key, FileSource, Sources};
use indexmap::IndexMap;
use sealgen_core::{Error, Result};
use sealgen_loader::{Loader, ResourceRef};
use std::fmt;

/// Secret data in assembly order
pub type KeyValues = IndexMap<String, Vec<u8>>;

/// Turns declared sources into secret data, reading through the given loader
pub trait Assembler: Send + Sync {
    fn assemble(&self, loader: &dyn Loader, sources: &Sources) -> Result<KeyValues>;
}

type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Env files first, then literals, then files.
///
/// Every key is validated and a key may only be added once.
pub struct KvAssembler {
    env_lookup: EnvLookup,
}

impl KvAssembler {
    /// Bare keys in env files are read from the process environment
    pub fn new() -> Self {
        Self::with_env_lookup(|key| std::env::var(key).ok())
    }

    pub fn with_env_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            env_lookup: Box::new(lookup),
        }
    }
}

impl Default for KvAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for KvAssembler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KvAssembler").finish_non_exhaustive()
    }
}

fn insert(data: &mut KeyValues, key: String, value: Vec<u8>, origin: &str) -> Result<()> {
    validate_key(&key, origin)?;
    if data.contains_key(&key) {
        return Err(Error::assembly(
            origin,
            format!("cannot add key {key}, another key by that name already exists"),
        ));
    }
    data.insert(key, value);
    Ok(())
}

impl Assembler for KvAssembler {
    fn assemble(&self, loader: &dyn Loader, sources: &Sources) -> Result<KeyValues> {
        let mut data = KeyValues::new();

        for env in &sources.envs {
            let content = loader.load(&ResourceRef::env_file(env))?;
            for (key, value) in parse_env_lines(&content, env, &self.env_lookup)? {
                insert(&mut data, key, value, env)?;
            }
        }

        for literal in &sources.literals {
            let (key, value) = parse_literal(literal)?;
            let origin = format!("literal {key}");
            insert(&mut data, key, value, &origin)?;
        }

        for source in &sources.files {
            let FileSource { key, path } = FileSource::parse(source)?;
            let content = loader.load(&ResourceRef::file(&path))?;
            insert(&mut data, key, content, source)?;
        }

        tracing::debug!(keys = data.len(), "Assembled secret data");
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sealgen_loader::InMemoryLoader;

    fn sources(literals: &[&str], files: &[&str], envs: &[&str]) -> Sources {
        let owned = |items: &[&str]| -> Vec<String> { items.iter().map(|s| s.to_string()).collect() };
        Sources {
            literals: owned(literals),
            files: owned(files),
            envs: owned(envs),
        }
    }

    fn assembler() -> KvAssembler {
        KvAssembler::with_env_lookup(|_| None)
    }

    #[test]
    fn test_order_is_envs_literals_files() {
        let loader = InMemoryLoader::new([
            ("a.env", "ROUTER_PASSWORD=admin\n"),
            ("longsecret", "Lorem ipsum\n"),
        ]);
        let data = assembler()
            .assemble(
                &loader,
                &sources(&["FRUIT=apple"], &["obscure=longsecret"], &["a.env"]),
            )
            .unwrap();

        let keys: Vec<_> = data.keys().map(String::as_str).collect();
        assert_eq!(keys, ["ROUTER_PASSWORD", "FRUIT", "obscure"]);
        assert_eq!(data["obscure"], b"Lorem ipsum\n");
    }

    #[test]
    fn test_duplicates_across_sources() {
        let loader = InMemoryLoader::new([("a.env", "FRUIT=pear\n"), ("FRUIT", "kiwi")]);

        let err = assembler()
            .assemble(&loader, &sources(&["FRUIT=apple"], &[], &["a.env"]))
            .unwrap_err();
        assert!(err.to_string().contains("cannot add key FRUIT"));

        let err = assembler()
            .assemble(&loader, &sources(&["FRUIT=apple"], &["FRUIT"], &[]))
            .unwrap_err();
        assert!(matches!(err, Error::Assembly { .. }));

        let err = assembler()
            .assemble(&loader, &sources(&["A=1", "A=2"], &[], &[]))
            .unwrap_err();
        assert!(matches!(err, Error::Assembly { .. }));
    }

    #[test]
    fn test_missing_file_is_a_load_error() {
        let loader = InMemoryLoader::new([("a.env", "A=1")]);
        let err = assembler()
            .assemble(&loader, &sources(&[], &["nope.crt"], &["a.env"]))
            .unwrap_err();
        assert!(matches!(err, Error::Load { .. }));
    }

    #[test]
    fn test_invalid_alias_key() {
        let loader = InMemoryLoader::new([("x", "1")]);
        let err = assembler()
            .assemble(&loader, &sources(&[], &["bad key=x"], &[]))
            .unwrap_err();
        assert!(err.to_string().contains("not a valid key name"));
    }

    #[test]
    fn test_bare_env_key_uses_lookup() {
        let loader = InMemoryLoader::new([("a.env", "REGION\n")]);
        let data = KvAssembler::with_env_lookup(|key| (key == "REGION").then(|| "eu-west-1".into()))
            .assemble(&loader, &sources(&[], &[], &["a.env"]))
            .unwrap();
        assert_eq!(data["REGION"], b"eu-west-1");
    }
}
