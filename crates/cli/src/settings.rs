//! Runtime settings for the `sealgen` binary
//!
//! Each setting resolves from its command-line flag, then its environment
//! variable, then a default.

use sealgen_core::{
    Error, Result, ResultExt, CONFIG_DIR_NAME, KEYRING_FILENAME, SEALGEN_KEYRING_VAR,
    SEALGEN_LOAD_RESTRICTOR_VAR, SEALGEN_ROOT_VAR,
};
use sealgen_envelope::Keyring;
use sealgen_loader::LoadRestrictions;
use std::path::{Path, PathBuf};

/// Resolved settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Loader root for generator sources
    pub root: PathBuf,
    /// Keyring location, if one could be determined
    pub keyring_path: Option<PathBuf>,
    /// Whether the keyring location was given explicitly
    pub keyring_explicit: bool,
    pub restrictions: LoadRestrictions,
}

impl Settings {
    /// Load the keyring. A missing keyring at the default location is empty;
    /// a missing keyring that was asked for explicitly is an error.
    pub fn keyring(&self) -> Result<Keyring> {
        let Some(path) = &self.keyring_path else {
            return Ok(Keyring::new());
        };
        if !path.exists() {
            if self.keyring_explicit {
                return Err(Error::configuration(format!(
                    "keyring '{}' does not exist",
                    path.display()
                )));
            }
            tracing::debug!(path = %path.display(), "No keyring at default location");
            return Ok(Keyring::new());
        }
        Keyring::load(path).map_err(|e| {
            Error::configuration(format!("cannot load keyring '{}': {e}", path.display()))
        })
    }

    /// Keyring location for commands that write it
    pub fn keyring_path(&self) -> Result<&Path> {
        self.keyring_path.as_deref().ok_or_else(|| {
            Error::configuration(format!(
                "cannot determine a keyring location; pass --keyring or set {SEALGEN_KEYRING_VAR}"
            ))
        })
    }
}

type EnvLookup = Box<dyn Fn(&str) -> Option<String>>;

/// Builder resolving [`Settings`] from flags, environment and defaults
pub struct SettingsLoader {
    root: Option<PathBuf>,
    keyring: Option<PathBuf>,
    restrictions: Option<LoadRestrictions>,
    env: EnvLookup,
}

impl SettingsLoader {
    pub fn new() -> Self {
        Self::with_env(|name| std::env::var(name).ok().filter(|value| !value.is_empty()))
    }

    /// Use `env` instead of the process environment
    pub fn with_env<F>(env: F) -> Self
    where
        F: Fn(&str) -> Option<String> + 'static,
    {
        Self {
            root: None,
            keyring: None,
            restrictions: None,
            env: Box::new(env),
        }
    }

    pub fn root(mut self, root: Option<PathBuf>) -> Self {
        self.root = root;
        self
    }

    pub fn keyring(mut self, keyring: Option<PathBuf>) -> Self {
        self.keyring = keyring;
        self
    }

    pub fn restrictions(mut self, restrictions: Option<LoadRestrictions>) -> Self {
        self.restrictions = restrictions;
        self
    }

    pub fn load(self) -> Result<Settings> {
        let root = match self.root.or_else(|| (self.env)(SEALGEN_ROOT_VAR).map(PathBuf::from)) {
            Some(root) => root,
            None => std::env::current_dir()
                .map_err(|e| Error::file_system(".", "read current directory", e))?,
        };

        let explicit = self
            .keyring
            .or_else(|| (self.env)(SEALGEN_KEYRING_VAR).map(PathBuf::from));
        let keyring_explicit = explicit.is_some();
        let keyring_path = explicit.or_else(default_keyring_path);

        let restrictions = match self.restrictions {
            Some(restrictions) => restrictions,
            None => match (self.env)(SEALGEN_LOAD_RESTRICTOR_VAR) {
                Some(token) => token
                    .parse::<LoadRestrictions>()
                    .with_context(|| format!("invalid {SEALGEN_LOAD_RESTRICTOR_VAR}"))?,
                None => LoadRestrictions::default(),
            },
        };

        let settings = Settings {
            root,
            keyring_path,
            keyring_explicit,
            restrictions,
        };
        tracing::debug!(?settings, "Resolved settings");
        Ok(settings)
    }
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn default_keyring_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(KEYRING_FILENAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(vars: &[(&str, &str)]) -> SettingsLoader {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        SettingsLoader::with_env(move |name| vars.get(name).cloned())
    }

    #[test]
    fn test_flags_win_over_environment() {
        let settings = env(&[
            (SEALGEN_ROOT_VAR, "/from/env"),
            (SEALGEN_KEYRING_VAR, "/env/keyring.yaml"),
            (SEALGEN_LOAD_RESTRICTOR_VAR, "none"),
        ])
        .root(Some(PathBuf::from("/from/flag")))
        .keyring(Some(PathBuf::from("/flag/keyring.yaml")))
        .restrictions(Some(LoadRestrictions::RootOnly))
        .load()
        .unwrap();

        assert_eq!(settings.root, PathBuf::from("/from/flag"));
        assert_eq!(settings.keyring_path, Some(PathBuf::from("/flag/keyring.yaml")));
        assert!(settings.keyring_explicit);
        assert_eq!(settings.restrictions, LoadRestrictions::RootOnly);
    }

    #[test]
    fn test_environment_then_defaults() {
        let settings = env(&[(SEALGEN_LOAD_RESTRICTOR_VAR, "none")]).load().unwrap();
        assert_eq!(settings.root, std::env::current_dir().unwrap());
        assert!(!settings.keyring_explicit);
        assert_eq!(settings.restrictions, LoadRestrictions::None);

        let settings = env(&[(SEALGEN_ROOT_VAR, "/from/env")]).load().unwrap();
        assert_eq!(settings.root, PathBuf::from("/from/env"));
        assert_eq!(settings.restrictions, LoadRestrictions::RootOnly);
    }

    #[test]
    fn test_bad_restrictor_is_a_configuration_error() {
        let err = env(&[(SEALGEN_LOAD_RESTRICTOR_VAR, "sometimes")]).load().unwrap_err();
        assert_eq!(err.kind(), "ConfigurationError");
        assert!(err.to_string().contains(SEALGEN_LOAD_RESTRICTOR_VAR));
    }

    #[test]
    fn test_missing_keyring() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("keyring.yaml");

        let mut settings = env(&[]).keyring(Some(missing)).load().unwrap();
        assert!(settings.keyring().is_err());

        settings.keyring_explicit = false;
        assert!(settings.keyring().unwrap().is_empty());
    }
}
