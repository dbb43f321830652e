use clap::Subcommand;
use sealgen_core::Format;
use sealgen_loader::{classify_as, SourceRole};
use std::path::{Path, PathBuf};

pub mod generate;
pub mod keygen;
pub mod open;
pub mod seal;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate Secret manifests from generator configs
    #[command(visible_alias = "g")]
    Generate {
        /// Generator config files; manifests are printed in this order
        #[arg(required = true, value_name = "CONFIG")]
        configs: Vec<PathBuf>,
    },

    /// Encrypt a file for keys in the keyring
    Seal {
        /// File to seal
        file: PathBuf,

        /// Seal for this key only (can be specified multiple times; default: every key)
        #[arg(short = 'k', long = "key-id", value_name = "ID")]
        key_ids: Vec<String>,

        /// Content format (default: derived from the file name)
        #[arg(short, long, conflicts_with = "env_file")]
        format: Option<Format>,

        /// Derive the format as for an `envs` entry, so names without an extension are dotenv
        #[arg(short, long)]
        env_file: bool,

        /// Replace the file instead of printing to stdout
        #[arg(short, long)]
        in_place: bool,
    },

    /// Decrypt a sealed file to stdout; plaintext passes through unchanged
    Open {
        /// File to open
        file: PathBuf,

        /// Content format (default: derived from the file name)
        #[arg(short, long, conflicts_with = "env_file")]
        format: Option<Format>,

        /// Derive the format as for an `envs` entry, so names without an extension are dotenv
        #[arg(short, long)]
        env_file: bool,
    },

    /// Add a freshly generated key to the keyring
    Keygen {
        /// Id the key is stored under and referenced by in sealed files
        #[arg(long)]
        id: String,
    },
}

/// Explicit format, else the one the loader would derive for this role
pub(crate) fn resolve_format(file: &Path, format: Option<Format>, env_file: bool) -> Format {
    let role = if env_file { SourceRole::EnvFile } else { SourceRole::File };
    format.unwrap_or_else(|| classify_as(&file.to_string_lossy(), role))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_file_role_changes_extensionless_format() {
        let file = Path::new("overlays/prod/routerenv");
        assert_eq!(resolve_format(file, None, false), Format::Binary);
        assert_eq!(resolve_format(file, None, true), Format::Dotenv);
        assert_eq!(resolve_format(file, Some(Format::Yaml), true), Format::Yaml);
        assert_eq!(resolve_format(Path::new("a.json"), None, true), Format::Json);
    }
}
