use crate::settings::Settings;
use eyre::WrapErr;
use sealgen_envelope::{Keyring, MasterKey};

pub fn execute(settings: &Settings, id: String) -> eyre::Result<()> {
    let path = settings.keyring_path()?;
    let mut keyring = if path.exists() {
        Keyring::load(path).wrap_err_with(|| format!("failed to load keyring '{}'", path.display()))?
    } else {
        Keyring::new()
    };

    keyring.insert(MasterKey::generate(id.clone()))?;
    keyring
        .save(path)
        .wrap_err_with(|| format!("failed to write keyring '{}'", path.display()))?;

    println!("Added key '{id}' to {}", path.display());
    Ok(())
}
