use crate::settings::Settings;
use eyre::WrapErr;
use sealgen_core::Format;
use sealgen_envelope::SealEngine;
use std::io::Write;
use std::path::Path;

pub fn execute(settings: &Settings, file: &Path, format: Format) -> eyre::Result<()> {
    let engine = SealEngine::new(settings.keyring()?);
    let content =
        std::fs::read(file).wrap_err_with(|| format!("failed to read '{}'", file.display()))?;

    let plaintext = engine
        .open(&content, format)
        .wrap_err_with(|| format!("failed to open '{}'", file.display()))?;
    if plaintext.is_none() {
        tracing::debug!(file = %file.display(), "Not sealed, passing through");
    }

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(plaintext.as_deref().unwrap_or(&content))?;
    stdout.flush()?;
    Ok(())
}
