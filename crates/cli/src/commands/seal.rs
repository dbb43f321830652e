use crate::atomic_file::write_atomic;
use crate::settings::Settings;
use eyre::WrapErr;
use sealgen_core::Format;
use sealgen_envelope::SealEngine;
use std::io::Write;
use std::path::Path;

pub fn execute(
    settings: &Settings,
    file: &Path,
    key_ids: &[String],
    format: Format,
    in_place: bool,
) -> eyre::Result<()> {
    let engine = SealEngine::new(settings.keyring()?);
    let plaintext =
        std::fs::read(file).wrap_err_with(|| format!("failed to read '{}'", file.display()))?;

    let sealed = if key_ids.is_empty() {
        engine.seal(&plaintext, format)
    } else {
        let ids: Vec<&str> = key_ids.iter().map(String::as_str).collect();
        engine.seal_for(&plaintext, format, &ids)
    }
    .wrap_err_with(|| format!("failed to seal '{}' as {format}", file.display()))?;

    if in_place {
        write_atomic(file, &sealed)?;
        tracing::info!(file = %file.display(), %format, "Sealed in place");
    } else {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&sealed)?;
        stdout.flush()?;
    }
    Ok(())
}
