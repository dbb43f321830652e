use crate::settings::Settings;
use eyre::WrapErr;
use sealgen_core::{Error, Result};
use sealgen_envelope::SealEngine;
use sealgen_generator::{GeneratorContext, SecretRequest};
use sealgen_loader::{FileLoader, LoadRestrictions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Generate every config concurrently; output only when all succeed
pub async fn execute(settings: &Settings, configs: Vec<PathBuf>) -> eyre::Result<()> {
    let engine = Arc::new(SealEngine::new(settings.keyring()?));

    let tasks = configs.into_iter().map(|config| {
        let engine = Arc::clone(&engine);
        let root = settings.root.clone();
        let restrictions = settings.restrictions;
        tokio::task::spawn_blocking(move || {
            generate_one(&config, &root, restrictions, engine)
                .wrap_err_with(|| format!("failed to generate from '{}'", config.display()))
        })
    });

    let mut manifests = Vec::new();
    for joined in futures::future::join_all(tasks).await {
        manifests.push(joined.wrap_err("generator task panicked")??);
    }

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(manifests.join("---\n").as_bytes())
        .wrap_err("failed to write manifests")?;
    stdout.flush().wrap_err("failed to write manifests")?;
    Ok(())
}

fn generate_one(
    config: &Path,
    root: &Path,
    restrictions: LoadRestrictions,
    engine: Arc<SealEngine>,
) -> Result<String> {
    let content = std::fs::read(config).map_err(|e| Error::file_system(config, "read generator config", e))?;
    let request = SecretRequest::bind(&content)?;

    let loader = FileLoader::new(root, restrictions)?;
    let secret = GeneratorContext::new(Box::new(loader), engine).generate(&request)?;
    tracing::info!(name = %secret.name, keys = secret.data.len(), "Generated secret");
    secret.to_yaml()
}
