//! Per-invocation generator entry point

use crate::assembler::{Assembler, KvAssembler};
use crate::request::SecretRequest;
use crate::secret::AssembledSecret;
use crate::sources::{FileSource, Sources};
use sealgen_core::{Error, Result, Subtype, TLS_CERT_KEY, TLS_KEYS, TLS_PRIVATE_KEY};
use sealgen_envelope::Decryptor;
use sealgen_loader::{DecryptingLoader, Loader, LoaderGuard};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Everything one generation needs: the raw loader for the request's root,
/// the decryptor for sealed subtypes and the assembler
pub struct GeneratorContext {
    loader: Box<dyn Loader>,
    decryptor: Arc<dyn Decryptor>,
    assembler: Box<dyn Assembler>,
}

impl GeneratorContext {
    pub fn new(loader: Box<dyn Loader>, decryptor: Arc<dyn Decryptor>) -> Self {
        Self {
            loader,
            decryptor,
            assembler: Box::new(KvAssembler::new()),
        }
    }

    #[must_use]
    pub fn with_assembler(mut self, assembler: impl Assembler + 'static) -> Self {
        self.assembler = Box::new(assembler);
        self
    }

    /// Produce the secret for a request.
    ///
    /// The loader chain is cleaned up exactly once whether or not generation
    /// succeeds. Any failure aborts the request without a partial secret.
    pub fn generate(self, request: &SecretRequest) -> Result<AssembledSecret> {
        let subtype = &request.subtype;
        let chain: Box<dyn Loader> = if subtype.decrypts() {
            Box::new(DecryptingLoader::new(self.loader, self.decryptor))
        } else {
            self.loader
        };
        let loader = LoaderGuard::new(chain);

        if *subtype == Subtype::SealedTls {
            check_tls_files(&request.sources)?;
        }

        tracing::debug!(name = %request.name, %subtype, root = %loader.root().display(), "Generating secret");
        let data = self.assembler.assemble(&*loader, &request.sources)?;
        if *subtype == Subtype::SealedTls {
            let keys: BTreeSet<&str> = data.keys().map(String::as_str).collect();
            if data.len() != TLS_KEYS.len() || !TLS_KEYS.iter().all(|key| keys.contains(key)) {
                return Err(Error::assembly(
                    &request.name,
                    format!(
                        "TLS secret must contain exactly {TLS_CERT_KEY} and {TLS_PRIVATE_KEY}, found [{}]",
                        keys.into_iter().collect::<Vec<_>>().join(", ")
                    ),
                ));
            }
        }
        loader.release()?;

        Ok(AssembledSecret {
            name: request.name.clone(),
            namespace: request.namespace.clone(),
            secret_type: subtype.secret_type().to_string(),
            behavior: request.behavior,
            labels: request.labels.clone(),
            annotations: request.annotations.clone(),
            data,
        })
    }
}

/// File sources of a TLS secret must name exactly the certificate and key
fn check_tls_files(sources: &Sources) -> Result<()> {
    let keys = sources
        .files
        .iter()
        .map(|source| FileSource::parse(source).map(|file| file.key))
        .collect::<Result<Vec<_>>>()?;

    let mut sorted: Vec<&str> = keys.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    if sorted != TLS_KEYS {
        return Err(Error::configuration(format!(
            "TLS secret files must be exactly {TLS_CERT_KEY} and {TLS_PRIVATE_KEY}, got [{}]",
            keys.join(", ")
        )));
    }
    Ok(())
}
