use sealgen_core::{Error, Format};
use sealgen_envelope::{Decryptor, EnvelopeError, EnvelopeResult, Keyring, MasterKey, SealEngine};
use sealgen_loader::{DecryptingLoader, InMemoryLoader, Loader, ResourceRef};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn engine() -> Arc<SealEngine> {
    let mut keyring = Keyring::new();
    keyring.insert(MasterKey::new("ops", [7u8; 32])).unwrap();
    Arc::new(SealEngine::new(keyring))
}

/// Decryptor that refuses everything it is shown
struct Refusing {
    calls: AtomicUsize,
}

impl Decryptor for Refusing {
    fn decrypt(&self, _data: &[u8], _format: Format) -> EnvelopeResult<Option<Vec<u8>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(EnvelopeError::MacMismatch)
    }
}

#[test]
fn test_sealed_and_plain_resources_are_transparent() {
    let engine = engine();
    let sealed_env = engine.seal(b"ROUTER_PASSWORD=admin\n", Format::Dotenv).unwrap();
    let sealed_pem = engine.seal(b"-----BEGIN CERTIFICATE-----\n", Format::Binary).unwrap();

    let raw = InMemoryLoader::new([
        ("router.env", sealed_env.clone()),
        ("certs/tls.crt", sealed_pem),
        ("plain.env", b"FRUIT=apple\n".to_vec()),
    ]);
    let loader = DecryptingLoader::new(Box::new(raw.clone()), engine);

    assert_eq!(
        loader.load(&ResourceRef::env_file("router.env")).unwrap(),
        b"ROUTER_PASSWORD=admin\n"
    );
    assert_eq!(
        loader.load(&ResourceRef::file("certs/tls.crt")).unwrap(),
        b"-----BEGIN CERTIFICATE-----\n"
    );
    assert_eq!(
        loader.load(&ResourceRef::env_file("plain.env")).unwrap(),
        b"FRUIT=apple\n"
    );

    // The raw loader still hands out ciphertext
    assert_eq!(raw.load(&ResourceRef::env_file("router.env")).unwrap(), sealed_env);
}

#[test]
fn test_descend_keeps_decryption() {
    let engine = engine();
    let sealed = engine.seal(b"A=1\n", Format::Dotenv).unwrap();
    let loader = DecryptingLoader::new(
        Box::new(InMemoryLoader::new([("overlay/app.env", sealed)])),
        engine,
    );

    let child = loader.descend("overlay").unwrap();
    assert_eq!(child.root(), std::path::Path::new("/overlay"));
    assert_eq!(child.load(&ResourceRef::env_file("app.env")).unwrap(), b"A=1\n");
}

#[test]
fn test_decryption_failure_is_fatal() {
    let decryptor = Arc::new(Refusing {
        calls: AtomicUsize::new(0),
    });
    let loader = DecryptingLoader::new(
        Box::new(InMemoryLoader::new([("secret.yaml", "a: b")])),
        decryptor.clone(),
    );

    match loader.load(&ResourceRef::file("secret.yaml")) {
        Err(Error::Decryption { path, .. }) => assert_eq!(path, "secret.yaml"),
        other => panic!("expected decryption error, got {other:?}"),
    }
    assert_eq!(decryptor.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_inner_load_errors_skip_decryption() {
    let decryptor = Arc::new(Refusing {
        calls: AtomicUsize::new(0),
    });
    let loader = DecryptingLoader::new(Box::new(InMemoryLoader::new([("a", "1")])), decryptor.clone());

    assert!(matches!(
        loader.load(&ResourceRef::file("missing.env")),
        Err(Error::Load { .. })
    ));
    assert_eq!(decryptor.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_cleanup_delegates() {
    let raw = InMemoryLoader::new([("a", "1")]);
    let loader = DecryptingLoader::new(Box::new(raw.clone()), engine());
    loader.cleanup().unwrap();
    assert_eq!(raw.cleanup_count(), 1);
}
