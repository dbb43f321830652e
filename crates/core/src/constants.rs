/// Constants used throughout the sealgen codebase
// Generator config identity
pub const GENERATOR_API_VERSION: &str = "sealed.secrets/v1";
pub const GENERATOR_KIND: &str = "SealedSecretGenerator";

// Output manifest
pub const SECRET_API_VERSION: &str = "v1";
pub const SECRET_KIND: &str = "Secret";
pub const SECRET_TYPE_OPAQUE: &str = "Opaque";
pub const SECRET_TYPE_TLS: &str = "kubernetes.io/tls";
/// Read by kustomize to decide how a generated resource merges with existing ones
pub const BEHAVIOR_ANNOTATION: &str = "kustomize.config.k8s.io/behavior";

// TLS key pair schema
pub const TLS_CERT_KEY: &str = "tls.crt";
pub const TLS_PRIVATE_KEY: &str = "tls.key";
pub const TLS_KEYS: [&str; 2] = [TLS_CERT_KEY, TLS_PRIVATE_KEY];

// Environment variable names
pub const SEALGEN_LOG_VAR: &str = "SEALGEN_LOG";
pub const SEALGEN_ROOT_VAR: &str = "SEALGEN_ROOT";
pub const SEALGEN_KEYRING_VAR: &str = "SEALGEN_KEYRING";
pub const SEALGEN_LOAD_RESTRICTOR_VAR: &str = "SEALGEN_LOAD_RESTRICTOR";

// Keyring location under the user config dir
pub const CONFIG_DIR_NAME: &str = "sealgen";
pub const KEYRING_FILENAME: &str = "keyring.yaml";

// Secret keys are DNS-subdomain sized
pub const MAX_SECRET_KEY_LEN: usize = 253;
