use sealgen_core::Format;

/// Result alias for envelope operations
pub type EnvelopeResult<T> = std::result::Result<T, EnvelopeError>;

/// Failures raised while sealing or opening envelopes
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    #[error("malformed envelope: {0}")]
    Malformed(String),

    #[error("no key available for key group [{ids}]")]
    NoMatchingKey { ids: String },

    #[error("failed to unwrap data key with key '{id}'")]
    KeyUnwrap { id: String },

    #[error("message authentication failed, content was modified")]
    MacMismatch,

    #[error("cryptographic failure: {0}")]
    Crypto(String),

    #[error("cannot seal {format} content: {message}")]
    Plaintext { format: Format, message: String },

    #[error("key '{0}' is not in the keyring")]
    UnknownKey(String),

    #[error("keyring error: {0}")]
    Keyring(String),

    #[error("keyring io error: {0}")]
    Io(#[from] std::io::Error),
}

impl EnvelopeError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        EnvelopeError::Malformed(message.into())
    }

    pub(crate) fn plaintext(format: Format, message: impl Into<String>) -> Self {
        EnvelopeError::Plaintext {
            format,
            message: message.into(),
        }
    }
}
