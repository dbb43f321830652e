use std::path::PathBuf;

/// Result type alias for sealgen operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for sealgen operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed generator request or runtime settings
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// The raw loader could not resolve a resource
    #[error("failed to load '{path}': {message}")]
    Load {
        path: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An envelope was recognized but could not be opened
    #[error("failed to decrypt '{path}': {message}")]
    Decryption { path: String, message: String },

    /// The key/value mapping could not be built from the declared sources
    #[error("failed to assemble secret from '{origin}': {message}")]
    Assembly { origin: String, message: String },

    /// The assembled secret could not be serialized as a manifest
    #[error("failed to render secret '{name}': {message}")]
    Render { name: String, message: String },

    /// File system operations
    #[error("file system {operation} operation failed for '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },
}

// Conversion implementations
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::FileSystem {
            path: PathBuf::new(),
            operation: "unknown".to_string(),
            source: error,
        }
    }
}

// Helper methods for creating errors with context
impl Error {
    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Create a load error without an underlying cause
    #[must_use]
    pub fn load(path: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Load {
            path: path.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a load error with a source error
    #[must_use]
    pub fn load_with_source(
        path: impl Into<String>,
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Error::Load {
            path: path.into(),
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a decryption error
    #[must_use]
    pub fn decryption(path: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Decryption {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an assembly error for the given source
    #[must_use]
    pub fn assembly(origin: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Assembly {
            origin: origin.into(),
            message: message.into(),
        }
    }

    /// Create a render error for the named secret
    #[must_use]
    pub fn render(name: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Render {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a file system error with context
    #[must_use]
    pub fn file_system(
        path: impl Into<PathBuf>,
        operation: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Error::FileSystem {
            path: path.into(),
            operation: operation.into(),
            source,
        }
    }

    /// Name of the error kind, as reported to users
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Configuration { .. } => "ConfigurationError",
            Error::Load { .. } => "LoadError",
            Error::Decryption { .. } => "DecryptionError",
            Error::Assembly { .. } => "AssemblyError",
            Error::Render { .. } => "RenderError",
            Error::FileSystem { .. } => "FileSystemError",
        }
    }
}

// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to a Result
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a lazy message
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let base_error = e.into();
            Error::Configuration {
                message: format!("{}: {}", message.into(), base_error),
            }
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let base_error = e.into();
            Error::Configuration {
                message: format!("{}: {}", f(), base_error),
            }
        })
    }
}
