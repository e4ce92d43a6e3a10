use thiserror::Error;

/// Failure raised while a request was being executed. This is what the
/// `error` hook receives and what `ErrorOutcome::Error` carries.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum ExtensionError {
    #[error("Initialization failed: {0}")]
    InitializationError(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Dependency error: {0}")]
    DependencyError(String),

    #[error("Client error: {0}")]
    ClientError(String),

    #[error("Handler error: {0}")]
    HandlerError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Version error: {0}")]
    VersionError(#[from] semver::Error),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl ExtensionError {
    pub fn initialization<S: Into<String>>(msg: S) -> Self {
        ExtensionError::InitializationError(msg.into())
    }

    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        ExtensionError::ConfigurationError(msg.into())
    }

    pub fn dependency<S: Into<String>>(msg: S) -> Self {
        ExtensionError::DependencyError(msg.into())
    }

    pub fn client<S: Into<String>>(msg: S) -> Self {
        ExtensionError::ClientError(msg.into())
    }

    pub fn handler<S: Into<String>>(msg: S) -> Self {
        ExtensionError::HandlerError(msg.into())
    }

    pub fn unknown<S: Into<String>>(msg: S) -> Self {
        ExtensionError::Unknown(msg.into())
    }
}
