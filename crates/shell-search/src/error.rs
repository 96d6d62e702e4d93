/// Unified error type for the shell-search crate.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Configuration could not be parsed or is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The provider runtime has shut down and no longer accepts requests.
    #[error("search provider stopped")]
    ServiceStopped,

    /// Metadata was requested for identifiers with no backing resource.
    #[error("unresolved result identifiers: {}", .0.join(", "))]
    UnresolvedIdentifiers(Vec<String>),

    /// An external collaborator failed.
    #[error("{collaborator} failed: {message}")]
    Collaborator {
        collaborator: &'static str,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProviderError {
    pub fn collaborator(collaborator: &'static str, message: impl Into<String>) -> Self {
        Self::Collaborator {
            collaborator,
            message: message.into(),
        }
    }
}

/// Result type alias using [`ProviderError`].
pub type ProviderResult<T> = Result<T, ProviderError>;
