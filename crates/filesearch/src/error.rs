#[derive(Debug, thiserror::Error)]
pub enum FilesearchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Search location is not a local directory: {0}")]
    UnsupportedLocation(String),

    #[error("No query set before starting the engine")]
    MissingQuery,

    #[error("Engine already running")]
    AlreadyRunning,
}

pub type FilesearchResult<T> = std::result::Result<T, FilesearchError>;
