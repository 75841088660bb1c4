use std::path::PathBuf;

/// Errors that can occur while acquiring or driving a byte resource.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    /// Failed to open the file at the specified path.
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An I/O error occurred on the resource.
    #[error("resource I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ResourceError>;
