use crate::engine::splat::DecodeError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ViewerError {
    #[error("renderer unavailable: {0} is not initialised")]
    RendererUnavailable(&'static str),
    #[error("viewer has not been initialised")]
    NotInitialized,
    #[error("viewer has been disposed")]
    Disposed,
    #[error("a load is already in progress")]
    LoadInProgress,
    #[error("load stopped before producing a result")]
    LoadAborted,
    #[error("failed to fetch '{url}': {message}")]
    Fetch { url: String, message: String },
    #[error("failed to fetch '{url}': HTTP {status}")]
    Http { url: String, status: u16 },
    #[error("failed to read '{path}': {message}")]
    Io { path: String, message: String },
    #[error("failed to decode '{name}': {source}")]
    Decode {
        name: String,
        #[source]
        source: DecodeError,
    },
    #[error("disposal incomplete: {}", .0.join("; "))]
    Dispose(Vec<String>),
}
