//! Error types for visim.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias for visim operations.
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Errors surfaced by the search engine.
///
/// Per-candidate decode failures never appear here; the scanner skips those
/// candidates. Only failures that abort a whole search are represented.
#[derive(Debug, Error)]
pub enum SearchError {
    /// An image file could not be read or parsed.
    #[error("failed to decode image {}: {}", .path.display(), .reason)]
    Decode { path: PathBuf, reason: String },
    /// The candidate directory is missing or unreadable.
    #[error("cannot read candidate directory {}: {}", .path.display(), .reason)]
    Directory { path: PathBuf, reason: String },
    /// A search was requested while another one was in flight.
    #[error("a search is already in flight")]
    Busy,
    /// The search was cancelled before it produced a ranking.
    #[error("search cancelled")]
    Cancelled,
    /// The search worker terminated without producing an outcome.
    #[error("search worker panicked")]
    Panicked,
}
