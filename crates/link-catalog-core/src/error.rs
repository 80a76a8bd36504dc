use link_catalog_sources::SourceError;
use thiserror::Error;

/// Errors surfaced by catalog operations.
///
/// Validation failures are reported before any network call is made.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("No episodes resolved from '{0}'")]
    NoEpisodesResolved(String),

    #[error("Selector asks for {requested} episodes (at most {max} per request)")]
    SelectionTooLarge { requested: u64, max: u64 },

    #[error("Nothing selected")]
    EmptySelection,

    #[error("No valid rows found in CSV ({skipped} skipped)")]
    NoValidRows { skipped: usize },

    #[error("Nothing to change for link {0}")]
    EmptyPatch(i64),

    #[error("Missing identifier: {0}")]
    MissingIdentifier(String),

    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Source(#[from] SourceError),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
