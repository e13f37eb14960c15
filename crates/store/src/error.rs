use thiserror::Error;

/// Credential store failure.
///
/// `UniqueViolation` is split out because registration must surface a
/// username conflict to the caller; everything else is infrastructure
/// failure the caller reports generically.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("query failed: {0}")]
    Query(String),
}
