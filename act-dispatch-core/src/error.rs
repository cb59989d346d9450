//! Error type for construction-time failures

/// Errors raised while building action creators or dispatching batches.
///
/// Dispatching through a reducer never produces one of these: reducers ignore
/// what they cannot use.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A serializable action type was issued twice by the same registry.
    #[error("Duplicate action type: {0}")]
    DuplicateType(String),

    /// `disbatch` was handed something that cannot receive actions.
    #[error("disbatch must take either a valid store or a dispatch function as first parameter")]
    InvalidTarget,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
