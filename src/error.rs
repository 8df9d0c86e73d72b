use thiserror::Error;
use uuid::Uuid;

/// Failures surfaced by the persistence collaborator. A `NotFound` means
/// the identifier no longer resolves; everything else is a transient
/// storage problem the user can retry.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("quiz {0} not found")]
    NotFound(Uuid),

    #[error("storage unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),
}

/// Failures of the question editing session. Index-addressed operations
/// against a position outside the question sequence are rejected; edits of
/// fields that do not belong to the active question kind are silently
/// dropped instead and never reach this type.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("question index {index} out of range (0..{len})")]
    OutOfRange { index: usize, len: usize },

    #[error("another question is already being edited")]
    EditInProgress,

    #[error("no question is open for editing")]
    NoActiveEdit,
}
