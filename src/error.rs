/// Error types for the registration-based encryption library
use ark_serialize::SerializationError;

#[derive(Debug, thiserror::Error)]
pub enum RbeError {
    /// Invalid parameter provided (e.g., zero capacity, wrong vector length)
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Identity does not fit the capacity the reference string was built for
    #[error("identity {id} out of range for capacity {max_users}")]
    IdentityOutOfRange { id: usize, max_users: usize },

    /// A derived ladder index fell outside the reference string. This means
    /// the (N, n) configuration is inconsistent and cannot be recovered from.
    #[error("ladder index {index} out of bounds for ladder of length {len}")]
    LadderIndex { index: usize, len: usize },

    /// Group element (de)serialization failed
    #[error("serialization error: {0}")]
    Serialization(#[from] SerializationError),

    /// Storage backend failure, propagated without retry
    #[error("storage error: {0}")]
    Storage(String),
}
