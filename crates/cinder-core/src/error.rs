//! Error types for Cinder core operations

use crate::types::{Address, RequestToken, TokenId, WaveId};
use thiserror::Error;

/// Result type alias for Cinder operations
pub type Result<T> = std::result::Result<T, CinderError>;

/// Broad class of an error, used to decide how callers react
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad caller input; nothing was mutated
    Validation,
    /// A core invariant would be broken; the call is aborted
    Invariant,
    /// A collaborator (ledger, attribute provider, randomness) failed
    External,
}

/// Errors that can occur in Cinder core operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CinderError {
    // === Validation ===
    /// Unknown id of the given entity type
    #[error("Invalid {entity} id: {id}")]
    InvalidId { entity: &'static str, id: u64 },

    /// Zero address supplied where an account is required
    #[error("Zero address is not allowed")]
    ZeroAddress,

    /// Parallel arrays have different lengths
    #[error("Array length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    /// Template pool does not exist
    #[error("Unknown template pool: {0}")]
    UnknownPool(u64),

    /// Batch size is zero or above the allowed maximum
    #[error("Batch size {size} out of bounds (max {max})")]
    BatchSizeOutOfBounds { size: usize, max: usize },

    /// Item must be inactive before it can be modified
    #[error("{entity} {id} must be inactive to be modified")]
    ItemActive { entity: &'static str, id: u64 },

    /// Item is inactive and cannot be used
    #[error("{entity} {id} is not active")]
    ItemInactive { entity: &'static str, id: u64 },

    /// Level cap reached
    #[error("Level cap exceeded: token {token_id} is already level {level}")]
    LevelCapExceeded { token_id: TokenId, level: u32 },

    /// Quantity updates are only allowed on the most recent wave
    #[error("Wave key mismatch: expected {expected:?}, got {got}")]
    WaveKeyMismatch { expected: Option<WaveId>, got: WaveId },

    /// Quantity or amount of zero where a positive value is required
    #[error("Amount must be nonzero")]
    ZeroAmount,

    /// Total weight of a weighted set is zero
    #[error("Weighted set has zero total weight")]
    ZeroWeight,

    /// Caller does not own the asset
    #[error("{caller} does not own token {token_id}")]
    NotOwner { caller: Address, token_id: TokenId },

    /// A constraint did not hold for the user
    #[error("Constraint not satisfied: {0}")]
    ConstraintFailed(String),

    /// Token already staked
    #[error("Token {0} is already staked")]
    AlreadyStaked(TokenId),

    /// Token not staked
    #[error("Token {0} is not staked")]
    NotStaked(TokenId),

    /// Pending randomness request does not exist
    #[error("Unknown randomness request: {0}")]
    UnknownRequest(RequestToken),

    /// Pending request has not reached its timeout yet
    #[error("Request {token} cannot be cancelled before {cancellable_at}")]
    RequestNotExpired { token: RequestToken, cancellable_at: i64 },

    /// Soulbound rituals cannot change owner
    #[error("Ritual {0} is soulbound")]
    Soulbound(TokenId),

    /// Ritual has no charges left
    #[error("Ritual {0} has no charges left")]
    NoChargesLeft(TokenId),

    /// Template is structurally invalid
    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    /// Generic invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // === Invariant violations ===
    /// Queue has not been initialized
    #[error("Queue is not initialized")]
    QueueUninitialized,

    /// Queue was initialized twice
    #[error("Queue is already initialized")]
    QueueAlreadyInitialized,

    /// Dequeue or peek on an empty queue
    #[error("Queue is empty")]
    QueueEmpty,

    /// Offset outside the active queue range
    #[error("Queue offset {offset} out of range (len {len})")]
    QueueIndexOutOfRange { offset: u64, len: u64 },

    /// Claim would take more than the wave has left
    #[error("Unclaimed reward underflow in wave {wave_id}: owed {owed}, remaining {remaining}")]
    UnclaimedUnderflow {
        wave_id: WaveId,
        owed: u128,
        remaining: u128,
    },

    /// Checked arithmetic overflowed
    #[error("Arithmetic overflow in {0}")]
    Overflow(&'static str),

    // === External collaborators ===
    /// Asset ledger refused the operation
    #[error("Asset ledger error: {0}")]
    Ledger(String),

    /// Attribute provider failed
    #[error("Attribute provider error: {0}")]
    Attributes(String),

    /// Randomness provider failed
    #[error("Randomness provider error: {0}")]
    Randomness(String),
}

impl CinderError {
    /// Shorthand for an unknown id
    pub fn invalid_id(entity: &'static str, id: u64) -> Self {
        Self::InvalidId { entity, id }
    }

    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::QueueUninitialized
            | Self::QueueAlreadyInitialized
            | Self::QueueEmpty
            | Self::QueueIndexOutOfRange { .. }
            | Self::UnclaimedUnderflow { .. }
            | Self::Overflow(_) => ErrorKind::Invariant,
            Self::Ledger(_) | Self::Attributes(_) | Self::Randomness(_) => ErrorKind::External,
            _ => ErrorKind::Validation,
        }
    }

    /// Invariant violations point at a sequencing bug or hostile input
    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::Invariant
    }

    /// Stable numeric code for API responses
    pub fn code(&self) -> u32 {
        match self {
            Self::InvalidId { .. } | Self::UnknownPool(_) | Self::UnknownRequest(_) => 1001,
            Self::ZeroAddress | Self::ZeroAmount | Self::ZeroWeight => 1002,
            Self::LengthMismatch { .. } | Self::BatchSizeOutOfBounds { .. } => 1003,
            Self::ItemActive { .. } | Self::ItemInactive { .. } => 1004,
            Self::LevelCapExceeded { .. } => 1005,
            Self::WaveKeyMismatch { .. } => 1006,
            Self::NotOwner { .. } | Self::Soulbound(_) => 1007,
            Self::ConstraintFailed(_) => 1008,
            Self::AlreadyStaked(_) | Self::NotStaked(_) => 1009,
            Self::RequestNotExpired { .. } | Self::NoChargesLeft(_) => 1010,
            Self::QueueUninitialized
            | Self::QueueAlreadyInitialized
            | Self::QueueEmpty
            | Self::QueueIndexOutOfRange { .. } => 2001,
            Self::UnclaimedUnderflow { .. } | Self::Overflow(_) => 2002,
            Self::Ledger(_) | Self::Attributes(_) | Self::Randomness(_) => 3001,
            _ => 9999,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(CinderError::invalid_id("template", 7).code(), 1001);
        assert_eq!(CinderError::QueueEmpty.code(), 2001);
        assert_eq!(CinderError::Ledger("x".into()).code(), 3001);
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(CinderError::ZeroAddress.kind(), ErrorKind::Validation);
        assert!(CinderError::QueueUninitialized.is_fatal());
        assert!(CinderError::UnclaimedUnderflow {
            wave_id: 1,
            owed: 2,
            remaining: 1
        }
        .is_fatal());
        assert!(!CinderError::Randomness("down".into()).is_fatal());
    }

    #[test]
    fn test_error_display() {
        let err = CinderError::WaveKeyMismatch {
            expected: Some(3),
            got: 2,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Wave key mismatch"));
    }
}
