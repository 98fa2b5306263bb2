use alloy_primitives::U256;

/// Failure taxonomy for the whole tool.
///
/// Validation kinds are raised before any chain call is attempted; the
/// mid-workflow kinds carry the name of the operation that was in flight.
#[derive(Debug, thiserror::Error)]
pub enum KeeperError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid range: lower bound {lower} must be below upper bound {upper}")]
    InvalidRange { lower: String, upper: String },

    #[error("tick {tick} is not a multiple of the pool tick spacing {spacing}")]
    InvalidTickAlignment { tick: i32, spacing: i32 },

    #[error("out of protocol bounds: {0}")]
    OutOfRange(String),

    #[error("invalid position: {0}")]
    InvalidPosition(String),

    #[error("position {token_id} not found")]
    NotFound { token_id: U256 },

    #[error("network error during {operation}: {reason}")]
    Network { operation: &'static str, reason: String },

    #[error("transaction reverted during {operation}: {reason}")]
    Reverted { operation: &'static str, reason: String },

    #[error("unclassified failure during {operation}: {reason}")]
    Unknown { operation: &'static str, reason: String },
}

impl KeeperError {
    /// True for errors raised by local validation, i.e. before any state
    /// could have been created on-chain.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            KeeperError::InvalidInput(_)
                | KeeperError::InvalidRange { .. }
                | KeeperError::InvalidTickAlignment { .. }
                | KeeperError::OutOfRange(_)
                | KeeperError::InvalidPosition(_)
        )
    }
}
