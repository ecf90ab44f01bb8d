//! Math engine errors
//!
//! Every quote either succeeds completely or returns exactly one of these
//! variants. The engine holds no state, so there is no partial result to
//! roll back and no unrecoverable category.

use primitive_types::U256;
use thiserror::Error;

/// Failure kinds reported by the quoting functions
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MathError {
    /// An arithmetic step would exceed the 256-bit working width
    #[error("Arithmetic overflow in {operation}")]
    Overflow { operation: &'static str },

    /// Input lies outside the function's valid domain
    #[error("Domain error in {function}: {reason}")]
    DomainError {
        function: &'static str,
        reason: &'static str,
    },

    /// Zero or near-zero reserves or amounts make the quote meaningless
    #[error("Insufficient liquidity: {context}")]
    InsufficientLiquidity { context: &'static str },

    /// Burn request is zero or exceeds the outstanding supply
    #[error("Insufficient shares: requested {requested}, outstanding {outstanding}")]
    InsufficientShares { requested: U256, outstanding: U256 },

    /// First deposit does not clear the locked minimum
    #[error(
        "Insufficient initial liquidity: geometric mean {geometric_mean} must exceed {minimum}"
    )]
    InsufficientInitialLiquidity { geometric_mean: U256, minimum: U256 },
}

impl MathError {
    pub(crate) fn overflow(operation: &'static str) -> Self {
        Self::Overflow { operation }
    }

    pub(crate) fn domain(function: &'static str, reason: &'static str) -> Self {
        Self::DomainError { function, reason }
    }

    pub(crate) fn liquidity(context: &'static str) -> Self {
        Self::InsufficientLiquidity { context }
    }
}

/// Result alias used throughout the engine
pub type MathResult<T> = Result<T, MathError>;
