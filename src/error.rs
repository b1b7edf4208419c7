//! Error types
//!
//! Gameplay itself never fails: bad input is clamped or ignored. Errors only
//! surface from arithmetic on unchecked inputs and from the leaderboard.

use thiserror::Error;

/// Failures of the integer helpers in [`crate::math`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MathError {
    /// lcm(0, 0): gcd is zero so the quotient is undefined
    #[error("division by zero: gcd({a}, {b}) is 0")]
    DivideByZero { a: i64, b: i64 },
    /// Result does not fit in an i64
    #[error("lcm({a}, {b}) overflows i64")]
    Overflow { a: i64, b: i64 },
}

/// Failures while submitting or storing a score
#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("storage unavailable: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("transport failed: {0}")]
    Transport(String),
    /// Service answered `ok: false`
    #[error("rejected by server: {0}")]
    Rejected(String),
    #[error("response is missing rank, total or highest")]
    Incomplete,
}
