//! A dedicated error type for the identity and address-pool cores. Some
//! failures are deliberately *not* surfaced as `Err` here: DN-decoder
//! rejection during matching is treated as "no match," and pool-size
//! truncation is a logged warning only.
use std::fmt;

#[derive(Debug)]
pub enum CoreError {
    /// Textual identity failed to tokenize, or an embedded IP/DN/hex literal
    /// was invalid.
    ParseMalformed(String),
    /// A newly requested pool range partially overlaps an already-installed
    /// pool. The pool is not installed.
    PoolOverlap,
    /// No free address remains in the pool and it cannot grow further.
    PoolExhausted,
}

/// A specific custom `Result` for all fallible functions in this crate.
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub fn malformed<S: Into<String>>(s: S) -> Self {
        CoreError::ParseMalformed(s.into())
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::ParseMalformed(s) => write!(f, "malformed identity: {}", s),
            CoreError::PoolOverlap => write!(f, "ERROR: partial overlap of addresspool"),
            CoreError::PoolExhausted => write!(f, "no free address in addresspool"),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<hex::FromHexError> for CoreError {
    fn from(err: hex::FromHexError) -> Self {
        CoreError::ParseMalformed(format!("invalid hex literal: {}", err))
    }
}

impl From<std::net::AddrParseError> for CoreError {
    fn from(err: std::net::AddrParseError) -> Self {
        CoreError::ParseMalformed(format!("invalid IP literal: {}", err))
    }
}
