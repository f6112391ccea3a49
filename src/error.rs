//! Error kinds for the fuzzy vault core (spec §7).
//!
//! Only [`FuzzyVaultError::NoSolution`] is a legitimate, expected outcome of
//! a top-level call (a guess was too far from the original words). Every
//! other variant indicates the caller handed the core something it cannot
//! work with, or an internal invariant was violated.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FuzzyVaultError {
    /// JSON parse failure, missing/duplicate/unknown fields, wrong types.
    #[error("input shape: {0}")]
    InputShape(String),

    /// setSize/threshold/corpus invariants violated, non-distinct words,
    /// a word out of `[0, corpusSize)`, guess length mismatch, and so on.
    #[error("validation: {0}")]
    Validation(String),

    /// Prime not prime, prime above 32768, or division by zero in GF(p).
    #[error("field limit: {0}")]
    FieldLimit(String),

    /// Polynomial capacity (32 coefficients) exceeded.
    #[error("capacity exceeded: {0}")]
    Capacity(String),

    /// Fuzzy recovery cannot succeed. The only variant applications should
    /// treat as a normal, expected event.
    #[error("no solution")]
    NoSolution,
}

pub type Result<T> = std::result::Result<T, FuzzyVaultError>;

impl FuzzyVaultError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn input_shape(msg: impl Into<String>) -> Self {
        Self::InputShape(msg.into())
    }

    pub fn field_limit(msg: impl Into<String>) -> Self {
        Self::FieldLimit(msg.into())
    }

    pub fn capacity(msg: impl Into<String>) -> Self {
        Self::Capacity(msg.into())
    }
}
