//! A fuzzy vault key-recovery scheme (spec §1).
//!
//! A user commits to a secret composed of an unordered set of distinct
//! small integers ("words") drawn from a bounded corpus. Later, supplying
//! a *similar* set — one that matches at least a configured threshold of
//! the original words — deterministically reproduces a list of
//! cryptographic keys. The commitment artifact (the [`envelope::Secret`])
//! is public-safe: it does not reveal the original words.
//!
//! The three public entry points are [`gen_params`], [`gen_secret`], and
//! [`gen_keys`] — all JSON in, JSON out, matching the wire shapes in
//! `SPEC_FULL.md` §6.2.
//!
//! This crate is synchronous and single-threaded within one top-level
//! call; there are no suspension points and no shared mutable state
//! between calls (the field context in [`field::Field`] is owned per
//! call, not ambient-global, per `SPEC_FULL.md`'s "explicit field-context"
//! redesign).

pub mod decoder;
pub mod envelope;
pub mod error;
pub mod field;
pub mod matrix;
pub mod poly;
pub mod protocol;
pub mod services;

pub use envelope::{Input, Params, Secret};
pub use error::{FuzzyVaultError, Result};
pub use protocol::{gen_keys, gen_params, gen_secret, MAX_SET_SIZE};
