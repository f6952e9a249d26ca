//! Shared foundational types used across the Cairn build orchestrator.
//!
//! This crate provides content hashing for fingerprints and invocation
//! signatures, the dialect tag that selects a compilation pipeline, and the
//! artifact kinds of the canonical output layout.

#![warn(missing_docs)]

pub mod artifact;
pub mod hash;

pub use artifact::{ArtifactKind, ArtifactSet, Dialect};
pub use hash::{ContentHash, ParseHashError};
