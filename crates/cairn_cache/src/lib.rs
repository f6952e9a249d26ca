//! Recompilation cache for the Cairn build orchestrator.
//!
//! Decides, per source file and per compiler invocation, whether a unit must
//! be recompiled, and persists those decisions between invocations as a
//! JSON table in the project's cache directory.

#![warn(missing_docs)]

pub mod cache;
pub mod error;
pub mod hasher;
pub mod table;

pub use cache::RecompilationCache;
pub use error::CacheError;
pub use hasher::{InvocationSignature, SourceHasher};
pub use table::{CacheEntry, CacheTable, TABLE_FILE};
