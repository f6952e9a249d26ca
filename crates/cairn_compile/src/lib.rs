//! Multi-toolchain compilation orchestrator.
//!
//! Discovers Cairo sources and Scarb packages, drives the matching compiler
//! pipeline for each unit, and normalizes every pipeline's outputs into one
//! canonical artifact layout. Skip decisions come from the
//! [`cairn_cache::RecompilationCache`] owned by the [`BuildSession`].

#![warn(missing_docs)]

pub mod error;
pub mod invoker;
pub mod layout;
pub mod manifest;
pub mod options;
pub mod pipeline;
pub mod report;
pub mod session;
pub mod traverse;

pub use error::CompileError;
pub use invoker::{CompilerInvoker, InvocationSpec, OutputRewriter, ProcessInvoker, ProcessResult};
pub use layout::ArtifactPathMapper;
pub use options::{CompileOptions, LegacyOptions, ScarbOptions, SierraOptions};
pub use session::{BuildSession, BuildSummary, SourceBatch, UnitOutcome};
pub use traverse::traverse;
