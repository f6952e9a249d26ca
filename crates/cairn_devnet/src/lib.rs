//! Supervision of the integrated StarkNet devnet.
//!
//! Test and run actions against `integrated-devnet` start a local devnet
//! process, wait until it answers, run the action, and always stop the
//! process again, whether the action succeeds, fails, or panics.

#![warn(missing_docs)]

pub mod error;
pub mod probe;
pub mod process;
pub mod settings;
pub mod supervisor;

pub use error::DevnetError;
pub use probe::{HttpProbe, ReadinessProbe};
pub use process::DevnetProcess;
pub use settings::{DevnetSettings, Launch};
pub use supervisor::{guard, Supervisor, SupervisorState};
