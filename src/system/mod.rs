//! Operating system collaborators.
//!
//! Currently only process enumeration, behind the [`ProcessSource`] trait
//! so the server can be driven by a fixed snapshot in tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use healthcheck_api::system::{ProcessSource, SystemProcesses};
//!
//! let facts = SystemProcesses.snapshot();
//! println!("{} processes visible", facts.len());
//! ```

mod processes;

pub use processes::{FixedProcesses, ProcessSource, SystemProcesses};
