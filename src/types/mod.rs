//! Data types for the telemetry spool
//!
//! This module contains the core data structures used throughout the crate.

mod batch_file;
mod consent;
mod log_event;

pub use batch_file::BatchFile;
pub use consent::Consent;
pub use log_event::{ErrorInfo, LogEvent, LogLevel, NetworkInfo};
