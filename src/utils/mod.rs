//! Utility functions and helpers
//!
//! This module contains the clock abstraction and filesystem helpers.

pub mod fs;
pub mod time;

pub use time::{current_millis, Clock, ManualClock, SharedClock, SystemClock};
