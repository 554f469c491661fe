//! Rotating batch spool
//!
//! This module provides the write path of the spool:
//! - `codec`: reversible obfuscation of serialized payloads
//! - `selector`: which batch file the next payload goes to
//! - `BatchWriter`: single-lane ordered appends into a root directory
//! - `reader`: decoding batch files back for upload
//!
//! # On-disk format
//!
//! ```text
//! <root>/1571234567890   encode(p1) \n encode(p2) \n ...
//! <root>/1571234572950   encode(p3) \n ...
//! ```
//!
//! File names are creation timestamps in milliseconds; parsing them as
//! integers gives chronological order.

pub mod codec;
mod config;
pub mod reader;
mod selector;
mod serializer;
mod writer;

pub use config::{
    BatchConfig, SpoolConfig, DEFAULT_MAX_BATCH_SIZE, DEFAULT_MAX_FILE_AGE_MS,
    DEFAULT_MIGRATION_WORKERS,
};
pub use reader::{directory_stats, read_batch, read_directory, DirectoryStats};
pub use selector::{select_file, Selection};
pub use serializer::{EventSerializer, JsonSerializer, LogEventSerializer};
pub use writer::BatchWriter;

/// Byte written after every encoded payload
pub const SEPARATOR: u8 = b'\n';
