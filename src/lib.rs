//! Telemetry Spool
//!
//! A local, append-only, rotating store that buffers telemetry events on a
//! device until they are uploaded, plus a consent-driven lifecycle manager
//! deciding what happens to buffered data when tracking consent changes.
//!
//! # Features
//!
//! - **Ordered writes**: one writer lane per root directory, FIFO, never blocks callers
//! - **Rotation**: batch files are capped by size and age
//! - **Obfuscation**: payloads are base64-encoded, one block per line
//! - **Consent migrations**: wipe, move or keep buffered data on every consent change
//! - **Bounded background work**: migrations run on a bounded pool that rejects when full
//!
//! # Modules
//!
//! - `types`: Core data structures (Consent, BatchFile, LogEvent)
//! - `spool`: Codec, file selection, batch writer and reader
//! - `migration`: Transition table, operations and the executor
//! - `consent`: Root directory naming and the consent-aware store
//! - `diagnostics`: Injected diagnostic sinks
//! - `utils`: Clock and filesystem helpers
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use telemetry_spool::consent::ConsentAwareStore;
//! use telemetry_spool::diagnostics::TracingSink;
//! use telemetry_spool::spool::{LogEventSerializer, SpoolConfig};
//! use telemetry_spool::types::{Consent, LogEvent, LogLevel};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = SpoolConfig::new("/tmp/spool");
//!     let store = ConsentAwareStore::<LogEvent>::new(
//!         &config,
//!         Consent::Pending,
//!         Arc::new(LogEventSerializer::new()),
//!         tokio::runtime::Handle::current(),
//!         TracingSink::shared(),
//!     );
//!     store.wait_for_migrations().await;
//!
//!     store.append(LogEvent::new(LogLevel::Info, "app started", "demo"));
//!     store.set_consent(Consent::Granted);
//!     store.flush().await;
//!     store.wait_for_migrations().await;
//! }
//! ```

pub mod consent;
pub mod diagnostics;
pub mod error;
pub mod migration;
pub mod spool;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use consent::{ConsentAwareStore, FeatureDirectories, RootDirectoryProvider};
pub use diagnostics::{DiagnosticSink, RecordingSink, Severity, SharedSink, TracingSink};
pub use error::{SpoolError, SpoolResult};
pub use migration::{ConsentMigrator, MigrationExecutor, MigrationOperation, MigrationPlanner};
pub use spool::{BatchConfig, BatchWriter, EventSerializer, SpoolConfig};
pub use types::{BatchFile, Consent, LogEvent, LogLevel};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
