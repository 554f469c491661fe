//! Consent-driven data migration
//!
//! When consent changes, already buffered data is wiped, moved or left in
//! place depending on the transition:
//!
//! ```text
//! on_consent_changed(prev, next)
//!        │
//!        ▼
//! ┌────────────────┐    ┌──────────────────┐    ┌──────────────────────┐
//! │ planner: table │───►│ Wipe / Move / No │───►│ executor: bounded    │
//! │ lookup         │    │ operation        │    │ pool, reject if full │
//! └────────────────┘    └──────────────────┘    └──────────────────────┘
//! ```
//!
//! Migrations and the writer lane are not mutually excluded: an append that
//! races a wipe of the same directory may be lost, and one that races a move
//! may land in the source after it was emptied. Consent changes should be
//! triggered only where that is acceptable.

mod executor;
mod migrator;
mod operation;
mod planner;

pub use executor::{MigrationExecutor, ERROR_REJECTED};
pub use migrator::ConsentMigrator;
pub use operation::{MigrationOperation, MigrationReport};
pub use planner::{MigrationAction, MigrationPlanner, Transition, TRANSITIONS};
