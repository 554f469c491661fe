//! Consent-aware storage
//!
//! - `RootDirectoryProvider`: which directory holds data for a consent state
//! - `ConsentAwareStore`: one writer per collecting state plus migrations

mod directories;
mod store;

pub use directories::{FeatureDirectories, RootDirectoryProvider};
pub use store::ConsentAwareStore;
