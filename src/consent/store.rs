//! Consent-aware spool
//!
//! Routes each event to the writer of the current consent state and turns
//! every consent change into a migration. Events are dropped while consent
//! is NOT_GRANTED.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::runtime::Handle;

use crate::diagnostics::{Severity, SharedSink};
use crate::migration::{ConsentMigrator, MigrationExecutor};
use crate::spool::{BatchConfig, BatchWriter, EventSerializer, SpoolConfig};
use crate::types::Consent;
use crate::utils::{SharedClock, SystemClock};

use super::directories::{FeatureDirectories, RootDirectoryProvider};

/// A spool that follows the user's tracking consent
pub struct ConsentAwareStore<E: Send + 'static> {
    consent: RwLock<Consent>,
    directories: Arc<dyn RootDirectoryProvider>,
    pending: BatchWriter<E>,
    granted: BatchWriter<E>,
    migrator: ConsentMigrator,
    diagnostics: SharedSink,
}

impl<E: Send + 'static> ConsentAwareStore<E> {
    /// Create a store from configuration, on the given runtime
    pub fn new(
        config: &SpoolConfig,
        initial: Consent,
        serializer: Arc<dyn EventSerializer<E>>,
        handle: Handle,
        diagnostics: SharedSink,
    ) -> Self {
        let directories = Arc::new(FeatureDirectories::new(&config.data_dir, config.feature.clone()));
        let executor = MigrationExecutor::new(handle, config.migration_workers, diagnostics.clone());

        Self::with_parts(
            directories,
            config.batch,
            initial,
            serializer,
            SystemClock::shared(),
            executor,
            diagnostics,
        )
    }

    /// Create a store from explicit collaborators
    ///
    /// Startup counts as a consent change with no previous state, which wipes
    /// pending data left by an earlier session. Await
    /// [`wait_for_migrations`](Self::wait_for_migrations) before the first
    /// append so new events do not race that wipe.
    pub fn with_parts(
        directories: Arc<dyn RootDirectoryProvider>,
        batch: BatchConfig,
        initial: Consent,
        serializer: Arc<dyn EventSerializer<E>>,
        clock: SharedClock,
        executor: MigrationExecutor,
        diagnostics: SharedSink,
    ) -> Self {
        let pending = BatchWriter::with_clock(
            directories.root_dir(Consent::Pending),
            batch,
            serializer.clone(),
            clock.clone(),
            diagnostics.clone(),
        );
        let granted = BatchWriter::with_clock(
            directories.root_dir(Consent::Granted),
            batch,
            serializer,
            clock,
            diagnostics.clone(),
        );
        let migrator = ConsentMigrator::new(directories.clone(), executor, diagnostics.clone());

        migrator.on_consent_changed(None, initial);

        Self {
            consent: RwLock::new(initial),
            directories,
            pending,
            granted,
            migrator,
            diagnostics,
        }
    }

    /// Current consent state
    pub fn consent(&self) -> Consent {
        *self.consent.read()
    }

    /// Root directory used for a consent state
    pub fn root_dir(&self, consent: Consent) -> PathBuf {
        self.directories.root_dir(consent)
    }

    /// Queue an event under the current consent
    pub fn append(&self, event: E) {
        match *self.consent.read() {
            Consent::Pending => self.pending.append(event),
            Consent::Granted => self.granted.append(event),
            Consent::NotGranted => {}
        }
    }

    /// Switch to `next` and schedule the matching migration
    pub fn set_consent(&self, next: Consent) {
        // Held while scheduling so migrations are submitted in change order
        let mut consent = self.consent.write();
        let previous = std::mem::replace(&mut *consent, next);
        self.diagnostics.record(
            Severity::Info,
            &format!("Tracking consent updated from {} to {}", previous, next),
            None,
        );
        self.migrator.on_consent_changed(Some(previous), next);
    }

    /// Wait until both writer lanes are drained
    ///
    /// Must not be called from inside an async runtime.
    pub fn flush_blocking(&self) {
        self.pending.flush_blocking();
        self.granted.flush_blocking();
    }

    /// Async version of [`flush_blocking`](Self::flush_blocking)
    pub async fn flush(&self) {
        self.pending.flush().await;
        self.granted.flush().await;
    }

    /// Wait until no migration is running
    pub async fn wait_for_migrations(&self) {
        self.migrator.executor().wait_idle().await;
    }

    /// Stop accepting new migrations
    pub fn shutdown(&self) {
        self.migrator.executor().shutdown();
    }
}
