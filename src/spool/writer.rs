//! Batch writer
//!
//! All appends go through one dedicated writer lane: a named thread draining
//! an unbounded FIFO channel. Callers never block, and the
//! list-select-append sequence of one event never interleaves with another.
//!
//! ```text
//! append(e) ──► channel ──► [spool-writer thread]
//!                             serialize ─► encode ─► select file ─► append block + separator
//! ```

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tokio::sync::{mpsc, oneshot};

use crate::diagnostics::{Severity, SharedSink};
use crate::error::{SpoolError, SpoolResult};
use crate::types::BatchFile;
use crate::utils::{SharedClock, SystemClock};

use super::codec;
use super::config::BatchConfig;
use super::selector::select_file;
use super::serializer::EventSerializer;
use super::SEPARATOR;

const THREAD_NAME: &str = "spool-writer";

enum Command<E> {
    Append(E),
    Flush(oneshot::Sender<()>),
}

/// Appends events to rotating batch files in one root directory
///
/// If the root directory cannot be used when the writer is created, the
/// failure is reported once and every later `append` is silently dropped.
pub struct BatchWriter<E: Send + 'static> {
    root_dir: PathBuf,
    sender: Option<mpsc::UnboundedSender<Command<E>>>,
    worker: Option<JoinHandle<()>>,
}

impl<E: Send + 'static> BatchWriter<E> {
    /// Create a writer using the system clock
    pub fn new<P: Into<PathBuf>>(
        root_dir: P,
        config: BatchConfig,
        serializer: Arc<dyn EventSerializer<E>>,
        diagnostics: SharedSink,
    ) -> Self {
        Self::with_clock(root_dir, config, serializer, SystemClock::shared(), diagnostics)
    }

    /// Create a writer with an explicit clock
    pub fn with_clock<P: Into<PathBuf>>(
        root_dir: P,
        config: BatchConfig,
        serializer: Arc<dyn EventSerializer<E>>,
        clock: SharedClock,
        diagnostics: SharedSink,
    ) -> Self {
        let root_dir = root_dir.into();

        if let Err(e) = ensure_writable(&root_dir) {
            diagnostics.record(
                Severity::Error,
                &format!(
                    "Can't write data on disk: directory {} is invalid.",
                    root_dir.display()
                ),
                Some(&e),
            );
            return Self::inert(root_dir);
        }

        let (sender, receiver) = mpsc::unbounded_channel();
        let lane = Lane {
            root_dir: root_dir.clone(),
            config,
            serializer,
            clock,
            diagnostics: diagnostics.clone(),
        };

        match thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || lane.run(receiver))
        {
            Ok(worker) => Self {
                root_dir,
                sender: Some(sender),
                worker: Some(worker),
            },
            Err(e) => {
                diagnostics.record(Severity::Error, "Unable to start the writer lane", Some(&e));
                Self::inert(root_dir)
            }
        }
    }

    fn inert(root_dir: PathBuf) -> Self {
        Self {
            root_dir,
            sender: None,
            worker: None,
        }
    }

    /// Root directory this writer appends into
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Whether the writer accepts events
    pub fn is_writable(&self) -> bool {
        self.sender.is_some()
    }

    /// Queue an event for writing
    pub fn append(&self, event: E) {
        if let Some(sender) = &self.sender {
            // Only fails once the lane is gone, which happens on drop
            let _ = sender.send(Command::Append(event));
        }
    }

    /// Wait until every event queued so far has been processed
    ///
    /// Must not be called from inside an async runtime; use [`flush`](Self::flush) there.
    pub fn flush_blocking(&self) {
        if let Some(done) = self.request_flush() {
            let _ = done.blocking_recv();
        }
    }

    /// Async version of [`flush_blocking`](Self::flush_blocking)
    pub async fn flush(&self) {
        if let Some(done) = self.request_flush() {
            let _ = done.await;
        }
    }

    fn request_flush(&self) -> Option<oneshot::Receiver<()>> {
        let sender = self.sender.as_ref()?;
        let (tx, rx) = oneshot::channel();
        sender.send(Command::Flush(tx)).ok()?;
        Some(rx)
    }
}

impl<E: Send + 'static> Drop for BatchWriter<E> {
    fn drop(&mut self) {
        // Closing the channel lets the lane drain what is queued and exit
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// Create the directory if absent; otherwise it must be a directory
fn ensure_writable(dir: &Path) -> SpoolResult<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
        return Ok(());
    }
    if dir.is_dir() {
        Ok(())
    } else {
        Err(SpoolError::InvalidRoot(dir.to_path_buf()))
    }
}

struct Lane<E> {
    root_dir: PathBuf,
    config: BatchConfig,
    serializer: Arc<dyn EventSerializer<E>>,
    clock: SharedClock,
    diagnostics: SharedSink,
}

impl<E> Lane<E> {
    fn run(self, mut receiver: mpsc::UnboundedReceiver<Command<E>>) {
        while let Some(command) = receiver.blocking_recv() {
            match command {
                Command::Append(event) => self.write_event(&event),
                Command::Flush(done) => {
                    let _ = done.send(());
                }
            }
        }
    }

    fn write_event(&self, event: &E) {
        let serialized = match self.serializer.serialize(event) {
            Ok(bytes) => bytes,
            Err(e) => {
                self.diagnostics.record(
                    Severity::Warn,
                    "Unable to serialize event, dropping it",
                    Some(&e),
                );
                return;
            }
        };

        let encoded = codec::encode(&serialized);
        if let Err(e) = self.append_block(&encoded) {
            self.diagnostics.record(
                Severity::Error,
                &format!("Unable to write event in {}", self.root_dir.display()),
                Some(&e),
            );
        }
    }

    /// Append one encoded payload and its separator to the selected file
    fn append_block(&self, encoded: &[u8]) -> io::Result<()> {
        // Re-list every time: the directory may have been wiped or moved
        let files = match BatchFile::list(&self.root_dir) {
            Ok(files) => files,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                std::fs::create_dir_all(&self.root_dir)?;
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        let selection = select_file(
            &self.root_dir,
            &files,
            encoded.len() as u64,
            self.clock.now_millis(),
            &self.config,
        );

        let mut block = Vec::with_capacity(encoded.len() + 1);
        block.extend_from_slice(encoded);
        block.push(SEPARATOR);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&selection.file().path)?;
        file.write_all(&block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{DiagnosticSink, RecordingSink};
    use crate::spool::reader::{read_batch, read_directory};
    use crate::utils::ManualClock;
    use std::fs;
    use tempfile::TempDir;

    /// Stores the bytes as-is
    struct RawSerializer;

    impl EventSerializer<Vec<u8>> for RawSerializer {
        fn serialize(&self, event: &Vec<u8>) -> SpoolResult<Vec<u8>> {
            Ok(event.clone())
        }
    }

    /// Rejects empty events
    struct PickySerializer;

    impl EventSerializer<Vec<u8>> for PickySerializer {
        fn serialize(&self, event: &Vec<u8>) -> SpoolResult<Vec<u8>> {
            if event.is_empty() {
                return Err(SpoolError::config("empty event"));
            }
            Ok(event.clone())
        }
    }

    fn writer(
        dir: &Path,
        config: BatchConfig,
        clock: Arc<ManualClock>,
        sink: Arc<RecordingSink>,
    ) -> BatchWriter<Vec<u8>> {
        BatchWriter::with_clock(dir, config, Arc::new(RawSerializer), clock, sink)
    }

    #[test]
    fn test_rotation_on_size() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("root");
        let clock = Arc::new(ManualClock::new(10_000));
        let sink = Arc::new(RecordingSink::new());
        let writer = writer(&root, BatchConfig::new(250, 60_000), clock, sink.clone());

        // 75 raw bytes encode to exactly 100 bytes
        for i in 0..3u8 {
            writer.append(vec![i; 75]);
        }
        writer.flush_blocking();

        let files = BatchFile::list(&root).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].created_at_millis, 10_000);
        assert_eq!(files[0].size_bytes, 202);
        assert_eq!(files[1].created_at_millis, 10_001);
        assert_eq!(files[1].size_bytes, 101);

        let first = read_batch(&files[0].path).unwrap();
        assert_eq!(first, vec![vec![0u8; 75], vec![1u8; 75]]);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_rotation_on_age() {
        let temp_dir = TempDir::new().unwrap();
        let clock = Arc::new(ManualClock::new(1_000));
        let sink = Arc::new(RecordingSink::new());
        let writer = writer(temp_dir.path(), BatchConfig::new(1_000, 500), clock.clone(), sink);

        writer.append(b"a".to_vec());
        writer.flush_blocking();
        clock.advance(499);
        writer.append(b"b".to_vec());
        writer.flush_blocking();
        clock.advance(1);
        writer.append(b"c".to_vec());
        writer.flush_blocking();

        let stamps: Vec<u64> = BatchFile::list(temp_dir.path())
            .unwrap()
            .iter()
            .map(|f| f.created_at_millis)
            .collect();
        assert_eq!(stamps, vec![1_000, 1_500]);
    }

    #[test]
    fn test_order_is_preserved() {
        let temp_dir = TempDir::new().unwrap();
        let clock = Arc::new(ManualClock::new(1));
        let sink = Arc::new(RecordingSink::new());
        let writer = writer(temp_dir.path(), BatchConfig::new(64, 60_000), clock, sink);

        let events: Vec<Vec<u8>> = (0..50u32).map(|i| i.to_be_bytes().to_vec()).collect();
        for event in &events {
            writer.append(event.clone());
        }
        writer.flush_blocking();

        let payloads: Vec<Vec<u8>> = read_directory(temp_dir.path())
            .unwrap()
            .into_iter()
            .flat_map(|(_, payloads)| payloads)
            .collect();
        assert_eq!(payloads, events);
    }

    #[test]
    fn test_unwritable_root_is_reported_once() {
        let temp_dir = TempDir::new().unwrap();
        let not_a_dir = temp_dir.path().join("file");
        fs::write(&not_a_dir, "occupied").unwrap();

        let sink = Arc::new(RecordingSink::new());
        let writer = writer(&not_a_dir, BatchConfig::default(), Arc::new(ManualClock::new(0)), sink.clone());

        assert!(!writer.is_writable());
        writer.append(b"dropped".to_vec());
        writer.append(b"dropped too".to_vec());
        writer.flush_blocking();

        assert_eq!(sink.records().len(), 1);
        assert!(sink.contains("is invalid"));
        assert_eq!(fs::read_to_string(&not_a_dir).unwrap(), "occupied");
    }

    #[test]
    fn test_serialization_failure_drops_only_that_event() {
        let temp_dir = TempDir::new().unwrap();
        let sink = Arc::new(RecordingSink::new());
        let shared: SharedSink = sink.clone();
        let writer: BatchWriter<Vec<u8>> = BatchWriter::with_clock(
            temp_dir.path(),
            BatchConfig::default(),
            Arc::new(PickySerializer),
            Arc::new(ManualClock::new(5)),
            shared,
        );

        writer.append(Vec::new());
        writer.append(b"kept".to_vec());
        writer.flush_blocking();

        let batches = read_directory(temp_dir.path()).unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].1, vec![b"kept".to_vec()]);
        assert_eq!(sink.with_severity(crate::diagnostics::Severity::Warn).len(), 1);
    }

    #[test]
    fn test_recreates_removed_root() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("root");
        let sink = Arc::new(RecordingSink::new());
        let writer = writer(&root, BatchConfig::default(), Arc::new(ManualClock::new(7)), sink.clone());

        fs::remove_dir_all(&root).unwrap();
        writer.append(b"after removal".to_vec());
        writer.flush_blocking();

        assert_eq!(BatchFile::list(&root).unwrap().len(), 1);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_drop_drains_queue() {
        let temp_dir = TempDir::new().unwrap();
        {
            let writer = writer(
                temp_dir.path(),
                BatchConfig::default(),
                Arc::new(ManualClock::new(3)),
                Arc::new(RecordingSink::new()),
            );
            for _ in 0..10 {
                writer.append(b"x".to_vec());
            }
        }

        let batches = read_directory(temp_dir.path()).unwrap();
        assert_eq!(batches[0].1.len(), 10);
    }

    #[test]
    fn test_sink_trait_object_is_shared() {
        let sink: Arc<dyn DiagnosticSink> = Arc::new(RecordingSink::new());
        let temp_dir = TempDir::new().unwrap();
        let writer: BatchWriter<Vec<u8>> =
            BatchWriter::new(temp_dir.path(), BatchConfig::default(), Arc::new(RawSerializer), sink);
        assert!(writer.is_writable());
        assert_eq!(writer.root_dir(), temp_dir.path());
    }
}
