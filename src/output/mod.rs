//! Output sinks for rendered records.
//!
//! # Design Decisions
//! - Append-only, no read-back
//! - One lock per record so concurrent flows never interleave mid-record
//! - Write failures are logged, never propagated to the flow that produced them

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Destination for rendered records.
pub trait OutputSink: Send + Sync {
    /// Append a record. The sink adds the trailing record separator.
    fn append(&self, record: &str);
}

/// Sink writing to any `Write` implementation.
pub struct WriterSink {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl WriterSink {
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// Open `path` for appending, creating it if needed.
    pub fn append_to_file(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(file))
    }
}

impl OutputSink for WriterSink {
    fn append(&self, record: &str) {
        let mut writer = lock(&self.writer);
        if let Err(e) = write_record(&mut **writer, record) {
            tracing::warn!(error = %e, "Failed to write record to output");
        }
    }
}

fn write_record(writer: &mut dyn Write, record: &str) -> io::Result<()> {
    writer.write_all(record.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()
}

/// Sink keeping records in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the records appended so far.
    pub fn records(&self) -> Vec<String> {
        lock(&self.records).clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.records).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.records).is_empty()
    }
}

impl OutputSink for MemorySink {
    fn append(&self, record: &str) {
        lock(&self.records).push(record.to_string());
    }
}

// A panic while holding the lock leaves at worst a partial record behind.
fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
