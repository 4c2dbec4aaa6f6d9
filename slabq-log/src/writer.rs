//! Log writer.
//!
//! The writer owns the tail of a topic: the currently open segment, the
//! next-write absolute address, and the rollover policy. All mutation goes
//! through a single lock so that header, payload, and address advance for
//! one record are atomic relative to other threads of the owning process.
//! One writer process per topic is assumed; there is no cross-process lock.

use crate::error::LogError;
use crate::frame;
use crate::segment;
use parking_lot::Mutex;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write as _};
use std::path::{Path, PathBuf};

/// Read-only snapshot of a topic from the writer's point of view.
#[derive(Debug, Clone, Serialize)]
pub struct TopicStatus {
    pub topic: PathBuf,
    /// End of the log: the absolute address of the next write.
    pub address: u64,
    pub segments: usize,
    pub total_size: u64,
    pub current_segment: String,
    pub current_segment_size: u64,
}

struct Tail {
    base: u64,
    address: u64,
    out: BufWriter<File>,
}

/// Appends framed records to a topic, rolling segments as they grow.
pub struct Writer {
    topic: PathBuf,
    slab_size_hint: u64,
    /// `None` means closed. Every operation on a closed writer fails with
    /// [`LogError::Closed`].
    tail: Mutex<Option<Tail>>,
}

impl Writer {
    /// Opens a topic for appending, creating the directory and an empty
    /// segment at base address 0 when no segments exist.
    ///
    /// When segments exist, writing resumes at the end of the highest-base
    /// segment; the file's size is taken as ground truth for where the log
    /// ends. The resident bytes are not re-parsed here; see
    /// [`crate::recovery::verify_topic`] for an integrity pass.
    pub fn open(topic: impl AsRef<Path>, slab_size_hint: u64) -> Result<Self, LogError> {
        let topic = topic.as_ref().to_path_buf();
        let bases = segment::list_segments(&topic)?;

        let tail = match bases.last() {
            None => {
                std::fs::create_dir_all(&topic)?;
                let file = OpenOptions::new()
                    .create_new(true)
                    .append(true)
                    .open(segment::segment_path(&topic, 0))?;
                tracing::debug!(topic = %topic.display(), "created topic");
                Tail {
                    base: 0,
                    address: 0,
                    out: BufWriter::new(file),
                }
            }
            Some(&base) => {
                let path = segment::segment_path(&topic, base);
                let file = OpenOptions::new().append(true).open(&path)?;
                let len = file.metadata()?.len();
                tracing::info!(
                    topic = %topic.display(),
                    segments = bases.len(),
                    end = base + len,
                    "resuming at end of existing log"
                );
                Tail {
                    base,
                    address: base + len,
                    out: BufWriter::new(file),
                }
            }
        };

        Ok(Self {
            topic,
            slab_size_hint,
            tail: Mutex::new(Some(tail)),
        })
    }

    /// Appends one record and returns the absolute address its header began
    /// at. The address does not advance unless the whole frame was accepted.
    pub fn write(&self, payload: &[u8]) -> Result<u64, LogError> {
        let encoded = frame::encode(payload)?;

        let mut guard = self.tail.lock();
        let tail = guard.as_mut().ok_or(LogError::Closed)?;

        tail.out.write_all(&encoded)?;
        let record_address = tail.address;
        tail.address += encoded.len() as u64;

        // Soft threshold: checked only after appending, so a segment may
        // exceed the hint by up to one record.
        if tail.address - tail.base > self.slab_size_hint {
            self.roll(tail)?;
        }

        Ok(record_address)
    }

    /// Closes the current segment and starts a new one whose base address
    /// is exactly the current end of log, keeping segments contiguous.
    fn roll(&self, tail: &mut Tail) -> Result<(), LogError> {
        tail.out.flush()?;

        let file = OpenOptions::new()
            .create_new(true)
            .append(true)
            .open(segment::segment_path(&self.topic, tail.address))?;
        tracing::debug!(base = tail.address, "rolled to new segment");

        tail.base = tail.address;
        tail.out = BufWriter::new(file);
        Ok(())
    }

    /// Pushes buffered bytes to the segment file.
    ///
    /// This does not fsync: durability against power loss requires
    /// [`Writer::sync`].
    pub fn flush(&self) -> Result<(), LogError> {
        let mut guard = self.tail.lock();
        let tail = guard.as_mut().ok_or(LogError::Closed)?;
        tail.out.flush()?;
        Ok(())
    }

    /// Flushes and fsyncs the current segment to stable storage.
    pub fn sync(&self) -> Result<(), LogError> {
        let mut guard = self.tail.lock();
        let tail = guard.as_mut().ok_or(LogError::Closed)?;
        tail.out.flush()?;
        tail.out.get_ref().sync_data()?;
        Ok(())
    }

    /// Flushes and releases the open segment. Closing twice is a no-op;
    /// subsequent writes fail with [`LogError::Closed`].
    pub fn close(&self) -> Result<(), LogError> {
        let mut guard = self.tail.lock();
        if let Some(mut tail) = guard.take() {
            tail.out.flush()?;
        }
        Ok(())
    }

    /// Current end of the log: the absolute address of the next write.
    pub fn address(&self) -> Result<u64, LogError> {
        let guard = self.tail.lock();
        let tail = guard.as_ref().ok_or(LogError::Closed)?;
        Ok(tail.address)
    }

    /// Side-effect-free introspection snapshot.
    pub fn status(&self) -> Result<TopicStatus, LogError> {
        let guard = self.tail.lock();
        let tail = guard.as_ref().ok_or(LogError::Closed)?;
        let bases = segment::list_segments(&self.topic)?;

        Ok(TopicStatus {
            topic: self.topic.clone(),
            address: tail.address,
            segments: bases.len(),
            total_size: tail.address,
            current_segment: segment::segment_filename(tail.base),
            current_segment_size: tail.address - tail.base,
        })
    }

    pub fn topic(&self) -> &Path {
        &self.topic
    }
}
