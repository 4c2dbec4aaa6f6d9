//! Log error and outcome types.
//!
//! "End of log" is deliberately not an error: it is modeled as a variant of
//! [`SeekOutcome`] and [`ReadOutcome`] so a polling read loop cannot mistake
//! "no data yet" for a failure.

use bytes::Bytes;
use thiserror::Error;

/// Errors surfaced by writers, readers, and the recovery scanner.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no segments found for topic {topic}")]
    InvalidTopic { topic: String },

    #[error("address {address} lies beyond all written data")]
    OutOfBounds { address: u64 },

    #[error(
        "checksum mismatch at address {address}: expected {expected:#010x}, got {actual:#010x}"
    )]
    ChecksumMismatch {
        address: u64,
        expected: u32,
        actual: u32,
        /// The corrupted payload, returned so the caller can decide whether
        /// to salvage or discard it.
        payload: Bytes,
    },

    #[error("record too large: {size} bytes (max {max})")]
    RecordTooLarge { size: usize, max: usize },

    #[error("log is closed")]
    Closed,
}

/// Outcome of positioning a reader at an absolute address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekOutcome {
    /// The cursor points at readable data.
    Positioned,
    /// The address equals the current write frontier; no data available yet.
    /// The position is valid and the caller may retry later.
    EndOfLog,
}

impl SeekOutcome {
    pub fn is_end_of_log(&self) -> bool {
        matches!(self, SeekOutcome::EndOfLog)
    }
}

/// Outcome of a sequential read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// One decoded record and the absolute address its header began at.
    Record { address: u64, payload: Bytes },
    /// Caught up with the writer; the cursor is left at the same record
    /// start so the caller can poll the same position again.
    EndOfLog,
}

impl ReadOutcome {
    pub fn is_end_of_log(&self) -> bool {
        matches!(self, ReadOutcome::EndOfLog)
    }

    /// Returns the payload, or `None` at end of log.
    pub fn into_payload(self) -> Option<Bytes> {
        match self {
            ReadOutcome::Record { payload, .. } => Some(payload),
            ReadOutcome::EndOfLog => None,
        }
    }
}
