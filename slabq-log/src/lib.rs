//! # slabq-log
//!
//! A local, disk-backed, append-only log. A topic is a directory of
//! sequential segment ("slab") files forming one logical byte stream,
//! written by exactly one [`Writer`] and read by any number of independent
//! [`Reader`]s addressed by absolute byte offset.
//!
//! This crate provides:
//! - Length-prefixed, checksummed record framing
//! - Segment file lifecycle with size-based rollover
//! - Absolute-address-to-segment translation for readers
//! - Offline integrity verification and repair
//!
//! There is no file locking across processes: running two writers against
//! the same topic is undefined and must be prevented by the caller.

pub mod error;
pub mod frame;
pub mod reader;
pub mod recovery;
pub mod segment;
pub mod writer;

pub use error::{LogError, ReadOutcome, SeekOutcome};
pub use reader::Reader;
pub use recovery::{repair_topic, verify_topic, ScanReport};
pub use segment::{parse_segment_filename, segment_filename};
pub use writer::{TopicStatus, Writer};

/// Default segment rollover size hint (64 MiB).
pub const DEFAULT_SLAB_SIZE: u64 = 64 * 1024 * 1024;

/// Frame header size in bytes (length + checksum).
pub const FRAME_HEADER_SIZE: usize = 8;

/// Maximum record payload size (16 MiB).
pub const MAX_PAYLOAD_SIZE: usize = 16 * 1024 * 1024;
