//! Log reader.
//!
//! A reader is an independent sequential cursor over a topic, addressed by
//! absolute byte offset. Readers never coordinate with the writer or with
//! each other; each holds its own file handle. Crossing from one segment
//! into the next is transparent: on hitting end-of-file mid-record the
//! reader re-resolves the owning segment for its current address, which
//! also picks up a writer rollover that happened at that address.

use crate::error::{LogError, ReadOutcome, SeekOutcome};
use crate::frame::{self, FrameHeader};
use crate::segment;
use crate::FRAME_HEADER_SIZE;
use bytes::Bytes;
use std::fs::File;
use std::io::{BufReader, Read as _, Seek as _, SeekFrom};
use std::path::{Path, PathBuf};

/// Result of one frame read attempt; `Incomplete` means end-of-file was hit
/// before the whole frame was available.
enum FrameRead {
    Complete(ReadOutcome),
    Incomplete,
}

/// Sequential reader over a topic's framed records.
pub struct Reader {
    topic: PathBuf,
    /// Base address of the segment currently open for reading.
    base: u64,
    /// `None` when closed (or between seeks).
    file: Option<BufReader<File>>,
}

impl Reader {
    /// Opens a reader positioned at `address`.
    ///
    /// The second tuple element reports whether the address is readable now
    /// or exactly at the write frontier ([`SeekOutcome::EndOfLog`]); in the
    /// latter case the reader is still valid and can be polled.
    pub fn open(topic: impl AsRef<Path>, address: u64) -> Result<(Self, SeekOutcome), LogError> {
        let mut reader = Self {
            topic: topic.as_ref().to_path_buf(),
            base: 0,
            file: None,
        };
        let outcome = reader.seek(address)?;
        Ok((reader, outcome))
    }

    /// Positions the cursor at an absolute address, re-resolving which
    /// segment owns it.
    ///
    /// Fails with [`LogError::InvalidTopic`] when the topic has no segments
    /// and [`LogError::OutOfBounds`] when the address lies beyond all
    /// written data. An address exactly at the write frontier succeeds with
    /// [`SeekOutcome::EndOfLog`].
    pub fn seek(&mut self, address: u64) -> Result<SeekOutcome, LogError> {
        self.file = None;

        let bases = segment::list_segments(&self.topic)?;
        if bases.is_empty() {
            return Err(LogError::InvalidTopic {
                topic: self.topic.display().to_string(),
            });
        }

        let base = segment::locate(&bases, address).ok_or(LogError::OutOfBounds { address })?;
        let file = File::open(segment::segment_path(&self.topic, base))?;
        let len = file.metadata()?.len();

        let offset = address - base;
        if offset > len {
            return Err(LogError::OutOfBounds { address });
        }

        let mut file = BufReader::new(file);
        file.seek(SeekFrom::Start(offset))?;
        self.base = base;
        self.file = Some(file);

        if offset == len {
            Ok(SeekOutcome::EndOfLog)
        } else {
            Ok(SeekOutcome::Positioned)
        }
    }

    /// Absolute address of the next byte this reader would consume.
    pub fn address(&mut self) -> Result<u64, LogError> {
        let file = self.file.as_mut().ok_or(LogError::Closed)?;
        Ok(self.base + file.stream_position()?)
    }

    /// Reads the next record.
    ///
    /// Returns [`ReadOutcome::EndOfLog`] when the cursor has caught up with
    /// the writer, leaving the cursor at the record start so the caller can
    /// poll the same address again. A record whose tail has not been
    /// flushed yet also reads as end-of-log, never as a hard error.
    ///
    /// A checksum mismatch returns [`LogError::ChecksumMismatch`] carrying
    /// the corrupted payload, so the caller can decide whether to salvage
    /// it; the cursor is left past the record.
    pub fn read(&mut self) -> Result<ReadOutcome, LogError> {
        let start = self.address()?;
        let mut resought = false;

        loop {
            match self.read_frame(start)? {
                FrameRead::Complete(outcome) => return Ok(outcome),
                FrameRead::Incomplete => {
                    // The writer may have rolled to a new segment starting
                    // at this address, or appended more bytes since we
                    // opened the file. Re-resolve and retry once.
                    match self.seek(start)? {
                        SeekOutcome::EndOfLog => return Ok(ReadOutcome::EndOfLog),
                        SeekOutcome::Positioned if !resought => resought = true,
                        SeekOutcome::Positioned => {
                            // Bytes exist but still no complete frame: the
                            // record's tail has not been flushed. The seek
                            // above already restored the record start.
                            return Ok(ReadOutcome::EndOfLog);
                        }
                    }
                }
            }
        }
    }

    /// Attempts to read one whole frame at the current position.
    fn read_frame(&mut self, start: u64) -> Result<FrameRead, LogError> {
        let file = self.file.as_mut().ok_or(LogError::Closed)?;

        let mut header = [0u8; FRAME_HEADER_SIZE];
        match file.read_exact(&mut header) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Ok(FrameRead::Incomplete)
            }
            Err(e) => return Err(e.into()),
        }
        let header = FrameHeader::decode(header)?;

        let mut payload = vec![0u8; header.length as usize];
        match file.read_exact(&mut payload) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Ok(FrameRead::Incomplete)
            }
            Err(e) => return Err(e.into()),
        }

        let payload = Bytes::from(payload);
        let actual = frame::checksum(&payload);
        if actual != header.checksum {
            return Err(LogError::ChecksumMismatch {
                address: start,
                expected: header.checksum,
                actual,
                payload,
            });
        }

        Ok(FrameRead::Complete(ReadOutcome::Record {
            address: start,
            payload,
        }))
    }

    /// Releases the open segment file. Subsequent reads fail with
    /// [`LogError::Closed`].
    pub fn close(&mut self) -> Result<(), LogError> {
        self.file = None;
        Ok(())
    }

    pub fn topic(&self) -> &Path {
        &self.topic
    }
}
