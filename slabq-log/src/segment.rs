//! Segment naming and directory scanning.
//!
//! A segment file holds a contiguous byte range of a topic; its filename is
//! the 20-digit zero-padded decimal base address of its first byte, so
//! lexicographic order equals numeric order. The same codec is used
//! everywhere a segment is created or recognized, and the fixed width is
//! enforced on parse.

use crate::error::LogError;
use std::path::{Path, PathBuf};

/// Segment file extension.
pub const SLAB_EXTENSION: &str = "slab";

const BASE_WIDTH: usize = 20;

/// Segment file name for a base address, e.g. `00000000000000000000.slab`.
pub fn segment_filename(base: u64) -> String {
    format!("{:020}.{}", base, SLAB_EXTENSION)
}

/// Full path of the segment with the given base address.
pub fn segment_path(topic: &Path, base: u64) -> PathBuf {
    topic.join(segment_filename(base))
}

/// Parses a base address from a segment file name. Any name whose stem is
/// not exactly 20 decimal digits is not a segment.
pub fn parse_segment_filename(name: &str) -> Option<u64> {
    let stem = name.strip_suffix(".slab")?;
    if stem.len() != BASE_WIDTH || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    stem.parse().ok()
}

/// Lists the segment base addresses of a topic, sorted ascending.
///
/// Sorting is explicit and numeric; filesystem listing order is never
/// relied on. A missing topic directory yields an empty list, not an
/// error, so callers can distinguish "no segments" from I/O failure.
pub fn list_segments(topic: &Path) -> Result<Vec<u64>, LogError> {
    let entries = match std::fs::read_dir(topic) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut bases = Vec::new();
    for entry in entries {
        let entry = entry?;
        if let Some(base) = parse_segment_filename(&entry.file_name().to_string_lossy()) {
            bases.push(base);
        }
    }

    bases.sort_unstable();
    Ok(bases)
}

/// Finds the base of the segment containing `address`: the greatest base
/// not exceeding it. `bases` must be sorted ascending.
pub fn locate(bases: &[u64], address: u64) -> Option<u64> {
    match bases.binary_search(&address) {
        Ok(i) => Some(bases[i]),
        Err(0) => None,
        Err(i) => Some(bases[i - 1]),
    }
}
