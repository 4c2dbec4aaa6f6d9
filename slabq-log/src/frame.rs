//! Record framing.
//!
//! Each record on disk is:
//!
//! ```text
//! +----------------+------------------+------------------+
//! | length         | checksum         | payload          |
//! | 4 bytes, LE    | 4 bytes, LE      | length bytes     |
//! +----------------+------------------+------------------+
//! ```
//!
//! Records are written back-to-back with no padding and never span segment
//! files. The checksum covers the payload only.

use crate::error::LogError;
use crate::{FRAME_HEADER_SIZE, MAX_PAYLOAD_SIZE};
use bytes::{BufMut, BytesMut};

/// Computes the 32-bit payload checksum.
pub fn checksum(payload: &[u8]) -> u32 {
    crc32c::crc32c(payload)
}

/// Total on-disk size of a record framing the given payload length.
pub fn framed_len(payload_len: usize) -> u64 {
    (FRAME_HEADER_SIZE + payload_len) as u64
}

/// Encodes a payload into a framed record.
pub fn encode(payload: &[u8]) -> Result<BytesMut, LogError> {
    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(LogError::RecordTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD_SIZE,
        });
    }

    let mut buf = BytesMut::with_capacity(FRAME_HEADER_SIZE + payload.len());
    buf.put_u32_le(payload.len() as u32);
    buf.put_u32_le(checksum(payload));
    buf.put_slice(payload);
    Ok(buf)
}

/// A decoded frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub length: u32,
    pub checksum: u32,
}

impl FrameHeader {
    /// Decodes the fixed-size header. A length above [`MAX_PAYLOAD_SIZE`]
    /// means the cursor is misaligned or the header is corrupt.
    pub fn decode(bytes: [u8; FRAME_HEADER_SIZE]) -> Result<Self, LogError> {
        let length = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let checksum = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);

        if length as usize > MAX_PAYLOAD_SIZE {
            return Err(LogError::RecordTooLarge {
                size: length as usize,
                max: MAX_PAYLOAD_SIZE,
            });
        }

        Ok(Self { length, checksum })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_known_payload() {
        let payload = b"This is only a test.";
        assert_eq!(payload.len(), 0x14);

        let encoded = encode(payload).unwrap();
        assert_eq!(&encoded[0..4], &[0x14, 0x00, 0x00, 0x00]);
        assert_eq!(&encoded[8..], &payload[..]);

        // A 21-byte payload gets length field 15 00 00 00.
        let encoded = encode(b"This is only a test!!").unwrap();
        assert_eq!(&encoded[0..4], &[0x15, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_header_roundtrip() {
        let payload = b"hello";
        let encoded = encode(payload).unwrap();
        let header = FrameHeader::decode(encoded[..FRAME_HEADER_SIZE].try_into().unwrap()).unwrap();
        assert_eq!(header.length, 5);
        assert_eq!(header.checksum, checksum(payload));
    }

    #[test]
    fn test_empty_payload() {
        let encoded = encode(b"").unwrap();
        assert_eq!(encoded.len(), FRAME_HEADER_SIZE);
        let header = FrameHeader::decode(encoded[..].try_into().unwrap()).unwrap();
        assert_eq!(header.length, 0);
    }

    #[test]
    fn test_payload_too_large() {
        let huge = vec![0u8; MAX_PAYLOAD_SIZE + 1];
        assert!(matches!(
            encode(&huge),
            Err(LogError::RecordTooLarge { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_oversized_length() {
        let mut bytes = [0u8; FRAME_HEADER_SIZE];
        bytes[..4].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(
            FrameHeader::decode(bytes),
            Err(LogError::RecordTooLarge { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_frame_roundtrip(payload in proptest::collection::vec(any::<u8>(), 0..2048)) {
            let encoded = encode(&payload).unwrap();
            prop_assert_eq!(encoded.len() as u64, framed_len(payload.len()));

            let header =
                FrameHeader::decode(encoded[..FRAME_HEADER_SIZE].try_into().unwrap()).unwrap();
            prop_assert_eq!(header.length as usize, payload.len());
            prop_assert_eq!(header.checksum, checksum(&payload));
            prop_assert_eq!(&encoded[FRAME_HEADER_SIZE..], &payload[..]);
        }
    }
}
