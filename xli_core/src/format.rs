/// Size of each XLI chunk header in bytes.
///   byte_length:u32 + reserved:u16 + seed:i16
///   = 4 + 2 + 2 = 8
pub const CHUNK_HEADER_SIZE: usize = 8;

// ── LZW ────────────────────────────────────────────────────────────────────

/// Codeword width used by every XLI payload seen in the wild.
pub const DEFAULT_CODE_BITS: u8 = 10;

/// Narrowest and widest codeword widths the decoder accepts.
pub const MIN_CODE_BITS: u8 = 10;
pub const MAX_CODE_BITS: u8 = 16;

/// First dictionary code that is learned rather than pre-seeded.
pub const FIRST_LEARNED_CODE: u32 = 256;

// ── Predictor ──────────────────────────────────────────────────────────────

/// Constant offset the encoder adds to every residual.
pub const RESIDUAL_BIAS: i32 = 64;

// ── Lead sets and compression methods ──────────────────────────────────────

/// Lead-set identifier of the standard 12-lead layout.
pub const LEAD_SET_STD_12: &str = "STD-12";

/// Number of leads in the standard layout.
pub const STD_12_LEAD_COUNT: usize = 12;

/// Leads I, II, III, aVR, aVL, aVF must all be present to reconstruct.
pub const RECONSTRUCTED_LEAD_COUNT: usize = 6;

pub const COMPRESSION_XLI: &str = "XLI";
pub const COMPRESSION_NONE: &str = "Uncompressed";

// ── Chunk header ───────────────────────────────────────────────────────────

/// Decoded representation of the 8-byte little-endian chunk header.
///
/// ```text
/// 0        2        4        6        8
/// +--------+--------+--------+--------+-----------------------------+
/// | byte_length     |reserved|  seed  | LZW body [byte_length bytes] |
/// +--------+--------+--------+--------+-----------------------------+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChunkHeader {
    /// Length of the LZW body that follows the header (header excluded).
    pub byte_length: u32,
    /// Unused by the decoder. Every recording seen so far carries 1 here.
    pub reserved: u16,
    /// Initial predictor value for this chunk's lead.
    pub seed: i16,
}

impl ChunkHeader {
    /// Serialize to exactly `CHUNK_HEADER_SIZE` bytes.
    pub fn to_bytes(&self) -> [u8; CHUNK_HEADER_SIZE] {
        let mut buf = [0u8; CHUNK_HEADER_SIZE];
        buf[0..4].copy_from_slice(&self.byte_length.to_le_bytes());
        buf[4..6].copy_from_slice(&self.reserved.to_le_bytes());
        buf[6..8].copy_from_slice(&self.seed.to_le_bytes());
        buf
    }

    /// Deserialize from `CHUNK_HEADER_SIZE` bytes.
    pub fn from_bytes(buf: &[u8; CHUNK_HEADER_SIZE]) -> Self {
        Self {
            byte_length: u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]),
            reserved: u16::from_le_bytes([buf[4], buf[5]]),
            seed: i16::from_le_bytes([buf[6], buf[7]]),
        }
    }
}

/// One framed unit of an XLI payload: a header plus its LZW body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub header: ChunkHeader,
    pub body: Vec<u8>,
}

impl Chunk {
    #[inline]
    pub fn seed(&self) -> i16 {
        self.header.seed
    }

    /// Bytes this chunk occupies in the payload, header included.
    pub fn framed_len(&self) -> usize {
        CHUNK_HEADER_SIZE + self.body.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_little_endian() {
        let buf = [0x10, 0x02, 0x00, 0x00, 0x01, 0x00, 0xfe, 0xff];
        let header = ChunkHeader::from_bytes(&buf);
        assert_eq!(header.byte_length, 0x210);
        assert_eq!(header.reserved, 1);
        assert_eq!(header.seed, -2);
        assert_eq!(header.to_bytes(), buf);
    }
}
