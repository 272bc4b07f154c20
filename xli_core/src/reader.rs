use std::io::{ErrorKind, Read};

use tracing::{debug, trace};

use crate::error::{Result, XliError};
use crate::format::{Chunk, ChunkHeader, CHUNK_HEADER_SIZE};

/// Upper bound on the up-front body allocation; the declared length is
/// untrusted until the bytes have actually been read.
const BODY_RESERVE_LIMIT: usize = 64 * 1024;

/// Sequential chunk reader for XLI payloads.
///
/// # Read sequence
/// 1. Read the 8-byte header. A short header (including zero bytes) ends
///    the stream cleanly: trailing bytes that cannot form a header are not
///    an error.
/// 2. Read exactly `byte_length` body bytes. A short body is a
///    [`XliError::TruncatedChunk`] and poisons the reader: every later call
///    to `next` returns `None`.
///
/// Chunks are yielded in payload order and the reader cannot be rewound.
/// Works over anything implementing [`Read`], including `&[u8]`.
pub struct ChunkReader<R> {
    inner: R,
    index: usize,
    done: bool,
}

impl<R: Read> ChunkReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            index: 0,
            done: false,
        }
    }

    /// Number of chunks yielded so far.
    #[inline]
    pub fn chunks_read(&self) -> usize {
        self.index
    }

    /// Read the next chunk, or `Ok(None)` once the payload is exhausted.
    pub fn read_chunk(&mut self) -> Result<Option<Chunk>> {
        if self.done {
            return Ok(None);
        }

        // ── Header ──────────────────────────────────────────────────────────
        let mut header_buf = [0u8; CHUNK_HEADER_SIZE];
        let got = read_full(&mut self.inner, &mut header_buf)?;
        if got < CHUNK_HEADER_SIZE {
            if got > 0 {
                trace!(trailing = got, "ignoring trailing bytes shorter than a chunk header");
            }
            self.done = true;
            return Ok(None);
        }
        let header = ChunkHeader::from_bytes(&header_buf);

        // ── Body ────────────────────────────────────────────────────────────
        let mut body = Vec::with_capacity((header.byte_length as usize).min(BODY_RESERVE_LIMIT));
        (&mut self.inner)
            .take(header.byte_length as u64)
            .read_to_end(&mut body)?;
        if body.len() < header.byte_length as usize {
            self.done = true;
            return Err(XliError::TruncatedChunk {
                index: self.index,
                declared: header.byte_length,
                available: body.len(),
            });
        }

        debug!(
            chunk = self.index,
            byte_length = header.byte_length,
            reserved = header.reserved,
            seed = header.seed,
            "read chunk"
        );
        self.index += 1;

        Ok(Some(Chunk { header, body }))
    }
}

impl<R: Read> Iterator for ChunkReader<R> {
    type Item = Result<Chunk>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_chunk().transpose()
    }
}

/// Fill `buf` as far as the source allows, returning how many bytes landed.
fn read_full<R: Read>(src: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match src.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}
