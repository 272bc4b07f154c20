use tracing::debug;

use xli_core::codec::{PayloadShape, WaveformCodec};
use xli_core::config::DecodeOptions;
use xli_core::error::Result;
use xli_core::format::Chunk;
use xli_core::reader::ChunkReader;

use crate::delta::{decode_deltas, unpack};
use crate::lzw::LzwDecoder;

/// XLI waveform codec.
///
/// A payload is a run of chunks, one per lead. Each chunk body is LZW with
/// fixed-width codewords; the expanded bytes are split-plane 16-bit
/// residuals that go through the second-order predictor seeded from the
/// chunk header. Any failing chunk fails the whole payload.
pub struct XliCodec;

impl WaveformCodec for XliCodec {
    fn name(&self) -> &'static str {
        "xli"
    }

    fn decode_leads(
        &self,
        payload: &[u8],
        _shape: &PayloadShape,
        opts: &DecodeOptions,
    ) -> Result<Vec<Vec<i32>>> {
        opts.validate()?;
        let mut leads = Vec::new();
        for chunk in ChunkReader::new(payload) {
            leads.push(decode_chunk(&chunk?, opts.code_bits)?);
        }
        debug!(leads = leads.len(), bytes = payload.len(), "xli payload decoded");
        Ok(leads)
    }
}

/// Decode one chunk into its lead's samples.
pub fn decode_chunk(chunk: &Chunk, code_bits: u8) -> Result<Vec<i32>> {
    let mut bytes = expand_chunk(chunk, code_bits)?;
    if bytes.len() % 2 == 1 {
        bytes.push(0);
    }
    Ok(decode_deltas(&unpack(&bytes), chunk.seed()))
}

/// LZW-expand a chunk body without unpacking it.
pub fn expand_chunk(chunk: &Chunk, code_bits: u8) -> Result<Vec<u8>> {
    LzwDecoder::new(&chunk.body, code_bits)?.decode()
}
