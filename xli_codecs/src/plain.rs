use xli_core::codec::{PayloadShape, WaveformCodec};
use xli_core::config::DecodeOptions;
use xli_core::error::Result;

/// Codec for uncompressed payloads.
///
/// The payload is a flat run of little-endian signed 16-bit samples, lead
/// after lead. Without an explicit samples-per-lead count the run is split
/// evenly. Leads the payload is too short to fill come back short or are
/// omitted.
pub struct PlainCodec;

impl WaveformCodec for PlainCodec {
    fn name(&self) -> &'static str {
        "plain"
    }

    fn decode_leads(
        &self,
        payload: &[u8],
        shape: &PayloadShape,
        opts: &DecodeOptions,
    ) -> Result<Vec<Vec<i32>>> {
        let samples: Vec<i32> = payload
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as i32)
            .collect();

        let lead_count = if shape.lead_count == 0 {
            opts.max_leads
        } else {
            shape.lead_count
        };
        if lead_count == 0 {
            return Ok(Vec::new());
        }
        let per_lead = shape
            .samples_per_lead
            .unwrap_or(samples.len() / lead_count);
        if per_lead == 0 {
            return Ok(Vec::new());
        }

        Ok(samples
            .chunks(per_lead)
            .take(lead_count)
            .map(<[i32]>::to_vec)
            .collect())
    }
}
