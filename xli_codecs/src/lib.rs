pub mod delta;
pub mod lzw;
mod plain;
mod xli_codec;

pub use plain::PlainCodec;
pub use xli_codec::{decode_chunk, expand_chunk, XliCodec};

use std::sync::Arc;

use tracing::debug;
use xli_core::error::{Result, XliError};
use xli_core::lead::{create_from_lead_set, LeadSetOutcome};
use xli_core::record::{Compression, Dialect, WaveformRecord};
use xli_core::{DecodeOptions, PayloadShape, WaveformCodec};

/// Resolve the codec for a record's compression method.
///
/// Called by the CLI and by [`extract_leads`] so the payload is handed to the
/// right decoder automatically.
pub fn codec_for(compression: &Compression) -> Result<Arc<dyn WaveformCodec>> {
    match compression {
        Compression::None => Ok(Arc::new(PlainCodec)),
        Compression::Xli => Ok(Arc::new(XliCodec)),
        Compression::Other(method) => Err(XliError::UnsupportedCompression(method.clone())),
    }
}

/// Decode a bare payload into a named, reconstructed lead set.
///
/// An unrecognized `lead_set` short-circuits before the payload is touched.
pub fn decode_payload(
    payload: &[u8],
    lead_set: &str,
    compression: &Compression,
    shape: &PayloadShape,
    opts: &DecodeOptions,
) -> Result<LeadSetOutcome> {
    opts.validate()?;
    if !xli_core::lead::is_standard_lead_set(lead_set) {
        return create_from_lead_set(lead_set, Vec::new(), opts.max_leads);
    }

    let codec = codec_for(compression)?;
    let lead_data = codec.decode_leads(payload, shape, opts)?;
    debug!(
        codec = codec.name(),
        leads = lead_data.len(),
        "payload decoded"
    );
    create_from_lead_set(lead_set, lead_data, opts.max_leads)
}

/// Decode the waveforms of one record, picking the dialect from its version.
pub fn extract_leads(record: &WaveformRecord, opts: &DecodeOptions) -> Result<LeadSetOutcome> {
    let dialect = Dialect::for_record(record)?;
    debug!(version = dialect.version(), "dialect selected");
    decode_payload(
        &record.payload,
        &dialect.lead_set(record),
        &dialect.compression(record),
        &dialect.shape(record),
        opts,
    )
}
