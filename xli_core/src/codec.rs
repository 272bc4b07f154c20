use crate::config::DecodeOptions;
use crate::error::Result;

/// Layout hints for payloads that carry no framing of their own.
///
/// XLI payloads are self-describing and ignore this. Uncompressed payloads
/// are a flat run of samples and need to be told how to split it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PayloadShape {
    /// Number of leads in the payload. Zero means "use `DecodeOptions::max_leads`".
    pub lead_count: usize,
    /// Samples per lead. `None` splits the payload evenly across the leads.
    pub samples_per_lead: Option<usize>,
}

/// Waveform payload decoding abstraction.
///
/// Each `WaveformCodec` implementation:
/// - Is selected by the record's compression method.
/// - Turns one record's raw (already Base64-decoded) payload into per-lead
///   sample arrays, in transmission order, before any lead reconstruction.
/// - Holds no state between calls, so one instance may serve any number of
///   records concurrently.
pub trait WaveformCodec: Send + Sync {
    /// Human-readable codec name for CLI display.
    fn name(&self) -> &'static str;

    /// Decode a whole payload into one sample array per lead.
    fn decode_leads(
        &self,
        payload: &[u8],
        shape: &PayloadShape,
        opts: &DecodeOptions,
    ) -> Result<Vec<Vec<i32>>>;
}
