use serde::{Deserialize, Serialize};

use crate::error::{Result, XliError};
use crate::format::{
    DEFAULT_CODE_BITS, LEAD_SET_STD_12, MAX_CODE_BITS, MIN_CODE_BITS, STD_12_LEAD_COUNT,
};

/// Tunables for a decode call.
///
/// Every field has a default matching real Sierra ECG recordings, so an empty
/// JSON object (`{}`) is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// LZW codeword width in bits.
    pub code_bits: u8,
    /// Decoded leads beyond this count are dropped before reconstruction.
    pub max_leads: usize,
    /// Lead-set identifier assumed for bare payloads that arrive without a record.
    pub lead_set: String,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            code_bits: DEFAULT_CODE_BITS,
            max_leads: STD_12_LEAD_COUNT,
            lead_set: LEAD_SET_STD_12.to_string(),
        }
    }
}

impl DecodeOptions {
    /// Parse and validate options from a JSON document.
    pub fn from_json(text: &str) -> Result<Self> {
        let opts: Self = serde_json::from_str(text)?;
        opts.validate()?;
        Ok(opts)
    }

    pub fn validate(&self) -> Result<()> {
        if !(MIN_CODE_BITS..=MAX_CODE_BITS).contains(&self.code_bits) {
            return Err(XliError::InvalidCodeWidth(self.code_bits));
        }
        Ok(())
    }
}
