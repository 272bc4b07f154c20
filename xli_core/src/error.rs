// Error taxonomy for XLI decoding

use thiserror::Error;

pub type Result<T> = std::result::Result<T, XliError>;

#[derive(Error, Debug)]
pub enum XliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("chunk {index} is truncated: header declares {declared} bytes but only {available} remain")]
    TruncatedChunk {
        index: usize,
        declared: u32,
        available: usize,
    },

    #[error("malformed LZW code stream: codeword {position} references undefined code {code} (next free code is {next_code})")]
    MalformedCodeStream {
        code: u32,
        next_code: u32,
        position: usize,
    },

    #[error("invalid LZW code width {0}: must be between 10 and 16 bits")]
    InvalidCodeWidth(u8),

    #[error("lead reconstruction needs at least {required} leads, found {found}")]
    MissingLeads { found: usize, required: usize },

    #[error("unsupported compression method: {0}")]
    UnsupportedCompression(String),

    #[error("unsupported document version: {0}")]
    UnsupportedVersion(String),

    #[error("unsupported document type: {0}")]
    UnsupportedDocumentType(String),

    #[error("invalid decode configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}
