pub mod codec;
pub mod config;
pub mod error;
pub mod format;
pub mod lead;
pub mod reader;
pub mod record;

pub use codec::{PayloadShape, WaveformCodec};
pub use config::DecodeOptions;
pub use error::{Result, XliError};
pub use format::{Chunk, ChunkHeader, CHUNK_HEADER_SIZE};
pub use lead::{
    create_from_lead_set, lead_name, reconstitute_leads, render_plain, DecodedLead,
    LeadSetOutcome,
};
pub use reader::ChunkReader;
pub use record::{Compression, Dialect, WaveformRecord};
