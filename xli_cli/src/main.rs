use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use clap::{Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use xli_codecs::{decode_chunk, decode_payload, expand_chunk};
use xli_core::{
    render_plain, Chunk, ChunkReader, Compression, DecodeOptions, DecodedLead, LeadSetOutcome,
    PayloadShape,
};

// ── CLI definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xli",
    about = "Decode, inspect, and batch-process XLI-compressed Sierra ECG waveforms",
    version
)]
struct Cli {
    /// Log per-chunk detail to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every subcommand that decodes a payload.
#[derive(clap::Args, Clone)]
struct PayloadArgs {
    /// Input is Base64 text (as found inside <parsedwaveforms>) rather than raw bytes
    #[arg(long)]
    base64: bool,
    /// LZW codeword width in bits
    #[arg(long)]
    code_bits: Option<u8>,
    /// JSON file with decode options ({"code_bits", "max_leads", "lead_set"})
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Whitespace-delimited decimal samples, 25 per line
    Text,
    /// JSON object with named leads
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a waveform payload into the twelve standard leads
    Decode {
        /// Payload file ("-" reads stdin)
        input: PathBuf,
        /// Destination file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
        /// Lead-set identifier of the record (report type), e.g. STD-12
        #[arg(long)]
        lead_set: Option<String>,
        /// Compression method of the payload: XLI | Uncompressed
        #[arg(long, default_value = "XLI")]
        compression: String,
        /// Samples per lead, for uncompressed payloads
        #[arg(long)]
        samples_per_lead: Option<usize>,
        #[command(flatten)]
        payload: PayloadArgs,
    },
    /// Print the chunk layout of an XLI payload
    Inspect {
        /// Payload file
        file: PathBuf,
        /// Print per-chunk details
        #[arg(long)]
        chunks: bool,
        #[command(flatten)]
        payload: PayloadArgs,
    },
    /// Decode a single chunk by index, without lead reconstruction
    ReadChunk {
        /// Payload file
        file: PathBuf,
        /// Zero-based chunk index to read
        #[arg(short, long)]
        index: usize,
        #[command(flatten)]
        payload: PayloadArgs,
    },
    /// Decode many XLI payloads in parallel and summarise each one
    Batch {
        /// Payload files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Worker threads (default: one per core)
        #[arg(short, long)]
        jobs: Option<usize>,
        #[command(flatten)]
        payload: PayloadArgs,
    },
}

// ── Helpers ────────────────────────────────────────────────────────────────

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(io::stderr)
        .init();
}

fn human_bytes(n: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut v = n as f64;
    let mut unit = 0;
    while v >= 1024.0 && unit < UNITS.len() - 1 {
        v /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", n)
    } else {
        format!("{:.2} {}", v, UNITS[unit])
    }
}

fn load_options(args: &PayloadArgs) -> anyhow::Result<DecodeOptions> {
    let mut opts = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config file {:?}", path))?;
            DecodeOptions::from_json(&text)
                .with_context(|| format!("parsing config file {:?}", path))?
        }
        None => DecodeOptions::default(),
    };
    if let Some(bits) = args.code_bits {
        opts.code_bits = bits;
    }
    opts.validate()?;
    Ok(opts)
}

/// Read a payload, decoding Base64 text when asked to.
fn load_payload(path: &Path, base64: bool) -> anyhow::Result<Vec<u8>> {
    let raw = if path.to_str() == Some("-") {
        let mut buf = Vec::new();
        io::Read::read_to_end(&mut io::stdin().lock(), &mut buf)?;
        buf
    } else {
        std::fs::read(path).with_context(|| format!("reading payload {:?}", path))?
    };

    if !base64 {
        return Ok(raw);
    }
    let text: Vec<u8> = raw.into_iter().filter(|b| !b.is_ascii_whitespace()).collect();
    STANDARD
        .decode(&text)
        .with_context(|| format!("decoding Base64 payload {:?}", path))
}

#[derive(Serialize)]
struct DecodeReport<'a> {
    lead_set: &'a str,
    leads: Option<&'a [DecodedLead]>,
}

// ── Subcommand implementations ─────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
fn run_decode(
    input: PathBuf,
    output: Option<PathBuf>,
    format: OutputFormat,
    lead_set: Option<String>,
    compression: &str,
    samples_per_lead: Option<usize>,
    args: &PayloadArgs,
) -> anyhow::Result<()> {
    let opts = load_options(args)?;
    let lead_set = lead_set.unwrap_or_else(|| opts.lead_set.clone());
    let payload = load_payload(&input, args.base64)?;
    let shape = PayloadShape {
        lead_count: 0,
        samples_per_lead,
    };

    let t0 = Instant::now();
    let outcome = decode_payload(
        &payload,
        &lead_set,
        &Compression::from_method(Some(compression)),
        &shape,
        &opts,
    )
    .with_context(|| format!("decoding {:?}", input))?;
    let elapsed = t0.elapsed();

    let leads = match &outcome {
        LeadSetOutcome::Leads(leads) => Some(leads.as_slice()),
        LeadSetOutcome::Unrecognized { lead_set } => {
            warn!(lead_set = %lead_set, "lead set is not reconstructable; no leads produced");
            None
        }
    };

    let mut dst: Box<dyn Write> = match &output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("creating output file {:?}", path))?,
        ),
        None => Box::new(io::stdout()),
    };

    match format {
        OutputFormat::Text => {
            if let Some(leads) = leads {
                dst.write_all(render_plain(leads).as_bytes())?;
            }
        }
        OutputFormat::Json => {
            let report = DecodeReport {
                lead_set: &lead_set,
                leads,
            };
            serde_json::to_writer_pretty(&mut dst, &report)?;
            writeln!(dst)?;
        }
    }
    dst.flush()?;

    if let Some(leads) = leads {
        for lead in leads {
            eprintln!("  {}", lead);
        }
    }
    eprintln!("  payload     : {}", human_bytes(payload.len() as u64));
    eprintln!("  elapsed     : {:.3}ms", elapsed.as_secs_f64() * 1000.0);
    Ok(())
}

fn run_inspect(file: PathBuf, show_chunks: bool, args: &PayloadArgs) -> anyhow::Result<()> {
    let opts = load_options(args)?;
    let payload = load_payload(&file, args.base64)?;

    println!("=== XLI payload: {:?} ===", file);
    println!();
    if show_chunks {
        println!(
            "  {:>6}  {:>10}  {:>12}  {:>8}  {:>6}  {:>12}  {:>8}",
            "chunk", "offset", "compressed", "reserved", "seed", "expanded", "samples"
        );
        println!("  {}", "-".repeat(74));
    }

    let mut offset = 0usize;
    let mut chunk_count = 0usize;
    let mut total_expanded = 0u64;
    for (i, chunk) in ChunkReader::new(payload.as_slice()).enumerate() {
        let chunk = chunk.with_context(|| format!("reading chunk {}", i))?;
        let expanded = expand_chunk(&chunk, opts.code_bits)
            .with_context(|| format!("expanding chunk {}", i))?;
        let padded = expanded.len() + expanded.len() % 2;
        if show_chunks {
            println!(
                "  {:>6}  {:>10}  {:>12}  {:>8}  {:>6}  {:>12}  {:>8}",
                i,
                offset,
                human_bytes(chunk.header.byte_length as u64),
                chunk.header.reserved,
                chunk.header.seed,
                human_bytes(expanded.len() as u64),
                padded / 2
            );
        }
        offset += chunk.framed_len();
        total_expanded += expanded.len() as u64;
        chunk_count += 1;
    }

    let ratio = if payload.is_empty() {
        1.0
    } else {
        total_expanded as f64 / payload.len() as f64
    };
    if show_chunks {
        println!();
    }
    println!("  chunks         : {}", chunk_count);
    println!("  payload        : {}", human_bytes(payload.len() as u64));
    println!("  trailing bytes : {}", payload.len() - offset);
    println!("  expanded       : {}", human_bytes(total_expanded));
    println!("  ratio          : {:.2}x", ratio);
    println!("  code width     : {} bits", opts.code_bits);
    Ok(())
}

/// Walk the payload up to chunk `index`, failing on the first bad chunk
/// rather than reporting it as out of range.
fn select_chunk(payload: &[u8], index: usize) -> anyhow::Result<Chunk> {
    let mut reader = ChunkReader::new(payload);
    loop {
        let current = reader.chunks_read();
        let chunk = match reader.next() {
            Some(chunk) => chunk.with_context(|| format!("reading chunk {}", current))?,
            None => break,
        };
        if current == index {
            return Ok(chunk);
        }
    }
    anyhow::bail!(
        "chunk index {} out of range (payload has {} chunks)",
        index,
        reader.chunks_read()
    )
}

fn run_read_chunk(file: PathBuf, index: usize, args: &PayloadArgs) -> anyhow::Result<()> {
    let opts = load_options(args)?;
    let payload = load_payload(&file, args.base64)?;

    let chunk = select_chunk(&payload, index)?;

    let t0 = Instant::now();
    let samples = decode_chunk(&chunk, opts.code_bits)?;
    let elapsed = t0.elapsed();

    eprintln!(
        "  chunk {}: {} compressed bytes, seed {}, decoded in {:.3}ms",
        index,
        chunk.header.byte_length,
        chunk.header.seed,
        elapsed.as_secs_f64() * 1000.0
    );
    let lead = DecodedLead::new(index, samples);
    println!("--- {} ---", lead);
    println!("{}", render_plain(std::slice::from_ref(&lead)));
    Ok(())
}

struct BatchResult {
    path: PathBuf,
    outcome: anyhow::Result<LeadSetOutcome>,
}

fn decode_file(path: &Path, args: &PayloadArgs, opts: &DecodeOptions) -> anyhow::Result<LeadSetOutcome> {
    let payload = load_payload(path, args.base64)?;
    let outcome = decode_payload(
        &payload,
        &opts.lead_set,
        &Compression::Xli,
        &PayloadShape::default(),
        opts,
    )?;
    debug!(path = ?path, "record decoded");
    Ok(outcome)
}

fn run_batch(inputs: Vec<PathBuf>, jobs: Option<usize>, args: &PayloadArgs) -> anyhow::Result<()> {
    let opts = load_options(args)?;
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = jobs {
        builder = builder.num_threads(n);
    }
    let pool = builder.build().context("building worker pool")?;

    info!(
        records = inputs.len(),
        threads = pool.current_num_threads(),
        "decoding batch"
    );

    let t0 = Instant::now();
    let results: Vec<BatchResult> = pool.install(|| {
        inputs
            .par_iter()
            .map(|path| BatchResult {
                path: path.clone(),
                outcome: decode_file(path, args, &opts),
            })
            .collect()
    });
    let elapsed = t0.elapsed();

    let mut failed = 0usize;
    for result in &results {
        match &result.outcome {
            Ok(LeadSetOutcome::Leads(leads)) => {
                let samples = leads.first().map(DecodedLead::len).unwrap_or(0);
                let empty = leads.iter().filter(|lead| lead.is_empty()).count();
                if empty > 0 {
                    warn!(path = ?result.path, empty, "record has leads without samples");
                }
                println!(
                    "  ok       {:?}: {} leads, {} samples/lead",
                    result.path,
                    leads.len(),
                    samples
                );
            }
            Ok(LeadSetOutcome::Unrecognized { lead_set }) => {
                println!("  skipped  {:?}: lead set {:?} not reconstructable", result.path, lead_set);
            }
            Err(e) => {
                failed += 1;
                println!("  failed   {:?}: {:#}", result.path, e);
            }
        }
    }

    println!();
    println!("  records     : {}", results.len());
    println!("  failed      : {}", failed);
    println!("  elapsed     : {:.3}s", elapsed.as_secs_f64());

    if failed > 0 {
        anyhow::bail!("{} of {} records failed to decode", failed, results.len());
    }
    Ok(())
}

// ── Entry point ────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.command {
        Commands::Decode {
            input,
            output,
            format,
            lead_set,
            compression,
            samples_per_lead,
            payload,
        } => run_decode(
            input,
            output,
            format,
            lead_set,
            &compression,
            samples_per_lead,
            &payload,
        ),
        Commands::Inspect {
            file,
            chunks,
            payload,
        } => run_inspect(file, chunks, &payload),
        Commands::ReadChunk {
            file,
            index,
            payload,
        } => run_read_chunk(file, index, &payload),
        Commands::Batch {
            inputs,
            jobs,
            payload,
        } => run_batch(inputs, jobs, &payload),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xli_core::format::ChunkHeader;
    use xli_core::XliError;

    fn framed(byte_length: u32, body: &[u8]) -> Vec<u8> {
        let header = ChunkHeader {
            byte_length,
            reserved: 1,
            seed: 0,
        };
        let mut out = header.to_bytes().to_vec();
        out.extend_from_slice(body);
        out
    }

    #[test]
    fn select_chunk_returns_requested_index() {
        let mut payload = framed(2, b"ab");
        payload.extend(framed(3, b"cde"));
        assert_eq!(select_chunk(&payload, 1).unwrap().body, b"cde");
    }

    #[test]
    fn select_chunk_reports_truncation_before_index() {
        let mut payload = framed(2, b"ab");
        payload.extend(framed(100, b"cd"));

        let err = select_chunk(&payload, 5).unwrap_err();
        assert!(err.to_string().contains("reading chunk 1"), "{err:#}");
        assert!(matches!(
            err.downcast_ref::<XliError>(),
            Some(XliError::TruncatedChunk { index: 1, .. })
        ));
    }

    #[test]
    fn select_chunk_past_end_is_out_of_range() {
        let payload = framed(2, b"ab");
        let err = select_chunk(&payload, 3).unwrap_err();
        assert!(err.to_string().contains("out of range (payload has 1 chunks)"));
    }
}
