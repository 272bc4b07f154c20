//! Reference XLI encoder used only to build test fixtures.
#![allow(dead_code)]

use std::collections::HashMap;

use xli_core::format::{ChunkHeader, RESIDUAL_BIAS};

pub const CODE_BITS: u32 = 10;
pub const MAX_CODE: u32 = (1 << CODE_BITS) - 2;
pub const STOP_CODE: u32 = MAX_CODE + 1;

/// Inverse of the predictor: returns the chunk seed and the residual stream.
///
/// The seed is forced by the first three samples; the last residual is free
/// and is written as a bare bias.
pub fn encode_deltas(samples: &[i32]) -> (i16, Vec<i16>) {
    let n = samples.len();
    let mut raw: Vec<i16> = samples.iter().take(2).map(|&v| v as i16).collect();
    if n < 3 {
        return (0, raw);
    }
    let second_diff = |i: usize| 2 * samples[i - 1] - samples[i - 2] - samples[i];
    let seed = second_diff(2) as i16;
    for i in 2..n {
        let last = if i + 1 < n { second_diff(i + 1) } else { 0 };
        raw.push((last + RESIDUAL_BIAS) as i16);
    }
    (seed, raw)
}

/// Split-plane big-endian packing: all high bytes, then all low bytes.
pub fn pack_planes(raw: &[i16]) -> Vec<u8> {
    let mut out: Vec<u8> = raw.iter().map(|v| v.to_be_bytes()[0]).collect();
    out.extend(raw.iter().map(|v| v.to_be_bytes()[1]));
    out
}

/// Classic LZW with a capped dictionary and no clear code.
pub fn lzw_encode(data: &[u8]) -> Vec<u32> {
    let mut dict: HashMap<Vec<u8>, u32> = (0..=255u8).map(|b| (vec![b], b as u32)).collect();
    let mut next_code = 256u32;
    let mut codes = Vec::new();
    let mut w: Vec<u8> = Vec::new();
    for &c in data {
        let mut wc = w.clone();
        wc.push(c);
        if dict.contains_key(&wc) {
            w = wc;
        } else {
            codes.push(dict[&w]);
            if next_code <= MAX_CODE {
                dict.insert(wc, next_code);
                next_code += 1;
            }
            w = vec![c];
        }
    }
    if !w.is_empty() {
        codes.push(dict[&w]);
    }
    codes
}

/// Pack codewords MSB-first, zero-padding the final byte.
pub fn pack_codes(codes: &[u32], bits: u32) -> Vec<u8> {
    let mut out = Vec::new();
    let mut acc: u64 = 0;
    let mut n = 0u32;
    for &code in codes {
        acc = (acc << bits) | code as u64;
        n += bits;
        while n >= 8 {
            n -= 8;
            out.push((acc >> n) as u8);
        }
    }
    if n > 0 {
        out.push((acc << (8 - n)) as u8);
    }
    out
}

/// Frame an LZW body with its chunk header.
pub fn frame_chunk(seed: i16, body: &[u8]) -> Vec<u8> {
    let header = ChunkHeader {
        byte_length: body.len() as u32,
        reserved: 1,
        seed,
    };
    let mut out = header.to_bytes().to_vec();
    out.extend_from_slice(body);
    out
}

/// Encode one lead's samples as a complete chunk, optionally ending with a stop code.
pub fn encode_chunk(samples: &[i32], with_stop: bool) -> Vec<u8> {
    let (seed, raw) = encode_deltas(samples);
    let mut codes = lzw_encode(&pack_planes(&raw));
    if with_stop {
        codes.push(STOP_CODE);
    }
    frame_chunk(seed, &pack_codes(&codes, CODE_BITS))
}

/// Turn true limb leads into the residuals the device transmits.
pub fn transmit_limb_leads(leads: &mut [Vec<i32>]) {
    for k in 0..leads[0].len() {
        let (i, ii, iii) = (leads[0][k], leads[1][k], leads[2][k]);
        leads[2][k] = ii - i - iii;
        leads[3][k] = -leads[3][k] - (i + ii) / 2;
        leads[4][k] = (i - iii) / 2 - leads[4][k];
        leads[5][k] = (ii + iii) / 2 - leads[5][k];
    }
}

/// Deterministic, ECG-ish integer waveform.
pub fn synthetic_lead(lead: usize, len: usize) -> Vec<i32> {
    (0..len)
        .map(|t| {
            let phase = (t + lead * 37) % 400;
            let baseline = ((t as f64 / 90.0 + lead as f64).sin() * 40.0) as i32;
            let spike = if (180..200).contains(&phase) {
                (10 - (phase as i32 - 190).abs()) * 60
            } else {
                0
            };
            baseline + spike - (lead as i32) * 7
        })
        .collect()
}

/// Twelve true leads whose limb leads obey the Einthoven/Goldberger identities.
pub fn synthetic_record(len: usize) -> Vec<Vec<i32>> {
    let mut leads: Vec<Vec<i32>> = (0..12).map(|l| synthetic_lead(l, len)).collect();
    for k in 0..len {
        let (i, ii) = (leads[0][k], leads[1][k]);
        leads[2][k] = ii - i;
        leads[3][k] = -(i + ii) / 2;
        leads[4][k] = i - ii / 2;
        leads[5][k] = ii - i / 2;
    }
    leads
}

/// Full XLI payload for a set of true leads.
pub fn encode_payload(true_leads: &[Vec<i32>]) -> Vec<u8> {
    let mut transmitted = true_leads.to_vec();
    transmit_limb_leads(&mut transmitted);
    transmitted
        .iter()
        .enumerate()
        .flat_map(|(i, lead)| encode_chunk(lead, i % 2 == 0))
        .collect()
}
