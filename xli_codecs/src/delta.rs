use xli_core::format::RESIDUAL_BIAS;

/// Split-plane unpack of big-endian 16-bit values.
///
/// The first half of `bytes` holds the high bytes and the second half the low
/// bytes of `len / 2` signed samples. An odd trailing byte is ignored.
pub fn unpack(bytes: &[u8]) -> Vec<i32> {
    let n = bytes.len() / 2;
    let (high, low) = bytes.split_at(n);
    high.iter()
        .zip(low)
        .map(|(&hi, &lo)| i16::from_be_bytes([hi, lo]) as i32)
        .collect()
}

/// Undo the second-order predictor.
///
/// The first two values pass through. Every later value is extrapolated from
/// the two before it, minus the previous biased residual (initially `seed`):
///
/// ```text
/// z      = 2 * out[i-1] - out[i-2] - last
/// last   = raw[i] - 64
/// out[i] = z
/// ```
///
/// All arithmetic wraps at 32 bits.
pub fn decode_deltas(raw: &[i32], seed: i16) -> Vec<i32> {
    let mut out = raw.to_vec();
    let mut last = seed as i32;
    for i in 2..out.len() {
        let z = out[i - 1]
            .wrapping_mul(2)
            .wrapping_sub(out[i - 2])
            .wrapping_sub(last);
        last = raw[i].wrapping_sub(RESIDUAL_BIAS);
        out[i] = z;
    }
    out
}
