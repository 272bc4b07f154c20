use tracing::trace;

use xli_core::error::{Result, XliError};
use xli_core::format::{FIRST_LEARNED_CODE, MAX_CODE_BITS, MIN_CODE_BITS};

/// Code → byte-string table for one chunk.
///
/// Codes are dense: entry `n` lives at index `n`, the first 256 are the
/// single bytes, and new entries are only ever appended at the next free code.
struct Dictionary {
    strings: Vec<Vec<u8>>,
}

impl Dictionary {
    fn new(capacity: usize) -> Self {
        let mut strings = Vec::with_capacity(capacity);
        strings.extend((0..=u8::MAX).map(|b| vec![b]));
        Self { strings }
    }

    #[inline]
    fn get(&self, code: u32) -> Option<&[u8]> {
        self.strings.get(code as usize).map(Vec::as_slice)
    }

    #[inline]
    fn next_code(&self) -> u32 {
        self.strings.len() as u32
    }

    #[inline]
    fn push(&mut self, string: Vec<u8>) {
        self.strings.push(string);
    }
}

/// MSB-first LZW decoder with fixed-width codewords and no clear code.
///
/// # Bitstream
/// Codewords are packed big-endian into a 32-bit buffer that is refilled a
/// byte at a time while it holds 24 bits or fewer. Decoding ends when the
/// input cannot supply another full codeword, or at the first code above
/// `(1 << bits) - 2`.
///
/// # Dictionary
/// After every codeword but the first, `previous + current[0]` is learned at
/// the next free code until the table reaches `(1 << bits) - 2`. A codeword
/// equal to the next free code is the KwK case and expands to
/// `previous + previous[0]`. Any other undefined code is rejected with
/// [`XliError::MalformedCodeStream`].
pub struct LzwDecoder<'a> {
    input: &'a [u8],
    offset: usize,
    bits: u32,
    max_code: u32,
    bit_count: u32,
    bit_buffer: u32,
    codes_read: usize,
    previous: Vec<u8>,
    dictionary: Dictionary,
}

impl<'a> LzwDecoder<'a> {
    pub fn new(input: &'a [u8], bits: u8) -> Result<Self> {
        if !(MIN_CODE_BITS..=MAX_CODE_BITS).contains(&bits) {
            return Err(XliError::InvalidCodeWidth(bits));
        }
        let max_code = (1u32 << bits) - 2;
        Ok(Self {
            input,
            offset: 0,
            bits: bits as u32,
            max_code,
            bit_count: 0,
            bit_buffer: 0,
            codes_read: 0,
            previous: Vec::new(),
            dictionary: Dictionary::new(max_code as usize + 1),
        })
    }

    /// Entries learned beyond the 256 pre-seeded single bytes.
    pub fn learned_codes(&self) -> usize {
        (self.dictionary.next_code() - FIRST_LEARNED_CODE) as usize
    }

    /// Codewords consumed so far, including a terminating stop code.
    pub fn codes_read(&self) -> usize {
        self.codes_read
    }

    /// Expand the whole stream.
    pub fn decode(&mut self) -> Result<Vec<u8>> {
        let mut output = Vec::with_capacity(self.input.len() * 2);
        while let Some(code) = self.read_code() {
            let position = self.codes_read;
            self.codes_read += 1;

            if code > self.max_code {
                trace!(code, max_code = self.max_code, "stop code, ending");
                break;
            }

            let next_code = self.dictionary.next_code();
            let current = match self.dictionary.get(code) {
                Some(string) => string.to_vec(),
                None if code == next_code && !self.previous.is_empty() => {
                    let mut string = self.previous.clone();
                    string.push(self.previous[0]);
                    string
                }
                None => {
                    return Err(XliError::MalformedCodeStream {
                        code,
                        next_code,
                        position,
                    })
                }
            };

            if !self.previous.is_empty() && next_code <= self.max_code {
                let mut learned = std::mem::take(&mut self.previous);
                learned.push(current[0]);
                self.dictionary.push(learned);
            }

            output.extend_from_slice(&current);
            self.previous = current;
        }

        trace!(
            codes = self.codes_read,
            learned = self.learned_codes(),
            bytes = output.len(),
            "lzw stream expanded"
        );
        Ok(output)
    }

    fn read_code(&mut self) -> Option<u32> {
        while self.bit_count <= 24 {
            let Some(&byte) = self.input.get(self.offset) else {
                break;
            };
            self.offset += 1;
            self.bit_buffer |= (byte as u32) << (24 - self.bit_count);
            self.bit_count += 8;
        }

        if self.bit_count < self.bits {
            trace!(bits_left = self.bit_count, "input exhausted");
            return None;
        }

        let code = self.bit_buffer >> (32 - self.bits);
        self.bit_buffer <<= self.bits;
        self.bit_count -= self.bits;
        Some(code)
    }
}

/// Expand an LZW body with a fresh dictionary.
pub fn decompress(input: &[u8], bits: u8) -> Result<Vec<u8>> {
    LzwDecoder::new(input, bits)?.decode()
}
