//! Extended Hamming(8,4): a rate-1/2 single-error-correcting,
//! double-error-detecting block code.
//!
//! Codeword layout (0-indexed): `[p1, p2, d0, p3, d1, d2, d3, p4]`, where
//! `p1..p3` are the classic Hamming(7,4) parity bits and `p4` is an overall
//! parity bit extending the code to distance 4. Encode and decode are both
//! implemented as lookup tables built once from the bit formulas, matching
//! how a from-scratch Hamming codec is typically built for a tight inner
//! loop: 16 entries for every possible 4-bit message, 256 for every
//! possible received byte.

use std::sync::OnceLock;

fn encode_codeword(d: u8) -> u8 {
    let d0 = (d >> 3) & 1;
    let d1 = (d >> 2) & 1;
    let d2 = (d >> 1) & 1;
    let d3 = d & 1;

    let p1 = d0 ^ d1 ^ d3;
    let p2 = d0 ^ d2 ^ d3;
    let p3 = d1 ^ d2 ^ d3;

    let bits7 = [p1, p2, d0, p3, d1, d2, d3];
    let p4 = bits7.iter().fold(0u8, |acc, &b| acc ^ b);

    let mut cw = 0u8;
    for (i, &b) in bits7.iter().enumerate() {
        cw |= b << (7 - i);
    }
    cw |= p4; // p4 occupies bit 0 (the last codeword position)
    cw
}

fn encode_table() -> &'static [u8; 16] {
    static TABLE: OnceLock<[u8; 16]> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut t = [0u8; 16];
        for d in 0..16u8 {
            t[d as usize] = encode_codeword(d);
        }
        t
    })
}

/// Decoded result: the corrected 4-bit message plus whether correction was
/// possible (`false` means a detected-but-uncorrectable double error).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeResult {
    pub data: u8,
    pub correctable: bool,
}

fn decode_codeword(cw: u8) -> DecodeResult {
    let bit = |pos: usize| (cw >> (7 - pos)) & 1; // pos is 0-indexed position within the 8 bits
    let p1 = bit(0);
    let p2 = bit(1);
    let d0 = bit(2);
    let p3 = bit(3);
    let d1 = bit(4);
    let d2 = bit(5);
    let d3 = bit(6);
    let p4 = bit(7);

    let s1 = p1 ^ d0 ^ d1 ^ d3;
    let s2 = p2 ^ d0 ^ d2 ^ d3;
    let s3 = p3 ^ d1 ^ d2 ^ d3;
    let syndrome = s1 | (s2 << 1) | (s3 << 2);

    let overall = [p1, p2, d0, p3, d1, d2, d3, p4]
        .iter()
        .fold(0u8, |acc, &b| acc ^ b);

    let mut bits7 = [p1, p2, d0, p3, d1, d2, d3];

    let correctable = match (syndrome, overall) {
        (0, 0) => true, // no error
        (0, 1) => {
            // error confined to the overall parity bit; data unaffected
            true
        }
        (s, 1) => {
            // single correctable error at 1-origin Hamming position `s`
            bits7[(s - 1) as usize] ^= 1;
            true
        }
        (_, 0) => false, // syndrome nonzero but overall parity even: double error
        _ => unreachable!("overall is an XOR-fold of single bits, so it is always 0 or 1"),
    };

    let data = (bits7[2] << 3) | (bits7[4] << 2) | (bits7[5] << 1) | bits7[6];
    DecodeResult { data, correctable }
}

fn decode_table() -> &'static [DecodeResult; 256] {
    static TABLE: OnceLock<[DecodeResult; 256]> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut t = [DecodeResult {
            data: 0,
            correctable: false,
        }; 256];
        for cw in 0..256usize {
            t[cw] = decode_codeword(cw as u8);
        }
        t
    })
}

/// Encode a 4-bit message (MSB-first in the low nibble of `bits`, as
/// returned by slicing a bitstream into nibbles) into an 8-bit codeword,
/// expressed as 8 individual `0`/`1` bytes.
pub fn encode(bits: &[u8]) -> Vec<u8> {
    assert_eq!(bits.len(), 4, "Hamming(8,4) encodes exactly 4 bits");
    let d = bits.iter().fold(0u8, |acc, &b| (acc << 1) | (b & 1));
    let cw = encode_table()[d as usize];
    (0..8).rev().map(|i| (cw >> i) & 1).collect()
}

/// Decode an 8-bit codeword (as individual `0`/`1` bytes) back to 4 message
/// bits, correcting any single-bit error.
pub fn decode(bits: &[u8]) -> DecodeResult {
    assert_eq!(bits.len(), 8, "Hamming(8,4) decodes exactly 8 bits");
    let cw = bits.iter().fold(0u8, |acc, &b| (acc << 1) | (b & 1));
    let result = decode_table()[cw as usize];
    result
}

/// Decode into a 4-element `0`/`1` byte vector for ergonomic chaining with
/// other bitstream helpers.
pub fn decode_bits(bits: &[u8]) -> (Vec<u8>, bool) {
    let result = decode(bits);
    let out = (0..4).rev().map(|i| (result.data >> i) & 1).collect();
    (out, result.correctable)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_all_16_messages() {
        for d in 0u8..16 {
            let bits: Vec<u8> = (0..4).rev().map(|i| (d >> i) & 1).collect();
            let cw = encode(&bits);
            let (decoded, ok) = decode_bits(&cw);
            assert!(ok);
            assert_eq!(decoded, bits);
        }
    }

    #[test]
    fn corrects_any_single_bit_flip() {
        for d in 0u8..16 {
            let bits: Vec<u8> = (0..4).rev().map(|i| (d >> i) & 1).collect();
            let cw = encode(&bits);
            for flip in 0..8 {
                let mut corrupted = cw.clone();
                corrupted[flip] ^= 1;
                let (decoded, ok) = decode_bits(&corrupted);
                assert!(ok, "single flip at {flip} should be correctable");
                assert_eq!(decoded, bits, "failed to correct flip at {flip}");
            }
        }
    }

    #[test]
    fn detects_double_bit_errors_as_uncorrectable() {
        let bits = vec![1, 0, 1, 1];
        let cw = encode(&bits);
        let mut corrupted = cw.clone();
        corrupted[0] ^= 1;
        corrupted[5] ^= 1;
        let (_decoded, ok) = decode_bits(&corrupted);
        assert!(!ok, "double error should be flagged uncorrectable");
    }
}
