//! Bit-reversal interleaver.
//!
//! Spreads burst errors across the codeword by permuting bit positions
//! through an 8-bit reversal, keeping only the indices that fall within the
//! requested range `n`. The permutation is a bijection on `0..n` by
//! construction, which the round-trip test below checks directly.

fn reverse_byte(b: u8) -> u8 {
    b.reverse_bits()
}

/// Build the bit-reversal permutation over `0..n` (`n <= 256`): position
/// `i` in the interleaved stream pulls from `permutation[i]` in the
/// original stream.
pub fn bit_reversal_permutation(n: usize) -> Vec<usize> {
    assert!(n <= 256, "bit-reversal table only covers 8-bit indices");
    (0u16..256)
        .map(|i| reverse_byte(i as u8) as usize)
        .filter(|&idx| idx < n)
        .collect()
}

/// Apply the forward interleaver: `output[i] = input[permutation[i]]`.
pub fn interleave(bits: &[u8]) -> Vec<u8> {
    let perm = bit_reversal_permutation(bits.len());
    perm.iter().map(|&idx| bits[idx]).collect()
}

/// Apply the inverse interleaver, undoing `interleave`.
pub fn deinterleave(bits: &[u8]) -> Vec<u8> {
    let perm = bit_reversal_permutation(bits.len());
    let mut out = vec![0u8; bits.len()];
    for (i, &idx) in perm.iter().enumerate() {
        out[idx] = bits[i];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permutation_is_a_bijection() {
        let perm = bit_reversal_permutation(96);
        let mut seen = vec![false; 96];
        for &p in &perm {
            assert!(!seen[p], "index {p} appeared twice");
            seen[p] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn interleave_deinterleave_round_trip() {
        let bits: Vec<u8> = (0..174).map(|i| (i % 2) as u8).collect();
        let out = deinterleave(&interleave(&bits));
        assert_eq!(out, bits);
    }

    #[test]
    fn interleave_deinterleave_round_trip_for_ldpc96_block() {
        let bits: Vec<u8> = (0..96).map(|i| ((i * 7) % 2) as u8).collect();
        let out = deinterleave(&interleave(&bits));
        assert_eq!(out, bits);
    }

    #[test]
    fn small_range_matches_expected_order() {
        // Reversing an 8-bit index and keeping those under 8 produces the
        // classic radix-2 bit-reversal order for n=8.
        let perm = bit_reversal_permutation(8);
        assert_eq!(perm, vec![0, 4, 2, 6, 1, 5, 3, 7]);
    }
}
