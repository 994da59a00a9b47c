//! Extended binary Golay(24,12): a rate-1/2 code correcting up to three
//! bit errors per 24-bit codeword.
//!
//! The generator is `G = [I | B]` for the fixed 12x12 matrix `B` below (`B`
//! is symmetric, `B = B^T`, a property the decoder below relies on to
//! reuse `B`'s rows as both its rows and columns). The parity-check matrix
//! is `H = [B | I]`. Decoding walks the standard weight-tree for this
//! construction: compute the syndrome `s1 = c * H^T`; if its weight is
//! already low enough the error pattern is the syndrome itself; otherwise
//! search each column of `B` for a low-weight combination, falling back to
//! a second syndrome `s2 = s1 * B` when the first search comes up empty.

const N: usize = 12;

#[rustfmt::skip]
const B: [[u8; N]; N] = [
    [1,1,0,1,1,1,0,0,0,1,0,1],
    [1,0,1,1,1,0,0,0,1,0,1,1],
    [0,1,1,1,0,0,0,1,0,1,1,1],
    [1,1,1,0,0,0,1,0,1,1,0,1],
    [1,1,0,0,0,1,0,1,1,0,1,1],
    [1,0,0,0,1,0,1,1,0,1,1,1],
    [0,0,0,1,0,1,1,0,1,1,1,1],
    [0,0,1,0,1,1,0,1,1,1,0,1],
    [0,1,0,1,1,0,1,1,1,0,0,1],
    [1,0,1,1,0,1,1,1,0,0,0,1],
    [0,1,1,0,1,1,1,0,0,0,1,1],
    [1,1,1,1,1,1,1,1,1,1,1,0],
];

fn xor_rows(a: &[u8; N], b: &[u8; N]) -> [u8; N] {
    let mut out = [0u8; N];
    for i in 0..N {
        out[i] = a[i] ^ b[i];
    }
    out
}

fn weight(v: &[u8; N]) -> u32 {
    v.iter().map(|&b| b as u32).sum()
}

/// Encode 12 message bits into a 24-bit codeword: `data ++ (data * B)`.
pub fn encode(data: &[u8]) -> Vec<u8> {
    assert_eq!(data.len(), N, "Golay(24,12) encodes exactly 12 bits");

    let mut parity = [0u8; N];
    for col in 0..N {
        let mut acc = 0u8;
        for row in 0..N {
            acc ^= data[row] & B[row][col];
        }
        parity[col] = acc;
    }

    let mut cw = Vec::with_capacity(24);
    cw.extend_from_slice(data);
    cw.extend_from_slice(&parity);
    cw
}

/// Decoded result: the corrected 12-bit message, and whether the error
/// pattern found was believed correctable (up to distance-7 guarantees
/// correcting 3 errors; beyond that this may still "succeed" on an
/// incorrect pattern, as with any bounded-distance decoder).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeResult {
    pub data: Vec<u8>,
    pub correctable: bool,
}

fn syndrome1(received: &[u8]) -> [u8; N] {
    // s1 = received * H^T, H = [B | I] (12x24), so s1[k] = dot(recv[0..12], B[k]) xor recv[12+k]
    let mut s = [0u8; N];
    for k in 0..N {
        let mut acc = 0u8;
        for i in 0..N {
            acc ^= received[i] & B[k][i];
        }
        acc ^= received[N + k];
        s[k] = acc;
    }
    s
}

fn mul_by_b(v: &[u8; N]) -> [u8; N] {
    let mut out = [0u8; N];
    for col in 0..N {
        let mut acc = 0u8;
        for row in 0..N {
            acc ^= v[row] & B[row][col];
        }
        out[col] = acc;
    }
    out
}

/// Decode a 24-bit received word, correcting up to 3 bit errors.
pub fn decode(received: &[u8]) -> DecodeResult {
    assert_eq!(received.len(), 24, "Golay(24,12) decodes exactly 24 bits");

    let s1 = syndrome1(received);
    let (error, correctable) = if weight(&s1) <= 3 {
        let mut error = [0u8; 24];
        error[N..].copy_from_slice(&s1);
        (error, true)
    } else if let Some((j, sum_vec)) = best_low_weight_column(&s1) {
        let mut error = [0u8; 24];
        error[j] = 1;
        error[N..].copy_from_slice(&sum_vec);
        (error, true)
    } else {
        let s2 = mul_by_b(&s1);
        if weight(&s2) <= 3 {
            let mut error = [0u8; 24];
            error[..N].copy_from_slice(&s2);
            (error, true)
        } else if let Some((j, sum_vec)) = best_low_weight_column(&s2) {
            let mut error = [0u8; 24];
            error[..N].copy_from_slice(&sum_vec);
            error[N + j] = 1;
            (error, true)
        } else {
            ([0u8; 24], false)
        }
    };

    let corrected: Vec<u8> = received.iter().zip(error.iter()).map(|(&r, &e)| r ^ e).collect();
    DecodeResult {
        data: corrected[..N].to_vec(),
        correctable,
    }
}

fn best_low_weight_column(s: &[u8; N]) -> Option<(usize, [u8; N])> {
    let mut best: Option<(usize, [u8; N], u32)> = None;
    for j in 0..N {
        let sum_vec = xor_rows(s, &B[j]);
        let w = weight(&sum_vec);
        if w <= 2 {
            match &best {
                Some((_, _, best_w)) if *best_w <= w => {}
                _ => best = Some((j, sum_vec, w)),
            }
        }
    }
    best.map(|(j, v, _)| (j, v))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits_from_u16(value: u16, n: usize) -> Vec<u8> {
        (0..n).rev().map(|i| ((value >> i) & 1) as u8).collect()
    }

    #[test]
    fn b_matrix_is_symmetric() {
        for i in 0..N {
            for j in 0..N {
                assert_eq!(B[i][j], B[j][i], "B not symmetric at ({i},{j})");
            }
        }
    }

    #[test]
    fn round_trip_clean_channel() {
        for value in [0u16, 1, 0xABC, 0xFFF, 0x555] {
            let data = bits_from_u16(value, 12);
            let cw = encode(&data);
            let result = decode(&cw);
            assert!(result.correctable);
            assert_eq!(result.data, data);
        }
    }

    #[test]
    fn corrects_up_to_three_bit_errors() {
        let data = bits_from_u16(0xA5A, 12);
        let cw = encode(&data);
        let mut corrupted = cw.clone();
        corrupted[0] ^= 1;
        corrupted[10] ^= 1;
        corrupted[20] ^= 1;

        let result = decode(&corrupted);
        assert!(result.correctable);
        assert_eq!(result.data, data);
    }

    #[test]
    fn corrects_three_bit_errors_for_0x5a3() {
        let data = bits_from_u16(0x5A3, 12);
        let cw = encode(&data);
        let mut corrupted = cw.clone();
        corrupted[2] ^= 1;
        corrupted[9] ^= 1;
        corrupted[15] ^= 1;

        let result = decode(&corrupted);
        assert!(result.correctable);
        assert_eq!(result.data, data);
    }

    #[test]
    fn codeword_satisfies_parity_check_when_clean() {
        let data = bits_from_u16(0x123, 12);
        let cw = encode(&data);
        let s1 = syndrome1(&cw);
        assert_eq!(weight(&s1), 0);
    }
}
