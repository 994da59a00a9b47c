//! Generic sum-product (belief propagation) LDPC decoder, shared by the
//! LDPC(96,50) and FT8 LDPC(174,91) codecs.
//!
//! LLR convention: `l = log(P(bit=0)/P(bit=1))`, positive meaning the bit is
//! more likely `0`. Two message tensors are kept dense (`m x n`, `m` checks
//! by `n` bits) rather than sparse, since both codes here are small enough
//! that the simplicity is worth more than the memory it costs.

/// A parity-check matrix described by which bits each check touches, and
/// which checks each bit participates in (the transpose view). Both are
/// derived once from the dense `0/1` matrix and reused across decode calls.
#[derive(Debug, Clone)]
pub struct Tanner {
    pub checks: usize,
    pub bits: usize,
    /// `check_bits[j]` lists the bit indices participating in check `j`.
    pub check_bits: Vec<Vec<usize>>,
    /// `bit_checks[i]` lists the check indices bit `i` participates in.
    pub bit_checks: Vec<Vec<usize>>,
}

impl Tanner {
    /// Build from an explicit list of which bits each check touches
    /// (already 0-origin, sentinels already stripped), for codes whose
    /// canonical tables are given as a jagged check->bits list rather than
    /// a dense matrix (e.g. FT8's `Nm`).
    pub fn from_sparse(check_bits: Vec<Vec<usize>>, bits: usize) -> Self {
        let checks = check_bits.len();
        let mut bit_checks = vec![Vec::new(); bits];
        for (j, row) in check_bits.iter().enumerate() {
            for &i in row {
                bit_checks[i].push(j);
            }
        }
        Self {
            checks,
            bits,
            check_bits,
            bit_checks,
        }
    }

    pub fn from_dense(h: &[Vec<u8>]) -> Self {
        let checks = h.len();
        let bits = h[0].len();
        let mut check_bits = vec![Vec::new(); checks];
        let mut bit_checks = vec![Vec::new(); bits];
        for (j, row) in h.iter().enumerate() {
            for (i, &v) in row.iter().enumerate() {
                if v != 0 {
                    check_bits[j].push(i);
                    bit_checks[i].push(j);
                }
            }
        }
        Self {
            checks,
            bits,
            check_bits,
            bit_checks,
        }
    }

    /// `H . hat == 0 (mod 2)` for the given hard bit decisions.
    pub fn parity_satisfied(&self, hard: &[u8]) -> bool {
        self.check_bits
            .iter()
            .all(|bits| bits.iter().fold(0u8, |acc, &i| acc ^ hard[i]) == 0)
    }
}

/// Outcome of a bounded belief-propagation decode.
#[derive(Debug, Clone)]
pub struct BpResult {
    pub success: bool,
    pub hard_bits: Vec<u8>,
    pub posterior_llr: Vec<f64>,
    pub iterations: usize,
}

const TANH_CLAMP: f64 = 0.99;

/// Run sum-product decoding on channel LLRs `lc` against `tanner`, for up
/// to `max_iter` iterations, stopping early once the parity check passes.
pub fn decode(tanner: &Tanner, lc: &[f64], max_iter: usize) -> BpResult {
    let m = tanner.checks;
    let n = tanner.bits;
    assert_eq!(lc.len(), n);

    // M[j][i]: bit-to-check message. E[j][i]: check-to-bit message.
    let mut m_msg = vec![vec![0.0f64; n]; m];
    let mut e_msg = vec![vec![0.0f64; n]; m];
    let mut posterior = lc.to_vec();
    let mut hard = hard_decision(&posterior);
    let mut iterations = 0;

    for iter in 0..max_iter {
        iterations = iter + 1;

        // Horizontal: check -> bit.
        for (j, bits) in tanner.check_bits.iter().enumerate() {
            for &i in bits {
                let mut product = 1.0f64;
                for &k in bits {
                    if k != i {
                        let source = if iter == 0 { lc[k] } else { m_msg[j][k] };
                        product *= (0.5 * source).tanh();
                    }
                }
                product = product.clamp(-TANH_CLAMP, TANH_CLAMP);
                e_msg[j][i] = ((1.0 + product) / (1.0 - product)).ln();
            }
        }

        // Vertical: bit -> check, plus posterior LLR.
        for (i, checks) in tanner.bit_checks.iter().enumerate() {
            for &j in checks {
                let mut acc = lc[i];
                for &k in checks {
                    if k != j {
                        acc += e_msg[k][i];
                    }
                }
                m_msg[j][i] = acc;
            }
            posterior[i] = lc[i] + checks.iter().map(|&j| e_msg[j][i]).sum::<f64>();
        }

        hard = hard_decision(&posterior);
        if tanner.parity_satisfied(&hard) {
            return BpResult {
                success: true,
                hard_bits: hard,
                posterior_llr: posterior,
                iterations,
            };
        }
    }

    BpResult {
        success: false,
        hard_bits: hard,
        posterior_llr: posterior,
        iterations,
    }
}

fn hard_decision(llr: &[f64]) -> Vec<u8> {
    llr.iter().map(|&l| if l <= 0.0 { 1 } else { 0 }).collect()
}
