//! Forward error correction codecs, dispatched by [`FecScheme`].
//!
//! Block codes (Hamming, Golay) correct hard bit decisions; the two LDPC
//! codes decode soft log-likelihood ratios via [`ldpc_bp`]. [`encode`] and
//! [`decode`] give the orchestrator one call site per direction regardless
//! of which scheme is configured, converting between representations where
//! the scheme requires it.

pub mod ft8;
pub mod golay;
pub mod hamming;
pub mod ldpc96;
pub mod ldpc_bp;

use crate::config::FecScheme;

/// Outcome of decoding one FEC block.
#[derive(Debug, Clone)]
pub struct CodecResult {
    pub data: Vec<u8>,
    pub success: bool,
}

/// Encode one message block (exactly `scheme.message_bits()` bits) into one
/// codeword block (`scheme.codeword_bits()` bits). `FecScheme::None` is the
/// identity.
pub fn encode(scheme: FecScheme, message: &[u8]) -> Vec<u8> {
    assert_eq!(message.len(), scheme.message_bits());
    match scheme {
        FecScheme::None => message.to_vec(),
        FecScheme::Hamming84 => hamming::encode(message),
        FecScheme::Golay24 => golay::encode(message),
        FecScheme::Ldpc96 => ldpc96::encode(message),
        FecScheme::Ft8Ldpc174 => {
            let crc = ft8::crc14(message);
            let mut message91 = message.to_vec();
            message91.extend(crc);
            ft8::encode(&message91)
        }
    }
}

/// Decode one hard-bit codeword block (Hamming and Golay only; `None` is
/// the identity). Panics if called with an LLR-only scheme — use
/// [`decode_soft`] for those.
pub fn decode_hard(scheme: FecScheme, received: &[u8]) -> CodecResult {
    if scheme != FecScheme::None {
        assert_eq!(received.len(), scheme.codeword_bits());
    }
    match scheme {
        FecScheme::None => CodecResult {
            data: received.to_vec(),
            success: true,
        },
        FecScheme::Hamming84 => {
            let result = hamming::decode(received);
            CodecResult {
                data: (0..4).rev().map(|i| (result.data >> i) & 1).collect(),
                success: result.correctable,
            }
        }
        FecScheme::Golay24 => {
            let result = golay::decode(received);
            CodecResult {
                data: result.data,
                success: result.correctable,
            }
        }
        FecScheme::Ldpc96 | FecScheme::Ft8Ldpc174 => {
            panic!("{scheme:?} requires soft decoding; use decode_soft")
        }
    }
}

/// Decode one codeword block from channel LLRs (LDPC96 and FT8 only).
pub fn decode_soft(scheme: FecScheme, llr: &[f64], max_iter: usize) -> CodecResult {
    match scheme {
        FecScheme::Ldpc96 => {
            let (success, hard) = ldpc96::decode(llr);
            CodecResult {
                data: ldpc96::data_from_code(&hard),
                success,
            }
        }
        FecScheme::Ft8Ldpc174 => {
            let result = ft8::decode(llr, max_iter);
            let message91 = ft8::extract_message(&result.hard_bits);
            let crc_ok = ft8::check_crc14(&message91);
            CodecResult {
                data: message91[..ft8::PAYLOAD_BITS].to_vec(),
                success: result.success && crc_ok,
            }
        }
        FecScheme::None | FecScheme::Hamming84 | FecScheme::Golay24 => {
            panic!("{scheme:?} decodes hard bits; use decode_hard")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hamming_round_trips_through_the_dispatcher() {
        let message = vec![1, 0, 1, 1];
        let cw = encode(FecScheme::Hamming84, &message);
        let result = decode_hard(FecScheme::Hamming84, &cw);
        assert!(result.success);
        assert_eq!(result.data, message);
    }

    #[test]
    fn golay_round_trips_through_the_dispatcher() {
        let message: Vec<u8> = (0..12).map(|i| (i % 2) as u8).collect();
        let cw = encode(FecScheme::Golay24, &message);
        let result = decode_hard(FecScheme::Golay24, &cw);
        assert!(result.success);
        assert_eq!(result.data, message);
    }

    #[test]
    fn ldpc96_round_trips_through_the_dispatcher() {
        let message: Vec<u8> = (0..50).map(|i| (i % 4 == 0) as u8).collect();
        let cw = encode(FecScheme::Ldpc96, &message);
        let llr: Vec<f64> = cw.iter().map(|&b| if b == 0 { 5.0 } else { -5.0 }).collect();
        let result = decode_soft(FecScheme::Ldpc96, &llr, 200);
        assert!(result.success);
        assert_eq!(result.data, message);
    }

    #[test]
    fn ft8_round_trips_through_the_dispatcher() {
        let message: Vec<u8> = (0..77).map(|i| (i % 7 == 0) as u8).collect();
        let cw = encode(FecScheme::Ft8Ldpc174, &message);
        let llr: Vec<f64> = cw.iter().map(|&b| if b == 0 { 4.6 } else { -4.6 }).collect();
        let result = decode_soft(FecScheme::Ft8Ldpc174, &llr, 4 * 17);
        assert!(result.success);
        assert_eq!(result.data, message);
    }

    #[test]
    fn none_scheme_is_the_identity() {
        let message = vec![1, 0, 1, 0, 1];
        let cw = encode(FecScheme::None, &message);
        assert_eq!(cw, message);
        let result = decode_hard(FecScheme::None, &cw);
        assert_eq!(result.data, message);
    }
}
