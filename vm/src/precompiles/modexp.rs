use num_bigint::BigUint;
use num_traits::{One, Zero};

use super::{right_pad, Precompile, PrecompileOutput};

/// Arbitrary precision `base^exp % modulus`.
///
/// Input layout: three 32-byte big-endian lengths followed by the base,
/// exponent and modulus bytes. Missing input bytes read as zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct Modexp;

// Lengths beyond this cannot be backed by real input and are refused.
const MAX_OPERAND_LEN: usize = 1 << 20;

fn read_len(header: &[u8]) -> Option<usize> {
    if header[..24].iter().any(|byte| *byte != 0) {
        return None;
    }
    let mut low = [0u8; 8];
    low.copy_from_slice(&header[24..32]);
    let len = u64::from_be_bytes(low) as usize;
    (len <= MAX_OPERAND_LEN).then_some(len)
}

impl Precompile for Modexp {
    fn name(&self) -> &'static str {
        "MODEXP"
    }

    fn call(&self, input: &[u8]) -> PrecompileOutput {
        let header = right_pad(input, 96);
        let lens = (
            read_len(&header[0..32]),
            read_len(&header[32..64]),
            read_len(&header[64..96]),
        );
        let (Some(base_len), Some(exp_len), Some(mod_len)) = lens else {
            return PrecompileOutput::failure();
        };

        let body = input.get(96..).unwrap_or_default();
        let operands = right_pad(body, base_len + exp_len + mod_len);
        let (base, rest) = operands.split_at(base_len);
        let (exponent, modulus) = rest.split_at(exp_len);

        if mod_len == 0 {
            return PrecompileOutput::ok(Vec::new());
        }

        let base = BigUint::from_bytes_be(base);
        let exponent = BigUint::from_bytes_be(exponent);
        let modulus = BigUint::from_bytes_be(modulus);

        let result = if modulus.is_zero() || modulus.is_one() {
            BigUint::zero()
        } else {
            base.modpow(&exponent, &modulus)
        };

        let bytes = result.to_bytes_be();
        let mut output = vec![0u8; mod_len];
        if !result.is_zero() {
            output[mod_len - bytes.len()..].copy_from_slice(&bytes);
        }
        PrecompileOutput::ok(output)
    }
}
