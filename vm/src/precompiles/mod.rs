//! Native contracts reachable through `CALL`/`STATICCALL` at the reserved
//! addresses `0x01`..`0x08`.

mod bn128;
mod ecrecover;
mod hashes;
mod modexp;

use ethereum_types::H160;

use crate::integer_ops::Word;

pub use self::{
    bn128::{Bn128Add, Bn128Mul, Bn128Pairing},
    ecrecover::EcRecover,
    hashes::{Identity, Ripemd160, Sha256},
    modexp::Modexp,
};

/// Output of a precompile invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrecompileOutput {
    pub return_value: Vec<u8>,
    /// Pushed as the call's status word.
    pub success: bool,
}

impl PrecompileOutput {
    pub fn ok(return_value: Vec<u8>) -> Self {
        Self {
            return_value,
            success: true,
        }
    }

    pub fn failure() -> Self {
        Self::default()
    }
}

pub trait Precompile: Send + Sync {
    fn name(&self) -> &'static str;

    fn call(&self, input: &[u8]) -> PrecompileOutput;
}

const LAST_PRECOMPILE: u64 = 8;

/// Returns the built-in precompile registered at `address`, if any.
pub fn builtin(address: H160) -> Option<&'static dyn Precompile> {
    match address {
        a if a == hash(1) => Some(&EcRecover),
        a if a == hash(2) => Some(&Sha256),
        a if a == hash(3) => Some(&Ripemd160),
        a if a == hash(4) => Some(&Identity),
        a if a == hash(5) => Some(&Modexp),
        a if a == hash(6) => Some(&Bn128Add),
        a if a == hash(7) => Some(&Bn128Mul),
        a if a == hash(8) => Some(&Bn128Pairing),
        _ => None,
    }
}

/// Whether a raw call target word names a reserved precompile address. The
/// whole word is compared, so high bits above the 160-bit address exclude it.
pub fn is_builtin(target: Word) -> bool {
    !target.is_zero() && target <= Word::from(LAST_PRECOMPILE)
}

fn hash(index: u64) -> H160 {
    H160::from_low_u64_be(index)
}

/// Copies `input` into a buffer of exactly `len` bytes, padding with zeros
/// on the right.
pub(crate) fn right_pad(input: &[u8], len: usize) -> Vec<u8> {
    let mut padded = vec![0u8; len];
    let available = input.len().min(len);
    padded[..available].copy_from_slice(&input[..available]);
    padded
}

/// Left pads `bytes` to a 32-byte word.
pub(crate) fn left_pad_word(bytes: &[u8]) -> Vec<u8> {
    let mut word = vec![0u8; 32];
    word[32 - bytes.len()..].copy_from_slice(bytes);
    word
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitelist() {
        assert!(builtin(H160::zero()).is_none());
        assert!(builtin(hash(9)).is_none());
        for index in 1..=8 {
            assert!(is_builtin(Word::from(index)));
            assert!(builtin(hash(index)).is_some());
        }
        assert_eq!(builtin(hash(4)).map(|p| p.name()), Some("IDENTITY"));
    }

    #[test]
    fn test_whitelist_compares_full_word() {
        assert!(!is_builtin(Word::zero()));
        assert!(!is_builtin(Word::from(9)));
        assert!(!is_builtin((Word::one() << 160) + Word::from(4)));
    }

    #[test]
    fn test_identity() {
        let output = Identity.call(b"berry");
        assert_eq!(output, PrecompileOutput::ok(b"berry".to_vec()));
    }
}
