use ripemd160::Digest as _;
use sha2::Digest as _;

use super::{left_pad_word, Precompile, PrecompileOutput};

#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256;

impl Precompile for Sha256 {
    fn name(&self) -> &'static str {
        "SHA256"
    }

    fn call(&self, input: &[u8]) -> PrecompileOutput {
        PrecompileOutput::ok(sha2::Sha256::digest(input).to_vec())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Ripemd160;

impl Precompile for Ripemd160 {
    fn name(&self) -> &'static str {
        "RIPEMD160"
    }

    fn call(&self, input: &[u8]) -> PrecompileOutput {
        let mut hasher = ripemd160::Ripemd160::new();
        hasher.update(input);
        PrecompileOutput::ok(left_pad_word(&hasher.finalize()))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Precompile for Identity {
    fn name(&self) -> &'static str {
        "IDENTITY"
    }

    fn call(&self, input: &[u8]) -> PrecompileOutput {
        PrecompileOutput::ok(input.to_vec())
    }
}
