use sha3::{Digest, Keccak256};

use super::{left_pad_word, right_pad, Precompile, PrecompileOutput};

/// Recovers the signer address of `(hash, v, r, s)`.
///
/// An unrecoverable signature is not an exceptional result: the call
/// succeeds with empty output.
#[derive(Debug, Clone, Copy, Default)]
pub struct EcRecover;

impl EcRecover {
    fn recover(input: &[u8; 128]) -> Option<[u8; 20]> {
        let (hash, rest) = input.split_at(32);
        let (v, signature) = rest.split_at(32);

        if v[..31].iter().any(|byte| *byte != 0) {
            return None;
        }
        let recovery_id = v[31].checked_sub(27)?;

        let mut message = [0u8; 32];
        message.copy_from_slice(hash);
        let message = libsecp256k1::Message::parse(&message);
        let signature = libsecp256k1::Signature::parse_standard_slice(signature).ok()?;
        let recovery_id = libsecp256k1::RecoveryId::parse(recovery_id).ok()?;
        let public_key = libsecp256k1::recover(&message, &signature, &recovery_id).ok()?;

        let digest = Keccak256::digest(&public_key.serialize()[1..65]);
        let mut address = [0u8; 20];
        address.copy_from_slice(&digest[12..]);
        Some(address)
    }
}

impl Precompile for EcRecover {
    fn name(&self) -> &'static str {
        "ECRECOVER"
    }

    fn call(&self, input: &[u8]) -> PrecompileOutput {
        let mut padded = [0u8; 128];
        padded.copy_from_slice(&right_pad(input, 128));
        match Self::recover(&padded) {
            Some(address) => PrecompileOutput::ok(left_pad_word(&address)),
            None => PrecompileOutput::ok(Vec::new()),
        }
    }
}
