use ethereum_types::H256;
use once_cell::sync::Lazy;
use sha3::{Digest, Keccak256};

use crate::integer_ops::{word_to_be, Word};

/// Placeholder hash of padding nodes and omitted witnesses.
pub const ZERO_HASH: H256 = H256([0u8; 32]);

/// `keccak256("")`, the hash of an empty memory image.
pub static EMPTY_HASH: Lazy<H256> = Lazy::new(|| keccak(&[]));

pub fn keccak(data: &[u8]) -> H256 {
    H256::from_slice(&Keccak256::digest(data))
}

/// Hash of the 64-byte concatenation `left ‖ right`.
pub fn keccak_pair(left: &H256, right: &H256) -> H256 {
    let mut hasher = Keccak256::new();
    hasher.update(left.as_bytes());
    hasher.update(right.as_bytes());
    H256::from_slice(&hasher.finalize())
}

pub fn word_to_h256(value: Word) -> H256 {
    H256(word_to_be(value))
}

/// Every link of the stack hash chain over `elements`, starting with
/// `sibling` itself.
pub fn stack_hashes(elements: &[H256], sibling: H256) -> Vec<H256> {
    let mut hashes = Vec::with_capacity(elements.len() + 1);
    hashes.push(sibling);
    let mut last = sibling;
    for element in elements {
        last = keccak_pair(&last, element);
        hashes.push(last);
    }
    hashes
}

/// Last link of the stack hash chain.
pub fn stack_hash(elements: &[H256], sibling: H256) -> H256 {
    elements
        .iter()
        .fold(sibling, |last, element| keccak_pair(&last, element))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_hash() {
        assert_eq!(
            hex::encode(EMPTY_HASH.as_bytes()),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_stack_chain_is_incremental() {
        let elements = [H256::repeat_byte(1), H256::repeat_byte(2), H256::repeat_byte(3)];
        let full = stack_hashes(&elements, ZERO_HASH);
        assert_eq!(full.len(), 4);
        assert_eq!(full[0], ZERO_HASH);

        let tail = stack_hashes(&elements[2..], full[2]);
        assert_eq!(tail.last(), full.last());
        assert_eq!(stack_hash(&elements, ZERO_HASH), full[3]);
        assert_eq!(stack_hash(&[], ZERO_HASH), ZERO_HASH);
    }
}
