//! Flat calldata framing of a [`StepProof`] for the verifier's proof
//! submission entry point.
//!
//! Layout: `selector ‖ disputeId ‖ dataHash ‖ stackHash ‖ memHash ‖
//! stackSize ‖ memSize ‖ pc ‖ len(data) ‖ data ‖ len(stack) ‖ stack ‖
//! memWords ‖ mem ‖ len(returnData) ‖ returnData`, every integer a 32-byte
//! big-endian word.

use berry_vm::{integer_ops::word_to_be, Word};
use ethereum_types::H256;

use crate::{
    error::{ProverError, Result},
    proof::{ExecutionInput, ProofHashes, StepProof},
};

pub const SUBMIT_PROOF_SELECTOR: [u8; 4] = [0xc2, 0x01, 0xbe, 0x23];

const WORD: usize = 32;

impl StepProof {
    pub fn encode(&self, dispute_id: &H256) -> Vec<u8> {
        let input = &self.execution_input;
        let mut out = Vec::with_capacity(
            4 + WORD * (11 + input.stack.len())
                + input.data.len()
                + input.mem.len()
                + input.return_data.len(),
        );

        out.extend_from_slice(&SUBMIT_PROOF_SELECTOR);
        out.extend_from_slice(dispute_id.as_bytes());
        out.extend_from_slice(self.proofs.data_hash.as_bytes());
        out.extend_from_slice(self.proofs.stack_hash.as_bytes());
        out.extend_from_slice(self.proofs.mem_hash.as_bytes());
        put_usize(&mut out, input.stack_size);
        put_usize(&mut out, input.mem_size);
        put_usize(&mut out, input.pc);

        put_usize(&mut out, input.data.len());
        out.extend_from_slice(&input.data);
        put_usize(&mut out, input.stack.len());
        for entry in &input.stack {
            out.extend_from_slice(entry.as_bytes());
        }
        put_usize(&mut out, input.mem.len() / WORD);
        out.extend_from_slice(&input.mem);
        put_usize(&mut out, input.return_data.len());
        out.extend_from_slice(&input.return_data);

        out
    }

    /// Inverse of [`Self::encode`]; returns the dispute id and the proof.
    pub fn decode(bytes: &[u8]) -> Result<(H256, Self)> {
        let mut reader = Reader { bytes, pos: 0 };

        if reader.take(4)? != SUBMIT_PROOF_SELECTOR {
            return Err(ProverError::Decode("unknown selector".into()));
        }
        let dispute_id = reader.hash()?;
        let data_hash = reader.hash()?;
        let stack_hash = reader.hash()?;
        let mem_hash = reader.hash()?;
        let stack_size = reader.usize()?;
        let mem_size = reader.usize()?;
        let pc = reader.usize()?;

        let data_len = reader.usize()?;
        let data = reader.take(data_len)?.to_vec();
        let stack_len = reader.usize()?;
        let stack = (0..stack_len)
            .map(|_| reader.hash())
            .collect::<Result<Vec<_>>>()?;
        let mem_words = reader.usize()?;
        let mem_len = mem_words
            .checked_mul(WORD)
            .ok_or_else(|| ProverError::Decode("memory size overflows".into()))?;
        let mem = reader.take(mem_len)?.to_vec();
        let return_len = reader.usize()?;
        let return_data = reader.take(return_len)?.to_vec();

        if reader.pos != bytes.len() {
            return Err(ProverError::Decode(format!(
                "{} trailing bytes",
                bytes.len() - reader.pos
            )));
        }

        let proof = Self {
            proofs: ProofHashes {
                stack_hash,
                mem_hash,
                data_hash,
            },
            execution_input: ExecutionInput {
                data,
                stack,
                mem,
                return_data,
                pc,
                stack_size,
                mem_size,
            },
        };
        Ok((dispute_id, proof))
    }
}

fn put_usize(out: &mut Vec<u8>, value: usize) {
    out.extend_from_slice(&word_to_be(Word::from(value)));
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| {
                ProverError::Decode(format!("truncated input at byte {}", self.pos))
            })?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn hash(&mut self) -> Result<H256> {
        self.take(WORD).map(H256::from_slice)
    }

    fn usize(&mut self) -> Result<usize> {
        let word = Word::from_big_endian(self.take(WORD)?);
        if word > Word::from(usize::MAX) {
            return Err(ProverError::Decode(format!("length {word} out of range")));
        }
        Ok(word.as_usize())
    }
}
