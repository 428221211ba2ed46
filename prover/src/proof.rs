//! Single-step proofs.
//!
//! A proof carries just enough of the pre-state to replay one disputed
//! instruction. Memory and calldata images are attached only when that
//! instruction touches them; otherwise their hashes stand in.

use berry_vm::trace::hashing::ZERO_HASH;
use ethereum_types::H256;

use crate::{
    error::{ProverError, Result},
    merkle::{MerkleNode, MerkleTree},
};

/// Commitments the verifier cannot recompute from the execution input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofHashes {
    /// Stack hash below the entries the step consumed.
    pub stack_hash: H256,
    /// Zero when the memory image is attached.
    pub mem_hash: H256,
    /// Zero when the calldata is attached.
    pub data_hash: H256,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecutionInput {
    pub data: Vec<u8>,
    /// Entries consumed by the step, bottom first.
    pub stack: Vec<H256>,
    pub mem: Vec<u8>,
    pub return_data: Vec<u8>,
    pub pc: usize,
    pub stack_size: usize,
    /// Memory size in words.
    pub mem_size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepProof {
    pub proofs: ProofHashes,
    pub execution_input: ExecutionInput,
}

impl StepProof {
    /// Builds the proof for the instruction committed to by `leaf`.
    pub fn build(tree: &MerkleTree, leaf: &MerkleNode) -> Result<Self> {
        let (pre, post) = leaf.states().ok_or(ProverError::NotALeaf)?;
        let (left, right) = match (tree.state(pre), tree.state(post)) {
            (Some(left), Some(right)) => (left, right),
            _ => {
                return Err(ProverError::StepOutOfRange {
                    slot: pre,
                    leaves: tree.steps().len(),
                })
            }
        };

        let memory_required = right.is_memory_required();
        let call_data_required = right.is_call_data_required();

        let proofs = ProofHashes {
            stack_hash: right.compact_stack_hash,
            mem_hash: if memory_required {
                ZERO_HASH
            } else {
                left.mem_hash
            },
            data_hash: if call_data_required {
                ZERO_HASH
            } else {
                tree.call_data_hash()
            },
        };

        let execution_input = ExecutionInput {
            data: if call_data_required {
                tree.call_data().to_vec()
            } else {
                Vec::new()
            },
            stack: right.compact_stack.to_vec(),
            mem: if memory_required {
                left.mem.to_vec()
            } else {
                Vec::new()
            },
            return_data: left.return_data.clone(),
            pc: left.pc,
            stack_size: left.stack_size,
            mem_size: left.mem_size,
        };

        Ok(Self {
            proofs,
            execution_input,
        })
    }
}

impl MerkleTree {
    /// Single-step proof for step `slot`.
    pub fn construct_proof(&self, slot: usize) -> Result<StepProof> {
        StepProof::build(self, self.leaf(slot)?)
    }
}

#[cfg(test)]
mod tests {
    use berry_vm::{RunArgs, TraceRecorder};

    use super::*;

    fn commit(code: Vec<u8>, call_data: Vec<u8>) -> MerkleTree {
        let trace = TraceRecorder::default().run(RunArgs::new(code).with_call_data(call_data));
        MerkleTree::from_trace(trace).unwrap()
    }

    #[test]
    fn test_selective_inclusion() {
        // PUSH1 0x2a, PUSH1 0, MSTORE, PUSH1 0, CALLDATALOAD, ADD
        let tree = commit(
            vec![0x60, 0x2a, 0x60, 0x00, 0x52, 0x60, 0x00, 0x35, 0x01],
            vec![0x11; 4],
        );

        let push = tree.construct_proof(1).unwrap();
        assert!(push.execution_input.mem.is_empty());
        assert!(push.execution_input.data.is_empty());
        assert_eq!(push.proofs.data_hash, tree.call_data_hash());
        assert_eq!(push.proofs.mem_hash, tree.state(1).unwrap().mem_hash);
        assert!(push.execution_input.stack.is_empty());

        let mstore = tree.construct_proof(2).unwrap();
        assert_eq!(mstore.proofs.mem_hash, ZERO_HASH);
        assert_eq!(mstore.execution_input.stack.len(), 2);
        assert_eq!(mstore.execution_input.pc, 4);
        assert_eq!(mstore.execution_input.stack_size, 2);
        assert_eq!(mstore.execution_input.mem_size, 0);
        assert!(mstore.execution_input.mem.is_empty());

        let load = tree.construct_proof(4).unwrap();
        assert_eq!(load.proofs.data_hash, ZERO_HASH);
        assert_eq!(load.execution_input.data, vec![0x11; 4]);
        assert_eq!(load.proofs.mem_hash, tree.state(4).unwrap().mem_hash);
        assert_eq!(load.execution_input.mem_size, 1);
    }

    #[test]
    fn test_memory_image_comes_from_pre_state() {
        // PUSH1 0x2a, PUSH1 0, MSTORE, PUSH1 0, MLOAD
        let tree = commit(vec![0x60, 0x2a, 0x60, 0x00, 0x52, 0x60, 0x00, 0x51], Vec::new());
        let proof = tree.construct_proof(4).unwrap();
        assert_eq!(proof.execution_input.mem.len(), 32);
        assert_eq!(proof.execution_input.mem[31], 0x2a);
        assert_eq!(
            proof.proofs.stack_hash,
            tree.state(5).unwrap().compact_stack_hash
        );
    }

    #[test]
    fn test_first_step_uses_initial_state() {
        let tree = commit(vec![0x60, 0x01], Vec::new());
        let proof = tree.construct_proof(0).unwrap();
        assert_eq!(proof.execution_input, ExecutionInput::default());
    }

    #[test]
    fn test_inner_node_is_rejected() {
        let tree = commit(vec![0x60, 0x01, 0x60, 0x02], Vec::new());
        assert_eq!(
            StepProof::build(&tree, tree.root()).unwrap_err(),
            ProverError::NotALeaf
        );
        assert!(tree.construct_proof(9).is_err());
    }
}
