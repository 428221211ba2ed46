use berry_prover::{MerkleNode, MerkleTree, StepProof};
use berry_vm::{trace::hashing::keccak, RunArgs, TraceRecorder};
use proptest::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

fn commit(code: Vec<u8>, call_data: Vec<u8>) -> MerkleTree {
    let trace = TraceRecorder::default().run(RunArgs::new(code).with_call_data(call_data));
    MerkleTree::from_trace(trace).unwrap()
}

/// `n` pushes followed by `MSTORE8`s of the pushed values and a `RETURN` of
/// the written bytes.
fn returning_program(values: &[u8]) -> Vec<u8> {
    let mut code = Vec::new();
    for (i, value) in values.iter().enumerate() {
        code.extend_from_slice(&[0x60, *value, 0x60, i as u8, 0x53]);
    }
    code.extend_from_slice(&[0x60, values.len() as u8, 0x60, 0x00, 0xf3]);
    code
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn test_result_proof_verifies(values in prop::collection::vec(any::<u8>(), 1..12)) {
        let code = returning_program(&values);
        let trace = TraceRecorder::default().run(RunArgs::new(code));
        prop_assert_eq!(trace.return_value(), values.as_slice());

        let tree = MerkleTree::from_trace(trace).unwrap();
        let proof = tree.compute_result_proof();
        prop_assert_eq!(proof.len(), 2 * tree.depth());
        prop_assert!(MerkleTree::verify_result_proof(
            &proof,
            &keccak(&values),
            &tree.root_hash()
        ));

        let mut flipped = values.clone();
        flipped[0] ^= 1;
        prop_assert!(!MerkleTree::verify_result_proof(
            &proof,
            &keccak(&flipped),
            &tree.root_hash()
        ));
    }
}

#[test]
fn test_result_proof_rejects_malformed_proofs() {
    let tree = commit(returning_program(&[7]), Vec::new());
    let proof = tree.compute_result_proof();
    let return_hash = keccak(&[7]);

    assert!(!MerkleTree::verify_result_proof(&[], &return_hash, &tree.root_hash()));
    assert!(!MerkleTree::verify_result_proof(
        &proof[..proof.len() - 1],
        &return_hash,
        &tree.root_hash()
    ));
    assert!(!MerkleTree::verify_result_proof(
        &proof,
        &return_hash,
        &tree.leaf(0).unwrap().hash
    ));
}

#[test]
fn test_result_proof_for_single_step() {
    let tree = commit(vec![0x00], Vec::new());
    let proof = tree.compute_result_proof();
    assert_eq!(proof.len(), 4);
    assert!(MerkleTree::verify_result_proof(
        &proof,
        &keccak(&[]),
        &tree.root_hash()
    ));
}

/// Descends both trees toward the first differing state, the way the two
/// parties of a dispute do, and returns the leaf pair and the rounds taken.
fn bisect<'a>(
    ours: &'a MerkleTree,
    theirs: &'a MerkleTree,
) -> (&'a MerkleNode, &'a MerkleNode, usize) {
    let (mut a, mut b) = (ours.root(), theirs.root());
    let mut rounds = 0;
    while !a.is_leaf() {
        assert_ne!(a.hash, b.hash);
        let (next_a, next_b) = if a.left.hash != b.left.hash {
            (&a.left, &b.left)
        } else {
            (&a.right, &b.right)
        };
        a = ours.child(next_a).unwrap();
        b = theirs.child(next_b).unwrap();
        rounds += 1;
    }
    (a, b, rounds)
}

#[test]
fn test_divergent_traces_meet_in_log_rounds() {
    let mut rng = StdRng::seed_from_u64(3);

    for log_n in 1..=5u32 {
        let n = 1usize << log_n;
        // n - 1 pushes and a STOP
        let mut code = (0..n - 1)
            .flat_map(|_| [0x60, rng.random_range(0..=255u8)])
            .collect::<Vec<_>>();
        code.push(0x00);

        let diverge_at = rng.random_range(0..n - 1);
        let mut other = code.clone();
        other[2 * diverge_at + 1] ^= 0x80;

        let ours = commit(code, Vec::new());
        let theirs = commit(other, Vec::new());
        assert_eq!(ours.steps().len(), n);
        assert_eq!(ours.depth(), theirs.depth());

        let (a, b, rounds) = bisect(&ours, &theirs);
        assert_eq!(rounds, log_n as usize);
        assert_eq!(a.left.hash, b.left.hash);
        assert_ne!(a.right.hash, b.right.hash);

        let slot = a.states().unwrap().0;
        assert_eq!(slot, diverge_at);
        let proof = StepProof::build(&ours, a).unwrap();
        assert_eq!(proof.execution_input.pc, 2 * diverge_at);
    }
}

#[test]
fn test_calldata_commitment_depends_on_input() {
    let code = vec![0x60, 0x00, 0x35, 0x00];
    let a = commit(code.clone(), vec![1]);
    let b = commit(code, vec![2]);
    assert_ne!(a.root_hash(), b.root_hash());
    assert_ne!(a.call_data_hash(), b.call_data_hash());
    assert_ne!(a.leaf(0).unwrap().left.hash, b.leaf(0).unwrap().left.hash);
}
