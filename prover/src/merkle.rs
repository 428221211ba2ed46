//! Merkle commitment over a recorded trace.
//!
//! Leaf `i` pairs the state hashes before and after step `i`; the state
//! before the first step is the fixed initial state. Every odd level is
//! padded with one zero sentinel before folding, until a single root
//! remains. Nodes live in an arena shared behind an [`Arc`], so clones are
//! cheap and a committed trace can back any number of dispute sessions.

use std::{fmt, sync::Arc};

use ahash::AHashMap;
use berry_vm::{
    trace::hashing::{keccak, keccak_pair, ZERO_HASH},
    ExecutionStep, Trace,
};
use ethereum_types::H256;
use tracing::debug;

use crate::{
    error::{ProverError, Result},
    state_hash::{pre_state_hash, state_hash},
};

/// Index of a node in the tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// The shared zero sentinel.
const ZERO_NODE: NodeId = NodeId(0);

/// What a link points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Child {
    /// An inner node or leaf one level down.
    Node(NodeId),
    /// A committed machine state. Index 0 is the initial state, index
    /// `i + 1` the state after step `i`.
    State(usize),
    Zero,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    pub hash: H256,
    pub child: Child,
}

impl Link {
    const ZERO: Self = Self {
        hash: ZERO_HASH,
        child: Child::Zero,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MerkleNode {
    pub left: Link,
    pub right: Link,
    pub hash: H256,
}

impl MerkleNode {
    const ZERO: Self = Self {
        left: Link::ZERO,
        right: Link::ZERO,
        hash: ZERO_HASH,
    };

    /// Leaves pair two adjacent machine states.
    pub const fn is_leaf(&self) -> bool {
        matches!(self.left.child, Child::State(_))
    }

    pub fn is_zero(&self) -> bool {
        self.hash == ZERO_HASH && self.left.child == Child::Zero
    }

    /// State indices `(pre, post)` of a leaf.
    pub const fn states(&self) -> Option<(usize, usize)> {
        match (self.left.child, self.right.child) {
            (Child::State(pre), Child::State(post)) => Some((pre, post)),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct TreeData {
    nodes: Vec<MerkleNode>,
    /// Level 0 holds the leaves, the last level the root.
    levels: Vec<Vec<NodeId>>,
    /// Initial state followed by every recorded step.
    states: Vec<ExecutionStep>,
    code: Vec<u8>,
    call_data: Vec<u8>,
    call_data_hash: H256,
    by_hash: AHashMap<H256, NodeId>,
    by_pair: AHashMap<(H256, H256), NodeId>,
}

/// Immutable Merkle tree over the state hashes of a run.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    inner: Arc<TreeData>,
}

impl MerkleTree {
    /// Commits to `steps`, the trace of running `code` over `call_data`.
    pub fn run(steps: Vec<ExecutionStep>, code: &[u8], call_data: &[u8]) -> Result<Self> {
        if steps.is_empty() {
            return Err(ProverError::EmptyTrace);
        }

        let call_data_hash = keccak(call_data);
        let mut states = Vec::with_capacity(steps.len() + 1);
        states.push(ExecutionStep::initial());
        states.extend(steps);

        let hashes = states
            .iter()
            .map(|state| state_hash(state, &call_data_hash))
            .collect::<Vec<_>>();

        let mut nodes = vec![MerkleNode::ZERO];
        let leaves = hashes
            .windows(2)
            .enumerate()
            .map(|(i, pair)| {
                nodes.push(MerkleNode {
                    left: Link {
                        hash: pair[0],
                        child: Child::State(i),
                    },
                    right: Link {
                        hash: pair[1],
                        child: Child::State(i + 1),
                    },
                    hash: keccak_pair(&pair[0], &pair[1]),
                });
                NodeId(nodes.len() - 1)
            })
            .collect::<Vec<_>>();

        let levels = fold_levels(&mut nodes, leaves);
        let (by_hash, by_pair) = index_nodes(&nodes, &levels);

        let tree = Self {
            inner: Arc::new(TreeData {
                nodes,
                levels,
                states,
                code: code.to_vec(),
                call_data: call_data.to_vec(),
                call_data_hash,
                by_hash,
                by_pair,
            }),
        };
        debug!(
            steps = tree.steps().len(),
            depth = tree.depth(),
            root = ?tree.root_hash(),
            "trace committed"
        );
        Ok(tree)
    }

    /// Commits to a recorded run, taking code and calldata from its final
    /// state.
    pub fn from_trace(trace: Trace) -> Result<Self> {
        let Trace { steps, state } = trace;
        Self::run(steps, &state.code, state.call_data.as_bytes())
    }

    pub fn node(&self, id: NodeId) -> &MerkleNode {
        &self.inner.nodes[id.0]
    }

    pub fn root(&self) -> &MerkleNode {
        let top = self.inner.levels.last().and_then(|level| level.first());
        self.node(top.copied().unwrap_or(ZERO_NODE))
    }

    pub fn root_hash(&self) -> H256 {
        self.root().hash
    }

    /// Number of levels, leaves included.
    pub fn depth(&self) -> usize {
        self.inner.levels.len()
    }

    /// Leaf level, including the zero sentinel padding an odd count.
    pub fn leaves(&self) -> impl Iterator<Item = &MerkleNode> + '_ {
        self.level(0)
    }

    pub fn level(&self, index: usize) -> impl Iterator<Item = &MerkleNode> + '_ {
        self.inner
            .levels
            .get(index)
            .into_iter()
            .flatten()
            .map(|id| self.node(*id))
    }

    /// Leaf committing to step `slot`.
    pub fn leaf(&self, slot: usize) -> Result<&MerkleNode> {
        let leaves = self.steps().len();
        if slot >= leaves {
            return Err(ProverError::StepOutOfRange { slot, leaves });
        }
        Ok(self.node(self.inner.levels[0][slot]))
    }

    /// Node of the given hash; upper levels first, and within a level the
    /// rightmost match. The zero sentinel is never returned.
    pub fn get_node(&self, hash: &H256) -> Option<&MerkleNode> {
        self.inner.by_hash.get(hash).map(|id| self.node(*id))
    }

    /// Node whose children hash to `left` and `right`, searched like
    /// [`Self::get_node`].
    pub fn get_pair(&self, left: &H256, right: &H256) -> Option<&MerkleNode> {
        self.inner
            .by_pair
            .get(&(*left, *right))
            .map(|id| self.node(*id))
    }

    /// Machine state `index`; 0 is the initial state.
    pub fn state(&self, index: usize) -> Option<&ExecutionStep> {
        self.inner.states.get(index)
    }

    /// Recorded steps, without the initial state.
    pub fn steps(&self) -> &[ExecutionStep] {
        &self.inner.states[1..]
    }

    pub fn code(&self) -> &[u8] {
        &self.inner.code
    }

    pub fn call_data(&self) -> &[u8] {
        &self.inner.call_data
    }

    pub fn call_data_hash(&self) -> H256 {
        self.inner.call_data_hash
    }

    /// Child node of `link`, if it points at one.
    pub fn child(&self, link: &Link) -> Option<&MerkleNode> {
        match link.child {
            Child::Node(id) => Some(self.node(id)),
            Child::State(_) | Child::Zero => None,
        }
    }

    /// Pairs of child hashes from the root down to the last real leaf,
    /// following the right branch unless it is padding. The final pair
    /// carries the pre-state hash of the last state in place of its state
    /// hash, so the result can be checked against any claimed return data.
    pub fn compute_result_proof(&self) -> Vec<H256> {
        let mut proof = Vec::with_capacity(self.depth() * 2);
        let mut node = self.root();

        loop {
            if let Some((pre, post)) = node.states() {
                if node.right.hash == ZERO_HASH {
                    proof.push(self.pre_state_hash(pre));
                    proof.push(ZERO_HASH);
                } else {
                    proof.push(node.left.hash);
                    proof.push(self.pre_state_hash(post));
                }
                break;
            }

            proof.push(node.left.hash);
            proof.push(node.right.hash);

            let next = if node.right.hash == ZERO_HASH {
                &node.left
            } else {
                &node.right
            };
            match self.child(next) {
                Some(child) => node = child,
                None => break,
            }
        }

        proof
    }

    /// Checks a proof from [`Self::compute_result_proof`] against the hash
    /// of the claimed return data and a root hash.
    pub fn verify_result_proof(proof: &[H256], return_data_hash: &H256, root: &H256) -> bool {
        let len = proof.len();
        if len < 2 || len % 2 != 0 {
            return false;
        }

        let mut pairs = proof.to_vec();
        if pairs[len - 1] == ZERO_HASH {
            pairs[len - 2] = keccak_pair(&pairs[len - 2], return_data_hash);
        } else {
            pairs[len - 1] = keccak_pair(&pairs[len - 1], return_data_hash);
        }

        let mut parent = *root;
        for pair in pairs.chunks_exact(2) {
            let (left, right) = (pair[0], pair[1]);
            if keccak_pair(&left, &right) != parent {
                return false;
            }
            parent = if right == ZERO_HASH { left } else { right };
        }
        true
    }

    /// Sibling hashes from leaf `slot` up to, but excluding, the root.
    pub fn calculate_proof(&self, slot: usize) -> Result<Vec<H256>> {
        let leaves = self.inner.levels[0].len();
        if slot >= leaves {
            return Err(ProverError::StepOutOfRange { slot, leaves });
        }

        let mut slot = slot;
        let proof = self.inner.levels[..self.depth() - 1]
            .iter()
            .map(|level| {
                let sibling = self.node(level[slot ^ 1]).hash;
                slot >>= 1;
                sibling
            })
            .collect();
        Ok(proof)
    }

    /// Folds `leaf_hash` at `slot` with `proof` and compares with the root.
    pub fn verify_proof(&self, leaf_hash: &H256, slot: usize, proof: &[H256]) -> bool {
        let mut slot = slot;
        let hash = proof.iter().fold(*leaf_hash, |hash, sibling| {
            let parent = if slot % 2 == 0 {
                keccak_pair(&hash, sibling)
            } else {
                keccak_pair(sibling, &hash)
            };
            slot >>= 1;
            parent
        });
        hash == self.root_hash()
    }

    fn pre_state_hash(&self, index: usize) -> H256 {
        self.state(index)
            .map(|state| pre_state_hash(state, &self.inner.call_data_hash))
            .unwrap_or(ZERO_HASH)
    }
}

/// Folds the leaf level into a perfect binary tree, padding every odd level
/// with the zero sentinel.
fn fold_levels(nodes: &mut Vec<MerkleNode>, leaves: Vec<NodeId>) -> Vec<Vec<NodeId>> {
    let mut levels = vec![leaves];

    loop {
        let last = levels.len() - 1;
        if levels[last].len() <= 1 && levels.len() > 1 {
            break;
        }
        if levels[last].len() % 2 == 1 {
            levels[last].push(ZERO_NODE);
        }

        let parents = levels[last]
            .chunks_exact(2)
            .map(|pair| {
                let (left, right) = (nodes[pair[0].0], nodes[pair[1].0]);
                nodes.push(MerkleNode {
                    left: link_to(pair[0], &left),
                    right: link_to(pair[1], &right),
                    hash: keccak_pair(&left.hash, &right.hash),
                });
                NodeId(nodes.len() - 1)
            })
            .collect();
        levels.push(parents);
    }

    levels
}

fn link_to(id: NodeId, node: &MerkleNode) -> Link {
    if id == ZERO_NODE {
        return Link::ZERO;
    }
    Link {
        hash: node.hash,
        child: Child::Node(id),
    }
}

type NodeIndex = (AHashMap<H256, NodeId>, AHashMap<(H256, H256), NodeId>);

/// Lookup tables resolving to the first match scanning from the top level
/// down and from the right within a level.
fn index_nodes(nodes: &[MerkleNode], levels: &[Vec<NodeId>]) -> NodeIndex {
    let mut by_hash = AHashMap::with_capacity(nodes.len());
    let mut by_pair = AHashMap::with_capacity(nodes.len());

    for id in levels.iter().rev().flat_map(|level| level.iter().rev()) {
        if *id == ZERO_NODE {
            continue;
        }
        let node = &nodes[id.0];
        by_hash.entry(node.hash).or_insert(*id);
        by_pair
            .entry((node.left.hash, node.right.hash))
            .or_insert(*id);
    }

    (by_hash, by_pair)
}

impl fmt::Display for MerkleTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn short(hash: &H256) -> String {
            hex::encode(&hash.as_bytes()[..2])
        }

        for (i, level) in self.inner.levels.iter().enumerate() {
            write!(f, "level {i}: ")?;
            for id in level {
                let node = self.node(*id);
                write!(
                    f,
                    " [ {} (l:{} r:{}) ] ",
                    short(&node.hash),
                    short(&node.left.hash),
                    short(&node.right.hash)
                )?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use berry_vm::{RunArgs, TraceRecorder};

    use super::*;
    use crate::state_hash::initial_state_hash;

    fn commit(code: Vec<u8>) -> MerkleTree {
        MerkleTree::from_trace(TraceRecorder::default().run(RunArgs::new(code))).unwrap()
    }

    #[test]
    fn test_empty_trace_is_rejected() {
        assert_eq!(
            MerkleTree::run(Vec::new(), &[], &[]).unwrap_err(),
            ProverError::EmptyTrace
        );
    }

    #[test]
    fn test_single_step_still_folds() {
        let tree = commit(vec![0x00]);
        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.leaves().count(), 2);
        assert!(tree.leaves().nth(1).unwrap().is_zero());

        let leaf = tree.leaf(0).unwrap();
        assert_eq!(leaf.left.hash, initial_state_hash(&keccak(&[])));
        assert_eq!(tree.root_hash(), keccak_pair(&leaf.hash, &ZERO_HASH));
    }

    #[test]
    fn test_leaves_chain_adjacent_states() {
        // PUSH1 1, PUSH1 2, ADD, POP, STOP
        let tree = commit(vec![0x60, 0x01, 0x60, 0x02, 0x01, 0x50, 0x00]);
        assert_eq!(tree.steps().len(), 5);
        assert_eq!(tree.depth(), 4);

        let leaves = (0..5).map(|slot| tree.leaf(slot).unwrap()).collect::<Vec<_>>();
        for pair in leaves.windows(2) {
            assert_eq!(pair[0].right.hash, pair[1].left.hash);
        }
        assert_eq!(leaves[4].states(), Some((4, 5)));
        assert!(tree.leaf(5).is_err());
    }

    #[test]
    fn test_lookup_by_hash_and_pair() {
        let tree = commit(vec![0x60, 0x01, 0x60, 0x02, 0x01, 0x50, 0x00]);
        let root = tree.root();
        assert_eq!(tree.get_node(&root.hash), Some(root));
        assert_eq!(tree.get_pair(&root.left.hash, &root.right.hash), Some(root));

        let left = tree.child(&root.left).unwrap();
        assert_eq!(tree.get_node(&root.left.hash), Some(left));
        assert_eq!(tree.get_node(&ZERO_HASH), None);
        assert_eq!(tree.get_node(&H256::repeat_byte(0xab)), None);
    }

    #[test]
    fn test_inclusion_proofs() {
        let tree = commit(vec![0x60, 0x01, 0x60, 0x02, 0x01, 0x50, 0x00]);
        for slot in 0..5 {
            let leaf = tree.leaf(slot).unwrap().hash;
            let proof = tree.calculate_proof(slot).unwrap();
            assert_eq!(proof.len(), tree.depth() - 1);
            assert!(tree.verify_proof(&leaf, slot, &proof));
            assert!(!tree.verify_proof(&leaf, slot ^ 1, &proof));
        }
        assert!(tree.calculate_proof(64).is_err());
    }

    #[test]
    fn test_display_lists_levels() {
        let tree = commit(vec![0x60, 0x01, 0x00]);
        let rendered = tree.to_string();
        assert_eq!(rendered.lines().count(), tree.depth());
        assert!(rendered.starts_with("level 0: "));
        let first = rendered.lines().next().unwrap();
        assert_eq!(first.matches(" [ ").count(), 2);
    }

    #[test]
    fn test_clone_shares_arena() {
        let tree = commit(vec![0x60, 0x01, 0x00]);
        let copy = tree.clone();
        assert!(Arc::ptr_eq(&tree.inner, &copy.inner));
    }
}
