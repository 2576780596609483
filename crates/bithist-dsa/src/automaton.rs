use alloc::vec::Vec;
use core::fmt;

/// One state of the linearized bit-history automaton.
///
/// Optimized for L1 density:
/// - Child edges are indexed by 32-bit arena offsets, one per bit value.
/// - Counters are plain integers; the scaled probability is derived on read.
/// - Exactly 64 bytes to align with standard CPU cache lines (L1 Residency).
#[derive(Clone, Debug)]
#[repr(align(64))]
pub struct StateNode {
    /// Arena offsets of the zero-edge and one-edge successors.
    /// `NULL_STATE` means the edge has not been traversed yet.
    pub children: [u32; 2],
    /// Non-owning back-references to every predecessor reaching this state.
    /// Exactly one entry during normal growth; the collapse engine may fuse
    /// states and leave several. One entry per distinct predecessor, even
    /// when both of that predecessor's edges reach this state.
    pub parents: Vec<u32>,
    /// Times this state was current when a bit was processed.
    pub visits: u64,
    /// Visits where the processed bit was 0.
    pub zero_outcomes: u64,
    /// Distance from the root along owned edges. Bookkeeping only.
    pub depth: u32,
    /// Pre-order serialization id. Meaningless until `assign_ids` runs.
    pub id: u32,
    /// Whether this state hangs off its parent's zero-edge.
    pub from_zero_edge: bool,
}

static_assertions::assert_eq_size!(StateNode, [u8; 64]);

pub const NULL_STATE: u32 = u32::MAX;
pub const ROOT_STATE: u32 = 0;

/// Fixed-point denominator for scaled probabilities: estimates live in
/// `[0, PROB_SCALE]` where `PROB_SCALE` maps to "next bit is certainly 0".
pub const PROB_SCALE: u32 = 32_768;

/// A capacity-bounded automaton over bit histories.
///
/// Each reachable state represents one context (the bit path from the root)
/// and counts how often the next bit was zero there. Growth is lazy: an edge
/// is materialized the first time it is traversed. Once the live-state count
/// crosses the throttle threshold, novel transitions are redirected to the
/// root instead of allocating, so memory stays bounded for any input.
///
/// Not safe for concurrent `transition` calls against one instance; the
/// driver applies bits strictly in stream order.
pub struct Automaton {
    pub(crate) nodes: Vec<StateNode>,
    pub(crate) live: u32,
    capacity: u32,
    throttle_percent: u32,
}

impl fmt::Debug for Automaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Automaton")
            .field("live", &self.live)
            .field("capacity", &self.capacity)
            .field("arena_len", &self.nodes.len())
            .finish()
    }
}

impl Automaton {
    /// Creates an automaton with the given live-state budget and the default
    /// 90% throttle threshold.
    pub fn new(capacity: u32) -> Self {
        Self::with_throttle(capacity, 90)
    }

    pub fn with_throttle(capacity: u32, throttle_percent: u32) -> Self {
        let mut nodes = Vec::with_capacity(capacity as usize);
        // Root: depth 0, no parents, reached by no edge.
        nodes.push(StateNode {
            children: [NULL_STATE; 2],
            parents: Vec::new(),
            visits: 0,
            zero_outcomes: 0,
            depth: 0,
            id: 0,
            from_zero_edge: true,
        });
        Self {
            nodes,
            live: 1,
            capacity,
            throttle_percent,
        }
    }

    /// Applies one input bit at `state` and returns the state to use for the
    /// next bit of the same context slot.
    ///
    /// Counters on `state` are always updated, including when throttling
    /// redirects the walk to the root. Total for `bit` in {0, 1}; any other
    /// value is a contract violation and panics.
    pub fn transition(&mut self, state: u32, bit: u8) -> u32 {
        assert!(bit <= 1, "transition: bit must be 0 or 1, got {}", bit);
        let s = state as usize;
        self.nodes[s].visits += 1;
        if bit == 0 {
            self.nodes[s].zero_outcomes += 1;
        }

        let edge = self.nodes[s].children[bit as usize];
        if edge != NULL_STATE {
            return edge;
        }

        // Near the budget, novel paths fold back to the root rather than
        // allocating. The outcome above was still counted on `state`.
        if self.throttled() {
            return ROOT_STATE;
        }

        let depth = self.nodes[s].depth + 1;
        let mut parents = Vec::with_capacity(1);
        parents.push(state);
        let child = self.alloc(depth, parents, bit == 0);
        self.nodes[s].children[bit as usize] = child;
        child
    }

    /// Scaled estimate in `[0, PROB_SCALE]` that the next bit at `state` is 0.
    ///
    /// Round-half-away-from-zero in pure integer arithmetic. A state that was
    /// created but never visited has no evidence either way and reports the
    /// uniform prior `PROB_SCALE / 2`.
    pub fn prob(&self, state: u32) -> u32 {
        let node = &self.nodes[state as usize];
        if node.visits == 0 {
            return PROB_SCALE / 2;
        }
        ((2 * node.zero_outcomes * u64::from(PROB_SCALE) + node.visits) / (2 * node.visits))
            as u32
    }

    /// Pre-order id assignment: root is 0, then the zero-subtree, then the
    /// one-subtree. Returns the number of states visited, which equals the
    /// live count for any tree produced by normal growth.
    pub fn assign_ids(&mut self) -> u32 {
        let mut next = 0u32;
        let mut stack = alloc::vec![ROOT_STATE];
        while let Some(s) = stack.pop() {
            self.nodes[s as usize].id = next;
            next += 1;
            let [zero, one] = self.nodes[s as usize].children;
            if one != NULL_STATE {
                stack.push(one);
            }
            if zero != NULL_STATE {
                stack.push(zero);
            }
        }
        next
    }

    #[inline(always)]
    pub fn node(&self, state: u32) -> &StateNode {
        &self.nodes[state as usize]
    }

    pub fn live(&self) -> u32 {
        self.live
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub(crate) fn throttled(&self) -> bool {
        u64::from(self.live) * 100 > u64::from(self.capacity) * u64::from(self.throttle_percent)
    }

    pub(crate) fn alloc(&mut self, depth: u32, parents: Vec<u32>, from_zero_edge: bool) -> u32 {
        let idx = self.nodes.len() as u32;
        self.nodes.push(StateNode {
            children: [NULL_STATE; 2],
            parents,
            visits: 0,
            zero_outcomes: 0,
            depth,
            id: 0,
            from_zero_edge,
        });
        self.live += 1;
        idx
    }
}

#[cfg(kani)]
mod proofs {
    use super::*;

    #[kani::proof]
    fn prove_transition_totality() {
        let mut fsm = Automaton::new(8);
        let bit: u8 = kani::any();
        kani::assume(bit <= 1);

        // Formally prove that a valid bit always yields a usable next state,
        // throttled or not.
        let next = fsm.transition(ROOT_STATE, bit);
        assert!(next != NULL_STATE);
    }
}
