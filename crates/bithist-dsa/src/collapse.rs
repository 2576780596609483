//! Capacity-reduction passes over the automaton.
//!
//! These passes fuse statistically indistinguishable regions of the tree to
//! reclaim live-state budget. The build pipeline does not invoke them; they
//! are the designed overflow mechanism and are exercised directly by tests.
//! Neither pass is transactional: an inconsistency detected mid-pass panics,
//! and with `panic = "abort"` the process dies rather than continue with a
//! half-merged tree.

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::vec::Vec;

use crate::automaton::{Automaton, NULL_STATE, ROOT_STATE};

impl Automaton {
    /// Fuses `b` into `a` in place: counters are summed and the child
    /// subtrees are unioned recursively, with an absent side adopting the
    /// other side's subtree wholesale. Each state pair actually fused
    /// releases one unit of live budget. Returns `a`.
    ///
    /// Detaching `b` from its former parents is the caller's responsibility;
    /// `truncate` does the rewiring before it merges.
    pub fn merge(&mut self, a: u32, b: u32) -> u32 {
        let mut work = alloc::vec![(a, b)];
        while let Some((x, y)) = work.pop() {
            if x == y {
                continue;
            }
            let (y_visits, y_zero, y_children) = {
                let ny = &self.nodes[y as usize];
                (ny.visits, ny.zero_outcomes, ny.children)
            };
            {
                let nx = &mut self.nodes[x as usize];
                nx.visits += y_visits;
                nx.zero_outcomes += y_zero;
            }
            // `y` itself is gone; its subtrees live on under `x`.
            self.live -= 1;

            for slot in 0..2 {
                let yc = y_children[slot];
                if yc == NULL_STATE {
                    continue;
                }
                let xc = self.nodes[x as usize].children[slot];
                if xc == NULL_STATE {
                    // Nil-coalescing adoption: the whole subtree moves over.
                    self.nodes[x as usize].children[slot] = yc;
                    let adopted = &mut self.nodes[yc as usize];
                    adopted.parents.clear();
                    adopted.parents.push(x);
                } else {
                    work.push((xc, yc));
                }
            }
        }
        a
    }

    /// Removes statistically indistinguishable unvisited branches.
    ///
    /// Recomputes the leaf set, then takes every leaf that was never visited
    /// and has exactly one parent, and groups those parents (the root stays
    /// untouchable) by their scaled probability. Each group collapses into a
    /// single fresh state: every member is rewired out of the tree and folded
    /// in via [`Automaton::merge`], whose per-member fuses release the
    /// group's worth of live budget.
    pub fn truncate(&mut self) {
        let mut leaf_parents: BTreeSet<u32> = BTreeSet::new();
        let mut stack = alloc::vec![ROOT_STATE];
        while let Some(s) = stack.pop() {
            let node = &self.nodes[s as usize];
            let [zero, one] = node.children;
            if zero == NULL_STATE && one == NULL_STATE {
                if node.visits == 0 && node.parents.len() == 1 {
                    let parent = node.parents[0];
                    if parent != ROOT_STATE {
                        leaf_parents.insert(parent);
                    }
                }
                continue;
            }
            if one != NULL_STATE {
                stack.push(one);
            }
            if zero != NULL_STATE {
                stack.push(zero);
            }
        }

        let mut groups: BTreeMap<u32, Vec<u32>> = BTreeMap::new();
        for parent in leaf_parents {
            groups.entry(self.prob(parent)).or_default().push(parent);
        }

        let mut removed = 0u32;
        for (_, bucket) in groups {
            if bucket.len() < 2 {
                continue;
            }
            // A member nested under another member of the same bucket would
            // be folded into a subtree it already belongs to, turning an
            // edge back onto the merge target. Keep the shallowest states
            // and drop their descendants from the group.
            let members: BTreeSet<u32> = bucket.iter().copied().collect();
            let group: Vec<u32> = bucket
                .into_iter()
                .filter(|&m| !self.has_ancestor_in(m, &members))
                .collect();
            if group.len() < 2 {
                continue;
            }
            let first = group[0] as usize;
            let (depth, from_zero_edge) =
                (self.nodes[first].depth, self.nodes[first].from_zero_edge);
            let merged = self.alloc(depth, Vec::new(), from_zero_edge);

            for &member in &group {
                // Redirect every edge that reached `member` onto the merged
                // state. This is where multi-parent states arise.
                let parents = core::mem::take(&mut self.nodes[member as usize].parents);
                let slot = usize::from(!self.nodes[member as usize].from_zero_edge);
                for &p in &parents {
                    // A merged parent here means the nesting filter above was
                    // defeated and the arena is about to go cyclic: abort
                    // instead of continuing with a corrupt tree.
                    assert!(
                        p != merged,
                        "truncate: group member nested under its merge target"
                    );
                    if self.nodes[p as usize].children[slot] == member {
                        self.nodes[p as usize].children[slot] = merged;
                    }
                    if !self.nodes[merged as usize].parents.contains(&p) {
                        self.nodes[merged as usize].parents.push(p);
                    }
                }
                self.merge(merged, member);
                removed += 1;
            }
        }

        if removed > 0 {
            tracing::debug!(
                "truncate: fused {} states, {} live remain",
                removed,
                self.live
            );
        }
    }

    /// Whether any proper ancestor of `state` is a member of `set`.
    fn has_ancestor_in(&self, state: u32, set: &BTreeSet<u32>) -> bool {
        let mut seen: BTreeSet<u32> = BTreeSet::new();
        let mut work = alloc::vec![state];
        while let Some(s) = work.pop() {
            for &p in &self.nodes[s as usize].parents {
                if p != state && set.contains(&p) {
                    return true;
                }
                if seen.insert(p) {
                    work.push(p);
                }
            }
        }
        false
    }

    /// Chain de-bambooing: walks from `state` toward the root and splices out
    /// every link whose sole parent has no other child, folding the link's
    /// counters into that parent. Long single-child runs carry no branching
    /// information, only their endpoint counters matter.
    pub fn collapse_chain(&mut self, state: u32) {
        let mut cur = state;
        loop {
            let node = &self.nodes[cur as usize];
            if node.parents.len() != 1 {
                // Root (no parents) or a merged multi-parent state: stop.
                break;
            }
            let parent = node.parents[0];
            let slot = usize::from(!node.from_zero_edge);
            let kids = node.children;

            let only_child = {
                let pc = self.nodes[parent as usize].children;
                pc[slot] == cur && pc[1 - slot] == NULL_STATE
            };
            let branchless = kids[0] == NULL_STATE || kids[1] == NULL_STATE;

            if only_child && branchless {
                let sole = if kids[0] != NULL_STATE { kids[0] } else { kids[1] };
                let (visits, zero_outcomes) = {
                    let n = &self.nodes[cur as usize];
                    (n.visits, n.zero_outcomes)
                };
                let p = &mut self.nodes[parent as usize];
                p.visits += visits;
                p.zero_outcomes += zero_outcomes;
                p.children[slot] = sole;
                let parent_depth = p.depth;
                if sole != NULL_STATE {
                    let adopted = &mut self.nodes[sole as usize];
                    adopted.parents.clear();
                    adopted.parents.push(parent);
                    adopted.from_zero_edge = slot == 0;
                    // Every depth below the splice shifts up with it.
                    let mut work = alloc::vec![(sole, parent_depth + 1)];
                    while let Some((s, d)) = work.pop() {
                        self.nodes[s as usize].depth = d;
                        let [zero, one] = self.nodes[s as usize].children;
                        if zero != NULL_STATE {
                            work.push((zero, d + 1));
                        }
                        if one != NULL_STATE {
                            work.push((one, d + 1));
                        }
                    }
                }
                self.live -= 1;
            }

            cur = parent;
        }
    }
}
