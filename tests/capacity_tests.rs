//! # Capacity Boundary Tests
//!
//! Verifies the throttling policy: near the live-state budget the automaton
//! stops growing and folds novel paths back to the root, while still
//! counting every outcome on the state that saw it.

use std::time::Instant;

use bithist_dsa::{Automaton, NULL_STATE, PROB_SCALE, ROOT_STATE};

fn next_bit(seed: &mut u64) -> u8 {
    *seed = seed
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    ((*seed >> 62) & 1) as u8
}

/// The fully worked capacity-4 walkthrough: bits 0, 0, 1, 0, 1, 1.
#[test]
fn test_throttling_scenario_capacity_four() {
    let mut fsm = Automaton::new(4);
    let mut s = ROOT_STATE;

    // bit 1: root grows its zero-child.
    s = fsm.transition(s, 0);
    let a = s;
    assert_eq!(fsm.node(ROOT_STATE).visits, 1);
    assert_eq!(fsm.node(ROOT_STATE).zero_outcomes, 1);
    assert_eq!(fsm.live(), 2);

    // bit 2 at A.
    s = fsm.transition(s, 0);
    let b = s;
    assert_eq!(fsm.node(a).visits, 1);
    assert_eq!(fsm.node(a).zero_outcomes, 1);
    assert_eq!(fsm.live(), 3);

    // bit 3 at B: 3 live is still under 90% of 4, one more state fits.
    s = fsm.transition(s, 1);
    let c = s;
    assert_eq!(fsm.node(b).visits, 1);
    assert_eq!(fsm.node(b).zero_outcomes, 0);
    assert_eq!(fsm.live(), 4);

    // bit 4 at C: 4 live exceeds 3.6, the novel zero-edge is not created.
    // The outcome was still counted on C, not on the returned root.
    s = fsm.transition(s, 0);
    assert_eq!(s, ROOT_STATE);
    assert_eq!(fsm.node(c).visits, 1);
    assert_eq!(fsm.node(c).zero_outcomes, 1);
    assert_eq!(fsm.node(c).children, [NULL_STATE; 2]);
    assert_eq!(fsm.live(), 4);

    // bit 5 at root: one-edge absent, throttle fires again.
    s = fsm.transition(s, 1);
    assert_eq!(s, ROOT_STATE);
    assert_eq!(fsm.node(ROOT_STATE).visits, 2);
    assert_eq!(fsm.node(ROOT_STATE).zero_outcomes, 1);
    assert_eq!(fsm.live(), 4);
    assert_eq!(fsm.prob(ROOT_STATE), PROB_SCALE / 2);

    // bit 6 at root: same again.
    s = fsm.transition(s, 1);
    assert_eq!(s, ROOT_STATE);
    assert_eq!(fsm.node(ROOT_STATE).visits, 3);
    assert_eq!(fsm.live(), 4);
}

#[test]
fn test_no_unbounded_growth() {
    let t = Instant::now();

    let capacity = 64u32;
    let mut fsm = Automaton::new(capacity);
    let mut state = ROOT_STATE;
    let mut seed = 0x0123_4567_89AB_CDEFu64;
    for _ in 0..(20 * capacity) {
        state = fsm.transition(state, next_bit(&mut seed));
        assert_ne!(state, NULL_STATE);
    }
    assert!(
        fsm.live() <= capacity,
        "live count {} exceeded capacity {}",
        fsm.live(),
        capacity
    );

    let overhead = t.elapsed();
    println!("test_no_unbounded_growth: Testing Overhead = {:?}", overhead);
}

#[test]
fn test_capacity_one_never_grows() {
    let mut fsm = Automaton::new(1);
    let mut s = ROOT_STATE;
    for bit in [0u8, 1, 1, 0, 0, 1] {
        s = fsm.transition(s, bit);
        assert_eq!(s, ROOT_STATE);
    }
    assert_eq!(fsm.live(), 1);
    assert_eq!(fsm.node(ROOT_STATE).visits, 6);
    assert_eq!(fsm.node(ROOT_STATE).zero_outcomes, 3);
}
