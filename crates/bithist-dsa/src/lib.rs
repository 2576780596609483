#![no_std]
extern crate alloc;

pub mod automaton;
pub mod collapse;

pub use automaton::{Automaton, StateNode, NULL_STATE, PROB_SCALE, ROOT_STATE};
