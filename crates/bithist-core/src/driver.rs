//! The byte-to-context driver.
//!
//! Thin glue between raw input bytes and the automaton: each byte is split
//! into 8 bits most-significant first, and every bit is applied at whichever
//! state its addressing slot currently holds. The slot address mixes the
//! previous byte with the bits of the byte in progress, so many distinct
//! addresses funnel into the one shared automaton.

use std::io::Read;

use bithist_dsa::{Automaton, ROOT_STATE};

/// One slot per reachable context address: an order-1 byte prefix plus up to
/// 8 partial bits of the byte in progress.
pub const SLOT_COUNT: usize = 0x100 << 16;

/// Start-of-byte marker: contexts are re-tagged to `(prev_byte | RESET)`
/// after every 8th bit, which keeps addresses below `SLOT_COUNT`.
const CONTEXT_RESET: usize = 1 << 16;

pub struct ContextDriver {
    /// Current automaton state per addressing slot, root until first use.
    slots: Vec<u32>,
    /// Per-slot hit counter, surfaced in the summary only.
    hits: Vec<u32>,
    context: usize,
}

impl Default for ContextDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextDriver {
    pub fn new() -> Self {
        Self {
            slots: vec![ROOT_STATE; SLOT_COUNT],
            hits: vec![0; SLOT_COUNT],
            context: CONTEXT_RESET,
        }
    }

    /// Feeds one byte through the automaton, most-significant bit first.
    pub fn push_byte(&mut self, fsm: &mut Automaton, byte: u8) {
        for shift in (0..8).rev() {
            let bit = (byte >> shift) & 1;
            let slot = self.context;
            self.slots[slot] = fsm.transition(self.slots[slot], bit);
            self.hits[slot] += 1;
            self.context = (self.context << 1) | bit as usize;
        }
        self.context = (self.context & 0xFF) | CONTEXT_RESET;
    }

    /// Streams the whole reader through the automaton in input order.
    /// Returns the number of bytes processed.
    pub fn run<R: Read>(&mut self, fsm: &mut Automaton, mut reader: R) -> std::io::Result<u64> {
        let mut buf = vec![0u8; 64 * 1024];
        let mut total = 0u64;
        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                break;
            }
            for &byte in &buf[..n] {
                self.push_byte(fsm, byte);
            }
            total += n as u64;
        }
        tracing::debug!(
            "ContextDriver: {} bytes in, {} distinct slots touched",
            total,
            self.touched_slots()
        );
        Ok(total)
    }

    /// Number of addressing slots that processed at least one bit.
    pub fn touched_slots(&self) -> usize {
        self.hits.iter().filter(|&&h| h > 0).count()
    }

    pub fn context(&self) -> usize {
        self.context
    }
}
