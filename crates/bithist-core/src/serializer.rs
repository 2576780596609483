//! Deterministic table emission.
//!
//! One line per state in pre-order-id order: `childZeroId, childOneId,
//! probability`, with `0` meaning "no such child" (unambiguous because the
//! root is never anyone's child during normal growth). Line `i` is exactly
//! the state with id `i`, so downstream consumers index the table directly.

use std::io::{self, BufWriter, Write};
use std::path::Path;

use bithist_dsa::{Automaton, NULL_STATE, ROOT_STATE};

use crate::error::BitHistError;

/// Assigns pre-order ids and writes the table to `w`. Returns the number of
/// lines emitted.
pub fn write_table<W: Write>(fsm: &mut Automaton, w: &mut W) -> io::Result<u32> {
    fsm.assign_ids();

    let mut lines = 0u32;
    let mut unvisited = 0u32;
    let mut stack = vec![ROOT_STATE];
    while let Some(s) = stack.pop() {
        let node = fsm.node(s);
        let [zero, one] = node.children;
        let zero_id = if zero == NULL_STATE { 0 } else { fsm.node(zero).id };
        let one_id = if one == NULL_STATE { 0 } else { fsm.node(one).id };
        if node.visits == 0 {
            unvisited += 1;
        }
        writeln!(w, "{}, {}, {}", zero_id, one_id, fsm.prob(s))?;
        lines += 1;
        if one != NULL_STATE {
            stack.push(one);
        }
        if zero != NULL_STATE {
            stack.push(zero);
        }
    }

    if unvisited > 0 {
        tracing::warn!(
            "serializer: {} states emitted with zero visits (uniform prior)",
            unvisited
        );
    }
    Ok(lines)
}

/// Writes the table to `path` through a temp file in the same directory, so
/// a failure mid-write never leaves a partial table at the destination.
pub fn write_table_file(fsm: &mut Automaton, path: &Path) -> Result<u32, BitHistError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let tmp = tempfile::NamedTempFile::new_in(dir)?;
    let lines = {
        let mut w = BufWriter::new(tmp.as_file());
        let lines = write_table(fsm, &mut w)?;
        w.flush()?;
        lines
    };
    tmp.persist(path).map_err(|e| BitHistError::Io(e.error))?;
    tracing::info!("serializer: wrote {} records to {}", lines, path.display());
    Ok(lines)
}
