//! Block plan: the exact sequence of block numbers to sample.
//!
//! The plan is computed in full before any network access, so the sampler
//! knows `total` for progress reporting up front.

use crate::error::{AuditError, Result};

/// Enumerate the blocks to sample over `[from, to]` with the given stride.
///
/// The sequence always starts at `from` and always ends at `to`, even when
/// `to - from` is not a multiple of `step` — the final stride is shortened
/// rather than dropped, so a change landing exactly on the range boundary is
/// never missed. `from == to` yields a single-element plan.
pub fn plan(from: u64, to: u64, step: u64) -> Result<Vec<u64>> {
    if from > to || step < 1 {
        return Err(AuditError::InvalidRange { from, to, step });
    }

    let mut blocks = Vec::with_capacity(((to - from) / step + 2) as usize);
    let mut b = from;
    loop {
        blocks.push(b);
        match b.checked_add(step) {
            Some(next) if next < to => b = next,
            _ => break,
        }
    }
    if *blocks.last().unwrap_or(&from) != to {
        blocks.push(to);
    }
    Ok(blocks)
}
