//! Per-slot timelines and the change-point reducer.
//!
//! The reducer is pure: it never touches the network, so the soundness logic
//! is testable without any RPC stub. The sampler hands it a complete,
//! block-ordered reading sequence and nothing else.

use serde::Serialize;

use crate::slot::{SlotSpec, SlotValue};

/// One sampled value for one slot at one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Reading {
    /// Block number the value was read at.
    pub block: u64,
    /// Canonical 32-byte storage value.
    pub value: SlotValue,
}

/// A sampled block at which a slot's value differs from the previously
/// observed value. The first reading of a slot is baseline, never a change
/// point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChangePoint {
    /// Block at which the new value was first observed.
    pub block: u64,
    /// Value at the immediately preceding sampled block.
    pub previous: SlotValue,
    /// Value observed at `block`.
    pub new: SlotValue,
}

/// The reduced history of one slot over the sampled range.
#[derive(Debug, Clone, Serialize)]
pub struct SlotTimeline {
    /// The slot this timeline describes.
    pub slot: SlotSpec,
    /// Raw readings, ascending by block.
    pub readings: Vec<Reading>,
    /// Detected change points, ascending by block.
    pub change_points: Vec<ChangePoint>,
}

impl SlotTimeline {
    /// True iff the slot held one value across every sample. A single-reading
    /// plan is constant by definition: one sample can never demonstrate a
    /// change.
    pub fn is_constant(&self) -> bool {
        self.change_points.is_empty()
    }
}

/// Fold a slot's block-ordered readings into a timeline of change points.
///
/// The first reading establishes the baseline. Each subsequent reading is
/// compared byte-for-byte against the immediately preceding one; on
/// inequality a change point is recorded and the baseline advances.
pub fn reduce(slot: SlotSpec, readings: Vec<Reading>) -> SlotTimeline {
    debug_assert!(
        readings.windows(2).all(|w| w[0].block < w[1].block),
        "readings must be strictly ascending by block"
    );

    let mut change_points = Vec::new();
    let mut prev: Option<&Reading> = None;
    for reading in &readings {
        if let Some(p) = prev {
            if p.value != reading.value {
                change_points.push(ChangePoint {
                    block: reading.block,
                    previous: p.value,
                    new: reading.value,
                });
            }
        }
        prev = Some(reading);
    }

    SlotTimeline {
        slot,
        readings,
        change_points,
    }
}
