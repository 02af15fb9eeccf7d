//! slot-timeline - audit contract storage slots over a historical block range
//!
//! Samples one or more storage slots at a fixed stride between two blocks,
//! folds the readings into per-slot change-point timelines, and classifies
//! the window as SOUND (no changes) or UNSOUND (drift observed). Useful for
//! watching proxy implementation pointers, governance parameters and bridge
//! roots in CI.
//!
//! Strictly read-only: every read is bound to an explicit historical block
//! number, and nothing is ever submitted to the chain.

/// Run configuration, slot flags and manifests
pub mod config;
pub mod error;
/// Block plan enumeration
pub mod plan;
/// Slot reader boundary (JSON-RPC transport)
pub mod reader;
/// Console and JSON rendering
pub mod report;
pub mod sampler;
pub mod slot;
/// Change-point reduction
pub mod timeline;
pub mod verdict;

pub use error::{AuditError, Result};
pub use verdict::Verdict;

use reader::SlotReader;
use sampler::ProgressObserver;
use timeline::SlotTimeline;

/// Run a full audit: plan the blocks, sample every slot, reduce to
/// timelines. Aborts on the first read failure; never returns partial
/// timelines.
pub async fn audit(
    reader: &dyn SlotReader,
    config: &config::RunConfig,
    observer: &mut dyn ProgressObserver,
) -> Result<Vec<SlotTimeline>> {
    config.validate()?;
    let blocks = plan::plan(config.from_block, config.to_block, config.step)?;
    let series = sampler::sample(reader, &config.address, &config.slots, &blocks, observer).await?;
    Ok(series
        .into_iter()
        .map(|(slot, readings)| timeline::reduce(slot, readings))
        .collect())
}
