//! Report rendering: console output and the machine-readable JSON document.

use serde::Serialize;
use std::io::Write;
use std::time::{Duration, Instant};

use crate::config::RunConfig;
use crate::sampler::{ProgressEvent, ProgressObserver};
use crate::timeline::{ChangePoint, Reading, SlotTimeline};
use crate::verdict::Verdict;

/// Per-slot section of the JSON report.
#[derive(Debug, Serialize)]
pub struct SlotReport<'a> {
    /// Slot label.
    pub label: &'a str,
    /// Slot key as 0x-hex.
    pub key: String,
    /// True iff no change points were detected.
    pub is_constant: bool,
    /// Raw sampled values, ascending by block.
    pub readings: &'a [Reading],
    /// Detected change points, ascending by block.
    pub change_points: &'a [ChangePoint],
}

/// Machine-readable audit report (`--json`).
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    /// RPC endpoint the run used.
    pub rpc: &'a str,
    /// Audited contract address.
    pub address: String,
    /// `[from_block, to_block, step]`.
    pub range: [u64; 3],
    /// Per-slot timelines, in declared slot order.
    pub slots: Vec<SlotReport<'a>>,
    /// Change points summed over all slots.
    pub total_changes: usize,
    /// Overall outcome.
    pub verdict: Verdict,
    /// True iff the verdict is SOUND.
    pub ok: bool,
    /// Wall time of the run (advisory).
    pub elapsed_seconds: f64,
}

impl<'a> Report<'a> {
    /// Assemble the report from a finished run.
    pub fn new(
        config: &'a RunConfig,
        timelines: &'a [SlotTimeline],
        verdict: Verdict,
        elapsed: Duration,
    ) -> Self {
        let slots = timelines
            .iter()
            .map(|tl| SlotReport {
                label: &tl.slot.label,
                key: tl.slot.key.to_string(),
                is_constant: tl.is_constant(),
                readings: &tl.readings,
                change_points: &tl.change_points,
            })
            .collect();
        let total_changes = timelines.iter().map(|tl| tl.change_points.len()).sum();

        Self {
            rpc: &config.rpc_url,
            address: config.address.to_string(),
            range: [config.from_block, config.to_block, config.step],
            slots,
            total_changes,
            verdict,
            ok: verdict == Verdict::Sound,
            elapsed_seconds: elapsed.as_secs_f64(),
        }
    }
}

/// Print the run banner before sampling starts.
pub fn print_banner(config: &RunConfig, chain_id: Option<u64>) {
    println!("🔧 slot-timeline");
    if let Some(id) = chain_id {
        println!("🧭 Chain ID: {id}");
    }
    println!("🔗 RPC: {}", config.rpc_url);
    println!("🏷️  Address: {}", config.address);
    println!(
        "🧱 Range: {} → {} (step={})",
        config.from_block, config.to_block, config.step
    );
    let labels: Vec<&str> = config.slots.iter().map(|s| s.label.as_str()).collect();
    println!("🗃️  Slots: {}", labels.join(", "));
}

/// Print per-slot change points and the verdict.
pub fn print_summary(timelines: &[SlotTimeline], verdict: Verdict, elapsed: Duration) {
    println!("\n📜 Change Points");
    for tl in timelines {
        if tl.is_constant() {
            let first = tl
                .readings
                .first()
                .map(|r| format!(" (first @#{}: {})", r.block, r.value))
                .unwrap_or_default();
            println!("  • {}: constant value across samples{first}", tl.slot.label);
        } else {
            println!("  • {}: {} change(s)", tl.slot.label, tl.change_points.len());
            for cp in &tl.change_points {
                println!("      - @#{}: {} → {}", cp.block, cp.previous, cp.new);
            }
        }
    }

    match verdict {
        Verdict::Sound => println!("\n🎯 SOUND (no changes detected)"),
        Verdict::Unsound => println!("\n🚨 UNSOUND (slot value changes observed)"),
    }
    println!("⏱️  Completed in {:.2}s", elapsed.as_secs_f64());
}

/// Console progress line with ETA, updated in place per sampled block.
pub struct ConsoleProgress {
    started: Instant,
}

impl ConsoleProgress {
    /// Start the progress clock.
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressObserver for ConsoleProgress {
    fn on_block(&mut self, event: &ProgressEvent) {
        let elapsed = self.started.elapsed().as_secs_f64();
        let per_block = elapsed / event.index as f64;
        let eta = (event.total - event.index) as f64 * per_block;
        print!(
            "\r🔍 Block {} ({}/{}, {:.1}%) | ETA: {eta:.1}s remaining    ",
            event.block, event.index, event.total, event.percent
        );
        let _ = std::io::stdout().flush();
        if event.index == event.total {
            println!();
        }
    }
}
