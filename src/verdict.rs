//! Soundness verdict over all audited slots.

use serde::Serialize;
use std::fmt;

use crate::timeline::SlotTimeline;

/// Overall outcome of an audit run.
///
/// Exit status 2 for [`Verdict::Unsound`] is kept distinct from status 1
/// (configuration or fatal-read errors) so CI consumers can tell "ran and
/// found drift" from "failed to run".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    /// Every monitored slot held a constant value across the sampled range.
    Sound,
    /// At least one slot's value changed within the sampled range.
    Unsound,
}

impl Verdict {
    /// Aggregate per-slot timelines into one outcome. Order-independent;
    /// vacuously sound for an empty set (zero configured slots is rejected
    /// earlier as a configuration error).
    pub fn from_timelines(timelines: &[SlotTimeline]) -> Self {
        if timelines.iter().all(SlotTimeline::is_constant) {
            Verdict::Sound
        } else {
            Verdict::Unsound
        }
    }

    /// Process exit status: 0 sound, 2 unsound.
    pub fn exit_code(self) -> i32 {
        match self {
            Verdict::Sound => 0,
            Verdict::Unsound => 2,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Sound => write!(f, "SOUND"),
            Verdict::Unsound => write!(f, "UNSOUND"),
        }
    }
}
