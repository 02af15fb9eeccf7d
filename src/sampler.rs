//! Sampling loop: drives the block plan across every configured slot.
//!
//! Ordering is significant: blocks ascending, and within each block the
//! slots in their declared order. That guarantees change points come out in
//! true chronological order and that two change points never race.

use crate::error::{AuditError, Result};
use crate::reader::{Address, ReadError, SlotReader};
use crate::slot::SlotSpec;
use crate::timeline::Reading;

/// Progress notification emitted after a block's full set of slot reads
/// completes. Observational only: observers must not affect the data
/// produced.
#[derive(Debug, Clone, Copy)]
pub struct ProgressEvent {
    /// Block just sampled.
    pub block: u64,
    /// 1-based index of this block in the plan.
    pub index: usize,
    /// Total number of planned blocks.
    pub total: usize,
    /// Completion percentage.
    pub percent: f64,
}

/// Injectable progress sink, so the sampling loop is testable without any
/// console rendering.
pub trait ProgressObserver {
    /// Called once per fully sampled block, in ascending block order.
    fn on_block(&mut self, event: &ProgressEvent);
}

/// Observer that discards all events.
pub struct NullObserver;

impl ProgressObserver for NullObserver {
    fn on_block(&mut self, _event: &ProgressEvent) {}
}

/// Sample every (slot, block) pair of the plan.
///
/// Returns one block-ordered reading sequence per slot, in declared slot
/// order. Any read failure aborts the whole run: a partial timeline would
/// present a misleadingly "constant" verdict for a slot that was only
/// partially observed.
pub async fn sample(
    reader: &dyn SlotReader,
    address: &Address,
    slots: &[SlotSpec],
    plan: &[u64],
    observer: &mut dyn ProgressObserver,
) -> Result<Vec<(SlotSpec, Vec<Reading>)>> {
    let mut series: Vec<(SlotSpec, Vec<Reading>)> = slots
        .iter()
        .map(|s| (s.clone(), Vec::with_capacity(plan.len())))
        .collect();

    let total = plan.len();
    for (i, &block) in plan.iter().enumerate() {
        for (slot, readings) in series.iter_mut() {
            let value = reader
                .read(address, slot.key, block)
                .await
                .map_err(|e| read_failure(e, block, &slot.label))?;
            readings.push(Reading { block, value });
        }

        let index = i + 1;
        observer.on_block(&ProgressEvent {
            block,
            index,
            total,
            percent: index as f64 / total as f64 * 100.0,
        });
    }

    Ok(series)
}

/// Attach the failing block and slot label so the operator can re-run with a
/// reduced stride or a different provider.
fn read_failure(err: ReadError, block: u64, label: &str) -> AuditError {
    match err {
        ReadError::Transient(cause) => AuditError::TransientRead {
            block,
            label: label.to_string(),
            cause,
        },
        ReadError::HistoricalUnavailable(reason) => AuditError::HistoricalUnavailable {
            block,
            label: label.to_string(),
            reason,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::{SlotKey, SlotValue};
    use async_trait::async_trait;
    use std::collections::BTreeMap;

    /// Scripted reader: fixed values per (slot key, block), with an optional
    /// block at which every read fails.
    struct ScriptedReader {
        values: BTreeMap<(SlotKey, u64), SlotValue>,
        fail_at: Option<(u64, ReadErrorKind)>,
    }

    #[derive(Clone, Copy)]
    enum ReadErrorKind {
        Transient,
        Unavailable,
    }

    #[async_trait]
    impl SlotReader for ScriptedReader {
        async fn read(
            &self,
            _address: &Address,
            key: SlotKey,
            block: u64,
        ) -> std::result::Result<SlotValue, ReadError> {
            if let Some((fail_block, kind)) = self.fail_at {
                if block == fail_block {
                    return Err(match kind {
                        ReadErrorKind::Transient => {
                            ReadError::Transient("connection reset".to_string())
                        }
                        ReadErrorKind::Unavailable => {
                            ReadError::HistoricalUnavailable("missing trie node".to_string())
                        }
                    });
                }
            }
            Ok(self
                .values
                .get(&(key, block))
                .copied()
                .unwrap_or(SlotValue::ZERO))
        }
    }

    struct Recorder {
        events: Vec<ProgressEvent>,
    }

    impl ProgressObserver for Recorder {
        fn on_block(&mut self, event: &ProgressEvent) {
            self.events.push(*event);
        }
    }

    fn addr() -> Address {
        Address([0x11; 20])
    }

    fn val(b: u8) -> SlotValue {
        let mut v = [0u8; 32];
        v[31] = b;
        SlotValue(v)
    }

    fn scripted(series: &[(&str, &[(u64, u8)])]) -> (Vec<SlotSpec>, ScriptedReader) {
        let mut slots = Vec::new();
        let mut values = BTreeMap::new();
        for (i, (label, readings)) in series.iter().enumerate() {
            let spec = SlotSpec::new(*label, &format!("0x{i:x}")).unwrap();
            for &(block, v) in *readings {
                values.insert((spec.key, block), val(v));
            }
            slots.push(spec);
        }
        (
            slots,
            ScriptedReader {
                values,
                fail_at: None,
            },
        )
    }

    #[tokio::test]
    async fn test_readings_ordered_per_slot_in_declared_order() {
        let (slots, reader) = scripted(&[
            ("owner", &[(100, 1), (150, 1), (200, 1)]),
            ("impl", &[(100, 2), (150, 3), (200, 3)]),
        ]);
        let series = sample(&reader, &addr(), &slots, &[100, 150, 200], &mut NullObserver)
            .await
            .unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].0.label, "owner");
        assert_eq!(series[1].0.label, "impl");

        let blocks: Vec<u64> = series[1].1.iter().map(|r| r.block).collect();
        assert_eq!(blocks, vec![100, 150, 200]);
        assert_eq!(series[1].1[1].value, val(3));
    }

    #[tokio::test]
    async fn test_progress_events_per_block() {
        let (slots, reader) = scripted(&[("owner", &[(100, 1), (150, 1), (200, 1)])]);
        let mut recorder = Recorder { events: Vec::new() };
        sample(&reader, &addr(), &slots, &[100, 150, 200], &mut recorder)
            .await
            .unwrap();

        assert_eq!(recorder.events.len(), 3);
        assert_eq!(recorder.events[0].block, 100);
        assert_eq!(recorder.events[0].index, 1);
        assert_eq!(recorder.events[2].total, 3);
        assert!((recorder.events[2].percent - 100.0).abs() < f64::EPSILON);
        assert!(recorder
            .events
            .windows(2)
            .all(|w| w[0].block < w[1].block));
    }

    #[tokio::test]
    async fn test_transient_failure_aborts_with_block_and_label() {
        let (slots, mut reader) = scripted(&[("impl", &[(100, 1), (150, 1)])]);
        reader.fail_at = Some((150, ReadErrorKind::Transient));

        let err = sample(&reader, &addr(), &slots, &[100, 150], &mut NullObserver)
            .await
            .unwrap_err();
        match err {
            AuditError::TransientRead { block, label, .. } => {
                assert_eq!(block, 150);
                assert_eq!(label, "impl");
            }
            other => panic!("expected TransientRead, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_archive_state_aborts() {
        let (slots, mut reader) = scripted(&[("impl", &[(100, 1)])]);
        reader.fail_at = Some((100, ReadErrorKind::Unavailable));

        let err = sample(&reader, &addr(), &slots, &[100], &mut NullObserver)
            .await
            .unwrap_err();
        assert!(matches!(err, AuditError::HistoricalUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_no_progress_after_failing_block() {
        let (slots, mut reader) = scripted(&[("impl", &[(100, 1), (150, 1), (200, 1)])]);
        reader.fail_at = Some((150, ReadErrorKind::Transient));
        let mut recorder = Recorder { events: Vec::new() };

        let _ = sample(&reader, &addr(), &slots, &[100, 150, 200], &mut recorder).await;
        assert_eq!(recorder.events.len(), 1);
        assert_eq!(recorder.events[0].block, 100);
    }
}
