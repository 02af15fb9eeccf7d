//! Run configuration: slot flags, JSON manifests, validation.
//!
//! Everything here is validated before the core runs — range and
//! configuration errors surface before any progress output or network
//! access.

use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use crate::error::{AuditError, Result};
use crate::plan;
use crate::reader::Address;
use crate::slot::SlotSpec;

/// Validated configuration for one audit run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,
    /// Contract whose storage is audited.
    pub address: Address,
    /// Start block (inclusive).
    pub from_block: u64,
    /// End block (inclusive).
    pub to_block: u64,
    /// Stride between sampled blocks.
    pub step: u64,
    /// Per-request RPC timeout.
    pub timeout: Duration,
    /// Slots to audit, in declared order.
    pub slots: Vec<SlotSpec>,
}

impl RunConfig {
    /// Validate the configuration. Must pass before any network access.
    pub fn validate(&self) -> Result<()> {
        if !self.rpc_url.starts_with("http://") && !self.rpc_url.starts_with("https://") {
            return Err(AuditError::Config(format!(
                "invalid RPC URL '{}': must start with http:// or https://",
                self.rpc_url
            )));
        }

        if self.slots.is_empty() {
            return Err(AuditError::Config(
                "no slots provided: use --slot (repeatable) or --manifest".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for slot in &self.slots {
            if !seen.insert(slot.label.as_str()) {
                return Err(AuditError::Config(format!(
                    "duplicate slot label '{}'",
                    slot.label
                )));
            }
        }

        // Range/step preflight; the same call later produces the real plan.
        plan::plan(self.from_block, self.to_block, self.step)?;

        Ok(())
    }
}

/// Parse one `--slot` flag: `label:0xSLOT`, or bare `0xSLOT` with the hex
/// doubling as the label.
pub fn parse_slot_flag(item: &str) -> Result<SlotSpec> {
    match item.split_once(':') {
        Some((label, raw)) => SlotSpec::new(label, raw),
        None => SlotSpec::new(item, item),
    }
}

/// Load a JSON slot manifest: either `["0x..", ...]` (label = hex) or
/// `{"label": "0x..", ...}` in declared order.
pub fn load_manifest(path: &Path) -> Result<Vec<SlotSpec>> {
    let data = std::fs::read_to_string(path).map_err(|e| {
        AuditError::Config(format!("failed to read manifest {}: {e}", path.display()))
    })?;
    let json: Value = serde_json::from_str(&data).map_err(|e| {
        AuditError::Config(format!("malformed manifest {}: {e}", path.display()))
    })?;

    match json {
        Value::Array(items) => items
            .iter()
            .map(|item| {
                let raw = item.as_str().ok_or_else(|| {
                    AuditError::Config(format!("manifest entry is not a string: {item}"))
                })?;
                SlotSpec::new(raw, raw)
            })
            .collect(),
        Value::Object(map) => map
            .iter()
            .map(|(label, item)| {
                let raw = item.as_str().ok_or_else(|| {
                    AuditError::Config(format!(
                        "manifest value for '{label}' is not a string: {item}"
                    ))
                })?;
                SlotSpec::new(label, raw)
            })
            .collect(),
        _ => Err(AuditError::Config(
            "manifest must be a list of 0x-hex slots or a map of label -> 0x-hex slot"
                .to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn base_config(slots: Vec<SlotSpec>) -> RunConfig {
        RunConfig {
            rpc_url: "https://rpc.example.org".to_string(),
            address: Address([0x42; 20]),
            from_block: 100,
            to_block: 200,
            step: 50,
            timeout: Duration::from_secs(30),
            slots,
        }
    }

    #[test]
    fn test_slot_flag_with_label() {
        let slot = parse_slot_flag("impl:0x1").unwrap();
        assert_eq!(slot.label, "impl");
        assert_eq!(slot.key.0[31], 1);
    }

    #[test]
    fn test_slot_flag_bare_hex_labels_itself() {
        let slot = parse_slot_flag("0x2").unwrap();
        assert_eq!(slot.label, "0x2");
        assert_eq!(slot.key.0[31], 2);
    }

    #[test]
    fn test_duplicate_labels_rejected() {
        let slots = vec![
            parse_slot_flag("owner:0x0").unwrap(),
            parse_slot_flag("owner:0x1").unwrap(),
        ];
        let err = base_config(slots).validate().unwrap_err();
        assert!(matches!(err, AuditError::Config(_)));
    }

    #[test]
    fn test_empty_slot_set_rejected() {
        assert!(base_config(vec![]).validate().is_err());
    }

    #[test]
    fn test_bad_rpc_scheme_rejected() {
        let mut config = base_config(vec![parse_slot_flag("0x0").unwrap()]);
        config.rpc_url = "ws://rpc.example.org".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inverted_range_rejected_before_sampling() {
        let mut config = base_config(vec![parse_slot_flag("0x0").unwrap()]);
        config.from_block = 100;
        config.to_block = 50;
        assert!(matches!(
            config.validate().unwrap_err(),
            AuditError::InvalidRange { .. }
        ));
    }

    #[test]
    fn test_manifest_list_form() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"["0x0", "0x1"]"#).unwrap();

        let slots = load_manifest(file.path()).unwrap();
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].label, "0x0");
        assert_eq!(slots[1].key.0[31], 1);
    }

    #[test]
    fn test_manifest_map_form_keeps_declared_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"zeta": "0x5", "alpha": "0x1"}}"#).unwrap();

        let slots = load_manifest(file.path()).unwrap();
        assert_eq!(slots[0].label, "zeta");
        assert_eq!(slots[1].label, "alpha");
    }

    #[test]
    fn test_manifest_scalar_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#""0x1""#).unwrap();
        assert!(load_manifest(file.path()).is_err());
    }
}
