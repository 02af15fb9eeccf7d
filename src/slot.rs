//! Slot identifiers and canonical storage values.
//!
//! All storage values are canonicalized to left-padded 32-byte big-endian
//! form at parse time, so equality is plain byte equality everywhere else.
//! Comparing differently-padded representations would silently mask or
//! fabricate change points.

use serde::{Serialize, Serializer};
use std::fmt;

use crate::error::{AuditError, Result};

/// A named storage slot to audit.
///
/// Identity is the label: labels must be unique within a run, which the
/// configuration layer enforces before sampling starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotSpec {
    /// Human-readable label (defaults to the slot hex when not given).
    pub label: String,
    /// Storage slot key as a 32-byte big-endian integer.
    pub key: SlotKey,
}

impl SlotSpec {
    /// Create a slot spec from a label and a 0x-hex slot key.
    pub fn new(label: impl Into<String>, key_hex: &str) -> Result<Self> {
        Ok(Self {
            label: label.into(),
            key: SlotKey::from_hex(key_hex)?,
        })
    }
}

/// 32-byte big-endian storage slot key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotKey(pub [u8; 32]);

impl SlotKey {
    /// Parse from 0x-prefixed hex, left-padding to 32 bytes.
    ///
    /// Accepts odd-length hex (`0x1` is slot 1), matching how slot indexes
    /// are commonly written in proxy/EIP-1967 documentation.
    pub fn from_hex(raw: &str) -> Result<Self> {
        let padded = parse_hex32(raw)
            .map_err(|e| AuditError::Config(format!("invalid slot key '{raw}': {e}")))?;
        Ok(Self(padded))
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Canonical 32-byte storage value.
///
/// Constructed only through [`SlotValue::from_rpc_hex`] (or raw bytes in
/// tests), so two values are equal iff the slot contents are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotValue(pub [u8; 32]);

impl SlotValue {
    /// All-zero value (the default for never-written slots).
    pub const ZERO: Self = Self([0u8; 32]);

    /// Canonicalize an `eth_getStorageAt` result.
    ///
    /// Nodes differ in whether they return full-width or trimmed hex; both
    /// forms canonicalize to the same left-padded 32 bytes.
    pub fn from_rpc_hex(raw: &str) -> Result<Self> {
        let padded = parse_hex32(raw)
            .map_err(|e| AuditError::Rpc(format!("invalid storage value '{raw}': {e}")))?;
        Ok(Self(padded))
    }
}

impl fmt::Display for SlotValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

// Keys and values serialize as 0x-hex strings in JSON reports.
impl Serialize for SlotKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl Serialize for SlotValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parse 0x-prefixed hex of at most 32 bytes into a left-padded 32-byte array.
fn parse_hex32(raw: &str) -> std::result::Result<[u8; 32], String> {
    let s = raw.trim();
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .ok_or_else(|| "must be 0x-prefixed hex".to_string())?;
    if digits.is_empty() {
        return Err("empty hex".to_string());
    }
    // Odd-length hex means an implicit leading zero nibble.
    let even = if digits.len() % 2 == 1 {
        format!("0{digits}")
    } else {
        digits.to_string()
    };
    let bytes = hex::decode(&even).map_err(|e| e.to_string())?;
    if bytes.len() > 32 {
        return Err(format!("{} bytes exceeds 32", bytes.len()));
    }
    let mut out = [0u8; 32];
    out[32 - bytes.len()..].copy_from_slice(&bytes);
    Ok(out)
}
