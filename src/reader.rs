//! Storage reads bound to explicit historical blocks.
//!
//! The sampler only sees the [`SlotReader`] trait; the JSON-RPC transport
//! behind it is swappable, which keeps the whole audit pipeline testable
//! against a scripted in-memory reader.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::slot::{SlotKey, SlotValue};

/// A 20-byte contract address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// Parse a 0x-prefixed 40-digit hex address.
    pub fn from_hex(raw: &str) -> Result<Self, String> {
        let s = raw.trim();
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| format!("invalid address '{raw}': must be 0x-prefixed hex"))?;
        let bytes =
            hex::decode(digits).map_err(|e| format!("invalid address '{raw}': {e}"))?;
        let arr: [u8; 20] = bytes
            .try_into()
            .map_err(|_| format!("invalid address '{raw}': expected 20 bytes"))?;
        Ok(Self(arr))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Failure modes of a single storage read. The sampler attaches the slot
/// label and block before surfacing either; both abort the run.
#[derive(Debug, Error)]
pub enum ReadError {
    /// Network, timeout, HTTP, or rate-limit failure.
    #[error("{0}")]
    Transient(String),
    /// The node lacks archive state for the requested block.
    #[error("{0}")]
    HistoricalUnavailable(String),
}

/// Reads one 32-byte storage value for (address, slot key, block number).
#[async_trait]
pub trait SlotReader: Send + Sync {
    /// Fetch the slot value at an explicit historical block.
    async fn read(
        &self,
        address: &Address,
        key: SlotKey,
        block: u64,
    ) -> Result<SlotValue, ReadError>;
}

/// `SlotReader` over Ethereum JSON-RPC (`eth_getStorageAt`).
pub struct EthRpcReader {
    client: Client,
    url: String,
}

/// Substrings that identify "node lacks archive data" responses across geth,
/// erigon and common hosted providers.
const ARCHIVE_ERROR_MARKERS: &[&str] = &[
    "missing trie node",
    "header not found",
    "pruned",
    "state not available",
    "state is not available",
    "no state found",
    "required historical state unavailable",
];

impl EthRpcReader {
    /// Create a reader against the given RPC endpoint with a per-request
    /// timeout.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ReadError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ReadError::Transient(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Make a JSON-RPC call and extract the `result` field.
    async fn call(&self, method: &str, params: Value) -> Result<Value, ReadError> {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ReadError::Transient(format!("RPC request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReadError::Transient(format!(
                "RPC request failed with status: {status}"
            )));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| ReadError::Transient(format!("failed to parse RPC response: {e}")))?;

        if let Some(error) = json.get("error") {
            if !error.is_null() {
                return Err(classify_rpc_error(error));
            }
        }

        json.get("result")
            .cloned()
            .ok_or_else(|| ReadError::Transient("RPC response missing result".to_string()))
    }

    /// Chain ID of the connected node, for the run banner and as a
    /// connectivity probe before sampling starts.
    pub async fn chain_id(&self) -> Result<u64, ReadError> {
        let result = self.call("eth_chainId", serde_json::json!([])).await?;
        let hex = result
            .as_str()
            .ok_or_else(|| ReadError::Transient("invalid eth_chainId response".to_string()))?;
        u64::from_str_radix(hex.trim_start_matches("0x"), 16)
            .map_err(|e| ReadError::Transient(format!("invalid chain id '{hex}': {e}")))
    }
}

#[async_trait]
impl SlotReader for EthRpcReader {
    async fn read(
        &self,
        address: &Address,
        key: SlotKey,
        block: u64,
    ) -> Result<SlotValue, ReadError> {
        let params = serde_json::json!([
            address.to_string(),
            quantity_hex(&key.0),
            format!("0x{block:x}"),
        ]);
        let result = self.call("eth_getStorageAt", params).await?;
        let raw = result.as_str().ok_or_else(|| {
            ReadError::Transient("eth_getStorageAt returned a non-string result".to_string())
        })?;
        SlotValue::from_rpc_hex(raw).map_err(|e| ReadError::Transient(e.to_string()))
    }
}

/// Map a JSON-RPC error object onto the read-failure taxonomy.
fn classify_rpc_error(error: &Value) -> ReadError {
    let message = error
        .get("message")
        .and_then(|m| m.as_str())
        .unwrap_or("")
        .to_string();
    let lowered = message.to_lowercase();
    if ARCHIVE_ERROR_MARKERS.iter().any(|m| lowered.contains(m)) {
        ReadError::HistoricalUnavailable(message)
    } else {
        ReadError::Transient(format!("RPC error: {error}"))
    }
}

/// Minimal big-endian quantity hex for a 32-byte slot index (`0x0`, `0x1`,
/// `0x360894a1…`), as the `eth_getStorageAt` position parameter expects.
fn quantity_hex(bytes: &[u8; 32]) -> String {
    let first = bytes.iter().position(|&b| b != 0).unwrap_or(31);
    let encoded = hex::encode(&bytes[first..]);
    let trimmed = encoded.trim_start_matches('0');
    if trimmed.is_empty() {
        "0x0".to_string()
    } else {
        format!("0x{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_roundtrip() {
        let addr = Address::from_hex("0xDeaDbeefdEAdbeefdEadbEEFdeadbeEFdEaDbeeF").unwrap();
        assert_eq!(
            addr.to_string(),
            "0xdeadbeefdeadbeefdeadbeefdeadbeefdeadbeef"
        );
        assert!(Address::from_hex("0x1234").is_err());
        assert!(Address::from_hex("deadbeef").is_err());
    }

    #[test]
    fn test_quantity_hex_trims_leading_zeros() {
        let mut k = [0u8; 32];
        assert_eq!(quantity_hex(&k), "0x0");
        k[31] = 0x01;
        assert_eq!(quantity_hex(&k), "0x1");
        k[31] = 0x1f;
        assert_eq!(quantity_hex(&k), "0x1f");
        k[30] = 0xab;
        assert_eq!(quantity_hex(&k), "0xab1f");
    }

    #[test]
    fn test_archive_errors_classified() {
        let err = serde_json::json!({
            "code": -32000,
            "message": "missing trie node deadbeef (path) state is not available"
        });
        assert!(matches!(
            classify_rpc_error(&err),
            ReadError::HistoricalUnavailable(_)
        ));

        let err = serde_json::json!({ "code": -32005, "message": "rate limit exceeded" });
        assert!(matches!(classify_rpc_error(&err), ReadError::Transient(_)));
    }
}
