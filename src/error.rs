//! Error types for slot auditing.

use thiserror::Error;

/// Result type for audit operations.
pub type Result<T> = std::result::Result<T, AuditError>;

/// Errors that can occur while auditing a slot timeline.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Bad block range or stride, rejected before any network access.
    #[error("invalid range: from_block {from} > to_block {to} or step {step} < 1")]
    InvalidRange {
        /// Start block (inclusive).
        from: u64,
        /// End block (inclusive).
        to: u64,
        /// Stride between samples.
        step: u64,
    },

    /// Bad configuration: duplicate labels, empty slot set, malformed manifest.
    #[error("configuration error: {0}")]
    Config(String),

    /// Transient read failure (network, timeout, rate limit). Fatal to the run:
    /// a missed sample could hide a real change point.
    #[error("transient read failure for slot '{label}' at block {block}: {cause}")]
    TransientRead {
        /// Block being read when the failure occurred.
        block: u64,
        /// Label of the slot being read.
        label: String,
        /// Transport-level cause.
        cause: String,
    },

    /// The node lacks archive state for the requested block. Fatal to the run:
    /// partial history makes the soundness verdict meaningless.
    #[error("historical state unavailable for slot '{label}' at block {block}: {reason} (archive node required)")]
    HistoricalUnavailable {
        /// Block whose state is missing.
        block: u64,
        /// Label of the slot being read.
        label: String,
        /// Node-reported reason.
        reason: String,
    },

    /// RPC connection or malformed-response error outside the sample loop.
    #[error("RPC error: {0}")]
    Rpc(String),
}
