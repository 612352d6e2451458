//! PeerStats <-> share token codec
//!
//! A token is the record's JSON encoded as base64url without padding, so it
//! survives copy/paste, URLs and QR codes unchanged. Decoding treats the token
//! as untrusted input: the schema version is checked before anything else and
//! every bound is re-validated.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::peer_stats::{PeerStats, SCHEMA_VERSION};

/// URL-safe alphabet; emits no padding, accepts tokens with or without it
const TOKEN_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatsCodeError {
    #[error("Code is not valid base64url")]
    InvalidEncoding,

    #[error("Code does not contain supported stats: {0}")]
    DecodeFailed(String),

    #[error("Stats cannot be encoded: {0}")]
    EncodeFailed(String),
}

impl StatsCodeError {
    /// Text safe to show to the user; details stay in the logs
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidEncoding | Self::DecodeFailed(_) => "Invalid code",
            Self::EncodeFailed(_) => "Could not create a code from these stats",
        }
    }
}

/// Encode a record into a share token
pub fn encode(stats: &PeerStats) -> Result<String, StatsCodeError> {
    stats.validate().map_err(StatsCodeError::EncodeFailed)?;
    let json = serde_json::to_vec(stats).map_err(|e| StatsCodeError::EncodeFailed(e.to_string()))?;
    Ok(TOKEN_ENGINE.encode(json))
}

/// Decode a share token. Surrounding whitespace is ignored.
pub fn decode(token: &str) -> Result<PeerStats, StatsCodeError> {
    // Tokens that went through a standard-alphabet tool are accepted too
    let normalized: String = token
        .trim()
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            c => c,
        })
        .collect();

    let bytes = TOKEN_ENGINE.decode(normalized.as_bytes()).map_err(|e| {
        debug!("Rejected stats code: {}", e);
        StatsCodeError::InvalidEncoding
    })?;

    let value: Value = serde_json::from_slice(&bytes)
        .map_err(|e| decode_failed(format!("payload is not JSON: {}", e)))?;

    match value.get("v").and_then(Value::as_u64) {
        Some(v) if v == u64::from(SCHEMA_VERSION) => {}
        Some(v) => return Err(decode_failed(format!("unsupported schema version {}", v))),
        None => return Err(decode_failed("missing schema version".to_string())),
    }

    let stats: PeerStats =
        serde_json::from_value(value).map_err(|e| decode_failed(format!("schema mismatch: {}", e)))?;
    stats.validate().map_err(decode_failed)?;
    Ok(stats)
}

fn decode_failed(reason: String) -> StatsCodeError {
    debug!("Rejected stats code: {}", reason);
    StatsCodeError::DecodeFailed(reason)
}
