//! Keyset cursor tokens.
//!
//! A token is URL-safe base64 over `{"s": <state json>, "c": <checksum>}`.
//! The checksum is SHA-256 over a per-backend secret and the state text, so a
//! token only resumes on the backend that issued it.

use crate::errors::{SdkError, SdkResult};
use crate::query::{SortKey, SortSpec};
use crate::types::CursorToken;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Direction {
    /// Items strictly after the anchor.
    Next,
    /// Items strictly before the anchor.
    Prev,
}

/// The original query plus the position to resume from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CursorState {
    pub kind: String,
    /// Filter in wire form.
    pub filter: Value,
    pub sort: Vec<SortSpec>,
    pub anchor: SortKey,
    pub direction: Direction,
    pub limit: usize,
    pub issued_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    s: String,
    c: String,
}

pub(crate) struct CursorCodec {
    secret: String,
    ttl_secs: u64,
}

fn sha256_hex(input: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut h = Sha256::new();
    h.update(input.as_bytes());
    hex::encode(h.finalize())
}

impl CursorCodec {
    pub fn new(ttl_secs: u64) -> Self {
        Self { secret: Uuid::new_v4().to_string(), ttl_secs }
    }

    fn checksum(&self, state: &str) -> String {
        sha256_hex(&format!("{}:{state}", self.secret))
    }

    pub fn encode(&self, state: &CursorState) -> SdkResult<CursorToken> {
        let s = serde_json::to_string(state)?;
        let c = self.checksum(&s);
        let envelope = serde_json::to_vec(&Envelope { s, c })?;
        Ok(CursorToken::from_wire(URL_SAFE_NO_PAD.encode(envelope)))
    }

    /// Verifies and opens a token issued for `kind`.
    ///
    /// # Errors
    /// `InvalidCursor` for anything undecodable, tampered or issued for another
    /// kind; `CursorExpired` once the token is older than the TTL.
    pub fn decode(&self, kind: &str, token: &CursorToken, now: DateTime<Utc>) -> SdkResult<CursorState> {
        let invalid = |why: &str| SdkError::InvalidCursor(why.to_string());
        let raw = URL_SAFE_NO_PAD.decode(token.as_wire()).map_err(|_| invalid("not base64"))?;
        let envelope: Envelope = serde_json::from_slice(&raw).map_err(|_| invalid("malformed"))?;
        if self.checksum(&envelope.s) != envelope.c {
            return Err(invalid("checksum mismatch"));
        }
        let state: CursorState = serde_json::from_str(&envelope.s).map_err(|_| invalid("malformed state"))?;
        if state.kind != kind {
            return Err(SdkError::InvalidCursor(format!("issued for {}, not {kind}", state.kind)));
        }
        let age = now.signed_duration_since(state.issued_at).num_seconds();
        if age > i64::try_from(self.ttl_secs).unwrap_or(i64::MAX) {
            return Err(SdkError::CursorExpired);
        }
        Ok(state)
    }
}
