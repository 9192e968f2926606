//! Signed, stateless page cursors
//!
//! Layout before encoding (big-endian):
//!
//! ```text
//! [version: u8][fingerprint: 32][direction: u8][timestamp: i64][mac: 32]
//! ```
//!
//! The MAC is a keyed BLAKE3 hash over everything before it. The token is
//! URL-safe base64 without padding.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

use crate::constants::{CURSOR_KEY_CONTEXT, CURSOR_VERSION};
use crate::{Error, Result};

const FINGERPRINT_LEN: usize = 32;
const MAC_LEN: usize = 32;
const PAYLOAD_LEN: usize = 1 + FINGERPRINT_LEN + 1 + 8;
const TOKEN_LEN: usize = PAYLOAD_LEN + MAC_LEN;

/// Which way a cursor pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    /// Resume strictly after the cursor timestamp
    Forward,
    /// Page strictly before the cursor timestamp
    Backward,
}

impl Direction {
    fn as_byte(self) -> u8 {
        match self {
            Direction::Forward => 0,
            Direction::Backward => 1,
        }
    }

    fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Direction::Forward),
            1 => Some(Direction::Backward),
            _ => None,
        }
    }
}

/// Decoded cursor contents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    pub fingerprint: [u8; FINGERPRINT_LEN],
    pub direction: Direction,
    pub timestamp: i64,
}

impl PageCursor {
    pub fn new(fingerprint: [u8; FINGERPRINT_LEN], direction: Direction, timestamp: i64) -> Self {
        Self {
            fingerprint,
            direction,
            timestamp,
        }
    }

    fn payload(&self) -> [u8; PAYLOAD_LEN] {
        let mut payload = [0u8; PAYLOAD_LEN];
        payload[0] = CURSOR_VERSION;
        payload[1..1 + FINGERPRINT_LEN].copy_from_slice(&self.fingerprint);
        payload[1 + FINGERPRINT_LEN] = self.direction.as_byte();
        payload[2 + FINGERPRINT_LEN..].copy_from_slice(&self.timestamp.to_be_bytes());
        payload
    }
}

/// Signs and verifies cursors with a key derived from a configured secret
#[derive(Clone)]
pub struct CursorSigner {
    key: [u8; 32],
}

impl std::fmt::Debug for CursorSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CursorSigner").finish_non_exhaustive()
    }
}

impl CursorSigner {
    pub fn new(secret: &str) -> Self {
        Self {
            key: blake3::derive_key(CURSOR_KEY_CONTEXT, secret.as_bytes()),
        }
    }

    /// Encode and sign a cursor
    pub fn encode(&self, cursor: &PageCursor) -> String {
        let payload = cursor.payload();
        let mac = blake3::keyed_hash(&self.key, &payload);

        let mut token = Vec::with_capacity(TOKEN_LEN);
        token.extend_from_slice(&payload);
        token.extend_from_slice(mac.as_bytes());
        URL_SAFE_NO_PAD.encode(token)
    }

    /// Verify a token and check it belongs to the query with `fingerprint`
    pub fn decode(&self, token: &str, fingerprint: &[u8; FINGERPRINT_LEN]) -> Result<PageCursor> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|_| Error::invalid_cursor("not a valid cursor encoding"))?;
        if bytes.len() != TOKEN_LEN {
            return Err(Error::invalid_cursor("unexpected cursor length"));
        }

        let (payload, mac) = bytes.split_at(PAYLOAD_LEN);
        let mut mac_bytes = [0u8; MAC_LEN];
        mac_bytes.copy_from_slice(mac);
        // blake3::Hash equality is constant-time
        if blake3::keyed_hash(&self.key, payload) != blake3::Hash::from(mac_bytes) {
            return Err(Error::invalid_cursor("signature mismatch"));
        }

        if payload[0] != CURSOR_VERSION {
            return Err(Error::invalid_cursor(format!(
                "unsupported cursor version {}",
                payload[0]
            )));
        }

        let mut cursor_fingerprint = [0u8; FINGERPRINT_LEN];
        cursor_fingerprint.copy_from_slice(&payload[1..1 + FINGERPRINT_LEN]);
        if &cursor_fingerprint != fingerprint {
            return Err(Error::invalid_cursor("cursor belongs to a different query"));
        }

        let direction = Direction::from_byte(payload[1 + FINGERPRINT_LEN])
            .ok_or_else(|| Error::invalid_cursor("unknown paging direction"))?;

        let mut timestamp = [0u8; 8];
        timestamp.copy_from_slice(&payload[2 + FINGERPRINT_LEN..]);

        Ok(PageCursor::new(
            cursor_fingerprint,
            direction,
            i64::from_be_bytes(timestamp),
        ))
    }
}
