use anyhow::{anyhow, Result};
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use rand::RngCore;
use time::OffsetDateTime;

pub const PUBLIC_ID_LEN: usize = 7;

const INTERNAL_ID_LEN: usize = 12;

/// Fixed-width internal record identity: a 4-byte big-endian unix
/// timestamp followed by 8 random bytes. The width is a hard precondition
/// of the public-id derivation, so it is enforced by construction rather
/// than checked at every call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InternalId([u8; INTERNAL_ID_LEN]);

impl InternalId {
    pub fn generate() -> Self {
        let mut bytes = [0u8; INTERNAL_ID_LEN];
        let seconds = OffsetDateTime::now_utc().unix_timestamp() as u32;
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        rand::thread_rng().fill_bytes(&mut bytes[4..]);
        Self(bytes)
    }

    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let decoded = hex::decode(hex_str)
            .map_err(|err| anyhow!("invalid internal id: {}", err))?;
        if decoded.len() != INTERNAL_ID_LEN {
            return Err(anyhow!(
                "invalid internal id: expected {} bytes, got {}",
                INTERNAL_ID_LEN,
                decoded.len()
            ));
        }
        let mut bytes = [0u8; INTERNAL_ID_LEN];
        bytes.copy_from_slice(&decoded);
        Ok(Self(bytes))
    }

    pub fn to_hex(self) -> String {
        hex::encode(self.0)
    }
}

/// Derives the 7-character public identifier from an internal one.
///
/// The two encoded ranges deliberately sit at opposite ends of the
/// identifier: bytes [0..2] are the high timestamp bytes (nearly constant,
/// padding trimmed) and bytes [9..12] are the random tail (kept verbatim),
/// so the result neither exposes creation order nor the full internal
/// value. No database round-trip is involved; uniqueness is the unique
/// index's job.
pub fn derive_public_id(id: &InternalId) -> String {
    let head = URL_SAFE.encode(&id.0[..2]);
    let tail = URL_SAFE.encode(&id.0[9..]);
    format!("{}{}", head.trim_end_matches('='), tail)
}

/// Cheap format check only. Says nothing about existence.
pub fn validate_public_id(id: &str) -> bool {
    id.len() == PUBLIC_ID_LEN
}

/// Fresh public id for a new record.
pub fn new_public_id() -> String {
    derive_public_id(&InternalId::generate())
}
