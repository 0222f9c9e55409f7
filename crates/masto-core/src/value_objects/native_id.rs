//! Native ID - the server's own identifier format
//!
//! Any 1-24 character string over `[0-9a-z]` is a valid native id. Ids issued
//! locally use the aid layout:
//! - Chars 0-7: Timestamp (base-36 milliseconds since 2000-01-01 UTC)
//! - Chars 8-9: Rolling counter (base-36, 0-1295)
//!
//! Ids order by length first, then character by character. Equal-length ids
//! sort in creation order, and the order matches the numeric order of the
//! Mastodon wire form.

use chrono::{DateTime, TimeZone, Utc};
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering as CmpOrdering;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

const TIME_LEN: usize = 8;
const COUNTER_LEN: usize = 2;
const COUNTER_SPACE: u32 = 36 * 36;

/// Native entity identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NativeId(String);

impl Ord for NativeId {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for NativeId {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl NativeId {
    /// Generator epoch: 2000-01-01 00:00:00 UTC (milliseconds)
    pub const EPOCH: i64 = 946_684_800_000;

    /// Longest id the store (and the id codec) accepts
    pub const MAX_LEN: usize = 24;

    /// Parse and validate a native id
    pub fn parse(s: &str) -> Result<Self, NativeIdParseError> {
        if s.is_empty() {
            return Err(NativeIdParseError::Empty);
        }
        if s.len() > Self::MAX_LEN {
            return Err(NativeIdParseError::TooLong { len: s.len() });
        }
        if !s.bytes().all(is_id_byte) {
            return Err(NativeIdParseError::InvalidCharacter);
        }
        Ok(Self(s.to_owned()))
    }

    /// Build an id from bytes already known to satisfy the id alphabet and length.
    pub(crate) fn from_valid_bytes(bytes: Vec<u8>) -> Self {
        debug_assert!(!bytes.is_empty() && bytes.len() <= Self::MAX_LEN);
        debug_assert!(bytes.iter().copied().all(is_id_byte));
        Self(bytes.into_iter().map(char::from).collect())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Timestamp embedded in an aid (milliseconds since Unix epoch)
    ///
    /// Returns `None` for ids too short to carry one.
    pub fn timestamp(&self) -> Option<i64> {
        let head = self.0.get(..TIME_LEN)?;
        let offset = i64::from_str_radix(head, 36).ok()?;
        Some(offset + Self::EPOCH)
    }

    /// Creation time embedded in an aid
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single())
    }
}

#[inline]
fn is_id_byte(b: u8) -> bool {
    b.is_ascii_digit() || b.is_ascii_lowercase()
}

/// Error when parsing a native id from a string
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NativeIdParseError {
    #[error("native id is empty")]
    Empty,

    #[error("native id is {len} characters, longer than 24")]
    TooLong { len: usize },

    #[error("native id contains characters outside [0-9a-z]")]
    InvalidCharacter,
}

impl fmt::Display for NativeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for NativeId {
    type Err = NativeIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NativeId::parse(s)
    }
}

impl AsRef<str> for NativeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<NativeId> for String {
    fn from(id: NativeId) -> Self {
        id.0
    }
}

impl Serialize for NativeId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for NativeId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NativeId::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Thread-safe aid generator
///
/// Issues up to 1296 distinct ids per millisecond; the counter starts at a
/// random offset so separate processes rarely collide.
pub struct NativeIdGenerator {
    counter: AtomicU32,
}

impl NativeIdGenerator {
    pub fn new() -> Self {
        Self::with_counter(rand::thread_rng().gen_range(0..COUNTER_SPACE))
    }

    /// Create a generator with a fixed counter start (deterministic fixtures)
    pub fn with_counter(start: u32) -> Self {
        Self {
            counter: AtomicU32::new(start % COUNTER_SPACE),
        }
    }

    /// Generate an id for the current time
    pub fn generate(&self) -> NativeId {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(NativeId::EPOCH);
        self.generate_at(now)
    }

    /// Generate an id for a given Unix timestamp in milliseconds
    pub fn generate_at(&self, unix_millis: i64) -> NativeId {
        let offset = (unix_millis - NativeId::EPOCH).max(0) as u64;
        let counter = self.counter.fetch_add(1, Ordering::Relaxed) % COUNTER_SPACE;

        let mut bytes = Vec::with_capacity(TIME_LEN + COUNTER_LEN);
        push_base36_padded(&mut bytes, offset, TIME_LEN);
        push_base36_padded(&mut bytes, u64::from(counter), COUNTER_LEN);
        NativeId::from_valid_bytes(bytes)
    }
}

impl Default for NativeIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn push_base36_padded(out: &mut Vec<u8>, mut value: u64, width: usize) {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let start = out.len();
    out.resize(start + width, b'0');
    for slot in out[start..].iter_mut().rev() {
        *slot = DIGITS[(value % 36) as usize];
        value /= 36;
    }
}
