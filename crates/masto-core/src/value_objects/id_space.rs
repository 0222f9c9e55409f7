//! Identifier spaces - reversible mapping between native ids and the ids
//! handed to Mastodon clients
//!
//! A native id is read as a bijective base-36 numeral (digits `0-9a-z` map to
//! 1..=36). Bijective numeration has no zero digit, so every id string maps to
//! exactly one positive integer and back, including ids with leading `0`s.
//!
//! | Space      | Foreign form                                             |
//! |------------|----------------------------------------------------------|
//! | `native`   | the native id itself                                     |
//! | `mastodon` | decimal value, first character most significant          |
//! | `legacy`   | decimal value, first character least significant         |
//!
//! 24 characters of base 36 stay below 2^125, so `u128` covers the whole domain.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::NativeId;
use crate::error::DomainError;

const RADIX: u128 = 36;
const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Longest decimal rendering of a `u128`
const MAX_DECIMAL_LEN: usize = 39;

/// Id space a foreign id belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdSpace {
    Native,
    #[default]
    Mastodon,
    Legacy,
}

impl IdSpace {
    pub const ALL: [IdSpace; 3] = [IdSpace::Native, IdSpace::Mastodon, IdSpace::Legacy];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Mastodon => "mastodon",
            Self::Legacy => "legacy",
        }
    }

    /// Encode a native id into this space
    pub fn encode(self, id: &NativeId) -> ForeignId {
        let bytes = id.as_str().bytes();
        let value = match self {
            Self::Native => return ForeignId(id.as_str().to_owned()),
            Self::Mastodon => bytes.fold(0, accumulate),
            Self::Legacy => bytes.rev().fold(0, accumulate),
        };
        ForeignId(value.to_string())
    }

    /// Decode a foreign id from this space
    pub fn decode(self, raw: &str) -> Result<NativeId, DomainError> {
        let malformed = || DomainError::MalformedIdentifier {
            space: self,
            input: truncate_for_error(raw),
        };

        if self == Self::Native {
            return NativeId::parse(raw).map_err(|_| malformed());
        }

        if raw.is_empty()
            || raw.len() > MAX_DECIMAL_LEN
            || raw.starts_with('0')
            || !raw.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(malformed());
        }

        let value: u128 = raw.parse().map_err(|_| malformed())?;

        // least significant digit first
        let mut digits = Vec::with_capacity(NativeId::MAX_LEN);
        let mut rest = value;
        while rest > 0 {
            rest -= 1;
            digits.push(DIGITS[(rest % RADIX) as usize]);
            rest /= RADIX;
            if digits.len() > NativeId::MAX_LEN {
                return Err(malformed());
            }
        }

        if self == Self::Mastodon {
            digits.reverse();
        }

        Ok(NativeId::from_valid_bytes(digits))
    }

    /// Decode a batch of foreign ids, failing on the first malformed one
    pub fn decode_all<S: AsRef<str>>(self, raw: &[S]) -> Result<Vec<NativeId>, DomainError> {
        raw.iter().map(|s| self.decode(s.as_ref())).collect()
    }
}

#[inline]
fn accumulate(acc: u128, byte: u8) -> u128 {
    acc * RADIX + digit_value(byte)
}

#[inline]
fn digit_value(byte: u8) -> u128 {
    let v = match byte {
        b'0'..=b'9' => byte - b'0',
        _ => byte - b'a' + 10,
    };
    u128::from(v) + 1
}

fn truncate_for_error(raw: &str) -> String {
    raw.chars().take(64).collect()
}

impl fmt::Display for IdSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdSpace {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "native" => Ok(Self::Native),
            "mastodon" => Ok(Self::Mastodon),
            "legacy" => Ok(Self::Legacy),
            other => Err(DomainError::ValidationError(format!(
                "unknown id space: {other}"
            ))),
        }
    }
}

/// Identifier as seen by a Mastodon client
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ForeignId(String);

impl ForeignId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ForeignId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ForeignId> for String {
    fn from(id: ForeignId) -> Self {
        id.0
    }
}
