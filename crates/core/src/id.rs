//! Time-sortable sensor identifiers.
//!
//! A [`SensorId`] is a 64-bit value laid out as 42 bits of milliseconds since
//! [`ID_EPOCH_MILLIS`] followed by 22 bits of randomness. Sorting ids
//! numerically sorts them by creation time. On the wire an id is the
//! 13-character Crockford base32 encoding of the value; in storage it is the
//! value reinterpreted as a signed `BIGINT`.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, TimeZone, Utc};
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

/// 2020-01-01T00:00:00Z in Unix milliseconds.
pub const ID_EPOCH_MILLIS: i64 = 1_577_836_800_000;

/// Number of low bits carrying randomness / the monotonic counter.
const RANDOM_BITS: u32 = 22;
const RANDOM_MASK: u64 = (1 << RANDOM_BITS) - 1;

/// Length of the textual encoding.
pub const ENCODED_LEN: usize = 13;

const ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

// ---------------------------------------------------------------------------
// SensorId
// ---------------------------------------------------------------------------

/// Unique, immutable identifier of a sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SensorId(u64);

impl SensorId {
    pub const fn from_u64(value: u64) -> Self {
        Self(value)
    }

    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Storage representation (`BIGINT`). Bit-preserving.
    pub const fn as_i64(self) -> i64 {
        self.0 as i64
    }

    pub const fn from_i64(value: i64) -> Self {
        Self(value as u64)
    }

    /// Creation instant encoded in the high bits.
    pub fn timestamp(self) -> DateTime<Utc> {
        let millis = (self.0 >> RANDOM_BITS) as i64 + ID_EPOCH_MILLIS;
        Utc.timestamp_millis_opt(millis)
            .single()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = [0u8; ENCODED_LEN];
        for (i, slot) in buf.iter_mut().enumerate() {
            let shift = 60 - 5 * i as u32;
            *slot = ALPHABET[((self.0 >> shift) & 0x1F) as usize];
        }
        // ALPHABET is pure ASCII.
        f.write_str(std::str::from_utf8(&buf).map_err(|_| fmt::Error)?)
    }
}

impl FromStr for SensorId {
    type Err = CoreError;

    /// Parse the 13-character Crockford base32 form. Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != ENCODED_LEN {
            return Err(CoreError::InvalidId(format!(
                "expected {ENCODED_LEN} characters, got {}",
                s.len()
            )));
        }

        let mut value: u64 = 0;
        for (i, byte) in s.bytes().enumerate() {
            let digit = decode_digit(byte)
                .ok_or_else(|| CoreError::InvalidId(format!("invalid character in '{s}'")))?;
            // The leading character only carries the top 4 bits.
            if i == 0 && digit > 0x0F {
                return Err(CoreError::InvalidId(format!("'{s}' exceeds 64 bits")));
            }
            value = (value << 5) | u64::from(digit);
        }
        Ok(Self(value))
    }
}

/// Crockford decoding: `O` reads as zero, `I` and `L` read as one.
fn decode_digit(byte: u8) -> Option<u8> {
    let upper = match byte.to_ascii_uppercase() {
        b'O' => b'0',
        b'I' | b'L' => b'1',
        other => other,
    };
    ALPHABET
        .iter()
        .position(|&c| c == upper)
        .map(|pos| pos as u8)
}

impl Serialize for SensorId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SensorId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Source of new sensor identifiers. Injected into the API state so tests
/// can supply deterministic ids.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> SensorId;
}

/// Default generator: current time in the high bits, random low bits, and a
/// strictly increasing guarantee per generator instance.
#[derive(Debug, Default)]
pub struct TsidGenerator {
    last: AtomicU64,
}

impl TsidGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for TsidGenerator {
    fn next_id(&self) -> SensorId {
        let elapsed = (Utc::now().timestamp_millis() - ID_EPOCH_MILLIS).max(0) as u64;
        let random = u64::from(rand::rng().random::<u32>()) & RANDOM_MASK;
        let candidate = (elapsed << RANDOM_BITS) | random;

        let mut last = self.last.load(Ordering::Acquire);
        loop {
            let next = if candidate > last { candidate } else { last + 1 };
            match self
                .last
                .compare_exchange_weak(last, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return SensorId(next),
                Err(actual) => last = actual,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn encodes_extremes() {
        assert_eq!(SensorId::from_u64(0).to_string(), "0000000000000");
        assert_eq!(SensorId::from_u64(u64::MAX).to_string(), "FZZZZZZZZZZZZ");
        assert_eq!(SensorId::from_u64(32).to_string(), "0000000000010");
    }

    #[test]
    fn parses_its_own_encoding() {
        let id = SensorId::from_u64(0x0123_4567_89AB_CDEF);
        let parsed: SensorId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn parse_is_case_insensitive() {
        let upper: SensorId = "0ABCDEFGHJKMN".parse().unwrap();
        let lower: SensorId = "0abcdefghjkmn".parse().unwrap();
        assert_eq!(upper, lower);
    }

    #[test]
    fn parse_accepts_crockford_aliases() {
        let canonical: SensorId = "0100000000001".parse().unwrap();
        for alias in ["OI0000000000L", "oiooooooooool", "0L0000000000I"] {
            assert_eq!(alias.parse::<SensorId>().unwrap(), canonical, "alias {alias}");
        }
    }

    #[test]
    fn parse_rejects_wrong_length() {
        assert_matches!("123".parse::<SensorId>(), Err(CoreError::InvalidId(_)));
        assert_matches!("".parse::<SensorId>(), Err(CoreError::InvalidId(_)));
    }

    #[test]
    fn parse_rejects_characters_outside_alphabet() {
        assert_matches!("000000000000U".parse::<SensorId>(), Err(CoreError::InvalidId(_)));
        assert_matches!("00000000000-1".parse::<SensorId>(), Err(CoreError::InvalidId(_)));
    }

    #[test]
    fn parse_rejects_overflowing_leading_digit() {
        assert_matches!("G000000000000".parse::<SensorId>(), Err(CoreError::InvalidId(_)));
    }

    #[test]
    fn storage_form_preserves_bits() {
        let id = SensorId::from_u64(u64::MAX - 7);
        assert!(id.as_i64() < 0);
        assert_eq!(SensorId::from_i64(id.as_i64()), id);
    }

    #[test]
    fn serializes_as_string() {
        let id = SensorId::from_u64(42);
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json, serde_json::json!("000000000001A"));
        let back: SensorId = serde_json::from_value(json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn generator_is_strictly_increasing() {
        let generator = TsidGenerator::new();
        let mut previous = generator.next_id();
        for _ in 0..10_000 {
            let next = generator.next_id();
            assert!(next > previous);
            previous = next;
        }
    }

    #[test]
    fn generated_id_carries_current_time() {
        let before = Utc::now();
        let id = TsidGenerator::new().next_id();
        let drift = (id.timestamp() - before).num_milliseconds().abs();
        assert!(drift < 5_000, "timestamp drifted by {drift}ms");
    }
}
