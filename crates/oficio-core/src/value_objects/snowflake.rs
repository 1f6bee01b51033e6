//! Snowflake ID - 64-bit time-ordered unique identifier
//!
//! Layout:
//! - Bits 63-22: milliseconds since the Oficio epoch
//! - Bits 21-14: node ID (0-255)
//! - Bits 13-0:  per-millisecond sequence (0-16383)
//!
//! Ids generated by the same node are strictly increasing, which is what the
//! timeline relies on as the secondary sort key for equal timestamps.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// 64-bit time-ordered identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Snowflake(i64);

impl Snowflake {
    /// Oficio epoch: 2023-06-01 00:00:00 UTC (milliseconds)
    pub const EPOCH: i64 = 1_685_577_600_000;

    const NODE_BITS: u8 = 8;
    const SEQ_BITS: u8 = 14;

    /// Wrap a raw i64 value
    #[inline]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw i64 value
    #[inline]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Milliseconds since the Unix epoch at which this id was minted
    #[inline]
    pub fn timestamp_ms(self) -> i64 {
        (self.0 >> (Self::NODE_BITS + Self::SEQ_BITS)) + Self::EPOCH
    }

    /// Node that minted this id
    #[inline]
    pub fn node_id(self) -> u8 {
        ((self.0 >> Self::SEQ_BITS) & 0xFF) as u8
    }

    /// Creation time as a chrono timestamp
    pub fn created_at(self) -> chrono::DateTime<chrono::Utc> {
        use chrono::{TimeZone, Utc};
        Utc.timestamp_millis_opt(self.timestamp_ms())
            .single()
            .unwrap_or_else(|| Utc.timestamp_millis_opt(0).unwrap())
    }

    /// Parse from the string form used on the wire
    pub fn parse(s: &str) -> Result<Self, SnowflakeParseError> {
        s.parse::<i64>()
            .map(Snowflake)
            .map_err(|_| SnowflakeParseError::Malformed)
    }
}

/// Error when parsing a Snowflake from a string
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SnowflakeParseError {
    #[error("malformed snowflake id")]
    Malformed,
}

impl fmt::Display for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Snowflake {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl From<Snowflake> for i64 {
    fn from(id: Snowflake) -> Self {
        id.0
    }
}

impl std::str::FromStr for Snowflake {
    type Err = SnowflakeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Snowflake::parse(s)
    }
}

// Ids travel as JSON strings; i64 does not survive a JavaScript number.
impl Serialize for Snowflake {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Snowflake {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct IdVisitor;

        impl Visitor<'_> for IdVisitor {
            type Value = Snowflake;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a snowflake id as string or integer")
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<Snowflake, E> {
                Ok(Snowflake(value))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Snowflake, E> {
                Ok(Snowflake(value as i64))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Snowflake, E> {
                Snowflake::parse(value).map_err(|_| de::Error::custom("malformed snowflake id"))
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}

/// Thread-safe Snowflake generator
///
/// State lives behind a single mutex: generation is nowhere near hot enough
/// in this system to justify the lock-free dance, and the mutex makes the
/// clock-rollback handling straightforward.
pub struct SnowflakeGenerator {
    node_id: u8,
    state: Mutex<GeneratorState>,
}

struct GeneratorState {
    last_ms: i64,
    sequence: i64,
}

impl SnowflakeGenerator {
    const MAX_SEQUENCE: i64 = (1 << Snowflake::SEQ_BITS) - 1;

    pub fn new(node_id: u8) -> Self {
        Self {
            node_id,
            state: Mutex::new(GeneratorState {
                last_ms: 0,
                sequence: 0,
            }),
        }
    }

    /// Mint a new id, unique within this node
    pub fn generate(&self) -> Snowflake {
        let mut state = self.state.lock();

        let mut now = Self::clock_ms();
        if now < state.last_ms {
            // Clock went backwards; reuse the last observed millisecond so
            // ids stay monotone.
            now = state.last_ms;
        }

        if now == state.last_ms {
            state.sequence += 1;
            if state.sequence > Self::MAX_SEQUENCE {
                // Sequence exhausted for this millisecond, spin to the next
                while Self::clock_ms() <= state.last_ms {
                    std::hint::spin_loop();
                }
                now = Self::clock_ms();
                state.sequence = 0;
            }
        } else {
            state.sequence = 0;
        }
        state.last_ms = now;

        let raw = ((now - Snowflake::EPOCH) << (Snowflake::NODE_BITS + Snowflake::SEQ_BITS))
            | (i64::from(self.node_id) << Snowflake::SEQ_BITS)
            | state.sequence;
        Snowflake::new(raw)
    }

    pub fn node_id(&self) -> u8 {
        self.node_id
    }

    #[inline]
    fn clock_ms() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0)
    }
}

impl Default for SnowflakeGenerator {
    fn default() -> Self {
        Self::new(0)
    }
}
