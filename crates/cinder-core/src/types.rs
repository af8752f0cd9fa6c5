//! Core type definitions shared across the Cinder crates

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a non-fungible asset (staked creature, minted ritual)
pub type TokenId = u64;

/// Wave counter value; wave 1 is the first wave after initialization
pub type WaveId = u64;

/// Identifier of a pool-based (semi-fungible) token
pub type PoolId = u64;

/// Identifier of a fungible currency on the asset ledger
pub type CurrencyId = u64;

/// Token handed out by the randomness provider for one request
pub type RequestToken = u64;

/// Unix timestamp in seconds
pub type Timestamp = i64;

/// Raw random value delivered by the randomness provider
pub type RandomValue = [u8; 32];

/// Seconds in one wave (one UTC calendar day)
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Seconds in one hour
pub const SECONDS_PER_HOUR: u64 = 3_600;

/// Fixed-point scale used by hourly rates (1000 = 1.0 per hour)
pub const RATE_SCALE: u64 = 1_000;

/// Address - account identifier of a player or custody vault
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Address([u8; 20]);

impl Address {
    /// Zero/null address
    pub const ZERO: Self = Self([0u8; 20]);

    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Build an address whose last eight bytes hold `n` (tests and simulations)
    pub fn from_low_u64(n: u64) -> Self {
        let mut bytes = [0u8; 20];
        bytes[12..].copy_from_slice(&n.to_be_bytes());
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string, with or without `0x`
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address(0x{})", &self.to_hex()[..12])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

/// One of the five numeric stats reported by the attribute provider
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatSelector {
    Might,
    Wickedness,
    Tenacity,
    Cunning,
    Arcana,
}

impl StatSelector {
    pub const ALL: [StatSelector; 5] = [
        Self::Might,
        Self::Wickedness,
        Self::Tenacity,
        Self::Cunning,
        Self::Arcana,
    ];

    /// Position of this stat in the five-stat array
    pub fn index(&self) -> usize {
        match self {
            Self::Might => 0,
            Self::Wickedness => 1,
            Self::Tenacity => 2,
            Self::Cunning => 3,
            Self::Arcana => 4,
        }
    }
}

/// Class, rarity tier and one selected stat for an asset
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRarityStat {
    pub class: u8,
    pub rarity: u8,
    pub stat_value: u64,
}

/// Comparison applied by a constraint
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    #[default]
    AtLeast,
    AtMost,
    Equal,
}

impl Comparison {
    pub fn holds(&self, actual: u64, expected: u64) -> bool {
        match self {
            Self::AtLeast => actual >= expected,
            Self::AtMost => actual <= expected,
            Self::Equal => actual == expected,
        }
    }
}

/// What a constraint measures about the user
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    /// Balance of a fungible currency
    FungibleBalance { currency: CurrencyId },
    /// Balance of a pool token
    PoolBalance { pool: PoolId },
    /// Number of non-fungible assets held
    NftCount,
}

/// Opaque predicate over user state, evaluated by a `ConstraintChecker`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Constraint {
    pub kind: ConstraintKind,
    #[serde(default)]
    pub comparison: Comparison,
    pub value: u64,
}

impl Constraint {
    pub fn new(kind: ConstraintKind, comparison: Comparison, value: u64) -> Self {
        Self {
            kind,
            comparison,
            value,
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {:?} {}", self.kind, self.comparison, self.value)
    }
}
