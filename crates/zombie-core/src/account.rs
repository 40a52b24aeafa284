//! Accounts, timestamps, and the per-call execution context.
//!
//! An [`Account`] is a 20-byte address rendered as `0x`-prefixed lowercase
//! hex. The core never authenticates accounts itself: the surrounding
//! execution context hands every operation a [`CallContext`] naming the
//! caller and the current time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ---------------------------------------------------------------------------
// Account
// ---------------------------------------------------------------------------

/// A 20-byte account address.
///
/// Serializes as a `0x`-prefixed hex string so it can be used as a JSON map
/// key in snapshots.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Account([u8; 20]);

impl Account {
    /// The all-zero address.
    pub const ZERO: Account = Account([0; 20]);

    /// Construct an account from raw bytes.
    #[inline]
    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Derive a stable account address from a human-readable label.
    ///
    /// The address is the first 20 bytes of the BLAKE3 digest of `label`.
    /// Handy for fixtures and demos (`Account::derive("alice")`).
    pub fn derive(label: &str) -> Self {
        let digest = blake3::hash(label.as_bytes());
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest.as_bytes()[..20]);
        Self(bytes)
    }

    /// Raw address bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Account({self})")
    }
}

/// Errors produced when parsing an [`Account`] from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountParseError {
    /// The string does not start with `0x`.
    #[error("account address must start with 0x")]
    MissingPrefix,
    /// The hex body is not exactly 40 characters.
    #[error("account address must have 40 hex digits, got {0}")]
    BadLength(usize),
    /// The body is not valid hex.
    #[error("invalid hex in account address: {0}")]
    BadHex(String),
}

impl FromStr for Account {
    type Err = AccountParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").ok_or(AccountParseError::MissingPrefix)?;
        if digits.len() != 40 {
            return Err(AccountParseError::BadLength(digits.len()));
        }
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|err| AccountParseError::BadHex(err.to_string()))?;
        Ok(Self(bytes))
    }
}

impl Serialize for Account {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Account {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Timestamp
// ---------------------------------------------------------------------------

/// A point in time, in whole seconds, as reported by the execution context.
///
/// The core only compares and offsets timestamps; it never reads a clock.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// Time zero.
    pub const EPOCH: Timestamp = Timestamp(0);

    /// Seconds since [`Timestamp::EPOCH`].
    #[inline]
    pub fn secs(self) -> u64 {
        self.0
    }

    /// Offset by `secs`, saturating at `u64::MAX`.
    #[inline]
    pub fn saturating_add(self, secs: u64) -> Self {
        Self(self.0.saturating_add(secs))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

// ---------------------------------------------------------------------------
// CallContext
// ---------------------------------------------------------------------------

/// Readings supplied by the execution context for a single call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    /// The authenticated account making the call.
    pub caller: Account,
    /// The current time.
    pub now: Timestamp,
}

impl CallContext {
    /// Build a context for `caller` at time `now`.
    pub fn new(caller: Account, now: Timestamp) -> Self {
        Self { caller, now }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_is_stable_and_distinct() {
        assert_eq!(Account::derive("alice"), Account::derive("alice"));
        assert_ne!(Account::derive("alice"), Account::derive("bob"));
    }

    #[test]
    fn display_parse_roundtrip() {
        let alice = Account::derive("alice");
        let text = alice.to_string();
        assert!(text.starts_with("0x"));
        assert_eq!(text.len(), 42);
        assert_eq!(text.parse::<Account>().unwrap(), alice);
    }

    #[test]
    fn parse_rejects_malformed_addresses() {
        assert_eq!(
            "1234".parse::<Account>(),
            Err(AccountParseError::MissingPrefix)
        );
        assert_eq!(
            "0x1234".parse::<Account>(),
            Err(AccountParseError::BadLength(4))
        );
        let bad = format!("0x{}", "zz".repeat(20));
        assert!(matches!(
            bad.parse::<Account>(),
            Err(AccountParseError::BadHex(_))
        ));
    }

    #[test]
    fn parse_rejects_signed_digit_pairs() {
        let signed = format!("0x{}", "+f".repeat(20));
        assert!(matches!(
            signed.parse::<Account>(),
            Err(AccountParseError::BadHex(_))
        ));
    }

    #[test]
    fn parse_accepts_uppercase_and_prints_lowercase() {
        let upper = format!("0x{}", "AB".repeat(20));
        let account: Account = upper.parse().unwrap();
        assert_eq!(account.to_string(), format!("0x{}", "ab".repeat(20)));
    }

    #[test]
    fn account_serializes_as_hex_string() {
        let json = serde_json::to_string(&Account::ZERO).unwrap();
        assert_eq!(json, format!("\"0x{}\"", "00".repeat(20)));
        let back: Account = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Account::ZERO);
    }

    #[test]
    fn timestamp_saturates() {
        assert_eq!(Timestamp(u64::MAX).saturating_add(10), Timestamp(u64::MAX));
        assert_eq!(Timestamp(5).saturating_add(10), Timestamp(15));
    }
}
