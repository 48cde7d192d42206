//! Shared wire types: account addresses, transaction metadata, and the
//! `Trigger` / `Period` enums as they appear in on-chain event JSON.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

// ─── Serde helpers ────────────────────────────────────────────────────────────

/// Move emits `u64` / `u128` values as decimal strings.
///
/// Use as `#[serde(with = "as_string")]`.
pub mod as_string {
    use std::fmt::Display;
    use std::str::FromStr;

    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S, T>(value: &T, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Display,
    {
        s.collect_str(value)
    }

    pub fn deserialize<'de, D, T>(d: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr,
        T::Err: Display,
    {
        let s = String::deserialize(d)?;
        s.parse::<T>().map_err(de::Error::custom)
    }
}

/// `vector<u8>` fields are emitted as `0x`-prefixed hex.
pub mod hex_bytes {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(d)?;
        hex::decode(s.trim_start_matches("0x")).map_err(de::Error::custom)
    }
}

// ─── Account address ──────────────────────────────────────────────────────────

/// A 32-byte account address, always displayed in its standardized long form.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountAddress([u8; AccountAddress::LENGTH]);

impl AccountAddress {
    pub const LENGTH: usize = 32;
    pub const ZERO: AccountAddress = AccountAddress([0u8; Self::LENGTH]);

    pub const fn new(bytes: [u8; Self::LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; Self::LENGTH] {
        &self.0
    }
}

impl FromStr for AccountAddress {
    type Err = Error;

    /// Accepts `0x`-prefixed or bare hex with up to 64 digits; short forms
    /// such as `0x1` are left-padded.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        if digits.is_empty() || digits.len() > Self::LENGTH * 2 {
            return Err(Error::InvalidArgument(format!(
                "'{s}' is not a valid account address (expected 1 to 64 hex digits)"
            )));
        }
        let padded = format!("{digits:0>64}");
        let mut bytes = [0u8; Self::LENGTH];
        hex::decode_to_slice(&padded, &mut bytes)
            .map_err(|e| Error::InvalidArgument(format!("'{s}' is not a valid account address: {e}")))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl Serialize for AccountAddress {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AccountAddress {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        s.parse().map_err(de::Error::custom)
    }
}

// ─── Transaction metadata ─────────────────────────────────────────────────────

/// Per-transaction metadata supplied by the caller and attached verbatim to
/// every row derived from that transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxnInfo {
    #[serde(with = "as_string")]
    pub version: u64,
    pub sender: AccountAddress,
    /// Fully qualified entry function, absent for script or system transactions.
    #[serde(default)]
    pub entry_function: Option<String>,
    /// Block timestamp in microseconds.
    #[serde(with = "as_string")]
    pub time: u64,
}

impl TxnInfo {
    pub fn timestamp(&self) -> DateTime<Utc> {
        micros_to_datetime(self.time)
    }
}

/// Convert on-chain microseconds to a UTC timestamp; out-of-range values map to the epoch.
pub fn micros_to_datetime(micros: u64) -> DateTime<Utc> {
    let secs = (micros / 1_000_000) as i64;
    let nanos = ((micros % 1_000_000) * 1_000) as u32;
    DateTime::from_timestamp(secs, nanos).unwrap_or_default()
}

// ─── Trigger ──────────────────────────────────────────────────────────────────

/// The user action that bumped a market's state. Emitted as a `u8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    PackagePublication,
    MarketRegistration,
    SwapBuy,
    SwapSell,
    ProvideLiquidity,
    RemoveLiquidity,
    Chat,
}

impl TryFrom<u8> for Trigger {
    type Error = Error;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        Ok(match raw {
            0 => Trigger::PackagePublication,
            1 => Trigger::MarketRegistration,
            2 => Trigger::SwapBuy,
            3 => Trigger::SwapSell,
            4 => Trigger::ProvideLiquidity,
            5 => Trigger::RemoveLiquidity,
            6 => Trigger::Chat,
            other => {
                return Err(Error::InvalidArgument(format!("unknown trigger value {other}")))
            }
        })
    }
}

impl From<Trigger> for u8 {
    fn from(trigger: Trigger) -> Self {
        match trigger {
            Trigger::PackagePublication => 0,
            Trigger::MarketRegistration => 1,
            Trigger::SwapBuy => 2,
            Trigger::SwapSell => 3,
            Trigger::ProvideLiquidity => 4,
            Trigger::RemoveLiquidity => 5,
            Trigger::Chat => 6,
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Trigger::PackagePublication => "package_publication",
            Trigger::MarketRegistration => "market_registration",
            Trigger::SwapBuy => "swap_buy",
            Trigger::SwapSell => "swap_sell",
            Trigger::ProvideLiquidity => "provide_liquidity",
            Trigger::RemoveLiquidity => "remove_liquidity",
            Trigger::Chat => "chat",
        })
    }
}

impl Serialize for Trigger {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u8((*self).into())
    }
}

impl<'de> Deserialize<'de> for Trigger {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = u8::deserialize(d)?;
        Trigger::try_from(raw).map_err(de::Error::custom)
    }
}

// ─── Period ───────────────────────────────────────────────────────────────────

/// Resolution of a periodic state rollup. Emitted as its duration in
/// microseconds, as a decimal string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Period {
    OneMinute,
    FiveMinutes,
    FifteenMinutes,
    ThirtyMinutes,
    OneHour,
    FourHours,
    OneDay,
}

impl Period {
    /// Every resolution, shortest first.
    pub const ALL: [Period; 7] = [
        Period::OneMinute,
        Period::FiveMinutes,
        Period::FifteenMinutes,
        Period::ThirtyMinutes,
        Period::OneHour,
        Period::FourHours,
        Period::OneDay,
    ];

    pub const fn as_micros(self) -> u64 {
        match self {
            Period::OneMinute => 60_000_000,
            Period::FiveMinutes => 300_000_000,
            Period::FifteenMinutes => 900_000_000,
            Period::ThirtyMinutes => 1_800_000_000,
            Period::OneHour => 3_600_000_000,
            Period::FourHours => 14_400_000_000,
            Period::OneDay => 86_400_000_000,
        }
    }
}

impl TryFrom<u64> for Period {
    type Error = Error;

    fn try_from(micros: u64) -> Result<Self, Self::Error> {
        Period::ALL
            .into_iter()
            .find(|p| p.as_micros() == micros)
            .ok_or_else(|| Error::InvalidArgument(format!("unknown period duration {micros}µs")))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Period::OneMinute => "period_1m",
            Period::FiveMinutes => "period_5m",
            Period::FifteenMinutes => "period_15m",
            Period::ThirtyMinutes => "period_30m",
            Period::OneHour => "period_1h",
            Period::FourHours => "period_4h",
            Period::OneDay => "period_1d",
        })
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&self.as_micros())
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let micros: u64 = as_string::deserialize(d)?;
        Period::try_from(micros).map_err(de::Error::custom)
    }
}
