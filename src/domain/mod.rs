//! Domain primitives for the tracking platform.
//!
//! Money is carried as integer minor units so payout splits and balance
//! credits are exact. Roles and offer statuses are stored as plain strings
//! and converted at the service boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Monetary amount in minor units (1/100 of a currency unit).
///
/// Serialized on the wire as a decimal number of currency units.
///
/// # Examples
///
/// ```rust
/// use cpatrack::domain::Money;
///
/// let payout = Money::from_major(1000.0).unwrap();
/// assert_eq!(payout.minor(), 100_000);
/// assert_eq!(payout.as_major(), 1000.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

/// Largest amount accepted from client input, in currency units.
const MAX_MAJOR: f64 = 1_000_000_000_000.0;

impl Money {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Converts a client-supplied amount in currency units, rounding to the
    /// nearest minor unit. Returns `None` for non-finite or out-of-range input.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_major(major: f64) -> Option<Self> {
        if !major.is_finite() || major.abs() > MAX_MAJOR {
            return None;
        }
        Some(Self((major * 100.0).round() as i64))
    }

    #[must_use]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_major(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[must_use]
    pub const fn times(self, factor: i64) -> Self {
        Self(self.0.saturating_mul(factor))
    }

    /// `percent`% of the amount, rounded half away from zero to a minor unit.
    #[must_use]
    pub const fn percent(self, percent: i64) -> Self {
        let scaled = self.0.saturating_mul(percent);
        let rounded = if scaled >= 0 {
            (scaled + 50) / 100
        } else {
            (scaled - 50) / 100
        };
        Self(rounded)
    }

    /// Splits a conversion payout into the platform commission and the
    /// webmaster share. The two parts always add up to `self`.
    #[must_use]
    pub const fn split(self, commission_percent: i64) -> PayoutSplit {
        let commission = self.percent(commission_percent);
        PayoutSplit {
            commission,
            webmaster: Self(self.0 - commission.0),
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl std::ops::Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, m| acc + m)
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_f64(self.as_major())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let major = f64::deserialize(deserializer)?;
        Self::from_major(major)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid amount: {major}")))
    }
}

/// Result of splitting a payout between platform and webmaster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayoutSplit {
    pub commission: Money,
    pub webmaster: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Advertiser,
    Webmaster,
    Admin,
}

impl Role {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Advertiser => "advertiser",
            Self::Webmaster => "webmaster",
            Self::Admin => "admin",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "advertiser" => Some(Self::Advertiser),
            "webmaster" => Some(Self::Webmaster),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Roles a visitor may pick when registering; admins are provisioned offline.
    #[must_use]
    pub const fn is_self_registrable(&self) -> bool {
        matches!(self, Self::Advertiser | Self::Webmaster)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OfferStatus {
    Pending,
    Active,
}

impl OfferStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
        }
    }
}

impl fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
