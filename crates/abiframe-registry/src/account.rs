//! Accounts and the date range their rows are queried over.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RegistryError;

/// A validated account address, stored lower-case with its `0x` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    pub fn parse(raw: &str) -> Result<Self, RegistryError> {
        let trimmed = raw.trim();
        let valid = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .filter(|hex| hex.len() == 40 && hex.bytes().all(|b| b.is_ascii_hexdigit()));
        match valid {
            Some(hex) => Ok(Self(format!("0x{}", hex.to_ascii_lowercase()))),
            None => Err(RegistryError::InvalidAddress(raw.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against an address as it appears in a row.
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other.trim())
    }
}

impl FromStr for Address {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = RegistryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Address> for String {
    fn from(a: Address) -> Self {
        a.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Inclusive day range. `start` counts from midnight, `end` through the
/// whole day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRange {
    #[serde(default)]
    pub start: Option<NaiveDate>,
    #[serde(default)]
    pub end: Option<NaiveDate>,
}

impl QueryRange {
    /// Parse `YYYY-MM-DD` bounds.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self, RegistryError> {
        let day = |s: &str| {
            NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|e| {
                RegistryError::InvalidDateRange {
                    reason: format!("'{s}' is not a YYYY-MM-DD date: {e}"),
                }
            })
        };
        let range = Self {
            start: start.map(day).transpose()?,
            end: end.map(day).transpose()?,
        };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> Result<(), RegistryError> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if start > end => Err(RegistryError::InvalidDateRange {
                reason: format!("start {start} is after end {end}"),
            }),
            _ => Ok(()),
        }
    }

    pub fn contains(&self, at: &DateTime<Utc>) -> bool {
        let day = at.date_naive();
        self.start.map_or(true, |s| day >= s) && self.end.map_or(true, |e| day <= e)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub address: Address,
    #[serde(default)]
    pub query_range: QueryRange,
}

impl Account {
    pub fn new(address: &str) -> Result<Self, RegistryError> {
        Ok(Self {
            address: Address::parse(address)?,
            query_range: QueryRange::default(),
        })
    }

    pub fn with_range(mut self, range: QueryRange) -> Self {
        self.query_range = range;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_is_lowercased() {
        let a = Address::parse("0x1f52b87C3503e537853e160adBF7E330eA0Be7C4").unwrap();
        assert_eq!(a.as_str(), "0x1f52b87c3503e537853e160adbf7e330ea0be7c4");
        assert!(a.matches("0x1F52B87C3503E537853E160ADBF7E330EA0BE7C4"));
    }

    #[test]
    fn invalid_addresses() {
        for raw in ["", "0x1234", "1f52b87c3503e537853e160adbf7e330ea0be7c4", "0xzz52b87c3503e537853e160adbf7e330ea0be7c4"] {
            assert!(
                matches!(Address::parse(raw), Err(RegistryError::InvalidAddress(_))),
                "{raw}"
            );
        }
    }

    #[test]
    fn address_deserializes_with_validation() {
        let a: Address =
            serde_json::from_str(r#""0xEB9951021698B42E4399F9CBB6267AA35F82D59D""#).unwrap();
        assert_eq!(a.to_string(), "0xeb9951021698b42e4399f9cbb6267aa35f82d59d");
        assert!(serde_json::from_str::<Address>(r#""0x12""#).is_err());
    }

    #[test]
    fn range_is_inclusive_on_both_days() {
        let range = QueryRange::parse(Some("2019-01-29"), Some("2019-01-29")).unwrap();
        let at = |s: &str| DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc);
        assert!(range.contains(&at("2019-01-29T00:00:00Z")));
        assert!(range.contains(&at("2019-01-29T23:59:59Z")));
        assert!(!range.contains(&at("2019-01-30T00:00:00Z")));
        assert!(!range.contains(&at("2019-01-28T23:59:59Z")));
    }

    #[test]
    fn open_range_contains_everything() {
        let at = DateTime::parse_from_rfc3339("2015-07-30T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert!(QueryRange::default().contains(&at));
    }

    #[test]
    fn inverted_or_malformed_range() {
        assert!(QueryRange::parse(Some("2019-02-01"), Some("2019-01-01")).is_err());
        assert!(QueryRange::parse(Some("01/02/2019"), None).is_err());
    }
}
