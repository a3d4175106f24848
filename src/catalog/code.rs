//! Catalog code types - country codes and combined region codes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Two-letter uppercase country code (ISO 3166-1 alpha-2 style)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CountryCode(String);

impl CountryCode {
    /// Parse a country code, normalizing to uppercase
    pub fn new(s: &str) -> Result<Self, CodeParseError> {
        s.parse()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CountryCode {
    type Err = CodeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.len() != 2 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CodeParseError::InvalidCountry(s.to_string()));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }
}

impl Serialize for CountryCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for CountryCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Combined region code: country prefix + region suffix (e.g. "US-CA")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionCode {
    country: CountryCode,
    suffix: String,
}

impl RegionCode {
    /// Build a region code from its parts
    pub fn from_parts(country: CountryCode, suffix: &str) -> Result<Self, CodeParseError> {
        if !is_valid_suffix(suffix) {
            return Err(CodeParseError::InvalidSuffix(format!(
                "{}-{}",
                country, suffix
            )));
        }
        Ok(Self {
            country,
            suffix: suffix.to_ascii_uppercase(),
        })
    }

    /// The country this region belongs to
    pub fn country(&self) -> &CountryCode {
        &self.country
    }

    /// The suffix part after the delimiter
    pub fn suffix(&self) -> &str {
        &self.suffix
    }
}

fn is_valid_suffix(s: &str) -> bool {
    (1..=4).contains(&s.len()) && s.chars().all(|c| c.is_ascii_alphanumeric())
}

impl fmt::Display for RegionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.country, self.suffix)
    }
}

impl FromStr for RegionCode {
    type Err = CodeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (country_str, suffix) = s
            .split_once('-')
            .ok_or_else(|| CodeParseError::MissingDelimiter(s.to_string()))?;

        let country = country_str.parse()?;
        Self::from_parts(country, suffix)
    }
}

impl Serialize for RegionCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for RegionCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors that can occur when parsing catalog codes
#[derive(Debug, Error)]
pub enum CodeParseError {
    #[error("invalid country code '{0}': expected two ASCII letters (e.g. 'US')")]
    InvalidCountry(String),

    #[error("missing '-' delimiter in region code: '{0}'")]
    MissingDelimiter(String),

    #[error("invalid region code '{0}': suffix must be 1-4 alphanumeric characters")]
    InvalidSuffix(String),
}
