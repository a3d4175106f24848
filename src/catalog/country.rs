//! Country and region catalog records

use serde::{Deserialize, Serialize};

use crate::catalog::code::{CountryCode, RegionCode};

/// A country known to the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    /// ISO-style two-letter code
    pub code: CountryCode,

    /// Display name
    pub name: String,
}

impl Country {
    pub fn new(code: CountryCode, name: impl Into<String>) -> Self {
        Self {
            code,
            name: name.into(),
        }
    }
}

/// A region (state, province, subdivision) within a country
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// Combined code carrying the owning country prefix (e.g. "US-CA")
    pub code: RegionCode,

    /// Display name
    pub name: String,
}

impl Region {
    pub fn new(code: RegionCode, name: impl Into<String>) -> Self {
        Self {
            code,
            name: name.into(),
        }
    }

    /// The country this region belongs to
    pub fn country(&self) -> &CountryCode {
        self.code.country()
    }
}
