//! Configuration group categories.
//!
//! Categories are backend-owned vocabulary, so [`ConfigCategory`] stays an
//! open string newtype. The class split matters to the release gate: only
//! technical categories count as context-like changes and must go out in a
//! context-only package.

use serde::{Deserialize, Serialize};

/// Categories describing functional configuration.
pub const FUNCTIONAL_CATEGORIES: [&str; 14] = [
    "MARKET_DATA",
    "REPORT",
    "TRADE_SET",
    "PRICER",
    "SCENARIO",
    "OUTPUT",
    "TIME_OF_DAY",
    "DOWNSTREAM",
    "MANIFEST",
    "AD_GROUP",
    "EXECUTION_SYSTEM",
    "MISCELLANEOUS_GROUP",
    "QTF_SCOPE",
    "ENTITY",
];

/// Categories describing technical plumbing tied to a context.
pub const TECHNICAL_CATEGORIES: [&str; 16] = [
    "AQS",
    "SUMMIT",
    "TRADE_CACHE",
    "XDS",
    "GOLDEN_EYE",
    "JOB_CONSUMER",
    "QUERY_TIME",
    "SOLACE",
    "DATAFLOW",
    "GOLDENEYE_GRIDLIB",
    "XARA_MANIFEST",
    "EXECUTION_ENV",
    "DS_BROKER",
    "RUNDECK_LAUNCHER",
    "SUMMIT_FILTER",
    "SILICON",
];

/// Superseded category names kept for old packages.
pub const LEGACY_CATEGORIES: [&str; 3] = ["MARKET_DATA_V1", "REPORT_V1", "TRADE_SET_V1"];

/// Broad class of a configuration category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryClass {
    Functional,
    Technical,
    Legacy,
    /// Not in any known list; treated as functional by the gate.
    Unknown,
}

/// A configuration group category, e.g. `MARKET_DATA` or `AQS`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ConfigCategory(String);

impl ConfigCategory {
    pub fn new(name: impl Into<String>) -> Self {
        ConfigCategory(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn class(&self) -> CategoryClass {
        if TECHNICAL_CATEGORIES.contains(&self.0.as_str()) {
            CategoryClass::Technical
        } else if FUNCTIONAL_CATEGORIES.contains(&self.0.as_str()) {
            CategoryClass::Functional
        } else if LEGACY_CATEGORIES.contains(&self.0.as_str()) {
            CategoryClass::Legacy
        } else {
            CategoryClass::Unknown
        }
    }

    /// Whether this category isolates a release: technical configuration can
    /// only be released together with contexts.
    pub fn is_technical(&self) -> bool {
        self.class() == CategoryClass::Technical
    }
}

impl From<&str> for ConfigCategory {
    fn from(name: &str) -> Self {
        ConfigCategory::new(name)
    }
}

impl std::fmt::Display for ConfigCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_technical_categories_classify() {
        assert!(ConfigCategory::new("AQS").is_technical());
        assert!(ConfigCategory::new("SOLACE").is_technical());
        assert_eq!(ConfigCategory::new("AQS").class(), CategoryClass::Technical);
    }

    #[test]
    fn test_functional_and_legacy_are_not_technical() {
        assert!(!ConfigCategory::new("MARKET_DATA").is_technical());
        assert_eq!(
            ConfigCategory::new("MARKET_DATA_V1").class(),
            CategoryClass::Legacy
        );
    }

    #[test]
    fn test_unknown_category_defaults_to_permissive() {
        let category = ConfigCategory::new("BRAND_NEW_KIND");
        assert_eq!(category.class(), CategoryClass::Unknown);
        assert!(!category.is_technical());
    }

    #[test]
    fn test_category_serde_is_transparent() {
        let json = serde_json::to_string(&ConfigCategory::new("XDS")).expect("serialize");
        assert_eq!(json, "\"XDS\"");
    }
}
