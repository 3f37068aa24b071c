//! Resource categories that are cached and refreshed independently.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One class of remote state.
///
/// Variant order is the declared fetch order inside a refresh pass; later
/// categories may depend on values decoded earlier in the same pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Instances,
    SpotRequests,
    Images,
    KeyPairs,
    SecurityGroups,
    SpotPrices,
}

impl Category {
    pub fn all() -> &'static [Category] {
        &[
            Category::Instances,
            Category::SpotRequests,
            Category::Images,
            Category::KeyPairs,
            Category::SecurityGroups,
            Category::SpotPrices,
        ]
    }

    /// Stable key used in configuration and logs.
    pub fn key(&self) -> &'static str {
        match self {
            Category::Instances => "instances",
            Category::SpotRequests => "spot-requests",
            Category::Images => "images",
            Category::KeyPairs => "key-pairs",
            Category::SecurityGroups => "security-groups",
            Category::SpotPrices => "spot-prices",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Category::Instances => "Instances",
            Category::SpotRequests => "Spot requests",
            Category::Images => "Images",
            Category::KeyPairs => "Key pairs",
            Category::SecurityGroups => "Security groups",
            Category::SpotPrices => "Spot prices",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::all()
            .iter()
            .copied()
            .find(|c| c.key() == s)
            .ok_or_else(|| format!("unknown resource category: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_round_trip() {
        for category in Category::all() {
            assert_eq!(category.key().parse::<Category>(), Ok(*category));
        }
    }

    #[test]
    fn test_declared_order_matches_ord() {
        let mut sorted = Category::all().to_vec();
        sorted.sort();
        assert_eq!(sorted, Category::all());
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!("volumes".parse::<Category>().is_err());
    }
}
