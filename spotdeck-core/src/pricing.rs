//! Spot price ranking.
//!
//! Samples are grouped by instance type and availability zone. Each zone's
//! samples are averaged, the cheapest zone is picked per type, and types are
//! ordered by that cheapest average, lowest first.

use crate::resources::PriceSample;
use regex::Regex;
use std::collections::BTreeMap;

/// Average observed price for one zone.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneQuote {
    pub zone: String,
    /// Mean of the samples, rounded to 4 decimals.
    pub average: f64,
    pub samples: usize,
}

/// Ranking entry for one instance type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeQuote {
    pub instance_type: String,
    pub cheapest: ZoneQuote,
    /// All zones for this type, cheapest first.
    pub zones: Vec<ZoneQuote>,
}

pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Bid to place over an observed average.
pub fn suggest_bid(average: f64, multiplier: f64) -> f64 {
    round4(average * multiplier)
}

/// Format a price the way bids are encoded.
pub fn format_price(value: f64) -> String {
    format!("{:.4}", value)
}

/// Rank instance types by their cheapest zone average.
pub fn rank_prices(samples: &[PriceSample]) -> Vec<TypeQuote> {
    let mut grouped: BTreeMap<&str, BTreeMap<&str, (f64, usize)>> = BTreeMap::new();
    for sample in samples {
        let slot = grouped
            .entry(sample.instance_type.as_str())
            .or_default()
            .entry(sample.zone.as_str())
            .or_insert((0.0, 0));
        slot.0 += sample.price;
        slot.1 += 1;
    }

    let mut ranking: Vec<TypeQuote> = grouped
        .into_iter()
        .filter_map(|(instance_type, zones)| {
            let mut quotes: Vec<ZoneQuote> = zones
                .into_iter()
                .map(|(zone, (sum, count))| ZoneQuote {
                    zone: zone.to_string(),
                    average: round4(sum / count as f64),
                    samples: count,
                })
                .collect();
            // Stable sort keeps zone-name order for equal averages.
            quotes.sort_by(|a, b| a.average.total_cmp(&b.average));
            let cheapest = quotes.first()?.clone();
            Some(TypeQuote {
                instance_type: instance_type.to_string(),
                cheapest,
                zones: quotes,
            })
        })
        .collect();

    ranking.sort_by(|a, b| a.cheapest.average.total_cmp(&b.cheapest.average));
    ranking
}

/// Rank only the instance types accepted by `pattern`.
pub fn rank_matching(samples: &[PriceSample], pattern: &Regex) -> Vec<TypeQuote> {
    let accepted: Vec<PriceSample> = samples
        .iter()
        .filter(|s| pattern.is_match(&s.instance_type))
        .cloned()
        .collect();
    rank_prices(&accepted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_zone_average() {
        let samples = vec![
            PriceSample::new("m1.xlarge", "us-east-1b", 0.0332),
            PriceSample::new("m1.xlarge", "us-east-1b", 0.0331),
            PriceSample::new("m1.xlarge", "us-east-1b", 0.0330),
        ];
        let ranking = rank_prices(&samples);
        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking[0].cheapest.zone, "us-east-1b");
        assert!((ranking[0].cheapest.average - 0.0331).abs() < 1e-9);
        assert_eq!(ranking[0].cheapest.samples, 3);
    }

    #[test]
    fn test_cheapest_zone_selected() {
        let samples = vec![
            PriceSample::new("c1.medium", "us-east-1a", 0.0200),
            PriceSample::new("c1.medium", "us-east-1a", 0.0220),
            PriceSample::new("c1.medium", "us-east-1c", 0.0150),
            PriceSample::new("c1.medium", "us-east-1c", 0.0170),
        ];
        let ranking = rank_prices(&samples);
        assert_eq!(ranking[0].cheapest.zone, "us-east-1c");
        assert!((ranking[0].cheapest.average - 0.016).abs() < 1e-9);
        assert_eq!(ranking[0].zones.len(), 2);
        assert_eq!(ranking[0].zones[1].zone, "us-east-1a");
    }

    #[test]
    fn test_types_ordered_by_cheapest_price() {
        let samples = vec![
            PriceSample::new("m1.xlarge", "us-east-1b", 0.0900),
            PriceSample::new("t1.micro", "us-east-1a", 0.0030),
            PriceSample::new("m1.small", "us-east-1d", 0.0100),
            PriceSample::new("m1.xlarge", "us-east-1a", 0.0800),
        ];
        let order: Vec<String> = rank_prices(&samples)
            .into_iter()
            .map(|q| q.instance_type)
            .collect();
        assert_eq!(order, vec!["t1.micro", "m1.small", "m1.xlarge"]);
    }

    #[test]
    fn test_equal_averages_prefer_first_zone_name() {
        let samples = vec![
            PriceSample::new("t1.micro", "us-east-1d", 0.0030),
            PriceSample::new("t1.micro", "us-east-1a", 0.0030),
        ];
        assert_eq!(rank_prices(&samples)[0].cheapest.zone, "us-east-1a");
    }

    #[test]
    fn test_rank_matching_filters_types() {
        let pattern = Regex::new(r"^m1\.").unwrap();
        let samples = vec![
            PriceSample::new("m1.xlarge", "us-east-1b", 0.0900),
            PriceSample::new("t1.micro", "us-east-1a", 0.0030),
        ];
        let ranking = rank_matching(&samples, &pattern);
        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking[0].instance_type, "m1.xlarge");
    }

    #[test]
    fn test_bid_suggestion() {
        assert!((suggest_bid(0.0331, 1.1) - 0.0364).abs() < 1e-9);
        assert_eq!(format_price(0.0364), "0.0364");
        assert_eq!(format_price(0.5), "0.5000");
    }

    #[test]
    fn test_empty_samples() {
        assert!(rank_prices(&[]).is_empty());
    }
}
