//! Collection and history statistics.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::Catalog;
use crate::error::PickerResult;
use crate::history::Combination;

/// A token with its occurrence count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct TokenCount {
    pub token: String,
    pub count: u32,
}

/// Counts shown on the collection and history views.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionStats {
    pub total_polishes: u32,
    pub total_toppers: u32,
    pub total_finishers: u32,
    /// Polishes per color, most common first. A multi-color polish counts once per color.
    pub color_breakdown: Vec<TokenCount>,
    /// Polishes per formula, most common first
    pub formula_breakdown: Vec<TokenCount>,
    pub most_common_color: Option<String>,
    /// Number of confirmed combinations
    pub combinations_tried: u32,
    /// Most common polish color across confirmed combinations
    pub most_worn_color: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct StatsInput {
    catalog: Catalog,
    #[serde(default)]
    combinations: Vec<Combination>,
}

/// Compute statistics for a catalog and its history.
pub fn collection_stats(catalog: &Catalog, combinations: &[Combination]) -> CollectionStats {
    let color_breakdown = breakdown(
        catalog
            .polishes
            .iter()
            .flat_map(|p| p.colors.iter().map(String::as_str)),
    );
    let formula_breakdown = breakdown(catalog.polishes.iter().map(|p| p.formula.as_str()));

    let used: Vec<&Combination> = combinations.iter().filter(|c| c.used).collect();
    let worn_colors = breakdown(
        used.iter()
            .flat_map(|c| c.polish.colors.iter().map(String::as_str)),
    );

    CollectionStats {
        total_polishes: catalog.polishes.len() as u32,
        total_toppers: catalog.toppers.len() as u32,
        total_finishers: catalog.finishers.len() as u32,
        most_common_color: color_breakdown.first().map(|t| t.token.clone()),
        color_breakdown,
        formula_breakdown,
        combinations_tried: used.len() as u32,
        most_worn_color: worn_colors.first().map(|t| t.token.clone()),
    }
}

/// Compute statistics from JSON input `{"catalog": {...}, "combinations": [...]}`.
/// Convenience function for FFI.
pub fn collection_stats_json(input_json: &str) -> PickerResult<String> {
    let input: StatsInput = serde_json::from_str(input_json)?;
    let stats = collection_stats(&input.catalog, &input.combinations);
    Ok(serde_json::to_string(&stats)?)
}

/// Count lowercase tokens; sorted by count descending, then token ascending.
fn breakdown<'a>(tokens: impl Iterator<Item = &'a str>) -> Vec<TokenCount> {
    let mut counts: HashMap<String, u32> = HashMap::new();
    for token in tokens {
        let token = token.trim().to_lowercase();
        if !token.is_empty() {
            *counts.entry(token).or_insert(0) += 1;
        }
    }

    let mut out: Vec<TokenCount> = counts
        .into_iter()
        .map(|(token, count)| TokenCount { token, count })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.token.cmp(&b.token)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Coat, Item, Polish};

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog
            .add(Item::Polish(Polish::new("A", "B", vec!["red".into(), "pink".into()], "creme")))
            .unwrap();
        catalog
            .add(Item::Polish(Polish::new("C", "B", vec!["red".into()], "shimmer")))
            .unwrap();
        catalog
            .add(Item::Polish(Polish::new("D", "B", vec!["blue".into()], "creme")))
            .unwrap();
        catalog.add(Item::Finisher(Coat::new("F", "B", "matte"))).unwrap();
        catalog
    }

    #[test]
    fn test_breakdowns_are_sorted() {
        let stats = collection_stats(&catalog(), &[]);

        assert_eq!(stats.total_polishes, 3);
        assert_eq!(stats.total_finishers, 1);
        assert_eq!(stats.most_common_color.as_deref(), Some("red"));
        assert_eq!(
            stats.color_breakdown,
            vec![
                TokenCount { token: "red".into(), count: 2 },
                TokenCount { token: "blue".into(), count: 1 },
                TokenCount { token: "pink".into(), count: 1 },
            ]
        );
        assert_eq!(stats.formula_breakdown[0].token, "creme");
        assert_eq!(stats.combinations_tried, 0);
        assert_eq!(stats.most_worn_color, None);
    }

    #[test]
    fn test_empty_catalog() {
        let stats = collection_stats(&Catalog::new(), &[]);
        assert_eq!(stats, CollectionStats::default());
    }

    #[test]
    fn test_stats_json() {
        let input = serde_json::json!({ "catalog": catalog() });
        let output = collection_stats_json(&input.to_string()).unwrap();
        let stats: CollectionStats = serde_json::from_str(&output).unwrap();

        assert_eq!(stats.total_polishes, 3);
    }
}
