//! Collection listing filters.

use serde::{Deserialize, Serialize};

use super::types::{eq_folded, Coat, Polish};

/// Filter for the polish collection view. `None` or empty means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PolishQuery {
    /// Exact brand match
    pub brand: Option<String>,
    /// Case-insensitive color membership
    pub color: Option<String>,
    /// Case-insensitive formula match
    pub formula: Option<String>,
}

impl PolishQuery {
    pub fn matches(&self, polish: &Polish) -> bool {
        if let Some(brand) = active(&self.brand) {
            if polish.brand != brand {
                return false;
            }
        }
        if let Some(color) = active(&self.color) {
            if !polish.has_color(color) {
                return false;
            }
        }
        if let Some(formula) = active(&self.formula) {
            if !eq_folded(&polish.formula, formula) {
                return false;
            }
        }
        true
    }

    /// Matching polishes sorted by brand, then name (case-insensitive).
    pub fn apply<'a>(&self, polishes: &'a [Polish]) -> Vec<&'a Polish> {
        let mut matched: Vec<&Polish> = polishes.iter().filter(|p| self.matches(p)).collect();
        matched.sort_by_cached_key(|p| (p.brand.to_lowercase(), p.name.to_lowercase()));
        matched
    }
}

/// Toppers or finishers sorted by brand, then name (case-insensitive).
pub fn sorted_coats(coats: &[Coat]) -> Vec<&Coat> {
    let mut sorted: Vec<&Coat> = coats.iter().collect();
    sorted.sort_by_cached_key(|c| (c.brand.to_lowercase(), c.name.to_lowercase()));
    sorted
}

fn active(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("any"))
}
