//! Random combination picking.
//!
//! Algorithm (each step fails fast):
//! 1. Filter polishes by color (membership) and formula, case-insensitive
//! 2. Pick one polish uniformly from the filtered set
//! 3. Optionally pick one topper uniformly from all toppers (never filtered)
//! 4. Pick one finisher uniformly, filtered by finisher type
//! 5. Look up a previous confirmed use of the same polish/topper pairing
//!
//! There is no state between picks: every call rolls again.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::{eq_folded, Catalog, Coat, Polish};
use crate::error::{PickerError, PickerResult};
use crate::history::{Combination, CombinationId, History, IdGenerator};

/// Constraints for a pick. `None`, empty or `"any"` means unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PickFilters {
    pub color: Option<String>,
    pub formula: Option<String>,
    pub finisher_type: Option<String>,
    pub include_topper: bool,
}

impl PickFilters {
    fn color(&self) -> Option<&str> {
        constraint(&self.color)
    }

    fn formula(&self) -> Option<&str> {
        constraint(&self.formula)
    }

    fn finisher_type(&self) -> Option<&str> {
        constraint(&self.finisher_type)
    }

    pub fn matches_polish(&self, polish: &Polish) -> bool {
        let color_ok = self.color().map_or(true, |color| polish.has_color(color));
        let formula_ok = self
            .formula()
            .map_or(true, |formula| eq_folded(&polish.formula, formula));
        color_ok && formula_ok
    }

    pub fn matches_finisher(&self, finisher: &Coat) -> bool {
        self.finisher_type()
            .map_or(true, |kind| eq_folded(&finisher.kind, kind))
    }
}

fn constraint(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("any"))
}

/// A freshly drawn candidate and, if this pairing was worn before, the most
/// recent confirmed entry for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickOutcome {
    pub candidate: Combination,
    pub previously_used: Option<Combination>,
}

/// Draw a random combination.
pub fn pick<R: Rng + ?Sized>(
    catalog: &Catalog,
    history: &History,
    filters: &PickFilters,
    id: CombinationId,
    now: DateTime<Utc>,
    rng: &mut R,
) -> PickerResult<PickOutcome> {
    if catalog.polishes.is_empty() {
        return Err(PickerError::EmptyCatalog);
    }

    let eligible: Vec<&Polish> = catalog
        .polishes
        .iter()
        .filter(|p| filters.matches_polish(p))
        .collect();
    let polish = eligible.choose(rng).ok_or(PickerError::NoMatch)?;

    let topper = if filters.include_topper {
        catalog.toppers.choose(rng)
    } else {
        None
    };

    if catalog.finishers.is_empty() {
        return Err(PickerError::NoFinishers);
    }
    let finishers: Vec<&Coat> = catalog
        .finishers
        .iter()
        .filter(|f| filters.matches_finisher(f))
        .collect();
    let finisher = finishers.choose(rng).ok_or(PickerError::NoMatchingFinisher)?;

    let candidate = Combination::candidate(
        id,
        (*polish).clone(),
        topper.cloned(),
        Some((*finisher).clone()),
        now,
    );
    let previously_used = history
        .previous_use(&candidate.polish, candidate.topper.as_ref())
        .cloned();

    Ok(PickOutcome {
        candidate,
        previously_used,
    })
}

/// Add a random topper to a candidate drawn without one.
///
/// The previous-use lookup is redone for the new pairing.
pub fn add_topper<R: Rng + ?Sized>(
    catalog: &Catalog,
    history: &History,
    mut candidate: Combination,
    rng: &mut R,
) -> PickerResult<PickOutcome> {
    let topper = catalog.toppers.choose(rng).ok_or(PickerError::NoToppers)?;
    candidate.topper = Some(topper.clone());

    let previously_used = history
        .previous_use(&candidate.polish, candidate.topper.as_ref())
        .cloned();
    Ok(PickOutcome {
        candidate,
        previously_used,
    })
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PickInput {
    catalog: Catalog,
    #[serde(default)]
    combinations: Vec<Combination>,
    #[serde(default)]
    filters: PickFilters,
}

/// Pick from JSON input `{"catalog": {...}, "combinations": [...], "filters": {...}}`.
/// Returns a JSON `PickOutcome`.
/// Convenience function for FFI.
pub fn pick_json(input_json: &str) -> PickerResult<String> {
    let input: PickInput = serde_json::from_str(input_json)?;
    let history = History::from_entries(input.combinations);
    let now = Utc::now();
    let id = IdGenerator::new().next_id(now);

    let outcome = pick(
        &input.catalog,
        &history,
        &input.filters,
        id,
        now,
        &mut rand::thread_rng(),
    )?;
    Ok(serde_json::to_string(&outcome)?)
}
