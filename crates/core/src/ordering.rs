//! Order key arithmetic for the catalog's ordered collections.
//!
//! Rows carry a real-valued `sort_order`. Appends go after the current
//! maximum, "pin to top" goes before the current minimum, and nothing is
//! renumbered on the hot path. Keys are not unique; listings break ties on
//! the row id so the order is total and deterministic.

use crate::error::CoreError;

/// Key given to the first row of an empty collection.
pub const FIRST_ORDER: f64 = 1.0;

/// Distance between a new key and the current extreme.
pub const ORDER_STEP: f64 = 1.0;

/// Magnitude past which keys are considered drifted (2^40).
///
/// Doubles stay exact for integers up to 2^53, so this leaves plenty of
/// headroom before stepping by one stops producing distinct keys.
pub const DRIFT_LIMIT: f64 = 1_099_511_627_776.0;

/// The independently ordered collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderedCollection {
    Templates,
    TemplateCategories,
}

impl OrderedCollection {
    /// Backing table name. Only ever one of a fixed set of identifiers.
    pub fn table(self) -> &'static str {
        match self {
            Self::Templates => "templates",
            Self::TemplateCategories => "template_categories",
        }
    }

    /// Entity label used in `NotFound` errors.
    pub fn entity(self) -> &'static str {
        match self {
            Self::Templates => "Template",
            Self::TemplateCategories => "TemplateCategory",
        }
    }
}

/// Key for a row appended after `current_max`, or [`FIRST_ORDER`] when
/// the collection is empty.
pub fn append_order(current_max: Option<f64>) -> f64 {
    match current_max {
        Some(max) => max + ORDER_STEP,
        None => FIRST_ORDER,
    }
}

/// Key that sorts before `current_min`.
///
/// "Top" is undefined for an empty collection, so `None` is an error.
pub fn top_order(collection: OrderedCollection, current_min: Option<f64>) -> Result<f64, CoreError> {
    current_min
        .map(|min| min - ORDER_STEP)
        .ok_or(CoreError::NoRows {
            collection: collection.table(),
        })
}

/// Whether the key range has drifted far enough to warrant a renumber.
pub fn needs_renumber(current_min: Option<f64>, current_max: Option<f64>) -> bool {
    [current_min, current_max]
        .into_iter()
        .flatten()
        .any(|key| !key.is_finite() || key.abs() > DRIFT_LIMIT)
}

/// Evenly spaced keys `1, 2, ..., count` for a full renumber.
pub fn renumbered_keys(count: usize) -> impl Iterator<Item = f64> {
    (0..count).map(|i| FIRST_ORDER + i as f64 * ORDER_STEP)
}
