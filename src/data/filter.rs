use std::collections::BTreeSet;

use super::model::{CellValue, Field, ListingTable};

// ---------------------------------------------------------------------------
// Filter predicates
// ---------------------------------------------------------------------------

/// Inclusive price bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && price <= self.max
    }
}

/// One optional predicate per filterable field. `None` means "no constraint".
///
/// A categorical predicate holding an empty set matches nothing; a null cell
/// never satisfies an active predicate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub areas: Option<BTreeSet<CellValue>>,
    pub property_types: Option<BTreeSet<CellValue>>,
    pub furnishing: Option<BTreeSet<CellValue>>,
    pub beds: Option<BTreeSet<CellValue>>,
    pub price: Option<PriceRange>,
}

impl FilterCriteria {
    /// Active categorical predicates with the field each one tests.
    pub fn categorical(&self) -> impl Iterator<Item = (Field, &BTreeSet<CellValue>)> {
        [
            (Field::Area, &self.areas),
            (Field::PropertyType, &self.property_types),
            (Field::Furnishing, &self.furnishing),
            (Field::Beds, &self.beds),
        ]
        .into_iter()
        .filter_map(|(field, set)| set.as_ref().map(|s| (field, s)))
    }

    /// Whether no predicate is active.
    pub fn is_unconstrained(&self) -> bool {
        self.price.is_none() && self.categorical().next().is_none()
    }

    /// Whether the listing at `row` satisfies every active predicate.
    pub fn matches(&self, table: &ListingTable, row: usize) -> bool {
        if let Some(range) = &self.price {
            match table.number(row, Field::Price) {
                Some(price) if range.contains(price) => {}
                _ => return false,
            }
        }
        self.categorical().all(|(field, selected)| {
            table
                .value(row, field)
                .is_some_and(|v| !v.is_null() && selected.contains(v))
        })
    }
}

/// Return row positions of listings that pass all active predicates, in
/// source order.
pub fn filtered_indices(table: &ListingTable, criteria: &FilterCriteria) -> Vec<usize> {
    if criteria.is_unconstrained() {
        return (0..table.len()).collect();
    }
    (0..table.len())
        .filter(|&row| criteria.matches(table, row))
        .collect()
}
