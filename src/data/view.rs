use super::aggregate::Aggregates;
use super::filter::{filtered_indices, FilterCriteria};
use super::model::ListingTable;

/// The listings satisfying a criteria set, plus the aggregates over them.
///
/// Built fresh on every criteria change; the source table is only borrowed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultView {
    /// Row positions into the source table, ascending.
    pub rows: Vec<usize>,
    pub aggregates: Aggregates,
}

impl ResultView {
    /// Apply `criteria` to `table` and aggregate the surviving listings.
    pub fn evaluate(table: &ListingTable, criteria: &FilterCriteria) -> Self {
        let rows = filtered_indices(table, criteria);
        let aggregates = Aggregates::compute(table, &rows);
        log::debug!("{} of {} listings match", rows.len(), table.len());
        ResultView { rows, aggregates }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::data::filter::PriceRange;
    use crate::data::model::tests::sample_table;
    use crate::data::model::CellValue;

    #[test]
    fn unconstrained_view_is_the_whole_table() {
        let table = sample_table();
        let before = table.rows.clone();
        let view = ResultView::evaluate(&table, &FilterCriteria::default());
        assert_eq!(view.len(), table.len());
        assert_eq!(view.aggregates.count, table.len());
        assert_eq!(table.rows, before);
    }

    #[test]
    fn zero_match_category_gives_empty_view_not_error() {
        let table = sample_table();
        let criteria = FilterCriteria {
            furnishing: Some(BTreeSet::from([CellValue::Text("Serviced".into())])),
            ..Default::default()
        };
        let view = ResultView::evaluate(&table, &criteria);
        assert!(view.is_empty());
        assert_eq!(view.aggregates.count, 0);
        assert_eq!(view.aggregates.price, None);
    }

    #[test]
    fn aggregate_count_tracks_rows() {
        let table = sample_table();
        let criteria = FilterCriteria {
            price: Some(PriceRange::new(1_000_000.0, 5_000_000.0)),
            ..Default::default()
        };
        let view = ResultView::evaluate(&table, &criteria);
        assert_eq!(view.aggregates.count, view.rows.len());
        let price = view.aggregates.price.unwrap();
        assert!(price.min >= 1_000_000.0 && price.max <= 5_000_000.0);
    }
}
