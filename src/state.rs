use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::color::ColorMap;
use crate::config::DashboardConfig;
use crate::data::export;
use crate::data::filter::{FilterCriteria, PriceRange};
use crate::data::model::{CellValue, Field, ListingTable};
use crate::data::view::ResultView;

// ---------------------------------------------------------------------------
// Tabs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    MarketOverview,
    InvestorInsights,
    PropertyFeatures,
    MapHotspots,
    ListingsTable,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::MarketOverview,
        Tab::InvestorInsights,
        Tab::PropertyFeatures,
        Tab::MapHotspots,
        Tab::ListingsTable,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Tab::MarketOverview => "📈 Market Overview",
            Tab::InvestorInsights => "📊 Investor Insights",
            Tab::PropertyFeatures => "🏡 Property Features",
            Tab::MapHotspots => "📍 Map & Hotspots",
            Tab::ListingsTable => "📋 Listings Table",
        }
    }
}

// ---------------------------------------------------------------------------
// Filter selections: what the sidebar widgets hold
// ---------------------------------------------------------------------------

/// Raw widget state of the filter sidebar.
///
/// Area, type and furnishing start empty and an empty selection means "no
/// filter". Bedrooms start fully selected and the price slider starts at the
/// data bounds. Those two always apply, so listings without a price or a
/// bedroom count are hidden from the first view on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSelections {
    pub areas: BTreeSet<CellValue>,
    pub property_types: BTreeSet<CellValue>,
    pub furnishing: BTreeSet<CellValue>,
    pub beds: BTreeSet<CellValue>,
    pub price: (f64, f64),
}

/// Fields offered as multiselects in the sidebar, in display order.
pub const MULTISELECT_FIELDS: [Field; 4] =
    [Field::Area, Field::PropertyType, Field::Furnishing, Field::Beds];

impl FilterSelections {
    pub fn initial(table: &ListingTable) -> Self {
        Self {
            beds: table.categories(Field::Beds).cloned().unwrap_or_default(),
            price: price_slider_bounds(table),
            ..Default::default()
        }
    }

    pub fn selected(&self, field: Field) -> Option<&BTreeSet<CellValue>> {
        match field {
            Field::Area => Some(&self.areas),
            Field::PropertyType => Some(&self.property_types),
            Field::Furnishing => Some(&self.furnishing),
            Field::Beds => Some(&self.beds),
            _ => None,
        }
    }

    pub fn selected_mut(&mut self, field: Field) -> Option<&mut BTreeSet<CellValue>> {
        match field {
            Field::Area => Some(&mut self.areas),
            Field::PropertyType => Some(&mut self.property_types),
            Field::Furnishing => Some(&mut self.furnishing),
            Field::Beds => Some(&mut self.beds),
            _ => None,
        }
    }

    /// Translate widget state into predicates. Empty multiselects are
    /// dropped; the bedroom and price widgets apply whenever the table has
    /// values for them.
    pub fn criteria(&self, table: &ListingTable) -> FilterCriteria {
        let optional = |set: &BTreeSet<CellValue>| (!set.is_empty()).then(|| set.clone());
        let has_beds = table.categories(Field::Beds).is_some_and(|s| !s.is_empty());

        FilterCriteria {
            areas: optional(&self.areas),
            property_types: optional(&self.property_types),
            furnishing: optional(&self.furnishing),
            beds: has_beds.then(|| self.beds.clone()),
            price: table
                .bounds(Field::Price)
                .map(|_| PriceRange::new(self.price.0, self.price.1)),
        }
    }
}

/// Slider range covering every price in the table, widened to whole units.
pub fn price_slider_bounds(table: &ListingTable) -> (f64, f64) {
    table
        .bounds(Field::Price)
        .map(|(lo, hi)| (lo.floor(), hi.ceil()))
        .unwrap_or((0.0, 0.0))
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// One-line message in the toolbar.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Info(String),
    Error(String),
}

/// Category fields that get a stable colour per value across charts.
const COLORED_FIELDS: [Field; 2] = [Field::PropertyType, Field::PriceCategory];

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded listings (None only if nothing has been loaded yet).
    pub table: Option<ListingTable>,

    /// File the table was loaded from.
    pub source_path: Option<PathBuf>,

    /// Sidebar widget state.
    pub selections: FilterSelections,

    /// Filtered rows and aggregates for the current selections (cached).
    pub view: ResultView,

    /// Colours per category value, shared by every chart.
    pub color_maps: BTreeMap<Field, ColorMap>,

    pub active_tab: Tab,

    /// Status / error message shown in the UI.
    pub status: Option<Status>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            table: None,
            source_path: None,
            selections: FilterSelections::default(),
            view: ResultView::default(),
            color_maps: BTreeMap::new(),
            active_tab: Tab::default(),
            status: None,
        }
    }

    /// Ingest a newly loaded table, reset filters and colours.
    pub fn set_table(&mut self, table: ListingTable, source: Option<PathBuf>) {
        self.selections = FilterSelections::initial(&table);
        self.color_maps = COLORED_FIELDS
            .into_iter()
            .filter_map(|f| table.categories(f).map(|vals| (f, ColorMap::new(f, vals))))
            .collect();
        self.table = Some(table);
        self.source_path = source;
        self.status = None;
        self.refilter();
    }

    pub fn color_map(&self, field: Field) -> Option<&ColorMap> {
        self.color_maps.get(&field)
    }

    /// Recompute the view after a selection change.
    pub fn refilter(&mut self) {
        if let Some(table) = &self.table {
            let criteria = self.selections.criteria(table);
            self.view = ResultView::evaluate(table, &criteria);
        }
    }

    /// Toggle a single value in a multiselect.
    pub fn toggle_filter_value(&mut self, field: Field, value: &CellValue) {
        if let Some(selected) = self.selections.selected_mut(field) {
            if !selected.remove(value) {
                selected.insert(value.clone());
            }
            self.refilter();
        }
    }

    /// Select every value of a multiselect.
    pub fn select_all(&mut self, field: Field) {
        let Some(all_vals) = self.table.as_ref().and_then(|t| t.categories(field)).cloned() else {
            return;
        };
        if let Some(selected) = self.selections.selected_mut(field) {
            *selected = all_vals;
            self.refilter();
        }
    }

    /// Clear a multiselect.
    pub fn select_none(&mut self, field: Field) {
        if let Some(selected) = self.selections.selected_mut(field) {
            selected.clear();
            self.refilter();
        }
    }

    /// Move the price slider; bounds are reordered if they cross.
    pub fn set_price_range(&mut self, lo: f64, hi: f64) {
        self.selections.price = (lo.min(hi), lo.max(hi));
        self.refilter();
    }

    /// Back to the unfiltered view.
    pub fn reset_filters(&mut self) {
        if let Some(table) = &self.table {
            self.selections = FilterSelections::initial(table);
            self.refilter();
        }
    }

    /// Write the currently displayed rows to `path`.
    pub fn export_to(&self, path: &Path) -> Result<()> {
        match &self.table {
            Some(table) => export::export_csv(table, &self.view.rows, path),
            None => anyhow::bail!("no listings loaded"),
        }
    }

    /// Suggested file name for the export dialog.
    pub fn export_file_name(&self) -> PathBuf {
        export::default_export_name(self.source_path.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::sample_table;

    fn loaded_state() -> AppState {
        let mut state = AppState::new(DashboardConfig::default());
        state.set_table(sample_table(), Some(PathBuf::from("DRED.xlsx")));
        state
    }

    #[test]
    fn initial_view_drops_listings_without_price() {
        let state = loaded_state();
        let table = state.table.as_ref().unwrap();
        let criteria = state.selections.criteria(table);
        assert_eq!(criteria.price, Some(PriceRange::new(900_000.0, 7_800_000.0)));
        assert!(criteria.beds.is_some());
        assert!(criteria.areas.is_none());
        // Row 4 has price "n/a".
        assert_eq!(state.view.rows, vec![0, 1, 2, 3, 5]);
    }

    #[test]
    fn untouched_widgets_without_data_impose_nothing() {
        let table = ListingTable::new(
            ["area_name", "price", "type", "furnishing", "beds"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            vec![vec![
                CellValue::Text("Downtown".into()),
                CellValue::Null,
                CellValue::Text("Villa".into()),
                CellValue::Text("Furnished".into()),
                CellValue::Null,
            ]],
        );
        let criteria = FilterSelections::initial(&table).criteria(&table);
        assert!(criteria.is_unconstrained());
    }

    #[test]
    fn toggling_a_bed_count_filters() {
        let mut state = loaded_state();
        state.toggle_filter_value(Field::Beds, &CellValue::Integer(5));
        assert_eq!(state.view.rows, vec![0, 1, 3, 5]);
        state.toggle_filter_value(Field::Beds, &CellValue::Integer(5));
        assert_eq!(state.view.len(), 5);
    }

    #[test]
    fn clearing_beds_hides_everything() {
        let mut state = loaded_state();
        state.select_none(Field::Beds);
        assert!(state.view.is_empty());
        assert_eq!(state.view.aggregates.count, 0);
        state.select_all(Field::Beds);
        assert_eq!(state.view.len(), 5);
    }

    #[test]
    fn area_selection_narrows_and_clears() {
        let mut state = loaded_state();
        state.toggle_filter_value(Field::Area, &CellValue::Text("Downtown".into()));
        assert_eq!(state.view.rows, vec![1]);
        state.select_none(Field::Area);
        assert_eq!(state.view.len(), 5);
    }

    #[test]
    fn price_slider_narrows_and_resets() {
        let mut state = loaded_state();
        state.set_price_range(3_000_000.0, 1_000_000.0);
        assert_eq!(state.selections.price, (1_000_000.0, 3_000_000.0));
        assert_eq!(state.view.rows, vec![0, 5]);
        state.reset_filters();
        assert_eq!(state.view.rows, vec![0, 1, 2, 3, 5]);
    }

    #[test]
    fn colour_maps_cover_type_and_price_category() {
        let state = loaded_state();
        assert!(state.color_map(Field::PropertyType).is_some());
        // The sample sheet has no price_category column.
        assert!(state.color_map(Field::PriceCategory).is_none());
    }

    #[test]
    fn export_name_uses_source_stem() {
        let state = loaded_state();
        assert_eq!(state.export_file_name(), PathBuf::from("filtered_DRED.csv"));
    }

    #[test]
    fn export_without_table_fails() {
        let state = AppState::new(DashboardConfig::default());
        assert!(state.export_to(Path::new("unused.csv")).is_err());
    }
}
