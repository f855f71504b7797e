use eframe::egui::{self, RichText, Ui};

use crate::data::aggregate::{
    grouped_points, grouped_values, top_n, Histogram, NumericSummary,
};
use crate::data::model::{Field, ListingTable};
use crate::state::{AppState, Tab};
use crate::ui::{format_number, plot, table as tables};

/// Columns of the "top listings" tables.
const TOP_LISTING_FIELDS: [Field; 7] = [
    Field::Area,
    Field::Price,
    Field::AverageRent,
    Field::RentalYield,
    Field::PropertyType,
    Field::Beds,
    Field::Address,
];

/// Render the active tab for the current view.
pub fn show(ui: &mut Ui, state: &AppState, table: &ListingTable) {
    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| match state.active_tab {
            Tab::MarketOverview => market_overview(ui, state, table),
            Tab::InvestorInsights => investor_insights(ui, state, table),
            Tab::PropertyFeatures => property_features(ui, state, table),
            Tab::MapHotspots => map_hotspots(ui, state, table),
            Tab::ListingsTable => listings(ui, state, table),
        });
}

fn question(ui: &mut Ui, text: &str) {
    ui.label(RichText::new(text).italics().weak());
    ui.add_space(6.0);
}

/// Placeholder for a chart whose source column is not in the sheet.
fn missing(ui: &mut Ui, field: Field) {
    ui.label(
        RichText::new(format!("Column '{}' not found in the data.", field.column_names()[0]))
            .weak(),
    );
}

// ---------------------------------------------------------------------------
// Market overview
// ---------------------------------------------------------------------------

fn summary_row(ui: &mut Ui, label: &str, summary: Option<&NumericSummary>, decimals: usize) {
    ui.label(label);
    match summary {
        Some(s) => {
            for v in [s.mean, s.median, s.min, s.max] {
                ui.label(format_number(v, decimals));
            }
            ui.label(s.count.to_string());
        }
        None => {
            for _ in 0..5 {
                ui.label("–");
            }
        }
    }
    ui.end_row();
}

fn key_figures(ui: &mut Ui, state: &AppState) {
    let agg = &state.view.aggregates;
    ui.horizontal(|ui| {
        ui.heading(format_number(agg.count as f64, 0));
        ui.label("listings match the current filters");
    });
    egui::Grid::new("key_figures")
        .striped(true)
        .num_columns(6)
        .show(ui, |ui| {
            for h in ["", "Mean", "Median", "Min", "Max", "Values"] {
                ui.strong(h);
            }
            ui.end_row();
            summary_row(ui, Field::Price.label(), agg.price.as_ref(), 0);
            summary_row(ui, Field::Size.label(), agg.size.as_ref(), 0);
            summary_row(ui, Field::PricePerSqft.label(), agg.price_per_sqft.as_ref(), 0);
            summary_row(ui, Field::RentalYield.label(), agg.rental_yield.as_ref(), 2);
        });
}

fn market_overview(ui: &mut Ui, state: &AppState, table: &ListingTable) {
    let agg = &state.view.aggregates;
    let rows = &state.view.rows;
    let cfg = &state.config;

    ui.heading("📈 Macro Market Trends");
    question(ui, "How are prices and yields distributed? Where are most listings concentrated?");
    key_figures(ui, state);
    ui.separator();

    ui.columns(2, |cols| {
        cols[0].strong("Price distribution by category");
        let price_group = table.has_field(Field::PriceCategory).then_some(Field::PriceCategory);
        match Histogram::build(table, rows, Field::Price, price_group, cfg.price_bins) {
            Some(h) => plot::histogram_chart(
                &mut cols[0],
                "price_hist",
                &h,
                Field::Price.label(),
                state.color_map(Field::PriceCategory),
            ),
            None => missing(&mut cols[0], Field::Price),
        }

        cols[1].strong("Rental yield distribution by type");
        match Histogram::build(table, rows, Field::RentalYield, Some(Field::PropertyType), cfg.yield_bins) {
            Some(h) => plot::histogram_chart(
                &mut cols[1],
                "yield_hist",
                &h,
                Field::RentalYield.label(),
                state.color_map(Field::PropertyType),
            ),
            None => missing(&mut cols[1], Field::RentalYield),
        }
    });

    ui.columns(2, |cols| {
        cols[0].strong("Listings by area");
        let top: Vec<_> = agg.listings_per_area.iter().take(cfg.top_groups).collect();
        plot::category_bars(
            &mut cols[0],
            "area_counts",
            top.iter().map(|g| g.key.to_string()).collect(),
            top.iter().map(|g| g.count as f64).collect(),
            "Area",
            "Listings",
        );

        cols[1].strong("Average price by area");
        let top: Vec<_> = agg.mean_price_per_area.iter().take(cfg.top_groups).collect();
        plot::category_bars(
            &mut cols[1],
            "area_avg_price",
            top.iter().map(|g| g.key.to_string()).collect(),
            top.iter().map(|g| g.mean).collect(),
            "Area",
            "Avg price (AED)",
        );
    });

    ui.columns(2, |cols| {
        if table.has_field(Field::PriceCategory) {
            plot::share_chart(
                &mut cols[0],
                "price_category_share",
                "Price categories",
                &agg.listings_per_price_category,
                state.color_map(Field::PriceCategory),
            );
        } else {
            missing(&mut cols[0], Field::PriceCategory);
        }
        if table.has_field(Field::CompletionStatus) {
            plot::share_chart(
                &mut cols[1],
                "completion_share",
                "Completion status",
                &agg.listings_per_completion_status,
                None,
            );
        } else {
            missing(&mut cols[1], Field::CompletionStatus);
        }
    });
}

// ---------------------------------------------------------------------------
// Investor insights
// ---------------------------------------------------------------------------

fn investor_insights(ui: &mut Ui, state: &AppState, table: &ListingTable) {
    let agg = &state.view.aggregates;
    let rows = &state.view.rows;
    let n = state.config.top_listings;

    ui.heading("📊 Investor & Financial Insights");
    question(ui, "Which properties offer the best returns? Where are the investor hotspots?");

    ui.columns(2, |cols| {
        cols[0].strong(format!("Top {n} listings by rental yield"));
        if table.has_field(Field::RentalYield) {
            let top = top_n(table, rows, Field::RentalYield, n);
            tables::field_table(&mut cols[0], "top_yield", table, &top, &TOP_LISTING_FIELDS);
        } else {
            missing(&mut cols[0], Field::RentalYield);
        }

        cols[1].strong(format!("Top {n} most expensive listings"));
        let top = top_n(table, rows, Field::Price, n);
        tables::field_table(&mut cols[1], "top_price", table, &top, &TOP_LISTING_FIELDS);
    });
    ui.separator();

    ui.strong("Price per sqft vs rental yield");
    if table.has_field(Field::PricePerSqft) && table.has_field(Field::RentalYield) {
        plot::scatter_chart(
            ui,
            "ppsf_vs_yield",
            grouped_points(table, rows, Field::PricePerSqft, Field::RentalYield, Field::PropertyType),
            Field::PricePerSqft.label(),
            Field::RentalYield.label(),
            state.color_map(Field::PropertyType),
        );
    } else {
        missing(ui, Field::PricePerSqft);
    }

    ui.strong("Mortgage score by price category");
    if table.has_field(Field::MortgageScore) && table.has_field(Field::PriceCategory) {
        plot::box_chart(
            ui,
            "mortgage_box",
            &grouped_values(table, rows, Field::PriceCategory, Field::MortgageScore),
            Field::PriceCategory.label(),
            Field::MortgageScore.label(),
            state.color_map(Field::PriceCategory),
            true,
        );
    } else {
        missing(ui, Field::MortgageScore);
    }

    ui.strong("Investment grade by area");
    if table.has_field(Field::InvestmentGrade) {
        tables::crosstab_table(ui, "grade_by_area", &agg.grade_by_area);
    } else {
        missing(ui, Field::InvestmentGrade);
    }
    ui.separator();

    ui.strong("Year of completion trend");
    if table.has_field(Field::YearOfCompletion) {
        let points = agg
            .completions_per_year
            .iter()
            .map(|&(year, count)| [year as f64, count as f64])
            .collect();
        plot::line_chart(ui, "completion_years", points, "Year of completion", "Listings");
    } else {
        missing(ui, Field::YearOfCompletion);
    }
}

// ---------------------------------------------------------------------------
// Property features
// ---------------------------------------------------------------------------

fn property_features(ui: &mut Ui, state: &AppState, table: &ListingTable) {
    let agg = &state.view.aggregates;
    let rows = &state.view.rows;
    let bins = state.config.room_bins;
    let type_colors = state.color_map(Field::PropertyType);

    ui.heading("🏡 Property Features & Micro Analysis");
    question(ui, "Drill down into the features that matter for buyers and residents.");

    ui.columns(2, |cols| {
        plot::share_chart(
            &mut cols[0],
            "type_share",
            "Type of property",
            &agg.listings_per_type,
            type_colors,
        );
        cols[1].strong("Furnishing status");
        plot::category_bars(
            &mut cols[1],
            "furnishing_counts",
            agg.listings_per_furnishing.iter().map(|g| g.key.to_string()).collect(),
            agg.listings_per_furnishing.iter().map(|g| g.count as f64).collect(),
            "Furnishing",
            "Listings",
        );
    });

    ui.columns(2, |cols| {
        for (col, field, id) in [(0, Field::Beds, "beds_hist"), (1, Field::Baths, "baths_hist")] {
            cols[col].strong(format!("{} distribution", field.label()));
            match Histogram::build(table, rows, field, Some(Field::PropertyType), bins) {
                Some(h) => plot::histogram_chart(&mut cols[col], id, &h, field.label(), type_colors),
                None => missing(&mut cols[col], field),
            }
        }
    });

    ui.strong("Parking spaces vs price");
    if table.has_field(Field::ParkingSpaces) {
        plot::scatter_chart(
            ui,
            "parking_vs_price",
            grouped_points(table, rows, Field::ParkingSpaces, Field::Price, Field::PropertyType),
            Field::ParkingSpaces.label(),
            Field::Price.label(),
            type_colors,
        );
    } else {
        missing(ui, Field::ParkingSpaces);
    }

    ui.strong("Elevators vs price (apartments only)");
    if table.has_field(Field::Elevators) {
        let apartments: Vec<usize> = rows
            .iter()
            .copied()
            .filter(|&r| table.text(r, Field::PropertyType) == Some("Apartment"))
            .collect();
        plot::scatter_chart(
            ui,
            "elevators_vs_price",
            grouped_points(table, &apartments, Field::Elevators, Field::Price, Field::PropertyType),
            Field::Elevators.label(),
            Field::Price.label(),
            type_colors,
        );
    } else {
        missing(ui, Field::Elevators);
    }

    ui.strong("Days on market by type");
    if table.has_field(Field::DaysOnMarket) {
        plot::box_chart(
            ui,
            "days_on_market_box",
            &grouped_values(table, rows, Field::PropertyType, Field::DaysOnMarket),
            Field::PropertyType.label(),
            Field::DaysOnMarket.label(),
            type_colors,
            false,
        );
    } else {
        missing(ui, Field::DaysOnMarket);
    }
}

// ---------------------------------------------------------------------------
// Map & hotspots
// ---------------------------------------------------------------------------

fn map_hotspots(ui: &mut Ui, state: &AppState, table: &ListingTable) {
    ui.heading("📍 Geographic Distribution & Hotspots");
    question(ui, "Where are the listings located? Explore the map and hotspot flags.");

    ui.strong("Listings map");
    if table.has_field(Field::Latitude) && table.has_field(Field::Longitude) {
        plot::map_chart(
            ui,
            "listings_map",
            grouped_points(
                table,
                &state.view.rows,
                Field::Longitude,
                Field::Latitude,
                Field::PropertyType,
            ),
            state.color_map(Field::PropertyType),
        );
        if let Some(cm) = state.color_map(Field::PropertyType) {
            ui.horizontal_wrapped(|ui| {
                ui.strong(format!("{}:", cm.field.label()));
                for (label, color) in cm.legend_entries() {
                    ui.label(RichText::new(format!("⏺ {label}")).color(color));
                }
            });
        }
    } else {
        missing(ui, Field::Latitude);
    }

    if table.has_field(Field::HotspotFlag) {
        plot::share_chart(
            ui,
            "hotspot_share",
            "Hotspot listings (1 = hotspot, 0 = not)",
            &state.view.aggregates.listings_per_hotspot,
            None,
        );
    } else {
        missing(ui, Field::HotspotFlag);
    }
}

// ---------------------------------------------------------------------------
// Listings table
// ---------------------------------------------------------------------------

fn listings(ui: &mut Ui, state: &AppState, table: &ListingTable) {
    ui.heading("📋 All Filtered Listings");
    ui.label("Use the filters on the left to refine this table. Export it with File → Download filtered CSV…");
    ui.add_space(4.0);
    tables::listings_table(ui, "all_listings", table, &state.view.rows);
}
