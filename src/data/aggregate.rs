use std::collections::BTreeMap;

use super::model::{CellValue, Field, ListingTable};

// ---------------------------------------------------------------------------
// Numeric summaries
// ---------------------------------------------------------------------------

/// Summary statistics of a numeric field over a set of listings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericSummary {
    /// Number of non-null values the statistics were computed from.
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

impl NumericSummary {
    /// `None` when there are no values.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let sorted = sorted(values);
        if sorted.is_empty() {
            return None;
        }
        Some(Self {
            count: sorted.len(),
            mean: sorted.iter().sum::<f64>() / sorted.len() as f64,
            median: quantile(&sorted, 0.5),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
        })
    }
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut v = values.to_vec();
    v.sort_by(f64::total_cmp);
    v
}

/// Linear-interpolated quantile of an already sorted, non-empty slice.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Non-null values of a numeric field over the given rows.
pub fn column_values(table: &ListingTable, rows: &[usize], field: Field) -> Vec<f64> {
    rows.iter().filter_map(|&r| table.number(r, field)).collect()
}

// ---------------------------------------------------------------------------
// Grouped aggregates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct GroupCount {
    pub key: CellValue,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupMean {
    pub key: CellValue,
    pub mean: f64,
}

/// Listings per distinct non-null value, most frequent first, ties by key.
pub fn value_counts(table: &ListingTable, rows: &[usize], field: Field) -> Vec<GroupCount> {
    let mut counts: BTreeMap<&CellValue, usize> = BTreeMap::new();
    for &r in rows {
        if let Some(v) = table.value(r, field).filter(|v| !v.is_null()) {
            *counts.entry(v).or_default() += 1;
        }
    }
    let mut out: Vec<GroupCount> = counts
        .into_iter()
        .map(|(key, count)| GroupCount {
            key: key.clone(),
            count,
        })
        .collect();
    // Stable: equal counts keep key order from the BTreeMap.
    out.sort_by(|a, b| b.count.cmp(&a.count));
    out
}

/// Mean of `value` per `group`, highest mean first.
pub fn group_means(
    table: &ListingTable,
    rows: &[usize],
    group: Field,
    value: Field,
) -> Vec<GroupMean> {
    let mut sums: BTreeMap<&CellValue, (f64, usize)> = BTreeMap::new();
    for &r in rows {
        let Some(key) = table.value(r, group).filter(|v| !v.is_null()) else {
            continue;
        };
        if let Some(x) = table.number(r, value) {
            let entry = sums.entry(key).or_default();
            entry.0 += x;
            entry.1 += 1;
        }
    }
    let mut out: Vec<GroupMean> = sums
        .into_iter()
        .map(|(key, (sum, n))| GroupMean {
            key: key.clone(),
            mean: sum / n as f64,
        })
        .collect();
    out.sort_by(|a, b| b.mean.total_cmp(&a.mean));
    out
}

/// Values of a numeric field per group, for box plots.
pub fn grouped_values(
    table: &ListingTable,
    rows: &[usize],
    group: Field,
    value: Field,
) -> BTreeMap<CellValue, Vec<f64>> {
    let mut out: BTreeMap<CellValue, Vec<f64>> = BTreeMap::new();
    for &r in rows {
        let (Some(key), Some(x)) = (table.value(r, group), table.number(r, value)) else {
            continue;
        };
        if !key.is_null() {
            out.entry(key.clone()).or_default().push(x);
        }
    }
    out
}

/// `[x, y]` points per group label; rows missing either coordinate are skipped.
pub fn grouped_points(
    table: &ListingTable,
    rows: &[usize],
    x: Field,
    y: Field,
    group: Field,
) -> BTreeMap<String, Vec<[f64; 2]>> {
    let mut out: BTreeMap<String, Vec<[f64; 2]>> = BTreeMap::new();
    for &r in rows {
        let (Some(px), Some(py)) = (table.number(r, x), table.number(r, y)) else {
            continue;
        };
        let label = match table.value(r, group) {
            Some(v) if !v.is_null() => v.to_string(),
            _ => "other".to_string(),
        };
        out.entry(label).or_default().push([px, py]);
    }
    out
}

/// Listings per integer year, ascending.
pub fn year_counts(table: &ListingTable, rows: &[usize], field: Field) -> Vec<(i64, usize)> {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for &r in rows {
        if let Some(year) = table.value(r, field).and_then(CellValue::as_i64) {
            *counts.entry(year).or_default() += 1;
        }
    }
    counts.into_iter().collect()
}

/// Row positions of the `n` listings with the largest `field`, descending.
/// Nulls sort last; ties keep source order.
pub fn top_n(table: &ListingTable, rows: &[usize], field: Field, n: usize) -> Vec<usize> {
    let mut ranked: Vec<(usize, Option<f64>)> =
        rows.iter().map(|&r| (r, table.number(r, field))).collect();
    ranked.sort_by(|(_, a), (_, b)| match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(a),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    ranked.into_iter().take(n).map(|(r, _)| r).collect()
}

// ---------------------------------------------------------------------------
// Cross tabulation
// ---------------------------------------------------------------------------

/// Counts of listings for every (row key, column key) pair; missing pairs are 0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrossTab {
    pub row_keys: Vec<CellValue>,
    pub col_keys: Vec<CellValue>,
    /// `counts[i][j]` is the count for `row_keys[i]` × `col_keys[j]`.
    pub counts: Vec<Vec<usize>>,
}

impl CrossTab {
    pub fn build(table: &ListingTable, rows: &[usize], row_field: Field, col_field: Field) -> Self {
        let mut pairs: BTreeMap<(&CellValue, &CellValue), usize> = BTreeMap::new();
        for &r in rows {
            let (Some(a), Some(b)) = (table.value(r, row_field), table.value(r, col_field)) else {
                continue;
            };
            if !a.is_null() && !b.is_null() {
                *pairs.entry((a, b)).or_default() += 1;
            }
        }

        let mut row_keys: Vec<CellValue> = pairs.keys().map(|(a, _)| (*a).clone()).collect();
        row_keys.dedup();
        let mut col_keys: Vec<CellValue> = pairs.keys().map(|(_, b)| (*b).clone()).collect();
        col_keys.sort();
        col_keys.dedup();

        let counts = row_keys
            .iter()
            .map(|a| {
                col_keys
                    .iter()
                    .map(|b| pairs.get(&(a, b)).copied().unwrap_or(0))
                    .collect()
            })
            .collect();

        CrossTab {
            row_keys,
            col_keys,
            counts,
        }
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().flatten().copied().max().unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Histograms
// ---------------------------------------------------------------------------

/// Bin counts with shared edges, optionally split into one series per group.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// `bins + 1` ascending edges; the last bin is closed on the right.
    pub edges: Vec<f64>,
    pub series: Vec<(String, Vec<usize>)>,
}

impl Histogram {
    /// `None` if no row has a value for `field`.
    pub fn build(
        table: &ListingTable,
        rows: &[usize],
        field: Field,
        group: Option<Field>,
        bins: usize,
    ) -> Option<Self> {
        let bins = bins.max(1);
        let values: Vec<(usize, f64)> = rows
            .iter()
            .filter_map(|&r| table.number(r, field).map(|x| (r, x)))
            .collect();
        let (lo, hi) = values.iter().fold(None, |acc, &(_, x)| match acc {
            None => Some((x, x)),
            Some((lo, hi)) => Some((f64::min(lo, x), f64::max(hi, x))),
        })?;
        let (lo, hi) = if hi > lo { (lo, hi) } else { (lo - 0.5, hi + 0.5) };
        let width = (hi - lo) / bins as f64;
        let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();

        let mut series: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (r, x) in values {
            let name = group
                .and_then(|g| table.value(r, g))
                .filter(|v| !v.is_null())
                .map(|v| v.to_string())
                .unwrap_or_else(|| field.label().to_string());
            let bin = (((x - lo) / width) as usize).min(bins - 1);
            series.entry(name).or_insert_with(|| vec![0; bins])[bin] += 1;
        }

        Some(Histogram {
            edges,
            series: series.into_iter().collect(),
        })
    }

    pub fn bin_width(&self) -> f64 {
        self.edges[1] - self.edges[0]
    }

    pub fn bin_center(&self, bin: usize) -> f64 {
        (self.edges[bin] + self.edges[bin + 1]) / 2.0
    }

    pub fn total(&self) -> usize {
        self.series.iter().flat_map(|(_, c)| c).sum()
    }
}

// ---------------------------------------------------------------------------
// Box plot summaries
// ---------------------------------------------------------------------------

/// Five-number summary with Tukey whiskers (1.5 × IQR, clamped to the data).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxSummary {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
}

impl BoxSummary {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let sorted = sorted(values);
        if sorted.is_empty() {
            return None;
        }
        let q1 = quantile(&sorted, 0.25);
        let q3 = quantile(&sorted, 0.75);
        let fence = 1.5 * (q3 - q1);
        let lower_whisker = sorted
            .iter()
            .copied()
            .find(|&x| x >= q1 - fence)
            .unwrap_or(q1);
        let upper_whisker = sorted
            .iter()
            .rev()
            .copied()
            .find(|&x| x <= q3 + fence)
            .unwrap_or(q3);
        Some(Self {
            lower_whisker,
            q1,
            median: quantile(&sorted, 0.5),
            q3,
            upper_whisker,
        })
    }
}

// ---------------------------------------------------------------------------
// Aggregates – everything derived from one filtered view
// ---------------------------------------------------------------------------

/// The scalar and grouped aggregates the dashboard shows for a view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregates {
    pub count: usize,
    pub price: Option<NumericSummary>,
    pub size: Option<NumericSummary>,
    pub price_per_sqft: Option<NumericSummary>,
    pub rental_yield: Option<NumericSummary>,
    pub listings_per_area: Vec<GroupCount>,
    pub listings_per_type: Vec<GroupCount>,
    pub listings_per_furnishing: Vec<GroupCount>,
    pub listings_per_price_category: Vec<GroupCount>,
    pub listings_per_completion_status: Vec<GroupCount>,
    pub listings_per_hotspot: Vec<GroupCount>,
    pub mean_price_per_area: Vec<GroupMean>,
    pub completions_per_year: Vec<(i64, usize)>,
    pub grade_by_area: CrossTab,
}

impl Aggregates {
    pub fn compute(table: &ListingTable, rows: &[usize]) -> Self {
        let summary = |field| NumericSummary::from_values(&column_values(table, rows, field));
        let counts = |field| value_counts(table, rows, field);
        Aggregates {
            count: rows.len(),
            price: summary(Field::Price),
            size: summary(Field::Size),
            price_per_sqft: summary(Field::PricePerSqft),
            rental_yield: summary(Field::RentalYield),
            listings_per_area: counts(Field::Area),
            listings_per_type: counts(Field::PropertyType),
            listings_per_furnishing: counts(Field::Furnishing),
            listings_per_price_category: counts(Field::PriceCategory),
            listings_per_completion_status: counts(Field::CompletionStatus),
            listings_per_hotspot: counts(Field::HotspotFlag),
            mean_price_per_area: group_means(table, rows, Field::Area, Field::Price),
            completions_per_year: year_counts(table, rows, Field::YearOfCompletion),
            grade_by_area: CrossTab::build(table, rows, Field::Area, Field::InvestmentGrade),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::sample_table;

    fn all_rows(table: &ListingTable) -> Vec<usize> {
        (0..table.len()).collect()
    }

    #[test]
    fn summary_skips_nulls() {
        let table = sample_table();
        let s = NumericSummary::from_values(&column_values(&table, &all_rows(&table), Field::Price))
            .unwrap();
        assert_eq!(s.count, 5);
        assert_eq!(s.min, 900_000.0);
        assert_eq!(s.max, 7_800_000.0);
        assert_eq!(s.median, 2_500_000.0);
        assert!((s.mean - 3_180_000.0).abs() < 1e-6);
    }

    #[test]
    fn median_interpolates_even_counts() {
        let s = NumericSummary::from_values(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(s.median, 2.5);
        assert_eq!(quantile(&[1.0, 2.0, 3.0, 4.0], 0.25), 1.75);
    }

    #[test]
    fn empty_view_has_zero_count_and_no_statistics() {
        let table = sample_table();
        let agg = Aggregates::compute(&table, &[]);
        assert_eq!(agg.count, 0);
        assert_eq!(agg.price, None);
        assert_eq!(agg.size, None);
        assert!(agg.listings_per_area.is_empty());
        assert!(agg.grade_by_area.row_keys.is_empty());
        assert_eq!(agg.grade_by_area.max_count(), 0);
    }

    #[test]
    fn count_matches_view_size() {
        let table = sample_table();
        let rows = vec![0, 2, 3];
        let agg = Aggregates::compute(&table, &rows);
        assert_eq!(agg.count, rows.len());
        let per_area: usize = agg.listings_per_area.iter().map(|g| g.count).sum();
        assert_eq!(per_area, rows.len());
    }

    #[test]
    fn value_counts_order_by_count_then_key() {
        let table = sample_table();
        let counts = value_counts(&table, &all_rows(&table), Field::PropertyType);
        let keys: Vec<String> = counts.iter().map(|g| g.key.to_string()).collect();
        assert_eq!(keys, vec!["Apartment", "Penthouse", "Townhouse", "Villa"]);
        assert_eq!(counts[0].count, 3);
    }

    #[test]
    fn group_means_are_sorted_descending() {
        let table = sample_table();
        let means = group_means(&table, &all_rows(&table), Field::Area, Field::Price);
        assert_eq!(means[0].key, CellValue::Text("Jumeirah".into()));
        assert_eq!(means[0].mean, 5_150_000.0);
        // Downtown's null price is skipped rather than counted as zero.
        let downtown = means.iter().find(|g| g.key.to_string() == "Downtown").unwrap();
        assert_eq!(downtown.mean, 3_200_000.0);
    }

    #[test]
    fn top_n_puts_nulls_last() {
        let table = sample_table();
        assert_eq!(top_n(&table, &all_rows(&table), Field::Price, 2), vec![2, 1]);
        let by_yield = top_n(&table, &all_rows(&table), Field::RentalYield, 10);
        assert_eq!(by_yield.last(), Some(&4));
        assert_eq!(by_yield.len(), 6);
    }

    #[test]
    fn crosstab_fills_missing_pairs_with_zero() {
        let table = sample_table();
        let tab = CrossTab::build(&table, &all_rows(&table), Field::Area, Field::InvestmentGrade);
        let names: Vec<String> = tab.row_keys.iter().map(|k| k.to_string()).collect();
        assert_eq!(names, vec!["Downtown", "Dubai Marina", "Jumeirah"]);
        assert_eq!(tab.col_keys.len(), 3);
        // Downtown: B twice, no A or C.
        assert_eq!(tab.counts[0], vec![0, 2, 0]);
        // Dubai Marina: A and C.
        assert_eq!(tab.counts[1], vec![1, 0, 1]);
        assert_eq!(tab.max_count(), 2);
    }

    #[test]
    fn histogram_counts_every_value_once() {
        let table = sample_table();
        let rows = all_rows(&table);
        let hist = Histogram::build(&table, &rows, Field::Price, Some(Field::PropertyType), 4).unwrap();
        assert_eq!(hist.edges.len(), 5);
        assert_eq!(hist.total(), 5);
        // The maximum lands in the last bin rather than past it.
        let villa = hist.series.iter().find(|(name, _)| name == "Villa").unwrap();
        assert_eq!(villa.1, vec![0, 0, 0, 1]);
    }

    #[test]
    fn histogram_of_constant_values_has_width() {
        let table = sample_table();
        let hist = Histogram::build(&table, &[0], Field::Price, None, 3).unwrap();
        assert!(hist.bin_width() > 0.0);
        assert_eq!(hist.total(), 1);
        assert!(Histogram::build(&table, &[4], Field::Price, None, 3).is_none());
    }

    #[test]
    fn box_summary_clamps_whiskers_to_data() {
        let b = BoxSummary::from_values(&[1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();
        assert_eq!(b.q1, 2.0);
        assert_eq!(b.median, 3.0);
        assert_eq!(b.q3, 4.0);
        assert_eq!(b.lower_whisker, 1.0);
        assert_eq!(b.upper_whisker, 4.0);
    }

    #[test]
    fn grouped_points_skip_missing_coordinates() {
        let table = sample_table();
        let points = grouped_points(&table, &all_rows(&table), Field::Size, Field::Price, Field::PropertyType);
        let apartments = &points["Apartment"];
        assert_eq!(apartments.len(), 3);
        assert_eq!(apartments[0], [1200.0, 1_500_000.0]);
        assert!(!points.contains_key("Penthouse"));
    }

    #[test]
    fn year_counts_ascend() {
        let columns = vec!["year_of_completion".to_string()];
        let rows = vec![
            vec![CellValue::Integer(2021)],
            vec![CellValue::Float(2019.0)],
            vec![CellValue::Text("soon".into())],
            vec![CellValue::Integer(2021)],
        ];
        let table = ListingTable::new(columns, rows);
        assert_eq!(
            year_counts(&table, &[0, 1, 2, 3], Field::YearOfCompletion),
            vec![(2019, 1), (2021, 2)]
        );
    }
}
