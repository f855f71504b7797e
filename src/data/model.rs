use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the listings sheet
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring the dtypes a spreadsheet column can hold.
/// Category sets are `BTreeSet<CellValue>`, so `CellValue` must be `Ord`.
/// Equality, ordering and hashing all compare floats bit-wise (`total_cmp`),
/// so `0.0` and `-0.0` are distinct and `NaN` equals itself.
#[derive(Debug, Clone)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// ISO-8601 date string kept as text.
    Date(String),
    Null,
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use std::cmp::Ordering;
        use CellValue::*;

        fn rank(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) | Float(_) => 2,
                Text(_) => 3,
                Date(_) => 4,
            }
        }
        let (ra, rb) = (rank(self), rank(other));
        if ra != rb {
            return ra.cmp(&rb);
        }
        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            // Mixed numerics sort by value; the integer goes first on a tie,
            // so Integer(3) and Float(3.0) stay distinct.
            (Integer(a), Float(b)) => (*a as f64).total_cmp(b).then(Ordering::Less),
            (Float(a), Integer(b)) => a.total_cmp(&(*b as f64)).then(Ordering::Greater),
            (Text(a), Text(b)) | (Date(a), Date(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Text(s) | CellValue::Date(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{d}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Numeric view of the cell, if it holds a finite number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) if v.is_finite() => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Integer(i) => Some(*i),
            CellValue::Float(v) if v.is_finite() && v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) | CellValue::Date(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Text written to CSV exports. Nulls become empty fields.
    pub fn export_text(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            other => other.to_string(),
        }
    }

    /// Best-effort typing of a raw text cell.
    pub fn guess(s: &str) -> CellValue {
        let s = s.trim();
        if s.is_empty() {
            return CellValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return CellValue::Float(f);
        }
        match s {
            "true" | "True" | "TRUE" => CellValue::Bool(true),
            "false" | "False" | "FALSE" => CellValue::Bool(false),
            _ => CellValue::Text(s.to_string()),
        }
    }

    /// Lenient numeric conversion: anything that is not a finite number
    /// becomes `Null`.
    pub fn coerce_numeric(self) -> CellValue {
        match self {
            CellValue::Integer(_) => self,
            CellValue::Float(v) if v.is_finite() => self,
            CellValue::Bool(b) => CellValue::Integer(b as i64),
            CellValue::Text(ref s) => match CellValue::guess(&s.replace(',', "")) {
                n @ (CellValue::Integer(_) | CellValue::Float(_)) => n.coerce_numeric(),
                _ => CellValue::Null,
            },
            _ => CellValue::Null,
        }
    }

    /// Like [`CellValue::coerce_numeric`], but integral floats become integers.
    pub fn coerce_integer(self) -> CellValue {
        match self.coerce_numeric() {
            CellValue::Float(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => {
                CellValue::Integer(v as i64)
            }
            other => other,
        }
    }
}

// ---------------------------------------------------------------------------
// Field – the columns the dashboard knows about
// ---------------------------------------------------------------------------

/// How a known column is interpreted after loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Category,
    Numeric,
    Integer,
    Text,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Area,
    Price,
    PropertyType,
    Furnishing,
    Beds,
    Baths,
    Size,
    PricePerSqft,
    RentalYield,
    AverageRent,
    DaysOnMarket,
    MortgageScore,
    YearOfCompletion,
    PriceCategory,
    CompletionStatus,
    InvestmentGrade,
    HotspotFlag,
    ParkingSpaces,
    Elevators,
    Latitude,
    Longitude,
    Address,
    PostDate,
}

impl Field {
    pub const ALL: [Field; 23] = [
        Field::Area,
        Field::Price,
        Field::PropertyType,
        Field::Furnishing,
        Field::Beds,
        Field::Baths,
        Field::Size,
        Field::PricePerSqft,
        Field::RentalYield,
        Field::AverageRent,
        Field::DaysOnMarket,
        Field::MortgageScore,
        Field::YearOfCompletion,
        Field::PriceCategory,
        Field::CompletionStatus,
        Field::InvestmentGrade,
        Field::HotspotFlag,
        Field::ParkingSpaces,
        Field::Elevators,
        Field::Latitude,
        Field::Longitude,
        Field::Address,
        Field::PostDate,
    ];

    /// Header names accepted for this field, canonical name first.
    /// Matching is case-insensitive.
    pub fn column_names(self) -> &'static [&'static str] {
        match self {
            Field::Area => &["area_name", "area"],
            Field::Price => &["price"],
            Field::PropertyType => &["type", "property_type"],
            Field::Furnishing => &["furnishing"],
            Field::Beds => &["beds", "bedrooms"],
            Field::Baths => &["baths", "bathrooms"],
            Field::Size => &["size", "size_sqft", "area_sqft"],
            Field::PricePerSqft => &["price_per_sqft"],
            Field::RentalYield => &["rental_yield"],
            Field::AverageRent => &["average_rent"],
            Field::DaysOnMarket => &["days_on_market"],
            Field::MortgageScore => &["mortgage_score"],
            Field::YearOfCompletion => &["year_of_completion"],
            Field::PriceCategory => &["price_category"],
            Field::CompletionStatus => &["completion_status"],
            Field::InvestmentGrade => &["investment_grade"],
            Field::HotspotFlag => &["hotspot_flag"],
            Field::ParkingSpaces => &["total_parking_spaces", "parking_spaces"],
            Field::Elevators => &["elevators"],
            Field::Latitude => &["latitude", "lat"],
            Field::Longitude => &["longitude", "lon", "lng"],
            Field::Address => &["address"],
            Field::PostDate => &["post_date"],
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Field::Area
            | Field::PropertyType
            | Field::Furnishing
            | Field::PriceCategory
            | Field::CompletionStatus
            | Field::InvestmentGrade
            | Field::HotspotFlag => FieldKind::Category,
            Field::Beds | Field::Baths | Field::YearOfCompletion => FieldKind::Integer,
            Field::Address => FieldKind::Text,
            Field::PostDate => FieldKind::Date,
            _ => FieldKind::Numeric,
        }
    }

    /// Columns the loader refuses to do without.
    pub fn is_required(self) -> bool {
        matches!(
            self,
            Field::Area | Field::Price | Field::PropertyType | Field::Furnishing | Field::Beds
        )
    }

    /// Human-readable label for axes and headers.
    pub fn label(self) -> &'static str {
        match self {
            Field::Area => "Area",
            Field::Price => "Price (AED)",
            Field::PropertyType => "Type",
            Field::Furnishing => "Furnishing",
            Field::Beds => "Bedrooms",
            Field::Baths => "Bathrooms",
            Field::Size => "Size (sqft)",
            Field::PricePerSqft => "Price per sqft",
            Field::RentalYield => "Rental yield (%)",
            Field::AverageRent => "Average rent",
            Field::DaysOnMarket => "Days on market",
            Field::MortgageScore => "Mortgage score",
            Field::YearOfCompletion => "Year of completion",
            Field::PriceCategory => "Price category",
            Field::CompletionStatus => "Completion status",
            Field::InvestmentGrade => "Investment grade",
            Field::HotspotFlag => "Hotspot flag",
            Field::ParkingSpaces => "Parking spaces",
            Field::Elevators => "Elevators",
            Field::Latitude => "Latitude",
            Field::Longitude => "Longitude",
            Field::Address => "Address",
            Field::PostDate => "Post date",
        }
    }

    /// Normalise a loaded cell according to the field's kind.
    pub fn normalize(self, value: CellValue) -> CellValue {
        match self.kind() {
            FieldKind::Numeric => value.coerce_numeric(),
            FieldKind::Integer => value.coerce_integer(),
            FieldKind::Category | FieldKind::Text | FieldKind::Date => value,
        }
    }
}

// ---------------------------------------------------------------------------
// Listing – one row of the sheet
// ---------------------------------------------------------------------------

/// A single listing. Cells are aligned with [`ListingTable::columns`].
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub cells: Vec<CellValue>,
}

// ---------------------------------------------------------------------------
// ListingTable – the complete loaded sheet
// ---------------------------------------------------------------------------

/// The full parsed sheet with the known-field index and per-category values.
#[derive(Debug, Clone)]
pub struct ListingTable {
    /// Header row, in source order.
    pub columns: Vec<String>,
    /// All listings (rows), in source order.
    pub rows: Vec<Listing>,
    /// Position in `columns` of every known field that was found.
    fields: BTreeMap<Field, usize>,
    /// Sorted non-null distinct values of each category and integer field.
    pub unique_values: BTreeMap<Field, BTreeSet<CellValue>>,
}

impl ListingTable {
    /// Index the known fields, normalise their cells and collect distinct
    /// values. Rows shorter than the header are padded with nulls.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let mut fields = BTreeMap::new();
        for field in Field::ALL {
            let found = field.column_names().iter().find_map(|name| {
                columns
                    .iter()
                    .position(|c| c.trim().eq_ignore_ascii_case(name))
            });
            if let Some(idx) = found {
                fields.insert(field, idx);
            }
        }

        let width = columns.len();
        let mut dropped: BTreeMap<Field, usize> = BTreeMap::new();
        let rows: Vec<Listing> = rows
            .into_iter()
            .map(|mut cells| {
                cells.resize(width, CellValue::Null);
                for (&field, &idx) in &fields {
                    let raw = std::mem::replace(&mut cells[idx], CellValue::Null);
                    let was_null = raw.is_null();
                    cells[idx] = field.normalize(raw);
                    if !was_null && cells[idx].is_null() {
                        *dropped.entry(field).or_default() += 1;
                    }
                }
                Listing { cells }
            })
            .collect();
        for (field, n) in &dropped {
            log::warn!("{n} non-numeric value(s) in '{}' treated as missing", columns[fields[field]]);
        }

        let mut unique_values: BTreeMap<Field, BTreeSet<CellValue>> = BTreeMap::new();
        for (&field, &idx) in &fields {
            if !matches!(field.kind(), FieldKind::Category | FieldKind::Integer) {
                continue;
            }
            let set = unique_values.entry(field).or_default();
            for row in &rows {
                let v = &row.cells[idx];
                if !v.is_null() {
                    set.insert(v.clone());
                }
            }
        }

        ListingTable {
            columns,
            rows,
            fields,
            unique_values,
        }
    }

    /// Number of listings.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_field(&self, field: Field) -> bool {
        self.fields.contains_key(&field)
    }

    /// Known fields that are absent from the header.
    pub fn missing_fields(&self) -> impl Iterator<Item = Field> + '_ {
        Field::ALL.into_iter().filter(|f| !self.fields.contains_key(f))
    }

    pub fn column_name(&self, field: Field) -> Option<&str> {
        self.fields.get(&field).map(|&i| self.columns[i].as_str())
    }

    /// Cell of a known field at `row`, if the column exists.
    pub fn value(&self, row: usize, field: Field) -> Option<&CellValue> {
        let idx = *self.fields.get(&field)?;
        self.rows.get(row).map(|l| &l.cells[idx])
    }

    pub fn number(&self, row: usize, field: Field) -> Option<f64> {
        self.value(row, field).and_then(CellValue::as_f64)
    }

    pub fn text(&self, row: usize, field: Field) -> Option<&str> {
        self.value(row, field).and_then(CellValue::as_str)
    }

    /// Distinct non-null values of a category or integer field.
    pub fn categories(&self, field: Field) -> Option<&BTreeSet<CellValue>> {
        self.unique_values.get(&field)
    }

    /// Smallest and largest non-null value of a numeric field.
    pub fn bounds(&self, field: Field) -> Option<(f64, f64)> {
        (0..self.len())
            .filter_map(|r| self.number(r, field))
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A small in-memory sheet shared by the data-layer tests.
    pub(crate) fn sample_table() -> ListingTable {
        let columns = [
            "area_name",
            "price",
            "type",
            "furnishing",
            "beds",
            "size",
            "rental_yield",
            "investment_grade",
            "Latitude",
            "Longitude",
            "address",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let row = |area: &str, price: &str, ty: &str, furn: &str, beds: &str, size: &str, yld: &str, grade: &str| {
            vec![
                CellValue::guess(area),
                CellValue::guess(price),
                CellValue::guess(ty),
                CellValue::guess(furn),
                CellValue::guess(beds),
                CellValue::guess(size),
                CellValue::guess(yld),
                CellValue::guess(grade),
                CellValue::Float(25.1),
                CellValue::Float(55.2),
                CellValue::Text(format!("{area} tower")),
            ]
        };
        let rows = vec![
            row("Dubai Marina", "1500000", "Apartment", "Furnished", "2", "1200", "6.1", "A"),
            row("Downtown", "3200000", "Apartment", "Unfurnished", "3", "1800", "5.2", "B"),
            row("Jumeirah", "7800000", "Villa", "Furnished", "5", "5400", "4.0", "A"),
            row("Dubai Marina", "900000", "Apartment", "Unfurnished", "1", "750", "7.3", "C"),
            row("Downtown", "n/a", "Penthouse", "Partly Furnished", "4", "", "", "B"),
            row("Jumeirah", "2500000", "Townhouse", "Unfurnished", "3.0", "2400", "5.5", ""),
        ];
        ListingTable::new(columns, rows)
    }

    fn hash_of(v: &CellValue) -> u64 {
        use std::hash::{Hash, Hasher};
        let mut h = std::collections::hash_map::DefaultHasher::new();
        v.hash(&mut h);
        h.finish()
    }

    #[test]
    fn equality_agrees_with_ordering_and_hash() {
        let values = [
            CellValue::Float(0.0),
            CellValue::Float(-0.0),
            CellValue::Float(f64::NAN),
            CellValue::Integer(3),
            CellValue::Float(3.0),
            CellValue::Text("3".into()),
            CellValue::Null,
        ];
        for a in &values {
            for b in &values {
                assert_eq!(a == b, a.cmp(b) == std::cmp::Ordering::Equal, "{a:?} vs {b:?}");
                if a == b {
                    assert_eq!(hash_of(a), hash_of(b));
                }
            }
        }
        assert_ne!(CellValue::Float(0.0), CellValue::Float(-0.0));
        assert_eq!(CellValue::Float(f64::NAN), CellValue::Float(f64::NAN));
    }

    #[test]
    fn resolves_fields_case_insensitively() {
        let table = sample_table();
        assert_eq!(table.column_name(Field::Latitude), Some("Latitude"));
        assert_eq!(table.column_name(Field::PropertyType), Some("type"));
        assert!(!table.has_field(Field::Baths));
    }

    #[test]
    fn coerces_numeric_fields_leniently() {
        let table = sample_table();
        assert_eq!(table.value(4, Field::Price), Some(&CellValue::Null));
        assert_eq!(table.value(5, Field::Beds), Some(&CellValue::Integer(3)));
        assert_eq!(table.number(0, Field::RentalYield), Some(6.1));
        // Non-field columns are left alone.
        assert_eq!(table.text(0, Field::Address), Some("Dubai Marina tower"));
    }

    #[test]
    fn unique_values_skip_nulls_and_sort() {
        let table = sample_table();
        let beds: Vec<i64> = table
            .categories(Field::Beds)
            .unwrap()
            .iter()
            .filter_map(CellValue::as_i64)
            .collect();
        assert_eq!(beds, vec![1, 2, 3, 4, 5]);
        let grades = table.categories(Field::InvestmentGrade).unwrap();
        assert!(!grades.contains(&CellValue::Null));
        assert_eq!(grades.len(), 3);
    }

    #[test]
    fn bounds_ignore_nulls() {
        let table = sample_table();
        assert_eq!(table.bounds(Field::Price), Some((900_000.0, 7_800_000.0)));
        assert_eq!(table.bounds(Field::Baths), None);
    }

    #[test]
    fn short_rows_are_padded() {
        let table = ListingTable::new(
            vec!["area_name".into(), "price".into()],
            vec![vec![CellValue::Text("Downtown".into())]],
        );
        assert_eq!(table.value(0, Field::Price), Some(&CellValue::Null));
    }

    #[test]
    fn mixed_numerics_order_by_value() {
        let mut set = BTreeSet::new();
        set.insert(CellValue::Float(2.5));
        set.insert(CellValue::Integer(3));
        set.insert(CellValue::Integer(1));
        let ordered: Vec<_> = set.into_iter().collect();
        assert_eq!(
            ordered,
            vec![CellValue::Integer(1), CellValue::Float(2.5), CellValue::Integer(3)]
        );
    }

    #[test]
    fn coerce_numeric_strips_thousands_separators() {
        let v = CellValue::Text("1,250,000".into()).coerce_numeric();
        assert_eq!(v, CellValue::Integer(1_250_000));
        assert_eq!(CellValue::Text("abc".into()).coerce_numeric(), CellValue::Null);
        assert_eq!(CellValue::Float(f64::NAN).coerce_numeric(), CellValue::Null);
    }
}
