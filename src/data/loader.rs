use std::path::Path;

use anyhow::{anyhow, Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use calamine::{open_workbook_auto, Data, DataType as _, Reader};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::SchemaError;
use super::model::{CellValue, Field, ListingTable};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a listings sheet from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xlsb` / `.xls` / `.ods` – first worksheet, header in row 1
/// * `.csv`     – header row with column names
/// * `.json`    – `[{ "area_name": ..., "price": ..., ... }, ...]`
/// * `.parquet` – one column per field, as written by Pandas or Polars
///
/// The required columns (area, price, type, furnishing, beds) must be
/// present; numeric columns are coerced leniently.
pub fn load_file(path: &Path) -> Result<ListingTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => load_workbook(path)?,
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(SchemaError::UnsupportedExtension(other.to_string()).into()),
    };

    validate(&table)?;

    let missing: Vec<&str> = table
        .missing_fields()
        .map(|f| f.column_names()[0])
        .collect();
    if !missing.is_empty() {
        log::warn!("Optional columns not found, related charts are hidden: {missing:?}");
    }
    log::info!(
        "Loaded {} listings with {} columns from {}",
        table.len(),
        table.columns.len(),
        path.display()
    );
    Ok(table)
}

/// Check that every required field resolved to a column.
pub fn validate(table: &ListingTable) -> Result<(), SchemaError> {
    match Field::ALL
        .into_iter()
        .find(|f| f.is_required() && !table.has_field(*f))
    {
        Some(field) => Err(SchemaError::MissingColumn(field)),
        None => Ok(()),
    }
}

fn text_cell(s: &str) -> CellValue {
    let s = s.trim();
    if s.is_empty() {
        CellValue::Null
    } else {
        CellValue::Text(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Workbook loader
// ---------------------------------------------------------------------------

fn load_workbook(path: &Path) -> Result<ListingTable> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| anyhow!("opening workbook: {e}"))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(SchemaError::EmptySheet)?
        .map_err(|e| anyhow!("reading first worksheet: {e}"))?;

    let mut rows = range.rows();
    let columns: Vec<String> = rows
        .next()
        .ok_or(SchemaError::MissingHeader)?
        .iter()
        .map(|c| c.to_string().trim().to_string())
        .collect();

    let body = rows
        .filter(|r| r.iter().any(|c| !matches!(c, Data::Empty)))
        .map(|r| r.iter().map(workbook_cell).collect())
        .collect();

    Ok(ListingTable::new(columns, body))
}

fn workbook_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => text_cell(s),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(_) => cell
            .as_datetime()
            .map(|dt| CellValue::Date(dt.format("%Y-%m-%d").to_string()))
            .unwrap_or(CellValue::Null),
        Data::DateTimeIso(s) => CellValue::Date(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        _ => CellValue::Null,
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one listing per record.
fn load_csv(path: &Path) -> Result<ListingTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .context("opening CSV")?;
    let columns: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();
    if columns.iter().all(|c| c.is_empty()) {
        return Err(SchemaError::MissingHeader.into());
    }

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        // Cells stay text; only known fields are typed, in ListingTable::new.
        rows.push(record.iter().map(text_cell).collect());
    }

    Ok(ListingTable::new(columns, rows))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON: an array of flat objects, one per listing.
/// Columns are the union of keys, in order of first appearance.
fn load_json(path: &Path) -> Result<ListingTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;
    let records = root.as_array().ok_or(SchemaError::NotRecords)?;

    let mut columns: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(JsonValue::as_object)
        .map(|obj| {
            columns
                .iter()
                .map(|col| obj.get(col).map(json_cell).unwrap_or(CellValue::Null))
                .collect()
        })
        .collect();

    Ok(ListingTable::new(columns, rows))
}

fn json_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => text_cell(s),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one flat column per field.
///
/// Integer, float, boolean and string columns map directly; dates and
/// timestamps become ISO dates; anything else is cast to text.
fn load_parquet(path: &Path) -> Result<ListingTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows: Vec<Vec<CellValue>> = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let start = rows.len();
        rows.resize_with(start + batch.num_rows(), || Vec::with_capacity(columns.len()));

        for (col_idx, col) in batch.columns().iter().enumerate() {
            let cells = column_cells(col)
                .with_context(|| format!("converting column '{}'", columns[col_idx]))?;
            for (offset, cell) in cells.into_iter().enumerate() {
                rows[start + offset].push(cell);
            }
        }
    }

    Ok(ListingTable::new(columns, rows))
}

/// Convert a whole Arrow column into cells.
fn column_cells(col: &ArrayRef) -> Result<Vec<CellValue>> {
    let n = col.len();
    let cells = match col.data_type() {
        DataType::Boolean => {
            let arr = col.as_boolean();
            (0..n)
                .map(|r| match arr.is_null(r) {
                    true => CellValue::Null,
                    false => CellValue::Bool(arr.value(r)),
                })
                .collect()
        }
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32 => {
            let cast_arr = cast(col, &DataType::Int64)?;
            let arr = cast_arr.as_primitive::<Int64Type>();
            (0..n)
                .map(|r| match arr.is_null(r) {
                    true => CellValue::Null,
                    false => CellValue::Integer(arr.value(r)),
                })
                .collect()
        }
        DataType::UInt64 | DataType::Float16 | DataType::Float32 | DataType::Float64 => {
            let cast_arr = cast(col, &DataType::Float64)?;
            let arr = cast_arr.as_primitive::<Float64Type>();
            (0..n)
                .map(|r| match arr.is_null(r) {
                    true => CellValue::Null,
                    false => CellValue::Float(arr.value(r)),
                })
                .collect()
        }
        DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _) => {
            let cast_arr = cast(col, &DataType::Utf8)?;
            let arr = cast_arr.as_string::<i32>();
            (0..n)
                .map(|r| match arr.is_null(r) {
                    true => CellValue::Null,
                    false => {
                        let s = arr.value(r);
                        let date = s.split(['T', ' ']).next().unwrap_or(s);
                        CellValue::Date(date.to_string())
                    }
                })
                .collect()
        }
        _ => {
            let cast_arr = cast(col, &DataType::Utf8)?;
            let arr = cast_arr.as_string::<i32>();
            (0..n)
                .map(|r| match arr.is_null(r) {
                    true => CellValue::Null,
                    false => text_cell(arr.value(r)),
                })
                .collect()
        }
    };
    Ok(cells)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field as ArrowField, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("estate-lens-{}-{name}", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    const CSV: &str = "\
area_name,price,type,furnishing,beds,Latitude
Dubai Marina,\"1,500,000\",Apartment,Furnished,2,25.08
Downtown,unknown,Apartment,Unfurnished,3,
Jumeirah,7800000,Villa,Furnished,5.0,25.2
";

    #[test]
    fn loads_csv_and_coerces_numbers() {
        let path = temp_file("listings.csv", CSV);
        let table = load_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(table.len(), 3);
        assert_eq!(table.number(0, Field::Price), Some(1_500_000.0));
        assert_eq!(table.value(1, Field::Price), Some(&CellValue::Null));
        assert_eq!(table.value(2, Field::Beds), Some(&CellValue::Integer(5)));
        assert_eq!(table.number(0, Field::Latitude), Some(25.08));
        assert_eq!(table.value(1, Field::Latitude), Some(&CellValue::Null));
    }

    #[test]
    fn csv_passthrough_columns_export_verbatim() {
        let csv = "\
area_name,price,type,furnishing,beds,ref,phone,verified,ratio
Downtown,3200000,Apartment,Unfurnished,3,007,+971501234567,TRUE,1.50
";
        let path = temp_file("passthrough.csv", csv);
        let table = load_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(table.rows[0].cells[5], CellValue::Text("007".into()));
        assert_eq!(table.value(0, Field::Beds), Some(&CellValue::Integer(3)));

        let mut buf = Vec::new();
        crate::data::export::write_csv(&table, &[0], &mut buf).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert_eq!(
            out.lines().nth(1),
            Some("Downtown,3200000,Apartment,Unfurnished,3,007,+971501234567,TRUE,1.50")
        );
    }

    #[test]
    fn loads_first_worksheet_with_dates() {
        use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

        let path = std::env::temp_dir().join(format!("estate-lens-{}-listings.xlsx", std::process::id()));
        let mut workbook = Workbook::new();
        {
            let sheet = workbook.add_worksheet();
            let header = ["area_name", "price", "type", "furnishing", "beds", "post_date", "ref"];
            for (col, name) in header.iter().enumerate() {
                sheet.write_string(0, col as u16, *name).unwrap();
            }
            let date_format = Format::new().set_num_format("yyyy-mm-dd");
            let posted = ExcelDateTime::from_ymd(2024, 3, 5).unwrap();
            sheet.write_string(1, 0, "Dubai Marina").unwrap();
            sheet.write_number(1, 1, 1_500_000.0).unwrap();
            sheet.write_string(1, 2, "Apartment").unwrap();
            sheet.write_string(1, 3, "Furnished").unwrap();
            sheet.write_number(1, 4, 2.0).unwrap();
            sheet.write_datetime_with_format(1, 5, &posted, &date_format).unwrap();
            sheet.write_string(1, 6, "007").unwrap();
            sheet.write_string(2, 0, "Downtown").unwrap();
            sheet.write_string(2, 1, "on request").unwrap();
            sheet.write_string(2, 2, "Villa").unwrap();
            sheet.write_string(2, 3, "Unfurnished").unwrap();
            sheet.write_number(2, 4, 5.0).unwrap();
        }
        workbook.save(&path).unwrap();

        let table = load_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(table.len(), 2);
        assert_eq!(table.columns[6], "ref");
        assert_eq!(table.text(0, Field::Area), Some("Dubai Marina"));
        assert_eq!(table.number(0, Field::Price), Some(1_500_000.0));
        assert_eq!(table.value(0, Field::Beds), Some(&CellValue::Integer(2)));
        assert_eq!(
            table.value(0, Field::PostDate),
            Some(&CellValue::Date("2024-03-05".into()))
        );
        assert_eq!(table.rows[0].cells[6], CellValue::Text("007".into()));
        assert_eq!(table.value(1, Field::Price), Some(&CellValue::Null));
        assert_eq!(table.value(1, Field::PostDate), Some(&CellValue::Null));
    }

    #[test]
    fn missing_required_column_is_fatal() {
        let path = temp_file("no-beds.csv", "area_name,price,type,furnishing\nA,1,Villa,Furnished\n");
        let err = load_file(&path).unwrap_err();
        std::fs::remove_file(&path).ok();

        assert_eq!(
            err.downcast_ref::<SchemaError>(),
            Some(&SchemaError::MissingColumn(Field::Beds))
        );
    }

    #[test]
    fn missing_file_is_an_error() {
        let path = std::env::temp_dir().join("estate-lens-does-not-exist.xlsx");
        assert!(load_file(&path).is_err());
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = load_file(Path::new("listings.txt")).unwrap_err();
        assert_eq!(
            err.downcast_ref::<SchemaError>(),
            Some(&SchemaError::UnsupportedExtension("txt".into()))
        );
    }

    #[test]
    fn loads_json_records() {
        let json = r#"[
            {"area_name": "Downtown", "price": 3200000, "type": "Apartment", "furnishing": "Unfurnished", "beds": 3},
            {"area_name": "Jumeirah", "price": "7800000", "type": "Villa", "furnishing": "Furnished", "beds": 5, "baths": 6}
        ]"#;
        let path = temp_file("listings.json", json);
        let table = load_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(table.len(), 2);
        assert_eq!(table.number(1, Field::Price), Some(7_800_000.0));
        assert_eq!(table.value(0, Field::Baths), Some(&CellValue::Null));
        assert_eq!(table.value(1, Field::Baths), Some(&CellValue::Integer(6)));
    }

    #[test]
    fn json_must_be_an_array() {
        let path = temp_file("object.json", r#"{"price": 1}"#);
        let err = load_file(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert_eq!(err.downcast_ref::<SchemaError>(), Some(&SchemaError::NotRecords));
    }

    #[test]
    fn loads_parquet_columns() {
        let schema = Arc::new(Schema::new(vec![
            ArrowField::new("area_name", DataType::Utf8, true),
            ArrowField::new("price", DataType::Float64, true),
            ArrowField::new("type", DataType::Utf8, false),
            ArrowField::new("furnishing", DataType::Utf8, false),
            ArrowField::new("beds", DataType::Int64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec![Some("Downtown"), None])),
                Arc::new(Float64Array::from(vec![Some(3_200_000.0), None])),
                Arc::new(StringArray::from(vec!["Apartment", "Villa"])),
                Arc::new(StringArray::from(vec!["Furnished", "Unfurnished"])),
                Arc::new(Int64Array::from(vec![Some(3), Some(5)])),
            ],
        )
        .unwrap();

        let path = std::env::temp_dir().join(format!("estate-lens-{}-listings.parquet", std::process::id()));
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(table.len(), 2);
        assert_eq!(table.text(0, Field::Area), Some("Downtown"));
        assert_eq!(table.value(1, Field::Area), Some(&CellValue::Null));
        assert_eq!(table.value(1, Field::Price), Some(&CellValue::Null));
        assert_eq!(table.value(1, Field::Beds), Some(&CellValue::Integer(5)));
    }
}
