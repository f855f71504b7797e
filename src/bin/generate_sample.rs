use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use parquet::arrow::ArrowWriter;

const LISTINGS: usize = 600;

/// (area, base price per sqft, latitude, longitude)
const AREAS: [(&str, f64, f64, f64); 8] = [
    ("Dubai Marina", 1_750.0, 25.0805, 55.1403),
    ("Downtown Dubai", 2_400.0, 25.1972, 55.2744),
    ("Palm Jumeirah", 3_100.0, 25.1124, 55.1390),
    ("Jumeirah Village Circle", 950.0, 25.0592, 55.2069),
    ("Business Bay", 1_650.0, 25.1850, 55.2650),
    ("Arabian Ranches", 1_300.0, 25.0570, 55.2690),
    ("Dubai Hills Estate", 1_900.0, 25.1100, 55.2440),
    ("International City", 650.0, 25.1650, 55.4080),
];

/// (type, min beds, max beds, sqft per bedroom)
const TYPES: [(&str, i64, i64, f64); 4] = [
    ("Apartment", 0, 3, 650.0),
    ("Villa", 3, 6, 1_100.0),
    ("Townhouse", 2, 4, 850.0),
    ("Penthouse", 3, 5, 1_300.0),
];

const FURNISHING: [&str; 3] = ["Furnished", "Unfurnished", "Partly Furnished"];
const GRADES: [&str; 4] = ["A", "B", "C", "D"];

/// SplitMix64 generator; the same seed gives the same dataset everywhere.
struct SplitMix(u64);

impl SplitMix {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[0, 1)`.
    fn unit(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Normal deviate, Marsaglia polar method.
    fn normal(&mut self, mean: f64, sd: f64) -> f64 {
        loop {
            let u = 2.0 * self.unit() - 1.0;
            let v = 2.0 * self.unit() - 1.0;
            let s = u * u + v * v;
            if s > 0.0 && s < 1.0 {
                return mean + sd * u * (-2.0 * s.ln() / s).sqrt();
            }
        }
    }

    /// Uniform integer in `lo..=hi`.
    fn between(&mut self, lo: i64, hi: i64) -> i64 {
        lo + (self.next_u64() % (hi - lo + 1) as u64) as i64
    }

    fn choose<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }
}

fn price_category(price: f64) -> &'static str {
    match price {
        p if p < 1_000_000.0 => "Affordable",
        p if p < 3_000_000.0 => "Mid-range",
        p if p < 8_000_000.0 => "Premium",
        _ => "Luxury",
    }
}

#[derive(Default)]
struct Columns {
    area: Vec<String>,
    kind: Vec<String>,
    furnishing: Vec<String>,
    beds: Vec<i64>,
    baths: Vec<i64>,
    size: Vec<f64>,
    price: Vec<f64>,
    price_per_sqft: Vec<f64>,
    average_rent: Vec<f64>,
    rental_yield: Vec<f64>,
    price_category: Vec<String>,
    days_on_market: Vec<i64>,
    mortgage_score: Vec<f64>,
    year_of_completion: Vec<Option<i64>>,
    completion_status: Vec<String>,
    investment_grade: Vec<String>,
    hotspot_flag: Vec<i64>,
    parking: Vec<i64>,
    elevators: Vec<i64>,
    latitude: Vec<f64>,
    longitude: Vec<f64>,
    address: Vec<String>,
    post_date: Vec<String>,
}

fn generate(rng: &mut SplitMix) -> Columns {
    let mut c = Columns::default();
    for i in 0..LISTINGS {
        let &(area, base_psf, lat, lon) = rng.choose(&AREAS);
        let &(kind, min_beds, max_beds, sqft_per_bed) = rng.choose(&TYPES);
        let beds = rng.between(min_beds, max_beds);
        let size = ((beds.max(1) as f64 * sqft_per_bed) * rng.normal(1.0, 0.12).max(0.6)).round();
        let psf = (base_psf * rng.normal(1.0, 0.15).max(0.5)).round();
        let price = ((size * psf) / 1_000.0).round() * 1_000.0;
        let rental_yield = (rng.normal(6.0, 1.2).clamp(2.5, 11.0) * 100.0).round() / 100.0;
        let rent = (price * rental_yield / 100.0).round();
        let year = rng.between(2005, 2028);
        let ready = year <= 2025;

        c.area.push(area.to_string());
        c.kind.push(kind.to_string());
        c.furnishing.push(rng.choose(&FURNISHING).to_string());
        c.beds.push(beds);
        c.baths.push(beds.max(1) + rng.between(0, 1));
        c.size.push(size);
        c.price.push(price);
        c.price_per_sqft.push(psf);
        c.average_rent.push(rent);
        c.rental_yield.push(rental_yield);
        c.price_category.push(price_category(price).to_string());
        c.days_on_market.push(rng.between(1, 180));
        c.mortgage_score.push((rng.normal(70.0, 12.0).clamp(0.0, 100.0) * 10.0).round() / 10.0);
        // Roughly one listing in twenty has no completion year on record.
        c.year_of_completion.push((rng.unit() > 0.05).then_some(year));
        c.completion_status.push(if ready { "Ready" } else { "Off-plan" }.to_string());
        // Higher yields earn better grades.
        let grade = 3 - ((rental_yield - 2.5) / 2.2).floor().clamp(0.0, 3.0) as usize;
        c.investment_grade.push(GRADES[grade].to_string());
        c.hotspot_flag.push((rng.unit() < 0.25) as i64);
        c.parking.push(if kind == "Apartment" { rng.between(0, 2) } else { rng.between(2, 4) });
        c.elevators.push(if kind == "Apartment" { rng.between(1, 8) } else { 0 });
        c.latitude.push(lat + rng.normal(0.0, 0.008));
        c.longitude.push(lon + rng.normal(0.0, 0.008));
        c.address.push(format!("Unit {}, {area}", 100 + i));
        c.post_date.push(format!("2024-{:02}-{:02}", rng.between(1, 12), rng.between(1, 28)));
    }
    c
}

fn strings(values: &[String]) -> ArrayRef {
    Arc::new(StringArray::from(
        values.iter().map(String::as_str).collect::<Vec<_>>(),
    ))
}

fn build_batch(c: Columns) -> Result<RecordBatch> {
    let columns: Vec<(&str, DataType, bool, ArrayRef)> = vec![
        ("area_name", DataType::Utf8, false, strings(&c.area)),
        ("type", DataType::Utf8, false, strings(&c.kind)),
        ("furnishing", DataType::Utf8, false, strings(&c.furnishing)),
        ("beds", DataType::Int64, false, Arc::new(Int64Array::from(c.beds))),
        ("baths", DataType::Int64, false, Arc::new(Int64Array::from(c.baths))),
        ("size", DataType::Float64, false, Arc::new(Float64Array::from(c.size))),
        ("price", DataType::Float64, false, Arc::new(Float64Array::from(c.price))),
        ("price_per_sqft", DataType::Float64, false, Arc::new(Float64Array::from(c.price_per_sqft))),
        ("average_rent", DataType::Float64, false, Arc::new(Float64Array::from(c.average_rent))),
        ("rental_yield", DataType::Float64, false, Arc::new(Float64Array::from(c.rental_yield))),
        ("price_category", DataType::Utf8, false, strings(&c.price_category)),
        ("days_on_market", DataType::Int64, false, Arc::new(Int64Array::from(c.days_on_market))),
        ("mortgage_score", DataType::Float64, false, Arc::new(Float64Array::from(c.mortgage_score))),
        ("year_of_completion", DataType::Int64, true, Arc::new(Int64Array::from(c.year_of_completion))),
        ("completion_status", DataType::Utf8, false, strings(&c.completion_status)),
        ("investment_grade", DataType::Utf8, false, strings(&c.investment_grade)),
        ("hotspot_flag", DataType::Int64, false, Arc::new(Int64Array::from(c.hotspot_flag))),
        ("total_parking_spaces", DataType::Int64, false, Arc::new(Int64Array::from(c.parking))),
        ("elevators", DataType::Int64, false, Arc::new(Int64Array::from(c.elevators))),
        ("Latitude", DataType::Float64, false, Arc::new(Float64Array::from(c.latitude))),
        ("Longitude", DataType::Float64, false, Arc::new(Float64Array::from(c.longitude))),
        ("address", DataType::Utf8, false, strings(&c.address)),
        ("post_date", DataType::Utf8, false, strings(&c.post_date)),
    ];

    let (fields, arrays): (Vec<Field>, Vec<ArrayRef>) = columns
        .into_iter()
        .map(|(name, dt, nullable, arr)| (Field::new(name, dt, nullable), arr))
        .unzip();
    RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays).context("building record batch")
}

fn write_parquet(batch: &RecordBatch, path: &str) -> Result<()> {
    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None).context("creating parquet writer")?;
    writer.write(batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn write_csv(batch: &RecordBatch, path: &str) -> Result<()> {
    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = arrow::csv::Writer::new(file);
    writer.write(batch).context("writing CSV")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SplitMix(42);
    let batch = build_batch(generate(&mut rng))?;

    write_parquet(&batch, "sample_listings.parquet")?;
    write_csv(&batch, "sample_listings.csv")?;

    println!("{}", pretty_format_batches(&[batch.slice(0, 5)])?);
    println!(
        "Wrote {} listings ({} columns) to sample_listings.parquet and sample_listings.csv",
        batch.num_rows(),
        batch.num_columns()
    );
    Ok(())
}
