use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Date32Array, Int64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, Duration, NaiveDate};
use parquet::arrow::ArrowWriter;

/// Seeded noise for the synthetic traffic (SplitMix64 stream).
struct Noise {
    counter: u64,
}

impl Noise {
    const GOLDEN_GAMMA: u64 = 0x9e37_79b9_7f4a_7c15;

    fn seeded(seed: u64) -> Self {
        Noise { counter: seed }
    }

    fn bits(&mut self) -> u64 {
        self.counter = self.counter.wrapping_add(Self::GOLDEN_GAMMA);
        let mut z = self.counter;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }

    /// Uniform in [0, 1).
    fn uniform(&mut self) -> f64 {
        (self.bits() >> 11) as f64 * f64::EPSILON / 2.0
    }

    /// Normal deviate with the given spread, centred on zero.
    fn jitter(&mut self, std_dev: f64) -> f64 {
        let radius = (-2.0 * (1.0 - self.uniform()).ln()).sqrt();
        let angle = std::f64::consts::TAU * self.uniform();
        std_dev * radius * angle.cos()
    }
}

/// Page views for day `i` since launch: growth, a weekday dip, a summer /
/// holiday slump, noise, and the odd viral spike or outage.
fn page_views(i: i64, date: NaiveDate, noise: &mut Noise) -> i64 {
    let trend = 3_000.0 + 120.0 * i as f64 / 30.0;
    let weekly = match date.weekday().num_days_from_monday() {
        5 | 6 => 0.8,
        _ => 1.05,
    };
    let day_of_year = date.ordinal0() as f64 / 365.25;
    let yearly = 1.0 + 0.12 * (2.0 * std::f64::consts::PI * (day_of_year - 0.2)).cos();

    let mut value = trend * weekly * yearly + noise.jitter(0.08 * trend);

    let roll = noise.uniform();
    if roll < 0.01 {
        value *= 8.0 + 10.0 * noise.uniform();
    } else if roll < 0.02 {
        value *= 0.05;
    }
    value.max(0.0).round() as i64
}

fn main() -> Result<()> {
    let mut noise = Noise::seeded(42);

    let start = NaiveDate::from_ymd_opt(2016, 5, 9).context("start date")?;
    let end = NaiveDate::from_ymd_opt(2019, 12, 3).context("end date")?;
    let days = (end - start).num_days();

    let mut dates: Vec<NaiveDate> = Vec::with_capacity(days as usize + 1);
    let mut values: Vec<i64> = Vec::with_capacity(days as usize + 1);
    for i in 0..=days {
        let date = start + Duration::days(i);
        dates.push(date);
        values.push(page_views(i, date, &mut noise));
    }

    // CSV
    let csv_path = "sample_pageviews.csv";
    let mut writer = csv::Writer::from_path(csv_path).context("creating CSV")?;
    writer.write_record(["date", "value"])?;
    for (date, value) in dates.iter().zip(&values) {
        writer.write_record([date.to_string(), value.to_string()])?;
    }
    writer.flush()?;

    // Parquet, dates as Date32 (days since 1970-01-01)
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).context("epoch")?;
    let date_array = Date32Array::from(
        dates
            .iter()
            .map(|d| (*d - epoch).num_days() as i32)
            .collect::<Vec<_>>(),
    );
    let value_array = Int64Array::from(values.clone());

    let schema = Arc::new(Schema::new(vec![
        Field::new("date", DataType::Date32, false),
        Field::new("value", DataType::Int64, false),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![Arc::new(date_array), Arc::new(value_array)],
    )
    .context("building record batch")?;

    let parquet_path = "sample_pageviews.parquet";
    let file = std::fs::File::create(parquet_path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
    writer.write(&batch)?;
    writer.close()?;

    println!(
        "Wrote {} days ({start} … {end}) to {csv_path} and {parquet_path}",
        values.len()
    );
    Ok(())
}
