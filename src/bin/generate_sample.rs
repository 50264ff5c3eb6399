use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use gapminder_explorer::{Column, Record};

const FIRST_YEAR: i32 = 1950;
const LAST_YEAR: i32 = 2018;

/// (country, continent, base income, base population in millions)
const COUNTRIES: &[(&str, &str, f64, f64)] = &[
    ("Vietnam", "Asia", 900.0, 25.0),
    ("Japan", "Asia", 3500.0, 83.0),
    ("India", "Asia", 800.0, 370.0),
    ("Indonesia", "Asia", 1100.0, 70.0),
    ("Mongolia", "Asia", 1300.0, 0.8),
    ("Gabon", "Africa", 4000.0, 0.5),
    ("Nigeria", "Africa", 1400.0, 38.0),
    ("Kenya", "Africa", 1000.0, 6.0),
    ("Chad", "Africa", 700.0, 2.5),
    ("Egypt", "Africa", 1600.0, 21.0),
    ("Slovenia", "Europe", 5000.0, 1.5),
    ("Sweden", "Europe", 9000.0, 7.0),
    ("Portugal", "Europe", 3500.0, 8.4),
    ("Poland", "Europe", 4000.0, 24.8),
    ("Jamaica", "Americas", 3000.0, 1.4),
    ("Chile", "Americas", 4500.0, 6.1),
    ("Canada", "Americas", 12000.0, 13.7),
    ("Peru", "Americas", 3000.0, 7.6),
    ("Tuvalu", "Oceania", 1500.0, 0.005),
    ("Fiji", "Oceania", 2500.0, 0.29),
    ("Australia", "Oceania", 11000.0, 8.2),
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    /// `Some(v)` except for a `gap` fraction of draws.
    fn sparse(&mut self, v: f64, gap: f64) -> Option<f64> {
        (self.next_f64() >= gap).then_some(v)
    }
}

fn generate(rng: &mut SimpleRng) -> Vec<Record> {
    let mut records = Vec::new();
    for &(country, continent, income0, pop0) in COUNTRIES {
        for year in FIRST_YEAR..=LAST_YEAR {
            let t = f64::from(year - FIRST_YEAR);
            let income = income0 * (1.0 + 0.025 * rng.gauss(1.0, 0.3)).powf(t);
            let population = pop0 * 1e6 * 1.015_f64.powf(t);
            let development = (income.ln() - 6.0) / 5.0;
            let life = 45.0 + 30.0 * development.clamp(0.0, 1.0) + rng.gauss(0.0, 1.0);
            let mortality = 250.0 * (1.0 - development).clamp(0.02, 1.0) + rng.gauss(0.0, 3.0);

            let mut rec = Record::new(country, year, continent);
            rec.income = Some(income.round());
            rec.population = Some(population.round());
            rec.life_expectancy = rng.sparse((life.min(85.0) * 10.0).round() / 10.0, 0.02);
            rec.child_mortality = rng.sparse((mortality.max(2.0) * 10.0).round() / 10.0, 0.05);
            rec.co2_emission = rng.sparse((income / 4000.0 * 100.0).round() / 100.0, 0.1);
            if year >= 1990 {
                let hdi = 0.3 + 0.6 * development.clamp(0.0, 1.0);
                rec.human_development_index = rng.sparse((hdi * 1000.0).round() / 1000.0, 0.1);
            }
            if (1990..=2011).contains(&year) {
                let share = rng.next_f64();
                rec.hiv_cases = rng.sparse((population * 1e-4 * share).round(), 0.3);
            }
            records.push(rec);
        }
    }
    records
}

fn write_csv(path: &Path, records: &[Record]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    // Header uses the display labels; the loader maps them back.
    writer.write_record(Column::ALL.iter().map(|c| c.label()))?;
    for rec in records {
        let cell = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
        writer.write_record([
            rec.country.clone(),
            rec.year.to_string(),
            cell(rec.life_expectancy),
            cell(rec.child_mortality),
            cell(rec.income),
            cell(rec.population),
            cell(rec.co2_emission),
            cell(rec.human_development_index),
            cell(rec.hiv_cases),
            rec.continent.clone(),
        ])?;
    }
    writer.flush().context("flushing CSV file")?;
    Ok(())
}

fn write_parquet(path: &Path, records: &[Record]) -> Result<()> {
    let mut fields = vec![
        Field::new(Column::Country.name(), DataType::Utf8, false),
        Field::new(Column::Year.name(), DataType::Int64, false),
    ];
    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(
            records.iter().map(|r| r.country.as_str()).collect::<Vec<_>>(),
        )),
        Arc::new(Int64Array::from(
            records.iter().map(|r| i64::from(r.year)).collect::<Vec<_>>(),
        )),
    ];
    for metric in Column::METRICS {
        fields.push(Field::new(metric.name(), DataType::Float64, true));
        columns.push(Arc::new(Float64Array::from(
            records.iter().map(|r| r.metric(metric)).collect::<Vec<_>>(),
        )));
    }
    fields.push(Field::new(Column::Continent.name(), DataType::Utf8, false));
    columns.push(Arc::new(StringArray::from(
        records.iter().map(|r| r.continent.as_str()).collect::<Vec<_>>(),
    )));

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let output = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "gapminder_sample.csv".to_string());
    let path = Path::new(&output);

    let mut rng = SimpleRng::new(42);
    let records = generate(&mut rng);

    match path.extension().and_then(|e| e.to_str()) {
        Some("csv") => write_csv(path, &records)?,
        Some("parquet") | Some("pq") => write_parquet(path, &records)?,
        other => bail!("unsupported output extension: {other:?} (use .csv or .parquet)"),
    }

    log::info!("Wrote {} records to {}", records.len(), path.display());
    println!(
        "Wrote {} records ({} countries, {FIRST_YEAR}-{LAST_YEAR}) to {output}",
        records.len(),
        COUNTRIES.len()
    );
    Ok(())
}
