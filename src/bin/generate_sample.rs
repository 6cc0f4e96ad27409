use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, StringArray, TimestampMicrosecondArray};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{Duration, NaiveDate};
use parquet::arrow::ArrowWriter;

use greenhouse_dashboard::config::{AppConfig, DATA_FILE, MODEL_FILE};
use greenhouse_dashboard::data::loader::{LOCATION_COLUMN, TIMESTAMP_COLUMN};
use greenhouse_dashboard::data::model::{Measure, Reading};
use greenhouse_dashboard::forest::{RandomForestRegressor, RegressionTreeNode};

const LOCATIONS: [&str; 3] = ["GH1 West Cool Wall", "GH2 West Cool Wall", "GH3 East"];
const DAYS: i64 = 14;
const N_TREES: usize = 25;
const TREE_DEPTH: usize = 4;

/// Plausible (min, max) per model feature, in training order.
const FEATURE_RANGES: [(f64, f64); Measure::N_FEATURES] = [
    (0.0, 1200.0), // PPFD_GH
    (15.0, 30.0),  // Temperature_GH
    (40.0, 100.0), // Humidity
    (350.0, 1000.0), // CO2
    (5.0, 25.0),   // Dew Point
    (0.0, 2.5),    // VPD_GH
    (99.0, 103.0), // Pressure_GH
    (0.0, 2000.0), // PPFD_amb
    (0.0, 30.0),   // Temperature_amb
    (99.0, 103.0), // Pressure_amb
    (0.0, 3.0),    // VPD_amb
];

/// Features the synthetic forest splits on.
const SPLIT_FEATURES: [Measure; 5] = [
    Measure::TemperatureGh,
    Measure::TemperatureAmb,
    Measure::PpfdGh,
    Measure::Co2,
    Measure::Humidity,
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

    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

// ---------------------------------------------------------------------------
// Synthetic climate
// ---------------------------------------------------------------------------

/// Saturation vapour pressure in kPa (Tetens).
fn saturation_vp(temp_c: f64) -> f64 {
    0.6108 * (17.27 * temp_c / (temp_c + 237.3)).exp()
}

/// Energy response shared by the generated readings and the generated forest.
fn hourly_energy(f: &[f64]) -> f64 {
    let at = |m: Measure| f[m.index()];
    let heating = 0.45 * (at(Measure::TemperatureGh) - at(Measure::TemperatureAmb)).max(0.0);
    let lighting = 0.002 * at(Measure::PpfdGh);
    let dosing = 0.001 * (at(Measure::Co2) - 400.0).max(0.0);
    let dehumidifying = 0.03 * (at(Measure::Humidity) - 85.0).max(0.0);
    1.5 + heating + lighting + dosing + dehumidifying
}

fn climate(hour: u32, cloud: f64, gh_offset: f64, rng: &mut SimpleRng) -> [f64; Measure::COUNT] {
    let h = hour as f64;
    let solar = (std::f64::consts::PI * (h - 6.0) / 12.0).sin().max(0.0);
    let lamps = matches!(hour, 4..=7 | 18..=21);

    let ppfd_amb = 1800.0 * solar * cloud;
    let temp_amb = 12.0 + 9.0 * solar * cloud + rng.gauss(0.0, 0.6);
    let hum_amb = (75.0 - 25.0 * solar + rng.gauss(0.0, 3.0)).clamp(30.0, 100.0);

    let ppfd_gh = 0.55 * ppfd_amb + if lamps { 220.0 } else { 0.0 };
    let temp_gh = 20.5 + gh_offset + 4.5 * solar + rng.gauss(0.0, 0.3);
    let humidity = (88.0 - 18.0 * solar + rng.gauss(0.0, 2.0)).clamp(40.0, 100.0);
    let co2 = 820.0 - 300.0 * solar + rng.gauss(0.0, 25.0);
    let dew_point = temp_gh - (100.0 - humidity) / 5.0;
    let pressure = 101.3 + rng.gauss(0.0, 0.15);

    let mut v = [0.0; Measure::COUNT];
    v[Measure::PpfdGh.index()] = ppfd_gh;
    v[Measure::TemperatureGh.index()] = temp_gh;
    v[Measure::Humidity.index()] = humidity;
    v[Measure::Co2.index()] = co2;
    v[Measure::DewPoint.index()] = dew_point;
    v[Measure::VpdGh.index()] = saturation_vp(temp_gh) * (1.0 - humidity / 100.0);
    v[Measure::PressureGh.index()] = pressure;
    v[Measure::PpfdAmb.index()] = ppfd_amb;
    v[Measure::TemperatureAmb.index()] = temp_amb;
    v[Measure::PressureAmb.index()] = pressure - 0.05;
    v[Measure::VpdAmb.index()] = saturation_vp(temp_amb) * (1.0 - hum_amb / 100.0);
    v[Measure::Energy.index()] = (hourly_energy(&v) + rng.gauss(0.0, 0.15)).max(0.0);
    v
}

fn generate_readings(rng: &mut SimpleRng) -> Result<Vec<Reading>> {
    let start = NaiveDate::from_ymd_opt(2024, 6, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .context("invalid start date")?;

    let mut readings = Vec::new();
    for day in 0..DAYS {
        let cloud = rng.uniform(0.5, 1.0);
        for (gh, location) in LOCATIONS.iter().enumerate() {
            for hour in 0..24u32 {
                readings.push(Reading {
                    timestamp: start + Duration::days(day) + Duration::hours(hour as i64),
                    location: location.to_string(),
                    values: climate(hour, cloud, gh as f64 * 0.8, rng),
                });
            }
        }
    }
    Ok(readings)
}

// ---------------------------------------------------------------------------
// Synthetic forest
// ---------------------------------------------------------------------------

fn build_tree(
    depth: usize,
    bounds: [(f64, f64); Measure::N_FEATURES],
    rng: &mut SimpleRng,
) -> RegressionTreeNode {
    if depth == 0 {
        let centre: Vec<f64> = bounds.iter().map(|(lo, hi)| (lo + hi) / 2.0).collect();
        return RegressionTreeNode::leaf(hourly_energy(&centre));
    }

    let feature = SPLIT_FEATURES[(rng.next_u64() % SPLIT_FEATURES.len() as u64) as usize];
    let idx = feature.index();
    let (lo, hi) = bounds[idx];
    let threshold = lo + (hi - lo) * rng.uniform(0.3, 0.7);

    let mut left_bounds = bounds;
    left_bounds[idx].1 = threshold;
    let mut right_bounds = bounds;
    right_bounds[idx].0 = threshold;

    RegressionTreeNode::split(
        idx,
        threshold,
        build_tree(depth - 1, left_bounds, rng),
        build_tree(depth - 1, right_bounds, rng),
    )
}

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

fn write_csv(path: &Path, readings: &[Reading]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;

    let mut header = vec![TIMESTAMP_COLUMN, LOCATION_COLUMN];
    header.extend(Measure::ALL.iter().map(|m| m.column()));
    writer.write_record(&header)?;

    for r in readings {
        let mut record = vec![
            r.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            r.location.clone(),
        ];
        record.extend(r.values.iter().map(|v| format!("{v:.3}")));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, readings: &[Reading]) -> Result<()> {
    let mut fields = vec![
        Field::new(
            TIMESTAMP_COLUMN,
            DataType::Timestamp(TimeUnit::Microsecond, None),
            false,
        ),
        Field::new(LOCATION_COLUMN, DataType::Utf8, false),
    ];
    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(TimestampMicrosecondArray::from(
            readings
                .iter()
                .map(|r| r.timestamp.and_utc().timestamp_micros())
                .collect::<Vec<_>>(),
        )),
        Arc::new(StringArray::from(
            readings.iter().map(|r| r.location.as_str()).collect::<Vec<_>>(),
        )),
    ];
    for m in Measure::ALL {
        fields.push(Field::new(m.column(), DataType::Float64, false));
        columns.push(Arc::new(Float64Array::from(
            readings.iter().map(|r| r.value(m)).collect::<Vec<_>>(),
        )));
    }

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let dir = AppConfig::default_data_dir();
    std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;

    let readings = generate_readings(&mut rng)?;

    let csv_path = dir.join(DATA_FILE);
    write_csv(&csv_path, &readings)?;
    let parquet_path = csv_path.with_extension("parquet");
    write_parquet(&parquet_path, &readings)?;

    let trees = (0..N_TREES)
        .map(|_| build_tree(TREE_DEPTH, FEATURE_RANGES, &mut rng))
        .collect();
    let forest = RandomForestRegressor::new(trees);
    let model_path = dir.join(MODEL_FILE);
    let file = std::fs::File::create(&model_path).context("creating model file")?;
    serde_json::to_writer_pretty(file, &forest).context("writing model")?;

    println!(
        "Wrote {} readings ({} greenhouses × {DAYS} days) to {} and {}",
        readings.len(),
        LOCATIONS.len(),
        csv_path.display(),
        parquet_path.display()
    );
    println!(
        "Wrote {N_TREES}-tree forest (depth {TREE_DEPTH}) to {}",
        model_path.display()
    );
    Ok(())
}
