use std::io::Read;
use std::path::Path;

use arrow::array::timezone::Tz;
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int32Type, Int64Type, TimeUnit,
    TimestampMicrosecondType, TimestampMillisecondType, TimestampNanosecondType,
    TimestampSecondType,
};
use arrow::temporal_conversions::{
    timestamp_ms_to_datetime, timestamp_ns_to_datetime, timestamp_s_to_datetime,
    timestamp_us_to_datetime,
};
use chrono::{NaiveDate, NaiveDateTime, TimeZone};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::model::{GreenhouseTable, Measure, Reading};
use crate::error::LoadError;

pub const TIMESTAMP_COLUMN: &str = "Timestamp";
pub const LOCATION_COLUMN: &str = "Location";
/// Header used for the location column by older exports.
pub const LOCATION_COLUMN_ALIAS: &str = "Location_GH";

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the greenhouse dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`              – header row, one reading per line
/// * `.parquet` / `.pq`  – flat columns, `Timestamp` as timestamp or string
pub fn load_table(path: &Path) -> Result<GreenhouseTable, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let readings = match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            read_csv(file, path)?
        }
        "parquet" | "pq" => load_parquet(path)?,
        _ => {
            return Err(LoadError::UnsupportedFormat {
                path: path.to_path_buf(),
            })
        }
    };

    GreenhouseTable::from_readings(readings).ok_or_else(|| LoadError::EmptyTable {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Timestamp parsing
// ---------------------------------------------------------------------------

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parse the textual timestamp forms found in exported datasets.
/// A bare date means midnight.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Column positions resolved from a header row.
struct ColumnIndex {
    timestamp: usize,
    location: usize,
    measures: [usize; Measure::COUNT],
}

impl ColumnIndex {
    fn resolve(headers: &[&str], path: &Path) -> Result<Self, LoadError> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let missing = |name: &str| LoadError::MissingColumn {
            path: path.to_path_buf(),
            column: name.to_string(),
        };

        let timestamp = find(TIMESTAMP_COLUMN).ok_or_else(|| missing(TIMESTAMP_COLUMN))?;
        let location = find(LOCATION_COLUMN)
            .or_else(|| find(LOCATION_COLUMN_ALIAS))
            .ok_or_else(|| missing(LOCATION_COLUMN))?;

        let mut measures = [0usize; Measure::COUNT];
        for m in Measure::ALL {
            measures[m.index()] = find(m.column()).ok_or_else(|| missing(m.column()))?;
        }

        Ok(ColumnIndex {
            timestamp,
            location,
            measures,
        })
    }
}

/// Parse CSV readings from any reader. `path` is only used in error messages.
///
/// Extra columns are ignored; empty numeric cells read as NaN.
pub fn read_csv<R: Read>(reader: R, path: &Path) -> Result<Vec<Reading>, LoadError> {
    let csv_err = |source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::Reader::from_reader(reader);
    let headers = reader.headers().map_err(csv_err)?;
    let columns = ColumnIndex::resolve(&headers.iter().collect::<Vec<_>>(), path)?;

    let mut readings = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(csv_err)?;
        let cell = |idx: usize| record.get(idx).unwrap_or("");

        let raw_ts = cell(columns.timestamp);
        let timestamp = parse_timestamp(raw_ts).ok_or_else(|| LoadError::BadTimestamp {
            path: path.to_path_buf(),
            row: row_no,
            value: raw_ts.to_string(),
        })?;

        let mut values = [f64::NAN; Measure::COUNT];
        for m in Measure::ALL {
            let raw = cell(columns.measures[m.index()]).trim();
            if raw.is_empty() {
                continue;
            }
            values[m.index()] = raw.parse::<f64>().map_err(|_| LoadError::BadNumber {
                path: path.to_path_buf(),
                row: row_no,
                column: m.column().to_string(),
                value: raw.to_string(),
            })?;
        }

        readings.push(Reading {
            timestamp,
            location: cell(columns.location).to_string(),
            values,
        });
    }

    Ok(readings)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of greenhouse readings.
///
/// Expected schema:
/// - `Timestamp`: Timestamp (any unit; zoned columns are read as local wall
///   clock in their zone) or Utf8/LargeUtf8
/// - `Location` (or `Location_GH`): Utf8 or LargeUtf8
/// - one numeric column per [`Measure`]: Float64, Float32, Int64 or Int32
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Vec<Reading>, LoadError> {
    let parquet_err = |source| LoadError::Parquet {
        path: path.to_path_buf(),
        source,
    };

    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(parquet_err)?
        .build()
        .map_err(parquet_err)?;

    let mut readings = Vec::new();
    let mut row_offset = 0usize;

    for batch_result in reader {
        let batch = batch_result.map_err(|source| LoadError::Arrow {
            path: path.to_path_buf(),
            source,
        })?;
        let schema = batch.schema();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        let columns = ColumnIndex::resolve(&names, path)?;

        let ts_col = batch.column(columns.timestamp);
        let loc_col = batch.column(columns.location);
        let ts_zone = check_timestamp_type(ts_col, path)?;
        check_string_type(loc_col, schema.field(columns.location).name(), path)?;
        for m in Measure::ALL {
            check_numeric_type(batch.column(columns.measures[m.index()]), m, path)?;
        }

        for row in 0..batch.num_rows() {
            let row_no = row_offset + row;
            let missing = |column: &str| LoadError::MissingValue {
                path: path.to_path_buf(),
                row: row_no,
                column: column.to_string(),
            };

            let timestamp = match timestamp_at(ts_col, row, ts_zone.as_ref()) {
                TimestampCell::Null => return Err(missing(TIMESTAMP_COLUMN)),
                TimestampCell::Invalid(value) => {
                    return Err(LoadError::BadTimestamp {
                        path: path.to_path_buf(),
                        row: row_no,
                        value,
                    })
                }
                TimestampCell::Value(ts) => ts,
            };

            let location = string_at(loc_col, row).ok_or_else(|| missing(LOCATION_COLUMN))?;

            let mut values = [f64::NAN; Measure::COUNT];
            for m in Measure::ALL {
                values[m.index()] = numeric_at(batch.column(columns.measures[m.index()]), row);
            }

            readings.push(Reading {
                timestamp,
                location,
                values,
            });
        }
        row_offset += batch.num_rows();
    }

    Ok(readings)
}

// -- Parquet / Arrow helpers --

fn column_type_error(column: &str, data_type: &DataType, path: &Path) -> LoadError {
    LoadError::ColumnType {
        path: path.to_path_buf(),
        column: column.to_string(),
        data_type: format!("{data_type:?}"),
    }
}

/// Check the timestamp column type and resolve its time zone, if any.
fn check_timestamp_type(col: &ArrayRef, path: &Path) -> Result<Option<Tz>, LoadError> {
    match col.data_type() {
        DataType::Timestamp(_, None) | DataType::Utf8 | DataType::LargeUtf8 => Ok(None),
        DataType::Timestamp(_, Some(zone)) => zone
            .parse::<Tz>()
            .map(Some)
            .map_err(|_| column_type_error(TIMESTAMP_COLUMN, col.data_type(), path)),
        other => Err(column_type_error(TIMESTAMP_COLUMN, other, path)),
    }
}

fn check_string_type(col: &ArrayRef, name: &str, path: &Path) -> Result<(), LoadError> {
    match col.data_type() {
        DataType::Utf8 | DataType::LargeUtf8 => Ok(()),
        other => Err(column_type_error(name, other, path)),
    }
}

fn check_numeric_type(col: &ArrayRef, measure: Measure, path: &Path) -> Result<(), LoadError> {
    match col.data_type() {
        DataType::Float64 | DataType::Float32 | DataType::Int64 | DataType::Int32 => Ok(()),
        other => Err(column_type_error(measure.column(), other, path)),
    }
}

enum TimestampCell {
    Null,
    Invalid(String),
    Value(NaiveDateTime),
}

/// Read a timestamp cell. The column type must have passed
/// [`check_timestamp_type`]; `zone` is the zone it resolved.
fn timestamp_at(col: &ArrayRef, row: usize, zone: Option<&Tz>) -> TimestampCell {
    if col.is_null(row) {
        return TimestampCell::Null;
    }
    let (converted, raw) = match col.data_type() {
        DataType::Timestamp(TimeUnit::Second, _) => {
            let v = col.as_primitive::<TimestampSecondType>().value(row);
            (timestamp_s_to_datetime(v), v.to_string())
        }
        DataType::Timestamp(TimeUnit::Millisecond, _) => {
            let v = col.as_primitive::<TimestampMillisecondType>().value(row);
            (timestamp_ms_to_datetime(v), v.to_string())
        }
        DataType::Timestamp(TimeUnit::Microsecond, _) => {
            let v = col.as_primitive::<TimestampMicrosecondType>().value(row);
            (timestamp_us_to_datetime(v), v.to_string())
        }
        DataType::Timestamp(TimeUnit::Nanosecond, _) => {
            let v = col.as_primitive::<TimestampNanosecondType>().value(row);
            (timestamp_ns_to_datetime(v), v.to_string())
        }
        DataType::Utf8 => {
            let s = col.as_string::<i32>().value(row);
            (parse_timestamp(s), s.to_string())
        }
        DataType::LargeUtf8 => {
            let s = col.as_string::<i64>().value(row);
            (parse_timestamp(s), s.to_string())
        }
        other => (None, format!("{other:?}")),
    };
    // Arrow stores zoned timestamps as UTC instants.
    let converted = match zone {
        Some(tz) => converted.map(|utc| tz.from_utc_datetime(&utc).naive_local()),
        None => converted,
    };
    match converted {
        Some(ts) => TimestampCell::Value(ts),
        None => TimestampCell::Invalid(raw),
    }
}

fn string_at(col: &ArrayRef, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Utf8 => Some(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Some(col.as_string::<i64>().value(row).to_string()),
        _ => None,
    }
}

/// Numeric cell as `f64`; nulls read as NaN like pandas does.
fn numeric_at(col: &ArrayRef, row: usize) -> f64 {
    if col.is_null(row) {
        return f64::NAN;
    }
    match col.data_type() {
        DataType::Float64 => col.as_primitive::<Float64Type>().value(row),
        DataType::Float32 => col.as_primitive::<Float32Type>().value(row) as f64,
        DataType::Int64 => col.as_primitive::<Int64Type>().value(row) as f64,
        DataType::Int32 => col.as_primitive::<Int32Type>().value(row) as f64,
        _ => f64::NAN,
    }
}
