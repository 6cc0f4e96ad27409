//! End-to-end: files on disk → stores → day selection and prediction.

use std::fmt::Write as _;

use chrono::{NaiveDate, Timelike};

use greenhouse_dashboard::data::model::Measure;
use greenhouse_dashboard::forest::{RandomForestRegressor, RegressionTreeNode};
use greenhouse_dashboard::predict::PredictionForm;
use greenhouse_dashboard::{AppConfig, Dashboard, LoadError};
use tempfile::TempDir;

const HEADER: &str = "Timestamp,Location,PPFD_GH,Temperature_GH,Humidity,CO2,Dew Point,VPD_GH,Pressure_GH,PPFD_amb,Temperature_amb,Pressure_amb,VPD_amb,Energy";

/// A fresh directory per test, removed when the returned guard drops.
fn scratch() -> (TempDir, AppConfig) {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig::with_data_dir(dir.path());
    (dir, config)
}

/// 24 hourly rows on 2024-06-01 for "GH1 West Cool Wall" written in reverse
/// order, plus one row for "GH3 East" on 2024-06-02.
fn write_data(config: &AppConfig) {
    let mut csv = String::from(HEADER);
    csv.push('\n');
    for hour in (0..24).rev() {
        writeln!(
            csv,
            "2024-06-01 {hour:02}:00:00,GH1 West Cool Wall,{ppfd},21.5,85,640,18.2,0.6,101.2,{amb},{temp},101.1,0.8,{energy}",
            ppfd = hour * 10,
            amb = hour * 20,
            temp = 10 + hour / 2,
            energy = 2.0 + hour as f64 * 0.1,
        )
        .unwrap();
    }
    writeln!(csv, "2024-06-02 08:00:00,GH3 East,0,20,90,600,18,0.5,100,0,20,100,0.5,3.3").unwrap();
    std::fs::write(&config.data_path, csv).unwrap();
}

fn write_model(config: &AppConfig) {
    let temp_amb = Measure::TemperatureAmb.index();
    let forest = RandomForestRegressor::new(vec![
        RegressionTreeNode::split(
            temp_amb,
            15.0,
            RegressionTreeNode::leaf(4.75),
            RegressionTreeNode::leaf(2.125),
        ),
        RegressionTreeNode::split(
            Measure::Humidity.index(),
            80.0,
            RegressionTreeNode::leaf(1.0),
            RegressionTreeNode::leaf(1.5),
        ),
    ]);
    std::fs::write(&config.model_path, serde_json::to_string_pretty(&forest).unwrap()).unwrap();
}

fn load() -> Dashboard {
    let (_dir, config) = scratch();
    write_data(&config);
    write_model(&config);
    Dashboard::load(&config).unwrap()
}

#[test]
fn full_day_for_display_location_is_ordered_by_hour() {
    let dashboard = load();
    let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

    let names: Vec<&str> = dashboard.locations.display_names().collect();
    assert_eq!(names, vec!["GH1 West", "GH3 East"]);

    let day = dashboard.day_readings(date, "GH1 West");
    assert_eq!(day.len(), 24);
    for (hour, reading) in day.iter().enumerate() {
        assert_eq!(reading.timestamp.hour() as usize, hour);
        assert_eq!(reading.date(), date);
        assert_eq!(reading.location, "GH1 West Cool Wall");
    }
}

#[test]
fn date_without_rows_is_empty_not_an_error() {
    let dashboard = load();
    let (first, last) = dashboard.table.date_range();
    assert_eq!(first, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
    assert_eq!(last, NaiveDate::from_ymd_opt(2024, 6, 2).unwrap());

    // Inside the range, but GH1 has nothing on the second day.
    assert!(dashboard.day_readings(last, "GH1 West").is_empty());
    assert!(dashboard
        .day_readings(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(), "GH3 East")
        .is_empty());
}

#[test]
fn default_form_yields_a_three_decimal_prediction() {
    let dashboard = load();
    let prediction = dashboard
        .predict(&PredictionForm::default().to_inputs())
        .unwrap();

    // Temperature_amb 20 > 15 -> 2.125, Humidity 90 > 80 -> 1.5
    assert_eq!(prediction.kwh(), 1.8125);
    assert!(prediction.kwh().is_finite());

    let text = prediction.to_string();
    assert!(text.starts_with("Predicted energy consumption: "));
    assert!(text.ends_with(" kWh"));
    let number = text
        .trim_start_matches("Predicted energy consumption: ")
        .trim_end_matches(" kWh");
    let decimals = number.split('.').nth(1).unwrap();
    assert_eq!(decimals.len(), 3);
}

#[test]
fn missing_model_is_fatal() {
    let (_dir, config) = scratch();
    write_data(&config);
    assert!(matches!(Dashboard::load(&config), Err(LoadError::Io { .. })));
}

#[test]
fn malformed_data_is_fatal() {
    let (_dir, config) = scratch();
    std::fs::write(&config.data_path, format!("{HEADER}\nnot-a-date,GH3 East,0,20,90,600,18,0.5,100,0,20,100,0.5,3.3\n"))
        .unwrap();
    write_model(&config);
    assert!(matches!(
        Dashboard::load(&config),
        Err(LoadError::BadTimestamp { row: 0, .. })
    ));
}
