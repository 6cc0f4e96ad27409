use eframe::egui::{Color32, RichText, Ui};
use egui_plot::{GridMark, Line, Plot, PlotPoint, PlotPoints};

use chrono::NaiveDate;
use greenhouse_dashboard::data::model::{Measure, Reading};

use crate::state::{AppState, DayView};

/// Measures drawn for the selected day, in display order (two per row).
pub const CHARTED: [Measure; 8] = [
    Measure::TemperatureGh,
    Measure::PpfdGh,
    Measure::VpdGh,
    Measure::PressureGh,
    Measure::Co2,
    Measure::Energy,
    Measure::TemperatureAmb,
    Measure::PpfdAmb,
];

const CHART_HEIGHT: f32 = 180.0;

// ---------------------------------------------------------------------------
// Daily charts (central panel)
// ---------------------------------------------------------------------------

/// Render the chart section for the last "Generate Plots" request.
pub fn daily_charts(ui: &mut Ui, state: &AppState) {
    ui.heading("Daily Climate & Energy Patterns");
    ui.label(
        RichText::new(
            "How the greenhouse and ambient conditions evolve over the selected day, \
             along with the associated energy consumption.",
        )
        .small(),
    );
    ui.add_space(4.0);

    let (location, date, readings) = match &state.day_view {
        DayView::Idle => {
            ui.label("Pick a date and greenhouse, then press Generate Plots.");
            return;
        }
        DayView::NoData { .. } => {
            ui.label(
                RichText::new("No data for this date and greenhouse.")
                    .color(Color32::from_rgb(0xd9, 0x8e, 0x04)),
            );
            return;
        }
        DayView::Ready {
            location,
            date,
            readings,
        } => (location, *date, readings),
    };

    ui.strong(format!(
        "Daily time series for {location} Greenhouse on {}",
        date.format("%m/%d/%Y")
    ));
    ui.label(RichText::new("Hover over any plot to see exact values at each timestamp.").small());

    for row in CHARTED.chunks(2) {
        ui.columns(2, |cols: &mut [Ui]| {
            for (col, &measure) in cols.iter_mut().zip(row) {
                measure_chart(col, measure, date, readings, state.colors.color_for(measure));
            }
        });
        ui.add_space(6.0);
    }
}

/// One measure over the day. All charts share a linked x-axis (hour of day).
fn measure_chart(ui: &mut Ui, measure: Measure, date: NaiveDate, readings: &[Reading], color: Color32) {
    ui.label(RichText::new(measure.to_string()).small().strong());

    let points: PlotPoints = series_points(readings, measure, date).into_iter().collect();
    let unit = measure.unit();

    Plot::new(("day_chart", measure.column()))
        .height(CHART_HEIGHT)
        .link_axis("day_charts", [true, false])
        .x_axis_formatter(|mark: GridMark, _range| format_hour(mark.value))
        .label_formatter(move |name: &str, value: &PlotPoint| {
            format!("{}\n{name}: {:.2} {unit}", format_hour(value.x), value.y)
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(false)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(points)
                    .name(measure.label())
                    .color(color)
                    .width(1.5),
            );
        });
}

/// `[hours since midnight, value]` pairs; missing values are left out.
pub fn series_points(readings: &[Reading], measure: Measure, date: NaiveDate) -> Vec<[f64; 2]> {
    let Some(midnight) = date.and_hms_opt(0, 0, 0) else {
        return Vec::new();
    };
    readings
        .iter()
        .filter(|r| r.value(measure).is_finite())
        .map(|r| {
            let hours = (r.timestamp - midnight).num_seconds() as f64 / 3600.0;
            [hours, r.value(measure)]
        })
        .collect()
}

/// `HH:MM` for a fractional hour of day.
pub fn format_hour(hours: f64) -> String {
    let minutes = (hours * 60.0).round() as i64;
    format!("{:02}:{:02}", minutes.div_euclid(60), minutes.rem_euclid(60))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use super::*;

    fn reading(ts: &str, co2: f64) -> Reading {
        let mut values = [0.0; Measure::COUNT];
        values[Measure::Co2.index()] = co2;
        Reading {
            timestamp: NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").unwrap(),
            location: "GH3 East".to_string(),
            values,
        }
    }

    #[test]
    fn charts_the_documented_measures() {
        assert_eq!(CHARTED.len(), 8);
        assert!(CHARTED.contains(&Measure::Energy));
        assert!(!CHARTED.contains(&Measure::Humidity));
    }

    #[test]
    fn points_use_hour_of_day_and_skip_gaps() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let readings = vec![
            reading("2024-06-01 00:00:00", 410.0),
            reading("2024-06-01 06:30:00", f64::NAN),
            reading("2024-06-01 13:30:00", 720.0),
        ];
        let points = series_points(&readings, Measure::Co2, date);
        assert_eq!(points, vec![[0.0, 410.0], [13.5, 720.0]]);
    }

    #[test]
    fn hours_format_as_clock_time() {
        assert_eq!(format_hour(0.0), "00:00");
        assert_eq!(format_hour(13.5), "13:30");
        assert_eq!(format_hour(23.999), "24:00");
    }
}
