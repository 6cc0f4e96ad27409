use chrono::NaiveDate;

use greenhouse_dashboard::data::model::Reading;
use greenhouse_dashboard::predict::{Prediction, PredictionForm};
use greenhouse_dashboard::Dashboard;

use crate::color::SeriesColors;

// ---------------------------------------------------------------------------
// Chart area state
// ---------------------------------------------------------------------------

/// What the chart area shows after the last "Generate Plots" press.
#[derive(Debug, Clone, PartialEq)]
pub enum DayView {
    /// Nothing requested yet.
    Idle,
    /// The selection matched no readings.
    NoData { location: String, date: NaiveDate },
    Ready {
        location: String,
        date: NaiveDate,
        readings: Vec<Reading>,
    },
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state of one dashboard window, independent of rendering.
pub struct AppState {
    /// Read-only table, model and location lookup.
    pub dashboard: Dashboard,

    /// Date picker value, always inside the table's date range.
    pub selected_date: NaiveDate,

    /// Greenhouse selector value (a display name).
    pub selected_location: String,

    pub day_view: DayView,

    /// Colour per charted measure.
    pub colors: SeriesColors,

    pub form: PredictionForm,

    /// Result of the last prediction request.
    pub prediction: Option<Prediction>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(dashboard: Dashboard) -> Self {
        let (first, _) = dashboard.table.date_range();
        let selected_location = dashboard
            .locations
            .display_names()
            .next()
            .unwrap_or_default()
            .to_string();

        Self {
            dashboard,
            selected_date: first,
            selected_location,
            day_view: DayView::Idle,
            colors: SeriesColors::for_charts(),
            form: PredictionForm::default(),
            prediction: None,
            status_message: None,
        }
    }

    pub fn date_bounds(&self) -> (NaiveDate, NaiveDate) {
        self.dashboard.table.date_range()
    }

    /// Keep the picked date within the dataset's range.
    pub fn clamp_selected_date(&mut self) {
        let (first, last) = self.date_bounds();
        self.selected_date = self.selected_date.clamp(first, last);
    }

    /// "Generate Plots": select the chosen greenhouse's readings for the day.
    pub fn generate_plots(&mut self) {
        self.clamp_selected_date();
        let date = self.selected_date;
        let location = self.selected_location.clone();
        let readings = self.dashboard.day_readings(date, &location);

        self.day_view = if readings.is_empty() {
            log::warn!("No readings for {location} on {date}");
            DayView::NoData { location, date }
        } else {
            log::info!("Plotting {} readings for {location} on {date}", readings.len());
            DayView::Ready {
                location,
                date,
                readings,
            }
        };
    }

    /// "Generate Prediction": run the model on the current form values.
    pub fn submit_prediction(&mut self) {
        match self.dashboard.predict(&self.form.to_inputs()) {
            Ok(prediction) => {
                log::info!("{prediction}");
                self.prediction = Some(prediction);
                self.status_message = None;
            }
            Err(e) => {
                log::error!("Prediction failed: {e}");
                self.prediction = None;
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    pub fn reset_form(&mut self) {
        self.form.reset();
        self.prediction = None;
    }
}
