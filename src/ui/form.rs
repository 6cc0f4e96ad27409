use eframe::egui::{self, Color32, DragValue, RichText, Ui};

use greenhouse_dashboard::data::model::Measure;

use crate::state::AppState;

/// Features in the left form column; the rest go on the right.
const LEFT_COLUMN: usize = 6;

/// Drag speed that feels natural for each field's magnitude.
fn drag_speed(measure: Measure) -> f64 {
    match measure {
        Measure::PpfdGh | Measure::PpfdAmb | Measure::Co2 => 1.0,
        Measure::Humidity => 0.5,
        Measure::VpdGh | Measure::VpdAmb => 0.01,
        _ => 0.1,
    }
}

// ---------------------------------------------------------------------------
// Prediction form
// ---------------------------------------------------------------------------

/// Render the energy prediction form and its result.
pub fn prediction_form(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Prediction of Energy Consumption");
    ui.label(
        RichText::new(
            "Enter greenhouse and ambient conditions to get a predicted hourly \
             energy consumption from the random forest model.",
        )
        .italics(),
    );
    ui.add_space(6.0);

    let features = Measure::FEATURES;
    let (left, right) = features.split_at(LEFT_COLUMN);
    ui.columns(2, |cols: &mut [Ui]| {
        for (col, (id, measures)) in cols.iter_mut().zip([("form_left", left), ("form_right", right)]) {
            egui::Grid::new(id)
                .num_columns(2)
                .spacing([12.0, 6.0])
                .show(col, |ui: &mut Ui| {
                    for &measure in measures {
                        ui.label(format!("{} ({})", measure.label(), measure.column()));
                        if let Some(value) = state.form.value_mut(measure) {
                            ui.add(
                                DragValue::new(value)
                                    .speed(drag_speed(measure))
                                    .suffix(format!(" {}", measure.unit())),
                            );
                        }
                        ui.end_row();
                    }
                });
        }
    });

    ui.add_space(6.0);
    ui.horizontal(|ui: &mut Ui| {
        if ui.button("Generate Prediction").clicked() {
            state.submit_prediction();
        }
        if ui.button("Reset").clicked() {
            state.reset_form();
        }
    });

    if let Some(prediction) = &state.prediction {
        ui.add_space(4.0);
        ui.label(
            RichText::new(prediction.to_string())
                .strong()
                .color(Color32::from_rgb(0x2e, 0x9d, 0x4f)),
        );
    }
}
