use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::DatePickerButton;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – plotting controls
// ---------------------------------------------------------------------------

/// Render the left plotting panel: date, greenhouse and the plot trigger.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Plotting Panel");
    ui.separator();

    // ---- Date picker, bounded to the dataset ----
    let (first, last) = state.date_bounds();
    ui.strong("Select Date (MM/DD/YYYY)");
    let response = ui.add(
        DatePickerButton::new(&mut state.selected_date)
            .id_salt("day_picker")
            .format("%m/%d/%Y"),
    );
    if response.changed() {
        state.clamp_selected_date();
    }
    ui.label(
        RichText::new(format!(
            "Data available {} – {}",
            first.format("%m/%d/%Y"),
            last.format("%m/%d/%Y")
        ))
        .small()
        .weak(),
    );
    ui.add_space(8.0);

    // ---- Greenhouse selector ----
    ui.strong("Select Greenhouse");
    let names: Vec<String> = state
        .dashboard
        .locations
        .display_names()
        .map(str::to_string)
        .collect();
    egui::ComboBox::from_id_salt("greenhouse")
        .selected_text(state.selected_location.clone())
        .show_ui(ui, |ui: &mut Ui| {
            for name in &names {
                ui.selectable_value(&mut state.selected_location, name.clone(), name);
            }
        });
    ui.add_space(8.0);

    if ui.button("Generate Plots").clicked() {
        state.generate_plots();
    }

    ui.separator();
    ui.label(
        RichText::new(
            "Tip: Pick a date and greenhouse, then click Generate Plots to explore \
             the full day's climate and energy profile.",
        )
        .small()
        .italics(),
    );
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the title bar with a short dataset summary.
pub fn top_bar(ui: &mut Ui, state: &AppState) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading("🌿 Greenhouse Energy and Climate Dashboard");
    });

    ui.horizontal(|ui: &mut Ui| {
        let table = &state.dashboard.table;
        ui.label(format!(
            "{} readings, {} greenhouses",
            table.len(),
            state.dashboard.locations.len()
        ));
        ui.separator();
        ui.label(format!("{} trees", state.dashboard.model.n_trees()));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Intro text and footer
// ---------------------------------------------------------------------------

pub fn intro(ui: &mut Ui) {
    ui.label(
        RichText::new("An overview of your greenhouse environment and energy use, day by day.")
            .weak(),
    );
    ui.label(
        "Choose a date and greenhouse in the side panel, then click 'Generate Plots' \
         to see the climate and energy consumption patterns for that day.",
    );
    ui.add_space(8.0);
}

pub const COPYRIGHT: &str = "© 2025 Nibir Kanti Roy";

pub fn footer(ui: &mut Ui) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.label(
            RichText::new(COPYRIGHT)
                .small()
                .color(Color32::from_rgb(0x9c, 0xa3, 0xaf)),
        );
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn footer_carries_the_copyright_line() {
        assert_eq!(COPYRIGHT, "© 2025 Nibir Kanti Roy");
    }
}
