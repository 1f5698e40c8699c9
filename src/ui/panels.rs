use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::aggregate::CountrySummary;
use crate::data::loader::{load_bytes, load_file};
use crate::state::{AppState, Dimension};

// ---------------------------------------------------------------------------
// Left side panel – summary and filter widgets
// ---------------------------------------------------------------------------

/// Render the left panel: country summary, then the filters.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    if state.dataset.is_none() {
        ui.heading("Filter Data");
        ui.separator();
        ui.label("No dataset loaded.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            if let Some(view) = &state.view {
                summary_block(ui, &view.summary);
            }
            ui.separator();

            ui.horizontal(|ui: &mut Ui| {
                ui.heading("Filter Data");
                if ui.small_button("Select everything").clicked() {
                    state.select_everything();
                }
            });
            multiselect(ui, state, Dimension::Region, "Select Regions");
            multiselect(ui, state, Dimension::IncomeGroup, "Select Income Groups");
            ui.separator();
            year_range(ui, state);
        });
}

fn summary_block(ui: &mut Ui, summary: &CountrySummary) {
    ui.strong(format!("Average Values of {}:", summary.country));
    for line in summary_lines(summary) {
        ui.label(line);
    }
}

/// The four sidebar summary lines. Missing values read "n/a".
pub fn summary_lines(summary: &CountrySummary) -> [String; 4] {
    let country = &summary.country;
    let fmt = |value: Option<f64>, unit: &str| match value {
        Some(v) => format!("{v:.2}{unit}"),
        None => "n/a".to_string(),
    };
    [
        format!(
            "Avg. Life Expectancy of {country}: {}",
            fmt(summary.life_expectancy, " years")
        ),
        format!(
            "Avg. CO2 Emissions of {country}: {}",
            fmt(summary.co2, " metric tons per capita")
        ),
        format!(
            "Avg. Health Expenditure % of {country}: {}",
            fmt(summary.health_expenditure, "%")
        ),
        format!(
            "Avg. Education Expenditure % of {country}: {}",
            fmt(summary.education_expenditure, "%")
        ),
    ]
}

/// Collapsible checkbox list for one filter dimension.
fn multiselect(ui: &mut Ui, state: &mut AppState, dimension: Dimension, title: &str) {
    let options = state.options(dimension);
    let n_selected = state.selected(dimension).len();
    let header_text = format!("{title}  ({n_selected}/{})", options.len());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(title)
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all(dimension);
                }
                if ui.small_button("None").clicked() {
                    state.select_none(dimension);
                }
            });

            for option in &options {
                let mut checked = state.selected(dimension).contains(option);
                let mut text = RichText::new(option);
                if dimension == Dimension::Region {
                    text = text.color(state.region_colors.color_for(option));
                }
                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle(dimension, option);
                }
            }
        });
}

/// Inclusive year range as two linked sliders.
fn year_range(ui: &mut Ui, state: &mut AppState) {
    let bounds = state.config.years;
    let mut min = state.selection.years.min;
    let mut max = state.selection.years.max;

    ui.strong("Select Year Range");
    let from = ui.add(egui::Slider::new(&mut min, bounds.min..=bounds.max).text("From"));
    let to = ui.add(egui::Slider::new(&mut max, bounds.min..=bounds.max).text("To"));

    if from.changed() {
        state.set_years(min, max.max(min));
    } else if to.changed() {
        state.set_years(min.min(max), max);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Upload CSV…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(ds), Some(view)) = (&state.dataset, &state.view) {
            ui.label(format!(
                "{} rows loaded, {} visible",
                ds.len(),
                view.visible_rows
            ));
        } else {
            ui.label("Drop a CSV file here or use File → Upload CSV…");
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Uploads
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Choose a CSV file")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        state.apply_load(name, load_file(&path));
    }
}

/// Load the first file dropped onto the window, if any.
pub fn handle_dropped_files(ctx: &egui::Context, state: &mut AppState) {
    let dropped = ctx.input(|i| i.raw.dropped_files.clone());
    let Some(file) = dropped.into_iter().next() else {
        return;
    };

    if let Some(bytes) = &file.bytes {
        state.apply_load(file.name.clone(), load_bytes(bytes));
    } else if let Some(path) = &file.path {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.name.clone());
        state.apply_load(name, load_file(path));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_lines_use_two_decimals_and_units() {
        let summary = CountrySummary {
            country: "India".into(),
            life_expectancy: Some(66.0),
            co2: Some(1.234),
            health_expenditure: Some(3.5),
            education_expenditure: None,
        };
        let lines = summary_lines(&summary);
        assert_eq!(lines[0], "Avg. Life Expectancy of India: 66.00 years");
        assert_eq!(
            lines[1],
            "Avg. CO2 Emissions of India: 1.23 metric tons per capita"
        );
        assert_eq!(lines[2], "Avg. Health Expenditure % of India: 3.50%");
        assert_eq!(lines[3], "Avg. Education Expenditure % of India: n/a");
    }
}
