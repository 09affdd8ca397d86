use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::export::export_csv;
use crate::data::model::{IncompleteRows, IngestOptions};
use crate::state::{AppState, Status};

// ---------------------------------------------------------------------------
// Left side panel – filters, statistics, ingest options
// ---------------------------------------------------------------------------

/// Render the left panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Filters");
            ui.separator();
            filter_inputs(ui, state);

            ui.add_space(8.0);
            ui.heading("Statistics");
            ui.separator();
            statistics(ui, state);

            ui.add_space(8.0);
            ui.heading("Import");
            ui.separator();
            ingest_options(ui, state);
        });
}

fn filter_inputs(ui: &mut Ui, state: &mut AppState) {
    let mut changed = false;

    egui::Grid::new("filter_inputs")
        .num_columns(2)
        .spacing([8.0, 6.0])
        .show(ui, |ui: &mut Ui| {
            ui.label("Bedrooms");
            changed |= ui
                .add(
                    egui::TextEdit::singleline(&mut state.filters.bedrooms)
                        .hint_text("any")
                        .desired_width(90.0),
                )
                .changed();
            ui.end_row();

            ui.label("ZIP code");
            changed |= ui
                .add(
                    egui::TextEdit::singleline(&mut state.filters.zip_code)
                        .hint_text("any")
                        .desired_width(90.0),
                )
                .changed();
            ui.end_row();
        });

    if changed {
        state.refilter();
    }

    if ui
        .add_enabled(state.filters.is_active(), egui::Button::new("Clear"))
        .clicked()
    {
        state.clear_filters();
    }
}

fn statistics(ui: &mut Ui, state: &AppState) {
    let stats = &state.statistics;
    egui::Grid::new("statistics")
        .num_columns(2)
        .striped(true)
        .show(ui, |ui: &mut Ui| {
            ui.label("Listings");
            ui.label(stats.count.to_string());
            ui.end_row();

            ui.label("Average Price");
            ui.monospace(format!("${}", stats.average_price));
            ui.end_row();

            ui.label("Median Price");
            ui.monospace(format!("${}", stats.median_price));
            ui.end_row();

            ui.label("Average $/sqft");
            ui.monospace(format!("${}", stats.average_price_per_sq_ft));
            ui.end_row();
        });
}

fn ingest_options(ui: &mut Ui, state: &mut AppState) {
    let mut changed = ui
        .checkbox(&mut state.options.drop_first_row, "Drop first data row")
        .on_hover_text("Exports from some listing sites put an MLS disclaimer on the first line")
        .changed();

    let mut exclude = state.options.incomplete_rows == IncompleteRows::Exclude;
    if ui
        .checkbox(&mut exclude, "Exclude rows missing price or sq ft")
        .on_hover_text("When off, missing values are read as 0")
        .changed()
    {
        state.options.incomplete_rows = if exclude {
            IncompleteRows::Exclude
        } else {
            IncompleteRows::Keep
        };
        changed = true;
    }

    ui.horizontal(|ui: &mut Ui| {
        if ui
            .small_button("Defaults")
            .on_hover_text("Keep every row, skip rows missing price or sq ft")
            .clicked()
        {
            state.options = IngestOptions::default();
            changed = true;
        }
        if ui
            .small_button("Legacy")
            .on_hover_text("Always drop the first data row and keep incomplete rows")
            .clicked()
        {
            state.options = IngestOptions::legacy();
            changed = true;
        }
    });

    if changed && state.source.is_some() {
        let ctx = ui.ctx().clone();
        state.reload(Some(&ctx));
    }

    if let Some(report) = &state.report {
        ui.add_space(4.0);
        ui.small(report.summary());
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(ui.ctx(), state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.source.is_some(), egui::Button::new("Reload"))
                .clicked()
            {
                let ctx = ui.ctx().clone();
                state.reload(Some(&ctx));
                ui.close_menu();
            }
            if ui
                .add_enabled(!state.visible.is_empty(), egui::Button::new("Export filtered…"))
                .clicked()
            {
                save_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if state.loading {
            ui.spinner();
        }

        if let Some(path) = &state.source {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            ui.label(format!(
                "{name}: {} listings loaded, {} visible",
                state.listings.len(),
                state.visible.len()
            ));
        }

        if let Some(status) = &state.status {
            ui.separator();
            let color = if status.is_error() {
                Color32::RED
            } else {
                Color32::YELLOW
            };
            ui.label(RichText::new(status.text()).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(ctx: &egui::Context, state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open listings")
        .add_filter("Supported files", &["csv", "txt", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv", "txt"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.start_load(path, Some(ctx));
    }
}

fn save_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export filtered listings")
        .set_file_name("filtered_listings.csv")
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        match export_csv(&path, &state.visible) {
            Ok(()) => state.status = None,
            Err(e) => {
                log::error!("Failed to export: {e:#}");
                state.status = Some(Status::Error(format!("Error: {e:#}")));
            }
        }
    }
}
