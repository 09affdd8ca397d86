use eframe::egui::Ui;
use egui_plot::{GridInput, GridMark, Legend, MarkerShape, Plot, Points};

use crate::state::AppState;

/// Fixed marks along the square-footage axis.
pub const SQUARE_FEET_TICKS: [f64; 7] = [0.0, 500.0, 1000.0, 1500.0, 2000.0, 2500.0, 3000.0];

fn square_feet_marks(_input: GridInput) -> Vec<GridMark> {
    SQUARE_FEET_TICKS
        .iter()
        .map(|&value| GridMark {
            value,
            step_size: 500.0,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Price vs square feet (central panel)
// ---------------------------------------------------------------------------

/// Scatter of the filtered listings, one series per bedroom count.
pub fn price_plot(ui: &mut Ui, state: &AppState) {
    if state.listings.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            if state.loading {
                ui.spinner();
            } else {
                ui.heading("Open a listings file to begin  (File → Open…)");
            }
        });
        return;
    }

    let x_max = state
        .visible
        .iter()
        .map(|p| p.square_feet)
        .fold(0.0_f64, f64::max);

    Plot::new("price_vs_square_feet")
        .legend(Legend::default())
        .x_axis_label("Square Feet")
        .y_axis_label("Price")
        .x_grid_spacer(square_feet_marks)
        .include_x(0.0)
        .include_x(x_max)
        .label_formatter(|name, value| {
            if name.is_empty() {
                return String::new();
            }
            format!(
                "{name}\nSquare Feet: {:.0}\nPrice: ${:.2}",
                value.x, value.y
            )
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (beds, color) in state.color_map.entries() {
                let coords: Vec<[f64; 2]> = state
                    .visible
                    .iter()
                    .filter(|p| p.beds == beds)
                    .map(|p| [p.square_feet, p.price])
                    .collect();
                if coords.is_empty() {
                    continue;
                }

                let name = match beds {
                    1 => "1 bed".to_string(),
                    n => format!("{n} beds"),
                };
                let points = Points::new(coords)
                    .name(name)
                    .color(color)
                    .shape(MarkerShape::Circle)
                    .filled(true)
                    .radius(3.0);

                plot_ui.points(points);
            }
        });
}
