use eframe::egui::{RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::AppState;

const HEADERS: [&str; 9] = [
    "Price", "Beds", "Baths", "ZIP", "Sq Ft", "Lot", "$/Sq Ft", "Days", "Built",
];

/// Table of the filtered listings, in $/sqft order.
pub fn listing_table(ui: &mut Ui, state: &AppState) {
    if state.visible.is_empty() {
        ui.label("No listings match the current filters.");
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .column(Column::auto().at_least(90.0))
        .columns(Column::auto().at_least(50.0), HEADERS.len() - 2)
        .column(Column::remainder())
        .header(20.0, |mut header| {
            for title in HEADERS {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, state.visible.len(), |mut row| {
                let p = &state.visible[row.index()];
                let optional = |v: Option<i64>| v.map(|v| v.to_string()).unwrap_or_default();
                let cells = [
                    format!("${:.0}", p.price),
                    p.beds.to_string(),
                    p.baths.to_string(),
                    p.zip_code.clone(),
                    format!("{:.0}", p.square_feet),
                    format!("{:.0}", p.lot_size),
                    format!("{:.2}", p.price_per_square_foot),
                    optional(p.days_on_market),
                    optional(p.year_built),
                ];
                let beds_color = state.color_map.color_for(p.beds);
                for (i, cell) in cells.into_iter().enumerate() {
                    row.col(|ui| {
                        if i == 1 {
                            ui.label(RichText::new(cell).color(beds_color).strong());
                        } else {
                            ui.label(cell);
                        }
                    });
                }
            });
        });
}
