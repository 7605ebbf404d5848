use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::filter::{FilterParams, RangeFilter};
use crate::data::model::{RoomType, ValueRange};
use crate::state::{AppState, Metric};
use crate::ui::charts;

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open listings…").clicked() {
                open_listings_dialog(state);
                ui.close_menu();
            }
            if ui.button("Open model…").clicked() {
                open_model_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} listings loaded, {} match the filters",
                ds.len(),
                state.visible_indices.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(dataset) = state.dataset.clone() else {
        ui.label("No dataset loaded.");
        return;
    };
    let ranges = dataset.ranges;

    let mut changed = false;

    ui.strong("Room type");
    let current = state.filters.room_type;
    egui::ComboBox::from_id_salt("room_type_filter")
        .selected_text(current.map(RoomType::label).unwrap_or("Any"))
        .show_ui(ui, |ui: &mut Ui| {
            if ui.selectable_label(current.is_none(), "Any").clicked() {
                state.filters.room_type = None;
                changed = true;
            }
            for rt in RoomType::ALL {
                if ui.selectable_label(current == Some(rt), rt.label()).clicked() {
                    state.filters.room_type = Some(rt);
                    changed = true;
                }
            }
        });
    ui.separator();

    changed |= range_row(ui, "Price", &mut state.filters.price, ranges.price, 1.0);
    changed |= range_row(ui, "Bedrooms", &mut state.filters.bedrooms, ranges.bedrooms, 1.0);
    changed |= range_row(ui, "Beds", &mut state.filters.beds, ranges.beds, 1.0);
    changed |= range_row(ui, "Reviews", &mut state.filters.reviews, ranges.reviews, 1.0);

    ui.add_space(8.0);
    if ui.button("Reset filters").clicked() {
        state.filters = FilterParams::sidebar_defaults(&ranges);
        changed = true;
    }

    if changed {
        state.refilter();
    }

    ui.add_space(8.0);
    ui.label(format!(
        "{} of {} listings match",
        state.visible_indices.len(),
        dataset.len()
    ));
}

/// A `min … max` drag-value pair for one filtered column, clamped to the
/// column's observed bounds.
fn range_row(
    ui: &mut Ui,
    label: &str,
    filter: &mut Option<RangeFilter>,
    bounds: ValueRange,
    speed: f64,
) -> bool {
    let Some(range) = filter else { return false };
    let mut changed = false;

    ui.strong(label);
    ui.horizontal(|ui: &mut Ui| {
        let mut low = range.low;
        let mut high = range.high;
        changed |= ui
            .add(
                egui::DragValue::new(&mut low)
                    .range(bounds.min..=high)
                    .speed(speed),
            )
            .changed();
        ui.label("to");
        changed |= ui
            .add(
                egui::DragValue::new(&mut high)
                    .range(low..=bounds.max)
                    .speed(speed),
            )
            .changed();
        if changed {
            *range = RangeFilter::new(low, high);
        }
    });

    changed
}

// ---------------------------------------------------------------------------
// Central panel – dashboard sections
// ---------------------------------------------------------------------------

/// Render the scrollable dashboard sections in the central panel.
pub fn dashboard(ui: &mut Ui, state: &mut AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a listings CSV to start  (File → Open listings…)");
        });
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            map_section(ui, state);
            ui.separator();
            counts_section(ui, state);
            ui.separator();
            stats_section(ui, state);
            ui.separator();
            composition_section(ui, state);
            ui.separator();
            verification_section(ui, state);
            ui.separator();
            prediction_section(ui, state);
        });
}

fn map_section(ui: &mut Ui, state: &AppState) {
    ui.heading("Filtered listings");
    ui.label("Location of every listing matching the sidebar filters, colored by review count.");
    charts::scatter_map(ui, state);
}

fn counts_section(ui: &mut Ui, state: &mut AppState) {
    let Some(dataset) = state.dataset.clone() else { return };

    ui.heading("Listings per neighbourhood");
    ui.columns(2, |cols: &mut [Ui]| {
        let left = &mut cols[0];
        left.label("Listing counts for one city. The sidebar filters do not apply to this panel.");
        left.add_space(4.0);

        let current = state.counts_panel.city.clone();
        egui::ComboBox::from_id_salt("counts_city")
            .selected_text(&current)
            .show_ui(left, |ui: &mut Ui| {
                for city in &dataset.cities {
                    if ui.selectable_label(current == *city, city).clicked() {
                        state.set_counts_city(city.clone());
                    }
                }
            });
        left.label(format!(
            "{} listings in {}",
            state.counts_panel.total, state.counts_panel.city
        ));

        charts::neighbourhood_count_bars(&mut cols[1], &state.counts_panel.counts);
    });
}

fn stats_section(ui: &mut Ui, state: &mut AppState) {
    let Some(dataset) = state.dataset.clone() else { return };

    ui.heading("Accommodates, bedrooms, beds and bathrooms per neighbourhood");
    ui.columns(2, |cols: &mut [Ui]| {
        let left = &mut cols[0];
        left.label(
            "Per-neighbourhood summary of the selected attribute, sorted by descending mean.",
        );
        left.add_space(4.0);

        let current_city = state.stats_panel.city.clone();
        egui::ComboBox::from_id_salt("stats_city")
            .selected_text(&current_city)
            .show_ui(left, |ui: &mut Ui| {
                for city in &dataset.cities {
                    if ui.selectable_label(current_city == *city, city).clicked() {
                        state.set_stats_city(city.clone());
                    }
                }
            });

        let current_metric = state.stats_panel.metric;
        egui::ComboBox::from_id_salt("stats_metric")
            .selected_text(current_metric.label())
            .show_ui(left, |ui: &mut Ui| {
                for metric in Metric::ALL {
                    if ui
                        .selectable_label(current_metric == metric, metric.label())
                        .clicked()
                    {
                        state.set_stats_metric(metric);
                    }
                }
            });
        left.label(format!(
            "{} listings in {}",
            state.stats_panel.total, state.stats_panel.city
        ));
        left.add_space(4.0);
        charts::summary_table(left, &state.stats_panel.summaries);

        charts::neighbourhood_mean_bars(
            &mut cols[1],
            &state.stats_panel.summaries,
            state.stats_panel.metric.label(),
        );
    });
}

fn composition_section(ui: &mut Ui, state: &AppState) {
    let Some(dataset) = &state.dataset else { return };
    let tallies = &dataset.tallies;

    ui.heading("Listing composition");
    ui.columns(2, |cols: &mut [Ui]| {
        cols[0].strong("Cleaning fee");
        charts::pie_chart(
            &mut cols[0],
            &[
                (
                    "with cleaning fee".to_string(),
                    tallies.with_cleaning_fee as f64,
                ),
                (
                    "without cleaning fee".to_string(),
                    tallies.without_cleaning_fee as f64,
                ),
            ],
        );

        cols[1].strong("Room types");
        let slices: Vec<(String, f64)> = RoomType::ALL
            .iter()
            .enumerate()
            .map(|(i, rt)| (rt.label().to_string(), tallies.room_types[i] as f64))
            .collect();
        charts::pie_chart(&mut cols[1], &slices);
    });
}

fn verification_section(ui: &mut Ui, state: &AppState) {
    let Some(dataset) = &state.dataset else { return };
    ui.heading("Host identity verification per city");
    charts::verification_bars(ui, dataset);
}

fn prediction_section(ui: &mut Ui, state: &mut AppState) {
    let Some(dataset) = state.dataset.clone() else { return };

    ui.heading("Price prediction");

    if let Some(err) = &state.model_error {
        ui.label(RichText::new(format!("Prediction unavailable: {err}")).color(Color32::RED));
        return;
    }
    if state.predictor.is_none() {
        ui.label("No model loaded (File → Open model…).");
        return;
    }

    ui.label("Estimated nightly price for a listing with the selected properties.");
    let ranges = dataset.ranges;

    ui.columns(2, |cols: &mut [Ui]| {
        let left = &mut cols[0];
        let form = &mut state.prediction_form;

        egui::ComboBox::from_id_salt("predict_room_type")
            .selected_text(form.room_type.label())
            .show_ui(left, |ui: &mut Ui| {
                for rt in RoomType::ALL {
                    ui.selectable_value(&mut form.room_type, rt, rt.label());
                }
            });

        let max_accommodates = (ranges.accommodates.max as u32).max(1);
        left.add(
            egui::Slider::new(&mut form.accommodates, 1..=max_accommodates).text("Accommodates"),
        );
        left.add(
            egui::Slider::new(&mut form.bathrooms, ranges.bathrooms.min..=ranges.bathrooms.max)
                .step_by(0.5)
                .text("Bathrooms"),
        );

        egui::ComboBox::from_id_salt("predict_city")
            .selected_text(&form.city)
            .show_ui(left, |ui: &mut Ui| {
                for city in &dataset.cities {
                    if ui.selectable_label(form.city == *city, city).clicked() {
                        form.city = city.clone();
                        // A city change invalidates the neighbourhood choice.
                        form.neighbourhood = dataset
                            .neighbourhoods_of(city)
                            .first()
                            .cloned()
                            .unwrap_or_default();
                    }
                }
            });

        let right = &mut cols[1];
        let form = &mut state.prediction_form;

        right.add(
            egui::Slider::new(&mut form.bedrooms, ranges.bedrooms.min..=ranges.bedrooms.max)
                .step_by(1.0)
                .text("Bedrooms"),
        );
        right.add(
            egui::Slider::new(&mut form.beds, ranges.beds.min..=ranges.beds.max)
                .step_by(1.0)
                .text("Beds"),
        );

        let city = form.city.clone();
        egui::ComboBox::from_id_salt("predict_neighbourhood")
            .selected_text(&form.neighbourhood)
            .show_ui(right, |ui: &mut Ui| {
                for n in dataset.neighbourhoods_of(&city) {
                    ui.selectable_value(&mut form.neighbourhood, n.clone(), n);
                }
            });

        egui::ComboBox::from_id_salt("predict_property_type")
            .selected_text(&form.property_type)
            .show_ui(right, |ui: &mut Ui| {
                for p in &dataset.property_types {
                    ui.selectable_value(&mut form.property_type, p.clone(), p);
                }
            });

        egui::ComboBox::from_id_salt("predict_response_rate")
            .selected_text(&form.host_response_rate)
            .show_ui(right, |ui: &mut Ui| {
                for r in &dataset.response_rates {
                    ui.selectable_value(&mut form.host_response_rate, r.clone(), r);
                }
            });
    });

    ui.add_space(8.0);
    match state.prediction() {
        Some(Ok(price)) => {
            ui.heading(format!("Price = ${price:.2}"));
        }
        Some(Err(e)) => {
            ui.label(
                RichText::new(format!("Prediction failed: {e}. Adjust the inputs and retry."))
                    .color(Color32::RED),
            );
        }
        None => {}
    }
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_listings_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open listings data")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        match crate::data::loader::load_listings(&path) {
            Ok(dataset) => {
                log::info!(
                    "loaded {} listings across {} cities from {}",
                    dataset.len(),
                    dataset.cities.len(),
                    path.display()
                );
                state.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("failed to load listings: {e}");
                state.status_message = Some(e.to_string());
            }
        }
    }
}

pub fn open_model_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open price model")
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        match crate::data::predict::load_price_model(&path) {
            Ok(model) => {
                log::info!("loaded price model from {}", path.display());
                state.set_model(model);
            }
            Err(e) => {
                log::error!("failed to load model: {e}");
                state.model_error = Some(e.to_string());
            }
        }
    }
}
