use std::ops::RangeInclusive;

use eframe::egui::{self, Color32, Sense, Ui, Vec2};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, GridMark, Legend, Plot, PlotPoints, Points};

use crate::color::{generate_palette, gradient_palette};
use crate::data::aggregate::GroupSummary;
use crate::data::model::{ListingDataset, VerificationStatus};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Scatter map (filtered listings)
// ---------------------------------------------------------------------------

/// Review-count bands colouring the scatter map, low to high.
const REVIEW_BANDS: [(&str, u32, u32); 5] = [
    ("no reviews", 0, 0),
    ("1–9 reviews", 1, 9),
    ("10–49 reviews", 10, 49),
    ("50–199 reviews", 50, 199),
    ("200+ reviews", 200, u32::MAX),
];

fn review_band(reviews: u32) -> usize {
    REVIEW_BANDS
        .iter()
        .position(|&(_, low, high)| reviews >= low && reviews <= high)
        .unwrap_or(REVIEW_BANDS.len() - 1)
}

/// Longitude/latitude scatter of the listings passing the sidebar filters,
/// one series per review band.
pub fn scatter_map(ui: &mut Ui, state: &AppState) {
    let Some(dataset) = &state.dataset else { return };

    let mut series: Vec<Vec<[f64; 2]>> = vec![Vec::new(); REVIEW_BANDS.len()];
    for &idx in &state.visible_indices {
        let l = &dataset.listings[idx];
        series[review_band(l.number_of_reviews)].push([l.longitude, l.latitude]);
    }

    let colors = gradient_palette(REVIEW_BANDS.len(), 210.0, 0.0);

    Plot::new("listing_map")
        .legend(Legend::default())
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .height(420.0)
        .show(ui, |plot_ui| {
            for (band, points) in series.into_iter().enumerate() {
                if points.is_empty() {
                    continue;
                }
                plot_ui.points(
                    Points::new(PlotPoints::from(points))
                        .name(REVIEW_BANDS[band].0)
                        .color(colors[band])
                        .radius(2.0),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Bar charts
// ---------------------------------------------------------------------------

fn category_axis_label(labels: &[String], value: f64) -> String {
    let idx = value.round();
    if (value - idx).abs() > 0.05 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

/// Listing counts per neighbourhood for the selected city.
pub fn neighbourhood_count_bars(ui: &mut Ui, counts: &[(String, usize)]) {
    if counts.is_empty() {
        ui.label("No listings in this city.");
        return;
    }

    let labels: Vec<String> = counts.iter().map(|(name, _)| name.clone()).collect();
    let bars: Vec<Bar> = counts
        .iter()
        .enumerate()
        .map(|(i, (name, count))| Bar::new(i as f64, *count as f64).name(name).width(0.6))
        .collect();
    let chart = BarChart::new(bars)
        .name("listings")
        .color(Color32::LIGHT_BLUE);

    Plot::new("neighbourhood_counts")
        .y_axis_label("Number of listings")
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            category_axis_label(&labels, mark.value)
        })
        .height(320.0)
        .allow_scroll(false)
        .show(ui, |plot_ui| plot_ui.bar_chart(chart));
}

/// Per-neighbourhood means of the selected metric, already sorted by
/// descending mean.
pub fn neighbourhood_mean_bars(ui: &mut Ui, summaries: &[GroupSummary], metric_label: &str) {
    if summaries.is_empty() {
        ui.label("No observations for this metric.");
        return;
    }

    let labels: Vec<String> = summaries.iter().map(|s| s.key.clone()).collect();
    let bars: Vec<Bar> = summaries
        .iter()
        .enumerate()
        .map(|(i, s)| Bar::new(i as f64, s.mean).name(&s.key).width(0.6))
        .collect();
    let chart = BarChart::new(bars)
        .name(metric_label)
        .color(Color32::from_rgb(0xdb, 0x84, 0x48));

    Plot::new("neighbourhood_means")
        .y_axis_label(format!("Mean {}", metric_label.to_lowercase()))
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            category_axis_label(&labels, mark.value)
        })
        .height(320.0)
        .allow_scroll(false)
        .show(ui, |plot_ui| plot_ui.bar_chart(chart));
}

/// Verified / not-verified host counts per city, as grouped bars.
pub fn verification_bars(ui: &mut Ui, dataset: &ListingDataset) {
    let by_city = &dataset.tallies.verification_by_city;
    let cities: Vec<String> = by_city.keys().cloned().collect();
    let colors = generate_palette(VerificationStatus::ALL.len());

    let mut chart_list = Vec::new();
    for status in VerificationStatus::ALL {
        let offset = (status.index() as f64 - 1.0) * 0.28;
        let bars: Vec<Bar> = cities
            .iter()
            .enumerate()
            .filter_map(|(i, city)| {
                let count = by_city[city][status.index()];
                (count > 0)
                    .then(|| Bar::new(i as f64 + offset, count as f64).name(city).width(0.25))
            })
            .collect();
        if bars.is_empty() {
            continue;
        }
        chart_list.push(
            BarChart::new(bars)
                .name(status.label())
                .color(colors[status.index()]),
        );
    }

    let labels = cities;
    Plot::new("host_verification")
        .legend(Legend::default())
        .y_axis_label("Number of hosts")
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            category_axis_label(&labels, mark.value)
        })
        .height(320.0)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for chart in chart_list {
                plot_ui.bar_chart(chart);
            }
        });
}

// ---------------------------------------------------------------------------
// Pie chart (painter-drawn; egui_plot has no pie primitive)
// ---------------------------------------------------------------------------

/// Draw a pie of the given `(label, value)` slices with a legend beside it.
///
/// Each slice is a triangle fan around the centre, so slices wider than a
/// half turn render correctly.
pub fn pie_chart(ui: &mut Ui, slices: &[(String, f64)]) {
    let total: f64 = slices.iter().map(|(_, v)| v).sum();
    if total <= 0.0 {
        ui.label("No data.");
        return;
    }

    let colors = generate_palette(slices.len());

    ui.horizontal(|ui| {
        let (response, painter) = ui.allocate_painter(Vec2::splat(200.0), Sense::hover());
        let center = response.rect.center();
        let radius = response.rect.width().min(response.rect.height()) * 0.48;

        // Start at 12 o'clock and sweep clockwise.
        let mut angle = -std::f64::consts::FRAC_PI_2;
        for ((_, value), color) in slices.iter().zip(&colors) {
            let sweep = value / total * std::f64::consts::TAU;
            let steps = (sweep / 0.05).ceil().max(1.0) as usize;

            let mut mesh = egui::Mesh::default();
            mesh.colored_vertex(center, *color);
            for i in 0..=steps {
                let a = angle + sweep * i as f64 / steps as f64;
                let dir = Vec2::new(a.cos() as f32, a.sin() as f32);
                mesh.colored_vertex(center + dir * radius, *color);
            }
            for i in 0..steps {
                mesh.add_triangle(0, i as u32 + 1, i as u32 + 2);
            }
            painter.add(mesh);

            angle += sweep;
        }

        ui.vertical(|ui| {
            for ((label, value), color) in slices.iter().zip(&colors) {
                ui.horizontal(|ui| {
                    let (swatch, painter) =
                        ui.allocate_painter(Vec2::splat(10.0), Sense::hover());
                    painter.rect_filled(swatch.rect, 2, *color);
                    let share = value / total * 100.0;
                    ui.label(format!("{label}: {value:.0} ({share:.1}%)"));
                });
            }
        });
    });
}

// ---------------------------------------------------------------------------
// Summary table
// ---------------------------------------------------------------------------

/// Count/mean/median/min/max per neighbourhood, as a striped table.
pub fn summary_table(ui: &mut Ui, summaries: &[GroupSummary]) {
    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(130.0))
        .columns(Column::auto().at_least(55.0), 5)
        .header(20.0, |mut header| {
            for title in ["Neighbourhood", "Count", "Mean", "Median", "Min", "Max"] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for s in summaries {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.label(&s.key);
                    });
                    row.col(|ui| {
                        ui.label(s.count.to_string());
                    });
                    row.col(|ui| {
                        ui.label(format!("{:.2}", s.mean));
                    });
                    row.col(|ui| {
                        ui.label(format!("{:.2}", s.median));
                    });
                    row.col(|ui| {
                        ui.label(format!("{:.2}", s.min));
                    });
                    row.col(|ui| {
                        ui.label(format!("{:.2}", s.max));
                    });
                });
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_bands_cover_all_counts() {
        assert_eq!(review_band(0), 0);
        assert_eq!(review_band(1), 1);
        assert_eq!(review_band(9), 1);
        assert_eq!(review_band(10), 2);
        assert_eq!(review_band(49), 2);
        assert_eq!(review_band(50), 3);
        assert_eq!(review_band(200), 4);
        assert_eq!(review_band(u32::MAX), 4);
    }

    #[test]
    fn test_category_axis_labels_only_on_integer_marks() {
        let labels = vec!["Harlem".to_string(), "Chelsea".to_string()];
        assert_eq!(category_axis_label(&labels, 0.0), "Harlem");
        assert_eq!(category_axis_label(&labels, 1.02), "Chelsea");
        assert_eq!(category_axis_label(&labels, 0.5), "");
        assert_eq!(category_axis_label(&labels, -1.0), "");
        assert_eq!(category_axis_label(&labels, 7.0), "");
    }
}
