mod app;
mod color;
mod data;
mod state;
mod ui;

use std::path::PathBuf;

use app::ListingLensApp;
use eframe::egui;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let listings_path = PathBuf::from(args.next().unwrap_or_else(|| "listings.csv".to_string()));
    let model_path = PathBuf::from(args.next().unwrap_or_else(|| "price_model.json".to_string()));

    // Dataset and model are loaded once here and handed to the app; nothing
    // mutates them afterwards. A missing dataset leaves the dashboard empty
    // but alive; a missing model disables only the prediction panel.
    let mut state = AppState::default();
    match data::loader::load_listings(&listings_path) {
        Ok(dataset) => {
            log::info!(
                "loaded {} listings across {} cities from {}",
                dataset.len(),
                dataset.cities.len(),
                listings_path.display()
            );
            state.set_dataset(dataset);
        }
        Err(e) => {
            log::error!("failed to load listings: {e}");
            state.status_message = Some(e.to_string());
        }
    }
    match data::predict::load_price_model(&model_path) {
        Ok(model) => {
            log::info!("loaded price model from {}", model_path.display());
            state.set_model(model);
        }
        Err(e) => {
            log::warn!("failed to load price model: {e}");
            state.model_error = Some(e.to_string());
        }
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Listing Lens – Airbnb Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(ListingLensApp::new(state)))),
    )
}
