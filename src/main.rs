mod app;
mod color;
mod state;
mod ui;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use eframe::egui;

use app::ExplorerApp;
use gapminder_explorer::config::ExplorerConfig;
use gapminder_explorer::data::loader;
use state::AppState;

fn main() -> Result<()> {
    env_logger::init();

    let config = ExplorerConfig::resolve(std::env::args().skip(1))
        .context("resolving configuration")?;

    let Some(path) = config.dataset.clone().or_else(pick_dataset) else {
        anyhow::bail!("no dataset given (pass a path, set GAPMINDER_DATA, or pick a file)");
    };

    // The dataset is loaded exactly once; a bad file stops startup.
    let table = match loader::load_with(&path, &config.load_options()?) {
        Ok(table) => Arc::new(table),
        Err(e) => {
            log::error!("Failed to load {}: {e}", path.display());
            return Err(e).with_context(|| format!("loading {}", path.display()));
        }
    };

    let state = AppState::new(table, &config);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size([700.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Gapminder Explorer",
        options,
        Box::new(move |_cc| Ok(Box::new(ExplorerApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}

/// Ask once for a dataset file when none was configured.
fn pick_dataset() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Open Gapminder dataset")
        .add_filter("Supported files", &["csv", "tsv", "txt", "json", "parquet", "pq"])
        .add_filter("CSV / TSV", &["csv", "tsv", "txt"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file()
}
