use eframe::egui::{self, ScrollArea, Ui};

use crate::state::{AppState, Page, View};
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct ExplorerApp {
    pub state: AppState,
}

impl ExplorerApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for ExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: page tabs ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: selectors ----
        egui::SidePanel::left("selector_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: charts or table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| match self.state.view {
                    View::Visualization => visualization(ui, &self.state),
                    View::Table => data_table(ui, &mut self.state),
                });
        });
    }
}

fn visualization(ui: &mut Ui, state: &AppState) {
    match state.page {
        Page::Overview => {
            let Some(view) = &state.overview_view else {
                return;
            };
            plot::scatter(ui, "overview_scatter", &view.scatter, &state.continent_colors);
            ui.separator();
            plot::continent_means(
                ui,
                "overview_x_means",
                state.overview.x,
                &view.x_means,
                &state.continent_colors,
            );
            ui.separator();
            plot::continent_means(
                ui,
                "overview_y_means",
                state.overview.y,
                &view.y_means,
                &state.continent_colors,
            );
        }
        Page::Continent => {
            let Some(view) = &state.continent_view else {
                return;
            };
            plot::scatter(ui, "continent_scatter", &view.scatter, &state.continent_colors);
            ui.separator();
            ui.columns(2, |cols| {
                plot::shares_chart(&mut cols[0], "continent_x_shares", state.continent.x, &view.x_shares);
                plot::shares_chart(&mut cols[1], "continent_y_shares", state.continent.y, &view.y_shares);
            });
        }
        Page::Country => {
            let Some(view) = &state.country_view else {
                return;
            };
            let params = &state.country;
            plot::country_lines(ui, "country_lines", params.metric, &view.series, &state.country_colors);
            ui.separator();
            plot::country_boxes(
                ui,
                "country_boxes",
                params.metric,
                (params.start_year, params.end_year),
                &view.summaries,
                &state.country_colors,
            );
        }
    }
}

fn data_table(ui: &mut Ui, state: &mut AppState) {
    let (id, view) = match state.page {
        Page::Overview => ("overview_table", state.overview_view.as_mut().map(|v| &mut v.table)),
        Page::Continent => ("continent_table", state.continent_view.as_mut().map(|v| &mut v.table)),
        Page::Country => ("country_table", state.country_view.as_mut().map(|v| &mut v.table)),
    };
    if let Some(data) = view {
        table::data_table(ui, id, data);
    }
}
