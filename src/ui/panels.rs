use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use gapminder_explorer::Column;

use crate::state::{AppState, Page, View};

// ---------------------------------------------------------------------------
// Left side panel – selector widgets
// ---------------------------------------------------------------------------

/// Render the selector panel for the active page.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading(state.page.title());
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| match state.page {
            Page::Overview => overview_selectors(ui, state),
            Page::Continent => continent_selectors(ui, state),
            Page::Country => country_selectors(ui, state),
        });
}

fn overview_selectors(ui: &mut Ui, state: &mut AppState) {
    let bounds = state.year_bounds;
    let params = &mut state.overview;
    let mut changed = false;

    ui.label("Select x-axis:");
    changed |= metric_combo(ui, "overview_x", &mut params.x);
    ui.add_space(6.0);
    ui.label("Select y-axis:");
    changed |= metric_combo(ui, "overview_y", &mut params.y);
    ui.add_space(6.0);
    ui.label("Choose year:");
    changed |= year_slider(ui, &mut params.year, bounds, "Year");

    if changed {
        state.refresh_overview();
    }
}

fn continent_selectors(ui: &mut Ui, state: &mut AppState) {
    let bounds = state.year_bounds;
    let continents = state.table.continents();
    let params = &mut state.continent;
    let mut changed = false;

    ui.label("Select x-axis:");
    changed |= metric_combo(ui, "continent_x", &mut params.x);
    ui.add_space(6.0);
    ui.label("Select y-axis:");
    changed |= metric_combo(ui, "continent_y", &mut params.y);
    ui.add_space(6.0);
    ui.label("Select a continent:");
    for continent in continents {
        let text = RichText::new(&continent).color(state.continent_colors.color_for(&continent));
        changed |= ui
            .radio_value(&mut params.continent, continent.clone(), text)
            .changed();
    }
    ui.add_space(6.0);
    ui.label("Choose year:");
    changed |= year_slider(ui, &mut params.year, bounds, "Year");

    if changed {
        state.refresh_continent();
    }
}

fn country_selectors(ui: &mut Ui, state: &mut AppState) {
    let bounds = state.year_bounds;
    let countries = state.table.countries();
    let params = &mut state.country;
    let mut changed = false;

    ui.label("Select category:");
    changed |= metric_combo(ui, "country_metric", &mut params.metric);
    ui.add_space(6.0);

    ui.label("Year range:");
    if year_slider(ui, &mut params.start_year, bounds, "From") {
        params.end_year = params.end_year.max(params.start_year);
        changed = true;
    }
    if year_slider(ui, &mut params.end_year, bounds, "To") {
        params.start_year = params.start_year.min(params.end_year);
        changed = true;
    }
    ui.label(
        RichText::new(format!(
            "Selected range: {} to {}",
            params.start_year, params.end_year
        ))
        .strong()
        .color(Color32::GRAY),
    );
    ui.add_space(6.0);

    ui.horizontal(|ui: &mut Ui| {
        ui.label(format!("Countries ({} selected)", params.countries.len()));
        if ui.small_button("None").clicked() {
            params.countries.clear();
            changed = true;
        }
    });
    ScrollArea::vertical()
        .id_salt("country_list")
        .max_height(320.0)
        .show(ui, |ui: &mut Ui| {
            for country in countries {
                let mut checked = params.countries.contains(&country);
                if ui.checkbox(&mut checked, country.as_str()).changed() {
                    if checked {
                        params.countries.insert(country);
                    } else {
                        params.countries.remove(&country);
                    }
                    changed = true;
                }
            }
        });

    if changed {
        state.refresh_country();
    }
}

/// Dropdown over the seven metrics. Returns whether the selection changed.
fn metric_combo(ui: &mut Ui, id: &str, current: &mut Column) -> bool {
    let mut changed = false;
    egui::ComboBox::from_id_salt(id)
        .selected_text(current.label())
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for metric in Column::METRICS {
                changed |= ui.selectable_value(current, metric, metric.label()).changed();
            }
        });
    changed
}

fn year_slider(ui: &mut Ui, year: &mut i32, bounds: (i32, i32), text: &str) -> bool {
    ui.add(egui::Slider::new(year, bounds.0..=bounds.1).text(text))
        .changed()
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the page tabs, view toggle and status line.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.strong("Gapminder");
        ui.separator();

        for page in Page::ALL {
            ui.selectable_value(&mut state.page, page, page.title());
        }

        ui.separator();

        ui.selectable_value(&mut state.view, View::Visualization, "Data Visualization");
        ui.selectable_value(&mut state.view, View::Table, "Data Table");

        ui.separator();

        ui.label(format!(
            "{} records, {} countries, {}–{}",
            state.table.len(),
            state.table.countries().len(),
            state.year_bounds.0,
            state.year_bounds.1
        ));

        if let Some(msg) = state.status_message() {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}
