use eframe::egui::{Color32, Ui};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, MarkerShape, Plot, PlotPoints,
    Points,
};

use gapminder_explorer::query::{GroupMean, Share, Summary};
use gapminder_explorer::{Cells, Column, Row};

use crate::color::ColorMap;
use crate::state::ScatterView;

const PLOT_HEIGHT: f32 = 360.0;
/// Marker diameter of the most populous country, in points.
const MAX_MARKER_DIAMETER: f64 = 42.0;
const MIN_MARKER_DIAMETER: f64 = 5.0;

/// Marker radius with area proportional to `value / max`.
pub fn marker_radius(value: Option<f64>, max: f64) -> f32 {
    let diameter = match value {
        Some(v) if max > 0.0 && v > 0.0 => MAX_MARKER_DIAMETER * (v / max).sqrt(),
        _ => MIN_MARKER_DIAMETER,
    };
    (diameter.max(MIN_MARKER_DIAMETER) / 2.0) as f32
}

pub fn no_data(ui: &mut Ui, what: &str) {
    ui.add_space(8.0);
    ui.vertical_centered(|ui: &mut Ui| {
        ui.weak(format!("No data for {what}"));
    });
    ui.add_space(8.0);
}

// ---------------------------------------------------------------------------
// Scatter: x vs y, colour by continent, size by population
// ---------------------------------------------------------------------------

pub fn scatter(ui: &mut Ui, id: &str, view: &ScatterView, colors: &ColorMap) {
    let Some(max_population) = view.max_population else {
        no_data(ui, "the selected year");
        return;
    };

    Plot::new(id)
        .legend(Legend::default())
        .height(PLOT_HEIGHT)
        .x_axis_label(view.x.label())
        .y_axis_label(view.y.label())
        .show(ui, |plot_ui| {
            for row in &view.rows {
                let (Some(x), Some(y)) = (row.number(view.x), row.number(view.y)) else {
                    continue;
                };
                let continent = row.value(Column::Continent).to_string();
                let radius = marker_radius(row.number(Column::Population), max_population);
                let color = colors.color_for(&continent).gamma_multiply(0.7);

                // Points sharing a name share a legend entry.
                plot_ui.points(
                    Points::new(vec![[x, y]])
                        .name(&continent)
                        .shape(MarkerShape::Circle)
                        .filled(true)
                        .radius(radius)
                        .color(color),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Continent means over time
// ---------------------------------------------------------------------------

/// One line per continent; a missing mean breaks the line.
pub fn continent_means(ui: &mut Ui, id: &str, metric: Column, means: &[GroupMean], colors: &ColorMap) {
    if means.is_empty() {
        no_data(ui, metric.label());
        return;
    }

    ui.strong(format!("{} by continent", metric.label()));
    Plot::new(id)
        .legend(Legend::default())
        .height(PLOT_HEIGHT * 0.75)
        .x_axis_label("Year")
        .y_axis_label(metric.label())
        .show(ui, |plot_ui| {
            for segment in mean_segments(means) {
                let continent = segment.continent;
                plot_ui.line(
                    Line::new(PlotPoints::from(segment.points))
                        .name(continent)
                        .color(colors.color_for(continent))
                        .width(1.5),
                );
            }
        });
}

struct Segment<'a> {
    continent: &'a str,
    points: Vec<[f64; 2]>,
}

/// Split each continent's ordered means into runs without missing values.
fn mean_segments(means: &[GroupMean]) -> Vec<Segment<'_>> {
    let mut segments: Vec<Segment<'_>> = Vec::new();
    let mut open = false;
    for g in means {
        let same_continent = segments
            .last()
            .is_some_and(|s| s.continent == g.continent);
        match g.mean {
            Some(mean) => {
                if !(open && same_continent) {
                    segments.push(Segment {
                        continent: &g.continent,
                        points: Vec::new(),
                    });
                }
                if let Some(seg) = segments.last_mut() {
                    seg.points.push([f64::from(g.year), mean]);
                }
                open = true;
            }
            None => open = false,
        }
    }
    segments
}

// ---------------------------------------------------------------------------
// Shares (pie) as horizontal bars
// ---------------------------------------------------------------------------

pub fn shares_chart(ui: &mut Ui, id: &str, metric: Column, shares: &[Share]) {
    if shares.is_empty() {
        no_data(ui, metric.label());
        return;
    }

    ui.strong(format!("Share of {}", metric.label()));
    let bars: Vec<Bar> = shares
        .iter()
        .enumerate()
        .map(|(i, s)| {
            Bar::new(i as f64, s.fraction * 100.0)
                .name(format!("{} ({})", s.country, s.value))
                .width(0.8)
        })
        .collect();

    Plot::new(id)
        .height(PLOT_HEIGHT)
        .x_axis_label("% of total")
        .show_axes([true, false])
        .allow_drag(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal().color(Color32::LIGHT_BLUE));
        });
}

// ---------------------------------------------------------------------------
// Country page: metric over time and distribution over a year range
// ---------------------------------------------------------------------------

pub fn country_lines(ui: &mut Ui, id: &str, metric: Column, series: &[Row], colors: &ColorMap) {
    if series.is_empty() {
        no_data(ui, "the selected countries");
        return;
    }

    ui.strong(format!("{} over year", metric.label()));
    Plot::new(id)
        .legend(Legend::default())
        .height(PLOT_HEIGHT)
        .x_axis_label("Year")
        .y_axis_label(metric.label())
        .show(ui, |plot_ui| {
            for country in distinct_countries(series) {
                let points: Vec<[f64; 2]> = series
                    .iter()
                    .filter(|r| r.value(Column::Country).as_str() == Some(country.as_str()))
                    .filter_map(|r| Some([r.number(Column::Year)?, r.number(metric)?]))
                    .collect();
                let color = colors.color_for(&country);
                plot_ui.line(
                    Line::new(PlotPoints::from(points.clone()))
                        .name(&country)
                        .color(color)
                        .fill(0.0)
                        .width(1.5),
                );
                plot_ui.points(Points::new(points).name(&country).color(color).radius(3.0));
            }
        });
}

fn distinct_countries(series: &[Row]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for row in series {
        let country = row.value(Column::Country).to_string();
        if !out.contains(&country) {
            out.push(country);
        }
    }
    out
}

pub fn country_boxes(
    ui: &mut Ui,
    id: &str,
    metric: Column,
    range: (i32, i32),
    summaries: &[(String, Summary)],
    colors: &ColorMap,
) {
    if summaries.is_empty() {
        no_data(ui, "the selected range");
        return;
    }

    ui.strong(format!(
        "Comparison of {} from {} to {}",
        metric.label(),
        range.0,
        range.1
    ));
    Plot::new(id)
        .legend(Legend::default())
        .height(PLOT_HEIGHT)
        .y_axis_label(metric.label())
        .show(ui, |plot_ui| {
            for (i, (country, s)) in summaries.iter().enumerate() {
                let at = i as f64;
                let color = colors.color_for(country);
                let spread = BoxSpread::new(s.min, s.lower_quartile, s.median, s.upper_quartile, s.max);
                plot_ui.box_plot(
                    BoxPlot::new(vec![BoxElem::new(at, spread).name(country).box_width(0.5)])
                        .name(country)
                        .color(color),
                );
                // Mean line across the box.
                plot_ui.line(
                    Line::new(PlotPoints::from(vec![[at - 0.25, s.mean], [at + 0.25, s.mean]]))
                        .name(country)
                        .color(color)
                        .style(egui_plot::LineStyle::dashed_dense()),
                );
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_area_scales_with_value() {
        let full = marker_radius(Some(100.0), 100.0);
        let quarter = marker_radius(Some(25.0), 100.0);
        assert_eq!(full, 21.0);
        assert_eq!(quarter, 10.5);
        assert_eq!(marker_radius(None, 100.0), 2.5);
        assert_eq!(marker_radius(Some(0.0001), 100.0), 2.5);
    }

    #[test]
    fn missing_means_split_lines() {
        let g = |continent: &str, year: i32, mean: Option<f64>| GroupMean {
            continent: continent.to_string(),
            year,
            mean,
            count: usize::from(mean.is_some()),
        };
        let means = vec![
            g("Africa", 2000, Some(1.0)),
            g("Africa", 2001, None),
            g("Africa", 2002, Some(3.0)),
            g("Asia", 2000, Some(4.0)),
            g("Asia", 2001, Some(5.0)),
        ];
        let segments = mean_segments(&means);
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].points, vec![[2000.0, 1.0]]);
        assert_eq!(segments[1].points, vec![[2002.0, 3.0]]);
        assert_eq!(segments[2].continent, "Asia");
        assert_eq!(segments[2].points.len(), 2);
    }
}
