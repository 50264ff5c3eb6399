use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use gapminder_explorer::config::ExplorerConfig;
use gapminder_explorer::query::{
    filter_by_continent_and_year, filter_by_countries, filter_by_year, filter_by_year_range,
    group_by_continent_year_mean, max_of, project, shares, sort_rows, summarize, GroupMean,
    Share, SortOrder, Summary,
};
use gapminder_explorer::{Cells, Column, QueryError, Row, Table};

use crate::color::ColorMap;

const DEFAULT_CONTINENT: &str = "Asia";
const DEFAULT_COUNTRIES: [&str; 6] = ["Vietnam", "Gabon", "Tuvalu", "Slovenia", "Jamaica", "Chile"];
const DEFAULT_RANGE: (i32, i32) = (1995, 2005);

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Overview,
    Continent,
    Country,
}

impl Page {
    pub const ALL: [Page; 3] = [Page::Overview, Page::Continent, Page::Country];

    pub fn title(self) -> &'static str {
        match self {
            Page::Overview => "Overview",
            Page::Continent => "Continent",
            Page::Country => "Country",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Visualization,
    Table,
}

// ---------------------------------------------------------------------------
// Selector parameters per page
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct OverviewParams {
    pub x: Column,
    pub y: Column,
    pub year: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContinentParams {
    pub x: Column,
    pub y: Column,
    pub continent: String,
    pub year: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountryParams {
    pub countries: BTreeSet<String>,
    pub metric: Column,
    pub start_year: i32,
    pub end_year: i32,
}

// ---------------------------------------------------------------------------
// Cached query results
// ---------------------------------------------------------------------------

/// Sortable table contents.
pub struct DataTable {
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
    pub sort: Option<(Column, SortOrder)>,
}

impl DataTable {
    fn new(columns: Vec<Column>, rows: Vec<Row>) -> Self {
        Self {
            columns,
            rows,
            sort: None,
        }
    }

    /// Sort on `column`; a second click on the same column flips the order.
    pub fn sort_by(&mut self, column: Column) {
        let order = match self.sort {
            Some((current, order)) if current == column => order.toggled(),
            _ => SortOrder::Ascending,
        };
        sort_rows(&mut self.rows, column, order);
        self.sort = Some((column, order));
    }
}

/// Points of an x/y scatter, one row per country.
pub struct ScatterView {
    pub x: Column,
    pub y: Column,
    /// Rows projected to country, continent, x, y and population.
    pub rows: Vec<Row>,
    /// Largest population in the selection; `None` renders "No data".
    pub max_population: Option<f64>,
}

pub struct OverviewView {
    pub scatter: ScatterView,
    pub x_means: Vec<GroupMean>,
    pub y_means: Vec<GroupMean>,
    pub table: DataTable,
}

pub struct ContinentView {
    pub scatter: ScatterView,
    pub x_shares: Vec<Share>,
    pub y_shares: Vec<Share>,
    pub table: DataTable,
}

pub struct CountryView {
    /// Country, year and metric for every selected country.
    pub series: Vec<Row>,
    /// Per-country distribution over the selected year range.
    pub summaries: Vec<(String, Summary)>,
    pub table: DataTable,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Read-only dataset shared for the process lifetime.
    pub table: Arc<Table>,
    pub year_bounds: (i32, i32),

    pub page: Page,
    pub view: View,

    pub overview: OverviewParams,
    pub continent: ContinentParams,
    pub country: CountryParams,

    pub overview_view: Option<OverviewView>,
    pub continent_view: Option<ContinentView>,
    pub country_view: Option<CountryView>,

    pub continent_colors: ColorMap,
    pub country_colors: ColorMap,

    /// Last query error per page, shown while that page is open.
    statuses: HashMap<Page, String>,
}

impl AppState {
    pub fn new(table: Arc<Table>, config: &ExplorerConfig) -> Self {
        let year_bounds = table.year_range().unwrap_or((1800, 2018));
        let clamp = |y: i32| y.clamp(year_bounds.0, year_bounds.1);
        let year = clamp(config.initial_year);

        let continents = table.continents();
        let continent = if table.has_continent(DEFAULT_CONTINENT) {
            DEFAULT_CONTINENT.to_string()
        } else {
            continents.first().cloned().unwrap_or_default()
        };

        let known: BTreeSet<String> = table.countries().into_iter().collect();
        let mut countries: BTreeSet<String> = DEFAULT_COUNTRIES
            .iter()
            .filter(|c| known.contains(**c))
            .map(|c| c.to_string())
            .collect();
        if countries.is_empty() {
            countries = known.iter().take(3).cloned().collect();
        }

        let mut state = Self {
            year_bounds,
            page: Page::Overview,
            view: View::Visualization,
            overview: OverviewParams {
                x: Column::LifeExpectancy,
                y: Column::Income,
                year,
            },
            continent: ContinentParams {
                x: Column::LifeExpectancy,
                y: Column::Income,
                continent,
                year,
            },
            country: CountryParams {
                countries,
                metric: Column::Income,
                start_year: clamp(DEFAULT_RANGE.0),
                end_year: clamp(DEFAULT_RANGE.1),
            },
            overview_view: None,
            continent_view: None,
            country_view: None,
            continent_colors: ColorMap::new(continents),
            country_colors: ColorMap::default(),
            statuses: HashMap::new(),
            table,
        };
        state.refresh_overview();
        state.refresh_continent();
        state.refresh_country();
        state
    }

    // ---- Recompute cached results after a selector change ----

    pub fn refresh_overview(&mut self) {
        let result = overview_view(&self.table, &self.overview);
        self.overview_view = self.settle(Page::Overview, result);
    }

    pub fn refresh_continent(&mut self) {
        let result = continent_view(&self.table, &self.continent);
        self.continent_view = self.settle(Page::Continent, result);
    }

    pub fn refresh_country(&mut self) {
        self.country_colors = ColorMap::new(self.country.countries.iter().cloned());
        let result = country_view(&self.table, &self.country);
        self.country_view = self.settle(Page::Country, result);
    }

    /// Error from the last refresh of the open page, if any.
    pub fn status_message(&self) -> Option<&str> {
        self.statuses.get(&self.page).map(String::as_str)
    }

    /// Keep the result, or record the error against `page`.
    fn settle<T>(&mut self, page: Page, result: Result<T, QueryError>) -> Option<T> {
        match result {
            Ok(view) => {
                self.statuses.remove(&page);
                Some(view)
            }
            Err(e) => {
                log::warn!("{page:?} query failed: {e}");
                self.statuses.insert(page, e.to_string());
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Page queries
// ---------------------------------------------------------------------------

/// Drop repeated columns, e.g. when x and y select the same metric.
fn distinct_columns(columns: &[Column]) -> Vec<Column> {
    let mut out: Vec<Column> = Vec::with_capacity(columns.len());
    for &c in columns {
        if !out.contains(&c) {
            out.push(c);
        }
    }
    out
}

fn scatter_view<R: Cells>(rows: &[R], x: Column, y: Column) -> Result<ScatterView, QueryError> {
    let columns = distinct_columns(&[Column::Country, Column::Continent, x, y, Column::Population]);
    let max_population = match max_of(rows, Column::Population) {
        Ok(max) => Some(max),
        Err(QueryError::EmptyInput(_)) => None,
        Err(e) => return Err(e),
    };
    Ok(ScatterView {
        x,
        y,
        rows: project(rows, &columns)?,
        max_population,
    })
}

fn overview_view(table: &Table, params: &OverviewParams) -> Result<OverviewView, QueryError> {
    log::debug!("Overview query: {params:?}");
    let rows = filter_by_year(table, params.year);
    let columns = distinct_columns(&[Column::Country, params.x, params.y, Column::Continent]);
    Ok(OverviewView {
        scatter: scatter_view(&rows, params.x, params.y)?,
        x_means: group_by_continent_year_mean(table, params.x)?,
        y_means: group_by_continent_year_mean(table, params.y)?,
        table: DataTable::new(columns.clone(), project(&rows, &columns)?),
    })
}

fn continent_view(table: &Table, params: &ContinentParams) -> Result<ContinentView, QueryError> {
    log::debug!("Continent query: {params:?}");
    let rows = filter_by_continent_and_year(table, &params.continent, params.year)?;
    let columns = distinct_columns(&[Column::Country, Column::Year, params.x, params.y]);
    Ok(ContinentView {
        scatter: scatter_view(&rows, params.x, params.y)?,
        x_shares: shares(&rows, params.x)?,
        y_shares: shares(&rows, params.y)?,
        table: DataTable::new(columns.clone(), project(&rows, &columns)?),
    })
}

fn country_view(table: &Table, params: &CountryParams) -> Result<CountryView, QueryError> {
    log::debug!("Country query: {params:?}");
    let countries: Vec<&str> = params.countries.iter().map(String::as_str).collect();
    let rows = filter_by_countries(table, &countries);
    let in_range = filter_by_year_range(rows.iter().copied(), params.start_year, params.end_year)?;

    let mut summaries = Vec::with_capacity(countries.len());
    for country in &countries {
        let own = filter_by_countries(in_range.iter().copied(), &[*country]);
        if let Some(summary) = summarize(&own, params.metric)? {
            summaries.push((country.to_string(), summary));
        }
    }

    let columns = [Column::Country, Column::Year, params.metric, Column::Continent];
    Ok(CountryView {
        series: project(&rows, &[Column::Country, Column::Year, params.metric])?,
        summaries,
        table: DataTable::new(columns.to_vec(), project(&rows, &columns)?),
    })
}
