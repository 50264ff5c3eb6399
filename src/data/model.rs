use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::QueryError;

// ---------------------------------------------------------------------------
// Value – a single cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell as handed to the UI layer.
/// Kept `Ord` so distinct values can live in a `BTreeSet`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Integer(i64),
    Number(f64),
    Missing,
}

// -- Manual Eq/Ord so we can put Value in BTreeSet --

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use Value::*;
        fn discriminant(v: &Value) -> u8 {
            match v {
                Missing => 0,
                Integer(_) => 1,
                Number(_) => 2,
                Text(_) => 3,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Missing, Missing) => std::cmp::Ordering::Equal,
            (Integer(a), Integer(b)) => a.cmp(b),
            (Number(a), Number(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{s}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Number(v) => write!(f, "{v}"),
            Value::Missing => write!(f, ""),
        }
    }
}

impl From<Option<f64>> for Value {
    fn from(v: Option<f64>) -> Self {
        v.map_or(Value::Missing, Value::Number)
    }
}

impl Value {
    /// Numeric view of the cell, `None` for text and missing cells.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }
}

// ---------------------------------------------------------------------------
// Column – the canonical column set
// ---------------------------------------------------------------------------

/// Canonical column names. Raw file headers are mapped onto these at load
/// time, nothing downstream sees the file's own header text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    Country,
    Year,
    LifeExpectancy,
    ChildMortality,
    Income,
    Population,
    Co2Emission,
    HumanDevelopmentIndex,
    HivCases,
    Continent,
}

impl Column {
    /// All columns in canonical order.
    pub const ALL: [Column; 10] = [
        Column::Country,
        Column::Year,
        Column::LifeExpectancy,
        Column::ChildMortality,
        Column::Income,
        Column::Population,
        Column::Co2Emission,
        Column::HumanDevelopmentIndex,
        Column::HivCases,
        Column::Continent,
    ];

    /// The seven measured quantities.
    pub const METRICS: [Column; 7] = [
        Column::LifeExpectancy,
        Column::ChildMortality,
        Column::Income,
        Column::Population,
        Column::Co2Emission,
        Column::HumanDevelopmentIndex,
        Column::HivCases,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Column::Country => "country",
            Column::Year => "year",
            Column::LifeExpectancy => "life_expectancy",
            Column::ChildMortality => "child_mortality",
            Column::Income => "income",
            Column::Population => "population",
            Column::Co2Emission => "co2_emission",
            Column::HumanDevelopmentIndex => "human_development_index",
            Column::HivCases => "hiv_cases",
            Column::Continent => "continent",
        }
    }

    /// Display label, as shown on axes, selectors and table headers.
    pub fn label(self) -> &'static str {
        match self {
            Column::Country => "Country",
            Column::Year => "Year",
            Column::LifeExpectancy => "Life Expectancy",
            Column::ChildMortality => "Child Mortality (per 1000 born)",
            Column::Income => "Income (per person)",
            Column::Population => "Population",
            Column::Co2Emission => "CO2 emission (tonnes per person)",
            Column::HumanDevelopmentIndex => "Human Development Index",
            Column::HivCases => "Number of HIV cases",
            Column::Continent => "Continent",
        }
    }

    pub fn is_metric(self) -> bool {
        Column::METRICS.contains(&self)
    }

    /// Numeric columns: the metrics plus `year`.
    pub fn is_numeric(self) -> bool {
        self == Column::Year || self.is_metric()
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Column {
    type Err = QueryError;

    /// Exact match on the canonical name or the display label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Column::ALL
            .iter()
            .copied()
            .find(|c| c.name() == s || c.label() == s)
            .ok_or_else(|| QueryError::InvalidParameter(format!("unknown column '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// Cells – uniform column access for records and projected rows
// ---------------------------------------------------------------------------

pub trait Cells {
    fn value(&self, column: Column) -> Value;

    fn number(&self, column: Column) -> Option<f64> {
        self.value(column).as_f64()
    }
}

impl<T: Cells + ?Sized> Cells for &T {
    fn value(&self, column: Column) -> Value {
        (**self).value(column)
    }

    fn number(&self, column: Column) -> Option<f64> {
        (**self).number(column)
    }
}

// ---------------------------------------------------------------------------
// Record – one (country, year) observation
// ---------------------------------------------------------------------------

/// One row of the source file after header normalisation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Record {
    pub country: String,
    pub year: i32,
    pub life_expectancy: Option<f64>,
    pub child_mortality: Option<f64>,
    pub income: Option<f64>,
    pub population: Option<f64>,
    pub co2_emission: Option<f64>,
    pub human_development_index: Option<f64>,
    pub hiv_cases: Option<f64>,
    pub continent: String,
}

impl Record {
    /// A record with every metric missing.
    pub fn new(country: impl Into<String>, year: i32, continent: impl Into<String>) -> Self {
        Record {
            country: country.into(),
            year,
            life_expectancy: None,
            child_mortality: None,
            income: None,
            population: None,
            co2_emission: None,
            human_development_index: None,
            hiv_cases: None,
            continent: continent.into(),
        }
    }

    /// Builder-style metric setter. Non-metric columns are ignored.
    pub fn with(mut self, metric: Column, value: f64) -> Self {
        if let Some(slot) = self.metric_mut(metric) {
            *slot = Some(value);
        }
        self
    }

    /// Value of a metric column; `None` when missing or not a metric.
    pub fn metric(&self, column: Column) -> Option<f64> {
        match column {
            Column::LifeExpectancy => self.life_expectancy,
            Column::ChildMortality => self.child_mortality,
            Column::Income => self.income,
            Column::Population => self.population,
            Column::Co2Emission => self.co2_emission,
            Column::HumanDevelopmentIndex => self.human_development_index,
            Column::HivCases => self.hiv_cases,
            Column::Country | Column::Year | Column::Continent => None,
        }
    }

    fn metric_mut(&mut self, column: Column) -> Option<&mut Option<f64>> {
        match column {
            Column::LifeExpectancy => Some(&mut self.life_expectancy),
            Column::ChildMortality => Some(&mut self.child_mortality),
            Column::Income => Some(&mut self.income),
            Column::Population => Some(&mut self.population),
            Column::Co2Emission => Some(&mut self.co2_emission),
            Column::HumanDevelopmentIndex => Some(&mut self.human_development_index),
            Column::HivCases => Some(&mut self.hiv_cases),
            Column::Country | Column::Year | Column::Continent => None,
        }
    }

    /// Treat non-finite metric values (`NaN`, `inf` in the source) as missing.
    pub(crate) fn normalize_missing(mut self) -> Self {
        for metric in Column::METRICS {
            if let Some(slot) = self.metric_mut(metric) {
                if slot.is_some_and(|v| !v.is_finite()) {
                    *slot = None;
                }
            }
        }
        self
    }
}

impl Cells for Record {
    fn value(&self, column: Column) -> Value {
        match column {
            Column::Country => Value::Text(self.country.clone()),
            Column::Continent => Value::Text(self.continent.clone()),
            Column::Year => Value::Integer(i64::from(self.year)),
            metric => self.metric(metric).into(),
        }
    }

    fn number(&self, column: Column) -> Option<f64> {
        match column {
            Column::Year => Some(f64::from(self.year)),
            other => self.metric(other),
        }
    }
}

// ---------------------------------------------------------------------------
// Row – a projected row with a fixed, ordered key set
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    cells: Vec<(Column, Value)>,
}

impl Row {
    pub fn new(cells: Vec<(Column, Value)>) -> Self {
        Row { cells }
    }

    pub fn get(&self, column: Column) -> Option<&Value> {
        self.cells
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, v)| v)
    }

    pub fn columns(&self) -> impl Iterator<Item = Column> + '_ {
        self.cells.iter().map(|(c, _)| *c)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Column, &Value)> + '_ {
        self.cells.iter().map(|(c, v)| (*c, v))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl Cells for Row {
    fn value(&self, column: Column) -> Value {
        self.get(column).cloned().unwrap_or(Value::Missing)
    }

    fn number(&self, column: Column) -> Option<f64> {
        self.get(column).and_then(Value::as_f64)
    }
}

impl From<&Record> for Row {
    fn from(record: &Record) -> Self {
        Row::new(Column::ALL.iter().map(|&c| (c, record.value(c))).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn column_parses_name_and_label() {
        assert_eq!("income".parse::<Column>().unwrap(), Column::Income);
        assert_eq!(
            "Income (per person)".parse::<Column>().unwrap(),
            Column::Income
        );
        assert!(matches!(
            "Income".parse::<Column>(),
            Err(QueryError::InvalidParameter(_))
        ));
    }

    #[test]
    fn metrics_exclude_identity_columns() {
        assert_eq!(Column::METRICS.len(), 7);
        assert!(!Column::Country.is_metric());
        assert!(!Column::Year.is_metric());
        assert!(Column::Year.is_numeric());
        assert!(!Column::Continent.is_numeric());
    }

    #[test]
    fn value_ordering_puts_missing_first() {
        let set: BTreeSet<Value> = [
            Value::Text("b".into()),
            Value::Number(2.5),
            Value::Missing,
            Value::Text("a".into()),
            Value::Integer(3),
        ]
        .into_iter()
        .collect();
        let ordered: Vec<Value> = set.into_iter().collect();
        assert_eq!(ordered[0], Value::Missing);
        assert_eq!(ordered[1], Value::Integer(3));
        assert_eq!(ordered[3], Value::Text("a".into()));
    }

    #[test]
    fn record_cells_by_column() {
        let rec = Record::new("Vietnam", 2005, "Asia").with(Column::Income, 2000.0);
        assert_eq!(rec.value(Column::Country), Value::Text("Vietnam".into()));
        assert_eq!(rec.value(Column::Year), Value::Integer(2005));
        assert_eq!(rec.value(Column::Income), Value::Number(2000.0));
        assert_eq!(rec.value(Column::Population), Value::Missing);
        assert_eq!(rec.number(Column::Year), Some(2005.0));
        assert_eq!(rec.number(Column::Country), None);
    }

    #[test]
    fn nan_metrics_become_missing() {
        let rec = Record::new("X", 2000, "Asia")
            .with(Column::Income, f64::NAN)
            .with(Column::Population, 10.0)
            .normalize_missing();
        assert_eq!(rec.income, None);
        assert_eq!(rec.population, Some(10.0));
    }

    #[test]
    fn row_from_record_keeps_canonical_order() {
        let rec = Record::new("Gabon", 2005, "Africa");
        let row = Row::from(&rec);
        let cols: Vec<Column> = row.columns().collect();
        assert_eq!(cols, Column::ALL.to_vec());
        assert_eq!(row.get(Column::Continent), Some(&Value::Text("Africa".into())));
    }
}
