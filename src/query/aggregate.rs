use std::collections::BTreeMap;

use crate::data::model::{Cells, Column, Record};
use crate::error::QueryError;

// ---------------------------------------------------------------------------
// Continent / year means
// ---------------------------------------------------------------------------

/// Mean of a metric over one (continent, year) group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupMean {
    pub continent: String,
    pub year: i32,
    /// `None` when every value in the group is missing.
    pub mean: Option<f64>,
    /// Number of non-missing values averaged.
    pub count: usize,
}

/// Group by `(continent, year)` and average `metric`, skipping missing values.
///
/// Output is ordered by continent name, then year. Groups whose values are
/// all missing are kept with `mean: None`.
pub fn group_by_continent_year_mean<'a, I>(
    rows: I,
    metric: Column,
) -> Result<Vec<GroupMean>, QueryError>
where
    I: IntoIterator<Item = &'a Record>,
{
    require_metric(metric)?;

    let mut groups: BTreeMap<(&str, i32), (f64, usize)> = BTreeMap::new();
    for rec in rows {
        let acc = groups.entry((rec.continent.as_str(), rec.year)).or_default();
        if let Some(v) = rec.metric(metric) {
            acc.0 += v;
            acc.1 += 1;
        }
    }

    Ok(groups
        .into_iter()
        .map(|((continent, year), (sum, count))| GroupMean {
            continent: continent.to_string(),
            year,
            mean: (count > 0).then(|| sum / count as f64),
            count,
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Scalars
// ---------------------------------------------------------------------------

/// Largest non-missing value of a numeric column, used to scale marker sizes.
pub fn max_of<R: Cells>(rows: &[R], column: Column) -> Result<f64, QueryError> {
    require_numeric(column)?;
    if rows.is_empty() {
        return Err(QueryError::EmptyInput(format!("max of '{column}' over no rows")));
    }
    rows.iter()
        .filter_map(|r| r.number(column))
        .max_by(f64::total_cmp)
        .ok_or_else(|| QueryError::EmptyInput(format!("every '{column}' value is missing")))
}

// ---------------------------------------------------------------------------
// Distribution summary (box / violin charts)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub min: f64,
    pub lower_quartile: f64,
    pub median: f64,
    pub upper_quartile: f64,
    pub max: f64,
    pub mean: f64,
    pub count: usize,
}

/// Five-number summary plus mean of the non-missing values.
/// Quartiles are linearly interpolated between closest ranks.
pub fn summarize<R: Cells>(rows: &[R], metric: Column) -> Result<Option<Summary>, QueryError> {
    require_numeric(metric)?;

    let mut values: Vec<f64> = rows.iter().filter_map(|r| r.number(metric)).collect();
    if values.is_empty() {
        return Ok(None);
    }
    values.sort_by(f64::total_cmp);

    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    Ok(Some(Summary {
        min: values[0],
        lower_quartile: quantile(&values, 0.25),
        median: quantile(&values, 0.5),
        upper_quartile: quantile(&values, 0.75),
        max: values[count - 1],
        mean,
        count,
    }))
}

/// `sorted` must be non-empty and ascending.
fn quantile(sorted: &[f64], p: f64) -> f64 {
    let pos = (sorted.len() - 1) as f64 * p;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

// ---------------------------------------------------------------------------
// Shares (pie charts)
// ---------------------------------------------------------------------------

/// One country's slice of a metric total.
#[derive(Debug, Clone, PartialEq)]
pub struct Share {
    pub country: String,
    pub value: f64,
    /// `value / total`, 0 when the total is 0.
    pub fraction: f64,
}

/// Each row's share of the metric total, in input order. Rows with a
/// missing value are skipped.
pub fn shares<R: Cells>(rows: &[R], metric: Column) -> Result<Vec<Share>, QueryError> {
    require_metric(metric)?;

    let present: Vec<(String, f64)> = rows
        .iter()
        .filter_map(|r| Some((r.value(Column::Country).to_string(), r.number(metric)?)))
        .collect();
    let total: f64 = present.iter().map(|(_, v)| v).sum();

    Ok(present
        .into_iter()
        .map(|(country, value)| Share {
            country,
            value,
            fraction: if total == 0.0 { 0.0 } else { value / total },
        })
        .collect())
}

fn require_metric(column: Column) -> Result<(), QueryError> {
    if column.is_metric() {
        Ok(())
    } else {
        Err(QueryError::InvalidParameter(format!("'{column}' is not a metric")))
    }
}

fn require_numeric(column: Column) -> Result<(), QueryError> {
    if column.is_numeric() {
        Ok(())
    } else {
        Err(QueryError::InvalidParameter(format!("'{column}' is not numeric")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::table::Table;

    fn table() -> Table {
        Table::from_records(vec![
            Record::new("Vietnam", 2005, "Asia").with(Column::Income, 2000.0),
            Record::new("Gabon", 2005, "Africa").with(Column::Income, 8000.0),
            Record::new("Chad", 2005, "Africa"),
            Record::new("Chad", 2004, "Africa"),
            Record::new("Japan", 2004, "Asia").with(Column::Income, 30000.0),
            Record::new("Vietnam", 2004, "Asia").with(Column::Income, 1800.0),
        ])
    }

    #[test]
    fn group_means_skip_missing_and_keep_empty_groups() {
        let means = group_by_continent_year_mean(&table(), Column::Income).unwrap();
        let keys: Vec<(&str, i32)> = means.iter().map(|g| (g.continent.as_str(), g.year)).collect();
        assert_eq!(
            keys,
            vec![("Africa", 2004), ("Africa", 2005), ("Asia", 2004), ("Asia", 2005)]
        );
        assert_eq!(means[0].mean, None);
        assert_eq!(means[0].count, 0);
        assert_eq!(means[1].mean, Some(8000.0));
        assert_eq!(means[2].mean, Some(15900.0));
        assert_eq!(means[3].mean, Some(2000.0));
    }

    #[test]
    fn group_means_reject_non_metrics() {
        assert!(matches!(
            group_by_continent_year_mean(&table(), Column::Country),
            Err(QueryError::InvalidParameter(_))
        ));
        assert!(group_by_continent_year_mean(&table(), Column::Year).is_err());
    }

    #[test]
    fn max_of_errors() {
        let none: Vec<&Record> = Vec::new();
        assert!(matches!(
            max_of(&none, Column::Income),
            Err(QueryError::EmptyInput(_))
        ));
        let table = table();
        let chad: Vec<&Record> = table.iter().filter(|r| r.country == "Chad").collect();
        assert!(matches!(
            max_of(&chad, Column::Income),
            Err(QueryError::EmptyInput(_))
        ));
        assert!(matches!(
            max_of(table.records(), Column::Continent),
            Err(QueryError::InvalidParameter(_))
        ));
        assert_eq!(max_of(table.records(), Column::Income).unwrap(), 30000.0);
        assert_eq!(max_of(table.records(), Column::Year).unwrap(), 2005.0);
    }

    #[test]
    fn summary_quartiles_interpolate() {
        let recs: Vec<Record> = [1.0, 2.0, 3.0, 4.0, 5.0]
            .iter()
            .map(|&v| Record::new("X", 2000, "Asia").with(Column::Income, v))
            .chain(std::iter::once(Record::new("X", 2001, "Asia")))
            .collect();
        let s = summarize(&recs, Column::Income).unwrap().unwrap();
        assert_eq!(s.count, 5);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.lower_quartile, 2.0);
        assert_eq!(s.median, 3.0);
        assert_eq!(s.upper_quartile, 4.0);
        assert_eq!(s.max, 5.0);
        assert_eq!(s.mean, 3.0);

        let two = &recs[..2];
        let s = summarize(two, Column::Income).unwrap().unwrap();
        assert_eq!(s.median, 1.5);
        assert_eq!(s.lower_quartile, 1.25);

        assert_eq!(summarize(&recs[5..], Column::Income).unwrap(), None);
    }

    #[test]
    fn shares_skip_missing() {
        let table = table();
        let africa: Vec<&Record> = table.iter().filter(|r| r.year == 2005).collect();
        let slices = shares(&africa, Column::Income).unwrap();
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0].country, "Vietnam");
        assert_eq!(slices[0].fraction, 0.2);
        assert_eq!(slices[1].fraction, 0.8);
    }
}
