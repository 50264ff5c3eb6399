use std::collections::BTreeSet;

use crate::data::model::Record;
use crate::data::table::Table;
use crate::error::QueryError;

// ---------------------------------------------------------------------------
// Row filters
// ---------------------------------------------------------------------------
//
// Every filter keeps input order. Matching is exact: no case folding, no
// prefix or fuzzy matching.

/// Records observed in `year`. A year with no records yields an empty vec.
pub fn filter_by_year<'a, I>(rows: I, year: i32) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    rows.into_iter().filter(|r| r.year == year).collect()
}

/// Records with `start <= year <= end`.
pub fn filter_by_year_range<'a, I>(rows: I, start: i32, end: i32) -> Result<Vec<&'a Record>, QueryError>
where
    I: IntoIterator<Item = &'a Record>,
{
    if start > end {
        return Err(QueryError::InvalidParameter(format!(
            "year range {start}..={end} is inverted"
        )));
    }
    Ok(rows
        .into_iter()
        .filter(|r| (start..=end).contains(&r.year))
        .collect())
}

/// Records of one continent in one year.
///
/// The continent must be one the table knows about; an unknown continent is
/// a selector bug rather than an empty selection.
pub fn filter_by_continent_and_year<'a>(
    table: &'a Table,
    continent: &str,
    year: i32,
) -> Result<Vec<&'a Record>, QueryError> {
    if !table.has_continent(continent) {
        return Err(QueryError::InvalidParameter(format!(
            "unknown continent '{continent}'"
        )));
    }
    Ok(table
        .iter()
        .filter(|r| r.year == year && r.continent == continent)
        .collect())
}

/// Records whose country is one of `countries`. Unknown countries simply
/// match nothing.
pub fn filter_by_countries<'a, I, S>(rows: I, countries: &[S]) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
    S: AsRef<str>,
{
    let wanted: BTreeSet<&str> = countries.iter().map(AsRef::as_ref).collect();
    rows.into_iter()
        .filter(|r| wanted.contains(r.country.as_str()))
        .collect()
}
