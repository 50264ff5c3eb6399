use std::collections::{BTreeMap, BTreeSet};

use super::model::{Cells, Column, Record, Value};
use crate::error::QueryError;

// ---------------------------------------------------------------------------
// Table – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed distinct values per column.
/// Built once by the loader and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Table {
    records: Vec<Record>,
    /// For each column the sorted set of non-missing values.
    distinct: BTreeMap<Column, BTreeSet<Value>>,
}

impl Table {
    /// Build column indices from the loaded records.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut distinct: BTreeMap<Column, BTreeSet<Value>> =
            Column::ALL.iter().map(|&c| (c, BTreeSet::new())).collect();

        for rec in &records {
            for (col, values) in distinct.iter_mut() {
                let value = rec.value(*col);
                if !value.is_missing() {
                    values.insert(value);
                }
            }
        }

        Table { records, distinct }
    }

    /// Canonical column names in order.
    pub fn columns(&self) -> &'static [Column] {
        &Column::ALL
    }

    /// Resolve a caller-supplied column name.
    pub fn column(&self, name: &str) -> Result<Column, QueryError> {
        name.parse()
    }

    /// Sorted distinct non-missing values of a column, used to populate
    /// selector choices.
    pub fn distinct_values(&self, column: Column) -> &BTreeSet<Value> {
        // Every column is seeded in `from_records`.
        &self.distinct[&column]
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn continents(&self) -> Vec<String> {
        self.text_values(Column::Continent)
    }

    pub fn countries(&self) -> Vec<String> {
        self.text_values(Column::Country)
    }

    pub fn has_continent(&self, continent: &str) -> bool {
        self.distinct_values(Column::Continent)
            .contains(&Value::Text(continent.to_string()))
    }

    /// Smallest and largest year present, `None` for an empty table.
    pub fn year_range(&self) -> Option<(i32, i32)> {
        let years = self.distinct_values(Column::Year);
        let first = years.first()?.as_f64()? as i32;
        let last = years.last()?.as_f64()? as i32;
        Some((first, last))
    }

    fn text_values(&self, column: Column) -> Vec<String> {
        self.distinct_values(column)
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect()
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
