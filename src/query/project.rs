use std::cmp::Ordering;

use crate::data::model::{Cells, Column, Row};
use crate::error::QueryError;

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// Restrict rows to `columns`, in the given column order, keeping row order.
pub fn project<R: Cells>(rows: &[R], columns: &[Column]) -> Result<Vec<Row>, QueryError> {
    for (i, col) in columns.iter().enumerate() {
        if columns[..i].contains(col) {
            return Err(QueryError::InvalidParameter(format!(
                "column '{col}' requested twice"
            )));
        }
    }
    Ok(rows
        .iter()
        .map(|r| Row::new(columns.iter().map(|&c| (c, r.value(c))).collect()))
        .collect())
}

/// [`project`] with caller-supplied column names.
pub fn project_names<R: Cells>(rows: &[R], names: &[&str]) -> Result<Vec<Row>, QueryError> {
    let columns = names
        .iter()
        .map(|n| n.parse::<Column>())
        .collect::<Result<Vec<_>, _>>()?;
    project(rows, &columns)
}

// ---------------------------------------------------------------------------
// Sorting (data tables)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }
}

/// Stable sort on one column. Missing cells go last in either order.
pub fn sort_rows(rows: &mut [Row], column: Column, order: SortOrder) {
    rows.sort_by(|a, b| {
        let va = a.value(column);
        let vb = b.value(column);
        match (va.is_missing(), vb.is_missing()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => match order {
                SortOrder::Ascending => va.cmp(&vb),
                SortOrder::Descending => vb.cmp(&va),
            },
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Record, Value};

    fn records() -> Vec<Record> {
        vec![
            Record::new("Vietnam", 2005, "Asia").with(Column::Income, 2000.0),
            Record::new("Tuvalu", 2005, "Oceania"),
            Record::new("Gabon", 2005, "Africa").with(Column::Income, 8000.0),
        ]
    }

    #[test]
    fn projection_keeps_requested_column_order() {
        let rows = project(&records(), &[Column::Income, Column::Country]).unwrap();
        assert_eq!(rows.len(), 3);
        let cols: Vec<Column> = rows[0].columns().collect();
        assert_eq!(cols, vec![Column::Income, Column::Country]);
        assert_eq!(rows[1].get(Column::Income), Some(&Value::Missing));
        assert_eq!(rows[0].get(Column::Year), None);
    }

    #[test]
    fn projection_of_all_columns_is_identity() {
        let recs = records();
        let rows = project(&recs, &Column::ALL).unwrap();
        let expected: Vec<Row> = recs.iter().map(Row::from).collect();
        assert_eq!(rows, expected);
    }

    #[test]
    fn duplicate_or_unknown_columns_are_rejected() {
        let recs = records();
        assert!(project(&recs, &[Column::Year, Column::Year]).is_err());
        assert!(matches!(
            project_names(&recs, &["country", "gdp"]),
            Err(QueryError::InvalidParameter(_))
        ));
        let rows = project_names(&recs, &["country", "Income (per person)"]).unwrap();
        assert_eq!(rows[2].get(Column::Income), Some(&Value::Number(8000.0)));
    }

    #[test]
    fn sort_puts_missing_last_both_ways() {
        let mut rows = project(&records(), &[Column::Country, Column::Income]).unwrap();

        sort_rows(&mut rows, Column::Income, SortOrder::Descending);
        let order: Vec<Value> = rows.iter().map(|r| r.value(Column::Country)).collect();
        assert_eq!(
            order,
            vec![
                Value::Text("Gabon".into()),
                Value::Text("Vietnam".into()),
                Value::Text("Tuvalu".into())
            ]
        );

        sort_rows(&mut rows, Column::Income, SortOrder::Ascending);
        assert_eq!(rows[0].value(Column::Country), Value::Text("Vietnam".into()));
        assert_eq!(rows[2].value(Column::Country), Value::Text("Tuvalu".into()));
    }
}
