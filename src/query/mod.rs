//! Query layer: stateless filter, projection and aggregation operations
//! over the dataset store.
//!
//! Filters take any iterator of `&Record` (a `&Table` or the output of an
//! earlier filter) so they compose:
//!
//! ```ignore
//! let rows = filter_by_year_range(filter_by_countries(&table, &countries), 1995, 2005)?;
//! let max = max_of(&rows, Column::Population)?;
//! ```

pub mod aggregate;
pub mod filter;
pub mod project;

pub use aggregate::{
    group_by_continent_year_mean, max_of, shares, summarize, GroupMean, Share, Summary,
};
pub use filter::{
    filter_by_continent_and_year, filter_by_countries, filter_by_year, filter_by_year_range,
};
pub use project::{project, project_names, sort_rows, SortOrder};
