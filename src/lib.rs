//! Query and aggregation layer over a country-level demographic dataset.
//!
//! The [`data`] module owns the read-only dataset store, the [`query`]
//! module turns selector parameters into the rows each chart needs.

pub mod config;
pub mod data;
pub mod error;
pub mod query;

pub use data::model::{Cells, Column, Record, Row, Value};
pub use data::table::Table;
pub use error::{DataLoadError, QueryError};
