use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use csv::StringRecord;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::{Map, Number, Value as JsonValue};

use super::model::{Column, Record};
use super::table::Table;
use crate::error::DataLoadError;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Loader knobs that the file extension cannot express.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Field delimiter for delimited text files; defaults by extension.
    pub delimiter: Option<u8>,
}

/// Load the dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.txt` – comma-delimited with a header row
/// * `.tsv`          – tab-delimited with a header row
/// * `.json`         – `[{ "country": ..., "year": ..., ... }, ...]`
/// * `.parquet`      – flat columns of strings and numbers
pub fn load(path: &Path) -> Result<Table, DataLoadError> {
    load_with(path, &LoadOptions::default())
}

pub fn load_with(path: &Path, options: &LoadOptions) -> Result<Table, DataLoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let records = match ext.as_str() {
        "csv" | "txt" => read_delimited(open(path)?, options.delimiter.unwrap_or(b','))?,
        "tsv" => read_delimited(open(path)?, options.delimiter.unwrap_or(b'\t'))?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(DataLoadError::UnsupportedFormat(other.to_string())),
    };

    let table = finish(records)?;
    log::info!(
        "Loaded {} records from {} ({} countries, {} continents)",
        table.len(),
        path.display(),
        table.countries().len(),
        table.continents().len()
    );
    Ok(table)
}

/// Parse delimited text from any reader into a table.
pub fn read_csv<R: Read>(reader: R, delimiter: u8) -> Result<Table, DataLoadError> {
    finish(read_delimited(reader, delimiter)?)
}

fn open(path: &Path) -> Result<File, DataLoadError> {
    File::open(path).map_err(|source| DataLoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn finish(records: Vec<Record>) -> Result<Table, DataLoadError> {
    if records.is_empty() {
        return Err(DataLoadError::Empty);
    }
    Ok(Table::from_records(
        records.into_iter().map(Record::normalize_missing).collect(),
    ))
}

// ---------------------------------------------------------------------------
// Header normalisation
// ---------------------------------------------------------------------------

/// Raw header spellings seen in the wild, compared after [`header_key`].
const ALIASES: &[(Column, &[&str])] = &[
    (Column::Country, &["countryname", "name"]),
    (Column::Year, &["time", "date"]),
    (Column::LifeExpectancy, &["lifeexp", "lifeexpectancyyears"]),
    (
        Column::ChildMortality,
        &["childmortalityper1000born", "childmortality0to5yearoldsdyingper1000born"],
    ),
    (
        Column::Income,
        &["incomeperperson", "gdppercap", "gdppercapita", "incomepercapita"],
    ),
    (Column::Population, &["pop", "populationtotal"]),
    (
        Column::Co2Emission,
        &["co2", "co2emissions", "co2emissionstonnesperperson"],
    ),
    (Column::HumanDevelopmentIndex, &["hdi"]),
    (Column::HivCases, &["hiv", "numberofhivcases", "newhivinfections"]),
    (Column::Continent, &["region"]),
];

/// Lower-case and keep only ASCII alphanumerics.
fn header_key(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Map one raw header to its canonical column, if recognised.
pub fn column_for_header(raw: &str) -> Option<Column> {
    let key = header_key(raw);
    Column::ALL.iter().copied().find(|&col| {
        header_key(col.name()) == key
            || header_key(col.label()) == key
            || ALIASES
                .iter()
                .any(|(c, aliases)| *c == col && aliases.contains(&key.as_str()))
    })
}

/// Resolve every raw header to a canonical column (or `None` to ignore it).
///
/// When `allow_positional` is set and not a single header is recognised,
/// a header of exactly ten fields is renamed in canonical order. Once any
/// header matches, an unresolved required column is an error.
pub fn resolve_headers(
    headers: &[&str],
    allow_positional: bool,
) -> Result<Vec<Option<Column>>, DataLoadError> {
    let mut mapping: Vec<Option<Column>> = Vec::with_capacity(headers.len());
    for raw in headers {
        let col = column_for_header(raw).filter(|c| !mapping.contains(&Some(*c)));
        if col.is_none() {
            log::warn!("Ignoring unrecognised or duplicate column '{raw}'");
        }
        mapping.push(col);
    }

    let first_missing = Column::ALL
        .iter()
        .copied()
        .find(|c| !mapping.contains(&Some(*c)));

    match first_missing {
        None => Ok(mapping),
        Some(_)
            if allow_positional
                && headers.len() == Column::ALL.len()
                && mapping.iter().all(Option::is_none) =>
        {
            log::warn!(
                "Header {headers:?} not recognised, renaming columns positionally"
            );
            Ok(Column::ALL.iter().copied().map(Some).collect())
        }
        Some(col) => Err(DataLoadError::MissingColumn(col.name())),
    }
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

fn read_delimited<R: Read>(reader: R, delimiter: u8) -> Result<Vec<Record>, DataLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let raw = reader.headers()?.clone();
    let raw_fields: Vec<&str> = raw.iter().collect();
    let mapping = resolve_headers(&raw_fields, true)?;

    // Rename to canonical names so serde can match struct fields.
    let canonical: StringRecord = mapping
        .iter()
        .enumerate()
        .map(|(i, col)| match col {
            Some(c) => c.name().to_string(),
            None => format!("__ignored_{i}"),
        })
        .collect();
    reader.set_headers(canonical.clone());

    let mut records = Vec::new();
    for result in reader.deserialize::<Record>() {
        records.push(result.map_err(|e| csv_error(e, &canonical))?);
    }
    Ok(records)
}

fn csv_error(err: csv::Error, headers: &StringRecord) -> DataLoadError {
    if let csv::ErrorKind::Deserialize { pos, err: de } = err.kind() {
        // Record 0 is the header, so the record index is the 1-based data row.
        let row = pos.as_ref().map_or(0, |p| p.record() as usize);
        let column = de
            .field()
            .and_then(|i| headers.get(i as usize))
            .unwrap_or("?")
            .to_string();
        return DataLoadError::Malformed {
            row,
            column,
            reason: de.kind().to_string(),
        };
    }
    DataLoadError::Csv(err)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "country": "Vietnam", "year": 2005, "income": 2000, "continent": "Asia" },
///   ...
/// ]
/// ```
///
/// Every record must carry `country`, `year` and `continent` (under any
/// recognised alias). An absent metric key and `null` both mean a missing
/// value.
fn load_json(path: &Path) -> Result<Vec<Record>, DataLoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| DataLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let root: JsonValue = serde_json::from_str(&text)?;

    let rows = root.as_array().ok_or_else(|| DataLoadError::Malformed {
        row: 0,
        column: "<root>".to_string(),
        reason: "expected a top-level array of records".to_string(),
    })?;

    let mut records = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let obj = row.as_object().ok_or_else(|| DataLoadError::Malformed {
            row: i + 1,
            column: "<row>".to_string(),
            reason: "not a JSON object".to_string(),
        })?;

        let canonical: Map<String, JsonValue> = obj
            .iter()
            .filter_map(|(k, v)| column_for_header(k).map(|c| (c.name().to_string(), v.clone())))
            .collect();
        // Identity keys are required in every record; metric keys may be absent.
        if let Some(col) = IDENTITY
            .iter()
            .find(|c| !canonical.contains_key(c.name()))
        {
            return Err(DataLoadError::MissingColumn(col.name()));
        }
        records.push(record_from_object(i + 1, canonical)?);
    }
    Ok(records)
}

const IDENTITY: [Column; 3] = [Column::Country, Column::Year, Column::Continent];

fn record_from_object(row: usize, obj: Map<String, JsonValue>) -> Result<Record, DataLoadError> {
    serde_json::from_value(JsonValue::Object(obj)).map_err(|e| DataLoadError::Malformed {
        row,
        column: "?".to_string(),
        reason: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a flat Parquet file, as written by `df.to_parquet()` (Pandas) or
/// `df.write_parquet()` (Polars). String columns hold country/continent
/// (plain, large, view or dictionary-encoded), integer or float columns
/// hold year and metrics.
fn load_parquet(path: &Path) -> Result<Vec<Record>, DataLoadError> {
    let file = open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result?;
        let schema = batch.schema();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        let mapping = resolve_headers(&names, true)?;
        let columns = batch
            .columns()
            .iter()
            .map(plain_strings)
            .collect::<Result<Vec<_>, _>>()?;

        for row in 0..batch.num_rows() {
            let row_no = records.len() + 1;
            let mut obj = Map::new();
            for (idx, col) in mapping.iter().enumerate() {
                let Some(col) = col else { continue };
                let value = arrow_cell(&columns[idx], row, *col).ok_or_else(|| {
                    DataLoadError::Malformed {
                        row: row_no,
                        column: col.name().to_string(),
                        reason: format!("unsupported type {:?}", columns[idx].data_type()),
                    }
                })?;
                obj.insert(col.name().to_string(), value);
            }
            records.push(record_from_object(row_no, obj)?);
        }
    }

    Ok(records)
}

/// Cast view and dictionary-encoded string columns to plain `Utf8`.
fn plain_strings(col: &ArrayRef) -> Result<ArrayRef, DataLoadError> {
    let is_text = |t: &DataType| {
        matches!(t, DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View)
    };
    match col.data_type() {
        DataType::Utf8View => Ok(cast(col, &DataType::Utf8)?),
        DataType::Dictionary(_, values) if is_text(values.as_ref()) => {
            Ok(cast(col, &DataType::Utf8)?)
        }
        _ => Ok(Arc::clone(col)),
    }
}

/// Convert a single Arrow cell to JSON; `None` for unsupported types.
fn arrow_cell(col: &ArrayRef, row: usize, column: Column) -> Option<JsonValue> {
    if col.is_null(row) {
        return Some(JsonValue::Null);
    }
    let value = match col.data_type() {
        DataType::Utf8 => JsonValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => JsonValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => JsonValue::from(col.as_primitive::<Int32Type>().value(row)),
        DataType::Int64 => JsonValue::from(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => float_cell(f64::from(col.as_primitive::<Float32Type>().value(row)), column),
        DataType::Float64 => float_cell(col.as_primitive::<Float64Type>().value(row), column),
        _ => return None,
    };
    Some(value)
}

/// Pandas stores integer columns with gaps as floats; years come back whole.
fn float_cell(v: f64, column: Column) -> JsonValue {
    if column == Column::Year && v.fract() == 0.0 {
        return JsonValue::from(v as i64);
    }
    Number::from_f64(v).map_or(JsonValue::Null, JsonValue::Number)
}
