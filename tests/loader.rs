use std::fs;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, DictionaryArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Int32Type, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use tempfile::tempdir;

use gapminder_explorer::data::loader::{load, load_with, LoadOptions};
use gapminder_explorer::{Column, DataLoadError, Value};

const LABEL_HEADER: &str = "Country,Year,Life Expectancy,Child Mortality (per 1000 born),\
Income (per person),Population,CO2 emission (tonnes per person),Human Development Index,\
Number of HIV cases,Continent";

fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn loads_csv_with_label_headers() {
    let dir = tempdir().unwrap();
    let path = write(
        dir.path(),
        "gapminder.csv",
        &format!(
            "{LABEL_HEADER}\n\
             Vietnam,2005,73.5,23.6,2000,84000000,1.2,0.69,,Asia\n\
             Gabon,2005,60.1,,8000,1400000,,,,Africa\n"
        ),
    );

    let table = load(&path).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.continents(), vec!["Africa", "Asia"]);
    let gabon = &table.records()[1];
    assert_eq!(gabon.income, Some(8000.0));
    assert_eq!(gabon.child_mortality, None);
    assert!(table
        .distinct_values(Column::Year)
        .contains(&Value::Integer(2005)));
}

#[test]
fn loads_tsv_and_custom_delimiter() {
    let dir = tempdir().unwrap();
    let tsv_header = LABEL_HEADER.replace(',', "\t");
    let path = write(
        dir.path(),
        "gapminder.tsv",
        &format!("{tsv_header}\nChile\t1990\t73.5\t\t4500\t\t\t\t\tAmericas\n"),
    );
    let table = load(&path).unwrap();
    assert_eq!(table.records()[0].life_expectancy, Some(73.5));

    let semi_header = LABEL_HEADER.replace(',', ";");
    let path = write(
        dir.path(),
        "gapminder.txt",
        &format!("{semi_header}\nChile;1990;73.5;;4500;;;;;Americas\n"),
    );
    let options = LoadOptions {
        delimiter: Some(b';'),
    };
    let table = load_with(&path, &options).unwrap();
    assert_eq!(table.records()[0].income, Some(4500.0));
}

#[test]
fn positional_headers_are_renamed() {
    let dir = tempdir().unwrap();
    let path = write(
        dir.path(),
        "raw.csv",
        "c1,c2,c3,c4,c5,c6,c7,c8,c9,c10\nTuvalu,2005,,,1500,10000,,,,Oceania\n",
    );
    let table = load(&path).unwrap();
    let rec = &table.records()[0];
    assert_eq!(rec.country, "Tuvalu");
    assert_eq!(rec.population, Some(10000.0));
    assert_eq!(rec.continent, "Oceania");
}

#[test]
fn partly_recognised_header_is_not_renamed_positionally() {
    let dir = tempdir().unwrap();
    let path = write(
        dir.path(),
        "reordered.csv",
        "continent,year,life_expectancy,child_mortality,gdp,population,co2_emission,\
human_development_index,hiv_cases,country\n\
Asia,2005,73.5,,2000,,,,,Vietnam\n",
    );
    assert!(matches!(
        load(&path),
        Err(DataLoadError::MissingColumn("income"))
    ));
}

#[test]
fn missing_file_is_a_load_error() {
    let dir = tempdir().unwrap();
    assert!(matches!(
        load(&dir.path().join("absent.csv")),
        Err(DataLoadError::Io { .. })
    ));
}

#[test]
fn missing_column_is_a_load_error() {
    let dir = tempdir().unwrap();
    let path = write(dir.path(), "partial.csv", "country,year,income\nChad,2005,700\n");
    assert!(matches!(
        load(&path),
        Err(DataLoadError::MissingColumn("life_expectancy"))
    ));
}

#[test]
fn malformed_year_is_a_load_error() {
    let dir = tempdir().unwrap();
    let path = write(
        dir.path(),
        "bad.csv",
        &format!("{LABEL_HEADER}\nChad,two thousand,,,,,,,,Africa\n"),
    );
    match load(&path) {
        Err(DataLoadError::Malformed { row, column, .. }) => {
            assert_eq!(row, 1);
            assert_eq!(column, "year");
        }
        other => panic!("expected Malformed, got {other:?}"),
    }
}

#[test]
fn unsupported_extension() {
    let dir = tempdir().unwrap();
    let path = write(dir.path(), "data.xlsx", "");
    assert!(matches!(
        load(&path),
        Err(DataLoadError::UnsupportedFormat(ext)) if ext == "xlsx"
    ));
}

#[test]
fn loads_json_records() {
    let dir = tempdir().unwrap();
    let path = write(
        dir.path(),
        "gapminder.json",
        r#"[
            {"Country": "Vietnam", "Year": 2005, "Life Expectancy": 73.5,
             "Child Mortality (per 1000 born)": null, "Income (per person)": 2000,
             "Population": 84000000, "CO2 emission (tonnes per person)": null,
             "Human Development Index": 0.69, "Number of HIV cases": null,
             "Continent": "Asia"},
            {"Country": "Gabon", "Year": 2005, "Life Expectancy": null,
             "Child Mortality (per 1000 born)": null, "Income (per person)": 8000,
             "Population": null, "CO2 emission (tonnes per person)": null,
             "Human Development Index": null, "Number of HIV cases": 1200,
             "Continent": "Africa"}
        ]"#,
    );
    let table = load(&path).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.records()[0].human_development_index, Some(0.69));
    assert_eq!(table.records()[1].hiv_cases, Some(1200.0));
    assert_eq!(table.records()[1].population, None);
}

#[test]
fn json_without_required_key_is_rejected() {
    let dir = tempdir().unwrap();
    let path = write(dir.path(), "partial.json", r#"[{"country": "Chad", "year": 2005}]"#);
    assert!(matches!(load(&path), Err(DataLoadError::MissingColumn(_))));
}

#[test]
fn json_absent_metric_key_is_missing_in_any_row_order() {
    let full = r#"{"country": "Vietnam", "year": 2005, "life_expectancy": 73.5,
        "child_mortality": null, "income": 2000, "population": null,
        "co2_emission": null, "human_development_index": null, "hiv_cases": 10,
        "continent": "Asia"}"#;
    let partial = r#"{"country": "Gabon", "year": 2005, "income": 8000, "continent": "Africa"}"#;

    let dir = tempdir().unwrap();
    for (name, body) in [
        ("full_first.json", format!("[{full}, {partial}]")),
        ("partial_first.json", format!("[{partial}, {full}]")),
    ] {
        let path = write(dir.path(), name, &body);
        let table = load(&path).unwrap();
        assert_eq!(table.len(), 2);
        let gabon = table.iter().find(|r| r.country == "Gabon").unwrap();
        assert_eq!(gabon.income, Some(8000.0));
        assert_eq!(gabon.hiv_cases, None);
    }
}

#[test]
fn json_row_without_continent_is_rejected_anywhere() {
    let dir = tempdir().unwrap();
    let path = write(
        dir.path(),
        "late_gap.json",
        r#"[{"country": "Chile", "year": 1990, "continent": "Americas"},
            {"country": "Peru", "year": 1990}]"#,
    );
    assert!(matches!(
        load(&path),
        Err(DataLoadError::MissingColumn("continent"))
    ));
}

#[test]
fn loads_parquet_with_dictionary_strings() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("polars.parquet");

    let dict = |values: Vec<&str>| -> ArrayRef {
        Arc::new(values.into_iter().collect::<DictionaryArray<Int32Type>>())
    };
    let key_type = DataType::Dictionary(Box::new(DataType::Int32), Box::new(DataType::Utf8));
    let mut fields = vec![
        Field::new("country", key_type.clone(), false),
        Field::new("year", DataType::Int64, false),
    ];
    let mut columns: Vec<ArrayRef> = vec![
        dict(vec!["Chile", "Peru"]),
        Arc::new(Int64Array::from(vec![1990, 1990])),
    ];
    for metric in Column::METRICS {
        fields.push(Field::new(metric.name(), DataType::Float64, true));
        columns.push(Arc::new(Float64Array::from(vec![Some(1.0), None])));
    }
    fields.push(Field::new("continent", key_type, false));
    columns.push(dict(vec!["Americas", "Americas"]));

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();
    let mut writer = ArrowWriter::try_new(fs::File::create(&path).unwrap(), schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let table = load(&path).unwrap();
    assert_eq!(table.countries(), vec!["Chile", "Peru"]);
    assert_eq!(table.continents(), vec!["Americas"]);
    assert_eq!(table.records()[1].income, None);
}

#[test]
fn loads_parquet() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("gapminder.parquet");

    let mut fields = vec![
        Field::new("country", DataType::Utf8, false),
        Field::new("year", DataType::Int64, false),
    ];
    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(vec!["Vietnam", "Gabon"])),
        Arc::new(Int64Array::from(vec![2005, 2005])),
    ];
    for metric in Column::METRICS {
        fields.push(Field::new(metric.name(), DataType::Float64, true));
        let values = match metric {
            Column::Income => vec![Some(2000.0), Some(8000.0)],
            Column::Population => vec![Some(84.0e6), Some(f64::NAN)],
            _ => vec![None, None],
        };
        columns.push(Arc::new(Float64Array::from(values)));
    }
    fields.push(Field::new("continent", DataType::Utf8, false));
    columns.push(Arc::new(StringArray::from(vec!["Asia", "Africa"])));

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();
    let file = fs::File::create(&path).unwrap();
    let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let table = load(&path).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.records()[1].income, Some(8000.0));
    assert_eq!(table.records()[1].population, None);
    assert_eq!(table.records()[0].life_expectancy, None);
    assert_eq!(table.year_range(), Some((2005, 2005)));
}
