//! Data loading utilities
//!
//! CSV in and out of the pipeline: the historical patient file, and the
//! engineered feature table handed from feature engineering to training.

use crate::error::{ReadmitError, Result};
use crate::preprocessing::{FeatureTable, RawField, RawRecord, ID_COLUMN, TARGET_COLUMN};
use ndarray::Array2;
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Feature matrix with the raw target column, as consumed by training
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledTable {
    pub columns: Vec<String>,
    pub features: Array2<f64>,
    pub labels: Vec<Option<String>>,
    pub target_column: String,
}

impl LabeledTable {
    pub fn n_rows(&self) -> usize {
        self.features.nrows()
    }
}

impl TryFrom<FeatureTable> for LabeledTable {
    type Error = ReadmitError;

    fn try_from(table: FeatureTable) -> Result<Self> {
        let n_rows = table.n_rows();
        let n_cols = table.n_columns();
        let flat: Vec<f64> = table.rows.into_iter().flatten().collect();
        Ok(Self {
            columns: table.columns,
            features: Array2::from_shape_vec((n_rows, n_cols), flat)?,
            labels: table.labels,
            target_column: TARGET_COLUMN.to_string(),
        })
    }
}

fn read_csv(path: &Path, infer_schema_length: Option<usize>) -> Result<DataFrame> {
    let file = File::open(path)?;
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(infer_schema_length)
        .into_reader_with_file_handle(file)
        .finish()
        .map_err(|e| ReadmitError::DataError(format!("{}: {}", path.display(), e)))
}

/// Read the historical patient CSV. Header whitespace is stripped; columns
/// that do not name a raw field are ignored.
pub fn load_raw_records(path: impl AsRef<Path>) -> Result<Vec<RawRecord>> {
    let path = path.as_ref();
    let start = Instant::now();
    let df = read_csv(path, Some(0))?;

    let mut records = vec![RawRecord::new(); df.height()];
    let mut mapped = 0;
    for column in df.get_columns() {
        let name = column.name().as_str();
        let Some(field) = RawField::from_column_name(name) else {
            debug!(column = name.trim(), "Ignoring unrecognised column");
            continue;
        };
        mapped += 1;
        // canonical header beats its aliases; an alias only fills empty cells
        let canonical = name.trim() == field.column_name();

        let series = column.as_materialized_series().cast(&DataType::String)?;
        for (record, value) in records.iter_mut().zip(series.str()?.into_iter()) {
            let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
                continue;
            };
            if canonical || record.get(field).is_none() {
                record.set(field, Some(value.to_string()));
            }
        }
    }

    if mapped == 0 {
        return Err(ReadmitError::DataError(format!(
            "{} has no recognised patient columns",
            path.display()
        )));
    }

    info!(
        path = %path.display(),
        rows = records.len(),
        columns = mapped,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Loaded raw patient records"
    );
    Ok(records)
}

/// Persist the engineered table: identifier, feature columns, raw target
pub fn write_feature_table(table: &FeatureTable, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut columns = Vec::with_capacity(table.n_columns() + 2);

    let ids: Vec<Option<&str>> = table.ids.iter().map(|id| id.as_deref()).collect();
    columns.push(Column::new(ID_COLUMN.into(), ids));

    for (idx, name) in table.columns.iter().enumerate() {
        let values: Vec<f64> = table.rows.iter().map(|row| row[idx]).collect();
        columns.push(Column::new(name.as_str().into(), values));
    }

    let labels: Vec<Option<&str>> = table.labels.iter().map(|l| l.as_deref()).collect();
    columns.push(Column::new(TARGET_COLUMN.into(), labels));

    let mut df = DataFrame::new(columns)?;
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).finish(&mut df)?;

    info!(path = %path.display(), rows = table.n_rows(), features = table.n_columns(), "Wrote feature table");
    Ok(())
}

fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float64
            | DataType::Float32
            | DataType::Int64
            | DataType::Int32
            | DataType::UInt64
            | DataType::UInt32
    )
}

/// Read an engineered feature table. The first present target candidate is
/// the label; the identifier and target are dropped and only numeric columns
/// become features (nulls read as 0).
pub fn load_feature_table(path: impl AsRef<Path>, target_candidates: &[String]) -> Result<LabeledTable> {
    let path = path.as_ref();
    let df = read_csv(path, None)?;

    let target_column = target_candidates
        .iter()
        .find(|candidate| df.get_column_names().iter().any(|c| c.as_str() == candidate.as_str()))
        .cloned()
        .ok_or_else(|| {
            ReadmitError::FeatureNotFound(format!(
                "none of the target columns {:?} in {}",
                target_candidates,
                path.display()
            ))
        })?;

    let labels: Vec<Option<String>> = {
        let series = df
            .column(&target_column)?
            .as_materialized_series()
            .cast(&DataType::String)?;
        series.str()?.into_iter().map(|v| v.map(str::to_string)).collect()
    };

    let mut columns = Vec::new();
    let mut values: Vec<Vec<f64>> = Vec::new();
    for column in df.get_columns() {
        let name = column.name().as_str();
        if name == ID_COLUMN || name == target_column {
            continue;
        }
        if !is_numeric(column.dtype()) {
            debug!(column = name, dtype = ?column.dtype(), "Skipping non-numeric column");
            continue;
        }
        let series = column.as_materialized_series().cast(&DataType::Float64)?;
        values.push(series.f64()?.into_iter().map(|v| v.unwrap_or(0.0)).collect());
        columns.push(name.to_string());
    }

    let n_rows = df.height();
    let features = Array2::from_shape_fn((n_rows, columns.len()), |(i, j)| values[j][i]);

    info!(
        path = %path.display(),
        rows = n_rows,
        features = columns.len(),
        target = %target_column,
        "Loaded feature table"
    );
    Ok(LabeledTable { columns, features, labels, target_column })
}
