//! CSV loading with column coercion

use crate::error::{EmissionsError, Result};
use polars::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufReader};

/// Loads the vehicle CSV into a DataFrame.
///
/// Numeric columns come back typed by schema inference. The emissions flag
/// column holds the literal string `TRUE` for a passed test; it is coerced to
/// 1.0, anything else to 0.0.
pub struct DatasetLoader {
    /// Column coerced from a TRUE/other flag to 1.0/0.0
    flag_column: String,
}

impl Default for DatasetLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetLoader {
    /// Create a loader with the default flag column (`passedemissions`)
    pub fn new() -> Self {
        Self {
            flag_column: "passedemissions".to_string(),
        }
    }

    /// Override the flag column name
    pub fn with_flag_column(mut self, name: impl Into<String>) -> Self {
        self.flag_column = name.into();
        self
    }

    /// Load a CSV file and coerce the flag column
    pub fn load(&self, path: &str) -> Result<DataFrame> {
        let file = File::open(path)
            .map_err(|e| EmissionsError::DataError(format!("failed to open {}: {}", path, e)))?;

        let mut df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(100))
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|e| EmissionsError::DataError(format!("failed to parse {}: {}", path, e)))?;

        self.coerce_flag_column(&mut df)?;
        Ok(df)
    }

    /// Quick row/column probe without a full parse
    pub fn file_info(&self, path: &str) -> Result<FileInfo> {
        let file = File::open(path)
            .map_err(|e| EmissionsError::DataError(format!("failed to open {}: {}", path, e)))?;
        let reader = BufReader::new(file);
        let mut lines = reader.lines();

        let header = lines
            .next()
            .transpose()
            .map_err(|e| EmissionsError::DataError(format!("failed to read {}: {}", path, e)))?
            .unwrap_or_default();

        let columns: Vec<String> = header.split(',').map(|s| s.trim().to_string()).collect();
        let n_cols = columns.len();
        let n_rows = lines.count();

        Ok(FileInfo {
            path: path.to_string(),
            n_rows,
            n_cols,
            columns,
        })
    }

    /// Map the flag column onto {0.0, 1.0}.
    ///
    /// Schema inference may have typed it Boolean (pure TRUE/FALSE files) or
    /// String (anything else); both land on the same encoding. An absent flag
    /// column is left alone — downstream projection yields NaN for it.
    fn coerce_flag_column(&self, df: &mut DataFrame) -> Result<()> {
        let series = match df.column(&self.flag_column) {
            Ok(column) => column.as_materialized_series().clone(),
            Err(_) => return Ok(()),
        };

        let coerced = match series.dtype() {
            DataType::String => {
                let ca = series.str()?;
                let mapped: Float64Chunked = ca
                    .into_iter()
                    .map(|v| Some(if v == Some("TRUE") { 1.0 } else { 0.0 }))
                    .collect();
                mapped
                    .with_name(self.flag_column.as_str().into())
                    .into_series()
            }
            _ => series.cast(&DataType::Float64)?,
        };

        df.with_column(coerced)?;
        Ok(())
    }
}

/// File information from a header probe
#[derive(Debug, Clone)]
pub struct FileInfo {
    pub path: String,
    pub n_rows: usize,
    pub n_cols: usize,
    pub columns: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_cars_csv() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "horsepower,weight,mpg,passedemissions").unwrap();
        writeln!(file, "130,1.75,18,TRUE").unwrap();
        writeln!(file, "165,1.84,15,FALSE").unwrap();
        writeln!(file, "150,1.72,16,maybe").unwrap();
        file
    }

    #[test]
    fn test_load_coerces_flag_column() {
        let file = create_cars_csv();
        let loader = DatasetLoader::new();

        let df = loader.load(file.path().to_str().unwrap()).unwrap();

        assert_eq!(df.height(), 3);
        let flag = df.column("passedemissions").unwrap().f64().unwrap();
        let values: Vec<f64> = flag.into_iter().map(|v| v.unwrap()).collect();
        assert_eq!(values, vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_load_pure_boolean_flag() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "horsepower,passedemissions").unwrap();
        writeln!(file, "130,TRUE").unwrap();
        writeln!(file, "165,FALSE").unwrap();

        let loader = DatasetLoader::new();
        let df = loader.load(file.path().to_str().unwrap()).unwrap();

        let flag = df.column("passedemissions").unwrap().f64().unwrap();
        let values: Vec<f64> = flag.into_iter().map(|v| v.unwrap()).collect();
        assert_eq!(values, vec![1.0, 0.0]);
    }

    #[test]
    fn test_missing_file_error_names_path() {
        let loader = DatasetLoader::new();
        let err = loader.load("/no/such/cars.csv").unwrap_err();
        assert!(err.to_string().contains("/no/such/cars.csv"));
    }

    #[test]
    fn test_file_info() {
        let file = create_cars_csv();
        let loader = DatasetLoader::new();

        let info = loader.file_info(file.path().to_str().unwrap()).unwrap();

        assert_eq!(info.n_rows, 3);
        assert_eq!(info.n_cols, 4);
        assert_eq!(info.columns[3], "passedemissions");
    }
}
