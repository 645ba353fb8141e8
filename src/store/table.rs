//! table.rs
//! Column-major numeric respondent data. Missing or non-numeric cells are `NaN`.

use crate::error::{AnalysisError, Result};
use std::collections::HashMap;
use xxhash_rust::xxh3::xxh3_64;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataTable {
    header: Vec<String>,
    columns: Vec<Vec<f64>>,
    rows: usize,
    index: HashMap<String, usize>,
}

impl DataTable {
    /// Builds a table from named numeric columns of equal length.
    pub fn from_columns<S: Into<String>>(columns: impl IntoIterator<Item = (S, Vec<f64>)>) -> Result<Self> {
        let mut table = Self::default();
        for (name, values) in columns {
            let name = name.into();
            if table.header.is_empty() {
                table.rows = values.len();
            } else if values.len() != table.rows {
                return Err(AnalysisError::MalformedTable(format!(
                    "column '{}' has {} rows, expected {}",
                    name,
                    values.len(),
                    table.rows
                )));
            }
            table.push_column(name, values)?;
        }
        Ok(table)
    }

    /// Builds a table from a header and textual rows, coercing every cell.
    ///
    /// Cells that do not parse as numbers become missing values. Short rows
    /// are padded with missing values; a row longer than the header is an
    /// error.
    pub fn from_text_rows<R, C>(header: &[&str], rows: impl IntoIterator<Item = R>) -> Result<Self>
    where
        R: IntoIterator<Item = C>,
        C: AsRef<str>,
    {
        let mut columns: Vec<Vec<f64>> = vec![Vec::new(); header.len()];
        for (row_idx, row) in rows.into_iter().enumerate() {
            let mut width = 0;
            for (col_idx, cell) in row.into_iter().enumerate() {
                let column = columns.get_mut(col_idx).ok_or_else(|| {
                    AnalysisError::MalformedTable(format!(
                        "row {} has more cells than the {} header columns",
                        row_idx + 1,
                        header.len()
                    ))
                })?;
                column.push(coerce_cell(cell.as_ref()));
                width = col_idx + 1;
            }
            for column in &mut columns[width..] {
                column.push(f64::NAN);
            }
        }
        Self::from_columns(header.iter().copied().zip(columns))
    }

    fn push_column(&mut self, name: String, values: Vec<f64>) -> Result<()> {
        if self.index.contains_key(&name) {
            return Err(AnalysisError::MalformedTable(format!("duplicate column '{}'", name)));
        }
        self.index.insert(name.clone(), self.columns.len());
        self.header.push(name);
        self.columns.push(values);
        Ok(())
    }

    pub fn row_count(&self) -> usize { self.rows }
    pub fn header(&self) -> &[String] { &self.header }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.index.get(name).map(|&i| self.columns[i].as_slice())
    }

    /// Resolves the named columns, failing with every absent name at once.
    pub fn select<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Result<Vec<&[f64]>> {
        let mut found = Vec::new();
        let mut missing = Vec::new();
        for name in names {
            match self.column(name) {
                Some(col) => found.push(col),
                None => missing.push(name.to_string()),
            }
        }
        if missing.is_empty() {
            Ok(found)
        } else {
            Err(AnalysisError::DataSchema { missing })
        }
    }

    /// Content hash identifying the data version a result was produced from.
    ///
    /// xxh3 over a little-endian encoding of the shape, header and cell bits,
    /// so the value is stable across platforms and toolchains.
    pub fn fingerprint(&self) -> u64 {
        xxh3_64(&self.fingerprint_bytes())
    }

    fn fingerprint_bytes(&self) -> Vec<u8> {
        let cells: usize = self.columns.iter().map(Vec::len).sum();
        let mut bytes = Vec::with_capacity(16 + cells * 8);
        bytes.extend_from_slice(&(self.rows as u64).to_le_bytes());
        for (name, column) in self.header.iter().zip(&self.columns) {
            bytes.extend_from_slice(&(name.len() as u64).to_le_bytes());
            bytes.extend_from_slice(name.as_bytes());
            for v in column {
                bytes.extend_from_slice(&v.to_bits().to_le_bytes());
            }
        }
        bytes
    }
}

/// Coerces one textual cell. Accepts a decimal comma (`"3,5"`).
pub fn coerce_cell(cell: &str) -> f64 {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return f64::NAN;
    }
    trimmed
        .parse::<f64>()
        .or_else(|_| trimmed.replace(',', ".").parse::<f64>())
        .unwrap_or(f64::NAN)
}

/// Indices of rows where every given column holds a finite value.
pub fn complete_rows(columns: &[&[f64]], rows: usize) -> Vec<usize> {
    (0..rows).filter(|&r| columns.iter().all(|c| c[r].is_finite())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("4", 4.0)]
    #[case(" 2.5 ", 2.5)]
    #[case("3,5", 3.5)]
    #[case("-1e2", -100.0)]
    fn test_numeric_cells_coerce(#[case] input: &str, #[case] expected: f64) {
        assert_eq!(coerce_cell(input), expected);
    }

    #[rstest]
    #[case("")]
    #[case("n/a")]
    #[case("agree")]
    #[case("1,2,3")]
    fn test_non_numeric_cells_become_missing(#[case] input: &str) {
        assert!(coerce_cell(input).is_nan());
    }

    #[test]
    fn test_text_rows_pad_short_rows() {
        let table = DataTable::from_text_rows(&["id", "x1", "x2"], vec![vec!["1", "4", "5"], vec!["2", "3"]]).unwrap();
        assert_eq!(table.row_count(), 2);
        assert!(table.column("x2").unwrap()[1].is_nan());
    }

    #[test]
    fn test_text_rows_reject_long_rows() {
        let err = DataTable::from_text_rows(&["x1"], vec![vec!["1", "2"]]).unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedTable(_)));
    }

    #[test]
    fn test_select_reports_all_missing_columns() {
        let table = DataTable::from_columns(vec![("x1", vec![1.0])]).unwrap();
        let err = table.select(["x1", "y1", "y2"]).unwrap_err();
        assert_eq!(err, AnalysisError::DataSchema { missing: vec!["y1".into(), "y2".into()] });
    }

    #[test]
    fn test_unequal_columns_rejected() {
        let err = DataTable::from_columns(vec![("a", vec![1.0, 2.0]), ("b", vec![1.0])]).unwrap_err();
        assert!(err.to_string().contains("column 'b' has 1 rows, expected 2"));
    }

    #[test]
    fn test_complete_rows_skip_any_missing() {
        let a = [1.0, f64::NAN, 3.0, 4.0];
        let b = [1.0, 2.0, f64::NAN, 4.0];
        assert_eq!(complete_rows(&[&a, &b], 4), vec![0, 3]);
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let t1 = DataTable::from_columns(vec![("a", vec![1.0, 2.0])]).unwrap();
        let t2 = DataTable::from_columns(vec![("a", vec![1.0, 2.5])]).unwrap();
        assert_eq!(t1.fingerprint(), t1.clone().fingerprint());
        assert_ne!(t1.fingerprint(), t2.fingerprint());
    }

    #[test]
    fn test_fingerprint_hashes_a_fixed_encoding() {
        let table = DataTable::from_columns(vec![("q1", vec![1.0, 2.0])]).unwrap();
        let mut expected = Vec::new();
        expected.extend_from_slice(&2u64.to_le_bytes());
        expected.extend_from_slice(&2u64.to_le_bytes());
        expected.extend_from_slice(b"q1");
        expected.extend_from_slice(&1.0f64.to_bits().to_le_bytes());
        expected.extend_from_slice(&2.0f64.to_bits().to_le_bytes());
        assert_eq!(table.fingerprint(), xxh3_64(&expected));
    }

    #[test]
    fn test_fingerprint_separates_header_from_cells() {
        let a = DataTable::from_columns(vec![("ab", vec![1.0]), ("c", vec![2.0])]).unwrap();
        let b = DataTable::from_columns(vec![("a", vec![1.0]), ("bc", vec![2.0])]).unwrap();
        assert_ne!(a.fingerprint(), b.fingerprint());
    }
}
