//! A header-keyed, string-celled CSV table.
//!
//! [`Table`] keeps every cell verbatim so that tables can be rewritten with
//! only the columns of interest touched.

use crate::error::BlotError;
use crate::file::{InputFile, OutputFile};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    /// Where the table was read from; used in error messages.
    pub source: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(source: &str, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            source: source.to_string(),
            headers,
            rows,
        }
    }

    /// Read a comma-delimited table with a header line.
    ///
    /// Headers and cells are kept verbatim, whitespace included.
    ///
    /// Short rows are padded with empty cells so every row has one cell per
    /// header; extra cells are an error.
    pub fn from_csv(filepath: &str) -> Result<Table, BlotError> {
        let mut rdr = InputFile::new(filepath).csv_reader(true, csv::Trim::None)?;
        let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();

        let mut rows = Vec::new();
        for (i, result) in rdr.records().enumerate() {
            let record = result?;
            if record.len() > headers.len() {
                return Err(BlotError::ParseError(format!(
                    "{}: row {} has {} fields but the header has {}",
                    filepath,
                    i + 1,
                    record.len(),
                    headers.len()
                )));
            }
            let mut row: Vec<String> = record.iter().map(|c| c.to_string()).collect();
            row.resize(headers.len(), String::new());
            rows.push(row);
        }

        Ok(Table::new(filepath, headers, rows))
    }

    /// Write the table as CSV. Paths ending in `.gz` are gzip-compressed.
    pub fn write_csv(&self, filepath: &str) -> Result<(), BlotError> {
        let mut writer = OutputFile::new(filepath).csv_writer()?;
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The index of a column, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// The index of a column, or a [`BlotError::MissingColumn`] naming it.
    pub fn require_column(&self, name: &str) -> Result<usize, BlotError> {
        self.column_index(name)
            .ok_or_else(|| BlotError::MissingColumn {
                column: name.to_string(),
                path: self.source.clone(),
            })
    }

    /// The index of the first of several accepted spellings of a column.
    pub fn require_any_column(&self, names: &[&str]) -> Result<usize, BlotError> {
        names
            .iter()
            .find_map(|name| self.column_index(name))
            .ok_or_else(|| BlotError::MissingColumn {
                column: names.join(" or "),
                path: self.source.clone(),
            })
    }

    /// Iterate over the cells of one column.
    pub fn column(&self, index: usize) -> impl Iterator<Item = &str> {
        self.rows.iter().map(move |row| row[index].as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_read_enzyme_table() {
        let table = Table::from_csv("tests/data/enzyme_sizes.csv").unwrap();
        assert_eq!(
            table.headers,
            vec!["IntegrationSite", "Chromosome", "Position", "EcoRI", "BamHI"]
        );
        assert_eq!(table.len(), 3);
        assert_eq!(table.require_column("EcoRI").unwrap(), 3);
    }

    #[test]
    fn test_missing_column_is_named() {
        let table = Table::from_csv("tests/data/enzyme_sizes.csv").unwrap();
        let err = table.require_column("Strand").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Strand"));
        assert!(msg.contains("tests/data/enzyme_sizes.csv"));
    }

    #[test]
    fn test_write_preserves_cells() {
        let table = Table::new(
            "memory",
            vec!["a".to_string(), "b".to_string()],
            vec![
                vec!["1".to_string(), "x y".to_string()],
                vec!["".to_string(), "N/A".to_string()],
            ],
        );
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let path = path.to_str().unwrap();
        table.write_csv(path).unwrap();

        let reread = Table::from_csv(path).unwrap();
        assert_eq!(reread.headers, table.headers);
        assert_eq!(reread.rows, table.rows);
    }
}
