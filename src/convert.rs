//! Rewriting fragment-size columns as blot positions.
//!
//! A column is a fragment-size column if its name ends in `_H` (heavy) or
//! `_L` (light) fragment and every non-missing cell is a number. Each such
//! cell is replaced by its interpolated blot position; everything else is
//! written back verbatim.

use regex::Regex;

use crate::curve::SizeCurve;
use crate::error::BlotError;
use crate::numeric::{format_float, is_missing, parse_cell};
use crate::table::Table;

/// Column names of light and heavy fragment sizes, e.g. `EcoRI_L`, `EcoRI_H`.
pub const FRAGMENT_COLUMN_PATTERN: &str = r"^.+_(H|L)$";

/// Indices of the columns holding numeric fragment sizes.
pub fn fragment_size_columns(table: &Table) -> Result<Vec<usize>, BlotError> {
    let pattern = Regex::new(FRAGMENT_COLUMN_PATTERN)?;
    Ok(table
        .headers
        .iter()
        .enumerate()
        .filter(|(_, name)| pattern.is_match(name))
        .filter(|(i, name)| {
            let numeric = table.column(*i).all(|cell| parse_cell(cell).is_ok());
            if !numeric {
                log::debug!("column '{}' is not numeric, leaving it as is", name);
            }
            numeric
        })
        .map(|(i, _)| i)
        .collect())
}

/// Replace every fragment size in the selected columns by its blot position.
///
/// Returns the names of the converted columns; an empty list means the table
/// was left untouched.
pub fn convert_table(table: &mut Table, curve: &SizeCurve) -> Result<Vec<String>, BlotError> {
    let columns = fragment_size_columns(table)?;
    for row in table.rows.iter_mut() {
        for &col in &columns {
            let cell = &mut row[col];
            if is_missing(cell) {
                continue;
            }
            // selection guarantees every non-missing cell parses
            if let Ok(Some(size)) = parse_cell(cell) {
                *cell = format_float(curve.position_at(size));
            }
        }
    }
    Ok(columns.iter().map(|&i| table.headers[i].clone()).collect())
}

/// Convert the fragment-size columns of `enzyme_file` and write the result
/// to `output`.
pub fn convert_file(enzyme_file: &str, curve: &SizeCurve, output: &str) -> Result<(), BlotError> {
    let mut table = Table::from_csv(enzyme_file)?;
    let converted = convert_table(&mut table, curve)?;
    if converted.is_empty() {
        log::warn!(
            "no numeric columns ending in _H or _L in '{}'; writing an unmodified copy",
            enzyme_file
        );
    } else {
        log::debug!("converted columns: {}", converted.join(", "));
    }
    table.write_csv(output)?;
    log::info!(
        "Converted {} columns of {} rows; written to {}",
        converted.len(),
        table.len(),
        output
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::assert_float_eq;
    use tempfile::tempdir;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn two_point() -> SizeCurve {
        SizeCurve::new(&[(1.0, 10.0), (2.0, 20.0)]).unwrap()
    }

    #[test]
    fn test_column_selection() {
        let table = Table::new(
            "memory",
            strings(&["X_H", "Y_H", "X_Z", "Z_L"]),
            vec![
                strings(&["1", "strong", "1", "2"]),
                strings(&["2", "weak", "2", "N/A"]),
            ],
        );
        assert_eq!(fragment_size_columns(&table).unwrap(), vec![0, 3]);
    }

    #[test]
    fn test_suffix_must_follow_underscore() {
        let table = Table::new(
            "memory",
            strings(&["XH", "_L", "A_HL"]),
            vec![strings(&["1", "1", "1"])],
        );
        assert!(fragment_size_columns(&table).unwrap().is_empty());
    }

    #[test]
    fn test_convert_values() {
        let mut table = Table::new(
            "memory",
            strings(&["IntegrationSite", "EcoRI_H", "Note"]),
            vec![strings(&["IS1", "1", "a"]), strings(&["IS2", "2", "b"])],
        );
        let converted = convert_table(&mut table, &two_point()).unwrap();
        assert_eq!(converted, vec!["EcoRI_H"]);

        let values: Vec<f64> = table.column(1).map(|c| c.parse().unwrap()).collect();
        assert_float_eq(values[0], 10.0, 1e-12);
        assert_float_eq(values[1], 20.0, 1e-12);
        assert_eq!(table.column(0).collect::<Vec<_>>(), vec!["IS1", "IS2"]);
        assert_eq!(table.column(2).collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_missing_cells_kept() {
        let mut table = Table::new(
            "memory",
            strings(&["EcoRI_L"]),
            vec![strings(&["1.5"]), strings(&["N/A"])],
        );
        convert_table(&mut table, &two_point()).unwrap();
        assert_eq!(table.rows, vec![strings(&["15"]), strings(&["N/A"])]);
    }

    #[test]
    fn test_convert_file() {
        let curve = SizeCurve::from_csv("tests/data/size_position.csv").unwrap();
        let dir = tempdir().unwrap();
        let output = dir.path().join("converted.csv");
        let output = output.to_str().unwrap();

        convert_file("tests/data/fragment_sizes.csv", &curve, output).unwrap();

        let original = Table::from_csv("tests/data/fragment_sizes.csv").unwrap();
        let converted = Table::from_csv(output).unwrap();
        assert_eq!(converted.headers, original.headers);
        assert_eq!(converted.len(), original.len());

        let ecori_l = converted.require_column("EcoRI_L").unwrap();
        assert_eq!(converted.rows[0][ecori_l], "5.5");
        let chrom = converted.require_column("Chromosome").unwrap();
        assert_eq!(
            converted.column(chrom).collect::<Vec<_>>(),
            original.column(chrom).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_convert_file_keeps_padded_cells() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("padded.csv");
        std::fs::write(&input, "Note,EcoRI_H,BamHI_L \n\" keep me \",1,2\n").unwrap();
        let output = dir.path().join("padded_out.csv");
        let output = output.to_str().unwrap();

        convert_file(input.to_str().unwrap(), &two_point(), output).unwrap();

        let converted = Table::from_csv(output).unwrap();
        assert_eq!(converted.headers, strings(&["Note", "EcoRI_H", "BamHI_L "]));
        assert_eq!(converted.rows, vec![strings(&[" keep me ", "10", "2"])]);
    }

    #[test]
    fn test_no_matching_columns_copies() {
        let curve = SizeCurve::from_csv("tests/data/size_position.csv").unwrap();
        let dir = tempdir().unwrap();
        let output = dir.path().join("copy.csv");
        let output = output.to_str().unwrap();

        convert_file("tests/data/enzyme_sizes.csv", &curve, output).unwrap();

        let original = Table::from_csv("tests/data/enzyme_sizes.csv").unwrap();
        let copy = Table::from_csv(output).unwrap();
        assert_eq!(copy.headers, original.headers);
        assert_eq!(copy.rows, original.rows);
    }
}
