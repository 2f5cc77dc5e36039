//! Turning cut-site distances into light and heavy fragment sizes.
//!
//! For each enzyme, the light (`L`) and heavy (`H`) fragment around a site
//! runs either to the upstream or to the downstream cut site, as given per
//! site in a directions table. The fragment size is that distance plus the
//! enzyme's fixed L or H length. The output has one `<enzyme>_L` and one
//! `<enzyme>_H` column per enzyme, ready to be converted to blot positions.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::distances::{downstream_column, upstream_column, Position};
use crate::enzyme::{CHROM_COLUMN, GENOMIC_POSITION_COLUMN, SITE_COLUMN};
use crate::error::BlotError;
use crate::file::InputFile;
use crate::numeric::is_missing;
use crate::table::Table;

/// Older tables name the site column `IntegrationSite#`.
pub const LEGACY_SITE_COLUMN: &str = "IntegrationSite#";

const SITE_COLUMNS: [&str; 2] = [SITE_COLUMN, LEGACY_SITE_COLUMN];
const MISSING: &str = "N/A";

/// The fixed light and heavy fragment lengths of an enzyme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FragmentLengths {
    pub light: Position,
    pub heavy: Position,
}

/// Per site, the direction (`up` or `down`) of each `<enzyme>_<L|H>` fragment.
pub type Directions = IndexMap<String, IndexMap<String, String>>;

/// Read a CSV of enzyme fragment lengths with `Name`, `L` and `H` columns.
pub fn read_fragment_lengths(
    filepath: &str,
) -> Result<IndexMap<String, FragmentLengths>, BlotError> {
    let mut rdr = InputFile::new(filepath).csv_reader(true, csv::Trim::All)?;

    #[derive(Debug, Deserialize)]
    struct LengthEntry {
        #[serde(rename = "Name")]
        name: String,
        #[serde(rename = "L")]
        light: Position,
        #[serde(rename = "H")]
        heavy: Position,
    }

    let mut lengths = IndexMap::new();
    for result in rdr.deserialize() {
        let record: LengthEntry = result?;
        lengths.insert(
            record.name,
            FragmentLengths {
                light: record.light,
                heavy: record.heavy,
            },
        );
    }
    Ok(lengths)
}

/// Read a CSV of fragment directions, keyed by its site column.
pub fn read_directions(filepath: &str) -> Result<Directions, BlotError> {
    let table = Table::from_csv(filepath)?;
    let site_idx = table.require_any_column(&SITE_COLUMNS)?;

    let mut directions = Directions::new();
    for row in &table.rows {
        let site_directions = table
            .headers
            .iter()
            .zip(row)
            .enumerate()
            .filter(|(i, _)| *i != site_idx)
            .map(|(_, (name, value))| (name.clone(), value.clone()))
            .collect();
        directions.insert(row[site_idx].clone(), site_directions);
    }
    Ok(directions)
}

/// The distance column an `up` / `down` direction selects for an enzyme.
fn distance_column(enzyme: &str, direction: &str) -> Option<String> {
    if direction.eq_ignore_ascii_case("up") {
        Some(upstream_column(enzyme))
    } else if direction.eq_ignore_ascii_case("down") {
        Some(downstream_column(enzyme))
    } else {
        None
    }
}

/// Compute the light and heavy fragment sizes for every site of a
/// distances table.
///
/// A fragment is `N/A` when its direction is missing or unrecognized, or
/// when the selected distance is missing.
pub fn finalize(
    distances: &Table,
    directions: &Directions,
    lengths: &IndexMap<String, FragmentLengths>,
) -> Result<Table, BlotError> {
    let site_idx = distances.require_any_column(&SITE_COLUMNS)?;
    let chrom_idx = distances.require_column(CHROM_COLUMN)?;
    let pos_idx = distances.require_column(GENOMIC_POSITION_COLUMN)?;

    let mut headers = vec![
        SITE_COLUMN.to_string(),
        CHROM_COLUMN.to_string(),
        GENOMIC_POSITION_COLUMN.to_string(),
    ];
    for enzyme in lengths.keys() {
        headers.push(format!("{}_L", enzyme));
        headers.push(format!("{}_H", enzyme));
    }

    let no_directions = IndexMap::new();
    let mut rows = Vec::with_capacity(distances.len());
    for (i, row) in distances.rows.iter().enumerate() {
        let site = &row[site_idx];
        let site_directions = directions.get(site).unwrap_or(&no_directions);

        let mut cells = vec![site.clone(), row[chrom_idx].clone(), row[pos_idx].clone()];
        for (enzyme, fragment) in lengths {
            for (kind, length) in [("L", fragment.light), ("H", fragment.heavy)] {
                let direction = site_directions
                    .get(&format!("{}_{}", enzyme, kind))
                    .map(|d| d.trim())
                    .unwrap_or("");
                let distance = distance_column(enzyme, direction)
                    .and_then(|col| distances.column_index(&col))
                    .map(|col| row[col].as_str())
                    .filter(|cell| !is_missing(cell));

                let cell = match distance {
                    Some(cell) => {
                        let distance: Position = cell.trim().parse().map_err(|_| {
                            BlotError::ParseError(format!(
                                "{}: row {}: failed to parse {} distance from string: {}",
                                distances.source,
                                i + 1,
                                enzyme,
                                cell
                            ))
                        })?;
                        distance
                            .checked_add(length)
                            .ok_or_else(|| {
                                BlotError::ParseError(format!(
                                    "{}: row {}: {} distance {} plus fragment length {} overflows",
                                    distances.source,
                                    i + 1,
                                    enzyme,
                                    distance,
                                    length
                                ))
                            })?
                            .to_string()
                    }
                    None => MISSING.to_string(),
                };
                cells.push(cell);
            }
        }
        rows.push(cells);
    }
    Ok(Table::new("final distances", headers, rows))
}

/// Read the three input tables, compute the fragment sizes and write them to
/// `output`.
pub fn finalize_distances(
    lengths_file: &str,
    directions_file: &str,
    distances_file: &str,
    output: &str,
) -> Result<(), BlotError> {
    let lengths = read_fragment_lengths(lengths_file)?;
    let directions = read_directions(directions_file)?;
    let distances = Table::from_csv(distances_file)?;
    log::debug!(
        "{} enzymes, directions for {} sites, {} distance rows",
        lengths.len(),
        directions.len(),
        distances.len()
    );

    finalize(&distances, &directions, &lengths)?.write_csv(output)?;
    log::info!(
        "Final distances with lengths have been written to {}",
        output
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distances::calc_distances;
    use tempfile::tempdir;

    fn distances() -> Table {
        let dir = tempdir().unwrap();
        let output = dir.path().join("distances.csv");
        let output = output.to_str().unwrap();
        calc_distances(
            "tests/data/cut_sites.csv",
            "tests/data/integration_sites.csv",
            output,
        )
        .unwrap();
        Table::from_csv(output).unwrap()
    }

    #[test]
    fn test_read_fragment_lengths() {
        let lengths = read_fragment_lengths("tests/data/fragment_lengths.csv").unwrap();
        assert_eq!(lengths.keys().collect::<Vec<_>>(), vec!["EcoRI", "BamHI"]);
        assert_eq!(
            lengths["BamHI"],
            FragmentLengths {
                light: 50,
                heavy: 850
            }
        );
    }

    #[test]
    fn test_read_directions_legacy_site_column() {
        let directions = read_directions("tests/data/directions.csv").unwrap();
        assert_eq!(directions.len(), 2);
        assert_eq!(directions["IS1"]["EcoRI_H"], "down");
        assert!(!directions["IS1"].contains_key(LEGACY_SITE_COLUMN));
    }

    #[test]
    fn test_finalize() {
        let lengths = read_fragment_lengths("tests/data/fragment_lengths.csv").unwrap();
        let directions = read_directions("tests/data/directions.csv").unwrap();
        let table = finalize(&distances(), &directions, &lengths).unwrap();

        assert_eq!(
            table.headers,
            vec![
                "IntegrationSite",
                "Chromosome",
                "Position",
                "EcoRI_L",
                "EcoRI_H",
                "BamHI_L",
                "BamHI_H"
            ]
        );
        // upstream 1000 + L 100, downstream 4500 + H 1100, downstream 500 + L 50,
        // and no upstream BamHI site
        assert_eq!(
            table.rows[0],
            vec!["IS1", "chr1", "3500", "1100", "5600", "550", "N/A"]
        );
        // blank direction for BamHI_L
        assert_eq!(
            table.rows[1],
            vec!["IS2", "chr1", "500", "600", "N/A", "N/A", "N/A"]
        );
        // no directions at all for IS3
        assert_eq!(&table.rows[2][3..], &["N/A", "N/A", "N/A", "N/A"]);
    }

    #[test]
    fn test_finalize_fragment_size_overflow() {
        let table = Table::new(
            "memory",
            vec![
                "IntegrationSite".to_string(),
                "Chromosome".to_string(),
                "Position".to_string(),
                upstream_column("E"),
            ],
            vec![vec![
                "IS1".to_string(),
                "chr1".to_string(),
                "10".to_string(),
                u64::MAX.to_string(),
            ]],
        );
        let mut directions = Directions::new();
        directions.insert(
            "IS1".to_string(),
            IndexMap::from([("E_L".to_string(), "up".to_string())]),
        );
        let mut lengths = IndexMap::new();
        lengths.insert(
            "E".to_string(),
            FragmentLengths {
                light: 100,
                heavy: 100,
            },
        );

        let err = finalize(&table, &directions, &lengths).unwrap_err();
        assert!(matches!(err, BlotError::ParseError(ref msg) if msg.contains("overflows")));
    }

    #[test]
    fn test_finalize_requires_site_column() {
        let table = Table::new(
            "memory",
            vec!["Site".to_string(), "Chromosome".to_string(), "Position".to_string()],
            vec![],
        );
        let err = finalize(&table, &Directions::new(), &IndexMap::new()).unwrap_err();
        assert!(err.to_string().contains("IntegrationSite or IntegrationSite#"));
    }
}
