//! Wide enzyme fragment-size tables and their long-form reshape.

use crate::curve::{BlotFloat, SizeCurve};
use crate::error::BlotError;
use crate::numeric::parse_cell;
use crate::table::Table;

pub const SITE_COLUMN: &str = "IntegrationSite";
pub const CHROM_COLUMN: &str = "Chromosome";
pub const GENOMIC_POSITION_COLUMN: &str = "Position";

/// One fragment: a (site, enzyme) pair with its size and blot position.
#[derive(Debug, Clone, PartialEq)]
pub struct LongRow {
    pub site: String,
    pub chrom: String,
    pub position: String,
    pub enzyme: String,
    pub size: BlotFloat,
    pub blot_position: BlotFloat,
}

/// A wide table of fragment sizes, one row per integration site and one
/// column per enzyme.
///
/// ```text
/// IntegrationSite,Chromosome,Position,EcoRI,BamHI
/// IS1,chr1,1500,3200,850
/// IS2,chr2,48210,N/A,4100
/// ```
#[derive(Debug)]
pub struct EnzymeTable {
    table: Table,
    site_idx: usize,
    chrom_idx: usize,
    position_idx: usize,
}

impl EnzymeTable {
    pub fn from_csv(filepath: &str) -> Result<EnzymeTable, BlotError> {
        EnzymeTable::from_table(Table::from_csv(filepath)?)
    }

    /// Wrap a table, checking that the identifier columns are present.
    pub fn from_table(table: Table) -> Result<EnzymeTable, BlotError> {
        let site_idx = table.require_column(SITE_COLUMN)?;
        let chrom_idx = table.require_column(CHROM_COLUMN)?;
        let position_idx = table.require_column(GENOMIC_POSITION_COLUMN)?;
        Ok(EnzymeTable {
            table,
            site_idx,
            chrom_idx,
            position_idx,
        })
    }

    fn is_id_column(&self, idx: usize) -> bool {
        idx == self.site_idx || idx == self.chrom_idx || idx == self.position_idx
    }

    /// The enzyme (size) column names, in file order.
    pub fn enzymes(&self) -> Vec<String> {
        self.table
            .headers
            .iter()
            .enumerate()
            .filter(|(i, _)| !self.is_id_column(*i))
            .map(|(_, h)| h.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Reshape into one [`LongRow`] per (site, enzyme) pair with a size,
    /// interpolating each size's blot position on `curve`.
    ///
    /// Missing sizes (empty, `N/A`, `NaN`) are skipped.
    pub fn to_long(&self, curve: &SizeCurve) -> Result<Vec<LongRow>, BlotError> {
        let enzyme_cols: Vec<usize> = (0..self.table.headers.len())
            .filter(|i| !self.is_id_column(*i))
            .collect();

        let mut long = Vec::with_capacity(self.len() * enzyme_cols.len());
        for (i, row) in self.table.rows.iter().enumerate() {
            for &col in &enzyme_cols {
                let enzyme = &self.table.headers[col];
                let size = parse_cell(&row[col]).map_err(|_| {
                    BlotError::ParseError(format!(
                        "{}: column '{}' row {} has non-numeric size '{}'",
                        self.table.source,
                        enzyme,
                        i + 1,
                        row[col]
                    ))
                })?;
                let Some(size) = size else {
                    log::debug!(
                        "no {} fragment for site {}, skipping",
                        enzyme,
                        row[self.site_idx]
                    );
                    continue;
                };
                long.push(LongRow {
                    site: row[self.site_idx].clone(),
                    chrom: row[self.chrom_idx].clone(),
                    position: row[self.position_idx].clone(),
                    enzyme: enzyme.clone(),
                    size,
                    blot_position: curve.position_at(size),
                });
            }
        }
        Ok(long)
    }
}
