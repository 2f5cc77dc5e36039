use genomap::GenomeMap;
use indexmap::IndexMap;

use crate::enzyme::{CHROM_COLUMN, GENOMIC_POSITION_COLUMN, SITE_COLUMN};
use crate::error::BlotError;
use crate::file::InputFile;
use crate::table::Table;

/// The integer type for genomic positions.
pub type Position = u64;

const MISSING: &str = "N/A";

/// The header of an enzyme's upstream distance column.
pub fn upstream_column(enzyme: &str) -> String {
    format!("{} UpstreamDist", enzyme)
}

/// The header of an enzyme's downstream distance column.
pub fn downstream_column(enzyme: &str) -> String {
    format!("{} DownstreamDist", enzyme)
}

/// A genomic location of interest, e.g. a vector integration site.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegrationSite {
    pub id: String,
    pub chrom: String,
    pub position: Position,
}

/// Distances from one site to the nearest cut sites of one enzyme.
#[derive(Debug, Clone, PartialEq)]
pub struct EnzymeDistance {
    pub enzyme: String,
    pub upstream: Option<Position>,
    pub downstream: Option<Position>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SiteDistances {
    pub site: IntegrationSite,
    pub distances: Vec<EnzymeDistance>,
}

fn parse_position(field: &str, filepath: &str, row: usize) -> Result<Position, BlotError> {
    field.parse().map_err(|_| {
        BlotError::ParseError(format!(
            "{}: row {}: failed to parse position from string: {}",
            filepath, row, field
        ))
    })
}

/// Read headerless three-field rows, skipping (with a warning) rows with any
/// other number of fields.
fn read_triples(filepath: &str, kind: &str) -> Result<Vec<(String, String, String)>, BlotError> {
    let mut rdr = InputFile::new(filepath).csv_reader(false, csv::Trim::All)?;
    let mut triples = Vec::new();
    for result in rdr.records() {
        let record = result?;
        if record.len() != 3 {
            log::warn!(
                "Skipping malformed {} row: {:?}",
                kind,
                record.iter().collect::<Vec<_>>()
            );
            continue;
        }
        triples.push((
            record[0].to_string(),
            record[1].to_string(),
            record[2].to_string(),
        ));
    }
    Ok(triples)
}

/// Storage for restriction enzyme cut sites: per enzyme, per chromosome,
/// the sorted cut positions.
pub struct CutSites {
    pub enzymes: IndexMap<String, GenomeMap<Vec<Position>>>,
}

impl CutSites {
    /// Read cut sites from a headerless CSV of `enzyme,chromosome,position` rows.
    ///
    /// ```text
    /// EcoRI,chr1,1200
    /// EcoRI,chr1,5400
    /// BamHI,chr2,300
    /// ```
    ///
    /// Enzymes keep the order they are first seen in.
    pub fn from_csv(filepath: &str) -> Result<CutSites, BlotError> {
        let mut enzymes: IndexMap<String, GenomeMap<Vec<Position>>> = IndexMap::new();
        let triples = read_triples(filepath, "enzyme")?;
        for (i, (enzyme, chrom, position)) in triples.into_iter().enumerate() {
            let position = parse_position(&position, filepath, i + 1)?;
            let chrom_map = enzymes.entry(enzyme).or_insert_with(GenomeMap::new);
            if let Some(positions) = chrom_map.get_mut(&chrom) {
                positions.push(position);
            } else {
                chrom_map.insert(&chrom, vec![position])?;
            }
        }

        for chrom_map in enzymes.values_mut() {
            for positions in chrom_map.values_mut() {
                positions.sort_unstable();
            }
        }
        Ok(CutSites { enzymes })
    }

    /// Return the number of enzymes.
    pub fn len(&self) -> usize {
        self.enzymes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enzymes.is_empty()
    }

    /// The enzyme names, in first-seen order.
    pub fn enzyme_names(&self) -> Vec<String> {
        self.enzymes.keys().cloned().collect()
    }

    /// Distances from `site` to the closest cut site on either side, for
    /// every enzyme. Cuts exactly at the site are ignored.
    pub fn site_distances(&self, site: &IntegrationSite) -> SiteDistances {
        let distances = self
            .enzymes
            .iter()
            .map(|(enzyme, chrom_map)| {
                let (upstream, downstream) = match chrom_map.get(&site.chrom) {
                    Some(positions) => find_closest(positions, site.position),
                    None => (None, None),
                };
                EnzymeDistance {
                    enzyme: enzyme.clone(),
                    upstream: upstream.map(|up| site.position - up),
                    downstream: downstream.map(|down| down - site.position),
                }
            })
            .collect();
        SiteDistances {
            site: site.clone(),
            distances,
        }
    }

    pub fn distances(&self, sites: &[IntegrationSite]) -> Vec<SiteDistances> {
        sites.iter().map(|site| self.site_distances(site)).collect()
    }
}

/// Read integration sites from a headerless CSV of `site,chromosome,position` rows.
pub fn read_integration_sites(filepath: &str) -> Result<Vec<IntegrationSite>, BlotError> {
    read_triples(filepath, "integration")?
        .into_iter()
        .enumerate()
        .map(|(i, (id, chrom, position))| {
            Ok(IntegrationSite {
                id,
                chrom,
                position: parse_position(&position, filepath, i + 1)?,
            })
        })
        .collect()
}

/// The closest positions strictly below and strictly above `target` in the
/// sorted slice `positions`.
pub fn find_closest(
    positions: &[Position],
    target: Position,
) -> (Option<Position>, Option<Position>) {
    let below = positions.partition_point(|&p| p < target);
    let above = positions.partition_point(|&p| p <= target);
    let upstream = below.checked_sub(1).map(|i| positions[i]);
    let downstream = positions.get(above).copied();
    (upstream, downstream)
}

fn format_distance(distance: Option<Position>) -> String {
    distance.map_or_else(|| MISSING.to_string(), |d| d.to_string())
}

/// Lay distances out as a table: the site columns, then an upstream and a
/// downstream column per enzyme.
pub fn distances_table(rows: &[SiteDistances], enzymes: &[String]) -> Table {
    let mut headers = vec![
        SITE_COLUMN.to_string(),
        CHROM_COLUMN.to_string(),
        GENOMIC_POSITION_COLUMN.to_string(),
    ];
    for enzyme in enzymes {
        headers.push(upstream_column(enzyme));
        headers.push(downstream_column(enzyme));
    }

    let rows = rows
        .iter()
        .map(|row| {
            let mut cells = vec![
                row.site.id.clone(),
                row.site.chrom.clone(),
                row.site.position.to_string(),
            ];
            for dist in &row.distances {
                cells.push(format_distance(dist.upstream));
                cells.push(format_distance(dist.downstream));
            }
            cells
        })
        .collect();
    Table::new("distances", headers, rows)
}

/// Compute cut-site distances for every integration site and write them to
/// `output`. Nothing is written when there are no integration sites.
pub fn calc_distances(
    enzyme_file: &str,
    integration_file: &str,
    output: &str,
) -> Result<(), BlotError> {
    let cut_sites = CutSites::from_csv(enzyme_file)?;
    let sites = read_integration_sites(integration_file)?;
    log::debug!(
        "{} enzymes, {} integration sites",
        cut_sites.len(),
        sites.len()
    );

    let rows = cut_sites.distances(&sites);
    if rows.is_empty() {
        log::info!("No results to write.");
        return Ok(());
    }
    distances_table(&rows, &cut_sites.enzyme_names()).write_csv(output)?;
    log::info!("Distance results have been written to {}", output);
    Ok(())
}
