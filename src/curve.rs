use ndarray::Array1;
use std::cmp::Ordering;

use crate::error::BlotError;
use crate::numeric::{interp1d, parse_cell};
use crate::table::Table;

/// The float type for fragment sizes and blot positions.
pub type BlotFloat = f64;

pub const SIZE_COLUMN: &str = "Size";
pub const POSITION_COLUMN: &str = "Position";

/// A size-to-position reference curve for a (virtual) blot.
///
/// The curve is a piecewise-linear mapping through the calibration points,
/// stored sorted by size. Queries outside the calibrated size range are
/// clamped to the position of the nearest end point.
#[derive(Debug, Clone, PartialEq)]
pub struct SizeCurve {
    /// The calibration sizes, strictly increasing.
    pub sizes: Vec<BlotFloat>,
    /// The blot position at each size.
    pub positions: Vec<BlotFloat>,
}

impl SizeCurve {
    /// Build a curve from (size, position) calibration points, in any order.
    ///
    /// Points repeated exactly are collapsed. At least two distinct sizes are
    /// needed, and a size may not map to two different positions.
    pub fn new(points: &[(BlotFloat, BlotFloat)]) -> Result<SizeCurve, BlotError> {
        if let Some((size, pos)) = points.iter().find(|(s, p)| s.is_nan() || p.is_nan()) {
            return Err(BlotError::ParseError(format!(
                "reference point ({}, {}) is not a number",
                size, pos
            )));
        }

        let mut points = points.to_vec();
        points.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

        let mut sizes: Vec<BlotFloat> = Vec::with_capacity(points.len());
        let mut positions: Vec<BlotFloat> = Vec::with_capacity(points.len());
        for (size, pos) in points {
            if sizes.last() == Some(&size) {
                if positions.last() != Some(&pos) {
                    return Err(BlotError::ConflictingReference(size));
                }
                continue;
            }
            sizes.push(size);
            positions.push(pos);
        }

        if sizes.len() < 2 {
            return Err(BlotError::InsufficientReferenceData(sizes.len()));
        }
        Ok(SizeCurve { sizes, positions })
    }

    /// Read a reference curve from a CSV file with `Size` and `Position` columns.
    ///
    /// Other columns are ignored. Rows with a missing size or position are
    /// skipped.
    ///
    /// ```text
    /// Size,Position
    /// 10000,1.2
    /// 5000,2.9
    /// 1000,6.4
    /// ```
    pub fn from_csv(filepath: &str) -> Result<SizeCurve, BlotError> {
        let table = Table::from_csv(filepath)?;
        SizeCurve::from_table(&table)
    }

    pub fn from_table(table: &Table) -> Result<SizeCurve, BlotError> {
        let size_idx = table.require_column(SIZE_COLUMN)?;
        let pos_idx = table.require_column(POSITION_COLUMN)?;

        let parse = |cell: &str, row: usize| {
            parse_cell(cell).map_err(|_| {
                BlotError::ParseError(format!(
                    "{}: row {} has non-numeric reference value '{}'",
                    table.source,
                    row + 1,
                    cell
                ))
            })
        };

        let mut points = Vec::with_capacity(table.len());
        for (i, row) in table.rows.iter().enumerate() {
            match (parse(&row[size_idx], i)?, parse(&row[pos_idx], i)?) {
                (Some(size), Some(pos)) => points.push((size, pos)),
                _ => log::debug!("{}: skipping incomplete reference row {}", table.source, i + 1),
            }
        }
        SizeCurve::new(&points)
    }

    /// The number of calibration points.
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Interpolate the blot position of a fragment of the specified size.
    ///
    /// A NaN size gives a NaN position.
    pub fn position_at(&self, size: BlotFloat) -> BlotFloat {
        if size.is_nan() {
            return BlotFloat::NAN;
        }
        interp1d(&self.sizes, &self.positions, size).unwrap_or(BlotFloat::NAN)
    }

    /// Interpolate the blot positions of several fragment sizes.
    pub fn positions_at(&self, sizes: &[BlotFloat]) -> Array1<BlotFloat> {
        sizes.iter().map(|&s| self.position_at(s)).collect()
    }

    /// Inverse lookup: the fragment size that runs to the specified position.
    ///
    /// Only defined when the positions are strictly monotonic in size.
    /// Positions outside the curve clamp to the end sizes.
    pub fn size_at(&self, position: BlotFloat) -> Result<BlotFloat, BlotError> {
        if position.is_nan() {
            return Ok(BlotFloat::NAN);
        }
        let increasing = self.positions.windows(2).all(|w| w[0] < w[1]);
        let decreasing = self.positions.windows(2).all(|w| w[0] > w[1]);

        let size = if increasing {
            interp1d(&self.positions, &self.sizes, position)
        } else if decreasing {
            let positions: Vec<BlotFloat> = self.positions.iter().rev().copied().collect();
            let sizes: Vec<BlotFloat> = self.sizes.iter().rev().copied().collect();
            interp1d(&positions, &sizes, position)
        } else {
            return Err(BlotError::NotMonotonic);
        };
        size.ok_or(BlotError::NotMonotonic)
    }

    /// The calibration points as (position, size) pairs, for labeling a
    /// position axis with sizes.
    pub fn ticks(&self) -> Vec<(BlotFloat, BlotFloat)> {
        self.positions
            .iter()
            .copied()
            .zip(self.sizes.iter().copied())
            .collect()
    }

    /// The (min, max) blot positions covered by the curve.
    pub fn position_range(&self) -> (BlotFloat, BlotFloat) {
        self.positions
            .iter()
            .fold((BlotFloat::INFINITY, BlotFloat::NEG_INFINITY), |(lo, hi), &p| {
                (lo.min(p), hi.max(p))
            })
    }
}
