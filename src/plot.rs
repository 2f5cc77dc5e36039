//! Rendering a virtual Southern blot.
//!
//! Each enzyme gets a lane along the X axis, drawn as a semi-transparent
//! band, and each (site, enzyme) fragment is a point in its lane at the blot
//! position interpolated from its size. The Y axis runs downwards like a gel
//! and is ticked at the reference curve's positions, labeled with the
//! reference sizes.

use indexmap::IndexMap;
use palette::{Hsl, IntoColor, Srgb};
use plotters::coord::ranged1d::{DefaultFormatting, KeyPointHint, Ranged};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::ops::Range;

use crate::curve::{BlotFloat, SizeCurve};
use crate::enzyme::LongRow;
use crate::error::BlotError;
use crate::numeric::format_float;

/// Where the figure goes when no output path is given.
pub const DEFAULT_PLOT_OUTPUT: &str = "virtual_southern_blot.png";

const LANE_HALF_WIDTH: BlotFloat = 0.4;
const BAND_ALPHA: f64 = 0.2;
const TICK_EPS: BlotFloat = 1e-9;

/// Figure options. Pixel dimensions are `width_in * dpi` by `height_in * dpi`,
/// and fonts and markers scale with `dpi`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotConfig {
    pub width_in: f64,
    pub height_in: f64,
    pub dpi: u32,
    pub title: String,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width_in: 10.0,
            height_in: 6.0,
            dpi: 100,
            title: "Virtual Southern blot".to_string(),
        }
    }
}

impl PlotConfig {
    pub fn pixel_size(&self) -> (u32, u32) {
        let dpi = self.dpi as f64;
        (
            (self.width_in * dpi).round().max(1.0) as u32,
            (self.height_in * dpi).round().max(1.0) as u32,
        )
    }

    /// Scale a size given at 100 dpi.
    fn scaled(&self, size: f64) -> f64 {
        size * self.dpi as f64 / 100.0
    }
}

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<RGBColor> {
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.45);
            let rgb: Srgb = hsl.into_color();
            RGBColor(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lane {
    pub enzyme: String,
    pub center: BlotFloat,
    pub color: RGBColor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlotPoint {
    pub lane: usize,
    pub site: String,
    pub x: BlotFloat,
    /// Blot position, negated so larger positions sit lower on the figure.
    pub y: BlotFloat,
}

/// The geometry of a blot figure, in chart coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct BlotLayout {
    pub lanes: Vec<Lane>,
    pub points: Vec<BlotPoint>,
    /// Y tick positions and their size labels.
    pub y_ticks: Vec<(BlotFloat, String)>,
    pub x_range: (BlotFloat, BlotFloat),
    pub y_range: (BlotFloat, BlotFloat),
}

impl BlotLayout {
    /// Lay out lanes for `enzymes` (in order) and for any further enzyme
    /// found only in `long`, then place one point per long row.
    pub fn new(long: &[LongRow], enzymes: &[String], curve: &SizeCurve) -> BlotLayout {
        let mut lane_index: IndexMap<&str, usize> = IndexMap::new();
        let names = enzymes
            .iter()
            .map(|e| e.as_str())
            .chain(long.iter().map(|r| r.enzyme.as_str()));
        for enzyme in names {
            let next = lane_index.len();
            lane_index.entry(enzyme).or_insert(next);
        }

        let colors = generate_palette(lane_index.len());
        let lanes: Vec<Lane> = lane_index
            .keys()
            .zip(colors)
            .enumerate()
            .map(|(i, (enzyme, color))| Lane {
                enzyme: enzyme.to_string(),
                center: i as BlotFloat,
                color,
            })
            .collect();

        let points: Vec<BlotPoint> = long
            .iter()
            .filter(|row| !row.blot_position.is_nan())
            .map(|row| {
                let lane = lane_index[row.enzyme.as_str()];
                BlotPoint {
                    lane,
                    site: row.site.clone(),
                    x: lanes[lane].center,
                    y: -row.blot_position,
                }
            })
            .collect();

        let y_ticks = curve
            .ticks()
            .into_iter()
            .map(|(pos, size)| (-pos, format_float(size)))
            .collect();

        // the curve clamps, so every point lies within its position range
        let (lo, hi) = curve.position_range();
        let pad = ((hi - lo) * 0.05).max(TICK_EPS);

        BlotLayout {
            x_range: (-0.5, lanes.len().max(1) as BlotFloat - 0.5),
            y_range: (-(hi + pad), -(lo - pad)),
            lanes,
            points,
            y_ticks,
        }
    }

    fn x_label(&self, x: BlotFloat) -> String {
        let idx = x.round();
        if (x - idx).abs() > TICK_EPS || idx < 0.0 {
            return String::new();
        }
        self.lanes
            .get(idx as usize)
            .map(|lane| lane.enzyme.clone())
            .unwrap_or_default()
    }

    fn y_label(&self, y: BlotFloat) -> String {
        self.y_ticks
            .iter()
            .find(|(tick, _)| (tick - y).abs() < TICK_EPS)
            .map(|(_, label)| label.clone())
            .unwrap_or_default()
    }
}

/// A linear axis whose ticks sit only at the given key points.
#[derive(Debug, Clone)]
struct KeyedAxis {
    lo: BlotFloat,
    hi: BlotFloat,
    keys: Vec<BlotFloat>,
}

impl KeyedAxis {
    fn new((lo, hi): (BlotFloat, BlotFloat), keys: Vec<BlotFloat>) -> Self {
        let keys = keys.into_iter().filter(|k| (lo..=hi).contains(k)).collect();
        Self { lo, hi, keys }
    }
}

impl Ranged for KeyedAxis {
    type FormatOption = DefaultFormatting;
    type ValueType = BlotFloat;

    fn map(&self, value: &BlotFloat, limit: (i32, i32)) -> i32 {
        let span = limit.1 - limit.0;
        if span == 0 || self.hi == self.lo {
            return limit.1;
        }
        let logic = (value - self.lo) / (self.hi - self.lo);
        limit.0 + (span as f64 * logic + 1e-3).floor() as i32
    }

    fn key_points<Hint: KeyPointHint>(&self, _hint: Hint) -> Vec<BlotFloat> {
        self.keys.clone()
    }

    fn range(&self) -> Range<BlotFloat> {
        self.lo..self.hi
    }
}

fn plot_error<E: std::error::Error + Send + Sync>(e: DrawingAreaErrorKind<E>) -> BlotError {
    BlotError::Plot(e.to_string())
}

/// Render the blot to `output`: SVG when the path ends in `.svg`, otherwise
/// a bitmap whose format follows the extension (PNG by default).
pub fn render(
    long: &[LongRow],
    enzymes: &[String],
    curve: &SizeCurve,
    config: &PlotConfig,
    output: &str,
) -> Result<(), BlotError> {
    let layout = BlotLayout::new(long, enzymes, curve);
    let size = config.pixel_size();
    log::debug!(
        "drawing {} lanes and {} points at {}x{} px",
        layout.lanes.len(),
        layout.points.len(),
        size.0,
        size.1
    );

    if output.to_lowercase().ends_with(".svg") {
        let root = SVGBackend::new(output, size).into_drawing_area();
        draw_blot(&root, &layout, config)
    } else {
        let root = BitMapBackend::new(output, size).into_drawing_area();
        draw_blot(&root, &layout, config)
    }
}

fn draw_blot<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    layout: &BlotLayout,
    config: &PlotConfig,
) -> Result<(), BlotError> {
    root.fill(&WHITE).map_err(plot_error)?;

    let x_keys: Vec<BlotFloat> = layout.lanes.iter().map(|lane| lane.center).collect();
    let y_keys: Vec<BlotFloat> = layout.y_ticks.iter().map(|(y, _)| *y).collect();
    let (y_lo, y_hi) = layout.y_range;

    let mut chart = ChartBuilder::on(root)
        .caption(&config.title, ("sans-serif", config.scaled(28.0)))
        .margin(config.scaled(12.0) as i32)
        .x_label_area_size(config.scaled(40.0) as i32)
        .y_label_area_size(config.scaled(70.0) as i32)
        .build_cartesian_2d(
            KeyedAxis::new(layout.x_range, x_keys),
            KeyedAxis::new(layout.y_range, y_keys),
        )
        .map_err(plot_error)?;

    let x_label = |x: &BlotFloat| layout.x_label(*x);
    let y_label = |y: &BlotFloat| layout.y_label(*y);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Enzyme")
        .y_desc("Fragment size (bp)")
        .label_style(("sans-serif", config.scaled(14.0)))
        .axis_desc_style(("sans-serif", config.scaled(16.0)))
        .x_label_formatter(&x_label)
        .y_label_formatter(&y_label)
        .draw()
        .map_err(plot_error)?;

    chart
        .draw_series(layout.lanes.iter().map(|lane| {
            Rectangle::new(
                [
                    (lane.center - LANE_HALF_WIDTH, y_lo),
                    (lane.center + LANE_HALF_WIDTH, y_hi),
                ],
                lane.color.mix(BAND_ALPHA).filled(),
            )
        }))
        .map_err(plot_error)?;

    let radius = config.scaled(5.0).round().max(1.0) as i32;
    for (i, lane) in layout.lanes.iter().enumerate() {
        let color = lane.color;
        let points = layout.points.iter().filter(|p| p.lane == i);
        chart
            .draw_series(points.map(|p| Circle::new((p.x, p.y), radius, color.filled())))
            .map_err(plot_error)?
            .label(lane.enzyme.clone())
            .legend(move |(x, y)| Circle::new((x, y), radius, color.filled()));
    }

    let label_offset = LANE_HALF_WIDTH / 4.0;
    chart
        .draw_series(layout.points.iter().map(|p| {
            Text::new(
                p.site.clone(),
                (p.x + label_offset, p.y),
                ("sans-serif", config.scaled(11.0)),
            )
        }))
        .map_err(plot_error)?;

    if !layout.lanes.is_empty() {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font(("sans-serif", config.scaled(13.0)))
            .draw()
            .map_err(plot_error)?;
    }

    root.present().map_err(plot_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enzyme::EnzymeTable;
    use tempfile::tempdir;

    fn curve() -> SizeCurve {
        SizeCurve::from_csv("tests/data/size_position.csv").unwrap()
    }

    #[test]
    fn test_layout() {
        let table = EnzymeTable::from_csv("tests/data/enzyme_sizes.csv").unwrap();
        let long = table.to_long(&curve()).unwrap();
        let layout = BlotLayout::new(&long, &table.enzymes(), &curve());

        assert_eq!(layout.lanes.len(), 2);
        assert_eq!(layout.lanes[1].enzyme, "BamHI");
        assert_eq!(layout.points.len(), 5);
        assert_eq!(layout.points[0].x, 0.0);
        assert_eq!(layout.points[0].y, -5.5);
        assert_eq!(layout.x_label(1.0), "BamHI");
        assert_eq!(layout.x_label(0.5), "");
        assert_eq!(layout.y_label(-9.0), "500");
        assert_eq!(layout.y_label(-1.0), "10000");
        assert_eq!(layout.y_ticks.len(), curve().len());
        assert_ne!(layout.lanes[0].color, layout.lanes[1].color);
    }

    #[test]
    fn test_layout_empty() {
        let layout = BlotLayout::new(&[], &[], &curve());
        assert!(layout.lanes.is_empty());
        assert!(layout.points.is_empty());
        assert_eq!(layout.x_range, (-0.5, 0.5));
        assert!(layout.y_range.0 < -9.0 && layout.y_range.1 > -1.0);
    }

    #[test]
    fn test_pixel_size() {
        let config = PlotConfig {
            dpi: 300,
            ..Default::default()
        };
        assert_eq!(config.pixel_size(), (3000, 1800));
    }

    #[test]
    fn test_palette() {
        assert!(generate_palette(0).is_empty());
        assert_eq!(generate_palette(3).len(), 3);
    }

    #[test]
    fn test_keyed_axis() {
        let axis = KeyedAxis::new((-10.0, 0.0), vec![-9.0, -1.0, 3.0]);
        assert_eq!(axis.key_points(5usize), vec![-9.0, -1.0]);
        assert_eq!(axis.range(), -10.0..0.0);
        assert_eq!(axis.map(&-10.0, (0, 100)), 0);
        assert_eq!(axis.map(&-5.0, (0, 100)), 50);
        assert_eq!(axis.map(&0.0, (0, 100)), 100);
    }

    #[test]
    fn test_render_empty_table() {
        let table = EnzymeTable::from_csv("tests/data/enzyme_sizes_empty.csv").unwrap();
        let long = table.to_long(&curve()).unwrap();

        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.svg");
        let path = path.to_str().unwrap();
        render(&long, &table.enzymes(), &curve(), &PlotConfig::default(), path).unwrap();

        // y ticks are labeled with the reference sizes
        let svg = std::fs::read_to_string(path).unwrap();
        assert!(svg.contains("500</text>"));
        assert!(svg.contains("10000</text>"));
    }

    #[test]
    fn test_render_png() {
        let table = EnzymeTable::from_csv("tests/data/enzyme_sizes.csv").unwrap();
        let long = table.to_long(&curve()).unwrap();

        let dir = tempdir().unwrap();
        let path = dir.path().join("blot.png");
        let path = path.to_str().unwrap();
        render(&long, &table.enzymes(), &curve(), &PlotConfig::default(), path).unwrap();
        assert!(std::fs::metadata(path).unwrap().len() > 0);
    }
}
