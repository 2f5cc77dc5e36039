//! Functionality for virtual Southern blot analysis of restriction fragments.
//!
//! A [`SizeCurve`] is read from a calibration table of fragment sizes and the
//! blot positions they run to, and linearly interpolates the position of any
//! fragment size. Around it sit the table transforms of the `vblot` tool:
//!
//!  * [`distances`]: distances from integration sites to the nearest
//!    restriction enzyme cut sites on either side.
//!  * [`finalize`]: light (`_L`) and heavy (`_H`) fragment sizes from those
//!    distances, per-site directions and per-enzyme fragment lengths.
//!  * [`convert`]: rewriting `_L` / `_H` fragment-size columns as blot
//!    positions.
//!  * [`enzyme`] and [`plot`]: reshaping a wide fragment-size table to one row
//!    per fragment and drawing the blot.
//!
//! Here is an example which interpolates the blot position of a few
//! fragment sizes.
//!
//! ```no_run
//! use vblot::prelude::*;
//! let curve = SizeCurve::from_csv("size_position.csv")
//!                 .expect("could not read reference curve");
//!
//! let positions = curve.positions_at(&[850.0, 2000.0, 12000.0]);
//! println!("{}", positions);
//! ```
//!
//! And one which plots a table of fragment sizes.
//!
//! ```no_run
//! use vblot::prelude::*;
//! let curve = SizeCurve::from_csv("size_position.csv").unwrap();
//! let table = EnzymeTable::from_csv("enzyme_sizes.csv").unwrap();
//! let long = table.to_long(&curve).unwrap();
//! render(&long, &table.enzymes(), &curve, &PlotConfig::default(), "blot.png").unwrap();
//! ```

pub mod convert;
pub mod curve;
pub mod distances;
pub mod enzyme;
pub mod error;
pub mod file;
pub mod finalize;
pub mod numeric;
pub mod plot;
pub mod table;

pub use curve::{BlotFloat, SizeCurve};
pub use enzyme::{EnzymeTable, LongRow};
pub use error::BlotError;
pub use plot::PlotConfig;
pub use table::Table;

pub mod prelude {
    pub use crate::curve::{BlotFloat, SizeCurve};
    pub use crate::enzyme::{EnzymeTable, LongRow};
    pub use crate::error::BlotError;
    pub use crate::plot::{render, PlotConfig};
    pub use crate::table::Table;
}
