use genomap::GenomeMapError;
use std::io;
use thiserror::Error;

use crate::file::FileError;

#[derive(Error, Debug)]
pub enum BlotError {
    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IOError(#[from] io::Error),
    #[error("File error: {0}")]
    FileError(#[from] FileError),
    #[error("Required column '{column}' missing from '{path}'")]
    MissingColumn { column: String, path: String },
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Insufficient reference data: need at least 2 distinct sizes, found {0}")]
    InsufficientReferenceData(usize),
    #[error("Conflicting reference positions for size {0}")]
    ConflictingReference(f64),
    #[error("Reference positions are not strictly monotonic in size; cannot invert")]
    NotMonotonic,
    #[error("Plotting error: {0}")]
    Plot(String),
    #[error("Invalid column pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("GenomeMap Error: error updating GenomeMap")]
    GenomeMapError(#[from] GenomeMapError),
}
