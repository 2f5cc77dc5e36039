//! Encapsulates plaintext and gzip-compressed file input and output.
//!
//! The [`InputFile`] and [`OutputFile`] abstractions are for working with
//! possibly gzip-compressed CSV files. Every table this crate reads or writes
//! goes through them, so any input may be compressed and any output path
//! ending in `.gz` is compressed.
//!
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{self, BufWriter};
use std::io::{BufReader, Read, Write};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FileError {
    #[error("could not open '{path}': {source}")]
    Open { path: String, source: io::Error },
    #[error("could not create '{path}': {source}")]
    Create { path: String, source: io::Error },
    #[error("IO error: {0}")]
    IOError(#[from] io::Error),
}

/// Check if a file is a gzipped by looking for the magic numbers.
///
/// Files shorter than two bytes are never gzipped.
fn is_gzipped_file(file_path: &str) -> io::Result<bool> {
    let mut file = File::open(file_path)?;
    let mut buffer = [0; 2];
    match file.read_exact(&mut buffer) {
        Ok(()) => Ok(buffer == [0x1f, 0x8b]),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e),
    }
}

/// Represents an input file.
///
/// This abstracts how data is read in, allowing for both plaintext and
/// gzip-compressed input to be read through a common interface.
pub struct InputFile {
    pub filepath: String,
}

impl InputFile {
    /// Constructs a new `InputFile`.
    ///
    /// # Arguments
    ///
    /// * `filepath` - A string slice that holds the path to the file. Gzip
    /// compression is detected from the file's magic bytes.
    pub fn new(filepath: &str) -> Self {
        Self {
            filepath: filepath.to_string(),
        }
    }

    /// Opens the file and returns a buffered reader.
    ///
    /// If the file is gzip-compressed, this method will automatically handle
    /// the decompression. A file that cannot be opened is reported with its path.
    pub fn reader(&self) -> Result<BufReader<Box<dyn Read>>, FileError> {
        let open_error = |source| FileError::Open {
            path: self.filepath.clone(),
            source,
        };
        let file = File::open(&self.filepath).map_err(open_error)?;
        let is_gzipped = is_gzipped_file(&self.filepath).map_err(open_error)?;
        let reader: Box<dyn Read> = if is_gzipped {
            Box::new(GzDecoder::new(file))
        } else {
            Box::new(file)
        };
        Ok(BufReader::new(reader))
    }

    /// Opens the file as a comma-delimited CSV reader.
    ///
    /// Rows are allowed to have a varying number of fields; callers decide
    /// how to treat malformed rows. `trim` controls whitespace trimming of
    /// headers and fields; tables that are written back use [`csv::Trim::None`].
    pub fn csv_reader(
        &self,
        has_headers: bool,
        trim: csv::Trim,
    ) -> Result<csv::Reader<BufReader<Box<dyn Read>>>, FileError> {
        let buf_reader = self.reader()?;
        Ok(csv::ReaderBuilder::new()
            .has_headers(has_headers)
            .flexible(true)
            .trim(trim)
            .from_reader(buf_reader))
    }
}

/// Represents an output file.
///
/// This abstracts writing both plaintext and gzip-compressed files.
pub struct OutputFile {
    pub filepath: String,
}

impl OutputFile {
    /// Constructs a new `OutputFile`.
    ///
    /// # Arguments
    ///
    /// * `filepath` - A string slice that holds the path to the file. If the file extension is
    /// `.gz`, `OutputFile` will automatically write gzip-compressed output.
    pub fn new(filepath: &str) -> Self {
        Self {
            filepath: filepath.to_string(),
        }
    }

    /// Opens the file and returns a writer.
    ///
    /// If the file path ends with ".gz", the file is treated as gzip-compressed, and the
    /// function will handle compression automatically.
    pub fn writer(&self) -> Result<Box<dyn Write>, FileError> {
        let outfile = &self.filepath;
        let file = File::create(outfile).map_err(|source| FileError::Create {
            path: outfile.clone(),
            source,
        })?;
        let writer: Box<dyn Write> = if outfile.ends_with(".gz") {
            Box::new(BufWriter::new(GzEncoder::new(file, Compression::default())))
        } else {
            Box::new(BufWriter::new(file))
        };
        Ok(writer)
    }

    /// Opens the file as a CSV writer.
    pub fn csv_writer(&self) -> Result<csv::Writer<Box<dyn Write>>, FileError> {
        Ok(csv::Writer::from_writer(self.writer()?))
    }
}
