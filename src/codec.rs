//! Pressure series file: a run stored as comma-separated text rows.
//!
//! ```text
//! 800,790,...,60          raw sample values, arrival order
//!                         reserved; written empty, ignored on read
//! 0.0,1.0009,...,131.25   elapsed seconds per sample, arrival order
//! ```
//!
//! Offsets are stored and loaded in seconds. Conversion to display units is up to the
//! renderer.

use std::io;
use std::path::Path;

use crate::config::SAMPLE_MASK;
use crate::run::{Run, Sample};

const DELIMITER: char = ',';
const VALUES_ROW: usize = 0;
const OFFSETS_ROW: usize = 2;

#[derive(Debug)]
pub enum CodecError {
    Io(io::Error),
    MissingRows { found: usize },
    InvalidValue { index: usize, field: String },
    InvalidOffset { index: usize, field: String },
    LengthMismatch { values: usize, offsets: usize },
    Empty,
}

impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Io(error) =>
                write!(f, "I/O error: {}", error),
            Self::MissingRows { found } =>
                write!(f, "expected 3 rows, found {}", found),
            Self::InvalidValue { index, field } =>
                write!(f, "value #{} ({:?}) is not a 10-bit reading", index, field),
            Self::InvalidOffset { index, field } =>
                write!(f, "offset #{} ({:?}) is not a non-negative number of seconds",
                    index, field),
            Self::LengthMismatch { values, offsets } =>
                write!(f, "{} values but {} offsets", values, offsets),
            Self::Empty =>
                write!(f, "no samples"),
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(error) => Some(error),
            _ => None,
        }
    }
}

impl From<io::Error> for CodecError {
    fn from(error: io::Error) -> Self {
        CodecError::Io(error)
    }
}

/// Encode a run as the three rows of a pressure series file.
pub fn encode(run: &Run) -> String {
    let mut text = String::new();
    write_row(&mut text, run.values().iter().map(|value| value.to_string()));
    text.push('\n');
    // `{:?}` keeps the decimal point on whole seconds, e.g. `0.0`
    write_row(&mut text, run.offsets().iter().map(|offset| format!("{:?}", offset)));
    text
}

fn write_row(text: &mut String, fields: impl Iterator<Item = String>) {
    for (index, field) in fields.enumerate() {
        if index > 0 {
            text.push(DELIMITER);
        }
        text.push_str(&field);
    }
    text.push('\n');
}

fn split_row(row: &str) -> impl Iterator<Item = &str> {
    // an empty row has no fields rather than one empty field
    row.split(DELIMITER).filter(move |_| !row.is_empty())
}

/// Decode a pressure series file. The reserved second row may hold anything.
pub fn decode(text: &str) -> Result<Run, CodecError> {
    let rows = text.lines().collect::<Vec<_>>();
    if rows.len() <= OFFSETS_ROW {
        return Err(CodecError::MissingRows { found: rows.len() })
    }

    let values = split_row(rows[VALUES_ROW])
        .enumerate()
        .map(|(index, field)| {
            field.trim().parse::<Sample>().ok()
                .filter(|value| value & !SAMPLE_MASK == 0)
                .ok_or_else(|| CodecError::InvalidValue { index, field: field.to_owned() })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let offsets = split_row(rows[OFFSETS_ROW])
        .enumerate()
        .map(|(index, field)| {
            field.trim().parse::<f64>().ok()
                .filter(|offset| offset.is_finite() && *offset >= 0.0)
                .ok_or_else(|| CodecError::InvalidOffset { index, field: field.to_owned() })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mismatch = CodecError::LengthMismatch { values: values.len(), offsets: offsets.len() };
    let run = Run::from_parts(values, offsets).ok_or(mismatch)?;
    if run.is_empty() {
        return Err(CodecError::Empty)
    }
    log::debug!("codec: decoded {} samples", run.len());
    Ok(run)
}

/// Write a run to `path` in a single write.
pub fn write_file(path: impl AsRef<Path>, run: &Run) -> Result<(), CodecError> {
    let path = path.as_ref();
    std::fs::write(path, encode(run))?;
    log::debug!("codec: wrote {} samples to {}", run.len(), path.display());
    Ok(())
}

pub fn read_file(path: impl AsRef<Path>) -> Result<Run, CodecError> {
    let path = path.as_ref();
    log::debug!("codec: reading {}", path.display());
    decode(&std::fs::read_to_string(path)?)
}
