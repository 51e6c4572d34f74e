//! File parsing functionality for the astronaut data set
//!
//! This module handles loading the astronaut JSON file (optionally zstd compressed)
//! into an untyped [`RawTable`]. No field is interpreted here; that is the job of
//! [`crate::preparation`].

use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use zstd::Decoder;

/// Errors that can occur during file parsing
#[derive(Error, Debug)]
pub enum ParsingError {
    #[error("Failed to read input file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decompress zstd file: {0}")]
    Decompression(String),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Expected a JSON array of astronaut records")]
    NotAnArray,

    #[error("Record {index} is not a JSON object")]
    NotAnObject { index: usize },
}

type Result<T> = core::result::Result<T, ParsingError>;

/// A single raw record, keyed by the source field names
pub type RawRecord = Map<String, Value>;

/// The astronaut data set as loaded from disk, before any renaming or type coercion
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    records: Vec<RawRecord>,
}

impl RawTable {
    /// Wraps already-loaded records
    pub fn from_records(records: Vec<RawRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[RawRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<RawRecord> {
        self.records
    }

    /// Returns true if at least one record carries the field, even with a null value
    ///
    /// This mirrors how a column-oriented reader would build its schema from an
    /// array of objects: the union of all keys.
    pub fn has_field(&self, name: &str) -> bool {
        self.records.iter().any(|record| record.contains_key(name))
    }

    /// Union of all field names across the records
    pub fn field_names(&self) -> BTreeSet<&str> {
        self.records
            .iter()
            .flat_map(|record| record.keys().map(String::as_str))
            .collect()
    }
}

/// Parse the astronaut data set and load it for preparation
///
/// Files ending in `.zst` are decompressed with ZStandard before being parsed.
///
/// # Arguments
/// * `file_path` - Path to the `astronauts.json` (or `astronauts.json.zst`) file
///
/// # Returns
/// * `Ok(RawTable)` - Successfully parsed records
/// * `Err(ParsingError)` - If file reading, decompression, or JSON parsing failed
pub fn parse_astronauts(file_path: &Path) -> Result<RawTable> {
    let file = File::open(file_path).map_err(|source| ParsingError::FileRead {
        path: file_path.to_path_buf(),
        source,
    })?;

    let is_compressed = file_path
        .extension()
        .is_some_and(|extension| extension == "zst");

    let table = if is_compressed {
        debug!(path = %file_path.display(), "decompressing input with zstd");
        let decoder = Decoder::new(file)
            .map_err(|e| ParsingError::Decompression(format!("Failed to create decoder: {}", e)))?;
        parse_astronauts_from_reader(decoder)?
    } else {
        parse_astronauts_from_reader(BufReader::new(file))?
    };

    info!(
        path = %file_path.display(),
        records = table.len(),
        "loaded astronaut data set"
    );
    Ok(table)
}

/// Deserializes an array of astronaut objects from any reader
pub fn parse_astronauts_from_reader<R: Read>(reader: R) -> Result<RawTable> {
    let document: Value = serde_json::from_reader(reader)?;
    let Value::Array(items) = document else {
        return Err(ParsingError::NotAnArray);
    };

    let records = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(record) => Ok(record),
            _ => Err(ParsingError::NotAnObject { index }),
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(RawTable::from_records(records))
}
