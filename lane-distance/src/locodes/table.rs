//! UN/LOCODE reference table.

use std::borrow::Cow;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use csv::{ByteRecord, StringRecord};
use encoding_rs::WINDOWS_1252;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::{Coordinates, Locode};

use super::dms;
use super::error::TableError;

/// Seed table shipped with the binary.
const BUNDLED_TABLE: &str = include_str!("../../data/locodes.csv");

/// An entry in the location code table.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationCode {
    pub code: Locode,
    pub name: String,
    pub country: String,
    pub coordinates: Coordinates,
}

/// One CSV row, before validation.
///
/// Accepts the cleaned layout (`LOCODE`, `Latitude`/`Longitude` in decimal
/// degrees) and the raw code-list layout (`Country` + `Location` code parts,
/// `Coordinates` as `4042N 07400W`).
#[derive(Debug, Deserialize)]
struct TableRow {
    #[serde(default, alias = "LOCODE", alias = "code", alias = "Code")]
    locode: Option<String>,
    #[serde(default, alias = "Location")]
    location: Option<String>,
    #[serde(default, alias = "Name")]
    name: Option<String>,
    #[serde(default, alias = "Country")]
    country: Option<String>,
    #[serde(default, alias = "Latitude")]
    latitude: Option<f64>,
    #[serde(default, alias = "Longitude")]
    longitude: Option<f64>,
    #[serde(default, alias = "Coordinates")]
    coordinates: Option<String>,
}

impl TableRow {
    fn into_entry(self) -> Option<LocationCode> {
        let country = self
            .country
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty());

        let code = match self.locode.as_deref().map(str::trim) {
            Some(locode) if !locode.is_empty() => Locode::parse_normalized(locode).ok()?,
            // Raw export: the code is split into country and location parts.
            _ => {
                let location = self.location.as_deref()?.trim();
                Locode::parse_normalized(&format!("{}{location}", country.as_deref()?)).ok()?
            }
        };

        let coordinates = match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Coordinates::new(lat, lon).ok()?,
            _ => dms::parse_pair(self.coordinates.as_deref()?)?,
        };

        Some(LocationCode {
            code,
            name: self.name.unwrap_or_default().trim().to_string(),
            country: country.unwrap_or_else(|| code.country().to_string()),
            coordinates,
        })
    }
}

/// Decode one field. The official export is Latin-1, so bytes that are not
/// valid UTF-8 are read as Windows-1252 (a superset of Latin-1's printable
/// range).
fn decode_field(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(s) => Cow::Borrowed(s),
        Err(_) => WINDOWS_1252.decode_without_bom_handling(bytes).0,
    }
}

fn decode_record(record: &ByteRecord) -> StringRecord {
    record.iter().map(decode_field).collect()
}

/// Read-only lookup from UN/LOCODE to location.
///
/// Loaded once at startup and shared behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct LocodeTable {
    entries: HashMap<Locode, LocationCode>,
}

impl LocodeTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The seed table compiled into the binary.
    pub fn bundled() -> Result<Self, TableError> {
        Self::from_reader(BUNDLED_TABLE.as_bytes(), "bundled")
    }

    /// Load a table from a CSV file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TableError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| TableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file, &path.display().to_string())
    }

    /// Parse a table from CSV. Rows with an invalid code or no usable
    /// coordinates are skipped; a table with no usable rows is an error.
    pub fn from_reader<R: Read>(reader: R, source: &str) -> Result<Self, TableError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        // Surface header problems up front rather than as per-row skips.
        let headers = decode_record(reader.byte_headers()?);

        let mut table = Self::new();
        let mut skipped = 0usize;

        for record in reader.byte_records() {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();

            match decode_record(&record).deserialize::<TableRow>(Some(&headers)) {
                Ok(row) => match row.into_entry() {
                    Some(entry) => table.insert(entry),
                    None => skipped += 1,
                },
                Err(e) => {
                    debug!(source, line, error = %e, "Unparseable location row");
                    skipped += 1;
                }
            }
        }

        if skipped > 0 {
            warn!(source, skipped, "Skipped location rows without a valid code or coordinates");
        }

        if table.is_empty() {
            return Err(TableError::Empty(source.to_string()));
        }

        debug!(source, entries = table.len(), "Loaded location table");
        Ok(table)
    }

    /// Insert or replace an entry.
    pub fn insert(&mut self, entry: LocationCode) {
        self.entries.insert(entry.code, entry);
    }

    /// Merge another table into this one; entries from `other` win.
    pub fn merged(mut self, other: LocodeTable) -> Self {
        self.entries.extend(other.entries);
        self
    }

    /// Look up an entry by code.
    pub fn get(&self, code: &Locode) -> Option<&LocationCode> {
        self.entries.get(code)
    }

    /// Look up a user-supplied code string, normalizing it first.
    ///
    /// Returns `None` both for malformed and for unknown codes.
    pub fn lookup(&self, code: &str) -> Option<&LocationCode> {
        Locode::parse_normalized(code)
            .ok()
            .and_then(|code| self.get(&code))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
