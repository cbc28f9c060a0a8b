use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::descriptor::{AirportDescriptor, RegionDescriptor};

/// Country assumed for regions whose descriptor carries no country.
pub const DEFAULT_COUNTRY: &str = "United States";

pub type RegionMap = HashMap<String, Region>;
pub type AirportMap = HashMap<String, Airport>;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to read input: {0}")]
    Read(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("line {line}: missing {field} field")]
    MissingField { line: u64, field: &'static str },
    #[error("line {line}: {reason}")]
    Strict { line: u64, reason: String },
}

/// Controls how tolerant the loaders are of descriptors that do not fit
/// the expected grammar.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Reject rows whose descriptor would otherwise be silently truncated
    /// or left without a resolvable location.
    pub strict: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionLabel {
    State,
    Province,
}

impl RegionLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            RegionLabel::State => "state",
            RegionLabel::Province => "province",
        }
    }
}

impl fmt::Display for RegionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A state or province row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Region {
    pub code: String,
    pub name: String,
    pub label: RegionLabel,
    pub country: String,
}

impl Region {
    pub fn from_row(code: &str, descriptor: &str) -> Self {
        Self::from_descriptor(code, RegionDescriptor::parse(descriptor))
    }

    fn from_descriptor(code: &str, descriptor: RegionDescriptor<'_>) -> Self {
        let (name, label, country) = match descriptor {
            RegionDescriptor::Province { name, country } => (name, RegionLabel::Province, country),
            RegionDescriptor::State { name, .. } => (name, RegionLabel::State, DEFAULT_COUNTRY),
        };
        Self {
            code: code.to_string(),
            name: name.to_string(),
            label,
            country: country.to_string(),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} | {} | {}",
            self.code, self.name, self.label, self.country
        )
    }
}

/// An airport row enriched with the state/province it was resolved against.
///
/// The location fields are copied out of the matching [`Region`] when the
/// airport is built; empty strings mean "not derivable".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Airport {
    pub code: String,
    pub name: String,
    pub city: String,
    pub state_name: String,
    pub state_label: String,
    pub country: String,
}

impl Airport {
    pub fn from_row(code: &str, descriptor: &str, regions: &RegionMap) -> Self {
        Self::from_descriptor(code, AirportDescriptor::parse(descriptor), regions)
    }

    fn from_descriptor(code: &str, descriptor: AirportDescriptor<'_>, regions: &RegionMap) -> Self {
        let mut airport = Self {
            code: code.to_string(),
            name: descriptor.name().to_string(),
            city: String::new(),
            state_name: String::new(),
            state_label: String::new(),
            country: String::new(),
        };

        if let AirportDescriptor::Located {
            city, region_code, ..
        } = descriptor
        {
            airport.city = city.to_string();
            match regions.get(region_code) {
                Some(region) => {
                    airport.state_name = region.name.clone();
                    airport.state_label = region.label.as_str().to_string();
                    airport.country = region.country.clone();
                }
                None => {
                    debug!(airport = code, region_code, "region code not found, using it as country");
                    airport.country = region_code.to_string();
                }
            }
        }

        airport
    }

    /// Human-readable location, e.g. `"San Francisco, California, United States"`.
    /// Empty components are skipped.
    pub fn location(&self) -> String {
        [&self.city, &self.state_name, &self.country]
            .into_iter()
            .filter(|part| !part.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Airport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {} | {}", self.code, self.name, self.location())
    }
}

struct Row {
    line: u64,
    code: String,
    descriptor: String,
}

/// Reads `(code, descriptor)` rows and hands each one to `visit`.
///
/// The first line is the header and is skipped, even when it is blank.
/// Fields beyond the second are ignored. A row with fewer than two fields is
/// an error, and so is any later blank line: the `csv` reader drops blank
/// lines on its own, so they are found by looking at the raw text between
/// consecutive records.
fn for_each_row<R, F>(mut reader: R, mut visit: F) -> Result<(), LoadError>
where
    R: Read,
    F: FnMut(Row) -> Result<(), LoadError>,
{
    let mut text = String::new();
    reader.read_to_string(&mut text)?;

    let mut records = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());
    let mut record = csv::StringRecord::new();
    let mut lines = LineCounter::default();
    let mut consumed = 0;
    let mut header_pending = true;

    loop {
        let more = records.read_record(&mut record)?;
        let end = usize::try_from(records.position().byte()).unwrap_or(text.len());
        let gap = Gap::scan(&text, consumed, end);
        consumed = end;

        let mut blanks = gap.blanks.into_iter();
        if header_pending && blanks.next().is_some() {
            header_pending = false;
        }
        if let Some(offset) = blanks.next() {
            return Err(LoadError::MissingField {
                line: lines.line_at(&text, offset),
                field: "code",
            });
        }
        if !more {
            return Ok(());
        }
        if header_pending {
            header_pending = false;
            continue;
        }

        let line = lines.line_at(&text, gap.start);
        let code = record
            .get(0)
            .ok_or(LoadError::MissingField { line, field: "code" })?;
        let descriptor = record.get(1).ok_or(LoadError::MissingField {
            line,
            field: "descriptor",
        })?;
        visit(Row {
            line,
            code: code.to_string(),
            descriptor: descriptor.to_string(),
        })?;
    }
}

/// Blank lines in front of a record (or in front of the end of input).
struct Gap {
    /// Byte offsets where the blank lines begin.
    blanks: Vec<usize>,
    /// Byte offset of the first non-blank byte.
    start: usize,
}

impl Gap {
    fn scan(text: &str, from: usize, to: usize) -> Self {
        let bytes = text.as_bytes();
        let mut pos = from;
        // the reader stops after the CR of a CRLF terminator
        if pos > 0 && pos < to && bytes[pos - 1] == b'\r' && bytes[pos] == b'\n' {
            pos += 1;
        }

        let mut blanks = Vec::new();
        while pos < to {
            let len = match &bytes[pos..to] {
                [b'\r', b'\n', ..] => 2,
                [b'\n', ..] | [b'\r', ..] => 1,
                _ => break,
            };
            blanks.push(pos);
            pos += len;
        }
        Gap { blanks, start: pos }
    }
}

/// 1-based line numbers for monotonically increasing byte offsets.
#[derive(Default)]
struct LineCounter {
    offset: usize,
    newlines: u64,
}

impl LineCounter {
    fn line_at(&mut self, text: &str, offset: usize) -> u64 {
        if offset > self.offset {
            self.newlines += text.as_bytes()[self.offset..offset]
                .iter()
                .filter(|&&b| b == b'\n')
                .count() as u64;
            self.offset = offset;
        }
        self.newlines + 1
    }
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_regions<P: AsRef<Path>>(path: P) -> Result<RegionMap, LoadError> {
    load_regions_with(path, LoadOptions::default())
}

pub fn load_regions_with<P: AsRef<Path>>(
    path: P,
    options: LoadOptions,
) -> Result<RegionMap, LoadError> {
    let path = path.as_ref();
    let regions = read_regions_with(open(path)?, options)?;
    info!("Loaded {} regions from {}", regions.len(), path.display());
    Ok(regions)
}

pub fn read_regions<R: Read>(reader: R) -> Result<RegionMap, LoadError> {
    read_regions_with(reader, LoadOptions::default())
}

pub fn read_regions_with<R: Read>(reader: R, options: LoadOptions) -> Result<RegionMap, LoadError> {
    let mut regions = RegionMap::new();
    for_each_row(reader, |row| {
        let descriptor = RegionDescriptor::parse(&row.descriptor);
        let dropped = descriptor.dropped_parts();
        if dropped > 0 {
            if options.strict {
                return Err(LoadError::Strict {
                    line: row.line,
                    reason: format!(
                        "region descriptor {:?} has {} unexpected extra part(s)",
                        row.descriptor, dropped
                    ),
                });
            }
            debug!(line = row.line, code = %row.code, dropped, "truncating region descriptor");
        }

        let region = Region::from_descriptor(&row.code, descriptor);
        if regions.insert(row.code.clone(), region).is_some() {
            warn!(line = row.line, code = %row.code, "duplicate region code, keeping the later row");
        }
        Ok(())
    })?;
    Ok(regions)
}

pub fn load_airports<P: AsRef<Path>>(path: P, regions: &RegionMap) -> Result<AirportMap, LoadError> {
    load_airports_with(path, regions, LoadOptions::default())
}

pub fn load_airports_with<P: AsRef<Path>>(
    path: P,
    regions: &RegionMap,
    options: LoadOptions,
) -> Result<AirportMap, LoadError> {
    let path = path.as_ref();
    let airports = read_airports_with(open(path)?, regions, options)?;
    info!("Loaded {} airports from {}", airports.len(), path.display());
    Ok(airports)
}

pub fn read_airports<R: Read>(reader: R, regions: &RegionMap) -> Result<AirportMap, LoadError> {
    read_airports_with(reader, regions, LoadOptions::default())
}

pub fn read_airports_with<R: Read>(
    reader: R,
    regions: &RegionMap,
    options: LoadOptions,
) -> Result<AirportMap, LoadError> {
    let mut airports = AirportMap::new();
    for_each_row(reader, |row| {
        let descriptor = AirportDescriptor::parse(&row.descriptor);
        if options.strict {
            check_airport_descriptor(row.line, &row.descriptor, &descriptor)?;
        }

        let airport = Airport::from_descriptor(&row.code, descriptor, regions);
        if airports.insert(row.code.clone(), airport).is_some() {
            warn!(line = row.line, code = %row.code, "duplicate airport code, keeping the later row");
        }
        Ok(())
    })?;
    Ok(airports)
}

fn check_airport_descriptor(
    line: u64,
    raw: &str,
    descriptor: &AirportDescriptor<'_>,
) -> Result<(), LoadError> {
    let reason = match *descriptor {
        AirportDescriptor::Unstructured { segments, .. } if segments > 2 => format!(
            "airport descriptor {:?} has {} ':' separators, expected at most one",
            raw,
            segments - 1
        ),
        AirportDescriptor::NameOnly { location, .. } => format!(
            "airport location {:?} is not of the form \"city, region\"",
            location
        ),
        _ => return Ok(()),
    };
    Err(LoadError::Strict { line, reason })
}
