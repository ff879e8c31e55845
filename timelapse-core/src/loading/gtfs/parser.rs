use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::warn;

use crate::Error;

pub fn deserialize_gtfs_file<T>(path: &Path) -> Result<Vec<T>, Error>
where
    T: for<'de> serde::Deserialize<'de>,
{
    let file = File::open(path).map_err(|e| {
        std::io::Error::new(
            e.kind(),
            format!("Failed to open file '{}': {}", path.display(), e),
        )
    })?;
    let (rows, skipped) = deserialize_gtfs_reader(file)?;
    if skipped > 0 {
        warn!("Skipped {skipped} malformed rows in {}", path.display());
    }
    Ok(rows)
}

/// Deserializes all well-formed rows, returning them with the count of
/// rows that were skipped.
pub fn deserialize_gtfs_reader<T, R>(reader: R) -> Result<(Vec<T>, usize), Error>
where
    T: for<'de> serde::Deserialize<'de>,
    R: Read,
{
    let mut csv_reader = csv::Reader::from_reader(reader);
    // Fail early on an unreadable header rather than skipping every row
    csv_reader.headers()?;

    let mut skipped = 0;
    let rows = csv_reader
        .deserialize()
        .filter_map(|row| match row {
            Ok(row) => Some(row),
            Err(_) => {
                skipped += 1;
                None
            }
        })
        .collect::<Vec<T>>();
    Ok((rows, skipped))
}

/// Parse a decimal coordinate, `None` if empty or not a finite number
pub fn parse_coordinate(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
