use crate::export::CaptureStatus;
use crate::{Error, Result};
use log::*;
use pano_core::CameraPose;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Columns every pose table must have.
const REQUIRED_COLUMNS: [&str; 4] = ["FID", "x", "y", "north_angle"];

/// One row of the pose table: a capture identifier and where the capture was taken.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureRecord {
    pub fid: u64,
    pub pose: CameraPose,
}

/// A pose table row that could not be turned into a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RejectedRow {
    /// The line of the row in the table, counting the header as line 1.
    pub line: u64,
    /// The capture identifier, when the row carried a usable one.
    pub fid: Option<u64>,
}

/// The captures read from a pose table together with the rows that were rejected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoseTable {
    pub captures: Vec<CaptureRecord>,
    pub rejected: Vec<RejectedRow>,
}

impl PoseTable {
    /// A `missing` status for every rejected row that still names its capture.
    pub fn rejected_statuses(&self) -> impl Iterator<Item = CaptureStatus> + '_ {
        self.rejected
            .iter()
            .filter_map(|row| row.fid)
            .map(CaptureStatus::missing)
    }
}

#[derive(Debug, Deserialize)]
struct PoseRow {
    #[serde(rename = "FID", default, deserialize_with = "csv::invalid_option")]
    fid: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    x: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    y: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    north_angle: Option<f64>,
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

impl PoseRow {
    fn fid(&self) -> Option<u64> {
        finite(self.fid)
            .filter(|&fid| fid >= 0.0)
            .map(|fid| fid.trunc() as u64)
    }

    fn pose(&self) -> Option<CameraPose> {
        Some(CameraPose::new(
            finite(self.x)?,
            finite(self.y)?,
            finite(self.north_angle)?,
        ))
    }
}

/// Reads a pose table from CSV.
///
/// The header must name the columns `FID`, `x`, `y` and `north_angle`; any other columns are
/// ignored. Identifiers written as floats are truncated. A row with an empty or unparsable
/// value, a negative identifier or missing fields is rejected and logged, and the rows after
/// it are still read. Only a missing column or an unreadable header fails the whole table.
pub fn read_pose_table(reader: impl Read) -> Result<PoseTable> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = reader.headers()?.clone();
    if let Some(column) = REQUIRED_COLUMNS
        .iter()
        .find(|column| !headers.iter().any(|header| header == **column))
    {
        return Err(Error::MissingColumn(*column));
    }

    let mut table = PoseTable::default();
    for (index, row) in reader.deserialize::<PoseRow>().enumerate() {
        let line = index as u64 + 2;
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                warn!("pose table line {} skipped: {}", line, e);
                table.rejected.push(RejectedRow { line, fid: None });
                continue;
            }
        };
        match (row.fid(), row.pose()) {
            (Some(fid), Some(pose)) => table.captures.push(CaptureRecord { fid, pose }),
            (fid, _) => {
                warn!("pose table line {} skipped: {:?}", line, row);
                table.rejected.push(RejectedRow { line, fid });
            }
        }
    }
    Ok(table)
}

/// Reads a pose table from a CSV file.
pub fn load_pose_table(path: impl AsRef<Path>) -> Result<PoseTable> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::MissingInput {
            path: path.to_path_buf(),
        });
    }
    let table = read_pose_table(File::open(path)?)?;
    info!(
        "loaded {} capture poses from {}",
        table.captures.len(),
        path.display()
    );
    if !table.rejected.is_empty() {
        warn!("{} pose rows were rejected", table.rejected.len());
    }
    Ok(table)
}
