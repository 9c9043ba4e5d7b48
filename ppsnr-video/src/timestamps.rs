//! Per-frame timestamp metadata
//!
//! The metadata file holds one `PTS,DTS` pair per line in coding order. A
//! missing file or malformed line never aborts a run: the file yields no
//! records, a bad field becomes [`MISSING_TIMESTAMP`] and the record keeps its
//! position so it still lines up with its frame. Blank lines after the last
//! record are dropped.
//!
//! Sorting compares the sentinel like any other value, so a record whose sort
//! key failed to parse moves ahead of every non-negative timestamp.

use crate::types::{TimestampRecord, MISSING_TIMESTAMP};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Field a timestamp sequence is sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampKey {
    Decode,
    Presentation,
}

impl TimestampKey {
    pub fn of(self, record: &TimestampRecord) -> i64 {
        match self {
            TimestampKey::Decode => record.dts,
            TimestampKey::Presentation => record.pts,
        }
    }
}

/// Order in which the frames of the YUV files are assumed to be stored
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FrameOrder {
    /// Metadata is used as read from the file
    Coding,
    /// Metadata sorted by presentation timestamp
    #[default]
    Display,
    /// Metadata sorted by decode timestamp
    Decode,
}

impl FrameOrder {
    pub fn sort_key(self) -> Option<TimestampKey> {
        match self {
            FrameOrder::Coding => None,
            FrameOrder::Display => Some(TimestampKey::Presentation),
            FrameOrder::Decode => Some(TimestampKey::Decode),
        }
    }
}

/// Read timestamps from `path`; an absent or unreadable file yields no records
pub fn read_timestamps(path: &Path) -> Vec<TimestampRecord> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            log::warn!(
                "Timestamp file {} not readable ({}), timestamps will print as {}",
                path.display(),
                e,
                MISSING_TIMESTAMP
            );
            return Vec::new();
        }
    };

    match parse_timestamps(BufReader::new(file)) {
        Ok(records) => {
            log::debug!("Read {} timestamp records from {}", records.len(), path.display());
            records
        }
        Err(e) => {
            log::warn!("Failed reading timestamp file {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

/// Parse every line of `reader` into a record, in file order
pub fn parse_timestamps<R: BufRead>(reader: R) -> io::Result<Vec<TimestampRecord>> {
    let mut records = Vec::new();
    let mut last_record = 0;

    for (index, line) in reader.split(b'\n').enumerate() {
        let line = line?;
        let text = String::from_utf8_lossy(&line);
        let text = text.trim_end_matches('\r');

        records.push(parse_line(text, index + 1));
        if !text.trim().is_empty() {
            last_record = records.len();
        }
    }

    records.truncate(last_record);
    Ok(records)
}

/// Parse one `PTS,DTS` line; a lone value is a legacy decode timestamp
pub fn parse_line(line: &str, line_number: usize) -> TimestampRecord {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();

    match fields.as_slice() {
        [] | [""] => {
            log::warn!("Line {}: empty timestamp record", line_number);
            TimestampRecord::missing()
        }
        [dts] => {
            let dts = parse_field(dts, "DTS", line_number);
            TimestampRecord::new(dts, dts)
        }
        [pts, dts, rest @ ..] => {
            if !rest.is_empty() {
                log::warn!(
                    "Line {}: ignoring {} extra timestamp fields",
                    line_number,
                    rest.len()
                );
            }
            let pts = parse_field(pts, "PTS", line_number);
            let dts = parse_field(dts, "DTS", line_number);
            TimestampRecord::new(dts, pts)
        }
    }
}

fn parse_field(field: &str, name: &str, line_number: usize) -> i64 {
    field.parse().unwrap_or_else(|e| {
        log::warn!(
            "Line {}: error converting {} {:?}: {}",
            line_number,
            name,
            field,
            e
        );
        MISSING_TIMESTAMP
    })
}

/// Stable sort by the selected key; pairs within a record never change
pub fn sort_by_key(records: &mut [TimestampRecord], key: TimestampKey) {
    records.sort_by_key(|record| key.of(record));
}

/// Arrange records in the order matching the frames of the YUV files
pub fn order_timestamps(
    mut records: Vec<TimestampRecord>,
    order: FrameOrder,
) -> Vec<TimestampRecord> {
    if let Some(key) = order.sort_key() {
        sort_by_key(&mut records, key);
    }
    records
}

/// Record for `frame`, or the missing sentinel past the end of the metadata
pub fn timestamp_for(records: &[TimestampRecord], frame: usize) -> TimestampRecord {
    records
        .get(frame)
        .copied()
        .unwrap_or_else(TimestampRecord::missing)
}
