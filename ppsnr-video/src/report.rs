//! Output rows pairing each frame's PSNR with its timestamps

use crate::timestamps::timestamp_for;
use crate::types::TimestampRecord;
use std::fmt;

/// One line of output
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub frame: usize,
    pub dts: i64,
    pub pts: i64,
    pub psnr: f64,
}

impl fmt::Display for FrameReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PSNR for frame {} DTS {:>10} PTS {:>10} is {:.2}",
            self.frame, self.dts, self.pts, self.psnr
        )
    }
}

/// Zip ordered PSNR values with ordered timestamps by frame index
pub fn annotate(values: &[f64], timestamps: &[TimestampRecord]) -> Vec<FrameReport> {
    if !timestamps.is_empty() && timestamps.len() != values.len() {
        log::warn!(
            "{} timestamp records for {} frames",
            timestamps.len(),
            values.len()
        );
    }

    values
        .iter()
        .enumerate()
        .map(|(frame, &psnr)| {
            let TimestampRecord { dts, pts } = timestamp_for(timestamps, frame);
            FrameReport {
                frame,
                dts,
                pts,
                psnr,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_format() {
        let row = FrameReport {
            frame: 2,
            dts: 1,
            pts: 3,
            psnr: 37.6389,
        };
        assert_eq!(
            row.to_string(),
            "PSNR for frame 2 DTS          1 PTS          3 is 37.64"
        );
    }

    #[test]
    fn test_missing_timestamps_print_sentinel() {
        let rows = annotate(&[100.0, 36.631], &[]);
        assert_eq!(
            rows[1].to_string(),
            "PSNR for frame 1 DTS         -1 PTS         -1 is 36.63"
        );
        assert_eq!(rows[0].psnr, 100.0);
    }

    #[test]
    fn test_short_metadata_pads_with_sentinel() {
        let rows = annotate(&[1.0, 2.0], &[TimestampRecord::new(7, 8)]);
        assert_eq!((rows[0].dts, rows[0].pts), (7, 8));
        assert_eq!((rows[1].dts, rows[1].pts), (-1, -1));
    }
}
