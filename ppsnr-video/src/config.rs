//! Run configuration

use crate::error::Result;
use crate::timestamps::FrameOrder;
use crate::types::{FrameGeometry, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::worker_pool::default_worker_count;
use std::path::PathBuf;

/// Everything one comparison run needs, fixed for its duration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PsnrConfig {
    pub width: u32,
    pub height: u32,
    /// Reference (original) YUV file
    pub reference: PathBuf,
    /// Compressed/output YUV file
    pub candidate: PathBuf,
    /// Optional `PTS,DTS` csv, one line per frame
    pub timestamps: Option<PathBuf>,
    pub order: FrameOrder,
    pub workers: usize,
}

impl PsnrConfig {
    pub fn geometry(&self) -> Result<FrameGeometry> {
        FrameGeometry::new(self.width, self.height)
    }
}

impl Default for PsnrConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            reference: PathBuf::from("input.yuv"),
            candidate: PathBuf::from("output.yuv"),
            timestamps: None,
            order: FrameOrder::Display,
            workers: default_worker_count(),
        }
    }
}
