//! End-to-end comparison of two YUV files

use crate::config::PsnrConfig;
use crate::error::{PsnrError, Result};
use crate::frame_reader::FramePairReader;
use crate::report::{annotate, FrameReport};
use crate::timestamps::{order_timestamps, read_timestamps};
use crate::types::FrameGeometry;
use crate::worker_pool::{PoolStats, PsnrResults, PsnrWorkerPool};
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

/// Result of a full run: one row per compared frame
#[derive(Debug, Clone)]
pub struct PsnrReport {
    pub frames: Vec<FrameReport>,
    pub stats: PoolStats,
}

/// Compare the files named by `config` and annotate the results
pub fn calculate_psnr(config: &PsnrConfig) -> Result<PsnrReport> {
    let geometry = config.geometry()?;

    let results = compare_files(&config.reference, &config.candidate, geometry, config.workers)?;

    let timestamps = match &config.timestamps {
        Some(path) => order_timestamps(read_timestamps(path), config.order),
        None => Vec::new(),
    };

    Ok(PsnrReport {
        frames: annotate(&results.values, &timestamps),
        stats: results.stats,
    })
}

/// Open both files, failing before any frame is read if either cannot be opened
pub fn compare_files(
    reference: &Path,
    candidate: &Path,
    geometry: FrameGeometry,
    workers: usize,
) -> Result<PsnrResults> {
    let reference = open_input(reference)?;
    let candidate = open_input(candidate)?;

    compare_streams(reference, candidate, geometry, workers)
}

/// Score every whole frame the two streams have in common
pub fn compare_streams<R, C>(
    reference: R,
    candidate: C,
    geometry: FrameGeometry,
    workers: usize,
) -> Result<PsnrResults>
where
    R: Read + Seek,
    C: Read + Seek,
{
    let reader = FramePairReader::new(reference, candidate, geometry)?;
    let mut pool = PsnrWorkerPool::new(reader.frames_to_compare(), workers)?;

    log::debug!(
        "Comparing {} frames of {}x{} on {} workers",
        reader.frames_to_compare(),
        geometry.width(),
        geometry.height(),
        pool.worker_count()
    );

    // Dropping the pool on error still joins the workers
    for pair in reader {
        let pair = pair?;
        pool.submit(pair.frame, pair.reference, pair.candidate)?;
    }

    pool.finalize()
}

/// Unbuffered: luma reads exceed any buffer and chroma is skipped by seeking
fn open_input(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| PsnrError::OpenInput {
            path: path.to_path_buf(),
            source,
        })
}
