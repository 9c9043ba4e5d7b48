//! Parallel per-frame PSNR for raw YUV420 8-bit video
//!
//! Compares the luma plane of every frame of a candidate file against a
//! reference file on a fixed pool of worker threads.
//!
//! Key features:
//! - Lockstep frame-pair reader that skips chroma with a single seek
//! - AVX2 SIMD sum of squared errors with a scalar fallback
//! - Index-partitioned result slots, so frames complete in any order
//! - Optional PTS/DTS annotation in coding or display order

pub mod compare;
pub mod config;
pub mod error;
pub mod frame_reader;
pub mod psnr;
pub mod report;
pub mod timestamps;
pub mod types;
pub mod worker_pool;

pub use compare::*;
pub use config::*;
pub use error::*;
pub use frame_reader::*;
pub use psnr::*;
pub use report::*;
pub use timestamps::*;
pub use types::*;
pub use worker_pool::*;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
