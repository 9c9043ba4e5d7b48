//! Frame layout types and constants

use crate::error::{PsnrError, Result};

/// Default width used when none is given (720p).
pub const DEFAULT_WIDTH: u32 = 1280;
/// Default height used when none is given (720p).
pub const DEFAULT_HEIGHT: u32 = 720;

/// Sentinel printed for a frame without timestamp metadata.
pub const MISSING_TIMESTAMP: i64 = -1;

/// Luma plane of a single frame, `width * height` samples.
pub type LumaBuffer = Vec<u8>;

/// Geometry of a planar YUV 4:2:0 8-bit frame
///
/// Layout on disk is Y (`width * height`), U and V (`width * height / 4` each),
/// with no header and no padding between frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameGeometry {
    width: u32,
    height: u32,
}

impl FrameGeometry {
    /// Create a geometry, rejecting zero dimensions.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(PsnrError::InvalidGeometry { width, height });
        }

        Ok(Self { width, height })
    }

    pub fn width(self) -> u32 {
        self.width
    }

    pub fn height(self) -> u32 {
        self.height
    }

    /// Size of the Y plane in bytes
    pub fn luma_size(self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Combined size of the U and V planes in bytes (truncating division)
    pub fn chroma_size(self) -> usize {
        self.luma_size() / 2
    }

    /// Size of one whole frame in bytes
    pub fn frame_size(self) -> usize {
        self.luma_size() + self.chroma_size()
    }

    /// Number of whole frames contained in `byte_len` bytes
    pub fn whole_frames(self, byte_len: u64) -> u64 {
        byte_len / self.frame_size() as u64
    }
}

impl Default for FrameGeometry {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

/// Decode/presentation timestamp pair for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimestampRecord {
    pub dts: i64,
    pub pts: i64,
}

impl TimestampRecord {
    pub fn new(dts: i64, pts: i64) -> Self {
        Self { dts, pts }
    }

    /// Record used for frames past the end of the metadata
    pub fn missing() -> Self {
        Self {
            dts: MISSING_TIMESTAMP,
            pts: MISSING_TIMESTAMP,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_i420_sizes() {
        let geometry = FrameGeometry::new(176, 144).unwrap();
        assert_eq!(geometry.luma_size(), 25_344);
        assert_eq!(geometry.chroma_size(), 12_672);
        assert_eq!(geometry.frame_size(), 38_016);
    }

    #[test]
    fn test_default_geometry_is_720p() {
        let geometry = FrameGeometry::default();
        assert_eq!(geometry.width(), 1280);
        assert_eq!(geometry.height(), 720);
        assert_eq!(geometry.frame_size(), 1280 * 720 * 3 / 2);
    }

    #[test]
    fn test_odd_dimensions_truncate_chroma() {
        let geometry = FrameGeometry::new(3, 3).unwrap();
        assert_eq!(geometry.luma_size(), 9);
        assert_eq!(geometry.chroma_size(), 4);
        assert_eq!(geometry.frame_size(), 13);
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(matches!(
            FrameGeometry::new(0, 720),
            Err(PsnrError::InvalidGeometry { width: 0, height: 720 })
        ));
        assert!(FrameGeometry::new(1280, 0).is_err());
    }

    #[test]
    fn test_whole_frames() {
        let geometry = FrameGeometry::new(4, 4).unwrap();
        assert_eq!(geometry.frame_size(), 24);
        assert_eq!(geometry.whole_frames(0), 0);
        assert_eq!(geometry.whole_frames(23), 0);
        assert_eq!(geometry.whole_frames(24 * 3 + 5), 3);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_large_geometry_does_not_overflow() {
        let geometry = FrameGeometry::new(65_536, 65_536).unwrap();
        assert_eq!(geometry.luma_size(), 1usize << 32);
    }
}
