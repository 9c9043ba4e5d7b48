//! Lockstep reader over two raw YUV420 streams
//!
//! Only the luma plane of each frame is read; the chroma planes are skipped
//! with a relative seek. Both streams advance strictly forward.

use crate::error::{PsnrError, Result, Stream};
use crate::types::{FrameGeometry, LumaBuffer};
use std::io::{self, Read, Seek, SeekFrom};

/// Luma planes of one frame from both inputs
#[derive(Debug)]
pub struct FramePair {
    pub frame: usize,
    pub reference: LumaBuffer,
    pub candidate: LumaBuffer,
}

/// Reads luma planes from a reference and a candidate stream in lockstep
pub struct FramePairReader<R, C> {
    reference: R,
    candidate: C,
    geometry: FrameGeometry,
    frames_to_compare: usize,
    next_frame: usize,
    failed: bool,
}

impl<R: Read + Seek, C: Read + Seek> FramePairReader<R, C> {
    /// Create a reader positioned at the first frame of both streams
    ///
    /// The number of frames to compare is the smaller whole-frame count of
    /// the two streams.
    pub fn new(mut reference: R, mut candidate: C, geometry: FrameGeometry) -> Result<Self> {
        let reference_frames = geometry.whole_frames(stream_len(&mut reference)?);
        let candidate_frames = geometry.whole_frames(stream_len(&mut candidate)?);

        if reference_frames != candidate_frames {
            log::info!(
                "Frame count differs (reference {}, candidate {}), comparing the first {}",
                reference_frames,
                candidate_frames,
                reference_frames.min(candidate_frames)
            );
        }

        Ok(Self {
            reference,
            candidate,
            geometry,
            frames_to_compare: reference_frames.min(candidate_frames) as usize,
            next_frame: 0,
            failed: false,
        })
    }

    pub fn frames_to_compare(&self) -> usize {
        self.frames_to_compare
    }

    pub fn geometry(&self) -> FrameGeometry {
        self.geometry
    }

    /// Read the next frame pair, or `None` once every frame was read
    pub fn read_next(&mut self) -> Result<Option<FramePair>> {
        if self.failed || self.next_frame >= self.frames_to_compare {
            return Ok(None);
        }

        let frame = self.next_frame;
        let result = self.read_frame(frame);
        match result {
            Ok(pair) => {
                self.next_frame += 1;
                Ok(Some(pair))
            }
            Err(e) => {
                self.failed = true;
                Err(e)
            }
        }
    }

    fn read_frame(&mut self, frame: usize) -> Result<FramePair> {
        let luma_size = self.geometry.luma_size();
        let skip = self.geometry.chroma_size() as i64;

        let reference = read_luma(&mut self.reference, luma_size, frame, Stream::Reference)?;
        let candidate = read_luma(&mut self.candidate, luma_size, frame, Stream::Candidate)?;

        // Skip U and V
        self.reference.seek(SeekFrom::Current(skip))?;
        self.candidate.seek(SeekFrom::Current(skip))?;

        Ok(FramePair {
            frame,
            reference,
            candidate,
        })
    }
}

impl<R: Read + Seek, C: Read + Seek> Iterator for FramePairReader<R, C> {
    type Item = Result<FramePair>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_next().transpose()
    }
}

/// Length of a stream in bytes; leaves the stream at its start
fn stream_len<S: Seek>(stream: &mut S) -> Result<u64> {
    let len = stream.seek(SeekFrom::End(0))?;
    stream.seek(SeekFrom::Start(0))?;
    Ok(len)
}

fn read_luma<S: Read>(
    stream: &mut S,
    luma_size: usize,
    frame: usize,
    which: Stream,
) -> Result<LumaBuffer> {
    let mut buffer = vec![0u8; luma_size];

    match stream.read_exact(&mut buffer) {
        Ok(()) => Ok(buffer),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(PsnrError::TruncatedFrame {
            stream: which,
            frame,
            expected: luma_size,
        }),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Build a stream where every luma sample of frame `n` is `n`, chroma is 0xFF.
    fn stream(geometry: FrameGeometry, frames: usize) -> Vec<u8> {
        let mut data = Vec::with_capacity(geometry.frame_size() * frames);
        for n in 0..frames {
            data.extend(std::iter::repeat(n as u8).take(geometry.luma_size()));
            data.extend(std::iter::repeat(0xFF).take(geometry.chroma_size()));
        }
        data
    }

    #[test]
    fn test_reads_only_luma() {
        let geometry = FrameGeometry::new(8, 4).unwrap();
        let data = stream(geometry, 3);
        let reader =
            FramePairReader::new(Cursor::new(data.clone()), Cursor::new(data), geometry).unwrap();
        assert_eq!(reader.geometry(), geometry);

        let pairs: Vec<_> = reader.collect::<Result<_>>().unwrap();
        assert_eq!(pairs.len(), 3);
        for (n, pair) in pairs.iter().enumerate() {
            assert_eq!(pair.frame, n);
            assert_eq!(pair.reference.len(), 32);
            assert!(pair.reference.iter().all(|&s| s == n as u8));
            assert!(pair.candidate.iter().all(|&s| s == n as u8));
        }
    }

    #[test]
    fn test_frames_to_compare_is_minimum() {
        let geometry = FrameGeometry::new(4, 4).unwrap();
        let long = stream(geometry, 5);
        let short = stream(geometry, 2);

        let reader = FramePairReader::new(
            Cursor::new(long.clone()),
            Cursor::new(short.clone()),
            geometry,
        )
        .unwrap();
        assert_eq!(reader.frames_to_compare(), 2);
        assert_eq!(reader.count(), 2);

        let reader =
            FramePairReader::new(Cursor::new(short), Cursor::new(long), geometry).unwrap();
        assert_eq!(reader.frames_to_compare(), 2);
    }

    #[test]
    fn test_partial_trailing_frame_ignored() {
        let geometry = FrameGeometry::new(4, 4).unwrap();
        let mut data = stream(geometry, 2);
        data.extend([1, 2, 3]);

        let reader =
            FramePairReader::new(Cursor::new(data.clone()), Cursor::new(data), geometry).unwrap();
        assert_eq!(reader.frames_to_compare(), 2);
    }

    #[test]
    fn test_empty_stream_has_no_frames() {
        let geometry = FrameGeometry::new(4, 4).unwrap();
        let mut reader =
            FramePairReader::new(Cursor::new(Vec::new()), Cursor::new(Vec::new()), geometry)
                .unwrap();
        assert_eq!(reader.frames_to_compare(), 0);
        assert!(reader.read_next().unwrap().is_none());
    }

    /// Reports a fixed length but serves fewer bytes, like a file truncated mid-run.
    struct ShrunkStream {
        inner: Cursor<Vec<u8>>,
        reported_len: u64,
    }

    impl Read for ShrunkStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.inner.read(buf)
        }
    }

    impl Seek for ShrunkStream {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            match pos {
                SeekFrom::End(offset) => Ok((self.reported_len as i64 + offset) as u64),
                other => self.inner.seek(other),
            }
        }
    }

    #[test]
    fn test_short_read_is_truncated_frame() {
        let geometry = FrameGeometry::new(4, 4).unwrap();
        let full = stream(geometry, 2);
        let mut cut = full.clone();
        cut.truncate(geometry.frame_size() + 5);

        let candidate = ShrunkStream {
            inner: Cursor::new(cut),
            reported_len: full.len() as u64,
        };
        let mut reader = FramePairReader::new(Cursor::new(full), candidate, geometry).unwrap();
        assert_eq!(reader.frames_to_compare(), 2);

        assert!(reader.read_next().unwrap().is_some());
        let err = reader.read_next().unwrap_err();
        assert!(matches!(
            err,
            PsnrError::TruncatedFrame {
                stream: Stream::Candidate,
                frame: 1,
                expected: 16
            }
        ));

        // Reader stays stopped after a failure
        assert!(reader.read_next().unwrap().is_none());
    }
}
