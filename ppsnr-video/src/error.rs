//! Error types for frame comparison

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Which of the two inputs an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Reference,
    Candidate,
}

impl std::fmt::Display for Stream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stream::Reference => f.write_str("reference"),
            Stream::Candidate => f.write_str("candidate"),
        }
    }
}

#[derive(Debug, Error)]
pub enum PsnrError {
    #[error("invalid frame geometry {width}x{height}: both dimensions must be positive")]
    InvalidGeometry { width: u32, height: u32 },

    #[error("cannot open input {path}: {source}")]
    OpenInput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{stream} stream ended inside the luma plane of frame {frame} ({expected} bytes expected)")]
    TruncatedFrame {
        stream: Stream,
        frame: usize,
        expected: usize,
    },

    #[error("luma planes differ in length: reference {reference}, candidate {candidate}")]
    LengthMismatch { reference: usize, candidate: usize },

    #[error("cannot score an empty luma plane")]
    EmptyPlane,

    #[error("frame {frame} is outside the result range 0..{frame_count}")]
    FrameOutOfRange { frame: usize, frame_count: usize },

    #[error("frame {0} was submitted more than once")]
    DuplicateFrame(usize),

    #[error("worker pool no longer accepts work")]
    IntakeClosed,

    #[error("worker {0} panicked")]
    WorkerPanicked(usize),

    #[error("no result was produced for frame {0}")]
    MissingResult(usize),

    #[error("frame {frame} could not be scored: {reason}")]
    Scoring { frame: usize, reason: String },

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, PsnrError>;
