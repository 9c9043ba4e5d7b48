//! Contains [Args], which are parsed command-line flags.

use clap::{ArgAction, Parser, ValueEnum};
use ppsnr_video::{default_worker_count, FrameOrder, PsnrConfig, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use std::path::PathBuf;

/// Parsed command line arguments.
///
/// `-h` selects the height, so help is only available as `--help`.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(
    name = "ppsnr",
    version,
    about = "Calculate the luma PSNR of every frame between a reference YUV420 (8-bit) file and another YUV file.",
    override_usage = "ppsnr -w WIDTH -h HEIGHT -r REF_YUV -c COMPR_YUV [-v] [-d PTSDTS] [--coding-order]",
    disable_help_flag = true
)]
pub struct Args {
    /// Width of video
    #[arg(short, long, default_value_t = DEFAULT_WIDTH, value_parser = clap::value_parser!(u32).range(1..))]
    pub width: u32,

    /// Height of video
    #[arg(short = 'h', long, default_value_t = DEFAULT_HEIGHT, value_parser = clap::value_parser!(u32).range(1..))]
    pub height: u32,

    /// Reference YUV
    #[arg(short, long = "reference", value_name = "REF_YUV", default_value = "input.yuv")]
    pub reference: PathBuf,

    /// Compressed/Output YUV
    #[arg(short, long = "candidate", value_name = "COMPR_YUV", default_value = "output.yuv")]
    pub candidate: PathBuf,

    /// File containing PTS,DTS values for each picture as csv (PTS,DTS)
    #[arg(short = 'd', long = "timestamps", value_name = "PTSDTS")]
    pub timestamps: Option<PathBuf>,

    /// Assume YUV in coding order (timestamps are not reordered)
    #[arg(long, conflicts_with = "order")]
    pub coding_order: bool,

    /// Order of the frames in the YUV files
    #[arg(long, value_enum)]
    pub order: Option<OrderArg>,

    /// Number of worker threads (defaults to the number of CPU cores)
    #[arg(short = 'j', long, value_parser = clap::value_parser!(u64).range(1..))]
    pub workers: Option<u64>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    pub help: Option<bool>,
}

impl Args {
    pub fn frame_order(&self) -> FrameOrder {
        match (self.coding_order, self.order) {
            (true, _) => FrameOrder::Coding,
            (false, Some(order)) => order.into(),
            (false, None) => FrameOrder::Display,
        }
    }
}

impl From<&Args> for PsnrConfig {
    fn from(args: &Args) -> Self {
        PsnrConfig {
            width: args.width,
            height: args.height,
            reference: args.reference.clone(),
            candidate: args.candidate.clone(),
            timestamps: args.timestamps.clone(),
            order: args.frame_order(),
            workers: args
                .workers
                .map(|n| n as usize)
                .unwrap_or_else(default_worker_count),
        }
    }
}

/// Command-line spelling of [FrameOrder].
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderArg {
    /// Sort timestamps by PTS.
    Display,
    /// Keep timestamps in file order.
    Coding,
    /// Sort timestamps by DTS.
    Decode,
}

impl From<OrderArg> for FrameOrder {
    fn from(order: OrderArg) -> Self {
        match order {
            OrderArg::Display => FrameOrder::Display,
            OrderArg::Coding => FrameOrder::Coding,
            OrderArg::Decode => FrameOrder::Decode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("ppsnr").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]).unwrap();
        assert_eq!(args.width, 1280);
        assert_eq!(args.height, 720);
        assert_eq!(args.reference, PathBuf::from("input.yuv"));
        assert_eq!(args.candidate, PathBuf::from("output.yuv"));
        assert_eq!(args.timestamps, None);
        assert!(!args.verbose);
        assert_eq!(args.frame_order(), FrameOrder::Display);
    }

    #[test]
    fn test_short_flags() {
        let args = parse(&[
            "-w", "176", "-h", "144", "-r", "ref.yuv", "-c", "out.yuv", "-d", "ts.csv", "-v",
        ])
        .unwrap();

        let config = PsnrConfig::from(&args);
        assert_eq!((config.width, config.height), (176, 144));
        assert_eq!(config.reference, PathBuf::from("ref.yuv"));
        assert_eq!(config.candidate, PathBuf::from("out.yuv"));
        assert_eq!(config.timestamps, Some(PathBuf::from("ts.csv")));
        assert!(args.verbose);
    }

    #[test]
    fn test_coding_order_flag() {
        let args = parse(&["--coding-order"]).unwrap();
        assert_eq!(args.frame_order(), FrameOrder::Coding);

        let args = parse(&["--order", "decode"]).unwrap();
        assert_eq!(args.frame_order(), FrameOrder::Decode);

        assert!(parse(&["--coding-order", "--order", "display"]).is_err());
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(parse(&["-w", "0"]).is_err());
        assert!(parse(&["-h", "0"]).is_err());
        assert!(parse(&["-h", "-5"]).is_err());
    }

    #[test]
    fn test_workers() {
        let config = PsnrConfig::from(&parse(&["-j", "3"]).unwrap());
        assert_eq!(config.workers, 3);
        assert!(parse(&["--workers", "0"]).is_err());

        let config = PsnrConfig::from(&parse(&[]).unwrap());
        assert!(config.workers >= 1);
    }

    #[test]
    fn test_long_help_only() {
        let err = parse(&["--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }
}
