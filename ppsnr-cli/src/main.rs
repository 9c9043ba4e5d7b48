//! `ppsnr`: per-frame luma PSNR between a reference and a compressed YUV file.

mod args;

use anyhow::{Context, Result};
use args::Args;
use clap::Parser;
use ppsnr_video::{calculate_psnr, default_worker_count, PsnrConfig};
use std::io::{self, BufWriter, Write};

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    if let Err(e) = run(&args, &mut out).and_then(|()| out.flush().map_err(Into::into)) {
        drop(out);
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins; otherwise warnings only, or debug output with `--verbose`.
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn run<W: Write>(args: &Args, out: &mut W) -> Result<()> {
    let config = PsnrConfig::from(args);

    if args.verbose {
        writeln!(out, "Number of CPU cores {}", default_worker_count())?;
    }
    log::debug!("Configuration: {:?}", config);

    let report = calculate_psnr(&config).with_context(|| {
        format!(
            "comparing {} against {}",
            config.candidate.display(),
            config.reference.display()
        )
    })?;

    for frame in &report.frames {
        writeln!(out, "{}", frame)?;
    }

    log::debug!("Frames per worker: {:?}", report.stats.tasks_per_worker);
    Ok(())
}
