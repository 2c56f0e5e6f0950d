use clap::{Args, Parser, Subcommand};
use log::info;
use sheet_count::image_io::{
    count_image_file, save_frame, scale_for_display, ImageSequenceSource, ImageSourceError,
};
use sheet_count::{
    RunResult, SequenceAggregator, SheetCountConfig, SheetCountIoError, SheetCountParams,
    SheetCountReport, SheetCounter,
};
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Io(#[from] SheetCountIoError),
    #[error(transparent)]
    Image(#[from] ImageSourceError),
    #[error("no frame could be decoded from {0} input(s)")]
    NoFrames(usize),
    #[error("config file lists no inputs and none were given on the command line")]
    NoInputs,
}

#[derive(Parser, Debug)]
#[command(name = "sheet-count", version, about = "Count stacked paper sheets in images")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Count sheets in one still image at native resolution.
    Image {
        path: PathBuf,
        /// Write the annotated image here.
        #[arg(long)]
        annotated: Option<PathBuf>,
        /// Scale factor applied to the annotated image before writing.
        #[arg(long, default_value_t = 1.0)]
        display_scale: f32,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Run over an ordered image sequence and report the maximum count.
    Frames {
        paths: Vec<PathBuf>,
        /// Write the annotated frame with the maximum count here.
        #[arg(long)]
        best_frame: Option<PathBuf>,
        /// Keep native frame sizes instead of resizing to 600x400.
        #[arg(long)]
        native_size: bool,
        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// JSON config with a `params` block (and optionally inputs/outputs).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Write a JSON report here.
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    if let Err(err) = run(cli.command) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = sheet_count::level_for_verbosity(verbose);
    #[cfg(feature = "tracing")]
    sheet_count::init_tracing_with_level(false, level);
    #[cfg(not(feature = "tracing"))]
    let _ = sheet_count::init_with_level(level);
}

fn load_config(path: Option<&Path>) -> Result<Option<SheetCountConfig>, CliError> {
    Ok(path.map(SheetCountConfig::load_json).transpose()?)
}

fn run(command: Command) -> Result<(), CliError> {
    match command {
        Command::Image {
            path,
            annotated,
            display_scale,
            common,
        } => {
            let config = load_config(common.config.as_deref())?;
            let params = config.map(|c| c.params).unwrap_or_default();
            let counter = SheetCounter::new(params);
            let result = count_image_file(&path, &counter)?;
            info!(
                "{}: {} horizontal lines",
                path.display(),
                result.horizontal.len()
            );
            println!("sheets: {}", result.sheet_count);

            if let Some(out) = annotated {
                let frame = if display_scale == 1.0 {
                    result.annotated.clone()
                } else {
                    scale_for_display(&result.annotated, display_scale)?
                };
                save_frame(&frame, out)?;
            }
            if let Some(report_path) = common.report {
                let run = RunResult {
                    max_sheet_count: Some(result.sheet_count),
                    best_frame_index: Some(0),
                    counts: vec![result.sheet_count],
                    midpoints: vec![result.midpoints],
                    frames_processed: 1,
                    ..RunResult::default()
                };
                let inputs = vec![path.display().to_string()];
                SheetCountReport::from_run(inputs, &run).write_json(report_path)?;
            }
            Ok(())
        }
        Command::Frames {
            paths,
            best_frame,
            native_size,
            common,
        } => {
            let config = load_config(common.config.as_deref())?;
            let (paths, params, video_like, report, best_frame) = match config {
                Some(cfg) => {
                    let paths = if paths.is_empty() {
                        cfg.inputs.iter().map(PathBuf::from).collect()
                    } else {
                        paths
                    };
                    let report = common.report.or_else(|| Some(cfg.report_path()));
                    let best = best_frame.or_else(|| cfg.best_frame_path.map(PathBuf::from));
                    (paths, cfg.params, cfg.video_like && !native_size, report, best)
                }
                None => (
                    paths,
                    SheetCountParams::default(),
                    !native_size,
                    common.report,
                    best_frame,
                ),
            };
            if paths.is_empty() {
                return Err(CliError::NoInputs);
            }

            let requested = paths.len();
            let mut source = ImageSequenceSource::new(paths).canonical_size(video_like);
            let aggregator = SequenceAggregator::new(params);
            let run = aggregator.run_with_observer(&mut source, |index, frame| {
                info!("frame {index}: {} sheets", frame.sheet_count);
            });

            let Some(max) = run.max_sheet_count else {
                return Err(CliError::NoFrames(requested));
            };
            let display = |paths: &[PathBuf]| -> Vec<String> {
                paths.iter().map(|p| p.display().to_string()).collect()
            };
            let report_data = SheetCountReport::from_run(display(source.decoded()), &run)
                .with_skipped(display(source.skipped()));

            println!("max sheets: {max}");
            println!("frames: {}", run.frames_processed);
            if let Some(best) = report_data.best_frame_source() {
                println!("best frame: {best}");
            }
            if !report_data.skipped.is_empty() {
                println!("skipped: {}", report_data.skipped.len());
            }

            if let (Some(out), Some(frame)) = (best_frame, run.best_frame.as_ref()) {
                save_frame(frame, out)?;
            }
            if let Some(report_path) = report {
                report_data.write_json(report_path)?;
            }
            Ok(())
        }
    }
}
