use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use roi_select::{replay, ReplayConfig, SelectionFlow, SelectionParams};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "roi-select", version, about = "Fit images to a canvas and replay ROI selections")]
struct Cli {
    /// Log level for the stderr logger (off, error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "warn")]
    log_level: LevelFilter,
    /// Emit logs through `tracing` as JSON instead of the plain stderr logger.
    #[cfg(feature = "tracing")]
    #[arg(long, global = true)]
    json_logs: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the viewport an image gets on a given screen.
    Fit(FitArgs),
    /// Run a recorded selection from a JSON config and write the report.
    Replay(ReplayArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FlowArg {
    Table,
    Probeta,
}

impl From<FlowArg> for SelectionFlow {
    fn from(flow: FlowArg) -> Self {
        match flow {
            FlowArg::Table => SelectionFlow::Table,
            FlowArg::Probeta => SelectionFlow::Probeta,
        }
    }
}

#[derive(Args, Debug)]
struct FitArgs {
    /// Source image width in pixels.
    #[arg(long)]
    width: f64,
    /// Source image height in pixels.
    #[arg(long)]
    height: f64,
    #[arg(long, default_value_t = 1280.0)]
    screen_width: f64,
    #[arg(long, default_value_t = 800.0)]
    screen_height: f64,
    #[arg(long, value_enum, default_value = "table")]
    flow: FlowArg,
}

#[derive(Args, Debug)]
struct ReplayArgs {
    /// Replay config JSON.
    config: PathBuf,
    /// Report path; overrides `output_path` from the config.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Rendered canvas PNG; overrides `overlay_path` from the config.
    #[arg(long)]
    overlay: Option<PathBuf>,
}

#[derive(Serialize)]
struct FitReport {
    flow: SelectionFlow,
    bounds: roi_select::core::CanvasBounds,
    viewport: roi_select::Viewport,
    surface: [u32; 2],
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    match cli.command {
        Command::Fit(args) => run_fit(args),
        Command::Replay(args) => run_replay(args),
    }
}

fn init_logging(cli: &Cli) -> Result<(), Box<dyn Error>> {
    #[cfg(feature = "tracing")]
    {
        if cli.json_logs {
            roi_select::init_tracing(true);
            return Ok(());
        }
    }
    roi_select::init_with_level(cli.log_level)?;
    Ok(())
}

fn run_fit(args: FitArgs) -> Result<(), Box<dyn Error>> {
    let flow = SelectionFlow::from(args.flow);
    let params = SelectionParams::for_flow(flow);
    let bounds = params.canvas_bounds(args.screen_width, args.screen_height);
    let viewport = roi_select::core::fit_within(args.width, args.height, bounds)?;
    let (sw, sh) = viewport.surface_size();

    let report = FitReport {
        flow,
        bounds,
        viewport,
        surface: [sw, sh],
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run_replay(args: ReplayArgs) -> Result<(), Box<dyn Error>> {
    let cfg = ReplayConfig::load_json(&args.config)?;
    let outcome = replay(&cfg)?;

    let report_path = args.out.unwrap_or_else(|| cfg.output_path());
    outcome.report.write_json(&report_path)?;
    println!("wrote replay report to {}", report_path.display());

    let overlay_path = args
        .overlay
        .or_else(|| cfg.overlay_path.as_ref().map(PathBuf::from));
    match (overlay_path, outcome.canvas) {
        (Some(path), Some(canvas)) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            canvas.save(&path)?;
            println!("wrote canvas to {}", path.display());
        }
        (Some(path), None) => {
            log::warn!(
                "no image was rendered; skipping canvas output {}",
                path.display()
            );
        }
        (None, _) => {}
    }

    match outcome.report.confirmed {
        Some(roi) => println!("confirmed roi {roi}"),
        None => println!("no roi confirmed"),
    }
    Ok(())
}
