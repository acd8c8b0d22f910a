use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use qbench_plots::PngRenderer;
use qbench_rs::{
    AnalysisError, AnalysisOptions, ChartStatus, PipelineConfig, PipelineReport, ThreadAxis, run,
};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;
use tracing::debug;

/// qbench - charts for concurrent-queue benchmark results
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "qbench")]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load every result file and regenerate all charts (the default)
    Run(RunArgs),
}

#[derive(Args, Debug, Clone)]
struct RunArgs {
    /// Directory holding the harness CSV files; charts are written here too
    #[arg(short, long, value_name = "DIR", default_value = "results")]
    results_dir: PathBuf,

    /// Thread count plotted on the scaling chart: producers (p), consumers (c) or total (p+c)
    #[arg(short, long, value_name = "AXIS", default_value = "producers", value_parser = ThreadAxis::from_str)]
    thread_axis: ThreadAxis,

    /// Draw one row of scaling panels per allocation mode
    #[arg(long)]
    split_modes: bool,

    /// Print the report as JSON instead of the text summary
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl RunArgs {
    fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            results_dir: self.results_dir.clone(),
            analysis: AnalysisOptions {
                thread_axis: self.thread_axis,
                split_scaling_by_mode: self.split_modes,
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    // stderr keeps --json output clean
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_report(report: &PipelineReport, elapsed_s: f64) {
    println!(
        "📂 Loaded {} row(s) from {} file(s)",
        report.records,
        report.files.len()
    );
    if !report.malformed.is_empty() {
        println!("   ⚠️  Dropped {} malformed row(s)", report.malformed.len());
    }
    match report.axes.payload_us {
        Some(payload) => println!("   Fixed payload for thread sweeps: {}μs", payload),
        None => println!("   No thread sweep found"),
    }
    match report.axes.threads {
        Some(threads) => println!("   Fixed P for payload sweeps: {}", threads),
        None => println!("   No payload sweep found"),
    }

    println!("\n📊 Charts:");
    for chart in &report.charts {
        match &chart.status {
            ChartStatus::Saved { path } => println!("   ✅ Saved: {}", path.display()),
            ChartStatus::Skipped { reason } => {
                println!("   ⚠️  Skipped {} chart: {}", chart.family, reason)
            }
            ChartStatus::Failed { path, error } => {
                println!("   ❌ Failed {}: {}", path.display(), error)
            }
        }
    }

    println!("\n{}", report.summary);
    println!("\n⏱️  Total time: {:.2}s", elapsed_s);
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let args = match cli.command {
        Some(Command::Run(args)) => args,
        None => cli.run,
    };
    init_tracing(args.verbose);
    debug!("{:?}", args);

    let start_time = Instant::now();
    let config = args.pipeline_config();
    let renderer = PngRenderer::default();

    let report = match run(&config, &renderer) {
        Ok(report) => report,
        Err(AnalysisError::MissingInput(reason)) => {
            if args.json {
                println!("{}", serde_json::json!({ "error": "missing_input", "reason": reason }));
            } else {
                println!("⚠️  No usable input: {}", reason);
                println!("   Run the benchmark harness first to populate {}", config.results_dir.display());
            }
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("🚀 qbench - queue benchmark charts");
        println!("==================================\n");
        print_report(&report, start_time.elapsed().as_secs_f64());
    }

    Ok(())
}
