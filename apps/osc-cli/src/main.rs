use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::RecvTimeoutError;
use std::time::{Duration, Instant};

use osc_app::{
    AppError, AppResult, OscConfig, SimWorker, SpringFigure, WorkerMessage, compare, load_config,
    save_config,
};
use osc_sim::{
    FrameSample, FrameSink, IntegratorKind, NoPacing, Run, RunReport, Termination, run_to_sink,
};
use tracing::warn;
use tracing_subscriber::EnvFilter;

const SPRING_COLUMNS: usize = 48;
const REDRAW_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Parser)]
#[command(name = "osc-cli")]
#[command(about = "Spring oscillator demo - Euler vs RK4 integration", long_about = None)]
struct Cli {
    /// Log every frame (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Animate the spring in the terminal while a worker integrates it
    Run(RunArgs),
    /// Print every frame without pacing
    Frames {
        #[command(flatten)]
        args: RunArgs,
        /// Output format
        #[arg(long, value_enum, default_value_t = FrameFormat::Text)]
        format: FrameFormat,
    },
    /// Compare Euler and RK4 against the analytic solution
    Compare(RunArgs),
    /// Print (or save) the effective configuration as YAML
    ShowConfig {
        #[command(flatten)]
        args: RunArgs,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Clone)]
struct RunArgs {
    /// YAML config file; flags below override its fields
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Integrator: euler or rk4
    #[arg(long)]
    integrator: Option<IntegratorKind>,
    /// Natural frequency w0 (rad/s)
    #[arg(long)]
    w0: Option<f64>,
    /// Time step in seconds
    #[arg(long)]
    dt: Option<f64>,
    /// Number of frames
    #[arg(long)]
    steps: Option<usize>,
    /// Delay between frames in milliseconds (0 = full speed)
    #[arg(long)]
    delay_ms: Option<u64>,
}

#[derive(Clone, Copy, ValueEnum)]
enum FrameFormat {
    Text,
    Json,
}

fn main() -> AppResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run(args) => cmd_run(&resolve_config(&args)?),
        Commands::Frames { args, format } => cmd_frames(&resolve_config(&args)?, format),
        Commands::Compare(args) => cmd_compare(&resolve_config(&args)?),
        Commands::ShowConfig { args, output } => {
            cmd_show_config(&resolve_config(&args)?, output.as_deref())
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn resolve_config(args: &RunArgs) -> AppResult<OscConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => OscConfig::default(),
    };
    if let Some(kind) = args.integrator {
        config.run.integrator = kind;
    }
    if let Some(w0) = args.w0 {
        config.oscillator.natural_frequency = w0;
    }
    if let Some(dt) = args.dt {
        config.run.step_size = dt;
    }
    if let Some(steps) = args.steps {
        config.run.step_count = steps;
    }
    if let Some(delay) = args.delay_ms {
        config.pacing.frame_delay_ms = delay;
    }
    config.validate()?;
    Ok(config)
}

fn cmd_run(config: &OscConfig) -> AppResult<()> {
    let params = config.params();
    println!(
        "Spring simulation: {} w0={} dt={} n={}",
        config.run.integrator, params.natural_frequency, params.step_size, params.step_count
    );

    let worker = SimWorker::from_config(config)?;
    let mut last_drawn = 0;
    let mut last_redraw = Instant::now();

    let report = loop {
        if last_redraw.elapsed() >= REDRAW_INTERVAL {
            if let Some((sequence, frame)) = worker.mailbox().latest_with_sequence() {
                if sequence != last_drawn {
                    draw_frame(&frame);
                    last_drawn = sequence;
                }
            }
            last_redraw = Instant::now();
        }

        match worker.progress_rx.recv_timeout(REDRAW_INTERVAL) {
            Ok(WorkerMessage::Finished(report)) => break report,
            Ok(WorkerMessage::Started { .. }) | Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                return Err(AppError::Worker(
                    "simulation worker stopped unexpectedly".to_string(),
                ));
            }
        }
    };

    if let Some(frame) = worker.latest() {
        draw_frame(&frame);
    }
    println!();
    worker.join()?;
    print_report(&report);
    Ok(())
}

fn draw_frame(frame: &FrameSample) {
    print!("\r{}", render_frame(frame, SPRING_COLUMNS));
    let _ = io::stdout().flush();
}

/// One text line: the spring stretched to the mass position, plus readouts.
fn render_frame(frame: &FrameSample, columns: usize) -> String {
    let figure = SpringFigure::layout(frame.position);
    let travel = columns.saturating_sub(3);
    let coil = (figure.travel_fraction() * travel as f64).round() as usize;
    format!(
        "|{}[#]{}|  t={:>8.3}  x={:>11.8}  analytic={:>11.8}",
        "~".repeat(coil),
        " ".repeat(travel - coil),
        frame.time,
        frame.position,
        frame.analytic_position
    )
}

fn print_report(report: &RunReport) {
    match &report.termination {
        Termination::Completed => {
            println!("✓ {} run completed: {} frames", report.kind, report.samples_emitted)
        }
        Termination::Partial { error } => println!(
            "✗ {} run stopped after {} frames: {}",
            report.kind, report.samples_emitted, error
        ),
        Termination::Cancelled => println!(
            "- {} run cancelled after {} frames",
            report.kind, report.samples_emitted
        ),
    }
}

/// Writes each frame to stdout as it arrives.
struct StdoutSink {
    format: FrameFormat,
    out: io::StdoutLock<'static>,
    failed: bool,
}

impl StdoutSink {
    fn new(format: FrameFormat) -> Self {
        Self {
            format,
            out: io::stdout().lock(),
            failed: false,
        }
    }

    fn write_sample(&mut self, sample: &FrameSample) -> io::Result<()> {
        match self.format {
            FrameFormat::Text => writeln!(
                self.out,
                "t: {:.4}\tx: {:.8}\tanalytic: {:.8}",
                sample.time, sample.position, sample.analytic_position
            ),
            FrameFormat::Json => {
                serde_json::to_writer(&mut self.out, sample)?;
                writeln!(self.out)
            }
        }
    }
}

impl FrameSink for StdoutSink {
    fn accept(&mut self, sample: FrameSample) {
        if self.failed {
            return;
        }
        if let Err(e) = self.write_sample(&sample) {
            warn!(error = %e, "failed to write frame, dropping further output");
            self.failed = true;
        }
    }
}

fn cmd_frames(config: &OscConfig, format: FrameFormat) -> AppResult<()> {
    let run = Run::spring(config.run.integrator, config.params())?;
    let mut sink = StdoutSink::new(format);
    let report = run_to_sink(run, &mut sink, &mut NoPacing, None);
    sink.out.flush()?;
    drop(sink);

    if !report.is_complete() {
        print_report(&report);
    }
    Ok(())
}

fn cmd_compare(config: &OscConfig) -> AppResult<()> {
    let params = config.params();
    println!(
        "Comparing integrators: w0={} dt={} n={} (t_end={:.3} s)",
        params.natural_frequency,
        params.step_size,
        params.step_count,
        params.duration()
    );

    let summaries = compare(params)?;
    println!(
        "\n  {:<8} {:>8} {:>14} {:>14} {:>14}",
        "method", "frames", "max |err|", "final err", "energy drift"
    );
    for s in &summaries {
        println!(
            "  {:<8} {:>8} {:>14.3e} {:>14.3e} {:>13.3}%",
            s.kind.to_string(),
            s.samples,
            s.max_abs_error,
            s.final_error,
            100.0 * s.energy_drift()
        );
    }
    Ok(())
}

fn cmd_show_config(config: &OscConfig, output: Option<&Path>) -> AppResult<()> {
    if let Some(path) = output {
        save_config(path, config)?;
        println!("✓ Config written to {}", path.display());
    } else {
        print!("{}", serde_yaml::to_string(config)?);
    }
    Ok(())
}
