//! Long Exposure Screenshot CLI
//!
//! Interactive terminal wizard for capturing, averaging, tone-mapping and
//! saving long-exposure screenshots. With `--output` it captures once and
//! exits.

use clap::Parser;
use long_exposure::{
    capture::{PrimaryScreen, ScreenSource, SyntheticScreen, UNSUPPORTED_HINT},
    session::{FileConfig, SessionEnd, StopSignal, SystemClock},
    shell::{self, Session, Wizard},
    tonemap::Gamma,
};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn, Level};

/// Average screenshots over time into a long-exposure image.
#[derive(Debug, Parser)]
#[command(name = "long-exposure", version)]
struct Cli {
    /// Seconds between captures
    #[arg(long)]
    interval: Option<f64>,

    /// Total capture window in seconds
    #[arg(long)]
    duration: Option<u64>,

    /// Countdown before capture starts, in seconds
    #[arg(long)]
    delay: Option<u64>,

    /// Initial tone-mapping exponent
    #[arg(long)]
    gamma: Option<Gamma>,

    /// TOML file with default settings
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Capture a generated test pattern instead of the screen.
    /// Required unless the binary was built with `--features screen`.
    #[arg(long)]
    synthetic: bool,

    /// Capture once, save to PATH and exit
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn log_level(&self) -> Level {
        match self.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }

    /// Layers CLI flags over the file configuration.
    fn apply(&self, config: &mut FileConfig) {
        if let Some(interval) = self.interval {
            config.session.interval_secs = interval;
        }
        if let Some(duration) = self.duration {
            config.session.duration_secs = duration;
        }
        if let Some(delay) = self.delay {
            config.session.delay_secs = delay;
        }
        if let Some(gamma) = self.gamma {
            config.output.gamma = gamma;
        }
    }

    fn source(&self) -> Box<dyn ScreenSource> {
        if self.synthetic {
            Box::new(SyntheticScreen::new())
        } else {
            Box::new(PrimaryScreen::new())
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so they never interleave with wizard output.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(cli.log_level().into()),
        )
        .with_writer(io::stderr)
        .init();

    info!("Long Exposure v{}", long_exposure::VERSION);

    let mut config = match &cli.config {
        Some(path) => match FileConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{}: {}", path.display(), e);
                std::process::exit(2);
            }
        },
        None => FileConfig::default(),
    };
    cli.apply(&mut config);
    if let Err(e) = config.session.validate() {
        eprintln!("{e}");
        std::process::exit(2);
    }

    // Fail before any prompt rather than after a full countdown.
    if !cli.synthetic && !PrimaryScreen::is_supported() {
        eprintln!("error: {UNSUPPORTED_HINT}");
        std::process::exit(2);
    }

    let stop = StopSignal::new();
    let handler_stop = stop.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        // Outside a capture, Ctrl-C quits as usual.
        if !handler_stop.trigger() {
            std::process::exit(130);
        }
    }) {
        warn!("Could not install Ctrl-C handler: {}", e);
    }

    if let Some(path) = &cli.output {
        run_once(&cli, &config, &stop, path);
        return;
    }

    let stdin = io::stdin();
    let mut wizard = Wizard::new(
        stdin.lock(),
        io::stdout(),
        SystemClock::new(),
        || cli.source(),
        stop,
        Session::new(config.session, &config.output),
    );
    if let Err(e) = wizard.run() {
        eprintln!("Terminal error: {e}");
        std::process::exit(1);
    }
}

fn run_once(cli: &Cli, config: &FileConfig, stop: &StopSignal, path: &Path) {
    let result = shell::capture_to_file(
        config.session,
        config.output.gamma,
        cli.source(),
        SystemClock::new(),
        stop,
        path,
    );

    match result {
        Ok(report) => {
            println!("Image successfully saved as: {}", report.path.display());
            match &report.end {
                SessionEnd::Completed => info!(frames = report.frames, "Done"),
                SessionEnd::Cancelled => {
                    eprintln!("Stopped early after {} frames.", report.frames);
                }
                SessionEnd::Failed(e) => {
                    eprintln!("Capture failed after {} frames: {}", report.frames, e);
                    std::process::exit(1);
                }
            }
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
