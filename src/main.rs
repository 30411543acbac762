//! Tile Motion CLI
//!
//! Runs the motion detector against a webcam (with the `camera` feature)
//! or against a synthetic scene, speaking or logging alerts.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tile_motion::{
    alert::{CommandNotifier, FanoutNotifier, LogNotifier},
    capture::{ConfigError, FileConfig, MockVideoSource, SourceConfig, SourceError, VideoSource},
    detector::{Detector, DetectorError, TickOutcome},
    metrics::MetricsSnapshot,
    preview,
};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Use the synthetic scene instead of a webcam
    #[arg(long)]
    mock: bool,

    /// Webcam device index
    #[arg(short, long)]
    device: Option<u32>,

    /// Program to run with the alert message (e.g. espeak)
    #[arg(long)]
    alert_command: Option<String>,

    /// Write the latest diff preview to this image file
    #[arg(long)]
    preview: Option<PathBuf>,

    /// Serve Prometheus metrics on this port (needs the `metrics` feature)
    #[arg(long)]
    metrics_port: Option<u16>,

    /// Stop after this many ticks (0 runs until interrupted)
    #[arg(long)]
    ticks: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Detector(#[from] DetectorError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("failed to install signal handler: {0}")]
    Signal(#[from] ctrlc::Error),
    #[error("metrics setup failed: {0}")]
    Metrics(String),
}

/// Video source driven by the host loop.
trait HostSource {
    /// Called once per tick before the detector samples.
    fn step(&mut self, _dt: Duration) {}

    fn as_source(&mut self) -> &mut dyn VideoSource;
}

/// Synthetic scene: a white block appears and disappears every few seconds.
struct DemoScene {
    source: MockVideoSource,
    width: u32,
    height: u32,
    phase: u64,
}

const DEMO_PHASE_SECS: f64 = 4.0;

impl DemoScene {
    fn new(config: &SourceConfig) -> Self {
        let mut source = MockVideoSource::new(config.width, config.height);
        source.fill([32, 32, 32]);
        Self {
            source,
            width: config.width,
            height: config.height,
            phase: 0,
        }
    }
}

impl HostSource for DemoScene {
    fn step(&mut self, dt: Duration) {
        self.source.advance(dt);
        let phase = (self.source.current_time().as_secs_f64() / DEMO_PHASE_SECS) as u64;
        if phase == self.phase {
            return;
        }
        self.phase = phase;

        self.source.fill([32, 32, 32]);
        if phase % 2 == 1 {
            let (bw, bh) = (self.width / 4, self.height / 4);
            let x = (phase * 97) % u64::from(self.width - bw).max(1);
            let y = (phase * 61) % u64::from(self.height - bh).max(1);
            self.source.fill_rect(x as u32, y as u32, bw, bh, [240, 240, 240]);
            info!(phase, "Demo scene: block shown");
        }
    }

    fn as_source(&mut self) -> &mut dyn VideoSource {
        &mut self.source
    }
}

#[cfg(feature = "camera")]
impl HostSource for tile_motion::capture::WebcamSource {
    fn as_source(&mut self) -> &mut dyn VideoSource {
        self
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");
            eprintln!("tile-motion: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), AppError> {
    info!("Tile Motion v{}", tile_motion::VERSION);

    let mut config = match &args.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };
    if let Some(device) = args.device {
        config.source.device_id = device;
    }
    if let Some(command) = args.alert_command {
        config.alert.command = Some(command);
    }
    if let Some(path) = args.preview {
        config.output.preview_path = Some(path);
    }
    if let Some(port) = args.metrics_port {
        config.output.metrics_port = port;
    }
    if let Some(ticks) = args.ticks {
        config.output.max_ticks = ticks;
    }
    config.source.validate()?;

    let mut notifier = FanoutNotifier::new().with(LogNotifier);
    if let Some(program) = &config.alert.command {
        notifier = notifier.with(CommandNotifier::new(program, config.alert.args.clone()));
    }

    let mut detector = Detector::new(config.detector.clone(), Box::new(notifier))?;
    let mut source = open_source(&config.source, args.mock)?;
    let publish = start_metrics(config.output.metrics_port)?;

    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    ctrlc::set_handler(move || flag.store(false, Ordering::SeqCst))?;

    let budget = Duration::from_secs_f64(1.0 / f64::from(config.source.fps));
    let tile_size = detector.config().tile_size;
    let mut ticks = 0u64;

    info!(fps = config.source.fps, "Monitoring started, press Ctrl-C to stop");

    while running.load(Ordering::SeqCst) {
        let cycle_start = Instant::now();
        source.step(budget);

        let outcome = detector.tick(source.as_source(), cycle_start)?;
        if let TickOutcome::Compared(comparison) = &outcome {
            if let Some(path) = &config.output.preview_path {
                if let Err(e) = preview::save(&comparison.diff, tile_size, comparison.capture, path)
                {
                    warn!(error = %e, "Preview not written");
                }
            }
        }
        if outcome.sampled() {
            publish(&MetricsSnapshot::from_detector(&detector));
        }

        ticks += 1;
        if config.output.max_ticks > 0 && ticks >= config.output.max_ticks {
            break;
        }

        let elapsed = cycle_start.elapsed();
        if elapsed < budget {
            std::thread::sleep(budget - elapsed);
        }
    }

    let stats = detector.stats();
    info!(
        ticks = stats.ticks,
        samples = stats.samples,
        motion_events = stats.motion_events,
        alerts_fired = stats.alerts_fired,
        alerts_suppressed = stats.alerts_suppressed,
        "Monitoring stopped"
    );
    Ok(())
}

#[cfg(feature = "camera")]
fn open_source(config: &SourceConfig, mock: bool) -> Result<Box<dyn HostSource>, AppError> {
    if mock {
        return Ok(Box::new(DemoScene::new(config)));
    }
    let webcam = tile_motion::capture::WebcamSource::open(config.device_id)?;
    Ok(Box::new(webcam))
}

#[cfg(not(feature = "camera"))]
fn open_source(config: &SourceConfig, mock: bool) -> Result<Box<dyn HostSource>, AppError> {
    if !mock {
        info!("Built without the `camera` feature, using the synthetic scene");
    }
    Ok(Box::new(DemoScene::new(config)))
}

type Publisher = Box<dyn Fn(&MetricsSnapshot)>;

#[cfg(feature = "metrics")]
fn start_metrics(port: u16) -> Result<Publisher, AppError> {
    use tile_motion::metrics::{MetricsRegistry, MetricsServer, MetricsServerConfig};

    if port == 0 {
        return Ok(Box::new(|_| {}));
    }
    let registry = MetricsRegistry::new().map_err(|e| AppError::Metrics(e.to_string()))?;
    let server = MetricsServer::new(MetricsServerConfig::with_port(port), registry);
    let handle = server.handle();
    server.spawn();
    Ok(Box::new(move |snapshot| handle.publish(snapshot)))
}

#[cfg(not(feature = "metrics"))]
fn start_metrics(port: u16) -> Result<Publisher, AppError> {
    if port != 0 {
        warn!(port, "Built without the `metrics` feature, not serving metrics");
    }
    Ok(Box::new(|_| {}))
}
