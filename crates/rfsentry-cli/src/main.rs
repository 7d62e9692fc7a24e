//! RF Spectrum Anomaly Detection CLI
//!
//! Drives the analysis pipeline as a fixed-tick frame loop over a simulated
//! capture source:
//! - `run` — continuous scanning with per-anomaly output and statistics
//! - `scan` — one-shot capture and analysis of a single window
//! - `completions` — shell completion generation
//!
//! The loop is the collaborator the core expects: it captures a window,
//! hands it to the pipeline, emits results, and checks the stop signal only
//! at frame boundaries, so a half-computed frame is never persisted.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

use rfsentry_core::anomaly::AnomalyHistory;
use rfsentry_core::config::{DetectionConfig, ModelParams};
use rfsentry_core::pipeline::Pipeline;
use rfsentry_core::types::AnomalyEvent;
use rfsentry_sim::{CaptureError, CaptureSource, RfSimulator};

#[derive(Parser)]
#[command(name = "rfsentry")]
#[command(author, version, about = "RF spectrum anomaly detection", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Clone)]
struct BandArgs {
    /// Band start in MHz
    #[arg(long, default_value = "2400.0")]
    min_mhz: f64,

    /// Band end in MHz
    #[arg(long, default_value = "2500.0")]
    max_mhz: f64,

    /// Peak sensitivity in [0, 1]
    #[arg(long, default_value = "0.5")]
    sensitivity: f64,

    /// Sample rate in MHz
    #[arg(long, default_value = "2.4")]
    sampling_rate: f64,

    /// Samples per capture window
    #[arg(long, default_value = "1024")]
    window_size: usize,

    /// Disable anomaly scoring and classification
    #[arg(long)]
    no_ai: bool,

    /// Simulator seed for reproducible captures
    #[arg(long)]
    seed: Option<u64>,
}

impl BandArgs {
    fn to_config(&self) -> DetectionConfig {
        DetectionConfig {
            frequency_range_mhz: (self.min_mhz, self.max_mhz),
            sensitivity: self.sensitivity,
            sampling_rate_mhz: self.sampling_rate,
            window_size: self.window_size,
            ai_enabled: !self.no_ai,
            auto_classify: !self.no_ai,
            known_signals: Vec::new(),
        }
    }

    fn build_simulator(&self, config: DetectionConfig) -> RfSimulator {
        match self.seed {
            Some(seed) => RfSimulator::with_seed(config, seed),
            None => RfSimulator::new(config),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the continuous scanning loop (Ctrl+C to stop)
    Run {
        #[command(flatten)]
        band: BandArgs,

        /// Milliseconds between frames
        #[arg(long, default_value = "500")]
        interval: u64,

        /// Stop after this many frames (0 = until interrupted)
        #[arg(long, default_value = "0")]
        frames: u64,

        /// Fraction of captures that fail, to exercise frame skipping
        #[arg(long, default_value = "0.0")]
        dropout: f64,

        /// Print the ASCII spectrogram when the loop ends
        #[arg(long)]
        spectrogram: bool,
    },

    /// Capture and analyze a single window
    Scan {
        #[command(flatten)]
        band: BandArgs,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Run {
            band,
            interval,
            frames,
            dropout,
            spectrogram,
        } => cmd_run(band, interval, frames, dropout, spectrogram),

        Commands::Scan { band } => cmd_scan(band),

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
    }
}

fn cmd_run(
    band: BandArgs,
    interval: u64,
    frames: u64,
    dropout: f64,
    spectrogram: bool,
) -> Result<()> {
    let config = band.to_config();
    let mut source = band.build_simulator(config.clone()).with_dropout(dropout);
    let mut pipeline = Pipeline::new(config.clone(), ModelParams::default());
    let mut history = AnomalyHistory::default();

    // Stop signal, honored only at frame boundaries
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .context("Failed to set Ctrl+C handler")?;

    println!("RF Spectrum Anomaly Detection");
    println!("=============================");
    println!(
        "Band:         {:.1} - {:.1} MHz",
        config.frequency_range_mhz.0, config.frequency_range_mhz.1
    );
    println!("Sample Rate:  {:.1} MHz", config.sampling_rate_mhz);
    println!("Window:       {} samples", config.window_size);
    println!("Sensitivity:  {:.2}", config.sensitivity);
    println!();
    println!("Scanning... (Press Ctrl+C to stop)\n");

    let tick = Duration::from_millis(interval.max(1));
    let mut frame_count = 0u64;
    let mut skipped = 0u64;
    let mut last_output = None;

    while running.load(Ordering::SeqCst) {
        if frames > 0 && frame_count >= frames {
            break;
        }
        let frame_start = Instant::now();

        match source.capture_window() {
            Ok(window)
                if window.samples.len() != source.window_size()
                    || window.sample_rate_hz != source.sample_rate_hz() =>
            {
                warn!(
                    got = window.samples.len(),
                    want = source.window_size(),
                    "capture shape mismatch, frame skipped"
                );
                skipped += 1;
            }
            Ok(window) => match pipeline.process_frame(&window, now_ms()?) {
                Ok(output) => {
                    for event in &output.anomalies {
                        if history.push(event.clone()) {
                            print_anomaly(event, &config);
                        }
                    }
                    last_output = Some(output);
                }
                Err(err) => {
                    warn!(%err, "frame skipped");
                    skipped += 1;
                }
            },
            Err(CaptureError::Unavailable(reason)) => {
                // Previous spectrogram and statistics stay as they were
                warn!(%reason, "capture unavailable, frame skipped");
                skipped += 1;
            }
        }

        frame_count += 1;
        if frame_count % 20 == 0 {
            if let Some(output) = &last_output {
                let stats = output.statistics;
                info!(
                    frames = frame_count,
                    signals = stats.signals_processed,
                    threats = stats.potential_threats,
                    bandwidth_mhz = stats.bandwidth_mhz,
                    "statistics"
                );
            }
        }

        // Fixed-rate tick: sleep out the rest of the interval
        let elapsed = frame_start.elapsed();
        if elapsed < tick {
            std::thread::sleep(tick - elapsed);
        }
    }

    println!("\nScan finished");
    println!("─────────────");
    println!("Frames:            {} ({} skipped)", frame_count, skipped);
    if let Some(output) = &last_output {
        let stats = output.statistics;
        println!("Signals processed: {}", stats.signals_processed);
        println!("Potential threats: {}", stats.potential_threats);
        println!("Last bandwidth:    {:.0} MHz", stats.bandwidth_mhz);

        if spectrogram {
            println!("\nSpectrogram (trailing 10 s):");
            print!("{}", output.spectrogram.to_ascii(80, 24));
        }
    }
    println!("Anomalies kept:    {}", history.len());

    Ok(())
}

fn cmd_scan(band: BandArgs) -> Result<()> {
    let config = band.to_config();
    let mut source = band.build_simulator(config.clone());
    let mut pipeline = Pipeline::new(config.clone(), ModelParams::default());

    let window = source
        .capture_window()
        .context("Capture failed")?;
    let output = pipeline
        .process_frame(&window, now_ms()?)
        .context("Analysis failed")?;

    println!("Detections");
    println!("{}", "─".repeat(60));
    println!(
        "{:>4}  {:>14}  {:>10}  {:>10}",
        "#", "Frequency (MHz)", "Amplitude", "Confidence"
    );
    for (i, d) in output.detections.iter().enumerate() {
        println!(
            "{:>4}  {:>14.3}  {:>10.4}  {:>10.2}",
            i + 1,
            d.frequency_mhz,
            d.amplitude,
            d.confidence
        );
    }
    if output.detections.is_empty() {
        println!("  No signals above the sensitivity floor");
    }

    if !output.anomalies.is_empty() {
        println!("\nAnomalies");
        println!("{}", "─".repeat(60));
        for event in &output.anomalies {
            print_anomaly(event, &config);
        }
    }

    Ok(())
}

fn print_anomaly(event: &AnomalyEvent, config: &DetectionConfig) {
    let known = config
        .match_known_signal(event.frequency_mhz)
        .map(|p| format!("  (known: {})", p.name))
        .unwrap_or_default();

    println!(
        "[{}] ANOMALY {:>10.3} MHz  confidence {:.2}  strength {:.3}  {}{}",
        event.timestamp_ms,
        event.frequency_mhz,
        event.confidence,
        event.signal_strength,
        event
            .classification
            .as_deref()
            .unwrap_or("unclassified"),
        known
    );
}

/// Milliseconds since the Unix epoch
fn now_ms() -> Result<u64> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("System clock before Unix epoch")?
        .as_millis() as u64)
}
