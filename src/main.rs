use anyhow::{Context, Result};
use clap::Parser;
use distance_tracker::auto::AutoRoutine;
use distance_tracker::distance::{DistanceConfig, DistanceMode, DistanceTracker};
use distance_tracker::encoder::EncoderController;
use distance_tracker::report::{Reporter, DEFAULT_REPORT_INTERVAL};
use serde::Serialize;
use std::fs::File;
use std::io::Write as IoWrite;
use std::time::{Duration, Instant};

/// Timestamped encoder sample for recording
#[derive(Serialize, Debug, Clone)]
struct TimestampedSample {
    timestamp: f64, // Seconds since start
    raw_position: f64,
    distance: f64,
}

/// Absolute Encoder Distance Tracker
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Unit interpretation for the distance output
    #[arg(short, long, value_enum, default_value_t = DistanceMode::Angular)]
    mode: DistanceMode,

    /// Position offset in [0, 1) subtracted from raw readings
    /// (e.g. 0.2457 to shift the zero point to a convenient spot)
    #[arg(short, long)]
    offset: Option<f64>,

    /// Zero the continuous distance at the startup reading
    #[arg(long)]
    reset: bool,

    /// Report interval in ticks (one printed line per this many ticks)
    #[arg(short, long, default_value_t = DEFAULT_REPORT_INTERVAL)]
    interval: u64,

    /// Tick frequency in Hz
    #[arg(short, long, default_value_t = 50)]
    freq: u32,

    /// Simulated rotation velocity in rotations per second
    #[arg(long, default_value_t = 0.25, allow_hyphen_values = true)]
    sim_velocity: f64,

    /// Replay encoder samples from a file (one fraction per line)
    /// instead of simulating
    #[arg(long)]
    replay: Option<String>,

    /// Stop after this many ticks (runs until Ctrl+C if unset)
    #[arg(long)]
    ticks: Option<u64>,

    /// Autonomous routine selection (stub, announced at startup)
    #[arg(long, value_enum, default_value_t = AutoRoutine::Default)]
    auto: AutoRoutine,

    /// Optional CSV log file with one row per tick
    #[arg(long)]
    log_file: Option<String>,

    /// Save timestamped samples to a JSON file on shutdown
    #[arg(short, long)]
    record: Option<String>,
}

/// Main tracker runtime
struct Runtime {
    encoder: EncoderController,
    tracker: DistanceTracker,
    reporter: Reporter,
    auto_routine: AutoRoutine,
    tick_freq: u32,
    log_file: Option<File>,
    start_time: Option<Instant>,
    record_file: Option<String>,
    recorded_samples: Vec<TimestampedSample>,
}

impl Runtime {
    /// Create a new runtime instance
    fn new(args: &Args) -> Result<Self> {
        println!("Initializing distance tracker runtime...");

        // A zero frequency never gets as far as the loop timer
        if args.freq == 0 {
            return Err(anyhow::anyhow!("Tick frequency must be non-zero"));
        }

        // Initialize the encoder source
        let mut encoder = if let Some(ref path) = args.replay {
            let encoder = EncoderController::new_replay(path)
                .context("Failed to initialize replay encoder")?;
            println!(
                "✓ Replay encoder initialized from {} ({} samples)",
                path,
                encoder.replay_remaining().unwrap_or(0)
            );
            encoder
        } else {
            let encoder = EncoderController::new_simulation(args.sim_velocity, args.freq)
                .context("Failed to initialize simulated encoder")?;
            println!(
                "✓ Simulated encoder initialized at {:.3} rot/s",
                args.sim_velocity
            );
            encoder
        };

        // Initialize the tracker at the first reading
        let initial_raw = encoder.read().context("Failed to read initial position")?;
        let config = DistanceConfig::new(args.mode, args.offset, args.reset);
        let tracker = DistanceTracker::new(config, initial_raw)
            .context("Invalid distance tracker configuration")?;
        println!(
            "✓ Distance tracker initialized: {:?} mode, initial position {:.6}",
            args.mode, initial_raw
        );

        if let Some(offset) = args.offset {
            println!("✓ Position offset: {:.4}", offset);
        }
        if args.reset {
            println!("✓ Distance reset at startup position");
        }

        // Announce the autonomous selection (stub, nothing runs in it yet)
        println!("Auto selected: {}", args.auto.name());

        // Recording mode configuration
        if let Some(ref path) = args.record {
            println!("✓ Recording mode enabled: samples will be saved to {}", path);
        }

        // Initialize log file if requested
        let mut log_file = None;
        if let Some(ref path) = args.log_file {
            let mut file =
                File::create(path).context(format!("Failed to create log file: {}", path))?;
            writeln!(file, "tick,time,raw_position,distance")?;
            log_file = Some(file);
            println!("✓ CSV logging enabled: {}", path);
        }

        Ok(Self {
            encoder,
            tracker,
            reporter: Reporter::new(args.interval),
            auto_routine: args.auto,
            tick_freq: args.freq,
            log_file,
            start_time: None,
            record_file: args.record.clone(),
            recorded_samples: Vec::new(),
        })
    }

    /// Run one tick: sample, accumulate, report if due
    fn control_step(&mut self) -> Result<()> {
        let raw = self.encoder.read().context("Failed to read encoder")?;
        let distance = self.tracker.update(raw);

        self.auto_routine.step();

        // The report for this sample fires on the pre-increment heartbeat;
        // the CSV row must carry the same tick number
        let tick = self.reporter.heartbeats();

        if let Some(line) = self
            .reporter
            .report_if_due(self.tracker.mode(), distance, raw)
        {
            println!("{}", line);
        }

        let timestamp = if let Some(start) = self.start_time {
            start.elapsed().as_secs_f64()
        } else {
            0.0
        };

        if self.record_file.is_some() {
            self.recorded_samples.push(TimestampedSample {
                timestamp,
                raw_position: raw,
                distance,
            });
        }

        if let Some(ref mut file) = self.log_file {
            writeln!(
                file,
                "{},{:.4},{:.6},{:.6}",
                tick, timestamp, raw, distance
            )?;
        }

        Ok(())
    }

    /// Run the main tick loop
    async fn run(
        &mut self,
        shutdown_flag: std::sync::Arc<std::sync::atomic::AtomicBool>,
        max_ticks: Option<u64>,
    ) -> Result<()> {
        println!("Starting tick loop at {} Hz", self.tick_freq);

        self.start_time = Some(Instant::now());

        let dt = Duration::from_secs_f64(1.0 / self.tick_freq as f64);
        let mut ticks: u64 = 0;
        let mut missed_deadlines: u64 = 0;

        // Burst mode catches up on missed ticks rather than skipping them
        let mut interval = tokio::time::interval(dt);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Burst);

        while !shutdown_flag.load(std::sync::atomic::Ordering::SeqCst) {
            if let Some(limit) = max_ticks {
                if ticks >= limit {
                    println!("Reached tick limit ({}), stopping", limit);
                    break;
                }
            }

            interval.tick().await;
            let loop_start = Instant::now();

            if let Err(e) = self.control_step() {
                eprintln!("Error in tick: {}", e);
                // Keep ticking despite errors
            }
            ticks += 1;

            // Flush the log once per second
            if ticks % self.tick_freq as u64 == 0 {
                if let Some(ref mut file) = self.log_file {
                    file.flush().ok();
                }
            }

            let elapsed = loop_start.elapsed();
            if elapsed > dt {
                missed_deadlines += 1;
                if missed_deadlines % 10 == 1 {
                    eprintln!(
                        "Warning: Missed deadline #{} - Target: {:.2} ms, Actual: {:.2} ms",
                        missed_deadlines,
                        dt.as_secs_f64() * 1000.0,
                        elapsed.as_secs_f64() * 1000.0
                    );
                }
            }
        }

        Ok(())
    }

    /// Shut the runtime down, flushing logs and recordings
    fn shutdown(&mut self) -> Result<()> {
        println!("Shutting down...");

        if let Some(ref path) = self.record_file {
            println!(
                "Saving {} recorded samples to {}...",
                self.recorded_samples.len(),
                path
            );
            let file = File::create(path)
                .context(format!("Failed to create recording file: {}", path))?;
            serde_json::to_writer(file, &self.recorded_samples)
                .context("Failed to serialize recorded samples")?;
            println!("✓ Recorded samples saved to {}", path);
        }

        if let Some(ref mut file) = self.log_file {
            file.flush()?;
            println!("✓ Log file flushed and closed");
        }

        println!(
            "✓ Final: {}: {:9.6}  (Absolute Encoder: {})",
            self.tracker.mode().label(),
            self.tracker.distance(),
            self.encoder.last_reading()
        );
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    println!("=== Absolute Encoder Distance Tracker ===\n");

    let args = Args::parse();

    let mut runtime = Runtime::new(&args)?;

    // Ctrl+C flips the flag; the loop notices on its next tick
    let shutdown_flag = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
    let shutdown_flag_clone = shutdown_flag.clone();

    ctrlc::set_handler(move || {
        println!("\nReceived Ctrl+C, shutting down...");
        shutdown_flag_clone.store(true, std::sync::atomic::Ordering::SeqCst);
    })
    .context("Failed to set Ctrl+C handler")?;

    runtime.run(shutdown_flag, args.ticks).await?;

    runtime.shutdown()?;

    Ok(())
}
