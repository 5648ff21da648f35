//! Bellwave host loop
//!
//! Drives the bellwave core on a simulated render tick: scripted hits, a
//! static contact snapshot, and a logging device sink stand in for the
//! hit-sensor, position-sync and bHaptics collaborators.
//!
//! # Usage
//!
//! ```bash
//! # Simulate 10 s at 60 fps with a hit at t=0.5
//! bellwave run --hit 0.5:400
//!
//! # Fixed-step delivery, two hits, packet logging
//! bellwave --log-level debug run --fixed-step --hit 0.5:400 --hit 4.0:650
//!
//! # Dump the per-source temporal envelope table as CSV
//! bellwave envelope > envelope.csv
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use bellwave_core::field::{AcousticField, FieldParams};
use bellwave_core::scheduler::{Actuator, DeliveryMode, HapticScheduler, SchedulerParams};
use bellwave_core::sink::DeviceSink;
use bellwave_core::types::{ContactSnapshot, DeviceGroup, HitEvent, Vec3};

/// Bellwave haptic renderer
#[derive(Parser, Debug)]
#[command(name = "bellwave")]
#[command(author, version, about = "Bell-strike vibration renderer for wearable haptics", long_about = None)]
struct Cli {
    /// Logging verbosity level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Simulate a render loop against a logging device sink (default)
    Run {
        /// Render tick rate in frames per second
        #[arg(long, default_value = "60.0")]
        fps: f32,

        /// Simulated wall-clock duration in seconds
        #[arg(long, default_value = "10.0")]
        duration: f32,

        /// Scripted hit as `time:strength`, repeatable (e.g. `--hit 0.5:400`)
        #[arg(long = "hit", value_parser = parse_hit)]
        hits: Vec<(f32, u32)>,

        /// Use fixed-step delivery instead of frame-driven chunking
        #[arg(long)]
        fixed_step: bool,

        /// Keep a hand in contact with the bell for the whole run
        #[arg(long)]
        contact: bool,
    },

    /// Dump the precomputed per-source temporal envelope table as CSV
    Envelope {
        /// Override the precompute horizon in seconds
        #[arg(long)]
        horizon: Option<f32>,

        /// Override the sample interval in seconds
        #[arg(long)]
        interval: Option<f32>,
    },
}

fn parse_hit(s: &str) -> anyhow::Result<(f32, u32)> {
    let (time, strength) = s
        .split_once(':')
        .with_context(|| format!("hit '{s}' is not in time:strength form"))?;
    let time: f32 = time
        .parse()
        .with_context(|| format!("bad hit time '{time}'"))?;
    let strength: u32 = strength
        .parse()
        .with_context(|| format!("bad hit strength '{strength}'"))?;
    anyhow::ensure!(time >= 0.0, "hit time must be non-negative");
    Ok((time, strength))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("bellwave v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        None => run_simulation(60.0, 10.0, vec![(0.5, 400)], false, false),
        Some(Commands::Run {
            fps,
            duration,
            hits,
            fixed_step,
            contact,
        }) => run_simulation(fps, duration, hits, fixed_step, contact),
        Some(Commands::Envelope { horizon, interval }) => dump_envelope(horizon, interval),
    }
}

// ============================================================================
// Simulation
// ============================================================================

/// Device sink that logs packets instead of talking to hardware.
#[derive(Default)]
struct LogSink {
    packets: usize,
    stops: usize,
}

impl DeviceSink for LogSink {
    fn play(&mut self, group: DeviceGroup, intensities: &[u8], duration_ms: u32) {
        self.packets += 1;
        let active = intensities.iter().filter(|&&v| v > 0).count();
        let peak = intensities.iter().copied().max().unwrap_or(0);
        debug!(
            group = group.name(),
            duration_ms,
            active,
            peak,
            "packet"
        );
    }

    fn stop_all(&mut self) {
        self.stops += 1;
        info!("stop all motors");
    }
}

/// Wearer standing two meters from the bell: a ring of vest actuators around
/// the torso plus one hand actuator per glove.
fn simulated_actuators(params: &mut SchedulerParams) -> anyhow::Result<()> {
    let torso = Vec3::new(2.0, 1.2, 0.0);
    for i in 0..8u8 {
        let angle = f32::from(i) * core::f32::consts::TAU / 8.0;
        let offset = Vec3::new(angle.cos() * 0.2, 0.0, angle.sin() * 0.2);
        params
            .actuators
            .push(Actuator::new(DeviceGroup::Vest, i, torso.add(offset)))
            .map_err(|_| anyhow::anyhow!("actuator capacity exceeded"))?;
    }
    for (group, z) in [(DeviceGroup::GloveLeft, 0.25), (DeviceGroup::GloveRight, -0.25)] {
        params
            .actuators
            .push(Actuator::hand(group, 0, Vec3::new(1.4, 1.1, z)))
            .map_err(|_| anyhow::anyhow!("actuator capacity exceeded"))?;
    }
    Ok(())
}

fn run_simulation(
    fps: f32,
    duration: f32,
    mut hits: Vec<(f32, u32)>,
    fixed_step: bool,
    contact: bool,
) -> anyhow::Result<()> {
    anyhow::ensure!(fps > 0.0, "fps must be positive");
    anyhow::ensure!(duration > 0.0, "duration must be positive");
    hits.sort_by(|a, b| a.0.total_cmp(&b.0));

    let field = AcousticField::new(FieldParams::default())?;

    let mut params = SchedulerParams::default();
    simulated_actuators(&mut params)?;
    if fixed_step {
        params.delivery = DeliveryMode::FixedStep;
    }

    let strike = params.impact_point.unwrap_or_else(|| field.center());
    let snapshot = if contact {
        ContactSnapshot::touching(strike)
    } else {
        ContactSnapshot::NONE
    };

    let mut scheduler = HapticScheduler::new(field, params)?;
    let (body_ceiling, hand_ceiling) = scheduler.reference_ceilings();
    info!(
        fps,
        duration,
        fixed_step,
        contact,
        body_ceiling,
        hand_ceiling,
        hit_count = hits.len(),
        "starting simulation"
    );

    // The sensor thread is simulated in-process: scripted hits are pushed
    // into the same SPSC queue a real capture thread would use.
    let mut queue: heapless::spsc::Queue<HitEvent, 16> = heapless::spsc::Queue::new();
    let (mut producer, mut consumer) = queue.split();

    let mut sink = LogSink::default();
    let dt = 1.0 / fps;
    let ticks = (duration * fps).ceil() as u32;
    let mut next_hit = 0;

    for tick in 0..ticks {
        let now = tick as f32 * dt;
        while next_hit < hits.len() && hits[next_hit].0 <= now {
            let (at, strength) = hits[next_hit];
            info!(at, strength, "hit");
            producer
                .enqueue(HitEvent::new(strength))
                .map_err(|_| anyhow::anyhow!("hit queue full"))?;
            next_hit += 1;
        }
        scheduler.tick(dt, &mut consumer, snapshot, &mut sink);
    }

    scheduler.stop(&mut sink);
    info!(
        packets = sink.packets,
        stops = sink.stops,
        final_cursor = scheduler.time_cursor(),
        "simulation finished"
    );
    Ok(())
}

// ============================================================================
// Envelope dump
// ============================================================================

fn dump_envelope(horizon: Option<f32>, interval: Option<f32>) -> anyhow::Result<()> {
    let mut params = FieldParams::default();
    if let Some(horizon) = horizon {
        params.table.horizon_s = horizon;
    }
    if let Some(interval) = interval {
        params.table.interval_s = interval;
    }

    let sources = params.source_count();
    let mut field = AcousticField::new(params)?;
    field.precompute_if_needed();

    let mut header = String::from("t");
    for s in 0..sources {
        header.push_str(&format!(",src{s}"));
    }
    println!("{header}");

    for k in 0..field.steps() {
        let mut line = format!("{:.3}", field.step_time(k));
        for s in 0..sources {
            let sample = field.temporal_sample(s, k).unwrap_or(0.0);
            line.push_str(&format!(",{sample:.6}"));
        }
        println!("{line}");
    }
    Ok(())
}
