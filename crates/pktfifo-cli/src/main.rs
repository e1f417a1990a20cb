use std::process;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use dpram_model::DualPortRam;
use pktfifo_model::record::Item;
use pktfifo_model::sim::{SimOptions, Simulation};
use pktfifo_model::{FifoConfig, PacketFifo};

#[derive(Parser)]
#[command(name = "pktfifo-sim")]
#[command(about = "Run dual-clock packet FIFO twin scenarios", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Suppress progress output (only show errors)
    #[arg(short, long, global = true)]
    quiet: bool,
}

/// Queue shape and clocking, shared by all scenarios.
#[derive(Args)]
struct ShapeArgs {
    /// Usable item capacity
    #[arg(long, default_value = "16")]
    capacity: usize,

    /// Output staging pipeline depth
    #[arg(long, default_value = "2")]
    depth: usize,

    /// Storage read latency in read-domain cycles
    #[arg(long, default_value = "1")]
    latency: usize,

    /// Abstract time units per write-domain cycle
    #[arg(long, default_value = "1")]
    write_period: u32,

    /// Abstract time units per read-domain cycle
    #[arg(long, default_value = "1")]
    read_period: u32,

    /// Consumer asserts ready on one read cycle in this many
    #[arg(long, default_value = "1")]
    ready_every: u32,
}

#[derive(Subcommand)]
enum Commands {
    /// Stream plain items through the queue and verify ordering
    Stream {
        #[command(flatten)]
        shape: ShapeArgs,

        /// Number of items to stream
        #[arg(long, default_value = "64")]
        count: u64,
    },
    /// Push a sequence of frames through the queue under frame policies
    Frames {
        #[command(flatten)]
        shape: ShapeArgs,

        /// Frame lengths, in items
        #[arg(long, value_delimiter = ',', default_value = "4,1,6")]
        lens: Vec<usize>,

        /// Drop frames that would overfill storage
        #[arg(long)]
        drop_oversize: bool,

        /// Drop frames whose trailing status matches the bad pattern
        #[arg(long)]
        drop_bad: bool,

        /// Consume and discard frames arriving while storage is full
        #[arg(long)]
        drop_when_full: bool,

        /// Mark the last frame's trailing status with the bad pattern
        #[arg(long)]
        mark_last_bad: bool,
    },
    /// Reset the producer mid-frame and show the consumer-side truncation
    Truncate {
        #[command(flatten)]
        shape: ShapeArgs,
    },
}

fn main() {
    let cli = Cli::parse();

    if !cli.quiet {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    let result = match cli.command {
        Commands::Stream { shape, count } => run_stream(&shape, count, cli.quiet),
        Commands::Frames {
            shape,
            lens,
            drop_oversize,
            drop_bad,
            drop_when_full,
            mark_last_bad,
        } => run_frames(
            &shape,
            &lens,
            drop_oversize,
            drop_bad,
            drop_when_full,
            mark_last_bad,
            cli.quiet,
        ),
        Commands::Truncate { shape } => run_truncate(&shape, cli.quiet),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

const BAD_STATUS: u32 = 0xAA;

fn build_sim(shape: &ShapeArgs, cfg: FifoConfig) -> Result<Simulation<DualPortRam>> {
    let ram = DualPortRam::new(cfg.slot_count(), shape.latency);
    let fifo = PacketFifo::new(cfg, ram).context("invalid queue configuration")?;
    Ok(Simulation::new(
        fifo,
        SimOptions {
            write_period: shape.write_period,
            read_period: shape.read_period,
            consumer_ready_every: shape.ready_every,
        },
    ))
}

fn report(sim: &Simulation<DualPortRam>, quiet: bool) {
    if quiet {
        return;
    }
    let p = sim.producer_events();
    let c = sim.consumer_events();
    eprintln!(
        "delivered {} items; producer events: {} overflow, {} bad, {} good; \
         consumer mirror: {} overflow, {} bad, {} good",
        sim.delivered().len(),
        p.overflow,
        p.bad_frame,
        p.good_frame,
        c.overflow,
        c.bad_frame,
        c.good_frame,
    );
}

fn run_stream(shape: &ShapeArgs, count: u64, quiet: bool) -> Result<()> {
    let cfg = FifoConfig {
        capacity: shape.capacity,
        pipeline_depth: shape.depth,
        ..FifoConfig::default()
    };
    let mut sim = build_sim(shape, cfg)?;
    for p in 0..count {
        sim.push_item(Item::data(p));
    }

    if !sim.run_until_idle(1_000, 10_000_000) {
        bail!("simulation did not reach an idle state");
    }
    if sim.pending() != 0 {
        bail!("{} items were never accepted", sim.pending());
    }
    for (i, item) in sim.delivered().iter().enumerate() {
        if item.payload != i as u64 {
            bail!("item {i} delivered out of order (payload {:#X})", item.payload);
        }
    }
    if sim.delivered().len() as u64 != count {
        bail!(
            "expected {count} deliveries, observed {}",
            sim.delivered().len()
        );
    }

    report(&sim, quiet);
    if !quiet {
        eprintln!("Success: {count} items streamed in order");
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_frames(
    shape: &ShapeArgs,
    lens: &[usize],
    drop_oversize: bool,
    drop_bad: bool,
    drop_when_full: bool,
    mark_last_bad: bool,
    quiet: bool,
) -> Result<()> {
    if lens.iter().any(|&l| l == 0) {
        bail!("frame lengths must be non-zero");
    }
    let cfg = FifoConfig {
        capacity: shape.capacity,
        pipeline_depth: shape.depth,
        frame_mode: true,
        drop_oversize_frame: drop_oversize,
        drop_bad_frame: drop_bad,
        drop_when_full,
        status_bits: 8,
        bad_frame_value: BAD_STATUS,
        bad_frame_mask: 0xFF,
        ..FifoConfig::default()
    };
    let mut sim = build_sim(shape, cfg)?;

    let mut next_payload = 0u64;
    for (i, &len) in lens.iter().enumerate() {
        let payloads: Vec<u64> = (next_payload..next_payload + len as u64).collect();
        next_payload += len as u64;
        let last = i + 1 == lens.len();
        let status = if last && mark_last_bad { BAD_STATUS } else { 0 };
        sim.push_frame(&payloads, status);
    }

    if !sim.run_until_idle(1_000, 10_000_000) {
        bail!("simulation did not reach an idle state");
    }
    report(&sim, quiet);
    if !quiet {
        let frames_out = sim.delivered().iter().filter(|i| i.eof).count();
        eprintln!(
            "Success: {} of {} frames delivered",
            frames_out,
            lens.len()
        );
    }
    Ok(())
}

fn run_truncate(shape: &ShapeArgs, quiet: bool) -> Result<()> {
    let cfg = FifoConfig {
        capacity: shape.capacity,
        pipeline_depth: shape.depth,
        frame_mode: true,
        drop_oversize_frame: true,
        status_bits: 8,
        bad_frame_value: BAD_STATUS,
        bad_frame_mask: 0xFF,
        ..FifoConfig::default()
    };
    if cfg.capacity < 6 {
        bail!("truncate scenario needs a capacity of at least 6");
    }
    let ram = DualPortRam::new(cfg.slot_count(), shape.latency);
    let mut fifo = PacketFifo::new(cfg, ram).context("invalid queue configuration")?;

    // Commit a 6-item frame, deliver two items, then yank the producer's
    // reset while the consumer is stalled.
    for p in 1..=5 {
        fifo.step_write(true, Item::data(p), false);
    }
    fifo.step_write(true, Item::last(6), false);

    let mut delivered = Vec::new();
    for _ in 0..200 {
        fifo.step_write_idle();
        if let Some(item) = fifo.step_read(delivered.len() < 2, false).delivered {
            delivered.push(item);
        }
        if delivered.len() == 2 {
            break;
        }
    }
    for _ in 0..6 {
        fifo.step_write(false, Item::default(), true);
        fifo.step_read(false, false);
    }
    for _ in 0..200 {
        fifo.step_write_idle();
        if let Some(item) = fifo.step_read(true, false).delivered {
            delivered.push(item);
        }
    }

    let Some(tail) = delivered.last() else {
        bail!("nothing was delivered before the reset");
    };
    if !tail.eof || tail.status != BAD_STATUS {
        bail!(
            "expected a synthetic terminator, got payload {:#X} (eof={}, status {:#X})",
            tail.payload,
            tail.eof,
            tail.status
        );
    }
    if !quiet {
        eprintln!(
            "Success: {} items delivered, frame closed by a synthetic terminator",
            delivered.len()
        );
    }
    Ok(())
}
