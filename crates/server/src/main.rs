mod config;
mod events;
mod loopback;
mod server;
mod target;

use std::time::Duration;

use anyhow::{Result, ensure};
use barrage::PatternKind;
use clap::{Parser, ValueEnum};
use log::{info, warn};

use config::ServerConfig;
use events::{ServerEvent, StatsReport};
use server::SpawnServer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PatternArg {
    Normal,
    Spread,
    Fan,
    Winder,
    Cage,
}

impl From<PatternArg> for PatternKind {
    fn from(value: PatternArg) -> Self {
        match value {
            PatternArg::Normal => PatternKind::Normal,
            PatternArg::Spread => PatternKind::Spread,
            PatternArg::Fan => PatternKind::Fan,
            PatternArg::Winder => PatternKind::Winder,
            PatternArg::Cage => PatternKind::Cage,
        }
    }
}

#[derive(Parser)]
#[command(name = "barrage-server")]
#[command(about = "Headless bullet-spawn authority with loopback replicas")]
struct Args {
    #[arg(short, long, default_value_t = barrage::simulation::DEFAULT_TICK_RATE)]
    tick_rate: u32,

    #[arg(short, long, help = "Stop after this many seconds of simulated time")]
    duration: Option<f32>,

    #[arg(short, long, default_value_t = 2, help = "Loopback replicas besides the host")]
    replicas: usize,

    #[arg(long, help = "Seed for pattern generation and the simulated player")]
    seed: Option<u64>,

    #[arg(short, long, default_value_t = 1.0, help = "Starting game level (1-5)")]
    level: f32,

    #[arg(short, long = "pattern", value_enum, help = "Patterns to run (default: all)")]
    patterns: Vec<PatternArg>,

    #[arg(long, default_value_t = 0.25, help = "Chance per tick that a touching bullet lands")]
    hit_chance: f64,

    #[arg(long, default_value_t = 1.0, help = "Seconds before the player joins")]
    join_delay: f32,

    #[arg(long, default_value_t = 0.0, help = "Loopback packet loss percentage (0-100)")]
    loss_percent: f32,

    #[arg(long, default_value_t = 5.0, help = "Seconds between stats reports")]
    stats_interval: f32,

    #[arg(long, requires = "duration", help = "Run ticks back to back instead of in real time")]
    fast: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    ensure!(args.tick_rate > 0, "tick rate must be positive");
    ensure!(
        (0.0..=1.0).contains(&args.hit_chance),
        "hit chance must be within 0..=1"
    );
    ensure!(
        (0.0..=100.0).contains(&args.loss_percent),
        "loss percentage must be within 0..=100"
    );

    let mut config = ServerConfig {
        tick_rate: args.tick_rate,
        replicas: args.replicas,
        duration: args.duration,
        stats_interval: args.stats_interval,
        loss_percent: args.loss_percent,
        ..Default::default()
    };
    if !args.patterns.is_empty() {
        config.patterns = args.patterns.iter().map(|&p| p.into()).collect();
    }
    config.pattern.seed = args.seed;
    config.difficulty.start_level = args.level;
    config.target.hit_chance = args.hit_chance;
    config.target.join_delay = args.join_delay;

    let mut server = SpawnServer::new(config);

    while server.is_running() {
        if args.fast {
            server.step();
        } else {
            server.tick_once();
        }
        server.drain_events().for_each(log_event);
        if !args.fast {
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    server.finish();
    server.drain_events().for_each(log_event);
    Ok(())
}

fn log_event(event: ServerEvent) {
    match event {
        ServerEvent::Started {
            replicas,
            tick_rate,
        } => info!("Authority started at {tick_rate} Hz with {replicas} loopback replicas"),
        ServerEvent::TargetJoined => info!("Player joined"),
        ServerEvent::LevelChanged { level } => info!("Level is now {level:.1}"),
        ServerEvent::PlayerHit { id } => info!("Player hit by bullet {id}"),
        ServerEvent::PacketRejected { replica, message } => {
            warn!("Replica {replica} rejected a packet: {message}")
        }
        ServerEvent::Stats(report) => log_stats(&report),
        ServerEvent::Finished { ticks, elapsed } => {
            info!("Stopped after {ticks} ticks ({elapsed:.1}s simulated)")
        }
    }
}

fn log_stats(report: &StatsReport) {
    let dispatch = &report.dispatch;
    info!(
        "[{:.1}s] level {:.1} | queued {} | sent {} packets / {} records / {} bytes (avg {:.1} rec, max {} B) | releases {}",
        report.elapsed,
        report.level,
        report.queued,
        dispatch.packets_sent,
        dispatch.records_sent,
        dispatch.bytes_sent,
        dispatch.average_records_per_packet(),
        dispatch.largest_packet,
        dispatch.releases_sent,
    );
    info!(
        "[{:.1}s] host: {} active, {} sweep runs, {} spawned, {} released | replicas: {:?} active, {} packets lost",
        report.elapsed,
        report.host_active,
        report.sweep_runs,
        report.host.bullets_spawned,
        report.host.bullets_released,
        report.replica_active,
        report.packets_lost,
    );
}
