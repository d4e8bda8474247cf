//! Headless spider simulation binary.
//! Runs an authority and a replica side by side, forwarding snapshot frames
//! between them each tick.
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use bevy::prelude::*;
use clap::Parser;
use log::{debug, info};
use spider_ai::{
    advance_clock, forward_frames, init_logging, spawn_actor, spawn_replica_spider, spawn_spider,
    Actor, NetId, ReplicatedSpider, SpiderAiPlugin, SpiderConfig,
};

const SPIDER_ID: NetId = NetId(1);
const PLAYER_ID: NetId = NetId(2);

/// Headless spider simulation with one authority and one replica
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
    /// Number of simulation ticks to run
    #[arg(long, default_value_t = 120)]
    ticks: u32,
    /// Seconds per tick
    #[arg(long, default_value_t = 1.0 / 30.0)]
    dt: f32,
    /// JSON file with spider tunables
    #[arg(long)]
    config: Option<PathBuf>,
    /// Initial player position as `x,y,z`
    #[arg(long, value_parser = parse_vec3, default_value = "6,0,0")]
    player: Vec3,
}

fn parse_vec3(text: &str) -> Result<Vec3, String> {
    let parts = text
        .split(',')
        .map(|p| p.trim().parse::<f32>().map_err(|e| format!("{p:?}: {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    match parts.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(format!("expected three comma-separated numbers, got {text:?}")),
    }
}

fn load_config(path: Option<&Path>) -> Result<SpiderConfig> {
    let Some(path) = path else {
        return Ok(SpiderConfig::default());
    };
    SpiderConfig::load(path).with_context(|| format!("loading spider config {}", path.display()))
}

fn authority_app(config: SpiderConfig, player: Vec3) -> App {
    let mut app = App::new();
    app.add_plugins(SpiderAiPlugin::authority(config));
    spawn_spider(app.world_mut(), SPIDER_ID, Vec3::ZERO);
    spawn_actor(app.world_mut(), PLAYER_ID, Actor::player(), player);
    app
}

fn replica_app(player: Vec3) -> App {
    let mut app = App::new();
    app.add_plugins(SpiderAiPlugin::replica());
    spawn_replica_spider(app.world_mut(), SPIDER_ID, Vec3::ZERO);
    spawn_actor(app.world_mut(), PLAYER_ID, Actor::player(), player);
    app
}

fn log_replica(replica: &mut App, tick: u32) {
    let world = replica.world_mut();
    let mut spiders = world.query::<(&NetId, &Transform, &ReplicatedSpider)>();
    for (id, transform, mirror) in spiders.iter(world) {
        debug!(
            "tick {tick}: replica spider {id:?} {} at {:?} attacking={}",
            mirror.phase, transform.translation, mirror.attacking
        );
    }
    let mut actors = world.query_filtered::<(&NetId, &Transform), With<Actor>>();
    for (id, transform) in actors.iter(world) {
        debug!("tick {tick}: replica actor {id:?} at {:?}", transform.translation);
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    if !(args.dt.is_finite() && args.dt > 0.0) {
        bail!("--dt must be a positive number of seconds, got {}", args.dt);
    }
    let config = load_config(args.config.as_deref())?;
    info!("starting simulation: {} ticks of {}s", args.ticks, args.dt);

    let delta = Duration::from_secs_f32(args.dt);
    let mut authority = authority_app(config, args.player);
    let mut replica = replica_app(args.player);

    let mut frames = 0;
    for tick in 1..=args.ticks {
        advance_clock(&mut authority, delta);
        frames += forward_frames(authority.world_mut(), replica.world_mut());
        advance_clock(&mut replica, delta);
        log_replica(&mut replica, tick);
    }

    info!("forwarded {frames} snapshot frames");
    log_replica(&mut replica, args.ticks);
    Ok(())
}
