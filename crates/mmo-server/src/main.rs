//! Process entry point: loads configuration, builds the zone registry, and
//! drives the fixed-step simulation on a dedicated tick thread while a
//! transport thread feeds it inbound commands over an MPSC channel. No
//! async runtime — the tick thread is synchronous top to bottom, matching
//! the engine's own execution model.

use anyhow::Context;
use mmo_net::prelude::{load_config, InboundEnvelope, SimConfig};
use mmo_sim::prelude::SimServer;
use mmo_spatial::prelude::{GridConfig, TerrainMap, ZoneRegistry};
use std::env;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

fn config_path() -> PathBuf {
    env::var("MMO_SIM_CONFIG").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("mmo-sim.toml"))
}

fn build_zone_registry(config: &SimConfig) -> ZoneRegistry {
    let mut zones = ZoneRegistry::new();
    let grid_config = GridConfig {
        cell_size: config.grid_cell_size,
        world_min: (-config.world_bounds, -config.world_bounds),
        world_max: (config.world_bounds, config.world_bounds),
        ..GridConfig::default()
    };
    let cells_per_side = (config.world_bounds * 2.0 / config.grid_cell_size).ceil() as i32;
    zones.register_zone(0, grid_config, TerrainMap::new(cells_per_side, cells_per_side, config.grid_cell_size));
    zones
}

/// Runs the tick thread: one fixed-step tick every `1/tick_hz` seconds,
/// draining up to `max_catch_up_ticks` queued ticks if the thread falls
/// behind wall clock, dropping anything beyond that with a warning rather
/// than spiraling further behind.
fn run_tick_thread(mut server: SimServer, inbound_rx: mpsc::Receiver<InboundEnvelope>, tick_hz: u32, max_catch_up_ticks: u32) {
    let fixed_dt = Duration::from_secs_f64(1.0 / tick_hz as f64);
    let mut next_tick_at = Instant::now() + fixed_dt;

    loop {
        while let Ok(envelope) = inbound_rx.try_recv() {
            if let Err(err) = server.handle_inbound(envelope) {
                debug!(%err, "rejected inbound command");
            }
        }

        let now = Instant::now();
        if now < next_tick_at {
            thread::sleep(next_tick_at - now);
        }

        let mut behind = 0u32;
        while Instant::now() >= next_tick_at && behind < max_catch_up_ticks {
            server.tick();
            next_tick_at += fixed_dt;
            behind += 1;
        }
        if Instant::now() >= next_tick_at {
            let dropped = next_tick_at.elapsed().as_secs_f64() / fixed_dt.as_secs_f64();
            error!(dropped_ticks = dropped as u64, "tick thread fell behind past catch-up budget, resyncing clock");
            next_tick_at = Instant::now() + fixed_dt;
        }

        let snapshot = server.metrics_snapshot();
        debug!(tick = snapshot.tick_count, entities = snapshot.entity_count, matches = snapshot.match_count, "tick complete");

        for (_observer, _update) in server.drain_outbound() {
            // A real deployment forwards this to the transport thread's
            // outbound MPSC channel; left as a drain point here since this
            // binary has no live transport implementation to hand it to.
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = load_config(&config_path()).context("failed to load simulation configuration")?;
    info!(tick_hz = config.tick_hz, world_bounds = config.world_bounds, "starting simulation core");

    let zones = build_zone_registry(&config);
    let tick_hz = config.tick_hz;
    let rng_seed = 0x5EED_0000_CAFE_BABE;
    let server = SimServer::new(config, zones, rng_seed);

    let (_inbound_tx, inbound_rx) = mpsc::channel::<InboundEnvelope>();

    run_tick_thread(server, inbound_rx, tick_hz, 3);
    Ok(())
}
