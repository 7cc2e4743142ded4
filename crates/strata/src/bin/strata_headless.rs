//! # STRATA Headless
//!
//! Streams a world along a straight line with no renderer attached.
//!
//! ## Usage
//!
//! ```bash
//! strata_headless --config world.toml --ticks 600 --seed 42 --speed 4
//! ```

use std::path::PathBuf;

use strata::headless::{run, HeadlessOptions};
use strata::prelude::WorldConfig;

fn main() {
    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║         STRATA HEADLESS                                          ║");
    println!("║         TERRAIN STREAMING, NO RENDERER                           ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();

    // Parse command line arguments (simple parsing, no external deps)
    let args: Vec<String> = std::env::args().collect();
    let mut config_path: Option<PathBuf> = None;
    let mut seed: Option<u64> = None;
    let mut options = HeadlessOptions::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--ticks" | "-t" => {
                if i + 1 < args.len() {
                    options.ticks = args[i + 1].parse().unwrap_or(options.ticks);
                    i += 1;
                }
            }
            "--seed" | "-s" => {
                if i + 1 < args.len() {
                    seed = args[i + 1].parse().ok();
                    i += 1;
                }
            }
            "--speed" => {
                if i + 1 < args.len() {
                    options.speed = args[i + 1].parse().unwrap_or(options.speed);
                    i += 1;
                }
            }
            "--no-settle" => options.settle = None,
            "--help" | "-h" => {
                println!("Usage: strata_headless [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --config <PATH>     World configuration (TOML)");
                println!("  -t, --ticks <NUM>       Ticks to simulate at 60 Hz (default: 600)");
                println!("  -s, --seed <SEED>       Override the world seed");
                println!("      --speed <UNITS>     Observer speed per second (default: 4)");
                println!("      --no-settle         Report without waiting for the last chunks");
                println!("  -h, --help              Show this help");
                return;
            }
            other => eprintln!("Ignoring unknown argument: {other}"),
        }
        i += 1;
    }

    let mut config = match &config_path {
        Some(path) => match WorldConfig::from_toml_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load {}: {e}", path.display());
                std::process::exit(1);
            }
        },
        None => WorldConfig::default(),
    };
    if let Some(seed) = seed {
        config.seed = seed;
    }

    println!("┌─ CONFIGURATION ─────────────────────────────────────────────────┐");
    println!("│ Seed:               {}", config.seed);
    println!("│ Chunk:              {}×{}×{} blocks", config.chunk_size, config.chunk_height, config.chunk_size);
    println!("│ View Distance:      {} chunks", config.view_distance);
    println!("│ Workers:            {}", config.worker_threads);
    println!("│ Mesher:             {:?}", config.mesher);
    println!("│ Ticks:              {}", options.ticks);
    println!("│ Speed:              {} units/s", options.speed);
    println!("└──────────────────────────────────────────────────────────────────┘");
    println!();

    let summary = match run(config, &options) {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    let stats = summary.stats;
    let host = summary.host;
    let spawn = summary
        .spawn_height
        .map_or_else(|| "none".to_string(), |h| h.to_string());

    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║                    RUN SUMMARY                                   ║");
    println!("╠══════════════════════════════════════════════════════════════════╣");
    println!("║ Wall Time:          {:>10.2} s                              ║", summary.elapsed.as_secs_f64());
    println!("║ Final Observer X:   {:>10.2}                                 ║", summary.observer.x);
    println!("║ Spawn Height:       {:>10}                                 ║", spawn);
    println!("║ Settled:            {:>10}                                 ║", summary.settled);
    println!("║ Scans:              {:>10}                                 ║", stats.scans);
    println!("║ Avg Scan Time:      {:>10} μs                             ║", stats.scan.avg_scan_us);
    println!("║ Max Scan Time:      {:>10} μs                             ║", stats.scan.max_scan_us);
    println!("║ Builds Dispatched:  {:>10}                                 ║", stats.builds_dispatched);
    println!("║ Builds Applied:     {:>10}                                 ║", stats.builds_applied);
    println!("║ Builds Discarded:   {:>10}                                 ║", stats.builds_discarded);
    println!("║ Chunks Generated:   {:>10}                                 ║", stats.chunks_generated);
    println!("║ Avg Build Time:     {:>10.0} μs                             ║", summary.workers.avg_build_us());
    println!("║ Chunks Loaded:      {:>10}                                 ║", stats.chunks_loaded);
    println!("║ Chunks Pooled:      {:>10}                                 ║", stats.chunks_pooled);
    println!("║ Chunks Evicted:     {:>10}                                 ║", stats.chunks_evicted);
    println!("║ Handles Reused:     {:>10}                                 ║", stats.handles_reused);
    println!("║ Active Chunks:      {:>10}                                 ║", stats.active);
    println!("║ Live Handles:       {:>10}                                 ║", host.live_handles());
    println!("║ Quads Uploaded:     {:>10}                                 ║", host.quads);
    println!("║ Collider Toggles:   {:>10}                                 ║", host.collision_changes);
    println!("╚══════════════════════════════════════════════════════════════════╝");

    if let Some(timeout) = options.settle {
        if !summary.settled {
            eprintln!("World did not settle within {timeout:?}");
            std::process::exit(2);
        }
    }
}
