//! `city` — runs the fleet-occupancy pipeline end to end.
//!
//! Without arguments a synthetic 20-zone city is simulated.  With prepared
//! tables:
//!
//! ```text
//! cargo run -p city --release -- \
//!     --zones zones.csv --od od_hourly.csv \
//!     [--config config.json] [--charging weights.json] [--out ./output]
//! ```
//!
//! `--zones` also takes an Uber Movement boundary file (`.json` or
//! `.geojson`), whose zone centroids are computed on load.  `--charging`
//! names a JSON array of 24 hourly weights; without it the synthetic city
//! uses its own evening-heavy weights and prepared tables charge uniformly.
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

mod city;


use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fo_core::{SimConfig, SimRng};
use fo_input::{ChargingProfile, ZoneTable, load_od_csv, load_zones_csv, load_zones_geojson};
use fo_model::{MapKind, TrafficSystemBuilder};
use fo_output::{CsvWriter, StepOutputObserver};
use fo_sim::SimulateTraffic;

// ── Arguments ─────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Args {
    zones:  Option<PathBuf>,
    od:     Option<PathBuf>,
    config:   Option<PathBuf>,
    charging: Option<PathBuf>,
    out:      Option<PathBuf>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(flag) = it.next() {
        let slot = match flag.as_str() {
            "--zones" => &mut args.zones,
            "--od" => &mut args.od,
            "--config" => &mut args.config,
            "--charging" => &mut args.charging,
            "--out" => &mut args.out,
            other => bail!("unknown argument {other}"),
        };
        let value = it.next().with_context(|| format!("{flag} needs a value"))?;
        *slot = Some(PathBuf::from(value));
    }
    if args.zones.is_some() != args.od.is_some() {
        bail!("--zones and --od must be given together");
    }
    Ok(args)
}

fn load_config(path: Option<&Path>) -> Result<SimConfig> {
    let Some(path) = path else {
        return Ok(SimConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn is_geojson(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json") || ext.eq_ignore_ascii_case("geojson"))
}

fn load_zones(path: &Path) -> Result<ZoneTable> {
    let zones = if is_geojson(path) { load_zones_geojson(path) } else { load_zones_csv(path) };
    zones.with_context(|| format!("loading {}", path.display()))
}

/// Parse a JSON array of 24 hourly charging weights.
fn parse_charging(text: &str) -> Result<ChargingProfile> {
    let weights: Vec<f64> = serde_json::from_str(text)?;
    Ok(ChargingProfile::hourly(&weights)?)
}

/// The `--charging` file if given, else the synthetic city's weights, else
/// uniform charging for prepared tables.
fn charging_profile(path: Option<&Path>, synthetic: bool) -> Result<ChargingProfile> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            parse_charging(&text).with_context(|| format!("parsing {}", path.display()))
        }
        None if synthetic => Ok(ChargingProfile::hourly(&city::CHARGING_WEIGHTS)?),
        None => Ok(ChargingProfile::Uniform),
    }
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = parse_args()?;
    let config = load_config(args.config.as_deref())?;
    let out_dir = args.out.unwrap_or_else(|| PathBuf::from("output"));

    let (zones, od) = match (&args.zones, &args.od) {
        (Some(z), Some(o)) => {
            let zones = load_zones(z)?;
            let od = load_od_csv(o).with_context(|| format!("loading {}", o.display()))?;
            (zones, od)
        }
        _ => {
            let zones = city::zones()?;
            let od = city::od_statistics(&zones);
            (zones, od)
        }
    };
    let charging = charging_profile(args.charging.as_deref(), args.zones.is_none())?;
    info!(zones = zones.len(), seed = config.seed, fleet = config.fleet_size, "inputs ready");

    let seed = config.seed;
    let mut tfs = TrafficSystemBuilder::new(zones)
        .od_statistics(od)
        .charging_profile(charging)
        .config(config)
        .build()?;

    // ── Simulate, streaming state and transitions to CSV ──────────────────
    let t0 = Instant::now();
    let writer = CsvWriter::new(&out_dir)?;
    let mut obs = StepOutputObserver::new(writer, tfs.zones().clone(), tfs.grid());
    tfs.simulate_traffic(&mut SimRng::new(seed), &mut obs)?;
    let maps = tfs.calc_traffic_system_properties()?;
    obs.finish(Some(&maps))?;
    info!(elapsed_ms = t0.elapsed().as_millis() as u64, out = %out_dir.display(), "run written");

    // ── Summary ───────────────────────────────────────────────────────────
    for kind in MapKind::ALL {
        let map = maps.get(kind);
        let (busiest, share) = map
            .iter()
            .enumerate()
            .fold((0, 0.0), |best, (i, &v)| if v > best.1 { (i, v) } else { best });
        let key = tfs.zones().keys()[busiest];
        println!("{kind:<13} busiest zone {key:>5}  share {:.3}", share);
    }
    Ok(())
}
