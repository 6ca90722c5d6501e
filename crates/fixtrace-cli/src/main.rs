//! fixtrace - GNSS trajectory refinement for offline trace analysis

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fixtrace_core::{refine, FixSeries, PointNetwork, RefinedTrack, RoadNode, SmootherTuning};
use fixtrace_io::{load_network_nodes, load_pos_log, load_reference_track, ReferencePoint};
use fixtrace_render::{latlon_pairs, write_map, MapLayers, ReferenceMarker};

#[derive(Parser, Debug)]
#[command(name = "fixtrace")]
#[command(about = "Refine noisy GNSS traces: smooth, gap-fill and map-match")]
#[command(version)]
struct Args {
    /// Input files, classified by extension: .pos/.txt raw positioning logs,
    /// .kml reference tracks, .json road-network node files
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output directory
    #[arg(short, long, default_value = "output")]
    output_dir: PathBuf,

    /// Skip map matching even when network nodes were supplied
    #[arg(long)]
    no_match: bool,

    // ── Network acquisition ───────────────────────────────────
    /// Acquisition radius around the trace mean coordinate (m)
    #[arg(long, default_value_t = 1000.0)]
    radius_m: f64,

    /// Maximum snap distance for a nearest-node query (m)
    #[arg(long, default_value_t = 100.0)]
    max_snap_m: f64,

    // ── Smoother tuning ───────────────────────────────────────
    #[arg(long, default_value_t = 5.0)]
    measurement_var: f64,

    #[arg(long, default_value_t = 0.1)]
    process_var: f64,

    #[arg(long, default_value_t = 1000.0)]
    initial_var: f64,
}

/// Inputs grouped by role, in command-line order.
#[derive(Debug, Default)]
struct ClassifiedInputs {
    logs: Vec<PathBuf>,
    references: Vec<PathBuf>,
    networks: Vec<PathBuf>,
}

fn classify_inputs(paths: &[PathBuf]) -> ClassifiedInputs {
    let mut inputs = ClassifiedInputs::default();
    for path in paths {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("pos") | Some("txt") => inputs.logs.push(path.clone()),
            Some("kml") => inputs.references.push(path.clone()),
            Some("json") => inputs.networks.push(path.clone()),
            _ => warn!(path = %path.display(), "ignoring input with unknown extension"),
        }
    }
    inputs
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let inputs = classify_inputs(&args.inputs);

    // 1. Ingest and concatenate all raw-fix sources, file order then
    //    in-file order.
    let mut raw = FixSeries::new();
    for path in &inputs.logs {
        let series = load_pos_log(path)?;
        info!(path = %path.display(), fixes = series.len(), "ingested positioning log");
        raw.extend(series);
    }
    if raw.is_empty() {
        bail!("no valid position fixes ingested; nothing to refine");
    }

    let mut reference: Vec<ReferencePoint> = Vec::new();
    for path in &inputs.references {
        let points = load_reference_track(path)?;
        info!(path = %path.display(), points = points.len(), "ingested reference track");
        reference.extend(points);
    }

    // 2. Acquire a road network around the trace. Failure degrades to a run
    //    without matching.
    let network = if args.no_match {
        None
    } else {
        acquire_network(&inputs.networks, &raw, args.radius_m, args.max_snap_m)?
    };

    // 3. Refine.
    let tuning = SmootherTuning {
        measurement_var: args.measurement_var,
        process_var: args.process_var,
        initial_var: args.initial_var,
    };
    let track = refine(
        raw,
        tuning,
        network.as_ref().map(|n| n as &dyn fixtrace_core::RoadNetwork),
    )?;

    // 4. Render and export.
    std::fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("creating output directory {}", args.output_dir.display()))?;

    let map_path = args.output_dir.join("map.html");
    let layers = build_layers(&track, network.as_ref(), &reference);
    write_map(&layers, &map_path)?;

    let csv_path = args.output_dir.join("track.csv");
    write_track_csv(&track, &csv_path)?;

    print_summary(&track, &reference, &map_path, &csv_path);
    Ok(())
}

/// Load node files and build the nearest-node oracle centered at the raw
/// mean coordinate. `Ok(None)` means matching is skipped for this run.
fn acquire_network(
    paths: &[PathBuf],
    raw: &FixSeries,
    radius_m: f64,
    max_snap_m: f64,
) -> Result<Option<PointNetwork>> {
    if paths.is_empty() {
        return Ok(None);
    }

    let mut nodes: Vec<RoadNode> = Vec::new();
    for path in paths {
        nodes.extend(load_network_nodes(path)?);
    }

    // Non-empty raw series is checked before acquisition.
    let center = raw.mean_position().expect("non-empty series");
    match PointNetwork::acquire(nodes, center, radius_m, max_snap_m) {
        Ok(net) => {
            info!(nodes = net.len(), "road network acquired");
            Ok(Some(net))
        }
        Err(err) => {
            warn!(%err, "road network unavailable; continuing without matching");
            Ok(None)
        }
    }
}

fn build_layers(
    track: &RefinedTrack,
    network: Option<&PointNetwork>,
    reference: &[ReferencePoint],
) -> MapLayers {
    let matched = match (&track.matched, network) {
        (Some(ids), Some(net)) => ids.iter().filter_map(|&id| net.node_position(id)).collect(),
        _ => Vec::new(),
    };
    MapLayers {
        raw: latlon_pairs(&track.raw),
        smoothed: latlon_pairs(&track.smoothed),
        interpolated: latlon_pairs(&track.interpolated),
        matched,
        reference: reference
            .iter()
            .map(|r| ReferenceMarker {
                lat: r.lat,
                lon: r.lon,
                label: r.label.clone(),
            })
            .collect(),
    }
}

fn write_track_csv(track: &RefinedTrack, path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("writing track table {}", path.display()))?;
    wtr.write_record([
        "index",
        "timestamp",
        "raw_lat",
        "raw_lon",
        "smooth_lat",
        "smooth_lon",
        "interp_lat",
        "interp_lon",
    ])?;

    for (i, raw) in track.raw.iter().enumerate() {
        let smooth = &track.smoothed.fixes[i];
        let interp = &track.interpolated.fixes[i];
        wtr.write_record(&[
            i.to_string(),
            raw.timestamp.clone(),
            format!("{:.9}", raw.lat),
            format!("{:.9}", raw.lon),
            format!("{:.9}", smooth.lat),
            format!("{:.9}", smooth.lon),
            format!("{:.9}", interp.lat),
            format!("{:.9}", interp.lon),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

fn print_summary(
    track: &RefinedTrack,
    reference: &[ReferencePoint],
    map_path: &Path,
    csv_path: &Path,
) {
    println!("\nRefinement Summary:");
    println!("  Raw fixes:     {}", track.raw.len());
    println!("  Smoothed:      {}", track.smoothed.len());
    println!("  Interpolated:  {}", track.interpolated.len());
    match &track.matched {
        Some(ids) => println!("  Matched nodes: {}", ids.len()),
        None => println!("  Matched nodes: (matching skipped)"),
    }
    println!("  Reference pts: {}", reference.len());
    println!("-----------------------------");
    println!("Map written to   {:?}", map_path);
    println!("Track written to {:?}", csv_path);
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixtrace_core::PositionFix;

    #[test]
    fn test_track_csv_has_one_row_per_fix() {
        let raw = FixSeries::from(vec![
            PositionFix::new("t0", 48.0, 11.0),
            PositionFix::new("t1", 48.001, 11.001),
        ]);
        let track = refine(raw, SmootherTuning::default(), None).unwrap();
        let path = std::env::temp_dir().join("fixtrace_track_test.csv");
        write_track_csv(&track, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("index,timestamp"));
        assert_eq!(text.lines().count(), 3); // header + 2 fixes
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_classify_by_extension() {
        let paths = vec![
            PathBuf::from("a.pos"),
            PathBuf::from("b.TXT"),
            PathBuf::from("ref.kml"),
            PathBuf::from("nodes.json"),
            PathBuf::from("README.md"),
        ];
        let inputs = classify_inputs(&paths);
        assert_eq!(inputs.logs.len(), 2);
        assert_eq!(inputs.references.len(), 1);
        assert_eq!(inputs.networks.len(), 1);
    }
}
