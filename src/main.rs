// src/main.rs
mod interrupt;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use sensorgrid::config::{self, DemoConfig};
use sensorgrid::drivers::{
    build_fibre, build_scrolling, LogSurface, RenderSurface, SharedSurface, TickScheduler,
};
use sensorgrid::recorder::CsvSurface;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum DemoMode {
    /// Live waterfall fed one column per tick
    Scrolling,
    /// Static distance/time heatmap
    Fibre,
}

#[derive(Parser, Debug)]
#[command(name = "sensorgrid", version, about = "Synthetic sensor grids for heatmap charts")]
struct Cli {
    #[arg(value_enum, default_value_t = DemoMode::Scrolling)]
    mode: DemoMode,
    /// JSON config; missing fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,
    /// Stop the scrolling demo after this many ticks (runs until Ctrl-C otherwise)
    #[arg(long)]
    ticks: Option<u64>,
    /// Also record every update to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,
}

const STOP_POLL: Duration = Duration::from_millis(100);

fn run_scrolling(
    config: &DemoConfig,
    ticks: Option<u64>,
    csv: Option<&Path>,
    stop_requested: impl Fn() -> bool,
) -> Result<()> {
    let scrolling = &config.scrolling;
    let session = build_scrolling(scrolling, &scrolling.generator())
        .context("building scrolling session")?;
    let recorder = csv
        .map(CsvSurface::create)
        .transpose()
        .context("creating CSV recording")?
        .map(SharedSurface::new);
    let mut surfaces: Vec<Box<dyn RenderSurface>> = vec![Box::new(LogSurface::new())];
    if let Some(recorder) = &recorder {
        surfaces.push(Box::new(recorder.clone()));
    }
    session.attach(&mut surfaces)?;
    let mut emitter = session.emitter;
    let mut handle = TickScheduler::new(Duration::from_millis(scrolling.tick_interval_ms))
        .with_max_ticks(ticks)
        .spawn(move || emitter.present(&mut surfaces).map(|_| ()));
    while !handle.is_finished() && !stop_requested() {
        thread::sleep(STOP_POLL);
    }
    let emitted = if handle.is_finished() {
        handle.join()
    } else {
        log::info!("🛑 stop requested");
        handle.stop()
    }
    .context("scrolling emission stopped")?;
    log::info!("emitted {emitted} ticks");
    if let Some(recorder) = recorder {
        recorder.into_inner()?.finish()?;
    }
    Ok(())
}

fn run_fibre(config: &DemoConfig, csv: Option<&Path>) -> Result<()> {
    let fibre = &config.fibre;
    let snapshot = build_fibre(fibre, &fibre.generator()).context("building fibre snapshot")?;
    snapshot.present(&mut LogSurface::new())?;
    if let Some(path) = csv {
        let mut recorder = CsvSurface::create(path).context("creating CSV recording")?;
        snapshot.present(&mut recorder)?;
        recorder.finish()?;
    }
    Ok(())
}

// 入口函数
fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => config::load(path)?,
        None => DemoConfig::default(),
    };
    log::info!("⚙️ starting {:?} demo", cli.mode);
    match cli.mode {
        DemoMode::Scrolling => {
            interrupt::install();
            run_scrolling(&config, cli.ticks, cli.csv.as_deref(), interrupt::requested)
        }
        DemoMode::Fibre => run_fibre(&config, cli.csv.as_deref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Instant;

    fn csv_columns(line: &str) -> Vec<&str> {
        line.split(',').skip(1).collect()
    }

    #[test]
    fn cli_defaults_to_scrolling() {
        let cli = Cli::try_parse_from(["sensorgrid"]).unwrap();
        assert_eq!(cli.mode, DemoMode::Scrolling);
        assert!(cli.config.is_none() && cli.ticks.is_none() && cli.csv.is_none());
        let cli = Cli::try_parse_from([
            "sensorgrid", "fibre", "--config", "demo.json", "--csv", "out.csv",
        ])
        .unwrap();
        assert_eq!(cli.mode, DemoMode::Fibre);
        assert_eq!(cli.config, Some(PathBuf::from("demo.json")));
        assert_eq!(cli.csv, Some(PathBuf::from("out.csv")));
    }

    #[test]
    fn cli_rejects_bad_arguments() {
        assert!(Cli::try_parse_from(["sensorgrid", "waterfall"]).is_err());
        assert!(Cli::try_parse_from(["sensorgrid", "--ticks", "many"]).is_err());
        assert!(Cli::try_parse_from(["sensorgrid", "--bogus"]).is_err());
    }

    #[test]
    fn scrolling_run_records_every_tick() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.csv");
        let mut config = DemoConfig::default();
        config.scrolling.tick_interval_ms = 1;
        config.scrolling.samples_per_channel = 4;
        config.scrolling.generator.seed = Some(21);
        run_scrolling(&config, Some(6), Some(&path), || false).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        // Header, the zero seed row, then one row per tick.
        assert_eq!(lines.len(), 8);
        assert!(lines[0].starts_with("Position,Total,Ch0"));
        assert_eq!(lines[1], "0.0000,0.0000");
        assert!(lines[2].starts_with("1.0000,"));
        assert!(lines[7].starts_with("6.0000,"));
        // Tick 4 replays column 0 of the four-sample cycle.
        assert_eq!(csv_columns(lines[6]), csv_columns(lines[2]));
    }

    #[test]
    fn unbounded_run_ends_on_stop_request() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("interrupted.csv");
        let mut config = DemoConfig::default();
        config.scrolling.tick_interval_ms = 5;
        config.scrolling.samples_per_channel = 4;
        let stop = Arc::new(AtomicBool::new(false));
        let trigger = {
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(150));
                stop.store(true, Ordering::SeqCst);
            })
        };
        let started = Instant::now();
        run_scrolling(&config, None, Some(&path), || stop.load(Ordering::SeqCst)).unwrap();
        trigger.join().unwrap();
        assert!(started.elapsed() < Duration::from_secs(5));
        let text = std::fs::read_to_string(&path).unwrap();
        // The recording was finished and flushed: header, seed row and at least one tick.
        assert!(text.lines().count() >= 3);
    }

    #[test]
    fn fibre_run_writes_series_and_matrix() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fibre.csv");
        let mut config = DemoConfig::default();
        config.fibre.generator.seed = Some(4);
        run_fibre(&config, Some(&path)).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        // Header, 320 series rows, blank separator, 9 matrix rows.
        assert_eq!(lines.len(), 1 + 320 + 1 + 9);
        assert!(lines[320].starts_with("3190.0000,"));
        assert!(lines[321].is_empty());
        assert_eq!(lines[322].split(',').count(), 320);
    }
}
