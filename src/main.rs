//! Command line player: judges a beatmap against a recorded input stream
//! (or autoplay) and prints the final score as JSON.

use clap::Parser;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use judgeline::error::SetupError;
use judgeline::logic::playback;
use judgeline::logic::{FinalScore, PlaySession, ScoreBoard};
use judgeline::models::beatmap::SourceBeatmap;
use judgeline::models::replay::ReplayData;
use judgeline::models::settings::JudgeSettings;
use judgeline::ruleset::RulesetRegistry;
use judgeline::shared::snapshot::PlayfieldSnapshot;
use judgeline::system::bus::{SessionBus, SessionEvent};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;

#[derive(Parser, Debug)]
#[command(name = "judgeline", about = "Judge a beatmap play and print its score")]
struct Args {
    /// Path to a .osu beatmap.
    map: PathBuf,

    /// Judge settings (TOML). Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Input stream (JSON) to judge. Autoplay when omitted.
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Write the judged input stream to this file.
    #[arg(long)]
    record: Option<PathBuf>,

    #[arg(long, default_value = "mania")]
    ruleset: String,

    /// Playback rate against the wall clock; 0 runs unthrottled.
    #[arg(long, default_value_t = 0.0)]
    rate: f64,

    /// Print a live HUD from a separate display thread.
    #[arg(long)]
    live: bool,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Setup(#[from] SetupError),

    #[error("unknown ruleset '{id}' (available: {available})")]
    UnknownRuleset { id: String, available: String },

    #[error("failed to access {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid input stream: {0}")]
    Replay(#[from] serde_json::Error),

    #[error("failed to spawn thread")]
    Spawn(#[source] std::io::Error),

    #[error("timing thread panicked")]
    TimingPanicked,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    log::info!("MAIN: Judging {:?}", args.map);

    match run(&args) {
        Ok(score) => match serde_json::to_string_pretty(&score) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                log::error!("MAIN: Failed to serialize score: {e}");
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            log::error!("MAIN: {e}");
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                log::error!("MAIN:   caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<FinalScore, CliError> {
    let settings = match &args.config {
        Some(path) => JudgeSettings::load(path).map_err(SetupError::from)?,
        None => JudgeSettings::default(),
    };

    let registry = RulesetRegistry::new(settings.mania);
    let ruleset = registry
        .get(&args.ruleset)
        .ok_or_else(|| CliError::UnknownRuleset {
            id: args.ruleset.clone(),
            available: registry.ids().join(", "),
        })?;

    let beatmap = SourceBeatmap::from_path(&args.map).map_err(SetupError::from)?;
    let mut session = PlaySession::from_beatmap(&beatmap, ruleset, &settings)?;

    let replay = match &args.replay {
        Some(path) => ReplayData::from_json(&read(path)?)?,
        None => {
            log::info!("MAIN: No input stream given, using autoplay");
            ReplayData::autoplay(session.chart())
        }
    };

    if let Some(path) = &args.record {
        fs::write(path, replay.to_json()?).map_err(|source| CliError::Io {
            path: path.clone(),
            source,
        })?;
        log::info!("MAIN: Input stream written to {:?}", path);
    }

    let hud = if args.live {
        let bus = SessionBus::new();
        let snapshots = bus.snapshot_rx.clone();
        let events = bus.event_rx.clone();
        session.attach_bus(bus);
        Some(start_hud_thread(session.board(), snapshots, events)?)
    } else {
        None
    };

    let timing =
        playback::start_thread(session, replay.inputs, args.rate).map_err(CliError::Spawn)?;
    let score = timing.join().map_err(|_| CliError::TimingPanicked)?;

    if let Some(hud) = hud
        && hud.join().is_err()
    {
        log::warn!("HUD: Display thread panicked");
    }

    Ok(score)
}

fn read(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Display consumer: prints the score board and judgement feed until the
/// session finishes or its bus goes away.
fn start_hud_thread(
    board: ScoreBoard,
    snapshots: Receiver<PlayfieldSnapshot>,
    events: Receiver<SessionEvent>,
) -> Result<JoinHandle<()>, CliError> {
    const PRINT_EVERY_MS: f64 = 250.0;

    thread::Builder::new()
        .name("HUD Thread".to_string())
        .spawn(move || {
            let mut last_print = f64::NEG_INFINITY;

            loop {
                match snapshots.recv_timeout(Duration::from_millis(50)) {
                    Ok(frame) if frame.display_time - last_print >= PRINT_EVERY_MS => {
                        last_print = frame.display_time;
                        let score = board.read();
                        log::info!(
                            "HUD: {:>8.0} ms | {:>5.1}% | {:>4}x | {:>7.2}% | {:>9.0} | {} on screen",
                            frame.display_time,
                            frame.progress * 100.0,
                            score.combo,
                            score.accuracy * 100.0,
                            score.total_score,
                            frame.visible.len()
                        );
                    }
                    Ok(_) | Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => return,
                }

                for event in events.try_iter() {
                    match event {
                        SessionEvent::Judged(j) => {
                            log::debug!("HUD: {} {} ({:+.1} ms)", j.object, j.result, j.offset_ms)
                        }
                        SessionEvent::Finished => {
                            log::info!("HUD: Session finished");
                            return;
                        }
                    }
                }
            }
        })
        .map_err(CliError::Spawn)
}
