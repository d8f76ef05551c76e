//! Timing thread that plays an input stream against a session.
//!
//! The clock advances in fixed steps. Inputs up to the new clock are fed
//! first, then the session is updated. With a positive rate the loop paces
//! itself against the wall clock; with rate 0 it runs as fast as possible.

use crate::logic::score::FinalScore;
use crate::logic::session::PlaySession;
use crate::models::replay::InputEvent;
use std::io;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Clock steps per second of map time.
pub const TPS: u64 = 200;

/// Runs `session` over `inputs` to completion and returns the frozen score.
pub fn run(mut session: PlaySession, inputs: &[InputEvent], rate: f64) -> FinalScore {
    let step_ms = 1000.0 / TPS as f64;
    let first_object = session
        .chart()
        .order()
        .first()
        .map_or(0.0, |&id| session.chart().object(id).start_time);
    let first_input = inputs.first().map_or(0.0, |e| e.time_ms);
    let start_ms = (first_object - session.lookahead_ms()).min(first_input).min(0.0);
    let end_ms = session.chart().end_time() + session.windows().widest() + step_ms;

    let started = Instant::now();
    let mut clock = start_ms;
    let mut next = 0;

    while clock < end_ms {
        clock += step_ms;

        while let Some(&event) = inputs.get(next).filter(|e| e.time_ms <= clock) {
            session.handle_input(event);
            next += 1;
        }
        session.update(clock);

        if rate > 0.0 {
            let target = Duration::from_secs_f64((clock - start_ms) / rate / 1000.0);
            if let Some(wait) = target.checked_sub(started.elapsed()) {
                thread::sleep(wait);
            }
        }
    }

    // Inputs past the last deadline change nothing but are still consumed.
    for &event in &inputs[next..] {
        session.handle_input(event);
    }
    session.finish();

    log::info!(
        "TIMING: Played {} inputs in {:.2}s",
        inputs.len(),
        started.elapsed().as_secs_f64()
    );
    session.finalize()
}

/// Spawns the timing thread.
pub fn start_thread(
    session: PlaySession,
    inputs: Vec<InputEvent>,
    rate: f64,
) -> io::Result<JoinHandle<FinalScore>> {
    thread::Builder::new()
        .name("Timing Thread".to_string())
        .spawn(move || {
            log::info!("TIMING: Thread started (rate {rate})");
            run(session, &inputs, rate)
        })
}
