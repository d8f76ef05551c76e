//! A play session: one chart judged against one input stream.
//!
//! The session owns the judgement clock. It only moves forward; `seek` moves
//! the display clock and never re-runs judgement. Every input first advances
//! the judgement clock to its own timestamp, so deadlines that expired before
//! the input are handled before the input is matched.

use crate::error::{InvariantViolation, SetupError, fail_fast};
use crate::logic::object_state::{ObjectPhase, ObjectStates};
use crate::logic::score::{FinalScore, ScoreBoard, ScoreProcessor};
use crate::models::beatmap::SourceBeatmap;
use crate::models::engine::hit_window::{HitWindows, WindowOutcome};
use crate::models::engine::scroll::{ScrollMapper, TimelineMapper};
use crate::models::hit_object::{Chart, HitObject, HitObjectKind, ObjectId};
use crate::models::hit_result::HitResult;
use crate::models::judgement::Judgement;
use crate::models::replay::{InputEvent, InputKind};
use crate::models::settings::{EarlyInputPolicy, JudgeSettings};
use crate::ruleset::{ChartMaxima, Ruleset, chart_maxima};
use crate::shared::snapshot::{PlayfieldSnapshot, VisibleObject};
use crate::system::bus::{SessionBus, SessionEvent};
use std::sync::Arc;
use std::time::Instant;

pub struct PlaySession {
    chart: Chart,
    ruleset: Arc<dyn Ruleset>,
    windows: HitWindows,
    scroll: ScrollMapper,
    timeline: TimelineMapper,
    early_policy: EarlyInputPolicy,
    lookahead_ms: f64,
    maxima: ChartMaxima,

    states: ObjectStates,
    score: ScoreProcessor,
    held: Vec<bool>,

    judge_clock: f64,
    display_clock: f64,
    /// Index in `chart.order()` of the first unjudged object.
    head: usize,
    /// Index in `chart.order()` of the first object not yet activated.
    activated: usize,

    history: Vec<Judgement>,
    drained: usize,
    bus: Option<SessionBus>,
    finished_sent: bool,
}

impl PlaySession {
    pub fn new(
        chart: Chart,
        ruleset: Arc<dyn Ruleset>,
        windows: HitWindows,
        scroll: ScrollMapper,
        early_policy: EarlyInputPolicy,
    ) -> Self {
        let lookahead_ms = windows.widest().max(scroll.lookahead_ms());
        let maxima = chart_maxima(ruleset.as_ref(), &chart);
        let score = ScoreProcessor::for_chart(ruleset.clone(), &chart);
        let actions = chart.objects().iter().map(|o| o.action + 1).max().unwrap_or(0);

        log::info!(
            "SESSION: {} objects, {} actions, lookahead {:.0} ms, ruleset '{}'",
            chart.len(),
            actions,
            lookahead_ms,
            ruleset.id()
        );

        Self {
            states: ObjectStates::new(chart.len()),
            timeline: TimelineMapper::new(chart.end_time()),
            chart,
            ruleset,
            windows,
            scroll,
            early_policy,
            lookahead_ms,
            maxima,
            score,
            held: vec![false; actions],
            judge_clock: f64::NEG_INFINITY,
            display_clock: 0.0,
            head: 0,
            activated: 0,
            history: Vec::new(),
            drained: 0,
            bus: None,
            finished_sent: false,
        }
    }

    /// Converts `beatmap` and resolves windows and scroll from `settings`.
    pub fn from_beatmap(
        beatmap: &SourceBeatmap,
        ruleset: Arc<dyn Ruleset>,
        settings: &JudgeSettings,
    ) -> Result<Self, SetupError> {
        ruleset.validate_beatmap(beatmap)?;
        let windows =
            settings.resolve_hit_windows(&beatmap.difficulty, |d| ruleset.hit_windows(d))?;
        let scroll = settings.scroll.build()?;
        let chart = ruleset.converter().convert(beatmap);

        Ok(Self::new(
            chart,
            ruleset,
            windows,
            scroll,
            settings.input.early_policy,
        ))
    }

    /// Publishes judgement events and playfield snapshots on `bus`.
    pub fn attach_bus(&mut self, bus: SessionBus) {
        self.bus = Some(bus);
    }

    pub fn chart(&self) -> &Chart {
        &self.chart
    }

    pub fn windows(&self) -> &HitWindows {
        &self.windows
    }

    pub fn lookahead_ms(&self) -> f64 {
        self.lookahead_ms
    }

    pub fn max_combo(&self) -> u32 {
        self.maxima.max_combo
    }

    pub fn max_accuracy(&self) -> f64 {
        self.maxima.max_accuracy
    }

    pub fn judge_time(&self) -> f64 {
        self.judge_clock
    }

    pub fn display_time(&self) -> f64 {
        self.display_clock
    }

    pub fn score(&self) -> &ScoreProcessor {
        &self.score
    }

    pub fn board(&self) -> ScoreBoard {
        self.score.board()
    }

    pub fn is_held(&self, action: usize) -> bool {
        self.held.get(action).copied().unwrap_or(false)
    }

    pub fn phase(&self, id: ObjectId) -> ObjectPhase {
        self.states.get(id).unwrap_or_else(|v| fail_fast(v))
    }

    pub fn judgement(&self, id: ObjectId) -> Option<Judgement> {
        self.phase(id).judgement().copied()
    }

    pub fn is_finished(&self) -> bool {
        self.states.all_judged()
    }

    /// Every judgement emitted so far, in emission order.
    pub fn judgements(&self) -> &[Judgement] {
        &self.history
    }

    /// Judgements emitted since the previous call.
    pub fn drain_judgements(&mut self) -> Vec<Judgement> {
        let fresh = self.history[self.drained..].to_vec();
        self.drained = self.history.len();
        fresh
    }

    /// Advances both clocks to `now` and applies every deadline up to it.
    ///
    /// Panics if `now` is earlier than the judgement clock.
    pub fn update(&mut self, now: f64) {
        if now < self.judge_clock {
            fail_fast(InvariantViolation::BackwardClock {
                from: self.judge_clock,
                to: now,
            });
        }

        self.advance(now);
        self.display_clock = now;
        self.publish_snapshot();
    }

    /// Moves the display clock only. Judged objects stay judged.
    pub fn seek(&mut self, now: f64) {
        log::debug!("SESSION: Seek {:.0} -> {:.0} ms", self.display_clock, now);
        self.display_clock = now;
        self.publish_snapshot();
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        let time = event.time_ms;
        if time > self.judge_clock {
            self.advance(time);
        }

        if event.action >= self.held.len() {
            self.held.resize(event.action + 1, false);
        }

        match event.kind {
            InputKind::Press => {
                self.held[event.action] = true;
                self.press(time, event.action);
            }
            InputKind::Release => {
                self.held[event.action] = false;
                self.release(time, event.action);
            }
        }

        self.announce_finish();
    }

    /// Feeds `inputs` in order, then runs the clock past every deadline.
    pub fn play(&mut self, inputs: &[InputEvent]) {
        for &event in inputs {
            self.handle_input(event);
        }
        self.finish();
    }

    /// Runs the clock past the last deadline so every object is judged.
    pub fn finish(&mut self) {
        let end = self.chart.end_time() + self.windows.widest() + 1.0;
        self.update(end.max(self.judge_clock));
    }

    pub fn finalize(self) -> FinalScore {
        if !self.is_finished() {
            log::warn!(
                "SESSION: Finalized with {} of {} objects unjudged",
                self.chart.len() - self.states.judged_count(),
                self.chart.len()
            );
        }
        self.score.finalize()
    }

    pub fn snapshot(&self) -> PlayfieldSnapshot {
        let now = self.display_clock;
        let (_, far_edge) = self.scroll.visible_range(now);
        let trail = now - self.windows.widest();

        let order = self.chart.order();
        let last = order.partition_point(|&id| self.chart.object(id).start_time <= far_edge);

        let visible = order[..last]
            .iter()
            .map(|&id| self.chart.object(id))
            .filter(|o| o.end_time() >= trail || self.phase(o.id).is_awaiting())
            .map(|o| VisibleObject {
                id: o.id,
                kind: o.kind,
                action: o.action,
                offset: self.scroll.offset(o.start_time, now),
                end_offset: self.scroll.offset(o.end_time(), now),
                phase: self.phase(o.id),
            })
            .collect();

        PlayfieldSnapshot {
            display_time: now,
            judge_time: self.judge_clock,
            timestamp: Instant::now(),
            progress: self.timeline.relative(now),
            visible,
            held: self.held.clone(),
            score: self.score.snapshot(),
            remaining: self.chart.len() - self.states.judged_count(),
        }
    }

    fn publish_snapshot(&self) {
        if let Some(bus) = &self.bus {
            bus.send_snapshot(self.snapshot());
        }
    }

    fn advance(&mut self, now: f64) {
        self.judge_clock = now;
        self.activate_until(now);
        self.apply_deadlines(now);

        while self.head < self.chart.order().len()
            && self.phase(self.chart.order()[self.head]).is_judged()
        {
            self.head += 1;
        }

        self.announce_finish();
    }

    fn announce_finish(&mut self) {
        if self.is_finished() && !self.finished_sent {
            self.finished_sent = true;
            log::info!("SESSION: All {} objects judged", self.chart.len());
            if let Some(bus) = &self.bus {
                bus.send_event(SessionEvent::Finished);
            }
        }
    }

    fn activate_until(&mut self, now: f64) {
        while let Some(&id) = self.chart.order().get(self.activated) {
            let start = self.chart.object(id).start_time;
            let entering = self.scroll.is_within_lookahead(start, now)
                || start - now <= self.windows.widest();
            if !entering {
                break;
            }
            self.ensure_awaiting(id);
            self.activated += 1;
        }
    }

    fn apply_deadlines(&mut self, now: f64) {
        for i in self.head..self.activated {
            let id = self.chart.order()[i];
            if !self.phase(id).is_awaiting() {
                continue;
            }

            let object = self.chart.object(id);
            let (kind, start, end) = (object.kind, object.start_time, object.end_time());
            let childless = object.children.is_empty();
            let held = self.is_held(object.action) && self.body_engaged(object);
            let deadline = self.windows.miss_deadline(start);

            let verdict = match kind {
                HitObjectKind::Hit => {
                    (now > deadline).then(|| Judgement::untimed(id, HitResult::Miss))
                }
                HitObjectKind::Release => {
                    if held && now >= start {
                        Some(Judgement::untimed(id, self.windows.best()))
                    } else if now > deadline {
                        Some(Judgement::untimed(id, HitResult::Miss))
                    } else {
                        None
                    }
                }
                HitObjectKind::Tick { .. } => (now > start).then(|| {
                    let result = if held {
                        kind.max_result()
                    } else {
                        kind.auto_miss_result()
                    };
                    Judgement::untimed(id, result)
                }),
                HitObjectKind::Bonus { .. } => {
                    (now > end).then(|| Judgement::untimed(id, kind.auto_miss_result()))
                }
                HitObjectKind::Composite => {
                    if childless && now > end {
                        self.resolve_composite(id);
                    }
                    None
                }
            };

            if let Some(judgement) = verdict {
                self.judge(judgement);
            }
        }
    }

    fn awaiting_of(&self, action: usize) -> impl Iterator<Item = &HitObject> {
        self.chart.order()[self.head..self.activated]
            .iter()
            .map(|&id| self.chart.object(id))
            .filter(move |o| o.action == action && self.phase(o.id).is_awaiting())
    }

    fn press(&mut self, time: f64, action: usize) {
        let mut best: Option<(ObjectId, f64, HitResult)> = None;
        let mut too_early: Option<(ObjectId, f64)> = None;

        for object in self.awaiting_of(action) {
            if object.kind != HitObjectKind::Hit {
                continue;
            }
            let delta = time - object.start_time;
            match self.windows.evaluate(delta) {
                WindowOutcome::Hit(result) => {
                    // Strict comparison keeps the earlier object on ties.
                    if best.is_none_or(|(_, d, _)| delta.abs() < d.abs()) {
                        best = Some((object.id, delta, result));
                    }
                }
                WindowOutcome::TooEarly => {
                    too_early.get_or_insert((object.id, delta));
                }
                WindowOutcome::Expired => {}
            }
        }

        if let Some((id, delta, result)) = best {
            self.judge(Judgement::new(id, result, delta));
            return;
        }

        let bonus = self
            .awaiting_of(action)
            .find(|o| {
                matches!(o.kind, HitObjectKind::Bonus { .. })
                    && (o.start_time..=o.end_time()).contains(&time)
            })
            .map(|o| Judgement::untimed(o.id, o.kind.max_result()));
        if let Some(judgement) = bonus {
            self.judge(judgement);
            return;
        }

        match (too_early, self.early_policy) {
            (Some((id, delta)), EarlyInputPolicy::CountAsMiss) => {
                log::debug!("SESSION: Press {delta:+.0} ms before {id}, counted as miss");
                self.judge(Judgement::new(id, HitResult::Miss, delta));
            }
            (Some((id, delta)), EarlyInputPolicy::Ignore) => {
                log::trace!("SESSION: Press {delta:+.0} ms before {id} ignored");
            }
            (None, _) => {}
        }
    }

    fn release(&mut self, time: f64, action: usize) {
        let Some(tail) = self.pending_tail(action) else {
            return;
        };

        let delta = time - self.chart.object(tail).start_time;
        let result = match self.windows.evaluate(delta) {
            WindowOutcome::Hit(result) => result,
            // Let go inside the body, before the tail window opened.
            WindowOutcome::TooEarly => HitResult::Miss,
            WindowOutcome::Expired => return,
        };

        self.ensure_awaiting(tail);
        self.judge(Judgement::new(tail, result, delta));
    }

    /// Unjudged tail of the started hold on `action`, if any.
    ///
    /// Tails of long holds may still be outside the lookahead.
    fn pending_tail(&self, action: usize) -> Option<ObjectId> {
        self.awaiting_of(action).find_map(|o| match o.kind {
            HitObjectKind::Composite if self.hold_started(o) => o
                .children
                .iter()
                .copied()
                .find(|&c| {
                    self.chart.object(c).kind == HitObjectKind::Release
                        && !self.phase(c).is_judged()
                }),
            HitObjectKind::Release if o.is_root() => Some(o.id),
            _ => None,
        })
    }

    /// Whether the head of `hold` has been judged.
    fn hold_started(&self, hold: &HitObject) -> bool {
        hold.children.first().is_some_and(|&head| {
            self.chart.object(head).kind == HitObjectKind::Hit && self.phase(head).is_judged()
        })
    }

    /// Whether holding the action counts for `object`: inside a hold, the
    /// head must have been hit first.
    fn body_engaged(&self, object: &HitObject) -> bool {
        let Some(parent) = object.parent else {
            return true;
        };
        let head = self
            .chart
            .object(parent)
            .children
            .first()
            .copied()
            .filter(|&head| head != object.id)
            .filter(|&head| self.chart.object(head).kind == HitObjectKind::Hit);
        match head {
            Some(head) => self.phase(head).judgement().is_some_and(|j| j.is_hit()),
            None => true,
        }
    }

    fn ensure_awaiting(&mut self, id: ObjectId) {
        if self.phase(id) == ObjectPhase::Idle
            && let Err(v) = self.states.activate(id)
        {
            fail_fast(v);
        }
    }

    fn judge(&mut self, judgement: Judgement) {
        if let Err(v) = self.states.judge(judgement) {
            fail_fast(v);
        }

        log::trace!(
            "SESSION: {} -> {} ({:+.1} ms)",
            judgement.object,
            judgement.result,
            judgement.offset_ms
        );

        self.score.consume(&judgement);
        self.history.push(judgement);
        if let Some(bus) = &self.bus {
            bus.send_event(SessionEvent::Judged(judgement));
        }

        if let Some(parent) = self.chart.object(judgement.object).parent {
            self.resolve_composite(parent);
        }
    }

    /// Judges `id` from its children once all of them are judged.
    fn resolve_composite(&mut self, id: ObjectId) {
        let mut results = Vec::with_capacity(self.chart.object(id).children.len());
        for &child in &self.chart.object(id).children {
            match self.phase(child).judgement() {
                Some(j) => results.push(j.result),
                None => return,
            }
        }

        self.ensure_awaiting(id);

        let result = self.ruleset.composite_rule().resolve(&results);
        self.judge(Judgement::untimed(id, result));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::hit_object::ChartBuilder;
    use crate::models::settings::ManiaSettings;
    use crate::ruleset::{CompositeRule, ManiaRuleset};
    use crate::test_utils::scenario_windows;

    fn session(chart: Chart, policy: EarlyInputPolicy) -> PlaySession {
        PlaySession::new(
            chart,
            Arc::new(ManiaRuleset::default()),
            scenario_windows(),
            ScrollMapper::new(1.0, 100.0).unwrap(),
            policy,
        )
    }

    fn single(at: f64) -> (PlaySession, ObjectId) {
        let mut b = ChartBuilder::new();
        let id = b.hit(at, 0);
        (session(b.build(), EarlyInputPolicy::Ignore), id)
    }

    #[test]
    fn lookahead_activation() {
        let (mut s, id) = single(1000.0);
        assert_eq!(s.lookahead_ms(), 100.0);

        s.update(899.0);
        assert_eq!(s.phase(id), ObjectPhase::Idle);
        s.update(900.0);
        assert_eq!(s.phase(id), ObjectPhase::Awaiting);
    }

    #[test]
    fn widest_window_extends_short_scroll_lookahead() {
        let mut b = ChartBuilder::new();
        let id = b.hit(1000.0, 0);
        let mut s = PlaySession::new(
            b.build(),
            Arc::new(ManiaRuleset::default()),
            scenario_windows(),
            ScrollMapper::new(1.0, 30.0).unwrap(),
            EarlyInputPolicy::Ignore,
        );
        assert_eq!(s.lookahead_ms(), 80.0);

        s.update(919.0);
        assert_eq!(s.phase(id), ObjectPhase::Idle);
        s.update(920.0);
        assert_eq!(s.phase(id), ObjectPhase::Awaiting);
    }

    #[test]
    fn press_inside_perfect_window() {
        let (mut s, id) = single(1000.0);
        s.handle_input(InputEvent::press(1005.0, 0));

        assert_eq!(
            s.judgement(id),
            Some(Judgement::new(id, HitResult::Perfect, 5.0))
        );
        assert_eq!(s.score().combo(), 1);
        assert!(s.is_finished());
    }

    #[test]
    fn no_input_forces_miss_after_window() {
        let mut b = ChartBuilder::new();
        b.hit(500.0, 0);
        let late = b.hit(1000.0, 0);
        let mut s = session(b.build(), EarlyInputPolicy::Ignore);

        s.handle_input(InputEvent::press(500.0, 0));
        assert_eq!(s.score().combo(), 1);

        s.update(1080.0);
        assert_eq!(s.phase(late), ObjectPhase::Awaiting);
        s.update(1081.0);
        assert_eq!(s.judgement(late).map(|j| j.result), Some(HitResult::Miss));
        assert_eq!(s.score().combo(), 0);
    }

    #[test]
    fn press_goes_to_closest_object() {
        let mut b = ChartBuilder::new();
        let first = b.hit(1000.0, 0);
        let second = b.hit(1050.0, 0);
        let mut s = session(b.build(), EarlyInputPolicy::Ignore);

        s.handle_input(InputEvent::press(1040.0, 0));
        assert_eq!(s.phase(first), ObjectPhase::Awaiting);
        assert_eq!(
            s.judgement(second).map(|j| j.result),
            Some(HitResult::Perfect)
        );

        // Equidistant presses favour the earlier object.
        let mut b = ChartBuilder::new();
        let a = b.hit(1000.0, 0);
        b.hit(1020.0, 0);
        let mut s = session(b.build(), EarlyInputPolicy::Ignore);
        s.handle_input(InputEvent::press(1010.0, 0));
        assert!(s.phase(a).is_judged());
    }

    #[test]
    fn presses_on_other_actions_do_nothing() {
        let (mut s, id) = single(1000.0);
        s.handle_input(InputEvent::press(1000.0, 3));
        assert_eq!(s.phase(id), ObjectPhase::Awaiting);
        assert!(s.judgements().is_empty());
        assert!(s.is_held(3));
    }

    #[test]
    fn too_early_press_follows_policy() {
        let (mut s, id) = single(1000.0);
        s.handle_input(InputEvent::press(905.0, 0));
        assert_eq!(s.phase(id), ObjectPhase::Awaiting);
        s.handle_input(InputEvent::press(1000.0, 0));
        assert_eq!(s.judgement(id).map(|j| j.result), Some(HitResult::Perfect));

        let mut b = ChartBuilder::new();
        let id = b.hit(1000.0, 0);
        let mut s = session(b.build(), EarlyInputPolicy::CountAsMiss);
        s.handle_input(InputEvent::press(905.0, 0));
        assert_eq!(
            s.judgement(id),
            Some(Judgement::new(id, HitResult::Miss, -95.0))
        );
    }

    #[test]
    fn composite_children_judged_independently() {
        let mut b = ChartBuilder::new();
        let parent = b.add(HitObjectKind::Composite, 1000.0, Some(1300.0), 0);
        let t1 = b.add_child(parent, HitObjectKind::Tick { large: true }, 1100.0, None);
        let t2 = b.add_child(parent, HitObjectKind::Tick { large: true }, 1200.0, None);
        let last = b.add_child(parent, HitObjectKind::Hit, 1300.0, None);
        let mut s = session(b.build(), EarlyInputPolicy::Ignore);

        let mut combos = Vec::new();
        s.handle_input(InputEvent::press(1050.0, 0));
        s.update(1101.0);
        combos.push(s.score().combo());
        s.handle_input(InputEvent::release(1150.0, 0));
        s.update(1201.0);
        combos.push(s.score().combo());
        s.handle_input(InputEvent::press(1315.0, 0));
        combos.push(s.score().combo());

        let results: Vec<_> = s.judgements().iter().map(|j| (j.object, j.result)).collect();
        assert_eq!(
            results,
            vec![
                (t1, HitResult::LargeTickHit),
                (t2, HitResult::LargeTickMiss),
                (last, HitResult::Great),
                (parent, HitResult::Ignore),
            ]
        );
        assert_eq!(combos, vec![1, 0, 1]);
        assert!(s.is_finished());
    }

    fn hold_chart() -> (Chart, [ObjectId; 4]) {
        let mut b = ChartBuilder::new();
        let hold = b.add(HitObjectKind::Composite, 1000.0, Some(2000.0), 1);
        let head = b.add_child(hold, HitObjectKind::Hit, 1000.0, None);
        let tick = b.add_child(hold, HitObjectKind::Tick { large: true }, 1500.0, None);
        let tail = b.add_child(hold, HitObjectKind::Release, 2000.0, None);
        (b.build(), [hold, head, tick, tail])
    }

    #[test]
    fn hold_completes_while_held() {
        let (chart, [hold, head, tick, tail]) = hold_chart();
        let mut s = session(chart, EarlyInputPolicy::Ignore);

        s.handle_input(InputEvent::press(1003.0, 1));
        s.update(1999.0);
        assert_eq!(s.judgement(tick).map(|j| j.result), Some(HitResult::LargeTickHit));
        assert_eq!(s.phase(tail), ObjectPhase::Awaiting);

        s.update(2000.0);
        assert_eq!(s.judgement(head).map(|j| j.result), Some(HitResult::Perfect));
        assert_eq!(s.judgement(tail).map(|j| j.result), Some(HitResult::Perfect));
        assert_eq!(s.judgement(hold).map(|j| j.result), Some(HitResult::Ignore));
        assert_eq!(s.score().accuracy(), 1.0);
    }

    #[test]
    fn early_release_misses_tail_and_ticks() {
        let (chart, [_, _, tick, tail]) = hold_chart();
        let mut s = session(chart, EarlyInputPolicy::Ignore);

        s.handle_input(InputEvent::press(1000.0, 1));
        s.handle_input(InputEvent::release(1400.0, 1));
        assert_eq!(
            s.judgement(tail),
            Some(Judgement::new(tail, HitResult::Miss, -600.0))
        );

        s.update(1501.0);
        assert_eq!(s.judgement(tick).map(|j| j.result), Some(HitResult::LargeTickMiss));
        assert!(s.is_finished());
    }

    #[test]
    fn release_inside_tail_window_is_timed() {
        let (chart, [_, _, _, tail]) = hold_chart();
        let mut s = session(chart, EarlyInputPolicy::Ignore);

        s.handle_input(InputEvent::press(1000.0, 1));
        s.handle_input(InputEvent::release(1985.0, 1));
        assert_eq!(
            s.judgement(tail),
            Some(Judgement::new(tail, HitResult::Great, -15.0))
        );
    }

    #[test]
    fn holding_without_hitting_the_head_misses_the_body() {
        let (chart, [hold, head, tick, tail]) = hold_chart();
        let mut s = session(chart, EarlyInputPolicy::Ignore);

        // Too early for the head, then kept down through the whole body.
        s.handle_input(InputEvent::press(905.0, 1));
        s.update(1501.0);
        assert_eq!(s.judgement(head).map(|j| j.result), Some(HitResult::Miss));
        assert_eq!(s.judgement(tick).map(|j| j.result), Some(HitResult::LargeTickMiss));

        s.update(2000.0);
        assert_eq!(s.phase(tail), ObjectPhase::Awaiting);
        s.update(2081.0);
        assert_eq!(s.judgement(tail), Some(Judgement::untimed(tail, HitResult::Miss)));
        assert!(s.phase(hold).is_judged());
        assert_eq!(s.score().count(HitResult::Perfect), 0);
    }

    #[test]
    fn short_hold_tail_waits_for_the_head() {
        let mut b = ChartBuilder::new();
        let hold = b.add(HitObjectKind::Composite, 1000.0, Some(1030.0), 0);
        let head = b.add_child(hold, HitObjectKind::Hit, 1000.0, None);
        let tail = b.add_child(hold, HitObjectKind::Release, 1030.0, None);
        let mut s = session(b.build(), EarlyInputPolicy::Ignore);

        s.handle_input(InputEvent::press(905.0, 0));
        s.update(1030.0);
        assert_eq!(s.phase(head), ObjectPhase::Awaiting);
        assert!(!s.phase(tail).is_judged());

        s.update(1111.0);
        assert_eq!(s.judgement(head).map(|j| j.result), Some(HitResult::Miss));
        assert_eq!(s.judgement(tail).map(|j| j.result), Some(HitResult::Miss));
    }

    #[test]
    fn ratio_rule_judges_the_hold() {
        let (chart, [hold, ..]) = hold_chart();
        let ruleset = ManiaRuleset::new(ManiaSettings {
            hold_body: CompositeRule::Ratio,
            ..Default::default()
        });
        let mut s = PlaySession::new(
            chart,
            Arc::new(ruleset),
            scenario_windows(),
            ScrollMapper::new(1.0, 100.0).unwrap(),
            EarlyInputPolicy::Ignore,
        );
        assert_eq!(s.max_combo(), 4);

        s.handle_input(InputEvent::press(1000.0, 1));
        s.handle_input(InputEvent::release(1400.0, 1));
        s.finish();

        // Head hit, tick and tail missed.
        assert_eq!(s.judgement(hold).map(|j| j.result), Some(HitResult::Meh));
    }

    #[test]
    fn bonus_takes_presses_inside_its_span() {
        let mut b = ChartBuilder::new();
        let roll = b.add(HitObjectKind::Bonus { large: false }, 1000.0, Some(1400.0), 0);
        let missed = b.add(HitObjectKind::Bonus { large: true }, 2000.0, Some(2100.0), 0);
        let mut s = session(b.build(), EarlyInputPolicy::Ignore);

        s.handle_input(InputEvent::press(1200.0, 0));
        assert_eq!(
            s.judgement(roll),
            Some(Judgement::untimed(roll, HitResult::SmallBonus))
        );
        assert_eq!(s.score().bonus(), 10.0);

        s.finish();
        assert_eq!(s.judgement(missed).map(|j| j.result), Some(HitResult::Ignore));
        assert_eq!(s.score().combo(), 0);
    }

    #[test]
    fn seek_only_moves_display() {
        let (mut s, id) = single(1000.0);
        s.update(1200.0);
        let before = s.judgement(id);
        assert!(before.is_some());

        s.seek(0.0);
        assert_eq!(s.display_time(), 0.0);
        assert_eq!(s.judge_time(), 1200.0);
        assert_eq!(s.judgement(id), before);

        s.update(1300.0);
        assert_eq!(s.judgements().len(), 1);
    }

    #[test]
    #[should_panic(expected = "judgement clock moved backwards")]
    fn backward_update_panics() {
        let (mut s, _) = single(1000.0);
        s.update(500.0);
        s.update(400.0);
    }

    #[test]
    fn late_input_does_not_rewind_clock() {
        let (mut s, id) = single(1000.0);
        s.update(1010.0);
        s.handle_input(InputEvent::press(1005.0, 0));
        assert_eq!(s.judge_time(), 1010.0);
        assert_eq!(s.judgement(id).map(|j| j.offset_ms), Some(5.0));
    }

    #[test]
    fn drain_returns_each_judgement_once() {
        let mut b = ChartBuilder::new();
        b.hit(100.0, 0);
        b.hit(200.0, 0);
        let mut s = session(b.build(), EarlyInputPolicy::Ignore);

        s.handle_input(InputEvent::press(100.0, 0));
        assert_eq!(s.drain_judgements().len(), 1);
        assert!(s.drain_judgements().is_empty());
        s.finish();
        assert_eq!(s.drain_judgements().len(), 1);
        assert_eq!(s.judgements().len(), 2);
    }

    #[test]
    fn bus_receives_events_and_snapshots() {
        let (mut s, id) = single(1000.0);
        let bus = SessionBus::new();
        s.attach_bus(bus.clone());

        s.update(950.0);
        let snap = bus.snapshot_rx.try_recv().unwrap();
        assert_eq!(snap.visible.len(), 1);
        assert_eq!(snap.visible[0].offset, 50.0);
        assert_eq!(snap.remaining, 1);

        s.handle_input(InputEvent::press(985.0, 0));
        assert_eq!(
            bus.event_rx.try_recv().unwrap(),
            SessionEvent::Judged(Judgement::new(id, HitResult::Great, -15.0))
        );
        assert_eq!(bus.event_rx.try_recv().unwrap(), SessionEvent::Finished);

        // Only two frames are buffered; the rest are dropped.
        for t in 0..5 {
            s.update(1000.0 + f64::from(t));
        }
        assert_eq!(bus.snapshot_rx.len(), SessionBus::SNAPSHOT_CAPACITY);
    }
}
