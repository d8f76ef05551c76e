use judgeline::logic::{ObjectPhase, ScoreProcessor};
use judgeline::models::hit_object::{ChartBuilder, HitObjectKind, ObjectId};
use judgeline::models::hit_result::HitResult;
use judgeline::models::judgement::Judgement;
use judgeline::models::replay::InputEvent;
use judgeline::ruleset::{DefaultWeights, ManiaRuleset, StandardisedScore, WeightTable};
use std::sync::Arc;

use self::common::*;

mod common;

fn processor() -> ScoreProcessor {
    ScoreProcessor::new(
        Arc::new(ManiaRuleset::default()),
        Box::new(StandardisedScore::new(10, 10.0)),
        10,
    )
}

#[test]
fn press_timing_maps_to_result() {
    let cases = [
        (1005.0, HitResult::Perfect),
        (990.0, HitResult::Perfect),
        (1015.0, HitResult::Great),
        (1035.0, HitResult::Good),
        (960.0, HitResult::Good),
        (1070.0, HitResult::Miss),
    ];

    for (press, expected) in cases {
        let mut b = ChartBuilder::new();
        let id = b.hit(1000.0, 0);
        let mut s = session(b.build());

        s.handle_input(InputEvent::press(press, 0));
        let judgement = s.judgement(id).unwrap();
        assert_eq!(judgement.result, expected, "press at {press}");
        assert_eq!(judgement.offset_ms, press - 1000.0);
    }
}

#[test]
fn perfect_press_adds_combo() {
    let mut b = ChartBuilder::new();
    b.hit(1000.0, 0);
    let mut s = session(b.build());

    s.handle_input(InputEvent::press(1005.0, 0));
    assert_eq!(s.score().combo(), 1);
    assert_eq!(s.score().count(HitResult::Perfect), 1);
}

#[test]
fn good_press_adds_good_weight() {
    let mut b = ChartBuilder::new();
    b.hit(1000.0, 0);
    let mut s = session(b.build());

    s.handle_input(InputEvent::press(1035.0, 0));
    let inputs = s.score().inputs();
    assert_eq!(s.score().combo(), 1);
    assert_eq!(
        inputs.accuracy_numerator,
        DefaultWeights.accuracy_weight(HitResult::Good)
    );
    assert!(inputs.accuracy_numerator < DefaultWeights.accuracy_weight(HitResult::Perfect));
}

#[test]
fn missing_input_is_a_miss() {
    let mut b = ChartBuilder::new();
    b.hit(900.0, 0);
    let id = b.hit(1000.0, 0);
    let mut s = session(b.build());

    s.handle_input(InputEvent::press(902.0, 0));
    assert_eq!(s.score().combo(), 1);

    s.update(1081.0);
    assert_eq!(s.judgement(id).map(|j| j.result), Some(HitResult::Miss));
    assert_eq!(s.score().combo(), 0);
    assert!(s.is_finished());
}

#[test]
fn combo_sequence_and_highest() {
    let mut p = processor();
    let combos: Vec<u32> = [
        HitResult::Perfect,
        HitResult::Perfect,
        HitResult::Miss,
        HitResult::Great,
    ]
    .into_iter()
    .map(|r| {
        p.consume(&Judgement::untimed(ObjectId(0), r));
        p.combo()
    })
    .collect();

    assert_eq!(combos, vec![1, 2, 0, 1]);
    assert_eq!(p.highest_combo(), 2);
}

#[test]
fn small_bonus_only_touches_bonus() {
    let mut p = processor();
    p.consume(&Judgement::untimed(ObjectId(0), HitResult::Great));
    let before = *p.inputs();

    p.consume(&Judgement::untimed(ObjectId(1), HitResult::SmallBonus));
    let after = *p.inputs();

    assert!(after.bonus > before.bonus);
    assert_eq!(after.combo, before.combo);
    assert_eq!(after.accuracy_numerator, before.accuracy_numerator);
    assert_eq!(after.accuracy_denominator, before.accuracy_denominator);
}

#[test]
fn composite_emits_independent_judgements() {
    let mut b = ChartBuilder::new();
    let roll = b.add(HitObjectKind::Composite, 1000.0, Some(1300.0), 2);
    let first = b.add_child(roll, HitObjectKind::Tick { large: true }, 1100.0, None);
    let second = b.add_child(roll, HitObjectKind::Tick { large: true }, 1200.0, None);
    let last = b.add_child(roll, HitObjectKind::Hit, 1300.0, None);
    let mut s = session(b.build());

    let mut combos = Vec::new();
    s.handle_input(InputEvent::press(1000.0, 2));
    s.update(1150.0);
    combos.push(s.score().combo());
    s.handle_input(InputEvent::release(1160.0, 2));
    s.update(1250.0);
    combos.push(s.score().combo());
    s.handle_input(InputEvent::press(1315.0, 2));
    combos.push(s.score().combo());

    let emitted: Vec<_> = s
        .drain_judgements()
        .into_iter()
        .filter(|j| j.object != roll)
        .map(|j| (j.object, j.result))
        .collect();
    assert_eq!(
        emitted,
        vec![
            (first, HitResult::LargeTickHit),
            (second, HitResult::LargeTickMiss),
            (last, HitResult::Great),
        ]
    );
    assert_eq!(combos, vec![1, 0, 1]);
    assert!(matches!(s.phase(roll), ObjectPhase::Judged(_)));
}

#[test]
fn simultaneous_objects_interleave_by_input() {
    let mut b = ChartBuilder::new();
    let left = b.hit(1000.0, 0);
    let right = b.hit(1000.0, 1);
    let mut s = session(b.build());

    s.handle_input(InputEvent::press(1012.0, 1));
    s.handle_input(InputEvent::press(1013.0, 0));

    let order: Vec<_> = s.judgements().iter().map(|j| j.object).collect();
    assert_eq!(order, vec![right, left]);
}

#[test]
#[should_panic(expected = "judgement clock moved backwards")]
fn judgement_clock_cannot_rewind() {
    let mut b = ChartBuilder::new();
    b.hit(1000.0, 0);
    let mut s = session(b.build());

    s.update(1500.0);
    s.update(1000.0);
}
