use std::cell::RefCell;
use std::rc::Rc;

use cgmath::Vector2;
use osu_model::{Chart, Difficulty, Mods, PathPoint, ScorePoint, Target};
use osu_replay::{ReplayCursor, ReplayData, autoplay, drive};
use osu_rule::{CursorSpec, Grade, HitEvent, OsuRuleset, RatingTable, RulesetListener};

fn mixed_chart() -> Chart {
    Chart::new(
        vec![
            Target::circle(0, 1000, Vector2::new(60.0, 60.0)),
            Target::circle(1, 1600, Vector2::new(160.0, 90.0)),
            Target::slider(
                2,
                2200,
                3200,
                vec![
                    PathPoint {
                        time: 2200,
                        position: Vector2::new(200.0, 150.0),
                    },
                    PathPoint {
                        time: 3200,
                        position: Vector2::new(320.0, 150.0),
                    },
                ],
                vec![
                    ScorePoint {
                        time: 2700,
                        is_reverse: false,
                    },
                    ScorePoint {
                        time: 3200,
                        is_reverse: false,
                    },
                ],
                1,
            ),
            Target::circle(3, 3800, Vector2::new(100.0, 250.0)),
            Target::spinner(4, 4400, 6400, Vector2::new(256.0, 192.0)),
        ],
        Difficulty::new(5.0, 4.0, 5.0, 9.0),
    )
}

#[derive(Clone, Default)]
struct Recorder(Rc<RefCell<Vec<HitEvent>>>);

impl RulesetListener for Recorder {
    fn on_judgment(&mut self, event: &HitEvent) {
        self.0.borrow_mut().push(event.clone());
    }
}

fn event_key(e: &HitEvent) -> (usize, i64, usize, String, i64, u64) {
    (
        e.cursor,
        e.time,
        e.number,
        format!("{:?}/{:?}/{:?}", e.result, e.combo_result, e.addition),
        e.score,
        e.rating.to_bits(),
    )
}

#[test]
fn autoplay_scores_perfectly() {
    let chart = mixed_chart();
    chart.validate().unwrap();

    let frames = autoplay::generate(&chart);
    let mut cursors = vec![ReplayCursor::new(frames)];
    let mut set = OsuRuleset::new(
        chart,
        &[CursorSpec::new("auto", Mods::NONE)],
        RatingTable::new(),
    );

    drive(&mut set, &mut cursors, 16);

    assert!(set.is_ended());
    assert_eq!(set.score_set(0).accuracy(), 100.0);
    assert_eq!(set.score_set(0).grade(), Grade::SS);
    assert_eq!(set.score_set(0).counts().n300, 5);
    assert_eq!(set.score_set(0).counts().miss, 0);
    assert!(set.is_perfect_combo(0));
    assert!(set.rating(0) > 0.0);
    assert!(set.health_fraction(0) > 0.5);
}

#[test]
fn replaying_the_same_stream_twice_is_deterministic() {
    let chart = mixed_chart();
    let frames = autoplay::generate(&chart);

    let mut runs = Vec::new();
    for _ in 0..2 {
        let recorder = Recorder::default();
        let handle = recorder.0.clone();

        let mut set = OsuRuleset::new(
            chart.clone(),
            &[CursorSpec::new("auto", Mods::NONE)],
            RatingTable::new(),
        );
        set.set_listener(Box::new(recorder));

        let mut cursors = vec![ReplayCursor::new(frames.clone())];
        drive(&mut set, &mut cursors, 16);

        let events: Vec<_> = handle.borrow().iter().map(event_key).collect();
        runs.push((
            events,
            set.score_set(0).score(),
            set.score_set(0).grade(),
            set.rating(0).to_bits(),
            set.score_set(0).ghost().to_vec(),
        ));
    }

    assert_eq!(runs[0], runs[1]);
}

#[test]
fn compressed_replay_scores_identically() {
    let chart = mixed_chart();
    let frames = autoplay::generate(&chart);

    // Round-trip the frames through the compressed container.
    let mut replay = ReplayData {
        player: "auto".into(),
        frames: frames.clone(),
        ..Default::default()
    };
    replay.shrink();
    assert!(replay.validate());
    assert_eq!(replay.frames, frames);

    let mut set = OsuRuleset::new(
        chart,
        &[CursorSpec::new("auto", Mods::NONE)],
        RatingTable::new(),
    );
    let mut cursors = vec![ReplayCursor::new(replay.frames)];
    drive(&mut set, &mut cursors, 16);

    assert_eq!(set.score_set(0).grade(), Grade::SS);
}

#[test]
fn side_by_side_cursors_score_independently() {
    let chart = mixed_chart();
    let frames = autoplay::generate(&chart);

    let mut set = OsuRuleset::new(
        chart,
        &[
            CursorSpec::new("auto", Mods::NONE),
            CursorSpec::new("afk", Mods::NONE),
        ],
        RatingTable::new(),
    );
    let mut cursors = vec![ReplayCursor::new(frames), ReplayCursor::new(Vec::new())];
    drive(&mut set, &mut cursors, 16);

    assert!(set.is_ended());
    assert_eq!(set.score_set(0).counts().n300, 5);
    assert_eq!(set.score_set(1).counts().n300, 0);
    assert_eq!(set.score_set(1).counts().miss, 5);
    assert_eq!(set.score_set(1).score(), 0);
    assert_eq!(set.score_set(1).grade(), Grade::D);

    let ranking = set.final_ranking();
    assert_eq!(ranking[0].name, "auto");
    assert_eq!(ranking[1].name, "afk");
}
