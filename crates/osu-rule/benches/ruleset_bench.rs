use cgmath::Vector2;
use criterion::{Criterion, criterion_group, criterion_main};
use osu_model::{Chart, Difficulty, Mods, Target};
use osu_rule::{CursorSpec, HealthProcessor, HitResult, InputSample, OsuRuleset, RatingTable};

fn dense_circle_chart(count: usize) -> Chart {
    let targets: Vec<Target> = (0..count)
        .map(|i| {
            Target::circle(
                i,
                1000 + i as i64 * 150,
                Vector2::new((i % 8) as f32 * 60.0, (i % 5) as f32 * 70.0),
            )
        })
        .collect();
    Chart::new(targets, Difficulty::new(5.0, 4.0, 8.0, 9.3))
}

fn bench_ruleset_new(c: &mut Criterion) {
    let chart = dense_circle_chart(1000);
    let cursors = vec![CursorSpec::new("bench", Mods::NONE)];

    c.bench_function("ruleset_new", |b| {
        b.iter(|| OsuRuleset::new(chart.clone(), &cursors, RatingTable::new()));
    });
}

fn bench_unplayed_simulation(c: &mut Criterion) {
    let chart = dense_circle_chart(1000);
    let cursors = vec![CursorSpec::new("bench", Mods::NONE)];

    c.bench_function("unplayed_simulation", |b| {
        b.iter(|| {
            let mut set = OsuRuleset::new(chart.clone(), &cursors, RatingTable::new());
            set.feed_input(0, InputSample::idle(Vector2::new(0.0, 0.0)));

            let end_time = chart.targets.last().unwrap().end_time + 1000;
            let mut time = 0i64;
            while time <= end_time && !set.is_ended() {
                set.step(time);
                time += 16;
            }
        });
    });
}

fn bench_perfect_tap_simulation(c: &mut Criterion) {
    let chart = dense_circle_chart(500);
    let cursors = vec![CursorSpec::new("bench", Mods::NONE)];

    c.bench_function("perfect_tap_simulation", |b| {
        b.iter(|| {
            let mut set = OsuRuleset::new(chart.clone(), &cursors, RatingTable::new());

            let end_time = chart.targets.last().unwrap().end_time + 1000;
            let mut next = 0usize;
            let mut time = 0i64;
            while time <= end_time && !set.is_ended() {
                while next < chart.targets.len() && chart.targets[next].start_time < time {
                    next += 1;
                }
                let (position, pressing) = match chart.targets.get(next) {
                    Some(t) if t.start_time - time < 16 => (t.start_position, true),
                    Some(t) => (t.start_position, false),
                    None => (Vector2::new(0.0, 0.0), false),
                };
                set.feed_input(0, InputSample::new(position, pressing, false));
                set.step(time);
                time += 16;
            }
        });
    });
}

fn bench_health_processor(c: &mut Criterion) {
    let chart = dense_circle_chart(1000);

    c.bench_function("health_processor_feed", |b| {
        b.iter(|| {
            let mut hp = HealthProcessor::new(&chart, &chart.difficulty);
            hp.calculate_rate(&chart);
            hp.reset();
            for i in 0..1000 {
                hp.update(1000 + i * 150);
                hp.add_result(HitResult::Hit300);
            }
        });
    });
}

criterion_group!(
    benches,
    bench_ruleset_new,
    bench_unplayed_simulation,
    bench_perfect_tap_simulation,
    bench_health_processor,
);
criterion_main!(benches);
