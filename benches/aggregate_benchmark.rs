use chrono::{Duration, NaiveDate};
use criterion::{criterion_group, criterion_main, Criterion};
use serde_json::{json, Value};
use std::hint::black_box;
use workout_tracker::domain::{
    build_report, glucose_stats, normalize_reading, normalize_workout, visible_workouts,
    workout_stats, ViewFilter,
};
use workout_tracker::models::StoredRecord;

fn record(id: String, value: Value) -> StoredRecord {
    match value {
        Value::Object(map) => StoredRecord::new(id, map),
        _ => unreachable!(),
    }
}

/// A year of daily workouts and four readings a day, as stored.
fn synthetic_year(start: NaiveDate) -> (Vec<StoredRecord>, Vec<StoredRecord>) {
    let mut workouts = Vec::new();
    let mut readings = Vec::new();

    for day in 0..365 {
        let date = start + Duration::days(day);
        let name = ["Legs", "Arms", "Cardio"][day as usize % 3];
        workouts.push(record(
            format!("w{}", day),
            json!({
                "name": name,
                "date": date.format("%Y-%m-%d").to_string(),
                "completed": day % 4 != 0,
                "exercises": [
                    { "name": "Squats", "sets": 3, "reps": 12, "completed": true },
                    { "name": "Plank", "sets": "2", "reps": "45 sec", "completed": day % 2 == 0 },
                ],
                "bloodSugar": { "before": 100 + day % 60, "after": "95" },
            }),
        ));

        for hour in [7, 12, 18, 22] {
            readings.push(record(
                format!("r{}-{}", day, hour),
                json!({
                    "meter": 90 + (day + hour) % 80,
                    "cgm": 85 + (day * 3 + hour) % 90,
                    "recordedAt": format!("{}T{:02}:00:00Z", date.format("%Y-%m-%d"), hour),
                }),
            ));
        }
    }
    (workouts, readings)
}

fn benchmark_dashboard(c: &mut Criterion) {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let today = start + Duration::days(364);
    let (workout_docs, reading_docs) = synthetic_year(start);

    let workouts: Vec<_> = workout_docs.iter().map(normalize_workout).collect();
    let readings: Vec<_> = reading_docs.iter().map(normalize_reading).collect();

    let mut group = c.benchmark_group("dashboard_year");

    group.bench_function("normalize", |b| {
        b.iter(|| {
            let w: Vec<_> = black_box(&workout_docs).iter().map(normalize_workout).collect();
            let r: Vec<_> = black_box(&reading_docs).iter().map(normalize_reading).collect();
            (w, r)
        })
    });

    group.bench_function("stats", |b| {
        b.iter(|| {
            (
                workout_stats(black_box(&workouts), today),
                glucose_stats(black_box(&readings)),
            )
        })
    });

    group.bench_function("visible_completed", |b| {
        b.iter(|| visible_workouts(black_box(&workouts), ViewFilter::Completed, None, today))
    });

    group.bench_function("report", |b| {
        b.iter(|| build_report(black_box(&workouts), today))
    });

    group.finish();
}

criterion_group!(benches, benchmark_dashboard);
criterion_main!(benches);
