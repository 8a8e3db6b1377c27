//! Benchmarks for station lookup and arrival matching.
//!
//! The full rail directory has under a hundred stations and a busy station
//! reports a few dozen trains, so these run at roughly that scale.

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use metro_core::types::{ArrivalEstimate, Prediction, Station};
use metro_skill::matcher::{find_stations, soonest_arrival};

const LINES: [&str; 6] = ["RD", "OR", "BL", "SV", "GR", "YL"];
const DESTINATIONS: [&str; 6] = [
    "Glenmont",
    "Shady Grove",
    "Vienna",
    "New Carrollton",
    "Largo",
    "Ashburn",
];

fn directory(size: usize) -> Vec<Station> {
    (0..size)
        .map(|i| Station {
            code: format!("X{:02}", i),
            name: format!("Station Number {}", i),
        })
        .collect()
}

fn board(size: usize) -> Vec<Prediction> {
    (0..size)
        .map(|i| Prediction {
            line: LINES[i % LINES.len()].to_string(),
            destination_name: DESTINATIONS[(i / 2) % DESTINATIONS.len()].to_string(),
            minutes_until_arrival: match i % 10 {
                0 => None,
                1 => Some(ArrivalEstimate::Arriving),
                _ => Some(ArrivalEstimate::Minutes((i % 20) as u32)),
            },
        })
        .collect()
}

fn bench_find_stations(c: &mut Criterion) {
    let stations = directory(98);

    let mut group = c.benchmark_group("find_stations");
    group.measurement_time(Duration::from_secs(5));

    group.bench_function("full_directory", |b| {
        b.iter(|| find_stations(black_box(&stations), black_box("station number 97")))
    });

    group.bench_function("not_found", |b| {
        b.iter(|| find_stations(black_box(&stations), black_box("atlantis")))
    });

    group.finish();
}

fn bench_soonest_arrival(c: &mut Criterion) {
    let trains = board(48);

    let mut group = c.benchmark_group("soonest_arrival");
    group.measurement_time(Duration::from_secs(5));

    group.bench_function("busy_station", |b| {
        b.iter(|| soonest_arrival(black_box(&trains), black_box("RD"), black_box("glenmont")))
    });

    group.bench_function("no_match", |b| {
        b.iter(|| soonest_arrival(black_box(&trains), black_box("PK"), black_box("glenmont")))
    });

    group.finish();
}

criterion_group!(benches, bench_find_stations, bench_soonest_arrival);
criterion_main!(benches);
