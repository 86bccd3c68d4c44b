use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use batter_scout::aggregate::ProfileAggregator;
use batter_scout::identity::{IdentityResolver, PlayerRecord, TeamRecord};
use batter_scout::pitch::{PitchCall, PitchEvent, StrikeoutWalk};
use batter_scout::policy::ScoringPolicy;
use batter_scout::profile::TeamProfiles;
use batter_scout::weakness::rank_weak_zones;

const TEAMS: [&str; 4] = ["NYY", "BOS", "TB", "TOR"];
const CALLS: [&str; 7] = [
    "StrikeCalled",
    "BallCalled",
    "StrikeSwinging",
    "FoulBall",
    "InPlay",
    "BallCalled",
    "FoulBallNotFieldable",
];
const TYPES: [&str; 5] = ["Fastball", "Slider", "Changeup", "Curveball", "Sinker"];

fn resolver() -> IdentityResolver {
    let players = (0..40)
        .map(|i| PlayerRecord {
            id: format!("b-{i}"),
            name: Some(format!("Batter {i}")),
            first_name: None,
            last_name: None,
        })
        .chain((0..12).map(|i| PlayerRecord {
            id: format!("p-{i}"),
            name: Some(format!("Pitcher {i}")),
            first_name: None,
            last_name: None,
        }))
        .collect();
    let teams = TEAMS
        .iter()
        .map(|code| TeamRecord {
            code: (*code).to_string(),
            name: format!("Team {code}"),
        })
        .collect();
    IdentityResolver::from_catalogs(players, teams, Vec::new())
}

/// Deterministic pseudo-season: one event per index, spread over batters, innings and zones.
fn synthetic_season(n: usize) -> Vec<PitchEvent> {
    (0..n)
        .map(|i| {
            let batter = i % 40;
            let call = PitchCall::parse(CALLS[i % CALLS.len()]);
            let in_play = call.is_in_play();
            let last_of_pa = i % 5 == 4;
            PitchEvent {
                batter_id: Some(format!("b-{batter}")),
                pitcher_id: Some(format!("p-{}", i % 12)),
                batter_team: Some(TEAMS[batter % TEAMS.len()].to_string()),
                batter_side: Some(if batter % 3 == 0 { "Left" } else { "Right" }.to_string()),
                inning: (i / 200 % 9) as u32 + 1,
                pa_of_inning: (i / 5 % 6) as u32 + 1,
                balls: (i % 4) as u8,
                strikes: (i % 3) as u8,
                pitch_call: call,
                tagged_pitch_type: Some(TYPES[i % TYPES.len()].to_string()),
                rel_speed: Some(78.0 + (i % 20) as f64),
                exit_speed: in_play.then_some(55.0 + (i % 50) as f64),
                angle: in_play.then_some(-40.0 + (i % 80) as f64),
                distance: in_play.then_some(120.0 + (i % 280) as f64),
                play_result: last_of_pa.then(|| {
                    if i % 3 == 0 { "Out" } else { "Single" }.to_string()
                }),
                korbb: if last_of_pa && i % 7 == 0 {
                    StrikeoutWalk::Strikeout
                } else {
                    StrikeoutWalk::Undefined
                },
                plate_loc_side: Some(-1.5 + (i % 31) as f64 * 0.1),
                plate_loc_height: Some(1.0 + (i % 33) as f64 * 0.1),
                ..PitchEvent::default()
            }
        })
        .collect()
}

fn bench_aggregate(c: &mut Criterion) {
    let resolver = resolver();
    let policy = ScoringPolicy::default();
    let events = synthetic_season(50_000);
    let aggregator = ProfileAggregator::new(&resolver, &policy);

    c.bench_function("aggregate_50k_pitches", |b| {
        b.iter(|| {
            let profiles = aggregator.aggregate(black_box(&events), TeamProfiles::new(), 0.0);
            black_box(profiles.len())
        })
    });

    c.bench_function("aggregate_50k_pitches_min_velo", |b| {
        b.iter(|| {
            let profiles = aggregator.aggregate(black_box(&events), TeamProfiles::new(), 88.0);
            black_box(profiles.len())
        })
    });
}

fn bench_weak_zones(c: &mut Criterion) {
    let resolver = resolver();
    let policy = ScoringPolicy::default();
    let profiles = ProfileAggregator::new(&resolver, &policy).aggregate(
        &synthetic_season(20_000),
        TeamProfiles::new(),
        0.0,
    );

    c.bench_function("rank_weak_zones_all_batters", |b| {
        b.iter(|| {
            let mut total = 0usize;
            for batters in profiles.values() {
                for profile in batters {
                    total += rank_weak_zones(profile, black_box(50.0)).len();
                }
            }
            black_box(total)
        })
    });
}

criterion_group!(benches, bench_aggregate, bench_weak_zones);
criterion_main!(benches);
