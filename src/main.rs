use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use batter_scout::aggregate::ProfileAggregator;
use batter_scout::config::ScoutConfig;
use batter_scout::contact::{CompleteSummary, complete_summary};
use batter_scout::day_cache::DayCache;
use batter_scout::fetch::DateRangeFetcher;
use batter_scout::identity::IdentityResolver;
use batter_scout::pitch::PitchEvent;
use batter_scout::profile::{BatterProfile, RateSummary, TeamProfiles, profile_key};
use batter_scout::upstream::HttpUpstream;
use batter_scout::weakness::{RankedZone, rank_weak_zones};

const DEFAULT_CONFIDENCE: f64 = 50.0;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BatterReport<'a> {
    profile: &'a BatterProfile,
    rates: RateSummary,
    weak_zones: Vec<RankedZone>,
    /// Contact breakdown over this run's pitches only; seeded totals are not replayed.
    pitch_summary: CompleteSummary,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScoutReport<'a> {
    start: NaiveDate,
    end: NaiveDate,
    min_velocity: f64,
    confidence: f64,
    failed_days: Vec<NaiveDate>,
    teams: BTreeMap<&'a str, Vec<BatterReport<'a>>>,
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    init_logging();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let config = ScoutConfig::from_env();
    let known_days = config.load_known_days()?;
    let policy = config.load_scoring_policy()?;

    // Without explicit dates the whole allowlisted window is used.
    let start = match arg_value(&args, "--start") {
        Some(raw) => parse_date(&raw)?,
        None => known_days
            .first()
            .ok_or_else(|| anyhow!("--start not given and no known-data days configured"))?,
    };
    let end = match arg_value(&args, "--end") {
        Some(raw) => parse_date(&raw)?,
        None => known_days.last().unwrap_or(start),
    };
    let min_velocity = parse_number_arg(&args, "--min-velo")?.unwrap_or(0.0);
    let confidence = parse_number_arg(&args, "--confidence")?.unwrap_or(DEFAULT_CONFIDENCE);
    let team_filter = arg_value(&args, "--team");
    let batter_filter = arg_value(&args, "--batter");
    let seed = match arg_value(&args, "--seed") {
        Some(path) => load_seed(Path::new(&path))?,
        None => TeamProfiles::new(),
    };

    let upstream = Arc::new(HttpUpstream::new(
        config.require_base_url()?,
        config.api_key.clone(),
        config.request_timeout,
    )?);
    let resolver = IdentityResolver::populate(upstream.as_ref());
    let fetcher = DateRangeFetcher::new(
        upstream,
        known_days,
        DayCache::new(config.cache.clone()),
        config.batch_size,
        config.fetch_parallelism,
    );

    let fetched = fetcher.fetch_with_report(start, end);
    let aggregator = ProfileAggregator::new(&resolver, &policy);
    let (profiles, summary) =
        aggregator.aggregate_with_summary(&fetched.events, seed, min_velocity);
    let pitches_by_profile = aggregator.pitches_by_profile(&fetched.events, min_velocity);
    info!(
        events = summary.events_seen,
        filtered = summary.below_min_velocity,
        dropped = summary.unresolved_identity,
        profiles = summary.profiles,
        "profiles built"
    );

    // Raw profiles can be fed back in later through --seed.
    if let Some(path) = arg_value(&args, "--profiles-out") {
        let raw = serde_json::to_string(&profiles).context("serialize profiles")?;
        fs::write(&path, raw).with_context(|| format!("write profiles {path}"))?;
    }

    let mut teams: BTreeMap<&str, Vec<BatterReport>> = BTreeMap::new();
    for (team, batters) in &profiles {
        if team_filter
            .as_deref()
            .is_some_and(|t| !team.eq_ignore_ascii_case(t))
        {
            continue;
        }
        let rows = batters
            .iter()
            .filter(|p| {
                batter_filter
                    .as_deref()
                    .is_none_or(|b| p.name.to_lowercase().contains(&b.to_lowercase()))
            })
            .map(|profile| {
                let pitches: &[&PitchEvent] = pitches_by_profile
                    .get(&profile_key(team, &profile.name))
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);
                BatterReport {
                    profile,
                    rates: profile.stats.rates(),
                    weak_zones: rank_weak_zones(profile, confidence),
                    pitch_summary: complete_summary(pitches, &policy.contact),
                }
            })
            .collect::<Vec<_>>();
        if !rows.is_empty() {
            teams.insert(team.as_str(), rows);
        }
    }

    let report = ScoutReport {
        start,
        end,
        min_velocity,
        confidence,
        failed_days: fetched.failed_days,
        teams,
    };
    let json = serde_json::to_string_pretty(&report).context("serialize report")?;
    println!("{json}");
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,batter_scout=debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}

fn arg_value(args: &[String], name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&prefix) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").with_context(|| format!("invalid date '{raw}'"))
}

fn parse_number_arg(args: &[String], name: &str) -> Result<Option<f64>> {
    arg_value(args, name)
        .map(|raw| {
            raw.parse::<f64>()
                .with_context(|| format!("invalid {name} value '{raw}'"))
        })
        .transpose()
}

fn load_seed(path: &Path) -> Result<TeamProfiles> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("read seed {}", path.display()))?;
    serde_json::from_str(&raw).context("invalid seed profiles json")
}
