//! Contact / non-contact breakdowns over a raw pitch list.
//!
//! Independent of the profile fold: these work on any slice of events, owned or
//! borrowed, so the report layer can summarize a single batter or a whole range.

use std::borrow::Borrow;
use std::collections::HashMap;

use serde::Serialize;

use crate::pitch::{PitchCall, PitchEvent};
use crate::policy::ContactPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Foul,
    InPlay,
    Whiff,
    CalledStrike,
    Ball,
    HitByPitch,
    Undefined,
    Unknown,
}

impl EventCategory {
    pub fn of(call: &PitchCall) -> Self {
        match call {
            PitchCall::FoulBall
            | PitchCall::FoulBallFieldable
            | PitchCall::FoulBallNotFieldable => EventCategory::Foul,
            PitchCall::InPlay => EventCategory::InPlay,
            PitchCall::StrikeSwinging => EventCategory::Whiff,
            PitchCall::StrikeCalled => EventCategory::CalledStrike,
            PitchCall::BallCalled => EventCategory::Ball,
            PitchCall::HitByPitch => EventCategory::HitByPitch,
            PitchCall::Undefined => EventCategory::Undefined,
            PitchCall::Missing | PitchCall::Other(_) => EventCategory::Unknown,
        }
    }

    pub fn is_contact(self) -> bool {
        matches!(self, EventCategory::Foul | EventCategory::InPlay)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Categorized<'a> {
    pub by_category: HashMap<EventCategory, Vec<&'a PitchEvent>>,
    pub contact: Vec<&'a PitchEvent>,
    pub non_contact: Vec<&'a PitchEvent>,
    pub unknown: Vec<&'a PitchEvent>,
}

impl<'a> Categorized<'a> {
    pub fn count(&self, category: EventCategory) -> usize {
        self.by_category.get(&category).map_or(0, Vec::len)
    }
}

pub fn categorize<P: Borrow<PitchEvent>>(pitches: &[P]) -> Categorized<'_> {
    let mut out = Categorized::default();
    for pitch in pitches {
        let pitch = pitch.borrow();
        let category = EventCategory::of(&pitch.pitch_call);
        out.by_category.entry(category).or_default().push(pitch);
        if category == EventCategory::Unknown {
            out.unknown.push(pitch);
        } else if category.is_contact() {
            out.contact.push(pitch);
        } else {
            out.non_contact.push(pitch);
        }
    }
    out
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ExitSpeedPercentiles {
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSummary {
    pub total_contacts: usize,
    pub fouls: usize,
    pub in_play: usize,
    pub weak_contact: usize,
    pub hard_contact: usize,
    pub contact_rate: f64,
    pub foul_rate: f64,
    pub in_play_rate: f64,
    pub avg_exit_velo: f64,
    pub max_exit_velo: f64,
    pub exit_velo_percentiles: Option<ExitSpeedPercentiles>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NonContactSummary {
    pub total_non_contacts: usize,
    pub whiffs: usize,
    pub called_strikes: usize,
    pub balls: usize,
    pub hit_by_pitch: usize,
    pub undefined: usize,
    pub whiff_rate: f64,
    pub called_strike_rate: f64,
    pub ball_rate: f64,
    pub hit_by_pitch_rate: f64,
    pub swings: usize,
    pub swing_rate: f64,
    pub whiff_per_swing: f64,
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Percentage rounded to 0.1, or 0 on an empty denominator.
fn rate(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        round1(num as f64 / den as f64 * 100.0)
    }
}

/// Linear-interpolated quantile of sorted values, `q` in 0..=1.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            let frac = pos - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}

pub fn contact_summary<P: Borrow<PitchEvent>>(
    pitches: &[P],
    thresholds: &ContactPolicy,
) -> ContactSummary {
    let categorized = categorize(pitches);
    if categorized.contact.is_empty() {
        return ContactSummary::default();
    }

    let in_play = categorized
        .by_category
        .get(&EventCategory::InPlay)
        .map(Vec::as_slice)
        .unwrap_or_default();
    let mut exit_speeds: Vec<f64> = in_play
        .iter()
        .filter_map(|p| p.exit_speed)
        .filter(|s| *s != 0.0)
        .collect();
    exit_speeds.sort_by(f64::total_cmp);

    let total = pitches.len();
    let fouls = categorized.count(EventCategory::Foul);
    let (avg, max, percentiles) = if exit_speeds.is_empty() {
        (0.0, 0.0, None)
    } else {
        let sum: f64 = exit_speeds.iter().sum();
        (
            round1(sum / exit_speeds.len() as f64),
            exit_speeds[exit_speeds.len() - 1],
            Some(ExitSpeedPercentiles {
                p25: round1(quantile(&exit_speeds, 0.25)),
                p50: round1(quantile(&exit_speeds, 0.50)),
                p75: round1(quantile(&exit_speeds, 0.75)),
            }),
        )
    };

    ContactSummary {
        total_contacts: categorized.contact.len(),
        fouls,
        in_play: in_play.len(),
        weak_contact: exit_speeds
            .iter()
            .filter(|s| **s < thresholds.weak_exit_speed)
            .count(),
        hard_contact: exit_speeds
            .iter()
            .filter(|s| **s >= thresholds.hard_exit_speed)
            .count(),
        contact_rate: rate(categorized.contact.len(), total),
        foul_rate: rate(fouls, total),
        in_play_rate: rate(in_play.len(), total),
        avg_exit_velo: avg,
        max_exit_velo: max,
        exit_velo_percentiles: percentiles,
    }
}

pub fn non_contact_summary<P: Borrow<PitchEvent>>(pitches: &[P]) -> NonContactSummary {
    let categorized = categorize(pitches);
    let total = pitches.len();
    let whiffs = categorized.count(EventCategory::Whiff);
    let called = categorized.count(EventCategory::CalledStrike);
    let balls = categorized.count(EventCategory::Ball);
    let hbp = categorized.count(EventCategory::HitByPitch);
    let swings = whiffs + categorized.contact.len();

    NonContactSummary {
        total_non_contacts: categorized.non_contact.len(),
        whiffs,
        called_strikes: called,
        balls,
        hit_by_pitch: hbp,
        undefined: categorized.count(EventCategory::Undefined),
        whiff_rate: rate(whiffs, total),
        called_strike_rate: rate(called, total),
        ball_rate: rate(balls, total),
        hit_by_pitch_rate: rate(hbp, total),
        swings,
        swing_rate: rate(swings, total),
        whiff_per_swing: rate(whiffs, swings),
    }
}

fn group_plate_appearances<P: Borrow<PitchEvent>>(
    pitches: &[P],
) -> HashMap<(u32, u32), Vec<&PitchEvent>> {
    let mut groups: HashMap<(u32, u32), Vec<&PitchEvent>> = HashMap::new();
    for pitch in pitches {
        let pitch = pitch.borrow();
        groups
            .entry((pitch.inning, pitch.pa_of_inning))
            .or_default()
            .push(pitch);
    }
    groups
}

/// Plate appearances (by inning and PA-of-inning) with at least one foul or ball in play.
pub fn contact_plate_appearances<P: Borrow<PitchEvent>>(pitches: &[P]) -> usize {
    group_plate_appearances(pitches)
        .values()
        .filter(|pa| pa.iter().any(|p| p.pitch_call.is_contact()))
        .count()
}

pub fn non_contact_plate_appearances<P: Borrow<PitchEvent>>(pitches: &[P]) -> usize {
    group_plate_appearances(pitches)
        .values()
        .filter(|pa| !pa.iter().any(|p| p.pitch_call.is_contact()))
        .count()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PitchTotals {
    pub pitches_analyzed: usize,
    pub contact_plate_appearances: usize,
    pub non_contact_plate_appearances: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteSummary {
    pub contact: ContactSummary,
    pub non_contact: NonContactSummary,
    pub totals: PitchTotals,
}

/// Contact and non-contact breakdowns plus PA totals over one set of pitches.
pub fn complete_summary<P: Borrow<PitchEvent>>(
    pitches: &[P],
    thresholds: &ContactPolicy,
) -> CompleteSummary {
    CompleteSummary {
        contact: contact_summary(pitches, thresholds),
        non_contact: non_contact_summary(pitches),
        totals: PitchTotals {
            pitches_analyzed: pitches.len(),
            contact_plate_appearances: contact_plate_appearances(pitches),
            non_contact_plate_appearances: non_contact_plate_appearances(pitches),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pitch(call: PitchCall, inning: u32, pa: u32, exit_speed: Option<f64>) -> PitchEvent {
        PitchEvent {
            pitch_call: call,
            inning,
            pa_of_inning: pa,
            exit_speed,
            ..Default::default()
        }
    }

    fn sample() -> Vec<PitchEvent> {
        vec![
            pitch(PitchCall::StrikeCalled, 1, 1, None),
            pitch(PitchCall::FoulBall, 1, 1, None),
            pitch(PitchCall::InPlay, 1, 1, Some(101.0)),
            pitch(PitchCall::StrikeSwinging, 2, 1, None),
            pitch(PitchCall::BallCalled, 2, 1, None),
            pitch(PitchCall::InPlay, 2, 1, Some(62.0)),
            pitch(PitchCall::HitByPitch, 3, 1, None),
            pitch(PitchCall::Other("Weird".into()), 3, 2, None),
        ]
    }

    #[test]
    fn categorize_splits_contact() {
        let pitches = sample();
        let c = categorize(&pitches);
        assert_eq!(c.contact.len(), 3);
        assert_eq!(c.non_contact.len(), 4);
        assert_eq!(c.unknown.len(), 1);
        assert_eq!(c.count(EventCategory::InPlay), 2);
    }

    #[test]
    fn contact_summary_rates_and_exit_speeds() {
        let s = contact_summary(&sample(), &ContactPolicy::default());
        assert_eq!(s.total_contacts, 3);
        assert_eq!(s.fouls, 1);
        assert_eq!(s.in_play, 2);
        assert_eq!(s.weak_contact, 1);
        assert_eq!(s.hard_contact, 1);
        assert_eq!(s.contact_rate, 37.5);
        assert_eq!(s.avg_exit_velo, 81.5);
        assert_eq!(s.max_exit_velo, 101.0);
        let p = s.exit_velo_percentiles.expect("percentiles");
        assert_eq!(p.p50, 81.5);
        assert_eq!(p.p25, 71.8);
    }

    #[test]
    fn contact_summary_empty_is_zeroed() {
        let pitches = vec![pitch(PitchCall::BallCalled, 1, 1, None)];
        assert_eq!(
            contact_summary(&pitches, &ContactPolicy::default()),
            ContactSummary::default()
        );
    }

    #[test]
    fn non_contact_summary_counts_swings() {
        let s = non_contact_summary(&sample());
        assert_eq!(s.whiffs, 1);
        assert_eq!(s.called_strikes, 1);
        assert_eq!(s.balls, 1);
        assert_eq!(s.hit_by_pitch, 1);
        assert_eq!(s.swings, 4);
        assert_eq!(s.swing_rate, 50.0);
        assert_eq!(s.whiff_per_swing, 25.0);
        assert_eq!(non_contact_summary::<PitchEvent>(&[]).swing_rate, 0.0);
    }

    #[test]
    fn plate_appearance_contact_counts() {
        let pitches = sample();
        assert_eq!(contact_plate_appearances(&pitches), 2);
        assert_eq!(non_contact_plate_appearances(&pitches), 2);
    }

    #[test]
    fn absent_calls_are_unknown() {
        let pitches = vec![
            pitch(PitchCall::Missing, 1, 1, None),
            pitch(PitchCall::Undefined, 1, 1, None),
        ];
        let c = categorize(&pitches);
        assert_eq!(c.count(EventCategory::Unknown), 1);
        assert_eq!(c.count(EventCategory::Undefined), 1);
        assert_eq!(non_contact_summary(&pitches).undefined, 1);
    }

    #[test]
    fn complete_summary_over_borrowed_pitches() {
        let pitches = sample();
        let borrowed: Vec<&PitchEvent> = pitches.iter().collect();
        let summary = complete_summary(&borrowed, &ContactPolicy::default());
        assert_eq!(summary, complete_summary(&pitches, &ContactPolicy::default()));
        assert_eq!(summary.totals.pitches_analyzed, 8);
        assert_eq!(summary.totals.contact_plate_appearances, 2);
        assert_eq!(summary.totals.non_contact_plate_appearances, 2);
        assert_eq!(summary.contact.in_play, 2);
        assert_eq!(summary.non_contact.whiffs, 1);
    }
}
