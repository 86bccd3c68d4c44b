use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::profile::BatterProfile;
use crate::zone::Zone;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
    #[serde(rename = "Very Low")]
    VeryLow,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Confidence::High => "High",
            Confidence::Medium => "Medium",
            Confidence::Low => "Low",
            Confidence::VeryLow => "Very Low",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneWeakness {
    /// Whiffs plus weak contact, as a percentage of pitches seen in the zone.
    pub weakness_score: f64,
    pub sample_size: u32,
    pub bad_outcomes: u32,
    pub confidence: Confidence,
    pub whiffs: u32,
    pub weak_contact: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedZone {
    pub zone: Zone,
    #[serde(flatten)]
    pub weakness: ZoneWeakness,
}

/// Pitches a zone must have seen before it is scored, for a 0..100 confidence threshold.
pub fn min_pitches_required(threshold: f64) -> u32 {
    if threshold >= 90.0 {
        15
    } else if threshold >= 75.0 {
        10
    } else if threshold >= 50.0 {
        7
    } else if threshold >= 25.0 {
        5
    } else {
        3
    }
}

/// How many ranked zones to surface; stricter thresholds show fewer.
pub fn zones_to_display(threshold: f64) -> usize {
    if threshold >= 75.0 {
        4
    } else if threshold >= 50.0 {
        8
    } else if threshold >= 25.0 {
        10
    } else {
        12
    }
}

pub fn confidence_label(pitches: u32, bad_outcomes: u32) -> Confidence {
    if pitches >= 15 && bad_outcomes >= 5 {
        Confidence::High
    } else if pitches >= 10 && bad_outcomes >= 3 {
        Confidence::Medium
    } else if pitches >= 5 {
        Confidence::Low
    } else {
        Confidence::VeryLow
    }
}

/// Score every zone that clears the sample gate for `threshold`.
pub fn score_zones(
    profile: &BatterProfile,
    threshold: f64,
) -> BTreeMap<Zone, ZoneWeakness> {
    let min_pitches = min_pitches_required(threshold);
    profile
        .zone_analysis
        .iter()
        .filter(|(_, zs)| zs.pitches > 0 && zs.pitches >= min_pitches)
        .map(|(zone, zs)| {
            let bad_outcomes = zs.whiffs + zs.weak_contact;
            (
                *zone,
                ZoneWeakness {
                    weakness_score: bad_outcomes as f64 / zs.pitches as f64 * 100.0,
                    sample_size: zs.pitches,
                    bad_outcomes,
                    confidence: confidence_label(zs.pitches, bad_outcomes),
                    whiffs: zs.whiffs,
                    weak_contact: zs.weak_contact,
                },
            )
        })
        .collect()
}

/// Scored zones sorted by descending weakness, trimmed to the display count,
/// with scores rounded to one decimal.
pub fn rank_weak_zones(profile: &BatterProfile, threshold: f64) -> Vec<RankedZone> {
    let mut ranked: Vec<RankedZone> = score_zones(profile, threshold)
        .into_iter()
        .map(|(zone, mut weakness)| {
            weakness.weakness_score = (weakness.weakness_score * 10.0).round() / 10.0;
            RankedZone { zone, weakness }
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.weakness
            .weakness_score
            .total_cmp(&a.weakness.weakness_score)
    });
    ranked.truncate(zones_to_display(threshold));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch::Handedness;
    use crate::profile::ZoneStats;

    fn profile_with(zones: &[(Zone, u32, u32, u32)]) -> BatterProfile {
        let mut profile = BatterProfile::new("A", "T", Handedness::Right);
        for (zone, pitches, whiffs, weak) in zones {
            profile.zone_analysis.insert(
                *zone,
                ZoneStats {
                    pitches: *pitches,
                    whiffs: *whiffs,
                    weak_contact: *weak,
                    ..ZoneStats::default()
                },
            );
        }
        profile
    }

    #[test]
    fn thresholds_are_monotonic() {
        let thresholds = [0.0, 10.0, 25.0, 40.0, 50.0, 60.0, 75.0, 80.0, 90.0, 100.0];
        for pair in thresholds.windows(2) {
            assert!(min_pitches_required(pair[0]) <= min_pitches_required(pair[1]));
            assert!(zones_to_display(pair[0]) >= zones_to_display(pair[1]));
        }
    }

    #[test]
    fn sample_gate_excludes_small_zones() {
        let profile = profile_with(&[(Zone::LowOut, 9, 4, 1), (Zone::HighIn, 10, 1, 0)]);
        let scored = score_zones(&profile, 75.0);
        assert_eq!(scored.len(), 1);
        let high_in = &scored[&Zone::HighIn];
        assert_eq!(high_in.bad_outcomes, 1);
        assert_eq!(high_in.weakness_score, 10.0);
        assert_eq!(high_in.confidence, Confidence::Low);
    }

    #[test]
    fn ranking_sorts_and_rounds() {
        let profile = profile_with(&[
            (Zone::LowOut, 15, 4, 1),
            (Zone::MidMid, 12, 1, 0),
            (Zone::HighIn, 3, 2, 0),
        ]);
        let ranked = rank_weak_zones(&profile, 0.0);
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].zone, Zone::HighIn);
        assert_eq!(ranked[0].weakness.weakness_score, 66.7);
        assert_eq!(ranked[0].weakness.confidence, Confidence::VeryLow);
        assert_eq!(ranked[1].zone, Zone::LowOut);
        assert_eq!(ranked[1].weakness.weakness_score, 33.3);
        assert_eq!(ranked[1].weakness.confidence, Confidence::High);
        assert_eq!(ranked[2].weakness.weakness_score, 8.3);
    }

    #[test]
    fn no_qualifying_zones_is_empty() {
        let profile = profile_with(&[(Zone::LowOut, 2, 2, 0)]);
        assert!(rank_weak_zones(&profile, 95.0).is_empty());
        assert!(score_zones(&BatterProfile::new("A", "T", Handedness::Left), 0.0).is_empty());
    }

    #[test]
    fn confidence_labels() {
        assert_eq!(confidence_label(15, 5), Confidence::High);
        assert_eq!(confidence_label(15, 4), Confidence::Medium);
        assert_eq!(confidence_label(10, 2), Confidence::Low);
        assert_eq!(confidence_label(4, 4), Confidence::VeryLow);
        assert_eq!(Confidence::VeryLow.to_string(), "Very Low");
    }
}
