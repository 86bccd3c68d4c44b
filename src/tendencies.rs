use std::collections::HashMap;

use crate::pitch::Handedness;
use crate::policy::ScoringPolicy;
use crate::profile::{BatterProfile, OutSequence};

pub const INSUFFICIENT_DATA: &str = "Insufficient data";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreatAssessment {
    pub score: u32,
    pub label: String,
}

fn round_pct(num: usize, den: usize) -> u32 {
    if den == 0 {
        return 0;
    }
    (num as f64 / den as f64 * 100.0).round() as u32
}

fn threat_label(score: u32, high: u32, moderate: u32, reasons: &[String]) -> String {
    let level = if score >= high {
        "High"
    } else if score >= moderate {
        "Moderate"
    } else {
        return "Low".to_string();
    };
    if reasons.is_empty() {
        level.to_string()
    } else {
        format!("{level} ({})", reasons.join(", "))
    }
}

pub fn assess_steal_threat(profile: &BatterProfile, policy: &ScoringPolicy) -> ThreatAssessment {
    let p = &policy.steal;
    let mut score = 0u32;
    let mut reasons = Vec::new();

    let attempts = profile.stolen_bases + profile.caught_stealing;
    if attempts > 0 {
        score += p.points_per_attempt * attempts;
        let success = profile.stolen_bases as f64 / attempts as f64;
        if success >= p.success_rate {
            score += p.success_bonus;
        }
        reasons.push(format!(
            "{}/{} SB ({}%)",
            profile.stolen_bases,
            attempts,
            round_pct(profile.stolen_bases as usize, attempts as usize)
        ));
    }

    let at_bats = &profile.at_bats;
    if at_bats.len() >= p.infield_single_min_at_bats {
        let infield = at_bats
            .iter()
            .filter(|ab| {
                ab.exit_speed < p.infield_single_max_exit
                    && ab.distance.is_some_and(|d| d < p.infield_single_max_distance)
                    && ab.result == "Single"
            })
            .count();
        if infield > 0 {
            score += p.infield_single_points * infield as u32;
            reasons.push(format!("{infield} infield hits"));
        }
    }

    let grounder_hits = at_bats
        .iter()
        .filter(|ab| {
            ab.exit_speed < p.grounder_hit_max_exit
                && ab.angle < p.grounder_hit_max_angle
                && ab.result == "Single"
        })
        .count();
    if grounder_hits >= p.grounder_hit_min_count {
        score += p.grounder_hit_points;
        reasons.push("beats out grounders".to_string());
    }

    let explosive = at_bats
        .iter()
        .filter(|ab| ab.exit_speed >= p.explosive_min_exit && ab.angle < p.explosive_max_angle)
        .count();
    if explosive >= p.explosive_min_count {
        score += p.explosive_points;
        reasons.push("explosive speed".to_string());
    }

    if let Some(ppa) = profile.pitches_per_pa() {
        if ppa >= p.patience_pitches_per_pa && profile.stats.total_pitches >= p.patience_min_pitches
        {
            score += p.patience_points;
            reasons.push(format!("{ppa:.1} P/PA"));
        }
    }

    ThreatAssessment {
        score,
        label: threat_label(score, p.high_score, p.moderate_score, &reasons),
    }
}

pub fn assess_bunt_threat(profile: &BatterProfile, policy: &ScoringPolicy) -> ThreatAssessment {
    let p = &policy.bunt;
    let stats = &profile.stats;
    let mut score = 0u32;
    let mut reasons = Vec::new();

    if profile.bunts > 0 {
        score += p.points_per_bunt * profile.bunts;
        reasons.push(format!("{} bunts", profile.bunts));
    }

    if stats.swings > p.contact_min_swings {
        let rate = stats.contact as f64 / stats.swings as f64;
        if rate >= p.contact_rate {
            score += p.contact_points;
            reasons.push(format!(
                "{}% contact",
                round_pct(stats.contact as usize, stats.swings as usize)
            ));
        }
    }

    if stats.contact >= p.soft_contact_min_contact && stats.contact > 0 {
        let share = stats.weak_contact as f64 / stats.contact as f64;
        if share >= p.soft_contact_share {
            score += p.soft_contact_points;
            reasons.push(format!(
                "{}% weak contact",
                round_pct(stats.weak_contact as usize, stats.contact as usize)
            ));
        }
    }

    let at_bats = &profile.at_bats;
    if at_bats.len() >= p.ground_ball_min_at_bats {
        let grounders = at_bats
            .iter()
            .filter(|ab| ab.angle < p.ground_ball_max_angle)
            .count();
        if grounders as f64 / at_bats.len() as f64 >= p.ground_ball_rate {
            score += p.ground_ball_points;
            reasons.push(format!(
                "{}% ground balls",
                round_pct(grounders, at_bats.len())
            ));
        }
    }

    ThreatAssessment {
        score,
        label: threat_label(score, p.high_score, p.moderate_score, &reasons),
    }
}

/// Pull/opposite split from the recorded at-bat angles, relative to batter side.
pub fn spray_tendency(profile: &BatterProfile, policy: &ScoringPolicy) -> String {
    let p = &policy.spray;
    let total = profile.at_bats.len();
    if total < p.min_at_bats {
        return INSUFFICIENT_DATA.to_string();
    }
    let (pull, opposite) = profile.at_bats.iter().fold((0usize, 0usize), |(pull, opp), ab| {
        let pulled = match profile.handedness {
            Handedness::Right => ab.angle < -p.angle_threshold,
            Handedness::Left => ab.angle > p.angle_threshold,
        };
        let oppo = match profile.handedness {
            Handedness::Right => ab.angle > p.angle_threshold,
            Handedness::Left => ab.angle < -p.angle_threshold,
        };
        (pull + usize::from(pulled), opp + usize::from(oppo))
    });

    let pull_share = pull as f64 / total as f64;
    let opposite_share = opposite as f64 / total as f64;
    if pull_share > p.pull_share {
        format!("Pull hitter ({}%)", round_pct(pull, total))
    } else if opposite_share > p.opposite_share {
        format!("Opposite field ({}%)", round_pct(opposite, total))
    } else {
        format!(
            "All fields ({}% pull, {}% oppo)",
            round_pct(pull, total),
            round_pct(opposite, total)
        )
    }
}

/// `None` until the batter has seen at least one first pitch.
pub fn first_pitch_approach(profile: &BatterProfile, policy: &ScoringPolicy) -> Option<String> {
    let stats = &profile.stats;
    if stats.first_pitch_pitches == 0 {
        return None;
    }
    let rate = stats.first_pitch_swings as f64 / stats.first_pitch_pitches as f64;
    let label = if rate >= policy.first_pitch_aggressive_rate {
        "Aggressive"
    } else {
        "Patient"
    };
    Some(format!(
        "{label} ({}% first-pitch swings)",
        round_pct(
            stats.first_pitch_swings as usize,
            stats.first_pitch_pitches as usize
        )
    ))
}

fn spaced(seq: &str) -> String {
    seq.replace('→', " → ")
}

/// Summarize which pitch sequences most often end in an out.
pub fn analyze_out_sequences(sequences: &[OutSequence], policy: &ScoringPolicy) -> String {
    let p = &policy.sequences;
    let total = sequences.len();
    if total == 0 {
        return INSUFFICIENT_DATA.to_string();
    }

    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for seq in sequences {
        let key = seq.preferred();
        let entry = counts.entry(key).or_insert_with(|| {
            order.push(key);
            0
        });
        *entry += 1;
    }

    let share = |count: usize| count as f64 / total as f64;
    let mut significant: Vec<(&str, usize)> = order
        .iter()
        .map(|key| (*key, counts[key]))
        .filter(|(_, count)| *count >= p.significant_count || share(*count) >= p.significant_share)
        .collect();
    significant.sort_by(|a, b| b.1.cmp(&a.1));

    if let Some((top, count)) = significant.first() {
        let mut out = format!(
            "{} ({}/{} = {}%)",
            spaced(top),
            count,
            total,
            round_pct(*count, total)
        );
        if let Some((second, count)) = significant.get(1) {
            if *count >= p.secondary_min_count && share(*count) >= p.secondary_share {
                out.push_str(&format!(
                    "; also {} ({}/{} = {}%)",
                    spaced(second),
                    count,
                    total,
                    round_pct(*count, total)
                ));
            }
        }
        return out;
    }

    let mut final_order: Vec<&str> = Vec::new();
    let mut finals: HashMap<&str, usize> = HashMap::new();
    for seq in sequences {
        let pitch = seq.final_pitch();
        let entry = finals.entry(pitch).or_insert_with(|| {
            final_order.push(pitch);
            0
        });
        *entry += 1;
    }
    let mut best: Option<(&str, usize)> = None;
    for pitch in final_order {
        let count = finals[pitch];
        if best.is_none_or(|(_, c)| count > c) {
            best = Some((pitch, count));
        }
    }
    match best {
        Some((pitch, count)) => format!("{pitch} gets outs ({count}/{total})"),
        None => INSUFFICIENT_DATA.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::AtBat;

    fn seq(two: &str, three: &str, pa_pitches: usize) -> OutSequence {
        OutSequence {
            sequence3: three.to_string(),
            sequence2: two.to_string(),
            out_type: "Out".to_string(),
            pa_pitches,
        }
    }

    fn at_bat(angle: f64, exit_speed: f64, distance: f64, result: &str) -> AtBat {
        AtBat {
            angle,
            distance: Some(distance),
            exit_speed,
            result: result.to_string(),
        }
    }

    #[test]
    fn steal_threat_reports_attempts() {
        let mut profile = BatterProfile::new("A", "T", Handedness::Right);
        profile.stolen_bases = 4;
        profile.caught_stealing = 1;
        profile.at_bats = vec![
            at_bat(30.0, 100.0, 380.0, "HomeRun"),
            at_bat(20.0, 92.0, 250.0, "Out"),
        ];
        let threat = assess_steal_threat(&profile, &ScoringPolicy::default());
        assert!(threat.score >= 7);
        assert_eq!(threat.label, "High (4/5 SB (80%))");
    }

    #[test]
    fn steal_threat_low_is_bare() {
        let profile = BatterProfile::new("A", "T", Handedness::Right);
        let threat = assess_steal_threat(&profile, &ScoringPolicy::default());
        assert_eq!(threat.score, 0);
        assert_eq!(threat.label, "Low");
    }

    #[test]
    fn steal_threat_reasons_follow_evaluation_order() {
        let mut profile = BatterProfile::new("A", "T", Handedness::Right);
        profile.at_bats = vec![
            at_bat(5.0, 70.0, 60.0, "Single"),
            at_bat(8.0, 80.0, 90.0, "Single"),
            at_bat(25.0, 88.0, 300.0, "Out"),
        ];
        let threat = assess_steal_threat(&profile, &ScoringPolicy::default());
        // 2 infield singles (+4) and two slow grounder hits (+1)
        assert_eq!(threat.score, 5);
        assert_eq!(threat.label, "High (2 infield hits, beats out grounders)");
    }

    #[test]
    fn bunt_threat_counts_bunts_and_contact() {
        let mut profile = BatterProfile::new("A", "T", Handedness::Left);
        profile.bunts = 1;
        profile.stats.swings = 12;
        profile.stats.contact = 10;
        profile.stats.weak_contact = 3;
        let threat = assess_bunt_threat(&profile, &ScoringPolicy::default());
        assert_eq!(threat.score, 3 + 2 + 1);
        assert_eq!(threat.label, "High (1 bunts, 83% contact, 30% weak contact)");
    }

    #[test]
    fn bunt_threat_moderate_from_bunt_alone() {
        let mut profile = BatterProfile::new("A", "T", Handedness::Left);
        profile.bunts = 1;
        let threat = assess_bunt_threat(&profile, &ScoringPolicy::default());
        assert_eq!(threat.label, "Moderate (1 bunts)");
    }

    #[test]
    fn spray_is_handedness_relative() {
        let mut profile = BatterProfile::new("A", "T", Handedness::Right);
        profile.at_bats = (0..5).map(|_| at_bat(-25.0, 90.0, 200.0, "Out")).collect();
        assert_eq!(
            spray_tendency(&profile, &ScoringPolicy::default()),
            "Pull hitter (100%)"
        );
        profile.handedness = Handedness::Left;
        assert_eq!(
            spray_tendency(&profile, &ScoringPolicy::default()),
            "Opposite field (100%)"
        );
        profile.at_bats.truncate(4);
        assert_eq!(
            spray_tendency(&profile, &ScoringPolicy::default()),
            INSUFFICIENT_DATA
        );
    }

    #[test]
    fn spray_all_fields_shows_both_shares() {
        let mut profile = BatterProfile::new("A", "T", Handedness::Right);
        profile.at_bats = vec![
            at_bat(-20.0, 90.0, 200.0, "Out"),
            at_bat(20.0, 90.0, 200.0, "Out"),
            at_bat(0.0, 90.0, 200.0, "Out"),
            at_bat(0.0, 90.0, 200.0, "Out"),
            at_bat(-30.0, 90.0, 200.0, "Out"),
        ];
        assert_eq!(
            spray_tendency(&profile, &ScoringPolicy::default()),
            "All fields (40% pull, 20% oppo)"
        );
    }

    #[test]
    fn out_sequences_top_without_secondary() {
        let seqs = vec![
            seq("FB→SL", "FB→SL", 2),
            seq("FB→SL", "FB→SL", 2),
            seq("CB→CH", "CB→CH", 2),
        ];
        assert_eq!(
            analyze_out_sequences(&seqs, &ScoringPolicy::default()),
            "FB → SL (2/3 = 67%)"
        );
    }

    #[test]
    fn out_sequences_secondary_clause() {
        let seqs = vec![
            seq("FB→SL", "FB→SL", 2),
            seq("FB→SL", "FB→SL", 2),
            seq("FB→SL", "FB→SL", 2),
            seq("SL→CH", "CB→SL→CH", 3),
            seq("SL→CH", "CB→SL→CH", 3),
        ];
        assert_eq!(
            analyze_out_sequences(&seqs, &ScoringPolicy::default()),
            "FB → SL (3/5 = 60%); also CB → SL → CH (2/5 = 40%)"
        );
    }

    #[test]
    fn out_sequences_fall_back_to_final_pitch() {
        let seqs = vec![
            seq("FB→SL", "FB→SL", 2),
            seq("CB→SL", "CB→SL", 2),
            seq("FB→CH", "FB→CH", 2),
            seq("CH→FB", "CH→FB", 2),
        ];
        assert_eq!(
            analyze_out_sequences(&seqs, &ScoringPolicy::default()),
            "SL gets outs (2/4)"
        );
        assert_eq!(
            analyze_out_sequences(&[], &ScoringPolicy::default()),
            INSUFFICIENT_DATA
        );
    }

    #[test]
    fn first_pitch_needs_a_sample() {
        let mut profile = BatterProfile::new("A", "T", Handedness::Right);
        assert!(first_pitch_approach(&profile, &ScoringPolicy::default()).is_none());
        profile.stats.first_pitch_pitches = 4;
        profile.stats.first_pitch_swings = 1;
        assert_eq!(
            first_pitch_approach(&profile, &ScoringPolicy::default()).as_deref(),
            Some("Patient (25% first-pitch swings)")
        );
    }
}
