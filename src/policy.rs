use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

pub const POLICY_VERSION: u32 = 1;

/// Every tunable threshold used by the aggregator and the zone scorer.
///
/// Loaded from JSON when `SCORING_POLICY_PATH` is set; missing fields fall back
/// to the defaults below so a policy file only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    pub version: u32,
    pub contact: ContactPolicy,
    pub zones: ZonePolicy,
    pub steal: StealPolicy,
    pub bunt: BuntPolicy,
    pub spray: SprayPolicy,
    pub sequences: SequencePolicy,
    /// First-pitch swing rate (0..1) at or above which a batter is "Aggressive".
    pub first_pitch_aggressive_rate: f64,
    pub markers: MarkerPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactPolicy {
    pub hard_exit_speed: f64,
    pub weak_exit_speed: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZonePolicy {
    pub inside_edge: f64,
    pub high_above: f64,
    pub low_below: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StealPolicy {
    pub points_per_attempt: u32,
    pub success_bonus: u32,
    pub success_rate: f64,
    pub infield_single_points: u32,
    pub infield_single_max_exit: f64,
    pub infield_single_max_distance: f64,
    pub infield_single_min_at_bats: usize,
    pub grounder_hit_points: u32,
    pub grounder_hit_max_exit: f64,
    pub grounder_hit_max_angle: f64,
    pub grounder_hit_min_count: usize,
    pub explosive_points: u32,
    pub explosive_min_exit: f64,
    pub explosive_max_angle: f64,
    pub explosive_min_count: usize,
    pub patience_points: u32,
    pub patience_pitches_per_pa: f64,
    pub patience_min_pitches: u32,
    pub high_score: u32,
    pub moderate_score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuntPolicy {
    pub points_per_bunt: u32,
    pub contact_points: u32,
    pub contact_min_swings: u32,
    pub contact_rate: f64,
    pub soft_contact_points: u32,
    pub soft_contact_min_contact: u32,
    pub soft_contact_share: f64,
    pub ground_ball_points: u32,
    pub ground_ball_min_at_bats: usize,
    pub ground_ball_max_angle: f64,
    pub ground_ball_rate: f64,
    pub high_score: u32,
    pub moderate_score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SprayPolicy {
    pub min_at_bats: usize,
    pub angle_threshold: f64,
    pub pull_share: f64,
    pub opposite_share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequencePolicy {
    pub significant_count: usize,
    pub significant_share: f64,
    pub secondary_min_count: usize,
    pub secondary_share: f64,
}

/// Plot window for pitch markers, in feet, mapped onto 0..100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerPolicy {
    pub cap: usize,
    pub side_min: f64,
    pub side_max: f64,
    pub height_min: f64,
    pub height_max: f64,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            version: POLICY_VERSION,
            contact: ContactPolicy::default(),
            zones: ZonePolicy::default(),
            steal: StealPolicy::default(),
            bunt: BuntPolicy::default(),
            spray: SprayPolicy::default(),
            sequences: SequencePolicy::default(),
            first_pitch_aggressive_rate: 0.5,
            markers: MarkerPolicy::default(),
        }
    }
}

impl Default for ContactPolicy {
    fn default() -> Self {
        Self {
            hard_exit_speed: 95.0,
            weak_exit_speed: 70.0,
        }
    }
}

impl Default for ZonePolicy {
    fn default() -> Self {
        Self {
            inside_edge: 0.33,
            high_above: 3.0,
            low_below: 2.0,
        }
    }
}

impl Default for StealPolicy {
    fn default() -> Self {
        Self {
            points_per_attempt: 2,
            success_bonus: 3,
            success_rate: 0.75,
            infield_single_points: 2,
            infield_single_max_exit: 85.0,
            infield_single_max_distance: 150.0,
            infield_single_min_at_bats: 3,
            grounder_hit_points: 1,
            grounder_hit_max_exit: 90.0,
            grounder_hit_max_angle: 15.0,
            grounder_hit_min_count: 2,
            explosive_points: 2,
            explosive_min_exit: 95.0,
            explosive_max_angle: 10.0,
            explosive_min_count: 2,
            patience_points: 1,
            patience_pitches_per_pa: 4.0,
            patience_min_pitches: 15,
            high_score: 4,
            moderate_score: 2,
        }
    }
}

impl Default for BuntPolicy {
    fn default() -> Self {
        Self {
            points_per_bunt: 3,
            contact_points: 2,
            contact_min_swings: 10,
            contact_rate: 0.80,
            soft_contact_points: 1,
            soft_contact_min_contact: 10,
            soft_contact_share: 0.25,
            ground_ball_points: 1,
            ground_ball_min_at_bats: 5,
            ground_ball_max_angle: 15.0,
            ground_ball_rate: 0.60,
            high_score: 6,
            moderate_score: 3,
        }
    }
}

impl Default for SprayPolicy {
    fn default() -> Self {
        Self {
            min_at_bats: 5,
            angle_threshold: 15.0,
            pull_share: 0.60,
            opposite_share: 0.40,
        }
    }
}

impl Default for SequencePolicy {
    fn default() -> Self {
        Self {
            significant_count: 2,
            significant_share: 0.30,
            secondary_min_count: 2,
            secondary_share: 0.25,
        }
    }
}

impl Default for MarkerPolicy {
    fn default() -> Self {
        Self {
            cap: 200,
            side_min: -2.0,
            side_max: 2.0,
            height_min: 0.5,
            height_max: 4.5,
        }
    }
}

impl ScoringPolicy {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read scoring policy {}", path.display()))?;
        let policy: ScoringPolicy =
            serde_json::from_str(&raw).context("invalid scoring policy json")?;
        if policy.version != POLICY_VERSION {
            return Err(anyhow!(
                "scoring policy version {} is not supported (expected {POLICY_VERSION})",
                policy.version
            ));
        }
        Ok(policy)
    }
}
