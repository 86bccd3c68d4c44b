use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::pitch::{Handedness, PitchCall};
use crate::zone::Zone;

/// Aggregation output: team display name → batter profiles in first-seen order.
pub type TeamProfiles = BTreeMap<String, Vec<BatterProfile>>;

pub const PENDING: &str = "Pending";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BattingStats {
    pub total_pitches: u32,
    pub strikes: u32,
    pub balls: u32,
    pub swings: u32,
    pub contact: u32,
    pub fouls: u32,
    pub whiffs: u32,
    pub first_pitch_pitches: u32,
    pub first_pitch_swings: u32,
    pub weak_contact: u32,
    pub hard_contact: u32,
}

/// Percentages (0..100) derived from [`BattingStats`]; `None` when the denominator is zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateSummary {
    pub swing_rate: Option<f64>,
    pub contact_rate: Option<f64>,
    pub whiff_rate: Option<f64>,
    pub strike_rate: Option<f64>,
    pub first_pitch_swing_rate: Option<f64>,
    pub hard_hit_rate: Option<f64>,
    pub weak_contact_rate: Option<f64>,
}

pub fn pct(num: u32, den: u32) -> Option<f64> {
    (den > 0).then(|| num as f64 / den as f64 * 100.0)
}

pub fn display_pct(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.1}%"),
        None => "N/A".to_string(),
    }
}

impl BattingStats {
    pub fn rates(&self) -> RateSummary {
        RateSummary {
            swing_rate: pct(self.swings, self.total_pitches),
            contact_rate: pct(self.contact, self.swings),
            whiff_rate: pct(self.whiffs, self.swings),
            strike_rate: pct(self.strikes, self.total_pitches),
            first_pitch_swing_rate: pct(self.first_pitch_swings, self.first_pitch_pitches),
            hard_hit_rate: pct(self.hard_contact, self.contact),
            weak_contact_rate: pct(self.weak_contact, self.contact),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaPitch {
    pub pitch_type: String,
    pub call: PitchCall,
    pub count: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlateAppearance {
    pub inning: u32,
    pub pa_of_inning: u32,
    pub pitches: Vec<PaPitch>,
    #[serde(default)]
    pub result: Option<String>,
}

impl PlateAppearance {
    pub fn new(inning: u32, pa_of_inning: u32) -> Self {
        Self {
            inning,
            pa_of_inning,
            pitches: Vec::new(),
            result: None,
        }
    }

    pub fn key(&self) -> (u32, u32) {
        (self.inning, self.pa_of_inning)
    }

    /// Pitch-type labels of the last `n` pitches, joined as `FB→SL`.
    pub fn tail_sequence(&self, n: usize) -> String {
        let start = self.pitches.len().saturating_sub(n);
        self.pitches[start..]
            .iter()
            .map(|p| p.pitch_type.as_str())
            .collect::<Vec<_>>()
            .join("→")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtBat {
    pub angle: f64,
    pub distance: Option<f64>,
    pub exit_speed: f64,
    pub result: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ZoneStats {
    pub pitches: u32,
    pub swings: u32,
    pub whiffs: u32,
    pub fouls: u32,
    pub contact: u32,
    pub hard_hits: u32,
    pub weak_contact: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PitchMarker {
    pub x: f64,
    pub y: f64,
    pub pitch_type: String,
    pub favorable: bool,
    pub zone: Zone,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutSequence {
    pub sequence3: String,
    pub sequence2: String,
    pub out_type: String,
    /// Pitches in the plate appearance when the out was recorded.
    pub pa_pitches: usize,
}

impl OutSequence {
    pub fn preferred(&self) -> &str {
        if self.pa_pitches >= 3 {
            &self.sequence3
        } else {
            &self.sequence2
        }
    }

    pub fn final_pitch(&self) -> &str {
        self.sequence2.rsplit('→').next().unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrikeoutDetail {
    pub final_pitch: String,
    pub setup_pitch: Option<String>,
    pub count: String,
    pub zone: String,
    pub swinging: bool,
    pub sequence: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Tendencies {
    pub first_pitch: String,
    pub steal_threat: String,
    pub steal_score: u32,
    pub bunt_threat: String,
    pub bunt_score: u32,
    pub spray: String,
}

impl Default for Tendencies {
    fn default() -> Self {
        Self {
            first_pitch: PENDING.to_string(),
            steal_threat: PENDING.to_string(),
            steal_score: 0,
            bunt_threat: PENDING.to_string(),
            bunt_score: 0,
            spray: PENDING.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatterProfile {
    pub name: String,
    pub team: String,
    pub handedness: Handedness,
    #[serde(default)]
    pub pitcher: String,
    #[serde(default)]
    pub pitcher_throws: Option<String>,
    #[serde(default)]
    pub stats: BattingStats,
    #[serde(default)]
    pub plate_appearances: Vec<PlateAppearance>,
    #[serde(default)]
    pub at_bats: Vec<AtBat>,
    #[serde(default)]
    pub zone_analysis: BTreeMap<Zone, ZoneStats>,
    #[serde(default)]
    pub pitch_zones: Vec<PitchMarker>,
    #[serde(default)]
    pub stolen_bases: u32,
    #[serde(default)]
    pub caught_stealing: u32,
    #[serde(default)]
    pub bunts: u32,
    #[serde(default)]
    pub out_sequences: Vec<OutSequence>,
    #[serde(default)]
    pub strikeout_details: Vec<StrikeoutDetail>,
    #[serde(default)]
    pub tendencies: Tendencies,
    #[serde(default)]
    pub power_sequence: String,
}

impl BatterProfile {
    pub fn new(name: &str, team: &str, handedness: Handedness) -> Self {
        Self {
            name: name.to_string(),
            team: team.to_string(),
            handedness,
            pitcher: String::new(),
            pitcher_throws: None,
            stats: BattingStats::default(),
            plate_appearances: Vec::new(),
            at_bats: Vec::new(),
            zone_analysis: BTreeMap::new(),
            pitch_zones: Vec::new(),
            stolen_bases: 0,
            caught_stealing: 0,
            bunts: 0,
            out_sequences: Vec::new(),
            strikeout_details: Vec::new(),
            tendencies: Tendencies::default(),
            power_sequence: PENDING.to_string(),
        }
    }

    pub fn pitches_per_pa(&self) -> Option<f64> {
        let pas = self.plate_appearances.len();
        (pas > 0).then(|| self.stats.total_pitches as f64 / pas as f64)
    }

    /// Plate-appearance position lookup, rebuilt whenever a profile is (re)loaded.
    pub(crate) fn pa_index(&self) -> HashMap<(u32, u32), usize> {
        self.plate_appearances
            .iter()
            .enumerate()
            .map(|(idx, pa)| (pa.key(), idx))
            .collect()
    }
}

pub fn profile_key(team: &str, batter: &str) -> String {
    format!("{team}#{batter}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rates_guard_zero_denominators() {
        let stats = BattingStats::default();
        let rates = stats.rates();
        assert!(rates.swing_rate.is_none());
        assert!(rates.contact_rate.is_none());
        assert_eq!(display_pct(rates.whiff_rate), "N/A");

        let stats = BattingStats {
            total_pitches: 4,
            swings: 2,
            contact: 1,
            whiffs: 1,
            ..Default::default()
        };
        let rates = stats.rates();
        assert_eq!(rates.swing_rate, Some(50.0));
        assert_eq!(display_pct(rates.contact_rate), "50.0%");
    }

    #[test]
    fn tail_sequence_uses_last_pitches() {
        let mut pa = PlateAppearance::new(1, 1);
        for t in ["FB", "SL", "CB", "CH"] {
            pa.pitches.push(PaPitch {
                pitch_type: t.to_string(),
                call: PitchCall::BallCalled,
                count: "0-0".to_string(),
            });
        }
        assert_eq!(pa.tail_sequence(3), "SL→CB→CH");
        assert_eq!(pa.tail_sequence(2), "CB→CH");
        assert_eq!(pa.tail_sequence(10), "FB→SL→CB→CH");
    }

    #[test]
    fn out_sequence_final_pitch() {
        let seq = OutSequence {
            sequence3: "FB→SL".into(),
            sequence2: "FB→SL".into(),
            out_type: "Out".into(),
            pa_pitches: 2,
        };
        assert_eq!(seq.final_pitch(), "SL");
        assert_eq!(seq.preferred(), "FB→SL");
    }
}
