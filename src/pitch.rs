use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::lenient::{count_or_zero, float_or_none, string_or_none, value_to_string};

/// Umpire/tracking call attached to every pitch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum PitchCall {
    StrikeCalled,
    StrikeSwinging,
    FoulBall,
    FoulBallFieldable,
    FoulBallNotFieldable,
    InPlay,
    BallCalled,
    HitByPitch,
    /// Upstream sent the literal "Undefined" tag.
    Undefined,
    /// No call at all: key absent, null or blank.
    #[default]
    Missing,
    Other(String),
}

impl PitchCall {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "StrikeCalled" => PitchCall::StrikeCalled,
            "StrikeSwinging" => PitchCall::StrikeSwinging,
            "FoulBall" => PitchCall::FoulBall,
            "FoulBallFieldable" => PitchCall::FoulBallFieldable,
            "FoulBallNotFieldable" => PitchCall::FoulBallNotFieldable,
            "InPlay" => PitchCall::InPlay,
            "BallCalled" => PitchCall::BallCalled,
            "HitByPitch" => PitchCall::HitByPitch,
            "" => PitchCall::Missing,
            "Undefined" => PitchCall::Undefined,
            other => PitchCall::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PitchCall::StrikeCalled => "StrikeCalled",
            PitchCall::StrikeSwinging => "StrikeSwinging",
            PitchCall::FoulBall => "FoulBall",
            PitchCall::FoulBallFieldable => "FoulBallFieldable",
            PitchCall::FoulBallNotFieldable => "FoulBallNotFieldable",
            PitchCall::InPlay => "InPlay",
            PitchCall::BallCalled => "BallCalled",
            PitchCall::HitByPitch => "HitByPitch",
            PitchCall::Undefined => "Undefined",
            PitchCall::Missing => "",
            PitchCall::Other(raw) => raw.as_str(),
        }
    }

    pub fn is_foul(&self) -> bool {
        matches!(
            self,
            PitchCall::FoulBall | PitchCall::FoulBallFieldable | PitchCall::FoulBallNotFieldable
        )
    }

    pub fn is_whiff(&self) -> bool {
        matches!(self, PitchCall::StrikeSwinging)
    }

    pub fn is_in_play(&self) -> bool {
        matches!(self, PitchCall::InPlay)
    }

    pub fn is_strike(&self) -> bool {
        matches!(self, PitchCall::StrikeCalled | PitchCall::StrikeSwinging) || self.is_foul()
    }

    pub fn is_ball(&self) -> bool {
        matches!(self, PitchCall::BallCalled)
    }

    pub fn is_swing(&self) -> bool {
        self.is_whiff() || self.is_foul() || self.is_in_play()
    }

    pub fn is_contact(&self) -> bool {
        self.is_foul() || self.is_in_play()
    }
}

impl fmt::Display for PitchCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PitchCall {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PitchCall {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = value_to_string(Value::deserialize(deserializer)?);
        Ok(raw.as_deref().map(PitchCall::parse).unwrap_or_default())
    }
}

/// The strikeout/walk tag carried alongside the play result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrikeoutWalk {
    Strikeout,
    Walk,
    #[default]
    Undefined,
}

impl<'de> Deserialize<'de> for StrikeoutWalk {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = value_to_string(Value::deserialize(deserializer)?);
        Ok(match raw.as_deref().map(str::trim) {
            Some("Strikeout") => StrikeoutWalk::Strikeout,
            Some("Walk") => StrikeoutWalk::Walk,
            _ => StrikeoutWalk::Undefined,
        })
    }
}

impl Serialize for StrikeoutWalk {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(match self {
            StrikeoutWalk::Strikeout => "Strikeout",
            StrikeoutWalk::Walk => "Walk",
            StrikeoutWalk::Undefined => "Undefined",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Handedness {
    Left,
    #[default]
    Right,
}

impl Handedness {
    /// Only an explicit "Left" is left-handed; anything else (including switch/unknown) is right.
    pub fn from_side(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("Left") => Handedness::Left,
            _ => Handedness::Right,
        }
    }
}

/// One tracked pitch as delivered by the upstream `pitches` resource.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PitchEvent {
    #[serde(default, deserialize_with = "string_or_none")]
    pub batter_id: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub pitcher_id: Option<String>,
    #[serde(default, alias = "batter_team_code", deserialize_with = "string_or_none")]
    pub batter_team: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub batter_side: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub pitcher_throws: Option<String>,

    #[serde(default, deserialize_with = "count_or_zero")]
    pub inning: u32,
    #[serde(default, deserialize_with = "string_or_none")]
    pub top_bottom: Option<String>,
    #[serde(default, deserialize_with = "count_or_zero")]
    pub balls: u8,
    #[serde(default, deserialize_with = "count_or_zero")]
    pub strikes: u8,
    #[serde(default, deserialize_with = "count_or_zero")]
    pub pa_of_inning: u32,

    #[serde(default)]
    pub pitch_call: PitchCall,
    #[serde(default, deserialize_with = "string_or_none")]
    pub tagged_pitch_type: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub auto_pitch_type: Option<String>,
    #[serde(default, deserialize_with = "float_or_none")]
    pub rel_speed: Option<f64>,
    #[serde(default, deserialize_with = "float_or_none")]
    pub zone_speed: Option<f64>,

    #[serde(default, deserialize_with = "float_or_none")]
    pub exit_speed: Option<f64>,
    #[serde(default, deserialize_with = "float_or_none")]
    pub angle: Option<f64>,
    #[serde(default, deserialize_with = "float_or_none")]
    pub distance: Option<f64>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub play_result: Option<String>,
    #[serde(default)]
    pub korbb: StrikeoutWalk,

    #[serde(default, deserialize_with = "float_or_none")]
    pub plate_loc_side: Option<f64>,
    #[serde(default, deserialize_with = "float_or_none")]
    pub plate_loc_height: Option<f64>,
}

impl PitchEvent {
    /// Release speed, falling back to the secondary speed reading, else 0.
    pub fn pitch_speed(&self) -> f64 {
        self.rel_speed.or(self.zone_speed).unwrap_or(0.0)
    }

    pub fn batter_hand(&self) -> Handedness {
        Handedness::from_side(self.batter_side.as_deref())
    }

    pub fn is_strikeout(&self) -> bool {
        self.korbb == StrikeoutWalk::Strikeout
    }

    /// Play result with the upstream "undefined" sentinel filtered out.
    pub fn defined_result(&self) -> Option<&str> {
        self.play_result
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty() && !r.eq_ignore_ascii_case("undefined"))
    }

    pub fn location(&self) -> Option<(f64, f64)> {
        match (self.plate_loc_side, self.plate_loc_height) {
            (Some(side), Some(height)) => Some((side, height)),
            _ => None,
        }
    }

    pub fn count_label(&self) -> String {
        format!("{}-{}", self.balls, self.strikes)
    }

    pub fn pitch_type_label(&self) -> String {
        let raw = self
            .tagged_pitch_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty() && !t.eq_ignore_ascii_case("undefined"))
            .or_else(|| {
                self.auto_pitch_type
                    .as_deref()
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
            });
        abbreviate_pitch_type(raw)
    }
}

pub fn abbreviate_pitch_type(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return "UN".to_string();
    };
    let key = raw.to_ascii_lowercase().replace([' ', '-', '_'], "");
    let abbr = match key.as_str() {
        "fastball" | "fourseamfastball" | "fourseam" => "FB",
        "twoseamfastball" | "twoseam" => "2S",
        "sinker" => "SI",
        "cutter" => "CT",
        "slider" => "SL",
        "curveball" => "CB",
        "changeup" => "CH",
        "splitter" => "SP",
        "knuckleball" => "KN",
        "sweeper" => "SW",
        "" | "undefined" => "UN",
        _ => {
            return raw
                .chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .take(2)
                .collect::<String>()
                .to_ascii_uppercase();
        }
    };
    abbr.to_string()
}
