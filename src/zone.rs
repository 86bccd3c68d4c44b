use std::fmt;

use serde::{Deserialize, Serialize};

use crate::pitch::Handedness;
use crate::policy::ZonePolicy;

/// Strike-zone region, vertical band first, horizontal band relative to the batter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Zone {
    #[serde(rename = "High-In")]
    HighIn,
    #[serde(rename = "High-Mid")]
    HighMid,
    #[serde(rename = "High-Out")]
    HighOut,
    #[serde(rename = "Mid-In")]
    MidIn,
    #[serde(rename = "Mid-Mid")]
    MidMid,
    #[serde(rename = "Mid-Out")]
    MidOut,
    #[serde(rename = "Low-In")]
    LowIn,
    #[serde(rename = "Low-Mid")]
    LowMid,
    #[serde(rename = "Low-Out")]
    LowOut,
}

pub const ALL_ZONES: [Zone; 9] = [
    Zone::HighIn,
    Zone::HighMid,
    Zone::HighOut,
    Zone::MidIn,
    Zone::MidMid,
    Zone::MidOut,
    Zone::LowIn,
    Zone::LowMid,
    Zone::LowOut,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Vertical {
    High,
    Mid,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Horizontal {
    In,
    Mid,
    Out,
}

impl Zone {
    fn from_bands(v: Vertical, h: Horizontal) -> Self {
        match (v, h) {
            (Vertical::High, Horizontal::In) => Zone::HighIn,
            (Vertical::High, Horizontal::Mid) => Zone::HighMid,
            (Vertical::High, Horizontal::Out) => Zone::HighOut,
            (Vertical::Mid, Horizontal::In) => Zone::MidIn,
            (Vertical::Mid, Horizontal::Mid) => Zone::MidMid,
            (Vertical::Mid, Horizontal::Out) => Zone::MidOut,
            (Vertical::Low, Horizontal::In) => Zone::LowIn,
            (Vertical::Low, Horizontal::Mid) => Zone::LowMid,
            (Vertical::Low, Horizontal::Out) => Zone::LowOut,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Zone::HighIn => "High-In",
            Zone::HighMid => "High-Mid",
            Zone::HighOut => "High-Out",
            Zone::MidIn => "Mid-In",
            Zone::MidMid => "Mid-Mid",
            Zone::MidOut => "Mid-Out",
            Zone::LowIn => "Low-In",
            Zone::LowMid => "Low-Mid",
            Zone::LowOut => "Low-Out",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a plate location. Total over all inputs: values exactly on a band
/// edge (and NaN) land in the middle band.
pub fn zone_from_location(side: f64, height: f64, hand: Handedness, bands: &ZonePolicy) -> Zone {
    let edge = bands.inside_edge;
    let inside = match hand {
        Handedness::Left => side > edge,
        Handedness::Right => side < -edge,
    };
    let outside = match hand {
        Handedness::Left => side < -edge,
        Handedness::Right => side > edge,
    };
    let horizontal = if inside {
        Horizontal::In
    } else if outside {
        Horizontal::Out
    } else {
        Horizontal::Mid
    };

    let vertical = if height > bands.high_above {
        Vertical::High
    } else if height < bands.low_below {
        Vertical::Low
    } else {
        Vertical::Mid
    };

    Zone::from_bands(vertical, horizontal)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(side: f64, height: f64, hand: Handedness) -> Zone {
        zone_from_location(side, height, hand, &ZonePolicy::default())
    }

    #[test]
    fn inside_is_handedness_relative() {
        assert_eq!(classify(-0.8, 2.5, Handedness::Right), Zone::MidIn);
        assert_eq!(classify(-0.8, 2.5, Handedness::Left), Zone::MidOut);
        assert_eq!(classify(0.8, 3.4, Handedness::Left), Zone::HighIn);
        assert_eq!(classify(0.8, 1.2, Handedness::Right), Zone::LowOut);
    }

    #[test]
    fn band_edges_resolve_to_mid() {
        assert_eq!(classify(0.33, 3.0, Handedness::Right), Zone::MidMid);
        assert_eq!(classify(-0.33, 2.0, Handedness::Right), Zone::MidMid);
        assert_eq!(classify(0.33, 2.0, Handedness::Left), Zone::MidMid);
        assert_eq!(classify(f64::NAN, f64::NAN, Handedness::Left), Zone::MidMid);
    }

    #[test]
    fn every_location_maps_to_a_known_label() {
        for side in [-3.0, -0.34, -0.33, 0.0, 0.33, 0.34, 3.0] {
            for height in [0.0, 1.99, 2.0, 2.5, 3.0, 3.01, 6.0] {
                for hand in [Handedness::Left, Handedness::Right] {
                    let zone = classify(side, height, hand);
                    assert!(ALL_ZONES.contains(&zone));
                }
            }
        }
    }

    #[test]
    fn zone_serializes_as_label() {
        let json = serde_json::to_string(&Zone::LowOut).expect("serialize");
        assert_eq!(json, "\"Low-Out\"");
    }
}
