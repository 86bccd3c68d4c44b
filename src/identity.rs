use std::collections::HashMap;

use serde::Deserialize;
use tracing::{info, warn};

use crate::lenient::{string_or_empty, string_or_none};
use crate::upstream::{PageSource, Resource, fetch_all_pages};

/// Display names used when the team catalog has no entry for a code.
const TEAM_NAME_FALLBACK: &[(&str, &str)] = &[
    ("ARI", "Arizona Diamondbacks"),
    ("ATL", "Atlanta Braves"),
    ("BAL", "Baltimore Orioles"),
    ("BOS", "Boston Red Sox"),
    ("CHC", "Chicago Cubs"),
    ("CWS", "Chicago White Sox"),
    ("CIN", "Cincinnati Reds"),
    ("CLE", "Cleveland Guardians"),
    ("COL", "Colorado Rockies"),
    ("DET", "Detroit Tigers"),
    ("HOU", "Houston Astros"),
    ("KC", "Kansas City Royals"),
    ("LAA", "Los Angeles Angels"),
    ("LAD", "Los Angeles Dodgers"),
    ("MIA", "Miami Marlins"),
    ("MIL", "Milwaukee Brewers"),
    ("MIN", "Minnesota Twins"),
    ("NYM", "New York Mets"),
    ("NYY", "New York Yankees"),
    ("OAK", "Oakland Athletics"),
    ("PHI", "Philadelphia Phillies"),
    ("PIT", "Pittsburgh Pirates"),
    ("SD", "San Diego Padres"),
    ("SF", "San Francisco Giants"),
    ("SEA", "Seattle Mariners"),
    ("STL", "St. Louis Cardinals"),
    ("TB", "Tampa Bay Rays"),
    ("TEX", "Texas Rangers"),
    ("TOR", "Toronto Blue Jays"),
    ("WSH", "Washington Nationals"),
];

#[derive(Debug, Clone, Deserialize)]
pub struct PlayerRecord {
    #[serde(alias = "player_id", deserialize_with = "string_or_empty")]
    pub id: String,
    #[serde(default, deserialize_with = "string_or_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub last_name: Option<String>,
}

impl PlayerRecord {
    pub fn display_name(&self) -> String {
        if let Some(name) = self.name.as_deref() {
            return name.trim().to_string();
        }
        let first = self.first_name.as_deref().unwrap_or("").trim();
        let last = self.last_name.as_deref().unwrap_or("").trim();
        format!("{first} {last}").trim().to_string()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamRecord {
    #[serde(alias = "team_code", alias = "abbreviation", deserialize_with = "string_or_empty")]
    pub code: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BallparkRecord {
    #[serde(deserialize_with = "string_or_empty")]
    pub id: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub name: String,
}

/// Player/team lookup tables, built once and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct IdentityResolver {
    players: HashMap<String, String>,
    teams: HashMap<String, String>,
    ballparks: HashMap<String, String>,
}

impl IdentityResolver {
    pub fn from_catalogs(
        players: Vec<PlayerRecord>,
        teams: Vec<TeamRecord>,
        ballparks: Vec<BallparkRecord>,
    ) -> Self {
        Self {
            players: players
                .into_iter()
                .filter(|p| !p.id.trim().is_empty())
                .map(|p| {
                    let name = p.display_name();
                    (p.id, name)
                })
                .collect(),
            // A team row without a name is treated as absent so the static table still applies.
            teams: teams
                .into_iter()
                .filter(|t| !t.code.trim().is_empty() && !t.name.trim().is_empty())
                .map(|t| (t.code, t.name))
                .collect(),
            ballparks: ballparks
                .into_iter()
                .filter(|b| !b.id.trim().is_empty())
                .map(|b| (b.id, b.name))
                .collect(),
        }
    }

    /// Load every catalog. A failed catalog is logged and left empty; this never fails.
    pub fn populate(source: &dyn PageSource) -> Self {
        let players = load_catalog::<PlayerRecord>(source, Resource::Players);
        let teams = load_catalog::<TeamRecord>(source, Resource::Teams);
        let ballparks = load_catalog::<BallparkRecord>(source, Resource::Ballparks);
        let resolver = Self::from_catalogs(players, teams, ballparks);
        info!(
            players = resolver.players.len(),
            teams = resolver.teams.len(),
            ballparks = resolver.ballparks.len(),
            "identity tables loaded"
        );
        resolver
    }

    /// Catalog name, else `Player-<first 8 chars of id>`, else `Player-Unknown`.
    /// A catalog entry with an empty name resolves to an empty string.
    pub fn resolve_player_name(&self, id: Option<&str>) -> String {
        let Some(id) = id.map(str::trim).filter(|id| !id.is_empty()) else {
            return "Player-Unknown".to_string();
        };
        if let Some(name) = self.players.get(id) {
            return name.clone();
        }
        let short: String = id.chars().take(8).collect();
        format!("Player-{short}")
    }

    pub fn resolve_batter_name(&self, id: Option<&str>) -> String {
        self.resolve_player_name(id)
    }

    pub fn resolve_pitcher_name(&self, id: Option<&str>) -> String {
        self.resolve_player_name(id)
    }

    /// Catalog name, else the static fallback table, else the raw code.
    pub fn resolve_team_name(&self, code: Option<&str>) -> String {
        let Some(code) = code.map(str::trim) else {
            return String::new();
        };
        if let Some(name) = self.teams.get(code) {
            return name.clone();
        }
        TEAM_NAME_FALLBACK
            .iter()
            .find(|(c, _)| c.eq_ignore_ascii_case(code))
            .map(|(_, name)| (*name).to_string())
            .unwrap_or_else(|| code.to_string())
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn team_count(&self) -> usize {
        self.teams.len()
    }
}

fn load_catalog<T: serde::de::DeserializeOwned>(
    source: &dyn PageSource,
    resource: Resource,
) -> Vec<T> {
    match fetch_all_pages::<T>(source, resource, None) {
        Ok(rows) => rows,
        Err(err) => {
            let err = format!("{err:#}");
            warn!(resource = resource.path(), error = %err, "catalog load failed");
            Vec::new()
        }
    }
}
