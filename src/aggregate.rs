use std::collections::HashMap;

use tracing::debug;

use crate::identity::IdentityResolver;
use crate::pitch::{PitchCall, PitchEvent};
use crate::policy::{MarkerPolicy, ScoringPolicy};
use crate::profile::{
    AtBat, BatterProfile, OutSequence, PaPitch, PitchMarker, PlateAppearance, StrikeoutDetail,
    TeamProfiles, profile_key,
};
use crate::tendencies::{
    analyze_out_sequences, assess_bunt_threat, assess_steal_threat, first_pitch_approach,
    spray_tendency,
};
use crate::zone::zone_from_location;

/// Substrings of a play result that mark the batter as retired.
pub const OUT_MARKERS: &[&str] = &[
    "Out",
    "FieldersChoice",
    "Sacrifice",
    "DoublePlay",
    "TriplePlay",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContactQuality {
    Hard,
    Weak,
    Medium,
}

/// Counts of what one aggregation pass did with its input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FoldSummary {
    pub events_seen: usize,
    pub below_min_velocity: usize,
    pub unresolved_identity: usize,
    pub profiles: usize,
}

struct Names {
    batter: String,
    team: String,
    pitcher: String,
}

struct Slot {
    profile: BatterProfile,
    pa_index: HashMap<(u32, u32), usize>,
}

#[derive(Default)]
struct Book {
    order: Vec<String>,
    slots: HashMap<String, Slot>,
}

impl Book {
    fn seeded(seed: TeamProfiles) -> Self {
        let mut book = Book::default();
        for (team, profiles) in seed {
            for mut profile in profiles {
                profile.team = team.clone();
                let key = profile_key(&team, &profile.name);
                if book.slots.contains_key(&key) {
                    continue;
                }
                let pa_index = profile.pa_index();
                book.order.push(key.clone());
                book.slots.insert(key, Slot { profile, pa_index });
            }
        }
        book
    }

    fn slot(&mut self, key: String, create: impl FnOnce() -> BatterProfile) -> &mut Slot {
        if !self.slots.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.slots.entry(key).or_insert_with(|| Slot {
            profile: create(),
            pa_index: HashMap::new(),
        })
    }

    fn into_profiles(mut self) -> TeamProfiles {
        let mut out = TeamProfiles::new();
        for key in self.order {
            if let Some(slot) = self.slots.remove(&key) {
                out.entry(slot.profile.team.clone())
                    .or_default()
                    .push(slot.profile);
            }
        }
        out
    }
}

/// Folds pitch events into per-batter scouting profiles.
pub struct ProfileAggregator<'a> {
    resolver: &'a IdentityResolver,
    policy: &'a ScoringPolicy,
}

impl<'a> ProfileAggregator<'a> {
    pub fn new(resolver: &'a IdentityResolver, policy: &'a ScoringPolicy) -> Self {
        Self { resolver, policy }
    }

    pub fn aggregate(
        &self,
        events: &[PitchEvent],
        seed: TeamProfiles,
        min_velocity: f64,
    ) -> TeamProfiles {
        self.aggregate_with_summary(events, seed, min_velocity).0
    }

    /// Single pass over `events` merged into `seed`, then tendencies are derived
    /// from the merged totals.
    pub fn aggregate_with_summary(
        &self,
        events: &[PitchEvent],
        seed: TeamProfiles,
        min_velocity: f64,
    ) -> (TeamProfiles, FoldSummary) {
        let mut book = Book::seeded(seed);
        let mut summary = FoldSummary {
            events_seen: events.len(),
            ..FoldSummary::default()
        };

        for event in events {
            if below_min_velocity(event, min_velocity) {
                summary.below_min_velocity += 1;
                continue;
            }
            if !self.fold_event(&mut book, event) {
                summary.unresolved_identity += 1;
            }
        }

        for slot in book.slots.values_mut() {
            self.derive(&mut slot.profile);
        }
        summary.profiles = book.slots.len();
        debug!(
            events = summary.events_seen,
            filtered = summary.below_min_velocity,
            dropped = summary.unresolved_identity,
            profiles = summary.profiles,
            "aggregation complete"
        );
        (book.into_profiles(), summary)
    }

    /// The events each profile key would absorb from `events`, after the same
    /// velocity filter and identity drop the fold applies. Seeds are not included.
    pub fn pitches_by_profile<'e>(
        &self,
        events: &'e [PitchEvent],
        min_velocity: f64,
    ) -> HashMap<String, Vec<&'e PitchEvent>> {
        let mut out: HashMap<String, Vec<&'e PitchEvent>> = HashMap::new();
        for event in events {
            if below_min_velocity(event, min_velocity) {
                continue;
            }
            if let Some(names) = self.identity(event) {
                out.entry(profile_key(&names.team, &names.batter))
                    .or_default()
                    .push(event);
            }
        }
        out
    }

    /// `None` when any of batter, team or pitcher resolves to an empty name.
    fn identity(&self, event: &PitchEvent) -> Option<Names> {
        let batter = self.resolver.resolve_batter_name(event.batter_id.as_deref());
        let team = self.resolver.resolve_team_name(event.batter_team.as_deref());
        let pitcher = self.resolver.resolve_pitcher_name(event.pitcher_id.as_deref());
        if batter.is_empty() || team.is_empty() || pitcher.is_empty() {
            return None;
        }
        Some(Names {
            batter,
            team,
            pitcher,
        })
    }

    /// Returns false when the event was discarded for an empty batter, team or pitcher name.
    fn fold_event(&self, book: &mut Book, event: &PitchEvent) -> bool {
        let Some(Names {
            batter,
            team,
            pitcher,
        }) = self.identity(event)
        else {
            return false;
        };

        let hand = event.batter_hand();
        let slot = book.slot(profile_key(&team, &batter), || {
            BatterProfile::new(&batter, &team, hand)
        });
        let profile = &mut slot.profile;
        profile.pitcher = pitcher;
        profile.pitcher_throws = event.pitcher_throws.clone();

        let call = &event.pitch_call;
        let pitch_type = event.pitch_type_label();
        let quality = self.contact_quality(event);

        let pa_key = (event.inning, event.pa_of_inning);
        let pa_idx = match slot.pa_index.get(&pa_key) {
            Some(idx) => *idx,
            None => {
                profile
                    .plate_appearances
                    .push(PlateAppearance::new(event.inning, event.pa_of_inning));
                let idx = profile.plate_appearances.len() - 1;
                slot.pa_index.insert(pa_key, idx);
                idx
            }
        };
        let pa = &mut profile.plate_appearances[pa_idx];
        let first_pitch = pa.pitches.is_empty();
        pa.pitches.push(PaPitch {
            pitch_type: pitch_type.clone(),
            call: call.clone(),
            count: event.count_label(),
        });

        let stats = &mut profile.stats;
        if first_pitch {
            stats.first_pitch_pitches += 1;
            if call.is_swing() {
                stats.first_pitch_swings += 1;
            }
        }
        stats.total_pitches += 1;
        stats.strikes += u32::from(call.is_strike());
        stats.balls += u32::from(call.is_ball());
        stats.swings += u32::from(call.is_swing());
        stats.contact += u32::from(call.is_contact());
        stats.fouls += u32::from(call.is_foul());
        stats.whiffs += u32::from(call.is_whiff());
        match quality {
            Some(ContactQuality::Hard) => stats.hard_contact += 1,
            Some(ContactQuality::Weak) => stats.weak_contact += 1,
            _ => {}
        }

        if let Some(result) = event.defined_result() {
            pa.result = Some(result.to_string());
            // Plain substring match: any result text containing "Out" counts.
            let is_out = event.is_strikeout()
                || OUT_MARKERS.iter().any(|marker| result.contains(marker));
            if is_out && pa.pitches.len() >= 2 {
                profile.out_sequences.push(OutSequence {
                    sequence3: pa.tail_sequence(3),
                    sequence2: pa.tail_sequence(2),
                    out_type: if event.is_strikeout() {
                        "K".to_string()
                    } else {
                        result.to_string()
                    },
                    pa_pitches: pa.pitches.len(),
                });
            }

            let normalized = normalize_result(result);
            if normalized.contains("stolenbase") {
                profile.stolen_bases += 1;
            }
            if normalized.contains("caughtstealing") {
                profile.caught_stealing += 1;
            }
            if normalized.contains("bunt") || normalize_result(call.as_str()).contains("bunt") {
                profile.bunts += 1;
            }

            if call.is_in_play()
                && let (Some(angle), Some(exit_speed)) = (event.angle, event.exit_speed)
            {
                profile.at_bats.push(AtBat {
                    angle,
                    distance: event.distance,
                    exit_speed,
                    result: result.to_string(),
                });
            }
        }

        let zone = event
            .location()
            .map(|(side, height)| zone_from_location(side, height, hand, &self.policy.zones));

        if event.is_strikeout() && pa.pitches.len() >= 2 {
            let n = pa.pitches.len();
            profile.strikeout_details.push(StrikeoutDetail {
                final_pitch: pa.pitches[n - 1].pitch_type.clone(),
                setup_pitch: Some(pa.pitches[n - 2].pitch_type.clone()),
                count: event.count_label(),
                zone: zone
                    .map(|z| z.label().to_string())
                    .unwrap_or_else(|| "Unknown".to_string()),
                swinging: call.is_whiff(),
                sequence: pa.tail_sequence(n),
            });
        }

        if let (Some(zone), Some((side, height))) = (zone, event.location()) {
            let zs = profile.zone_analysis.entry(zone).or_default();
            zs.pitches += 1;
            zs.swings += u32::from(call.is_swing());
            zs.whiffs += u32::from(call.is_whiff());
            zs.fouls += u32::from(call.is_foul());
            zs.contact += u32::from(call.is_contact());
            match quality {
                Some(ContactQuality::Hard) => zs.hard_hits += 1,
                Some(ContactQuality::Weak) => zs.weak_contact += 1,
                _ => {}
            }

            if profile.pitch_zones.len() < self.policy.markers.cap {
                let (x, y) = plot_position(side, height, &self.policy.markers);
                profile.pitch_zones.push(PitchMarker {
                    x,
                    y,
                    pitch_type,
                    favorable: favorable_to_pitcher(call, quality),
                    zone,
                });
            }
        }

        true
    }

    /// Exit-speed bucket for balls in play with a measured exit speed.
    fn contact_quality(&self, event: &PitchEvent) -> Option<ContactQuality> {
        if !event.pitch_call.is_in_play() {
            return None;
        }
        let exit = event.exit_speed?;
        let c = &self.policy.contact;
        Some(if exit >= c.hard_exit_speed {
            ContactQuality::Hard
        } else if exit < c.weak_exit_speed {
            ContactQuality::Weak
        } else {
            ContactQuality::Medium
        })
    }

    fn derive(&self, profile: &mut BatterProfile) {
        if profile.stats.total_pitches == 0 {
            return;
        }
        if let Some(approach) = first_pitch_approach(profile, self.policy) {
            profile.tendencies.first_pitch = approach;
        }
        let steal = assess_steal_threat(profile, self.policy);
        profile.tendencies.steal_threat = steal.label;
        profile.tendencies.steal_score = steal.score;
        let bunt = assess_bunt_threat(profile, self.policy);
        profile.tendencies.bunt_threat = bunt.label;
        profile.tendencies.bunt_score = bunt.score;
        profile.tendencies.spray = spray_tendency(profile, self.policy);
        profile.power_sequence = analyze_out_sequences(&profile.out_sequences, self.policy);
    }
}

/// Convenience wrapper over [`ProfileAggregator::aggregate`].
pub fn aggregate(
    events: &[PitchEvent],
    seed: TeamProfiles,
    min_velocity: f64,
    resolver: &IdentityResolver,
    policy: &ScoringPolicy,
) -> TeamProfiles {
    ProfileAggregator::new(resolver, policy).aggregate(events, seed, min_velocity)
}

fn below_min_velocity(event: &PitchEvent, min_velocity: f64) -> bool {
    min_velocity > 0.0 && event.pitch_speed() < min_velocity
}

fn normalize_result(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Strikes and fouls help the pitcher, as does weak contact; balls and other balls in play do not.
fn favorable_to_pitcher(call: &PitchCall, quality: Option<ContactQuality>) -> bool {
    if call.is_strike() {
        return true;
    }
    call.is_in_play() && quality == Some(ContactQuality::Weak)
}

fn plot_position(side: f64, height: f64, window: &MarkerPolicy) -> (f64, f64) {
    let scale = |v: f64, lo: f64, hi: f64| ((v - lo) / (hi - lo) * 100.0).clamp(0.0, 100.0);
    (
        scale(side, window.side_min, window.side_max),
        scale(height, window.height_min, window.height_max),
    )
}
