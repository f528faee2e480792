use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::phase::{Boundary, PhaseKind};

/// Solar crossing instants for one local day.
///
/// Any crossing may be absent: at high latitudes the sun can stay above or
/// below a given horizon for the whole day. When none of the four horizons
/// is crossed the oracle reports the phase the sun holds all day in
/// `polar_phase`. A day with no crossings and no `polar_phase` is unresolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayEphemeris {
    pub transit: Option<DateTime<Utc>>,
    pub sunrise: Option<DateTime<Utc>>,
    pub sunset: Option<DateTime<Utc>>,
    pub civil_dawn: Option<DateTime<Utc>>,
    pub civil_dusk: Option<DateTime<Utc>>,
    pub nautical_dawn: Option<DateTime<Utc>>,
    pub nautical_dusk: Option<DateTime<Utc>>,
    pub astro_dawn: Option<DateTime<Utc>>,
    pub astro_dusk: Option<DateTime<Utc>>,
    pub polar_phase: Option<PhaseKind>,
}

impl DayEphemeris {
    /// Ephemeris with every crossing absent, used when the oracle fails.
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn get(&self, boundary: Boundary) -> Option<DateTime<Utc>> {
        match boundary {
            Boundary::AstroDawn => self.astro_dawn,
            Boundary::NauticalDawn => self.nautical_dawn,
            Boundary::CivilDawn => self.civil_dawn,
            Boundary::Sunrise => self.sunrise,
            Boundary::Sunset => self.sunset,
            Boundary::CivilDusk => self.civil_dusk,
            Boundary::NauticalDusk => self.nautical_dusk,
            Boundary::AstroDusk => self.astro_dusk,
        }
    }

    pub fn set(&mut self, boundary: Boundary, instant: Option<DateTime<Utc>>) {
        let slot = match boundary {
            Boundary::AstroDawn => &mut self.astro_dawn,
            Boundary::NauticalDawn => &mut self.nautical_dawn,
            Boundary::CivilDawn => &mut self.civil_dawn,
            Boundary::Sunrise => &mut self.sunrise,
            Boundary::Sunset => &mut self.sunset,
            Boundary::CivilDusk => &mut self.civil_dusk,
            Boundary::NauticalDusk => &mut self.nautical_dusk,
            Boundary::AstroDusk => &mut self.astro_dusk,
        };
        *slot = instant;
    }

    /// Present boundaries in chronological order.
    ///
    /// Ties keep the natural boundary order so the walk stays deterministic.
    pub fn boundaries(&self) -> Vec<(Boundary, DateTime<Utc>)> {
        let mut present: Vec<(Boundary, DateTime<Utc>)> = Boundary::ALL
            .iter()
            .filter_map(|b| self.get(*b).map(|t| (*b, t)))
            .collect();
        present.sort_by_key(|(b, t)| (*t, *b));
        present
    }

    pub fn has_crossings(&self) -> bool {
        Boundary::ALL.iter().any(|b| self.get(*b).is_some())
    }

    pub fn is_unresolved(&self) -> bool {
        !self.has_crossings() && self.polar_phase.is_none()
    }

    /// Seconds between sunrise and sunset, when both occur.
    pub fn daylight_secs(&self) -> Option<i64> {
        let secs = (self.sunset? - self.sunrise?).num_seconds();
        (secs > 0).then_some(secs)
    }
}
