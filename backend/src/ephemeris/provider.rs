//! Production oracle backed by the NREL Solar Position Algorithm.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use solar_positioning::{spa, time::DeltaT, Horizon, SunriseResult};

use super::{EphemerisError, SolarEphemerisProvider};
use crate::models::{local_noon, Boundary, Coordinate, DayEphemeris, PhaseKind};

/// Outcome of one horizon for one day.
#[derive(Debug, Clone, Copy)]
enum Crossing {
    Regular {
        rise: DateTime<Utc>,
        transit: DateTime<Utc>,
        set: DateTime<Utc>,
    },
    AlwaysAbove {
        transit: DateTime<Utc>,
    },
    AlwaysBelow {
        transit: DateTime<Utc>,
    },
}

impl Crossing {
    fn from_result(result: SunriseResult<DateTime<Tz>>) -> Self {
        match result {
            SunriseResult::RegularDay {
                sunrise,
                transit,
                sunset,
            } => Crossing::Regular {
                rise: sunrise.with_timezone(&Utc),
                transit: transit.with_timezone(&Utc),
                set: sunset.with_timezone(&Utc),
            },
            SunriseResult::AllDay { transit } => Crossing::AlwaysAbove {
                transit: transit.with_timezone(&Utc),
            },
            SunriseResult::AllNight { transit } => Crossing::AlwaysBelow {
                transit: transit.with_timezone(&Utc),
            },
        }
    }

    fn rise_and_set(&self) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        match self {
            Crossing::Regular { rise, set, .. } => (Some(*rise), Some(*set)),
            _ => (None, None),
        }
    }

    fn transit(&self) -> DateTime<Utc> {
        match self {
            Crossing::Regular { transit, .. }
            | Crossing::AlwaysAbove { transit }
            | Crossing::AlwaysBelow { transit } => *transit,
        }
    }

    fn is_always_above(&self) -> bool {
        matches!(self, Crossing::AlwaysAbove { .. })
    }

    fn is_regular(&self) -> bool {
        matches!(self, Crossing::Regular { .. })
    }
}

/// Ephemeris oracle using `solar_positioning::spa`.
///
/// Elevation is accepted as a hint but not applied: SPA rise/set times use
/// the standard sea-level horizons.
#[derive(Debug, Clone, Default)]
pub struct SpaEphemerisProvider {
    /// Fixed ΔT (TT − UT1) in seconds; estimated per month when `None`
    delta_t: Option<f64>,
}

impl SpaEphemerisProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delta_t(delta_t: f64) -> Self {
        Self {
            delta_t: Some(delta_t),
        }
    }

    fn delta_t_for(&self, date: NaiveDate) -> f64 {
        self.delta_t
            .unwrap_or_else(|| DeltaT::estimate_from_date(date.year(), date.month()).unwrap_or(0.0))
    }
}

impl SolarEphemerisProvider for SpaEphemerisProvider {
    fn crossings(
        &self,
        date: NaiveDate,
        tz: Tz,
        coordinate: &Coordinate,
    ) -> Result<DayEphemeris, EphemerisError> {
        let anchor = local_noon(date, tz);
        let delta_t = self.delta_t_for(date);

        let solve = |horizon: Horizon| -> Result<Crossing, EphemerisError> {
            spa::sunrise_sunset_for_horizon(
                anchor,
                coordinate.latitude,
                coordinate.longitude,
                delta_t,
                horizon,
            )
            .map(Crossing::from_result)
            .map_err(|e| EphemerisError::unavailable(date, e.to_string()))
        };

        let day = solve(Horizon::SunriseSunset)?;
        let civil = solve(Horizon::CivilTwilight)?;
        let nautical = solve(Horizon::NauticalTwilight)?;
        let astro = solve(Horizon::AstronomicalTwilight)?;

        let mut ephemeris = DayEphemeris {
            transit: Some(day.transit()),
            ..DayEphemeris::default()
        };
        let pairs = [
            (day, Boundary::Sunrise, Boundary::Sunset),
            (civil, Boundary::CivilDawn, Boundary::CivilDusk),
            (nautical, Boundary::NauticalDawn, Boundary::NauticalDusk),
            (astro, Boundary::AstroDawn, Boundary::AstroDusk),
        ];
        for (crossing, dawn, dusk) in pairs {
            let (rise, set) = crossing.rise_and_set();
            ephemeris.set(dawn, rise);
            ephemeris.set(dusk, set);
        }

        if !pairs.iter().any(|(c, _, _)| c.is_regular()) {
            ephemeris.polar_phase = Some(polar_phase(&day, &civil, &nautical, &astro));
        }

        Ok(ephemeris)
    }
}

/// Phase held all day when no horizon is crossed: the highest horizon the sun
/// stays above decides it.
fn polar_phase(day: &Crossing, civil: &Crossing, nautical: &Crossing, astro: &Crossing) -> PhaseKind {
    if day.is_always_above() {
        PhaseKind::Daylight
    } else if civil.is_always_above() {
        PhaseKind::CivilDawn
    } else if nautical.is_always_above() {
        PhaseKind::NauticalDawn
    } else if astro.is_always_above() {
        PhaseKind::AstroDawn
    } else {
        PhaseKind::Night
    }
}
