//! Illumination phases and the sun-angle crossings that separate them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One named phase of the solar day.
///
/// Variants are declared in the order they occur from midnight onward.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum PhaseKind {
    Night,
    AstroDawn,
    NauticalDawn,
    CivilDawn,
    Daylight,
    CivilDusk,
    NauticalDusk,
    AstroDusk,
}

impl PhaseKind {
    pub const ALL: [PhaseKind; 8] = [
        PhaseKind::Night,
        PhaseKind::AstroDawn,
        PhaseKind::NauticalDawn,
        PhaseKind::CivilDawn,
        PhaseKind::Daylight,
        PhaseKind::CivilDusk,
        PhaseKind::NauticalDusk,
        PhaseKind::AstroDusk,
    ];

    /// Identifier used in query strings and event UIDs.
    pub fn slug(&self) -> &'static str {
        match self {
            PhaseKind::Night => "night",
            PhaseKind::AstroDawn => "astro-dawn",
            PhaseKind::NauticalDawn => "nautical-dawn",
            PhaseKind::CivilDawn => "civil-dawn",
            PhaseKind::Daylight => "daylight",
            PhaseKind::CivilDusk => "civil-dusk",
            PhaseKind::NauticalDusk => "nautical-dusk",
            PhaseKind::AstroDusk => "astro-dusk",
        }
    }

    /// Human readable name used in event summaries.
    pub fn label(&self) -> &'static str {
        match self {
            PhaseKind::Night => "Night",
            PhaseKind::AstroDawn => "Astronomical dawn",
            PhaseKind::NauticalDawn => "Nautical dawn",
            PhaseKind::CivilDawn => "Civil dawn",
            PhaseKind::Daylight => "Daylight",
            PhaseKind::CivilDusk => "Civil dusk",
            PhaseKind::NauticalDusk => "Nautical dusk",
            PhaseKind::AstroDusk => "Astronomical dusk",
        }
    }

    /// Only daylight and night are ranked against the yearly distribution.
    pub fn has_percentile(&self) -> bool {
        matches!(self, PhaseKind::Daylight | PhaseKind::Night)
    }

    fn bit(&self) -> u8 {
        1 << (*self as u8)
    }
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PhaseKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "night" => Ok(PhaseKind::Night),
            "astro-dawn" | "astronomical-dawn" => Ok(PhaseKind::AstroDawn),
            "nautical-dawn" => Ok(PhaseKind::NauticalDawn),
            "civil-dawn" => Ok(PhaseKind::CivilDawn),
            "daylight" | "day" => Ok(PhaseKind::Daylight),
            "civil-dusk" => Ok(PhaseKind::CivilDusk),
            "nautical-dusk" => Ok(PhaseKind::NauticalDusk),
            "astro-dusk" | "astronomical-dusk" => Ok(PhaseKind::AstroDusk),
            other => Err(format!("Unknown phase kind '{}'", other)),
        }
    }
}

/// Set of phase kinds selected for a feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PhaseSelection(u8);

impl PhaseSelection {
    pub fn none() -> Self {
        Self(0)
    }

    pub fn all() -> Self {
        PhaseKind::ALL.iter().copied().collect()
    }

    pub fn insert(&mut self, kind: PhaseKind) {
        self.0 |= kind.bit();
    }

    pub fn with(mut self, kind: PhaseKind) -> Self {
        self.insert(kind);
        self
    }

    pub fn contains(&self, kind: PhaseKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = PhaseKind> + '_ {
        PhaseKind::ALL.into_iter().filter(|k| self.contains(*k))
    }

    /// Parse a comma separated list of phase slugs. Unknown entries are
    /// ignored so a stale bookmark still yields the phases it can.
    pub fn parse_list(list: &str) -> Self {
        list.split(',')
            .filter_map(|item| item.parse::<PhaseKind>().ok())
            .collect()
    }
}

impl FromIterator<PhaseKind> for PhaseSelection {
    fn from_iter<I: IntoIterator<Item = PhaseKind>>(iter: I) -> Self {
        let mut selection = PhaseSelection::none();
        for kind in iter {
            selection.insert(kind);
        }
        selection
    }
}

/// An instant of the solar day reported as a zero-length event.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum SolarMoment {
    Sunrise,
    Sunset,
}

impl SolarMoment {
    pub const ALL: [SolarMoment; 2] = [SolarMoment::Sunrise, SolarMoment::Sunset];

    pub fn slug(&self) -> &'static str {
        match self {
            SolarMoment::Sunrise => "sunrise",
            SolarMoment::Sunset => "sunset",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SolarMoment::Sunrise => "Sunrise",
            SolarMoment::Sunset => "Sunset",
        }
    }

    pub fn boundary(&self) -> Boundary {
        match self {
            SolarMoment::Sunrise => Boundary::Sunrise,
            SolarMoment::Sunset => Boundary::Sunset,
        }
    }

    /// The moment marked by `boundary`, if it is one.
    pub fn at(boundary: Boundary) -> Option<Self> {
        match boundary {
            Boundary::Sunrise => Some(SolarMoment::Sunrise),
            Boundary::Sunset => Some(SolarMoment::Sunset),
            _ => None,
        }
    }
}

impl FromStr for SolarMoment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sunrise" => Ok(SolarMoment::Sunrise),
            "sunset" => Ok(SolarMoment::Sunset),
            other => Err(format!("Unknown solar moment '{}'", other)),
        }
    }
}

/// What a feed event reports: a span of one phase or a single moment.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(untagged)]
pub enum EventKind {
    Phase(PhaseKind),
    Moment(SolarMoment),
}

impl EventKind {
    pub fn slug(&self) -> &'static str {
        match self {
            EventKind::Phase(kind) => kind.slug(),
            EventKind::Moment(moment) => moment.slug(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EventKind::Phase(kind) => kind.label(),
            EventKind::Moment(moment) => moment.label(),
        }
    }
}

impl From<PhaseKind> for EventKind {
    fn from(kind: PhaseKind) -> Self {
        EventKind::Phase(kind)
    }
}

impl From<SolarMoment> for EventKind {
    fn from(moment: SolarMoment) -> Self {
        EventKind::Moment(moment)
    }
}

/// Which edge of the day a boundary belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Dawn,
    Dusk,
}

/// A sun-angle crossing separating two adjacent phases.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Boundary {
    AstroDawn,
    NauticalDawn,
    CivilDawn,
    Sunrise,
    Sunset,
    CivilDusk,
    NauticalDusk,
    AstroDusk,
}

impl Boundary {
    /// All boundaries in their natural order within one day.
    pub const ALL: [Boundary; 8] = [
        Boundary::AstroDawn,
        Boundary::NauticalDawn,
        Boundary::CivilDawn,
        Boundary::Sunrise,
        Boundary::Sunset,
        Boundary::CivilDusk,
        Boundary::NauticalDusk,
        Boundary::AstroDusk,
    ];

    /// Phase in effect just before the sun crosses this boundary.
    pub fn phase_before(&self) -> PhaseKind {
        match self {
            Boundary::AstroDawn => PhaseKind::Night,
            Boundary::NauticalDawn => PhaseKind::AstroDawn,
            Boundary::CivilDawn => PhaseKind::NauticalDawn,
            Boundary::Sunrise => PhaseKind::CivilDawn,
            Boundary::Sunset => PhaseKind::Daylight,
            Boundary::CivilDusk => PhaseKind::CivilDusk,
            Boundary::NauticalDusk => PhaseKind::NauticalDusk,
            Boundary::AstroDusk => PhaseKind::AstroDusk,
        }
    }

    /// Phase that begins when the sun crosses this boundary.
    pub fn phase_after(&self) -> PhaseKind {
        match self {
            Boundary::AstroDawn => PhaseKind::AstroDawn,
            Boundary::NauticalDawn => PhaseKind::NauticalDawn,
            Boundary::CivilDawn => PhaseKind::CivilDawn,
            Boundary::Sunrise => PhaseKind::Daylight,
            Boundary::Sunset => PhaseKind::CivilDusk,
            Boundary::CivilDusk => PhaseKind::NauticalDusk,
            Boundary::NauticalDusk => PhaseKind::AstroDusk,
            Boundary::AstroDusk => PhaseKind::Night,
        }
    }

    pub fn side(&self) -> Side {
        match self {
            Boundary::AstroDawn
            | Boundary::NauticalDawn
            | Boundary::CivilDawn
            | Boundary::Sunrise => Side::Dawn,
            Boundary::Sunset
            | Boundary::CivilDusk
            | Boundary::NauticalDusk
            | Boundary::AstroDusk => Side::Dusk,
        }
    }
}
