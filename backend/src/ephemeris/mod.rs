//! Solar ephemeris oracle.
//!
//! The engine never computes solar positions itself. It asks a
//! [`SolarEphemerisProvider`] for the crossing instants of one local day and
//! treats the answer as ground truth. Production uses [`SpaEphemerisProvider`];
//! tests and benchmarks use the deterministic providers in [`fixture`].
//!
//! ```text
//! FeedAssembler ──► EphemerisCache (per request) ──► dyn SolarEphemerisProvider
//! YearStatsCache ─► EphemerisCache (per build)   ──┘
//! ```

use chrono::NaiveDate;
use chrono_tz::Tz;

use crate::models::{Coordinate, DayEphemeris};

pub mod cache;
pub mod fixture;
pub mod provider;

pub use cache::EphemerisCache;
pub use provider::SpaEphemerisProvider;

/// Error raised by an oracle that cannot resolve a day.
///
/// Callers never propagate it: [`EphemerisCache`] downgrades it to an
/// all-absent [`DayEphemeris`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EphemerisError {
    #[error("Ephemeris unavailable for {date}: {message}")]
    Unavailable { date: NaiveDate, message: String },
}

impl EphemerisError {
    pub fn unavailable(date: NaiveDate, message: impl Into<String>) -> Self {
        Self::Unavailable {
            date,
            message: message.into(),
        }
    }
}

/// Source of solar crossing instants.
///
/// Implementations must be side-effect free and return the same answer for
/// the same arguments.
pub trait SolarEphemerisProvider: Send + Sync {
    /// Crossings for the local calendar `date` in `tz` at `coordinate`.
    fn crossings(
        &self,
        date: NaiveDate,
        tz: Tz,
        coordinate: &Coordinate,
    ) -> Result<DayEphemeris, EphemerisError>;
}

impl<P: SolarEphemerisProvider + ?Sized> SolarEphemerisProvider for std::sync::Arc<P> {
    fn crossings(
        &self,
        date: NaiveDate,
        tz: Tz,
        coordinate: &Coordinate,
    ) -> Result<DayEphemeris, EphemerisError> {
        (**self).crossings(date, tz, coordinate)
    }
}
