//! Human readable text for calendar events.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::models::{PhaseKind, SolarMoment, SECONDS_PER_DAY};

/// Clock style for times shown in event text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DisplayFormat {
    /// `21:30`
    #[default]
    TwentyFourHour,
    /// `9:30 PM`
    TwelveHour,
}

impl DisplayFormat {
    pub fn from_twelve_hour(twelve_hour: bool) -> Self {
        if twelve_hour {
            DisplayFormat::TwelveHour
        } else {
            DisplayFormat::TwentyFourHour
        }
    }

    fn pattern(&self) -> &'static str {
        match self {
            DisplayFormat::TwentyFourHour => "%H:%M",
            DisplayFormat::TwelveHour => "%-I:%M %p",
        }
    }
}

/// Computed figures shown in an event description.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseFigures {
    pub duration_secs: i64,
    pub day_percent: f64,
    pub percentile: Option<f64>,
    pub year: i32,
}

/// Renders summaries and descriptions on the wall clock of one timezone.
#[derive(Debug, Clone, Copy)]
pub struct EventText {
    tz: Tz,
    format: DisplayFormat,
}

impl EventText {
    pub fn new(tz: Tz, format: DisplayFormat) -> Self {
        Self { tz, format }
    }

    pub fn clock(&self, instant: DateTime<Utc>) -> String {
        instant
            .with_timezone(&self.tz)
            .format(self.format.pattern())
            .to_string()
    }

    /// One-line title, e.g. `Daylight: 05:30 - 21:30`.
    pub fn summary(&self, kind: PhaseKind, start: DateTime<Utc>, end: DateTime<Utc>) -> String {
        format!("{}: {} - {}", kind.label(), self.clock(start), self.clock(end))
    }

    /// Title of a zero-length event, e.g. `Sunset: 9:30 PM`.
    pub fn moment_summary(&self, moment: SolarMoment, at: DateTime<Utc>) -> String {
        format!("{}: {}", moment.label(), self.clock(at))
    }

    pub fn moment_description(&self, moment: SolarMoment, at: DateTime<Utc>, note: &str) -> String {
        let mut text = format!("{} at {} ({}).", moment.label(), self.clock(at), self.tz.name());
        let note = note.trim();
        if !note.is_empty() {
            text.push_str("\n\n");
            text.push_str(note);
        }
        text
    }

    /// Multi-line event body with duration, share of the day, the yearly
    /// ranking for daylight and night, and the user's own note.
    pub fn description(
        &self,
        kind: PhaseKind,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        figures: &PhaseFigures,
        note: &str,
    ) -> String {
        let mut lines = vec![
            format!(
                "{} from {} to {} ({}).",
                kind.label(),
                self.clock(start),
                self.clock(end),
                self.tz.name()
            ),
            format!(
                "Duration: {} ({:.1}% of the day).",
                format_duration(figures.duration_secs),
                figures.day_percent
            ),
        ];

        if let Some(percentile) = figures.percentile {
            let noun = if kind == PhaseKind::Night { "nights" } else { "days" };
            lines.push(format!(
                "Longer than {:.1}% of {} in {} at this location.",
                percentile, noun, figures.year
            ));
        }

        if let Some(about) = explanation(kind) {
            lines.push(about.to_string());
        }

        let note = note.trim();
        if !note.is_empty() {
            lines.push(String::new());
            lines.push(note.to_string());
        }

        lines.join("\n")
    }
}

/// `16h 00m`.
pub fn format_duration(secs: i64) -> String {
    let minutes = secs.max(0) / 60;
    format!("{}h {:02}m", minutes / 60, minutes % 60)
}

/// Share of a nominal 86 400 s day, rounded to one decimal.
pub fn day_percent(secs: i64) -> f64 {
    super::year_stats::round1(secs as f64 / SECONDS_PER_DAY as f64 * 100.0)
}

fn explanation(kind: PhaseKind) -> Option<&'static str> {
    match kind {
        PhaseKind::AstroDawn | PhaseKind::AstroDusk => {
            Some("Astronomical twilight: the sun is 12° to 18° below the horizon.")
        }
        PhaseKind::NauticalDawn | PhaseKind::NauticalDusk => {
            Some("Nautical twilight: the sun is 6° to 12° below the horizon.")
        }
        PhaseKind::CivilDawn | PhaseKind::CivilDusk => {
            Some("Civil twilight: the sun is up to 6° below the horizon.")
        }
        PhaseKind::Daylight | PhaseKind::Night => None,
    }
}
