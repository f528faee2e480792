//! iCalendar (RFC 5545) serialization of feed events.

use chrono::{DateTime, Utc};

use crate::services::FeedEvent;

pub const PRODUCT_ID: &str = "-//Twilight Feed//Twilight Calendar//EN";

/// Longest content line, in octets, before folding.
const MAX_LINE_OCTETS: usize = 75;

/// Calendar-level properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarMeta {
    /// Display name (`X-WR-CALNAME`)
    pub name: String,
    /// IANA zone the events were computed in (`X-WR-TIMEZONE`)
    pub timezone: String,
    /// Suggested client refresh interval in seconds
    pub refresh_secs: u64,
}

impl CalendarMeta {
    pub fn new(name: impl Into<String>, timezone: impl Into<String>, refresh_secs: u64) -> Self {
        Self {
            name: name.into(),
            timezone: timezone.into(),
            refresh_secs,
        }
    }
}

/// Render `events` as a complete `VCALENDAR` document with CRLF line endings.
///
/// Output depends only on the arguments: `DTSTAMP` is the event's natural
/// start rather than the wall clock, so an unchanged feed renders to the
/// same bytes on every refresh.
pub fn render(events: &[FeedEvent], meta: &CalendarMeta) -> String {
    let mut out = String::with_capacity(256 + events.len() * 512);

    push_line(&mut out, "BEGIN:VCALENDAR");
    push_line(&mut out, "VERSION:2.0");
    push_line(&mut out, &format!("PRODID:{}", PRODUCT_ID));
    push_line(&mut out, "CALSCALE:GREGORIAN");
    push_line(&mut out, "METHOD:PUBLISH");
    push_line(&mut out, &format!("X-WR-CALNAME:{}", escape_text(&meta.name)));
    push_line(&mut out, &format!("X-WR-TIMEZONE:{}", meta.timezone));
    push_line(
        &mut out,
        &format!("REFRESH-INTERVAL;VALUE=DURATION:PT{}S", meta.refresh_secs),
    );
    push_line(&mut out, &format!("X-PUBLISHED-TTL:PT{}S", meta.refresh_secs));

    for event in events {
        push_line(&mut out, "BEGIN:VEVENT");
        push_line(&mut out, &format!("UID:{}", event.uid));
        push_line(&mut out, &format!("DTSTAMP:{}", utc_stamp(event.natural_start)));
        push_line(&mut out, &format!("DTSTART:{}", utc_stamp(event.start)));
        push_line(&mut out, &format!("DTEND:{}", utc_stamp(event.end)));
        push_line(&mut out, &format!("SUMMARY:{}", escape_text(&event.summary)));
        push_line(
            &mut out,
            &format!("DESCRIPTION:{}", escape_text(&event.description)),
        );
        push_line(&mut out, &format!("CATEGORIES:{}", event.kind.slug()));
        push_line(&mut out, "TRANSP:TRANSPARENT");
        push_line(&mut out, "END:VEVENT");
    }

    push_line(&mut out, "END:VCALENDAR");
    out
}

/// `20250621T123000Z`
pub fn utc_stamp(instant: DateTime<Utc>) -> String {
    instant.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Escape a TEXT value: backslash, semicolon, comma and line breaks.
pub fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                escaped.push_str("\\n");
            }
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Fold a content line so no physical line exceeds 75 octets.
///
/// Continuation lines start with a single space. Breaks fall on character
/// boundaries, so multi-byte UTF-8 sequences are never split.
pub fn fold_line(line: &str) -> String {
    if line.len() <= MAX_LINE_OCTETS {
        return line.to_string();
    }

    let mut folded = String::with_capacity(line.len() + line.len() / MAX_LINE_OCTETS * 3);
    let mut used = 0;
    let mut limit = MAX_LINE_OCTETS;
    for c in line.chars() {
        let width = c.len_utf8();
        if used + width > limit {
            folded.push_str("\r\n ");
            used = 0;
            // The leading space counts toward the next line
            limit = MAX_LINE_OCTETS - 1;
        }
        folded.push(c);
        used += width;
    }
    folded
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(&fold_line(line));
    out.push_str("\r\n");
}
