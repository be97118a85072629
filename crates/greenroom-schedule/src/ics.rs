//! iCalendar serialization for booking confirmations (RFC 5545 subset).
//!
//! Emits a single-event VCALENDAR: UTC date-times, escaped text values, and
//! content lines folded at 75 octets.

use chrono::{DateTime, Utc};

/// Maximum content line length in octets before folding.
const MAX_LINE_OCTETS: usize = 75;

const PRODID: &str = "-//Greenroom//Scheduler//EN";

/// A confirmed appointment, ready to serialize.
#[derive(Debug, Clone)]
pub struct IcsEvent {
    pub uid: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub summary: String,
    pub description: String,
}

/// ## Summary
/// Serializes `event` into a VCALENDAR document with CRLF line endings.
///
/// `dtstamp` is passed in rather than read from the clock so output is a
/// pure function of its inputs.
#[must_use]
pub fn build_ics(event: &IcsEvent, dtstamp: DateTime<Utc>) -> String {
    let lines = [
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        format!("PRODID:{PRODID}"),
        "CALSCALE:GREGORIAN".to_string(),
        "METHOD:PUBLISH".to_string(),
        "BEGIN:VEVENT".to_string(),
        format!("UID:{}", escape_text(&event.uid)),
        format!("DTSTAMP:{}", format_ics_utc(dtstamp)),
        format!("DTSTART:{}", format_ics_utc(event.start)),
        format!("DTEND:{}", format_ics_utc(event.end)),
        format!("SUMMARY:{}", escape_text(&event.summary)),
        format!("DESCRIPTION:{}", escape_text(&event.description)),
        "END:VEVENT".to_string(),
        "END:VCALENDAR".to_string(),
    ];

    let mut out = String::new();
    for line in &lines {
        out.push_str(&fold_line(line));
        out.push_str("\r\n");
    }
    out
}

/// Formats an instant as an RFC 5545 UTC date-time (`YYYYMMDDTHHMMSSZ`).
#[must_use]
pub fn format_ics_utc(instant: DateTime<Utc>) -> String {
    instant.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Escapes a text value per RFC 5545: backslash, semicolon, comma, and
/// newline become escape sequences.
#[must_use]
pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            other => out.push(other),
        }
    }
    out
}

/// Folds a content line at 75 octets.
///
/// Continuation lines are prefixed with a single space and the fold never
/// splits a UTF-8 character.
#[must_use]
pub fn fold_line(line: &str) -> String {
    if line.len() <= MAX_LINE_OCTETS {
        return line.to_string();
    }

    let mut result = String::with_capacity(line.len() + line.len() / MAX_LINE_OCTETS * 3);
    let mut current_len = 0;
    let mut first_segment = true;

    for c in line.chars() {
        let char_len = c.len_utf8();

        // Continuation lines lose one octet to the leading space
        let effective_max = if first_segment {
            MAX_LINE_OCTETS
        } else {
            MAX_LINE_OCTETS - 1
        };

        if current_len + char_len > effective_max {
            result.push_str("\r\n ");
            current_len = 1;
            first_segment = false;
        }

        result.push(c);
        current_len += char_len;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_event() -> IcsEvent {
        IcsEvent {
            uid: "0192d7a8-booking@booking.example.com".to_string(),
            start: Utc.with_ymd_and_hms(2026, 8, 11, 14, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2026, 8, 11, 14, 30, 0).unwrap(),
            summary: "Podcast Recording".to_string(),
            description: "Guest: Ada Lovelace\nEmail: ada@example.com".to_string(),
        }
    }

    #[test]
    fn test_format_ics_utc() {
        let instant = Utc.with_ymd_and_hms(2026, 8, 11, 14, 0, 0).unwrap();
        assert_eq!(format_ics_utc(instant), "20260811T140000Z");
    }

    #[test]
    fn test_escape_text_special_characters() {
        assert_eq!(escape_text("a;b,c\\d"), "a\\;b\\,c\\\\d");
        assert_eq!(escape_text("line one\nline two"), "line one\\nline two");
        assert_eq!(escape_text("plain"), "plain");
    }

    #[test]
    fn test_short_line_unchanged() {
        let line = "SUMMARY:Podcast Recording";
        assert_eq!(fold_line(line), line);
    }

    #[test]
    fn test_fold_at_75_octets() {
        let line = format!("DESCRIPTION:{}", "x".repeat(100));
        let folded = fold_line(&line);
        assert!(folded.contains("\r\n "));

        let first_line: String = folded.chars().take_while(|&c| c != '\r').collect();
        assert_eq!(first_line.len(), 75);
    }

    #[test]
    fn test_fold_respects_utf8() {
        let line = format!("DESCRIPTION:{}", "é".repeat(60));
        let folded = fold_line(&line);

        for part in folded.split("\r\n ") {
            assert!(part.is_char_boundary(part.len()));
        }
    }

    #[test]
    fn test_build_ics_document_shape() {
        let event = sample_event();
        let dtstamp = Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap();
        let ics = build_ics(&event, dtstamp);

        assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
        assert!(ics.contains("DTSTAMP:20260801T120000Z\r\n"));
        assert!(ics.contains("DTSTART:20260811T140000Z\r\n"));
        assert!(ics.contains("DTEND:20260811T143000Z\r\n"));
        assert!(ics.contains("SUMMARY:Podcast Recording\r\n"));
        assert!(ics.contains("Guest: Ada Lovelace\\nEmail: ada@example.com"));
    }

    #[test]
    fn test_build_ics_is_deterministic() {
        let event = sample_event();
        let dtstamp = Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap();
        assert_eq!(build_ics(&event, dtstamp), build_ics(&event, dtstamp));
    }
}
