use chrono::{DateTime, Utc};

use crate::VenueFeed;
use crate::events::slugify;

const PRODID: &str = "-//cinecal//showtime feeds//EN";

/// Render a venue feed as an RFC 5545 calendar document.
///
/// `generated_at` is captured once per run and stamps both the calendar's
/// LAST-MODIFIED and every event's DTSTAMP.
pub fn generate_ics(feed: &VenueFeed, generated_at: DateTime<Utc>) -> String {
    let mut out = String::new();
    let stamp = generated_at.format("%Y%m%dT%H%M%SZ").to_string();

    push_line(&mut out, "BEGIN:VCALENDAR");
    push_line(&mut out, "VERSION:2.0");
    push_line(&mut out, &format!("PRODID:{PRODID}"));
    push_line(&mut out, "CALSCALE:GREGORIAN");
    push_line(&mut out, &format!("X-WR-CALNAME:{}", escape_text(&feed.venue_name)));
    push_line(&mut out, &format!("LAST-MODIFIED:{stamp}"));

    for event in &feed.events {
        let tzid = event.start.timezone().name();
        push_line(&mut out, "BEGIN:VEVENT");
        push_line(&mut out, &format!("UID:{}", event.uid));
        push_line(&mut out, &format!("DTSTAMP:{stamp}"));
        push_line(
            &mut out,
            &format!("DTSTART;TZID={tzid}:{}", event.start.format("%Y%m%dT%H%M%S")),
        );
        push_line(
            &mut out,
            &format!("DTEND;TZID={tzid}:{}", event.end.format("%Y%m%dT%H%M%S")),
        );
        push_line(&mut out, &format!("SUMMARY:{}", escape_text(&event.summary)));
        push_line(&mut out, &format!("LOCATION:{}", escape_text(&event.location)));
        push_line(
            &mut out,
            &format!("DESCRIPTION:{}", escape_text(&event.description)),
        );
        push_line(&mut out, "END:VEVENT");
    }

    push_line(&mut out, "END:VCALENDAR");
    out
}

/// Output filename for a venue feed ("aero-theatre.ics").
pub fn feed_filename(venue_name: &str) -> String {
    format!("{}.ics", slugify(venue_name))
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push_str("\r\n");
}

/// TEXT value escaping per RFC 5545 §3.3.11.
fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CalendarEvent;
    use chrono::TimeZone;

    fn feed() -> VenueFeed {
        let tz = chrono_tz::America::Los_Angeles;
        VenueFeed {
            venue_name: "Aero Theatre".to_string(),
            venue_id: "ci0013904".to_string(),
            events: vec![CalendarEvent {
                uid: "ci0013904-tt0000001--2026-08-30-19-30".to_string(),
                summary: "Anchored".to_string(),
                location: "Aero Theatre, 1328 Montana Ave".to_string(),
                start: tz.with_ymd_and_hms(2026, 8, 30, 19, 30, 0).unwrap(),
                end: tz.with_ymd_and_hms(2026, 8, 30, 21, 30, 0).unwrap(),
                description: "1h 37m (97 mins)\nhttps://example.com".to_string(),
            }],
        }
    }

    #[test]
    fn renders_calendar_and_event_fields() {
        let stamp = Utc.with_ymd_and_hms(2026, 8, 30, 12, 0, 0).unwrap();
        let ics = generate_ics(&feed(), stamp);

        assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
        assert!(ics.contains("X-WR-CALNAME:Aero Theatre\r\n"));
        assert!(ics.contains("LAST-MODIFIED:20260830T120000Z\r\n"));
        assert!(ics.contains("UID:ci0013904-tt0000001--2026-08-30-19-30\r\n"));
        assert!(ics.contains("DTSTAMP:20260830T120000Z\r\n"));
        assert!(ics.contains("DTSTART;TZID=America/Los_Angeles:20260830T193000\r\n"));
        assert!(ics.contains("DTEND;TZID=America/Los_Angeles:20260830T213000\r\n"));
        // Commas in the location and newlines in the description are escaped.
        assert!(ics.contains("LOCATION:Aero Theatre\\, 1328 Montana Ave\r\n"));
        assert!(ics.contains("DESCRIPTION:1h 37m (97 mins)\\nhttps://example.com\r\n"));
    }

    #[test]
    fn escaping() {
        assert_eq!(escape_text("a,b;c\\d\ne"), "a\\,b\\;c\\\\d\\ne");
    }

    #[test]
    fn feed_filenames_are_slugs() {
        assert_eq!(feed_filename("Aero Theatre"), "aero-theatre.ics");
    }
}
