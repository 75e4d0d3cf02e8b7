use chrono::{Datelike, Duration, NaiveDate, TimeZone};

use crate::{
    CalendarEvent, FilmEntry, Result, ScrapeError, Showtime, ShowtimeGroup, TitleMetadata, Venue,
};

/// Fixed buffer after the runtime (trailers, cleanup) when computing DTEND.
pub const SCHEDULE_PADDING_MIN: u32 = 20;

/// Combine one film entry, one showtime and the venue into a calendar event.
///
/// The uid is derived only from (venue, title, suffix, date, time), so
/// re-running against unchanged upstream data reproduces it byte for byte.
pub fn synthesize(
    entry: &FilmEntry,
    group: &ShowtimeGroup,
    time: Showtime,
    date: NaiveDate,
    venue: &Venue,
    metadata: Option<&TitleMetadata>,
) -> Result<CalendarEvent> {
    let uid = format!(
        "{}-{}-{}-{:04}-{:02}-{:02}-{:02}-{:02}",
        venue.id,
        entry.title_id.as_deref().unwrap_or(""),
        slugify(&group.suffix),
        date.year(),
        date.month(),
        date.day(),
        time.hour,
        time.minute,
    );

    let start = venue
        .timezone
        .with_ymd_and_hms(date.year(), date.month(), date.day(), time.hour, time.minute, 0)
        .earliest()
        .ok_or_else(|| ScrapeError::LocalTime {
            venue: venue.name.clone(),
            when: format!("{date} {:02}:{:02}", time.hour, time.minute),
        })?;
    let block_min = SCHEDULE_PADDING_MIN + round_up_to_five(entry.runtime_min);
    let end = start + Duration::minutes(i64::from(block_min));

    let summary = if group.suffix.is_empty() {
        entry.title.clone()
    } else {
        format!("{} ({})", entry.title, group.suffix)
    };

    let location = match &venue.address {
        Some(address) => format!("{}, {}", venue.name, address),
        None => venue.name.clone(),
    };

    Ok(CalendarEvent {
        uid,
        summary,
        location,
        start,
        end,
        description: build_description(entry.runtime_min, metadata),
    })
}

/// Description body: duration line, then synopsis / canonical URL / rating,
/// each silently omitted when its source field is absent.
fn build_description(runtime_min: u32, metadata: Option<&TitleMetadata>) -> String {
    let mut lines = vec![format!(
        "{}h {:02}m ({} mins)",
        runtime_min / 60,
        runtime_min % 60,
        runtime_min
    )];
    if let Some(meta) = metadata {
        if let Some(synopsis) = &meta.synopsis {
            lines.push(synopsis.clone());
        }
        lines.push(meta.url.clone());
        if let Some(rating) = meta.rating {
            lines.push(format!("Rating: {rating}/10"));
        }
    }
    lines.join("\n")
}

/// Round minutes up to the next multiple of 5.
pub fn round_up_to_five(minutes: u32) -> u32 {
    minutes.div_ceil(5) * 5
}

/// Lowercase, alphanumerics kept, everything else collapsed to single '-'.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}
