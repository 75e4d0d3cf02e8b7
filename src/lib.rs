use chrono_tz::Tz;
use serde::Serialize;

pub mod error;
pub mod events;
pub mod fetch;
pub mod ics;
pub mod listing;
pub mod metadata;
pub mod pipeline;
pub mod showtimes;

pub use error::{Result, ScrapeError};

/// Base URL of the movie-database site the showtime listings come from.
pub const BASE_URL: &str = "https://www.imdb.com";

/// One physical cinema: static configuration plus the address picked up
/// from its first listing page.
#[derive(Debug, Clone)]
pub struct Venue {
    pub name: String,
    /// Opaque upstream cinema identifier (e.g. "ci0013904").
    pub id: String,
    pub timezone: Tz,
    pub address: Option<String>,
}

impl Venue {
    pub fn new(name: &str, id: &str, timezone: Tz) -> Self {
        Self {
            name: name.to_string(),
            id: id.to_string(),
            timezone,
            address: None,
        }
    }
}

/// Serializable venue record for the per-run configuration echo.
#[derive(Debug, Clone, Serialize)]
pub struct VenueRecord {
    pub name: String,
    pub id: String,
    pub timezone: String,
    pub address: Option<String>,
}

impl From<&Venue> for VenueRecord {
    fn from(venue: &Venue) -> Self {
        Self {
            name: venue.name.clone(),
            id: venue.id.clone(),
            timezone: venue.timezone.name().to_string(),
            address: venue.address.clone(),
        }
    }
}

/// Film metadata from the title-detail page, cached per run.
#[derive(Debug, Clone)]
pub struct TitleMetadata {
    pub name: String,
    pub synopsis: Option<String>,
    pub url: String,
    pub rating: Option<f64>,
}

/// One film row from a day's listing page.
#[derive(Debug, Clone)]
pub struct FilmEntry {
    /// Title text with any "(<year>)" suffix stripped.
    pub title: String,
    /// Upstream title identifier; None when the row has no title page link.
    pub title_id: Option<String>,
    pub runtime_min: u32,
    pub groups: Vec<ShowtimeGroup>,
}

/// A labeled cluster of showtime slots for one film on one day.
#[derive(Debug, Clone)]
pub struct ShowtimeGroup {
    /// Format qualifier ("IMAX", "3D", ...), empty for the plain group.
    pub suffix: String,
    /// Raw showtime text, parsed later by the showtime parser.
    pub raw_times: String,
}

/// Normalized date-independent time of day, 24-hour clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Showtime {
    pub hour: u32,
    pub minute: u32,
}

/// One screening, ready to be written as a VEVENT.
#[derive(Debug, Clone)]
pub struct CalendarEvent {
    pub uid: String,
    pub summary: String,
    pub location: String,
    pub start: chrono::DateTime<Tz>,
    pub end: chrono::DateTime<Tz>,
    pub description: String,
}

/// All events for one venue over the day window; written as one .ics file.
#[derive(Debug, Clone)]
pub struct VenueFeed {
    pub venue_name: String,
    pub venue_id: String,
    pub events: Vec<CalendarEvent>,
}
