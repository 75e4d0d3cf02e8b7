use chrono::{Duration, NaiveDate};

use crate::fetch::PageFetcher;
use crate::metadata::TitleResolver;
use crate::{BASE_URL, Result, Venue, VenueFeed, events, listing, showtimes};

/// Outcome of one venue's run, for the end-of-run report.
pub struct VenueReport {
    pub venue_name: String,
    pub result: Result<VenueFeed>,
}

pub fn listing_url(venue: &Venue, date: NaiveDate) -> String {
    format!(
        "{BASE_URL}/showtimes/cinema/{}/{}",
        venue.id,
        date.format("%Y-%m-%d")
    )
}

/// Run one venue across the day window: fetch and parse each day's listing
/// page, resolve title metadata, and synthesize one event per showtime.
///
/// The first day's page also supplies the venue address. Any fetch or parse
/// failure aborts this venue's run; no partial feed is returned.
pub async fn run_venue(
    fetcher: &dyn PageFetcher,
    resolver: &mut TitleResolver,
    venue: &mut Venue,
    start_date: NaiveDate,
    days: u32,
) -> Result<VenueFeed> {
    let mut events = Vec::new();

    for offset in 0..days {
        let date = start_date + Duration::days(i64::from(offset));
        let body = fetcher.get_text(&listing_url(venue, date)).await?;

        if offset == 0 && venue.address.is_none() {
            venue.address = listing::extract_address(&body)?;
        }

        let entries = listing::parse_listing(&body, date)?;
        for entry in &entries {
            // Resolve eagerly: this warms the cache once per title even when
            // a row carries no showtimes today.
            let metadata = match &entry.title_id {
                Some(id) => Some(resolver.resolve(fetcher, id).await?.clone()),
                None => None,
            };

            for group in &entry.groups {
                for time in showtimes::parse_showtime_blob(&group.raw_times)? {
                    events.push(events::synthesize(
                        entry,
                        group,
                        time,
                        date,
                        venue,
                        metadata.as_ref(),
                    )?);
                }
            }
        }
    }

    Ok(VenueFeed {
        venue_name: venue.name.clone(),
        venue_id: venue.id.clone(),
        events,
    })
}

/// Run every venue sequentially. A venue whose fetch budget is exhausted is
/// reported as failed and the run moves on to the next one.
pub async fn run_all(
    fetcher: &dyn PageFetcher,
    resolver: &mut TitleResolver,
    venues: &mut [Venue],
    start_date: NaiveDate,
    days: u32,
) -> Vec<VenueReport> {
    let mut reports = Vec::new();
    for venue in venues.iter_mut() {
        let result = run_venue(fetcher, resolver, venue, start_date, days).await;
        reports.push(VenueReport {
            venue_name: venue.name.clone(),
            result,
        });
    }
    reports
}
