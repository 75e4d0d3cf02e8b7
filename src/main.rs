use std::error::Error;
use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use clap::Parser;

use cinecal::fetch::HttpFetcher;
use cinecal::metadata::TitleResolver;
use cinecal::{Venue, VenueRecord, ics, pipeline};

/// Scrape upcoming showtimes and write one iCalendar feed per venue.
#[derive(Parser)]
#[command(name = "cinecal")]
struct Args {
    /// Days of listings to cover, starting today.
    #[arg(long, default_value_t = 7)]
    days: u32,
    /// Directory the .ics feeds and venues.json are written to.
    #[arg(long, default_value = "docs/feeds")]
    out_dir: PathBuf,
}

/// Static venue configuration: display name, upstream cinema id, IANA zone.
fn configured_venues() -> Result<Vec<Venue>, Box<dyn Error>> {
    let table = [
        ("Aero Theatre", "ci0013904", "America/Los_Angeles"),
        ("Music Box Theatre", "ci0007191", "America/Chicago"),
        ("Vista Theatre", "ci0021468", "America/Los_Angeles"),
    ];

    let mut venues = Vec::new();
    for (name, id, zone) in table {
        let timezone = zone
            .parse()
            .map_err(|e| format!("bad timezone {zone} for {name}: {e}"))?;
        venues.push(Venue::new(name, id, timezone));
    }
    Ok(venues)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let mut venues = configured_venues()?;

    let fetcher = HttpFetcher::new()?;
    let mut resolver = TitleResolver::new();
    let start_date = chrono::Local::now().date_naive();
    let generated_at = Utc::now();

    fs::create_dir_all(&args.out_dir)?;

    let reports =
        pipeline::run_all(&fetcher, &mut resolver, &mut venues, start_date, args.days).await;

    for report in &reports {
        match &report.result {
            Ok(feed) => {
                let path = args.out_dir.join(ics::feed_filename(&feed.venue_name));
                fs::write(&path, ics::generate_ics(feed, generated_at))?;
                if feed.events.is_empty() {
                    println!(
                        "{}: no showtimes found over {} day(s)",
                        report.venue_name, args.days
                    );
                } else {
                    println!(
                        "{}: {} events -> {}",
                        report.venue_name,
                        feed.events.len(),
                        path.display()
                    );
                }
            }
            Err(e) => eprintln!("{} failed: {e}", report.venue_name),
        }
    }

    // Configuration echo: every configured venue, enriched address included,
    // sorted by name.
    let mut records: Vec<VenueRecord> = venues.iter().map(VenueRecord::from).collect();
    records.sort_by(|a, b| a.name.cmp(&b.name));
    fs::write(
        args.out_dir.join("venues.json"),
        serde_json::to_string_pretty(&records)?,
    )?;

    Ok(())
}
