use crate::{Result, ScrapeError, Showtime};

/// Boilerplate the upstream appends to every bookable slot.
const CALL_TO_ACTION: &str = "Get Tickets";
/// Separates slots inside one showtime blob.
const SLOT_DELIMITER: char = '|';

/// Parse a raw showtime blob ("10:00 am Get Tickets | 1:30 pm ...") into
/// normalized 24-hour times.
///
/// The upstream marks AM/PM once per contiguous run of times, not per time:
/// a "pm" at the end of a slot flips an hour offset of 12 for that slot and
/// every slot after it in the same blob. The offset never resets mid-blob,
/// and a late "pm" cannot retroactively promote earlier slots. Hour 12 with
/// no offset in play is midnight.
pub fn parse_showtime_blob(raw: &str) -> Result<Vec<Showtime>> {
    let cleaned = raw.replace(CALL_TO_ACTION, "");
    let mut pm_offset = 0u32;
    let mut times = Vec::new();

    for slot in cleaned.split(SLOT_DELIMITER) {
        let slot = slot.trim();
        if slot.is_empty() {
            continue;
        }
        if slot.ends_with("pm") {
            pm_offset = 12;
        }

        // Everything after the first space is trailing text ("am", hall
        // codes, ...); the leading token is the H:MM pair.
        let token = slot.split(' ').next().unwrap_or(slot);
        let (hour, minute) = parse_clock_token(token, raw)?;

        let hour = if hour == 12 && pm_offset == 0 {
            0
        } else if hour < 12 {
            hour + pm_offset
        } else {
            hour
        };

        times.push(Showtime { hour, minute });
    }

    Ok(times)
}

/// Parse "H:MM" on the upstream's 12-hour clock (hour 1..=12).
fn parse_clock_token(token: &str, blob: &str) -> Result<(u32, u32)> {
    let parsed = token.split_once(':').and_then(|(h, m)| {
        let hour: u32 = h.parse().ok()?;
        let minute: u32 = m.parse().ok()?;
        ((1..=12).contains(&hour) && minute <= 59).then_some((hour, minute))
    });
    parsed.ok_or_else(|| ScrapeError::Showtime {
        text: blob.to_string(),
    })
}
