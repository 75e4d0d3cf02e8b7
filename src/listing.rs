use chrono::{Datelike, NaiveDate};
use scraper::{ElementRef, Html, Node, Selector};

use crate::{FilmEntry, Result, ScrapeError, ShowtimeGroup};

/// Runtime assumed when a row carries no parseable duration attribute.
pub const DEFAULT_RUNTIME_MIN: u32 = 120;

fn sel(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| ScrapeError::Selector(e.to_string()))
}

/// Parse one day's listing page into film entries.
///
/// Rows look like:
///   <div class="list_item">
///     <h3 itemprop="name"><a href="/title/tt.../?ref_=...">Title (2026)</a></h3>
///     <time datetime="PT97M">1h 37min</time>
///     <div class="showtimes">
///       <h5>Showtimes:</h5> 10:00 am Get Tickets | ...
///       <h5>IMAX Showtimes:</h5> ...
///     </div>
///   </div>
///
/// Rows whose title has no hyperlink (film not on the provider) are skipped
/// without failing the page.
pub fn parse_listing(body: &str, date: NaiveDate) -> Result<Vec<FilmEntry>> {
    let document = Html::parse_document(body);
    let row_sel = sel("div.list_item")?;
    let title_link_sel = sel("h3[itemprop=\"name\"] a[href]")?;
    let runtime_sel = sel("time[datetime]")?;
    let times_sel = sel("div.showtimes")?;

    let mut entries = Vec::new();

    for row in document.select(&row_sel) {
        let link = match row.select(&title_link_sel).next() {
            Some(a) => a,
            None => continue,
        };

        let raw_title = link
            .text()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        let title = strip_year_suffix(&raw_title, date.year());

        let title_id = link.value().attr("href").and_then(title_id_from_href);
        if title_id.is_none() {
            continue;
        }

        let runtime_min = row
            .select(&runtime_sel)
            .next()
            .and_then(|t| t.value().attr("datetime"))
            .and_then(parse_runtime)
            .unwrap_or(DEFAULT_RUNTIME_MIN);

        let mut groups = Vec::new();
        for container in row.select(&times_sel) {
            collect_showtime_groups(container, &mut groups);
        }

        entries.push(FilmEntry {
            title,
            title_id,
            runtime_min,
            groups,
        });
    }

    Ok(entries)
}

/// Extract the venue's postal address from the listing page description
/// block: text nodes up to, but excluding, the first "|" delimiter.
pub fn extract_address(body: &str) -> Result<Option<String>> {
    let document = Html::parse_document(body);
    let block = match document.select(&sel("div.description")?).next() {
        Some(el) => el,
        None => return Ok(None),
    };

    let mut parts = Vec::new();
    for text in block.text() {
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        if let Some(idx) = text.find('|') {
            let head = text[..idx].trim();
            if !head.is_empty() {
                parts.push(head.to_string());
            }
            break;
        }
        parts.push(text.to_string());
    }

    Ok((!parts.is_empty()).then(|| parts.join(", ")))
}

/// Walk the children of a showtimes container: each <h5> heading starts a
/// new group, the text nodes after it are that group's raw blob. Text before
/// any heading lands in a group with an empty suffix.
fn collect_showtime_groups(container: ElementRef<'_>, groups: &mut Vec<ShowtimeGroup>) {
    let mut suffix = String::new();
    let mut blob = String::new();

    for child in container.children() {
        match child.value() {
            Node::Element(el) if el.name() == "h5" => {
                push_group(groups, &suffix, &blob);
                blob.clear();
                suffix = ElementRef::wrap(child)
                    .map(|h| clean_group_suffix(&h.text().collect::<String>()))
                    .unwrap_or_default();
            }
            Node::Text(text) => blob.push_str(text),
            _ => {}
        }
    }
    push_group(groups, &suffix, &blob);
}

fn push_group(groups: &mut Vec<ShowtimeGroup>, suffix: &str, blob: &str) {
    let blob = blob.trim();
    if !blob.is_empty() {
        groups.push(ShowtimeGroup {
            suffix: suffix.to_string(),
            raw_times: blob.to_string(),
        });
    }
}

/// "IMAX Showtimes:" -> "IMAX", "Showtimes:" -> "".
fn clean_group_suffix(heading: &str) -> String {
    heading
        .replace("Showtimes", "")
        .trim_matches(|c: char| c == ':' || c.is_whitespace())
        .to_string()
}

/// Drop a trailing "(<year>)" for the current or previous year, the
/// upstream's way of disambiguating recent releases.
fn strip_year_suffix(title: &str, current_year: i32) -> String {
    let title = title.trim();
    for year in [current_year, current_year - 1] {
        if let Some(stripped) = title.strip_suffix(&format!("({year})")) {
            return stripped.trim_end().to_string();
        }
    }
    title.to_string()
}

/// Title id is the third path segment of a site-relative title link
/// ("/title/tt0012345/?ref_=..." -> "tt0012345"), query string ignored.
fn title_id_from_href(href: &str) -> Option<String> {
    let path = href.split('?').next().unwrap_or(href);
    let segment = path.split('/').nth(2)?;
    (!segment.is_empty()).then(|| segment.to_string())
}

/// Parse a "PT97M" duration attribute into minutes.
fn parse_runtime(value: &str) -> Option<u32> {
    value.strip_prefix("PT")?.strip_suffix('M')?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 30).unwrap()
    }

    fn row(title: &str, href: Option<&str>, runtime: Option<&str>, showtimes: &str) -> String {
        let link = match href {
            Some(h) => format!("<a href=\"{h}\">{title}</a>"),
            None => title.to_string(),
        };
        let time = match runtime {
            Some(r) => format!("<time datetime=\"{r}\">x</time>"),
            None => String::new(),
        };
        format!(
            "<div class=\"list_item\"><h3 itemprop=\"name\">{link}</h3>{time}\
             <div class=\"showtimes\">{showtimes}</div></div>"
        )
    }

    #[test]
    fn parses_title_id_runtime_and_groups() {
        let html = row(
            "Dune: Part Three (2026)",
            Some("/title/tt0876543/?ref_=sh_ov"),
            Some("PT97M"),
            "<h5>Showtimes:</h5> 10:00 am Get Tickets \
             <h5>IMAX Showtimes:</h5> 1:30 pm Get Tickets",
        );
        let entries = parse_listing(&html, date()).unwrap();
        assert_eq!(entries.len(), 1);

        let entry = &entries[0];
        assert_eq!(entry.title, "Dune: Part Three");
        assert_eq!(entry.title_id.as_deref(), Some("tt0876543"));
        assert_eq!(entry.runtime_min, 97);
        assert_eq!(entry.groups.len(), 2);
        assert_eq!(entry.groups[0].suffix, "");
        assert_eq!(entry.groups[0].raw_times, "10:00 am Get Tickets");
        assert_eq!(entry.groups[1].suffix, "IMAX");
        assert_eq!(entry.groups[1].raw_times, "1:30 pm Get Tickets");
    }

    #[test]
    fn row_without_title_link_is_skipped() {
        let html = format!(
            "{}{}",
            row("Local Short Films", None, Some("PT80M"), "7:00 pm"),
            row("Anchored", Some("/title/tt0000001/"), None, "8:00 pm"),
        );
        let entries = parse_listing(&html, date()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Anchored");
    }

    #[test]
    fn missing_or_malformed_runtime_defaults() {
        let html = format!(
            "{}{}",
            row("A", Some("/title/tt1/"), None, "1:00 pm"),
            row("B", Some("/title/tt2/"), Some("1h37m"), "1:00 pm"),
        );
        let entries = parse_listing(&html, date()).unwrap();
        assert_eq!(entries[0].runtime_min, DEFAULT_RUNTIME_MIN);
        assert_eq!(entries[1].runtime_min, DEFAULT_RUNTIME_MIN);
    }

    #[test]
    fn only_recent_year_suffixes_are_stripped() {
        assert_eq!(strip_year_suffix("Heat (2026)", 2026), "Heat");
        assert_eq!(strip_year_suffix("Heat (2025)", 2026), "Heat");
        assert_eq!(strip_year_suffix("Heat (1995)", 2026), "Heat (1995)");
        assert_eq!(strip_year_suffix("Heat", 2026), "Heat");
    }

    #[test]
    fn title_id_ignores_query_string() {
        assert_eq!(
            title_id_from_href("/title/tt0111161/?ref_=sh_ov").as_deref(),
            Some("tt0111161")
        );
        assert_eq!(title_id_from_href("/title/tt0111161/").as_deref(), Some("tt0111161"));
        assert_eq!(title_id_from_href("/showtimes/"), None);
    }

    #[test]
    fn address_stops_at_pipe_delimiter() {
        let html = "<div class=\"description\">\
                    1328 Montana Ave<br>Santa Monica, CA 90403\
                    <br> | (310) 478-3836</div>";
        assert_eq!(
            extract_address(html).unwrap().as_deref(),
            Some("1328 Montana Ave, Santa Monica, CA 90403")
        );

        let html = "<div class=\"description\">4473 Sunset Dr | tel 555</div>";
        assert_eq!(extract_address(html).unwrap().as_deref(), Some("4473 Sunset Dr"));
    }

    #[test]
    fn no_description_block_means_no_address() {
        assert_eq!(extract_address("<div>nothing here</div>").unwrap(), None);
    }
}
