use std::collections::HashMap;

use scraper::{Html, Selector};
use serde::Deserialize;

use crate::fetch::PageFetcher;
use crate::{BASE_URL, Result, ScrapeError, TitleMetadata};

/// JSON-LD block embedded in a title-detail page. Only `name` is required;
/// every other field may be missing and stays absent in the cache.
#[derive(Debug, Deserialize)]
struct LdTitle {
    name: String,
    description: Option<String>,
    url: Option<String>,
    #[serde(rename = "aggregateRating")]
    aggregate_rating: Option<LdRating>,
}

#[derive(Debug, Deserialize)]
struct LdRating {
    #[serde(rename = "ratingValue")]
    rating_value: Option<f64>,
}

pub fn title_page_url(title_id: &str) -> String {
    format!("{BASE_URL}/title/{title_id}/")
}

/// Cache-or-fetch resolver for title metadata. Each title id is fetched at
/// most once per run; the cache is never overwritten.
pub struct TitleResolver {
    cache: HashMap<String, TitleMetadata>,
}

impl TitleResolver {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
        }
    }

    pub async fn resolve(
        &mut self,
        fetcher: &dyn PageFetcher,
        title_id: &str,
    ) -> Result<&TitleMetadata> {
        if !self.cache.contains_key(title_id) {
            let body = fetcher.get_text(&title_page_url(title_id)).await?;
            let metadata = extract_metadata(&body, title_id)?;
            self.cache.insert(title_id.to_string(), metadata);
        }
        Ok(&self.cache[title_id])
    }
}

impl Default for TitleResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Pull the structured-data block out of a title-detail page.
fn extract_metadata(body: &str, title_id: &str) -> Result<TitleMetadata> {
    let document = Html::parse_document(body);
    let script_sel = Selector::parse("script[type=\"application/ld+json\"]")
        .map_err(|e| ScrapeError::Selector(e.to_string()))?;

    let script = document
        .select(&script_sel)
        .next()
        .ok_or_else(|| ScrapeError::Metadata {
            title_id: title_id.to_string(),
            reason: "no ld+json block".to_string(),
        })?;

    let json = script.text().collect::<String>();
    let block: LdTitle =
        serde_json::from_str(&json).map_err(|e| ScrapeError::Metadata {
            title_id: title_id.to_string(),
            reason: e.to_string(),
        })?;

    Ok(TitleMetadata {
        name: block.name,
        synopsis: block.description,
        url: block.url.unwrap_or_else(|| title_page_url(title_id)),
        rating: block.aggregate_rating.and_then(|r| r.rating_value),
    })
}
