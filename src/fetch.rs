use std::time::Duration;

use reqwest::{Client, header};

use crate::{Result, ScrapeError};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/143.0.0.0 Safari/537.36";
const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.8";

/// Attempts per URL before giving up.
const FETCH_ATTEMPTS: u32 = 3;
/// Fixed pause between attempts.
const RETRY_DELAY: Duration = Duration::from_secs(3);

/// Seam over page retrieval so the pipeline and the title resolver can be
/// driven from canned pages in tests.
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch a URL and return the response body.
    async fn get_text(&self, url: &str) -> Result<String>;
}

/// Real fetcher: one reqwest client with a cookie store, reused for the
/// whole run so the upstream session survives across pages.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder().cookie_store(true).build()?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl PageFetcher for HttpFetcher {
    async fn get_text(&self, url: &str) -> Result<String> {
        let mut last_status = None;

        for attempt in 1..=FETCH_ATTEMPTS {
            let resp = self
                .client
                .get(url)
                .header(header::USER_AGENT, USER_AGENT)
                .header(header::ACCEPT_LANGUAGE, ACCEPT_LANGUAGE)
                .send()
                .await;

            match resp {
                Ok(resp) if resp.status().is_success() => {
                    // A body-read failure on a 200 is not retried; the page
                    // is gone for this run either way.
                    return Ok(resp.text().await?);
                }
                Ok(resp) => {
                    last_status = Some(resp.status().as_u16());
                }
                Err(_) => {}
            }

            if attempt < FETCH_ATTEMPTS {
                tokio::time::sleep(RETRY_DELAY).await;
            }
        }

        Err(ScrapeError::Fetch {
            url: url.to_string(),
            status: last_status,
        })
    }
}
