use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    /// Retry budget exhausted for a URL. Carries the last HTTP status seen,
    /// or None when every attempt failed at the transport level.
    #[error("fetch failed for {url} (last status: {})", .status.map_or_else(|| "none".to_string(), |s| s.to_string()))]
    Fetch { url: String, status: Option<u16> },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unparseable showtime text: {text:?}")]
    Showtime { text: String },

    #[error("metadata block missing or invalid for title {title_id}: {reason}")]
    Metadata { title_id: String, reason: String },

    #[error("no valid local time for {venue} at {when}")]
    LocalTime { venue: String, when: String },

    #[error("selector error: {0}")]
    Selector(String),
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
