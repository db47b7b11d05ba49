use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[allow(clippy::enum_variant_names)]
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Invalid cookie: {0}")]
    InvalidCookie(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Not logged in: {0}")]
    NotLoggedIn(String),
    #[error("Rate limit: {0}")]
    RateLimit(String),
    #[error("Cannot encode/decode JSON: {0}")]
    JSONError(#[from] serde_json::Error),
    #[error("IO Error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Network Error: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("Cannot parse URL: {0}")]
    UrlError(#[from] url::ParseError),
    #[error("Parsing error: {0}")]
    ParsingError(#[from] perch_util::ParsingError),
}
