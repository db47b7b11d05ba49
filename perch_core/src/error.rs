use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid username: {0:?}")]
    InvalidUsername(String),
    #[error("Not logged in: {0}")]
    NotLoggedIn(String),
    #[error("Rate Limit: {0}")]
    RateLimit(String),
    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Object `{0}` is not complete")]
    ObjectNotComplete(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
