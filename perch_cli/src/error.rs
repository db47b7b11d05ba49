use thiserror::Error;

use perch_core::Error as PerchError;

pub type Result<T> = std::result::Result<T, CliError>;

/// Wrong command line or configuration, reported with usage help.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct UsageError(pub String);

#[derive(Debug)]
pub struct CliError(anyhow::Error);

impl<E> From<E> for CliError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Usage,
    NotLoggedIn,
    RateLimit,
    Network,
    Timeout,
    Other,
}

impl CliError {
    pub fn kind(&self) -> ErrorKind {
        self.0.chain().find_map(cause_kind).unwrap_or(ErrorKind::Other)
    }

    pub fn retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::RateLimit | ErrorKind::Network | ErrorKind::Timeout)
    }

    pub fn exit_code(&self) -> u8 {
        match self.kind() {
            ErrorKind::Usage => 2,
            ErrorKind::NotLoggedIn => 3,
            ErrorKind::RateLimit | ErrorKind::Network | ErrorKind::Timeout => 4,
            ErrorKind::Other => 1,
        }
    }
}

fn cause_kind(cause: &(dyn std::error::Error + 'static)) -> Option<ErrorKind> {
    if cause.is::<UsageError>() || cause.is::<perch_util::ParsingError>() {
        return Some(ErrorKind::Usage);
    }
    if let Some(err) = cause.downcast_ref::<insta_client::Error>() {
        return Some(match err {
            insta_client::Error::InvalidCookie(_) => ErrorKind::Usage,
            insta_client::Error::NotLoggedIn(_) => ErrorKind::NotLoggedIn,
            insta_client::Error::RateLimit(_) => ErrorKind::RateLimit,
            insta_client::Error::NetworkError(_) => ErrorKind::Network,
            _ => ErrorKind::Other,
        });
    }
    if let Some(err) = cause.downcast_ref::<PerchError>() {
        return Some(match err {
            PerchError::InvalidUsername(_) => ErrorKind::Usage,
            PerchError::NotLoggedIn(_) => ErrorKind::NotLoggedIn,
            PerchError::RateLimit(_) => ErrorKind::RateLimit,
            PerchError::Timeout(_) => ErrorKind::Timeout,
            // `Other` is transparent, so what it wraps never shows up in the outer chain.
            PerchError::Other(inner) => inner.chain().find_map(cause_kind).unwrap_or(ErrorKind::Other),
            PerchError::ObjectNotComplete(_) => ErrorKind::Other,
        });
    }
    None
}
