use serde::Serialize;

use crate::error::{Error, Result};

/// Numeric account identifier as assigned by the platform.
pub type AccountId = u64;

pub const MAX_USERNAME_LEN: usize = 30;

/// Cached metadata of one account.
/// Only the username is required; everything else depends on which endpoint the profile came from.
/// Follow-list entries carry no counts, while a full profile lookup does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    username: String,
    pub full_name: Option<String>,
    pub biography: Option<String>,
    pub external_url: Option<String>,
    pub follower_count: Option<u64>,
    pub following_count: Option<u64>,
    pub media_count: Option<u64>,
    pub is_private: bool,
    pub is_verified: bool,
}

impl Profile {
    pub fn new(username: impl Into<String>) -> Result<Self> {
        let username = username.into();
        if username.is_empty()
            || username.chars().count() > MAX_USERNAME_LEN
            || username.chars().any(char::is_whitespace)
        {
            return Err(Error::InvalidUsername(username));
        }
        Ok(Self {
            username,
            full_name: None,
            biography: None,
            external_url: None,
            follower_count: None,
            following_count: None,
            media_count: None,
            is_private: false,
            is_verified: false,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Whether follow counts are known, i.e. this is more than a list summary.
    pub fn is_detailed(&self) -> bool {
        self.follower_count.is_some() && self.following_count.is_some()
    }

    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }

    pub fn with_biography(mut self, biography: impl Into<String>) -> Self {
        self.biography = Some(biography.into());
        self
    }

    pub fn with_external_url(mut self, url: impl Into<String>) -> Self {
        self.external_url = Some(url.into());
        self
    }

    pub fn with_followers(mut self, count: u64) -> Self {
        self.follower_count = Some(count);
        self
    }

    pub fn with_following(mut self, count: u64) -> Self {
        self.following_count = Some(count);
        self
    }

    pub fn with_media_count(mut self, count: u64) -> Self {
        self.media_count = Some(count);
        self
    }

    pub fn private(mut self, is_private: bool) -> Self {
        self.is_private = is_private;
        self
    }

    pub fn verified(mut self, is_verified: bool) -> Self {
        self.is_verified = is_verified;
        self
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "@{}", self.username)?;
        if let Some(name) = self.full_name.as_deref().filter(|n| !n.is_empty()) {
            write!(f, " ({})", name)?;
        }
        Ok(())
    }
}
