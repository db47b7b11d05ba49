use std::collections::HashSet;
use std::str::FromStr;
use std::time::Duration;

use insta_client::SessionCookie;
use perch_core::filter::BotFilter;
use perch_instagram::{DEFAULT_MAX_PAGES, DEFAULT_PAGE_DELAY_MS};

use crate::error::{Result, UsageError};

pub const DEFAULT_MAX_PROFILE_FETCHES: usize = 500;

/// Everything read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    pub session_cookie: SessionCookie,
    pub page_delay: Duration,
    pub max_pages: usize,
    /// Upper bound of profile lookups a single `bots` run may make.
    pub max_profile_fetches: usize,
    pub bot_filter: BotFilter,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let cookie = lookup("INSTAGRAM_COOKIE").ok_or(UsageError("INSTAGRAM_COOKIE must be set".to_string()))?;
        let session_cookie = cookie.parse::<SessionCookie>()?;

        let mut bot_filter = BotFilter::default();
        if let Some(v) = parse_var(&lookup, "PERCH_MAX_FOLLOWING")? {
            bot_filter.max_following = v;
        }
        if let Some(v) = parse_var(&lookup, "PERCH_MIN_FOLLOWERS")? {
            bot_filter.min_followers = v;
        }
        if let Some(v) = parse_var(&lookup, "PERCH_MAX_RATIO")? {
            bot_filter.max_following_to_followers_ratio = v;
        }
        if let Some(words) = lookup("PERCH_STOP_WORDS") {
            bot_filter.stop_words = split_list(&words).map(str::to_string).collect();
        }
        if let Some(ids) = lookup("PERCH_WHITELIST") {
            bot_filter.whitelist = split_list(&ids)
                .map(|id| parse_value::<u64>("PERCH_WHITELIST", id))
                .collect::<Result<HashSet<_>>>()?;
        }

        let max_pages = parse_var(&lookup, "PERCH_MAX_PAGES")?.unwrap_or(DEFAULT_MAX_PAGES);
        if max_pages == 0 {
            return Err(UsageError("PERCH_MAX_PAGES must be at least 1".to_string()).into());
        }

        Ok(Config {
            session_cookie,
            page_delay: Duration::from_millis(
                parse_var(&lookup, "PERCH_PAGE_DELAY_MS")?.unwrap_or(DEFAULT_PAGE_DELAY_MS),
            ),
            max_pages,
            max_profile_fetches: parse_var(&lookup, "PERCH_MAX_PROFILE_FETCHES")?
                .unwrap_or(DEFAULT_MAX_PROFILE_FETCHES),
            bot_filter,
        })
    }
}

fn split_list(s: &str) -> impl Iterator<Item = &str> {
    s.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>> {
    lookup(key).map(|value| parse_value(key, value.trim())).transpose()
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse::<T>()
        .map_err(|_| UsageError(format!("{} has an invalid value: {:?}", key, value)).into())
}
