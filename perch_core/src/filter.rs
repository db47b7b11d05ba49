use serde::{Deserialize, Serialize};

use std::collections::HashSet;
use std::fmt::{Display, Formatter};

use crate::profile::{AccountId, Profile};

pub const DEFAULT_MAX_FOLLOWING: u64 = 2000;
pub const DEFAULT_MAX_FOLLOWING_TO_FOLLOWERS_RATIO: f64 = 10.0;
pub const DEFAULT_STOP_WORDS: &[&str] = &["shop", "store", "free"];

/// Heuristics for spotting spam and bot accounts among followers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotFilter {
    /// Following more accounts than this looks like a mass follower.
    pub max_following: u64,
    /// Fewer followers than this is suspicious. 0 disables the check.
    pub min_followers: u64,
    pub max_following_to_followers_ratio: f64,
    /// Matched case-insensitively against username, full name and biography.
    pub stop_words: Vec<String>,
    /// Accounts that are never reported.
    pub whitelist: HashSet<AccountId>,
}

impl Default for BotFilter {
    fn default() -> Self {
        Self {
            max_following: DEFAULT_MAX_FOLLOWING,
            min_followers: 0,
            max_following_to_followers_ratio: DEFAULT_MAX_FOLLOWING_TO_FOLLOWERS_RATIO,
            stop_words: DEFAULT_STOP_WORDS.iter().map(|w| w.to_string()).collect(),
            whitelist: HashSet::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BotReason {
    StopWord(String),
    MassFollower { following: u64 },
    TooFewFollowers { followers: u64 },
    FollowRatio { ratio: f64 },
}

impl Display for BotReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BotReason::StopWord(word) => write!(f, "stop word `{}`", word),
            BotReason::MassFollower { following } => write!(f, "follows {} accounts", following),
            BotReason::TooFewFollowers { followers } => write!(f, "only {} followers", followers),
            BotReason::FollowRatio { ratio } => write!(f, "following/followers ratio {:.1}", ratio),
        }
    }
}

impl BotFilter {
    /// Returns why the account looks like a bot, or `None` if it passes.
    /// Count checks are skipped when the profile has no counts.
    pub fn check(&self, id: AccountId, profile: &Profile) -> Option<BotReason> {
        if self.whitelist.contains(&id) {
            return None;
        }

        let texts = [
            Some(profile.username()),
            profile.full_name.as_deref(),
            profile.biography.as_deref(),
        ]
        .into_iter()
        .flatten()
        .map(str::to_lowercase)
        .collect::<Vec<_>>();
        for word in self.stop_words.iter().filter(|w| !w.is_empty()) {
            let word_lower = word.to_lowercase();
            if texts.iter().any(|t| t.contains(&word_lower)) {
                return Some(BotReason::StopWord(word.clone()));
            }
        }

        if let Some(following) = profile.following_count {
            if following > self.max_following {
                return Some(BotReason::MassFollower { following });
            }
        }
        if let Some(followers) = profile.follower_count {
            if followers < self.min_followers {
                return Some(BotReason::TooFewFollowers { followers });
            }
        }
        if let (Some(following), Some(followers)) = (profile.following_count, profile.follower_count) {
            let ratio = following as f64 / followers.max(1) as f64;
            if ratio > self.max_following_to_followers_ratio {
                return Some(BotReason::FollowRatio { ratio });
            }
        }
        None
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn account(username: &str, followers: u64, following: u64) -> Profile {
        Profile::new(username)
            .unwrap()
            .with_followers(followers)
            .with_following(following)
    }

    #[test]
    fn test_regular_account_passes() {
        let filter = BotFilter::default();
        assert_eq!(filter.check(1, &account("nova", 300, 200)), None);
        assert_eq!(filter.check(1, &Profile::new("nova").unwrap()), None);
    }

    #[test]
    fn test_stop_words() {
        let filter = BotFilter::default();
        assert_eq!(
            filter.check(1, &account("best_SHOP_ever", 300, 200)),
            Some(BotReason::StopWord("shop".to_string()))
        );
        let profile = account("nova", 300, 200).with_biography("DM for FREE followers");
        assert_eq!(filter.check(1, &profile), Some(BotReason::StopWord("free".to_string())));
    }

    #[test]
    fn test_count_checks() {
        let filter = BotFilter {
            min_followers: 5,
            ..Default::default()
        };
        assert_eq!(
            filter.check(1, &account("nova", 3000, 2500)),
            Some(BotReason::MassFollower { following: 2500 })
        );
        assert_eq!(
            filter.check(1, &account("nova", 2, 1)),
            Some(BotReason::TooFewFollowers { followers: 2 })
        );
        assert_eq!(
            filter.check(1, &account("nova", 10, 500)),
            Some(BotReason::FollowRatio { ratio: 50.0 })
        );
    }

    #[test]
    fn test_zero_followers_ratio() {
        let filter = BotFilter::default();
        assert_eq!(
            filter.check(1, &account("nova", 0, 11)),
            Some(BotReason::FollowRatio { ratio: 11.0 })
        );
        assert_eq!(filter.check(1, &account("nova", 0, 0)), None);
    }

    #[test]
    fn test_whitelist() {
        let filter = BotFilter {
            whitelist: HashSet::from([7]),
            ..Default::default()
        };
        assert_eq!(filter.check(7, &account("free_shop", 0, 5000)), None);
        assert!(filter.check(8, &account("free_shop", 0, 5000)).is_some());
    }

    #[test]
    fn test_deserialize_partial_config() {
        let filter: BotFilter = serde_json::from_str(r#"{"max_following": 500, "stop_words": ["promo"]}"#).unwrap();
        assert_eq!(filter.max_following, 500);
        assert_eq!(filter.stop_words, vec!["promo".to_string()]);
        assert_eq!(filter.max_following_to_followers_ratio, DEFAULT_MAX_FOLLOWING_TO_FOLLOWERS_RATIO);
    }
}
