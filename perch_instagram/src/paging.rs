use async_trait::async_trait;
use tokio::time::{sleep, Duration};

use std::collections::HashSet;

use insta_client::{FollowPage, InstagramClient};
use perch_core::{AccountId, Error, Profile, Result};

use crate::util::{core_error, profile_from_summary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FollowList {
    Followers,
    Following,
}

impl std::fmt::Display for FollowList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FollowList::Followers => write!(f, "followers"),
            FollowList::Following => write!(f, "following"),
        }
    }
}

/// Fetches single pages of a follow list.
#[async_trait]
pub(crate) trait FollowPages: Send + Sync {
    async fn follow_page(
        &self,
        list: FollowList,
        user_id: AccountId,
        max_id: Option<&str>,
    ) -> std::result::Result<FollowPage, insta_client::Error>;
}

#[async_trait]
impl FollowPages for InstagramClient {
    async fn follow_page(
        &self,
        list: FollowList,
        user_id: AccountId,
        max_id: Option<&str>,
    ) -> std::result::Result<FollowPage, insta_client::Error> {
        match list {
            FollowList::Followers => self.followers(user_id, max_id).await,
            FollowList::Following => self.following(user_id, max_id).await,
        }
    }
}

/// Walk `list` of `user_id` page by page until the cursor runs out or a page comes back empty.
/// Accounts seen on an earlier page are skipped. Hitting `max_pages` first is an error,
/// since the list gathered so far is not the whole list.
pub(crate) async fn collect_follow_list(
    pages: &dyn FollowPages,
    list: FollowList,
    user_id: AccountId,
    page_delay: Duration,
    max_pages: usize,
) -> Result<Vec<(AccountId, Profile)>> {
    let mut entries = Vec::new();
    let mut seen = HashSet::new();
    let mut max_id: Option<String> = None;

    for page_index in 0..max_pages {
        if page_index > 0 {
            sleep(page_delay).await;
        }
        let page = pages
            .follow_page(list, user_id, max_id.as_deref())
            .await
            .map_err(core_error)?;

        for summary in page.users.iter().filter(|u| seen.insert(u.pk)) {
            entries.push(profile_from_summary(summary)?);
        }
        tracing::info!(
            "Fetched {} page {} of {}: {} accounts so far",
            list,
            page_index + 1,
            user_id,
            entries.len()
        );

        match page.next_max_id {
            Some(next) if !page.users.is_empty() => max_id = Some(next),
            _ => return Ok(entries),
        }
    }

    tracing::warn!(
        "Stopped fetching {} of {} after {} pages with {} accounts",
        list,
        user_id,
        max_pages,
        entries.len()
    );
    Err(Error::ObjectNotComplete(format!("{} of {}", list, user_id)))
}
