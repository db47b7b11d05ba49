use async_trait::async_trait;
use tokio::time::Duration;

use insta_client::InstagramClient;
use perch_core::{AccountId, Profile, ProfileSource, Result};

use crate::paging::{collect_follow_list, FollowList};
use crate::util::{core_error, profile_from_info};

pub const DEFAULT_PAGE_DELAY_MS: u64 = 1500;
pub const DEFAULT_MAX_PAGES: usize = 200;

/// `ProfileSource` backed by the Instagram API.
#[derive(Debug, Clone)]
pub struct InstagramSource {
    client: InstagramClient,
    page_delay: Duration,
    max_pages: usize,
}

impl InstagramSource {
    pub fn new(client: InstagramClient) -> Self {
        Self {
            client,
            page_delay: Duration::from_millis(DEFAULT_PAGE_DELAY_MS),
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    pub fn with_page_delay(mut self, page_delay: Duration) -> Self {
        self.page_delay = page_delay;
        self
    }

    /// Longest follow list to walk, in pages. A list that doesn't end by then is an error.
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn own_user_id(&self) -> AccountId {
        self.client.own_user_id()
    }
}

#[async_trait]
impl ProfileSource for InstagramSource {
    async fn profile_by_username(&self, username: &str) -> Result<Option<(AccountId, Profile)>> {
        match self.client.user_by_username(username).await {
            Ok(info) => Ok(Some(profile_from_info(&info)?)),
            Err(insta_client::Error::NotFound(_)) => Ok(None),
            Err(e) => Err(core_error(e)),
        }
    }

    async fn profile_by_id(&self, id: AccountId) -> Result<Option<Profile>> {
        match self.client.user_by_id(id).await {
            Ok(info) => Ok(Some(profile_from_info(&info)?.1)),
            Err(insta_client::Error::NotFound(_)) => Ok(None),
            Err(e) => Err(core_error(e)),
        }
    }

    async fn following_of(&self, id: AccountId) -> Result<Vec<(AccountId, Profile)>> {
        collect_follow_list(&self.client, FollowList::Following, id, self.page_delay, self.max_pages).await
    }

    async fn followers_of(&self, id: AccountId) -> Result<Vec<(AccountId, Profile)>> {
        collect_follow_list(&self.client, FollowList::Followers, id, self.page_delay, self.max_pages).await
    }
}
