use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use itertools::Itertools;
use lazy_static::lazy_static;
use tokio::sync::RwLock;

use crate::profile::{AccountId, Profile};

/// The cache as it is handed around: one lock for all fields, since every
/// write touches both maps together.
pub type SharedCache = Arc<RwLock<IdentityCache>>;

lazy_static! {
    static ref GLOBAL_CACHE: SharedCache = IdentityCache::shared();
}

/// In-process store of account identities.
///
/// `profiles` is the primary map and `ids` is a secondary index on username.
/// Every `username -> id` entry in `ids` whose id is in `profiles` points at a profile
/// with exactly that username. Follow lists are snapshots: set once, never updated,
/// and both belong to the single account that claimed them first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityCache {
    /// Accounts the logged-in user follows, `None` until fetched
    pub(crate) following: Option<Vec<AccountId>>,
    /// Accounts following the logged-in user, `None` until fetched
    pub(crate) followers: Option<Vec<AccountId>>,
    /// Account the snapshots were fetched for
    pub(crate) owner: Option<AccountId>,
    /// account_id -> Profile
    pub(crate) profiles: HashMap<AccountId, Profile>,
    /// username -> account_id
    pub(crate) ids: HashMap<String, AccountId>,
}

impl IdentityCache {
    pub fn new() -> Self {
        Self {
            following: None,
            followers: None,
            owner: None,
            profiles: HashMap::new(),
            ids: HashMap::new(),
        }
    }

    /// A fresh, empty cache ready to be passed to whoever needs it.
    pub fn shared() -> SharedCache {
        Arc::new(RwLock::new(Self::new()))
    }

    /// The process-wide instance, created empty on first access.
    /// Concurrent first calls still construct it only once.
    pub fn global() -> &'static SharedCache {
        &GLOBAL_CACHE
    }

    // MARK: Identity

    /// Case-sensitive username lookup.
    pub fn resolve_id(&self, username: &str) -> Option<AccountId> {
        self.ids.get(username).copied()
    }

    pub fn get_profile(&self, id: AccountId) -> Option<&Profile> {
        self.profiles.get(&id)
    }

    pub fn username_of(&self, id: AccountId) -> Option<&str> {
        self.profiles.get(&id).map(Profile::username)
    }

    /// Insert or overwrite the profile of `id` and index it by username.
    /// If `id` was known under another username, that index entry is dropped,
    /// unless it has meanwhile been taken by a different account.
    pub fn record_profile(&mut self, id: AccountId, profile: Profile) {
        if let Some(old) = self.profiles.get(&id) {
            if old.username() != profile.username() && self.ids.get(old.username()) == Some(&id) {
                tracing::debug!("Account {} renamed from @{} to @{}", id, old.username(), profile.username());
                self.ids.remove(old.username());
            }
        }
        if let Some(previous) = self.ids.get(profile.username()) {
            if *previous != id {
                tracing::debug!("Username @{} moved from account {} to {}", profile.username(), previous, id);
            }
        }
        self.ids.insert(profile.username().to_string(), id);
        self.profiles.insert(id, profile);
    }

    pub fn record_profiles(&mut self, profiles: impl IntoIterator<Item = (AccountId, Profile)>) {
        for (id, profile) in profiles {
            self.record_profile(id, profile);
        }
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    // MARK: Snapshots

    pub fn snapshot_owner(&self) -> Option<AccountId> {
        self.owner
    }

    /// Make `id` the owner of the snapshots if nobody is yet.
    /// Returns whether `id` owns them afterwards.
    pub fn claim_snapshots(&mut self, id: AccountId) -> bool {
        let owner = *self.owner.get_or_insert(id);
        if owner != id {
            tracing::debug!("Snapshots belong to {}, not {}", owner, id);
        }
        owner == id
    }

    pub fn following(&self) -> Option<&[AccountId]> {
        self.following.as_deref()
    }

    pub fn followers(&self) -> Option<&[AccountId]> {
        self.followers.as_deref()
    }

    /// Store the following snapshot. Returns false if one was already stored, which is kept.
    pub fn set_following(&mut self, ids: Vec<AccountId>) -> bool {
        set_snapshot(&mut self.following, ids, "following")
    }

    /// Store the followers snapshot. Returns false if one was already stored, which is kept.
    pub fn set_followers(&mut self, ids: Vec<AccountId>) -> bool {
        set_snapshot(&mut self.followers, ids, "followers")
    }

    // MARK: Whitelist sets

    /// Accounts that are both followed and following back, in following order.
    pub fn mutuals(&self) -> Option<Vec<AccountId>> {
        let (following, followers) = (self.following.as_ref()?, self.followers.as_ref()?);
        let followers = followers.iter().collect::<HashSet<_>>();
        Some(following.iter().filter(|id| followers.contains(id)).unique().copied().collect())
    }

    /// Followed accounts that do not follow back, in following order.
    pub fn non_followers(&self) -> Option<Vec<AccountId>> {
        let (following, followers) = (self.following.as_ref()?, self.followers.as_ref()?);
        let followers = followers.iter().collect::<HashSet<_>>();
        Some(following.iter().filter(|id| !followers.contains(id)).unique().copied().collect())
    }

    /// Followers that are not followed back, in followers order.
    pub fn fans(&self) -> Option<Vec<AccountId>> {
        let (following, followers) = (self.following.as_ref()?, self.followers.as_ref()?);
        let following = following.iter().collect::<HashSet<_>>();
        Some(followers.iter().filter(|id| !following.contains(id)).unique().copied().collect())
    }
}

fn set_snapshot(slot: &mut Option<Vec<AccountId>>, ids: Vec<AccountId>, name: &str) -> bool {
    match slot {
        Some(existing) => {
            if *existing != ids {
                tracing::warn!("Ignored new {} snapshot of {} accounts, keeping {}", name, ids.len(), existing.len());
            }
            false
        }
        None => {
            tracing::info!("Stored {} snapshot of {} accounts", name, ids.len());
            *slot = Some(ids);
            true
        }
    }
}
