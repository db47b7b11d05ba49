// Cache-through lookups.
// The cache itself never talks to the network; these helpers consult it first
// and only fall back to a `ProfileSource` on a miss, recording what comes back.
// The cache lock is never held across a source call.

use async_trait::async_trait;

use perch_util::UserRef;

use crate::cache::{IdentityCache, SharedCache};
use crate::error::Result;
use crate::profile::{AccountId, Profile};

/// Anything that can fetch account data from a platform, usually an authenticated client.
/// Accounts that don't exist are `Ok(None)`, not errors.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn profile_by_username(&self, username: &str) -> Result<Option<(AccountId, Profile)>>;
    async fn profile_by_id(&self, id: AccountId) -> Result<Option<Profile>>;
    /// Accounts followed by `id`, with whatever summary the platform returns for each.
    async fn following_of(&self, id: AccountId) -> Result<Vec<(AccountId, Profile)>>;
    /// Accounts following `id`.
    async fn followers_of(&self, id: AccountId) -> Result<Vec<(AccountId, Profile)>>;
}

/// Resolve `username` to an account id, asking `source` on a cache miss.
///
/// The profile is indexed under the username the platform returns, so a query that
/// differs from it (the platform may match case-insensitively) misses the cache
/// and is fetched again on every call.
pub async fn resolve_username(
    cache: &SharedCache,
    source: &dyn ProfileSource,
    username: &str,
) -> Result<Option<AccountId>> {
    if let Some(id) = cache.read().await.resolve_id(username) {
        tracing::debug!("Resolved @{} to {} from cache", username, id);
        return Ok(Some(id));
    }

    let Some((id, profile)) = source.profile_by_username(username).await? else {
        tracing::info!("Account @{} not found", username);
        return Ok(None);
    };
    if profile.username() != username {
        tracing::debug!("Platform returned @{} for @{}", profile.username(), username);
    }
    cache.write().await.record_profile(id, profile);
    tracing::info!("Resolved @{} to {}", username, id);
    Ok(Some(id))
}

pub async fn resolve_user_ref(
    cache: &SharedCache,
    source: &dyn ProfileSource,
    user: &UserRef,
) -> Result<Option<AccountId>> {
    match user {
        UserRef::Id(id) => Ok(Some(*id)),
        UserRef::Username(username) => resolve_username(cache, source, username).await,
    }
}

/// Get the full profile of `id`. With `use_cache`, a cached profile is used
/// as long as it is detailed; list summaries are always refetched.
pub async fn profile(
    cache: &SharedCache,
    source: &dyn ProfileSource,
    id: AccountId,
    use_cache: bool,
) -> Result<Option<Profile>> {
    if use_cache {
        if let Some(profile) = cache.read().await.get_profile(id).filter(|p| p.is_detailed()) {
            tracing::debug!("Got profile {} from cache", id);
            return Ok(Some(profile.clone()));
        }
    }

    let Some(profile) = source.profile_by_id(id).await? else {
        tracing::info!("Account {} not found", id);
        return Ok(None);
    };
    cache.write().await.record_profile(id, profile.clone());
    tracing::info!("Fetched profile {}: {}", id, profile);
    Ok(Some(profile))
}

/// Accounts followed by `id`. The first account asked for owns the snapshots:
/// its list is fetched once and kept, any other account's is fetched every time.
pub async fn following(cache: &SharedCache, source: &dyn ProfileSource, id: AccountId) -> Result<Vec<AccountId>> {
    snapshot(cache, source, id, Snapshot::Following).await
}

/// Accounts following `id`, kept the same way as [`following`].
pub async fn followers(cache: &SharedCache, source: &dyn ProfileSource, id: AccountId) -> Result<Vec<AccountId>> {
    snapshot(cache, source, id, Snapshot::Followers).await
}

#[derive(Debug, Clone, Copy)]
enum Snapshot {
    Following,
    Followers,
}

impl Snapshot {
    fn get(self, cache: &IdentityCache) -> Option<&[AccountId]> {
        match self {
            Snapshot::Following => cache.following(),
            Snapshot::Followers => cache.followers(),
        }
    }

    fn set(self, cache: &mut IdentityCache, ids: Vec<AccountId>) -> bool {
        match self {
            Snapshot::Following => cache.set_following(ids),
            Snapshot::Followers => cache.set_followers(ids),
        }
    }
}

async fn snapshot(
    cache: &SharedCache,
    source: &dyn ProfileSource,
    id: AccountId,
    kind: Snapshot,
) -> Result<Vec<AccountId>> {
    let owned = {
        let mut cache = cache.write().await;
        let owned = cache.claim_snapshots(id);
        if let Some(ids) = kind.get(&cache).filter(|_| owned) {
            return Ok(ids.to_vec());
        }
        owned
    };

    // A failed or incomplete fetch leaves the snapshot unset.
    let entries = match kind {
        Snapshot::Following => source.following_of(id).await?,
        Snapshot::Followers => source.followers_of(id).await?,
    };
    let ids = entries.iter().map(|(id, _)| *id).collect::<Vec<_>>();

    let mut cache = cache.write().await;
    // Don't let a bare summary replace a detailed profile fetched earlier.
    let fresh = entries
        .into_iter()
        .filter(|(id, profile)| {
            !cache
                .get_profile(*id)
                .is_some_and(|cached| cached.is_detailed() && cached.username() == profile.username())
        })
        .collect::<Vec<_>>();
    cache.record_profiles(fresh);

    if !owned {
        return Ok(ids);
    }
    // Another task may have stored the snapshot while we were fetching; its copy wins.
    kind.set(&mut cache, ids);
    Ok(kind.get(&cache).map(<[AccountId]>::to_vec).unwrap_or_default())
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error::Error;

    #[derive(Default)]
    struct FakeSource {
        profiles: HashMap<AccountId, Profile>,
        following: Vec<AccountId>,
        followers: Vec<AccountId>,
        incomplete_lists: bool,
        calls: AtomicUsize,
    }

    impl FakeSource {
        fn with(mut self, id: AccountId, profile: Profile) -> Self {
            self.profiles.insert(id, profile);
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn summaries(&self, ids: &[AccountId]) -> Vec<(AccountId, Profile)> {
            ids.iter()
                .map(|id| {
                    let profile = &self.profiles[id];
                    (*id, Profile::new(profile.username()).unwrap())
                })
                .collect()
        }
    }

    #[async_trait]
    impl ProfileSource for FakeSource {
        async fn profile_by_username(&self, username: &str) -> Result<Option<(AccountId, Profile)>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .profiles
                .iter()
                .find(|(_, p)| p.username() == username)
                .map(|(id, p)| (*id, p.clone())))
        }

        async fn profile_by_id(&self, id: AccountId) -> Result<Option<Profile>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.profiles.get(&id).cloned())
        }

        async fn following_of(&self, id: AccountId) -> Result<Vec<(AccountId, Profile)>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.incomplete_lists {
                return Err(Error::ObjectNotComplete(format!("following of {}", id)));
            }
            Ok(self.summaries(&self.following))
        }

        async fn followers_of(&self, id: AccountId) -> Result<Vec<(AccountId, Profile)>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.incomplete_lists {
                return Err(Error::ObjectNotComplete(format!("followers of {}", id)));
            }
            Ok(self.summaries(&self.followers))
        }
    }

    /// Every account follows exactly `id * 10`, and is followed by `id * 10 + 1`.
    struct ListSource;

    #[async_trait]
    impl ProfileSource for ListSource {
        async fn profile_by_username(&self, _username: &str) -> Result<Option<(AccountId, Profile)>> {
            Ok(None)
        }

        async fn profile_by_id(&self, _id: AccountId) -> Result<Option<Profile>> {
            Ok(None)
        }

        async fn following_of(&self, id: AccountId) -> Result<Vec<(AccountId, Profile)>> {
            Ok(vec![(id * 10, Profile::new(format!("user{}", id * 10))?)])
        }

        async fn followers_of(&self, id: AccountId) -> Result<Vec<(AccountId, Profile)>> {
            Ok(vec![(id * 10 + 1, Profile::new(format!("user{}", id * 10 + 1))?)])
        }
    }

    /// Matches usernames case-insensitively, like the platform does.
    struct CaseInsensitiveSource(AtomicUsize);

    #[async_trait]
    impl ProfileSource for CaseInsensitiveSource {
        async fn profile_by_username(&self, username: &str) -> Result<Option<(AccountId, Profile)>> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(username.eq_ignore_ascii_case("nova").then(nova).map(|p| (42, p)))
        }

        async fn profile_by_id(&self, _id: AccountId) -> Result<Option<Profile>> {
            Ok(None)
        }

        async fn following_of(&self, _id: AccountId) -> Result<Vec<(AccountId, Profile)>> {
            Ok(vec![])
        }

        async fn followers_of(&self, _id: AccountId) -> Result<Vec<(AccountId, Profile)>> {
            Ok(vec![])
        }
    }

    fn nova() -> Profile {
        Profile::new("nova").unwrap().with_followers(10).with_following(2)
    }

    #[tokio::test]
    async fn test_resolve_username_memoized() {
        let cache = IdentityCache::shared();
        let source = FakeSource::default().with(42, nova());

        assert_eq!(resolve_username(&cache, &source, "nova").await.unwrap(), Some(42));
        assert_eq!(resolve_username(&cache, &source, "nova").await.unwrap(), Some(42));
        assert_eq!(source.calls(), 1);
        assert_eq!(cache.read().await.get_profile(42), Some(&nova()));
    }

    #[tokio::test]
    async fn test_resolve_unknown_username() {
        let cache = IdentityCache::shared();
        let source = FakeSource::default().with(42, nova());

        assert_eq!(resolve_username(&cache, &source, "NOVA").await.unwrap(), None);
        assert!(cache.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_indexes_returned_username() {
        let cache = IdentityCache::shared();
        let source = CaseInsensitiveSource(AtomicUsize::new(0));

        assert_eq!(resolve_username(&cache, &source, "Nova").await.unwrap(), Some(42));
        assert_eq!(cache.read().await.resolve_id("nova"), Some(42));
        assert_eq!(cache.read().await.resolve_id("Nova"), None);

        // Only the returned spelling is served from cache.
        resolve_username(&cache, &source, "nova").await.unwrap();
        resolve_username(&cache, &source, "Nova").await.unwrap();
        assert_eq!(source.0.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_resolve_user_ref() {
        let cache = IdentityCache::shared();
        let source = FakeSource::default().with(42, nova());

        let by_id = resolve_user_ref(&cache, &source, &UserRef::Id(7)).await.unwrap();
        assert_eq!(by_id, Some(7));
        assert_eq!(source.calls(), 0);

        let by_name = resolve_user_ref(&cache, &source, &"@nova".parse().unwrap()).await.unwrap();
        assert_eq!(by_name, Some(42));
    }

    #[tokio::test]
    async fn test_profile_use_cache() {
        let cache = IdentityCache::shared();
        let source = FakeSource::default().with(42, nova());

        assert_eq!(profile(&cache, &source, 42, true).await.unwrap(), Some(nova()));
        assert_eq!(profile(&cache, &source, 42, true).await.unwrap(), Some(nova()));
        assert_eq!(source.calls(), 1);

        profile(&cache, &source, 42, false).await.unwrap();
        assert_eq!(source.calls(), 2);

        assert_eq!(profile(&cache, &source, 404, true).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_profile_refetches_summary() {
        let cache = IdentityCache::shared();
        cache.write().await.record_profile(42, Profile::new("nova").unwrap());
        let source = FakeSource::default().with(42, nova());

        assert_eq!(profile(&cache, &source, 42, true).await.unwrap(), Some(nova()));
        assert_eq!(source.calls(), 1);
        assert!(cache.read().await.get_profile(42).unwrap().is_detailed());
    }

    #[tokio::test]
    async fn test_snapshots_fetched_once() {
        let cache = IdentityCache::shared();
        let mut source = FakeSource::default()
            .with(1, Profile::new("a").unwrap())
            .with(2, Profile::new("b").unwrap())
            .with(42, nova());
        source.following = vec![1, 42];
        source.followers = vec![42, 2];

        assert_eq!(following(&cache, &source, 100).await.unwrap(), vec![1, 42]);
        assert_eq!(following(&cache, &source, 100).await.unwrap(), vec![1, 42]);
        assert_eq!(followers(&cache, &source, 100).await.unwrap(), vec![42, 2]);
        assert_eq!(source.calls(), 2);

        let cache = cache.read().await;
        assert_eq!(cache.resolve_id("b"), Some(2));
        assert_eq!(cache.mutuals(), Some(vec![42]));
    }

    #[tokio::test]
    async fn test_snapshot_keeps_detailed_profiles() {
        let cache = IdentityCache::shared();
        let mut source = FakeSource::default().with(42, nova());
        source.followers = vec![42];

        profile(&cache, &source, 42, true).await.unwrap();
        followers(&cache, &source, 100).await.unwrap();
        assert_eq!(cache.read().await.get_profile(42), Some(&nova()));
    }

    #[tokio::test]
    async fn test_empty_snapshot_is_not_refetched() {
        let cache = IdentityCache::shared();
        let source = FakeSource::default();

        assert!(following(&cache, &source, 100).await.unwrap().is_empty());
        assert!(following(&cache, &source, 100).await.unwrap().is_empty());
        assert_eq!(source.calls(), 1);
        assert_eq!(cache.read().await.following(), Some(&[][..]));
    }

    #[tokio::test]
    async fn test_snapshots_belong_to_first_account() {
        let cache = IdentityCache::shared();

        assert_eq!(following(&cache, &ListSource, 100).await.unwrap(), vec![1000]);
        assert_eq!(following(&cache, &ListSource, 200).await.unwrap(), vec![2000]);
        assert_eq!(followers(&cache, &ListSource, 200).await.unwrap(), vec![2001]);
        assert_eq!(following(&cache, &ListSource, 100).await.unwrap(), vec![1000]);

        let cache = cache.read().await;
        assert_eq!(cache.snapshot_owner(), Some(100));
        assert_eq!(cache.following(), Some(&[1000][..]));
        assert_eq!(cache.followers(), None);
        // Profiles from other accounts' lists are still recorded.
        assert_eq!(cache.resolve_id("user2000"), Some(2000));
        assert_eq!(cache.resolve_id("user2001"), Some(2001));
    }

    #[tokio::test]
    async fn test_incomplete_list_is_not_stored() {
        let cache = IdentityCache::shared();
        let mut source = FakeSource::default().with(1, Profile::new("a").unwrap());
        source.following = vec![1];
        source.incomplete_lists = true;

        let err = following(&cache, &source, 100).await.unwrap_err();
        assert!(matches!(err, Error::ObjectNotComplete(_)));
        assert_eq!(cache.read().await.following(), None);

        source.incomplete_lists = false;
        assert_eq!(following(&cache, &source, 100).await.unwrap(), vec![1]);
        assert_eq!(source.calls(), 2);
    }
}
