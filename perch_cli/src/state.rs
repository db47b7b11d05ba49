use std::sync::Arc;
use std::time::Duration;

use perch_core::{filter::BotFilter, AccountId, ProfileSource, SharedCache};

/// What every command gets handed: the one cache of this run and the source that fills it.
#[derive(Clone)]
pub struct AppState {
    pub cache: SharedCache,
    pub source: Arc<dyn ProfileSource>,
    /// Id of the logged-in account, owner of the follow snapshots.
    pub own_id: AccountId,
    pub bot_filter: Arc<BotFilter>,
    /// Pause between consecutive profile lookups.
    pub request_delay: Duration,
    pub max_profile_fetches: usize,
}
