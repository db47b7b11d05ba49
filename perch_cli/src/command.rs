use itertools::Itertools;
use serde::Serialize;

use std::path::PathBuf;
use std::time::Duration;

use perch_core::{lookup, AccountId, Profile};
use perch_util::UserRef;

use crate::error::{Result, UsageError};
use crate::state::AppState;
use crate::util::{retry, timeout, DEFAULT_TIMEOUT_MS, LIST_TIMEOUT_MS};

pub const USAGE: &str = "\
usage: perch <command>

commands:
  resolve <user>...           print the account id of each username (or username of each id)
  profile <user>              print the profile of an account as JSON
  whitelist [--out <path>]    list mutual followers of the logged-in account, one id per line
  unfollowers                 list followed accounts that don't follow back
  bots                        list followers that look like bots";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Resolve(Vec<UserRef>),
    Profile(UserRef),
    Whitelist { out: Option<PathBuf> },
    Unfollowers,
    Bots,
}

impl Command {
    pub fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut args = args.into_iter();
        let name = args.next().ok_or(UsageError("missing command".to_string()))?;
        let rest = args.collect::<Vec<_>>();

        let command = match (name.as_str(), rest.as_slice()) {
            ("resolve", []) => return Err(UsageError("resolve needs at least one user".to_string()).into()),
            ("resolve", users) => Command::Resolve(
                users
                    .iter()
                    .map(|u| u.parse::<UserRef>())
                    .collect::<std::result::Result<Vec<_>, _>>()?,
            ),
            ("profile", [user]) => Command::Profile(user.parse()?),
            ("whitelist", []) => Command::Whitelist { out: None },
            ("whitelist", [flag, path]) if flag == "--out" => Command::Whitelist {
                out: Some(PathBuf::from(path)),
            },
            ("unfollowers", []) => Command::Unfollowers,
            ("bots", []) => Command::Bots,
            (name, args) => {
                return Err(UsageError(format!("invalid command: {} {}", name, args.join(" ")).trim().to_string()).into())
            }
        };
        Ok(command)
    }
}

/// Run one command and return what should be printed.
pub async fn run(state: &AppState, command: Command) -> Result<String> {
    match command {
        Command::Resolve(users) => resolve(state, &users).await,
        Command::Profile(user) => profile(state, &user).await,
        Command::Whitelist { out } => whitelist(state, out).await,
        Command::Unfollowers => unfollowers(state).await,
        Command::Bots => bots(state).await,
    }
}

#[derive(Debug, Serialize)]
struct ProfileOutput<'a> {
    id: AccountId,
    #[serde(flatten)]
    profile: &'a Profile,
}

/// One line per user: the input, then the id of a username or the username of an id.
async fn resolve(state: &AppState, users: &[UserRef]) -> Result<String> {
    let mut lines = Vec::new();
    for user in users {
        let resolved = match user {
            UserRef::Username(_) => resolve_ref(state, user).await?.map(|id| id.to_string()),
            UserRef::Id(id) => fetch_profile(state, *id).await?.map(|p| p.username().to_string()),
        };
        lines.push(format!("{}\t{}", user, resolved.as_deref().unwrap_or("-")));
    }
    Ok(lines.join("\n"))
}

async fn profile(state: &AppState, user: &UserRef) -> Result<String> {
    let profile = match resolve_ref(state, user).await? {
        Some(id) => fetch_profile(state, id).await?.map(|p| (id, p)),
        None => None,
    };
    let Some((id, profile)) = profile else {
        return Err(anyhow::anyhow!("Account {} not found", user).into());
    };
    let output = ProfileOutput { id, profile: &profile };
    Ok(serde_json::to_string_pretty(&output)?)
}

async fn whitelist(state: &AppState, out: Option<PathBuf>) -> Result<String> {
    load_snapshots(state).await?;
    let mutuals = state.cache.read().await.mutuals().unwrap_or_default();
    let content = mutuals.iter().join("\n");

    match out {
        Some(path) => {
            tokio::fs::write(&path, format!("{}\n", content)).await?;
            tracing::info!("Wrote whitelist of {} accounts to {}", mutuals.len(), path.display());
            Ok(String::new())
        }
        None => Ok(content),
    }
}

async fn unfollowers(state: &AppState) -> Result<String> {
    load_snapshots(state).await?;
    let cache = state.cache.read().await;
    let lines = cache
        .non_followers()
        .unwrap_or_default()
        .into_iter()
        .map(|id| format!("{}\t{}", id, cache.username_of(id).unwrap_or("-")))
        .join("\n");
    Ok(lines)
}

async fn bots(state: &AppState) -> Result<String> {
    let followers = own_followers(state).await?;
    let filter = state.bot_filter.as_ref();
    let mut lines = Vec::new();
    let mut fetched = 0;
    let mut warned = false;

    for id in followers {
        if filter.whitelist.contains(&id) {
            continue;
        }
        let Some(mut profile) = state.cache.read().await.get_profile(id).cloned() else {
            continue;
        };

        // Summaries can already be caught by stop words; only look up the rest.
        if !profile.is_detailed() && filter.check(id, &profile).is_none() {
            if fetched < state.max_profile_fetches {
                if fetched > 0 {
                    tokio::time::sleep(state.request_delay).await;
                }
                fetched += 1;
                if let Some(detailed) = fetch_profile(state, id).await? {
                    profile = detailed;
                }
            } else if !warned {
                tracing::warn!("Reached {} profile lookups, checking the rest by summary only", fetched);
                warned = true;
            }
        }

        if let Some(reason) = filter.check(id, &profile) {
            tracing::info!("Follower {} looks like a bot: {}", profile, reason);
            lines.push(format!("{}\t{}\t{}", profile.username(), id, reason));
        }
    }
    Ok(lines.join("\n"))
}

// MARK: Lookups with timeout and retry

async fn resolve_ref(state: &AppState, user: &UserRef) -> Result<Option<AccountId>> {
    let (cache, source) = (&state.cache, state.source.as_ref());
    let duration = Duration::from_millis(DEFAULT_TIMEOUT_MS);
    retry(move || timeout(duration, lookup::resolve_user_ref(cache, source, user))).await
}

async fn fetch_profile(state: &AppState, id: AccountId) -> Result<Option<Profile>> {
    let (cache, source) = (&state.cache, state.source.as_ref());
    let duration = Duration::from_millis(DEFAULT_TIMEOUT_MS);
    retry(move || timeout(duration, lookup::profile(cache, source, id, true))).await
}

async fn own_following(state: &AppState) -> Result<Vec<AccountId>> {
    let (cache, source, own_id) = (&state.cache, state.source.as_ref(), state.own_id);
    let duration = Duration::from_millis(LIST_TIMEOUT_MS);
    retry(move || timeout(duration, lookup::following(cache, source, own_id))).await
}

async fn own_followers(state: &AppState) -> Result<Vec<AccountId>> {
    let (cache, source, own_id) = (&state.cache, state.source.as_ref(), state.own_id);
    let duration = Duration::from_millis(LIST_TIMEOUT_MS);
    retry(move || timeout(duration, lookup::followers(cache, source, own_id))).await
}

async fn load_snapshots(state: &AppState) -> Result<()> {
    let following = own_following(state).await?;
    let followers = own_followers(state).await?;
    tracing::info!("Following {} accounts, followed by {}", following.len(), followers.len());
    Ok(())
}
