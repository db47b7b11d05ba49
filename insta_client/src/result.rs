use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr, PickFirst};

use crate::error::Error;
use crate::response::{check_status, FriendshipsResponse, UserInfoResponse, WebProfileResponse, WebUser};

/// Full account record, as returned by a profile lookup.
#[serde_as]
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub pk: u64,
    pub username: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub biography: String,
    pub external_url: Option<String>,
    pub follower_count: u64,
    pub following_count: u64,
    #[serde(default)]
    pub media_count: u64,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub is_verified: bool,
}

/// Short account record, as found in follower and following lists.
#[serde_as]
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub pk: u64,
    pub username: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub is_verified: bool,
}

/// One page of a follower or following list.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct FollowPage {
    pub users: Vec<UserSummary>,
    /// Cursor for the next page, `None` on the last page.
    pub next_max_id: Option<String>,
}

impl FollowPage {
    pub fn is_last(&self) -> bool {
        self.next_max_id.is_none()
    }
}

impl From<WebUser> for UserInfo {
    fn from(user: WebUser) -> Self {
        Self {
            pk: user.id,
            username: user.username,
            full_name: user.full_name,
            biography: user.biography,
            external_url: user.external_url.filter(|u| !u.is_empty()),
            follower_count: user.edge_followed_by.count,
            following_count: user.edge_follow.count,
            media_count: user.edge_owner_to_timeline_media.map(|e| e.count).unwrap_or_default(),
            is_private: user.is_private,
            is_verified: user.is_verified,
        }
    }
}

impl TryFrom<WebProfileResponse> for UserInfo {
    type Error = Error;

    fn try_from(response: WebProfileResponse) -> Result<Self, Self::Error> {
        check_status(response.status.as_deref(), None)?;
        response
            .data
            .and_then(|d| d.user)
            .map(UserInfo::from)
            .ok_or(Error::NotFound("web_profile_info returned no user".to_string()))
    }
}

impl TryFrom<UserInfoResponse> for UserInfo {
    type Error = Error;

    fn try_from(response: UserInfoResponse) -> Result<Self, Self::Error> {
        check_status(response.status.as_deref(), response.message.as_deref())?;
        response
            .user
            .ok_or(Error::NotFound("user info returned no user".to_string()))
    }
}

impl TryFrom<FriendshipsResponse> for FollowPage {
    type Error = Error;

    fn try_from(response: FriendshipsResponse) -> Result<Self, Self::Error> {
        use serde_json::Value;

        check_status(response.status.as_deref(), response.message.as_deref())?;
        let next_max_id = match response.next_max_id {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.is_empty() => None,
            Some(Value::String(s)) => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(other) => return Err(Error::InvalidResponse(format!("next_max_id: {}", other))),
        };
        Ok(FollowPage {
            users: response.users,
            next_max_id,
        })
    }
}
