use serde::Deserialize;
use serde_json::Value;
use serde_with::{serde_as, DisplayFromStr, PickFirst};

use crate::result::{UserInfo, UserSummary};

// users/web_profile_info

#[derive(Deserialize, Debug)]
pub struct WebProfileResponse {
    pub data: Option<WebProfileData>,
    pub status: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct WebProfileData {
    pub user: Option<WebUser>,
}

#[derive(Deserialize, Debug)]
pub struct EdgeCount {
    pub count: u64,
}

#[serde_as]
#[derive(Deserialize, Debug)]
pub struct WebUser {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub biography: String,
    pub external_url: Option<String>,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub is_verified: bool,
    pub edge_followed_by: EdgeCount,
    pub edge_follow: EdgeCount,
    pub edge_owner_to_timeline_media: Option<EdgeCount>,
}

// users/{id}/info

#[derive(Deserialize, Debug)]
pub struct UserInfoResponse {
    pub user: Option<UserInfo>,
    pub status: Option<String>,
    pub message: Option<String>,
}

// friendships/{id}/followers, friendships/{id}/following

#[derive(Deserialize, Debug)]
pub struct FriendshipsResponse {
    #[serde(default)]
    pub users: Vec<UserSummary>,
    /// Sometimes a string, sometimes a number.
    pub next_max_id: Option<Value>,
    pub status: Option<String>,
    pub message: Option<String>,
}

pub fn check_status(status: Option<&str>, message: Option<&str>) -> crate::error::Result<()> {
    match status {
        None | Some("ok") => Ok(()),
        Some(status) => Err(crate::error::Error::InvalidResponse(format!(
            "status `{}`: {}",
            status,
            message.unwrap_or_default()
        ))),
    }
}
