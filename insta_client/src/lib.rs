mod consts;
mod error;
mod response;
mod result;

use reqwest::{header, Client, Response, StatusCode, Url};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use consts::*;
use response::{FriendshipsResponse, UserInfoResponse, WebProfileResponse};
pub use result::*;

pub use crate::error::Error;
use crate::error::Result;

use perch_util::parse_cookie_str;

#[derive(Debug, Clone)]
pub struct SessionCookie {
    pub sessionid: String,
    pub csrftoken: String,
    /// Id of the logged-in account.
    pub ds_user_id: u64,
}

impl Display for SessionCookie {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "sessionid={}; csrftoken={}; ds_user_id={}",
            self.sessionid, self.csrftoken, self.ds_user_id
        )
    }
}

impl FromStr for SessionCookie {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut cookie_map = parse_cookie_str(s)?;
        let mut take = |key: &str| cookie_map.remove(key).ok_or(Error::InvalidCookie(format!("missing {}", key)));
        let sessionid = take("sessionid")?;
        let csrftoken = take("csrftoken")?;
        let ds_user_id = take("ds_user_id")?
            .parse::<u64>()
            .map_err(|_| Error::InvalidCookie("ds_user_id is not a number".to_string()))?;
        Ok(SessionCookie {
            sessionid,
            csrftoken,
            ds_user_id,
        })
    }
}

#[derive(Debug, Clone)]
pub struct InstagramClient {
    pub session_cookie: SessionCookie,
    client: reqwest::Client,
}

impl InstagramClient {
    pub fn new(session_cookie: SessionCookie) -> Result<InstagramClient> {
        let invalid = |_| Error::InvalidCookie("cannot be used as header".to_string());

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::COOKIE,
            header::HeaderValue::from_str(&session_cookie.to_string()).map_err(invalid)?,
        );
        headers.insert(
            "x-csrftoken",
            header::HeaderValue::from_str(&session_cookie.csrftoken).map_err(invalid)?,
        );
        headers.insert("x-ig-app-id", header::HeaderValue::from_static(APP_ID));
        headers.insert("x-requested-with", header::HeaderValue::from_static("XMLHttpRequest"));

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(InstagramClient { session_cookie, client })
    }

    /// Id of the account the session belongs to.
    pub fn own_user_id(&self) -> u64 {
        self.session_cookie.ds_user_id
    }

    pub async fn user_by_username(&self, username: &str) -> Result<UserInfo> {
        let response: WebProfileResponse = self
            .get("web_profile_info", "/users/web_profile_info/", &[("username", username.to_string())])
            .await?;
        response.try_into()
    }

    pub async fn user_by_id(&self, user_id: u64) -> Result<UserInfo> {
        let response: UserInfoResponse = self.get("user_info", &format!("/users/{}/info/", user_id), &[]).await?;
        response.try_into()
    }

    pub async fn followers(&self, user_id: u64, max_id: Option<&str>) -> Result<FollowPage> {
        self.friendships("followers", user_id, max_id).await
    }

    pub async fn following(&self, user_id: u64, max_id: Option<&str>) -> Result<FollowPage> {
        self.friendships("following", user_id, max_id).await
    }
}

impl InstagramClient {
    async fn friendships(&self, kind: &str, user_id: u64, max_id: Option<&str>) -> Result<FollowPage> {
        let mut params = vec![("count", FRIENDSHIPS_PAGE_SIZE.to_string())];
        if let Some(max_id) = max_id {
            params.push(("max_id", max_id.to_string()));
        }
        let path = format!("/friendships/{}/{}/", user_id, kind);
        let response: FriendshipsResponse = self.get(kind, &path, &params).await?;
        response.try_into()
    }

    async fn get<R>(&self, name: &str, path: &str, params: &[(&str, String)]) -> Result<R>
    where
        R: serde::de::DeserializeOwned,
    {
        let url = Url::parse_with_params(&format!("{}{}", API, path), params)?;
        tracing::debug!("GET {}", url);
        let response: Response = self.client.get(url).send().await?;

        let status = response.status();
        let status_error = response.error_for_status_ref().err();
        let content = response.text().await?;
        log(name, &content).await?;

        match status {
            StatusCode::NOT_FOUND => return Err(Error::NotFound(path.to_string())),
            StatusCode::TOO_MANY_REQUESTS => return Err(Error::RateLimit(path.to_string())),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return Err(Error::NotLoggedIn(path.to_string())),
            _ => {}
        }
        if let Some(status_error) = status_error {
            return Err(status_error.into());
        }
        serde_json::from_str(&content).map_err(|e| e.into())
    }
}

async fn log(name: &str, content: &str) -> Result<()> {
    use std::path::PathBuf;
    use tokio::{fs::File, io::AsyncWriteExt};

    if let Ok(dir) = std::env::var("CLIENT_LOG_DIR") {
        let time = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let filepath = PathBuf::from(dir).join(format!("instagram_{}_{}.json", name, time));
        let mut file = File::create(filepath).await?;
        file.write_all(content.as_bytes()).await?;
    }
    Ok(())
}
