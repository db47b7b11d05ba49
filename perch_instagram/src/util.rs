use insta_client::{UserInfo, UserSummary};
use perch_core::{AccountId, Error, Profile, Result};

fn non_empty(s: &str) -> Option<String> {
    Some(s.trim()).filter(|s| !s.is_empty()).map(str::to_string)
}

pub fn profile_from_info(info: &UserInfo) -> Result<(AccountId, Profile)> {
    let mut profile = Profile::new(info.username.as_str())?
        .with_followers(info.follower_count)
        .with_following(info.following_count)
        .with_media_count(info.media_count)
        .private(info.is_private)
        .verified(info.is_verified);
    profile.full_name = non_empty(&info.full_name);
    profile.biography = non_empty(&info.biography);
    profile.external_url = info.external_url.as_deref().and_then(non_empty);
    Ok((info.pk, profile))
}

pub fn profile_from_summary(summary: &UserSummary) -> Result<(AccountId, Profile)> {
    let mut profile = Profile::new(summary.username.as_str())?
        .private(summary.is_private)
        .verified(summary.is_verified);
    profile.full_name = non_empty(&summary.full_name);
    Ok((summary.pk, profile))
}

/// Platform failures that callers may want to tell apart keep their own kind,
/// the rest are passed through as `Other`.
pub(crate) fn core_error(err: insta_client::Error) -> Error {
    match err {
        insta_client::Error::RateLimit(s) => Error::RateLimit(s),
        insta_client::Error::NotLoggedIn(s) => Error::NotLoggedIn(s),
        err => Error::Other(anyhow::Error::from(err)),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn info() -> UserInfo {
        serde_json::from_str(
            r#"{"pk": "42", "username": "nova", "full_name": " Nova ", "biography": "",
                "external_url": "https://nova.art", "follower_count": 10, "following_count": 3}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_profile_from_info() {
        let (id, profile) = profile_from_info(&info()).unwrap();
        assert_eq!(id, 42);
        assert_eq!(profile.username(), "nova");
        assert_eq!(profile.full_name.as_deref(), Some("Nova"));
        assert_eq!(profile.biography, None);
        assert_eq!(profile.external_url.as_deref(), Some("https://nova.art"));
        assert_eq!(profile.follower_count, Some(10));
        assert_eq!(profile.media_count, Some(0));
        assert!(profile.is_detailed());
    }

    #[test]
    fn test_profile_from_summary() {
        let summary: UserSummary =
            serde_json::from_str(r#"{"pk": 7, "username": "Bot_Shop", "is_private": true}"#).unwrap();
        let (id, profile) = profile_from_summary(&summary).unwrap();
        assert_eq!(id, 7);
        assert_eq!(profile.username(), "Bot_Shop");
        assert!(profile.is_private);
        assert!(!profile.is_detailed());
    }

    #[test]
    fn test_core_error() {
        assert!(matches!(
            core_error(insta_client::Error::RateLimit("x".to_string())),
            Error::RateLimit(_)
        ));
        assert!(matches!(
            core_error(insta_client::Error::NotFound("x".to_string())),
            Error::Other(_)
        ));
    }
}
