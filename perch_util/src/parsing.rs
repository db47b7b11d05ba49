use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParsingError {
    #[error("Invalid key-value list: {0}")]
    InvalidKeyVal(String),
    #[error("Invalid user reference: {0}")]
    InvalidUserRef(String),
}

type Result<T> = std::result::Result<T, ParsingError>;

/// A way to point at an account from the command line or a list file.
/// Numeric input is taken as an account id, everything else as a username.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UserRef {
    Id(u64),
    Username(String),
}

impl Display for UserRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRef::Id(id) => write!(f, "{}", id),
            UserRef::Username(username) => write!(f, "@{}", username),
        }
    }
}

impl FromStr for UserRef {
    type Err = ParsingError;

    fn from_str(s: &str) -> Result<Self> {
        parse_user_ref(s)
    }
}

pub fn parse_cookie_str(cookie_str: &str) -> Result<HashMap<String, String>> {
    let mut results = HashMap::new();
    for pair in cookie_str.split(';') {
        if !pair.contains('=') {
            continue;
        }
        let (key, value) = pair
            .split_once('=')
            .ok_or(ParsingError::InvalidKeyVal(pair.to_string()))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(ParsingError::InvalidKeyVal(pair.to_string()));
        }
        results.insert(key.to_string(), value.trim().trim_matches('"').to_string());
    }
    Ok(results)
}

/// Parse `12345`, `@name`, `name` or a profile URL like `https://www.instagram.com/name/`.
/// Usernames keep their case; the platform treats them as given.
pub fn parse_user_ref(s: &str) -> Result<UserRef> {
    let s = s.trim();
    if s.is_empty() {
        return Err(ParsingError::InvalidUserRef(s.to_string()));
    }
    if s.bytes().all(|b| b.is_ascii_digit()) {
        return s
            .parse::<u64>()
            .map(UserRef::Id)
            .map_err(|_| ParsingError::InvalidUserRef(s.to_string()));
    }

    let name = if s.starts_with("http://") || s.starts_with("https://") {
        let url = Url::parse(s).map_err(|_| ParsingError::InvalidUserRef(s.to_string()))?;
        url.path_segments()
            .and_then(|mut segments| segments.find(|seg| !seg.is_empty()))
            .map(|seg| seg.to_string())
            .ok_or(ParsingError::InvalidUserRef(s.to_string()))?
    } else {
        s.strip_prefix('@').unwrap_or(s).to_string()
    };

    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return Err(ParsingError::InvalidUserRef(s.to_string()));
    }
    Ok(UserRef::Username(name))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_cookie_str() {
        let cookies = parse_cookie_str("sessionid=abc%3A1; csrftoken=\"tok\";ds_user_id=42; flag").unwrap();
        assert_eq!(cookies["sessionid"], "abc%3A1");
        assert_eq!(cookies["csrftoken"], "tok");
        assert_eq!(cookies["ds_user_id"], "42");
        assert!(!cookies.contains_key("flag"));
    }

    #[test]
    fn test_parse_cookie_str_empty_key() {
        assert!(parse_cookie_str("=value").is_err());
    }

    #[test]
    fn test_parse_user_ref() {
        assert_eq!(parse_user_ref("42").unwrap(), UserRef::Id(42));
        assert_eq!(parse_user_ref(" @Nova ").unwrap(), UserRef::Username("Nova".to_string()));
        assert_eq!(
            parse_user_ref("https://www.instagram.com/nova.art/").unwrap(),
            UserRef::Username("nova.art".to_string())
        );
        assert!(parse_user_ref("").is_err());
        assert!(parse_user_ref("@").is_err());
        assert!(parse_user_ref("two words").is_err());
    }

    #[test]
    fn test_user_ref_display() {
        assert_eq!(UserRef::Id(7).to_string(), "7");
        assert_eq!("nova".parse::<UserRef>().unwrap().to_string(), "@nova");
    }
}
