pub const API: &str = "https://i.instagram.com/api/v1";
pub const APP_ID: &str = "936619743392459";
pub const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

pub const FRIENDSHIPS_PAGE_SIZE: u32 = 100;
