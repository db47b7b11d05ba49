mod paging;
mod source;
mod util;

pub use source::{InstagramSource, DEFAULT_MAX_PAGES, DEFAULT_PAGE_DELAY_MS};
pub use util::{profile_from_info, profile_from_summary};
