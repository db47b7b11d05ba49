pub mod cache;
pub mod error;
pub mod filter;
pub mod lookup;
pub mod profile;

pub use cache::{IdentityCache, SharedCache};
pub use error::*;
pub use lookup::ProfileSource;
pub use profile::{AccountId, Profile};
