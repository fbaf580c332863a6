//! Local persistence with a cookie fallback.

mod cookie;
mod escape;
mod local;
mod store;

pub use cookie::{find_cookie, CookieJar, FileCookieJar, MemoryCookieJar};
pub use escape::{escape, unescape};
pub use local::LocalStorage;
pub use store::{FileStore, KeyValueStore, MemoryStore, UnavailableStore};
