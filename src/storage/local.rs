//! Key/value persistence that degrades to cookies.

use chrono::{Duration, Utc};
use tracing::{debug, warn};

use super::cookie::{find_cookie, CookieJar};
use super::escape::{escape, unescape};
use super::store::KeyValueStore;
use crate::config::StorageConfig;

/// A primary store with a cookie jar behind it.
///
/// Reads and writes go to the store; when the store fails they go to the jar
/// instead. Failures of the jar are logged and swallowed.
pub struct LocalStorage<S, J> {
    store: S,
    jar: J,
    cookie_ttl: Duration,
    cookie_path: String,
}

impl<S: KeyValueStore, J: CookieJar> LocalStorage<S, J> {
    /// Combine a store and a jar with default cookie settings.
    pub fn new(store: S, jar: J) -> Self {
        Self::from_config(store, jar, &StorageConfig::default())
    }

    /// Combine a store and a jar with configured cookie settings.
    pub fn from_config(store: S, jar: J, config: &StorageConfig) -> Self {
        Self {
            store,
            jar,
            cookie_ttl: Duration::days(i64::from(config.cookie_ttl_days)),
            cookie_path: config.cookie_path.clone(),
        }
    }

    /// Read `key`, falling back to the cookie jar when the store fails.
    pub fn get(&self, key: &str) -> Option<String> {
        match self.store.get_item(key) {
            Ok(value) => value,
            Err(e) => {
                debug!(key = %key, error = %e, "Store read failed, reading cookie");
                match self.jar.cookie() {
                    Ok(header) => find_cookie(&header, key).map(|raw| unescape(&raw)),
                    Err(e) => {
                        warn!(key = %key, error = %e, "Cookie read failed");
                        None
                    }
                }
            }
        }
    }

    /// Write `key`, falling back to a cookie when the store fails.
    pub fn set(&self, key: &str, value: &str) {
        let Err(e) = self.store.set_item(key, value) else {
            return;
        };
        debug!(key = %key, error = %e, "Store write failed, writing cookie");

        let Some(expires) = Utc::now().checked_add_signed(self.cookie_ttl) else {
            warn!(key = %key, "Cookie expiry out of range, value dropped");
            return;
        };
        let assignment = format!(
            "{}={};expires={};path={};",
            key,
            escape(value),
            expires.format("%a, %d %b %Y %H:%M:%S GMT"),
            self.cookie_path
        );

        if let Err(e) = self.jar.set_cookie(&assignment) {
            warn!(key = %key, error = %e, "Cookie write failed, value dropped");
        }
    }

    /// The fallback jar.
    pub fn jar(&self) -> &J {
        &self.jar
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, ToolbeltError};
    use crate::storage::{MemoryCookieJar, MemoryStore, UnavailableStore};

    struct BrokenJar;

    impl CookieJar for BrokenJar {
        fn cookie(&self) -> Result<String> {
            Err(ToolbeltError::Storage("no document".to_string()))
        }

        fn set_cookie(&self, _assignment: &str) -> Result<()> {
            Err(ToolbeltError::Storage("no document".to_string()))
        }
    }

    #[test]
    fn test_uses_store_when_available() {
        let storage = LocalStorage::new(MemoryStore::new(), MemoryCookieJar::new());
        assert_eq!(storage.get("volume"), None);

        storage.set("volume", "0.8");
        assert_eq!(storage.get("volume"), Some("0.8".to_string()));
        assert_eq!(storage.jar().cookie().unwrap(), "");
    }

    #[test]
    fn test_falls_back_to_cookie() {
        let storage = LocalStorage::new(UnavailableStore, MemoryCookieJar::new());
        assert_eq!(storage.get("title"), None);

        storage.set("title", "a b;c=€");
        assert_eq!(storage.get("title"), Some("a b;c=€".to_string()));
        assert_eq!(storage.jar().cookie().unwrap(), "title=a%20b%3Bc%3D%u20AC");
    }

    #[test]
    fn test_cookie_assignment_uses_config() {
        let config = StorageConfig {
            cookie_ttl_days: 1,
            cookie_path: "/player".to_string(),
            ..StorageConfig::default()
        };
        let storage = LocalStorage::from_config(UnavailableStore, MemoryCookieJar::new(), &config);
        storage.set("k", "v");
        assert_eq!(storage.get("k"), Some("v".to_string()));
    }

    #[test]
    fn test_unrepresentable_expiry_drops_cookie() {
        let config = StorageConfig {
            cookie_ttl_days: u32::MAX,
            ..StorageConfig::default()
        };
        let storage = LocalStorage::from_config(UnavailableStore, MemoryCookieJar::new(), &config);
        storage.set("k", "v");
        assert_eq!(storage.get("k"), None);
        assert_eq!(storage.jar().cookie().unwrap(), "");
    }

    #[test]
    fn test_both_failing_is_silent() {
        let storage = LocalStorage::new(UnavailableStore, BrokenJar);
        storage.set("k", "v");
        assert_eq!(storage.get("k"), None);
    }
}
