//! Cookie jars (the `document.cookie` role).
//!
//! A jar exposes the cookie header string for reads and accepts one
//! `name=value;attr=...` assignment per write. Assignments whose `expires`
//! is in the past delete the cookie.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use regex::Regex;
use std::path::{Path, PathBuf};

use crate::error::{Result, ToolbeltError};

/// Textual cookie storage.
pub trait CookieJar: Send + Sync {
    /// All live cookies as `a=1; b=2`.
    fn cookie(&self) -> Result<String>;

    /// Apply one assignment such as `k=v;expires=...;path=/;`.
    fn set_cookie(&self, assignment: &str) -> Result<()>;
}

/// Find the raw (still escaped) value of `name` in a cookie header string.
pub fn find_cookie(header: &str, name: &str) -> Option<String> {
    let pattern = format!("(^| ){}=([^;]*)(;|$)", regex::escape(name));
    let regex = Regex::new(&pattern).ok()?;
    regex
        .captures(header)
        .and_then(|caps| caps.get(2))
        .map(|value| value.as_str().to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Assignment {
    name: String,
    value: String,
    expires: Option<DateTime<Utc>>,
}

impl Assignment {
    fn parse(assignment: &str) -> Result<Self> {
        let mut parts = assignment.split(';');
        let pair = parts.next().unwrap_or_default();
        let (name, value) = pair
            .split_once('=')
            .ok_or_else(|| ToolbeltError::Storage(format!("Malformed cookie: {}", assignment)))?;

        let expires = parts
            .filter_map(|attr| attr.split_once('='))
            .find(|(key, _)| key.trim().eq_ignore_ascii_case("expires"))
            .and_then(|(_, when)| DateTime::parse_from_rfc2822(when.trim()).ok())
            .map(|when| when.with_timezone(&Utc));

        Ok(Self {
            name: name.trim().to_string(),
            value: value.trim().to_string(),
            expires,
        })
    }

    fn is_expired(&self) -> bool {
        self.expires.map(|at| at <= Utc::now()).unwrap_or(false)
    }

    fn apply(self, entries: &mut Vec<(String, String)>) {
        let existing = entries.iter().position(|(name, _)| *name == self.name);
        match (existing, self.is_expired()) {
            (Some(index), true) => {
                entries.remove(index);
            }
            (Some(index), false) => entries[index].1 = self.value,
            (None, true) => {}
            (None, false) => entries.push((self.name, self.value)),
        }
    }
}

fn render(entries: &[(String, String)]) -> String {
    entries
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join("; ")
}

/// In-process cookie jar.
#[derive(Debug, Default)]
pub struct MemoryCookieJar {
    entries: RwLock<Vec<(String, String)>>,
}

impl MemoryCookieJar {
    /// Create an empty jar.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CookieJar for MemoryCookieJar {
    fn cookie(&self) -> Result<String> {
        Ok(render(&self.entries.read()))
    }

    fn set_cookie(&self, assignment: &str) -> Result<()> {
        let assignment = Assignment::parse(assignment)?;
        assignment.apply(&mut self.entries.write());
        Ok(())
    }
}

/// Cookie jar persisted as one `name=value` line per cookie.
#[derive(Debug)]
pub struct FileCookieJar {
    path: PathBuf,
    lock: RwLock<()>,
}

impl FileCookieJar {
    /// Jar backed by `path`. The file is created on first write.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: RwLock::new(()),
        }
    }

    fn load(&self) -> Result<Vec<(String, String)>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        Ok(contents
            .lines()
            .filter_map(|line| line.split_once('='))
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect())
    }
}

impl CookieJar for FileCookieJar {
    fn cookie(&self) -> Result<String> {
        let _guard = self.lock.read();
        Ok(render(&self.load()?))
    }

    fn set_cookie(&self, assignment: &str) -> Result<()> {
        let _guard = self.lock.write();
        let assignment = Assignment::parse(assignment)?;
        let mut entries = self.load()?;
        assignment.apply(&mut entries);

        let contents: String = entries
            .iter()
            .map(|(name, value)| format!("{}={}\n", name, value))
            .collect();
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_cookie() {
        let header = "theme=dark; volume=0.5; v=1";
        assert_eq!(find_cookie(header, "volume"), Some("0.5".to_string()));
        assert_eq!(find_cookie(header, "theme"), Some("dark".to_string()));
        assert_eq!(find_cookie(header, "v"), Some("1".to_string()));
        assert_eq!(find_cookie(header, "olume"), None);
        assert_eq!(find_cookie(header, "missing"), None);
    }

    #[test]
    fn test_find_cookie_escapes_name() {
        assert_eq!(find_cookie("a.b=1; axb=2", "a.b"), Some("1".to_string()));
        assert_eq!(find_cookie("axb=2", "a.b"), None);
    }

    #[test]
    fn test_memory_jar_set_and_read() {
        let jar = MemoryCookieJar::new();
        jar.set_cookie("a=1;path=/;").unwrap();
        jar.set_cookie("b=2").unwrap();
        jar.set_cookie("a=3").unwrap();
        assert_eq!(jar.cookie().unwrap(), "a=3; b=2");
    }

    #[test]
    fn test_memory_jar_expired_assignment_deletes() {
        let jar = MemoryCookieJar::new();
        jar.set_cookie("a=1").unwrap();
        jar.set_cookie("a=;expires=Thu, 01 Jan 1970 00:00:00 GMT;path=/;")
            .unwrap();
        assert_eq!(jar.cookie().unwrap(), "");
    }

    #[test]
    fn test_memory_jar_future_expiry_is_kept() {
        let jar = MemoryCookieJar::new();
        jar.set_cookie("a=1;expires=Fri, 01 Jan 2100 00:00:00 GMT;path=/;")
            .unwrap();
        assert_eq!(jar.cookie().unwrap(), "a=1");
    }

    #[test]
    fn test_malformed_assignment() {
        let jar = MemoryCookieJar::new();
        assert!(matches!(jar.set_cookie("novalue"), Err(ToolbeltError::Storage(_))));
    }

    #[test]
    fn test_file_jar_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookies");

        let jar = FileCookieJar::new(&path);
        jar.set_cookie("a=1;path=/;").unwrap();
        jar.set_cookie("b=x%20y").unwrap();

        let reopened = FileCookieJar::new(&path);
        assert_eq!(reopened.cookie().unwrap(), "a=1; b=x%20y");
    }
}
