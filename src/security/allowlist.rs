//! Host allowlist enforcement for the passthrough path.
//!
//! # Responsibilities
//! - Decide whether a target URL (or bare hostname) may be fetched
//! - Match entries exactly or as a domain suffix
//!
//! # Design Decisions
//! - Only the hostname is compared; scheme and port are ignored here
//! - Comparison is case-sensitive on the parsed hostname
//! - Malformed input is rejected, never raised to the caller
//! - Suffix matching requires a label boundary ("evilytimg.com" does not match "ytimg.com")

use url::Url;

pub use crate::config::schema::{AllowlistEntry, MatchMode};

impl AllowlistEntry {
    /// Returns true if `host` is covered by this entry.
    pub fn matches(&self, host: &str) -> bool {
        match self.match_mode {
            MatchMode::Exact => host == self.hostname,
            MatchMode::Suffix => {
                host == self.hostname
                    || host
                        .strip_suffix(self.hostname.as_str())
                        .is_some_and(|rest| rest.ends_with('.'))
            }
        }
    }
}

/// Immutable set of hosts the gateway may contact on behalf of callers.
#[derive(Debug, Clone, Default)]
pub struct Allowlist {
    entries: Vec<AllowlistEntry>,
}

impl Allowlist {
    pub fn new(entries: Vec<AllowlistEntry>) -> Self {
        Self { entries }
    }

    /// Parse `target` as an absolute URL and check its hostname.
    pub fn is_allowed(&self, target: &str) -> bool {
        match Url::parse(target) {
            Ok(url) => self.is_url_allowed(&url),
            Err(_) => false,
        }
    }

    /// Check the hostname of an already parsed URL.
    pub fn is_url_allowed(&self, url: &Url) -> bool {
        url.host_str()
            .map(|host| self.is_host_allowed(host))
            .unwrap_or(false)
    }

    /// Check a bare hostname.
    pub fn is_host_allowed(&self, host: &str) -> bool {
        !host.is_empty() && self.entries.iter().any(|e| e.matches(host))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowlist() -> Allowlist {
        Allowlist::new(vec![
            AllowlistEntry::suffix("ytimg.com"),
            AllowlistEntry::exact("api.example.org"),
        ])
    }

    #[test]
    fn test_suffix_match() {
        let list = allowlist();
        assert!(list.is_allowed("https://ytimg.com/vi/abc/hq.jpg"));
        assert!(list.is_allowed("https://i.ytimg.com/vi/abc/hq.jpg"));
        assert!(list.is_allowed("http://a.b.ytimg.com:8443/x?y=z"));
        assert!(!list.is_allowed("https://evilytimg.com/"));
        assert!(!list.is_allowed("https://ytimg.com.evil.net/"));
    }

    #[test]
    fn test_exact_match() {
        let list = allowlist();
        assert!(list.is_allowed("https://api.example.org/v1"));
        assert!(!list.is_allowed("https://sub.api.example.org/v1"));
        assert!(!list.is_allowed("https://example.org/"));
    }

    #[test]
    fn test_scheme_and_port_ignored() {
        let list = allowlist();
        assert!(list.is_allowed("ftp://i.ytimg.com/file"));
        assert!(list.is_allowed("https://api.example.org:9999/"));
    }

    #[test]
    fn test_malformed_input_rejected() {
        let list = allowlist();
        assert!(!list.is_allowed("notadomain"));
        assert!(!list.is_allowed(""));
        assert!(!list.is_allowed("://ytimg.com"));
        assert!(!list.is_allowed("mailto:someone@ytimg.com"));
    }

    #[test]
    fn test_hostname_case_sensitive() {
        let list = allowlist();
        assert!(!list.is_host_allowed("I.YTIMG.COM"));
        // URL parsing normalizes the host before comparison.
        assert!(list.is_allowed("https://I.YTIMG.COM/"));
    }

    #[test]
    fn test_empty_allowlist_rejects_everything() {
        let list = Allowlist::default();
        assert!(!list.is_allowed("https://i.ytimg.com/"));
    }
}
