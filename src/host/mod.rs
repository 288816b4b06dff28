//! Host identity and exclusion
//!
//! A [`Host`] names one federation server. All membership tests in the
//! frontier compare normalized hosts, so two spellings of the same server
//! ("Mastodon.Social." and "mastodon.social") are the same key.

mod exclusion;

pub use exclusion::{matches_suffix, ExclusionFilter, BUILTIN_EXCLUSIONS};

use std::borrow::Borrow;
use std::fmt;
use url::Url;

/// A normalized federation server hostname (optionally with a port)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Host(String);

/// Characters that would turn an identifier into more than an authority
const NON_AUTHORITY: &[char] = &['/', '?', '#', '@', '\\', '%'];

impl Host {
    /// Normalizes a raw hostname
    ///
    /// Trims surrounding whitespace and drops one trailing root dot, then
    /// canonicalizes the rest the way the HTTP client will resolve it:
    /// lowercase, IDNA to punycode, explicit port kept (except the default 80).
    /// Identifiers carrying a path, query, fragment, userinfo or percent
    /// escape are rejected, so the name that is checked is the name that is
    /// contacted.
    ///
    /// # Returns
    ///
    /// * `Some(Host)` - The normalized host
    /// * `None` - If nothing is left after normalization, or it is not a bare authority
    ///
    /// # Examples
    ///
    /// ```
    /// use peer_ripple::Host;
    ///
    /// let host = Host::parse("  Mastodon.Social. ").unwrap();
    /// assert_eq!(host.as_str(), "mastodon.social");
    /// assert!(Host::parse("   ").is_none());
    /// assert!(Host::parse("social.example/about").is_none());
    /// ```
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let trimmed = trimmed.strip_suffix('.').unwrap_or(trimmed);
        if trimmed.is_empty()
            || trimmed.contains(NON_AUTHORITY)
            || trimmed.chars().any(|c| c.is_whitespace() || c.is_control())
        {
            return None;
        }

        let url = Url::parse(&format!("http://{}/", trimmed)).ok()?;
        let name = url.host_str()?;
        let name = name.strip_suffix('.').unwrap_or(name);
        if name.is_empty() {
            return None;
        }

        Some(match url.port() {
            Some(port) => Self(format!("{}:{}", name, port)),
            None => Self(name.to_string()),
        })
    }

    /// Returns the hostname without any port
    ///
    /// ```
    /// use peer_ripple::Host;
    ///
    /// assert_eq!(Host::parse("Social.Example:8443").unwrap().name(), "social.example");
    /// assert_eq!(Host::parse("[::1]:8080").unwrap().name(), "[::1]");
    /// ```
    pub fn name(&self) -> &str {
        let s = self.0.as_str();
        if s.starts_with('[') {
            return s.find(']').map_or(s, |end| &s[..=end]);
        }
        s.rsplit_once(':').map_or(s, |(name, _)| name)
    }

    /// Returns the normalized hostname
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Host {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Host {
    fn borrow(&self) -> &str {
        &self.0
    }
}
