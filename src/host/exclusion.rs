use crate::config::ExclusionEntry;
use crate::host::Host;

/// Domains that are never visited, whatever the configuration says
///
/// These are known to be abusive, long-term unreachable, or asked to be left
/// alone.
pub const BUILTIN_EXCLUSIONS: &[&str] = &["activitypub-troll.cf", "noho.st", "jpbutler.com"];

/// Checks whether a normalized host ends with a denylisted suffix
///
/// Matching is a plain string suffix test, so "noho.st" also covers
/// "someone.noho.st".
///
/// # Examples
///
/// ```
/// use peer_ripple::host::matches_suffix;
///
/// assert!(matches_suffix("noho.st", "noho.st"));
/// assert!(matches_suffix("noho.st", "someone.noho.st"));
/// assert!(!matches_suffix("noho.st", "noho.st.example"));
/// ```
pub fn matches_suffix(suffix: &str, candidate: &str) -> bool {
    candidate.ends_with(suffix)
}

/// Static predicate deciding which hosts must never be visited
///
/// Applied to every host popped from the frontier and to every peer before it
/// is merged, so an excluded host is never examined and never left pending.
#[derive(Debug, Clone)]
pub struct ExclusionFilter {
    suffixes: Vec<String>,
}

impl ExclusionFilter {
    /// Creates a filter holding only the built-in denylist
    pub fn builtin() -> Self {
        Self {
            suffixes: BUILTIN_EXCLUSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Creates a filter holding the built-in denylist plus operator entries
    pub fn with_extra(entries: &[ExclusionEntry]) -> Self {
        let mut filter = Self::builtin();
        for entry in entries {
            let suffix = entry.suffix.trim().to_ascii_lowercase();
            if !suffix.is_empty() && !filter.suffixes.contains(&suffix) {
                filter.suffixes.push(suffix);
            }
        }
        filter
    }

    /// Returns the suffixes this filter rejects
    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }

    /// Returns true if `host` is not a valid host or matches a denylisted suffix
    pub fn is_excluded(&self, host: &str) -> bool {
        match Host::parse(host) {
            Some(host) => self.is_excluded_host(&host),
            None => true,
        }
    }

    /// Same as [`ExclusionFilter::is_excluded`] for an already normalized host
    ///
    /// Only the hostname is matched; a port never hides a denylisted name.
    pub fn is_excluded_host(&self, host: &Host) -> bool {
        self.suffixes
            .iter()
            .any(|suffix| matches_suffix(suffix, host.name()))
    }

    /// Normalizes raw peer identifiers and drops excluded or unset ones
    pub fn admit<I, S>(&self, raw: I) -> Vec<Host>
    where
        I: IntoIterator<Item = Option<S>>,
        S: AsRef<str>,
    {
        raw.into_iter()
            .flatten()
            .filter_map(|s| Host::parse(s.as_ref()))
            .filter(|host| !self.is_excluded_host(host))
            .collect()
    }
}

impl Default for ExclusionFilter {
    fn default() -> Self {
        Self::builtin()
    }
}
