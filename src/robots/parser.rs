//! Robots.txt parser implementation
//!
//! This module wraps the robotstxt crate behind a small allow/deny interface.

use robotstxt::DefaultMatcher;

/// The user agent every policy decision is made for
pub const ROBOTS_AGENT: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Rules {
    AllowAll,
    DenyAll,
    Content(String),
}

/// Parsed robots.txt data
///
/// Besides real robots.txt text this can hold the blanket decisions implied by
/// the HTTP status of the robots resource (see [`ParsedRobots::for_status`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRobots {
    rules: Rules,
}

impl ParsedRobots {
    /// Creates a new ParsedRobots from raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        Self {
            rules: Rules::Content(content.to_string()),
        }
    }

    /// Creates a permissive ParsedRobots that allows everything
    pub fn allow_all() -> Self {
        Self {
            rules: Rules::AllowAll,
        }
    }

    /// Creates a ParsedRobots that refuses everything
    pub fn deny_all() -> Self {
        Self {
            rules: Rules::DenyAll,
        }
    }

    /// Picks the blanket policy implied by a non-success status
    ///
    /// | Status | Policy |
    /// |--------|--------|
    /// | 401, 403 | deny all |
    /// | other 4xx | allow all (no robots.txt published) |
    /// | anything else | deny all |
    pub fn for_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::deny_all(),
            400..=499 => Self::allow_all(),
            _ => Self::deny_all(),
        }
    }

    /// Checks if a URL may be fetched by the given user agent
    ///
    /// # Arguments
    ///
    /// * `user_agent` - The agent to evaluate rules for ("*" for the global group)
    /// * `url` - The full URL to check
    pub fn can_fetch(&self, user_agent: &str, url: &str) -> bool {
        match &self.rules {
            Rules::AllowAll => true,
            Rules::DenyAll => false,
            Rules::Content(content) if content.trim().is_empty() => true,
            Rules::Content(content) => {
                let mut matcher = DefaultMatcher::default();
                matcher.one_agent_allowed_by_robots(content, user_agent, url)
            }
        }
    }
}
