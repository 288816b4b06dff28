use crate::config::types::{Config, CrawlerConfig, ExclusionEntry, OutputConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_exclusions(&config.exclude)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("policy_timeout_secs", config.policy_timeout_secs),
        ("peers_timeout_secs", config.peers_timeout_secs),
        ("connect_timeout_secs", config.connect_timeout_secs),
    ] {
        if value < 1 {
            return Err(ConfigError::Validation(format!(
                "{} must be >= 1 second, got {}",
                name, value
            )));
        }
    }

    validate_scheme("policy_scheme", &config.policy_scheme)?;
    validate_scheme("peers_scheme", &config.peers_scheme)?;

    if !config.peers_path.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "peers_path must start with '/', got '{}'",
            config.peers_path
        )));
    }

    Ok(())
}

fn validate_scheme(name: &str, scheme: &str) -> Result<(), ConfigError> {
    match scheme {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::Validation(format!(
            "{} must be 'http' or 'https', got '{}'",
            name, other
        ))),
    }
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if config.facts_path.is_empty() {
        return Err(ConfigError::Validation(
            "facts_path cannot be empty".to_string(),
        ));
    }

    if config.database_path == config.facts_path {
        return Err(ConfigError::Validation(format!(
            "database_path and facts_path must differ, both are '{}'",
            config.facts_path
        )));
    }

    Ok(())
}

/// Validates operator-supplied exclusion suffixes
fn validate_exclusions(entries: &[ExclusionEntry]) -> Result<(), ConfigError> {
    for entry in entries {
        validate_suffix(&entry.suffix)?;
    }
    Ok(())
}

/// Validates a hostname suffix
///
/// Suffixes are matched as plain string suffixes, so a leading dot is allowed
/// to restrict a match to subdomains (".example.com").
fn validate_suffix(suffix: &str) -> Result<(), ConfigError> {
    let trimmed = suffix.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::InvalidSuffix(
            "Exclusion suffix cannot be empty".to_string(),
        ));
    }

    if !trimmed
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':')
    {
        return Err(ConfigError::InvalidSuffix(format!(
            "Suffix '{}' contains invalid characters",
            suffix
        )));
    }

    if trimmed.contains("..") {
        return Err(ConfigError::InvalidSuffix(format!(
            "Suffix '{}' cannot contain consecutive dots",
            suffix
        )));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    // Must contain exactly one @ with text on both sides
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_suffix() {
        assert!(validate_suffix("noho.st").is_ok());
        assert!(validate_suffix(".example.com").is_ok());
        assert!(validate_suffix("127.0.0.1:8080").is_ok());

        assert!(validate_suffix("").is_err());
        assert!(validate_suffix("   ").is_err());
        assert!(validate_suffix("bad host.com").is_err());
        assert!(validate_suffix("a..b").is_err());
        assert!(validate_suffix("*.example.com").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("admin@sub.example.com").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("user@domain").is_err());
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let mut config = Config::default();
        config.crawler.policy_timeout_secs = 0;
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_unknown_scheme() {
        let mut config = Config::default();
        config.crawler.peers_scheme = "gopher".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_relative_peers_path() {
        let mut config = Config::default();
        config.crawler.peers_path = "api/v1/instance/peers".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_shared_output_path() {
        let mut config = Config::default();
        config.output.facts_path = config.output.database_path.clone();
        assert!(validate(&config).is_err());
    }
}
