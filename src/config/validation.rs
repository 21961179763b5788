use crate::config::types::{Config, CrawlerConfig, OutputConfig, StorageBackend, UserAgentConfig};
use crate::url::canonicalize;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_seeds(&config.crawler.seeds)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    // max_depth >= 0 is always true for u32, so no check needed

    if config.max_concurrent_pages_open < 1 || config.max_concurrent_pages_open > 100 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_pages_open must be between 1 and 100, got {}",
            config.max_concurrent_pages_open
        )));
    }

    if config.fetch_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "fetch_timeout_secs must be >= 1, got {}",
            config.fetch_timeout_secs
        )));
    }

    if config.robots_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "robots_timeout_secs must be >= 1, got {}",
            config.robots_timeout_secs
        )));
    }

    Ok(())
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

    if config.crawler_version.trim().is_empty() {
        return Err(ConfigError::Validation(
            "crawler_version cannot be empty".to_string(),
        ));
    }

    if let Some(contact_url) = &config.contact_url {
        Url::parse(contact_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    match config.backend {
        StorageBackend::Json if config.pages_dir.is_empty() => {
            return Err(ConfigError::Validation(
                "pages_dir cannot be empty with the json backend".to_string(),
            ));
        }
        StorageBackend::Sqlite if config.database_path.is_empty() => {
            return Err(ConfigError::Validation(
                "database_path cannot be empty with the sqlite backend".to_string(),
            ));
        }
        _ => {}
    }

    if config.report_dir.is_empty() {
        return Err(ConfigError::Validation(
            "report_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates that every seed is an absolute http(s) URL
fn validate_seeds(seeds: &[String]) -> Result<(), ConfigError> {
    for seed in seeds {
        canonicalize(seed).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e))
        })?;
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
    fn test_concurrency_bounds() {
        let mut config = Config::default();
        config.crawler.max_concurrent_pages_open = 0;
        assert!(validate(&config).is_err());

        config.crawler.max_concurrent_pages_open = 101;
        assert!(validate(&config).is_err());

        config.crawler.max_concurrent_pages_open = 100;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_zero_timeouts_rejected() {
        let mut config = Config::default();
        config.crawler.fetch_timeout_secs = 0;
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.crawler.robots_timeout_secs = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_crawler_name_characters() {
        let mut config = Config::default();
        config.user_agent.crawler_name = "Good-Bot2".to_string();
        assert!(validate(&config).is_ok());

        config.user_agent.crawler_name = "bad bot".to_string();
        assert!(validate(&config).is_err());

        config.user_agent.crawler_name = String::new();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_contact_url_must_parse() {
        let mut config = Config::default();
        config.user_agent.contact_url = Some("not a url".to_string());
        assert!(matches!(
            validate(&config).unwrap_err(),
            ConfigError::InvalidUrl(_)
        ));
    }

    #[test]
    fn test_seed_validation() {
        assert!(validate_seeds(&["https://example.com/".to_string()]).is_ok());
        assert!(validate_seeds(&["http://localhost:8080/x".to_string()]).is_ok());

        assert!(validate_seeds(&["example.com".to_string()]).is_err());
        assert!(validate_seeds(&["ftp://example.com/".to_string()]).is_err());
    }

    #[test]
    fn test_backend_specific_paths() {
        let mut config = Config::default();
        config.output.pages_dir = String::new();
        assert!(validate(&config).is_err());

        config.output.backend = StorageBackend::Sqlite;
        assert!(validate(&config).is_ok());

        config.output.database_path = String::new();
        assert!(validate(&config).is_err());
    }
}
