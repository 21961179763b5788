use crate::config::types::Config;
use crate::ConfigError;
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// The result is not validated, since command-line overrides may still be
/// applied to it. Call [`validate`](crate::config::validate) on the merged
/// configuration.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded configuration
/// * `Err(ConfigError)` - Failed to read or parse the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    // Read the configuration file
    let content = std::fs::read_to_string(path)?;

    // Parse TOML
    let mut config: Config = toml::from_str(&content)?;
    config.crawler.seeds = parse_seed_list(&config.crawler.seeds);

    Ok(config)
}

/// Flattens a seed list into individual URLs
///
/// Each entry may itself be a comma-separated list. Entries are trimmed,
/// blanks are dropped, and duplicates are removed keeping the first
/// occurrence.
///
/// # Example
///
/// ```
/// use crawl_ledger::config::parse_seed_list;
///
/// let seeds = parse_seed_list(&["https://a.com/, https://b.com/".to_string(),
///                               "https://a.com/".to_string()]);
/// assert_eq!(seeds, vec!["https://a.com/", "https://b.com/"]);
/// ```
pub fn parse_seed_list(entries: &[String]) -> Vec<String> {
    let mut seeds: Vec<String> = Vec::new();

    for entry in entries {
        for seed in entry.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if !seeds.iter().any(|existing| existing == seed) {
                seeds.push(seed.to_string());
            }
        }
    }

    seeds
}
