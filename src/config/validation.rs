use crate::config::types::{
    Config, CrawlerConfig, DownloadConfig, OutputConfig, SiteConfig, UserAgentConfig,
};
use crate::ConfigError;
use url::Url;

const MIN_TIMEOUT_MS: u64 = 100;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_site_config(&config.site)?;
    validate_download_config(&config.download)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.page_size == Some(0) {
        return Err(ConfigError::Validation(
            "page_size must be >= 1 when set".to_string(),
        ));
    }

    validate_timeout("crawler.connect_timeout_ms", config.connect_timeout_ms)?;
    validate_timeout("crawler.request_timeout_ms", config.request_timeout_ms)?;

    Ok(())
}

fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    if config.extension.is_empty() {
        return Err(ConfigError::Validation(
            "site extension cannot be empty".to_string(),
        ));
    }

    if !config
        .extension
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.')
        || config.extension.starts_with('.')
        || config.extension.ends_with('.')
    {
        return Err(ConfigError::Validation(format!(
            "site extension must look like 'com' or 'co.uk', got '{}'",
            config.extension
        )));
    }

    let resolved = config.resolved_search_url();
    let url = Url::parse(&resolved)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid search_url '{}': {}", resolved, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "search_url '{}' must use http or https",
            resolved
        )));
    }

    Ok(())
}

fn validate_download_config(config: &DownloadConfig) -> Result<(), ConfigError> {
    if config.workers < 1 || config.workers > 100 {
        return Err(ConfigError::Validation(format!(
            "download workers must be between 1 and 100, got {}",
            config.workers
        )));
    }

    validate_timeout("download.connect_timeout_ms", config.connect_timeout_ms)?;
    validate_timeout("download.request_timeout_ms", config.request_timeout_ms)?;

    Ok(())
}

fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.name.is_empty() {
        return Err(ConfigError::Validation(
            "user-agent name cannot be empty".to_string(),
        ));
    }

    if !config.name.chars().all(|c| c.is_alphanumeric() || c == '-') {
        return Err(ConfigError::Validation(format!(
            "user-agent name must contain only alphanumeric characters and hyphens, got '{}'",
            config.name
        )));
    }

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.root.is_empty() {
        return Err(ConfigError::Validation(
            "output root cannot be empty".to_string(),
        ));
    }

    if config.checkpoint_file.is_empty() {
        return Err(ConfigError::Validation(
            "checkpoint_file cannot be empty".to_string(),
        ));
    }

    if config.checkpoint_file.contains(['/', '\\']) {
        return Err(ConfigError::Validation(format!(
            "checkpoint_file must be a bare file name, got '{}'",
            config.checkpoint_file
        )));
    }

    Ok(())
}

fn validate_timeout(name: &str, value_ms: u64) -> Result<(), ConfigError> {
    if value_ms < MIN_TIMEOUT_MS {
        return Err(ConfigError::Validation(format!(
            "{} must be >= {}ms, got {}ms",
            name, MIN_TIMEOUT_MS, value_ms
        )));
    }
    Ok(())
}
