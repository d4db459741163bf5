use crate::config::types::{Config, CrawlerConfig, FilterConfig, OutputConfig, SitemapConfig, UserAgentConfig};
use crate::ConfigError;
use regex::Regex;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_sitemap_config(&config.sitemap)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_filter_config(&config.filter)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.parallel < 1 || config.parallel > 100 {
        return Err(ConfigError::Validation(format!(
            "parallel must be between 1 and 100, got {}",
            config.parallel
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.page_timeout < 1 {
        return Err(ConfigError::Validation(
            "page_timeout must be at least 1 second".to_string(),
        ));
    }

    Ok(())
}

/// Validates sitemap discovery limits
fn validate_sitemap_config(config: &SitemapConfig) -> Result<(), ConfigError> {
    if config.timeout < 1 || config.robots_timeout < 1 {
        return Err(ConfigError::Validation(format!(
            "sitemap timeouts must be at least 1 second, got timeout={} robots_timeout={}",
            config.timeout, config.robots_timeout
        )));
    }

    if config.max_sitemaps < 1 {
        return Err(ConfigError::Validation(
            "max_sitemaps must be >= 1".to_string(),
        ));
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

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates denylist additions
fn validate_filter_config(config: &FilterConfig) -> Result<(), ConfigError> {
    for pattern in &config.exclude_patterns {
        Regex::new(pattern)
            .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", pattern, e)))?;
    }

    for prefix in &config.extra_path_prefixes {
        if !prefix.starts_with('/') {
            return Err(ConfigError::InvalidPattern(format!(
                "path prefix '{}' must start with '/'",
                prefix
            )));
        }
    }

    for ext in &config.extra_extensions {
        if ext.is_empty() || ext.contains('/') {
            return Err(ConfigError::InvalidPattern(format!(
                "invalid file extension '{}'",
                ext
            )));
        }
    }

    Ok(())
}
