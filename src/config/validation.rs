use crate::config::types::{
    Config, CrawlerConfig, DedupConfig, DomainEntry, IndexConfig, JobEntry, RankingConfig,
    StorageConfig, UserAgentConfig,
};
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_dedup_config(&config.dedup)?;
    validate_index_config(&config.index)?;
    validate_ranking_config(&config.ranking)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_storage_config(&config.storage)?;
    validate_jobs(&config.jobs)?;
    validate_no_index_domains(&config.no_index)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.request_timeout_secs < 1 || config.robots_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeouts must be >= 1s, got request={}s robots={}s",
            config.request_timeout_secs, config.robots_timeout_secs
        )));
    }

    if config.delay_min_ms > config.delay_max_ms {
        return Err(ConfigError::Validation(format!(
            "delay_min_ms ({}) must not exceed delay_max_ms ({})",
            config.delay_min_ms, config.delay_max_ms
        )));
    }

    if config.min_available_memory_percent > 100 {
        return Err(ConfigError::Validation(format!(
            "min_available_memory_percent must be between 0 and 100, got {}",
            config.min_available_memory_percent
        )));
    }

    if config.min_available_memory_percent > 0 && config.memory_poll_interval_ms == 0 {
        return Err(ConfigError::Validation(
            "memory_poll_interval_ms must be > 0 when admission control is enabled".to_string(),
        ));
    }

    Ok(())
}

fn validate_dedup_config(config: &DedupConfig) -> Result<(), ConfigError> {
    if config.expected_items == 0 {
        return Err(ConfigError::Validation(
            "expected_items must be > 0".to_string(),
        ));
    }

    if !(config.false_positive_rate > 0.0 && config.false_positive_rate < 1.0) {
        return Err(ConfigError::Validation(format!(
            "false_positive_rate must be in (0, 1), got {}",
            config.false_positive_rate
        )));
    }

    Ok(())
}

fn validate_index_config(config: &IndexConfig) -> Result<(), ConfigError> {
    if config.batch_size == 0 {
        return Err(ConfigError::Validation(
            "batch_size must be >= 1".to_string(),
        ));
    }
    Ok(())
}

fn validate_ranking_config(config: &RankingConfig) -> Result<(), ConfigError> {
    if !config.boost.is_finite() || config.boost < 0.0 {
        return Err(ConfigError::Validation(format!(
            "boost must be a finite non-negative number, got {}",
            config.boost
        )));
    }
    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
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

fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates crawl job entries
fn validate_jobs(jobs: &[JobEntry]) -> Result<(), ConfigError> {
    let mut names = HashSet::new();

    for job in jobs {
        if job.name.is_empty()
            || !job
                .name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ConfigError::Validation(format!(
                "job name must be non-empty and contain only [A-Za-z0-9_-], got '{}'",
                job.name
            )));
        }

        if !names.insert(job.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate job name '{}'",
                job.name
            )));
        }

        let url = Url::parse(&job.seed).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", job.seed, e))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "Seed URL '{}' must use HTTP or HTTPS",
                job.seed
            )));
        }

        if url.host_str().is_none() {
            return Err(ConfigError::InvalidUrl(format!(
                "Seed URL '{}' has no host",
                job.seed
            )));
        }
    }

    Ok(())
}

fn validate_no_index_domains(domains: &[DomainEntry]) -> Result<(), ConfigError> {
    for entry in domains {
        validate_domain_pattern(&entry.domain)?;
    }
    Ok(())
}

/// Validates a domain pattern (supports wildcards)
fn validate_domain_pattern(pattern: &str) -> Result<(), ConfigError> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain pattern cannot be empty".to_string(),
        ));
    }

    match pattern.strip_prefix("*.") {
        Some(domain) => validate_domain_string(domain),
        None => validate_domain_string(pattern),
    }
}

/// Validates a domain string (without wildcard prefix)
///
/// Needs at least two dot-separated labels, each non-empty, made of
/// alphanumerics and inner hyphens.
fn validate_domain_string(domain: &str) -> Result<(), ConfigError> {
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' must contain at least one dot (e.g., 'example.com')",
            domain
        )));
    }

    for label in labels {
        let well_formed = !label.is_empty()
            && label.chars().all(|c| c.is_alphanumeric() || c == '-')
            && !label.starts_with('-')
            && !label.ends_with('-');
        if !well_formed {
            return Err(ConfigError::InvalidPattern(format!(
                "Domain '{}' has a malformed label '{}'",
                domain, label
            )));
        }
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    let (local, domain) = email.split_once('@').ok_or_else(|| {
        ConfigError::Validation(format!("Invalid email format: '{}'", email))
    })?;

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
