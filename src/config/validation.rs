use crate::config::types::{ClassifierConfig, Config, CrawlerConfig, OutputConfig, UserAgentConfig};
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_classifier_config(&config.classifier)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if let Some(workers) = config.workers {
        if !(1..=256).contains(&workers) {
            return Err(ConfigError::Validation(format!(
                "workers must be between 1 and 256, got {}",
                workers
            )));
        }
    }

    if config.failure_queue_capacity < 1 {
        return Err(ConfigError::Validation(format!(
            "failure_queue_capacity must be >= 1, got {}",
            config.failure_queue_capacity
        )));
    }

    if config.checkpoint_path.is_empty() {
        return Err(ConfigError::Validation(
            "checkpoint_path cannot be empty".to_string(),
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

    validate_email(&config.contact_email)?;

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    // The table name is spliced into SQL, so only plain identifiers are allowed
    let table = &config.results_table;
    let starts_ok = table
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !starts_ok || !table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ConfigError::Validation(format!(
            "results_table must be a plain SQL identifier, got '{}'",
            table
        )));
    }

    Ok(())
}

/// Validates classifier configuration
fn validate_classifier_config(config: &ClassifierConfig) -> Result<(), ConfigError> {
    if config.max_length < 1 {
        return Err(ConfigError::Validation(
            "max_length must be >= 1".to_string(),
        ));
    }

    if config.labels.is_empty() {
        return Err(ConfigError::Validation(
            "at least one classifier label is required".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for label in &config.labels {
        let name = label.name.trim().to_lowercase();
        if name.is_empty() {
            return Err(ConfigError::Validation(
                "classifier label names cannot be empty".to_string(),
            ));
        }
        if !seen.insert(name) {
            return Err(ConfigError::Validation(format!(
                "duplicate classifier label '{}'",
                label.name
            )));
        }
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.contains('@'),
        None => false,
    };

    if !valid {
        return Err(ConfigError::Validation(format!(
            "Invalid contact_email: '{}'",
            email
        )));
    }

    Ok(())
}
