use crate::config::types::{
    Config, CrawlerConfig, IndexConfig, RankConfig, SearchConfig, UserAgentConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_index_config(&config.index)?;
    validate_rank_config(&config.rank)?;
    validate_search_config(&config.search)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.batch_size < 1 || config.batch_size > 500 {
        return Err(ConfigError::Validation(format!(
            "batch_size must be between 1 and 500, got {}",
            config.batch_size
        )));
    }

    if config.idle_polls_before_exit < 1 {
        return Err(ConfigError::Validation(
            "idle_polls_before_exit must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_ms == 0 || config.total_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "request timeouts must be greater than zero".to_string(),
        ));
    }

    if config.seeds.is_empty() {
        return Err(ConfigError::Validation(
            "at least one seed URL is required".to_string(),
        ));
    }

    for seed in &config.seeds {
        validate_seed(seed)?;
    }

    Ok(())
}

/// Seeds must be absolute http(s) URLs
fn validate_seed(seed: &str) -> Result<(), ConfigError> {
    let url = Url::parse(seed)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "Seed URL '{}' must use http or https",
            seed
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

    Ok(())
}

fn validate_index_config(config: &IndexConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if config.metrics_interval > 0 && config.metrics_path.is_empty() {
        return Err(ConfigError::Validation(
            "metrics_path cannot be empty while metrics sampling is enabled".to_string(),
        ));
    }

    Ok(())
}

fn validate_rank_config(config: &RankConfig) -> Result<(), ConfigError> {
    if config.iterations == 0 {
        return Err(ConfigError::Validation(
            "rank iterations must be >= 1".to_string(),
        ));
    }

    if !(config.damping > 0.0 && config.damping < 1.0) {
        return Err(ConfigError::Validation(format!(
            "damping must be strictly between 0 and 1, got {}",
            config.damping
        )));
    }

    Ok(())
}

fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    if config.result_limit == 0 {
        return Err(ConfigError::Validation(
            "result_limit must be >= 1".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_seed() {
        assert!(validate_seed("https://example.com").is_ok());
        assert!(validate_seed("http://example.com/page/").is_ok());

        assert!(validate_seed("").is_err());
        assert!(validate_seed("example.com").is_err());
        assert!(validate_seed("ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_rank_config() {
        assert!(validate_rank_config(&RankConfig::default()).is_ok());

        let zero_iterations = RankConfig {
            iterations: 0,
            damping: 0.85,
        };
        assert!(validate_rank_config(&zero_iterations).is_err());

        let bad_damping = RankConfig {
            iterations: 25,
            damping: 1.0,
        };
        assert!(validate_rank_config(&bad_damping).is_err());
    }

    #[test]
    fn test_validate_crawler_name() {
        let mut agent = UserAgentConfig::default();
        assert!(validate_user_agent_config(&agent).is_ok());

        agent.crawler_name = "bad name!".to_string();
        assert!(validate_user_agent_config(&agent).is_err());
    }

    #[test]
    fn test_validate_crawler_config() {
        let mut crawler = CrawlerConfig::with_seeds(vec!["https://example.com".to_string()]);
        assert!(validate_crawler_config(&crawler).is_ok());

        crawler.idle_polls_before_exit = 0;
        assert!(validate_crawler_config(&crawler).is_err());
    }

    #[test]
    fn test_seeds_required() {
        let crawler = CrawlerConfig::with_seeds(vec![]);
        assert!(matches!(
            validate_crawler_config(&crawler),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_batch_size_bounds() {
        let mut crawler = CrawlerConfig::with_seeds(vec!["https://example.com".to_string()]);
        crawler.batch_size = 0;
        assert!(validate_crawler_config(&crawler).is_err());
        crawler.batch_size = 501;
        assert!(validate_crawler_config(&crawler).is_err());
        crawler.batch_size = 500;
        assert!(validate_crawler_config(&crawler).is_ok());
    }
}
