//! Tests for configuration providers and the GitHub config section

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::config::{
        CompositeConfigProvider, ConfigProvider, ConfigProviderExt, EnvConfigProvider,
        GitHubConfig, MemoryConfigProvider, ServerConfig, ValidatedConfig,
    };

    #[test]
    fn memory_provider_round_trips_values() {
        let mut provider = MemoryConfigProvider::new();
        provider.set("key1", "value1");
        provider.set("key2", 123);

        assert_eq!(provider.get_string("key1").unwrap(), "value1");
        assert_eq!(provider.get_int("key2").unwrap(), 123);
        assert!(provider.get_string("key3").is_err());
    }

    #[test]
    fn env_provider_formats_keys() {
        let provider = EnvConfigProvider::new().with_prefix("INSIGHTS");

        // Formatting is observable through the error message for a key
        // that is certainly unset.
        let err = provider
            .get_string("github_token_for_key_format_test")
            .expect_err("key must be unset");
        assert!(err
            .to_string()
            .contains("INSIGHTS_GITHUB_TOKEN_FOR_KEY_FORMAT_TEST"));
    }

    #[test]
    fn composite_provider_falls_through_in_order() {
        let mut first = MemoryConfigProvider::new();
        first.set("shared", "from-first");
        first.set("only-first", "a");

        let mut second = MemoryConfigProvider::new();
        second.set("shared", "from-second");
        second.set("only-second", "b");

        let mut provider = CompositeConfigProvider::new();
        provider.add_provider(first);
        provider.add_provider(second);

        assert_eq!(provider.get_string("shared").unwrap(), "from-first");
        assert_eq!(provider.get_string("only-first").unwrap(), "a");
        assert_eq!(provider.get_string("only-second").unwrap(), "b");
        assert!(provider.get_string("absent").is_err());
    }

    #[test]
    fn github_config_defaults_match_the_upstream_contract() {
        let config = GitHubConfig::default();

        assert_eq!(config.base_url, "https://api.github.com");
        assert_eq!(config.timeout_seconds, 20);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.retry_base_delay_ms, 1_000);
        assert_eq!(config.rate_permits, 1);
        assert_eq!(config.rate_window_ms, 1_000);
        assert!(config.token.is_none());
    }

    #[test]
    fn github_config_loads_and_overrides_from_a_provider() {
        let mut provider = MemoryConfigProvider::new();
        provider.set("github_token", "secret");
        provider.set("github_timeout_seconds", 30);
        provider.set("github_max_attempts", 5);

        let config = GitHubConfig::from_provider(&provider).unwrap();
        assert_eq!(config.token.as_deref(), Some("secret"));
        assert_eq!(config.timeout_seconds, 30);
        assert_eq!(config.max_attempts, 5);
        // Untouched keys keep their defaults.
        assert_eq!(config.base_url, "https://api.github.com");

        let policy = config.retry_policy();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.base_delay, Duration::from_secs(1));
    }

    #[test]
    fn github_config_validation_catches_bad_values() {
        let config = GitHubConfig {
            max_attempts: 0,
            ..GitHubConfig::default()
        };
        assert!(config.validate().is_err());

        let config = GitHubConfig {
            rate_permits: 0,
            ..GitHubConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn server_config_uses_the_default_port() {
        let provider = MemoryConfigProvider::new();
        let config = ServerConfig::from_provider(&provider, 8041);

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8041);
        assert!(config.validate().is_ok());
    }
}
