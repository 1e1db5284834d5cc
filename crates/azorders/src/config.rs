use std::time::Duration;

use crate::utils::YearRange;

pub const DEFAULT_START_YEAR: i32 = 1956;
pub const DEFAULT_END_YEAR: i32 = 2024;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_DELAY: Duration = Duration::from_secs(1);

/// The order index pages refuse obvious bot agents, so we identify as a browser.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlConfig {
    pub base_url: String,
    pub years: YearRange,
    pub timeout: Duration,
    pub delay: Duration,
    pub user_agent: String,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            base_url: crate::BASE_URL.to_string(),
            years: YearRange {
                start: DEFAULT_START_YEAR,
                end: DEFAULT_END_YEAR,
            },
            timeout: DEFAULT_TIMEOUT,
            delay: DEFAULT_DELAY,
            user_agent: BROWSER_USER_AGENT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CrawlConfig::default();
        assert_eq!(config.base_url, "https://www.azcourts.gov/orders");
        assert_eq!(config.years.len(), 69);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.delay, Duration::from_secs(1));
        assert!(config.user_agent.starts_with("Mozilla/5.0"));
    }
}
