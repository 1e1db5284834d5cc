pub mod config;
pub mod crawler;
pub mod export;
pub mod parser;
pub mod resolver;
pub mod scraper;
pub mod types;
pub mod utils;
pub mod validate;

pub use config::CrawlConfig;
pub use crawler::{CrawlReport, Crawler};
pub use scraper::{FetchOutcome, Fetcher, ScraperError, WebScraper};

pub const BASE_URL: &str = "https://www.azcourts.gov/orders";
