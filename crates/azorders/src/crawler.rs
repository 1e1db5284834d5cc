use std::time::Duration;

use futures::FutureExt;
use futures::future::{self, BoxFuture};
use reqwest::Url;
use tokio_util::sync::CancellationToken;

use crate::config::CrawlConfig;
use crate::parser::{extract_record, scan_page};
use crate::resolver::resolve;
use crate::scraper::{FetchOutcome, Fetcher, ScraperError};
use crate::types::{OrderRecord, SourceEpoch};
use crate::utils::CrawlStats;
use crate::validate::{RejectionCounts, validate};

/// Waits between consecutive years.
pub trait Pacer: Send + Sync {
    fn pause(&self, delay: Duration) -> BoxFuture<'static, ()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioPacer;

impl Pacer for TokioPacer {
    fn pause(&self, delay: Duration) -> BoxFuture<'static, ()> {
        tokio::time::sleep(delay).boxed()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl Pacer for NoDelay {
    fn pause(&self, _delay: Duration) -> BoxFuture<'static, ()> {
        future::ready(()).boxed()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YearOutcome {
    Parsed,
    NotFound { status: u16 },
    TransportError { message: String },
}

impl YearOutcome {
    pub fn is_failure(&self) -> bool {
        !matches!(self, YearOutcome::Parsed)
    }
}

#[derive(Debug, Clone)]
pub struct YearReport {
    pub year: i32,
    pub epoch: SourceEpoch,
    pub url: String,
    pub outcome: YearOutcome,
    pub tables_accepted: usize,
    pub tables_rejected: usize,
    pub rows_seen: usize,
    pub rows_skipped: usize,
    pub rejections: RejectionCounts,
    pub records: usize,
}

impl YearReport {
    fn new(year: i32, url: String) -> Self {
        Self {
            year,
            epoch: SourceEpoch::for_year(year),
            url,
            outcome: YearOutcome::Parsed,
            tables_accepted: 0,
            tables_rejected: 0,
            rows_seen: 0,
            rows_skipped: 0,
            rejections: RejectionCounts::default(),
            records: 0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// Every validated order, in crawl order.
    pub records: Vec<OrderRecord>,
    pub years: Vec<YearReport>,
    pub cancelled: bool,
}

impl CrawlReport {
    pub fn failed_years(&self) -> Vec<i32> {
        self.years
            .iter()
            .filter(|y| y.outcome.is_failure())
            .map(|y| y.year)
            .collect()
    }

    pub fn stats(&self) -> CrawlStats {
        CrawlStats::from_records(&self.records, &self.failed_years())
    }

    pub fn into_records(self) -> Vec<OrderRecord> {
        self.records
    }
}

pub struct Crawler<F> {
    fetcher: F,
    config: CrawlConfig,
    base: Url,
    pacer: Box<dyn Pacer>,
}

impl<F: Fetcher> Crawler<F> {
    pub fn new(fetcher: F, config: CrawlConfig) -> Result<Self, ScraperError> {
        let base = Url::parse(&config.base_url).map_err(|e| ScraperError::InvalidBaseUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            fetcher,
            config,
            base,
            pacer: Box::new(TokioPacer),
        })
    }

    pub fn with_pacer(mut self, pacer: impl Pacer + 'static) -> Self {
        self.pacer = Box::new(pacer);
        self
    }

    /// Walks the configured years in order, one at a time.
    ///
    /// A failed year contributes nothing and never stops the crawl. The
    /// token is checked before each year and interrupts the inter-year delay.
    pub async fn run(&self, cancel: &CancellationToken) -> CrawlReport {
        let years = self.config.years;
        let total = years.len();
        let mut report = CrawlReport::default();

        log::info!(
            "Starting scrape of {} years from {} to {}",
            total,
            years.start,
            years.end
        );

        for (i, year) in years.years().enumerate() {
            if cancel.is_cancelled() {
                log::warn!("Crawl cancelled before year {}", year);
                report.cancelled = true;
                break;
            }

            let (year_report, records) = self.scrape_year(year).await;

            if records.is_empty() {
                log::info!("Year {}: No orders found - skipping", year);
            } else {
                log::info!("Year {}: Found {} orders", year, records.len());
            }

            report.records.extend(records);
            report.years.push(year_report);

            if (i + 1) % 5 == 0 || i == 0 {
                log::info!(
                    "Completed {}/{} years. Total orders: {}",
                    i + 1,
                    total,
                    report.records.len()
                );
            }

            tokio::select! {
                _ = self.pacer.pause(self.config.delay) => {}
                _ = cancel.cancelled() => {}
            }
        }

        log::info!(
            "Scraping complete! Total orders scraped: {}",
            report.records.len()
        );

        report
    }

    pub async fn scrape_year(&self, year: i32) -> (YearReport, Vec<OrderRecord>) {
        let url = resolve(&self.config.base_url, year);
        let mut report = YearReport::new(year, url.clone());

        match self.fetcher.fetch(&url).await {
            FetchOutcome::Success { document, url } => {
                log::info!(
                    "Year {} - SUCCESS ({}): {}",
                    year,
                    report.epoch.format_label(),
                    url
                );
                let records = self.process_page(year, &document, &mut report);
                report.records = records.len();
                log::debug!("Year {} complete. Found {} valid orders", year, records.len());
                (report, records)
            }
            FetchOutcome::NotFound { status, url } => {
                log::warn!("Year {} - HTTP {}: {}", year, status, url);
                report.outcome = YearOutcome::NotFound { status };
                (report, Vec::new())
            }
            FetchOutcome::TransportError { message, url } => {
                log::warn!("Year {} - ERROR: {} URL: {}", year, message, url);
                report.outcome = YearOutcome::TransportError { message };
                (report, Vec::new())
            }
        }
    }

    fn process_page(
        &self,
        year: i32,
        document: &str,
        report: &mut YearReport,
    ) -> Vec<OrderRecord> {
        let scan = scan_page(document);
        report.tables_accepted = scan.tables.len();
        report.tables_rejected = scan.rejected.len();

        let mut records = Vec::new();
        for discovered in &scan.tables {
            log::debug!(
                "Processing table {} ({} data rows)",
                discovered.table.index + 1,
                discovered.rows.len()
            );

            for row in &discovered.rows {
                report.rows_seen += 1;

                let candidate = match extract_record(row, &self.base, year) {
                    Ok(candidate) => candidate,
                    Err(skip) => {
                        log::trace!("Skipping row in {}: {}", year, skip);
                        report.rows_skipped += 1;
                        continue;
                    }
                };

                log::debug!(
                    "Raw data - Order: '{}', Desc: '{}', Date: '{}'",
                    candidate.order_number,
                    candidate.description.chars().take(30).collect::<String>(),
                    candidate.date_signed
                );

                match validate(candidate) {
                    Ok(record) => {
                        log::debug!("Added order: {}", record.order_number);
                        records.push(record);
                    }
                    Err(rejection) => {
                        log::debug!("Skipping - {}", rejection);
                        report.rejections.record(rejection);
                    }
                }
            }
        }

        records
    }
}
