use std::path::PathBuf;
use std::process;
use std::time::Duration;

use azorders::config::{CrawlConfig, DEFAULT_END_YEAR, DEFAULT_START_YEAR};
use azorders::crawler::Crawler;
use azorders::export::{ExportFormat, export_rows, write_recovery_dump, write_records};
use azorders::resolver::resolve;
use azorders::scraper::WebScraper;
use azorders::types::SourceEpoch;
use azorders::utils::YearRange;
use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "azorders")]
#[command(about = "An azcourts.gov administrative orders scraper", long_about = None)]
struct Cli {
    #[arg(
        short = 'l',
        long = "log-level",
        value_enum,
        default_value = "info",
        global = true,
        help = "Set the logging level"
    )]
    log_level: LogLevel,

    #[arg(
        long,
        env = "AZORDERS_BASE_URL",
        default_value = azorders::BASE_URL,
        global = true,
        help = "Base URL of the orders directory"
    )]
    base_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FileFormat {
    Csv,
    Json,
}

impl From<FileFormat> for ExportFormat {
    fn from(format: FileFormat) -> Self {
        match format {
            FileFormat::Csv => ExportFormat::Csv,
            FileFormat::Json => ExportFormat::Json,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl every year in the range and export the collected orders
    Crawl {
        #[arg(long, default_value_t = DEFAULT_START_YEAR, help = "First year to scrape")]
        start_year: i32,

        #[arg(long, default_value_t = DEFAULT_END_YEAR, help = "Last year to scrape (inclusive)")]
        end_year: i32,

        #[arg(
            short = 'o',
            long,
            default_value = "order_extraction/az_court_orders.csv",
            help = "Destination file; parent directories are created"
        )]
        output: PathBuf,

        #[arg(
            short = 'f',
            long,
            value_enum,
            help = "Export format (guessed from the output extension when omitted)"
        )]
        format: Option<FileFormat>,

        #[arg(long, default_value_t = 1000, help = "Delay between years in milliseconds")]
        delay_ms: u64,

        #[arg(long, default_value_t = 30, help = "Request timeout in seconds")]
        timeout_secs: u64,
    },
    /// Scrape a single year and print its orders
    Year {
        #[arg(help = "Year to scrape")]
        year: i32,

        #[arg(
            short = 'o',
            long = "output",
            value_enum,
            default_value = "text",
            help = "Output format"
        )]
        format: OutputFormat,

        #[arg(long, default_value_t = 30, help = "Request timeout in seconds")]
        timeout_secs: u64,
    },
    /// Print the index URL used for a year
    Resolve {
        #[arg(help = "Year to resolve")]
        year: i32,
    },
}

fn serialize_json<T: serde::Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            log::error!("Error serializing to JSON: {}", e);
            process::exit(1);
        }
    }
}

fn build_crawler(config: CrawlConfig) -> Crawler<WebScraper> {
    let scraper = WebScraper::new(&config).unwrap_or_else(|e| {
        log::error!("Error creating scraper: {}", e);
        process::exit(1);
    });

    Crawler::new(scraper, config).unwrap_or_else(|e| {
        log::error!("Error creating crawler: {}", e);
        process::exit(1);
    })
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.clone().into())
        .init();

    match cli.command {
        Commands::Crawl {
            start_year,
            end_year,
            output,
            format,
            delay_ms,
            timeout_secs,
        } => {
            let years = YearRange::new(start_year, end_year)
                .validate()
                .unwrap_or_else(|e| {
                    log::error!("Invalid args: {e}");
                    process::exit(1);
                });

            let crawler = build_crawler(CrawlConfig {
                base_url: cli.base_url,
                years,
                timeout: Duration::from_secs(timeout_secs),
                delay: Duration::from_millis(delay_ms),
                ..Default::default()
            });

            let ct = CancellationToken::new();
            let signal_ct = ct.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    log::warn!("Interrupt received, finishing current year...");
                    signal_ct.cancel();
                }
            });

            let report = crawler.run(&ct).await;
            let stats = report.stats();

            if report.records.is_empty() {
                log::warn!("No orders were scraped. Please check the URLs and HTML structure.");
                print!("{}", stats);
                return;
            }

            let format = format
                .map(ExportFormat::from)
                .unwrap_or_else(|| ExportFormat::from_path(&output));
            let rows = export_rows(report.into_records());

            match write_records(&output, format, &rows) {
                Ok(written) => {
                    print!("{}", stats);
                    println!("\nData saved to: {} ({} records)", output.display(), written);
                }
                Err(e) => {
                    log::error!("Error saving to {}: {}", output.display(), e);
                    match write_recovery_dump(&std::env::temp_dir(), &rows) {
                        Ok(path) => log::error!("Scraped orders preserved in {}", path.display()),
                        Err(e) => log::error!("Recovery dump failed as well: {}", e),
                    }
                    process::exit(1);
                }
            }
        }

        Commands::Year {
            year,
            format,
            timeout_secs,
        } => {
            let crawler = build_crawler(CrawlConfig {
                base_url: cli.base_url,
                years: YearRange::new(year, year),
                timeout: Duration::from_secs(timeout_secs),
                ..Default::default()
            });

            let (report, records) = crawler.scrape_year(year).await;
            if report.outcome.is_failure() {
                log::error!("No data for {}: {:?}", year, report.outcome);
                process::exit(1);
            }

            let records = export_rows(records);
            match format {
                OutputFormat::Json => serialize_json(&records),
                OutputFormat::Text => {
                    if records.is_empty() {
                        println!("No entries to display.");
                    } else {
                        for (i, record) in records.iter().enumerate() {
                            println!("{:>3}. {}", i + 1, record);
                        }
                        println!(
                            "\n{} order(s), {} table(s) accepted, {} row(s) skipped, {} rejected",
                            records.len(),
                            report.tables_accepted,
                            report.rows_skipped,
                            report.rejections.total()
                        );
                    }
                }
            }
        }

        Commands::Resolve { year } => {
            let epoch = SourceEpoch::for_year(year);
            println!("{} ({}): {}", year, epoch, resolve(&cli.base_url, year));
        }
    }
}
