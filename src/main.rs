// src/main.rs
// =============================================================================
// Entry point of the link-crawler CLI.
//
// What happens here:
// 1. Set up logging (RUST_LOG, default "warn", written to stderr)
// 2. Parse command-line arguments and build the crawl configuration
// 3. Run the crawl, printing each page as it completes
// 4. Print a table or JSON report
// 5. Exit with a code: 0 = every page fetched, 1 = some pages failed,
//    2 = error
// =============================================================================

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use link_crawler::{CrawlEvent, CrawlOptions, CrawlReport, Crawler, CrawlerConfig};
use serde::Serialize;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use url::Url;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    let config = build_config(&cli)?;

    if !cli.json {
        println!("🔍 Crawling: {}", cli.url);
        println!(
            "📊 Max depth: {}, max {} request(s)/s",
            config.max_depth, config.max_requests_per_second
        );
    }

    let crawler = Crawler::new(config)?;
    let json = cli.json;
    let report = crawler
        .run_with(&cli.url, |event| {
            if !json {
                print_progress(event);
            }
        })
        .await?;

    print_report(&report, cli.json)?;

    if report.is_clean() {
        Ok(0)
    } else {
        Ok(1)
    }
}

// Options file first, then flags on top
fn build_config(cli: &Cli) -> Result<CrawlerConfig> {
    let mut options = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str::<CrawlOptions>(&text)
                .with_context(|| format!("invalid options file {}", path.display()))?
        }
        None => CrawlOptions::default(),
    };

    if cli.depth.is_some() {
        options.depth = cli.depth;
    }
    if cli.ignore_relative {
        options.ignore_relative = Some(true);
    }
    if cli.user_agent.is_some() {
        options.user_agent = cli.user_agent.clone();
    }
    if cli.max_requests_per_second.is_some() {
        options.max_requests_per_second = cli.max_requests_per_second;
    }

    if cli.same_domain {
        let start = Url::parse(&cli.url).with_context(|| format!("invalid URL '{}'", cli.url))?;
        let host = start
            .host_str()
            .with_context(|| format!("URL has no host: {}", cli.url))?
            .to_string();
        options.should_crawl = Some(Arc::new(move |link: &str| {
            Url::parse(link)
                .map(|parsed| parsed.host_str() == Some(host.as_str()))
                .unwrap_or(false)
        }));
    }

    Ok(CrawlerConfig::default().configure(options)?)
}

fn print_progress(event: &CrawlEvent) {
    match event {
        CrawlEvent::Page(page) => println!("  ✅ [{}] {}", page.status, page.url),
        CrawlEvent::Failure(failed) => println!("  ❌ {} ({})", failed.url, failed.reason()),
        CrawlEvent::Finished(visited) => println!("📄 Visited {} page(s)\n", visited.len()),
    }
}

// One line of the final report
#[derive(Debug, Serialize)]
struct PageReport {
    url: String,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

fn page_reports(report: &CrawlReport) -> Vec<PageReport> {
    let pages = report.pages.iter().map(|page| PageReport {
        url: page.url.clone(),
        ok: true,
        status: Some(page.status),
        message: None,
    });
    let failures = report.failures.iter().map(|failed| PageReport {
        url: failed.url.clone(),
        ok: false,
        status: failed.status,
        message: Some(failed.reason()),
    });
    pages.chain(failures).collect()
}

fn print_report(report: &CrawlReport, json: bool) -> Result<()> {
    let rows = page_reports(report);
    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        print_table(&rows);
    }
    Ok(())
}

fn print_table(rows: &[PageReport]) {
    println!("{:<60} {:<10} {:<30}", "URL", "STATUS", "MESSAGE");
    println!("{}", "=".repeat(100));

    for row in rows {
        let status = row
            .status
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        let message = row.message.as_deref().unwrap_or("");

        // Truncate URL if too long for display
        let url_display = if row.url.chars().count() > 57 {
            format!("{}...", row.url.chars().take(57).collect::<String>())
        } else {
            row.url.clone()
        };

        println!("{:<60} {:<10} {:<30}", url_display, status, message);
    }

    println!();

    let ok_count = rows.iter().filter(|r| r.ok).count();
    println!("📊 Summary:");
    println!("   ✅ OK: {}", ok_count);
    println!("   ❌ Failed: {}", rows.len() - ok_count);
    println!("   📋 Total: {}", rows.len());
}
