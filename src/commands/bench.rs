//! Benchmark and extraction preview commands

use std::path::PathBuf;

use colored::Colorize;

use menubench::benchmark;
use menubench::config::{Config, FetchSettings};
use menubench::db::Database;
use menubench::error::Result;
use menubench::extract::extract_with;
use menubench::fetch::{self, PageContent};
use menubench::Analysis;

use crate::utils::{format_price, format_prices, status_badge, truncate_str, use_color};

/// Fetch the URL, or read the local file when one was given
fn load_page(url: Option<String>, file: Option<PathBuf>, settings: &FetchSettings) -> Result<PageContent> {
    match (file, url) {
        (Some(path), _) => fetch::read_page_file(&path, settings),
        (None, Some(url)) => fetch::fetch_page(&url, settings),
        // clap requires one of them
        (None, None) => Err(menubench::BenchError::ConfigError(
            "a URL or --file is required".into(),
        )),
    }
}

pub fn cmd_bench(
    brand: &str,
    url: Option<String>,
    file: Option<PathBuf>,
    no_save: bool,
    json: bool,
) -> Result<()> {
    let config = Config::load()?;
    let db = Database::open()?;

    // Check the catalog before spending a request on the page
    let catalog = benchmark::load_catalog(&db, brand)?;
    let page = load_page(url, file, &config.fetch)?;
    let analysis = benchmark::analyze(brand, &page, &catalog, &config);

    if !no_save {
        benchmark::record(&db, &analysis, config.history_limit)?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    print_analysis(&analysis);
    if !no_save {
        println!("\nSaved as {}", &analysis.id.to_string()[..8]);
    }
    Ok(())
}

pub fn cmd_extract(url: Option<String>, file: Option<PathBuf>, json: bool) -> Result<()> {
    let config = Config::load()?;
    let page = load_page(url, file, &config.fetch)?;
    let items = extract_with(&page.html, &config.extraction);

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if items.is_empty() {
        println!("No menu items found on {}", page.url);
        return Ok(());
    }

    println!("\nItems found on {}:\n", page.url);
    for (i, item) in items.iter().enumerate() {
        println!(
            "  {:>2}. {:<40} {}",
            i + 1,
            truncate_str(&item.name, 40),
            format_prices(item.full_price, item.promo_price)
        );
        if !item.description.is_empty() {
            println!("      {}", truncate_str(&item.description, 70).dimmed());
        }
    }
    println!("\n{} item(s)", items.len());
    Ok(())
}

/// Human-readable report of one run
pub(crate) fn print_analysis(analysis: &Analysis) {
    let color = use_color();

    println!();
    match &analysis.title {
        Some(title) => println!("{} - {}", title.bold(), analysis.url),
        None => println!("{}", analysis.url.bold()),
    }
    println!(
        "Brand {} | {}",
        analysis.brand,
        analysis.created_at.format("%Y-%m-%d %H:%M UTC")
    );

    if analysis.results.is_empty() {
        println!("\nNo menu items found on the page.");
        return;
    }

    println!();
    for result in &analysis.results {
        let ours = match &result.best_reference {
            Some(dish) => format!(
                "{} ({})",
                truncate_str(&dish.name, 32),
                format_price(dish.full_price)
            ),
            None => "-".to_string(),
        };
        println!(
            "  {:<36} {:>9}  {:>5.1}%  {:<16} {}",
            truncate_str(&result.candidate.name, 36),
            format_price(result.candidate.full_price),
            result.score,
            status_badge(result.status, color),
            ours
        );
    }

    let (matches, partial, none) = analysis.status_counts();
    println!(
        "\n{} item(s): {} match, {} partial, {} no match",
        analysis.results.len(),
        matches,
        partial,
        none
    );
}
