//! Benchmark history commands

use menubench::db::Database;
use menubench::error::{BenchError, Result};

use super::bench::print_analysis;
use crate::utils::truncate_str;

pub fn cmd_history_list(limit: Option<usize>, json: bool) -> Result<()> {
    let db = Database::open()?;
    let mut entries = db.list_analyses()?;
    if let Some(limit) = limit {
        entries.truncate(limit);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No benchmarks yet. Run `mbench bench <brand> <url>`.");
        return Ok(());
    }

    println!("\nHistory:\n");
    for entry in &entries {
        println!(
            "  {}  {}  {:<12} {:>3} item(s)  {}",
            &entry.id.to_string()[..8],
            entry.created_at.format("%Y-%m-%d %H:%M"),
            truncate_str(&entry.brand, 12),
            entry.total_results,
            truncate_str(&entry.url, 60)
        );
    }
    Ok(())
}

pub fn cmd_history_show(id: &str, json: bool) -> Result<()> {
    let db = Database::open()?;
    let analysis = db
        .get_analysis(id)?
        .ok_or_else(|| BenchError::AnalysisNotFound(id.to_string()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    print_analysis(&analysis);
    Ok(())
}
