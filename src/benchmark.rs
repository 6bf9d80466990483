//! Benchmark runs: catalog lookup, extraction, matching and history

use tracing::info;

use crate::compare::compare_with;
use crate::config::Config;
use crate::db::Database;
use crate::error::{BenchError, Result};
use crate::extract::{extract_title, extract_with};
use crate::fetch::PageContent;
use crate::menu::{Analysis, ReferenceItem};

/// Catalog dishes for a brand. Brand matching ignores case.
pub fn load_catalog(db: &Database, brand: &str) -> Result<Vec<ReferenceItem>> {
    let brand = brand.trim();
    if brand.is_empty() {
        return Err(BenchError::BrandNotFound("(empty)".into()));
    }

    let dishes = db.list_dishes(Some(brand))?;
    if dishes.is_empty() {
        return Err(BenchError::BrandNotFound(brand.to_string()));
    }
    Ok(dishes)
}

/// Match the items found on a page against a catalog
pub fn analyze(brand: &str, page: &PageContent, catalog: &[ReferenceItem], config: &Config) -> Analysis {
    let candidates = extract_with(&page.html, &config.extraction);
    let results = compare_with(catalog, &candidates, &config.scoring);

    let analysis = Analysis::new(
        brand.trim().to_string(),
        page.url.clone(),
        extract_title(&page.html),
        results,
    );

    let (matches, partial, none) = analysis.status_counts();
    info!(
        brand = %analysis.brand,
        url = %analysis.url,
        candidates = candidates.len(),
        matches,
        partial,
        none,
        "benchmark finished"
    );

    analysis
}

/// Store a run and drop the oldest entries beyond the history limit
pub fn record(db: &Database, analysis: &Analysis, history_limit: usize) -> Result<()> {
    db.insert_analysis(analysis)?;
    let removed = db.trim_history(history_limit)?;
    if removed > 0 {
        info!(removed, "trimmed benchmark history");
    }
    Ok(())
}
