use thiserror::Error;

#[derive(Error, Debug)]
pub enum BenchError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] ureq::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("Migration error: {0}")]
    MigrationError(#[from] refinery::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("Unsupported URL scheme '{0}' (expected http or https)")]
    UnsupportedScheme(String),

    #[error("Dish not found: {0}")]
    DishNotFound(String),

    #[error("Analysis not found: {0}")]
    AnalysisNotFound(String),

    #[error("No dishes found for brand: {0}")]
    BrandNotFound(String),

    #[error("Page body exceeds {limit} bytes")]
    PayloadTooLarge { limit: u64 },

    #[error("Invalid dish: {0}")]
    InvalidDish(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl BenchError {
    /// Get an actionable hint for how to resolve this error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            BenchError::HttpError(_) => Some(
                "Check the URL and your connection, or save the page and run:\n  mbench bench <brand> --file page.html"
            ),
            BenchError::DishNotFound(_) => Some(
                "Run `mbench dish list` to see catalog entries"
            ),
            BenchError::AnalysisNotFound(_) => Some(
                "Run `mbench history list` to see saved analyses"
            ),
            BenchError::BrandNotFound(_) => Some(
                "Add dishes for the brand first:\n  mbench import catalog.csv\n  mbench dish add --brand <brand> --id <id> --name <name>"
            ),
            BenchError::PayloadTooLarge { .. } => Some(
                "Raise `fetch.max_body_bytes` in the config file, or benchmark a trimmed copy with --file"
            ),
            BenchError::CsvError(_) => Some(
                "Expected a header row: brand,id,category,name,description,image,fullPrice,promoPrice,discount"
            ),
            BenchError::ConfigError(_) => Some(
                "Check the config file, or delete it to restore defaults"
            ),
            BenchError::DatabaseError(_) => Some(
                "Set MENUBENCH_DB to use a different database file"
            ),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, BenchError>;
