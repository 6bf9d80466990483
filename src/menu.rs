use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{BenchError, Result};

/// A catalog dish: ground truth the competitor items are matched against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceItem {
    pub id: String,
    pub brand: String,
    #[serde(default)]
    pub category: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub full_price: Option<f64>,
    #[serde(default)]
    pub promo_price: Option<f64>,
    /// Discount percentage, display only
    #[serde(default)]
    pub discount: Option<f64>,
}

impl ReferenceItem {
    pub fn new(brand: impl Into<String>, id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            brand: brand.into(),
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Trim text fields and check the record can be stored
    pub fn sanitized(mut self) -> Result<Self> {
        for field in [
            &mut self.id,
            &mut self.brand,
            &mut self.category,
            &mut self.name,
            &mut self.description,
            &mut self.image,
        ] {
            *field = field.trim().to_string();
        }

        if self.id.is_empty() {
            return Err(BenchError::InvalidDish("dish id is required".into()));
        }
        if self.brand.is_empty() {
            return Err(BenchError::InvalidDish(format!("dish '{}' has no brand", self.id)));
        }
        Ok(self)
    }
}

/// A record mined from a competitor page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CandidateItem {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub full_price: Option<f64>,
    #[serde(default)]
    pub promo_price: Option<f64>,
    #[serde(default)]
    pub image: String,
}

/// Match strength banding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Match,
    PartialMatch,
    NoMatch,
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MatchStatus::Match => "Match",
            MatchStatus::PartialMatch => "Partial match",
            MatchStatus::NoMatch => "No strong match",
        };
        f.write_str(label)
    }
}

/// Best catalog match for one candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub candidate: CandidateItem,
    pub best_reference: Option<ReferenceItem>,
    /// Percentage, one decimal
    pub score: f64,
    pub status: MatchStatus,
}

/// A persisted benchmark run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub brand: String,
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    pub results: Vec<MatchResult>,
}

impl Analysis {
    pub fn new(brand: String, url: String, title: Option<String>, results: Vec<MatchResult>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            brand,
            url,
            title,
            results,
        }
    }

    pub fn summary(&self) -> AnalysisSummary {
        AnalysisSummary {
            id: self.id,
            created_at: self.created_at,
            brand: self.brand.clone(),
            url: self.url.clone(),
            total_results: self.results.len(),
        }
    }

    /// Count results per status: (match, partial, none)
    pub fn status_counts(&self) -> (usize, usize, usize) {
        self.results.iter().fold((0, 0, 0), |(m, p, n), r| match r.status {
            MatchStatus::Match => (m + 1, p, n),
            MatchStatus::PartialMatch => (m, p + 1, n),
            MatchStatus::NoMatch => (m, p, n + 1),
        })
    }
}

/// History listing row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub brand: String,
    pub url: String,
    pub total_results: usize,
}
