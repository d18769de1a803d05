//! Score aggregation (plain-average strategy)
//!
//! Category score is the arithmetic mean of its subfeature scores. The
//! overall score is the weight-proportional sum of category averages, or an
//! equal-weight mean over scored categories when no positive weight exists.
//!
//! [`aggregate`] counts the weight of every category in the document it is
//! given, so a weighted category with no scores shrinks the overall score.
//! Documents from [`get_full`] never contain such a category, which means
//! [`compute_scores`] neither reports it nor counts its weight.
//! [`crate::calculator`] is the alternative normalized strategy.

use crate::document::{get_full, ScoringDocument};
use crate::Result;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::collections::BTreeMap;

/// Per-category aggregation detail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub weight: f64,
    pub avg: f64,
    pub count: usize,
}

/// Aggregated scores for one model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelScores {
    pub model: String,
    pub categories: BTreeMap<String, CategoryScore>,
    pub overall: f64,
}

/// Fetch the model's scoring document and aggregate it
///
/// Pure read: nothing is written. Fails with NotFound for unknown models.
pub async fn compute_scores(pool: &SqlitePool, model_name: &str) -> Result<ModelScores> {
    let document = get_full(pool, model_name).await?;
    Ok(aggregate(model_name, &document))
}

/// Aggregate a scoring document
pub fn aggregate(model_name: &str, document: &ScoringDocument) -> ModelScores {
    let categories: BTreeMap<String, CategoryScore> = document
        .iter()
        .map(|(name, entry)| {
            let count = entry.subfeatures.len();
            let avg = if count == 0 {
                0.0
            } else {
                entry.subfeatures.values().map(|s| s.score).sum::<f64>() / count as f64
            };
            (
                name.clone(),
                CategoryScore {
                    weight: entry.weight,
                    avg,
                    count,
                },
            )
        })
        .collect();

    let overall = overall_score(&categories);

    ModelScores {
        model: model_name.to_string(),
        categories,
        overall,
    }
}

fn overall_score(categories: &BTreeMap<String, CategoryScore>) -> f64 {
    let total_weight: f64 = categories.values().map(|c| c.weight).sum();

    if total_weight <= 0.0 {
        let active: Vec<f64> = categories
            .values()
            .filter(|c| c.count > 0)
            .map(|c| c.avg)
            .collect();
        if active.is_empty() {
            return 0.0;
        }
        return active.iter().sum::<f64>() / active.len() as f64;
    }

    categories
        .values()
        .filter(|c| c.count > 0)
        .map(|c| c.avg * (c.weight / total_weight))
        .sum()
}
