//! Model recommendation
//!
//! Filters models by subfeature conditions such as
//! `"usability.code_availability": ">= 1.5"` and ranks the survivors by
//! overall score.

use crate::aggregate::aggregate;
use crate::document::{get_full, ScoringDocument};
use crate::reconcile::list_models;
use crate::Result;
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::BTreeMap;

/// Default number of recommendations
pub const DEFAULT_TOP_K: usize = 5;

/// `"category.subfeature"` -> `"<op><number>"`
pub type Query = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Condition {
    Ge(f64),
    Gt(f64),
    Le(f64),
    Lt(f64),
    Eq(f64),
}

impl Condition {
    /// Parse `">= 1.5"` style conditions; `None` when malformed
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let number = |rest: &str| rest.trim().parse::<f64>().ok();

        if let Some(rest) = raw.strip_prefix(">=") {
            number(rest).map(Condition::Ge)
        } else if let Some(rest) = raw.strip_prefix('>') {
            number(rest).map(Condition::Gt)
        } else if let Some(rest) = raw.strip_prefix("<=") {
            number(rest).map(Condition::Le)
        } else if let Some(rest) = raw.strip_prefix('<') {
            number(rest).map(Condition::Lt)
        } else if let Some(rest) = raw.strip_prefix("==") {
            number(rest).map(Condition::Eq)
        } else {
            None
        }
    }

    pub fn matches(&self, actual: f64) -> bool {
        match *self {
            Condition::Ge(t) => actual >= t,
            Condition::Gt(t) => actual > t,
            Condition::Le(t) => actual <= t,
            Condition::Lt(t) => actual < t,
            Condition::Eq(t) => actual == t,
        }
    }
}

/// True when `document` satisfies every condition of `query`
///
/// A missing subfeature, a key that is not `category.subfeature`, or a
/// malformed condition all reject the model.
pub fn matches_query(document: &ScoringDocument, query: &Query) -> bool {
    query.iter().all(|(key, raw)| {
        let Some((category, subfeature)) = key.split_once('.') else {
            return false;
        };
        if subfeature.contains('.') {
            return false;
        }
        let Some(condition) = Condition::parse(raw) else {
            return false;
        };
        document
            .get(category)
            .and_then(|c| c.subfeatures.get(subfeature))
            .is_some_and(|s| condition.matches(s.score))
    })
}

/// Names of the models satisfying `query`
pub fn filter_models<'a>(
    models: &'a BTreeMap<String, ScoringDocument>,
    query: &Query,
) -> Vec<&'a str> {
    models
        .iter()
        .filter(|(_, document)| matches_query(document, query))
        .map(|(name, _)| name.as_str())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub name: String,
    pub score: f64,
    pub data: ScoringDocument,
}

/// Rank the models matching `query` by overall score, best first
pub fn rank(
    models: BTreeMap<String, ScoringDocument>,
    query: &Query,
    top_k: usize,
) -> Vec<Recommendation> {
    let mut ranked: Vec<Recommendation> = models
        .into_iter()
        .filter(|(_, document)| matches_query(document, query))
        .map(|(name, data)| Recommendation {
            score: aggregate(&name, &data).overall,
            name,
            data,
        })
        .collect();

    // Stable sort keeps name order among ties
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked.truncate(top_k);
    ranked
}

/// Load every stored model and recommend the best `top_k` matching `query`
pub async fn recommend(
    pool: &SqlitePool,
    query: &Query,
    top_k: usize,
) -> Result<Vec<Recommendation>> {
    let mut models = BTreeMap::new();
    for name in list_models(pool).await? {
        let document = get_full(pool, &name).await?;
        models.insert(name, document);
    }

    Ok(rank(models, query, top_k))
}
