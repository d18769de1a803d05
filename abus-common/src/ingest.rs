//! Ingestion pipeline
//!
//! Turns evidence text into an upsert payload (schema -> scorer -> payload)
//! and optionally persists it. Also loads bulk seed documents.

use crate::db::{store, RowCounts};
use crate::evidence::{EvidenceScorer, EvidenceScores};
use crate::payload::{CategoryPayload, Payload, SubfeatureValue};
use crate::reconcile::{apply_payload, upsert};
use crate::schema::get_schema;
use crate::{Error, Result};
use serde::Serialize;
use serde_json::Value;
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use tracing::info;

/// Category name -> weight
pub type Weights = BTreeMap<String, f64>;

/// Assemble a payload from evidence scores
///
/// Every category gets an explicit weight: the one in `weights`, else 0.0.
pub fn build_payload(
    model_name: &str,
    scores: &EvidenceScores,
    weights: Option<&Weights>,
) -> Payload {
    let categories = scores
        .iter()
        .map(|(category, subs)| {
            let weight = weights
                .and_then(|w| w.get(category))
                .copied()
                .unwrap_or(0.0);
            let subfeatures = subs
                .iter()
                .map(|(sub, evidence)| {
                    (
                        sub.clone(),
                        SubfeatureValue::Detailed {
                            score: f64::from(evidence.score),
                            note: Some(evidence.note.clone()),
                        },
                    )
                })
                .collect();
            (
                category.clone(),
                CategoryPayload {
                    weight: Some(weight),
                    subfeatures,
                },
            )
        })
        .collect();

    Payload {
        name: model_name.to_string(),
        categories,
    }
}

/// Score `text` against the current schema without persisting anything
pub async fn score_text(
    pool: &SqlitePool,
    model_name: &str,
    text: &str,
    weights: Option<&Weights>,
    scorer: &dyn EvidenceScorer,
) -> Result<Payload> {
    let schema = get_schema(pool).await?;
    let scored = scorer.score(text, &schema);
    Ok(build_payload(model_name, &scored, weights))
}

/// Score `text` and upsert the result; returns the payload that was written
pub async fn ingest_text(
    pool: &SqlitePool,
    model_name: &str,
    text: &str,
    weights: Option<&Weights>,
    scorer: &dyn EvidenceScorer,
) -> Result<Payload> {
    if model_name.is_empty() {
        return Err(Error::Validation("model name is required".to_string()));
    }

    let payload = score_text(pool, model_name, text, weights, scorer).await?;
    upsert(pool, &payload).await?;

    info!(
        model = model_name,
        scores = payload.score_count(),
        "Ingested evidence text"
    );

    Ok(payload)
}

/// Outcome of a seed run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeedReport {
    pub models: usize,
    pub before: RowCounts,
    pub after: RowCounts,
}

/// Load a seed document (`model name -> categories`) in one transaction
///
/// The whole document is decoded before anything is written.
pub async fn seed(pool: &SqlitePool, document: &Value) -> Result<SeedReport> {
    let models = document.as_object().ok_or_else(|| {
        Error::Validation("Top-level seed document must map model -> categories".to_string())
    })?;

    let payloads = models
        .iter()
        .map(|(name, categories)| {
            if !categories.is_object() {
                return Err(Error::Validation(format!(
                    "Model '{}' must map to an object of categories",
                    name
                )));
            }
            Payload::from_categories(name, categories)
        })
        .collect::<Result<Vec<_>>>()?;

    let mut tx = store::begin_write(pool).await?;
    let before = store::count_rows(&mut tx).await?;
    for payload in &payloads {
        apply_payload(&mut tx, payload).await?;
    }
    let after = store::count_rows(&mut tx).await?;
    tx.commit().await?;

    info!(models = payloads.len(), ?before, ?after, "Seed complete");

    Ok(SeedReport {
        models: payloads.len(),
        before,
        after,
    })
}
