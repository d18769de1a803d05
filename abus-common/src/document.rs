//! Scoring document model
//!
//! A scoring document is the nested, per-model view of the normalized
//! tables:
//!
//! ```text
//! category -> { weight, subfeatures: { subfeature -> { score, note } } }
//! ```
//!
//! Only categories with at least one recorded score appear, so "no data"
//! stays distinguishable from "scored zero".

use crate::db::store;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use std::collections::BTreeMap;

/// Score and optional note for one subfeature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubfeatureEntry {
    pub score: f64,
    #[serde(default)]
    pub note: Option<String>,
}

/// One category of a scoring document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryEntry {
    /// Per-model category weight, 0.0 when never set
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub subfeatures: BTreeMap<String, SubfeatureEntry>,
}

/// Category name -> category entry
pub type ScoringDocument = BTreeMap<String, CategoryEntry>;

/// Category name -> subfeature name -> score
pub type ScoreTable = BTreeMap<String, BTreeMap<String, f64>>;

/// Reconstruct the full scoring document for `model_name`
///
/// Fails with [`Error::NotFound`] when the model is unknown. Never creates
/// anything.
pub async fn get_full(pool: &SqlitePool, model_name: &str) -> Result<ScoringDocument> {
    let mut conn = pool.acquire().await?;

    let model = store::find_model(&mut conn, model_name)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Model '{}' not found", model_name)))?;

    let rows = sqlx::query(
        r#"
        SELECT c.name AS category,
               s.category_id AS category_id,
               s.name AS subfeature,
               sc.value AS value,
               sc.note AS note,
               COALESCE(mc.weight, 0.0) AS weight
        FROM scores sc
        JOIN subcategories s ON s.id = sc.subcategory_id
        LEFT JOIN categories c ON c.id = s.category_id
        LEFT JOIN model_categories mc
               ON mc.model_id = sc.model_id AND mc.category_id = s.category_id
        WHERE sc.model_id = ?
        "#,
    )
    .bind(model.id)
    .fetch_all(&mut *conn)
    .await?;

    let mut document = ScoringDocument::new();
    for row in rows {
        let subfeature: String = row.try_get("subfeature")?;
        let category: Option<String> = row.try_get("category")?;
        let category = match category {
            Some(name) => name,
            None => {
                let category_id: i64 = row.try_get("category_id")?;
                tracing::error!(
                    model = model_name,
                    subfeature = %subfeature,
                    category_id,
                    "Score references a subfeature without a category"
                );
                return Err(Error::SchemaInconsistency(format!(
                    "subfeature '{}' references missing category id {}",
                    subfeature, category_id
                )));
            }
        };

        let weight: f64 = row.try_get("weight")?;
        let entry = document.entry(category).or_insert_with(|| CategoryEntry {
            weight,
            subfeatures: BTreeMap::new(),
        });
        entry.subfeatures.insert(
            subfeature,
            SubfeatureEntry {
                score: row.try_get("value")?,
                note: row.try_get("note")?,
            },
        );
    }

    Ok(document)
}

/// Plain score view: category -> subfeature -> score, without weights or notes
pub async fn get_scores(pool: &SqlitePool, model_name: &str) -> Result<ScoreTable> {
    let document = get_full(pool, model_name).await?;

    Ok(document
        .into_iter()
        .map(|(category, entry)| {
            let scores = entry
                .subfeatures
                .into_iter()
                .map(|(name, sub)| (name, sub.score))
                .collect();
            (category, scores)
        })
        .collect())
}
