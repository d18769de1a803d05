//! Upsert reconciler
//!
//! Merges a decoded payload into persisted state inside one transaction:
//! models, categories and subfeatures are created on first reference,
//! weights and scores are overwritten in place. Any error drops the
//! transaction, which rolls back every write made so far.

use crate::db::store;
use crate::payload::Payload;
use crate::Result;
use serde_json::Value;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

/// What one payload application changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertStats {
    pub model_created: bool,
    pub categories_created: usize,
    pub subfeatures_created: usize,
    pub weights_written: usize,
    pub scores_inserted: usize,
    pub scores_overwritten: usize,
}

/// Upsert a decoded payload atomically; returns the canonical model name
pub async fn upsert(pool: &SqlitePool, payload: &Payload) -> Result<String> {
    let mut tx = store::begin_write(pool).await?;

    let stats = apply_payload(&mut tx, payload).await?;

    tx.commit().await?;

    info!(
        model = %payload.name,
        categories = payload.categories.len(),
        scores_inserted = stats.scores_inserted,
        scores_overwritten = stats.scores_overwritten,
        "Upsert committed"
    );

    Ok(payload.name.clone())
}

/// Decode a raw JSON payload and upsert it
///
/// Validation happens before the transaction opens, so a malformed payload
/// never touches the store.
pub async fn upsert_json(pool: &SqlitePool, raw: &Value) -> Result<String> {
    let payload = Payload::from_json(raw)?;
    upsert(pool, &payload).await
}

/// Apply one payload on an open connection (normally a transaction)
pub async fn apply_payload(
    conn: &mut SqliteConnection,
    payload: &Payload,
) -> Result<UpsertStats> {
    let mut stats = UpsertStats::default();

    let (model, created) = store::get_or_create_model(conn, &payload.name).await?;
    stats.model_created = created;

    for (cat_name, category) in &payload.categories {
        let (cat, created) = store::get_or_create_category(conn, cat_name).await?;
        if created {
            stats.categories_created += 1;
        }

        if let Some(weight) = category.weight {
            store::upsert_category_weight(conn, model.id, cat.id, weight).await?;
            stats.weights_written += 1;
        }

        for (sub_name, value) in &category.subfeatures {
            let (sub, created) = store::get_or_create_subfeature(conn, cat.id, sub_name).await?;
            if created {
                stats.subfeatures_created += 1;
            }

            let inserted =
                store::upsert_score(conn, model.id, sub.id, value.score(), value.note()).await?;
            if inserted {
                stats.scores_inserted += 1;
            } else {
                stats.scores_overwritten += 1;
            }
        }
    }

    debug!(model = %model.name, ?stats, "Applied payload");

    Ok(stats)
}

/// All model names, sorted
pub async fn list_models(pool: &SqlitePool) -> Result<Vec<String>> {
    let mut conn = pool.acquire().await?;
    store::list_model_names(&mut conn).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::compute_scores;
    use crate::db::init_in_memory;
    use crate::document::get_full;
    use crate::Error;
    use serde_json::json;

    fn mulan() -> Value {
        json!({
            "name": "MULAN",
            "categories": {
                "adaptability": {
                    "weight": 1,
                    "subfeatures": {
                        "transferability": {"score": 1, "note": "some transfer"},
                        "modular_architecture": 1
                    }
                },
                "usability": {
                    "weight": 3,
                    "subfeatures": {"code_availability": {"score": 2, "note": "github"}}
                }
            }
        })
    }

    async fn counts(pool: &SqlitePool) -> crate::db::RowCounts {
        let mut conn = pool.acquire().await.unwrap();
        store::count_rows(&mut conn).await.unwrap()
    }

    #[tokio::test]
    async fn test_round_trip() {
        let pool = init_in_memory().await.unwrap();

        let name = upsert_json(&pool, &mulan()).await.unwrap();
        assert_eq!(name, "MULAN");

        let document = get_full(&pool, "MULAN").await.unwrap();
        assert_eq!(document["adaptability"].weight, 1.0);
        assert_eq!(document["usability"].weight, 3.0);
        let transfer = &document["adaptability"].subfeatures["transferability"];
        assert_eq!(transfer.score, 1.0);
        assert_eq!(transfer.note.as_deref(), Some("some transfer"));
        assert_eq!(
            document["adaptability"].subfeatures["modular_architecture"].note,
            None
        );

        let scores = compute_scores(&pool, "MULAN").await.unwrap();
        assert!((scores.overall - 1.75).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_idempotent_upsert() {
        let pool = init_in_memory().await.unwrap();

        upsert_json(&pool, &mulan()).await.unwrap();
        let first_counts = counts(&pool).await;
        let first_scores = compute_scores(&pool, "MULAN").await.unwrap();

        upsert_json(&pool, &mulan()).await.unwrap();

        assert_eq!(counts(&pool).await, first_counts);
        assert_eq!(compute_scores(&pool, "MULAN").await.unwrap(), first_scores);
        assert_eq!(first_counts.models, 1);
        assert_eq!(first_counts.scores, 3);
    }

    #[tokio::test]
    async fn test_partial_payload_keeps_weight() {
        let pool = init_in_memory().await.unwrap();
        upsert_json(&pool, &mulan()).await.unwrap();

        upsert_json(
            &pool,
            &json!({
                "name": "MULAN",
                "categories": {"usability": {"subfeatures": {"code_availability": 0}}}
            }),
        )
        .await
        .unwrap();

        let document = get_full(&pool, "MULAN").await.unwrap();
        assert_eq!(document["usability"].weight, 3.0);
        let sub = &document["usability"].subfeatures["code_availability"];
        assert_eq!(sub.score, 0.0);
        // Overwrite replaces the note too
        assert_eq!(sub.note, None);
    }

    #[tokio::test]
    async fn test_unweighted_category_reports_zero() {
        let pool = init_in_memory().await.unwrap();
        upsert_json(
            &pool,
            &json!({
                "name": "M",
                "categories": {
                    "a": {"subfeatures": {"x": 1}},
                    "b": {"subfeatures": {"y": 2}}
                }
            }),
        )
        .await
        .unwrap();

        let document = get_full(&pool, "M").await.unwrap();
        assert_eq!(document["a"].weight, 0.0);
        assert_eq!(compute_scores(&pool, "M").await.unwrap().overall, 1.5);
    }

    #[tokio::test]
    async fn test_compute_scores_ignores_weighted_category_without_scores() {
        let pool = init_in_memory().await.unwrap();
        upsert_json(
            &pool,
            &json!({
                "name": "M",
                "categories": {
                    "a": {"weight": 1, "subfeatures": {"x": 1}},
                    "empty": {"weight": 5, "subfeatures": {}}
                }
            }),
        )
        .await
        .unwrap();

        let scores = compute_scores(&pool, "M").await.unwrap();

        assert_eq!(scores.categories.keys().collect::<Vec<_>>(), vec!["a"]);
        assert_eq!(scores.overall, 1.0);
    }

    #[tokio::test]
    async fn test_invalid_payload_writes_nothing() {
        let pool = init_in_memory().await.unwrap();

        let err = upsert_json(
            &pool,
            &json!({
                "name": "BAD",
                "categories": {
                    "a": {"subfeatures": {"ok": 1}},
                    "b": {"subfeatures": {"bad": "high"}}
                }
            }),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(counts(&pool).await, crate::db::RowCounts::default());
        assert!(list_models(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_transaction_rolls_back() {
        let pool = init_in_memory().await.unwrap();
        let payload = Payload::from_json(&mulan()).unwrap();

        {
            let mut tx = pool.begin().await.unwrap();
            apply_payload(&mut tx, &payload).await.unwrap();
            // Dropped without commit
        }

        assert_eq!(counts(&pool).await, crate::db::RowCounts::default());
    }

    #[tokio::test]
    async fn test_list_models_sorted() {
        let pool = init_in_memory().await.unwrap();
        for name in ["zeta", "alpha", "mid"] {
            upsert_json(&pool, &json!({"name": name})).await.unwrap();
        }

        assert_eq!(list_models(&pool).await.unwrap(), vec!["alpha", "mid", "zeta"]);
    }
}
