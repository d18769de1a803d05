//! Store primitives over the five scoring tables
//!
//! Every function takes `&mut SqliteConnection` so it can run inside an
//! upsert transaction (`&mut *tx`) or on a plain pooled connection.

use super::models::{
    CategoryRow, CategoryWeightRow, ModelRow, RowCounts, ScoreRow, SubfeatureRow,
};
use crate::Result;
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use tracing::debug;

/// Open a write transaction that takes the database write lock up front
///
/// A deferred BEGIN reads first and fails with SQLITE_BUSY when it later
/// tries to upgrade; BEGIN IMMEDIATE waits on the busy timeout instead.
pub async fn begin_write(pool: &SqlitePool) -> Result<Transaction<'static, Sqlite>> {
    let tx = pool.begin_with("BEGIN IMMEDIATE").await?;
    Ok(tx)
}

/// Load a model by its unique name
pub async fn find_model(conn: &mut SqliteConnection, name: &str) -> Result<Option<ModelRow>> {
    let row = sqlx::query_as::<_, ModelRow>("SELECT id, name FROM models WHERE name = ?")
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(row)
}

/// Get existing model or create new one
///
/// Returns (model, created)
pub async fn get_or_create_model(
    conn: &mut SqliteConnection,
    name: &str,
) -> Result<(ModelRow, bool)> {
    if let Some(model) = find_model(conn, name).await? {
        return Ok((model, false));
    }

    let id = sqlx::query("INSERT INTO models (name) VALUES (?)")
        .bind(name)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();

    debug!(model_id = id, model = name, "Created model");

    Ok((
        ModelRow {
            id,
            name: name.to_string(),
        },
        true,
    ))
}

/// Load a category by its unique name
pub async fn find_category(
    conn: &mut SqliteConnection,
    name: &str,
) -> Result<Option<CategoryRow>> {
    let row = sqlx::query_as::<_, CategoryRow>("SELECT id, name FROM categories WHERE name = ?")
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(row)
}

/// Load a category by id
pub async fn get_category(conn: &mut SqliteConnection, id: i64) -> Result<Option<CategoryRow>> {
    let row = sqlx::query_as::<_, CategoryRow>("SELECT id, name FROM categories WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(row)
}

/// Get existing category or create new one
pub async fn get_or_create_category(
    conn: &mut SqliteConnection,
    name: &str,
) -> Result<(CategoryRow, bool)> {
    if let Some(category) = find_category(conn, name).await? {
        return Ok((category, false));
    }

    let id = sqlx::query("INSERT INTO categories (name) VALUES (?)")
        .bind(name)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();

    debug!(category_id = id, category = name, "Created category");

    Ok((
        CategoryRow {
            id,
            name: name.to_string(),
        },
        true,
    ))
}

/// Load a subfeature by its (category, name) key
pub async fn find_subfeature(
    conn: &mut SqliteConnection,
    category_id: i64,
    name: &str,
) -> Result<Option<SubfeatureRow>> {
    let row = sqlx::query_as::<_, SubfeatureRow>(
        "SELECT id, category_id, name FROM subcategories WHERE category_id = ? AND name = ?",
    )
    .bind(category_id)
    .bind(name)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row)
}

/// Get existing subfeature under `category_id` or create new one
pub async fn get_or_create_subfeature(
    conn: &mut SqliteConnection,
    category_id: i64,
    name: &str,
) -> Result<(SubfeatureRow, bool)> {
    if let Some(sub) = find_subfeature(conn, category_id, name).await? {
        return Ok((sub, false));
    }

    let id = sqlx::query("INSERT INTO subcategories (category_id, name) VALUES (?, ?)")
        .bind(category_id)
        .bind(name)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();

    debug!(subfeature_id = id, category_id, subfeature = name, "Created subfeature");

    Ok((
        SubfeatureRow {
            id,
            category_id,
            name: name.to_string(),
        },
        true,
    ))
}

/// Load the weight association for (model, category)
pub async fn find_category_weight(
    conn: &mut SqliteConnection,
    model_id: i64,
    category_id: i64,
) -> Result<Option<CategoryWeightRow>> {
    let row = sqlx::query_as::<_, CategoryWeightRow>(
        r#"
        SELECT id, model_id, category_id, weight
        FROM model_categories
        WHERE model_id = ? AND category_id = ?
        "#,
    )
    .bind(model_id)
    .bind(category_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row)
}

/// Write the weight for (model, category), overwriting any prior value
pub async fn upsert_category_weight(
    conn: &mut SqliteConnection,
    model_id: i64,
    category_id: i64,
    weight: f64,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO model_categories (model_id, category_id, weight)
        VALUES (?, ?, ?)
        ON CONFLICT(model_id, category_id) DO UPDATE SET
            weight = excluded.weight
        "#,
    )
    .bind(model_id)
    .bind(category_id)
    .bind(weight)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Load the score for (model, subfeature)
pub async fn find_score(
    conn: &mut SqliteConnection,
    model_id: i64,
    subcategory_id: i64,
) -> Result<Option<ScoreRow>> {
    let row = sqlx::query_as::<_, ScoreRow>(
        r#"
        SELECT id, model_id, subcategory_id, value, note
        FROM scores
        WHERE model_id = ? AND subcategory_id = ?
        "#,
    )
    .bind(model_id)
    .bind(subcategory_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row)
}

/// Write score and note for (model, subfeature)
///
/// An existing row is overwritten in place (note included, so a missing
/// note clears the old one). Returns true if a new row was inserted.
pub async fn upsert_score(
    conn: &mut SqliteConnection,
    model_id: i64,
    subcategory_id: i64,
    value: f64,
    note: Option<&str>,
) -> Result<bool> {
    if let Some(existing) = find_score(conn, model_id, subcategory_id).await? {
        sqlx::query("UPDATE scores SET value = ?, note = ? WHERE id = ?")
            .bind(value)
            .bind(note)
            .bind(existing.id)
            .execute(&mut *conn)
            .await?;
        return Ok(false);
    }

    sqlx::query(
        "INSERT INTO scores (model_id, subcategory_id, value, note) VALUES (?, ?, ?, ?)",
    )
    .bind(model_id)
    .bind(subcategory_id)
    .bind(value)
    .bind(note)
    .execute(&mut *conn)
    .await?;

    Ok(true)
}

/// All model names, sorted
pub async fn list_model_names(conn: &mut SqliteConnection) -> Result<Vec<String>> {
    let names = sqlx::query_scalar::<_, String>("SELECT name FROM models ORDER BY name")
        .fetch_all(&mut *conn)
        .await?;

    Ok(names)
}

/// All categories, sorted by name
pub async fn list_categories(conn: &mut SqliteConnection) -> Result<Vec<CategoryRow>> {
    let rows = sqlx::query_as::<_, CategoryRow>("SELECT id, name FROM categories ORDER BY name")
        .fetch_all(&mut *conn)
        .await?;

    Ok(rows)
}

/// All subfeatures across every category
pub async fn list_subfeatures(conn: &mut SqliteConnection) -> Result<Vec<SubfeatureRow>> {
    let rows = sqlx::query_as::<_, SubfeatureRow>(
        "SELECT id, category_id, name FROM subcategories ORDER BY category_id, name",
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows)
}

/// Row counts for every scoring table
pub async fn count_rows(conn: &mut SqliteConnection) -> Result<RowCounts> {
    let (models, categories, subcategories, model_categories, scores) =
        sqlx::query_as::<_, (i64, i64, i64, i64, i64)>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM models),
                (SELECT COUNT(*) FROM categories),
                (SELECT COUNT(*) FROM subcategories),
                (SELECT COUNT(*) FROM model_categories),
                (SELECT COUNT(*) FROM scores)
            "#,
        )
        .fetch_one(&mut *conn)
        .await?;

    Ok(RowCounts {
        models,
        categories,
        subcategories,
        model_categories,
        scores,
    })
}
