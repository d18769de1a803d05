//! Schema registry
//!
//! Reflects the categories and subfeatures that already exist in the store.
//! The registry never invents entries; it grows only as ingestion creates
//! new categories and subfeatures.

use crate::db::store;
use crate::{Error, Result};
use sqlx::SqlitePool;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Category name -> names of its subfeatures
pub type Schema = BTreeMap<String, BTreeSet<String>>;

/// Build the schema from every known category and subfeature
///
/// Categories without subfeatures are included with an empty set.
pub async fn get_schema(pool: &SqlitePool) -> Result<Schema> {
    let mut conn = pool.acquire().await?;

    let categories = store::list_categories(&mut conn).await?;
    let subfeatures = store::list_subfeatures(&mut conn).await?;

    let names: HashMap<i64, &str> = categories
        .iter()
        .map(|c| (c.id, c.name.as_str()))
        .collect();

    let mut schema: Schema = categories
        .iter()
        .map(|c| (c.name.clone(), BTreeSet::new()))
        .collect();

    for sub in subfeatures {
        let category = names.get(&sub.category_id).ok_or_else(|| {
            Error::SchemaInconsistency(format!(
                "subfeature '{}' references missing category id {}",
                sub.name, sub.category_id
            ))
        })?;
        schema
            .entry((*category).to_string())
            .or_default()
            .insert(sub.name);
    }

    Ok(schema)
}
