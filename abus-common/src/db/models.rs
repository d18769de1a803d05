//! Database row models

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct ModelRow {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct CategoryRow {
    pub id: i64,
    pub name: String,
}

/// A subfeature; the table keeps the historical name `subcategories`
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct SubfeatureRow {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct CategoryWeightRow {
    pub id: i64,
    pub model_id: i64,
    pub category_id: i64,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct ScoreRow {
    pub id: i64,
    pub model_id: i64,
    pub subcategory_id: i64,
    pub value: f64,
    pub note: Option<String>,
}

/// Row counts per scoring table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RowCounts {
    pub models: i64,
    pub categories: i64,
    pub subcategories: i64,
    pub model_categories: i64,
    pub scores: i64,
}
