//! Product entity - The single resource served under `/products`.
//!
//! Rows are never physically removed: deleting a product stamps `deleted_at`,
//! and every standard read filters those rows out. Identifiers are assigned by
//! the store on insert and are never reused, soft-deleted rows included.
//!
//! The serde field names (`ID`, `CreatedAt`, ...) are the wire representation
//! clients already depend on; the column names stay snake_case.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique, store-assigned identifier
    #[sea_orm(primary_key)]
    #[serde(rename = "ID")]
    pub id: i64,
    /// When the product was created
    #[serde(rename = "CreatedAt")]
    pub created_at: DateTimeUtc,
    /// When the product was last modified
    #[serde(rename = "UpdatedAt")]
    pub updated_at: DateTimeUtc,
    /// Soft delete marker - set once the product is deleted, `None` while active
    #[serde(rename = "DeletedAt")]
    pub deleted_at: Option<DateTimeUtc>,
    /// Product code (e.g., "D100")
    #[serde(rename = "Code")]
    pub code: String,
    /// Price in whole units, never negative
    #[serde(rename = "Price")]
    pub price: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Returns true once the product has been soft deleted.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}
