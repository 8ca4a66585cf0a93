//! Product business logic - the storage accessor behind `/products`.
//!
//! This module owns every read and write of the products table: listing and
//! looking up active products, saving (insert or overwrite), soft deleting and
//! the one-time seed on an empty store. All functions are async and return
//! `Result` so the HTTP layer can surface failures instead of swallowing them.

use crate::{
    entities::{Product, product},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{PaginatorTrait, Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde::Deserialize;
use tracing::{debug, info, instrument};

/// Number of products inserted when the store starts out empty.
pub const SEED_COUNT: i64 = 10;

/// The caller-supplied part of a product, as decoded from a request body.
///
/// Every field is optional on the wire and falls back to its zero value, so a
/// body of `{}` is a product with an empty code and a price of 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProductDraft {
    /// Existing identifier to overwrite; `None` or `0` means insert
    #[serde(rename = "ID", default)]
    pub id: Option<i64>,
    /// Product code, empty when omitted
    #[serde(rename = "Code", default)]
    pub code: String,
    /// Price in whole units; rejected on save when negative
    #[serde(rename = "Price", default)]
    pub price: i64,
}

impl ProductDraft {
    /// Draft for a brand-new product.
    pub fn new(code: impl Into<String>, price: i64) -> Self {
        Self {
            id: None,
            code: code.into(),
            price,
        }
    }

    /// Same draft, targeting an existing identifier.
    #[must_use]
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Drops any identifier so that saving always inserts.
    #[must_use]
    pub fn without_id(mut self) -> Self {
        self.id = None;
        self
    }

    /// Identifier to overwrite, with the zero value treated as unset.
    #[must_use]
    pub fn target_id(&self) -> Option<i64> {
        self.id.filter(|id| *id != 0)
    }

    fn validate(&self) -> Result<()> {
        if self.price < 0 {
            return Err(Error::InvalidProduct {
                message: format!("price must not be negative, got {}", self.price),
            });
        }
        Ok(())
    }
}

/// Retrieves all active (non-deleted) products in store order.
///
/// # Errors
/// Returns an error if the database query fails.
#[instrument(skip(db))]
pub async fn find_all(db: &DatabaseConnection) -> Result<Vec<product::Model>> {
    Product::find()
        .filter(product::Column::DeletedAt.is_null())
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds an active product by its identifier.
///
/// A missing or soft-deleted product is `Ok(None)`, not an error.
///
/// # Errors
/// Returns an error if the database query fails.
#[instrument(skip(db))]
pub async fn find_by_id(db: &DatabaseConnection, id: i64) -> Result<Option<product::Model>> {
    Product::find_by_id(id)
        .filter(product::Column::DeletedAt.is_null())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Counts every stored product, soft-deleted rows included.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn count_products<C: ConnectionTrait>(db: &C) -> Result<u64> {
    Product::find().count(db).await.map_err(Into::into)
}

/// Persists a product and returns the stored row.
///
/// Without an identifier (or with `0`) a new row is inserted and the store
/// assigns the id. With an identifier, the code and price of that active
/// product are overwritten and its update timestamp refreshed.
///
/// # Errors
/// Returns an error if:
/// - The price is negative
/// - The identifier names no active product
/// - The database operation fails
#[instrument(skip(db))]
pub async fn save(db: &DatabaseConnection, draft: ProductDraft) -> Result<product::Model> {
    draft.validate()?;
    let now = Utc::now();

    let Some(id) = draft.target_id() else {
        let product = product::ActiveModel {
            code: Set(draft.code),
            price: Set(draft.price),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
            ..Default::default()
        };
        let inserted = product.insert(db).await?;
        debug!("Inserted product {}", inserted.id);
        return Ok(inserted);
    };

    let mut product: product::ActiveModel = find_by_id(db, id)
        .await?
        .ok_or(Error::ProductNotFound { id })?
        .into();

    product.code = Set(draft.code);
    product.price = Set(draft.price);
    product.updated_at = Set(now);

    let updated = product.update(db).await?;
    debug!("Updated product {}", updated.id);
    Ok(updated)
}

/// Soft deletes a product by stamping its `deleted_at`.
///
/// Returns whether a row was marked. Unknown identifiers and products that are
/// already deleted are left alone and yield `false`.
///
/// # Errors
/// Returns an error if the database update fails.
#[instrument(skip(db))]
pub async fn soft_delete(db: &DatabaseConnection, id: i64) -> Result<bool> {
    let result = Product::update_many()
        .col_expr(product::Column::DeletedAt, Expr::value(Utc::now()))
        .filter(product::Column::Id.eq(id))
        .filter(product::Column::DeletedAt.is_null())
        .exec(db)
        .await?;

    Ok(result.rows_affected > 0)
}

/// Code of the `index`-th seed product ("D100" for index 0).
#[must_use]
pub fn seed_code(index: i64) -> String {
    format!("D{}", 100 + index)
}

/// Inserts the seed products when the table holds no rows at all.
///
/// The count and the insert run in one transaction. Returns the number of rows
/// inserted, which is 0 whenever the store already had data.
///
/// # Errors
/// Returns an error if the count, the insert, or the commit fails.
#[instrument(skip(db))]
pub async fn seed_if_empty(db: &DatabaseConnection) -> Result<u64> {
    let txn = db.begin().await?;

    if count_products(&txn).await? > 0 {
        debug!("Products already present, skipping seed");
        return Ok(0);
    }

    info!("Init create Products");
    let now = Utc::now();
    let seeds = (0..SEED_COUNT).map(|i| product::ActiveModel {
        code: Set(seed_code(i)),
        price: Set(100 + i),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
        ..Default::default()
    });
    Product::insert_many(seeds).exec(&txn).await?;
    txn.commit().await?;

    Ok(SEED_COUNT.unsigned_abs())
}
