//! Handlers for the `/products` resource.
//!
//! Dispatch is purely on the HTTP method:
//!
//! | Method   | Input                | Result                                          |
//! |----------|----------------------|-------------------------------------------------|
//! | `GET`    | optional `id` query  | `200`, JSON array (0 or 1 element when `id` set)|
//! | `POST`   | product JSON body    | `200`, the saved product                        |
//! | `PUT`    | product JSON body    | `201`, new product, `Location: /products?id=N`  |
//! | `DELETE` | `id` query           | `204`, even if nothing matched                  |
//!
//! `PUT` always inserts: any `ID` in the body is discarded before saving.
//! Malformed JSON, negative prices and non-numeric ids are rejected with `400`.

use super::{AppState, PRODUCTS_PATH, RequestId};
use crate::{
    core::product::{self, ProductDraft},
    entities::ProductModel,
    errors::{Error, Result},
};
use axum::{
    Json,
    body::Bytes,
    extract::{Query, State, rejection::QueryRejection},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::{debug, info};

/// Query string accepted by `/products`.
///
/// The id stays text here so that a malformed value becomes our own `400`
/// rather than a generic extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    /// Raw `id` parameter, if present
    pub id: Option<String>,
}

impl ProductQuery {
    /// The requested id, if a non-empty one was given.
    ///
    /// # Errors
    /// Returns `BadRequest` when the value is not an integer.
    pub fn parsed_id(&self) -> Result<Option<i64>> {
        self.id
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(|raw| {
                raw.parse().map_err(|_| Error::BadRequest {
                    message: format!("Invalid product id: {raw:?}"),
                })
            })
            .transpose()
    }
}

/// Turns axum's own query rejection (e.g. a repeated `id`) into our `400`.
fn query_or_bad_request(
    query: std::result::Result<Query<ProductQuery>, QueryRejection>,
) -> Result<ProductQuery> {
    query
        .map(|Query(query)| query)
        .map_err(|rejection| Error::BadRequest {
            message: format!("Invalid query string: {}", rejection.body_text()),
        })
}

fn decode_draft(body: &Bytes) -> Result<ProductDraft> {
    serde_json::from_slice(body).map_err(|e| Error::BadRequest {
        message: format!("Invalid product JSON: {e}"),
    })
}

/// Location of a single product.
#[must_use]
pub fn product_location(id: i64) -> String {
    format!("{PRODUCTS_PATH}?id={id}")
}

/// `GET /products[?id=N]` - lists active products, or the one matching `id`.
pub async fn get_products(
    State(state): State<AppState>,
    request_id: RequestId,
    query: std::result::Result<Query<ProductQuery>, QueryRejection>,
) -> Result<Json<Vec<ProductModel>>> {
    let products = match query_or_bad_request(query)?.parsed_id()? {
        Some(id) => product::find_by_id(&state.database, id)
            .await?
            .into_iter()
            .collect(),
        None => product::find_all(&state.database).await?,
    };

    info!("[{request_id:>10}] Return products count {}", products.len());
    Ok(Json(products))
}

/// `POST /products` - inserts a product, or overwrites the one named by `ID`.
pub async fn post_product(
    State(state): State<AppState>,
    request_id: RequestId,
    body: Bytes,
) -> Result<Json<ProductModel>> {
    let draft = decode_draft(&body)?;
    let saved = product::save(&state.database, draft).await?;

    info!("[{request_id:>10}] Create product id={}", saved.id);
    Ok(Json(saved))
}

/// `PUT /products` - always creates a new product and points `Location` at it.
pub async fn put_product(
    State(state): State<AppState>,
    request_id: RequestId,
    body: Bytes,
) -> Result<impl IntoResponse> {
    let draft = decode_draft(&body)?.without_id();
    let created = product::save(&state.database, draft).await?;

    info!("[{request_id:>10}] Update product id={}", created.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, product_location(created.id))],
        Json(created),
    ))
}

/// `DELETE /products?id=N` - soft deletes the product; unknown ids are a no-op.
pub async fn delete_product(
    State(state): State<AppState>,
    request_id: RequestId,
    query: std::result::Result<Query<ProductQuery>, QueryRejection>,
) -> Result<StatusCode> {
    let id = query_or_bad_request(query)?.parsed_id()?.ok_or_else(|| Error::BadRequest {
        message: "Missing product id".to_string(),
    })?;

    if !product::soft_delete(&state.database, id).await? {
        debug!("[{request_id:>10}] No active product with id={id}");
    }

    info!("[{request_id:>10}] Delete product with id={id}");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use axum::http::Method;
    use serde_json::json;

    #[test]
    fn test_parsed_id() {
        let query = |id: Option<&str>| ProductQuery {
            id: id.map(str::to_string),
        };

        assert_eq!(query(None).parsed_id().unwrap(), None);
        assert_eq!(query(Some("")).parsed_id().unwrap(), None);
        assert_eq!(query(Some("12")).parsed_id().unwrap(), Some(12));
        assert_eq!(query(Some(" 3 ")).parsed_id().unwrap(), Some(3));
        assert!(matches!(
            query(Some("abc")).parsed_id(),
            Err(Error::BadRequest { .. })
        ));
        assert!(matches!(
            query(Some("1.5")).parsed_id(),
            Err(Error::BadRequest { .. })
        ));
    }

    #[test]
    fn test_product_location() {
        assert_eq!(product_location(17), "/products?id=17");
    }

    #[tokio::test]
    async fn test_get_all_seeded_products() -> Result<()> {
        let server = test_server(setup_seeded_db().await?);

        let response = server.get("/products").await;
        response.assert_status_ok();

        let products: Vec<ProductModel> = response.json();
        assert_eq!(products.len(), 10);
        assert_eq!(products[0].code, "D100");
        assert_eq!(products[0].price, 100);
        assert_eq!(products[9].code, "D109");
        assert_eq!(products[9].price, 109);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_empty_store_returns_empty_array() -> Result<()> {
        let (server, _db) = setup_test_server().await?;

        let response = server.get("/products").await;
        response.assert_status_ok();
        response.assert_json(&json!([]));

        Ok(())
    }

    #[tokio::test]
    async fn test_post_then_get_by_id() -> Result<()> {
        let (server, db) = setup_test_server().await?;

        let response = server
            .post("/products")
            .json(&json!({"Code": "X1", "Price": 50}))
            .await;
        response.assert_status_ok();
        let created: ProductModel = response.json();
        assert_eq!(created.code, "X1");
        assert_eq!(created.price, 50);
        assert_eq!(product::count_products(&db).await?, 1);

        let response = server
            .get("/products")
            .add_query_param("id", created.id)
            .await;
        response.assert_status_ok();
        let found: Vec<ProductModel> = response.json();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, created.id);
        assert_eq!(found[0].code, "X1");
        assert_eq!(found[0].price, 50);
        assert_eq!(found[0].deleted_at, None);

        Ok(())
    }

    #[tokio::test]
    async fn test_product_json_shape() -> Result<()> {
        let (server, _db) = setup_test_server().await?;

        server
            .post("/products")
            .json(&json!({"Code": "S1", "Price": 7}))
            .await
            .assert_status_ok();

        let body: serde_json::Value = server.get("/products").await.json();
        let product = &body[0];
        for field in ["ID", "CreatedAt", "UpdatedAt", "DeletedAt", "Code", "Price"] {
            assert!(product.get(field).is_some(), "missing field {field}");
        }
        assert!(product["DeletedAt"].is_null());
        assert_eq!(product["Code"], "S1");
        assert_eq!(product["Price"], 7);

        Ok(())
    }

    #[tokio::test]
    async fn test_post_with_existing_id_updates() -> Result<()> {
        let (server, db) = setup_test_server().await?;
        let existing = create_test_product(&db, "Old").await?;

        let response = server
            .post("/products")
            .json(&json!({"ID": existing.id, "Code": "New", "Price": 99}))
            .await;
        response.assert_status_ok();

        let updated: ProductModel = response.json();
        assert_eq!(updated.id, existing.id);
        assert_eq!(updated.code, "New");
        assert_eq!(product::count_products(&db).await?, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_post_with_unknown_id_is_not_found() -> Result<()> {
        let (server, _db) = setup_test_server().await?;

        let response = server
            .post("/products")
            .json(&json!({"ID": 404, "Code": "Nope", "Price": 1}))
            .expect_failure()
            .await;
        response.assert_status(StatusCode::NOT_FOUND);

        Ok(())
    }

    #[tokio::test]
    async fn test_post_rejects_bad_input() -> Result<()> {
        let (server, db) = setup_test_server().await?;

        let response = server
            .post("/products")
            .text("{not json")
            .expect_failure()
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let response = server
            .post("/products")
            .json(&json!({"Code": "Neg", "Price": -3}))
            .expect_failure()
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        assert_eq!(product::count_products(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_put_always_creates() -> Result<()> {
        let (server, db) = setup_test_server().await?;
        let existing = create_test_product(&db, "Existing").await?;
        let body = json!({"ID": existing.id, "Code": "P1", "Price": 20});

        let first = server.put("/products").json(&body).await;
        first.assert_status(StatusCode::CREATED);
        let first_product: ProductModel = first.json();

        let second = server.put("/products").json(&body).await;
        second.assert_status(StatusCode::CREATED);
        let second_product: ProductModel = second.json();

        assert_ne!(first_product.id, second_product.id);
        assert_ne!(first_product.id, existing.id);
        assert_ne!(second_product.id, existing.id);
        assert_eq!(
            first.header(header::LOCATION),
            format!("/products?id={}", first_product.id)
        );
        assert_eq!(
            second.header(header::LOCATION),
            format!("/products?id={}", second_product.id)
        );

        // The targeted product is untouched
        let untouched = product::find_by_id(&db, existing.id).await?.unwrap();
        assert_eq!(untouched.code, "Existing");
        assert_eq!(product::count_products(&db).await?, 3);

        Ok(())
    }

    #[tokio::test]
    async fn test_put_location_resolves() -> Result<()> {
        let (server, _db) = setup_test_server().await?;

        let response = server
            .put("/products")
            .json(&json!({"Code": "L1", "Price": 5}))
            .await;
        response.assert_status(StatusCode::CREATED);
        let location = response.header(header::LOCATION);
        let location = location.to_str().unwrap();

        let found: Vec<ProductModel> = server.get(location).await.json();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].code, "L1");

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_hides_product() -> Result<()> {
        let server = test_server(setup_seeded_db().await?);

        let response = server.delete("/products").add_query_param("id", 3).await;
        response.assert_status(StatusCode::NO_CONTENT);

        let by_id = server.get("/products").add_query_param("id", 3).await;
        by_id.assert_status_ok();
        by_id.assert_json(&json!([]));

        let all: Vec<ProductModel> = server.get("/products").await.json();
        assert_eq!(all.len(), 9);
        assert!(all.iter().all(|p| p.id != 3));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_keeps_row_in_storage() -> Result<()> {
        let (server, db) = setup_test_server().await?;
        let target = create_test_product(&db, "Doomed").await?;

        server
            .delete("/products")
            .add_query_param("id", target.id)
            .await
            .assert_status(StatusCode::NO_CONTENT);

        assert_eq!(product::count_products(&db).await?, 1);
        assert!(product::find_by_id(&db, target.id).await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_noop() -> Result<()> {
        let server = test_server(setup_seeded_db().await?);

        let response = server.delete("/products").add_query_param("id", 999).await;
        response.assert_status(StatusCode::NO_CONTENT);

        let all: Vec<ProductModel> = server.get("/products").await.json();
        assert_eq!(all.len(), 10);

        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_ids_are_bad_requests() -> Result<()> {
        let server = test_server(setup_seeded_db().await?);

        server
            .get("/products")
            .add_query_param("id", "abc")
            .expect_failure()
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        server
            .delete("/products")
            .add_query_param("id", "abc")
            .expect_failure()
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        server
            .delete("/products")
            .expect_failure()
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        Ok(())
    }

    #[tokio::test]
    async fn test_repeated_id_is_json_bad_request() -> Result<()> {
        let server = test_server(setup_seeded_db().await?);

        for method in [Method::GET, Method::DELETE] {
            let response = server
                .method(method, "/products?id=1&id=2")
                .expect_failure()
                .await;
            response.assert_status(StatusCode::BAD_REQUEST);

            let body: serde_json::Value = response.json();
            let message = body["message"].as_str().unwrap();
            assert!(message.starts_with("Invalid query string"), "{message}");
        }

        // Nothing was deleted along the way
        let all: Vec<ProductModel> = server.get("/products").await.json();
        assert_eq!(all.len(), 10);

        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_id_body_is_json() -> Result<()> {
        let server = test_server(setup_seeded_db().await?);

        let response = server
            .get("/products")
            .add_query_param("id", "abc")
            .expect_failure()
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({"message": "Invalid product id: \"abc\""}));

        Ok(())
    }

    #[tokio::test]
    async fn test_empty_id_lists_everything() -> Result<()> {
        let server = test_server(setup_seeded_db().await?);

        let all: Vec<ProductModel> = server.get("/products?id=").await.json();
        assert_eq!(all.len(), 10);

        Ok(())
    }

    #[tokio::test]
    async fn test_unsupported_method() -> Result<()> {
        let (server, _db) = setup_test_server().await?;

        server
            .method(Method::PATCH, "/products")
            .expect_failure()
            .await
            .assert_status(StatusCode::METHOD_NOT_ALLOWED);

        Ok(())
    }
}
