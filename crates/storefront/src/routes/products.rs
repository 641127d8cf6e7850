//! Catalog route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use harbor_core::{Category, CatalogQuery, Product, ProductId, RatingSummary, SortOrder};

use super::{ApiJson, ApiQuery, Success, path_id};
use crate::db::{ProductRepository, ReviewRepository};
use crate::error::AppError;
use crate::models::{CategoryEntry, ProductDetail};
use crate::services::reviews::{ReviewRequest, submit_review};
use crate::state::AppState;

/// Query parameters for the product list.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub category: Option<String>,
    pub min_rating: Option<f64>,
    pub sort: Option<String>,
}

impl ListParams {
    fn into_query(self) -> Result<CatalogQuery, AppError> {
        let category = self
            .category
            .map(|c| c.parse::<Category>())
            .transpose()
            .map_err(AppError::validation)?;
        let sort = self
            .sort
            .map(|s| s.parse::<SortOrder>())
            .transpose()
            .map_err(AppError::validation)?
            .unwrap_or_default();
        if let Some(min) = self.min_rating
            && !(0.0..=5.0).contains(&min)
        {
            return Err(AppError::Validation(
                "min_rating must be between 0 and 5".to_string(),
            ));
        }
        Ok(CatalogQuery {
            category,
            min_rating: self.min_rating,
            sort,
        })
    }
}

/// List products with their tiers and rating aggregates.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> Result<Json<Vec<Product>>, AppError> {
    let query = params.into_query()?;
    let mut products = ProductRepository::new(state.pool()).list().await?;
    query.apply(&mut products);
    Ok(Json(products))
}

/// Product detail with reviews, newest first.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductDetail>, AppError> {
    let id: ProductId = path_id(&id, "Product")?;
    let mut product = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or(AppError::NotFound("Product"))?;
    let reviews = ReviewRepository::new(state.pool())
        .list_for_product(id)
        .await?;

    // Summarize the reviews we return so both halves of the response agree
    product.rating = RatingSummary::from_ratings(reviews.iter().map(|r| r.rating));

    Ok(Json(ProductDetail { product, reviews }))
}

/// The closed category set with storefront page paths.
pub async fn categories() -> Json<Vec<CategoryEntry>> {
    Json(Category::ALL.into_iter().map(CategoryEntry::from).collect())
}

/// Submit a review for a product.
#[instrument(skip(state, request))]
pub async fn create_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<ReviewRequest>,
) -> Result<(StatusCode, Json<Success>), AppError> {
    let id: ProductId = path_id(&id, "Product")?;
    submit_review(state.pool(), id, request).await?;
    Ok((StatusCode::CREATED, Json(Success::OK)))
}

#[cfg(test)]
mod tests {
    use axum::http::Method;

    use super::*;
    use crate::routes::tests::send;

    #[test]
    fn test_list_params() {
        let query = ListParams {
            category: Some("Garden".to_string()),
            min_rating: Some(4.0),
            sort: Some("price-low".to_string()),
        }
        .into_query()
        .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(query.category, Some(Category::Garden));
        assert_eq!(query.sort, SortOrder::PriceLow);

        let defaults = ListParams::default().into_query().unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(defaults.sort, SortOrder::Featured);
        assert_eq!(defaults.category, None);
    }

    #[test]
    fn test_list_params_rejects_unknown_values() {
        let bad_sort = ListParams {
            sort: Some("cheapest".to_string()),
            ..ListParams::default()
        };
        assert!(matches!(bad_sort.into_query(), Err(AppError::Validation(_))));

        let bad_category = ListParams {
            category: Some("Toys".to_string()),
            ..ListParams::default()
        };
        assert!(matches!(bad_category.into_query(), Err(AppError::Validation(_))));

        let bad_rating = ListParams {
            min_rating: Some(7.5),
            ..ListParams::default()
        };
        assert!(bad_rating.into_query().is_err());
    }

    #[tokio::test]
    async fn test_malformed_product_id_is_not_found() {
        let (status, body) = send(Method::GET, "/api/products/abc", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "not_found");
        assert_eq!(body["error"], "Product not found");
    }

    #[tokio::test]
    async fn test_unknown_sort_is_rejected() {
        let (status, body) = send(Method::GET, "/api/products?sort=cheapest", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "validation_error");
    }

    #[tokio::test]
    async fn test_categories() {
        let (status, body) = send(Method::GET, "/api/categories", None).await;
        assert_eq!(status, StatusCode::OK);
        let entries = body.as_array().map(Vec::len);
        assert_eq!(entries, Some(Category::ALL.len()));
        assert_eq!(body[0]["path"], Category::Pantry.page_path());
    }

    #[tokio::test]
    async fn test_out_of_range_rating_is_rejected_before_lookup() {
        let (status, body) = send(
            Method::POST,
            "/api/products/1/reviews",
            Some(r#"{"customer_name":"Ada","rating":6,"comment":"Great"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "validation_error");
    }
}
