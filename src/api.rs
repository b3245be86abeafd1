//! Presentation boundary - JSON payloads with HTTP status codes.
//!
//! Routing is left to the caller; these functions turn a query string or a
//! group id into the body and status a storefront endpoint would return.
//! Missing entities become 404 payloads, store failures propagate as errors.

use crate::{
    core::{
        availability::load_availability,
        group::get_group_by_id,
        navigation::{find_best_match, navigation_data},
        product::get_product_by_slug,
        selection::Selection,
    },
    errors::{Error, Result},
};
use http::StatusCode;
use sea_orm::ConnectionTrait;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{instrument, warn};

/// Query key naming the product.
pub const PRODUCT_SLUG_KEY: &str = "product_slug";

/// A JSON body and the status it should be served with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status
    pub status: StatusCode,
    /// JSON body
    pub body: Value,
}

impl ApiResponse {
    /// 200 with a serialized payload.
    ///
    /// # Errors
    /// Returns [`Error::Json`] if the payload cannot be serialized.
    pub fn ok<T: Serialize>(payload: &T) -> Result<Self> {
        Ok(Self {
            status: StatusCode::OK,
            body: serde_json::to_value(payload)?,
        })
    }

    /// `{"error": message}` with the given status.
    #[must_use]
    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": message.into() }),
        }
    }

    /// Maps client-facing errors to responses; anything else stays an error.
    ///
    /// # Errors
    /// Returns `error` unchanged when it is not a lookup or validation failure.
    pub fn from_error(error: Error) -> Result<Self> {
        match error {
            Error::NotFound { entity, .. } => {
                Ok(Self::error(StatusCode::NOT_FOUND, format!("{entity} not found")))
            }
            Error::InvalidInput { message } => Ok(Self::error(StatusCode::BAD_REQUEST, message)),
            Error::Conflict { message } => Ok(Self::error(StatusCode::CONFLICT, message)),
            other => Err(other),
        }
    }

    /// True for 2xx statuses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

fn product_slug(query: &str) -> Option<String> {
    url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
        .find(|(key, value)| key == PRODUCT_SLUG_KEY && !value.trim().is_empty())
        .map(|(_, value)| value.trim().to_string())
}

/// Best match for a query such as `product_slug=shirt&color=Black`.
///
/// 400 without `product_slug`, 404 for an unknown product, 200 otherwise,
/// including `type: "none"` results.
#[instrument(skip(db))]
pub async fn best_match_response<C>(db: &C, query: &str) -> Result<ApiResponse>
where
    C: ConnectionTrait,
{
    let Some(slug) = product_slug(query) else {
        return Ok(ApiResponse::error(
            StatusCode::BAD_REQUEST,
            "product_slug is required",
        ));
    };
    let Some(product) = get_product_by_slug(db, &slug).await? else {
        warn!(slug = %slug, "Best match requested for unknown product");
        return Ok(ApiResponse::error(StatusCode::NOT_FOUND, "Product not found"));
    };

    let selection = Selection::parse_query(query);
    let result = find_best_match(db, &product, &selection).await?;
    ApiResponse::ok(&result)
}

/// Per-axis availability for a query such as `product_slug=shirt&color=Black`.
#[instrument(skip(db))]
pub async fn available_options_response<C>(db: &C, query: &str) -> Result<ApiResponse>
where
    C: ConnectionTrait,
{
    let Some(slug) = product_slug(query) else {
        return Ok(ApiResponse::error(
            StatusCode::BAD_REQUEST,
            "product_slug is required",
        ));
    };
    let Some(product) = get_product_by_slug(db, &slug).await? else {
        return Ok(ApiResponse::error(StatusCode::NOT_FOUND, "Product not found"));
    };

    let selection = Selection::parse_query(query);
    let availability = load_availability(db, product.id, &selection).await?;
    ApiResponse::ok(&availability)
}

/// Navigation payload of a group page; 404 for an unknown group.
#[instrument(skip(db))]
pub async fn group_navigation_response<C>(db: &C, group_id: i64) -> Result<ApiResponse>
where
    C: ConnectionTrait,
{
    let Some(group) = get_group_by_id(db, group_id).await? else {
        return Ok(ApiResponse::error(StatusCode::NOT_FOUND, "Group not found"));
    };
    match navigation_data(db, &group).await {
        Ok(navigation) => ApiResponse::ok(&navigation),
        Err(error) => ApiResponse::from_error(error),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn test_product_slug_extraction() {
        assert_eq!(product_slug("?product_slug=shirt&color=Black").as_deref(), Some("shirt"));
        assert_eq!(product_slug("color=Black"), None);
        assert_eq!(product_slug("product_slug=&color=Black"), None);
    }

    #[test]
    fn test_from_error_maps_client_errors() {
        let response = ApiResponse::from_error(Error::not_found("VariantGroup", 7)).unwrap();
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.body["error"], "VariantGroup not found");

        let passthrough = ApiResponse::from_error(Error::Config {
            message: "broken".to_string(),
        });
        assert!(matches!(passthrough, Err(Error::Config { .. })));
    }

    #[tokio::test]
    async fn test_best_match_response_statuses() -> Result<()> {
        let (db, _product, group) = setup_tshirt_catalog().await?;

        let missing = best_match_response(&db, "color=Black").await?;
        assert_eq!(missing.status, StatusCode::BAD_REQUEST);
        assert_eq!(missing.body["error"], "product_slug is required");

        let unknown = best_match_response(&db, "product_slug=nope").await?;
        assert_eq!(unknown.status, StatusCode::NOT_FOUND);

        let found = best_match_response(&db, "product_slug=basic-t-shirt&color=Black&format=json").await?;
        assert!(found.is_success());
        assert_eq!(found.body["type"], "group");
        assert_eq!(found.body["id"], group.id);
        assert_eq!(found.body["match_score"], 2);
        assert_eq!(found.body["product_slug"], "basic-t-shirt");
        Ok(())
    }

    #[tokio::test]
    async fn test_blank_value_is_treated_as_unselected() -> Result<()> {
        let (db, _product, group) = setup_tshirt_catalog().await?;

        let response = best_match_response(&db, "product_slug=basic-t-shirt&color=").await?;
        assert!(response.is_success());
        assert_eq!(response.body["type"], "group");
        assert_eq!(response.body["id"], group.id);
        assert_eq!(response.body["match_score"], 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_best_match_response_variant_and_none() -> Result<()> {
        let (db, _product, _group) = setup_tshirt_catalog().await?;

        let variant = best_match_response(&db, "product_slug=basic-t-shirt&color=Blue&size=P").await?;
        assert_eq!(variant.status, StatusCode::OK);
        assert_eq!(variant.body["type"], "variant");
        // No blue small exists and no group covers both pairs; the first
        // partial match in SKU order wins.
        assert_eq!(variant.body["sku"], "TS-BLK-P");
        assert_eq!(variant.body["is_in_stock"], true);

        let empty = create_test_product(&db, "Empty Product").await?;
        let none = best_match_response(&db, &format!("product_slug={}", empty.slug)).await?;
        assert_eq!(none.status, StatusCode::OK);
        assert_eq!(none.body["type"], "none");
        Ok(())
    }

    #[tokio::test]
    async fn test_available_options_response() -> Result<()> {
        let (db, _product) = setup_extension_catalog().await?;
        let response = available_options_response(&db, "product_slug=hair-extension&color=Blonde").await?;
        assert!(response.is_success());
        assert_eq!(response.body["length"]["options"], json!([]));
        assert_eq!(response.body["color"]["options"][0]["value"], "Black");
        Ok(())
    }

    #[tokio::test]
    async fn test_group_navigation_response() -> Result<()> {
        let (db, product, group) = setup_tshirt_catalog().await?;

        let response = group_navigation_response(&db, group.id).await?;
        assert!(response.is_success());
        assert_eq!(response.body["current_group"]["slug"], "black-shirts");
        assert_eq!(response.body["product"]["id"], product.id);
        assert_eq!(response.body["common_attributes"]["color"], "Black");
        assert_eq!(response.body["attribute_navigation"][0]["is_fixed"], true);
        assert_eq!(response.body["related_groups"][0]["slug"], "mediums");

        let missing = group_navigation_response(&db, 9999).await?;
        assert_eq!(missing.status, StatusCode::NOT_FOUND);
        Ok(())
    }
}
