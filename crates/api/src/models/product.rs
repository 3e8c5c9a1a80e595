//! Catalog types: stored products, create/update payloads, and filters.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use ecommerce_core::{Price, ProductId};

/// A catalog entry.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Why a product payload was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductValidationError {
    #[error("name cannot be empty")]
    EmptyName,
    #[error("stock cannot be negative")]
    NegativeStock,
    #[error("No valid fields provided for update")]
    EmptyUpdate,
    #[error("invalid value for `{param}`: {value:?}")]
    InvalidFilter { param: &'static str, value: String },
}

/// Payload for creating a product.
///
/// `price` rejects negative amounts during deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub stock: i32,
}

impl NewProduct {
    /// Trim the name and check the remaining field rules.
    ///
    /// # Errors
    ///
    /// Returns the first rule the payload breaks.
    pub fn validate(mut self) -> Result<Self, ProductValidationError> {
        self.name = normalize_name(&self.name)?;
        check_stock(self.stock)?;
        Ok(self)
    }
}

/// Partial update: each field is applied only when present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub stock: Option<i32>,
}

impl ProductUpdate {
    /// Whether no field would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.stock.is_none()
    }

    /// Reject empty updates and apply the same field rules as creation.
    ///
    /// # Errors
    ///
    /// Returns [`ProductValidationError::EmptyUpdate`] when no field is set,
    /// or the first field rule that fails.
    pub fn validate(mut self) -> Result<Self, ProductValidationError> {
        if self.is_empty() {
            return Err(ProductValidationError::EmptyUpdate);
        }
        if let Some(name) = self.name.as_deref() {
            self.name = Some(normalize_name(name)?);
        }
        if let Some(stock) = self.stock {
            check_stock(stock)?;
        }
        Ok(self)
    }
}

/// Raw filter query string; every parameter is optional text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilterQuery {
    pub name: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub min_stock: Option<String>,
    pub max_stock: Option<String>,
}

/// Parsed filter. All present predicates are combined with AND; ranges are
/// inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Case-insensitive substring of the name.
    pub name: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub min_stock: Option<i32>,
    pub max_stock: Option<i32>,
}

impl TryFrom<ProductFilterQuery> for ProductFilter {
    type Error = ProductValidationError;

    /// Empty parameters count as unset; malformed numbers are rejected.
    fn try_from(query: ProductFilterQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            name: non_empty(query.name),
            min_price: parse_param("min_price", query.min_price)?,
            max_price: parse_param("max_price", query.max_price)?,
            min_stock: parse_param("min_stock", query.min_stock)?,
            max_stock: parse_param("max_stock", query.max_stock)?,
        })
    }
}

fn normalize_name(name: &str) -> Result<String, ProductValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ProductValidationError::EmptyName);
    }
    Ok(trimmed.to_owned())
}

const fn check_stock(stock: i32) -> Result<(), ProductValidationError> {
    if stock < 0 {
        return Err(ProductValidationError::NegativeStock);
    }
    Ok(())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

fn parse_param<T: FromStr>(
    param: &'static str,
    value: Option<String>,
) -> Result<Option<T>, ProductValidationError> {
    non_empty(value)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|_| ProductValidationError::InvalidFilter { param, value: raw })
        })
        .transpose()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn widget() -> NewProduct {
        serde_json::from_value(serde_json::json!({
            "name": "  Widget ",
            "description": "A widget",
            "price": 9.99,
            "stock": 10
        }))
        .unwrap()
    }

    #[test]
    fn test_new_product_trims_name() {
        let product = widget().validate().unwrap();
        assert_eq!(product.name, "Widget");
        assert_eq!(product.price.amount(), Decimal::new(999, 2));
    }

    #[test]
    fn test_new_product_rejections() {
        let mut blank = widget();
        blank.name = "   ".to_string();
        assert_eq!(blank.validate().unwrap_err(), ProductValidationError::EmptyName);

        let mut negative = widget();
        negative.stock = -1;
        assert_eq!(
            negative.validate().unwrap_err(),
            ProductValidationError::NegativeStock
        );
    }

    #[test]
    fn test_negative_price_fails_to_deserialize() {
        let result = serde_json::from_value::<NewProduct>(serde_json::json!({
            "name": "Widget", "description": "", "price": -1, "stock": 1
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_update_empty_is_rejected() {
        let update: ProductUpdate = serde_json::from_str("{}").unwrap();
        assert!(update.is_empty());
        assert_eq!(
            update.validate().unwrap_err(),
            ProductValidationError::EmptyUpdate
        );
    }

    #[test]
    fn test_update_ignores_unknown_fields() {
        let update: ProductUpdate = serde_json::from_str(r#"{"colour": "red"}"#).unwrap();
        assert!(update.is_empty());
    }

    #[test]
    fn test_update_partial() {
        let update: ProductUpdate = serde_json::from_str(r#"{"stock": 3}"#).unwrap();
        let update = update.validate().unwrap();
        assert_eq!(update.stock, Some(3));
        assert!(update.name.is_none());

        let bad: ProductUpdate = serde_json::from_str(r#"{"stock": -3}"#).unwrap();
        assert_eq!(bad.validate().unwrap_err(), ProductValidationError::NegativeStock);
    }

    #[test]
    fn test_filter_parses_ranges() {
        let filter = ProductFilter::try_from(ProductFilterQuery {
            name: Some(" wid ".to_string()),
            min_price: Some("5".to_string()),
            max_price: Some("10.50".to_string()),
            min_stock: None,
            max_stock: Some("".to_string()),
        })
        .unwrap();

        assert_eq!(filter.name.as_deref(), Some("wid"));
        assert_eq!(filter.min_price, Some(Decimal::from(5)));
        assert_eq!(filter.max_price, Some(Decimal::new(1050, 2)));
        assert_eq!(filter.min_stock, None);
        assert_eq!(filter.max_stock, None);
    }

    #[test]
    fn test_filter_rejects_malformed_numbers() {
        let err = ProductFilter::try_from(ProductFilterQuery {
            min_price: Some("abc".to_string()),
            ..ProductFilterQuery::default()
        })
        .unwrap_err();
        assert_eq!(
            err,
            ProductValidationError::InvalidFilter {
                param: "min_price",
                value: "abc".to_string()
            }
        );

        let err = ProductFilter::try_from(ProductFilterQuery {
            max_stock: Some("2.5".to_string()),
            ..ProductFilterQuery::default()
        })
        .unwrap_err();
        assert!(matches!(
            err,
            ProductValidationError::InvalidFilter { param: "max_stock", .. }
        ));
    }

    #[test]
    fn test_filter_empty_query_is_unfiltered() {
        let filter = ProductFilter::try_from(ProductFilterQuery::default()).unwrap();
        assert_eq!(filter, ProductFilter::default());
    }
}
