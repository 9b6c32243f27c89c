//! Catalog wire shapes: categories, product cards, product detail, sales.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use mercato_core::{CategoryId, ProductId, SaleId, SubcategoryId, TagId};

/// Number of characters of the short description shown on product detail.
pub const SHORT_DESCRIPTION_CHARS: usize = 100;

/// Image display data.
#[derive(Debug, Clone, Serialize)]
pub struct ImageView {
    pub src: Option<String>,
    pub alt: String,
}

/// Tag display data.
#[derive(Debug, Clone, Serialize)]
pub struct TagView {
    pub id: TagId,
    pub name: String,
}

/// A subcategory inside the category tree.
#[derive(Debug, Serialize)]
pub struct SubcategoryView {
    pub id: SubcategoryId,
    pub title: String,
    pub image: ImageView,
}

/// A top-level category with its subcategories.
#[derive(Debug, Serialize)]
pub struct CategoryView {
    pub id: CategoryId,
    pub title: String,
    pub image: ImageView,
    pub subcategories: Vec<SubcategoryView>,
}

/// A product as it appears in listings (catalog, basket, order lines).
///
/// `price` is the effective price: the sale override when one exists,
/// otherwise the list price. `reviews` is the review count and `rating` the
/// mean review rate.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCard {
    pub id: ProductId,
    /// Subcategory the product is attached to.
    pub category: SubcategoryId,
    pub price: Decimal,
    pub count: Decimal,
    pub date: NaiveDate,
    pub title: String,
    pub description: String,
    pub free_delivery: bool,
    pub images: Vec<ImageView>,
    pub tags: Vec<TagView>,
    pub reviews: i64,
    pub rating: Option<f64>,
}

/// A single review on the product detail page.
#[derive(Debug, Serialize)]
pub struct ReviewView {
    pub author: String,
    pub email: String,
    pub text: String,
    pub rate: i16,
    pub date: chrono::DateTime<chrono::Utc>,
}

/// A free-form specification row on the product detail page.
#[derive(Debug, Serialize)]
pub struct SpecificationView {
    pub name: String,
    pub value: String,
}

/// Full product detail.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    pub id: ProductId,
    pub category: SubcategoryId,
    pub price: Decimal,
    pub count: Decimal,
    pub date: NaiveDate,
    pub title: String,
    /// First [`SHORT_DESCRIPTION_CHARS`] characters of the description.
    pub description: String,
    pub full_description: String,
    pub free_delivery: bool,
    pub images: Vec<ImageView>,
    pub tags: Vec<TagView>,
    pub reviews: Vec<ReviewView>,
    pub specifications: Vec<SpecificationView>,
    pub rating: Option<f64>,
}

/// A sale listing entry: list price and sale price side by side.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleView {
    pub id: SaleId,
    pub price: Decimal,
    pub sale_price: Decimal,
    /// Day/month of the sale window, e.g. "05/08".
    pub date_from: String,
    pub date_to: String,
    pub title: String,
    pub images: Vec<ImageView>,
}

/// Shorten a description to its leading characters, on a char boundary.
#[must_use]
pub fn short_description(description: &str) -> String {
    description.chars().take(SHORT_DESCRIPTION_CHARS).collect()
}

// =============================================================================
// Catalog query parameters
// =============================================================================

/// Sort direction, ascending by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// SQL keyword for this direction.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Catalog filter and sort parameters.
///
/// Every filter is optional and independent; an absent parameter means "no
/// constraint", which is why each field is an `Option` rather than a
/// defaulted value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogQuery {
    /// Case-insensitive title substring.
    #[serde(rename = "filter[name]")]
    pub name: Option<String>,
    /// Inclusive lower price bound.
    #[serde(rename = "filter[minPrice]")]
    pub min_price: Option<Decimal>,
    /// Inclusive upper price bound.
    #[serde(rename = "filter[maxPrice]")]
    pub max_price: Option<Decimal>,
    /// When true, only products with free delivery.
    #[serde(rename = "filter[freeDelivery]")]
    pub free_delivery: Option<bool>,
    /// When true, only available products.
    #[serde(rename = "filter[available]")]
    pub available: Option<bool>,
    /// Category id (< 1000) or subcategory id (>= 1000).
    pub category: Option<i32>,
    /// Sort key: `reviews`, `rating`, or a product column.
    pub sort: Option<String>,
    /// Sort direction.
    #[serde(rename = "sortType")]
    pub sort_type: Option<SortDirection>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_short_description_truncates() {
        let long = "x".repeat(250);
        assert_eq!(short_description(&long).chars().count(), 100);
        assert_eq!(short_description("brief"), "brief");
    }

    #[test]
    fn test_short_description_char_boundary() {
        let cyrillic = "д".repeat(150);
        assert_eq!(short_description(&cyrillic).chars().count(), 100);
    }

    #[test]
    fn test_catalog_query_absent_params_stay_absent() {
        let q: CatalogQuery = serde_urlencoded::from_str("").unwrap();
        assert!(q.name.is_none());
        assert!(q.min_price.is_none());
        assert!(q.category.is_none());
    }

    #[test]
    fn test_catalog_query_bracketed_filters() {
        let q: CatalogQuery = serde_urlencoded::from_str(
            "filter%5Bname%5D=lamp&filter%5BminPrice%5D=15&filter%5BfreeDelivery%5D=true&sort=price&sortType=desc",
        )
        .unwrap();
        assert_eq!(q.name.as_deref(), Some("lamp"));
        assert_eq!(q.min_price, Some(Decimal::from(15)));
        assert_eq!(q.free_delivery, Some(true));
        assert_eq!(q.sort.as_deref(), Some("price"));
        assert_eq!(q.sort_type, Some(SortDirection::Desc));
    }

    #[test]
    fn test_product_card_wire_shape() {
        let card = ProductCard {
            id: ProductId::new(1),
            category: SubcategoryId::new(1001),
            price: Decimal::new(1999, 2),
            count: Decimal::from(5),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            title: "Lamp".to_string(),
            description: "A lamp".to_string(),
            free_delivery: true,
            images: vec![],
            tags: vec![],
            reviews: 2,
            rating: Some(4.5),
        };
        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["freeDelivery"], true);
        assert_eq!(json["category"], 1001);
        assert_eq!(json["price"], "19.99");
    }
}
