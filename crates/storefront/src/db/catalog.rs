//! Catalog repository: products, categories, tags, sales and reviews.
//!
//! Listing queries share one card query (product columns, the resolved sale
//! price and the review aggregates) and batch-attach images and tags in two
//! follow-up queries instead of per-row lookups.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

use mercato_core::{
    CategoryId, ProductId, ReviewId, SUBCATEGORY_ID_FLOOR, SaleId, SubcategoryId, TagId,
    effective_price,
};

use super::RepositoryError;
use crate::models::catalog::{
    CatalogQuery, CategoryView, ImageView, ProductCard, ProductDetail, ReviewView, SaleView,
    SpecificationView, SubcategoryView, TagView, short_description,
};
use crate::models::pagination::PageQuery;

/// Mean review rate a product needs to count as popular.
const POPULAR_RATING_FLOOR: f64 = 4.2;
/// Listing sizes of the two curated product shelves.
const POPULAR_LIMIT: i64 = 8;
const LIMITED_LIMIT: i64 = 16;

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for product card queries.
#[derive(Debug, sqlx::FromRow)]
struct CardRow {
    id: i32,
    subcategory_id: i32,
    price: Decimal,
    sale_price: Option<Decimal>,
    count: Decimal,
    date: NaiveDate,
    title: String,
    description: String,
    free_delivery: bool,
    review_count: i64,
    rating: Option<f64>,
}

impl CardRow {
    /// Card without images and tags; those are attached in a second pass.
    fn into_card(self) -> ProductCard {
        ProductCard {
            id: ProductId::new(self.id),
            category: SubcategoryId::new(self.subcategory_id),
            price: effective_price(self.price, self.sale_price),
            count: self.count,
            date: self.date,
            title: self.title,
            description: self.description,
            free_delivery: self.free_delivery,
            images: Vec::new(),
            tags: Vec::new(),
            reviews: self.review_count,
            rating: self.rating,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: i32,
    product_id: i32,
    sale_price: Decimal,
    date_from: DateTime<Utc>,
    date_to: DateTime<Utc>,
    price: Decimal,
    title: String,
}

/// Shared SELECT/FROM for product cards. `sale` is the price override row
/// with the lowest id, `r` the review aggregates.
const CARD_QUERY: &str = "
    SELECT p.id, p.subcategory_id, p.price, sale.sale_price, p.count, p.date,
           p.title, p.description, p.free_delivery,
           COALESCE(r.review_count, 0) AS review_count,
           r.rating
    FROM product p
    LEFT JOIN LATERAL (
        SELECT s.sale_price
        FROM product_sale s
        WHERE s.product_id = p.id
        ORDER BY s.id
        LIMIT 1
    ) sale ON TRUE
    LEFT JOIN (
        SELECT product_id,
               COUNT(*) AS review_count,
               AVG(rate)::float8 AS rating
        FROM review
        GROUP BY product_id
    ) r ON r.product_id = p.id
    WHERE NOT p.archived";

/// ORDER BY expression for a catalog sort key. Unknown keys fall back to the
/// product id so arbitrary input never reaches the SQL text.
fn sort_expression(key: Option<&str>) -> &'static str {
    match key {
        Some("reviews") => "COALESCE(r.review_count, 0)",
        Some("rating") => "r.rating",
        Some("price") => "COALESCE(sale.sale_price, p.price)",
        Some("title") => "p.title",
        Some("date") => "p.date",
        _ => "p.id",
    }
}

/// Append the optional catalog filters to a card or count query.
fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &CatalogQuery) {
    if let Some(name) = &query.name
        && !name.is_empty()
    {
        qb.push(" AND p.title ILIKE ")
            .push_bind(format!("%{name}%"));
    }
    if let Some(min_price) = query.min_price {
        qb.push(" AND p.price >= ").push_bind(min_price);
    }
    if let Some(max_price) = query.max_price {
        qb.push(" AND p.price <= ").push_bind(max_price);
    }
    if query.free_delivery == Some(true) {
        qb.push(" AND p.free_delivery");
    }
    if query.available == Some(true) {
        qb.push(" AND p.available");
    }
    if let Some(category) = query.category {
        if category >= SUBCATEGORY_ID_FLOOR {
            qb.push(" AND p.subcategory_id = ").push_bind(category);
        } else {
            qb.push(" AND p.subcategory_id IN (SELECT id FROM subcategory WHERE category_id = ")
                .push_bind(category)
                .push(")");
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for catalog database operations.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Categories and tags
    // =========================================================================

    /// The full category tree with subcategories.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn categories(&self) -> Result<Vec<CategoryView>, RepositoryError> {
        let categories: Vec<(i32, String, Option<String>, String)> =
            sqlx::query_as("SELECT id, title, image_src, image_alt FROM category ORDER BY id")
                .fetch_all(self.pool)
                .await?;

        let subcategories: Vec<(i32, i32, String, Option<String>, String)> = sqlx::query_as(
            "SELECT id, category_id, title, image_src, image_alt FROM subcategory ORDER BY id",
        )
        .fetch_all(self.pool)
        .await?;

        let mut tree: Vec<CategoryView> = categories
            .into_iter()
            .map(|(id, title, src, alt)| CategoryView {
                id: CategoryId::new(id),
                title,
                image: ImageView { src, alt },
                subcategories: Vec::new(),
            })
            .collect();

        for (id, category_id, title, src, alt) in subcategories {
            if let Some(parent) = tree.iter_mut().find(|c| c.id.as_i32() == category_id) {
                parent.subcategories.push(SubcategoryView {
                    id: SubcategoryId::new(id),
                    title,
                    image: ImageView { src, alt },
                });
            }
        }

        Ok(tree)
    }

    /// Tags, optionally scoped by the category filter: a subcategory id
    /// scopes to that subcategory, a category id to all of its subcategories.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn tags(&self, category: Option<i32>) -> Result<Vec<TagView>, RepositoryError> {
        let rows: Vec<(i32, String)> = match category {
            Some(id) if id >= SUBCATEGORY_ID_FLOOR => {
                sqlx::query_as(
                    "SELECT t.id, t.name
                     FROM tag t
                     JOIN tag_subcategory ts ON ts.tag_id = t.id
                     WHERE ts.subcategory_id = $1
                     ORDER BY t.id",
                )
                .bind(id)
                .fetch_all(self.pool)
                .await?
            }
            Some(id) => {
                sqlx::query_as(
                    "SELECT DISTINCT t.id, t.name
                     FROM tag t
                     JOIN tag_subcategory ts ON ts.tag_id = t.id
                     JOIN subcategory sc ON sc.id = ts.subcategory_id
                     WHERE sc.category_id = $1
                     ORDER BY t.id",
                )
                .bind(id)
                .fetch_all(self.pool)
                .await?
            }
            None => {
                sqlx::query_as("SELECT id, name FROM tag ORDER BY id")
                    .fetch_all(self.pool)
                    .await?
            }
        };

        Ok(rows
            .into_iter()
            .map(|(id, name)| TagView {
                id: TagId::new(id),
                name,
            })
            .collect())
    }

    // =========================================================================
    // Product listings
    // =========================================================================

    /// One page of the filtered, sorted catalog together with the total row
    /// count across all pages.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_catalog(
        &self,
        query: &CatalogQuery,
        page: &PageQuery,
    ) -> Result<(Vec<ProductCard>, i64), RepositoryError> {
        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM product p WHERE NOT p.archived");
        push_filters(&mut count_qb, query);
        let (total,): (i64,) = count_qb.build_query_as().fetch_one(self.pool).await?;

        let direction = query.sort_type.unwrap_or_default();
        let mut qb = QueryBuilder::new(CARD_QUERY);
        push_filters(&mut qb, query);
        qb.push(" ORDER BY ")
            .push(sort_expression(query.sort.as_deref()))
            .push(" ")
            .push(direction.as_sql())
            .push(" NULLS LAST, p.id")
            .push(" LIMIT ")
            .push_bind(page.page_size())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows: Vec<CardRow> = qb.build_query_as().fetch_all(self.pool).await?;
        let cards = self.attach_card_relations(rows).await?;

        Ok((cards, total))
    }

    /// The first products whose mean review rate clears the popularity floor.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn popular(&self) -> Result<Vec<ProductCard>, RepositoryError> {
        let rows: Vec<CardRow> = sqlx::query_as(&format!(
            "{CARD_QUERY} AND r.rating >= $1 ORDER BY p.id LIMIT $2"
        ))
        .bind(POPULAR_RATING_FLOOR)
        .bind(POPULAR_LIMIT)
        .fetch_all(self.pool)
        .await?;

        self.attach_card_relations(rows).await
    }

    /// The first products flagged as limited edition.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn limited(&self) -> Result<Vec<ProductCard>, RepositoryError> {
        let rows: Vec<CardRow> =
            sqlx::query_as(&format!("{CARD_QUERY} AND p.limited ORDER BY p.id LIMIT $1"))
                .bind(LIMITED_LIMIT)
                .fetch_all(self.pool)
                .await?;

        self.attach_card_relations(rows).await
    }

    /// Cards for an explicit product id list, in id order. Used for the
    /// curated banner shelf and for basket and order lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn cards_by_ids(&self, ids: &[i32]) -> Result<Vec<ProductCard>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<CardRow> =
            sqlx::query_as(&format!("{CARD_QUERY} AND p.id = ANY($1) ORDER BY p.id"))
                .bind(ids)
                .fetch_all(self.pool)
                .await?;

        self.attach_card_relations(rows).await
    }

    /// Cards for basket or order lines, in line order, with each card's
    /// stock count replaced by the line quantity. Lines whose product no
    /// longer exists are dropped.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn cards_with_counts(
        &self,
        lines: &[(ProductId, Decimal)],
    ) -> Result<Vec<ProductCard>, RepositoryError> {
        let ids: Vec<i32> = lines.iter().map(|(id, _)| id.as_i32()).collect();
        let cards = self.cards_by_ids(&ids).await?;

        let mut by_id: HashMap<i32, ProductCard> =
            cards.into_iter().map(|c| (c.id.as_i32(), c)).collect();

        Ok(lines
            .iter()
            .filter_map(|(id, count)| {
                by_id.remove(&id.as_i32()).map(|mut card| {
                    card.count = *count;
                    card
                })
            })
            .collect())
    }

    /// Full detail for one product, `None` when it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn product_detail(
        &self,
        id: ProductId,
    ) -> Result<Option<ProductDetail>, RepositoryError> {
        let row: Option<CardRow> = sqlx::query_as(&format!("{CARD_QUERY} AND p.id = $1"))
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let rating = row.rating;
        let card = row.into_card();
        let mut cards = self.attach_card_relations_cards(vec![card]).await?;
        let card = cards.remove(0);

        let reviews = self.reviews(id).await?;

        let specifications: Vec<(String, String)> = sqlx::query_as(
            "SELECT name, value FROM product_specification WHERE product_id = $1 ORDER BY id",
        )
        .bind(id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(Some(ProductDetail {
            id: card.id,
            category: card.category,
            price: card.price,
            count: card.count,
            date: card.date,
            title: card.title,
            description: short_description(&card.description),
            full_description: card.description,
            free_delivery: card.free_delivery,
            images: card.images,
            tags: card.tags,
            reviews,
            specifications: specifications
                .into_iter()
                .map(|(name, value)| SpecificationView { name, value })
                .collect(),
            rating,
        }))
    }

    // =========================================================================
    // Sales
    // =========================================================================

    /// One page of the sale listing with the total sale count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_sales(
        &self,
        page: &PageQuery,
    ) -> Result<(Vec<SaleView>, i64), RepositoryError> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM product_sale")
            .fetch_one(self.pool)
            .await?;

        let rows: Vec<SaleRow> = sqlx::query_as(
            "SELECT s.id, s.product_id, s.sale_price, s.date_from, s.date_to,
                    p.price, p.title
             FROM product_sale s
             JOIN product p ON p.id = s.product_id
             ORDER BY s.id
             LIMIT $1 OFFSET $2",
        )
        .bind(page.page_size())
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        let product_ids: Vec<i32> = rows.iter().map(|r| r.product_id).collect();
        let mut images = self.images_for(&product_ids).await?;

        Ok((
            rows.into_iter()
                .map(|r| SaleView {
                    id: SaleId::new(r.id),
                    price: r.price,
                    sale_price: r.sale_price,
                    date_from: r.date_from.format("%d/%m").to_string(),
                    date_to: r.date_to.format("%d/%m").to_string(),
                    title: r.title,
                    images: images.remove(&r.product_id).unwrap_or_default(),
                })
                .collect(),
            total,
        ))
    }

    // =========================================================================
    // Reviews
    // =========================================================================

    /// Reviews for a product, oldest first, with the author's account data.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn reviews(&self, product: ProductId) -> Result<Vec<ReviewView>, RepositoryError> {
        let rows: Vec<(String, String, String, i16, DateTime<Utc>)> = sqlx::query_as(
            "SELECT u.username, u.email, r.text, r.rate, r.date
             FROM review r
             JOIN app_user u ON u.id = r.author_id
             WHERE r.product_id = $1
             ORDER BY r.date",
        )
        .bind(product.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(author, email, text, rate, date)| ReviewView {
                author,
                email,
                text,
                rate,
                date,
            })
            .collect())
    }

    /// Attach a review to a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_review(
        &self,
        product: ProductId,
        author: mercato_core::UserId,
        text: &str,
        rate: i16,
    ) -> Result<ReviewId, RepositoryError> {
        let row: Option<(i32,)> = sqlx::query_as(
            "INSERT INTO review (author_id, product_id, rate, text)
             SELECT $1, id, $2, $3 FROM product WHERE id = $4
             RETURNING id",
        )
        .bind(author.as_i32())
        .bind(rate)
        .bind(text)
        .bind(product.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(|(id,)| ReviewId::new(id))
            .ok_or(RepositoryError::NotFound)
    }

    // =========================================================================
    // Relation batching
    // =========================================================================

    async fn attach_card_relations(
        &self,
        rows: Vec<CardRow>,
    ) -> Result<Vec<ProductCard>, RepositoryError> {
        self.attach_card_relations_cards(rows.into_iter().map(CardRow::into_card).collect())
            .await
    }

    /// Fill `images` and `tags` for a batch of cards with two queries.
    async fn attach_card_relations_cards(
        &self,
        mut cards: Vec<ProductCard>,
    ) -> Result<Vec<ProductCard>, RepositoryError> {
        if cards.is_empty() {
            return Ok(cards);
        }

        let ids: Vec<i32> = cards.iter().map(|c| c.id.as_i32()).collect();
        let mut images = self.images_for(&ids).await?;

        let tag_rows: Vec<(i32, i32, String)> = sqlx::query_as(
            "SELECT pt.product_id, t.id, t.name
             FROM product_tag pt
             JOIN tag t ON t.id = pt.tag_id
             WHERE pt.product_id = ANY($1)
             ORDER BY t.id",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut tags: HashMap<i32, Vec<TagView>> = HashMap::new();
        for (product_id, id, name) in tag_rows {
            tags.entry(product_id).or_default().push(TagView {
                id: TagId::new(id),
                name,
            });
        }

        for card in &mut cards {
            let key = card.id.as_i32();
            card.images = images.remove(&key).unwrap_or_default();
            card.tags = tags.remove(&key).unwrap_or_default();
        }

        Ok(cards)
    }

    async fn images_for(
        &self,
        product_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<ImageView>>, RepositoryError> {
        let mut images: HashMap<i32, Vec<ImageView>> = HashMap::new();
        if product_ids.is_empty() {
            return Ok(images);
        }

        let rows: Vec<(i32, Option<String>, String)> = sqlx::query_as(
            "SELECT product_id, src, alt
             FROM product_image
             WHERE product_id = ANY($1)
             ORDER BY id",
        )
        .bind(product_ids)
        .fetch_all(self.pool)
        .await?;

        for (product_id, src, alt) in rows {
            images
                .entry(product_id)
                .or_default()
                .push(ImageView { src, alt });
        }

        Ok(images)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::catalog::SortDirection;

    fn sql_for(query: &CatalogQuery) -> String {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM product p WHERE NOT p.archived");
        push_filters(&mut qb, query);
        qb.sql().to_string()
    }

    #[test]
    fn test_no_filters_add_no_clauses() {
        let sql = sql_for(&CatalogQuery::default());
        assert_eq!(sql, "SELECT COUNT(*) FROM product p WHERE NOT p.archived");
    }

    #[test]
    fn test_min_price_filter_binds_when_present() {
        let query = CatalogQuery {
            min_price: Some(Decimal::from(10)),
            ..CatalogQuery::default()
        };
        let sql = sql_for(&query);
        assert!(sql.contains("p.price >= $1"));
        assert!(!sql.contains("p.price <="));
    }

    #[test]
    fn test_category_threshold_picks_subcategory_or_parent() {
        let direct = CatalogQuery {
            category: Some(1000),
            ..CatalogQuery::default()
        };
        assert!(sql_for(&direct).contains("p.subcategory_id = $1"));

        let via_parent = CatalogQuery {
            category: Some(999),
            ..CatalogQuery::default()
        };
        assert!(sql_for(&via_parent).contains("WHERE category_id = $1"));
    }

    #[test]
    fn test_boolean_filters_only_apply_when_true() {
        let query = CatalogQuery {
            free_delivery: Some(false),
            available: Some(false),
            ..CatalogQuery::default()
        };
        assert_eq!(
            sql_for(&query),
            "SELECT COUNT(*) FROM product p WHERE NOT p.archived"
        );
    }

    #[test]
    fn test_empty_name_is_ignored() {
        let query = CatalogQuery {
            name: Some(String::new()),
            ..CatalogQuery::default()
        };
        assert!(!sql_for(&query).contains("ILIKE"));
    }

    #[test]
    fn test_sort_expression_whitelist() {
        assert_eq!(sort_expression(Some("reviews")), "COALESCE(r.review_count, 0)");
        assert_eq!(sort_expression(Some("rating")), "r.rating");
        assert_eq!(
            sort_expression(Some("price")),
            "COALESCE(sale.sale_price, p.price)"
        );
        assert_eq!(sort_expression(Some("p.id; DROP TABLE product")), "p.id");
        assert_eq!(sort_expression(None), "p.id");
    }

    #[test]
    fn test_sort_direction_sql() {
        assert_eq!(SortDirection::Asc.as_sql(), "ASC");
        assert_eq!(SortDirection::Desc.as_sql(), "DESC");
    }
}
