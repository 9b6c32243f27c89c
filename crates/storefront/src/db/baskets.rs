//! Basket repository.
//!
//! Two tables back the same contract: `basket` keyed by user id for
//! authenticated buyers and `temporary_basket` keyed by a session token for
//! anonymous ones. Every mutation is a single statement so concurrent
//! requests merge instead of losing updates.

use rust_decimal::Decimal;
use sqlx::PgPool;

use mercato_core::{ProductId, UserId};

use super::RepositoryError;

/// One basket line: the product and the basketed quantity.
#[derive(Debug, Clone, Copy)]
pub struct BasketLine {
    pub product_id: ProductId,
    pub count: Decimal,
}

/// Repository for basket database operations.
pub struct BasketRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BasketRepository<'a> {
    /// Create a new basket repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Lines in an authenticated user's basket, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user: UserId) -> Result<Vec<BasketLine>, RepositoryError> {
        let rows: Vec<(i32, Decimal)> = sqlx::query_as(
            "SELECT product_id, count FROM basket WHERE user_id = $1 ORDER BY date, id",
        )
        .bind(user.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(product_id, count)| BasketLine {
                product_id: ProductId::new(product_id),
                count,
            })
            .collect())
    }

    /// Lines in an anonymous basket, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_token(&self, token: &str) -> Result<Vec<BasketLine>, RepositoryError> {
        let rows: Vec<(i32, Decimal)> = sqlx::query_as(
            "SELECT product_id, count FROM temporary_basket
             WHERE session_token = $1 ORDER BY date, id",
        )
        .bind(token)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(product_id, count)| BasketLine {
                product_id: ProductId::new(product_id),
                count,
            })
            .collect())
    }

    /// Add `count` of a product to a user's basket, merging into an existing
    /// line atomically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn add_for_user(
        &self,
        user: UserId,
        product: ProductId,
        count: i64,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO basket (user_id, product_id, count)
             VALUES ($1, $2, $3)
             ON CONFLICT (user_id, product_id)
             DO UPDATE SET count = basket.count + EXCLUDED.count",
        )
        .bind(user.as_i32())
        .bind(product.as_i32())
        .bind(Decimal::from(count))
        .execute(self.pool)
        .await
        .map_err(foreign_key_to_not_found)?;

        Ok(())
    }

    /// Add `count` of a product to an anonymous basket.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn add_for_token(
        &self,
        token: &str,
        product: ProductId,
        count: i64,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO temporary_basket (session_token, product_id, count)
             VALUES ($1, $2, $3)
             ON CONFLICT (session_token, product_id)
             DO UPDATE SET count = temporary_basket.count + EXCLUDED.count",
        )
        .bind(token)
        .bind(product.as_i32())
        .bind(Decimal::from(count))
        .execute(self.pool)
        .await
        .map_err(foreign_key_to_not_found)?;

        Ok(())
    }

    /// Reduce a line in a user's basket by `count`, deleting it when the
    /// reduction meets or exceeds the current quantity. One statement: the
    /// decrement fires while the line stays positive, and the delete only
    /// when the decrement matched nothing, so a concurrent add can never
    /// land between a decision and its effect.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn reduce_for_user(
        &self,
        user: UserId,
        product: ProductId,
        count: i64,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "WITH reduced AS (
                 UPDATE basket SET count = count - $3
                 WHERE user_id = $1 AND product_id = $2 AND count > $3
                 RETURNING id
             )
             DELETE FROM basket
             WHERE user_id = $1 AND product_id = $2
               AND NOT EXISTS (SELECT 1 FROM reduced)",
        )
        .bind(user.as_i32())
        .bind(product.as_i32())
        .bind(Decimal::from(count))
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Reduce a line in an anonymous basket. Same contract as
    /// [`reduce_for_user`](Self::reduce_for_user).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn reduce_for_token(
        &self,
        token: &str,
        product: ProductId,
        count: i64,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "WITH reduced AS (
                 UPDATE temporary_basket SET count = count - $3
                 WHERE session_token = $1 AND product_id = $2 AND count > $3
                 RETURNING id
             )
             DELETE FROM temporary_basket
             WHERE session_token = $1 AND product_id = $2
               AND NOT EXISTS (SELECT 1 FROM reduced)",
        )
        .bind(token)
        .bind(product.as_i32())
        .bind(Decimal::from(count))
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Move every anonymous line under `token` into the user's basket,
    /// merging counts into existing lines for the same product, then drop
    /// the anonymous lines. Runs on sign-in and sign-up.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn merge_into_user(&self, token: &str, user: UserId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO basket (user_id, product_id, count)
             SELECT $1, product_id, count FROM temporary_basket WHERE session_token = $2
             ON CONFLICT (user_id, product_id)
             DO UPDATE SET count = basket.count + EXCLUDED.count",
        )
        .bind(user.as_i32())
        .bind(token)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM temporary_basket WHERE session_token = $1")
            .bind(token)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Empty a user's basket. Runs after a successful payment.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear_for_user(&self, user: UserId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM basket WHERE user_id = $1")
            .bind(user.as_i32())
            .execute(self.pool)
            .await?;

        Ok(())
    }
}

fn foreign_key_to_not_found(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_foreign_key_violation()
    {
        return RepositoryError::NotFound;
    }
    RepositoryError::Database(e)
}
