//! Order repository: draft lifecycle, confirmation, listing and payments.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use mercato_core::{DeliveryType, OrderId, OrderStatus, PaymentId, PaymentType, ProductId, UserId};

use super::RepositoryError;
use crate::models::order::{OrderConfirm, PaymentCard, draft};

/// One snapshot line of an order.
#[derive(Debug, Clone, Copy)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub count: Decimal,
}

/// An order header with its snapshot lines.
#[derive(Debug)]
pub struct OrderRecord {
    pub id: OrderId,
    pub created_at: DateTime<Utc>,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub delivery_type: DeliveryType,
    pub payment_type: PaymentType,
    pub status: OrderStatus,
    pub payment_error: Option<String>,
    pub city: String,
    pub address: String,
    pub lines: Vec<OrderLine>,
}

/// Internal row type for order header queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    created_at: DateTime<Utc>,
    full_name: String,
    email: String,
    phone: String,
    delivery_type: String,
    payment_type: String,
    status: String,
    payment_error: Option<String>,
    city: String,
    address: String,
}

impl OrderRow {
    fn into_record(self) -> Result<OrderRecord, RepositoryError> {
        Ok(OrderRecord {
            id: OrderId::new(self.id),
            created_at: self.created_at,
            full_name: self.full_name,
            email: self.email,
            phone: self.phone,
            delivery_type: DeliveryType::from_str(&self.delivery_type).map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid delivery type: {e}"))
            })?,
            payment_type: PaymentType::from_str(&self.payment_type)
                .map_err(|e| RepositoryError::DataCorruption(format!("invalid payment type: {e}")))?,
            status: OrderStatus::from_str(&self.status)
                .map_err(|e| RepositoryError::DataCorruption(format!("invalid order status: {e}")))?,
            payment_error: self.payment_error,
            city: self.city,
            address: self.address,
            lines: Vec::new(),
        })
    }
}

const ORDER_COLUMNS: &str = "id, created_at, full_name, email, phone, delivery_type, \
                             payment_type, status, payment_error, city, address";

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The user's newest order still carrying every draft placeholder, if
    /// one exists. Reused by stage one instead of piling up empty drafts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_draft(&self, user: UserId) -> Result<Option<OrderId>, RepositoryError> {
        let row: Option<(i32,)> = sqlx::query_as(
            "SELECT id FROM orders
             WHERE user_id = $1 AND status = $2
               AND city = $3 AND address = $4 AND email = $5 AND phone = $6
             ORDER BY created_at DESC, id DESC
             LIMIT 1",
        )
        .bind(user.as_i32())
        .bind(OrderStatus::Accepted.as_str())
        .bind(draft::CITY)
        .bind(draft::ADDRESS)
        .bind(draft::EMAIL)
        .bind(draft::PHONE)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|(id,)| OrderId::new(id)))
    }

    /// Insert a fresh draft carrying the buyer's display name and the
    /// placeholder contact fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create_draft(
        &self,
        user: UserId,
        full_name: &str,
    ) -> Result<OrderId, RepositoryError> {
        let (id,): (i32,) = sqlx::query_as(
            "INSERT INTO orders (user_id, full_name) VALUES ($1, $2) RETURNING id",
        )
        .bind(user.as_i32())
        .bind(full_name)
        .fetch_one(self.pool)
        .await?;

        Ok(OrderId::new(id))
    }

    /// Stage-two confirmation: store the buyer's details and the supplied
    /// total, and snapshot every basket line that isn't already on the
    /// order. Existing lines are left untouched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't belong to
    /// the user. Returns `RepositoryError::Database` for other errors.
    pub async fn confirm(
        &self,
        order: OrderId,
        user: UserId,
        details: &OrderConfirm,
        total_cost: Decimal,
        lines: &[OrderLine],
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE orders
             SET full_name = $3, email = $4, phone = $5, delivery_type = $6,
                 payment_type = $7, city = $8, address = $9, total_cost = $10
             WHERE id = $1 AND user_id = $2",
        )
        .bind(order.as_i32())
        .bind(user.as_i32())
        .bind(&details.full_name)
        .bind(&details.email)
        .bind(&details.phone)
        .bind(details.delivery_type.as_str())
        .bind(details.payment_type.as_str())
        .bind(&details.city)
        .bind(&details.address)
        .bind(total_cost)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        for line in lines {
            sqlx::query(
                "INSERT INTO order_item (order_id, product_id, count)
                 VALUES ($1, $2, $3)
                 ON CONFLICT (order_id, product_id) DO NOTHING",
            )
            .bind(order.as_i32())
            .bind(line.product_id.as_i32())
            .bind(line.count)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    /// One order with its lines, scoped to the owning user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` on an unknown stored state.
    pub async fn get(
        &self,
        order: OrderId,
        user: UserId,
    ) -> Result<Option<OrderRecord>, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 AND user_id = $2"
        ))
        .bind(order.as_i32())
        .bind(user.as_i32())
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut record = row.into_record()?;
        record.lines = self.lines_for(order).await?;

        Ok(Some(record))
    }

    /// All of the user's orders, newest first, each with its lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` on an unknown stored state.
    pub async fn list_for_user(&self, user: UserId) -> Result<Vec<OrderRecord>, RepositoryError> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(user.as_i32())
        .fetch_all(self.pool)
        .await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(row.into_record()?);
        }

        let order_ids: Vec<i32> = records.iter().map(|r| r.id.as_i32()).collect();
        if !order_ids.is_empty() {
            let line_rows: Vec<(i32, i32, Decimal)> = sqlx::query_as(
                "SELECT order_id, product_id, count FROM order_item
                 WHERE order_id = ANY($1)
                 ORDER BY id",
            )
            .bind(&order_ids)
            .fetch_all(self.pool)
            .await?;

            for (order_id, product_id, count) in line_rows {
                if let Some(record) = records.iter_mut().find(|r| r.id.as_i32() == order_id) {
                    record.lines.push(OrderLine {
                        product_id: ProductId::new(product_id),
                        count,
                    });
                }
            }
        }

        Ok(records)
    }

    /// Mark a failed payment attempt: park the order in `awaiting payment`
    /// and store the validation message. The order stays retriable.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_payment_failure(
        &self,
        order: OrderId,
        message: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE orders SET status = $2, payment_error = $3 WHERE id = $1")
            .bind(order.as_i32())
            .bind(OrderStatus::AwaitingPayment.as_str())
            .bind(message)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Record an accepted payment: insert the payment row, mark the order
    /// paid and clear any earlier validation message, atomically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn record_payment(
        &self,
        order: OrderId,
        card: &PaymentCard,
    ) -> Result<PaymentId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let (id,): (i32,) = sqlx::query_as(
            "INSERT INTO payment (order_id, name, number, month, year, code)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id",
        )
        .bind(order.as_i32())
        .bind(&card.name)
        .bind(&card.number)
        .bind(&card.month)
        .bind(&card.year)
        .bind(&card.code)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            RepositoryError::Database(e)
        })?;

        let updated =
            sqlx::query("UPDATE orders SET status = $2, payment_error = NULL WHERE id = $1")
                .bind(order.as_i32())
                .bind(OrderStatus::Paid.as_str())
                .execute(&mut *tx)
                .await?;

        if updated.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await?;

        Ok(PaymentId::new(id))
    }

    async fn lines_for(&self, order: OrderId) -> Result<Vec<OrderLine>, RepositoryError> {
        let rows: Vec<(i32, Decimal)> = sqlx::query_as(
            "SELECT product_id, count FROM order_item WHERE order_id = $1 ORDER BY id",
        )
        .bind(order.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(product_id, count)| OrderLine {
                product_id: ProductId::new(product_id),
                count,
            })
            .collect())
    }
}
