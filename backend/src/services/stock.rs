//! Stock ledger service
//!
//! Single source of truth for quantity-on-hand per (product, place).
//! Absence of a row means zero, not missing data.
//!
//! All mutating primitives run inside a caller-owned transaction and
//! lock the stock row with `SELECT ... FOR UPDATE` before the
//! read-modify-write, so concurrent debits against the same
//! (product, place) pair serialize instead of racing the quantity
//! below zero. The engines call the `*_in_tx` variants so the ledger
//! mutation commits atomically with the movement/shipment row and its
//! audit record.

use sqlx::{PgPool, Postgres, Transaction};

use crate::error::{AppError, AppResult};
use shared::models::{LocationStockView, LowStockView, ProductStockView};
use shared::validation::{apply_credit, apply_debit, validate_non_negative};

/// Stock ledger service
#[derive(Clone)]
pub struct StockService {
    db: PgPool,
}

impl StockService {
    /// Create a new StockService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Current quantity of a product at a place; 0 when no row exists
    pub async fn quantity(&self, product_id: i32, place_id: i32) -> AppResult<i32> {
        let quantity = sqlx::query_scalar::<_, i32>(
            "SELECT quantity FROM stock_entries WHERE product_id = $1 AND place_id = $2",
        )
        .bind(product_id)
        .bind(place_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(quantity.unwrap_or(0))
    }

    /// Read the quantity with a row lock held until the transaction ends
    async fn quantity_for_update(
        tx: &mut Transaction<'_, Postgres>,
        product_id: i32,
        place_id: i32,
    ) -> AppResult<Option<i32>> {
        let quantity = sqlx::query_scalar::<_, i32>(
            r#"
            SELECT quantity FROM stock_entries
            WHERE product_id = $1 AND place_id = $2
            FOR UPDATE
            "#,
        )
        .bind(product_id)
        .bind(place_id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(quantity)
    }

    /// Resolve the owning location of a place, for new stock rows
    async fn owning_location(
        tx: &mut Transaction<'_, Postgres>,
        place_id: i32,
    ) -> AppResult<i32> {
        sqlx::query_scalar::<_, i32>("SELECT location_id FROM places WHERE id = $1")
            .bind(place_id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Place".to_string()))
    }

    /// Add `amount` (> 0) to the stock of a product at a place,
    /// creating the row if needed. Returns the new quantity.
    pub async fn credit_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        product_id: i32,
        place_id: i32,
        amount: i32,
    ) -> AppResult<i32> {
        match Self::quantity_for_update(tx, product_id, place_id).await? {
            Some(current) => {
                let new_quantity = apply_credit(current, amount)?;
                sqlx::query(
                    r#"
                    UPDATE stock_entries
                    SET quantity = $1, updated_at = NOW()
                    WHERE product_id = $2 AND place_id = $3
                    "#,
                )
                .bind(new_quantity)
                .bind(product_id)
                .bind(place_id)
                .execute(&mut **tx)
                .await?;
                Ok(new_quantity)
            }
            None => {
                let new_quantity = apply_credit(0, amount)?;
                let location_id = Self::owning_location(tx, place_id).await?;
                sqlx::query(
                    r#"
                    INSERT INTO stock_entries (product_id, location_id, place_id, quantity)
                    VALUES ($1, $2, $3, $4)
                    ON CONFLICT (product_id, location_id, place_id)
                    DO UPDATE SET quantity = stock_entries.quantity + EXCLUDED.quantity,
                                  updated_at = NOW()
                    "#,
                )
                .bind(product_id)
                .bind(location_id)
                .bind(place_id)
                .bind(new_quantity)
                .execute(&mut **tx)
                .await?;
                Ok(new_quantity)
            }
        }
    }

    /// Remove `amount` (> 0) from the stock of a product at a place.
    /// Fails with `InsufficientStock` when the current quantity is
    /// short, leaving the row untouched. Returns the new quantity.
    pub async fn debit_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        product_id: i32,
        place_id: i32,
        amount: i32,
    ) -> AppResult<i32> {
        let current = Self::quantity_for_update(tx, product_id, place_id)
            .await?
            .unwrap_or(0);
        let new_quantity = apply_debit(current, amount)?;

        sqlx::query(
            r#"
            UPDATE stock_entries
            SET quantity = $1, updated_at = NOW()
            WHERE product_id = $2 AND place_id = $3
            "#,
        )
        .bind(new_quantity)
        .bind(product_id)
        .bind(place_id)
        .execute(&mut **tx)
        .await?;

        Ok(new_quantity)
    }

    /// Move `amount` from one place to another. Both writes share the
    /// caller's transaction: if the debit fails, the credit never
    /// happens and nothing is visible to readers.
    pub async fn transfer_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        product_id: i32,
        origin_place_id: i32,
        destination_place_id: i32,
        amount: i32,
    ) -> AppResult<()> {
        Self::debit_in_tx(tx, product_id, origin_place_id, amount).await?;
        Self::credit_in_tx(tx, product_id, destination_place_id, amount).await?;
        Ok(())
    }

    /// Overwrite the stock of a product at a place with `new_quantity`
    /// (>= 0), creating the row if needed. Used for physical-count
    /// reconciliation. Returns the prior quantity so the caller can
    /// compute and log the delta.
    pub async fn set_exact_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        product_id: i32,
        place_id: i32,
        new_quantity: i32,
    ) -> AppResult<i32> {
        validate_non_negative(new_quantity).map_err(AppError::from)?;

        match Self::quantity_for_update(tx, product_id, place_id).await? {
            Some(prior) => {
                sqlx::query(
                    r#"
                    UPDATE stock_entries
                    SET quantity = $1, updated_at = NOW()
                    WHERE product_id = $2 AND place_id = $3
                    "#,
                )
                .bind(new_quantity)
                .bind(product_id)
                .bind(place_id)
                .execute(&mut **tx)
                .await?;
                Ok(prior)
            }
            None => {
                let location_id = Self::owning_location(tx, place_id).await?;
                sqlx::query(
                    r#"
                    INSERT INTO stock_entries (product_id, location_id, place_id, quantity)
                    VALUES ($1, $2, $3, $4)
                    ON CONFLICT (product_id, location_id, place_id)
                    DO UPDATE SET quantity = EXCLUDED.quantity, updated_at = NOW()
                    "#,
                )
                .bind(product_id)
                .bind(location_id)
                .bind(place_id)
                .bind(new_quantity)
                .execute(&mut **tx)
                .await?;
                Ok(0)
            }
        }
    }

    /// Stock of a product across all places
    pub async fn stock_by_product(&self, product_id: i32) -> AppResult<Vec<ProductStockView>> {
        let stock = sqlx::query_as::<_, ProductStockView>(
            r#"
            SELECT se.product_id, se.location_id, se.place_id, se.quantity,
                   loc.name AS location_name, pl.name AS place_name
            FROM stock_entries se
            JOIN locations loc ON loc.id = se.location_id
            JOIN places pl ON pl.id = se.place_id
            WHERE se.product_id = $1
            ORDER BY loc.name, pl.name
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.db)
        .await?;

        Ok(stock)
    }

    /// Stock of all products held within a location
    pub async fn stock_by_location(&self, location_id: i32) -> AppResult<Vec<LocationStockView>> {
        let stock = sqlx::query_as::<_, LocationStockView>(
            r#"
            SELECT se.product_id, se.place_id, se.quantity,
                   p.name AS product_name, p.code AS product_code,
                   pl.name AS place_name
            FROM stock_entries se
            JOIN products p ON p.id = se.product_id
            JOIN places pl ON pl.id = se.place_id
            WHERE se.location_id = $1 AND se.quantity > 0
            ORDER BY p.name, pl.name
            "#,
        )
        .bind(location_id)
        .fetch_all(&self.db)
        .await?;

        Ok(stock)
    }

    /// Aggregate stock of a product across all places
    pub async fn total_for_product(&self, product_id: i32) -> AppResult<i64> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(quantity), 0) FROM stock_entries WHERE product_id = $1",
        )
        .bind(product_id)
        .fetch_one(&self.db)
        .await?;

        Ok(total)
    }

    /// Active products whose aggregate stock is at or below their
    /// minimum-stock threshold
    pub async fn low_stock(&self) -> AppResult<Vec<LowStockView>> {
        let low = sqlx::query_as::<_, LowStockView>(
            r#"
            SELECT p.id AS product_id, p.name AS product_name,
                   p.code AS product_code, p.minimum_stock,
                   COALESCE(SUM(se.quantity), 0) AS total_quantity
            FROM products p
            LEFT JOIN stock_entries se ON se.product_id = p.id
            WHERE p.active
            GROUP BY p.id, p.name, p.code, p.minimum_stock
            HAVING COALESCE(SUM(se.quantity), 0) <= p.minimum_stock
            ORDER BY p.name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(low)
    }
}
