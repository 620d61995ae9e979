//! Transactional repositories for stock-ledger
//!
//! These repositories use a shared transaction instead of a connection pool.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fab_common::PageWindow;
use fab_errors::{AppError, AppResult};
use rust_decimal::Decimal;
use sqlx::{Postgres, Transaction};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::error_mapper::{map_json_error, map_sqlx_error};
use super::rows::{
    AuditRecordRow, BomRow, MaterialRow, MovementLineRow, OrderLineRow, OrderRow, OrderStatusRow,
    ProductRow, StockMovementRow, StockTypeRow,
};
use crate::domain::entities::{
    AuditRecord, Customer, Material, MovementLine, Order, OrderLine, OrderStatus, Product,
    StockMovement, StockType, Supplier,
};
use crate::domain::repositories::{
    ActorRepository, AgedRows, AuditRecordRepository, MaterialRepository, OrderRepository,
    PartyRepository, ProductRepository, StockMovementRepository,
};
use crate::domain::value_objects::{
    AdminId, CustomerId, EmployeeId, MaterialId, MovementId, OrderId, OrderStatusId, ProductId,
    SupplierId,
};

const MOVEMENT_COLUMNS: &str = r#"
    SELECT m.id, m.direction, m.stock_type_id, t.type_code, m.supplier_id, m.order_id,
           m.admin_id, m.employee_id, m.created_at
    FROM stock_movements m
    JOIN stock_types t ON t.id = m.stock_type_id
"#;

/// Shared transaction type
pub type SharedTx = Arc<Mutex<Option<Transaction<'static, Postgres>>>>;

/// Macro to define a TxRepository structure
macro_rules! define_tx_repo {
    ($name:ident) => {
        pub struct $name {
            tx: SharedTx,
        }

        impl $name {
            pub fn new(tx: SharedTx) -> Self {
                Self { tx }
            }
        }
    };
}

define_tx_repo!(TxMaterialRepository);
define_tx_repo!(TxProductRepository);
define_tx_repo!(TxOrderRepository);
define_tx_repo!(TxStockMovementRepository);
define_tx_repo!(TxAuditRecordRepository);
define_tx_repo!(TxPartyRepository);
define_tx_repo!(TxActorRepository);

fn to_u64(count: i64) -> u64 {
    u64::try_from(count).unwrap_or_default()
}

#[async_trait]
impl MaterialRepository for TxMaterialRepository {
    async fn find_by_id(&self, id: &MaterialId) -> AppResult<Option<Material>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let row = sqlx::query_as::<_, MaterialRow>(
            r#"
            SELECT id, name, unit, current_stock, minimum_stock, maximum_stock, unit_cost, supplier_id
            FROM materials WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Material::from))
    }

    async fn lock_for_update(&self, ids: &[MaterialId]) -> AppResult<Vec<Material>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let ids: Vec<Uuid> = ids.iter().map(|id| id.0).collect();
        // 固定按 id 加锁，避免并发订单之间死锁
        let rows = sqlx::query_as::<_, MaterialRow>(
            r#"
            SELECT id, name, unit, current_stock, minimum_stock, maximum_stock, unit_cost, supplier_id
            FROM materials
            WHERE id = ANY($1)
            ORDER BY id
            FOR UPDATE
            "#,
        )
        .bind(&ids)
        .fetch_all(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Material::from).collect())
    }

    async fn apply_delta(&self, id: &MaterialId, delta: Decimal) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let result = sqlx::query("UPDATE materials SET current_stock = current_stock + $2 WHERE id = $1")
            .bind(id.0)
            .bind(delta)
            .execute(&mut **tx)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Material {} not found", id)));
        }
        Ok(())
    }

    async fn decrement_if_available(&self, id: &MaterialId, quantity: Decimal) -> AppResult<bool> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let result = sqlx::query(
            r#"
            UPDATE materials
            SET current_stock = current_stock - $1
            WHERE id = $2 AND current_stock >= $1
            "#,
        )
        .bind(quantity)
        .bind(id.0)
        .execute(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() == 1)
    }
}

#[async_trait]
impl ProductRepository for TxProductRepository {
    async fn find_by_id(&self, id: &ProductId) -> AppResult<Option<Product>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let row = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, unit_price, materials_cost, status FROM products WHERE id = $1",
        )
        .bind(id.0)
        .fetch_optional(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let bom = sqlx::query_as::<_, BomRow>(
            r#"
            SELECT material_id, used_quantity, unit_cost
            FROM bill_of_materials
            WHERE product_id = $1
            ORDER BY position, material_id
            "#,
        )
        .bind(id.0)
        .fetch_all(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(Some(row.into_product(bom)))
    }
}

#[async_trait]
impl OrderRepository for TxOrderRepository {
    async fn find_status_by_code(&self, code: &str) -> AppResult<Option<OrderStatus>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let row = sqlx::query_as::<_, OrderStatusRow>(
            "SELECT id, status_code FROM order_statuses WHERE status_code = $1",
        )
        .bind(code)
        .fetch_optional(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(OrderStatus::from))
    }

    async fn find_by_id(&self, id: &OrderId) -> AppResult<Option<Order>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT o.id, o.customer_id, o.status_id, s.status_code, o.total_amount,
                   o.admin_id, o.employee_id, o.created_at
            FROM orders o
            JOIN order_statuses s ON s.id = o.status_id
            WHERE o.id = $1
            FOR UPDATE OF o
            "#,
        )
        .bind(id.0)
        .fetch_optional(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        row.map(OrderRow::into_order).transpose()
    }

    async fn find_lines(&self, id: &OrderId) -> AppResult<Vec<OrderLine>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let rows = sqlx::query_as::<_, OrderLineRow>(
            r#"
            SELECT id, order_id, product_id, quantity, unit_price, misc_fee_percent, line_total
            FROM order_lines
            WHERE order_id = $1
            ORDER BY id
            "#,
        )
        .bind(id.0)
        .fetch_all(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(OrderLine::from).collect())
    }

    async fn insert(&self, order: &Order) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let (admin_id, employee_id) = order.actor.columns();
        sqlx::query(
            r#"
            INSERT INTO orders (id, customer_id, status_id, total_amount, admin_id, employee_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(order.id.0)
        .bind(order.customer_id.0)
        .bind(order.status.id.0)
        .bind(order.total_amount)
        .bind(admin_id)
        .bind(employee_id)
        .bind(order.created_at)
        .execute(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn insert_line(&self, line: &OrderLine) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        sqlx::query(
            r#"
            INSERT INTO order_lines (id, order_id, product_id, quantity, unit_price, misc_fee_percent, line_total)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(line.id.0)
        .bind(line.order_id.0)
        .bind(line.product_id.0)
        .bind(line.quantity)
        .bind(line.unit_price)
        .bind(line.misc_fee_percent)
        .bind(line.line_total)
        .execute(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn update_total(&self, id: &OrderId, total_amount: Decimal) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        sqlx::query("UPDATE orders SET total_amount = $2 WHERE id = $1")
            .bind(id.0)
            .bind(total_amount)
            .execute(&mut **tx)
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn update_status(&self, id: &OrderId, status_id: &OrderStatusId) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        sqlx::query("UPDATE orders SET status_id = $2 WHERE id = $1")
            .bind(id.0)
            .bind(status_id.0)
            .execute(&mut **tx)
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn delete(&self, id: &OrderId) -> AppResult<u64> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let lines = sqlx::query("DELETE FROM order_lines WHERE order_id = $1")
            .bind(id.0)
            .execute(&mut **tx)
            .await
            .map_err(map_sqlx_error)?;

        sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id.0)
            .execute(&mut **tx)
            .await
            .map_err(map_sqlx_error)?;

        Ok(lines.rows_affected())
    }

    async fn count_created_before(&self, cutoff: DateTime<Utc>) -> AppResult<AgedRows> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let lines: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM order_lines
            WHERE order_id IN (SELECT id FROM orders WHERE created_at < $1)
            "#,
        )
        .bind(cutoff)
        .fetch_one(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        let headers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE created_at < $1")
            .bind(cutoff)
            .fetch_one(&mut **tx)
            .await
            .map_err(map_sqlx_error)?;

        Ok(AgedRows {
            lines: to_u64(lines),
            headers: to_u64(headers),
        })
    }

    async fn delete_created_before(&self, cutoff: DateTime<Utc>) -> AppResult<AgedRows> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let lines = sqlx::query(
            r#"
            DELETE FROM order_lines
            WHERE order_id IN (SELECT id FROM orders WHERE created_at < $1)
            "#,
        )
        .bind(cutoff)
        .execute(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        let headers = sqlx::query("DELETE FROM orders WHERE created_at < $1")
            .bind(cutoff)
            .execute(&mut **tx)
            .await
            .map_err(map_sqlx_error)?;

        Ok(AgedRows {
            lines: lines.rows_affected(),
            headers: headers.rows_affected(),
        })
    }
}

#[async_trait]
impl StockMovementRepository for TxStockMovementRepository {
    async fn find_stock_type_by_code(&self, code: &str) -> AppResult<Option<StockType>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let row = sqlx::query_as::<_, StockTypeRow>(
            "SELECT id, type_code FROM stock_types WHERE type_code = $1",
        )
        .bind(code)
        .fetch_optional(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(StockType::from))
    }

    async fn insert(&self, movement: &StockMovement) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let (admin_id, employee_id) = movement.actor.columns();
        sqlx::query(
            r#"
            INSERT INTO stock_movements (id, direction, stock_type_id, supplier_id, order_id, admin_id, employee_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(movement.id.0)
        .bind(movement.direction.as_str())
        .bind(movement.stock_type.id.0)
        .bind(movement.supplier_id.map(|s| s.0))
        .bind(movement.order_id.map(|o| o.0))
        .bind(admin_id)
        .bind(employee_id)
        .bind(movement.created_at)
        .execute(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn insert_line(&self, line: &MovementLine) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        sqlx::query(
            r#"
            INSERT INTO movement_lines (id, movement_id, material_id, quantity)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(line.id.0)
        .bind(line.movement_id.0)
        .bind(line.material_id.0)
        .bind(line.quantity)
        .execute(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn list(&self, window: PageWindow) -> AppResult<Vec<StockMovement>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let sql = format!(
            "{} ORDER BY m.created_at DESC, m.id DESC LIMIT $1 OFFSET $2",
            MOVEMENT_COLUMNS
        );
        let rows = sqlx::query_as::<_, StockMovementRow>(&sql)
            .bind(window.limit_i64())
            .bind(window.offset_i64())
            .fetch_all(&mut **tx)
            .await
            .map_err(map_sqlx_error)?;

        rows.into_iter().map(StockMovementRow::into_movement).collect()
    }

    async fn list_for_order(&self, order_id: &OrderId) -> AppResult<Vec<StockMovement>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let sql = format!("{} WHERE m.order_id = $1 ORDER BY m.id", MOVEMENT_COLUMNS);
        let rows = sqlx::query_as::<_, StockMovementRow>(&sql)
            .bind(order_id.0)
            .fetch_all(&mut **tx)
            .await
            .map_err(map_sqlx_error)?;

        rows.into_iter().map(StockMovementRow::into_movement).collect()
    }

    async fn find_lines(&self, id: &MovementId) -> AppResult<Vec<MovementLine>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let rows = sqlx::query_as::<_, MovementLineRow>(
            r#"
            SELECT id, movement_id, material_id, quantity
            FROM movement_lines
            WHERE movement_id = $1
            ORDER BY id
            "#,
        )
        .bind(id.0)
        .fetch_all(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(MovementLine::from).collect())
    }

    async fn count_created_before(&self, cutoff: DateTime<Utc>) -> AppResult<AgedRows> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let lines: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM movement_lines
            WHERE movement_id IN (SELECT id FROM stock_movements WHERE created_at < $1)
            "#,
        )
        .bind(cutoff)
        .fetch_one(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        let headers: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM stock_movements WHERE created_at < $1")
                .bind(cutoff)
                .fetch_one(&mut **tx)
                .await
                .map_err(map_sqlx_error)?;

        Ok(AgedRows {
            lines: to_u64(lines),
            headers: to_u64(headers),
        })
    }

    async fn delete_created_before(&self, cutoff: DateTime<Utc>) -> AppResult<AgedRows> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let lines = sqlx::query(
            r#"
            DELETE FROM movement_lines
            WHERE movement_id IN (SELECT id FROM stock_movements WHERE created_at < $1)
            "#,
        )
        .bind(cutoff)
        .execute(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        let headers = sqlx::query("DELETE FROM stock_movements WHERE created_at < $1")
            .bind(cutoff)
            .execute(&mut **tx)
            .await
            .map_err(map_sqlx_error)?;

        Ok(AgedRows {
            lines: lines.rows_affected(),
            headers: headers.rows_affected(),
        })
    }
}

#[async_trait]
impl AuditRecordRepository for TxAuditRecordRepository {
    async fn append(&self, record: &AuditRecord) -> AppResult<()> {
        let details = serde_json::to_value(&record.details).map_err(map_json_error)?;

        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let (admin_id, employee_id) = record.actor.columns();
        sqlx::query(
            r#"
            INSERT INTO audit_records (id, entity, entity_id, action, details, admin_id, employee_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(record.id.0)
        .bind(record.entity.as_str())
        .bind(&record.entity_id)
        .bind(record.action.as_str())
        .bind(details)
        .bind(admin_id)
        .bind(employee_id)
        .bind(record.created_at)
        .execute(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn list(&self, window: PageWindow) -> AppResult<Vec<AuditRecord>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let rows = sqlx::query_as::<_, AuditRecordRow>(
            r#"
            SELECT id, entity, entity_id, action, details, admin_id, employee_id, created_at
            FROM audit_records
            ORDER BY created_at DESC, id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(window.limit_i64())
        .bind(window.offset_i64())
        .fetch_all(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(AuditRecordRow::into_record).collect()
    }
}

#[async_trait]
impl PartyRepository for TxPartyRepository {
    async fn supplier_exists(&self, id: &SupplierId) -> AppResult<bool> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM suppliers WHERE id = $1)")
            .bind(id.0)
            .fetch_one(&mut **tx)
            .await
            .map_err(map_sqlx_error)
    }

    async fn find_supplier_by_contact(&self, contact_key: &str) -> AppResult<Option<SupplierId>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let id: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM suppliers WHERE LOWER(contact_name) = $1 LIMIT 1")
                .bind(contact_key)
                .fetch_optional(&mut **tx)
                .await
                .map_err(map_sqlx_error)?;

        Ok(id.map(SupplierId))
    }

    async fn insert_supplier(&self, supplier: &Supplier) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        sqlx::query(
            r#"
            INSERT INTO suppliers (id, firstname, lastname, contact_name, contact_number, email, address, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(supplier.id.0)
        .bind(&supplier.firstname)
        .bind(&supplier.lastname)
        .bind(&supplier.contact_name)
        .bind(&supplier.contact_number)
        .bind(&supplier.email)
        .bind(&supplier.address)
        .bind(supplier.created_at)
        .execute(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn customer_exists(&self, id: &CustomerId) -> AppResult<bool> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM customers WHERE id = $1)")
            .bind(id.0)
            .fetch_one(&mut **tx)
            .await
            .map_err(map_sqlx_error)
    }

    async fn insert_customer(&self, customer: &Customer) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        sqlx::query(
            r#"
            INSERT INTO customers (id, firstname, lastname, contact_number, email, address, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(customer.id.0)
        .bind(&customer.firstname)
        .bind(&customer.lastname)
        .bind(&customer.contact_number)
        .bind(&customer.email)
        .bind(&customer.address)
        .bind(customer.created_at)
        .execute(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }
}

#[async_trait]
impl ActorRepository for TxActorRepository {
    async fn admin_exists(&self, id: &AdminId) -> AppResult<bool> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM admins WHERE id = $1)")
            .bind(id.0)
            .fetch_one(&mut **tx)
            .await
            .map_err(map_sqlx_error)
    }

    async fn employee_exists(&self, id: &EmployeeId) -> AppResult<bool> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM employees WHERE id = $1)")
            .bind(id.0)
            .fetch_one(&mut **tx)
            .await
            .map_err(map_sqlx_error)
    }
}
