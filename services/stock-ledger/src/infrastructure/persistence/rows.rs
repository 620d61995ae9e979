//! 数据库行结构及到领域对象的转换

use chrono::{DateTime, Utc};
use fab_errors::{AppError, AppResult};
use rust_decimal::Decimal;
use sqlx::types::Json;
use uuid::Uuid;

use crate::domain::entities::{
    AuditDetails, AuditRecord, BomEntry, Material, MovementLine, Order, OrderLine, OrderStatus,
    Product, StockMovement, StockType,
};
use crate::domain::value_objects::{
    ActorIdentity, AuditRecordId, CustomerId, MaterialId, MovementId, MovementLineId, OrderId,
    OrderLineId, OrderStatusId, ProductId, StockTypeId, SupplierId,
};

#[derive(sqlx::FromRow)]
pub struct MaterialRow {
    pub id: Uuid,
    pub name: String,
    pub unit: String,
    pub current_stock: Decimal,
    pub minimum_stock: Decimal,
    pub maximum_stock: Decimal,
    pub unit_cost: Decimal,
    pub supplier_id: Option<Uuid>,
}

impl From<MaterialRow> for Material {
    fn from(row: MaterialRow) -> Self {
        Self {
            id: MaterialId(row.id),
            name: row.name,
            unit: row.unit,
            current_stock: row.current_stock,
            minimum_stock: row.minimum_stock,
            maximum_stock: row.maximum_stock,
            unit_cost: row.unit_cost,
            supplier_id: row.supplier_id.map(SupplierId),
        }
    }
}

#[derive(sqlx::FromRow)]
pub struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub unit_price: Decimal,
    pub materials_cost: Decimal,
    pub status: String,
}

#[derive(sqlx::FromRow)]
pub struct BomRow {
    pub material_id: Uuid,
    pub used_quantity: Decimal,
    pub unit_cost: Option<Decimal>,
}

impl ProductRow {
    pub fn into_product(self, bom: Vec<BomRow>) -> Product {
        Product {
            id: ProductId(self.id),
            name: self.name,
            unit_price: self.unit_price,
            materials_cost: self.materials_cost,
            status: self.status,
            bill_of_materials: bom
                .into_iter()
                .map(|r| BomEntry {
                    material_id: MaterialId(r.material_id),
                    used_quantity: r.used_quantity,
                    unit_cost: r.unit_cost,
                })
                .collect(),
        }
    }
}

#[derive(sqlx::FromRow)]
pub struct OrderStatusRow {
    pub id: Uuid,
    pub status_code: String,
}

impl From<OrderStatusRow> for OrderStatus {
    fn from(row: OrderStatusRow) -> Self {
        Self {
            id: OrderStatusId(row.id),
            code: row.status_code,
        }
    }
}

#[derive(sqlx::FromRow)]
pub struct StockTypeRow {
    pub id: Uuid,
    pub type_code: String,
}

impl From<StockTypeRow> for StockType {
    fn from(row: StockTypeRow) -> Self {
        Self {
            id: StockTypeId(row.id),
            code: row.type_code,
        }
    }
}

#[derive(sqlx::FromRow)]
pub struct OrderRow {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub status_id: Uuid,
    pub status_code: String,
    pub total_amount: Decimal,
    pub admin_id: Option<Uuid>,
    pub employee_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl OrderRow {
    pub fn into_order(self) -> AppResult<Order> {
        Ok(Order {
            id: OrderId(self.id),
            customer_id: CustomerId(self.customer_id),
            status: OrderStatus {
                id: OrderStatusId(self.status_id),
                code: self.status_code,
            },
            total_amount: self.total_amount,
            actor: ActorIdentity::from_columns(self.admin_id, self.employee_id)?,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
pub struct OrderLineRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub misc_fee_percent: Decimal,
    pub line_total: Decimal,
}

impl From<OrderLineRow> for OrderLine {
    fn from(row: OrderLineRow) -> Self {
        Self {
            id: OrderLineId(row.id),
            order_id: OrderId(row.order_id),
            product_id: ProductId(row.product_id),
            quantity: row.quantity,
            unit_price: row.unit_price,
            misc_fee_percent: row.misc_fee_percent,
            line_total: row.line_total,
        }
    }
}

#[derive(sqlx::FromRow)]
pub struct StockMovementRow {
    pub id: Uuid,
    pub direction: String,
    pub stock_type_id: Uuid,
    pub type_code: String,
    pub supplier_id: Option<Uuid>,
    pub order_id: Option<Uuid>,
    pub admin_id: Option<Uuid>,
    pub employee_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl StockMovementRow {
    pub fn into_movement(self) -> AppResult<StockMovement> {
        Ok(StockMovement {
            id: MovementId(self.id),
            direction: self.direction.parse().map_err(AppError::internal)?,
            stock_type: StockType {
                id: StockTypeId(self.stock_type_id),
                code: self.type_code,
            },
            supplier_id: self.supplier_id.map(SupplierId),
            order_id: self.order_id.map(OrderId),
            actor: ActorIdentity::from_columns(self.admin_id, self.employee_id)?,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
pub struct MovementLineRow {
    pub id: Uuid,
    pub movement_id: Uuid,
    pub material_id: Uuid,
    pub quantity: Decimal,
}

impl From<MovementLineRow> for MovementLine {
    fn from(row: MovementLineRow) -> Self {
        Self {
            id: MovementLineId(row.id),
            movement_id: MovementId(row.movement_id),
            material_id: MaterialId(row.material_id),
            quantity: row.quantity,
        }
    }
}

#[derive(sqlx::FromRow)]
pub struct AuditRecordRow {
    pub id: Uuid,
    pub entity: String,
    pub entity_id: String,
    pub action: String,
    pub details: Json<AuditDetails>,
    pub admin_id: Option<Uuid>,
    pub employee_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl AuditRecordRow {
    pub fn into_record(self) -> AppResult<AuditRecord> {
        Ok(AuditRecord {
            id: AuditRecordId(self.id),
            entity: self.entity.parse().map_err(AppError::internal)?,
            entity_id: self.entity_id,
            action: self.action.parse().map_err(AppError::internal)?,
            details: self.details.0,
            actor: ActorIdentity::from_columns(self.admin_id, self.employee_id)?,
            created_at: self.created_at,
        })
    }
}
