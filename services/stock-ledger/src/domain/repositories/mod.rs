//! 仓储接口
//!
//! 所有仓储都通过 UnitOfWork 获取，共享同一个事务。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fab_common::PageWindow;
use fab_errors::AppResult;
use rust_decimal::Decimal;

use crate::domain::entities::{
    AuditRecord, Customer, Material, MovementLine, Order, OrderLine, OrderStatus, Product,
    StockMovement, StockType, Supplier,
};
use crate::domain::value_objects::{
    AdminId, CustomerId, EmployeeId, MaterialId, MovementId, OrderId, OrderStatusId, ProductId,
    SupplierId,
};

/// 按截止日期统计/删除的行数（明细行 + 单头）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AgedRows {
    pub lines: u64,
    pub headers: u64,
}

impl AgedRows {
    pub fn total(&self) -> u64 {
        self.lines + self.headers
    }
}

/// 物料库存账
#[async_trait]
pub trait MaterialRepository: Send + Sync {
    async fn find_by_id(&self, id: &MaterialId) -> AppResult<Option<Material>>;

    /// 按 ID 顺序加行锁并读取，事务结束前其他写入方阻塞
    async fn lock_for_update(&self, ids: &[MaterialId]) -> AppResult<Vec<Material>>;

    /// 库存增减（物料不存在时返回 NotFound）
    async fn apply_delta(&self, id: &MaterialId, delta: Decimal) -> AppResult<()>;

    /// 条件扣减：仅当 current_stock >= quantity 时扣减，返回是否生效
    async fn decrement_if_available(&self, id: &MaterialId, quantity: Decimal) -> AppResult<bool>;
}

/// 产品与物料清单
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// 读取产品及其 BOM
    async fn find_by_id(&self, id: &ProductId) -> AppResult<Option<Product>>;
}

/// 订单
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn find_status_by_code(&self, code: &str) -> AppResult<Option<OrderStatus>>;

    async fn find_by_id(&self, id: &OrderId) -> AppResult<Option<Order>>;

    /// 订单明细，按写入顺序
    async fn find_lines(&self, id: &OrderId) -> AppResult<Vec<OrderLine>>;

    async fn insert(&self, order: &Order) -> AppResult<()>;

    async fn insert_line(&self, line: &OrderLine) -> AppResult<()>;

    async fn update_total(&self, id: &OrderId, total_amount: Decimal) -> AppResult<()>;

    async fn update_status(&self, id: &OrderId, status_id: &OrderStatusId) -> AppResult<()>;

    /// 删除订单及其明细，返回删除的明细行数
    async fn delete(&self, id: &OrderId) -> AppResult<u64>;

    /// 统计 cutoff 之前创建的订单
    async fn count_created_before(&self, cutoff: DateTime<Utc>) -> AppResult<AgedRows>;

    /// 删除 cutoff 之前创建的订单（先明细后单头）
    async fn delete_created_before(&self, cutoff: DateTime<Utc>) -> AppResult<AgedRows>;
}

/// 库存移动单
#[async_trait]
pub trait StockMovementRepository: Send + Sync {
    async fn find_stock_type_by_code(&self, code: &str) -> AppResult<Option<StockType>>;

    async fn insert(&self, movement: &StockMovement) -> AppResult<()>;

    async fn insert_line(&self, line: &MovementLine) -> AppResult<()>;

    /// 按时间倒序分页
    async fn list(&self, window: PageWindow) -> AppResult<Vec<StockMovement>>;

    /// 订单自动出库生成的移动单
    async fn list_for_order(&self, order_id: &OrderId) -> AppResult<Vec<StockMovement>>;

    async fn find_lines(&self, id: &MovementId) -> AppResult<Vec<MovementLine>>;

    async fn count_created_before(&self, cutoff: DateTime<Utc>) -> AppResult<AgedRows>;

    async fn delete_created_before(&self, cutoff: DateTime<Utc>) -> AppResult<AgedRows>;
}

/// 审计记录（只追加）
#[async_trait]
pub trait AuditRecordRepository: Send + Sync {
    async fn append(&self, record: &AuditRecord) -> AppResult<()>;

    /// 按时间倒序分页
    async fn list(&self, window: PageWindow) -> AppResult<Vec<AuditRecord>>;
}

/// 供应商 / 客户
#[async_trait]
pub trait PartyRepository: Send + Sync {
    async fn supplier_exists(&self, id: &SupplierId) -> AppResult<bool>;

    /// 按联系人自然键（小写）查找供应商
    async fn find_supplier_by_contact(&self, contact_key: &str) -> AppResult<Option<SupplierId>>;

    async fn insert_supplier(&self, supplier: &Supplier) -> AppResult<()>;

    async fn customer_exists(&self, id: &CustomerId) -> AppResult<bool>;

    async fn insert_customer(&self, customer: &Customer) -> AppResult<()>;
}

/// 管理员 / 员工
#[async_trait]
pub trait ActorRepository: Send + Sync {
    async fn admin_exists(&self, id: &AdminId) -> AppResult<bool>;

    async fn employee_exists(&self, id: &EmployeeId) -> AppResult<bool>;
}
