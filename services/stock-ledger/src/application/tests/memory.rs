//! 内存版 UnitOfWork
//!
//! begin 时独占整个存储（单元串行执行），所有写入先落在副本上，
//! commit 时整体替换，rollback/drop 时丢弃。可按名称注入失败点。

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fab_common::PageWindow;
use fab_errors::{AppError, AppResult};
use rust_decimal::Decimal;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::entities::{
    AuditRecord, Customer, Material, MovementLine, Order, OrderLine, OrderStatus, Product,
    StockMovement, StockType, Supplier,
};
use crate::domain::repositories::{
    ActorRepository, AgedRows, AuditRecordRepository, MaterialRepository, OrderRepository,
    PartyRepository, ProductRepository, StockMovementRepository,
};
use crate::domain::unit_of_work::{UnitOfWork, UnitOfWorkFactory};
use crate::domain::value_objects::{
    AdminId, CustomerId, EmployeeId, MaterialId, MovementId, OrderId, OrderStatusId, ProductId,
    SupplierId,
};

#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    pub admins: HashSet<AdminId>,
    pub employees: HashSet<EmployeeId>,
    pub suppliers: Vec<Supplier>,
    pub customers: Vec<Customer>,
    pub materials: BTreeMap<MaterialId, Material>,
    pub products: HashMap<ProductId, Product>,
    pub stock_types: Vec<StockType>,
    pub order_statuses: Vec<OrderStatus>,
    pub orders: Vec<Order>,
    pub order_lines: Vec<OrderLine>,
    pub movements: Vec<StockMovement>,
    pub movement_lines: Vec<MovementLine>,
    pub audit_records: Vec<AuditRecord>,
    pub fail_point: Option<&'static str>,
}

impl MemoryState {
    fn check(&self, point: &'static str) -> AppResult<()> {
        if self.fail_point == Some(point) {
            return Err(AppError::database(format!("injected failure at {}", point)));
        }
        Ok(())
    }

    pub fn stock(&self, id: &MaterialId) -> Decimal {
        self.materials[id].current_stock
    }

    /// 业务数据行数（不含审计）
    pub fn business_rows(&self) -> usize {
        self.suppliers.len()
            + self.customers.len()
            + self.orders.len()
            + self.order_lines.len()
            + self.movements.len()
            + self.movement_lines.len()
    }

    fn aged_orders(&self, cutoff: DateTime<Utc>) -> HashSet<OrderId> {
        self.orders
            .iter()
            .filter(|o| o.created_at < cutoff)
            .map(|o| o.id)
            .collect()
    }

    fn aged_movements(&self, cutoff: DateTime<Utc>) -> HashSet<crate::domain::value_objects::MovementId> {
        self.movements
            .iter()
            .filter(|m| m.created_at < cutoff)
            .map(|m| m.id)
            .collect()
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new(state: MemoryState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// 已提交数据的快照
    pub async fn snapshot(&self) -> MemoryState {
        self.state.lock().await.clone()
    }

    /// 直接修改已提交数据（用于准备测试数据）
    pub async fn update(&self, f: impl FnOnce(&mut MemoryState)) {
        let mut state = self.state.lock().await;
        f(&mut state);
    }
}

#[async_trait]
impl UnitOfWorkFactory for MemoryStore {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        let guard = self.state.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(Box::new(MemoryUnitOfWork {
            guard,
            repo: MemoryRepo {
                staged: StdMutex::new(staged),
            },
        }))
    }
}

pub struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<MemoryState>,
    repo: MemoryRepo,
}

pub struct MemoryRepo {
    staged: StdMutex<MemoryState>,
}

impl MemoryRepo {
    fn with<T>(&self, point: &'static str, f: impl FnOnce(&mut MemoryState) -> AppResult<T>) -> AppResult<T> {
        let mut state = self.staged.lock().unwrap();
        state.check(point)?;
        f(&mut state)
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    fn materials(&self) -> &dyn MaterialRepository {
        &self.repo
    }

    fn products(&self) -> &dyn ProductRepository {
        &self.repo
    }

    fn orders(&self) -> &dyn OrderRepository {
        &self.repo
    }

    fn stock_movements(&self) -> &dyn StockMovementRepository {
        &self.repo
    }

    fn audit_records(&self) -> &dyn AuditRecordRepository {
        &self.repo
    }

    fn parties(&self) -> &dyn PartyRepository {
        &self.repo
    }

    fn actors(&self) -> &dyn ActorRepository {
        &self.repo
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let MemoryUnitOfWork { mut guard, repo } = *self;
        let staged = repo.staged.into_inner().unwrap();
        staged.check("commit")?;
        *guard = staged;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        Ok(())
    }
}

#[async_trait]
impl MaterialRepository for MemoryRepo {
    async fn find_by_id(&self, id: &MaterialId) -> AppResult<Option<Material>> {
        self.with("materials.find", |s| Ok(s.materials.get(id).cloned()))
    }

    async fn lock_for_update(&self, ids: &[MaterialId]) -> AppResult<Vec<Material>> {
        self.with("materials.lock", |s| {
            let mut found: Vec<Material> = ids.iter().filter_map(|id| s.materials.get(id).cloned()).collect();
            found.sort_by_key(|m| m.id);
            Ok(found)
        })
    }

    async fn apply_delta(&self, id: &MaterialId, delta: Decimal) -> AppResult<()> {
        self.with("materials.apply_delta", |s| {
            let material = s
                .materials
                .get_mut(id)
                .ok_or_else(|| AppError::not_found(format!("Material {} not found", id)))?;
            material.current_stock += delta;
            Ok(())
        })
    }

    async fn decrement_if_available(&self, id: &MaterialId, quantity: Decimal) -> AppResult<bool> {
        self.with("materials.decrement", |s| match s.materials.get_mut(id) {
            Some(material) if material.current_stock >= quantity => {
                material.current_stock -= quantity;
                Ok(true)
            }
            _ => Ok(false),
        })
    }
}

#[async_trait]
impl ProductRepository for MemoryRepo {
    async fn find_by_id(&self, id: &ProductId) -> AppResult<Option<Product>> {
        self.with("products.find", |s| Ok(s.products.get(id).cloned()))
    }
}

#[async_trait]
impl OrderRepository for MemoryRepo {
    async fn find_status_by_code(&self, code: &str) -> AppResult<Option<OrderStatus>> {
        self.with("orders.find_status", |s| {
            Ok(s.order_statuses.iter().find(|st| st.code == code).cloned())
        })
    }

    async fn find_by_id(&self, id: &OrderId) -> AppResult<Option<Order>> {
        self.with("orders.find", |s| Ok(s.orders.iter().find(|o| o.id == *id).cloned()))
    }

    async fn find_lines(&self, id: &OrderId) -> AppResult<Vec<OrderLine>> {
        self.with("orders.find_lines", |s| {
            Ok(s.order_lines.iter().filter(|l| l.order_id == *id).cloned().collect())
        })
    }

    async fn insert(&self, order: &Order) -> AppResult<()> {
        self.with("orders.insert", |s| {
            s.orders.push(order.clone());
            Ok(())
        })
    }

    async fn insert_line(&self, line: &OrderLine) -> AppResult<()> {
        self.with("orders.insert_line", |s| {
            s.order_lines.push(line.clone());
            Ok(())
        })
    }

    async fn update_total(&self, id: &OrderId, total_amount: Decimal) -> AppResult<()> {
        self.with("orders.update_total", |s| {
            if let Some(order) = s.orders.iter_mut().find(|o| o.id == *id) {
                order.total_amount = total_amount;
            }
            Ok(())
        })
    }

    async fn update_status(&self, id: &OrderId, status_id: &OrderStatusId) -> AppResult<()> {
        self.with("orders.update_status", |s| {
            let status = s
                .order_statuses
                .iter()
                .find(|st| st.id == *status_id)
                .cloned()
                .ok_or_else(|| AppError::validation("Foreign key constraint violation"))?;
            if let Some(order) = s.orders.iter_mut().find(|o| o.id == *id) {
                order.status = status;
            }
            Ok(())
        })
    }

    async fn delete(&self, id: &OrderId) -> AppResult<u64> {
        self.with("orders.delete", |s| {
            let before = s.order_lines.len();
            s.order_lines.retain(|l| l.order_id != *id);
            let removed = (before - s.order_lines.len()) as u64;
            s.orders.retain(|o| o.id != *id);
            for movement in s.movements.iter_mut().filter(|m| m.order_id == Some(*id)) {
                movement.order_id = None;
            }
            Ok(removed)
        })
    }

    async fn count_created_before(&self, cutoff: DateTime<Utc>) -> AppResult<AgedRows> {
        self.with("orders.count_aged", |s| {
            let aged = s.aged_orders(cutoff);
            Ok(AgedRows {
                lines: s.order_lines.iter().filter(|l| aged.contains(&l.order_id)).count() as u64,
                headers: aged.len() as u64,
            })
        })
    }

    async fn delete_created_before(&self, cutoff: DateTime<Utc>) -> AppResult<AgedRows> {
        self.with("orders.delete_aged", |s| {
            let aged = s.aged_orders(cutoff);
            let lines_before = s.order_lines.len();
            s.order_lines.retain(|l| !aged.contains(&l.order_id));
            s.orders.retain(|o| !aged.contains(&o.id));
            for movement in s.movements.iter_mut() {
                if movement.order_id.is_some_and(|id| aged.contains(&id)) {
                    movement.order_id = None;
                }
            }
            Ok(AgedRows {
                lines: (lines_before - s.order_lines.len()) as u64,
                headers: aged.len() as u64,
            })
        })
    }
}

#[async_trait]
impl StockMovementRepository for MemoryRepo {
    async fn find_stock_type_by_code(&self, code: &str) -> AppResult<Option<StockType>> {
        self.with("stock_movements.find_type", |s| {
            Ok(s.stock_types.iter().find(|t| t.code == code).cloned())
        })
    }

    async fn insert(&self, movement: &StockMovement) -> AppResult<()> {
        self.with("stock_movements.insert", |s| {
            s.movements.push(movement.clone());
            Ok(())
        })
    }

    async fn insert_line(&self, line: &MovementLine) -> AppResult<()> {
        self.with("stock_movements.insert_line", |s| {
            s.movement_lines.push(line.clone());
            Ok(())
        })
    }

    async fn list(&self, window: PageWindow) -> AppResult<Vec<StockMovement>> {
        self.with("stock_movements.list", |s| {
            let mut movements = s.movements.clone();
            movements.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
            Ok(movements
                .into_iter()
                .skip(window.offset as usize)
                .take(window.limit as usize)
                .collect())
        })
    }

    async fn list_for_order(&self, order_id: &OrderId) -> AppResult<Vec<StockMovement>> {
        self.with("stock_movements.list_for_order", |s| {
            Ok(s.movements
                .iter()
                .filter(|m| m.order_id == Some(*order_id))
                .cloned()
                .collect())
        })
    }

    async fn find_lines(&self, id: &MovementId) -> AppResult<Vec<MovementLine>> {
        self.with("stock_movements.find_lines", |s| {
            Ok(s.movement_lines
                .iter()
                .filter(|l| l.movement_id == *id)
                .cloned()
                .collect())
        })
    }

    async fn count_created_before(&self, cutoff: DateTime<Utc>) -> AppResult<AgedRows> {
        self.with("stock_movements.count_aged", |s| {
            let aged = s.aged_movements(cutoff);
            Ok(AgedRows {
                lines: s
                    .movement_lines
                    .iter()
                    .filter(|l| aged.contains(&l.movement_id))
                    .count() as u64,
                headers: aged.len() as u64,
            })
        })
    }

    async fn delete_created_before(&self, cutoff: DateTime<Utc>) -> AppResult<AgedRows> {
        self.with("stock_movements.delete_aged", |s| {
            let aged = s.aged_movements(cutoff);
            let lines_before = s.movement_lines.len();
            s.movement_lines.retain(|l| !aged.contains(&l.movement_id));
            s.movements.retain(|m| !aged.contains(&m.id));
            Ok(AgedRows {
                lines: (lines_before - s.movement_lines.len()) as u64,
                headers: aged.len() as u64,
            })
        })
    }
}

#[async_trait]
impl AuditRecordRepository for MemoryRepo {
    async fn append(&self, record: &AuditRecord) -> AppResult<()> {
        self.with("audit_records.append", |s| {
            s.audit_records.push(record.clone());
            Ok(())
        })
    }

    async fn list(&self, window: PageWindow) -> AppResult<Vec<AuditRecord>> {
        self.with("audit_records.list", |s| {
            let mut records = s.audit_records.clone();
            records.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
            Ok(records
                .into_iter()
                .skip(window.offset as usize)
                .take(window.limit as usize)
                .collect())
        })
    }
}

#[async_trait]
impl PartyRepository for MemoryRepo {
    async fn supplier_exists(&self, id: &SupplierId) -> AppResult<bool> {
        self.with("parties.supplier_exists", |s| {
            Ok(s.suppliers.iter().any(|sup| sup.id == *id))
        })
    }

    async fn find_supplier_by_contact(&self, contact_key: &str) -> AppResult<Option<SupplierId>> {
        self.with("parties.find_supplier", |s| {
            Ok(s.suppliers
                .iter()
                .find(|sup| sup.contact_name.to_lowercase() == contact_key)
                .map(|sup| sup.id))
        })
    }

    async fn insert_supplier(&self, supplier: &Supplier) -> AppResult<()> {
        self.with("parties.insert_supplier", |s| {
            s.suppliers.push(supplier.clone());
            Ok(())
        })
    }

    async fn customer_exists(&self, id: &CustomerId) -> AppResult<bool> {
        self.with("parties.customer_exists", |s| {
            Ok(s.customers.iter().any(|c| c.id == *id))
        })
    }

    async fn insert_customer(&self, customer: &Customer) -> AppResult<()> {
        self.with("parties.insert_customer", |s| {
            s.customers.push(customer.clone());
            Ok(())
        })
    }
}

#[async_trait]
impl ActorRepository for MemoryRepo {
    async fn admin_exists(&self, id: &AdminId) -> AppResult<bool> {
        self.with("actors.admin_exists", |s| Ok(s.admins.contains(id)))
    }

    async fn employee_exists(&self, id: &EmployeeId) -> AppResult<bool> {
        self.with("actors.employee_exists", |s| Ok(s.employees.contains(id)))
    }
}
