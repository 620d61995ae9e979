//! 供应商 / 客户的"查找或新建"
//!
//! 解析阶段只读；新建的记录由调用方在通过全部业务校验后再写入。

use fab_errors::{AppError, AppResult};

use crate::application::commands::{CustomerRef, SupplierRef};
use crate::domain::entities::{Customer, Supplier};
use crate::domain::unit_of_work::UnitOfWork;
use crate::domain::value_objects::{CustomerId, SupplierId};

/// 解析结果：最终使用的 ID，以及需要新建时的待插入记录
pub struct Resolved<Id, Row> {
    pub id: Id,
    pub pending: Option<Row>,
}

pub async fn resolve_supplier(
    uow: &dyn UnitOfWork,
    supplier: Option<SupplierRef>,
) -> AppResult<Resolved<SupplierId, Supplier>> {
    match supplier {
        Some(SupplierRef::Existing(id)) => {
            if !uow.parties().supplier_exists(&id).await? {
                return Err(AppError::not_found(format!("Supplier {} not found", id)));
            }
            Ok(Resolved { id, pending: None })
        }
        Some(SupplierRef::New(input)) => {
            let supplier = Supplier::create(input)?;
            if let Some(existing) = uow
                .parties()
                .find_supplier_by_contact(&supplier.contact_key())
                .await?
            {
                return Err(AppError::duplicate(format!(
                    "Supplier with contact name '{}' already exists ({})",
                    supplier.contact_name, existing
                )));
            }
            Ok(Resolved {
                id: supplier.id,
                pending: Some(supplier),
            })
        }
        None => Err(AppError::validation(
            "Either an existing supplier id or new supplier details are required",
        )),
    }
}

pub async fn resolve_customer(
    uow: &dyn UnitOfWork,
    customer: Option<CustomerRef>,
) -> AppResult<Resolved<CustomerId, Customer>> {
    match customer {
        Some(CustomerRef::Existing(id)) => {
            if !uow.parties().customer_exists(&id).await? {
                return Err(AppError::not_found(format!("Customer {} not found", id)));
            }
            Ok(Resolved { id, pending: None })
        }
        Some(CustomerRef::New(input)) => {
            let customer = Customer::create(input)?;
            Ok(Resolved {
                id: customer.id,
                pending: Some(customer),
            })
        }
        None => Err(AppError::validation(
            "Either an existing customer id or new customer details are required",
        )),
    }
}
