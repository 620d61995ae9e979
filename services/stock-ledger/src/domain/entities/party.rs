//! 供应商与客户
//!
//! 完整的增删改查不在本服务内，这里只保留下单/入库时"查找或新建"所需的部分。

use chrono::{DateTime, Utc};
use fab_common::{natural_key, title_case};
use fab_errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{CustomerId, SupplierId};

/// 新供应商
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSupplier {
    pub firstname: String,
    pub lastname: String,
    pub contact_name: String,
    pub contact_number: String,
    pub email: String,
    pub address: String,
}

/// 供应商
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: SupplierId,
    pub firstname: String,
    pub lastname: String,
    pub contact_name: String,
    pub contact_number: String,
    pub email: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
}

impl Supplier {
    /// 规范化姓名后创建
    pub fn create(input: NewSupplier) -> AppResult<Self> {
        if input.contact_name.trim().is_empty() {
            return Err(AppError::validation("Supplier contact name is required"));
        }
        Ok(Self {
            id: SupplierId::new(),
            firstname: title_case(&input.firstname),
            lastname: title_case(&input.lastname),
            contact_name: title_case(&input.contact_name),
            contact_number: input.contact_number.trim().to_string(),
            email: input.email.trim().to_string(),
            address: title_case(&input.address),
            created_at: Utc::now(),
        })
    }

    /// 用于重复检查的联系人自然键
    pub fn contact_key(&self) -> String {
        natural_key(&self.contact_name)
    }
}

/// 新客户
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub firstname: String,
    pub lastname: String,
    pub contact_number: String,
    pub email: String,
    pub address: String,
}

/// 客户
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub firstname: String,
    pub lastname: String,
    pub contact_number: String,
    pub email: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    pub fn create(input: NewCustomer) -> AppResult<Self> {
        if input.firstname.trim().is_empty() && input.lastname.trim().is_empty() {
            return Err(AppError::validation("Customer name is required"));
        }
        Ok(Self {
            id: CustomerId::new(),
            firstname: title_case(&input.firstname),
            lastname: title_case(&input.lastname),
            contact_number: input.contact_number.trim().to_string(),
            email: input.email.trim().to_string(),
            address: title_case(&input.address),
            created_at: Utc::now(),
        })
    }
}
