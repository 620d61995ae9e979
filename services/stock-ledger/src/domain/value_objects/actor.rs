//! 操作人身份
//!
//! 每个写操作都必须归属于且仅归属于一个管理员或员工。

use fab_errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ids::{AdminId, EmployeeId};

/// 操作人：管理员或员工，二者必居其一
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "role", content = "id", rename_all = "snake_case")]
pub enum ActorIdentity {
    Admin(AdminId),
    Employee(EmployeeId),
}

impl ActorIdentity {
    /// 从 (admin_id, employee_id) 两列构造，两列必须恰好一列有值
    pub fn from_columns(admin_id: Option<Uuid>, employee_id: Option<Uuid>) -> AppResult<Self> {
        match (admin_id, employee_id) {
            (Some(admin), None) => Ok(Self::Admin(AdminId(admin))),
            (None, Some(employee)) => Ok(Self::Employee(EmployeeId(employee))),
            (Some(_), Some(_)) => Err(AppError::validation(
                "Actor must be either an admin or an employee, not both",
            )),
            (None, None) => Err(AppError::validation(
                "Actor is required: exactly one of admin_id or employee_id must be set",
            )),
        }
    }

    /// 拆分为 (admin_id, employee_id) 两列
    pub fn columns(&self) -> (Option<Uuid>, Option<Uuid>) {
        match self {
            Self::Admin(id) => (Some(id.0), None),
            Self::Employee(id) => (None, Some(id.0)),
        }
    }

    pub fn role(&self) -> &'static str {
        match self {
            Self::Admin(_) => "admin",
            Self::Employee(_) => "employee",
        }
    }
}

impl From<AdminId> for ActorIdentity {
    fn from(id: AdminId) -> Self {
        Self::Admin(id)
    }
}

impl From<EmployeeId> for ActorIdentity {
    fn from(id: EmployeeId) -> Self {
        Self::Employee(id)
    }
}

impl std::fmt::Display for ActorIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin(id) => write!(f, "admin:{}", id),
            Self::Employee(id) => write!(f, "employee:{}", id),
        }
    }
}
