//! 强类型 ID 定义

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, From,
        )]
        #[display("{_0}")]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(fab_common::new_id())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

define_id!(
    /// 物料 ID
    MaterialId
);
define_id!(
    /// 产品 ID
    ProductId
);
define_id!(
    /// 订单 ID
    OrderId
);
define_id!(OrderLineId);
define_id!(
    /// 订单状态 ID
    OrderStatusId
);
define_id!(
    /// 库存移动单 ID
    MovementId
);
define_id!(MovementLineId);
define_id!(
    /// 库存类型 ID
    StockTypeId
);
define_id!(
    /// 供应商 ID
    SupplierId
);
define_id!(
    /// 客户 ID
    CustomerId
);
define_id!(
    /// 管理员 ID
    AdminId
);
define_id!(
    /// 员工 ID
    EmployeeId
);
define_id!(
    /// 审计记录 ID
    AuditRecordId
);
