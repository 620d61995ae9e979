//! 领域实体

mod audit_record;
mod material;
mod order;
mod party;
mod product;
mod stock_movement;

pub use audit_record::*;
pub use material::*;
pub use order::*;
pub use party::*;
pub use product::*;
pub use stock_movement::*;
