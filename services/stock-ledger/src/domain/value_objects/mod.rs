//! 值对象

mod actor;
mod ids;

pub use actor::*;
pub use ids::*;
