//! 通用类型定义

use serde::{Deserialize, Serialize};

/// 偏移分页参数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWindow {
    pub limit: u32,
    pub offset: u32,
}

impl PageWindow {
    /// 单页最大条数
    pub const MAX_LIMIT: u32 = 500;

    /// 创建分页参数，limit 被限制在 1..=MAX_LIMIT
    pub fn new(limit: u32, offset: u32) -> Self {
        Self {
            limit: limit.clamp(1, Self::MAX_LIMIT),
            offset,
        }
    }

    pub fn limit_i64(&self) -> i64 {
        i64::from(self.limit)
    }

    pub fn offset_i64(&self) -> i64 {
        i64::from(self.offset)
    }
}

impl Default for PageWindow {
    fn default() -> Self {
        Self {
            limit: 100,
            offset: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_is_clamped() {
        assert_eq!(PageWindow::new(0, 0).limit, 1);
        assert_eq!(PageWindow::new(10_000, 5).limit, PageWindow::MAX_LIMIT);
        assert_eq!(PageWindow::new(25, 50).offset_i64(), 50);
    }
}
