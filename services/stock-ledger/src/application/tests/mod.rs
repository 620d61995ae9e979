//! 应用层测试（内存版 UnitOfWork）

mod memory;

mod order_fulfillment_tests;
