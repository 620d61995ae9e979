use std::sync::Arc;

use fab_config::InventoryConfig;
use fab_errors::AppError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::fixtures::{Fixture, line};
use crate::application::commands::CustomerRef;
use crate::application::order_fulfillment::OrderFulfillmentCoordinator;
use crate::domain::entities::{AuditDetails, Direction, MaterialOverride, NewCustomer};
use crate::domain::unit_of_work::UnitOfWorkFactory;
use crate::domain::value_objects::{ActorIdentity, EmployeeId, ProductId};

#[tokio::test]
async fn test_order_consumes_bill_of_materials() {
    let fx = Fixture::new();
    let frame = fx.add_material("Aluminum frame", dec!(100)).await;
    let glass = fx.add_material("Clear glass", dec!(50)).await;
    let window = fx
        .add_product("Sliding window", &[(frame, dec!(4)), (glass, dec!(2))])
        .await;

    let mut input = line(window, 3);
    input.unit_price = dec!(1500);
    input.misc_fee_percent = Some(dec!(10));
    let receipt = fx.handler.create_order(fx.order(vec![input])).await.unwrap();

    assert_eq!(receipt.total_amount, dec!(4950.00));
    assert_eq!(fx.stock(frame).await, dec!(88));
    assert_eq!(fx.stock(glass).await, dec!(44));

    let state = fx.store.snapshot().await;
    assert_eq!(state.orders.len(), 1);
    assert_eq!(state.orders[0].total_amount, dec!(4950.00));
    assert_eq!(state.order_lines.len(), 1);

    // 每种物料一张出库单
    assert_eq!(state.movements.len(), 2);
    for movement in &state.movements {
        assert_eq!(movement.direction, Direction::Out);
        assert_eq!(movement.stock_type.code, "STT002");
        assert_eq!(movement.order_id, Some(receipt.order_id));
        assert_eq!(movement.supplier_id, Some(fx.supplier));
    }
    assert_eq!(state.movement_lines.len(), 2);

    assert_eq!(state.audit_records.len(), 1);
    match &state.audit_records[0].details {
        AuditDetails::OrderCreated {
            line_count,
            total_amount,
            status_code,
            ..
        } => {
            assert_eq!(*line_count, 1);
            assert_eq!(*total_amount, dec!(4950.00));
            assert_eq!(status_code, "pending");
        }
        other => panic!("unexpected audit details: {:?}", other),
    }
}

#[tokio::test]
async fn test_shortfall_lists_only_short_materials() {
    let fx = Fixture::new();
    let a = fx.add_material("Material A", dec!(10)).await;
    let b = fx.add_material("Material B", dec!(3)).await;
    let product = fx.add_product("P", &[(a, dec!(15)), (b, dec!(1))]).await;

    let err = fx
        .handler
        .create_order(fx.order(vec![line(product, 1)]))
        .await
        .unwrap_err();

    let shortfalls = err.shortfalls();
    assert_eq!(shortfalls.len(), 1);
    assert_eq!(shortfalls[0].material_id, a.0);
    assert_eq!(shortfalls[0].needed, dec!(15));
    assert_eq!(shortfalls[0].available, dec!(10));

    assert_eq!(fx.stock(a).await, dec!(10));
    assert_eq!(fx.stock(b).await, dec!(3));
    let state = fx.store.snapshot().await;
    assert!(state.orders.is_empty());
    assert!(state.movements.is_empty());
    assert!(state.audit_records.is_empty());
}

#[tokio::test]
async fn test_every_short_material_is_reported() {
    let fx = Fixture::new();
    let a = fx.add_material("Material A", dec!(1)).await;
    let b = fx.add_material("Material B", dec!(1)).await;
    let product = fx.add_product("P", &[(a, dec!(2)), (b, dec!(2))]).await;

    let err = fx
        .handler
        .create_order(fx.order(vec![line(product, 1)]))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InsufficientStock(_)));
    assert_eq!(err.shortfalls().len(), 2);
    assert!(err.to_string().contains("Material A"));
    assert!(err.to_string().contains("Material B"));
}

#[tokio::test]
async fn test_exact_stock_is_consumed_to_zero() {
    let fx = Fixture::new();
    let a = fx.add_material("Material A", dec!(10)).await;
    let product = fx.add_product("P", &[(a, dec!(5))]).await;

    fx.handler
        .create_order(fx.order(vec![line(product, 2)]))
        .await
        .unwrap();

    assert_eq!(fx.stock(a).await, dec!(0));
}

#[tokio::test]
async fn test_lines_sharing_a_material_are_checked_together() {
    let fx = Fixture::new();
    let a = fx.add_material("Material A", dec!(10)).await;
    let p1 = fx.add_product("P1", &[(a, dec!(6))]).await;
    let p2 = fx.add_product("P2", &[(a, dec!(6))]).await;

    let err = fx
        .handler
        .create_order(fx.order(vec![line(p1, 1), line(p2, 1)]))
        .await
        .unwrap_err();

    assert_eq!(err.shortfalls()[0].needed, dec!(12));
    assert_eq!(fx.stock(a).await, dec!(10));
}

#[tokio::test]
async fn test_override_substitutes_material() {
    let fx = Fixture::new();
    let clear = fx.add_material("Clear glass", dec!(20)).await;
    let tinted = fx.add_material("Tinted glass", dec!(20)).await;
    let window = fx.add_product("Window", &[(clear, dec!(2))]).await;

    let mut input = line(window, 2);
    input.material_overrides = vec![MaterialOverride {
        original_material_id: Some(clear),
        selected_material_id: Some(tinted),
        used_quantity: dec!(2.5),
    }];
    fx.handler.create_order(fx.order(vec![input])).await.unwrap();

    assert_eq!(fx.stock(clear).await, dec!(20));
    assert_eq!(fx.stock(tinted).await, dec!(15.0));
}

#[tokio::test]
async fn test_oversized_amounts_are_rejected_without_writes() {
    let fx = Fixture::new();
    let a = fx.add_material("Material A", dec!(100)).await;
    let product = fx.add_product("P", &[(a, dec!(1))]).await;

    let mut huge_price = line(product, 2);
    huge_price.unit_price = Decimal::MAX;
    let handler = fx.handler.clone();
    let cmd = fx.order(vec![huge_price]);
    let joined = tokio::spawn(async move { handler.create_order(cmd).await }).await;
    assert!(matches!(joined.unwrap(), Err(AppError::Validation(_))));

    // 单价合法，但数量放大后超出金额列
    let mut huge_total = line(product, 50);
    huge_total.unit_price = dec!(999999999999.99);
    let err = fx
        .handler
        .create_order(fx.order(vec![huge_total]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let mut huge_override = line(product, 3);
    huge_override.material_overrides = vec![MaterialOverride {
        original_material_id: Some(a),
        selected_material_id: None,
        used_quantity: Decimal::MAX,
    }];
    let err = fx
        .handler
        .create_order(fx.order(vec![huge_override]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    assert_eq!(fx.stock(a).await, dec!(100));
    assert!(fx.store.snapshot().await.orders.is_empty());
    assert_eq!(fx.audit_count().await, 0);
}

#[tokio::test]
async fn test_override_finer_than_stock_precision_is_rejected() {
    let fx = Fixture::new();
    let glass = fx.add_material("Clear glass", dec!(20)).await;
    let window = fx.add_product("Window", &[(glass, dec!(2))]).await;

    let mut input = line(window, 1);
    input.material_overrides = vec![MaterialOverride {
        original_material_id: Some(glass),
        selected_material_id: None,
        used_quantity: dec!(0.0005),
    }];
    let err = fx.handler.create_order(fx.order(vec![input])).await.unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(fx.stock(glass).await, dec!(20));
}

#[tokio::test]
async fn test_new_customer_is_created_with_the_order() {
    let fx = Fixture::new();
    let a = fx.add_material("Material A", dec!(10)).await;
    let product = fx.add_product("P", &[(a, dec!(1))]).await;

    let mut cmd = fx.order(vec![line(product, 1)]);
    cmd.customer = Some(CustomerRef::New(NewCustomer {
        firstname: "andres".to_string(),
        lastname: "bonifacio".to_string(),
        contact_number: "0919".to_string(),
        email: "andres@example.com".to_string(),
        address: "tondo manila".to_string(),
    }));
    fx.handler.create_order(cmd).await.unwrap();

    let state = fx.store.snapshot().await;
    assert_eq!(state.customers.len(), 2);
    let created = state.customers.iter().find(|c| c.lastname == "Bonifacio").unwrap();
    assert_eq!(state.orders[0].customer_id, created.id);
}

#[tokio::test]
async fn test_new_customer_is_not_created_when_stock_is_short() {
    let fx = Fixture::new();
    let a = fx.add_material("Material A", dec!(0)).await;
    let product = fx.add_product("P", &[(a, dec!(1))]).await;

    let mut cmd = fx.order(vec![line(product, 1)]);
    cmd.customer = Some(CustomerRef::New(NewCustomer {
        firstname: "andres".to_string(),
        lastname: "bonifacio".to_string(),
        contact_number: String::new(),
        email: String::new(),
        address: String::new(),
    }));
    assert!(fx.handler.create_order(cmd).await.is_err());
    assert_eq!(fx.store.snapshot().await.customers.len(), 1);
}

#[tokio::test]
async fn test_missing_customer_is_rejected() {
    let fx = Fixture::new();
    let a = fx.add_material("Material A", dec!(10)).await;
    let product = fx.add_product("P", &[(a, dec!(1))]).await;

    let mut cmd = fx.order(vec![line(product, 1)]);
    cmd.customer = None;
    let err = fx.handler.create_order(cmd).await.unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(fx.store.snapshot().await.business_rows(), 2);
}

#[tokio::test]
async fn test_unknown_references_are_not_found() {
    let fx = Fixture::new();
    let a = fx.add_material("Material A", dec!(10)).await;
    let product = fx.add_product("P", &[(a, dec!(1))]).await;

    let mut cmd = fx.order(vec![line(product, 1)]);
    cmd.status_code = "shipped".to_string();
    let err = fx.handler.create_order(cmd).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let cmd = fx.order(vec![line(ProductId::new(), 1)]);
    let err = fx.handler.create_order(cmd).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let mut cmd = fx.order(vec![line(product, 1)]);
    cmd.actor = ActorIdentity::Employee(EmployeeId::new());
    let err = fx.handler.create_order(cmd).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    assert_eq!(fx.stock(a).await, dec!(10));
    assert_eq!(fx.audit_count().await, 0);
}

#[tokio::test]
async fn test_audit_failure_rolls_back_the_order() {
    let fx = Fixture::new();
    let a = fx.add_material("Material A", dec!(10)).await;
    let product = fx.add_product("P", &[(a, dec!(4))]).await;
    fx.fail_at("audit_records.append").await;

    let err = fx
        .handler
        .create_order(fx.order(vec![line(product, 1)]))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Database(_)));
    let state = fx.store.snapshot().await;
    assert_eq!(state.stock(&a), dec!(10));
    assert!(state.orders.is_empty());
    assert!(state.order_lines.is_empty());
    assert!(state.movements.is_empty());
    assert!(state.audit_records.is_empty());
}

#[tokio::test]
async fn test_caller_owned_unit_is_not_committed() {
    let fx = Fixture::new();
    let a = fx.add_material("Material A", dec!(10)).await;
    let product = fx.add_product("P", &[(a, dec!(4))]).await;
    let coordinator =
        OrderFulfillmentCoordinator::new(Arc::new(fx.store.clone()), InventoryConfig::default());

    let uow = fx.store.begin().await.unwrap();
    coordinator
        .create_order_in(uow.as_ref(), fx.order(vec![line(product, 1)]))
        .await
        .unwrap();
    uow.rollback().await.unwrap();

    let state = fx.store.snapshot().await;
    assert_eq!(state.stock(&a), dec!(10));
    assert!(state.orders.is_empty());
    assert!(state.audit_records.is_empty());
}
