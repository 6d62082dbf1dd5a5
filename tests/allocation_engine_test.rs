// ==========================================
// 库位分配引擎集成测试
// ==========================================
// 覆盖: 区域顺序 first-fit、会话排除、无库位、认证失败不重试
// ==========================================


use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use test_helpers::*;
use warehouse_slotting::domain::{AllocationRequest, AllocationSession, MovementRef, Zone};
use warehouse_slotting::engine::error::AllocationFailure;
use warehouse_slotting::engine::{HeightCalculator, SlotAllocationEngine};
use warehouse_slotting::inventory::{
    AuthFailureKind, BackendError, InventoryBackend, ResilientQueryLayer, RetryPolicy,
    SqliteInventoryBackend,
};
use warehouse_slotting::repository::ItemCubageRepository;

struct Fixture {
    _db_file: tempfile::NamedTempFile,
    backend: Arc<SqliteInventoryBackend>,
    items: Arc<ItemCubageRepository>,
}

fn fixture() -> Fixture {
    let (db_file, db_path) = create_test_db().unwrap();
    let conn = shared_conn(&db_path);
    seed_item(&conn, &complete_item("4001"));
    Fixture {
        _db_file: db_file,
        backend: Arc::new(SqliteInventoryBackend::from_connection(conn.clone())),
        items: Arc::new(ItemCubageRepository::from_connection(conn)),
    }
}

fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        backoff: Duration::ZERO,
        ..RetryPolicy::default()
    }
}

fn engine_over(fx: &Fixture, backend: Arc<dyn InventoryBackend>) -> SlotAllocationEngine {
    SlotAllocationEngine::new(
        fx.items.clone(),
        Arc::new(ResilientQueryLayer::new(backend, fast_policy())),
        HeightCalculator::default(),
    )
}

fn request(volume: &str) -> AllocationRequest {
    AllocationRequest {
        item_id: "4001".to_string(),
        warehouse: "10".to_string(),
        requested_volume: volume.to_string(),
        movement_ref: MovementRef::normalize("W001234"),
        class_code: None,
    }
}

#[tokio::test]
async fn test_small_load_lands_in_smallest_fitting_peq_slot() {
    let fx = fixture();
    seed_location(&fx.backend, "P-02", Zone::Peq, 1.0);
    seed_location(&fx.backend, "P-01", Zone::Peq, 0.7);
    seed_location(&fx.backend, "P-00", Zone::Peq, 0.6);
    seed_location(&fx.backend, "R-01", Zone::Rua, 9.0);
    let engine = engine_over(&fx, fx.backend.clone());
    let mut session = AllocationSession::new("u1", "OPER1");

    // 5 箱 / 每层 10 → 1 层 → 0.5 + 0.15
    let allocation = engine.allocate(&request("5"), &mut session, &creds()).await.unwrap();

    assert_eq!(allocation.required_height, 0.65);
    assert_eq!(allocation.zone, Zone::Peq);
    assert_eq!(allocation.location.address, "P-01");
    assert_eq!(session.locations_used(), &["P-01".to_string()]);
}

#[tokio::test]
async fn test_repeated_requests_never_reuse_an_address() {
    let fx = fixture();
    seed_location(&fx.backend, "P-01", Zone::Peq, 0.7);
    seed_location(&fx.backend, "P-02", Zone::Peq, 0.7);
    seed_location(&fx.backend, "M-01", Zone::Med, 1.2);
    let engine = engine_over(&fx, fx.backend.clone());
    let mut session = AllocationSession::new("u1", "OPER1");

    let mut addresses = Vec::new();
    for _ in 0..3 {
        let allocation = engine.allocate(&request("5"), &mut session, &creds()).await.unwrap();
        addresses.push(allocation.location.address);
    }

    assert_eq!(addresses, vec!["P-01", "P-02", "M-01"]);
    assert_eq!(session.locations_used().len(), 3);
}

#[tokio::test]
async fn test_tall_load_skips_small_zones() {
    let fx = fixture();
    seed_location(&fx.backend, "P-01", Zone::Peq, 5.0);
    seed_location(&fx.backend, "G-01", Zone::Gra, 1.7);
    let engine = engine_over(&fx, fx.backend.clone());
    let mut session = AllocationSession::new("u1", "OPER1");

    // 25 箱 → 3 层 → 1.65 → [GRA, RUA]
    let allocation = engine.allocate(&request("25"), &mut session, &creds()).await.unwrap();
    assert_eq!(allocation.zone, Zone::Gra);
    assert_eq!(allocation.location.address, "G-01");
}

#[tokio::test]
async fn test_oversized_load_goes_to_rua_only() {
    let fx = fixture();
    seed_location(&fx.backend, "G-01", Zone::Gra, 9.0);
    seed_location(&fx.backend, "R-01", Zone::Rua, 3.0);
    let engine = engine_over(&fx, fx.backend.clone());
    let mut session = AllocationSession::new("u1", "OPER1");

    let allocation = engine.allocate(&request("50"), &mut session, &creds()).await.unwrap();
    assert_eq!(allocation.required_height, 2.65);
    assert_eq!(allocation.zone, Zone::Rua);
}

#[tokio::test]
async fn test_inflight_load_blocks_location() {
    let fx = fixture();
    seed_location(&fx.backend, "P-01", Zone::Peq, 0.7);
    seed_location(&fx.backend, "P-02", Zone::Peq, 0.9);
    fx.backend.add_inflight_load("10", "P-01", "CARGA-1").unwrap();
    let engine = engine_over(&fx, fx.backend.clone());
    let mut session = AllocationSession::new("u1", "OPER1");

    let allocation = engine.allocate(&request("5"), &mut session, &creds()).await.unwrap();
    assert_eq!(allocation.location.address, "P-02");
}

#[tokio::test]
async fn test_no_location_leaves_session_untouched() {
    let fx = fixture();
    seed_location(&fx.backend, "P-01", Zone::Peq, 0.3);
    let engine = engine_over(&fx, fx.backend.clone());
    let mut session = AllocationSession::new("u1", "OPER1");

    let err = engine.allocate(&request("5"), &mut session, &creds()).await.unwrap_err();

    match err {
        AllocationFailure::NoLocationAvailable { zones_tried, .. } => {
            assert_eq!(zones_tried, vec![Zone::Peq, Zone::Med, Zone::Rua]);
        }
        other => panic!("Expected NoLocationAvailable, got {:?}", other),
    }
    assert!(session.locations_used().is_empty());
    assert!(session.macro_buffer().is_empty());
}

#[tokio::test]
async fn test_rejected_password_is_not_retried() {
    let fx = fixture();
    seed_location(&fx.backend, "P-01", Zone::Peq, 0.7);
    let flaky = Arc::new(FlakyBackend::new(
        fx.backend.clone(),
        vec![BackendError::Query("SQL0901 CWBSY0002 - Password is incorrect".to_string())],
    ));
    let layer = Arc::new(ResilientQueryLayer::new(flaky.clone(), fast_policy()));
    let engine = SlotAllocationEngine::new(fx.items.clone(), layer.clone(), HeightCalculator::default());
    let mut session = AllocationSession::new("u1", "OPER1");

    let err = engine.allocate(&request("5"), &mut session, &creds()).await.unwrap_err();

    match err {
        AllocationFailure::Authentication(auth) => {
            assert_eq!(auth.kind, AuthFailureKind::PasswordRejected);
        }
        other => panic!("Expected Authentication, got {:?}", other),
    }
    assert_eq!(flaky.location_calls.load(Ordering::SeqCst), 1);
    assert_eq!(layer.transient_failure_count(), 0);
    assert!(session.locations_used().is_empty());
}

#[tokio::test]
async fn test_transient_failure_is_retried_within_zone() {
    let fx = fixture();
    seed_location(&fx.backend, "P-01", Zone::Peq, 0.7);
    let flaky = Arc::new(FlakyBackend::new(
        fx.backend.clone(),
        vec![BackendError::Connection("socket reset".to_string())],
    ));
    let layer = Arc::new(ResilientQueryLayer::new(flaky.clone(), fast_policy()));
    let engine = SlotAllocationEngine::new(fx.items.clone(), layer.clone(), HeightCalculator::default());
    let mut session = AllocationSession::new("u1", "OPER1");

    let allocation = engine.allocate(&request("5"), &mut session, &creds()).await.unwrap();

    assert_eq!(allocation.location.address, "P-01");
    assert_eq!(flaky.location_calls.load(Ordering::SeqCst), 2);
    assert_eq!(layer.transient_failure_count(), 1);
}

#[tokio::test]
async fn test_exhausted_zone_falls_through_to_next_zone() {
    let fx = fixture();
    seed_location(&fx.backend, "M-01", Zone::Med, 0.9);
    let failures = (0..3)
        .map(|_| BackendError::Connection("timeout".to_string()))
        .collect();
    let flaky = Arc::new(FlakyBackend::new(fx.backend.clone(), failures));
    let layer = Arc::new(ResilientQueryLayer::new(flaky.clone(), fast_policy()));
    let engine = SlotAllocationEngine::new(fx.items.clone(), layer.clone(), HeightCalculator::default());
    let mut session = AllocationSession::new("u1", "OPER1");

    // PEQ 三次均失败视为无结果，继续查询 MED
    let allocation = engine.allocate(&request("5"), &mut session, &creds()).await.unwrap();

    assert_eq!(allocation.zone, Zone::Med);
    assert_eq!(flaky.location_calls.load(Ordering::SeqCst), 4);
    assert_eq!(layer.transient_failure_count(), 3);
}
