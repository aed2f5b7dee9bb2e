#![forbid(unsafe_code)]

use ml_core::ids::ContractId;
use ml_core::{Bike, BikeDraft, BikeStatus, Contract, ContractStatus};
use ml_storage::{
    BIKES_KEY, CONTRACTS_KEY, KeyValueBackend, MemoryBackend, PAYMENTS_KEY, PaymentBook,
    RecordStore, RentalStore, SqliteBackend, StoreConfig, StoreError,
};
use rusqlite::Connection;
use std::path::PathBuf;

const LEGACY_CONTRACTS: &str = r#"[{"type":"렌트","name":"홍길동","phone":"010-1111-2222","bike":"11가1111","bikeModel":"PCX","dayFee":15000,"weekFee":105000,"monthFee":450000,"fee":450000,"start":"2024-05-01","days":30,"end":"2024-05-30","status":"정상","archived":false}]"#;

const LEGACY_PAYMENTS: &str = r#"{"2024-05-01":{"c_1":{"paid":1,"ts":1714521600000},"c_2":{"paid":"","ts":1714521600000},"c_3":{"paid":true}}}"#;

fn temp_dir(test_name: &str) -> PathBuf {
    let base = std::env::temp_dir();
    let pid = std::process::id();
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let dir = base.join(format!("ml_storage_{test_name}_{pid}_{nonce}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

#[test]
fn missing_keys_load_as_empty_collections() {
    let store = RentalStore::with_backend(MemoryBackend::new());
    assert!(store.bikes().is_empty());
    assert!(store.contracts().is_empty());
    assert!(store.payments().is_empty());
}

#[test]
fn malformed_collections_degrade_to_empty() {
    let backend = MemoryBackend::new()
        .with_entry(BIKES_KEY, "{not json")
        .with_entry(CONTRACTS_KEY, r#"{"plate":"11가1111"}"#)
        .with_entry(PAYMENTS_KEY, "[1,2,3]");

    let store = RentalStore::with_backend(backend);
    assert!(store.bikes().is_empty());
    assert!(store.contracts().is_empty());
    assert!(store.payments().is_empty());
}

#[test]
fn save_of_load_is_a_fixed_point() {
    let backend = MemoryBackend::new()
        .with_entry(
            BIKES_KEY,
            r#"[{"plate":"11가1111","model":"PCX","status":"대여중"},{"plate":"22나2222","model":"NMAX"}]"#,
        )
        .with_entry(CONTRACTS_KEY, LEGACY_CONTRACTS)
        .with_entry(PAYMENTS_KEY, LEGACY_PAYMENTS);
    let mut records = RecordStore::new(backend);

    let bikes: Vec<Bike> = records.load(BIKES_KEY);
    records.save(BIKES_KEY, &bikes);
    let contracts: Vec<Contract> = records.load(CONTRACTS_KEY);
    records.save(CONTRACTS_KEY, &contracts);
    let payments: PaymentBook = records.load(PAYMENTS_KEY);
    records.save(PAYMENTS_KEY, &payments);

    let first = [BIKES_KEY, CONTRACTS_KEY, PAYMENTS_KEY]
        .map(|key| records.backend().raw(key).map(str::to_string));

    let bikes_again: Vec<Bike> = records.load(BIKES_KEY);
    records.save(BIKES_KEY, &bikes_again);
    let contracts_again: Vec<Contract> = records.load(CONTRACTS_KEY);
    records.save(CONTRACTS_KEY, &contracts_again);
    let payments_again: PaymentBook = records.load(PAYMENTS_KEY);
    records.save(PAYMENTS_KEY, &payments_again);

    let second = [BIKES_KEY, CONTRACTS_KEY, PAYMENTS_KEY]
        .map(|key| records.backend().raw(key).map(str::to_string));

    assert_eq!(first, second);
    assert_eq!(bikes, bikes_again);
    assert_eq!(contracts, contracts_again);
    assert_eq!(payments, payments_again);
    assert_eq!(bikes[1].status, BikeStatus::Available);
}

#[test]
fn legacy_contracts_without_ids_get_one_and_are_resaved() {
    let backend = MemoryBackend::new().with_entry(CONTRACTS_KEY, LEGACY_CONTRACTS);
    let store = RentalStore::with_backend(backend);

    let contract = &store.contracts()[0];
    assert!(contract.id.as_str().starts_with("c_"));
    assert_eq!(contract.plate.as_str(), "11가1111");
    assert_eq!(contract.billing_amount, 450_000);
    assert_eq!(contract.status, ContractStatus::Normal);
    let id = contract.id.clone();

    let backend = store.into_backend();
    let raw = backend.raw(CONTRACTS_KEY).expect("contracts persisted");
    assert!(raw.contains(id.as_str()));

    let reloaded = RentalStore::with_backend(backend);
    assert_eq!(reloaded.contracts()[0].id, id);
}

#[test]
fn loosely_typed_paid_flags_read_as_truthiness() {
    let backend = MemoryBackend::new().with_entry(PAYMENTS_KEY, LEGACY_PAYMENTS);
    let store = RentalStore::with_backend(backend);
    let date = ml_core::dates::parse_date("2024-05-01").expect("date");

    let id = |raw: &str| ContractId::try_new(raw).expect("contract id");
    assert!(store.committed_paid(date, &id("c_1")));
    assert!(!store.committed_paid(date, &id("c_2")));
    assert!(store.committed_paid(date, &id("c_3")));
    assert!(!store.committed_paid(date, &id("c_missing")));
    assert_eq!(store.committed_entry(date, &id("c_3")).map(|e| e.ts), Some(0));
}

#[test]
fn sqlite_backend_persists_across_reopen() {
    let storage_dir = temp_dir("sqlite_backend_persists_across_reopen");
    let config = StoreConfig::with_storage_dir(&storage_dir);

    {
        let mut store = RentalStore::open(&config).expect("open store");
        store
            .register_bike(BikeDraft {
                plate: "11가1111".to_string(),
                model: "PCX".to_string(),
                status: BikeStatus::Available,
            })
            .expect("register bike");
    }

    let store = RentalStore::open(&config).expect("reopen store");
    assert_eq!(store.bikes().len(), 1);
    assert_eq!(store.bikes()[0].model, "PCX");

    let backend = SqliteBackend::open(&storage_dir).expect("open backend");
    let raw = backend.get(BIKES_KEY).expect("read bikes").expect("bikes stored");
    assert!(raw.contains("11가1111"));
}

#[test]
fn sqlite_backend_refuses_foreign_schema() {
    let storage_dir = temp_dir("sqlite_backend_refuses_foreign_schema");
    {
        let conn = Connection::open(SqliteBackend::db_path(&storage_dir)).expect("open db");
        conn.execute_batch("CREATE TABLE unrelated (id INTEGER PRIMARY KEY);")
            .expect("create table");
    }

    let err = SqliteBackend::open(&storage_dir).expect_err("foreign schema must be rejected");
    match err {
        StoreError::InvalidInput(msg) => {
            assert_eq!(msg, "RESET_REQUIRED: unsupported tables detected");
        }
        other => panic!("expected InvalidInput error, got {other:?}"),
    }
}

#[test]
fn sample_bikes_are_seeded_only_into_an_empty_registry() {
    let storage_dir = temp_dir("sample_bikes_are_seeded_only_into_an_empty_registry");
    let config = StoreConfig {
        seed_sample_bikes: true,
        ..StoreConfig::with_storage_dir(&storage_dir)
    };

    let mut store = RentalStore::open(&config).expect("open store");
    let plates = store
        .bikes()
        .iter()
        .map(|bike| bike.plate.as_str().to_string())
        .collect::<Vec<_>>();
    assert_eq!(plates, vec!["123가4567", "234나8910"]);
    assert!(!store.seed_sample_bikes());

    store.set_bike_status("123가4567", BikeStatus::Maintenance);
    drop(store);

    let store = RentalStore::open(&config).expect("reopen store");
    assert_eq!(store.bikes().len(), 2);
    assert_eq!(
        store.bike("123가4567").map(|bike| bike.status),
        Some(BikeStatus::Maintenance)
    );
}

#[test]
fn loosely_typed_contract_numbers_still_load() {
    let contracts = r#"[
        {"id":"c_1","type":"렌트","name":"A","phone":"1","bike":"11가1111","bikeModel":"PCX","dayFee":15000,"weekFee":105000,"monthFee":450000,"fee":450000,"start":"2024-05-01","days":30,"end":"2024-05-30","status":"정상","archived":false},
        {"id":"c_2","type":"렌트","bike":"22나2222","dayFee":12500.5,"weekFee":"87503.5","fee":null,"start":"2024-05-01","days":"3","end":"2024-05-03","status":"연체"}
    ]"#;
    let backend = MemoryBackend::new().with_entry(CONTRACTS_KEY, contracts);
    let mut records = RecordStore::new(backend);

    let loaded: Vec<Contract> = records.load(CONTRACTS_KEY);
    assert_eq!(loaded.len(), 2);
    let lenient = &loaded[1];
    assert_eq!(lenient.day_fee, 12_501);
    assert_eq!(lenient.week_fee, 87_504);
    assert_eq!(lenient.month_fee, 0);
    assert_eq!(lenient.billing_amount, 0);
    assert_eq!(lenient.days, 3);
    assert!(lenient.name.is_empty());
    assert_eq!(lenient.status, ContractStatus::Overdue);

    records.save(CONTRACTS_KEY, &loaded);
    let again: Vec<Contract> = records.load(CONTRACTS_KEY);
    assert_eq!(again, loaded);
}
