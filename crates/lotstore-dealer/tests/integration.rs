//! Integration tests: the full dealership lifecycle over real files.
//!
//! These tests exercise the complete DealerService pipeline (catalog,
//! inventory, ledger, joins, ranking) against an actual on-disk root
//! directory and verify the file-level invariants: slot widths, index
//! sorting, tombstones.

use tempfile::TempDir;

use lotstore_core::{LotError, SLOT_SIZE};
use lotstore_dealer::{
    Car, CarStatus, Config, DealerService, Model, Sale,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn test_service() -> (DealerService, TempDir) {
    let dir = TempDir::new().unwrap();
    let service = DealerService::open(Config::new(dir.path())).unwrap();
    (service, dir)
}

fn model(id: i64, name: &str, brand: &str) -> Model {
    Model { id, name: name.to_string(), brand: brand.to_string() }
}

fn car(vin: &str, model: i64, price: i64) -> Car {
    Car {
        vin: vin.to_string(),
        model,
        price,
        date_start: "2024-09-01".to_string(),
        status: CarStatus::Available,
    }
}

fn sale(number: &str, vin: &str, cost: i64) -> Sale {
    Sale {
        sales_number: number.to_string(),
        car_vin: vin.to_string(),
        sales_date: "2024-09-03".to_string(),
        cost,
    }
}

// ---------------------------------------------------------------------------
// Round trips
// ---------------------------------------------------------------------------

#[test]
fn test_append_and_read_back() {
    let (service, _dir) = test_service();

    service.add_model(&model(1, "Model S", "Tesla")).unwrap();
    service.add_car(&car("VIN001", 1, 80_000)).unwrap();
    service.add_car(&car("VIN002", 1, 82_000)).unwrap();

    let cars = service.get_cars(None).unwrap();
    assert_eq!(cars.len(), 2);
    assert_eq!(cars[0], car("VIN001", 1, 80_000));
    assert_eq!(cars[1], car("VIN002", 1, 82_000));
}

#[test]
fn test_empty_store_reads_as_empty() {
    let (service, _dir) = test_service();

    assert!(service.get_cars(None).unwrap().is_empty());
    assert!(service.top_models_by_sales().unwrap().is_empty());
    assert_eq!(service.get_car_info("VIN001").unwrap(), None);
}

// ---------------------------------------------------------------------------
// Full sale lifecycle
// ---------------------------------------------------------------------------

#[test]
fn test_sale_lifecycle() {
    let (service, _dir) = test_service();

    service.add_model(&model(1, "Model S", "Tesla")).unwrap();
    service.add_car(&car("VIN001", 1, 80_000)).unwrap();

    // Sell it
    let sold = service.sell_car(&sale("S1", "VIN001", 79_000)).unwrap();
    assert_eq!(sold.vin, "VIN001");
    assert_eq!(sold.status, CarStatus::Sold);

    // The projection carries the sale
    let info = service.get_car_info("VIN001").unwrap().unwrap();
    assert_eq!(info.car_model_name, "Model S");
    assert_eq!(info.car_model_brand, "Tesla");
    assert_eq!(info.status, CarStatus::Sold);
    assert_eq!(info.sales_cost, Some(79_000));
    assert_eq!(info.sales_date.as_deref(), Some("2024-09-03"));

    // Revert the sale
    let reverted = service.revert_sale("S1").unwrap();
    assert_eq!(reverted.status, CarStatus::Available);

    // The projection loses the sale again
    let info = service.get_car_info("VIN001").unwrap().unwrap();
    assert_eq!(info.status, CarStatus::Available);
    assert_eq!(info.sales_cost, None);
    assert_eq!(info.sales_date, None);

    // Reverting twice fails
    assert!(matches!(
        service.revert_sale("S1"),
        Err(LotError::NotFound { entity: "sale", .. })
    ));
}

#[test]
fn test_sell_appends_exactly_one_ledger_entry() {
    let (service, dir) = test_service();

    service.add_car(&car("VIN001", 1, 80_000)).unwrap();
    service.sell_car(&sale("S1", "VIN001", 79_000)).unwrap();

    let ledger = std::fs::read(dir.path().join("sales.txt")).unwrap();
    assert_eq!(ledger.len(), SLOT_SIZE);

    let index = std::fs::read_to_string(dir.path().join("sales_index.txt")).unwrap();
    assert_eq!(index.lines().count(), 1);
    assert!(index.starts_with("S1 0"));
}

#[test]
fn test_reverted_slot_is_blank_padding() {
    let (service, dir) = test_service();

    service.add_car(&car("VIN001", 1, 80_000)).unwrap();
    service.sell_car(&sale("S1", "VIN001", 79_000)).unwrap();
    service.revert_sale("S1").unwrap();

    // The ledger still holds one allocated slot of pure padding
    let ledger = std::fs::read(dir.path().join("sales.txt")).unwrap();
    assert_eq!(ledger.len(), SLOT_SIZE);
    assert!(ledger[..SLOT_SIZE - 1].iter().all(|&b| b == b' '));
    assert_eq!(ledger[SLOT_SIZE - 1], b'\n');
}

// ---------------------------------------------------------------------------
// VIN updates and index rebuilds
// ---------------------------------------------------------------------------

#[test]
fn test_update_vin_resorts_index_file() {
    let (service, dir) = test_service();

    service.add_car(&car("VIN_C", 1, 10_000)).unwrap();
    service.add_car(&car("VIN_A", 1, 11_000)).unwrap();
    service.add_car(&car("VIN_B", 1, 12_000)).unwrap();

    let updated = service.update_vin("VIN_C", "VIN_Z").unwrap();
    assert_eq!(updated.vin, "VIN_Z");

    // Old VIN gone, new VIN resolvable
    assert!(matches!(
        service.update_vin("VIN_C", "VIN_X"),
        Err(LotError::NotFound { .. })
    ));
    let info_none = service.get_car_info("VIN_C").unwrap();
    assert!(info_none.is_none());
    assert_eq!(service.get_cars(None).unwrap()[0].vin, "VIN_Z");

    // The rewritten index file is sorted ascending by key, offsets intact
    let index = std::fs::read_to_string(dir.path().join("cars_index.txt")).unwrap();
    let lines: Vec<&str> = index.lines().collect();
    assert_eq!(lines, vec![
        format!("VIN_A {}", SLOT_SIZE).as_str(),
        format!("VIN_B {}", 2 * SLOT_SIZE).as_str(),
        "VIN_Z 0",
    ]);
}

#[test]
fn test_update_vin_keeps_record_offset() {
    let (service, dir) = test_service();

    service.add_car(&car("VIN001", 1, 10_000)).unwrap();
    service.add_car(&car("VIN002", 1, 11_000)).unwrap();
    service.update_vin("VIN001", "VIN999").unwrap();

    // Record file did not grow; first slot holds the renamed car
    let records = std::fs::read(dir.path().join("cars.txt")).unwrap();
    assert_eq!(records.len(), 2 * SLOT_SIZE);
    let first = std::str::from_utf8(&records[..SLOT_SIZE]).unwrap();
    assert!(first.contains("VIN999"));
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

#[test]
fn test_top_models_ranking() {
    let (service, _dir) = test_service();

    service.add_model(&model(1, "Model S", "Tesla")).unwrap();
    service.add_model(&model(2, "Model 3", "Tesla")).unwrap();
    service.add_model(&model(3, "Leaf", "Nissan")).unwrap();
    service.add_model(&model(4, "i3", "BMW")).unwrap();

    // model 2: three sales; model 1: two; models 3 and 4: one each
    let plan: &[(i64, usize)] = &[(2, 3), (1, 2), (3, 1), (4, 1)];
    let mut n = 0;
    for &(model_id, count) in plan {
        for _ in 0..count {
            n += 1;
            let vin = format!("VIN{:03}", n);
            service.add_car(&car(&vin, model_id, 30_000)).unwrap();
            service.sell_car(&sale(&format!("S{}", n), &vin, 29_000)).unwrap();
        }
    }

    let stats = service.top_models_by_sales().unwrap();
    assert_eq!(stats.len(), 3);

    assert_eq!(stats[0].car_model_name, "Model 3");
    assert_eq!(stats[0].sales_number, 3);
    assert_eq!(stats[1].car_model_name, "Model S");
    assert_eq!(stats[1].sales_number, 2);
    // Tie between models 3 and 4 broken by model id descending
    assert_eq!(stats[2].car_model_name, "i3");
    assert_eq!(stats[2].brand, "BMW");
    assert_eq!(stats[2].sales_number, 1);
}

#[test]
fn test_top_models_excludes_reverted_sales() {
    let (service, _dir) = test_service();

    service.add_model(&model(1, "Model S", "Tesla")).unwrap();
    service.add_model(&model(2, "Model 3", "Tesla")).unwrap();

    service.add_car(&car("VIN001", 1, 80_000)).unwrap();
    service.add_car(&car("VIN002", 2, 40_000)).unwrap();
    service.sell_car(&sale("S1", "VIN001", 79_000)).unwrap();
    service.sell_car(&sale("S2", "VIN002", 39_000)).unwrap();
    service.revert_sale("S2").unwrap();

    let stats = service.top_models_by_sales().unwrap();
    assert_eq!(stats.len(), 1, "a model with only reverted sales must not rank");
    assert_eq!(stats[0].car_model_name, "Model S");
}

// ---------------------------------------------------------------------------
// Oversize and strict-mode behavior
// ---------------------------------------------------------------------------

#[test]
fn test_oversized_record_rejected_not_corrupted() {
    let (service, dir) = test_service();

    let mut huge = car("VIN001", 1, 80_000);
    huge.date_start = "9".repeat(600);
    assert!(matches!(
        service.add_car(&huge),
        Err(LotError::RecordTooLarge { .. })
    ));

    // Neither the record file nor the index gained an entry
    assert!(!dir.path().join("cars.txt").exists());
    assert!(!dir.path().join("cars_index.txt").exists());
}

#[test]
fn test_strict_mode_rejects_duplicate_vin() {
    let dir = TempDir::new().unwrap();
    let service = DealerService::open(Config::new(dir.path()).strict()).unwrap();

    service.add_car(&car("VIN001", 1, 80_000)).unwrap();
    assert!(matches!(
        service.add_car(&car("VIN001", 2, 90_000)),
        Err(LotError::DuplicateKey { entity: "car", .. })
    ));
}

#[test]
fn test_permissive_duplicate_vin_first_match_wins() {
    let (service, _dir) = test_service();

    service.add_model(&model(1, "Model S", "Tesla")).unwrap();
    service.add_model(&model(2, "Model 3", "Tesla")).unwrap();
    service.add_car(&car("VIN001", 1, 80_000)).unwrap();
    service.add_car(&car("VIN001", 2, 40_000)).unwrap();

    let info = service.get_car_info("VIN001").unwrap().unwrap();
    assert_eq!(info.car_model_name, "Model S");
    assert_eq!(info.price, 80_000);
}

// ---------------------------------------------------------------------------
// Reopen (handles are per-call, state lives entirely on disk)
// ---------------------------------------------------------------------------

#[test]
fn test_state_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let service = DealerService::open(Config::new(dir.path())).unwrap();
        service.add_model(&model(1, "Model S", "Tesla")).unwrap();
        service.add_car(&car("VIN001", 1, 80_000)).unwrap();
        service.sell_car(&sale("S1", "VIN001", 79_000)).unwrap();
    }
    {
        let service = DealerService::open(Config::new(dir.path())).unwrap();
        let info = service.get_car_info("VIN001").unwrap().unwrap();
        assert_eq!(info.status, CarStatus::Sold);
        assert_eq!(info.sales_cost, Some(79_000));

        let reverted = service.revert_sale("S1").unwrap();
        assert_eq!(reverted.status, CarStatus::Available);
    }
}
