//! Points economy and collectible purchases through the public handlers.

use kaikoon::api::{collectibles, types::*, ApiError};
use kaikoon::storage::{Database, EconomyStore};

fn seeded_db_with_points(points: i64) -> Database {
    let mut db = Database::open_in_memory().expect("Failed to create database");
    collectibles::get_catalog(&mut db).unwrap();
    let economy = EconomyStore::new(db.connection());
    economy.get_or_create_progress(1).unwrap();
    if points > 0 {
        economy.add_points(1, points).unwrap();
    }
    db
}

#[test]
fn catalog_has_five_starters_cheapest_first() {
    let mut db = Database::open_in_memory().expect("Failed to create database");
    let catalog = collectibles::get_catalog(&mut db).unwrap();

    let names: Vec<&str> = catalog.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        ["Sprout", "Sunflower", "Rose Bush", "Bonsai Tree", "Cherry Blossom"]
    );
    let costs: Vec<i64> = catalog.iter().map(|c| c.cost).collect();
    assert_eq!(costs, [50, 100, 150, 200, 250]);
}

#[test]
fn affordable_purchase_succeeds_exactly_once_per_call() {
    let mut db = seeded_db_with_points(100);
    let catalog = collectibles::get_catalog(&mut db).unwrap();
    let sprout = &catalog[0];

    let result = collectibles::purchase(
        &mut db,
        1,
        &PurchaseRequest {
            collectible_type_id: sprout.id,
        },
    )
    .unwrap();
    assert!(result.success);
    assert_eq!(result.new_points, 50);

    let progress = collectibles::get_user_progress(&db, 1).unwrap();
    assert_eq!(progress.kaiblooms_points, 50);
}

#[test]
fn unaffordable_purchase_is_rejected_without_side_effects() {
    let mut db = seeded_db_with_points(49);
    let catalog = collectibles::get_catalog(&mut db).unwrap();
    let sprout = &catalog[0];

    let result = collectibles::purchase(
        &mut db,
        1,
        &PurchaseRequest {
            collectible_type_id: sprout.id,
        },
    );

    match result {
        Err(err @ ApiError::InsufficientPoints) => {
            assert_eq!(err.status_code(), 400);
            assert_eq!(err.body()["error"], "Insufficient Kaiblooms points.");
        }
        other => panic!("Expected InsufficientPoints, got {:?}", other),
    }

    assert_eq!(
        collectibles::get_user_progress(&db, 1).unwrap().kaiblooms_points,
        49
    );
    assert!(collectibles::get_user_collection(&db, 1).unwrap().is_empty());
}

#[test]
fn collection_orders_latest_purchase_first() {
    let mut db = seeded_db_with_points(300);
    let catalog = collectibles::get_catalog(&mut db).unwrap();

    collectibles::purchase(
        &mut db,
        1,
        &PurchaseRequest {
            collectible_type_id: catalog[0].id,
        },
    )
    .unwrap();
    collectibles::purchase(
        &mut db,
        1,
        &PurchaseRequest {
            collectible_type_id: catalog[1].id,
        },
    )
    .unwrap();

    let owned = collectibles::get_user_collection(&db, 1).unwrap();
    assert_eq!(owned.len(), 2);
    assert!(owned[0].purchased_at >= owned[1].purchased_at);
}

#[test]
fn purchase_without_progress_is_not_found() {
    let mut db = Database::open_in_memory().expect("Failed to create database");
    let catalog = collectibles::get_catalog(&mut db).unwrap();

    let result = collectibles::purchase(
        &mut db,
        42,
        &PurchaseRequest {
            collectible_type_id: catalog[0].id,
        },
    );

    match result {
        Err(err @ ApiError::NotFound(_)) => {
            assert_eq!(err.status_code(), 404);
            assert_eq!(err.body()["error"], "User progress not found.");
        }
        other => panic!("Expected NotFound, got {:?}", other),
    }
}
