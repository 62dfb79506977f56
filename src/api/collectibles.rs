//! Kai Garden endpoints: catalog, purchase, and the user's collection.

use crate::storage::{CollectibleType, Database, EconomyStore, OwnedCollectible, UserProgress};

use super::error::ApiError;
use super::types::{PurchaseRequest, PurchaseResponse};

/// `GET /collectibles` — the purchasable catalog, cheapest first. Seeds
/// the starter catalog on first call.
pub fn get_catalog(db: &mut Database) -> Result<Vec<CollectibleType>, ApiError> {
    let tx = db.immediate_transaction()?;
    let catalog = {
        let economy = EconomyStore::new(&tx);
        if economy.count_collectible_types()? == 0 {
            economy.seed_collectible_types()?;
            tracing::info!("Seeded collectible catalog");
        }
        economy.list_collectible_types()?
    };
    tx.commit()
        .map_err(|e| ApiError::Internal(format!("Failed to load catalog: {}", e)))?;

    Ok(catalog)
}

/// `GET /collectibles/owned` — everything the user has purchased,
/// most recent purchase first.
pub fn get_user_collection(
    db: &Database,
    user_id: i64,
) -> Result<Vec<OwnedCollectible>, ApiError> {
    let store = EconomyStore::new(db.connection());
    Ok(store.list_user_collection(user_id)?)
}

/// `GET /progress` — the user's point balance, created lazily.
pub fn get_user_progress(db: &Database, user_id: i64) -> Result<UserProgress, ApiError> {
    let store = EconomyStore::new(db.connection());
    Ok(store.get_or_create_progress(user_id)?)
}

/// `POST /collectibles/purchase` — deduct the cost and record ownership
/// atomically.
pub fn purchase(
    db: &mut Database,
    user_id: i64,
    input: &PurchaseRequest,
) -> Result<PurchaseResponse, ApiError> {
    let tx = db.immediate_transaction()?;
    let new_points = {
        let economy = EconomyStore::new(&tx);

        let collectible = economy
            .get_collectible_type(input.collectible_type_id)?
            .ok_or_else(|| ApiError::NotFound("Collectible not found.".to_string()))?;

        let progress = economy
            .get_progress(user_id)?
            .ok_or_else(|| ApiError::NotFound("User progress not found.".to_string()))?;

        if progress.kaiblooms_points < collectible.cost {
            return Err(ApiError::InsufficientPoints);
        }

        // The deduction re-checks the balance; a concurrent spend since
        // the read above makes it a no-op.
        if !economy.try_spend_points(user_id, collectible.cost)? {
            return Err(ApiError::InsufficientPoints);
        }

        economy.record_purchase(user_id, collectible.id)?;

        progress.kaiblooms_points - collectible.cost
    };
    tx.commit()
        .map_err(|e| ApiError::Internal(format!("Failed to complete purchase: {}", e)))?;

    tracing::info!(user_id, new_points, "Collectible purchased");

    Ok(PurchaseResponse {
        success: true,
        new_points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn test_catalog_seeded_once_and_cost_ordered() {
        let mut db = db();

        let catalog = get_catalog(&mut db).unwrap();
        assert_eq!(catalog.len(), 5);
        assert_eq!(catalog[0].name, "Sprout");
        assert_eq!(catalog[0].cost, 50);
        assert!(catalog.windows(2).all(|w| w[0].cost <= w[1].cost));

        // Second call must not duplicate the seed
        let again = get_catalog(&mut db).unwrap();
        assert_eq!(again.len(), 5);
    }

    #[test]
    fn test_purchase_deducts_exact_cost() {
        let mut db = db();
        let catalog = get_catalog(&mut db).unwrap();
        let sprout = &catalog[0];

        let economy = EconomyStore::new(db.connection());
        economy.get_or_create_progress(1).unwrap();
        economy.add_points(1, 120).unwrap();
        drop(economy);

        let result = purchase(
            &mut db,
            1,
            &PurchaseRequest {
                collectible_type_id: sprout.id,
            },
        )
        .unwrap();

        assert!(result.success);
        assert_eq!(result.new_points, 70);

        let owned = get_user_collection(&db, 1).unwrap();
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].quantity, 1);
    }

    #[test]
    fn test_repeat_purchase_increments_quantity() {
        let mut db = db();
        let catalog = get_catalog(&mut db).unwrap();
        let sprout = &catalog[0];

        let economy = EconomyStore::new(db.connection());
        economy.get_or_create_progress(1).unwrap();
        economy.add_points(1, 200).unwrap();
        drop(economy);

        let request = PurchaseRequest {
            collectible_type_id: sprout.id,
        };
        purchase(&mut db, 1, &request).unwrap();
        purchase(&mut db, 1, &request).unwrap();

        let owned = get_user_collection(&db, 1).unwrap();
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].quantity, 2);
    }

    #[test]
    fn test_purchase_insufficient_points_changes_nothing() {
        let mut db = db();
        let catalog = get_catalog(&mut db).unwrap();
        let rose = catalog.iter().find(|c| c.name == "Rose Bush").unwrap();

        let economy = EconomyStore::new(db.connection());
        economy.get_or_create_progress(1).unwrap();
        economy.add_points(1, 100).unwrap();
        drop(economy);

        let result = purchase(
            &mut db,
            1,
            &PurchaseRequest {
                collectible_type_id: rose.id,
            },
        );
        assert!(matches!(result, Err(ApiError::InsufficientPoints)));

        // Balance and collection are untouched
        let economy = EconomyStore::new(db.connection());
        assert_eq!(
            economy.get_progress(1).unwrap().unwrap().kaiblooms_points,
            100
        );
        assert!(economy.list_user_collection(1).unwrap().is_empty());
    }

    #[test]
    fn test_purchase_unknown_collectible() {
        let mut db = db();
        get_catalog(&mut db).unwrap();
        EconomyStore::new(db.connection())
            .get_or_create_progress(1)
            .unwrap();

        let result = purchase(
            &mut db,
            1,
            &PurchaseRequest {
                collectible_type_id: 999,
            },
        );
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[test]
    fn test_purchase_without_progress_row() {
        let mut db = db();
        let catalog = get_catalog(&mut db).unwrap();

        let result = purchase(
            &mut db,
            7,
            &PurchaseRequest {
                collectible_type_id: catalog[0].id,
            },
        );
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[test]
    fn test_get_user_progress_creates_lazily() {
        let db = db();
        let progress = get_user_progress(&db, 3).unwrap();
        assert_eq!(progress.kaiblooms_points, 0);
    }
}
