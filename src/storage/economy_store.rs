//! Points balance and collectibles persistence.
//!
//! The deduction is a guarded update (`WHERE kaiblooms_points >= cost`) and
//! repeat purchases upsert on the (user, type) unique constraint, so the
//! balance can never go negative and quantities never fork into duplicate
//! rows.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::storage::database::DatabaseError;
use crate::storage::parse_datetime;

/// Fixed reward granted for completing a task or recording a reflection.
pub const POINT_REWARD: i64 = 15;

/// A user's points balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    pub user_id: i64,
    pub kaiblooms_points: i64,
    pub updated_at: DateTime<Utc>,
}

/// A catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectibleType {
    pub id: i64,
    pub name: String,
    pub emoji: String,
    pub cost: i64,
    pub description: String,
}

/// An owned collectible joined with its catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedCollectible {
    pub user_collectible_id: i64,
    pub collectible_type_id: i64,
    pub name: String,
    pub emoji: String,
    pub cost: i64,
    pub description: String,
    pub quantity: i64,
    pub purchased_at: DateTime<Utc>,
}

/// The fixed catalog, inserted once when the table is empty.
const SEED_COLLECTIBLES: &[(&str, &str, i64, &str)] = &[
    ("Sprout", "\u{1F331}", 50, "A tiny green sprout."),
    ("Sunflower", "\u{1F33B}", 100, "A bright, happy sunflower."),
    ("Rose Bush", "\u{1F339}", 150, "A beautiful bush of red roses."),
    ("Bonsai Tree", "\u{1F333}", 200, "A meticulously cared-for bonsai."),
    (
        "Cherry Blossom",
        "\u{1F338}",
        250,
        "A delicate cherry blossom branch.",
    ),
];

/// Economy store for points and collectibles.
pub struct EconomyStore<'a> {
    conn: &'a Connection,
}

impl<'a> EconomyStore<'a> {
    /// Create a new economy store with the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    // ========== Points ==========

    /// Get a user's progress row, if it exists.
    pub fn get_progress(&self, user_id: i64) -> Result<Option<UserProgress>, DatabaseError> {
        let result = self.conn.query_row(
            "SELECT user_id, kaiblooms_points, updated_at FROM user_progress WHERE user_id = ?1",
            params![user_id],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        );

        match result {
            Ok((user_id, kaiblooms_points, updated_at)) => Ok(Some(UserProgress {
                user_id,
                kaiblooms_points,
                updated_at: parse_datetime(&updated_at)?,
            })),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DatabaseError::QueryFailed(e.to_string())),
        }
    }

    /// Get a user's progress row, creating a zeroed one if absent.
    pub fn get_or_create_progress(&self, user_id: i64) -> Result<UserProgress, DatabaseError> {
        if let Some(progress) = self.get_progress(user_id)? {
            return Ok(progress);
        }

        tracing::info!(user_id, "No user progress found, creating initial record");

        let now = Utc::now();
        self.conn
            .execute(
                "INSERT INTO user_progress (user_id, kaiblooms_points, updated_at)
                 VALUES (?1, 0, ?2)",
                params![user_id, now.to_rfc3339()],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(UserProgress {
            user_id,
            kaiblooms_points: 0,
            updated_at: now,
        })
    }

    /// Add points to an existing progress row.
    ///
    /// Returns the new balance, or `None` if the user has no progress row.
    /// Callers decide whether that is a hard failure or best-effort.
    pub fn add_points(&self, user_id: i64, amount: i64) -> Result<Option<i64>, DatabaseError> {
        let rows_affected = self
            .conn
            .execute(
                "UPDATE user_progress
                 SET kaiblooms_points = kaiblooms_points + ?2, updated_at = ?3
                 WHERE user_id = ?1",
                params![user_id, amount, Utc::now().to_rfc3339()],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        if rows_affected == 0 {
            return Ok(None);
        }

        let points: i64 = self
            .conn
            .query_row(
                "SELECT kaiblooms_points FROM user_progress WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(Some(points))
    }

    /// Deduct points, guarded so the balance cannot go negative.
    ///
    /// Returns `true` if the deduction applied, `false` if the balance was
    /// insufficient (or the row is missing).
    pub fn try_spend_points(&self, user_id: i64, cost: i64) -> Result<bool, DatabaseError> {
        let rows_affected = self
            .conn
            .execute(
                "UPDATE user_progress
                 SET kaiblooms_points = kaiblooms_points - ?2, updated_at = ?3
                 WHERE user_id = ?1 AND kaiblooms_points >= ?2",
                params![user_id, cost, Utc::now().to_rfc3339()],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(rows_affected > 0)
    }

    /// Reset a user's balance to zero.
    pub fn reset_points(&self, user_id: i64) -> Result<(), DatabaseError> {
        self.conn
            .execute(
                "UPDATE user_progress SET kaiblooms_points = 0, updated_at = ?2 WHERE user_id = ?1",
                params![user_id, Utc::now().to_rfc3339()],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    // ========== Catalog ==========

    /// Count catalog entries.
    pub fn count_collectible_types(&self) -> Result<usize, DatabaseError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM collectible_types", [], |row| {
                row.get(0)
            })
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(count as usize)
    }

    /// Insert the fixed seed catalog.
    pub fn seed_collectible_types(&self) -> Result<(), DatabaseError> {
        tracing::info!("Seeding collectible types");

        let mut stmt = self
            .conn
            .prepare(
                "INSERT INTO collectible_types (name, emoji, cost, description)
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        for (name, emoji, cost, description) in SEED_COLLECTIBLES {
            stmt.execute(params![name, emoji, cost, description])
                .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
        }

        Ok(())
    }

    /// List the catalog, cheapest first.
    pub fn list_collectible_types(&self) -> Result<Vec<CollectibleType>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, name, emoji, cost, description FROM collectible_types
                 ORDER BY cost ASC",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(CollectibleType {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    emoji: row.get(2)?,
                    cost: row.get(3)?,
                    description: row.get(4)?,
                })
            })
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut types = Vec::new();
        for row in rows {
            types.push(row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?);
        }

        Ok(types)
    }

    /// Get a catalog entry by id.
    pub fn get_collectible_type(
        &self,
        type_id: i64,
    ) -> Result<Option<CollectibleType>, DatabaseError> {
        let result = self.conn.query_row(
            "SELECT id, name, emoji, cost, description FROM collectible_types WHERE id = ?1",
            params![type_id],
            |row| {
                Ok(CollectibleType {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    emoji: row.get(2)?,
                    cost: row.get(3)?,
                    description: row.get(4)?,
                })
            },
        );

        match result {
            Ok(collectible) => Ok(Some(collectible)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DatabaseError::QueryFailed(e.to_string())),
        }
    }

    // ========== Collection ==========

    /// Record a purchase: first purchase inserts quantity 1, repeats
    /// increment the quantity and refresh the purchase timestamp.
    pub fn record_purchase(&self, user_id: i64, type_id: i64) -> Result<(), DatabaseError> {
        self.conn
            .execute(
                "INSERT INTO user_collectibles (user_id, collectible_type_id, quantity, purchased_at)
                 VALUES (?1, ?2, 1, ?3)
                 ON CONFLICT(user_id, collectible_type_id)
                 DO UPDATE SET quantity = quantity + 1, purchased_at = excluded.purchased_at",
                params![user_id, type_id, Utc::now().to_rfc3339()],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    /// List a user's owned collectibles, most recent purchase first.
    pub fn list_user_collection(
        &self,
        user_id: i64,
    ) -> Result<Vec<OwnedCollectible>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT uc.id, ct.id, ct.name, ct.emoji, ct.cost, ct.description,
                        uc.quantity, uc.purchased_at
                 FROM user_collectibles uc
                 INNER JOIN collectible_types ct ON ct.id = uc.collectible_type_id
                 WHERE uc.user_id = ?1
                 ORDER BY uc.purchased_at DESC",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(params![user_id], |row| {
                Ok(OwnedRow {
                    user_collectible_id: row.get(0)?,
                    collectible_type_id: row.get(1)?,
                    name: row.get(2)?,
                    emoji: row.get(3)?,
                    cost: row.get(4)?,
                    description: row.get(5)?,
                    quantity: row.get(6)?,
                    purchased_at: row.get(7)?,
                })
            })
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut owned = Vec::new();
        for row in rows {
            let row = row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
            owned.push(row.into_owned()?);
        }

        Ok(owned)
    }
}

/// Intermediate struct for reading owned collectible rows from database.
struct OwnedRow {
    user_collectible_id: i64,
    collectible_type_id: i64,
    name: String,
    emoji: String,
    cost: i64,
    description: String,
    quantity: i64,
    purchased_at: String,
}

impl OwnedRow {
    fn into_owned(self) -> Result<OwnedCollectible, DatabaseError> {
        Ok(OwnedCollectible {
            user_collectible_id: self.user_collectible_id,
            collectible_type_id: self.collectible_type_id,
            name: self.name,
            emoji: self.emoji,
            cost: self.cost,
            description: self.description,
            quantity: self.quantity,
            purchased_at: parse_datetime(&self.purchased_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;

    #[test]
    fn test_lazy_progress_creation() {
        let db = Database::open_in_memory().unwrap();
        let store = EconomyStore::new(db.connection());

        assert!(store.get_progress(1).unwrap().is_none());
        let progress = store.get_or_create_progress(1).unwrap();
        assert_eq!(progress.kaiblooms_points, 0);
        assert!(store.get_progress(1).unwrap().is_some());
    }

    #[test]
    fn test_add_points_requires_existing_row() {
        let db = Database::open_in_memory().unwrap();
        let store = EconomyStore::new(db.connection());

        assert_eq!(store.add_points(1, POINT_REWARD).unwrap(), None);

        store.get_or_create_progress(1).unwrap();
        assert_eq!(store.add_points(1, POINT_REWARD).unwrap(), Some(15));
        assert_eq!(store.add_points(1, POINT_REWARD).unwrap(), Some(30));
    }

    #[test]
    fn test_guarded_spend_never_goes_negative() {
        let db = Database::open_in_memory().unwrap();
        let store = EconomyStore::new(db.connection());

        store.get_or_create_progress(1).unwrap();
        store.add_points(1, 100).unwrap();

        assert!(!store.try_spend_points(1, 150).unwrap());
        assert_eq!(store.get_progress(1).unwrap().unwrap().kaiblooms_points, 100);

        assert!(store.try_spend_points(1, 100).unwrap());
        assert_eq!(store.get_progress(1).unwrap().unwrap().kaiblooms_points, 0);
    }

    #[test]
    fn test_seed_catalog_ordered_by_cost() {
        let db = Database::open_in_memory().unwrap();
        let store = EconomyStore::new(db.connection());

        assert_eq!(store.count_collectible_types().unwrap(), 0);
        store.seed_collectible_types().unwrap();

        let catalog = store.list_collectible_types().unwrap();
        assert_eq!(catalog.len(), 5);
        assert_eq!(catalog[0].name, "Sprout");
        assert_eq!(catalog[0].cost, 50);
        assert_eq!(catalog[4].name, "Cherry Blossom");
        assert!(catalog.windows(2).all(|w| w[0].cost <= w[1].cost));
    }

    #[test]
    fn test_repeat_purchase_increments_quantity() {
        let db = Database::open_in_memory().unwrap();
        let store = EconomyStore::new(db.connection());

        store.seed_collectible_types().unwrap();
        let sprout = store.list_collectible_types().unwrap()[0].clone();

        store.record_purchase(1, sprout.id).unwrap();
        store.record_purchase(1, sprout.id).unwrap();

        let collection = store.list_user_collection(1).unwrap();
        assert_eq!(collection.len(), 1);
        assert_eq!(collection[0].quantity, 2);
        assert_eq!(collection[0].name, "Sprout");
    }
}
