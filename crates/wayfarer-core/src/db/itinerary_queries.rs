//! Itinerary item operations within a travel plan.

use jiff::Timestamp;
use log::debug;
use rusqlite::{params, OptionalExtension, Row};

use crate::{
    db::utils::{id_column, optional_timestamp_column, timestamp_column},
    error::{DatabaseResultExt, Result, StoreError},
    models::ItineraryItem,
    params::{NewItineraryItem, UpdateItineraryItem},
};

const ITEM_COLUMNS: &str = "id, travel_plan_id, place_id, day_number, sequence, title, \
     description, start_time, end_time, estimated_cost, notes, created_at, updated_at";

const INSERT_ITEM_SQL: &str = "INSERT INTO itinerary_items (travel_plan_id, place_id, \
     day_number, sequence, title, description, start_time, end_time, estimated_cost, notes, \
     created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)";
const CHECK_PLAN_EXISTS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM travel_plans WHERE id = ?1)";
const UPDATE_ITEM_SQL: &str = "UPDATE itinerary_items SET \
     place_id = COALESCE(?1, place_id), \
     day_number = COALESCE(?2, day_number), \
     sequence = COALESCE(?3, sequence), \
     title = COALESCE(?4, title), \
     description = COALESCE(?5, description), \
     start_time = COALESCE(?6, start_time), \
     end_time = COALESCE(?7, end_time), \
     estimated_cost = COALESCE(?8, estimated_cost), \
     notes = COALESCE(?9, notes), \
     updated_at = ?10 \
     WHERE id = ?11";
const SELECT_ITEM_PLAN_SQL: &str = "SELECT travel_plan_id FROM itinerary_items WHERE id = ?1";
const DELETE_ITEM_SQL: &str = "DELETE FROM itinerary_items WHERE id = ?1";
const DELETE_ITEMS_BY_PLAN_SQL: &str = "DELETE FROM itinerary_items WHERE travel_plan_id = ?1";
const TOUCH_PLAN_SQL: &str = "UPDATE travel_plans SET version = version + 1, \
     updated_at = ?1 WHERE id = ?2";

fn item_from_row(row: &Row<'_>) -> rusqlite::Result<ItineraryItem> {
    Ok(ItineraryItem {
        id: id_column(row, 0)?,
        travel_plan_id: id_column(row, 1)?,
        place_id: row.get::<_, Option<i64>>(2)?.map(|id| id as u64),
        day_number: row.get(3)?,
        sequence: row.get(4)?,
        title: row.get(5)?,
        description: row.get(6)?,
        start_time: optional_timestamp_column(row, 7)?,
        end_time: optional_timestamp_column(row, 8)?,
        estimated_cost: row.get(9)?,
        notes: row.get(10)?,
        created_at: timestamp_column(row, 11)?,
        updated_at: timestamp_column(row, 12)?,
    })
}

impl super::Database {
    /// Adds an itinerary item to a plan and touches the plan's audit fields.
    ///
    /// The plan must exist, and the (day_number, sequence) slot must be free
    /// within it. A referenced place that does not exist fails the insert
    /// with a constraint violation.
    pub fn add_item(&mut self, new_item: &NewItineraryItem) -> Result<ItineraryItem> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let plan_exists: bool = tx
            .query_row(
                CHECK_PLAN_EXISTS_SQL,
                params![new_item.travel_plan_id as i64],
                |row| row.get(0),
            )
            .map_err(|e| StoreError::database_error("Failed to check plan existence", e))?;
        if !plan_exists {
            return Err(StoreError::NotFound {
                entity: "travel_plan",
                id: new_item.travel_plan_id,
            });
        }

        let now = Timestamp::now();
        let now_str = now.to_string();

        tx.execute(
            INSERT_ITEM_SQL,
            params![
                new_item.travel_plan_id as i64,
                new_item.place_id.map(|id| id as i64),
                new_item.day_number,
                new_item.sequence,
                new_item.title,
                new_item.description,
                new_item.start_time.map(|t| t.to_string()),
                new_item.end_time.map(|t| t.to_string()),
                new_item.estimated_cost,
                new_item.notes,
                &now_str,
                &now_str
            ],
        )
        .map_err(|e| StoreError::from_sqlite("Failed to insert itinerary item", e))?;

        let id = tx.last_insert_rowid() as u64;

        tx.execute(TOUCH_PLAN_SQL, params![&now_str, new_item.travel_plan_id as i64])
            .map_err(|e| StoreError::database_error("Failed to touch plan", e))?;

        tx.commit().db_context("Failed to commit transaction")?;

        debug!(
            "Added itinerary item {id} to plan {} (day {}, seq {})",
            new_item.travel_plan_id, new_item.day_number, new_item.sequence
        );

        Ok(ItineraryItem {
            id,
            travel_plan_id: new_item.travel_plan_id,
            place_id: new_item.place_id,
            day_number: new_item.day_number,
            sequence: new_item.sequence,
            title: new_item.title.clone(),
            description: new_item.description.clone(),
            start_time: new_item.start_time,
            end_time: new_item.end_time,
            estimated_cost: new_item.estimated_cost,
            notes: new_item.notes.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Retrieves one itinerary item by ID.
    pub fn get_item(&self, id: u64) -> Result<Option<ItineraryItem>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM itinerary_items WHERE id = ?1");
        self.connection
            .query_row(&sql, params![id as i64], item_from_row)
            .optional()
            .map_err(|e| StoreError::database_error("Failed to query itinerary item", e))
    }

    /// Lists a plan's itinerary in (day_number, sequence) order, regardless
    /// of insertion order.
    pub fn get_items_for_plan(&self, plan_id: u64) -> Result<Vec<ItineraryItem>> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM itinerary_items \
             WHERE travel_plan_id = ?1 ORDER BY day_number, sequence"
        );
        let mut stmt = self
            .connection
            .prepare(&sql)
            .map_err(|e| StoreError::database_error("Failed to prepare itinerary query", e))?;

        let items: Vec<ItineraryItem> = stmt
            .query_map(params![plan_id as i64], item_from_row)
            .map_err(|e| StoreError::database_error("Failed to query itinerary items", e))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| StoreError::database_error("Failed to fetch itinerary items", e))?;

        Ok(items)
    }

    /// Applies a partial update to an itinerary item and touches the owning
    /// plan.
    ///
    /// Moving the item to an occupied (day_number, sequence) slot fails with
    /// a constraint violation.
    pub fn update_item(&mut self, update: &UpdateItineraryItem) -> Result<ItineraryItem> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let plan_id: Option<i64> = tx
            .query_row(SELECT_ITEM_PLAN_SQL, params![update.id as i64], |row| row.get(0))
            .optional()
            .map_err(|e| StoreError::database_error("Failed to query itinerary item", e))?;
        let Some(plan_id) = plan_id else {
            return Err(StoreError::NotFound {
                entity: "itinerary_item",
                id: update.id,
            });
        };

        let now = Timestamp::now().to_string();
        tx.execute(
            UPDATE_ITEM_SQL,
            params![
                update.place_id.map(|id| id as i64),
                update.day_number,
                update.sequence,
                update.title,
                update.description,
                update.start_time.map(|t| t.to_string()),
                update.end_time.map(|t| t.to_string()),
                update.estimated_cost,
                update.notes,
                &now,
                update.id as i64
            ],
        )
        .map_err(|e| StoreError::from_sqlite("Failed to update itinerary item", e))?;

        tx.execute(TOUCH_PLAN_SQL, params![&now, plan_id])
            .map_err(|e| StoreError::database_error("Failed to touch plan", e))?;

        tx.commit().db_context("Failed to commit transaction")?;

        debug!("Updated itinerary item {}", update.id);
        self.get_item(update.id)?.ok_or(StoreError::NotFound {
            entity: "itinerary_item",
            id: update.id,
        })
    }

    /// Removes one itinerary item, leaving its siblings and their ordering
    /// untouched.
    pub fn remove_item(&mut self, id: u64) -> Result<()> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let plan_id: Option<i64> = tx
            .query_row(SELECT_ITEM_PLAN_SQL, params![id as i64], |row| row.get(0))
            .optional()
            .map_err(|e| StoreError::database_error("Failed to query itinerary item", e))?;
        let Some(plan_id) = plan_id else {
            return Err(StoreError::NotFound {
                entity: "itinerary_item",
                id,
            });
        };

        let now = Timestamp::now().to_string();
        tx.execute(DELETE_ITEM_SQL, params![id as i64])
            .map_err(|e| StoreError::database_error("Failed to delete itinerary item", e))?;

        tx.execute(TOUCH_PLAN_SQL, params![&now, plan_id])
            .map_err(|e| StoreError::database_error("Failed to touch plan", e))?;

        tx.commit().db_context("Failed to commit transaction")?;

        debug!("Removed itinerary item {id} from plan {plan_id}");
        Ok(())
    }

    /// Bulk-deletes every item of a plan.
    ///
    /// Idempotent: returns the number of rows removed, zero included, and
    /// never errors on a missing or already-empty plan.
    pub fn delete_items_by_plan(&mut self, plan_id: u64) -> Result<usize> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let rows = tx
            .execute(DELETE_ITEMS_BY_PLAN_SQL, params![plan_id as i64])
            .map_err(|e| StoreError::database_error("Failed to delete itinerary items", e))?;

        if rows > 0 {
            tx.execute(TOUCH_PLAN_SQL, params![Timestamp::now().to_string(), plan_id as i64])
                .map_err(|e| StoreError::database_error("Failed to touch plan", e))?;
        }

        tx.commit().db_context("Failed to commit transaction")?;

        debug!("Deleted {rows} itinerary items from plan {plan_id}");
        Ok(rows)
    }
}
