//! Saved-plan bookmark operations.

use jiff::Timestamp;
use log::debug;
use rusqlite::{params, OptionalExtension, Row};

use crate::{
    db::utils::{id_column, order_clause, timestamp_column},
    error::{DatabaseResultExt, Result, StoreError},
    models::{Page, PageRequest, SavedPlan},
};

const SAVED_PLAN_COLUMNS: &str = "s.id, s.user_id, s.travel_plan_id, s.created_at, s.updated_at";

const INSERT_SAVED_PLAN_SQL: &str = "INSERT INTO saved_plans (user_id, travel_plan_id, \
     created_at, updated_at) VALUES (?1, ?2, ?3, ?4)";
const CHECK_USER_EXISTS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)";
const CHECK_PLAN_EXISTS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM travel_plans WHERE id = ?1)";
const SAVED_PLAN_EXISTS_SQL: &str =
    "SELECT EXISTS(SELECT 1 FROM saved_plans WHERE user_id = ?1 AND travel_plan_id = ?2)";
const DELETE_SAVED_PLAN_SQL: &str =
    "DELETE FROM saved_plans WHERE user_id = ?1 AND travel_plan_id = ?2";
const INCREMENT_SAVE_COUNT_SQL: &str = "UPDATE travel_plans SET save_count = save_count + 1, \
     version = version + 1, updated_at = ?1 WHERE id = ?2";
const DECREMENT_SAVE_COUNT_SQL: &str = "UPDATE travel_plans SET \
     save_count = MAX(save_count - 1, 0), version = version + 1, updated_at = ?1 WHERE id = ?2";

/// Sortable fields for paged bookmark queries.
const SAVED_PLAN_SORT_FIELDS: &[(&str, &str)] =
    &[("id", "s.id"), ("created_at", "s.created_at")];

fn saved_plan_from_row(row: &Row<'_>) -> rusqlite::Result<SavedPlan> {
    Ok(SavedPlan {
        id: id_column(row, 0)?,
        user_id: id_column(row, 1)?,
        travel_plan_id: id_column(row, 2)?,
        created_at: timestamp_column(row, 3)?,
        updated_at: timestamp_column(row, 4)?,
    })
}

impl super::Database {
    /// Bookmarks a plan for a user and bumps the plan's save counter, both
    /// in one transaction.
    ///
    /// Both rows must exist; saving the same plan twice fails with a
    /// constraint violation and leaves the counter untouched.
    pub fn save_plan(&mut self, user_id: u64, travel_plan_id: u64) -> Result<SavedPlan> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let user_exists: bool = tx
            .query_row(CHECK_USER_EXISTS_SQL, params![user_id as i64], |row| row.get(0))
            .map_err(|e| StoreError::database_error("Failed to check user existence", e))?;
        if !user_exists {
            return Err(StoreError::NotFound {
                entity: "user",
                id: user_id,
            });
        }

        let plan_exists: bool = tx
            .query_row(CHECK_PLAN_EXISTS_SQL, params![travel_plan_id as i64], |row| {
                row.get(0)
            })
            .map_err(|e| StoreError::database_error("Failed to check plan existence", e))?;
        if !plan_exists {
            return Err(StoreError::NotFound {
                entity: "travel_plan",
                id: travel_plan_id,
            });
        }

        let now = Timestamp::now();
        let now_str = now.to_string();

        tx.execute(
            INSERT_SAVED_PLAN_SQL,
            params![user_id as i64, travel_plan_id as i64, &now_str, &now_str],
        )
        .map_err(|e| StoreError::from_sqlite("Failed to insert saved plan", e))?;

        let id = tx.last_insert_rowid() as u64;

        tx.execute(INCREMENT_SAVE_COUNT_SQL, params![&now_str, travel_plan_id as i64])
            .map_err(|e| StoreError::database_error("Failed to increment save count", e))?;

        tx.commit().db_context("Failed to commit transaction")?;

        debug!("User {user_id} saved travel plan {travel_plan_id}");

        Ok(SavedPlan {
            id,
            user_id,
            travel_plan_id,
            created_at: now,
            updated_at: now,
        })
    }

    /// Whether the user has this plan bookmarked.
    pub fn saved_plan_exists(&self, user_id: u64, travel_plan_id: u64) -> Result<bool> {
        self.connection
            .query_row(
                SAVED_PLAN_EXISTS_SQL,
                params![user_id as i64, travel_plan_id as i64],
                |row| row.get(0),
            )
            .map_err(|e| StoreError::database_error("Failed to check saved plan existence", e))
    }

    /// Retrieves the bookmark row for a (user, plan) pair, if any.
    pub fn find_saved_plan(&self, user_id: u64, travel_plan_id: u64) -> Result<Option<SavedPlan>> {
        let sql = format!(
            "SELECT {SAVED_PLAN_COLUMNS} FROM saved_plans s \
             WHERE s.user_id = ?1 AND s.travel_plan_id = ?2"
        );
        self.connection
            .query_row(&sql, params![user_id as i64, travel_plan_id as i64], saved_plan_from_row)
            .optional()
            .map_err(|e| StoreError::database_error("Failed to query saved plan", e))
    }

    /// Lists a user's bookmarks.
    pub fn find_saved_plans_by_user(
        &self,
        user_id: u64,
        request: &PageRequest,
    ) -> Result<Page<SavedPlan>> {
        let order = order_clause(request.sort.as_ref(), SAVED_PLAN_SORT_FIELDS, "s.id ASC")?;

        let count: i64 = self
            .connection
            .query_row(
                "SELECT COUNT(*) FROM saved_plans WHERE user_id = ?1",
                params![user_id as i64],
                |row| row.get(0),
            )
            .map_err(|e| StoreError::database_error("Failed to count saved plans", e))?;

        let sql = format!(
            "SELECT {SAVED_PLAN_COLUMNS} FROM saved_plans s \
             WHERE s.user_id = ?1 {order} LIMIT ?2 OFFSET ?3"
        );
        let mut stmt = self
            .connection
            .prepare(&sql)
            .map_err(|e| StoreError::database_error("Failed to prepare saved plan query", e))?;

        let saved: Vec<SavedPlan> = stmt
            .query_map(
                params![user_id as i64, request.limit(), request.offset()],
                saved_plan_from_row,
            )
            .map_err(|e| StoreError::database_error("Failed to query saved plans", e))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| StoreError::database_error("Failed to fetch saved plans", e))?;

        Ok(Page::new(saved, count as u64, request))
    }

    /// Removes a bookmark and decrements the plan's save counter, which
    /// never drops below zero. Returns whether a bookmark existed.
    pub fn unsave_plan(&mut self, user_id: u64, travel_plan_id: u64) -> Result<bool> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let rows = tx
            .execute(DELETE_SAVED_PLAN_SQL, params![user_id as i64, travel_plan_id as i64])
            .map_err(|e| StoreError::database_error("Failed to delete saved plan", e))?;

        if rows > 0 {
            tx.execute(
                DECREMENT_SAVE_COUNT_SQL,
                params![Timestamp::now().to_string(), travel_plan_id as i64],
            )
            .map_err(|e| StoreError::database_error("Failed to decrement save count", e))?;
        }

        tx.commit().db_context("Failed to commit transaction")?;

        if rows > 0 {
            debug!("User {user_id} unsaved travel plan {travel_plan_id}");
        }
        Ok(rows > 0)
    }
}
