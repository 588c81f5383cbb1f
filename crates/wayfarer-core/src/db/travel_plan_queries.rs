//! Travel plan CRUD operations, discovery queries, and cascade deletion.

use std::collections::{BTreeMap, BTreeSet};

use jiff::civil::Date;
use jiff::Timestamp;
use log::{debug, info};
use rusqlite::{params, types::Type, OptionalExtension, Row};

use crate::{
    db::utils::{date_column, escape_like, id_column, order_clause, timestamp_column},
    error::{DatabaseResultExt, Result, StoreError},
    models::{Page, PageRequest, PlanStatus, TravelPlan},
    params::{NewTravelPlan, UpdateTravelPlan},
};

const PLAN_COLUMNS: &str =
    "tp.id, tp.user_id, tp.title, tp.description, tp.destination, tp.start_date, tp.end_date, \
     tp.number_of_people, tp.budget, tp.status, tp.is_public, tp.is_ai_generated, \
     tp.cover_image_url, tp.view_count, tp.like_count, tp.share_count, tp.save_count, \
     tp.is_deleted, tp.version, tp.created_at, tp.updated_at";

const INSERT_PLAN_SQL: &str = "INSERT INTO travel_plans (user_id, title, description, \
     destination, start_date, end_date, number_of_people, budget, status, is_public, \
     is_ai_generated, cover_image_url, created_at, updated_at) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)";
const CHECK_PLAN_EXISTS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM travel_plans WHERE id = ?1)";
const CHECK_USER_EXISTS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)";
const UPDATE_PLAN_SQL: &str = "UPDATE travel_plans SET \
     title = COALESCE(?1, title), \
     description = COALESCE(?2, description), \
     destination = COALESCE(?3, destination), \
     start_date = COALESCE(?4, start_date), \
     end_date = COALESCE(?5, end_date), \
     number_of_people = COALESCE(?6, number_of_people), \
     budget = COALESCE(?7, budget), \
     status = COALESCE(?8, status), \
     is_public = COALESCE(?9, is_public), \
     cover_image_url = COALESCE(?10, cover_image_url), \
     version = version + 1, \
     updated_at = ?11 \
     WHERE id = ?12 AND version = ?13";
const BUMP_PLAN_VERSION_SQL: &str = "UPDATE travel_plans SET version = version + 1, \
     updated_at = ?1 WHERE id = ?2 AND version = ?3";
const TOUCH_PLAN_SQL: &str = "UPDATE travel_plans SET version = version + 1, \
     updated_at = ?1 WHERE id = ?2";
const SOFT_DELETE_PLAN_SQL: &str = "UPDATE travel_plans SET is_deleted = 1, deleted_at = ?1, \
     version = version + 1, updated_at = ?1 WHERE id = ?2";
const RECORD_PLAN_VIEW_SQL: &str = "UPDATE travel_plans SET view_count = view_count + 1, \
     version = version + 1, updated_at = ?1 WHERE id = ?2";
const RECORD_PLAN_LIKE_SQL: &str = "UPDATE travel_plans SET like_count = like_count + 1, \
     version = version + 1, updated_at = ?1 WHERE id = ?2";
const RECORD_PLAN_SHARE_SQL: &str = "UPDATE travel_plans SET share_count = share_count + 1, \
     version = version + 1, updated_at = ?1 WHERE id = ?2";
const INSERT_COLLABORATOR_SQL: &str = "INSERT INTO travel_plan_collaborators \
     (travel_plan_id, user_id, created_at) VALUES (?1, ?2, ?3)";
const DELETE_COLLABORATOR_SQL: &str =
    "DELETE FROM travel_plan_collaborators WHERE travel_plan_id = ?1 AND user_id = ?2";

/// Sortable fields for paged plan queries.
const PLAN_SORT_FIELDS: &[(&str, &str)] = &[
    ("id", "tp.id"),
    ("title", "tp.title"),
    ("start_date", "tp.start_date"),
    ("created_at", "tp.created_at"),
    ("view_count", "tp.view_count"),
    ("like_count", "tp.like_count"),
    ("save_count", "tp.save_count"),
];

fn plan_from_row(row: &Row<'_>) -> rusqlite::Result<TravelPlan> {
    let status_str: String = row.get(9)?;
    let status = status_str.parse::<PlanStatus>().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            9,
            Type::Text,
            Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Invalid plan status: {status_str}"),
            )),
        )
    })?;

    Ok(TravelPlan {
        id: id_column(row, 0)?,
        user_id: id_column(row, 1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        destination: row.get(4)?,
        start_date: date_column(row, 5)?,
        end_date: date_column(row, 6)?,
        number_of_people: row.get(7)?,
        budget: row.get(8)?,
        status,
        is_public: row.get(10)?,
        is_ai_generated: row.get(11)?,
        is_deleted: row.get(17)?,
        cover_image_url: row.get(12)?,
        preferences: BTreeMap::new(),
        tags: BTreeSet::new(),
        collaborator_ids: Vec::new(),
        view_count: row.get(13)?,
        like_count: row.get(14)?,
        share_count: row.get(15)?,
        save_count: row.get(16)?,
        version: row.get(18)?,
        created_at: timestamp_column(row, 19)?,
        updated_at: timestamp_column(row, 20)?,
        itinerary: Vec::new(),
    })
}

fn insert_plan_tag_rows(
    tx: &rusqlite::Connection,
    plan_id: u64,
    tags: &BTreeSet<String>,
) -> Result<()> {
    for tag in tags {
        tx.execute(
            "INSERT INTO travel_plan_tags (travel_plan_id, tag) VALUES (?1, ?2)",
            params![plan_id as i64, tag],
        )
        .map_err(|e| StoreError::from_sqlite("Failed to insert plan tag", e))?;
    }
    Ok(())
}

fn insert_plan_preference_rows(
    tx: &rusqlite::Connection,
    plan_id: u64,
    preferences: &BTreeMap<String, String>,
) -> Result<()> {
    for (key, value) in preferences {
        tx.execute(
            "INSERT INTO travel_plan_preferences (travel_plan_id, preference_key, \
             preference_value) VALUES (?1, ?2, ?3)",
            params![plan_id as i64, key, value],
        )
        .map_err(|e| StoreError::from_sqlite("Failed to insert plan preference", e))?;
    }
    Ok(())
}

impl super::Database {
    /// Creates a new travel plan with its tags and preferences.
    ///
    /// The owning user must exist; the date range is stored as given.
    pub fn create_travel_plan(&mut self, new_plan: &NewTravelPlan) -> Result<TravelPlan> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let user_exists: bool = tx
            .query_row(CHECK_USER_EXISTS_SQL, params![new_plan.user_id as i64], |row| {
                row.get(0)
            })
            .map_err(|e| StoreError::database_error("Failed to check user existence", e))?;
        if !user_exists {
            return Err(StoreError::NotFound {
                entity: "user",
                id: new_plan.user_id,
            });
        }

        let now = Timestamp::now();
        let now_str = now.to_string();

        tx.execute(
            INSERT_PLAN_SQL,
            params![
                new_plan.user_id as i64,
                new_plan.title,
                new_plan.description,
                new_plan.destination,
                new_plan.start_date.to_string(),
                new_plan.end_date.to_string(),
                new_plan.number_of_people,
                new_plan.budget,
                new_plan.status.as_str(),
                new_plan.is_public,
                new_plan.is_ai_generated,
                new_plan.cover_image_url,
                &now_str,
                &now_str
            ],
        )
        .map_err(|e| StoreError::from_sqlite("Failed to insert travel plan", e))?;

        let id = tx.last_insert_rowid() as u64;

        insert_plan_tag_rows(&tx, id, &new_plan.tags)?;
        insert_plan_preference_rows(&tx, id, &new_plan.preferences)?;

        tx.commit().db_context("Failed to commit transaction")?;

        debug!("Created travel plan {id} ({})", new_plan.title);

        Ok(TravelPlan {
            id,
            user_id: new_plan.user_id,
            title: new_plan.title.clone(),
            description: new_plan.description.clone(),
            destination: new_plan.destination.clone(),
            start_date: new_plan.start_date,
            end_date: new_plan.end_date,
            number_of_people: new_plan.number_of_people,
            budget: new_plan.budget,
            status: new_plan.status,
            is_public: new_plan.is_public,
            is_ai_generated: new_plan.is_ai_generated,
            is_deleted: false,
            cover_image_url: new_plan.cover_image_url.clone(),
            preferences: new_plan.preferences.clone(),
            tags: new_plan.tags.clone(),
            collaborator_ids: Vec::new(),
            view_count: 0,
            like_count: 0,
            share_count: 0,
            save_count: 0,
            version: 0,
            created_at: now,
            updated_at: now,
            itinerary: Vec::new(),
        })
    }

    /// Retrieves a travel plan by ID with its itinerary, tags, preferences,
    /// and collaborators eagerly loaded. Soft-deleted plans are returned too.
    pub fn get_travel_plan(&self, id: u64) -> Result<Option<TravelPlan>> {
        let sql = format!("SELECT {PLAN_COLUMNS} FROM travel_plans tp WHERE tp.id = ?1");
        let plan = self
            .connection
            .query_row(&sql, params![id as i64], plan_from_row)
            .optional()
            .map_err(|e| StoreError::database_error("Failed to query travel plan", e))?;

        match plan {
            Some(plan) => Ok(Some(self.attach_plan_children(plan)?)),
            None => Ok(None),
        }
    }

    /// Lists a user's non-deleted plans.
    pub fn find_plans_by_user(&self, user_id: u64, request: &PageRequest) -> Result<Page<TravelPlan>> {
        let order = order_clause(request.sort.as_ref(), PLAN_SORT_FIELDS, "tp.id ASC")?;
        self.page_of_plans(
            "travel_plans tp WHERE tp.is_deleted = 0 AND tp.user_id = ?",
            vec![Box::new(user_id as i64) as Box<dyn rusqlite::ToSql>],
            &order,
            request,
        )
    }

    /// Lists a user's non-deleted plans in the given lifecycle status.
    pub fn find_plans_by_user_and_status(
        &self,
        user_id: u64,
        status: PlanStatus,
        request: &PageRequest,
    ) -> Result<Page<TravelPlan>> {
        let order = order_clause(request.sort.as_ref(), PLAN_SORT_FIELDS, "tp.id ASC")?;
        self.page_of_plans(
            "travel_plans tp WHERE tp.is_deleted = 0 AND tp.user_id = ? AND tp.status = ?",
            vec![
                Box::new(user_id as i64) as Box<dyn rusqlite::ToSql>,
                Box::new(status.as_str().to_string()),
            ],
            &order,
            request,
        )
    }

    /// Lists public, non-deleted plans.
    pub fn find_public_plans(&self, request: &PageRequest) -> Result<Page<TravelPlan>> {
        let order = order_clause(request.sort.as_ref(), PLAN_SORT_FIELDS, "tp.id ASC")?;
        self.page_of_plans(
            "travel_plans tp WHERE tp.is_deleted = 0 AND tp.is_public = 1",
            Vec::new(),
            &order,
            request,
        )
    }

    /// Searches public, non-deleted plans by title, destination, or
    /// description substring. LIKE wildcards in the query text match
    /// literally.
    pub fn search_public_plans(
        &self,
        query: &str,
        request: &PageRequest,
    ) -> Result<Page<TravelPlan>> {
        let pattern = format!("%{}%", escape_like(query));
        let order = order_clause(request.sort.as_ref(), PLAN_SORT_FIELDS, "tp.id ASC")?;
        self.page_of_plans(
            "travel_plans tp WHERE tp.is_deleted = 0 AND tp.is_public = 1 \
             AND (lower(tp.title) LIKE lower(?) ESCAPE '\\' \
             OR lower(tp.destination) LIKE lower(?) ESCAPE '\\' \
             OR lower(tp.description) LIKE lower(?) ESCAPE '\\')",
            vec![
                Box::new(pattern.clone()) as Box<dyn rusqlite::ToSql>,
                Box::new(pattern.clone()),
                Box::new(pattern),
            ],
            &order,
            request,
        )
    }

    /// Lists non-deleted plans for the same destination whose closed date
    /// interval intersects `[start, end]`, across all users.
    pub fn find_similar_plans(
        &self,
        destination: &str,
        start: Date,
        end: Date,
        request: &PageRequest,
    ) -> Result<Page<TravelPlan>> {
        let order = order_clause(request.sort.as_ref(), PLAN_SORT_FIELDS, "tp.id ASC")?;
        self.page_of_plans(
            "travel_plans tp WHERE tp.is_deleted = 0 AND tp.destination = ? \
             AND tp.start_date <= ? AND tp.end_date >= ?",
            vec![
                Box::new(destination.to_string()) as Box<dyn rusqlite::ToSql>,
                Box::new(end.to_string()),
                Box::new(start.to_string()),
            ],
            &order,
            request,
        )
    }

    /// Lists a user's non-deleted plans whose closed date interval intersects
    /// `[start, end]`. An interval that engulfs the queried range counts as
    /// overlapping.
    pub fn find_overlapping_plans(
        &self,
        user_id: u64,
        start: Date,
        end: Date,
    ) -> Result<Vec<TravelPlan>> {
        let sql = format!(
            "SELECT {PLAN_COLUMNS} FROM travel_plans tp \
             WHERE tp.is_deleted = 0 AND tp.user_id = ?1 \
             AND tp.start_date <= ?2 AND tp.end_date >= ?3 \
             ORDER BY tp.start_date ASC, tp.id ASC"
        );
        let mut stmt = self
            .connection
            .prepare(&sql)
            .map_err(|e| StoreError::database_error("Failed to prepare plan query", e))?;

        let plans: Vec<TravelPlan> = stmt
            .query_map(
                params![user_id as i64, end.to_string(), start.to_string()],
                plan_from_row,
            )
            .map_err(|e| StoreError::database_error("Failed to query overlapping plans", e))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| StoreError::database_error("Failed to fetch overlapping plans", e))?;

        plans
            .into_iter()
            .map(|plan| self.attach_plan_children(plan))
            .collect()
    }

    /// Lists public, non-deleted plans ordered by view count.
    pub fn find_popular_plans(&self, request: &PageRequest) -> Result<Page<TravelPlan>> {
        let order = order_clause(
            request.sort.as_ref(),
            PLAN_SORT_FIELDS,
            "tp.view_count DESC, tp.id ASC",
        )?;
        self.page_of_plans(
            "travel_plans tp WHERE tp.is_deleted = 0 AND tp.is_public = 1",
            Vec::new(),
            &order,
            request,
        )
    }

    /// Lists non-deleted plans on which the given user is a collaborator.
    pub fn find_collaborating_plans(
        &self,
        user_id: u64,
        request: &PageRequest,
    ) -> Result<Page<TravelPlan>> {
        let order = order_clause(request.sort.as_ref(), PLAN_SORT_FIELDS, "tp.id ASC")?;
        self.page_of_plans(
            "travel_plans tp JOIN travel_plan_collaborators c ON c.travel_plan_id = tp.id \
             WHERE c.user_id = ? AND tp.is_deleted = 0",
            vec![Box::new(user_id as i64) as Box<dyn rusqlite::ToSql>],
            &order,
            request,
        )
    }

    /// Applies a partial update to a plan's scalar fields under optimistic
    /// concurrency.
    pub fn update_travel_plan(&mut self, update: &UpdateTravelPlan) -> Result<TravelPlan> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let now = Timestamp::now().to_string();
        let rows = tx
            .execute(
                UPDATE_PLAN_SQL,
                params![
                    update.title,
                    update.description,
                    update.destination,
                    update.start_date.map(|d| d.to_string()),
                    update.end_date.map(|d| d.to_string()),
                    update.number_of_people,
                    update.budget,
                    update.status.map(|s| s.as_str()),
                    update.is_public,
                    update.cover_image_url,
                    &now,
                    update.id as i64,
                    update.expected_version
                ],
            )
            .map_err(|e| StoreError::from_sqlite("Failed to update travel plan", e))?;

        if rows == 0 {
            return Err(Self::stale_or_missing(
                &tx,
                "travel_plan",
                update.id,
                update.expected_version,
            )?);
        }

        tx.commit().db_context("Failed to commit transaction")?;

        debug!("Updated travel plan {}", update.id);
        self.get_travel_plan(update.id)?.ok_or(StoreError::NotFound {
            entity: "travel_plan",
            id: update.id,
        })
    }

    /// Replaces a plan's tag set wholesale.
    pub fn replace_plan_tags(
        &mut self,
        id: u64,
        expected_version: i64,
        tags: &BTreeSet<String>,
    ) -> Result<TravelPlan> {
        self.replace_plan_collection(id, expected_version, "travel_plan_tags", |tx| {
            insert_plan_tag_rows(tx, id, tags)
        })
    }

    /// Replaces a plan's preference map wholesale.
    pub fn replace_plan_preferences(
        &mut self,
        id: u64,
        expected_version: i64,
        preferences: &BTreeMap<String, String>,
    ) -> Result<TravelPlan> {
        self.replace_plan_collection(id, expected_version, "travel_plan_preferences", |tx| {
            insert_plan_preference_rows(tx, id, preferences)
        })
    }

    /// Replaces a plan's collaborator set wholesale.
    ///
    /// Every referenced user must exist; unknown ids fail the transaction
    /// with a constraint violation.
    pub fn replace_plan_collaborators(
        &mut self,
        id: u64,
        expected_version: i64,
        collaborator_ids: &[u64],
    ) -> Result<TravelPlan> {
        let now = Timestamp::now().to_string();
        self.replace_plan_collection(id, expected_version, "travel_plan_collaborators", |tx| {
            for user_id in collaborator_ids {
                tx.execute(
                    INSERT_COLLABORATOR_SQL,
                    params![id as i64, *user_id as i64, &now],
                )
                .map_err(|e| StoreError::from_sqlite("Failed to insert collaborator", e))?;
            }
            Ok(())
        })
    }

    fn replace_plan_collection(
        &mut self,
        id: u64,
        expected_version: i64,
        table: &str,
        insert: impl FnOnce(&rusqlite::Connection) -> Result<()>,
    ) -> Result<TravelPlan> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let rows = tx
            .execute(
                BUMP_PLAN_VERSION_SQL,
                params![Timestamp::now().to_string(), id as i64, expected_version],
            )
            .map_err(|e| StoreError::database_error("Failed to bump plan version", e))?;

        if rows == 0 {
            return Err(Self::stale_or_missing(&tx, "travel_plan", id, expected_version)?);
        }

        let delete_sql = format!("DELETE FROM {table} WHERE travel_plan_id = ?1");
        tx.execute(&delete_sql, params![id as i64])
            .map_err(|e| StoreError::database_error("Failed to clear plan collection", e))?;

        insert(&tx)?;

        tx.commit().db_context("Failed to commit transaction")?;

        debug!("Replaced {table} for travel plan {id}");
        self.get_travel_plan(id)?.ok_or(StoreError::NotFound {
            entity: "travel_plan",
            id,
        })
    }

    /// Adds one collaborator to a plan.
    ///
    /// Both the plan and the user must exist; adding the same collaborator
    /// twice fails with a constraint violation.
    pub fn add_collaborator(&mut self, plan_id: u64, user_id: u64) -> Result<()> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let plan_exists: bool = tx
            .query_row(CHECK_PLAN_EXISTS_SQL, params![plan_id as i64], |row| row.get(0))
            .map_err(|e| StoreError::database_error("Failed to check plan existence", e))?;
        if !plan_exists {
            return Err(StoreError::NotFound {
                entity: "travel_plan",
                id: plan_id,
            });
        }

        let user_exists: bool = tx
            .query_row(CHECK_USER_EXISTS_SQL, params![user_id as i64], |row| row.get(0))
            .map_err(|e| StoreError::database_error("Failed to check user existence", e))?;
        if !user_exists {
            return Err(StoreError::NotFound {
                entity: "user",
                id: user_id,
            });
        }

        let now = Timestamp::now().to_string();
        tx.execute(
            INSERT_COLLABORATOR_SQL,
            params![plan_id as i64, user_id as i64, &now],
        )
        .map_err(|e| StoreError::from_sqlite("Failed to insert collaborator", e))?;

        tx.execute(TOUCH_PLAN_SQL, params![&now, plan_id as i64])
            .map_err(|e| StoreError::database_error("Failed to touch plan", e))?;

        tx.commit().db_context("Failed to commit transaction")?;

        debug!("Added collaborator {user_id} to travel plan {plan_id}");
        Ok(())
    }

    /// Removes one collaborator from a plan. Returns whether a row existed.
    pub fn remove_collaborator(&mut self, plan_id: u64, user_id: u64) -> Result<bool> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let rows = tx
            .execute(DELETE_COLLABORATOR_SQL, params![plan_id as i64, user_id as i64])
            .map_err(|e| StoreError::database_error("Failed to delete collaborator", e))?;

        if rows > 0 {
            tx.execute(TOUCH_PLAN_SQL, params![Timestamp::now().to_string(), plan_id as i64])
                .map_err(|e| StoreError::database_error("Failed to touch plan", e))?;
        }

        tx.commit().db_context("Failed to commit transaction")?;
        Ok(rows > 0)
    }

    /// Increments a plan's view counter.
    pub fn record_plan_view(&mut self, id: u64) -> Result<()> {
        self.bump_plan_counter(RECORD_PLAN_VIEW_SQL, id)
    }

    /// Increments a plan's like counter.
    pub fn record_plan_like(&mut self, id: u64) -> Result<()> {
        self.bump_plan_counter(RECORD_PLAN_LIKE_SQL, id)
    }

    /// Increments a plan's share counter.
    pub fn record_plan_share(&mut self, id: u64) -> Result<()> {
        self.bump_plan_counter(RECORD_PLAN_SHARE_SQL, id)
    }

    fn bump_plan_counter(&mut self, sql: &str, id: u64) -> Result<()> {
        let rows = self
            .connection
            .execute(sql, params![Timestamp::now().to_string(), id as i64])
            .map_err(|e| StoreError::database_error("Failed to bump plan counter", e))?;

        if rows == 0 {
            return Err(StoreError::NotFound {
                entity: "travel_plan",
                id,
            });
        }
        Ok(())
    }

    /// Soft-deletes a travel plan: it drops out of every listing and search
    /// but keeps its rows, including the itinerary.
    pub fn soft_delete_travel_plan(&mut self, id: u64) -> Result<()> {
        let rows = self
            .connection
            .execute(
                SOFT_DELETE_PLAN_SQL,
                params![Timestamp::now().to_string(), id as i64],
            )
            .map_err(|e| StoreError::database_error("Failed to soft-delete travel plan", e))?;

        if rows == 0 {
            return Err(StoreError::NotFound {
                entity: "travel_plan",
                id,
            });
        }

        info!("Soft-deleted travel plan {id}");
        Ok(())
    }

    /// Permanently deletes a travel plan and everything hanging off it:
    /// itinerary items, bookmarks, collaborators, tags, and preferences, all
    /// in one transaction. This operation cannot be undone.
    pub fn delete_travel_plan(&mut self, id: u64) -> Result<()> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let exists: bool = tx
            .query_row(CHECK_PLAN_EXISTS_SQL, params![id as i64], |row| row.get(0))
            .map_err(|e| StoreError::database_error("Failed to check plan existence", e))?;
        if !exists {
            return Err(StoreError::NotFound {
                entity: "travel_plan",
                id,
            });
        }

        // Foreign keys cascade these already; the explicit deletes keep the
        // cascade order visible and independent of pragma state.
        for table in [
            "itinerary_items",
            "saved_plans",
            "travel_plan_collaborators",
            "travel_plan_tags",
            "travel_plan_preferences",
        ] {
            let sql = format!("DELETE FROM {table} WHERE travel_plan_id = ?1");
            tx.execute(&sql, params![id as i64])
                .map_err(|e| StoreError::database_error("Failed to delete plan children", e))?;
        }

        tx.execute("DELETE FROM travel_plans WHERE id = ?1", params![id as i64])
            .map_err(|e| StoreError::database_error("Failed to delete travel plan", e))?;

        tx.commit().db_context("Failed to commit transaction")?;

        info!("Permanently deleted travel plan {id}");
        Ok(())
    }

    fn attach_plan_children(&self, mut plan: TravelPlan) -> Result<TravelPlan> {
        plan.itinerary = self.get_items_for_plan(plan.id)?;

        let mut stmt = self
            .connection
            .prepare("SELECT tag FROM travel_plan_tags WHERE travel_plan_id = ?1")
            .map_err(|e| StoreError::database_error("Failed to prepare plan tag query", e))?;
        plan.tags = stmt
            .query_map(params![plan.id as i64], |row| row.get::<_, String>(0))
            .map_err(|e| StoreError::database_error("Failed to query plan tags", e))?
            .collect::<std::result::Result<BTreeSet<_>, _>>()
            .map_err(|e| StoreError::database_error("Failed to fetch plan tags", e))?;

        let mut stmt = self
            .connection
            .prepare(
                "SELECT preference_key, preference_value FROM travel_plan_preferences \
                 WHERE travel_plan_id = ?1",
            )
            .map_err(|e| StoreError::database_error("Failed to prepare plan preference query", e))?;
        plan.preferences = stmt
            .query_map(params![plan.id as i64], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(|e| StoreError::database_error("Failed to query plan preferences", e))?
            .collect::<std::result::Result<BTreeMap<_, _>, _>>()
            .map_err(|e| StoreError::database_error("Failed to fetch plan preferences", e))?;

        let mut stmt = self
            .connection
            .prepare(
                "SELECT user_id FROM travel_plan_collaborators \
                 WHERE travel_plan_id = ?1 ORDER BY user_id",
            )
            .map_err(|e| StoreError::database_error("Failed to prepare collaborator query", e))?;
        plan.collaborator_ids = stmt
            .query_map(params![plan.id as i64], |row| {
                Ok(row.get::<_, i64>(0)? as u64)
            })
            .map_err(|e| StoreError::database_error("Failed to query collaborators", e))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| StoreError::database_error("Failed to fetch collaborators", e))?;

        Ok(plan)
    }

    fn page_of_plans(
        &self,
        from_where: &str,
        params: Vec<Box<dyn rusqlite::ToSql>>,
        order: &str,
        request: &PageRequest,
    ) -> Result<Page<TravelPlan>> {
        let count_sql = format!("SELECT COUNT(*) FROM {from_where}");
        let count_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|b| &**b).collect();
        let total: i64 = self
            .connection
            .query_row(&count_sql, &count_refs[..], |row| row.get(0))
            .map_err(|e| StoreError::database_error("Failed to count travel plans", e))?;

        let select_sql =
            format!("SELECT {PLAN_COLUMNS} FROM {from_where} {order} LIMIT ? OFFSET ?");
        let mut stmt = self
            .connection
            .prepare(&select_sql)
            .map_err(|e| StoreError::database_error("Failed to prepare plan query", e))?;

        let mut select_params = params;
        select_params.push(Box::new(request.limit()));
        select_params.push(Box::new(request.offset()));
        let select_refs: Vec<&dyn rusqlite::ToSql> =
            select_params.iter().map(|b| &**b).collect();

        let plans: Vec<TravelPlan> = stmt
            .query_map(&select_refs[..], plan_from_row)
            .map_err(|e| StoreError::database_error("Failed to query travel plans", e))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| StoreError::database_error("Failed to fetch travel plans", e))?;

        let plans = plans
            .into_iter()
            .map(|plan| self.attach_plan_children(plan))
            .collect::<Result<Vec<_>>>()?;

        Ok(Page::new(plans, total as u64, request))
    }
}
