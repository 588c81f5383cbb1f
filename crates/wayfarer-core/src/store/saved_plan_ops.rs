//! Saved-plan bookmark operations for the Store.

use tokio::task;

use super::Store;
use crate::{
    db::Database,
    error::{Result, StoreError},
    models::{Page, PageRequest, SavedPlan},
};

impl Store {
    /// Bookmarks a plan for a user and bumps the plan's save counter.
    pub async fn save_plan(&self, user_id: u64, travel_plan_id: u64) -> Result<SavedPlan> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.save_plan(user_id, travel_plan_id)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Whether the user has this plan bookmarked.
    pub async fn saved_plan_exists(&self, user_id: u64, travel_plan_id: u64) -> Result<bool> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.saved_plan_exists(user_id, travel_plan_id)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Retrieves the bookmark row for a (user, plan) pair, if any.
    pub async fn find_saved_plan(
        &self,
        user_id: u64,
        travel_plan_id: u64,
    ) -> Result<Option<SavedPlan>> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.find_saved_plan(user_id, travel_plan_id)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Lists a user's bookmarks.
    pub async fn find_saved_plans_by_user(
        &self,
        user_id: u64,
        request: PageRequest,
    ) -> Result<Page<SavedPlan>> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.find_saved_plans_by_user(user_id, &request)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Removes a bookmark and decrements the plan's save counter. Returns
    /// whether a bookmark existed.
    pub async fn unsave_plan(&self, user_id: u64, travel_plan_id: u64) -> Result<bool> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.unsave_plan(user_id, travel_plan_id)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }
}
