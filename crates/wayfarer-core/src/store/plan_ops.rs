//! Travel plan operations for the Store.

use std::collections::{BTreeMap, BTreeSet};

use jiff::civil::Date;
use tokio::task;

use super::Store;
use crate::{
    db::Database,
    error::{Result, StoreError},
    models::{Page, PageRequest, PlanStatus, TravelPlan},
    params::{NewTravelPlan, UpdateTravelPlan},
};

impl Store {
    /// Creates a new travel plan for an existing user.
    pub async fn create_travel_plan(&self, params: &NewTravelPlan) -> Result<TravelPlan> {
        let db_path = self.db_path.clone();
        let params = params.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.create_travel_plan(&params)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Retrieves a travel plan by ID with its itinerary and collections
    /// eagerly loaded.
    pub async fn get_travel_plan(&self, id: u64) -> Result<Option<TravelPlan>> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.get_travel_plan(id)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Lists a user's non-deleted plans.
    pub async fn find_plans_by_user(
        &self,
        user_id: u64,
        request: PageRequest,
    ) -> Result<Page<TravelPlan>> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.find_plans_by_user(user_id, &request)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Lists a user's non-deleted plans in the given lifecycle status.
    pub async fn find_plans_by_user_and_status(
        &self,
        user_id: u64,
        status: PlanStatus,
        request: PageRequest,
    ) -> Result<Page<TravelPlan>> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.find_plans_by_user_and_status(user_id, status, &request)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Lists public, non-deleted plans.
    pub async fn find_public_plans(&self, request: PageRequest) -> Result<Page<TravelPlan>> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.find_public_plans(&request)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Searches public plans by title or destination substring.
    pub async fn search_public_plans(
        &self,
        query: &str,
        request: PageRequest,
    ) -> Result<Page<TravelPlan>> {
        let db_path = self.db_path.clone();
        let query = query.to_string();

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.search_public_plans(&query, &request)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Lists plans for the same destination whose date interval intersects
    /// `[start, end]`, across all users.
    pub async fn find_similar_plans(
        &self,
        destination: &str,
        start: Date,
        end: Date,
        request: PageRequest,
    ) -> Result<Page<TravelPlan>> {
        let db_path = self.db_path.clone();
        let destination = destination.to_string();

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.find_similar_plans(&destination, start, end, &request)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Lists a user's plans whose closed date interval intersects
    /// `[start, end]`.
    pub async fn find_overlapping_plans(
        &self,
        user_id: u64,
        start: Date,
        end: Date,
    ) -> Result<Vec<TravelPlan>> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.find_overlapping_plans(user_id, start, end)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Lists public plans ordered by view count.
    pub async fn find_popular_plans(&self, request: PageRequest) -> Result<Page<TravelPlan>> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.find_popular_plans(&request)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Lists plans on which the given user is a collaborator.
    pub async fn find_collaborating_plans(
        &self,
        user_id: u64,
        request: PageRequest,
    ) -> Result<Page<TravelPlan>> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.find_collaborating_plans(user_id, &request)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Applies a partial, version-checked update to a plan.
    pub async fn update_travel_plan(&self, params: &UpdateTravelPlan) -> Result<TravelPlan> {
        let db_path = self.db_path.clone();
        let params = params.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.update_travel_plan(&params)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Replaces a plan's tag set wholesale.
    pub async fn replace_plan_tags(
        &self,
        id: u64,
        expected_version: i64,
        tags: BTreeSet<String>,
    ) -> Result<TravelPlan> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.replace_plan_tags(id, expected_version, &tags)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Replaces a plan's preference map wholesale.
    pub async fn replace_plan_preferences(
        &self,
        id: u64,
        expected_version: i64,
        preferences: BTreeMap<String, String>,
    ) -> Result<TravelPlan> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.replace_plan_preferences(id, expected_version, &preferences)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Replaces a plan's collaborator set wholesale.
    pub async fn replace_plan_collaborators(
        &self,
        id: u64,
        expected_version: i64,
        collaborator_ids: Vec<u64>,
    ) -> Result<TravelPlan> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.replace_plan_collaborators(id, expected_version, &collaborator_ids)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Adds one collaborator to a plan.
    pub async fn add_collaborator(&self, plan_id: u64, user_id: u64) -> Result<()> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.add_collaborator(plan_id, user_id)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Removes one collaborator from a plan. Returns whether a row existed.
    pub async fn remove_collaborator(&self, plan_id: u64, user_id: u64) -> Result<bool> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.remove_collaborator(plan_id, user_id)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Increments a plan's view counter.
    pub async fn record_plan_view(&self, id: u64) -> Result<()> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.record_plan_view(id)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Increments a plan's like counter.
    pub async fn record_plan_like(&self, id: u64) -> Result<()> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.record_plan_like(id)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Increments a plan's share counter.
    pub async fn record_plan_share(&self, id: u64) -> Result<()> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.record_plan_share(id)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Soft-deletes a travel plan.
    pub async fn soft_delete_travel_plan(&self, id: u64) -> Result<()> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.soft_delete_travel_plan(id)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Permanently deletes a travel plan and everything hanging off it.
    /// This operation cannot be undone.
    pub async fn delete_travel_plan(&self, id: u64) -> Result<()> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.delete_travel_plan(id)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }
}
