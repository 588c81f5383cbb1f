//! Itinerary item operations for the Store.

use tokio::task;

use super::Store;
use crate::{
    db::Database,
    error::{Result, StoreError},
    models::ItineraryItem,
    params::{NewItineraryItem, UpdateItineraryItem},
};

impl Store {
    /// Adds an itinerary item to an existing plan.
    pub async fn add_item(&self, params: &NewItineraryItem) -> Result<ItineraryItem> {
        let db_path = self.db_path.clone();
        let params = params.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.add_item(&params)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Retrieves one itinerary item by ID.
    pub async fn get_item(&self, id: u64) -> Result<Option<ItineraryItem>> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.get_item(id)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Lists a plan's itinerary in (day_number, sequence) order.
    pub async fn get_items_for_plan(&self, plan_id: u64) -> Result<Vec<ItineraryItem>> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.get_items_for_plan(plan_id)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Applies a partial update to an itinerary item.
    pub async fn update_item(&self, params: &UpdateItineraryItem) -> Result<ItineraryItem> {
        let db_path = self.db_path.clone();
        let params = params.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.update_item(&params)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Removes one itinerary item from its plan.
    pub async fn remove_item(&self, id: u64) -> Result<()> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.remove_item(id)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Bulk-deletes every item of a plan. Idempotent; returns the number of
    /// rows removed.
    pub async fn delete_items_by_plan(&self, plan_id: u64) -> Result<usize> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.delete_items_by_plan(plan_id)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }
}
