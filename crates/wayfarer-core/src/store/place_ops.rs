//! Place operations for the Store.

use std::collections::{BTreeMap, BTreeSet};

use tokio::task;

use super::Store;
use crate::{
    db::Database,
    error::{Result, StoreError},
    models::{Page, PageRequest, Place},
    params::{NewPlace, UpdatePlace},
};

impl Store {
    /// Creates a new place with its images, tags, and opening hours.
    pub async fn create_place(&self, params: &NewPlace) -> Result<Place> {
        let db_path = self.db_path.clone();
        let params = params.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.create_place(&params)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Retrieves a place by ID, soft-deleted or not.
    pub async fn get_place(&self, id: u64) -> Result<Option<Place>> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.get_place(id)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Looks up a non-deleted place by external map-provider id.
    pub async fn find_place_by_naver_id(&self, naver_place_id: &str) -> Result<Option<Place>> {
        let db_path = self.db_path.clone();
        let naver_place_id = naver_place_id.to_string();

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.find_place_by_naver_id(&naver_place_id)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Whether any place row holds this external map-provider id.
    pub async fn place_exists_by_naver_id(&self, naver_place_id: &str) -> Result<bool> {
        let db_path = self.db_path.clone();
        let naver_place_id = naver_place_id.to_string();

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.place_exists_by_naver_id(&naver_place_id)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Searches non-deleted places by name, address, or description.
    pub async fn search_places(&self, query: &str, request: PageRequest) -> Result<Page<Place>> {
        let db_path = self.db_path.clone();
        let query = query.to_string();

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.search_places(&query, &request)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Finds places within `radius_meters` of a coordinate, closest first.
    pub async fn find_nearby_places(
        &self,
        latitude: f64,
        longitude: f64,
        radius_meters: f64,
    ) -> Result<Vec<Place>> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.find_nearby_places(latitude, longitude, radius_meters)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Lists non-deleted places in the given category.
    pub async fn find_places_by_category(
        &self,
        category: &str,
        request: PageRequest,
    ) -> Result<Page<Place>> {
        let db_path = self.db_path.clone();
        let category = category.to_string();

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.find_places_by_category(&category, &request)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Lists non-deleted places in any of the given categories.
    pub async fn find_places_by_categories(
        &self,
        categories: Vec<String>,
        request: PageRequest,
    ) -> Result<Page<Place>> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.find_places_by_categories(&categories, &request)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Lists non-deleted places carrying at least one of the given tags.
    pub async fn find_places_by_tags(
        &self,
        tags: Vec<String>,
        request: PageRequest,
    ) -> Result<Page<Place>> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.find_places_by_tags(&tags, &request)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Lists rated places at or above the given rating, best rated first.
    pub async fn find_places_by_minimum_rating(
        &self,
        minimum: f64,
        request: PageRequest,
    ) -> Result<Page<Place>> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.find_places_by_minimum_rating(minimum, &request)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Lists verified places, most popular first.
    pub async fn find_top_popular_places(&self, request: PageRequest) -> Result<Page<Place>> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.find_top_popular_places(&request)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Applies a partial, version-checked update to a place.
    pub async fn update_place(&self, params: &UpdatePlace) -> Result<Place> {
        let db_path = self.db_path.clone();
        let params = params.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.update_place(&params)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Replaces a place's tag set wholesale.
    pub async fn replace_place_tags(
        &self,
        id: u64,
        expected_version: i64,
        tags: BTreeSet<String>,
    ) -> Result<Place> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.replace_place_tags(id, expected_version, &tags)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Replaces a place's ordered image list wholesale.
    pub async fn replace_place_images(
        &self,
        id: u64,
        expected_version: i64,
        images: Vec<String>,
    ) -> Result<Place> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.replace_place_images(id, expected_version, &images)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Replaces a place's opening hours wholesale.
    pub async fn replace_place_opening_hours(
        &self,
        id: u64,
        expected_version: i64,
        opening_hours: BTreeMap<String, String>,
    ) -> Result<Place> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.replace_place_opening_hours(id, expected_version, &opening_hours)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Soft-deletes a place.
    pub async fn soft_delete_place(&self, id: u64) -> Result<()> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.soft_delete_place(id)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Increments a place's view counter.
    pub async fn record_place_view(&self, id: u64) -> Result<()> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.record_place_view(id)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Increments a place's bookmark counter.
    pub async fn record_place_bookmark(&self, id: u64) -> Result<()> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.record_place_bookmark(id)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Overwrites a place's precomputed popularity score.
    pub async fn update_popularity_score(&self, id: u64, score: f64) -> Result<()> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.update_popularity_score(id, score)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }
}
