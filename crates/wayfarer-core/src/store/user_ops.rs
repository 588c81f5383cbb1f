//! User operations for the Store.

use std::collections::BTreeMap;

use tokio::task;

use super::Store;
use crate::{
    db::Database,
    error::{Result, StoreError},
    models::{Page, PageRequest, User},
    params::{NewUser, UpdateUser},
};

impl Store {
    /// Registers a new user with their initial preference maps.
    pub async fn create_user(&self, params: &NewUser) -> Result<User> {
        let db_path = self.db_path.clone();
        let params = params.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.create_user(&params)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Retrieves a user by ID, soft-deleted or not.
    pub async fn get_user(&self, id: u64) -> Result<Option<User>> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.get_user(id)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Looks up a non-deleted user by email address.
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let db_path = self.db_path.clone();
        let email = email.to_string();

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.find_user_by_email(&email)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Looks up a non-deleted user by OAuth provider identity.
    pub async fn find_user_by_provider(
        &self,
        provider: &str,
        provider_id: &str,
    ) -> Result<Option<User>> {
        let db_path = self.db_path.clone();
        let provider = provider.to_string();
        let provider_id = provider_id.to_string();

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.find_user_by_provider(&provider, &provider_id)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Whether any user row holds this email.
    pub async fn user_exists_by_email(&self, email: &str) -> Result<bool> {
        let db_path = self.db_path.clone();
        let email = email.to_string();

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.user_exists_by_email(&email)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Whether any user row holds this nickname.
    pub async fn user_exists_by_nickname(&self, nickname: &str) -> Result<bool> {
        let db_path = self.db_path.clone();
        let nickname = nickname.to_string();

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.user_exists_by_nickname(&nickname)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Searches active users by nickname or bio substring.
    pub async fn search_users(&self, query: &str, request: PageRequest) -> Result<Page<User>> {
        let db_path = self.db_path.clone();
        let query = query.to_string();

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.search_users(&query, &request)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Lists active, non-deleted users.
    pub async fn find_active_users(&self, request: PageRequest) -> Result<Page<User>> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.find_active_users(&request)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Lists the users who follow the given user.
    pub async fn find_followers(&self, user_id: u64, request: PageRequest) -> Result<Page<User>> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.find_followers(user_id, &request)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Lists the users the given user follows.
    pub async fn find_following(&self, user_id: u64, request: PageRequest) -> Result<Page<User>> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.find_following(user_id, &request)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Number of followers the given user has.
    pub async fn count_followers(&self, user_id: u64) -> Result<u64> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.count_followers(user_id)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Number of users the given user follows.
    pub async fn count_following(&self, user_id: u64) -> Result<u64> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.count_following(user_id)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Records that `follower_id` follows `user_id`.
    pub async fn follow_user(&self, user_id: u64, follower_id: u64) -> Result<()> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.follow_user(user_id, follower_id)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Removes a follow edge. Returns whether an edge existed.
    pub async fn unfollow_user(&self, user_id: u64, follower_id: u64) -> Result<bool> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.unfollow_user(user_id, follower_id)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Applies a partial, version-checked update to a user's profile.
    pub async fn update_user(&self, params: &UpdateUser) -> Result<User> {
        let db_path = self.db_path.clone();
        let params = params.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.update_user(&params)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Replaces a user's general preference map wholesale.
    pub async fn replace_user_preferences(
        &self,
        id: u64,
        expected_version: i64,
        preferences: BTreeMap<String, String>,
    ) -> Result<User> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.replace_user_preferences(id, expected_version, &preferences)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Replaces a user's travel preference map wholesale.
    pub async fn replace_user_travel_preferences(
        &self,
        id: u64,
        expected_version: i64,
        preferences: BTreeMap<String, String>,
    ) -> Result<User> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.replace_user_travel_preferences(id, expected_version, &preferences)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Soft-deletes a user.
    pub async fn soft_delete_user(&self, id: u64) -> Result<()> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.soft_delete_user(id)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Permanently deletes a user and everything referencing them.
    /// This operation cannot be undone.
    pub async fn delete_user(&self, id: u64) -> Result<()> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.delete_user(id)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }
}
