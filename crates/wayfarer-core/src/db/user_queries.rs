//! User CRUD operations, the follower graph, and user search.

use std::collections::BTreeMap;

use jiff::Timestamp;
use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::{
    db::utils::{escape_like, id_column, order_clause, timestamp_column},
    error::{DatabaseResultExt, Result, StoreError},
    models::{Page, PageRequest, User},
    params::{NewUser, UpdateUser},
};

const USER_COLUMNS: &str = "id, email, username, nickname, bio, profile_image_url, provider, \
     provider_id, is_active, is_deleted, version, created_at, updated_at";
const QUALIFIED_USER_COLUMNS: &str =
    "u.id, u.email, u.username, u.nickname, u.bio, u.profile_image_url, u.provider, \
     u.provider_id, u.is_active, u.is_deleted, u.version, u.created_at, u.updated_at";

const INSERT_USER_SQL: &str = "INSERT INTO users (email, username, nickname, bio, \
     profile_image_url, provider, provider_id, created_at, updated_at) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)";
const CHECK_USER_EXISTS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)";
const EXISTS_BY_EMAIL_SQL: &str = "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1)";
const EXISTS_BY_NICKNAME_SQL: &str = "SELECT EXISTS(SELECT 1 FROM users WHERE nickname = ?1)";
const UPDATE_USER_SQL: &str = "UPDATE users SET \
     username = COALESCE(?1, username), \
     nickname = COALESCE(?2, nickname), \
     bio = COALESCE(?3, bio), \
     profile_image_url = COALESCE(?4, profile_image_url), \
     is_active = COALESCE(?5, is_active), \
     version = version + 1, \
     updated_at = ?6 \
     WHERE id = ?7 AND version = ?8";
const BUMP_USER_VERSION_SQL: &str =
    "UPDATE users SET version = version + 1, updated_at = ?1 WHERE id = ?2 AND version = ?3";
const SOFT_DELETE_USER_SQL: &str = "UPDATE users SET is_deleted = 1, is_active = 0, \
     deleted_at = ?1, version = version + 1, updated_at = ?1 WHERE id = ?2";
const DELETE_USER_PLANS_SQL: &str = "DELETE FROM travel_plans WHERE user_id = ?1";
const DELETE_USER_SQL: &str = "DELETE FROM users WHERE id = ?1";
const INSERT_FOLLOW_SQL: &str =
    "INSERT INTO user_follows (user_id, follower_id, created_at) VALUES (?1, ?2, ?3)";
const DELETE_FOLLOW_SQL: &str =
    "DELETE FROM user_follows WHERE user_id = ?1 AND follower_id = ?2";
const COUNT_FOLLOWERS_SQL: &str = "SELECT COUNT(*) FROM user_follows WHERE user_id = ?1";
const COUNT_FOLLOWING_SQL: &str = "SELECT COUNT(*) FROM user_follows WHERE follower_id = ?1";

/// Sortable fields for paged user queries, qualified for joined queries.
const USER_SORT_FIELDS: &[(&str, &str)] = &[
    ("id", "u.id"),
    ("nickname", "u.nickname"),
    ("created_at", "u.created_at"),
];

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: id_column(row, 0)?,
        email: row.get(1)?,
        username: row.get(2)?,
        nickname: row.get(3)?,
        bio: row.get(4)?,
        profile_image_url: row.get(5)?,
        provider: row.get(6)?,
        provider_id: row.get(7)?,
        preferences: BTreeMap::new(),
        travel_preferences: BTreeMap::new(),
        is_active: row.get(8)?,
        is_deleted: row.get(9)?,
        version: row.get(10)?,
        created_at: timestamp_column(row, 11)?,
        updated_at: timestamp_column(row, 12)?,
    })
}

fn load_preference_map(
    connection: &Connection,
    table: &str,
    user_id: u64,
) -> Result<BTreeMap<String, String>> {
    let sql =
        format!("SELECT preference_key, preference_value FROM {table} WHERE user_id = ?1");
    let mut stmt = connection
        .prepare(&sql)
        .map_err(|e| StoreError::database_error("Failed to prepare preference query", e))?;

    let map = stmt
        .query_map(params![user_id as i64], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })
        .map_err(|e| StoreError::database_error("Failed to query preferences", e))?
        .collect::<std::result::Result<BTreeMap<_, _>, _>>()
        .map_err(|e| StoreError::database_error("Failed to fetch preferences", e))?;

    Ok(map)
}

fn insert_preference_rows(
    connection: &Connection,
    table: &str,
    user_id: u64,
    preferences: &BTreeMap<String, String>,
) -> Result<()> {
    let sql = format!(
        "INSERT INTO {table} (user_id, preference_key, preference_value) VALUES (?1, ?2, ?3)"
    );
    for (key, value) in preferences {
        connection
            .execute(&sql, params![user_id as i64, key, value])
            .map_err(|e| StoreError::from_sqlite("Failed to insert preference", e))?;
    }
    Ok(())
}

impl super::Database {
    /// Registers a new user together with their initial preference maps.
    ///
    /// Fails with a constraint violation when the email, username, or
    /// (provider, provider_id) pair is already taken.
    pub fn create_user(&mut self, new_user: &NewUser) -> Result<User> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let now = Timestamp::now();
        let now_str = now.to_string();

        tx.execute(
            INSERT_USER_SQL,
            params![
                new_user.email,
                new_user.username,
                new_user.nickname,
                new_user.bio,
                new_user.profile_image_url,
                new_user.provider,
                new_user.provider_id,
                &now_str,
                &now_str
            ],
        )
        .map_err(|e| StoreError::from_sqlite("Failed to insert user", e))?;

        let id = tx.last_insert_rowid() as u64;

        insert_preference_rows(&tx, "user_preferences", id, &new_user.preferences)?;
        insert_preference_rows(&tx, "user_travel_preferences", id, &new_user.travel_preferences)?;

        tx.commit().db_context("Failed to commit transaction")?;

        debug!("Created user {id} ({})", new_user.email);

        Ok(User {
            id,
            email: new_user.email.clone(),
            username: new_user.username.clone(),
            nickname: new_user.nickname.clone(),
            bio: new_user.bio.clone(),
            profile_image_url: new_user.profile_image_url.clone(),
            provider: new_user.provider.clone(),
            provider_id: new_user.provider_id.clone(),
            preferences: new_user.preferences.clone(),
            travel_preferences: new_user.travel_preferences.clone(),
            is_active: true,
            is_deleted: false,
            version: 0,
            created_at: now,
            updated_at: now,
        })
    }

    /// Retrieves a user by ID, soft-deleted or not.
    pub fn get_user(&self, id: u64) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");
        let user = self
            .connection
            .query_row(&sql, params![id as i64], user_from_row)
            .optional()
            .map_err(|e| StoreError::database_error("Failed to query user", e))?;

        match user {
            Some(user) => Ok(Some(self.attach_preferences(user)?)),
            None => Ok(None),
        }
    }

    /// Looks up a non-deleted user by email address.
    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1 AND is_deleted = 0");
        let user = self
            .connection
            .query_row(&sql, params![email], user_from_row)
            .optional()
            .map_err(|e| StoreError::database_error("Failed to query user by email", e))?;

        match user {
            Some(user) => Ok(Some(self.attach_preferences(user)?)),
            None => Ok(None),
        }
    }

    /// Looks up a non-deleted user by OAuth provider identity.
    pub fn find_user_by_provider(
        &self,
        provider: &str,
        provider_id: &str,
    ) -> Result<Option<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE provider = ?1 AND provider_id = ?2 AND is_deleted = 0"
        );
        let user = self
            .connection
            .query_row(&sql, params![provider, provider_id], user_from_row)
            .optional()
            .map_err(|e| StoreError::database_error("Failed to query user by provider", e))?;

        match user {
            Some(user) => Ok(Some(self.attach_preferences(user)?)),
            None => Ok(None),
        }
    }

    /// Whether any user row, including soft-deleted ones, holds this email.
    pub fn user_exists_by_email(&self, email: &str) -> Result<bool> {
        self.connection
            .query_row(EXISTS_BY_EMAIL_SQL, params![email], |row| row.get(0))
            .map_err(|e| StoreError::database_error("Failed to check email existence", e))
    }

    /// Whether any user row, including soft-deleted ones, holds this nickname.
    pub fn user_exists_by_nickname(&self, nickname: &str) -> Result<bool> {
        self.connection
            .query_row(EXISTS_BY_NICKNAME_SQL, params![nickname], |row| row.get(0))
            .map_err(|e| StoreError::database_error("Failed to check nickname existence", e))
    }

    /// Searches active, non-deleted users by nickname or bio substring.
    ///
    /// LIKE wildcards in the query text match literally.
    pub fn search_users(&self, query: &str, request: &PageRequest) -> Result<Page<User>> {
        let pattern = format!("%{}%", escape_like(query));
        let order = order_clause(request.sort.as_ref(), USER_SORT_FIELDS, "u.id ASC")?;
        self.page_of_users(
            "users u WHERE u.is_active = 1 AND u.is_deleted = 0 \
             AND (lower(u.nickname) LIKE lower(?) ESCAPE '\\' \
             OR lower(u.bio) LIKE lower(?) ESCAPE '\\')",
            vec![
                Box::new(pattern.clone()) as Box<dyn rusqlite::ToSql>,
                Box::new(pattern),
            ],
            &order,
            request,
        )
    }

    /// Lists active, non-deleted users.
    pub fn find_active_users(&self, request: &PageRequest) -> Result<Page<User>> {
        let order = order_clause(request.sort.as_ref(), USER_SORT_FIELDS, "u.id ASC")?;
        self.page_of_users(
            "users u WHERE u.is_active = 1 AND u.is_deleted = 0",
            Vec::new(),
            &order,
            request,
        )
    }

    /// Lists the non-deleted users who follow the given user.
    pub fn find_followers(&self, user_id: u64, request: &PageRequest) -> Result<Page<User>> {
        let order = order_clause(request.sort.as_ref(), USER_SORT_FIELDS, "u.id ASC")?;
        self.page_of_users(
            "users u JOIN user_follows f ON u.id = f.follower_id \
             WHERE f.user_id = ? AND u.is_deleted = 0",
            vec![Box::new(user_id as i64) as Box<dyn rusqlite::ToSql>],
            &order,
            request,
        )
    }

    /// Lists the non-deleted users the given user follows.
    pub fn find_following(&self, user_id: u64, request: &PageRequest) -> Result<Page<User>> {
        let order = order_clause(request.sort.as_ref(), USER_SORT_FIELDS, "u.id ASC")?;
        self.page_of_users(
            "users u JOIN user_follows f ON u.id = f.user_id \
             WHERE f.follower_id = ? AND u.is_deleted = 0",
            vec![Box::new(user_id as i64) as Box<dyn rusqlite::ToSql>],
            &order,
            request,
        )
    }

    /// Number of followers the given user has.
    pub fn count_followers(&self, user_id: u64) -> Result<u64> {
        let count: i64 = self
            .connection
            .query_row(COUNT_FOLLOWERS_SQL, params![user_id as i64], |row| row.get(0))
            .map_err(|e| StoreError::database_error("Failed to count followers", e))?;
        Ok(count as u64)
    }

    /// Number of users the given user follows.
    pub fn count_following(&self, user_id: u64) -> Result<u64> {
        let count: i64 = self
            .connection
            .query_row(COUNT_FOLLOWING_SQL, params![user_id as i64], |row| row.get(0))
            .map_err(|e| StoreError::database_error("Failed to count following", e))?;
        Ok(count as u64)
    }

    /// Records that `follower_id` follows `user_id`.
    ///
    /// Self-follows are rejected, both users must exist, and following the
    /// same user twice fails with a constraint violation.
    pub fn follow_user(&mut self, user_id: u64, follower_id: u64) -> Result<()> {
        if user_id == follower_id {
            return Err(StoreError::InvalidInput {
                field: "follower_id".to_string(),
                reason: "A user cannot follow themselves".to_string(),
            });
        }

        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        for id in [user_id, follower_id] {
            let exists: bool = tx
                .query_row(CHECK_USER_EXISTS_SQL, params![id as i64], |row| row.get(0))
                .map_err(|e| StoreError::database_error("Failed to check user existence", e))?;
            if !exists {
                return Err(StoreError::NotFound { entity: "user", id });
            }
        }

        tx.execute(
            INSERT_FOLLOW_SQL,
            params![user_id as i64, follower_id as i64, Timestamp::now().to_string()],
        )
        .map_err(|e| StoreError::from_sqlite("Failed to insert follow edge", e))?;

        tx.commit().db_context("Failed to commit transaction")?;

        debug!("User {follower_id} now follows user {user_id}");
        Ok(())
    }

    /// Removes a follow edge. Returns whether an edge existed.
    pub fn unfollow_user(&mut self, user_id: u64, follower_id: u64) -> Result<bool> {
        let rows = self
            .connection
            .execute(DELETE_FOLLOW_SQL, params![user_id as i64, follower_id as i64])
            .map_err(|e| StoreError::database_error("Failed to delete follow edge", e))?;
        Ok(rows > 0)
    }

    /// Applies a partial update to a user's profile fields.
    ///
    /// The write only lands when `expected_version` still matches the stored
    /// row; otherwise the caller gets a version conflict and must re-read.
    pub fn update_user(&mut self, update: &UpdateUser) -> Result<User> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let now = Timestamp::now().to_string();
        let rows = tx
            .execute(
                UPDATE_USER_SQL,
                params![
                    update.username,
                    update.nickname,
                    update.bio,
                    update.profile_image_url,
                    update.is_active,
                    &now,
                    update.id as i64,
                    update.expected_version
                ],
            )
            .map_err(|e| StoreError::from_sqlite("Failed to update user", e))?;

        if rows == 0 {
            return Err(Self::stale_or_missing(&tx, "user", update.id, update.expected_version)?);
        }

        tx.commit().db_context("Failed to commit transaction")?;

        debug!("Updated user {}", update.id);
        self.get_user(update.id)?.ok_or(StoreError::NotFound {
            entity: "user",
            id: update.id,
        })
    }

    /// Replaces a user's general preference map wholesale.
    pub fn replace_user_preferences(
        &mut self,
        id: u64,
        expected_version: i64,
        preferences: &BTreeMap<String, String>,
    ) -> Result<User> {
        self.replace_preference_rows("user_preferences", id, expected_version, preferences)
    }

    /// Replaces a user's travel preference map wholesale.
    pub fn replace_user_travel_preferences(
        &mut self,
        id: u64,
        expected_version: i64,
        preferences: &BTreeMap<String, String>,
    ) -> Result<User> {
        self.replace_preference_rows("user_travel_preferences", id, expected_version, preferences)
    }

    fn replace_preference_rows(
        &mut self,
        table: &str,
        id: u64,
        expected_version: i64,
        preferences: &BTreeMap<String, String>,
    ) -> Result<User> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let rows = tx
            .execute(
                BUMP_USER_VERSION_SQL,
                params![Timestamp::now().to_string(), id as i64, expected_version],
            )
            .map_err(|e| StoreError::database_error("Failed to bump user version", e))?;

        if rows == 0 {
            return Err(Self::stale_or_missing(&tx, "user", id, expected_version)?);
        }

        let delete_sql = format!("DELETE FROM {table} WHERE user_id = ?1");
        tx.execute(&delete_sql, params![id as i64])
            .map_err(|e| StoreError::database_error("Failed to clear preferences", e))?;

        insert_preference_rows(&tx, table, id, preferences)?;

        tx.commit().db_context("Failed to commit transaction")?;

        debug!("Replaced {table} for user {id}");
        self.get_user(id)?
            .ok_or(StoreError::NotFound { entity: "user", id })
    }

    /// Soft-deletes a user: the row stays but drops out of lookups and
    /// search, and the account is deactivated.
    pub fn soft_delete_user(&mut self, id: u64) -> Result<()> {
        let rows = self
            .connection
            .execute(
                SOFT_DELETE_USER_SQL,
                params![Timestamp::now().to_string(), id as i64],
            )
            .map_err(|e| StoreError::database_error("Failed to soft-delete user", e))?;

        if rows == 0 {
            return Err(StoreError::NotFound { entity: "user", id });
        }

        info!("Soft-deleted user {id}");
        Ok(())
    }

    /// Permanently deletes a user, their plans, and every row referencing
    /// them. This operation cannot be undone.
    pub fn delete_user(&mut self, id: u64) -> Result<()> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let exists: bool = tx
            .query_row(CHECK_USER_EXISTS_SQL, params![id as i64], |row| row.get(0))
            .map_err(|e| StoreError::database_error("Failed to check user existence", e))?;
        if !exists {
            return Err(StoreError::NotFound { entity: "user", id });
        }

        // Owned plans do not cascade from the user row; remove them first so
        // their own children (items, bookmarks, tags) cascade away with them.
        tx.execute(DELETE_USER_PLANS_SQL, params![id as i64])
            .map_err(|e| StoreError::database_error("Failed to delete user's plans", e))?;

        tx.execute(DELETE_USER_SQL, params![id as i64])
            .map_err(|e| StoreError::database_error("Failed to delete user", e))?;

        tx.commit().db_context("Failed to commit transaction")?;

        info!("Permanently deleted user {id}");
        Ok(())
    }

    /// Distinguishes a stale version from a missing row after a zero-row
    /// conditional update. Always returns the error to raise.
    pub(crate) fn stale_or_missing(
        connection: &Connection,
        entity: &'static str,
        id: u64,
        expected: i64,
    ) -> Result<StoreError> {
        let table = match entity {
            "user" => "users",
            "place" => "places",
            "travel_plan" => "travel_plans",
            _ => return Ok(StoreError::NotFound { entity, id }),
        };
        let sql = format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?1)");
        let exists: bool = connection
            .query_row(&sql, params![id as i64], |row| row.get(0))
            .map_err(|e| StoreError::database_error("Failed to check row existence", e))?;

        if exists {
            Ok(StoreError::VersionConflict { entity, id, expected })
        } else {
            Ok(StoreError::NotFound { entity, id })
        }
    }

    fn attach_preferences(&self, mut user: User) -> Result<User> {
        user.preferences = load_preference_map(&self.connection, "user_preferences", user.id)?;
        user.travel_preferences =
            load_preference_map(&self.connection, "user_travel_preferences", user.id)?;
        Ok(user)
    }

    fn page_of_users(
        &self,
        from_where: &str,
        params: Vec<Box<dyn rusqlite::ToSql>>,
        order: &str,
        request: &PageRequest,
    ) -> Result<Page<User>> {
        let count_sql = format!("SELECT COUNT(*) FROM {from_where}");
        let count_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|b| &**b).collect();
        let total: i64 = self
            .connection
            .query_row(&count_sql, &count_refs[..], |row| row.get(0))
            .map_err(|e| StoreError::database_error("Failed to count users", e))?;

        let select_sql =
            format!("SELECT {QUALIFIED_USER_COLUMNS} FROM {from_where} {order} LIMIT ? OFFSET ?");
        let mut stmt = self
            .connection
            .prepare(&select_sql)
            .map_err(|e| StoreError::database_error("Failed to prepare user query", e))?;

        let mut select_params = params;
        select_params.push(Box::new(request.limit()));
        select_params.push(Box::new(request.offset()));
        let select_refs: Vec<&dyn rusqlite::ToSql> =
            select_params.iter().map(|b| &**b).collect();

        let users: Vec<User> = stmt
            .query_map(&select_refs[..], user_from_row)
            .map_err(|e| StoreError::database_error("Failed to query users", e))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| StoreError::database_error("Failed to fetch users", e))?;

        let users = users
            .into_iter()
            .map(|user| self.attach_preferences(user))
            .collect::<Result<Vec<_>>>()?;

        Ok(Page::new(users, total as u64, request))
    }
}
