//! Place CRUD operations and discovery queries.

use std::collections::{BTreeMap, BTreeSet};

use jiff::Timestamp;
use log::{debug, info};
use rusqlite::{params, OptionalExtension, Row};

use crate::{
    db::utils::{
        escape_like, haversine_distance_meters, id_column, order_clause, timestamp_column,
    },
    error::{DatabaseResultExt, Result, StoreError},
    models::{Page, PageRequest, Place},
    params::{NewPlace, UpdatePlace},
};

const PLACE_COLUMNS: &str =
    "p.id, p.naver_place_id, p.name, p.category, p.description, p.address, p.road_address, \
     p.latitude, p.longitude, p.phone_number, p.website, p.rating, p.review_count, \
     p.bookmark_count, p.view_count, p.is_verified, p.popularity_score, p.is_deleted, \
     p.version, p.created_at, p.updated_at";

const INSERT_PLACE_SQL: &str = "INSERT INTO places (naver_place_id, name, category, \
     description, address, road_address, latitude, longitude, phone_number, website, rating, \
     is_verified, created_at, updated_at) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)";
const UPDATE_PLACE_SQL: &str = "UPDATE places SET \
     name = COALESCE(?1, name), \
     category = COALESCE(?2, category), \
     description = COALESCE(?3, description), \
     address = COALESCE(?4, address), \
     road_address = COALESCE(?5, road_address), \
     latitude = COALESCE(?6, latitude), \
     longitude = COALESCE(?7, longitude), \
     phone_number = COALESCE(?8, phone_number), \
     website = COALESCE(?9, website), \
     rating = COALESCE(?10, rating), \
     is_verified = COALESCE(?11, is_verified), \
     version = version + 1, \
     updated_at = ?12 \
     WHERE id = ?13 AND version = ?14";
const BUMP_PLACE_VERSION_SQL: &str =
    "UPDATE places SET version = version + 1, updated_at = ?1 WHERE id = ?2 AND version = ?3";
const SOFT_DELETE_PLACE_SQL: &str = "UPDATE places SET is_deleted = 1, deleted_at = ?1, \
     version = version + 1, updated_at = ?1 WHERE id = ?2";
const RECORD_VIEW_SQL: &str = "UPDATE places SET view_count = view_count + 1, \
     version = version + 1, updated_at = ?1 WHERE id = ?2";
const RECORD_BOOKMARK_SQL: &str = "UPDATE places SET bookmark_count = bookmark_count + 1, \
     version = version + 1, updated_at = ?1 WHERE id = ?2";
const UPDATE_POPULARITY_SQL: &str = "UPDATE places SET popularity_score = ?1, \
     version = version + 1, updated_at = ?2 WHERE id = ?3";

/// Sortable fields for paged place queries.
const PLACE_SORT_FIELDS: &[(&str, &str)] = &[
    ("id", "p.id"),
    ("name", "p.name"),
    ("rating", "p.rating"),
    ("review_count", "p.review_count"),
    ("popularity", "p.popularity_score"),
    ("created_at", "p.created_at"),
];

fn place_from_row(row: &Row<'_>) -> rusqlite::Result<Place> {
    Ok(Place {
        id: id_column(row, 0)?,
        naver_place_id: row.get(1)?,
        name: row.get(2)?,
        category: row.get(3)?,
        description: row.get(4)?,
        address: row.get(5)?,
        road_address: row.get(6)?,
        latitude: row.get(7)?,
        longitude: row.get(8)?,
        phone_number: row.get(9)?,
        website: row.get(10)?,
        opening_hours: BTreeMap::new(),
        images: Vec::new(),
        tags: BTreeSet::new(),
        rating: row.get(11)?,
        review_count: row.get(12)?,
        bookmark_count: row.get(13)?,
        view_count: row.get(14)?,
        is_verified: row.get(15)?,
        popularity_score: row.get(16)?,
        is_deleted: row.get(17)?,
        version: row.get(18)?,
        created_at: timestamp_column(row, 19)?,
        updated_at: timestamp_column(row, 20)?,
    })
}

fn insert_image_rows(tx: &rusqlite::Connection, place_id: u64, images: &[String]) -> Result<()> {
    for (position, url) in images.iter().enumerate() {
        tx.execute(
            "INSERT INTO place_images (place_id, position, image_url) VALUES (?1, ?2, ?3)",
            params![place_id as i64, position as i64, url],
        )
        .map_err(|e| StoreError::from_sqlite("Failed to insert place image", e))?;
    }
    Ok(())
}

fn insert_tag_rows(
    tx: &rusqlite::Connection,
    place_id: u64,
    tags: &BTreeSet<String>,
) -> Result<()> {
    for tag in tags {
        tx.execute(
            "INSERT INTO place_tags (place_id, tag) VALUES (?1, ?2)",
            params![place_id as i64, tag],
        )
        .map_err(|e| StoreError::from_sqlite("Failed to insert place tag", e))?;
    }
    Ok(())
}

fn insert_opening_hour_rows(
    tx: &rusqlite::Connection,
    place_id: u64,
    opening_hours: &BTreeMap<String, String>,
) -> Result<()> {
    for (day, hours) in opening_hours {
        tx.execute(
            "INSERT INTO place_opening_hours (place_id, day_of_week, hours) VALUES (?1, ?2, ?3)",
            params![place_id as i64, day, hours],
        )
        .map_err(|e| StoreError::from_sqlite("Failed to insert opening hours", e))?;
    }
    Ok(())
}

impl super::Database {
    /// Creates a new place together with its images, tags, and opening hours.
    pub fn create_place(&mut self, new_place: &NewPlace) -> Result<Place> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let now = Timestamp::now();
        let now_str = now.to_string();

        tx.execute(
            INSERT_PLACE_SQL,
            params![
                new_place.naver_place_id,
                new_place.name,
                new_place.category,
                new_place.description,
                new_place.address,
                new_place.road_address,
                new_place.latitude,
                new_place.longitude,
                new_place.phone_number,
                new_place.website,
                new_place.rating,
                new_place.is_verified,
                &now_str,
                &now_str
            ],
        )
        .map_err(|e| StoreError::from_sqlite("Failed to insert place", e))?;

        let id = tx.last_insert_rowid() as u64;

        insert_image_rows(&tx, id, &new_place.images)?;
        insert_tag_rows(&tx, id, &new_place.tags)?;
        insert_opening_hour_rows(&tx, id, &new_place.opening_hours)?;

        tx.commit().db_context("Failed to commit transaction")?;

        debug!("Created place {id} ({})", new_place.name);

        Ok(Place {
            id,
            naver_place_id: new_place.naver_place_id.clone(),
            name: new_place.name.clone(),
            category: new_place.category.clone(),
            description: new_place.description.clone(),
            address: new_place.address.clone(),
            road_address: new_place.road_address.clone(),
            latitude: new_place.latitude,
            longitude: new_place.longitude,
            phone_number: new_place.phone_number.clone(),
            website: new_place.website.clone(),
            opening_hours: new_place.opening_hours.clone(),
            images: new_place.images.clone(),
            tags: new_place.tags.clone(),
            rating: new_place.rating,
            review_count: 0,
            bookmark_count: 0,
            view_count: 0,
            is_verified: new_place.is_verified,
            popularity_score: 0.0,
            is_deleted: false,
            version: 0,
            created_at: now,
            updated_at: now,
        })
    }

    /// Retrieves a place by ID, soft-deleted or not.
    pub fn get_place(&self, id: u64) -> Result<Option<Place>> {
        let sql = format!("SELECT {PLACE_COLUMNS} FROM places p WHERE p.id = ?1");
        let place = self
            .connection
            .query_row(&sql, params![id as i64], place_from_row)
            .optional()
            .map_err(|e| StoreError::database_error("Failed to query place", e))?;

        match place {
            Some(place) => Ok(Some(self.attach_place_collections(place)?)),
            None => Ok(None),
        }
    }

    /// Looks up a non-deleted place by external map-provider id.
    pub fn find_place_by_naver_id(&self, naver_place_id: &str) -> Result<Option<Place>> {
        let sql = format!(
            "SELECT {PLACE_COLUMNS} FROM places p \
             WHERE p.naver_place_id = ?1 AND p.is_deleted = 0"
        );
        let place = self
            .connection
            .query_row(&sql, params![naver_place_id], place_from_row)
            .optional()
            .map_err(|e| StoreError::database_error("Failed to query place by provider id", e))?;

        match place {
            Some(place) => Ok(Some(self.attach_place_collections(place)?)),
            None => Ok(None),
        }
    }

    /// Whether any place row holds this external map-provider id.
    pub fn place_exists_by_naver_id(&self, naver_place_id: &str) -> Result<bool> {
        self.connection
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM places WHERE naver_place_id = ?1)",
                params![naver_place_id],
                |row| row.get(0),
            )
            .map_err(|e| StoreError::database_error("Failed to check place existence", e))
    }

    /// Searches non-deleted places by name, address, or description
    /// substring. LIKE wildcards in the query text match literally.
    pub fn search_places(&self, query: &str, request: &PageRequest) -> Result<Page<Place>> {
        let pattern = format!("%{}%", escape_like(query));
        let order = order_clause(request.sort.as_ref(), PLACE_SORT_FIELDS, "p.id ASC")?;
        self.page_of_places(
            "places p WHERE p.is_deleted = 0 AND (lower(p.name) LIKE lower(?) ESCAPE '\\' \
             OR lower(p.address) LIKE lower(?) ESCAPE '\\' \
             OR lower(p.description) LIKE lower(?) ESCAPE '\\')",
            vec![
                Box::new(pattern.clone()) as Box<dyn rusqlite::ToSql>,
                Box::new(pattern.clone()),
                Box::new(pattern),
            ],
            &order,
            request,
        )
    }

    /// Finds non-deleted places within `radius_meters` of a coordinate,
    /// closest first.
    ///
    /// Distance is computed with the haversine formula over all candidate
    /// rows; ties sort by id for determinism.
    pub fn find_nearby_places(
        &self,
        latitude: f64,
        longitude: f64,
        radius_meters: f64,
    ) -> Result<Vec<Place>> {
        let sql = format!("SELECT {PLACE_COLUMNS} FROM places p WHERE p.is_deleted = 0");
        let mut stmt = self
            .connection
            .prepare(&sql)
            .map_err(|e| StoreError::database_error("Failed to prepare place query", e))?;

        let candidates: Vec<Place> = stmt
            .query_map([], place_from_row)
            .map_err(|e| StoreError::database_error("Failed to query places", e))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| StoreError::database_error("Failed to fetch places", e))?;

        let mut nearby: Vec<(f64, Place)> = candidates
            .into_iter()
            .filter_map(|place| {
                let distance = haversine_distance_meters(
                    latitude,
                    longitude,
                    place.latitude,
                    place.longitude,
                );
                (distance <= radius_meters).then_some((distance, place))
            })
            .collect();
        nearby.sort_by(|(da, pa), (db, pb)| {
            da.partial_cmp(db)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(pa.id.cmp(&pb.id))
        });

        nearby
            .into_iter()
            .map(|(_, place)| self.attach_place_collections(place))
            .collect()
    }

    /// Lists non-deleted places in the given category.
    pub fn find_places_by_category(
        &self,
        category: &str,
        request: &PageRequest,
    ) -> Result<Page<Place>> {
        let order = order_clause(request.sort.as_ref(), PLACE_SORT_FIELDS, "p.id ASC")?;
        self.page_of_places(
            "places p WHERE p.is_deleted = 0 AND p.category = ?",
            vec![Box::new(category.to_string()) as Box<dyn rusqlite::ToSql>],
            &order,
            request,
        )
    }

    /// Lists non-deleted places in any of the given categories.
    ///
    /// An empty category list matches nothing.
    pub fn find_places_by_categories(
        &self,
        categories: &[String],
        request: &PageRequest,
    ) -> Result<Page<Place>> {
        if categories.is_empty() {
            return Ok(Page::new(Vec::new(), 0, request));
        }

        let placeholders = vec!["?"; categories.len()].join(", ");
        let from_where =
            format!("places p WHERE p.is_deleted = 0 AND p.category IN ({placeholders})");
        let params: Vec<Box<dyn rusqlite::ToSql>> = categories
            .iter()
            .map(|c| Box::new(c.clone()) as Box<dyn rusqlite::ToSql>)
            .collect();
        let order = order_clause(request.sort.as_ref(), PLACE_SORT_FIELDS, "p.id ASC")?;
        self.page_of_places(&from_where, params, &order, request)
    }

    /// Lists non-deleted places carrying at least one of the given tags.
    ///
    /// An empty tag list matches nothing.
    pub fn find_places_by_tags(
        &self,
        tags: &[String],
        request: &PageRequest,
    ) -> Result<Page<Place>> {
        if tags.is_empty() {
            return Ok(Page::new(Vec::new(), 0, request));
        }

        let placeholders = vec!["?"; tags.len()].join(", ");
        let from_where = format!(
            "places p WHERE p.is_deleted = 0 AND EXISTS (SELECT 1 FROM place_tags t \
             WHERE t.place_id = p.id AND t.tag IN ({placeholders}))"
        );
        let params: Vec<Box<dyn rusqlite::ToSql>> = tags
            .iter()
            .map(|t| Box::new(t.clone()) as Box<dyn rusqlite::ToSql>)
            .collect();
        let order = order_clause(request.sort.as_ref(), PLACE_SORT_FIELDS, "p.id ASC")?;
        self.page_of_places(&from_where, params, &order, request)
    }

    /// Lists non-deleted, rated places at or above the given rating, best
    /// rated first.
    pub fn find_places_by_minimum_rating(
        &self,
        minimum: f64,
        request: &PageRequest,
    ) -> Result<Page<Place>> {
        let order = order_clause(
            request.sort.as_ref(),
            PLACE_SORT_FIELDS,
            "p.rating DESC, p.id ASC",
        )?;
        self.page_of_places(
            "places p WHERE p.is_deleted = 0 AND p.rating IS NOT NULL AND p.rating >= ?",
            vec![Box::new(minimum) as Box<dyn rusqlite::ToSql>],
            &order,
            request,
        )
    }

    /// Lists verified, non-deleted places, most popular first.
    pub fn find_top_popular_places(&self, request: &PageRequest) -> Result<Page<Place>> {
        let order = order_clause(
            request.sort.as_ref(),
            PLACE_SORT_FIELDS,
            "p.popularity_score DESC, p.id ASC",
        )?;
        self.page_of_places(
            "places p WHERE p.is_deleted = 0 AND p.is_verified = 1",
            Vec::new(),
            &order,
            request,
        )
    }

    /// Applies a partial update to a place's scalar fields under optimistic
    /// concurrency.
    pub fn update_place(&mut self, update: &UpdatePlace) -> Result<Place> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let now = Timestamp::now().to_string();
        let rows = tx
            .execute(
                UPDATE_PLACE_SQL,
                params![
                    update.name,
                    update.category,
                    update.description,
                    update.address,
                    update.road_address,
                    update.latitude,
                    update.longitude,
                    update.phone_number,
                    update.website,
                    update.rating,
                    update.is_verified,
                    &now,
                    update.id as i64,
                    update.expected_version
                ],
            )
            .map_err(|e| StoreError::from_sqlite("Failed to update place", e))?;

        if rows == 0 {
            return Err(Self::stale_or_missing(
                &tx,
                "place",
                update.id,
                update.expected_version,
            )?);
        }

        tx.commit().db_context("Failed to commit transaction")?;

        debug!("Updated place {}", update.id);
        self.get_place(update.id)?.ok_or(StoreError::NotFound {
            entity: "place",
            id: update.id,
        })
    }

    /// Replaces a place's tag set wholesale.
    pub fn replace_place_tags(
        &mut self,
        id: u64,
        expected_version: i64,
        tags: &BTreeSet<String>,
    ) -> Result<Place> {
        self.replace_place_collection(id, expected_version, "place_tags", |tx| {
            insert_tag_rows(tx, id, tags)
        })
    }

    /// Replaces a place's ordered image list wholesale.
    pub fn replace_place_images(
        &mut self,
        id: u64,
        expected_version: i64,
        images: &[String],
    ) -> Result<Place> {
        self.replace_place_collection(id, expected_version, "place_images", |tx| {
            insert_image_rows(tx, id, images)
        })
    }

    /// Replaces a place's opening hours wholesale.
    pub fn replace_place_opening_hours(
        &mut self,
        id: u64,
        expected_version: i64,
        opening_hours: &BTreeMap<String, String>,
    ) -> Result<Place> {
        self.replace_place_collection(id, expected_version, "place_opening_hours", |tx| {
            insert_opening_hour_rows(tx, id, opening_hours)
        })
    }

    fn replace_place_collection(
        &mut self,
        id: u64,
        expected_version: i64,
        table: &str,
        insert: impl FnOnce(&rusqlite::Connection) -> Result<()>,
    ) -> Result<Place> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let rows = tx
            .execute(
                BUMP_PLACE_VERSION_SQL,
                params![Timestamp::now().to_string(), id as i64, expected_version],
            )
            .map_err(|e| StoreError::database_error("Failed to bump place version", e))?;

        if rows == 0 {
            return Err(Self::stale_or_missing(&tx, "place", id, expected_version)?);
        }

        let delete_sql = format!("DELETE FROM {table} WHERE place_id = ?1");
        tx.execute(&delete_sql, params![id as i64])
            .map_err(|e| StoreError::database_error("Failed to clear place collection", e))?;

        insert(&tx)?;

        tx.commit().db_context("Failed to commit transaction")?;

        debug!("Replaced {table} for place {id}");
        self.get_place(id)?
            .ok_or(StoreError::NotFound { entity: "place", id })
    }

    /// Soft-deletes a place: the row stays but drops out of every discovery
    /// query. Itinerary items keep their reference.
    pub fn soft_delete_place(&mut self, id: u64) -> Result<()> {
        let rows = self
            .connection
            .execute(
                SOFT_DELETE_PLACE_SQL,
                params![Timestamp::now().to_string(), id as i64],
            )
            .map_err(|e| StoreError::database_error("Failed to soft-delete place", e))?;

        if rows == 0 {
            return Err(StoreError::NotFound { entity: "place", id });
        }

        info!("Soft-deleted place {id}");
        Ok(())
    }

    /// Increments a place's view counter.
    ///
    /// Counter bumps are single-statement increments; they advance the
    /// version but never conflict with each other.
    pub fn record_place_view(&mut self, id: u64) -> Result<()> {
        let rows = self
            .connection
            .execute(RECORD_VIEW_SQL, params![Timestamp::now().to_string(), id as i64])
            .map_err(|e| StoreError::database_error("Failed to record place view", e))?;

        if rows == 0 {
            return Err(StoreError::NotFound { entity: "place", id });
        }
        Ok(())
    }

    /// Increments a place's bookmark counter.
    pub fn record_place_bookmark(&mut self, id: u64) -> Result<()> {
        let rows = self
            .connection
            .execute(
                RECORD_BOOKMARK_SQL,
                params![Timestamp::now().to_string(), id as i64],
            )
            .map_err(|e| StoreError::database_error("Failed to record place bookmark", e))?;

        if rows == 0 {
            return Err(StoreError::NotFound { entity: "place", id });
        }
        Ok(())
    }

    /// Overwrites a place's precomputed popularity score.
    pub fn update_popularity_score(&mut self, id: u64, score: f64) -> Result<()> {
        let rows = self
            .connection
            .execute(
                UPDATE_POPULARITY_SQL,
                params![score, Timestamp::now().to_string(), id as i64],
            )
            .map_err(|e| StoreError::database_error("Failed to update popularity score", e))?;

        if rows == 0 {
            return Err(StoreError::NotFound { entity: "place", id });
        }
        Ok(())
    }

    fn attach_place_collections(&self, mut place: Place) -> Result<Place> {
        let mut stmt = self
            .connection
            .prepare("SELECT day_of_week, hours FROM place_opening_hours WHERE place_id = ?1")
            .map_err(|e| StoreError::database_error("Failed to prepare opening-hours query", e))?;
        place.opening_hours = stmt
            .query_map(params![place.id as i64], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(|e| StoreError::database_error("Failed to query opening hours", e))?
            .collect::<std::result::Result<BTreeMap<_, _>, _>>()
            .map_err(|e| StoreError::database_error("Failed to fetch opening hours", e))?;

        let mut stmt = self
            .connection
            .prepare("SELECT image_url FROM place_images WHERE place_id = ?1 ORDER BY position")
            .map_err(|e| StoreError::database_error("Failed to prepare image query", e))?;
        place.images = stmt
            .query_map(params![place.id as i64], |row| row.get::<_, String>(0))
            .map_err(|e| StoreError::database_error("Failed to query images", e))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| StoreError::database_error("Failed to fetch images", e))?;

        let mut stmt = self
            .connection
            .prepare("SELECT tag FROM place_tags WHERE place_id = ?1")
            .map_err(|e| StoreError::database_error("Failed to prepare tag query", e))?;
        place.tags = stmt
            .query_map(params![place.id as i64], |row| row.get::<_, String>(0))
            .map_err(|e| StoreError::database_error("Failed to query tags", e))?
            .collect::<std::result::Result<BTreeSet<_>, _>>()
            .map_err(|e| StoreError::database_error("Failed to fetch tags", e))?;

        Ok(place)
    }

    fn page_of_places(
        &self,
        from_where: &str,
        params: Vec<Box<dyn rusqlite::ToSql>>,
        order: &str,
        request: &PageRequest,
    ) -> Result<Page<Place>> {
        let count_sql = format!("SELECT COUNT(*) FROM {from_where}");
        let count_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|b| &**b).collect();
        let total: i64 = self
            .connection
            .query_row(&count_sql, &count_refs[..], |row| row.get(0))
            .map_err(|e| StoreError::database_error("Failed to count places", e))?;

        let select_sql =
            format!("SELECT {PLACE_COLUMNS} FROM {from_where} {order} LIMIT ? OFFSET ?");
        let mut stmt = self
            .connection
            .prepare(&select_sql)
            .map_err(|e| StoreError::database_error("Failed to prepare place query", e))?;

        let mut select_params = params;
        select_params.push(Box::new(request.limit()));
        select_params.push(Box::new(request.offset()));
        let select_refs: Vec<&dyn rusqlite::ToSql> =
            select_params.iter().map(|b| &**b).collect();

        let places: Vec<Place> = stmt
            .query_map(&select_refs[..], place_from_row)
            .map_err(|e| StoreError::database_error("Failed to query places", e))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| StoreError::database_error("Failed to fetch places", e))?;

        let places = places
            .into_iter()
            .map(|place| self.attach_place_collections(place))
            .collect::<Result<Vec<_>>>()?;

        Ok(Page::new(places, total as u64, request))
    }
}
