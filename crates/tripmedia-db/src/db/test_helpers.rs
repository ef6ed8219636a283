//! In-memory store implementations for tests

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tripmedia_core::models::{LocationUpdate, MediaAsset, NewMediaAsset, Place, Visibility};
use tripmedia_core::AppError;

use super::traits::{FriendshipStore, MediaStore, PlaceStore};

fn injected(operation: &str) -> AppError {
    AppError::Internal(format!("injected {} failure", operation))
}

/// Media records kept in a map, with optional write failures
#[derive(Clone, Default)]
pub struct InMemoryMediaStore {
    records: Arc<Mutex<HashMap<i64, MediaAsset>>>,
    next_id: Arc<AtomicI64>,
    fail_insert: Arc<AtomicBool>,
    fail_delete: Arc<AtomicBool>,
}

impl InMemoryMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_inserts(&self, fail: bool) {
        self.fail_insert.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: i64) -> bool {
        self.records.lock().unwrap().contains_key(&id)
    }
}

#[async_trait]
impl MediaStore for InMemoryMediaStore {
    async fn insert(&self, media: NewMediaAsset) -> Result<MediaAsset, AppError> {
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(injected("insert"));
        }
        let mut records = self.records.lock().unwrap();
        if records.values().any(|r| r.storage_key == media.storage_key) {
            return Err(AppError::InvalidInput(format!(
                "duplicate storage key {}",
                media.storage_key
            )));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let asset = MediaAsset {
            id,
            trip_id: media.trip_id,
            user_id: media.user_id,
            place_id: media.place_id,
            kind: media.kind,
            storage_key: media.storage_key,
            visibility: media.visibility,
            uploaded_at: media.uploaded_at,
            captured_at: media.captured_at,
            gps_latitude: media.gps_latitude,
            gps_longitude: media.gps_longitude,
            gps_altitude: media.gps_altitude,
        };
        records.insert(id, asset.clone());
        Ok(asset)
    }

    async fn get(&self, id: i64) -> Result<Option<MediaAsset>, AppError> {
        Ok(self.records.lock().unwrap().get(&id).cloned())
    }

    async fn list_by_trip(&self, trip_id: i64) -> Result<Vec<MediaAsset>, AppError> {
        let mut assets: Vec<MediaAsset> = self
            .records
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.trip_id == trip_id)
            .cloned()
            .collect();
        assets.sort_by_key(|a| (a.uploaded_at, a.id));
        Ok(assets)
    }

    async fn update_location(
        &self,
        id: i64,
        update: LocationUpdate,
    ) -> Result<Option<MediaAsset>, AppError> {
        let mut records = self.records.lock().unwrap();
        Ok(records.get_mut(&id).map(|asset| {
            asset.gps_latitude = update.latitude;
            asset.gps_longitude = update.longitude;
            asset.gps_altitude = update.altitude;
            asset.place_id = update.place_id;
            asset.clone()
        }))
    }

    async fn update_visibility(
        &self,
        id: i64,
        visibility: Visibility,
    ) -> Result<Option<MediaAsset>, AppError> {
        let mut records = self.records.lock().unwrap();
        Ok(records.get_mut(&id).map(|asset| {
            asset.visibility = visibility;
            asset.clone()
        }))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(injected("delete"));
        }
        Ok(self.records.lock().unwrap().remove(&id).is_some())
    }

    async fn list_storage_keys(&self) -> Result<Vec<String>, AppError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .values()
            .map(|r| r.storage_key.clone())
            .collect())
    }
}

/// Places keyed by (country, city)
#[derive(Clone, Default)]
pub struct InMemoryPlaceStore {
    places: Arc<Mutex<HashMap<(String, String), Place>>>,
    next_id: Arc<AtomicI64>,
    upserts: Arc<AtomicUsize>,
}

impl InMemoryPlaceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.places.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How many times `upsert` was called
    pub fn upsert_calls(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlaceStore for InMemoryPlaceStore {
    async fn find_by_country_city(
        &self,
        country: &str,
        city: &str,
    ) -> Result<Option<Place>, AppError> {
        Ok(self
            .places
            .lock()
            .unwrap()
            .get(&(country.to_string(), city.to_string()))
            .cloned())
    }

    async fn get(&self, id: i64) -> Result<Option<Place>, AppError> {
        Ok(self
            .places
            .lock()
            .unwrap()
            .values()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn upsert(&self, name: &str, country: &str, city: &str) -> Result<Place, AppError> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        let mut places = self.places.lock().unwrap();
        let place = places
            .entry((country.to_string(), city.to_string()))
            .or_insert_with(|| Place {
                id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
                name: name.to_string(),
                country: country.to_string(),
                city: city.to_string(),
            });
        Ok(place.clone())
    }
}

/// Symmetric friendship set with call counting, failures and latency
#[derive(Clone, Default)]
pub struct InMemoryFriendshipStore {
    pairs: Arc<Mutex<HashSet<(i64, i64)>>>,
    calls: Arc<AtomicUsize>,
    fail: Arc<AtomicBool>,
    delay: Arc<Mutex<Option<Duration>>>,
}

impl InMemoryFriendshipStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a one-directional friendship row
    pub fn add(&self, user_id: i64, friend_id: i64) {
        self.pairs.lock().unwrap().insert((user_id, friend_id));
    }

    pub fn fail_lookups(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock().unwrap() = delay;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FriendshipStore for InMemoryFriendshipStore {
    async fn are_friends(&self, user_id: i64, other_id: i64) -> Result<bool, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(injected("friendship lookup"));
        }
        let pairs = self.pairs.lock().unwrap();
        Ok(pairs.contains(&(user_id, other_id)) || pairs.contains(&(other_id, user_id)))
    }
}
