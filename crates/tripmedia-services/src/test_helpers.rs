//! Fakes for the outbound HTTP collaborators

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tripmedia_core::models::{GeoPoint, PlaceName};

use crate::geocoding::{GeocodingError, ReverseGeocoder};
use crate::identity::{IdentityError, IdentityResolver};

fn point_key(point: GeoPoint) -> (i64, i64) {
    (
        (point.latitude * 1e4).round() as i64,
        (point.longitude * 1e4).round() as i64,
    )
}

/// Geocoder answering from a table keyed on coordinates rounded to 4 decimals
#[derive(Clone, Default)]
pub struct FakeGeocoder {
    answers: Arc<Mutex<HashMap<(i64, i64), PlaceName>>>,
    default: Arc<Mutex<Option<PlaceName>>>,
    fail: Arc<AtomicBool>,
    calls: Arc<AtomicUsize>,
}

impl FakeGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, point: GeoPoint, place: PlaceName) {
        self.answers.lock().unwrap().insert(point_key(point), place);
    }

    /// Answer for coordinates without a specific entry
    pub fn set_default(&self, place: PlaceName) {
        *self.default.lock().unwrap() = Some(place);
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReverseGeocoder for FakeGeocoder {
    async fn reverse(&self, point: GeoPoint) -> Result<PlaceName, GeocodingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(GeocodingError::Unreachable("injected failure".to_string()));
        }
        let answer = self.answers.lock().unwrap().get(&point_key(point)).cloned();
        Ok(answer
            .or_else(|| self.default.lock().unwrap().clone())
            .unwrap_or_default())
    }
}

/// Identity resolver backed by a fixed token table. Stored ids are returned as-is,
/// including 0, so callers can exercise their own anonymous-session handling.
#[derive(Clone, Default)]
pub struct StaticIdentityResolver {
    tokens: Arc<Mutex<HashMap<String, i64>>>,
}

impl StaticIdentityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, token: &str, user_id: i64) -> Self {
        self.tokens
            .lock()
            .unwrap()
            .insert(token.to_string(), user_id);
        self
    }
}

#[async_trait]
impl IdentityResolver for StaticIdentityResolver {
    async fn resolve(&self, token: &str) -> Result<i64, IdentityError> {
        match self.tokens.lock().unwrap().get(token).copied() {
            Some(user_id) => Ok(user_id),
            None => Err(IdentityError::Rejected(401)),
        }
    }
}
