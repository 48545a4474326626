//! Opt-in memoisation of forecasts
//!
//! The orchestrator always retrains. Callers that accept serving a stored
//! forecast for an identical request can wrap it in a [`ForecastCache`].
//! A hit requires the stored request to equal the new one exactly (series,
//! strategy, horizon and config), so any new observation produces a fresh
//! forecast. Failures are never stored. The oldest entry is evicted once
//! the cache is full.

use crate::models::ForecastResult;
use crate::orchestrator::{FailureResult, ForecastOrchestrator, ForecastRequest};
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, VecDeque};
use std::hash::{Hash, Hasher};
use std::sync::{Mutex, MutexGuard};

/// Entries kept by [`ForecastCache::new`]
pub const DEFAULT_CACHE_CAPACITY: usize = 128;

/// Bucket index; equal requests always share one
fn fingerprint(request: &ForecastRequest) -> u64 {
    let mut hasher = DefaultHasher::new();
    request.strategy.hash(&mut hasher);
    request.horizon.hash(&mut hasher);
    request.series.len().hash(&mut hasher);
    for point in &request.series {
        point.timestamp.hash(&mut hasher);
        point.close.to_bits().hash(&mut hasher);
    }
    format!("{:?}", request.config).hash(&mut hasher);
    hasher.finish()
}

#[derive(Debug)]
struct CacheEntry {
    request: ForecastRequest,
    result: ForecastResult,
}

#[derive(Debug, Default)]
struct CacheState {
    buckets: HashMap<u64, Vec<CacheEntry>>,
    /// Fingerprints in insertion order, one per stored entry
    order: VecDeque<u64>,
}

impl CacheState {
    fn get(&self, key: u64, request: &ForecastRequest) -> Option<&ForecastResult> {
        self.buckets
            .get(&key)?
            .iter()
            .find(|entry| entry.request == *request)
            .map(|entry| &entry.result)
    }

    fn insert(
        &mut self,
        key: u64,
        request: ForecastRequest,
        result: ForecastResult,
        capacity: usize,
    ) {
        if capacity == 0 || self.get(key, &request).is_some() {
            return;
        }
        while self.order.len() >= capacity {
            self.evict_oldest();
        }
        self.buckets
            .entry(key)
            .or_default()
            .push(CacheEntry { request, result });
        self.order.push_back(key);
    }

    fn evict_oldest(&mut self) {
        let key = match self.order.pop_front() {
            Some(key) => key,
            None => return,
        };
        // entries within a bucket are in insertion order too
        if let Some(bucket) = self.buckets.get_mut(&key) {
            if !bucket.is_empty() {
                bucket.remove(0);
            }
            if bucket.is_empty() {
                self.buckets.remove(&key);
            }
        }
    }

    fn len(&self) -> usize {
        self.order.len()
    }

    fn clear(&mut self) {
        self.buckets.clear();
        self.order.clear();
    }
}

/// Bounded forecast memo in front of a [`ForecastOrchestrator`]
#[derive(Debug)]
pub struct ForecastCache {
    orchestrator: ForecastOrchestrator,
    capacity: usize,
    state: Mutex<CacheState>,
}

impl Default for ForecastCache {
    fn default() -> Self {
        Self::new(ForecastOrchestrator::default())
    }
}

impl ForecastCache {
    pub fn new(orchestrator: ForecastOrchestrator) -> Self {
        Self::with_capacity(orchestrator, DEFAULT_CACHE_CAPACITY)
    }

    /// Cache holding at most `capacity` forecasts; 0 disables storage
    pub fn with_capacity(orchestrator: ForecastOrchestrator, capacity: usize) -> Self {
        Self {
            orchestrator,
            capacity,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn state(&self) -> MutexGuard<'_, CacheState> {
        // A panic while holding the lock cannot leave a half-written entry.
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Return the stored forecast for an identical request, or run and store it
    pub fn forecast(&self, request: &ForecastRequest) -> Result<ForecastResult, FailureResult> {
        let key = fingerprint(request);
        if let Some(hit) = self.state().get(key, request) {
            log::debug!("forecast cache hit for {} request", request.strategy);
            return Ok(hit.clone());
        }

        // Lock released while the model runs
        let result = self.orchestrator.forecast(request)?;
        self.state()
            .insert(key, request.clone(), result.clone(), self.capacity);
        Ok(result)
    }

    pub fn len(&self) -> usize {
        self.state().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.state().clear();
    }
}
