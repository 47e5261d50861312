//! Caching layer for weather lookups.
//!
//! Weather is fetched per trip day and keyed by `(city id, date)`. Several
//! trips to the same city, and every reopen of the same trip, hit the same
//! keys, so lookups are cached for a short TTL. "No weather" answers are
//! cached too; failed lookups are not.

use std::time::Duration;

use chrono::NaiveDate;
use futures::future::join_all;
use moka::future::Cache as MokaCache;
use tracing::{debug, warn};

use crate::backend::{Backend, BackendError, TripUpdate};
use crate::domain::{Trip, Weather};
use crate::search::{SearchPage, SearchTicket};

/// Cache key for weather: (city id, date).
type WeatherKey = (i64, NaiveDate);

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(30 * 60),
            max_capacity: 1000,
        }
    }
}

impl CacheConfig {
    /// Set the TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the maximum number of entries.
    pub fn with_max_capacity(mut self, n: u64) -> Self {
        self.max_capacity = n;
        self
    }
}

/// Backend with cached weather lookups.
///
/// Other calls pass straight through to the wrapped [`Backend`].
pub struct CachedBackend {
    backend: Backend,
    weather: MokaCache<WeatherKey, Option<Weather>>,
}

impl CachedBackend {
    /// Create a new cached backend.
    pub fn new(backend: Backend, config: &CacheConfig) -> Self {
        let weather = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { backend, weather }
    }

    /// Weather for a city on a date, using the cache if available.
    pub async fn get_weather(
        &self,
        city_id: i64,
        date: NaiveDate,
    ) -> Result<Option<Weather>, BackendError> {
        let key = (city_id, date);

        if let Some(cached) = self.weather.get(&key).await {
            return Ok(cached);
        }

        let weather = self.backend.get_weather(city_id, date).await?;
        self.weather.insert(key, weather.clone()).await;
        Ok(weather)
    }

    /// Look up the weather of every day of a trip concurrently.
    ///
    /// Returns `(day number, weather)` pairs in day order. A failed lookup
    /// yields `None` for that day and logs a warning. A trip without a city
    /// yields `None` for every day.
    pub async fn load_weather(&self, trip: &Trip) -> Vec<(u32, Option<Weather>)> {
        let Some(city) = &trip.city else {
            debug!(trip_id = %trip.id, "trip has no city, skipping weather");
            return trip.days.iter().map(|d| (d.day_number, None)).collect();
        };

        let lookups = trip.days.iter().map(|day| async move {
            match self.get_weather(city.id, day.date).await {
                Ok(weather) => (day.day_number, weather),
                Err(e) => {
                    warn!(trip_id = %trip.id, day = day.day_number, date = %day.date, error = %e, "weather lookup failed");
                    (day.day_number, None)
                }
            }
        });

        join_all(lookups).await
    }

    /// Fetch one page of places.
    pub async fn search_places(&self, ticket: &SearchTicket) -> Result<SearchPage, BackendError> {
        self.backend.search_places(ticket).await
    }

    /// Load a trip.
    pub async fn get_trip(&self, id: &str) -> Result<Trip, BackendError> {
        self.backend.get_trip(id).await
    }

    /// Persist a trip.
    pub async fn put_trip(&self, id: &str, update: &TripUpdate) -> Result<(), BackendError> {
        self.backend.put_trip(id, update).await
    }

    /// Access the underlying backend.
    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// Get cache statistics.
    pub async fn cache_entry_count(&self) -> u64 {
        self.weather.run_pending_tasks().await;
        self.weather.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_cache(&self) {
        self.weather.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;
    use crate::domain::CityRef;
    use tempfile::TempDir;

    const WEATHER: &str = r#"{
        "1": {
            "2025-04-20": {"temperatureHigh": 31, "temperatureLow": 24, "condition": "sunny", "precipitationChance": 10},
            "2025-04-22": {"temperatureHigh": 29, "temperatureLow": 23, "condition": "rain", "precipitationChance": 90}
        }
    }"#;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn cached(dir: &TempDir) -> CachedBackend {
        std::fs::write(dir.path().join("weather.json"), WEATHER).unwrap();
        let mock = MockBackend::new(dir.path()).unwrap();
        CachedBackend::new(Backend::Mock(mock), &CacheConfig::default())
    }

    fn trip(city: Option<i64>) -> Trip {
        let mut trip = Trip::new("t1", "Trip", "Hanoi", date(2025, 4, 20), date(2025, 4, 22)).unwrap();
        trip.city = city.map(|id| CityRef {
            id,
            name: "Hanoi".into(),
            country: "Vietnam".into(),
        });
        trip
    }

    #[test]
    fn default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(1800));
        assert_eq!(config.max_capacity, 1000);
    }

    #[tokio::test]
    async fn loads_weather_per_day() {
        let dir = TempDir::new().unwrap();
        let backend = cached(&dir);

        let loaded = backend.load_weather(&trip(Some(1))).await;
        let summary: Vec<(u32, Option<String>)> = loaded
            .into_iter()
            .map(|(day, w)| (day, w.map(|w| w.condition)))
            .collect();

        assert_eq!(
            summary,
            vec![
                (1, Some("sunny".to_string())),
                (2, None),
                (3, Some("rain".to_string())),
            ]
        );
        assert_eq!(backend.cache_entry_count().await, 3);
    }

    #[tokio::test]
    async fn cityless_trip_has_no_weather() {
        let dir = TempDir::new().unwrap();
        let backend = cached(&dir);

        let loaded = backend.load_weather(&trip(None)).await;
        assert_eq!(loaded.len(), 3);
        assert!(loaded.iter().all(|(_, w)| w.is_none()));
        assert_eq!(backend.cache_entry_count().await, 0);
    }

    #[tokio::test]
    async fn cached_answers_survive_reload() {
        let dir = TempDir::new().unwrap();
        let backend = cached(&dir);

        let first = backend.get_weather(1, date(2025, 4, 20)).await.unwrap();
        assert!(first.is_some());

        std::fs::write(dir.path().join("weather.json"), "{}").unwrap();
        if let Backend::Mock(mock) = backend.backend() {
            mock.reload().await.unwrap();
        }

        let second = backend.get_weather(1, date(2025, 4, 20)).await.unwrap();
        assert_eq!(first, second);

        backend.invalidate_cache();
        let third = backend.get_weather(1, date(2025, 4, 20)).await.unwrap();
        assert!(third.is_none());
    }
}
