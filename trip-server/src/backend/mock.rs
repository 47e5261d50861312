//! File-backed mock backend for development without a running API.
//!
//! Reads a data directory laid out as:
//!
//! ```text
//! data/
//!   places.json          array of catalogue places
//!   weather.json         { "<cityId>": { "YYYY-MM-DD": weather } }
//!   trips/<id>.json      one stored trip per file
//! ```
//!
//! `places.json` and `weather.json` are optional. Saving a trip merges the
//! update into the stored JSON and writes the file back.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::info;

use crate::domain::{Trip, Weather};
use crate::search::{Pagination, SearchPage, SearchQuery, SearchTicket};

use super::convert::{category_type, search_page_from_response, trip_from_dto, weather_from_dto};
use super::error::BackendError;
use super::types::{PlaceDto, PlacesResponse, TripDto, TripUpdate, WeatherDto};

type WeatherTable = HashMap<i64, HashMap<NaiveDate, WeatherDto>>;

struct MockData {
    trips: HashMap<String, Value>,
    places: Vec<PlaceDto>,
    weather: WeatherTable,
}

/// Mock backend that serves data from JSON files.
#[derive(Clone)]
pub struct MockBackend {
    data_dir: PathBuf,
    data: Arc<RwLock<MockData>>,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, BackendError> {
    let json = std::fs::read_to_string(path)?;
    serde_json::from_str(&json).map_err(|e| BackendError::Json {
        message: format!("{}: {e}", path.display()),
        body: None,
    })
}

fn load(data_dir: &Path) -> Result<MockData, BackendError> {
    if !data_dir.is_dir() {
        return Err(BackendError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("mock data directory {} not found", data_dir.display()),
        )));
    }

    let places_path = data_dir.join("places.json");
    let places = if places_path.is_file() {
        read_json(&places_path)?
    } else {
        Vec::new()
    };

    let weather_path = data_dir.join("weather.json");
    let weather = if weather_path.is_file() {
        read_json(&weather_path)?
    } else {
        HashMap::new()
    };

    let mut trips = HashMap::new();
    let trips_dir = data_dir.join("trips");
    if trips_dir.is_dir() {
        for entry in std::fs::read_dir(&trips_dir)? {
            let path = entry?.path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let value: Value = read_json(&path)?;
            trips.insert(id.to_string(), value);
        }
    }

    Ok(MockData {
        trips,
        places,
        weather,
    })
}

fn matches_query(place: &PlaceDto, query: &SearchQuery) -> bool {
    let contains = |haystack: Option<&str>, needle: &str| {
        haystack.is_some_and(|h| h.to_lowercase().contains(&needle.to_lowercase()))
    };

    if let Some(text) = query.text.as_deref().filter(|t| !t.trim().is_empty()) {
        let text = text.trim();
        if !contains(place.name.as_deref(), text) && !contains(place.address.as_deref(), text) {
            return false;
        }
    }

    if let Some(category) = query.category.as_deref().filter(|c| !c.trim().is_empty()) {
        let Some(cat) = &place.category else {
            return false;
        };
        if category_type(&cat.name) != category && !contains(Some(cat.name.as_str()), category) {
            return false;
        }
    }

    if let Some(city) = query.city.as_deref().filter(|c| !c.trim().is_empty()) {
        let Some(place_city) = &place.city else {
            return false;
        };
        let id_matches = place_city.id.as_ref().is_some_and(|id| id.to_string() == city);
        if !id_matches && !place_city.name.eq_ignore_ascii_case(city) {
            return false;
        }
    }

    true
}

impl MockBackend {
    /// Load mock data from a directory.
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self, BackendError> {
        let data_dir = data_dir.as_ref().to_path_buf();
        let data = load(&data_dir)?;
        info!(
            dir = %data_dir.display(),
            trips = data.trips.len(),
            places = data.places.len(),
            "loaded mock backend data"
        );
        Ok(Self {
            data_dir,
            data: Arc::new(RwLock::new(data)),
        })
    }

    /// Serve one page of places matching the ticket's query.
    pub async fn search_places(&self, ticket: &SearchTicket) -> Result<SearchPage, BackendError> {
        let data = self.data.read().await;
        let matching: Vec<&PlaceDto> = data
            .places
            .iter()
            .filter(|p| matches_query(p, &ticket.query))
            .collect();

        let limit = ticket.limit.max(1);
        let total = matching.len() as u64;
        let skip = (ticket.page.saturating_sub(1) as usize).saturating_mul(limit as usize);
        let places = matching
            .into_iter()
            .skip(skip)
            .take(limit as usize)
            .cloned()
            .collect();

        let mut page = search_page_from_response(&PlacesResponse {
            places,
            pagination: None,
        });
        page.pagination = Some(Pagination {
            total,
            page: ticket.page,
            limit,
            total_pages: total.div_ceil(u64::from(limit)) as u32,
        });
        Ok(page)
    }

    /// Load a stored trip.
    pub async fn get_trip(&self, id: &str) -> Result<Trip, BackendError> {
        let data = self.data.read().await;
        let value = data
            .trips
            .get(id)
            .ok_or_else(|| BackendError::NotFound(format!("trip {id}")))?;

        let dto: TripDto = serde_json::from_value(value.clone()).map_err(|e| BackendError::Json {
            message: e.to_string(),
            body: None,
        })?;
        trip_from_dto(&dto).map_err(|e| BackendError::Json {
            message: e.to_string(),
            body: None,
        })
    }

    /// Merge an update into a stored trip and write it back to disk.
    pub async fn put_trip(&self, id: &str, update: &TripUpdate) -> Result<(), BackendError> {
        let mut data = self.data.write().await;
        let stored = data
            .trips
            .get_mut(id)
            .ok_or_else(|| BackendError::NotFound(format!("trip {id}")))?;

        let patch = serde_json::to_value(update).map_err(|e| BackendError::Json {
            message: e.to_string(),
            body: None,
        })?;
        if let (Some(target), Value::Object(fields)) = (stored.as_object_mut(), patch) {
            target.extend(fields);
        }

        let json = serde_json::to_string_pretty(&*stored).map_err(|e| BackendError::Json {
            message: e.to_string(),
            body: None,
        })?;
        let path = self.data_dir.join("trips").join(format!("{id}.json"));
        tokio::fs::write(&path, json).await?;
        info!(trip_id = id, path = %path.display(), "saved mock trip");
        Ok(())
    }

    /// Weather for a city on a date, if the mock data has it.
    pub async fn get_weather(
        &self,
        city_id: i64,
        date: NaiveDate,
    ) -> Result<Option<Weather>, BackendError> {
        let data = self.data.read().await;
        Ok(data
            .weather
            .get(&city_id)
            .and_then(|days| days.get(&date))
            .map(weather_from_dto))
    }

    /// Ids of the stored trips.
    pub async fn trip_ids(&self) -> Vec<String> {
        let data = self.data.read().await;
        let mut ids: Vec<String> = data.trips.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Reload mock data from disk.
    pub async fn reload(&self) -> Result<(), BackendError> {
        let fresh = load(&self.data_dir)?;
        *self.data.write().await = fresh;
        Ok(())
    }
}
