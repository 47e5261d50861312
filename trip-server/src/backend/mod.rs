//! Trip backend access.
//!
//! The planner talks to three collaborators: the places catalogue (paged
//! search), trip storage, and per-city daily weather. [`Backend`] reaches
//! them either over HTTP or from a directory of JSON files.
//!
//! Key characteristics of the backend:
//! - Decimal columns (coordinates, ratings, budgets) may arrive as strings
//! - Trip days store their visits under `places`
//! - A missing weather record is a 404, which is not an error for callers

mod client;
mod convert;
mod error;
mod mock;
mod types;

use chrono::NaiveDate;

use crate::domain::{Trip, Weather};
use crate::search::{SearchPage, SearchTicket};

pub use client::{BackendConfig, HttpBackend};
pub use convert::{
    ConversionError, candidate_from_place, category_type, search_page_from_response,
    trip_from_dto, weather_from_dto,
};
pub use error::BackendError;
pub use mock::MockBackend;
pub use types::{
    CategoryDto, CityDto, DayDto, DayUpdate, Decimal, PaginationDto, PhotoDto, PlaceCityDto,
    PlaceDto, PlaceUpdate, PlacesResponse, TripDto, TripPlaceDto, TripUpdate, WeatherDto, WireId,
};

/// Either a live HTTP backend or the file-backed mock.
#[derive(Clone)]
pub enum Backend {
    Http(HttpBackend),
    Mock(MockBackend),
}

impl Backend {
    /// Fetch one page of places for a search ticket.
    pub async fn search_places(&self, ticket: &SearchTicket) -> Result<SearchPage, BackendError> {
        match self {
            Backend::Http(c) => c.search_places(ticket).await,
            Backend::Mock(c) => c.search_places(ticket).await,
        }
    }

    /// Load a trip.
    pub async fn get_trip(&self, id: &str) -> Result<Trip, BackendError> {
        match self {
            Backend::Http(c) => c.get_trip(id).await,
            Backend::Mock(c) => c.get_trip(id).await,
        }
    }

    /// Persist a trip.
    pub async fn put_trip(&self, id: &str, update: &TripUpdate) -> Result<(), BackendError> {
        match self {
            Backend::Http(c) => c.put_trip(id, update).await,
            Backend::Mock(c) => c.put_trip(id, update).await,
        }
    }

    /// Weather for a city on a date.
    pub async fn get_weather(
        &self,
        city_id: i64,
        date: NaiveDate,
    ) -> Result<Option<Weather>, BackendError> {
        match self {
            Backend::Http(c) => c.get_weather(city_id, date).await,
            Backend::Mock(c) => c.get_weather(city_id, date).await,
        }
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Backend::Http(_) => "http",
            Backend::Mock(_) => "mock",
        }
    }
}

impl From<HttpBackend> for Backend {
    fn from(client: HttpBackend) -> Self {
        Backend::Http(client)
    }
}

impl From<MockBackend> for Backend {
    fn from(client: MockBackend) -> Self {
        Backend::Mock(client)
    }
}
