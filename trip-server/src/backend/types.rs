//! Backend wire DTOs.
//!
//! These types map directly to the backend's JSON. They use `Option`
//! liberally because the backend omits fields rather than sending nulls,
//! and decimal columns arrive either as numbers or as strings.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::ClockTime;

/// An identifier that may be sent as a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum WireId {
    Number(i64),
    Text(String),
}

impl std::fmt::Display for WireId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WireId::Number(n) => write!(f, "{n}"),
            WireId::Text(s) => f.write_str(s),
        }
    }
}

/// A decimal that may be sent as a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Decimal {
    Number(f64),
    Text(String),
}

impl Decimal {
    /// Numeric value, if the text form parses.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Decimal::Number(n) => Some(*n),
            Decimal::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Text form as it would appear in a string column.
    pub fn as_text(&self) -> String {
        match self {
            Decimal::Number(n) => n.to_string(),
            Decimal::Text(s) => s.trim().to_string(),
        }
    }
}

/// Response from `GET /api/places`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacesResponse {
    #[serde(default)]
    pub places: Vec<PlaceDto>,
    pub pagination: Option<PaginationDto>,
}

/// Pagination block of a places response.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationDto {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub total_pages: u32,
}

/// A place from the search catalogue.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceDto {
    pub id: WireId,
    pub name: Option<String>,
    pub category: Option<CategoryDto>,
    pub city: Option<PlaceCityDto>,
    pub address: Option<String>,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub price_level: Option<Decimal>,
    pub rating: Option<Decimal>,
    pub opening_hours: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub photos: Vec<PhotoDto>,
}

/// Place category as nested in a place.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDto {
    pub name: String,
    /// Typical visit length for places of this category.
    pub avg_duration_minutes: Option<u32>,
}

/// City as nested in a place.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceCityDto {
    pub id: Option<WireId>,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PhotoDto {
    pub url: String,
}

/// Response from `GET /api/trips/:id`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripDto {
    pub id: WireId,
    #[serde(alias = "title")]
    pub name: Option<String>,
    pub destination: Option<String>,
    /// `YYYY-MM-DD` or a full ISO 8601 timestamp.
    pub start_date: String,
    pub end_date: String,
    pub status: Option<String>,
    pub description: Option<String>,
    pub estimated_budget: Option<Decimal>,
    pub travel_companions: Option<u32>,
    pub city: Option<CityDto>,
    #[serde(default)]
    pub days: Vec<DayDto>,
}

/// Destination city of a trip.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CityDto {
    pub id: i64,
    pub name: String,
    pub country: Option<String>,
}

/// One day of a trip as stored by the backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayDto {
    pub day_number: u32,
    pub date: Option<String>,
    #[serde(default, alias = "visits")]
    pub places: Vec<TripPlaceDto>,
    pub weather: Option<WeatherDto>,
    pub notes: Option<String>,
}

/// A visit as stored inside a trip day.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripPlaceDto {
    pub id: WireId,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub image: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub duration: Option<Decimal>,
    pub notes: Option<String>,
    pub rating: Option<Decimal>,
    pub price_level: Option<Decimal>,
    pub opening_hours: Option<String>,
    pub avg_duration_minutes: Option<u32>,
}

/// Response from `GET /api/cities/:id/weather`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherDto {
    pub temperature_high: Option<Decimal>,
    pub temperature_low: Option<Decimal>,
    #[serde(default)]
    pub condition: String,
    pub precipitation_chance: Option<Decimal>,
}

/// Partial trip body for `PUT /api/trips/:id`.
///
/// Built with [`TripUpdate::from_trip`](super::TripUpdate); only fields that
/// carry data are serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripUpdate {
    pub name: String,
    pub destination: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_budget: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub travel_companions: Option<u32>,
    pub days: Vec<DayUpdate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayUpdate {
    pub day_number: u32,
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub places: Vec<PlaceUpdate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceUpdate {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub address: String,
    pub latitude: String,
    pub longitude: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<ClockTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<ClockTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_level: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<String>,
}
