//! Conversion between backend DTOs and domain types.
//!
//! Incoming data is lenient: malformed optional fields are dropped rather
//! than failing the whole trip, and visits without a name are skipped with a
//! warning. Outgoing updates are filtered so the backend only receives
//! values it accepts.

use chrono::{Duration, NaiveDate};
use tracing::warn;

use crate::domain::{
    Candidate, CityRef, ClockTime, Coordinates, Day, MINUTES_PER_DAY, OUTDOOR_CATEGORY, PriceLevel,
    Rating, Trip, TripStatus, Visit, Weather,
};
use crate::search::{Pagination, SearchPage};

use super::types::{
    DayUpdate, Decimal, PlaceDto, PlaceUpdate, PlacesResponse, TripDto, TripPlaceDto, TripUpdate,
    WeatherDto,
};

/// Error during DTO to domain conversion.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConversionError {
    /// Failed to parse a date string
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// Missing required field
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

/// Map a catalogue category name to a visit type tag.
///
/// # Examples
///
/// ```
/// use trip_server::backend::category_type;
///
/// assert_eq!(category_type("Vietnamese Restaurant"), "restaurant");
/// assert_eq!(category_type("Coffee Shop"), "cafe");
/// assert_eq!(category_type("Historical Site"), "tourist_attraction");
/// ```
pub fn category_type(name: &str) -> &'static str {
    let name = name.to_lowercase();
    if name.contains("restaurant") || name.contains("food") {
        "restaurant"
    } else if name.contains("cafe") || name.contains("coffee") {
        "cafe"
    } else if name.contains("hotel") || name.contains("hostel") {
        "hotel"
    } else if name.contains("shop") || name.contains("mall") || name.contains("market") {
        "shopping"
    } else if name.contains("museum") {
        "museum"
    } else {
        OUTDOOR_CATEGORY
    }
}

/// Parse `YYYY-MM-DD`, ignoring any time-of-day suffix.
fn parse_date(s: &str) -> Result<NaiveDate, ConversionError> {
    let s = s.trim();
    let date_part = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| ConversionError::InvalidDate(s.to_string()))
}

fn price_level(dto: &Decimal) -> Option<PriceLevel> {
    match dto {
        Decimal::Number(n) => PriceLevel::new(n.round() as u8).ok(),
        Decimal::Text(s) => PriceLevel::parse(s),
    }
}

fn rating(dto: &Decimal) -> Option<Rating> {
    dto.as_f64().and_then(|r| Rating::new(r).ok())
}

fn location(latitude: Option<&Decimal>, longitude: Option<&Decimal>) -> Option<Coordinates> {
    let latitude = latitude.map(Decimal::as_text);
    let longitude = longitude.map(Decimal::as_text);
    Coordinates::from_strings(latitude.as_deref(), longitude.as_deref())
}

fn non_empty(s: Option<&str>) -> Option<String> {
    s.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Convert a catalogue place to a search candidate.
pub fn candidate_from_place(place: &PlaceDto) -> Result<Candidate, ConversionError> {
    let name = non_empty(place.name.as_deref()).ok_or(ConversionError::MissingField("name"))?;
    let category = place
        .category
        .as_ref()
        .map(|c| category_type(&c.name))
        .unwrap_or(OUTDOOR_CATEGORY);

    let mut candidate = Candidate::new(place.id.to_string(), name, category);
    candidate.address = non_empty(place.address.as_deref()).unwrap_or_default();
    candidate.location = location(place.latitude.as_ref(), place.longitude.as_ref());
    candidate.image = non_empty(place.image_url.as_deref())
        .or_else(|| place.photos.first().map(|p| p.url.clone()))
        .unwrap_or_default();
    candidate.rating = place.rating.as_ref().and_then(rating);
    candidate.price_level = place.price_level.as_ref().and_then(price_level);
    candidate.opening_hours = non_empty(place.opening_hours.as_deref());
    candidate.avg_duration_minutes = place
        .category
        .as_ref()
        .and_then(|c| c.avg_duration_minutes)
        .filter(plausible_minutes);
    Ok(candidate)
}

/// Convert one page of search results.
///
/// Places that cannot become candidates are skipped.
pub fn search_page_from_response(response: &PlacesResponse) -> SearchPage {
    let candidates = response
        .places
        .iter()
        .filter_map(|place| match candidate_from_place(place) {
            Ok(c) => Some(c),
            Err(e) => {
                warn!(place_id = %place.id, error = %e, "skipping search result");
                None
            }
        })
        .collect();

    let pagination = response.pagination.as_ref().map(|p| Pagination {
        total: p.total,
        page: p.page,
        limit: p.limit,
        total_pages: p.total_pages,
    });

    SearchPage {
        candidates,
        pagination,
    }
}

fn visit_from_dto(dto: &TripPlaceDto) -> Result<Visit, ConversionError> {
    let name = non_empty(dto.name.as_deref()).ok_or(ConversionError::MissingField("name"))?;
    let category = non_empty(dto.kind.as_deref()).unwrap_or_else(|| OUTDOOR_CATEGORY.to_string());

    let mut visit = Visit::new(dto.id.to_string(), name, category);
    visit.address = non_empty(dto.address.as_deref()).unwrap_or_default();
    visit.location = location(dto.latitude.as_ref(), dto.longitude.as_ref());
    visit.image = non_empty(dto.image.as_deref()).unwrap_or_default();
    visit.start_time = dto
        .start_time
        .as_deref()
        .and_then(|s| ClockTime::parse_loose(s).ok());
    visit.end_time = dto
        .end_time
        .as_deref()
        .and_then(|s| ClockTime::parse_loose(s).ok());
    visit.duration = dto
        .duration
        .as_ref()
        .and_then(Decimal::as_f64)
        .filter(|d| (1.0..=f64::from(MINUTES_PER_DAY)).contains(d))
        .map(|d| d.round() as u32);
    visit.avg_duration_minutes = dto.avg_duration_minutes.filter(plausible_minutes);
    visit.notes = non_empty(dto.notes.as_deref());
    visit.rating = dto.rating.as_ref().and_then(rating);
    visit.price_level = dto.price_level.as_ref().and_then(price_level);
    visit.opening_hours = non_empty(dto.opening_hours.as_deref());
    Ok(visit)
}

/// Durations must be positive and fit in one day.
fn plausible_minutes(minutes: &u32) -> bool {
    (1..=MINUTES_PER_DAY).contains(minutes)
}

/// Convert a weather record.
pub fn weather_from_dto(dto: &WeatherDto) -> Weather {
    let number = |d: &Option<Decimal>| d.as_ref().and_then(Decimal::as_f64).unwrap_or(0.0);
    Weather {
        temperature_high: number(&dto.temperature_high),
        temperature_low: number(&dto.temperature_low),
        condition: dto.condition.trim().to_lowercase(),
        precipitation_chance: number(&dto.precipitation_chance).clamp(0.0, 100.0).round() as u8,
    }
}

fn status_from_str(s: Option<&str>) -> TripStatus {
    match s.map(|s| s.trim().to_lowercase()).as_deref() {
        Some("planned") => TripStatus::Planned,
        Some("completed") => TripStatus::Completed,
        _ => TripStatus::Draft,
    }
}

fn status_str(status: TripStatus) -> &'static str {
    match status {
        TripStatus::Draft => "draft",
        TripStatus::Planned => "planned",
        TripStatus::Completed => "completed",
    }
}

/// Convert a stored trip.
///
/// Days are ordered by number. A day without a date takes its offset from
/// the trip start.
pub fn trip_from_dto(dto: &TripDto) -> Result<Trip, ConversionError> {
    let start_date = parse_date(&dto.start_date)?;
    let end_date = parse_date(&dto.end_date)?;

    let mut days = Vec::with_capacity(dto.days.len());
    for day_dto in &dto.days {
        let date = match day_dto.date.as_deref() {
            Some(d) => parse_date(d)?,
            None => start_date + Duration::days(i64::from(day_dto.day_number.saturating_sub(1))),
        };
        let mut day = Day::new(day_dto.day_number, date);
        day.notes = non_empty(day_dto.notes.as_deref());
        day.weather = day_dto.weather.as_ref().map(weather_from_dto);
        for place in &day_dto.places {
            match visit_from_dto(place) {
                Ok(visit) => day.visits.push(visit),
                Err(e) => {
                    warn!(trip_id = %dto.id, day = day_dto.day_number, visit_id = %place.id, error = %e, "skipping stored visit");
                }
            }
        }
        days.push(day);
    }
    days.sort_by_key(|d| d.day_number);

    Ok(Trip {
        id: dto.id.to_string(),
        name: non_empty(dto.name.as_deref()).unwrap_or_default(),
        destination: non_empty(dto.destination.as_deref()).unwrap_or_default(),
        start_date,
        end_date,
        days,
        status: status_from_str(dto.status.as_deref()),
        description: non_empty(dto.description.as_deref()),
        estimated_budget: dto.estimated_budget.as_ref().and_then(Decimal::as_f64),
        travel_companions: dto.travel_companions,
        city: dto.city.as_ref().map(|c| CityRef {
            id: c.id,
            name: c.name.clone(),
            country: c.country.clone().unwrap_or_default(),
        }),
    })
}

fn place_update(visit: &Visit) -> Option<PlaceUpdate> {
    let name = visit.name.trim();
    if name.is_empty() {
        return None;
    }
    let location = visit.location?;

    Some(PlaceUpdate {
        id: visit.id.to_string(),
        name: name.to_string(),
        kind: visit.category.trim().to_string(),
        address: visit.address.trim().to_string(),
        latitude: location.latitude.to_string(),
        longitude: location.longitude.to_string(),
        image: visit.image.trim().to_string(),
        start_time: visit.start_time,
        end_time: visit.end_time,
        duration: visit.duration.filter(|d| *d > 0),
        notes: non_empty(visit.notes.as_deref()),
        rating: visit
            .rating
            .map(|r| r.value())
            .filter(|r| (0.0..=5.0).contains(r)),
        price_level: visit.price_level.map(|p| p.value()),
        opening_hours: non_empty(visit.opening_hours.as_deref()),
    })
}

impl TripUpdate {
    /// Build the save body for a trip.
    ///
    /// Visits without a name or a usable location are left out.
    pub fn from_trip(trip: &Trip) -> Self {
        let days = trip
            .days
            .iter()
            .map(|day| DayUpdate {
                day_number: day.day_number,
                date: day.date,
                notes: non_empty(day.notes.as_deref()),
                places: day.visits.iter().filter_map(place_update).collect(),
            })
            .collect();

        Self {
            name: trip.name.trim().to_string(),
            destination: trip.destination.trim().to_string(),
            description: non_empty(trip.description.as_deref()),
            status: status_str(trip.status).to_string(),
            start_date: trip.start_date,
            end_date: trip.end_date,
            estimated_budget: trip.estimated_budget.filter(|b| b.is_finite() && *b >= 0.0),
            travel_companions: trip.travel_companions,
            days,
        }
    }

    /// Number of visits carried by the update.
    pub fn visit_count(&self) -> usize {
        self.days.iter().map(|d| d.places.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::types::{CategoryDto, DayDto, PhotoDto, WireId};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn place(id: i64, name: Option<&str>) -> PlaceDto {
        PlaceDto {
            id: WireId::Number(id),
            name: name.map(str::to_string),
            category: None,
            city: None,
            address: None,
            latitude: None,
            longitude: None,
            price_level: None,
            rating: None,
            opening_hours: None,
            image_url: None,
            photos: Vec::new(),
        }
    }

    fn stored(id: &str, name: &str) -> TripPlaceDto {
        TripPlaceDto {
            id: WireId::Text(id.to_string()),
            name: Some(name.to_string()),
            kind: Some("cafe".into()),
            address: None,
            latitude: Some(Decimal::Text("21.03".into())),
            longitude: Some(Decimal::Text("105.85".into())),
            image: None,
            start_time: Some("9:00".into()),
            end_time: Some("bogus".into()),
            duration: Some(Decimal::Number(45.0)),
            notes: Some("  ".into()),
            rating: Some(Decimal::Number(7.0)),
            price_level: Some(Decimal::Text("$$".into())),
            opening_hours: None,
            avg_duration_minutes: None,
        }
    }

    #[test]
    fn place_to_candidate() {
        let mut p = place(7, Some(" Temple of Literature "));
        p.category = Some(CategoryDto {
            name: "Historical Site".into(),
            avg_duration_minutes: Some(75),
        });
        p.latitude = Some(Decimal::Text("21.0293".into()));
        p.longitude = Some(Decimal::Number(105.8355));
        p.price_level = Some(Decimal::Number(1.0));
        p.rating = Some(Decimal::Text("4.6".into()));
        p.photos = vec![PhotoDto {
            url: "https://img/1.jpg".into(),
        }];

        let c = candidate_from_place(&p).unwrap();
        assert_eq!(c.id, "7");
        assert_eq!(c.name, "Temple of Literature");
        assert_eq!(c.category, "tourist_attraction");
        assert_eq!(c.location, Some(Coordinates::new(21.0293, 105.8355)));
        assert_eq!(c.price_level.map(|p| p.value()), Some(1));
        assert_eq!(c.rating.map(|r| r.value()), Some(4.6));
        assert_eq!(c.image, "https://img/1.jpg");
        assert_eq!(c.avg_duration_minutes, Some(75));
    }

    #[test]
    fn nameless_places_are_skipped_from_pages() {
        let response = PlacesResponse {
            places: vec![place(1, Some("A")), place(2, None), place(3, Some("  "))],
            pagination: None,
        };
        let page = search_page_from_response(&response);
        assert_eq!(page.candidates.len(), 1);
        assert_eq!(page.candidates[0].id, "1");
        assert!(page.pagination.is_none());
    }

    #[test]
    fn trip_conversion_is_lenient() {
        let dto = TripDto {
            id: WireId::Text("t1".into()),
            name: Some("Hanoi".into()),
            destination: Some("Hanoi".into()),
            start_date: "2025-04-20T00:00:00.000Z".into(),
            end_date: "2025-04-21".into(),
            status: Some("PLANNED".into()),
            description: None,
            estimated_budget: Some(Decimal::Text("2000000".into())),
            travel_companions: Some(2),
            city: None,
            days: vec![
                DayDto {
                    day_number: 2,
                    date: None,
                    places: vec![],
                    weather: None,
                    notes: None,
                },
                DayDto {
                    day_number: 1,
                    date: Some("2025-04-20".into()),
                    places: vec![stored("v1", "Cafe Giang"), {
                        let mut s = stored("v2", "");
                        s.name = None;
                        s
                    }],
                    weather: None,
                    notes: Some("first day".into()),
                },
            ],
        };

        let trip = trip_from_dto(&dto).unwrap();
        assert_eq!(trip.start_date, date(2025, 4, 20));
        assert_eq!(trip.status, TripStatus::Planned);
        assert_eq!(trip.estimated_budget, Some(2_000_000.0));
        assert_eq!(trip.days[0].day_number, 1);
        assert_eq!(trip.days[1].date, date(2025, 4, 21));
        assert!(trip.validate().is_ok());

        let visits = &trip.days[0].visits;
        assert_eq!(visits.len(), 1);
        let v = &visits[0];
        assert_eq!(v.start_time.map(|t| t.to_string()).as_deref(), Some("09:00"));
        assert_eq!(v.end_time, None);
        assert_eq!(v.duration, Some(45));
        assert_eq!(v.notes, None);
        assert_eq!(v.rating, None);
        assert_eq!(v.price_level.map(|p| p.value()), Some(2));
    }

    #[test]
    fn out_of_range_durations_are_dropped() {
        let mut dto = stored("v1", "Cafe Giang");
        dto.duration = Some(Decimal::Number(4_294_967_295.0));
        dto.avg_duration_minutes = Some(u32::MAX);
        let v = visit_from_dto(&dto).unwrap();
        assert_eq!(v.duration, None);
        assert_eq!(v.avg_duration_minutes, None);

        dto.duration = Some(Decimal::Text("1440".into()));
        dto.avg_duration_minutes = Some(90);
        let v = visit_from_dto(&dto).unwrap();
        assert_eq!(v.duration, Some(1440));
        assert_eq!(v.avg_duration_minutes, Some(90));

        let mut p = place(9, Some("Long Bien Bridge"));
        p.category = Some(CategoryDto {
            name: "Landmark".into(),
            avg_duration_minutes: Some(100_000),
        });
        assert_eq!(candidate_from_place(&p).unwrap().avg_duration_minutes, None);
    }

    #[test]
    fn bad_trip_dates_fail() {
        let dto = TripDto {
            id: WireId::Number(1),
            name: None,
            destination: None,
            start_date: "soon".into(),
            end_date: "2025-04-21".into(),
            status: None,
            description: None,
            estimated_budget: None,
            travel_companions: None,
            city: None,
            days: vec![],
        };
        assert!(matches!(
            trip_from_dto(&dto),
            Err(ConversionError::InvalidDate(_))
        ));
    }

    #[test]
    fn weather_conversion() {
        let dto = WeatherDto {
            temperature_high: Some(Decimal::Text("32.5".into())),
            temperature_low: Some(Decimal::Number(25.0)),
            condition: " Rain ".into(),
            precipitation_chance: Some(Decimal::Number(140.0)),
        };
        let w = weather_from_dto(&dto);
        assert_eq!(w.temperature_high, 32.5);
        assert_eq!(w.condition, "rain");
        assert_eq!(w.precipitation_chance, 100);
        assert!(w.is_rain());
    }

    #[test]
    fn update_filters_unsaveable_visits() {
        let mut trip = Trip::new(
            "t1",
            " Hanoi trip ",
            "Hanoi",
            date(2025, 4, 20),
            date(2025, 4, 21),
        )
        .unwrap();

        let mut located = Visit::new("a", " Hoan Kiem Lake ", "tourist_attraction");
        located.location = Some(Coordinates::new(21.0288, 105.8525));
        located.duration = Some(0);
        located.notes = Some("".into());
        located.start_time = ClockTime::from_hm(9, 0);

        let unlocated = Visit::new("b", "Somewhere", "cafe");
        let mut nameless = Visit::new("c", "   ", "cafe");
        nameless.location = Some(Coordinates::new(21.0, 105.0));

        trip.days[0].visits = vec![located, unlocated, nameless];
        trip.days[0].notes = Some("   ".into());
        trip.days[1].notes = Some("Bring umbrella".into());

        let update = TripUpdate::from_trip(&trip);
        assert_eq!(update.name, "Hanoi trip");
        assert_eq!(update.visit_count(), 1);

        let saved = &update.days[0].places[0];
        assert_eq!(saved.name, "Hoan Kiem Lake");
        assert_eq!(saved.duration, None);
        assert_eq!(saved.notes, None);
        assert_eq!(saved.start_time, ClockTime::from_hm(9, 0));
        assert_eq!(update.days[0].notes, None);
        assert_eq!(update.days[1].notes.as_deref(), Some("Bring umbrella"));
    }

    #[test]
    fn update_round_trips_through_loader() {
        let mut trip = Trip::new("t1", "Trip", "Hanoi", date(2025, 4, 20), date(2025, 4, 20)).unwrap();
        let mut v = Visit::new("a", "Lake", "tourist_attraction");
        v.location = Some(Coordinates::new(21.0288, 105.8525));
        v.duration = Some(60);
        trip.days[0].visits.push(v);

        let body = serde_json::to_value(TripUpdate::from_trip(&trip)).unwrap();
        let mut stored = body.clone();
        stored["id"] = serde_json::json!("t1");
        let dto: TripDto = serde_json::from_value(stored).unwrap();
        let reloaded = trip_from_dto(&dto).unwrap();

        assert_eq!(reloaded.days[0].visits[0].location, trip.days[0].visits[0].location);
        assert_eq!(reloaded.days[0].visits[0].duration, Some(60));
    }
}
