//! Visit and candidate types.
//!
//! A `Visit` is one scheduled stop within a day. A `Candidate` is the same
//! shape of record as returned by a place search, before it has been added
//! to any day.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{ClockTime, DomainError};

/// Category tag used for outdoor sightseeing.
pub const OUTDOOR_CATEGORY: &str = "tourist_attraction";

/// Category tags treated as indoor activities.
pub const INDOOR_CATEGORIES: [&str; 4] = ["restaurant", "cafe", "shopping", "hotel"];

/// Identifier of a visit, unique within a trip and stable across moves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisitId(String);

impl VisitId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VisitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A usable geographic location in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Build coordinates from the string pair used on the wire.
    ///
    /// Returns `None` for missing, unparseable, or `"0"/"0"` values, all of
    /// which mean "no usable location".
    ///
    /// # Examples
    ///
    /// ```
    /// use trip_server::domain::Coordinates;
    ///
    /// assert!(Coordinates::from_strings(Some("21.03"), Some("105.85")).is_some());
    /// assert!(Coordinates::from_strings(Some("0"), Some("0")).is_none());
    /// assert!(Coordinates::from_strings(None, Some("105.85")).is_none());
    /// ```
    pub fn from_strings(latitude: Option<&str>, longitude: Option<&str>) -> Option<Self> {
        let lat = latitude?.trim();
        let lon = longitude?.trim();
        if lat.is_empty() || lon.is_empty() || (lat == "0" && lon == "0") {
            return None;
        }
        let latitude: f64 = lat.parse().ok()?;
        let longitude: f64 = lon.parse().ok()?;
        Self::from_degrees(latitude, longitude)
    }

    /// Build coordinates from numeric degrees, rejecting the 0/0 placeholder
    /// and non-finite values.
    pub fn from_degrees(latitude: f64, longitude: f64) -> Option<Self> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return None;
        }
        if latitude == 0.0 && longitude == 0.0 {
            return None;
        }
        Some(Self::new(latitude, longitude))
    }

    /// True when both axes differ by strictly less than `tolerance` degrees.
    pub fn is_within(&self, other: &Coordinates, tolerance: f64) -> bool {
        (self.latitude - other.latitude).abs() < tolerance
            && (self.longitude - other.longitude).abs() < tolerance
    }
}

/// Price level from 1 (cheap) to 4 (luxury).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct PriceLevel(u8);

impl PriceLevel {
    pub const MODERATE: PriceLevel = PriceLevel(2);

    pub fn new(level: u8) -> Result<Self, DomainError> {
        if (1..=4).contains(&level) {
            Ok(Self(level))
        } else {
            Err(DomainError::InvalidPriceLevel(level.to_string()))
        }
    }

    /// Parse a provider price label.
    ///
    /// Accepts `"1"`..`"4"`, the words `cheap`, `moderate`, `expensive`,
    /// `luxury`, and `$`..`$$$$`. Any other non-empty label maps to
    /// moderate. Empty labels carry no price information.
    ///
    /// # Examples
    ///
    /// ```
    /// use trip_server::domain::PriceLevel;
    ///
    /// assert_eq!(PriceLevel::parse("$$$").unwrap().value(), 3);
    /// assert_eq!(PriceLevel::parse("Luxury").unwrap().value(), 4);
    /// assert_eq!(PriceLevel::parse("fancy").unwrap().value(), 2);
    /// assert!(PriceLevel::parse("  ").is_none());
    /// ```
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim();
        if label.is_empty() {
            return None;
        }
        if let Ok(n) = label.parse::<u8>() {
            if let Ok(level) = Self::new(n) {
                return Some(level);
            }
        }
        let level = match label.to_lowercase().as_str() {
            "cheap" | "$" => 1,
            "moderate" | "$$" => 2,
            "expensive" | "$$$" => 3,
            "luxury" | "$$$$" => 4,
            _ => 2,
        };
        Some(Self(level))
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for PriceLevel {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PriceLevel> for u8 {
    fn from(level: PriceLevel) -> Self {
        level.0
    }
}

/// Rating between 0 and 5 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Rating(f64);

impl Rating {
    pub fn new(value: f64) -> Result<Self, DomainError> {
        if value.is_finite() && (0.0..=5.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(DomainError::InvalidRating(value))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Rating {
    type Error = DomainError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for f64 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

/// Returns true for the outdoor category tag.
pub fn is_outdoor(category: &str) -> bool {
    category == OUTDOOR_CATEGORY
}

/// Returns true for indoor category tags.
pub fn is_indoor(category: &str) -> bool {
    INDOOR_CATEGORIES.contains(&category)
}

/// A single scheduled stop within a day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    pub id: VisitId,
    pub name: String,
    /// Category/type tag, e.g. `restaurant`.
    #[serde(rename = "type")]
    pub category: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub location: Option<Coordinates>,
    #[serde(default)]
    pub image: String,
    /// Derived by the time allocator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<ClockTime>,
    /// Derived by the time allocator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<ClockTime>,
    /// Explicit duration in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    /// Average duration of the visit's category, in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_duration_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_level: Option<PriceLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<String>,
}

impl Visit {
    /// Create a visit with only the required fields set.
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: VisitId::new(id),
            name: name.into(),
            category: category.into(),
            address: String::new(),
            location: None,
            image: String::new(),
            start_time: None,
            end_time: None,
            duration: None,
            avg_duration_minutes: None,
            notes: None,
            rating: None,
            price_level: None,
            opening_hours: None,
        }
    }

    /// Rating as a plain number, 0 when absent.
    pub fn rating_value(&self) -> f64 {
        self.rating.map(|r| r.value()).unwrap_or(0.0)
    }

    /// Price level as a plain number, 0 when absent.
    pub fn price_value(&self) -> u8 {
        self.price_level.map(|p| p.value()).unwrap_or(0)
    }

    pub fn is_outdoor(&self) -> bool {
        is_outdoor(&self.category)
    }

    pub fn is_indoor(&self) -> bool {
        is_indoor(&self.category)
    }

    /// Clear derived schedule times.
    pub fn clear_schedule(&mut self) {
        self.start_time = None;
        self.end_time = None;
    }
}

/// A search result not yet attached to any day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Provider-assigned identifier.
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub category: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub location: Option<Coordinates>,
    #[serde(default)]
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_level: Option<PriceLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_duration_minutes: Option<u32>,
}

impl Candidate {
    /// Create a candidate with only the required fields set.
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            address: String::new(),
            location: None,
            image: String::new(),
            rating: None,
            price_level: None,
            opening_hours: None,
            avg_duration_minutes: None,
        }
    }

    /// Convert into a visit with the given trip-unique id.
    ///
    /// The category average duration becomes the visit's duration hint.
    pub fn into_visit(self, id: VisitId) -> Visit {
        let category = if self.category.trim().is_empty() {
            OUTDOOR_CATEGORY.to_string()
        } else {
            self.category
        };
        Visit {
            id,
            name: self.name,
            category,
            address: self.address,
            location: self.location,
            image: self.image,
            start_time: None,
            end_time: None,
            duration: None,
            avg_duration_minutes: self.avg_duration_minutes,
            notes: None,
            rating: self.rating,
            price_level: self.price_level,
            opening_hours: self.opening_hours,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_zero_means_missing() {
        assert!(Coordinates::from_strings(Some("0"), Some("0")).is_none());
        assert!(Coordinates::from_strings(Some(""), Some("1.0")).is_none());
        assert!(Coordinates::from_strings(Some("abc"), Some("1.0")).is_none());
        assert!(Coordinates::from_degrees(0.0, 0.0).is_none());
        assert!(Coordinates::from_degrees(f64::NAN, 1.0).is_none());

        // A single zero axis is still a real place.
        let c = Coordinates::from_strings(Some("0"), Some("105.85")).unwrap();
        assert_eq!(c.longitude, 105.85);
    }

    #[test]
    fn coordinates_tolerance_is_strict() {
        let a = Coordinates::new(21.0300, 105.8500);
        let b = Coordinates::new(21.0301, 105.8501);
        let c = Coordinates::new(21.0320, 105.8500);
        assert!(a.is_within(&b, 0.001));
        assert!(!a.is_within(&c, 0.001));
    }

    #[test]
    fn price_level_bounds() {
        assert!(PriceLevel::new(0).is_err());
        assert!(PriceLevel::new(5).is_err());
        assert_eq!(PriceLevel::new(4).unwrap().value(), 4);
        assert_eq!(PriceLevel::parse("1").unwrap().value(), 1);
        assert_eq!(PriceLevel::parse("$").unwrap().value(), 1);
        assert_eq!(PriceLevel::parse("CHEAP").unwrap().value(), 1);
        // Out-of-range numbers fall through to the word table default.
        assert_eq!(PriceLevel::parse("9").unwrap().value(), 2);
    }

    #[test]
    fn rating_bounds() {
        assert!(Rating::new(-0.1).is_err());
        assert!(Rating::new(5.1).is_err());
        assert!(Rating::new(f64::NAN).is_err());
        assert_eq!(Rating::new(4.5).unwrap().value(), 4.5);
    }

    #[test]
    fn visit_serde_uses_wire_names() {
        let mut v = Visit::new("v1", "Temple of Literature", "tourist_attraction");
        v.price_level = Some(PriceLevel::new(2).unwrap());
        v.start_time = Some(ClockTime::parse_hhmm("09:00").unwrap());

        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["type"], "tourist_attraction");
        assert_eq!(json["priceLevel"], 2);
        assert_eq!(json["startTime"], "09:00");
        assert!(json.get("endTime").is_none());

        let back: Visit = serde_json::from_value(json).unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn visit_serde_rejects_invalid_price() {
        let json = serde_json::json!({
            "id": "v1", "name": "x", "type": "cafe", "priceLevel": 7
        });
        assert!(serde_json::from_value::<Visit>(json).is_err());
    }

    #[test]
    fn candidate_into_visit_inherits_fields() {
        let mut c = Candidate::new("p42", "Old Quarter Cafe", "cafe");
        c.rating = Some(Rating::new(4.2).unwrap());
        c.price_level = Some(PriceLevel::new(1).unwrap());
        c.location = Some(Coordinates::new(21.03, 105.85));
        c.opening_hours = Some("7:00 - 22:00".into());
        c.avg_duration_minutes = Some(45);

        let v = c.clone().into_visit(VisitId::new("suggested_p42_1"));
        assert_eq!(v.id.as_str(), "suggested_p42_1");
        assert_eq!(v.name, c.name);
        assert_eq!(v.category, "cafe");
        assert_eq!(v.rating, c.rating);
        assert_eq!(v.price_level, c.price_level);
        assert_eq!(v.location, c.location);
        assert_eq!(v.opening_hours, c.opening_hours);
        assert_eq!(v.avg_duration_minutes, Some(45));
        assert!(v.start_time.is_none());
    }

    #[test]
    fn candidate_without_category_becomes_attraction() {
        let v = Candidate::new("p1", "Lake", "  ").into_visit(VisitId::new("x"));
        assert!(v.is_outdoor());
    }

    #[test]
    fn indoor_outdoor_tags() {
        assert!(is_outdoor("tourist_attraction"));
        assert!(is_indoor("restaurant"));
        assert!(is_indoor("hotel"));
        assert!(!is_indoor("tourist_attraction"));
        assert!(!is_outdoor("museum"));
    }
}
