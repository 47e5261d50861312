//! Day and weather types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{ClockTime, Visit, VisitId};

/// Precipitation chance (percent) above which a day counts as wet.
pub const WET_PRECIPITATION_THRESHOLD: u8 = 70;

/// Weather snapshot for one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weather {
    pub temperature_high: f64,
    pub temperature_low: f64,
    /// Provider condition label, e.g. `sunny`, `cloudy`, `rain`.
    pub condition: String,
    /// Chance of precipitation in percent.
    pub precipitation_chance: u8,
}

impl Weather {
    /// True when the condition label is rain.
    pub fn is_rain(&self) -> bool {
        self.condition.eq_ignore_ascii_case("rain")
    }

    /// True on rain or a high chance of precipitation.
    pub fn is_wet(&self) -> bool {
        self.is_rain() || self.precipitation_chance > WET_PRECIPITATION_THRESHOLD
    }
}

/// One calendar day of a trip.
///
/// The order of `visits` is the visiting sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Day {
    /// 1-based position within the trip.
    pub day_number: u32,
    pub date: NaiveDate,
    #[serde(default)]
    pub visits: Vec<Visit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<Weather>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Schedule start used by the time allocator; the configured default
    /// applies when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_anchor: Option<ClockTime>,
}

impl Day {
    /// Create an empty day.
    pub fn new(day_number: u32, date: NaiveDate) -> Self {
        Self {
            day_number,
            date,
            visits: Vec::new(),
            weather: None,
            notes: None,
            start_anchor: None,
        }
    }

    pub fn len(&self) -> usize {
        self.visits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visits.is_empty()
    }

    /// Index of the visit with the given id.
    pub fn position(&self, id: &VisitId) -> Option<usize> {
        self.visits.iter().position(|v| &v.id == id)
    }

    /// True on a day whose weather is wet.
    pub fn is_wet(&self) -> bool {
        self.weather.as_ref().is_some_and(Weather::is_wet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weather(condition: &str, precipitation: u8) -> Weather {
        Weather {
            temperature_high: 31.0,
            temperature_low: 24.0,
            condition: condition.to_string(),
            precipitation_chance: precipitation,
        }
    }

    #[test]
    fn wet_weather() {
        assert!(weather("rain", 10).is_wet());
        assert!(weather("Rain", 10).is_rain());
        assert!(weather("cloudy", 71).is_wet());
        assert!(!weather("cloudy", 70).is_wet());
        assert!(!weather("sunny", 0).is_wet());
    }

    #[test]
    fn position_by_id() {
        let mut day = Day::new(1, NaiveDate::from_ymd_opt(2025, 4, 20).unwrap());
        day.visits.push(Visit::new("a", "A", "cafe"));
        day.visits.push(Visit::new("b", "B", "cafe"));

        assert_eq!(day.position(&VisitId::new("b")), Some(1));
        assert_eq!(day.position(&VisitId::new("z")), None);
        assert!(!day.is_wet());
    }
}
