//! Named reordering strategies.
//!
//! A strategy is a comparator applied with a stable sort to each day's
//! visits, plus an optional start-anchor override for the re-allocation
//! that follows.

use std::cmp::{Ordering, Reverse};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{ClockTime, Visit, Weather};

use super::error::OptimizeError;

/// Rating above which a place counts as a crowd magnet.
pub const POPULAR_RATING: f64 = 4.5;

/// Available optimization strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// Weighted blend of rating, rain exposure and price.
    #[serde(rename = "ai_smart")]
    Smart,
    /// Geographic sweep by latitude with an early start.
    #[serde(rename = "time_efficient")]
    TimeEfficient,
    /// Cheapest places first.
    #[serde(rename = "budget_conscious")]
    BudgetConscious,
    /// Indoor places first on wet days, outdoor first otherwise.
    #[serde(rename = "weather_adaptive")]
    WeatherAdaptive,
    /// Best rated first.
    #[serde(rename = "experience_maximizer")]
    ExperienceMaximizer,
    /// Most popular first with a very early start.
    #[serde(rename = "crowd_avoider")]
    CrowdAvoider,
}

impl Strategy {
    pub const ALL: [Strategy; 6] = [
        Strategy::Smart,
        Strategy::TimeEfficient,
        Strategy::BudgetConscious,
        Strategy::WeatherAdaptive,
        Strategy::ExperienceMaximizer,
        Strategy::CrowdAvoider,
    ];

    /// Stable wire identifier.
    pub fn id(self) -> &'static str {
        match self {
            Strategy::Smart => "ai_smart",
            Strategy::TimeEfficient => "time_efficient",
            Strategy::BudgetConscious => "budget_conscious",
            Strategy::WeatherAdaptive => "weather_adaptive",
            Strategy::ExperienceMaximizer => "experience_maximizer",
            Strategy::CrowdAvoider => "crowd_avoider",
        }
    }

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            Strategy::Smart => "Smart optimization",
            Strategy::TimeEfficient => "Time saver",
            Strategy::BudgetConscious => "Budget saver",
            Strategy::WeatherAdaptive => "Weather adaptive",
            Strategy::ExperienceMaximizer => "Experience maximizer",
            Strategy::CrowdAvoider => "Crowd avoider",
        }
    }

    /// Start anchor this strategy insists on, if any.
    pub fn anchor_override(self) -> Option<ClockTime> {
        match self {
            Strategy::TimeEfficient => ClockTime::from_hm(8, 0),
            Strategy::CrowdAvoider => ClockTime::from_hm(7, 30),
            _ => None,
        }
    }

    /// Stably reorder one day's visits.
    ///
    /// `weather` is the day's weather snapshot; strategies that read it
    /// treat a missing snapshot as "no signal".
    ///
    /// # Examples
    ///
    /// ```
    /// use trip_server::domain::{PriceLevel, Visit};
    /// use trip_server::optimizer::Strategy;
    ///
    /// let mut visits: Vec<Visit> = [4, 1, 3, 2]
    ///     .into_iter()
    ///     .map(|p| {
    ///         let mut v = Visit::new(format!("v{p}"), format!("V{p}"), "cafe");
    ///         v.price_level = Some(PriceLevel::new(p).unwrap());
    ///         v
    ///     })
    ///     .collect();
    ///
    /// Strategy::BudgetConscious.sort_visits(&mut visits, None);
    /// let prices: Vec<u8> = visits.iter().map(|v| v.price_value()).collect();
    /// assert_eq!(prices, [1, 2, 3, 4]);
    /// ```
    pub fn sort_visits(self, visits: &mut [Visit], weather: Option<&Weather>) {
        match self {
            Strategy::Smart => {
                let rain = weather.is_some_and(Weather::is_rain);
                visits.sort_by(|a, b| smart_score(b, rain).total_cmp(&smart_score(a, rain)));
            }
            Strategy::TimeEfficient => visits.sort_by(by_latitude),
            Strategy::BudgetConscious => visits.sort_by_key(Visit::price_value),
            Strategy::WeatherAdaptive => {
                // Days without a forecast keep their order.
                if let Some(weather) = weather {
                    let wet = weather.is_wet();
                    visits.sort_by_key(|v| Reverse(suits_weather(v, wet)));
                }
            }
            Strategy::ExperienceMaximizer => {
                visits.sort_by(|a, b| b.rating_value().total_cmp(&a.rating_value()));
            }
            Strategy::CrowdAvoider => {
                visits.sort_by(|a, b| popularity(b).total_cmp(&popularity(a)));
            }
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Strategy {
    type Err = OptimizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.id() == s)
            .ok_or_else(|| OptimizeError::UnknownStrategy(s.to_string()))
    }
}

/// Combined score: rating counts double, rain penalizes outdoor places,
/// price counts half against.
pub fn smart_score(visit: &Visit, rain: bool) -> f64 {
    let mut score = visit.rating_value() * 2.0;
    if rain && visit.is_outdoor() {
        score -= 1.0;
    }
    score - f64::from(visit.price_value()) * 0.5
}

/// Rating, doubled for places rated above [`POPULAR_RATING`].
pub fn popularity(visit: &Visit) -> f64 {
    let rating = visit.rating_value();
    if rating > POPULAR_RATING {
        rating * 2.0
    } else {
        rating
    }
}

/// True when the visit's type is the preferred one for the weather:
/// indoor on wet days, outdoor otherwise.
pub fn suits_weather(visit: &Visit, wet: bool) -> bool {
    if wet {
        visit.is_indoor()
    } else {
        visit.is_outdoor()
    }
}

/// South to north; places without a location go last.
fn by_latitude(a: &Visit, b: &Visit) -> Ordering {
    match (&a.location, &b.location) {
        (Some(a), Some(b)) => a.latitude.total_cmp(&b.latitude),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}


#[cfg(test)]
mod proptests {
    use super::{Strategy as Reorder, Visit, Weather};
    use crate::domain::{Coordinates, PriceLevel, Rating};
    use proptest::prelude::*;

    prop_compose! {
        fn arb_visit()(
            category in prop::sample::select(vec!["tourist_attraction", "cafe", "museum", "shopping"]),
            rating in prop::option::of(0u8..=10),
            price in prop::option::of(1u8..=4),
            lat in prop::option::of(-100i32..100),
        ) -> (String, Option<f64>, Option<u8>, Option<f64>) {
            (
                category.to_string(),
                rating.map(|r| f64::from(r) / 2.0),
                price,
                lat.map(|l| 21.0 + f64::from(l) / 1000.0),
            )
        }
    }

    fn arb_visits() -> impl Strategy<Value = Vec<Visit>> {
        prop::collection::vec(arb_visit(), 0..15).prop_map(|specs| {
            specs
                .into_iter()
                .enumerate()
                .map(|(i, (category, rating, price, lat))| {
                    let mut v = Visit::new(format!("v{i}"), format!("V{i}"), category);
                    v.rating = rating.map(|r| Rating::new(r).unwrap());
                    v.price_level = price.map(|p| PriceLevel::new(p).unwrap());
                    v.location = lat.map(|l| Coordinates::new(l, 105.85));
                    v
                })
                .collect()
        })
    }

    fn arb_strategy() -> impl Strategy<Value = Reorder> {
        prop::sample::select(Reorder::ALL.to_vec())
    }

    proptest! {
        /// Sorting an already sorted day changes nothing
        #[test]
        fn rerun_is_stable(visits in arb_visits(), strategy in arb_strategy(), rain in any::<bool>()) {
            let w = Weather {
                temperature_high: 30.0,
                temperature_low: 20.0,
                condition: if rain { "rain".into() } else { "sunny".into() },
                precipitation_chance: if rain { 90 } else { 10 },
            };
            let mut once = visits;
            strategy.sort_visits(&mut once, Some(&w));
            let mut twice = once.clone();
            strategy.sort_visits(&mut twice, Some(&w));
            prop_assert_eq!(once, twice);
        }

        /// Sorting is a permutation
        #[test]
        fn sort_is_permutation(visits in arb_visits(), strategy in arb_strategy()) {
            let mut sorted = visits.clone();
            strategy.sort_visits(&mut sorted, None);
            let mut a: Vec<_> = visits.iter().map(|v| v.id.clone()).collect();
            let mut b: Vec<_> = sorted.iter().map(|v| v.id.clone()).collect();
            a.sort();
            b.sort();
            prop_assert_eq!(a, b);
        }
    }
}
