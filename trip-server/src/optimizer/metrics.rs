//! Schedule metrics used to measure an optimization.
//!
//! Everything here is derived from the trip itself. Distances are a
//! straight-line proxy over consecutive located visits, not routing.

use serde::Serialize;

use crate::domain::{Day, Trip};
use crate::schedule::{DurationFallback, ScheduleConfig, resolve_duration};

use super::strategy::{POPULAR_RATING, suits_weather};

/// Kilometres per degree of latitude.
const KM_PER_DEGREE_LAT: f64 = 110.574;

/// Kilometres per degree of longitude at the equator.
const KM_PER_DEGREE_LON: f64 = 111.320;

/// Aggregate figures for a trip's current schedule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripMetrics {
    pub visits: usize,
    /// Straight-line path length over consecutive located visits (km).
    pub distance_km: f64,
    /// Time from each day's anchor to its last visit's end, summed (minutes).
    pub scheduled_minutes: u32,
    /// Transit estimate derived from `distance_km` (minutes).
    pub transit_minutes: f64,
    pub price_level_total: u32,
    /// Estimated spend in local currency units.
    pub estimated_spend: u64,
    /// Pairs where a weather-preferred visit is scheduled after a
    /// non-preferred one on a day with a forecast.
    pub weather_inversions: u32,
    /// Summed start minute of popular visits; lower means earlier.
    pub crowd_exposure: u32,
}

impl TripMetrics {
    /// Measure a trip as if each day were allocated from its own anchor.
    pub fn measure(trip: &Trip, config: &ScheduleConfig) -> Self {
        let mut metrics = TripMetrics::default();

        for day in &trip.days {
            metrics.visits += day.len();
            metrics.distance_km += day_distance_km(day);
            metrics.weather_inversions += weather_inversions(day);

            let anchor = day.start_anchor.unwrap_or(config.default_anchor).minutes();
            let fallback = DurationFallback::InitialPass.minutes(config);
            let mut current = anchor;
            for (index, visit) in day.visits.iter().enumerate() {
                if index > 0 {
                    current = current.saturating_add(config.travel_buffer_mins);
                }
                if visit.rating_value() > POPULAR_RATING {
                    metrics.crowd_exposure = metrics.crowd_exposure.saturating_add(current);
                }
                current = current.saturating_add(resolve_duration(visit, fallback));

                let price = u32::from(visit.price_value());
                metrics.price_level_total += price;
            }
            metrics.scheduled_minutes = metrics
                .scheduled_minutes
                .saturating_add(current - anchor);
        }

        metrics.transit_minutes = metrics.distance_km * config.transit_mins_per_km;
        metrics.estimated_spend =
            u64::from(metrics.price_level_total) * config.currency_per_price_level;
        metrics
    }

    /// Scheduled plus transit time (minutes).
    pub fn total_minutes(&self) -> f64 {
        f64::from(self.scheduled_minutes) + self.transit_minutes
    }
}

/// Straight-line distance between two points using an equirectangular
/// approximation.
pub fn straight_line_km(a: (f64, f64), b: (f64, f64)) -> f64 {
    let mean_lat = ((a.0 + b.0) / 2.0).to_radians();
    let dy = (b.0 - a.0) * KM_PER_DEGREE_LAT;
    let dx = (b.1 - a.1) * KM_PER_DEGREE_LON * mean_lat.cos();
    (dx * dx + dy * dy).sqrt()
}

/// Path length through a day's located visits, in order.
pub fn day_distance_km(day: &Day) -> f64 {
    let points: Vec<(f64, f64)> = day
        .visits
        .iter()
        .filter_map(|v| v.location.map(|c| (c.latitude, c.longitude)))
        .collect();
    points
        .windows(2)
        .map(|pair| straight_line_km(pair[0], pair[1]))
        .sum()
}

/// Count preferred-after-non-preferred pairs on a day with a forecast.
pub fn weather_inversions(day: &Day) -> u32 {
    let Some(weather) = &day.weather else {
        return 0;
    };
    let wet = weather.is_wet();
    let mut unsuited_seen = 0;
    let mut inversions = 0;
    for visit in &day.visits {
        if suits_weather(visit, wet) {
            inversions += unsuited_seen;
        } else {
            unsuited_seen += 1;
        }
    }
    inversions
}
