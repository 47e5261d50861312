//! Trip itinerary planner server.
//!
//! Holds a multi-day trip as ordered per-day visit lists and keeps it
//! consistent while it is edited: visits are reordered, moved between days,
//! added from paged place searches, and resequenced by optimization
//! strategies. Every change re-derives the affected day's visit times.

pub mod backend;
pub mod cache;
pub mod domain;
pub mod itinerary;
pub mod optimizer;
pub mod schedule;
pub mod search;
pub mod web;
