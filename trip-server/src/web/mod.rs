//! Web layer for the trip planner.
//!
//! Exposes the planner session commands as a JSON API: open a trip, edit
//! its days, search for places, run and resolve optimizations, and save.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::{AppState, Sessions};
