//! Reordering engine and planner sessions.

mod editor;
mod error;
mod notify;
mod session;

pub use editor::{ItineraryEditor, VisitPatch};
pub use error::EditError;
pub use notify::{Notifier, NotifyKind, TracingNotifier};
pub use session::{PlannerSession, SessionError};
