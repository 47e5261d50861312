//! User-facing notifications raised by itinerary edits.

use std::fmt;

use serde::Serialize;
use tracing::{error, info};

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyKind {
    Success,
    Info,
    Error,
}

impl fmt::Display for NotifyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NotifyKind::Success => "success",
            NotifyKind::Info => "info",
            NotifyKind::Error => "error",
        })
    }
}

/// Receives notifications; the presentation layer decides how to show them.
pub trait Notifier: Send + Sync {
    fn notify(&self, kind: NotifyKind, message: &str);
}

/// Forwards notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, kind: NotifyKind, message: &str) {
        match kind {
            NotifyKind::Error => error!(%kind, "{message}"),
            NotifyKind::Success | NotifyKind::Info => info!(%kind, "{message}"),
        }
    }
}
