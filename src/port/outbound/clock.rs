//! Time source port.

use chrono::{DateTime, Utc};

/// Supplies the current time for cutoffs and timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
