//! Notification badges.
//!
//! The server keeps per-user notifications; the client polls for the ones
//! newer than its watermark and mirrors their counts on badge counters.

pub mod model;
pub mod poller;

use async_trait::async_trait;

use crate::error::FestivalResult;
pub use model::{Counter, CounterSlot, Notification, NotificationKind, RawNotification, Watermark};
pub use poller::{NotificationPoller, PollOutcome, PollerHandle};

/// Where notifications come from.
#[async_trait]
pub trait NotificationSource: Send + Sync {
    /// Notifications strictly newer than `since`, oldest first.
    async fn fetch_since(&self, since: Watermark) -> FestivalResult<Vec<Notification>>;
}

/// Receives badge updates.
pub trait CounterBoard: Send {
    fn set_counter(&mut self, slot: CounterSlot, count: i64);
}

/// In-memory badge state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Counters {
    festival_count: Counter,
    available_codes: Counter,
    admin_changed: Counter,
}

impl Counters {
    pub fn get(&self, slot: CounterSlot) -> &Counter {
        match slot {
            CounterSlot::FestivalCount => &self.festival_count,
            CounterSlot::AvailableCodes => &self.available_codes,
            CounterSlot::AdminChanged => &self.admin_changed,
        }
    }

    fn get_mut(&mut self, slot: CounterSlot) -> &mut Counter {
        match slot {
            CounterSlot::FestivalCount => &mut self.festival_count,
            CounterSlot::AvailableCodes => &mut self.available_codes,
            CounterSlot::AdminChanged => &mut self.admin_changed,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (CounterSlot, &Counter)> {
        CounterSlot::ALL.into_iter().map(move |slot| (slot, self.get(slot)))
    }
}

impl CounterBoard for Counters {
    fn set_counter(&mut self, slot: CounterSlot, count: i64) {
        *self.get_mut(slot) = Counter::showing(count);
    }
}
