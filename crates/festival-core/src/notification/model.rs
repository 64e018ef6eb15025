//! Notification domain models.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::warn;

/// Notification as served by `GET /notifications`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNotification {
    pub name: String,
    #[serde(default)]
    pub data: Value,
    pub timestamp: f64,
}

/// Closed set of notification kinds with their decoded payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationKind {
    /// Unseen festival activities for the user.
    FestivalUpdated(i64),
    /// Registration codes left; sent to the owner.
    NoRegistrationCodes(i64),
    /// Admin rights changed.
    Admin(i64),
    Unknown { name: String },
}

impl NotificationKind {
    pub fn decode(name: &str, data: &Value) -> Self {
        match name {
            "festival_updated" => Self::FestivalUpdated(count_from(data)),
            "no_registration_codes" => Self::NoRegistrationCodes(count_from(data)),
            "admin" => Self::Admin(count_from(data)),
            other => Self::Unknown {
                name: other.to_string(),
            },
        }
    }

    /// Counter this kind drives, with the new count.
    pub fn counter(&self) -> Option<(CounterSlot, i64)> {
        match self {
            Self::FestivalUpdated(count) => Some((CounterSlot::FestivalCount, *count)),
            Self::NoRegistrationCodes(count) => Some((CounterSlot::AvailableCodes, *count)),
            Self::Admin(count) => Some((CounterSlot::AdminChanged, *count)),
            Self::Unknown { .. } => None,
        }
    }
}

/// Interpret a JSON payload as a badge count.
fn count_from(data: &Value) -> i64 {
    match data {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Value::Bool(b) => i64::from(*b),
        Value::Null => 0,
        other => {
            warn!(payload = %other, "Notification payload is not a count");
            0
        }
    }
}

/// A decoded notification.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub timestamp: f64,
}

impl Notification {
    pub fn new(kind: NotificationKind, timestamp: f64) -> Self {
        Self { kind, timestamp }
    }
}

impl From<RawNotification> for Notification {
    fn from(raw: RawNotification) -> Self {
        Self {
            kind: NotificationKind::decode(&raw.name, &raw.data),
            timestamp: raw.timestamp,
        }
    }
}

/// Timestamp of the last consumed notification.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Watermark(f64);

impl Watermark {
    pub const ZERO: Watermark = Watermark(0.0);

    pub fn new(since: f64) -> Self {
        Self(since)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Move to `timestamp`. Never moves backwards.
    pub fn advance(&mut self, timestamp: f64) {
        if timestamp < self.0 {
            warn!(
                current = self.0,
                timestamp, "Ignoring notification older than the watermark"
            );
            return;
        }
        self.0 = timestamp;
    }
}

impl fmt::Display for Watermark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// On-page badge slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CounterSlot {
    FestivalCount,
    AvailableCodes,
    AdminChanged,
}

impl CounterSlot {
    pub const ALL: [CounterSlot; 3] = [
        CounterSlot::FestivalCount,
        CounterSlot::AvailableCodes,
        CounterSlot::AdminChanged,
    ];

    /// Element id of the badge in the page.
    pub fn element_id(&self) -> &'static str {
        match self {
            Self::FestivalCount => "festival_count",
            Self::AvailableCodes => "available_codes",
            Self::AdminChanged => "admin_changed",
        }
    }
}

impl fmt::Display for CounterSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.element_id())
    }
}

/// Displayed state of one badge.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Counter {
    pub text: String,
    pub visible: bool,
}

impl Counter {
    pub fn showing(count: i64) -> Self {
        Self {
            text: count.to_string(),
            visible: count != 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_batch() {
        let raw: Vec<RawNotification> = serde_json::from_value(json!([
            {"name": "festival_updated", "data": 3, "timestamp": 100.5},
            {"name": "no_registration_codes", "data": 0, "timestamp": 101.0},
            {"name": "admin", "data": 1, "timestamp": 102.0},
            {"name": "purchase_added", "data": {"id": 4}, "timestamp": 103.0}
        ]))
        .unwrap();

        let decoded: Vec<Notification> = raw.into_iter().map(Notification::from).collect();
        assert_eq!(decoded[0].kind, NotificationKind::FestivalUpdated(3));
        assert_eq!(decoded[0].timestamp, 100.5);
        assert_eq!(decoded[1].kind, NotificationKind::NoRegistrationCodes(0));
        assert_eq!(decoded[2].kind, NotificationKind::Admin(1));
        assert_eq!(
            decoded[3].kind,
            NotificationKind::Unknown {
                name: "purchase_added".to_string()
            }
        );
    }

    #[test]
    fn test_count_from_payloads() {
        assert_eq!(count_from(&json!(7)), 7);
        assert_eq!(count_from(&json!(2.9)), 2);
        assert_eq!(count_from(&json!(true)), 1);
        assert_eq!(count_from(&json!(null)), 0);
        assert_eq!(count_from(&json!("5")), 0);
    }

    #[test]
    fn test_missing_data_is_zero() {
        let raw: RawNotification =
            serde_json::from_value(json!({"name": "admin", "timestamp": 1.0})).unwrap();
        assert_eq!(Notification::from(raw).kind, NotificationKind::Admin(0));
    }

    #[test]
    fn test_watermark_is_monotonic() {
        let mut watermark = Watermark::ZERO;
        watermark.advance(100.0);
        assert_eq!(watermark.value(), 100.0);
        watermark.advance(50.0);
        assert_eq!(watermark.value(), 100.0);
        watermark.advance(100.0);
        watermark.advance(120.25);
        assert_eq!(watermark.value(), 120.25);
    }

    #[test]
    fn test_counter_visibility() {
        assert_eq!(
            Counter::showing(3),
            Counter {
                text: "3".to_string(),
                visible: true
            }
        );
        assert!(!Counter::showing(0).visible);
        assert!(Counter::showing(-1).visible);
    }
}
