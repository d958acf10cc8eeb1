//! Notifications pushed to `notifications/{uid}/{pushId}`

use crate::UserId;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    ConnectRequest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub from: UserId,

    #[serde(rename = "type")]
    pub kind: NotificationKind,

    #[serde(default)]
    pub message: String,

    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl Notification {
    pub fn connect_request(from: UserId, display_name: Option<&str>, at: DateTime<Utc>) -> Self {
        let who = display_name
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("A user");
        Notification {
            from,
            kind: NotificationKind::ConnectRequest,
            message: format!("{} wants to connect with you!", who),
            timestamp: at.timestamp_millis(),
        }
    }

    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }

    /// Read a `notifications/{uid}` snapshot, newest first
    pub fn list_from_value(value: Option<&Value>) -> Vec<(String, Notification)> {
        let Some(Value::Object(map)) = value else {
            return Vec::new();
        };
        let mut items: Vec<(String, Notification)> = map
            .iter()
            .filter_map(|(id, body)| {
                serde_json::from_value(body.clone())
                    .ok()
                    .map(|n| (id.clone(), n))
            })
            .collect();
        items.sort_by(|a, b| b.1.timestamp.cmp(&a.1.timestamp));
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_connect_request_message() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let from = UserId::new("u1").unwrap();

        let named = Notification::connect_request(from.clone(), Some("Ada"), at);
        assert_eq!(named.message, "Ada wants to connect with you!");

        let anonymous = Notification::connect_request(from, None, at);
        assert_eq!(anonymous.message, "A user wants to connect with you!");
        assert_eq!(
            serde_json::to_value(&anonymous).unwrap(),
            json!({
                "from": "u1",
                "type": "connect_request",
                "message": "A user wants to connect with you!",
                "timestamp": 1_700_000_000_000i64
            })
        );
    }

    #[test]
    fn test_list_newest_first() {
        let value = json!({
            "a": {"from": "u1", "type": "connect_request", "message": "", "timestamp": 1},
            "b": {"from": "u2", "type": "connect_request", "message": "", "timestamp": 5},
            "c": {"unexpected": true}
        });
        let items = Notification::list_from_value(Some(&value));
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].0, "b");
    }
}
