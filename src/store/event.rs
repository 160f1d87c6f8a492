use super::StoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One hit sent by the tracking pixel. Field names match the JSON body the
/// pixel posts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub account_id: String,
    pub client_id: String,
    pub session_id: String,
    #[serde(rename = "event_name")]
    pub name: String,
    #[serde(rename = "event_value", default)]
    pub value: f64,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub page_location: String,
    #[serde(default)]
    pub page_title: String,
    #[serde(default)]
    pub page_referrer: String,
    #[serde(default)]
    pub user_agent: String,
    #[serde(default)]
    pub screen_resolution: String,
}

impl Event {
    /// Rejects events the events relation cannot hold.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.name.trim().is_empty() {
            return Err(StoreError::InvalidEvent("event_name is empty".to_string()));
        }
        if !self.value.is_finite() {
            return Err(StoreError::InvalidEvent(format!(
                "event_value {} is not a finite number",
                self.value
            )));
        }
        Ok(())
    }
}

/// Short listing of a stored event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventSummary {
    pub id: i64,
    pub name: String,
    pub value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    const PIXEL_PAYLOAD: &str = r#"{
        "account_id": "GA4CT-1",
        "client_id": "GA4CT.CID.1804289383.1718900000",
        "session_id": "GA4CT.SID.846930886.1718900000",
        "event_name": "purchase",
        "event_value": 49.99,
        "timestamp": "2024-06-20T16:13:20.000Z",
        "page_location": "https://www.example.com/order-confirmation",
        "page_title": "Order Confirmation | Example",
        "page_referrer": "https://www.example.com/checkout",
        "user_agent": "Mozilla/5.0",
        "screen_resolution": "1920x1080"
    }"#;

    #[test]
    fn deserializes_pixel_payload() {
        let event: Event = serde_json::from_str(PIXEL_PAYLOAD).unwrap();
        assert_eq!(event.name, "purchase");
        assert_eq!(event.value, 49.99);
        assert_eq!(event.timestamp.to_rfc3339(), "2024-06-20T16:13:20+00:00");
        assert_eq!(event.screen_resolution, "1920x1080");
        assert!(event.validate().is_ok());
    }

    #[test]
    fn optional_fields_default() {
        let event: Event = serde_json::from_str(
            r#"{"account_id": "GA4CT-1", "client_id": "c", "session_id": "s",
                "event_name": "page_view", "timestamp": "2024-06-20T16:13:20Z"}"#,
        )
        .unwrap();
        assert_eq!(event.value, 0.0);
        assert_eq!(event.page_referrer, "");
    }

    #[test]
    fn rejects_unusable_events() {
        let mut event: Event = serde_json::from_str(PIXEL_PAYLOAD).unwrap();
        event.value = f64::NAN;
        assert!(matches!(event.validate(), Err(StoreError::InvalidEvent(_))));

        event.value = 1.0;
        event.name = "  ".to_string();
        assert!(matches!(event.validate(), Err(StoreError::InvalidEvent(_))));
    }
}
