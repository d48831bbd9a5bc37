//! Home Assistant MQTT discovery wire format.
//!
//! Topic layout and the JSON record Home Assistant expects for an MQTT
//! sensor, plus the state payload formatting.

use chrono::TimeDelta;
use serde::Serialize;

/// Topic prefix Home Assistant listens on for discovery messages.
pub const DISCOVERY_PREFIX: &str = "homeassistant";

/// Entity component all values are announced as.
pub const COMPONENT: &str = "sensor";

/// Template telling Home Assistant to use the state payload as is.
pub const VALUE_TEMPLATE: &str = "{{ value }}";

/// Minutes after which a published discovery config is announced again.
pub const CONFIG_REFRESH_MINUTES: i64 = 10;

pub fn config_refresh_interval() -> TimeDelta {
    TimeDelta::minutes(CONFIG_REFRESH_MINUTES)
}

/// Format: `homeassistant/sensor/{id}/config`
pub fn config_topic(id: &str) -> String {
    format!("{}/{}/{}/config", DISCOVERY_PREFIX, COMPONENT, id)
}

/// Format: `homeassistant/sensor/{id}/state`
pub fn state_topic(id: &str) -> String {
    format!("{}/{}/{}/state", DISCOVERY_PREFIX, COMPONENT, id)
}

/// Render a measurement as a fixed-point decimal with 4 fractional digits.
///
/// Non-finite values render as `NaN`, `+Inf` and `-Inf`.
pub fn format_state(value: f64) -> String {
    if value.is_infinite() {
        return if value > 0.0 { "+Inf" } else { "-Inf" }.to_string();
    }
    format!("{:.4}", value)
}

/// Sensor discovery payload for Home Assistant
#[derive(Debug, Serialize)]
pub struct SensorDiscovery<'a> {
    /// Human-readable name
    pub name: &'a str,
    /// Unique identifier
    pub unique_id: &'a str,
    /// Topic for state updates
    pub state_topic: &'a str,
    /// Template applied to the state payload
    pub value_template: &'a str,
    /// Device class (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_class: Option<&'a str>,
    /// Unit of measurement (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_of_measurement: Option<&'a str>,
    /// MDI icon (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<&'a str>,
}

/// Treat an empty optional field like an absent one.
pub(crate) fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}
