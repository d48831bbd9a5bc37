//! Sensors that announce their values to Home Assistant and publish state.
//!
//! Every value of an [`MqttSensor`] gets a state topic and a discovery config
//! topic derived from its combined id. [`MqttSensorValue::update`] makes sure
//! Home Assistant knows the value before sending the measurement:
//!
//! 1. If the discovery config was never published, or was last published
//!    more than [`CONFIG_REFRESH_MINUTES`](super::discovery::CONFIG_REFRESH_MINUTES)
//!    ago, publish it and remember when.
//! 2. Publish the measurement to the state topic.
//!
//! # Example
//! ```ignore
//! let mut sensor = MqttSensor::new(client, "Living Room", MqttSensorOptions::default());
//! let temperature = sensor.add_value(
//!     "temperature",
//!     MqttValueOptions::default()
//!         .with_device_class("temperature")
//!         .with_unit_of_measurement("°C"),
//! )?;
//!
//! temperature.update(21.5);
//! ```

use super::discovery::{self, SensorDiscovery, VALUE_TEMPLATE, non_empty};
use super::publisher::MqttPublisher;
use crate::clock::{Clock, SystemClock};
use crate::error::Result;
use crate::sensor::{Sensor, SensorOptions, SensorValue, ValueOptions};
use chrono::{DateTime, Utc};
use log::{debug, trace};
use parking_lot::ReentrantMutex;
use rumqttc::QoS;
use std::cell::Cell;
use std::sync::Arc;

/// Optional settings for [`MqttSensor::new`].
#[derive(Debug, Clone)]
pub struct MqttSensorOptions {
    /// Text the sensor id is derived from instead of the display name.
    pub id: Option<String>,
    /// QoS used for every config and state publish.
    pub qos: QoS,
    /// Retain flag used for every config and state publish.
    pub retain: bool,
}

impl Default for MqttSensorOptions {
    fn default() -> Self {
        Self {
            id: None,
            qos: QoS::AtMostOnce,
            retain: false,
        }
    }
}

impl MqttSensorOptions {
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_qos(mut self, qos: QoS) -> Self {
        self.qos = qos;
        self
    }

    pub fn with_retain(mut self, retain: bool) -> Self {
        self.retain = retain;
        self
    }
}

/// Optional settings for [`MqttSensor::add_value`].
///
/// Empty strings are treated like unset fields and left out of the
/// discovery config.
#[derive(Debug, Clone, Default)]
pub struct MqttValueOptions {
    /// Text the value-local id is derived from instead of the value name.
    pub id: Option<String>,
    /// Home Assistant device class, see
    /// <https://www.home-assistant.io/integrations/sensor/#device-class>
    pub device_class: Option<String>,
    /// Unit shown next to the state.
    pub unit_of_measurement: Option<String>,
    /// Icon reference such as `mdi:flash`.
    pub icon: Option<String>,
}

impl MqttValueOptions {
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_device_class(mut self, device_class: impl Into<String>) -> Self {
        self.device_class = Some(device_class.into());
        self
    }

    pub fn with_unit_of_measurement(mut self, unit: impl Into<String>) -> Self {
        self.unit_of_measurement = Some(unit.into());
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

/// Publish settings shared by every value of one sensor.
struct Transport {
    publisher: Arc<dyn MqttPublisher>,
    clock: Arc<dyn Clock>,
    qos: QoS,
    retain: bool,
}

impl Transport {
    fn publish(&self, topic: &str, payload: &[u8]) {
        self.publisher.publish(topic, self.qos, self.retain, payload);
    }
}

/// A sensor whose values publish to Home Assistant over MQTT.
pub struct MqttSensor {
    sensor: Sensor<MqttSensorValue>,
    transport: Arc<Transport>,
}

impl MqttSensor {
    /// Create a sensor publishing through `publisher`, using the system clock.
    pub fn new(
        publisher: impl MqttPublisher + 'static,
        name: impl Into<String>,
        options: MqttSensorOptions,
    ) -> Self {
        Self::with_clock(publisher, SystemClock, name, options)
    }

    /// Create a sensor reading the time for staleness checks from `clock`.
    pub fn with_clock(
        publisher: impl MqttPublisher + 'static,
        clock: impl Clock + 'static,
        name: impl Into<String>,
        options: MqttSensorOptions,
    ) -> Self {
        let MqttSensorOptions { id, qos, retain } = options;
        Self {
            sensor: Sensor::new(name, SensorOptions { id }),
            transport: Arc::new(Transport {
                publisher: Arc::new(publisher),
                clock: Arc::new(clock),
                qos,
                retain,
            }),
        }
    }

    pub fn name(&self) -> &str {
        self.sensor.name()
    }

    pub fn id(&self) -> &str {
        self.sensor.id()
    }

    /// Values in the order they were added.
    pub fn values(&self) -> &[Arc<MqttSensorValue>] {
        self.sensor.values()
    }

    /// Add a value to this sensor.
    ///
    /// Topics and the discovery config are computed here once and reused by
    /// every later publish.
    pub fn add_value(
        &mut self,
        name: impl Into<String>,
        options: MqttValueOptions,
    ) -> Result<Arc<MqttSensorValue>> {
        let value = SensorValue::new(
            self.sensor.identity().clone(),
            name,
            ValueOptions {
                id: options.id.clone(),
            },
        );

        let id = value.id();
        let config_topic = discovery::config_topic(&id);
        let state_topic = discovery::state_topic(&id);

        let display_name = value.name();
        let config = SensorDiscovery {
            name: &display_name,
            unique_id: &id,
            state_topic: &state_topic,
            value_template: VALUE_TEMPLATE,
            device_class: non_empty(&options.device_class),
            unit_of_measurement: non_empty(&options.unit_of_measurement),
            icon: non_empty(&options.icon),
        };
        let config_payload = serde_json::to_vec(&config)?;

        debug!("Added sensor value {} (config topic {})", id, config_topic);

        Ok(self.sensor.push(MqttSensorValue {
            value,
            transport: self.transport.clone(),
            config_topic,
            state_topic,
            config_payload,
            last_config_published: ReentrantMutex::new(Cell::new(None)),
        }))
    }

    /// Announce every value's discovery config, e.g. after Home Assistant
    /// restarted. Staleness timestamps are left untouched.
    pub fn publish_config(&self) {
        for value in self.values() {
            value.publish_config();
        }
    }
}

/// A sensor value with MQTT topics and a discovery config.
pub struct MqttSensorValue {
    value: SensorValue,
    transport: Arc<Transport>,
    config_topic: String,
    state_topic: String,
    config_payload: Vec<u8>,
    /// `None` until `update` publishes the config for the first time.
    /// Reentrant so a publisher may call back into this value.
    last_config_published: ReentrantMutex<Cell<Option<DateTime<Utc>>>>,
}

impl MqttSensorValue {
    /// Combined display name: `<sensor name>_<value name>`.
    pub fn name(&self) -> String {
        self.value.name()
    }

    /// Combined id: `<sensor id>_<value id>`.
    pub fn id(&self) -> String {
        self.value.id()
    }

    pub fn value(&self) -> &SensorValue {
        &self.value
    }

    pub fn state_topic(&self) -> &str {
        &self.state_topic
    }

    pub fn config_topic(&self) -> &str {
        &self.config_topic
    }

    /// Serialized discovery config.
    pub fn config_payload(&self) -> &[u8] {
        &self.config_payload
    }

    /// When `update` last published the discovery config.
    pub fn last_config_published(&self) -> Option<DateTime<Utc>> {
        self.last_config_published.lock().get()
    }

    /// Publish a measurement, announcing the discovery config first when it
    /// was never published or has gone stale.
    ///
    /// The window is claimed before the config goes out, so a publisher that
    /// calls back into this value sees it as fresh.
    pub fn update(&self, measurement: f64) {
        {
            let last = self.last_config_published.lock();
            let now = self.transport.clock.now();
            let stale = match last.get() {
                None => true,
                Some(published) => now - published > discovery::config_refresh_interval(),
            };
            if stale {
                last.set(Some(now));
                self.publish_config();
            }
        }

        let payload = discovery::format_state(measurement);
        trace!("Publishing {} to {}", payload, self.state_topic);
        self.transport.publish(&self.state_topic, payload.as_bytes());
    }

    /// Publish the discovery config now.
    ///
    /// This does not reset the staleness timer `update` uses, so the next
    /// `update` may announce the config again.
    pub fn publish_config(&self) {
        debug!("Publishing discovery config to {}", self.config_topic);
        self.transport
            .publish(&self.config_topic, &self.config_payload);
    }
}
