//! Home Assistant autodiscovery over MQTT.
//!
//! Sensors in this module announce each value with a discovery config and
//! publish measurements to the value's state topic through an
//! [`MqttPublisher`].

mod client;
pub mod discovery;
mod publisher;
mod sensor;

pub use client::MqttClient;
pub use publisher::{MqttPublisher, PublisherFn};
pub use sensor::{MqttSensor, MqttSensorOptions, MqttSensorValue, MqttValueOptions};
