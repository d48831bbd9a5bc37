//! Home Assistant sensors over MQTT.
//!
//! This library models sensors and the values they measure, derives stable
//! identifiers for them, and announces them to Home Assistant through MQTT
//! discovery before publishing their state.

pub mod clock;
pub mod config;
pub mod error;
pub mod mqtt;
pub mod sanitize;
pub mod sensor;

pub use error::{Result, SensorError};
pub use mqtt::{
    MqttClient, MqttPublisher, MqttSensor, MqttSensorOptions, MqttSensorValue, MqttValueOptions,
    PublisherFn,
};
pub use sanitize::sanitize;
pub use sensor::{Sensor, SensorOptions, SensorValue, ValueOptions};
