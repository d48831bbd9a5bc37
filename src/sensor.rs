//! Sensors and the values they measure.
//!
//! A [`Sensor`] names a physical or logical source and owns its values in
//! insertion order. A [`SensorValue`] names one measured quantity and derives
//! its combined name and id from the sensor it belongs to:
//!
//! ```ignore
//! let mut sensor: Sensor = Sensor::new("Living Room", SensorOptions::default());
//! let power = sensor.add_value("Power Draw", ValueOptions::default());
//!
//! assert_eq!(power.id(), "Living_Room_Power_Draw");
//! assert_eq!(power.name(), "Living Room_Power Draw");
//! ```

use crate::sanitize::sanitize;
use std::sync::Arc;

/// Optional settings for [`Sensor::new`].
#[derive(Debug, Clone, Default)]
pub struct SensorOptions {
    /// Text the sensor id is derived from instead of the display name.
    /// It is sanitized like the name would be.
    pub id: Option<String>,
}

impl SensorOptions {
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Optional settings for [`Sensor::add_value`].
#[derive(Debug, Clone, Default)]
pub struct ValueOptions {
    /// Text the value-local id is derived from instead of the value name.
    pub id: Option<String>,
}

impl ValueOptions {
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Name and sanitized id of a sensor.
///
/// Immutable once created and shared between the sensor and its values,
/// which read it to build their combined identity.
#[derive(Debug, PartialEq, Eq)]
pub struct SensorIdentity {
    name: String,
    id: String,
}

impl SensorIdentity {
    pub fn new(name: impl Into<String>, id_source: Option<&str>) -> Self {
        let name = name.into();
        let id = sanitize(id_source.unwrap_or(&name));
        Self { name, id }
    }

    /// Display name, verbatim.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sanitized id.
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// A sensor owning an ordered collection of values.
///
/// `V` is the value type handed out by the sensor flavour: plain
/// [`SensorValue`]s here, publishing values for
/// [`MqttSensor`](crate::mqtt::MqttSensor).
#[derive(Debug)]
pub struct Sensor<V = SensorValue> {
    identity: Arc<SensorIdentity>,
    values: Vec<Arc<V>>,
}

impl<V> Sensor<V> {
    pub fn new(name: impl Into<String>, options: SensorOptions) -> Self {
        Self {
            identity: Arc::new(SensorIdentity::new(name, options.id.as_deref())),
            values: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        self.identity.name()
    }

    pub fn id(&self) -> &str {
        self.identity.id()
    }

    /// Values in the order they were added.
    pub fn values(&self) -> &[Arc<V>] {
        &self.values
    }

    pub(crate) fn identity(&self) -> &Arc<SensorIdentity> {
        &self.identity
    }

    pub(crate) fn push(&mut self, value: V) -> Arc<V> {
        let value = Arc::new(value);
        self.values.push(value.clone());
        value
    }
}

impl Sensor<SensorValue> {
    /// Create a value named `name`, append it to this sensor and return it.
    ///
    /// Value names are not required to be unique.
    pub fn add_value(&mut self, name: impl Into<String>, options: ValueOptions) -> Arc<SensorValue> {
        let value = SensorValue::new(self.identity.clone(), name, options);
        self.push(value)
    }
}

/// One measured quantity of a sensor.
#[derive(Debug)]
pub struct SensorValue {
    sensor: Arc<SensorIdentity>,
    name: String,
    id: String,
}

impl SensorValue {
    pub(crate) fn new(
        sensor: Arc<SensorIdentity>,
        name: impl Into<String>,
        options: ValueOptions,
    ) -> Self {
        let name = name.into();
        let id = sanitize(options.id.as_deref().unwrap_or(&name));
        Self { sensor, name, id }
    }

    /// Combined display name: `<sensor name>_<value name>`.
    pub fn name(&self) -> String {
        format!("{}_{}", self.sensor.name(), self.name)
    }

    /// Combined id: `<sensor id>_<value id>`.
    pub fn id(&self) -> String {
        format!("{}_{}", self.sensor.id(), self.id)
    }

    /// The value's own label, without the sensor name.
    pub fn local_name(&self) -> &str {
        &self.name
    }

    /// The value's own sanitized id, without the sensor id.
    pub fn local_id(&self) -> &str {
        &self.id
    }

    pub fn sensor(&self) -> &SensorIdentity {
        &self.sensor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensor_id_defaults_to_sanitized_name() {
        let sensor: Sensor = Sensor::new("Living Room", SensorOptions::default());
        assert_eq!(sensor.name(), "Living Room");
        assert_eq!(sensor.id(), "Living_Room");
    }

    #[test]
    fn test_sensor_id_override_is_sanitized() {
        let sensor: Sensor = Sensor::new("Living Room", SensorOptions::default().with_id("lr 1"));
        assert_eq!(sensor.name(), "Living Room");
        assert_eq!(sensor.id(), "lr_1");

        let sensor: Sensor = Sensor::new("Living Room", SensorOptions::default().with_id("lr_1"));
        assert_eq!(sensor.id(), "lr_1");
    }

    #[test]
    fn test_value_combined_identity() {
        let mut sensor: Sensor = Sensor::new("Living Room", SensorOptions::default());
        let value = sensor.add_value("Power Draw", ValueOptions::default());

        assert_eq!(value.id(), "Living_Room_Power_Draw");
        assert_eq!(value.name(), "Living Room_Power Draw");
        assert_eq!(value.local_name(), "Power Draw");
        assert_eq!(value.local_id(), "Power_Draw");
        assert_eq!(value.sensor().id(), "Living_Room");
    }

    #[test]
    fn test_value_id_override() {
        let mut sensor: Sensor = Sensor::new("Meter", SensorOptions::default().with_id("meter-1"));
        let value = sensor.add_value("Energy (total)", ValueOptions::default().with_id("kwh"));

        assert_eq!(value.id(), "meter_1_kwh");
        assert_eq!(value.name(), "Meter_Energy (total)");
    }

    #[test]
    fn test_values_keep_insertion_order_and_allow_duplicates() {
        let mut sensor: Sensor = Sensor::new("Meter", SensorOptions::default());
        sensor.add_value("power", ValueOptions::default());
        sensor.add_value("energy", ValueOptions::default());
        sensor.add_value("power", ValueOptions::default());

        let names: Vec<_> = sensor.values().iter().map(|v| v.local_name()).collect();
        assert_eq!(names, ["power", "energy", "power"]);
        assert_eq!(sensor.values()[0].id(), sensor.values()[2].id());
    }

    #[test]
    fn test_returned_handle_is_the_owned_value() {
        let mut sensor: Sensor = Sensor::new("Meter", SensorOptions::default());
        let value = sensor.add_value("power", ValueOptions::default());
        assert!(Arc::ptr_eq(&value, &sensor.values()[0]));
    }
}
