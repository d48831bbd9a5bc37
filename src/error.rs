use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum SensorError {
    #[error("Failed to serialize discovery config: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid MQTT QoS level: {0} (expected 0, 1 or 2)")]
    InvalidQos(u8),
}

pub type Result<T> = std::result::Result<T, SensorError>;
