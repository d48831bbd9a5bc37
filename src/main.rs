//! Publishes a simulated sensor reading to Home Assistant.
//!
//! Usage:
//!   cargo run -- --sensor "Living Room" --value temperature \
//!       --device-class temperature --unit "°C"
//!
//! Broker settings come from the environment (or a `.env` file), see
//! `MQTT_BROKER_HOST`, `MQTT_BROKER_PORT`, `MQTT_CLIENT_ID`,
//! `MQTT_USERNAME` and `MQTT_PASSWORD`.

use clap::Parser;
use ham_sensors::config::{Config, qos_from_level};
use ham_sensors::{MqttClient, MqttSensor, MqttSensorOptions, MqttValueOptions};
use log::{error, info, warn};
use rand::Rng;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "ham-sensors")]
#[command(about = "Announce a sensor to Home Assistant and publish simulated readings")]
struct Cli {
    /// Sensor display name
    #[arg(long, env = "SENSOR_NAME", default_value = "Demo Sensor")]
    sensor: String,

    /// Text the sensor id is derived from (defaults to the name)
    #[arg(long, env = "SENSOR_ID")]
    sensor_id: Option<String>,

    /// Value name
    #[arg(long, env = "SENSOR_VALUE", default_value = "temperature")]
    value: String,

    /// Home Assistant device class
    #[arg(long)]
    device_class: Option<String>,

    /// Unit of measurement
    #[arg(long)]
    unit: Option<String>,

    /// Icon, e.g. mdi:thermometer
    #[arg(long)]
    icon: Option<String>,

    /// MQTT QoS level (0, 1 or 2)
    #[arg(long, default_value_t = 0)]
    qos: u8,

    /// Seconds between readings
    #[arg(long, default_value_t = 30)]
    interval: u64,

    /// First simulated reading
    #[arg(long, default_value_t = 21.0)]
    start: f64,
}

fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

#[tokio::main]
async fn main() {
    // Load .env file before anything else
    ham_sensors::config::load_dotenv();
    init_logger();

    let cli = Cli::parse();
    let config = Config::from_env();

    let qos = match qos_from_level(cli.qos) {
        Ok(qos) => qos,
        Err(e) => {
            error!("{}", e);
            std::process::exit(2);
        }
    };

    info!(
        "Connecting to MQTT broker at {}:{}",
        config.mqtt.broker_host, config.mqtt.broker_port
    );
    let mqtt_client = MqttClient::new(&config.mqtt);

    let mut options = MqttSensorOptions::default().with_qos(qos);
    if let Some(id) = cli.sensor_id {
        options = options.with_id(id);
    }
    let mut sensor = MqttSensor::new(mqtt_client.client(), cli.sensor, options);

    let value_options = MqttValueOptions {
        device_class: cli.device_class,
        unit_of_measurement: cli.unit,
        icon: cli.icon,
        ..Default::default()
    };
    let value = match sensor.add_value(cli.value, value_options) {
        Ok(value) => value,
        Err(e) => {
            error!("Failed to add sensor value: {}", e);
            std::process::exit(1);
        }
    };
    info!("Publishing {} to {}", value.name(), value.state_topic());

    let mqtt_handle = tokio::spawn(mqtt_client.run());

    // Random walk around the start value
    let mut reading = cli.start;
    let mut interval = tokio::time::interval(Duration::from_secs(cli.interval.max(1)));
    loop {
        tokio::select! {
            _ = interval.tick() => {
                reading += rand::thread_rng().gen_range(-0.5..=0.5);
                value.update(reading);
                info!("{} = {:.4}", value.id(), reading);
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down...");
                break;
            }
        }
    }

    if mqtt_handle.is_finished() {
        warn!("MQTT event loop ended early");
    }
    mqtt_handle.abort();
}
