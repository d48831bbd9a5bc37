//! The publish capability sensors depend on.
//!
//! Anything that can put a message on a topic implements [`MqttPublisher`].
//! The sensors never observe whether a publish succeeded; transports that can
//! fail log the failure and drop the message.

use log::warn;
use rumqttc::{AsyncClient, Client, QoS};
use std::sync::Arc;

/// Publish a message to a named topic.
pub trait MqttPublisher: Send + Sync {
    fn publish(&self, topic: &str, qos: QoS, retain: bool, payload: &[u8]);
}

/// Adapter turning an ordinary function or closure into a publisher.
///
/// # Example
/// ```ignore
/// let publisher = PublisherFn(|topic: &str, _qos, _retain, payload: &[u8]| {
///     println!("{topic}: {}", String::from_utf8_lossy(payload));
/// });
/// ```
#[derive(Clone)]
pub struct PublisherFn<F>(pub F);

impl<F> MqttPublisher for PublisherFn<F>
where
    F: Fn(&str, QoS, bool, &[u8]) + Send + Sync,
{
    fn publish(&self, topic: &str, qos: QoS, retain: bool, payload: &[u8]) {
        (self.0)(topic, qos, retain, payload)
    }
}

impl<P: MqttPublisher + ?Sized> MqttPublisher for Arc<P> {
    fn publish(&self, topic: &str, qos: QoS, retain: bool, payload: &[u8]) {
        (**self).publish(topic, qos, retain, payload)
    }
}

/// Queues the publish without waiting; the event loop sends it.
impl MqttPublisher for AsyncClient {
    fn publish(&self, topic: &str, qos: QoS, retain: bool, payload: &[u8]) {
        if let Err(e) = self.try_publish(topic, qos, retain, payload.to_vec()) {
            warn!("Dropping MQTT publish to {}: {}", topic, e);
        }
    }
}

impl MqttPublisher for Client {
    fn publish(&self, topic: &str, qos: QoS, retain: bool, payload: &[u8]) {
        if let Err(e) = self.try_publish(topic, qos, retain, payload.to_vec()) {
            warn!("Dropping MQTT publish to {}: {}", topic, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use rumqttc::MqttOptions;

    #[test]
    fn test_publisher_fn_forwards_arguments() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let publisher = PublisherFn(move |topic: &str, qos: QoS, retain: bool, payload: &[u8]| {
            sink.lock()
                .push((topic.to_string(), qos, retain, payload.to_vec()));
        });

        publisher.publish("a/b", QoS::AtLeastOnce, true, b"21.5000");

        let seen = seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(
            seen[0],
            ("a/b".to_string(), QoS::AtLeastOnce, true, b"21.5000".to_vec())
        );
    }

    #[test]
    fn test_arc_publisher_delegates() {
        let count = Arc::new(Mutex::new(0));
        let counter = count.clone();
        let publisher: Arc<dyn MqttPublisher> = Arc::new(PublisherFn(
            move |_: &str, _: QoS, _: bool, _: &[u8]| *counter.lock() += 1,
        ));

        publisher.publish("x", QoS::AtMostOnce, false, b"");
        publisher.clone().publish("y", QoS::AtMostOnce, false, b"");
        assert_eq!(*count.lock(), 2);
    }

    #[test]
    fn test_async_client_queues_publish_and_drops_when_full() {
        // Capacity 1 and no running event loop.
        let options = MqttOptions::new("test-client", "localhost", 1883);
        let (client, _event_loop) = AsyncClient::new(options, 1);

        MqttPublisher::publish(&client, "a", QoS::AtMostOnce, false, b"1");
        // The first publish occupies the only slot.
        assert!(client.try_publish("a", QoS::AtMostOnce, false, "x").is_err());

        // A full queue drops the message instead of blocking.
        MqttPublisher::publish(&client, "a", QoS::AtMostOnce, false, b"2");
    }
}
