use super::{BusError, RedisBus};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Upper bound on how long a quiet subscription waits before re-checking the stop flag.
pub const SUBSCRIPTION_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Subscribes to `channel` and hands each text payload to `on_payload`, one at a
/// time, until `stop` is raised. The payload being handled when `stop` flips is
/// always finished. Returns `Err` when the subscription itself breaks.
pub fn pump_channel<F>(
    bus: &RedisBus,
    channel: &str,
    stop: &AtomicBool,
    mut on_payload: F,
) -> Result<(), BusError>
where
    F: FnMut(&str),
{
    let mut conn = bus.raw_connection()?;
    let mut pubsub = conn.as_pubsub();
    pubsub
        .subscribe(channel)
        .map_err(|source| BusError::Command {
            command: "SUBSCRIBE",
            source,
        })?;
    pubsub
        .set_read_timeout(Some(SUBSCRIPTION_POLL_INTERVAL))
        .map_err(|source| BusError::Command {
            command: "SUBSCRIBE",
            source,
        })?;
    tracing::info!(channel, "subscribed to redis channel");

    while !stop.load(Ordering::Relaxed) {
        let message = match pubsub.get_message() {
            Ok(message) => message,
            Err(err) if err.is_timeout() => continue,
            Err(source) => {
                return Err(BusError::Command {
                    command: "SUBSCRIBE",
                    source,
                })
            }
        };
        match message.get_payload::<String>() {
            Ok(payload) => on_payload(&payload),
            Err(err) => {
                tracing::warn!(channel, error = %err, "dropping non-text pub/sub payload");
            }
        }
    }

    tracing::info!(channel, "unsubscribed from redis channel");
    Ok(())
}
