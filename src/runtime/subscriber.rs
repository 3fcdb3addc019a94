use super::worker_registry::{now_secs, sleep_with_stop, WorkerEvent};
use crate::bus::{pump_channel, BusError, RedisBus, RedisEmitter, RedisSessionStore};
use crate::channels::slack::SlackApiClient;
use crate::config::Settings;
use crate::dialog::{DialogController, EventSource};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::Duration;

/// Wait before resubscribing after the subscription breaks.
pub const RESUBSCRIBE_BACKOFF: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerSpec {
    pub id: String,
    pub source: EventSource,
    pub channel: String,
}

#[derive(Debug, Clone)]
pub(crate) struct WorkerRunContext {
    pub(crate) settings: Settings,
    pub(crate) bus: RedisBus,
    pub(crate) slack_bot_token: String,
    pub(crate) stop: Arc<AtomicBool>,
    pub(crate) events: Sender<WorkerEvent>,
    pub(crate) backoff: Duration,
}

/// One subscriber per inbound channel.
pub fn build_worker_specs(settings: &Settings) -> Vec<WorkerSpec> {
    [
        (EventSource::SlashCommands, &settings.channels.slash_commands),
        (
            EventSource::ViewSubmissions,
            &settings.channels.view_submissions,
        ),
        (EventSource::PoppitOutput, &settings.channels.poppit_output),
    ]
    .into_iter()
    .map(|(source, channel)| WorkerSpec {
        id: format!("subscriber:{}", source.as_str()),
        source,
        channel: channel.clone(),
    })
    .collect()
}

/// Each worker owns its command connection so handlers on different channels
/// never contend on one socket.
fn pump_once(spec: &WorkerSpec, ctx: &WorkerRunContext) -> Result<(), BusError> {
    let conn = Arc::new(ctx.bus.connect()?);
    let sessions = RedisSessionStore::new(Arc::clone(&conn));
    let emitter = RedisEmitter::new(Arc::clone(&conn), &ctx.settings.lists);
    let slack = SlackApiClient::new(ctx.slack_bot_token.clone());
    let controller = DialogController::new(&ctx.settings, &sessions, &emitter, &emitter, &slack);

    pump_channel(&ctx.bus, &spec.channel, &ctx.stop, |payload| {
        controller.handle(spec.source, payload);
    })
}

pub(crate) fn run_worker(spec: WorkerSpec, ctx: WorkerRunContext) {
    let _ = ctx.events.send(WorkerEvent::Started {
        worker_id: spec.id.clone(),
        at: now_secs(),
    });

    while !ctx.stop.load(Ordering::Relaxed) {
        match pump_once(&spec, &ctx) {
            Ok(()) => break,
            Err(err) => {
                let _ = ctx.events.send(WorkerEvent::Error {
                    worker_id: spec.id.clone(),
                    at: now_secs(),
                    message: err.to_string(),
                    fatal: false,
                });
                if !sleep_with_stop(&ctx.stop, ctx.backoff) {
                    break;
                }
            }
        }
    }

    let _ = ctx.events.send(WorkerEvent::Stopped {
        worker_id: spec.id.clone(),
        at: now_secs(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_one_spec_per_inbound_channel() {
        let mut settings = Settings::default();
        settings.channels.poppit_output = "poppit:custom-output".to_string();

        let specs = build_worker_specs(&settings);
        let ids = specs.iter().map(|spec| spec.id.as_str()).collect::<Vec<_>>();
        assert_eq!(
            ids,
            vec![
                "subscriber:slash_commands",
                "subscriber:view_submissions",
                "subscriber:poppit_output"
            ]
        );
        assert_eq!(specs[0].channel, "slack-commands");
        assert_eq!(specs[1].channel, "slack-relay-view-submission");
        assert_eq!(specs[2].channel, "poppit:custom-output");
        assert_eq!(specs[2].source, EventSource::PoppitOutput);
    }

    #[test]
    fn stopped_worker_reports_start_and_stop_without_connecting() {
        let (tx, rx) = std::sync::mpsc::channel();
        let ctx = WorkerRunContext {
            settings: Settings::default(),
            bus: RedisBus::open("127.0.0.1:1", None).expect("open lazily"),
            slack_bot_token: "xoxb-test".to_string(),
            stop: Arc::new(AtomicBool::new(true)),
            events: tx,
            backoff: Duration::from_millis(10),
        };
        let spec = build_worker_specs(&ctx.settings).remove(0);

        run_worker(spec, ctx);

        let events = rx.try_iter().collect::<Vec<_>>();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], WorkerEvent::Started { .. }));
        assert!(matches!(events[1], WorkerEvent::Stopped { .. }));
    }
}
