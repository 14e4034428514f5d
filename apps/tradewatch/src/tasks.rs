use parking_lot::{Condvar, Mutex};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tradewatch_application::config::{Config, FeedConfig, FeedSource};
use tradewatch_application::session::{
    run_feed_session, ReconnectPolicy, SessionControl, SessionEnd, SessionStatus,
};
use tradewatch_domain::events::feed_event::FeedEvent;
use tradewatch_domain::repositories::feed_stream::FeedStream;
use tradewatch_infrastructure::feed::replay::ReplayFeedStream;

pub enum TaskEvent {
    Input(crossterm::event::Event),
    Feed(FeedEvent),
    Status(SessionStatus),
    SessionFinished(Result<String, String>),
}

/// Runs the feed session on a blocking worker and forwards everything it produces to the UI
/// loop.
#[derive(Clone)]
pub struct FeedRunner {
    inner: Arc<FeedRunnerInner>,
}

struct FeedRunnerInner {
    tx: tokio::sync::mpsc::UnboundedSender<TaskEvent>,
    control: Mutex<Option<StopControl>>,
}

#[derive(Clone)]
pub(crate) struct StopControl {
    stop: Arc<AtomicBool>,
    wake: Arc<(Mutex<()>, Condvar)>,
}

impl StopControl {
    pub(crate) fn new() -> Self {
        Self {
            stop: Arc::new(AtomicBool::new(false)),
            wake: Arc::new((Mutex::new(()), Condvar::new())),
        }
    }

    fn is(&self, other: &StopControl) -> bool {
        Arc::ptr_eq(&self.stop, &other.stop)
    }

    pub(crate) fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
        let (lock, cvar) = &*self.wake;
        let _guard = lock.lock();
        cvar.notify_all();
    }
}

impl SessionControl for StopControl {
    fn should_stop(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        let (lock, cvar) = &*self.wake;
        let mut guard = lock.lock();
        while !self.should_stop() {
            if cvar.wait_until(&mut guard, deadline).timed_out() {
                break;
            }
        }
        !self.should_stop()
    }
}

impl FeedRunner {
    pub fn new(tx: tokio::sync::mpsc::UnboundedSender<TaskEvent>) -> Self {
        Self {
            inner: Arc::new(FeedRunnerInner {
                tx,
                control: Mutex::new(None),
            }),
        }
    }

    pub fn start(&self, config: Arc<Config>) {
        // Registered before the worker runs so a stop issued right away is never lost.
        let control = StopControl::new();
        *self.inner.control.lock() = Some(control.clone());

        let inner = self.inner.clone();
        let tx = inner.tx.clone();
        tokio::task::spawn_blocking(move || {
            let result = run_session(config.as_ref(), &tx, &control);
            {
                let mut slot = inner.control.lock();
                if slot.as_ref().is_some_and(|current| current.is(&control)) {
                    *slot = None;
                }
            }
            let _ = tx.send(TaskEvent::SessionFinished(result));
        });
    }

    pub fn stop(&self) {
        let control = { self.inner.control.lock().clone() };
        if let Some(control) = control {
            control.stop();
        }
    }
}

fn run_session(
    config: &Config,
    tx: &tokio::sync::mpsc::UnboundedSender<TaskEvent>,
    control: &StopControl,
) -> Result<String, String> {
    let policy = ReconnectPolicy::from_config(&config.reconnect);
    let mut connect = || connect_feed(&config.feed, true);
    let summary = run_feed_session(
        &mut connect,
        &policy,
        control,
        &mut |event| {
            let _ = tx.send(TaskEvent::Feed(event));
        },
        &mut |status| {
            let _ = tx.send(TaskEvent::Status(status.clone()));
        },
    )?;
    Ok(match summary.end {
        SessionEnd::Stopped => "feed stopped".to_string(),
        SessionEnd::Exhausted => format!(
            "feed ended after {} event(s)",
            summary.status.events_forwarded
        ),
    })
}

/// Opens one connection to the configured source. Replays are paced only when `paced`.
pub(crate) fn connect_feed(config: &FeedConfig, paced: bool) -> Result<Box<dyn FeedStream>, String> {
    match config.source {
        FeedSource::Replay => {
            let path = config
                .replay_path
                .as_deref()
                .filter(|path| !path.trim().is_empty())
                .ok_or_else(|| "feed.replay_path is not set".to_string())?;
            let delay = paced.then(|| Duration::from_millis(config.replay_delay_ms));
            Ok(Box::new(ReplayFeedStream::open(Path::new(path), delay)?))
        }
        FeedSource::Websocket => connect_websocket(config),
    }
}

#[cfg(feature = "realtime-ws")]
fn connect_websocket(config: &FeedConfig) -> Result<Box<dyn FeedStream>, String> {
    use tradewatch_infrastructure::feed::websocket::{WebsocketFeedStream, WebsocketOptions};

    let options = WebsocketOptions {
        read_timeout: Duration::from_millis(config.read_timeout_ms),
        request_event: config.request_balance_event.clone(),
        ..WebsocketOptions::new(config.url.clone())
    };
    Ok(Box::new(WebsocketFeedStream::connect(&options)?))
}

#[cfg(not(feature = "realtime-ws"))]
fn connect_websocket(config: &FeedConfig) -> Result<Box<dyn FeedStream>, String> {
    Err(format!(
        "cannot connect to {}: built without the realtime-ws feature",
        config.url
    ))
}

#[cfg(test)]
mod tests {
    use super::{connect_feed, FeedRunner, StopControl, TaskEvent};
    use std::sync::{mpsc, Arc};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};
    use tradewatch_application::config::{Config, FeedConfig, FeedSource};
    use tradewatch_application::session::SessionControl;
    use tradewatch_domain::events::feed_event::FeedEvent;
    use tradewatch_domain::repositories::feed_stream::StreamError;

    #[test]
    fn sleep_runs_out_when_nobody_stops() {
        let control = StopControl::new();
        assert!(control.sleep(Duration::from_millis(5)));
        assert!(!control.should_stop());
    }

    #[test]
    fn stop_wakes_a_sleeping_session() {
        let control = StopControl::new();
        let (tx, rx) = mpsc::channel();
        let control2 = control.clone();
        std::thread::spawn(move || {
            let ok = control2.sleep(Duration::from_secs(30));
            let _ = tx.send(ok);
        });

        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
        control.stop();
        assert!(!rx.recv_timeout(Duration::from_millis(500)).unwrap());
        assert!(!control.sleep(Duration::from_secs(30)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn stop_right_after_start_ends_an_endless_session() {
        let mut config = Config::default();
        config.feed.source = FeedSource::Replay;
        config.feed.replay_path = Some("/nonexistent/tradewatch/feed.jsonl".to_string());
        config.reconnect.initial_delay_ms = 60_000;
        config.reconnect.max_delay_ms = 60_000;
        config.reconnect.max_attempts = 0;

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let runner = FeedRunner::new(tx);
        runner.start(Arc::new(config));
        runner.stop();

        let finished = tokio::time::timeout(Duration::from_secs(5), async {
            while let Some(event) = rx.recv().await {
                if let TaskEvent::SessionFinished(result) = event {
                    return result;
                }
            }
            Err("channel closed".to_string())
        })
        .await
        .expect("session should end after stop");
        assert_eq!(finished, Ok("feed stopped".to_string()));
        assert!(runner.inner.control.lock().is_none());
    }

    #[test]
    fn replay_source_opens_the_recording() {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = std::env::temp_dir().join(format!("tradewatch_connect_{nanos}.jsonl"));
        std::fs::write(
            &path,
            "{\"event\":\"market_status\",\"data\":{\"status\":\"closed\"}}\n",
        )
        .unwrap();

        let config = FeedConfig {
            source: FeedSource::Replay,
            replay_path: Some(path.display().to_string()),
            ..FeedConfig::default()
        };
        let mut stream = connect_feed(&config, false).unwrap();
        assert!(matches!(stream.next_event(), Ok(Some(FeedEvent::MarketStatus(_)))));
        assert_eq!(stream.next_event(), Err(StreamError::Exhausted));

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn replay_source_reports_missing_files() {
        let config = FeedConfig {
            source: FeedSource::Replay,
            replay_path: Some("/nonexistent/tradewatch/feed.jsonl".to_string()),
            ..FeedConfig::default()
        };
        let err = connect_feed(&config, false).err().unwrap();
        assert!(err.contains("failed to open replay"));

        let unset = FeedConfig {
            source: FeedSource::Replay,
            ..FeedConfig::default()
        };
        assert!(connect_feed(&unset, false).is_err());
    }
}
