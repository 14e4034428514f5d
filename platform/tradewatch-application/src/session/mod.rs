//! Feed session: owns the transport lifecycle between the dashboard and a [`FeedStream`].
//!
//! The session connects, asks once for the current balance, forwards every decoded event in
//! arrival order and reconnects with bounded exponential backoff when the link drops. It
//! reports lifecycle changes as [`FeedEvent::Connection`] so the renderer only ever sees events.

use crate::config::ReconnectConfig;
use rand::Rng;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, info_span, warn};
use tradewatch_domain::events::feed_event::FeedEvent;
use tradewatch_domain::repositories::feed_stream::{FeedStream, StreamError};
use tradewatch_domain::value_objects::connection::ConnectionState;

pub trait SessionControl {
    fn should_stop(&self) -> bool;

    /// Waits up to `duration`. Returns `false` when a stop was requested meanwhile.
    fn sleep(&self, duration: Duration) -> bool;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub jitter: f64,
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::from_config(&ReconnectConfig::default())
    }
}

impl ReconnectPolicy {
    pub fn from_config(config: &ReconnectConfig) -> Self {
        Self {
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms.max(config.initial_delay_ms)),
            jitter: config.jitter.clamp(0.0, 1.0),
            max_attempts: (config.max_attempts > 0).then_some(config.max_attempts),
        }
    }

    /// Delay before reconnect attempt `attempt` (1-based). `unit` is a uniform sample in
    /// `[0, 1)` that spreads the delay by `±jitter`; the result never exceeds `max_delay`.
    pub fn delay_for(&self, attempt: u32, unit: f64) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        let base_ms = (self.initial_delay.as_millis() as f64) * f64::from(1u32 << exponent);
        let max_ms = self.max_delay.as_millis() as f64;
        let factor = 1.0 + self.jitter * (2.0 * unit.clamp(0.0, 1.0) - 1.0);
        let ms = (base_ms.min(max_ms) * factor).clamp(0.0, max_ms);
        Duration::from_millis(ms.round() as u64)
    }

    pub fn gives_up_after(&self, consecutive_failures: u32) -> bool {
        self.max_attempts
            .is_some_and(|limit| consecutive_failures >= limit)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionStatus {
    pub connected: bool,
    pub reconnects: u64,
    pub last_error: Option<String>,
    pub events_forwarded: u64,
    pub invalid_frames: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionEnd {
    /// The control asked the session to stop.
    Stopped,
    /// The source ran dry (replay finished).
    Exhausted,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub end: SessionEnd,
    pub status: SessionStatus,
}

/// Runs until stopped, exhausted, or out of reconnect attempts (the only error).
pub fn run_feed_session(
    connect: &mut dyn FnMut() -> Result<Box<dyn FeedStream>, String>,
    policy: &ReconnectPolicy,
    control: &dyn SessionControl,
    on_event: &mut dyn FnMut(FeedEvent),
    on_status: &mut dyn FnMut(&SessionStatus),
) -> Result<SessionSummary, String> {
    let _span = info_span!("feed_session", max_attempts = ?policy.max_attempts).entered();

    let mut rng = rand::thread_rng();
    let mut status = SessionStatus::default();
    let mut failures: u32 = 0;
    let mut backoff_attempt: u32 = 0;

    let stopped = |status: &SessionStatus| SessionSummary {
        end: SessionEnd::Stopped,
        status: status.clone(),
    };

    loop {
        if backoff_attempt > 0 {
            let delay = policy.delay_for(backoff_attempt, rng.gen::<f64>());
            debug!(attempt = backoff_attempt, delay_ms = delay.as_millis() as u64, "backing off");
            if !control.sleep(delay) {
                return Ok(stopped(&status));
            }
        }
        if control.should_stop() {
            return Ok(stopped(&status));
        }

        on_event(FeedEvent::Connection(ConnectionState::Connecting));
        let mut stream = match connect() {
            Ok(stream) => stream,
            Err(err) => {
                failures = failures.saturating_add(1);
                backoff_attempt = backoff_attempt.saturating_add(1);
                warn!(failures, error = %err, "feed connect failed");
                status.connected = false;
                status.last_error = Some(err.clone());
                on_status(&status);
                if policy.gives_up_after(failures) {
                    on_event(FeedEvent::Connection(ConnectionState::Disconnected));
                    return Err(format!(
                        "feed unavailable after {failures} connection attempt(s): {err}"
                    ));
                }
                continue;
            }
        };

        failures = 0;
        status.connected = true;
        status.last_error = None;
        info!(reconnects = status.reconnects, "feed connected");
        on_event(FeedEvent::Connection(ConnectionState::Connected));
        on_status(&status);

        if let Err(err) = stream.request_balance() {
            warn!(error = %err, "balance request failed");
        }

        let lost = loop {
            if control.should_stop() {
                return Ok(stopped(&status));
            }
            match stream.next_event() {
                Ok(Some(event)) => {
                    status.events_forwarded = status.events_forwarded.saturating_add(1);
                    metrics::counter!("tradewatch_feed_events_total", "kind" => event.kind())
                        .increment(1);
                    on_event(event);
                }
                Ok(None) => {}
                Err(StreamError::InvalidData(msg)) => {
                    status.invalid_frames = status.invalid_frames.saturating_add(1);
                    metrics::counter!("tradewatch_feed_invalid_frames_total").increment(1);
                    warn!(error = %msg, "skipping undecodable frame");
                    on_status(&status);
                }
                Err(StreamError::Exhausted) => {
                    info!(events = status.events_forwarded, "feed exhausted");
                    status.connected = false;
                    on_event(FeedEvent::Connection(ConnectionState::Disconnected));
                    on_status(&status);
                    return Ok(SessionSummary {
                        end: SessionEnd::Exhausted,
                        status,
                    });
                }
                Err(err @ (StreamError::Disconnected(_) | StreamError::Protocol(_))) => {
                    break err.to_string();
                }
            }
        };

        warn!(error = %lost, "feed connection lost");
        status.connected = false;
        status.reconnects = status.reconnects.saturating_add(1);
        status.last_error = Some(lost);
        metrics::counter!("tradewatch_feed_reconnects_total").increment(1);
        on_event(FeedEvent::Connection(ConnectionState::Disconnected));
        on_status(&status);
        backoff_attempt = 1;
    }
}
