use crate::app::report_diagnostics;
use crate::tasks::connect_feed;
use chrono::Utc;
use std::time::Duration;
use tracing::info;
use tradewatch_application::config::{Config, FeedSource};
use tradewatch_application::rendering::paint;
use tradewatch_application::rendering::text_surface::TextSurface;
use tradewatch_application::session::{run_feed_session, ReconnectPolicy, SessionControl};
use tradewatch_domain::services::renderer::FeedRenderer;

struct RunToEnd;

impl SessionControl for RunToEnd {
    fn should_stop(&self) -> bool {
        false
    }

    fn sleep(&self, duration: Duration) -> bool {
        std::thread::sleep(duration);
        true
    }
}

/// Replays a recorded feed without pacing, paints it once onto a text surface and summarizes
/// the result as JSON.
pub fn run_headless(config: &Config) -> Result<serde_json::Value, String> {
    if config.feed.source != FeedSource::Replay {
        return Err(
            "headless mode needs a recorded feed: pass --replay <file> or set feed.source = \"replay\""
                .to_string(),
        );
    }

    let policy = ReconnectPolicy {
        max_attempts: Some(1),
        ..ReconnectPolicy::from_config(&config.reconnect)
    };
    let mut renderer = FeedRenderer::new();
    let mut events_applied: u64 = 0;
    let mut diagnostics: usize = 0;

    let mut connect = || connect_feed(&config.feed, false);
    let summary = run_feed_session(
        &mut connect,
        &policy,
        &RunToEnd,
        &mut |event| {
            let applied = renderer.apply(event, Utc::now());
            events_applied += 1;
            diagnostics += applied.diagnostics.len();
            report_diagnostics(&applied.diagnostics);
        },
        &mut |_| {},
    )?;

    let mut surface = TextSurface::new();
    let paint_diagnostics = paint(&renderer, &mut surface);
    diagnostics += paint_diagnostics.len();
    report_diagnostics(&paint_diagnostics);

    info!(
        events = summary.status.events_forwarded,
        diagnostics, "replay finished"
    );

    let equity: Vec<f64> = renderer.equity().iter().map(|sample| sample.value).collect();
    Ok(serde_json::json!({
        "status": "ok",
        "end": summary.end,
        "events_forwarded": summary.status.events_forwarded,
        "events_applied": events_applied,
        "invalid_frames": summary.status.invalid_frames,
        "diagnostics": diagnostics,
        "log_entries": renderer.log().len(),
        "equity_window": equity,
        "trades": renderer.trades().len(),
        "positions": renderer.positions().len(),
        "orders": renderer.orders().len(),
        "screen": surface.lines(),
    }))
}
