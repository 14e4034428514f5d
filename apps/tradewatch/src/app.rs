use crate::logging::SharedLogStore;
use crate::tasks::{FeedRunner, TaskEvent};
use chrono::Utc;
use crossterm::event::{Event as CtEvent, KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};
use tradewatch_application::config::{Config, FeedSource};
use tradewatch_application::session::SessionStatus;
use tradewatch_domain::services::diagnostics::{Diagnostic, DiagnosticKind};
use tradewatch_domain::services::renderer::{FeedRenderer, ViewCommand};
use tradewatch_domain::value_objects::filter::SideFilter;

const CONSOLE_PAGE: usize = 10;

pub struct App {
    pub renderer: FeedRenderer,
    pub logs: SharedLogStore,
    pub status: SessionStatus,
    pub session_running: bool,
    pub last_result: Option<Result<String, String>>,
    pub source_label: String,
    pub log_scroll: usize,
    pub console_scroll: usize,
    pub spinner: usize,
    pub dirty: bool,
    config: Arc<Config>,
    feed: FeedRunner,
    console_seen: u64,
    reported_paint: HashSet<String>,
}

impl App {
    pub fn new(config: Arc<Config>, logs: SharedLogStore, feed: FeedRunner) -> Self {
        let source_label = match config.feed.source {
            FeedSource::Websocket => config.feed.url.clone(),
            FeedSource::Replay => format!(
                "replay {}",
                config.feed.replay_path.as_deref().unwrap_or("-")
            ),
        };
        Self {
            renderer: FeedRenderer::new(),
            logs,
            status: SessionStatus::default(),
            session_running: false,
            last_result: None,
            source_label,
            log_scroll: 0,
            console_scroll: 0,
            spinner: 0,
            dirty: true,
            config,
            feed,
            console_seen: 0,
            reported_paint: HashSet::new(),
        }
    }

    pub fn start_feed(&mut self) {
        info!(source = %self.source_label, "starting feed session");
        self.feed.start(self.config.clone());
        self.session_running = true;
        self.last_result = None;
        self.dirty = true;
    }

    pub fn spawn_input_reader(&self, tx: tokio::sync::mpsc::UnboundedSender<TaskEvent>) {
        std::thread::spawn(move || {
            while let Ok(event) = crossterm::event::read() {
                let _ = tx.send(TaskEvent::Input(event));
            }
        });
    }

    pub fn on_tick(&mut self) {
        if self.session_running && !self.status.connected {
            self.spinner = (self.spinner + 1) % 4;
            self.dirty = true;
        }

        let written = self.logs.lock().written();
        if written != self.console_seen {
            self.console_seen = written;
            self.dirty = true;
        }
    }

    pub fn on_event(&mut self, event: TaskEvent) -> Result<bool, String> {
        match event {
            TaskEvent::Input(ct) => self.on_input(ct),
            TaskEvent::Feed(event) => {
                let applied = self.renderer.apply(event, Utc::now());
                report_diagnostics(&applied.diagnostics);
                if !applied.is_noop() {
                    self.dirty = true;
                }
                Ok(false)
            }
            TaskEvent::Status(status) => {
                self.status = status;
                self.dirty = true;
                Ok(false)
            }
            TaskEvent::SessionFinished(result) => {
                match &result {
                    Ok(msg) => info!("{msg}"),
                    Err(err) => warn!(error = %err, "feed session ended"),
                }
                self.session_running = false;
                self.status.connected = false;
                self.last_result = Some(result);
                self.dirty = true;
                Ok(false)
            }
        }
    }

    /// Logs paint diagnostics once per distinct message; surfaces are repainted every frame.
    pub fn record_paint(&mut self, diagnostics: Vec<Diagnostic>) {
        let fresh: Vec<Diagnostic> = diagnostics
            .into_iter()
            .filter(|d| self.reported_paint.insert(d.message.clone()))
            .collect();
        report_diagnostics(&fresh);
    }

    pub fn missing_mounts(&self) -> usize {
        self.reported_paint.len()
    }

    pub fn spinner_char(&self) -> char {
        ['|', '/', '-', '\\'][self.spinner % 4]
    }

    fn on_input(&mut self, event: CtEvent) -> Result<bool, String> {
        match event {
            CtEvent::Key(key) => self.on_key(key),
            CtEvent::Resize(_, _) => {
                self.dirty = true;
                Ok(false)
            }
            _ => Ok(false),
        }
    }

    fn on_key(&mut self, key: KeyEvent) -> Result<bool, String> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(true);
        }

        match key.code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Char('a') => self.command(ViewCommand::SetFilter(SideFilter::All)),
            KeyCode::Char('b') => self.command(ViewCommand::SetFilter(SideFilter::Buy)),
            KeyCode::Char('s') => self.command(ViewCommand::SetFilter(SideFilter::Sell)),
            KeyCode::Char('c') => {
                self.command(ViewCommand::ClearLog);
                self.log_scroll = 0;
            }
            KeyCode::Up => {
                let max = self.renderer.log().len().saturating_sub(1);
                self.log_scroll = (self.log_scroll + 1).min(max);
            }
            KeyCode::Down => self.log_scroll = self.log_scroll.saturating_sub(1),
            KeyCode::PageUp => {
                let max = self.logs.lock().len().saturating_sub(1);
                self.console_scroll = (self.console_scroll + CONSOLE_PAGE).min(max);
            }
            KeyCode::PageDown => {
                self.console_scroll = self.console_scroll.saturating_sub(CONSOLE_PAGE);
            }
            _ => return Ok(false),
        }
        self.dirty = true;
        Ok(false)
    }

    fn command(&mut self, command: ViewCommand) {
        let applied = self.renderer.handle(command);
        report_diagnostics(&applied.diagnostics);
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.feed.stop();
    }
}

pub(crate) fn report_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        let kind = match diagnostic.kind {
            DiagnosticKind::MissingField => "missing_field",
            DiagnosticKind::MalformedField => "malformed_field",
            DiagnosticKind::SkippedEvent => "skipped_event",
            DiagnosticKind::MissingMount => "missing_mount",
        };
        metrics::counter!("tradewatch_feed_diagnostics_total", "kind" => kind).increment(1);
        warn!(kind, context = %diagnostic.context, "{}", diagnostic.message);
    }
}

#[cfg(test)]
mod tests {
    use super::App;
    use crate::logging::LogStore;
    use crate::tasks::{FeedRunner, TaskEvent};
    use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
    use std::sync::Arc;
    use tradewatch_application::config::Config;
    use tradewatch_application::session::SessionStatus;
    use tradewatch_domain::events::feed_event::FeedEvent;
    use tradewatch_domain::fixtures;
    use tradewatch_domain::value_objects::filter::SideFilter;

    fn make_app() -> App {
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        App::new(
            Arc::new(Config::default()),
            Arc::new(parking_lot::Mutex::new(LogStore::new(50))),
            FeedRunner::new(tx),
        )
    }

    fn key(code: KeyCode) -> TaskEvent {
        TaskEvent::Input(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn feed(app: &mut App, event: FeedEvent) {
        assert!(!app.on_event(TaskEvent::Feed(event)).unwrap());
    }

    #[test]
    fn quit_keys() {
        let mut app = make_app();
        assert!(app.on_event(key(KeyCode::Char('q'))).unwrap());
        let ctrl_c = TaskEvent::Input(Event::Key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
        )));
        assert!(app.on_event(ctrl_c).unwrap());
    }

    #[test]
    fn filter_keys_switch_the_side_filter() {
        let mut app = make_app();
        feed(&mut app, FeedEvent::Trade(fixtures::trade("AAPL", "buy", 10.0, 1.0)));
        feed(&mut app, FeedEvent::Trade(fixtures::trade("TSLA", "sell", 20.0, 2.0)));

        app.on_event(key(KeyCode::Char('b'))).unwrap();
        assert_eq!(app.renderer.filter(), SideFilter::Buy);
        assert_eq!(app.renderer.trade_views().len(), 1);

        app.on_event(key(KeyCode::Char('s'))).unwrap();
        assert_eq!(app.renderer.trade_views()[0].symbol, "TSLA");

        app.on_event(key(KeyCode::Char('a'))).unwrap();
        assert_eq!(app.renderer.trade_views().len(), 2);
    }

    #[test]
    fn clear_key_empties_the_activity_log_and_resets_scroll() {
        let mut app = make_app();
        for n in 0..5 {
            feed(
                &mut app,
                FeedEvent::Log(fixtures::log("info", &format!("entry {n}"))),
            );
        }
        app.on_event(key(KeyCode::Up)).unwrap();
        app.on_event(key(KeyCode::Up)).unwrap();
        assert_eq!(app.log_scroll, 2);

        app.on_event(key(KeyCode::Char('c'))).unwrap();
        assert!(app.renderer.log().is_empty());
        assert_eq!(app.log_scroll, 0);

        app.on_event(key(KeyCode::Up)).unwrap();
        assert_eq!(app.log_scroll, 0);
    }

    #[test]
    fn console_scroll_is_bounded_by_the_store() {
        let mut app = make_app();
        for n in 0..15 {
            app.logs.lock().push_line(format!("console {n}"));
        }
        app.on_event(key(KeyCode::PageUp)).unwrap();
        app.on_event(key(KeyCode::PageUp)).unwrap();
        assert_eq!(app.console_scroll, 14);
        app.on_event(key(KeyCode::PageDown)).unwrap();
        assert_eq!(app.console_scroll, 4);
        app.on_event(key(KeyCode::PageDown)).unwrap();
        assert_eq!(app.console_scroll, 0);
    }

    #[test]
    fn session_events_update_status_and_redraw() {
        let mut app = make_app();
        app.dirty = false;
        app.on_event(TaskEvent::Status(SessionStatus {
            connected: true,
            reconnects: 2,
            ..SessionStatus::default()
        }))
        .unwrap();
        assert!(app.dirty);
        assert_eq!(app.status.reconnects, 2);

        app.on_event(TaskEvent::SessionFinished(Err("feed unavailable".to_string())))
            .unwrap();
        assert!(!app.session_running);
        assert!(!app.status.connected);
        assert!(matches!(app.last_result, Some(Err(_))));
    }

    #[test]
    fn tick_redraws_when_the_console_grows() {
        let mut app = make_app();
        app.on_tick();
        app.dirty = false;
        app.on_tick();
        assert!(!app.dirty);

        app.logs.lock().push_line("fresh");
        app.on_tick();
        assert!(app.dirty);
    }
}
