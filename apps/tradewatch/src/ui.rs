use crate::app::App;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Axis, Block, Borders, Cell, Chart, Dataset, Gauge, GraphType, Paragraph, Row, Table, Tabs,
    Wrap,
};
use ratatui::Frame;
use std::collections::HashMap;
use tradewatch_application::rendering::paint;
use tradewatch_domain::repositories::render_surface::{Mount, RenderSurface};
use tradewatch_domain::services::views::{
    BalanceView, ChangeView, EquityPointView, LogView, OrderView, PositionView, Tone, TradeView,
};
use tradewatch_domain::value_objects::connection::ConnectionState;
use tradewatch_domain::value_objects::filter::SideFilter;
use tradewatch_domain::value_objects::log_entry::LogLevel;
use tradewatch_domain::value_objects::market::MarketState;

pub fn draw(frame: &mut Frame, app: &mut App) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(9),
                Constraint::Min(6),
                Constraint::Length(8),
                Constraint::Length(7),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(frame.area());

    let top = columns(outer[2], 45);
    let tables = columns(outer[3], 50);
    let bottom = columns(outer[4], 50);

    let areas = HashMap::from([
        (Mount::Connection, outer[0]),
        (Mount::Filters, outer[1]),
        (Mount::Balance, top[0]),
        (Mount::EquityChart, top[1]),
        (Mount::Trades, tables[0]),
        (Mount::Positions, tables[1]),
        (Mount::Orders, bottom[0]),
        (Mount::Log, bottom[1]),
    ]);

    let mut surface = FrameSurface {
        frame: &mut *frame,
        areas,
        log_scroll: app.log_scroll,
        session_note: session_note(app),
    };
    let diagnostics = paint(&app.renderer, &mut surface);
    app.record_paint(diagnostics);

    draw_console(frame, outer[5], app);
    draw_keys(frame, outer[6]);
}

/// Paints dashboard projections into fixed regions of one frame. Regions too small to hold a
/// bordered widget count as absent.
struct FrameSurface<'a, 'f> {
    frame: &'a mut Frame<'f>,
    areas: HashMap<Mount, Rect>,
    log_scroll: usize,
    session_note: String,
}

impl FrameSurface<'_, '_> {
    fn area(&self, mount: Mount) -> Rect {
        self.areas.get(&mount).copied().unwrap_or_default()
    }
}

impl RenderSurface for FrameSurface<'_, '_> {
    fn has_mount(&self, mount: Mount) -> bool {
        let area = self.area(mount);
        area.width >= 3 && area.height >= 3
    }

    fn paint_connection(&mut self, state: ConnectionState, market: MarketState) {
        let state_color = match state {
            ConnectionState::Connected => Color::Green,
            ConnectionState::Connecting => Color::Yellow,
            ConnectionState::Disconnected => Color::Red,
        };
        let market_color = match market {
            MarketState::Open => Color::Green,
            MarketState::Extended => Color::Yellow,
            MarketState::Closed => Color::Red,
            MarketState::Unknown => Color::DarkGray,
        };
        let line = Line::from(vec![
            Span::styled(
                format!("● {}", state.label()),
                Style::default()
                    .fg(state_color)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(market.label(), Style::default().fg(market_color)),
            Span::raw(format!("  {}", self.session_note)),
        ]);
        let area = self.area(Mount::Connection);
        self.frame.render_widget(
            Paragraph::new(line).block(Block::default().title("Tradewatch").borders(Borders::ALL)),
            area,
        );
    }

    fn paint_balance(&mut self, balance: Option<&BalanceView>) {
        let area = self.area(Mount::Balance);
        let block = Block::default().title("Balance").borders(Borders::ALL);
        let Some(view) = balance else {
            self.frame.render_widget(
                Paragraph::new("Waiting for balance update...").block(block),
                area,
            );
            return;
        };

        let halves = columns(area, 55);
        let lines = vec![
            Line::from(vec![
                Span::raw("Equity        "),
                Span::styled(
                    view.total_equity.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(format!("Cash          {}", view.cash_balance)),
            Line::from(format!("Buying power  {}", view.buying_power)),
            Line::from(format!("Market        {}", view.market.label())),
            Line::from(format!("Last update   {}", view.last_update)),
        ];
        self.frame
            .render_widget(Paragraph::new(lines).block(block), halves[0]);

        let gauges = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
            .split(halves[1]);
        self.frame
            .render_widget(change_gauge("Hourly P/L", &view.hourly), gauges[0]);
        self.frame
            .render_widget(change_gauge("Daily P/L", &view.daily), gauges[1]);
    }

    fn paint_equity(&mut self, points: &[EquityPointView]) {
        let area = self.area(Mount::EquityChart);
        let block = Block::default().title("Equity").borders(Borders::ALL);
        if points.is_empty() {
            self.frame
                .render_widget(Paragraph::new("no equity samples yet").block(block), area);
            return;
        }

        let data: Vec<(f64, f64)> = points
            .iter()
            .enumerate()
            .map(|(idx, point)| (idx as f64, point.value))
            .collect();
        let (x_min, x_max) = x_bounds(&data);
        let (y_min, y_max) = y_bounds(&data);
        let first = points.first().map(|p| p.label.clone()).unwrap_or_default();
        let last = points.last().map(|p| p.label.clone()).unwrap_or_default();

        let chart = Chart::new(vec![Dataset::default()
            .name("equity")
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&data)])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([x_min, x_max])
                .labels(vec![Line::from(first), Line::from(last)]),
        )
        .y_axis(
            Axis::default()
                .bounds([y_min, y_max])
                .labels(axis_labels(y_min, y_max)),
        );
        self.frame.render_widget(chart, area);
    }

    fn paint_trades(&mut self, rows: &[TradeView], filter: SideFilter) {
        let body: Vec<Row> = rows
            .iter()
            .map(|row| {
                Row::new(vec![
                    Cell::from(row.time.clone()),
                    Cell::from(row.symbol.clone()),
                    Cell::from(row.side.clone()).style(tone_style(row.tone)),
                    Cell::from(row.quantity.clone()),
                    Cell::from(row.price.clone()),
                ])
            })
            .collect();
        let table = Table::new(
            body,
            [
                Constraint::Length(9),
                Constraint::Length(8),
                Constraint::Length(5),
                Constraint::Length(10),
                Constraint::Min(10),
            ],
        )
        .header(header_row(&["Time", "Symbol", "Side", "Qty", "Price"]))
        .block(
            Block::default()
                .title(format!("Trades ({})", filter.label()))
                .borders(Borders::ALL),
        );
        let area = self.area(Mount::Trades);
        self.frame.render_widget(table, area);
    }

    fn paint_positions(&mut self, rows: &[PositionView], filter: SideFilter) {
        let body: Vec<Row> = rows
            .iter()
            .map(|row| {
                Row::new(vec![
                    Cell::from(row.symbol.clone()),
                    Cell::from(row.side.clone()),
                    Cell::from(row.qty.clone()),
                    Cell::from(row.avg_entry_price.clone()),
                    Cell::from(row.current_price.clone()),
                    Cell::from(row.unrealized_pl.clone()).style(tone_style(row.tone)),
                    Cell::from(row.unrealized_plpc.clone()).style(tone_style(row.tone)),
                ])
            })
            .collect();
        let table = Table::new(
            body,
            [
                Constraint::Length(8),
                Constraint::Length(5),
                Constraint::Length(8),
                Constraint::Length(11),
                Constraint::Length(11),
                Constraint::Length(11),
                Constraint::Min(8),
            ],
        )
        .header(header_row(&["Symbol", "Side", "Qty", "Avg", "Now", "P/L", "P/L %"]))
        .block(
            Block::default()
                .title(format!("Positions ({})", filter.label()))
                .borders(Borders::ALL),
        );
        let area = self.area(Mount::Positions);
        self.frame.render_widget(table, area);
    }

    fn paint_orders(&mut self, rows: &[OrderView]) {
        let body: Vec<Row> = rows
            .iter()
            .map(|row| {
                Row::new(vec![
                    Cell::from(row.symbol.clone()),
                    Cell::from(row.side.clone()),
                    Cell::from(row.qty.clone()),
                    Cell::from(row.order_type.clone()),
                    Cell::from(row.limit_price.clone()),
                    Cell::from(row.submitted_at.clone()),
                ])
            })
            .collect();
        let table = Table::new(
            body,
            [
                Constraint::Length(8),
                Constraint::Length(5),
                Constraint::Length(8),
                Constraint::Length(8),
                Constraint::Length(11),
                Constraint::Min(10),
            ],
        )
        .header(header_row(&["Symbol", "Side", "Qty", "Type", "Limit", "Submitted"]))
        .block(
            Block::default()
                .title(format!("Open orders ({})", rows.len()))
                .borders(Borders::ALL),
        );
        let area = self.area(Mount::Orders);
        self.frame.render_widget(table, area);
    }

    fn paint_log(&mut self, entries: &[LogView]) {
        let area = self.area(Mount::Log);
        let max_lines = area.height.saturating_sub(2) as usize;
        let end = entries.len().saturating_sub(self.log_scroll);
        let start = end.saturating_sub(max_lines);

        let lines: Vec<Line> = entries[start..end]
            .iter()
            .map(|entry| {
                Line::from(vec![
                    Span::styled(entry.time.clone(), Style::default().fg(Color::DarkGray)),
                    Span::raw(" "),
                    Span::styled(entry.level.label(), level_style(entry.level)),
                    Span::raw(format!(" {}", entry.message)),
                ])
            })
            .collect();

        let mut title = format!("Activity ({})", entries.len());
        if self.log_scroll > 0 {
            title.push_str(&format!(" [-{}]", self.log_scroll));
        }
        self.frame.render_widget(
            Paragraph::new(lines)
                .block(Block::default().title(title).borders(Borders::ALL))
                .wrap(Wrap { trim: false }),
            area,
        );
    }

    fn paint_filters(&mut self, active: SideFilter) {
        let titles: Vec<Line> = SideFilter::ALL
            .iter()
            .map(|filter| Line::from(filter.label()))
            .collect();
        let selected = SideFilter::ALL
            .iter()
            .position(|filter| *filter == active)
            .unwrap_or(0);
        let tabs = Tabs::new(titles)
            .select(selected)
            .block(Block::default().title("Filter").borders(Borders::ALL))
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );
        let area = self.area(Mount::Filters);
        self.frame.render_widget(tabs, area);
    }
}

fn session_note(app: &App) -> String {
    let mut note = app.source_label.clone();
    if app.session_running && !app.status.connected {
        note.push_str(&format!(" {}", app.spinner_char()));
    }
    if app.status.reconnects > 0 {
        note.push_str(&format!(" | reconnects: {}", app.status.reconnects));
    }
    if app.status.invalid_frames > 0 {
        note.push_str(&format!(" | invalid frames: {}", app.status.invalid_frames));
    }
    match (&app.last_result, &app.status.last_error) {
        (Some(Err(err)), _) => note.push_str(&format!(" | stopped: {err}")),
        (Some(Ok(msg)), _) => note.push_str(&format!(" | {msg}")),
        (None, Some(err)) if !app.status.connected => {
            note.push_str(&format!(" | last error: {err}"))
        }
        _ => {}
    }
    note
}

fn draw_console(frame: &mut Frame, area: Rect, app: &App) {
    let max_lines = area.height.saturating_sub(2) as usize;
    let visible = app.logs.lock().window(app.console_scroll, max_lines);
    let text: Vec<Line> = visible.into_iter().map(Line::from).collect();

    let mut title = "Console".to_string();
    if app.console_scroll > 0 {
        title.push_str(&format!(" [-{}]", app.console_scroll));
    }
    frame.render_widget(
        Paragraph::new(text)
            .block(Block::default().title(title).borders(Borders::ALL))
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn draw_keys(frame: &mut Frame, area: Rect) {
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            "keys: a/b/s filter | c clear activity | ↑/↓ scroll activity | PgUp/PgDn scroll console | q quit",
            Style::default().fg(Color::DarkGray),
        ))),
        area,
    );
}

fn columns(area: Rect, left_pct: u16) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage(left_pct),
                Constraint::Percentage(100 - left_pct),
            ]
            .as_ref(),
        )
        .split(area)
}

fn change_gauge<'a>(title: &'a str, change: &ChangeView) -> Gauge<'a> {
    Gauge::default()
        .block(Block::default().title(title).borders(Borders::ALL))
        .gauge_style(tone_style(change.tone))
        .ratio(change.gauge)
        .label(change.text.clone())
}

fn header_row(titles: &[&'static str]) -> Row<'static> {
    Row::new(titles.iter().map(|title| Cell::from(*title)).collect::<Vec<_>>()).style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )
}

fn tone_style(tone: Tone) -> Style {
    match tone {
        Tone::Positive => Style::default().fg(Color::Green),
        Tone::Negative => Style::default().fg(Color::Red),
        Tone::Neutral => Style::default().fg(Color::Gray),
    }
}

fn level_style(level: LogLevel) -> Style {
    match level {
        LogLevel::Debug => Style::default().fg(Color::DarkGray),
        LogLevel::Info => Style::default().fg(Color::Cyan),
        LogLevel::Warning => Style::default().fg(Color::Yellow),
        LogLevel::Error => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    }
}

fn x_bounds(points: &[(f64, f64)]) -> (f64, f64) {
    let x_min = points.first().map(|p| p.0).unwrap_or(0.0);
    let mut x_max = points.last().map(|p| p.0).unwrap_or(x_min + 1.0);
    if x_max <= x_min {
        x_max = x_min + 1.0;
    }
    (x_min, x_max)
}

fn y_bounds(points: &[(f64, f64)]) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for (_, y) in points {
        min = min.min(*y);
        max = max.max(*y);
    }
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    if max <= min {
        return (min - 1.0, max + 1.0);
    }
    let pad = (max - min) * 0.05;
    (min - pad, max + pad)
}

fn axis_labels(min: f64, max: f64) -> Vec<Line<'static>> {
    let mid = (min + max) / 2.0;
    vec![
        Line::from(format!("{min:.0}")),
        Line::from(format!("{mid:.0}")),
        Line::from(format!("{max:.0}")),
    ]
}
