use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::json;
use tradewatch_domain::events::feed_event::FeedEvent;
use tradewatch_domain::services::diagnostics::DiagnosticKind;
use tradewatch_domain::services::renderer::{FeedRenderer, RenderInstruction, ViewCommand};
use tradewatch_domain::services::views::Tone;
use tradewatch_domain::value_objects::balance::BalancePayload;
use tradewatch_domain::value_objects::filter::SideFilter;
use tradewatch_domain::value_objects::log_entry::LogPayload;
use tradewatch_domain::value_objects::trade::TradePayload;
use tradewatch_domain::value_objects::wire::Wire;

fn clock(step: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 15, 45, 0).unwrap() + Duration::seconds(step)
}

fn balance(total_equity: f64) -> FeedEvent {
    FeedEvent::Balance(BalancePayload {
        total_equity: Wire::Valid(total_equity),
        ..BalancePayload::default()
    })
}

fn fill(symbol: &str, action: &str, price: f64, quantity: f64) -> FeedEvent {
    FeedEvent::Trade(TradePayload {
        symbol: Wire::Valid(symbol.to_string()),
        action: Wire::Valid(action.to_string()),
        price: Wire::Valid(price),
        quantity: Wire::Valid(quantity),
        ..TradePayload::default()
    })
}

fn log_line(level: &str, message: &str) -> FeedEvent {
    FeedEvent::Log(LogPayload {
        level: Wire::Valid(level.to_string()),
        message: Wire::Valid(message.to_string()),
        ..LogPayload::default()
    })
}

fn trade(symbol: &str, action: &str, price: f64) -> FeedEvent {
    fill(symbol, action, price, 10.0)
}

#[test]
fn one_hundred_and_twenty_log_lines_keep_the_last_hundred() {
    let mut renderer = FeedRenderer::new();
    for i in 0..120 {
        renderer.apply(log_line("info", &format!("msg {i}")), clock(i));
    }
    assert_eq!(renderer.log().len(), 100);
    assert_eq!(renderer.log().front().map(|e| e.message.as_str()), Some("msg 20"));
    assert_eq!(renderer.log().back().map(|e| e.message.as_str()), Some("msg 119"));
}

#[test]
fn twenty_five_balances_keep_the_last_twenty_samples() {
    let mut renderer = FeedRenderer::new();
    for i in 0..25 {
        renderer.apply(
            balance(1000.0 + i as f64),
            clock(i),
        );
    }
    let values: Vec<f64> = renderer.equity().iter().map(|s| s.value).collect();
    let expected: Vec<f64> = (5..25).map(|i| 1000.0 + i as f64).collect();
    assert_eq!(values, expected);
}

#[test]
fn repeated_trade_for_a_symbol_updates_the_single_row() {
    let mut renderer = FeedRenderer::new();
    renderer.apply(trade("AAPL", "buy", 150.0), clock(0));
    let applied = renderer.apply(trade("AAPL", "sell", 151.0), clock(1));

    assert_eq!(
        applied.instructions,
        vec![RenderInstruction::UpsertTrade {
            symbol: "AAPL".to_string(),
            row: 0,
            inserted: false
        }]
    );
    assert_eq!(renderer.trades().len(), 1);
    let views = renderer.trade_views();
    assert_eq!(views[0].price, "$151.00");
    assert_eq!(views[0].side, "SELL");
    assert_eq!(views[0].tone, Tone::Negative);
}

#[test]
fn rows_keep_first_seen_order() {
    let mut renderer = FeedRenderer::new();
    for (i, symbol) in ["A", "B", "A", "C"].iter().enumerate() {
        renderer.apply(trade(symbol, "buy", 1.0), clock(i as i64));
    }
    let order: Vec<&str> = renderer.trades().iter().map(|r| r.symbol.as_str()).collect();
    assert_eq!(order, vec!["A", "B", "C"]);
}

#[test]
fn non_numeric_equity_shows_and_plots_zero() {
    let mut renderer = FeedRenderer::new();
    let payload: BalancePayload = serde_json::from_value(json!({
        "total_equity": "not-a-number",
        "cash_balance": 1234.5,
        "buying_power": 2469.0,
        "daily_change": -12.0,
        "daily_change_pct": -0.97,
        "timestamp": "2024-03-01T15:45:00"
    }))
    .expect("payload");
    let applied = renderer.apply(FeedEvent::Balance(payload), clock(0));

    let view = renderer.balance_view().expect("balance view");
    assert_eq!(view.total_equity, "$0.00");
    assert_eq!(view.cash_balance, "$1,234.50");
    assert_eq!(view.daily.text, "-$12.00 (-0.97%)");
    assert_eq!(view.daily.tone, Tone::Negative);
    assert_eq!(view.last_update, "15:45:00");
    let values: Vec<f64> = renderer.equity().iter().map(|s| s.value).collect();
    assert_eq!(values, vec![0.0]);
    assert!(applied
        .diagnostics
        .iter()
        .any(|d| d.kind == DiagnosticKind::MalformedField));
}

#[test]
fn buy_filter_then_all_restores_rows() {
    let mut renderer = FeedRenderer::new();
    renderer.apply(trade("AAPL", "buy", 150.0), clock(0));
    renderer.apply(trade("TSLA", "sell", 200.0), clock(1));
    renderer.apply(trade("MSFT", "buy", 300.0), clock(2));
    let all = renderer.trade_views();

    renderer.handle(ViewCommand::SetFilter(SideFilter::Buy));
    let buys: Vec<String> = renderer.trade_views().into_iter().map(|t| t.symbol).collect();
    assert_eq!(buys, vec!["AAPL".to_string(), "MSFT".to_string()]);

    renderer.handle(ViewCommand::SetFilter(SideFilter::All));
    assert_eq!(renderer.trade_views(), all);
}

#[test]
fn two_balances_plot_both_and_show_the_latest() {
    let mut renderer = FeedRenderer::new();
    renderer.apply(balance(1000.0), clock(0));
    renderer.apply(balance(1010.0), clock(1));

    let points = renderer.equity_points();
    assert_eq!(points.iter().map(|p| p.value).collect::<Vec<_>>(), vec![1000.0, 1010.0]);
    assert_eq!(points[1].label, "15:45:01");
    assert_eq!(
        renderer.balance_view().map(|v| v.total_equity),
        Some("$1,010.00".to_string())
    );
}

#[test]
fn clear_then_append_starts_over() {
    let mut renderer = FeedRenderer::new();
    for i in 0..5 {
        renderer.apply(log_line("warning", "slow fill"), clock(i));
    }
    renderer.handle(ViewCommand::ClearLog);
    assert_eq!(renderer.log().len(), 0);

    renderer.apply(log_line("error", "rejected"), clock(6));
    assert_eq!(renderer.log().len(), 1);
    assert_eq!(renderer.log_views()[0].time, "[15:45:06]");
}
