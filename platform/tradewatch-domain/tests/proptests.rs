use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use tradewatch_domain::events::feed_event::FeedEvent;
use tradewatch_domain::services::renderer::{FeedRenderer, ViewCommand, EQUITY_WINDOW, LOG_CAPACITY};
use tradewatch_domain::value_objects::balance::BalancePayload;
use tradewatch_domain::value_objects::filter::SideFilter;
use tradewatch_domain::value_objects::log_entry::LogPayload;
use tradewatch_domain::value_objects::trade::TradePayload;
use tradewatch_domain::value_objects::wire::Wire;

fn clock(step: usize) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap() + Duration::seconds(step as i64)
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

fn symbol() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["AAPL", "MSFT", "TSLA", "NVDA", "AMZN", "META"])
        .prop_map(str::to_string)
}

fn action() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["buy", "sell"])
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    #[test]
    fn log_keeps_exactly_the_newest_entries(count in 0usize..260) {
        let mut renderer = FeedRenderer::new();
        for i in 0..count {
            renderer.apply(log_line("info", &format!("line {i}")), clock(i));
        }

        let kept: Vec<String> = renderer.log().iter().map(|e| e.message.clone()).collect();
        let expected: Vec<String> = (count.saturating_sub(LOG_CAPACITY)..count)
            .map(|i| format!("line {i}"))
            .collect();
        prop_assert!(kept.len() <= LOG_CAPACITY);
        prop_assert_eq!(kept, expected);
    }

    #[test]
    fn equity_window_tracks_last_balances(values in prop::collection::vec(1.0f64..1_000_000.0, 0..80)) {
        let mut renderer = FeedRenderer::new();
        for (i, value) in values.iter().copied().enumerate() {
            renderer.apply(balance(value), clock(i));
            prop_assert!(renderer.equity().len() <= EQUITY_WINDOW);
        }

        let plotted: Vec<f64> = renderer.equity().iter().map(|s| s.value).collect();
        let expected: Vec<f64> = values[values.len().saturating_sub(EQUITY_WINDOW)..].to_vec();
        prop_assert_eq!(plotted, expected);
    }

    #[test]
    fn trades_hold_one_row_per_symbol_in_first_seen_order(
        events in prop::collection::vec((symbol(), action(), 1.0f64..500.0), 1..60)
    ) {
        let mut renderer = FeedRenderer::new();
        let mut first_seen: Vec<String> = Vec::new();
        for (i, (symbol, action, price)) in events.iter().enumerate() {
            if !first_seen.contains(symbol) {
                first_seen.push(symbol.clone());
            }
            renderer.apply(fill(symbol, action, *price, 1.0), clock(i));
        }

        let order: Vec<String> = renderer.trades().iter().map(|r| r.symbol.clone()).collect();
        prop_assert_eq!(&order, &first_seen);

        for symbol in &first_seen {
            let last = events.iter().rev().find(|(s, _, _)| s == symbol).map(|(_, _, p)| *p);
            prop_assert_eq!(renderer.trades().get(symbol).map(|r| r.price), last);
        }
    }

    #[test]
    fn filtering_never_mutates_rows(
        events in prop::collection::vec((symbol(), action(), 1.0f64..500.0), 1..40),
        filters in prop::collection::vec(prop::sample::select(SideFilter::ALL.to_vec()), 1..6)
    ) {
        let mut renderer = FeedRenderer::new();
        for (i, (symbol, action, price)) in events.iter().enumerate() {
            renderer.apply(fill(symbol, action, *price, 1.0), clock(i));
        }
        let before: Vec<_> = renderer.trades().iter().cloned().collect();

        for filter in filters {
            renderer.handle(ViewCommand::SetFilter(filter));
            prop_assert!(renderer.visible_trades().all(|r| filter.matches(r.side)));
        }
        renderer.handle(ViewCommand::SetFilter(SideFilter::All));

        let after: Vec<_> = renderer.trades().iter().cloned().collect();
        prop_assert_eq!(renderer.trade_views().len(), after.len());
        prop_assert_eq!(before, after);
    }
}
