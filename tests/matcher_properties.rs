use arbx_rs::engine::book::OrderBook;
use arbx_rs::engine::matcher::{max_depth, MatcherConfig, OpportunityMatcher};
use arbx_rs::engine::types::PriceLevel;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const TOLERANCE: Decimal = dec!(0.000000000001);

// Best-first ladder: strictly monotone prices, amounts in hundredths
fn ladder(ascending: bool) -> impl Strategy<Value = Vec<PriceLevel>> {
    (900i64..1100, prop::collection::vec((1i64..20, 1i64..500), 0..6)).prop_map(move |(start, steps)| {
        let mut price = start;
        let mut levels = Vec::with_capacity(steps.len());
        for (step, amount) in steps {
            levels.push(PriceLevel::new(Decimal::from(price), Decimal::new(amount, 2)));
            price = if ascending { price + step } else { price - step };
        }
        levels
    })
}

fn ask_book() -> impl Strategy<Value = OrderBook> {
    ladder(true).prop_map(|asks| OrderBook::new(Vec::new(), asks))
}

fn bid_book() -> impl Strategy<Value = OrderBook> {
    ladder(false).prop_map(|bids| OrderBook::new(bids, Vec::new()))
}

fn volume() -> impl Strategy<Value = Decimal> {
    (1i64..2000).prop_map(|v| Decimal::new(v, 2))
}

proptest! {
    #[test]
    fn prop_uncrossed_pairs_never_report(ask in ask_book(), bid in bid_book(), cap in volume()) {
        let matcher = OpportunityMatcher::new(MatcherConfig::new(cap));
        let crosses = match (ask.best_ask(), bid.best_bid()) {
            (Some(a), Some(b)) => a.price < b.price,
            _ => false,
        };
        if !crosses {
            prop_assert!(matcher.evaluate_pair("ask", &ask, "bid", &bid).is_none());
        }
    }

    #[test]
    fn prop_volume_never_exceeds_cap(ask in ask_book(), bid in bid_book(), cap in volume()) {
        prop_assume!(!ask.asks.is_empty() && !bid.bids.is_empty());
        let matcher = OpportunityMatcher::new(MatcherConfig::new(cap));
        let (max_ask, max_bid) = max_depth(&ask, &bid);
        for i in 0..=max_ask {
            for j in 0..=max_bid {
                let r = matcher.profit_for(&ask, &bid, i, j);
                let limit = ask.ask_capacity(i).unwrap().min(bid.bid_capacity(j).unwrap()).min(cap);
                prop_assert!(r.volume <= limit, "volume {} over limit {}", r.volume, limit);
            }
        }
    }

    #[test]
    fn prop_weighted_prices_stay_in_walked_range(ask in ask_book(), bid in bid_book(), cap in volume()) {
        prop_assume!(!ask.asks.is_empty() && !bid.bids.is_empty());
        let matcher = OpportunityMatcher::new(MatcherConfig::new(cap));
        let (max_ask, max_bid) = max_depth(&ask, &bid);
        for i in 0..=max_ask {
            for j in 0..=max_bid {
                let r = matcher.profit_for(&ask, &bid, i, j);
                if r.volume.is_zero() {
                    continue;
                }
                prop_assert!(r.weighted_buy_price >= ask.asks[0].price - TOLERANCE);
                prop_assert!(r.weighted_buy_price <= ask.asks[i].price + TOLERANCE);
                prop_assert!(r.weighted_sell_price <= bid.bids[0].price + TOLERANCE);
                prop_assert!(r.weighted_sell_price >= bid.bids[j].price - TOLERANCE);
            }
        }
    }

    #[test]
    fn prop_best_pair_dominates_grid(ask in ask_book(), bid in bid_book(), cap in volume()) {
        prop_assume!(!ask.asks.is_empty() && !bid.bids.is_empty());
        let matcher = OpportunityMatcher::new(MatcherConfig::new(cap));
        let best = matcher.best_depth_opportunity(&ask, &bid);
        let (max_ask, max_bid) = max_depth(&ask, &bid);
        for i in 0..=max_ask {
            for j in 0..=max_bid {
                prop_assert!(best.profit >= matcher.profit_for(&ask, &bid, i, j).profit);
            }
        }
        prop_assert!(best.profit >= Decimal::ZERO);
    }

    #[test]
    fn prop_reported_opportunities_clear_thresholds(
        ask in ask_book(),
        bid in bid_book(),
        cap in volume(),
        profit in 0i64..500,
        percent in 0i64..300,
    ) {
        let profit_threshold = Decimal::new(profit, 1);
        let percent_threshold = Decimal::new(percent, 2);
        let matcher = OpportunityMatcher::new(
            MatcherConfig::new(cap)
                .with_profit_threshold(profit_threshold)
                .with_percent_threshold(percent_threshold),
        );
        if let Some(o) = matcher.evaluate_pair("ask", &ask, "bid", &bid) {
            prop_assert!(o.profit > profit_threshold);
            prop_assert!(o.percent_spread > percent_threshold);
            prop_assert!(o.volume > Decimal::ZERO && o.volume <= cap);
            prop_assert!(o.buy_price < o.sell_price);
        }
    }
}
