use proptest::prelude::*;
use rust_decimal::Decimal;

use p2p_pricing::models::{OrderSide, P2PCalculateCostRequest, RestingOrder};
use p2p_pricing::services::{compute_cost, estimate_price_impact, GridTopologyService};
use p2p_pricing::{PricingConfig, PricingError};

fn amount() -> impl Strategy<Value = Decimal> {
    // 0.001 .. 100000 kWh
    (1i64..100_000_000).prop_map(|milli| Decimal::new(milli, 3))
}

fn huge_amount() -> impl Strategy<Value = Decimal> {
    // 1e20 .. Decimal::MAX kWh
    (100_000_000_000_000_000_000i128..=79_228_162_514_264_337_593_543_950_335i128)
        .prop_map(|kwh| Decimal::from_i128_with_scale(kwh, 0))
}

fn price() -> impl Strategy<Value = Decimal> {
    (1i64..100_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn zone() -> impl Strategy<Value = i32> {
    1i32..=20
}

fn request(buyer: i32, seller: i32, energy: Decimal, price: Option<Decimal>) -> P2PCalculateCostRequest {
    P2PCalculateCostRequest {
        buyer_zone_id: buyer,
        seller_zone_id: seller,
        energy_amount: energy,
        agreed_price: price,
    }
}

fn pricing() -> PricingConfig {
    PricingConfig {
        zones: (1..=20).collect(),
        ..PricingConfig::default()
    }
}

proptest! {
    #[test]
    fn effective_energy_never_exceeds_amount(
        buyer in zone(), seller in zone(), energy in amount(), p in price()
    ) {
        let pricing = pricing();
        let rate = GridTopologyService::default_rate(seller, buyer);
        let distance = Decimal::from(GridTopologyService::zone_distance(seller, buyer)) * pricing.zone_spacing_km;
        let cost = compute_cost(&request(buyer, seller, energy, Some(p)), &rate, distance, &pricing)
            .unwrap()
            .unwrap();

        prop_assert!(cost.effective_energy <= energy);
        prop_assert!(cost.effective_energy > Decimal::ZERO);
    }

    #[test]
    fn wheeling_is_zero_only_within_a_zone(
        buyer in zone(), seller in zone(), energy in amount()
    ) {
        let pricing = pricing();
        let rate = GridTopologyService::default_rate(seller, buyer);
        let cost = compute_cost(&request(buyer, seller, energy, None), &rate, Decimal::ZERO, &pricing)
            .unwrap()
            .unwrap();

        prop_assert_eq!(cost.wheeling_charge.is_zero(), buyer == seller);
    }

    #[test]
    fn total_covers_energy_cost(
        buyer in zone(), seller in zone(), energy in amount(), p in price()
    ) {
        let pricing = pricing();
        let rate = GridTopologyService::default_rate(seller, buyer);
        let cost = compute_cost(&request(buyer, seller, energy, Some(p)), &rate, Decimal::ZERO, &pricing)
            .unwrap()
            .unwrap();

        prop_assert!(cost.total_cost >= cost.energy_cost);
        prop_assert_eq!(cost.total_cost, cost.energy_cost + cost.wheeling_charge + cost.loss_cost);
    }

    #[test]
    fn cost_is_deterministic(
        buyer in zone(), seller in zone(), energy in amount(), p in price()
    ) {
        let pricing = pricing();
        let rate = GridTopologyService::default_rate(seller, buyer);
        let req = request(buyer, seller, energy, Some(p));
        let first = compute_cost(&req, &rate, Decimal::ONE, &pricing).unwrap();
        let second = compute_cost(&req, &rate, Decimal::ONE, &pricing).unwrap();

        prop_assert_eq!(first, second);
    }

    #[test]
    fn loss_factor_grows_with_distance(a in zone(), b in zone()) {
        let near = GridTopologyService::default_rate(a, a);
        let far = GridTopologyService::default_rate(a, b);
        prop_assert!(far.loss_factor >= near.loss_factor);
        prop_assert!(far.loss_factor < Decimal::ONE);
    }

    #[test]
    fn price_impact_fill_is_bounded(
        levels in prop::collection::vec((1i64..1_000, 1i64..500), 0..30),
        size in 1i64..5_000,
    ) {
        let orders: Vec<RestingOrder> = levels
            .iter()
            .map(|&(p, a)| RestingOrder::new(OrderSide::Sell, Decimal::new(p, 2), Decimal::from(a)))
            .collect();
        let requested = Decimal::from(size);
        let impact = estimate_price_impact(&orders, OrderSide::Buy, requested).unwrap().unwrap();

        prop_assert_eq!(impact.filled_amount + impact.unfilled_amount, requested);
        prop_assert!(impact.filled_amount <= requested);
        if let (Some(best), Some(avg), Some(worst)) = (impact.best_price, impact.average_price, impact.worst_price) {
            prop_assert!(best <= avg && avg <= worst);
        }
    }

    #[test]
    fn huge_amounts_price_or_report_overflow(
        buyer in zone(), seller in zone(), energy in huge_amount(), p in price()
    ) {
        let pricing = pricing();
        let rate = GridTopologyService::default_rate(seller, buyer);
        match compute_cost(&request(buyer, seller, energy, Some(p)), &rate, Decimal::ZERO, &pricing) {
            Ok(cost) => prop_assert!(cost.is_some()),
            Err(err) => prop_assert!(matches!(err, PricingError::Overflow(_))),
        }
    }

    #[test]
    fn huge_resting_orders_aggregate_or_report_overflow(
        amounts in prop::collection::vec(huge_amount(), 1..4),
        p in price(),
        size in huge_amount(),
    ) {
        let orders: Vec<RestingOrder> = amounts
            .iter()
            .map(|&a| RestingOrder::new(OrderSide::Sell, p, a))
            .collect();
        if let Err(err) = estimate_price_impact(&orders, OrderSide::Buy, size) {
            prop_assert!(matches!(err, PricingError::Overflow(_)));
        }
    }
}
