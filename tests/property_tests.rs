use proptest::prelude::*;
use rust_decimal::Decimal;

use salonkit_api::models::{MethodTotals, PaymentMethod};

fn method_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("cash".to_string()),
        Just("card".to_string()),
        Just("transfer".to_string()),
        Just("voucher".to_string()),
        "[a-z]{3,10}",
    ]
}

proptest! {
    /// Any per-method map of 2-decimal currency amounts survives the JSON
    /// column round trip exactly: amounts are serialized as decimal
    /// strings, never floats.
    #[test]
    fn method_totals_round_trip_exactly(
        entries in proptest::collection::vec(
            (method_strategy(), -1_000_000_00i64..1_000_000_00i64),
            0..8,
        )
    ) {
        let totals = MethodTotals::from_rows(
            entries
                .iter()
                .map(|(method, cents)| (method.as_str(), Decimal::new(*cents, 2))),
        );

        let json = totals.to_json();
        let back = MethodTotals::from_json(&json).unwrap();
        prop_assert_eq!(&back, &totals);

        // A second round trip through a rendered string, the way the JSON
        // column stores it, is also exact.
        let rendered = json.to_string();
        let reparsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        let back_again = MethodTotals::from_json(&reparsed).unwrap();
        prop_assert_eq!(&back_again, &totals);
    }

    /// Merging maps is bucket-wise addition no matter the method mix.
    #[test]
    fn merge_adds_buckets(
        left in proptest::collection::vec(
            (method_strategy(), -100_000i64..100_000i64), 0..6),
        right in proptest::collection::vec(
            (method_strategy(), -100_000i64..100_000i64), 0..6),
    ) {
        let a = MethodTotals::from_rows(
            left.iter().map(|(m, c)| (m.as_str(), Decimal::new(*c, 2))));
        let b = MethodTotals::from_rows(
            right.iter().map(|(m, c)| (m.as_str(), Decimal::new(*c, 2))));

        let mut merged = a.clone();
        merged.merge(&b);

        for method in a.methods().chain(b.methods()) {
            prop_assert_eq!(merged.get(method), a.get(method) + b.get(method));
        }
        prop_assert_eq!(merged.grand_total(), a.grand_total() + b.grand_total());
    }

    /// Payment method keys normalize case and padding, so aggregation
    /// never splits one method into two buckets.
    #[test]
    fn payment_methods_normalize(raw in "[ ]{0,2}[a-zA-Z]{1,12}[ ]{0,2}") {
        let method = PaymentMethod::new(&raw);
        prop_assert_eq!(method.as_str(), raw.trim().to_ascii_lowercase());
    }
}
