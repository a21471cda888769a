//! Order status vocabulary and the cancel guard, without HTTP.

use microshop::types::order::{OrderStatus, PaymentStatus};

#[test]
fn status_strings_round_trip() {
    for status in OrderStatus::ALL {
        assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
        assert_eq!(
            serde_json::to_value(status).unwrap(),
            serde_json::Value::String(status.to_string())
        );
    }
}

#[test]
fn unknown_or_miscased_status_is_rejected() {
    for raw in ["", "pending", "Refunded", "SHIPPED"] {
        assert!(raw.parse::<OrderStatus>().is_err(), "{raw}");
    }
    assert!("Paid".parse::<OrderStatus>().is_err());
    assert!("Processing".parse::<PaymentStatus>().is_err());
}

#[test]
fn only_shipped_and_delivered_block_cancellation() {
    let blocked: Vec<OrderStatus> = OrderStatus::ALL
        .into_iter()
        .filter(|s| !s.can_cancel())
        .collect();
    assert_eq!(blocked, vec![OrderStatus::Shipped, OrderStatus::Delivered]);
}

#[test]
fn defaults_are_pending() {
    assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    assert_eq!(PaymentStatus::default(), PaymentStatus::Pending);
}
