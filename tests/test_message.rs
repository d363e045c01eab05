//! Message model behavior tests
//!
//! Covers payload views, field validation and the topic alias through the
//! public API only.

use mqtt_runtime::error::ErrorKind;
use mqtt_runtime::protocol::{Message, Payload, QoS};
use mqtt_runtime::ClientError;
use proptest::prelude::*;
use serde_json::json;

proptest! {
    #[test]
    fn text_payload_views_agree(text in ".*") {
        let message = Message::new(text.clone());
        let bytes = message.payload_bytes();
        prop_assert_eq!(message.payload_string(), text.as_str());
        prop_assert_eq!(&bytes[..], text.as_bytes());
    }

    #[test]
    fn utf8_byte_payload_views_agree(text in ".*") {
        let message = Message::new(text.clone().into_bytes());
        let decoded = message.payload_string();
        let bytes = message.payload_bytes();
        prop_assert_eq!(decoded.as_bytes(), &bytes[..]);
        prop_assert_eq!(message.try_payload_string().unwrap(), text.as_str());
    }

    #[test]
    fn qos_outside_range_is_rejected(bad in any::<i64>().prop_filter("valid qos", |v| !(0..=2).contains(v))) {
        let mut message = Message::new("x");
        message.set_qos(1).unwrap();
        prop_assert!(message.set_qos(bad).is_err());
        prop_assert_eq!(message.qos(), QoS::AtLeastOnce);
    }

    #[test]
    fn topic_and_destination_name_agree(name in "[a-z/]{1,32}") {
        let mut message = Message::new("x");
        message.set_topic(name.clone()).unwrap();
        prop_assert_eq!(message.destination_name(), Some(name.as_str()));

        message.set_destination_name(format!("{name}/b")).unwrap();
        prop_assert_eq!(message.topic(), message.destination_name());
    }
}

#[test]
fn test_valid_qos_values_are_accepted() {
    let mut message = Message::new("x");
    for (raw, expected) in [
        (0, QoS::AtMostOnce),
        (1, QoS::AtLeastOnce),
        (2, QoS::ExactlyOnce),
    ] {
        message.set_qos(raw).unwrap();
        assert_eq!(message.qos(), expected);
        assert_eq!(u8::from(message.qos()) as i64, raw);
    }
}

#[test]
fn test_qos_error_message() {
    let mut message = Message::new("x");
    let err = message.set_qos(-1).unwrap_err();
    assert_eq!(err.to_string(), "Invalid argument: -1");
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn test_string_qos_is_rejected() {
    let err = Message::from_json(&json!({"payload": "x", "qos": "1"})).unwrap_err();
    assert!(matches!(err, ClientError::InvalidArgument { field: "qos", .. }));
}

#[test]
fn test_number_payload_is_rejected() {
    for bad in [json!(42), json!(1.5), json!(null), json!({"a": 1}), json!(true)] {
        let err = Message::try_new(&bad).unwrap_err();
        match err {
            ClientError::InvalidArgument { field, value, .. } => {
                assert_eq!(field, "payload");
                assert_eq!(value, bad.to_string());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

#[test]
fn test_received_message_flags() {
    let mut message = Message::new(vec![1u8, 2, 3])
        .with_destination_name("inbox")
        .unwrap()
        .with_retained(true);
    message.set_duplicate(true);

    assert!(message.retained());
    assert!(message.duplicate());
    assert_eq!(message.payload().len(), 3);
    assert!(matches!(message.payload(), Payload::Bytes(_)));
}

#[test]
fn test_payload_views_do_not_mutate_message() {
    let message = Message::new("stable").with_destination_name("t").unwrap();
    let before = message.clone();
    let _ = message.payload_bytes();
    let _ = message.payload_string();
    assert_eq!(message, before);
}

#[test]
fn test_unsent_message_is_invalid_state() {
    let err = Message::new("x").validate_for_send().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
}
