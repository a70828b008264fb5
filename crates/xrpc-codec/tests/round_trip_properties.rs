use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use xrpc_codec::{decode_envelope, escape, unescape, Envelope};
use xrpc_value::{Record, Value};

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Boolean),
        any::<i64>().prop_map(Value::Integer),
        any::<f64>()
            .prop_filter("finite", |x| x.is_finite())
            .prop_map(Value::Double),
        "[a-zA-Z0-9 <>&'\"]{0,16}".prop_map(Value::Text),
        proptest::collection::vec(any::<u8>(), 0..24).prop_map(Value::Binary),
        (0i64..4_102_444_800).prop_filter_map("in range", |secs| {
            Utc.timestamp_opt(secs, 0)
                .single()
                .map(|stamp| Value::Timestamp(stamp.fixed_offset()))
        }),
    ]
}

fn value() -> impl Strategy<Value = Value> {
    scalar().prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..6).prop_map(Value::List),
            proptest::collection::vec(("[a-z&<]{1,8}", inner), 0..6)
                .prop_map(|members| Value::Record(members.into_iter().collect::<Record>())),
        ]
    })
}

proptest! {
    #[test]
    fn prop_escape_then_unescape_is_identity(text in ".{0,64}") {
        let escaped = escape(&text);
        prop_assert_eq!(unescape(&escaped).unwrap(), text.as_str());
    }

    #[test]
    fn prop_escaped_text_has_no_markup(text in ".{0,64}") {
        let escaped = escape(&text);
        prop_assert!(!escaped.contains('<'));
        prop_assert!(!escaped.contains('>'));
        prop_assert!(!escaped.contains('"'));
    }

    #[test]
    fn prop_call_round_trips(params in proptest::collection::vec(value(), 0..4)) {
        let call = Envelope::call("prop.check", params);
        let xml = call.to_xml().unwrap();
        prop_assert_eq!(decode_envelope(xml.as_bytes()).unwrap(), call);
    }

    #[test]
    fn prop_encoding_is_deterministic(param in value()) {
        let response = Envelope::response(vec![param]);
        prop_assert_eq!(response.to_xml().unwrap(), response.clone().to_xml().unwrap());
    }
}
