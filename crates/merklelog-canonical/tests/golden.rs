use merklelog_canonical::{
    hash_event, CanonicalizationError, Canonicalizer, Digest, LEAF_TYPE_PLAIN,
};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

fn make_event() -> Value {
    json!({
        "identity": "assets/a/events/b",
        "asset_identity": "assets/a",
        "event_attributes": {"approvers": "Product Team"},
        "operation": "Record",
        "behaviour": "RecordEvidence",
        "timestamp_declared": "2024-05-07T20:32:00Z",
        "timestamp_accepted": "2024-05-07T20:32:00Z",
        "timestamp_committed": "2024-05-07T20:32:27.235Z",
        "tenant_identity": "tenant/f023005c-000f-4a57-b2fe-eef425f243ad",
        "confirmation_status": "CONFIRMED",
        "merklelog_entry": {
            "commit": {"index": "499", "idtimestamp": "018f54c1f0640dca00"},
            "confirm": {"mmr_size": "501", "root": "", "timestamp": "1715113947353"}
        }
    })
}

#[test]
fn canonicalizer_produces_ordered_bytes() {
    let result = Canonicalizer::v3().canonicalize(&make_event()).unwrap();
    assert_eq!(
        String::from_utf8(result.bytes).unwrap(),
        concat!(
            r#"{"asset_attributes":{},"asset_identity":"assets/a","behaviour":"RecordEvidence","#,
            r#""event_attributes":{"approvers":"Product Team"},"identity":"assets/a/events/b","#,
            r#""operation":"Record","principal_accepted":{},"principal_declared":{},"#,
            r#""tenant_identity":"tenant/f023005c-000f-4a57-b2fe-eef425f243ad","#,
            r#""timestamp_accepted":"2024-05-07T20:32:00Z","timestamp_committed":"2024-05-07T20:32:27.235Z","#,
            r#""timestamp_declared":"2024-05-07T20:32:00Z"}"#
        )
    );
}

#[test]
fn leaf_hash_matches_golden_value() {
    let leaf = hash_event(&make_event(), &Canonicalizer::v3()).unwrap();
    assert_eq!(LEAF_TYPE_PLAIN, 0);
    assert_eq!(
        Digest::new(leaf).to_string(),
        "81ef059b6fda3f54c36deaaf1adf5cb5ad0da215215751526cf48785651f6f50"
    );
}

#[test]
fn log_metadata_does_not_change_the_leaf() {
    let canonicalizer = Canonicalizer::v3();
    let mut confirmed = make_event();
    confirmed["merklelog_entry"]["confirm"]["root"] =
        json!("AsPmdY7mI1E4Hpkut1e1dYhj+gsRBS2c4NNLvZ0NMBg=");
    confirmed["confirmation_status"] = json!("PENDING");
    assert_eq!(
        hash_event(&make_event(), &canonicalizer).unwrap(),
        hash_event(&confirmed, &canonicalizer).unwrap()
    );
}

#[test]
fn attribute_changes_change_the_leaf() {
    let canonicalizer = Canonicalizer::v3();
    let mut altered = make_event();
    altered["event_attributes"]["approvers"] = json!("Nobody");
    assert_ne!(
        hash_event(&make_event(), &canonicalizer).unwrap(),
        hash_event(&altered, &canonicalizer).unwrap()
    );
}

#[test]
fn epoch_zero_and_two_are_rejected() {
    let canonicalizer = Canonicalizer::v3();
    for (idts, epoch) in [("008f54c1f0640dca00", 0u8), ("028f54c1f0640dca00", 2u8)] {
        let mut event = make_event();
        event["merklelog_entry"]["commit"]["idtimestamp"] = json!(idts);
        match hash_event(&event, &canonicalizer) {
            Err(CanonicalizationError::Epoch { epoch: found, .. }) => assert_eq!(found, epoch),
            other => panic!("expected epoch error, got {:?}", other),
        }
    }
}

#[test]
fn missing_idtimestamp_is_malformed() {
    let mut event = make_event();
    event["merklelog_entry"]["commit"]
        .as_object_mut()
        .unwrap()
        .remove("idtimestamp");
    assert!(matches!(
        hash_event(&event, &Canonicalizer::v3()),
        Err(CanonicalizationError::MissingField(_))
    ));
}

/// Rebuilds every object in `value` with its keys inserted in reverse order.
fn reverse_key_order(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = Map::new();
            for (k, v) in map.iter().rev() {
                out.insert(k.clone(), reverse_key_order(v));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(reverse_key_order).collect()),
        other => other.clone(),
    }
}

proptest! {
    #[test]
    fn leaf_hash_is_independent_of_key_order(
        attrs in proptest::collection::btree_map("[a-z_]{1,12}", "[ -~]{0,24}", 0..8)
    ) {
        let canonicalizer = Canonicalizer::v3();
        let mut event = make_event();
        event["event_attributes"] = serde_json::to_value(&attrs).unwrap();

        let first = hash_event(&event, &canonicalizer).unwrap();
        let again = hash_event(&event, &canonicalizer).unwrap();
        let reordered = hash_event(&reverse_key_order(&event), &canonicalizer).unwrap();

        prop_assert_eq!(first, again);
        prop_assert_eq!(first, reordered);
    }
}
