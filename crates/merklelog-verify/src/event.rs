//! Events as returned by the log API, and the details verification needs.

use merklelog_canonical::decimal::{optional_u64_string, u64_string};
use merklelog_canonical::{digest, Digest, LeafHash};
use merklelog_massifs::massif_index_from_mmr_index;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::VerifyError;
use crate::hasher::EventHasher;

/// Where and when an event was committed to the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleLogCommit {
    /// MMR index of the event's leaf.
    #[serde(with = "u64_string")]
    pub index: u64,
    /// Hex idtimestamp, epoch byte first.
    pub idtimestamp: String,
}

/// The log state that confirmed an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleLogConfirm {
    /// Size of the log when the event was confirmed.
    #[serde(default, with = "optional_u64_string")]
    pub mmr_size: Option<u64>,
    /// Root of the log at `mmr_size`.
    #[serde(default, with = "digest::optional")]
    pub root: Option<Digest>,
    /// Milliseconds since the Unix epoch.
    #[serde(default, with = "optional_u64_string")]
    pub timestamp: Option<u64>,
    /// Idtimestamp of the confirming state.
    #[serde(default)]
    pub idtimestamp: String,
    /// Signed tree head, when one was issued.
    #[serde(default)]
    pub signed_tree_head: String,
}

/// The `merklelog_entry` of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleLogEntry {
    /// Commit information.
    pub commit: MerkleLogCommit,
    /// Confirmation, once the log has signed a state including the event.
    #[serde(default)]
    pub confirm: Option<MerkleLogConfirm>,
}

impl MerkleLogEntry {
    /// Confirmed log size, if any.
    pub fn mmr_size(&self) -> Option<u64> {
        self.confirm.as_ref().and_then(|c| c.mmr_size)
    }

    /// Confirmed root, if any.
    pub fn root(&self) -> Option<Digest> {
        self.confirm.as_ref().and_then(|c| c.root)
    }
}

#[derive(Deserialize)]
struct EventHeader {
    #[serde(default)]
    identity: String,
    #[serde(default)]
    tenant_identity: String,
    merklelog_entry: MerkleLogEntry,
}

/// Everything verification needs to know about one event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDetails {
    /// The event's identity.
    pub event_id: String,
    /// Tenant that owns the event, as written on it.
    pub tenant_id: String,
    /// Leaf hash of the event.
    pub event_hash: LeafHash,
    /// Commit and confirm information.
    pub merkle_log: MerkleLogEntry,
    /// Massif holding the event's leaf.
    pub massif_index: u32,
    /// Scheme `event_hash` was computed with.
    pub hasher: EventHasher,
    /// The event as received.
    pub event: Value,
}

impl EventDetails {
    /// MMR index of the event's leaf.
    pub fn mmr_index(&self) -> u64 {
        self.merkle_log.commit.index
    }

    /// Decodes one event and computes its leaf hash.
    pub fn from_event(event: Value, massif_height: u8) -> Result<Self, VerifyError> {
        if !event.is_object() {
            return Err(VerifyError::Decode("event is not a JSON object".to_string()));
        }
        let header: EventHeader = serde_json::from_value(event.clone())
            .map_err(|e| VerifyError::Decode(format!("event log entry: {}", e)))?;

        // The massif is not known yet; verifiers rehash if its version differs.
        let hasher = EventHasher::LogVersion0;
        let event_hash = hasher.hash_event(&event)?;
        let massif_index =
            massif_index_from_mmr_index(massif_height, header.merklelog_entry.commit.index)?;

        Ok(Self {
            event_id: header.identity,
            tenant_id: header.tenant_identity,
            event_hash,
            merkle_log: header.merklelog_entry,
            massif_index,
            hasher,
            event,
        })
    }

    /// Leaf hash under `hasher`, recomputed only if it differs from the one
    /// used at decode time.
    pub fn leaf_hash(&self, hasher: EventHasher) -> Result<LeafHash, VerifyError> {
        if hasher == self.hasher {
            return Ok(self.event_hash);
        }
        hasher.hash_event(&self.event)
    }
}

/// Parses an events API response (`{"events": [...]}`) into details sorted by
/// MMR index. Events sharing an index keep their input order.
pub fn parse_event_list(json: &[u8], massif_height: u8) -> Result<Vec<EventDetails>, VerifyError> {
    let value: Value = serde_json::from_slice(json)
        .map_err(|e| VerifyError::Decode(format!("event list: {}", e)))?;
    let events = match value.get("events") {
        Some(Value::Array(events)) => events.clone(),
        Some(_) => return Err(VerifyError::Decode("events is not an array".to_string())),
        None => return Err(VerifyError::Decode("missing events array".to_string())),
    };

    let mut details = events
        .into_iter()
        .map(|event| EventDetails::from_event(event, massif_height))
        .collect::<Result<Vec<_>, _>>()?;
    details.sort_by_key(EventDetails::mmr_index);
    Ok(details)
}

/// Reads the `merklelog_entry` of a raw event.
pub fn merklelog_entry(event: &Value) -> Result<MerkleLogEntry, VerifyError> {
    let entry = event
        .get("merklelog_entry")
        .ok_or_else(|| VerifyError::Decode("missing merklelog_entry".to_string()))?;
    serde_json::from_value(entry.clone())
        .map_err(|e| VerifyError::Decode(format!("merklelog_entry: {}", e)))
}

/// Reads the `tenant_identity` of a raw event.
pub fn tenant_identity(event: &Value) -> Result<String, VerifyError> {
    event
        .get("tenant_identity")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| VerifyError::MalformedEvent("missing tenant_identity".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(index: u64, attr: &str) -> Value {
        json!({
            "identity": format!("assets/a/events/{}", index),
            "asset_identity": "assets/a",
            "event_attributes": {"n": attr},
            "operation": "Record",
            "behaviour": "RecordEvidence",
            "timestamp_declared": "2024-05-07T20:32:00Z",
            "timestamp_accepted": "2024-05-07T20:32:00Z",
            "timestamp_committed": "2024-05-07T20:32:27.235Z",
            "tenant_identity": "tenant/f023005c-000f-4a57-b2fe-eef425f243ad",
            "merklelog_entry": {
                "commit": {"index": index.to_string(), "idtimestamp": "018f54c1f0640dca00"},
                "confirm": {"mmr_size": "501", "root": "", "timestamp": "1715113947353",
                            "idtimestamp": "", "signed_tree_head": ""},
                "unequivocal": null
            }
        })
    }

    #[test]
    fn list_is_sorted_by_index() {
        let list = json!({"events": [event(499, "a"), event(492, "b"), event(511, "c")]});
        let details = parse_event_list(list.to_string().as_bytes(), 14).unwrap();
        let indices: Vec<u64> = details.iter().map(EventDetails::mmr_index).collect();
        assert_eq!(indices, vec![492, 499, 511]);
        assert_eq!(details[0].event_id, "assets/a/events/492");
    }

    #[test]
    fn ties_keep_input_order() {
        let list = json!({"events": [event(7, "first"), event(3, "x"), event(7, "second")]});
        let details = parse_event_list(list.to_string().as_bytes(), 14).unwrap();
        assert_eq!(details[1].event["event_attributes"]["n"], "first");
        assert_eq!(details[2].event["event_attributes"]["n"], "second");
    }

    #[test]
    fn large_indices_are_exact() {
        let mut e = event(0, "a");
        e["merklelog_entry"]["commit"]["index"] = json!("9007199254740993");
        let details = EventDetails::from_event(e, 32).unwrap();
        assert_eq!(details.mmr_index(), 9_007_199_254_740_993);
    }

    #[test]
    fn index_beyond_the_last_massif_is_a_decode_error() {
        let mut e = event(0, "a");
        e["merklelog_entry"]["commit"]["index"] = json!("18446744073709551615");
        let list = json!({"events": [e]});
        for height in [14, 32] {
            assert!(matches!(
                parse_event_list(list.to_string().as_bytes(), height),
                Err(VerifyError::Decode(_))
            ));
        }
    }

    #[test]
    fn confirm_fields_decode() {
        let details = EventDetails::from_event(event(499, "a"), 14).unwrap();
        assert_eq!(details.merkle_log.mmr_size(), Some(501));
        assert_eq!(details.merkle_log.root(), None);
        assert_eq!(details.massif_index, 0);
    }

    #[test]
    fn structural_problems_are_decode_errors() {
        assert!(matches!(
            parse_event_list(br#"{"items": []}"#, 14),
            Err(VerifyError::Decode(_))
        ));
        assert!(matches!(
            parse_event_list(br#"{"events": [1]}"#, 14),
            Err(VerifyError::Decode(_))
        ));
        let mut e = event(1, "a");
        e["merklelog_entry"]["commit"]["index"] = json!("-1");
        let list = json!({"events": [e]});
        assert!(matches!(
            parse_event_list(list.to_string().as_bytes(), 14),
            Err(VerifyError::Decode(_))
        ));
    }

    #[test]
    fn missing_schema_field_is_malformed() {
        let mut e = event(1, "a");
        e.as_object_mut().unwrap().remove("operation");
        assert!(matches!(
            EventDetails::from_event(e, 14),
            Err(VerifyError::MalformedEvent(_))
        ));
    }

    #[test]
    fn lookups_read_raw_events() {
        let e = event(499, "a");
        assert_eq!(merklelog_entry(&e).unwrap().commit.index, 499);
        assert_eq!(
            tenant_identity(&e).unwrap(),
            "tenant/f023005c-000f-4a57-b2fe-eef425f243ad"
        );
        assert!(tenant_identity(&json!({})).is_err());
    }
}
