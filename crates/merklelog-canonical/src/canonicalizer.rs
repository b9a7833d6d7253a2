use canonical_json::to_string;
use serde_json::{Map, Value};

use std::fmt;

/// Error returned when canonicalization fails.
#[derive(thiserror::Error, Debug)]
pub enum CanonicalizationError {
    /// The event is not a JSON object.
    #[error("event is not a JSON object")]
    NotAnObject,
    /// A field required by the schema is absent.
    #[error("missing required field {0}")]
    MissingField(String),
    /// A field is present but has the wrong shape.
    #[error("invalid field {field}: {reason}")]
    InvalidField {
        /// Path of the offending field.
        field: String,
        /// Why the field was rejected.
        reason: String,
    },
    /// The idtimestamp could not be decoded.
    #[error("invalid idtimestamp '{value}': {reason}")]
    InvalidIdTimestamp {
        /// Offending idtimestamp string.
        value: String,
        /// Why decoding failed.
        reason: String,
    },
    /// The idtimestamp epoch is outside the supported range.
    #[error("idtimestamp epoch {epoch} is not supported (expected {expected})")]
    Epoch {
        /// Epoch found in the idtimestamp.
        epoch: u8,
        /// The only epoch the hash scheme binds to.
        expected: u8,
    },
    /// RFC 8785 encoding failed.
    #[error("canonical encoding failed: {0}")]
    Encoding(String),
}

/// Result of canonicalization.
#[derive(Debug)]
pub struct CanonicalizationResult {
    /// Canonical UTF-8 bytes for the schema projection of the event.
    pub bytes: Vec<u8>,
    /// Top level fields present on the event but outside the schema.
    pub ignored_fields: Vec<String>,
}

/// Canonical encoding schemes understood by the canonicalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVersion {
    /// Third revision of the event schema, used by log version 0.
    V3,
}

/// Fields that must be present as strings.
const V3_REQUIRED_STRINGS: &[&str] = &[
    "identity",
    "asset_identity",
    "operation",
    "behaviour",
    "timestamp_declared",
    "timestamp_accepted",
    "timestamp_committed",
    "tenant_identity",
];

/// Attribute maps; absent or null is encoded as an empty map.
const V3_OBJECTS: &[&str] = &[
    "event_attributes",
    "asset_attributes",
    "principal_declared",
    "principal_accepted",
];

/// Identity fields that may carry the public prefix.
const IDENTITY_FIELDS: &[&str] = &["identity", "asset_identity"];

const PUBLIC_PREFIX: &str = "publicassets/";
const PRIVATE_PREFIX: &str = "assets/";

/// Helper for building JSON paths in error messages.
#[derive(Debug, Clone)]
struct Path {
    segments: Vec<String>,
}

impl Path {
    fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    fn push_field(&self, field: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(field.to_string());
        Self { segments }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            write!(f, "root")
        } else {
            write!(f, "{}", self.segments.join("."))
        }
    }
}

/// Canonicalizer that projects an event onto a fixed schema and emits
/// deterministic bytes.
///
/// Key order in the input never affects the output: the projection is encoded
/// with RFC 8785 canonical JSON.
#[derive(Debug, Clone)]
pub struct Canonicalizer {
    schema: SchemaVersion,
}

impl Canonicalizer {
    /// Creates a canonicalizer for the provided schema.
    pub fn new(schema: SchemaVersion) -> Self {
        Self { schema }
    }

    /// Creates a canonicalizer for the V3 schema.
    pub fn v3() -> Self {
        Self::new(SchemaVersion::V3)
    }

    /// Schema this canonicalizer encodes.
    pub fn schema(&self) -> SchemaVersion {
        self.schema
    }

    /// Produces the canonical bytes for an event.
    pub fn canonicalize(
        &self,
        event: &Value,
    ) -> Result<CanonicalizationResult, CanonicalizationError> {
        let map = event.as_object().ok_or(CanonicalizationError::NotAnObject)?;

        let projection = match self.schema {
            SchemaVersion::V3 => project_v3(map, Path::root())?,
        };

        let ignored_fields = map
            .keys()
            .filter(|k| !V3_REQUIRED_STRINGS.contains(&k.as_str()))
            .filter(|k| !V3_OBJECTS.contains(&k.as_str()))
            .cloned()
            .collect();

        let canonical = to_string(&Value::Object(projection))
            .map_err(|err| CanonicalizationError::Encoding(err.to_string()))?;

        Ok(CanonicalizationResult {
            bytes: canonical.into_bytes(),
            ignored_fields,
        })
    }
}

impl Default for Canonicalizer {
    fn default() -> Self {
        Self::v3()
    }
}

fn project_v3(
    event: &Map<String, Value>,
    path: Path,
) -> Result<Map<String, Value>, CanonicalizationError> {
    let mut out = Map::new();

    for &field in V3_REQUIRED_STRINGS {
        let value = event
            .get(field)
            .ok_or_else(|| CanonicalizationError::MissingField(path.push_field(field).to_string()))?;
        let s = value
            .as_str()
            .ok_or_else(|| CanonicalizationError::InvalidField {
                field: path.push_field(field).to_string(),
                reason: "expected a string".to_string(),
            })?;

        let s = if IDENTITY_FIELDS.contains(&field) {
            normalize_identity(s)
        } else {
            s.to_string()
        };
        out.insert(field.to_string(), Value::String(s));
    }

    for &field in V3_OBJECTS {
        let value = match event.get(field) {
            None | Some(Value::Null) => Value::Object(Map::new()),
            Some(Value::Object(m)) => Value::Object(m.clone()),
            Some(_) => {
                return Err(CanonicalizationError::InvalidField {
                    field: path.push_field(field).to_string(),
                    reason: "expected an object".to_string(),
                })
            }
        };
        out.insert(field.to_string(), value);
    }

    Ok(out)
}

/// Rewrites a public asset identity to the private form the log hashes.
pub fn normalize_identity(identity: &str) -> String {
    match identity.strip_prefix(PUBLIC_PREFIX) {
        Some(rest) => format!("{PRIVATE_PREFIX}{rest}"),
        None => identity.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event() -> Value {
        json!({
            "identity": "assets/a/events/b",
            "asset_identity": "assets/a",
            "operation": "Record",
            "behaviour": "RecordEvidence",
            "timestamp_declared": "2024-05-07T20:32:00Z",
            "timestamp_accepted": "2024-05-07T20:32:00Z",
            "timestamp_committed": "2024-05-07T20:32:27.235Z",
            "tenant_identity": "tenant/x",
            "event_attributes": {"b": "2", "a": "1"},
            "confirmation_status": "CONFIRMED"
        })
    }

    #[test]
    fn absent_attribute_maps_encode_as_empty() {
        let result = Canonicalizer::v3().canonicalize(&event()).unwrap();
        let text = String::from_utf8(result.bytes).unwrap();
        assert!(text.contains(r#""asset_attributes":{}"#));
        assert!(text.contains(r#""event_attributes":{"a":"1","b":"2"}"#));
        assert_eq!(result.ignored_fields, vec!["confirmation_status".to_string()]);
    }

    #[test]
    fn missing_required_field_is_reported_with_path() {
        let mut e = event();
        e.as_object_mut().unwrap().remove("behaviour");
        let err = Canonicalizer::v3().canonicalize(&e).unwrap_err();
        assert!(matches!(err, CanonicalizationError::MissingField(ref f) if f == "behaviour"));
    }

    #[test]
    fn non_object_attributes_are_rejected() {
        let mut e = event();
        e["event_attributes"] = json!("nope");
        assert!(matches!(
            Canonicalizer::v3().canonicalize(&e),
            Err(CanonicalizationError::InvalidField { .. })
        ));
    }

    #[test]
    fn public_prefix_is_normalized() {
        assert_eq!(normalize_identity("publicassets/a/events/b"), "assets/a/events/b");
        assert_eq!(normalize_identity("assets/a"), "assets/a");

        let mut public = event();
        public["identity"] = json!("publicassets/a/events/b");
        public["asset_identity"] = json!("publicassets/a");
        let c = Canonicalizer::v3();
        assert_eq!(
            c.canonicalize(&public).unwrap().bytes,
            c.canonicalize(&event()).unwrap().bytes
        );
    }
}
