use crate::validation::ValidationError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! newtype {
    ($name:ident, $doc:expr, $pattern:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new instance without validation; callers are responsible for conformity.
            pub fn new(value: String) -> Self {
                Self(value)
            }

            /// Parses a validated identifier from a string.
            pub fn parse(value: impl Into<String>) -> Result<Self, ValidationError> {
                let s = value.into();
                if !Regex::new($pattern).expect("invalid regex").is_match(&s) {
                    return Err(ValidationError::PatternMismatch {
                        field: stringify!($name),
                        value: s,
                    });
                }
                Ok(Self(s))
            }

            /// Borrow the identifier text.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

newtype!(
    TenantId,
    "Tenant identity owning a log (`tenant/<uuid>`).",
    r"^tenant/[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenant_id_accepts_uuid_form() {
        let t = TenantId::parse("tenant/6ea5cd00-c711-3649-6914-7b125928bbb4").unwrap();
        assert_eq!(t.as_str(), "tenant/6ea5cd00-c711-3649-6914-7b125928bbb4");
    }

    #[test]
    fn tenant_id_rejects_other_shapes() {
        assert!(TenantId::parse("6ea5cd00-c711-3649-6914-7b125928bbb4").is_err());
        assert!(TenantId::parse("tenant/").is_err());
        assert!(TenantId::parse("tenant/../../etc").is_err());
    }
}
