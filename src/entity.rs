//! Element and boundary identities
//!
//! Elements are the things that can be present (work items, messages, actors)
//! and boundaries are the places where presence is asserted. The calculus
//! treats both as indivisible labels: equality, ordering, and hashing use the
//! stable `id` only, never the display name or metadata.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Shared behavior of identified domain entities
pub trait Entity {
    /// Stable identifier, unique within one analysis run
    fn id(&self) -> &str;

    /// Human-readable display name
    fn name(&self) -> &str;

    /// Free-form key-value metadata
    fn metadata(&self) -> &BTreeMap<String, String>;

    /// Look up a single metadata value
    fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata().get(key).map(String::as_str)
    }
}

macro_rules! identity_entity {
    ($(#[$doc:meta])* $ty:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Serialize, Deserialize)]
        pub struct $ty {
            id: String,
            name: String,
            #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
            metadata: BTreeMap<String, String>,
        }

        impl $ty {
            /// Create an entity whose display name equals its id
            pub fn new(id: impl Into<String>) -> Self {
                let id = id.into();
                Self {
                    name: id.clone(),
                    id,
                    metadata: BTreeMap::new(),
                }
            }

            /// Create an entity with a distinct display name
            pub fn named(id: impl Into<String>, name: impl Into<String>) -> Self {
                Self {
                    id: id.into(),
                    name: name.into(),
                    metadata: BTreeMap::new(),
                }
            }

            /// Attach one metadata entry
            pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
                self.metadata.insert(key.into(), value.into());
                self
            }
        }

        impl Entity for $ty {
            fn id(&self) -> &str {
                &self.id
            }

            fn name(&self) -> &str {
                &self.name
            }

            fn metadata(&self) -> &BTreeMap<String, String> {
                &self.metadata
            }
        }

        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                self.id == other.id
            }
        }

        impl Eq for $ty {}

        impl PartialOrd for $ty {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $ty {
            fn cmp(&self, other: &Self) -> Ordering {
                self.id.cmp(&other.id)
            }
        }

        impl Hash for $ty {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.id.hash(state);
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.name)
            }
        }
    };
}

identity_entity!(
    /// A thing that can be present: a work item, message, or actor
    Element
);

identity_entity!(
    /// A place or context in which presence is asserted
    Boundary
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_identity_ignores_name_and_metadata() {
        let a = Element::named("e1", "Order 1").with_metadata("priority", "high");
        let b = Element::new("e1");
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_new_uses_id_as_name() {
        let boundary = Boundary::new("checkout");
        assert_eq!(boundary.id(), "checkout");
        assert_eq!(boundary.name(), "checkout");
        assert_eq!(boundary.to_string(), "checkout");
    }

    #[test]
    fn test_metadata_lookup() {
        let element = Element::new("e7").with_metadata("kind", "bug");
        assert_eq!(element.metadata_value("kind"), Some("bug"));
        assert_eq!(element.metadata_value("missing"), None);
    }

    #[test]
    fn test_ordering_by_id() {
        let mut boundaries = vec![Boundary::new("b"), Boundary::new("a"), Boundary::new("c")];
        boundaries.sort();
        let ids: Vec<&str> = boundaries.iter().map(|b| b.id()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_serde_skips_empty_metadata() {
        let json = serde_json::to_string(&Element::new("e1")).unwrap();
        assert!(!json.contains("metadata"));

        let parsed: Element = serde_json::from_str(r#"{"id":"e2","name":"Two"}"#).unwrap();
        assert_eq!(parsed.name(), "Two");
        assert!(parsed.metadata().is_empty());
    }
}
