use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create an id from any string-like value.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// View the id as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(
    /// Identifier of a story node.
    ///
    /// Story documents are authored externally, so ids are human-readable
    /// strings rather than generated values.
    NodeId
);

string_id!(
    /// Identifier of a story edge.
    EdgeId
);

string_id!(
    /// Identifier of a dialogue line within a scene.
    DialogueId
);

string_id!(
    /// Identifier of a choice within a scene.
    ChoiceId
);

string_id!(
    /// Identifier of a character referenced by scenes and dialogue lines.
    CharacterId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_round_trips_through_json() {
        let id = NodeId::new("scene_1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"scene_1\"");
        let back: NodeId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn id_display_and_as_str() {
        let id = ChoiceId::from("accept");
        assert_eq!(id.as_str(), "accept");
        assert_eq!(format!("{id}"), "accept");
    }

    #[test]
    fn ids_of_different_kinds_are_distinct_types() {
        // Compile-time property; equality only within a kind.
        let a = NodeId::new("x");
        let b = NodeId::new("x");
        assert_eq!(a, b);
    }
}
