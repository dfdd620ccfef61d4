//! Strongly typed identifiers
//!
//! Every identifier is a UUID string on the wire. Wrapping them keeps a
//! `NodeId` from being passed where an `ExitId` is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a fresh random (v4) identifier
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// Identifies a flow definition
    FlowId
);
string_id!(
    /// Identifies a node, unique within its flow
    NodeId
);
string_id!(ExitId);
string_id!(CategoryId);
string_id!(CaseId);
string_id!(ActionId);
string_id!(
    /// Identifies one execution of a flow inside a session
    RunId
);
string_id!(StepId);
string_id!(SessionId);
string_id!(PartyId);
string_id!(MsgId);
