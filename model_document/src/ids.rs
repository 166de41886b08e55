use serde::{Deserialize, Serialize};
use uuid::{NoContext, Timestamp, Uuid};

/// The record store key of a document.
///
/// Distinct from the [TrackingCode](crate::TrackingCode): the key is internal
/// to the store, the tracking code is the document's public identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentKey(Uuid);

impl DocumentKey {
    /// mint a fresh, time-ordered key
    pub fn generate() -> DocumentKey {
        DocumentKey(Uuid::new_v7(Timestamp::now(NoContext)))
    }

    /// view the underlying uuid
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for DocumentKey {
    fn from(value: Uuid) -> Self {
        DocumentKey(value)
    }
}

impl std::fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An opaque user identifier issued by the (out of scope) identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// wrap an identifier string
    pub fn new(id: impl Into<String>) -> UserId {
        UserId(id.into())
    }

    /// view the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// true when the identifier carries no characters
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        UserId::new(value)
    }
}

/// A department name.
///
/// The set is open: departments come and go without a code change, which is
/// why this is not an enum. Known names resolve to a dedicated
/// [TrackingPrefix](crate::TrackingPrefix); everything else falls back to the
/// generic document prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Department(String);

impl Department {
    /// wrap a department name
    pub fn new(name: impl Into<String>) -> Department {
        Department(name.into())
    }

    /// view the name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// resolve the tracking prefix for this department
    pub fn tracking_prefix(&self) -> crate::TrackingPrefix {
        crate::TrackingPrefix::for_department(self)
    }
}

impl std::fmt::Display for Department {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Department {
    fn from(value: &str) -> Self {
        Department::new(value)
    }
}
