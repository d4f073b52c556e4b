//! Session descriptors: the settings a host advertises.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::DescriptorError;

// ---------------------------------------------------------------------------
// AttributeValue
// ---------------------------------------------------------------------------

/// A value in a session's attribute set.
///
/// `#[serde(untagged)]` lets attributes appear in JSON as plain values:
/// `{"mode": "Custom", "round": 3, "ranked": false}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

// ---------------------------------------------------------------------------
// SessionDescriptor
// ---------------------------------------------------------------------------

/// Describes a hostable session: capacity, discoverability, and attributes.
///
/// The coordinator takes ownership of the descriptor when hosting begins
/// and never mutates it afterwards; once the session is advertised, the
/// descriptor is what other actors see through discovery.
///
/// The defaults describe a small public listen session that is advertised
/// and visible through presence, with four public slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionDescriptor {
    /// Slots open to anyone who discovers the session.
    pub max_public_slots: u32,

    /// Slots reserved for invited actors.
    pub max_private_slots: u32,

    /// Whether the session is returned by discovery at all.
    pub advertise: bool,

    /// Whether the session is visible through the host's presence.
    pub uses_presence: bool,

    pub allow_invites: bool,

    /// Whether actors may join after the session has started.
    pub allow_join_in_progress: bool,

    pub allow_join_via_presence: bool,

    /// Prefer the backend's lobby mechanism over a full session when it
    /// has one.
    pub use_lobbies: bool,

    /// Free-form attributes used for filtering, e.g. `mode = "Custom"`.
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl Default for SessionDescriptor {
    fn default() -> Self {
        Self {
            max_public_slots: 4,
            max_private_slots: 0,
            advertise: true,
            uses_presence: true,
            allow_invites: true,
            allow_join_in_progress: true,
            allow_join_via_presence: true,
            use_lobbies: true,
            attributes: BTreeMap::new(),
        }
    }
}

impl SessionDescriptor {
    /// Sets the number of public slots.
    pub fn with_public_slots(mut self, slots: u32) -> Self {
        self.max_public_slots = slots;
        self
    }

    /// Sets the number of private slots.
    pub fn with_private_slots(mut self, slots: u32) -> Self {
        self.max_private_slots = slots;
        self
    }

    /// Adds (or replaces) an attribute.
    pub fn with_attribute(
        mut self,
        key: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Looks up an attribute by key.
    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// Total number of slots, public and private.
    pub fn total_slots(&self) -> u32 {
        self.max_public_slots.saturating_add(self.max_private_slots)
    }

    /// Checks that the descriptor can describe a real session.
    ///
    /// # Errors
    /// - [`DescriptorError::NoCapacity`]: zero public and private slots
    /// - [`DescriptorError::EmptyAttributeKey`]: an attribute with key `""`
    pub fn validate(&self) -> Result<(), DescriptorError> {
        if self.total_slots() == 0 {
            return Err(DescriptorError::NoCapacity);
        }
        if self.attributes.keys().any(|k| k.is_empty()) {
            return Err(DescriptorError::EmptyAttributeKey);
        }
        Ok(())
    }
}
