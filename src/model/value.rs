use serde::Serialize;
use std::collections::BTreeMap;

/// A scalar value stored in an IFC property or quantity set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PropertyValue {
    Text(String),
    Real(f64),
    Integer(i64),
    Boolean(bool),
    Null,
}

impl PropertyValue {
    /// Canonical text form, locale independent.
    ///
    /// `Null` has no text form; callers decide the sentinel.
    #[must_use]
    pub fn to_text(&self) -> Option<String> {
        match self {
            PropertyValue::Text(s) => Some(s.clone()),
            PropertyValue::Real(f) => Some(f.to_string()),
            PropertyValue::Integer(i) => Some(i.to_string()),
            PropertyValue::Boolean(b) => Some(b.to_string()),
            PropertyValue::Null => None,
        }
    }
}

/// All property sets attached to one element: set name to property name to
/// value.
///
/// Ordered maps keep iteration deterministic, so unqualified lookups resolve
/// to the same set on every run.
pub type PropertySets = BTreeMap<String, BTreeMap<String, PropertyValue>>;
