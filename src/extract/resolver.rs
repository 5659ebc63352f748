use crate::model::{PropertySets, PropertyValue};

/// Sentinel for properties that are absent or carry no value.
pub const NOT_AVAILABLE: &str = "N/A";

/// Resolve one requested property against an element's property sets.
///
/// A request of the form `SetName.PropertyName` (split at the first dot
/// only) searches the named set. A bare `PropertyName` scans all sets in
/// their deterministic iteration order and takes the first set containing a
/// property with that literal name. Misses and null values resolve to
/// [`NOT_AVAILABLE`].
#[must_use]
pub fn resolve(psets: &PropertySets, request: &str) -> String {
    let value = match request.split_once('.') {
        Some((set_name, prop_name)) => psets.get(set_name).map(|props| props.get(prop_name)),
        None => psets
            .values()
            .find(|props| props.contains_key(request))
            .map(|props| props.get(request)),
    };

    value
        .flatten()
        .and_then(PropertyValue::to_text)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}
