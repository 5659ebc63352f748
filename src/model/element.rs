use serde::Serialize;

/// One product entity surfaced by the model loader.
///
/// Only the attributes the extractor consumes are carried: the entity type
/// tag, the identity attributes and the STEP id used to look up property
/// sets.
#[derive(Debug, Clone, Serialize)]
pub struct Element {
    pub id: u64,
    pub entity_type: String,
    pub global_id: Option<String>,
    pub name: Option<String>,
}

impl Element {
    /// GlobalId when present, STEP id otherwise. Used in diagnostics.
    #[must_use]
    pub fn display_id(&self) -> String {
        self.global_id
            .clone()
            .unwrap_or_else(|| format!("#{}", self.id))
    }
}
