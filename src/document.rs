//! Document type returned by store operations.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reserved field name under which a document's identifier is merged
/// into its field map. A store-managed field with the same name is
/// shadowed by the identifier in returned documents.
pub const ID_FIELD: &str = "id";

/// A single record in a document store, addressed by a collection name
/// and an identifier.
///
/// Fields are schema-less JSON values (strings, numbers, booleans,
/// arrays, nested objects). Every `Document` handed back by the SDK
/// carries its identifier both in [`Document::id`] and merged into the
/// field map under [`ID_FIELD`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub fields: Map<String, Value>,
}

impl Document {
    /// Build a document from raw store fields, merging the identifier
    /// into the field map under [`ID_FIELD`].
    pub fn new(id: impl Into<String>, mut fields: Map<String, Value>) -> Self {
        let id = id.into();
        fields.insert(ID_FIELD.to_string(), Value::String(id.clone()));
        Self { id, fields }
    }

    /// Look up a field by name.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Consume the document, yielding its field map (identifier included).
    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }

    /// The field map as a JSON object value.
    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}
