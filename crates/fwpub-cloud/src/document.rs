use serde_json::{Map, Value};

use crate::error::CloudResult;

/// A document body: field name to JSON value.
pub type Document = Map<String, Value>;

/// A keyed document store grouped into collections.
pub trait DocumentStore: Send + Sync {
    /// Write `fields` into `collection/id` with merge semantics.
    ///
    /// Creates the document if absent. Fields already stored but not named
    /// in `fields` are left as they are. When `server_time_field` is given,
    /// the store sets that field to its own commit time.
    fn merge_upsert(
        &self,
        collection: &str,
        id: &str,
        fields: &Document,
        server_time_field: Option<&str>,
    ) -> CloudResult<()>;

    /// Fetch a document, or `None` if it does not exist.
    fn get(&self, collection: &str, id: &str) -> CloudResult<Option<Document>>;
}
