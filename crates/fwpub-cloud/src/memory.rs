use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::RwLock;

use serde_json::Value;

use crate::document::{Document, DocumentStore};
use crate::error::{CloudError, CloudResult};
use crate::storage::ObjectStorage;

/// Storage operations that can be told to fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StorageOp {
    Lookup,
    Create,
    Upload,
    MakePublic,
}

/// An in-memory [`ObjectStorage`] for tests and dry runs.
#[derive(Default)]
pub struct InMemoryObjectStorage {
    buckets: RwLock<BTreeSet<String>>,
    objects: RwLock<BTreeMap<(String, String), Vec<u8>>>,
    public: RwLock<HashSet<(String, String)>>,
    failures: RwLock<HashMap<(StorageOp, String), String>>,
    log: RwLock<Vec<String>>,
}

impl InMemoryObjectStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing bucket.
    pub fn with_bucket(self, bucket: &str) -> Self {
        self.buckets
            .write()
            .expect("lock poisoned")
            .insert(bucket.to_string());
        self
    }

    /// Make `op` on `bucket` fail with `message`.
    pub fn failing(self, op: StorageOp, bucket: &str, message: &str) -> Self {
        self.failures
            .write()
            .expect("lock poisoned")
            .insert((op, bucket.to_string()), message.to_string());
        self
    }

    pub fn has_bucket(&self, bucket: &str) -> bool {
        self.buckets.read().expect("lock poisoned").contains(bucket)
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .read()
            .expect("lock poisoned")
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn is_public(&self, bucket: &str, key: &str) -> bool {
        self.public
            .read()
            .expect("lock poisoned")
            .contains(&(bucket.to_string(), key.to_string()))
    }

    /// Operations performed so far, as `"<op> <bucket>"` lines.
    pub fn operations(&self) -> Vec<String> {
        self.log.read().expect("lock poisoned").clone()
    }

    fn enter(&self, op: StorageOp, bucket: &str) -> CloudResult<()> {
        self.log
            .write()
            .expect("lock poisoned")
            .push(format!("{op:?} {bucket}").to_lowercase());
        match self
            .failures
            .read()
            .expect("lock poisoned")
            .get(&(op, bucket.to_string()))
        {
            Some(message) => Err(CloudError::Injected(message.clone())),
            None => Ok(()),
        }
    }
}

impl ObjectStorage for InMemoryObjectStorage {
    fn bucket_exists(&self, bucket: &str) -> CloudResult<bool> {
        self.enter(StorageOp::Lookup, bucket)?;
        Ok(self.has_bucket(bucket))
    }

    fn create_bucket(&self, bucket: &str, _location: &str) -> CloudResult<()> {
        self.enter(StorageOp::Create, bucket)?;
        let mut buckets = self.buckets.write().expect("lock poisoned");
        if !buckets.insert(bucket.to_string()) {
            return Err(CloudError::Http {
                operation: format!("bucket create {bucket}"),
                status: 409,
                body: "bucket already exists".into(),
            });
        }
        Ok(())
    }

    fn upload_file(&self, bucket: &str, key: &str, path: &Path) -> CloudResult<()> {
        self.enter(StorageOp::Upload, bucket)?;
        if !self.has_bucket(bucket) {
            return Err(CloudError::Http {
                operation: format!("upload {bucket}/{key}"),
                status: 404,
                body: "bucket not found".into(),
            });
        }
        let data = fs::read(path)?;
        self.objects
            .write()
            .expect("lock poisoned")
            .insert((bucket.to_string(), key.to_string()), data);
        Ok(())
    }

    fn make_public(&self, bucket: &str, key: &str) -> CloudResult<()> {
        self.enter(StorageOp::MakePublic, bucket)?;
        if self.object(bucket, key).is_none() {
            return Err(CloudError::Http {
                operation: format!("public ACL {bucket}/{key}"),
                status: 404,
                body: "object not found".into(),
            });
        }
        self.public
            .write()
            .expect("lock poisoned")
            .insert((bucket.to_string(), key.to_string()));
        Ok(())
    }
}

/// An in-memory [`DocumentStore`] with merge semantics matching the
/// hosted store.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    documents: RwLock<BTreeMap<(String, String), Document>>,
    failure: RwLock<Option<String>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document.
    pub fn with_document(self, collection: &str, id: &str, document: Document) -> Self {
        self.documents
            .write()
            .expect("lock poisoned")
            .insert((collection.to_string(), id.to_string()), document);
        self
    }

    /// Make every call fail with `message`.
    pub fn failing(self, message: &str) -> Self {
        *self.failure.write().expect("lock poisoned") = Some(message.to_string());
        self
    }

    fn check(&self) -> CloudResult<()> {
        match self.failure.read().expect("lock poisoned").as_ref() {
            Some(message) => Err(CloudError::Injected(message.clone())),
            None => Ok(()),
        }
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn merge_upsert(
        &self,
        collection: &str,
        id: &str,
        fields: &Document,
        server_time_field: Option<&str>,
    ) -> CloudResult<()> {
        self.check()?;
        let mut documents = self.documents.write().expect("lock poisoned");
        let document = documents
            .entry((collection.to_string(), id.to_string()))
            .or_default();
        for (name, value) in fields {
            document.insert(name.clone(), value.clone());
        }
        if let Some(field) = server_time_field {
            document.insert(
                field.to_string(),
                Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        Ok(())
    }

    fn get(&self, collection: &str, id: &str) -> CloudResult<Option<Document>> {
        self.check()?;
        Ok(self
            .documents
            .read()
            .expect("lock poisoned")
            .get(&(collection.to_string(), id.to_string()))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn merge_keeps_unlisted_fields() {
        let store = InMemoryDocumentStore::new().with_document(
            "firmware_updates",
            "hoRelay2",
            doc(json!({"version": "1.2.1", "foo": "bar"})),
        );
        store
            .merge_upsert(
                "firmware_updates",
                "hoRelay2",
                &doc(json!({"version": "1.2.2"})),
                Some("publish_time"),
            )
            .unwrap();

        let stored = store.get("firmware_updates", "hoRelay2").unwrap().unwrap();
        assert_eq!(stored["version"], "1.2.2");
        assert_eq!(stored["foo"], "bar");
        let stamp = stored["publish_time"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(stamp).is_ok());
    }

    #[test]
    fn merge_creates_missing_document() {
        let store = InMemoryDocumentStore::new();
        store
            .merge_upsert("c", "d", &doc(json!({"a": 1})), None)
            .unwrap();
        assert_eq!(store.get("c", "d").unwrap(), Some(doc(json!({"a": 1}))));
        assert_eq!(store.get("c", "other").unwrap(), None);
    }

    #[test]
    fn injected_document_failure() {
        let store = InMemoryDocumentStore::new().failing("PERMISSION_DENIED");
        assert!(matches!(
            store.merge_upsert("c", "d", &Document::new(), None),
            Err(CloudError::Injected(_))
        ));
    }

    #[test]
    fn upload_and_publish() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("fw.bin");
        fs::write(&file, b"fw").unwrap();

        let storage = InMemoryObjectStorage::new().with_bucket("b");
        storage.upload_file("b", "k", &file).unwrap();
        storage.make_public("b", "k").unwrap();
        assert_eq!(storage.object("b", "k").as_deref(), Some(&b"fw"[..]));
        assert!(storage.is_public("b", "k"));
        assert_eq!(storage.operations(), ["upload b", "makepublic b"]);
    }

    #[test]
    fn upload_to_missing_bucket_fails() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("fw.bin");
        fs::write(&file, b"fw").unwrap();
        let storage = InMemoryObjectStorage::new();
        assert!(storage.upload_file("b", "k", &file).is_err());
    }

    #[test]
    fn injected_storage_failure_is_per_bucket() {
        let storage = InMemoryObjectStorage::new().failing(StorageOp::Create, "primary", "quota");
        assert!(storage.create_bucket("primary", "asia-east1").is_err());
        storage.create_bucket("fallback", "asia-east1").unwrap();
        assert!(storage.has_bucket("fallback"));
        assert!(!storage.has_bucket("primary"));
    }
}
