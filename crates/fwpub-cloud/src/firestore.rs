use std::sync::Arc;

use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::auth::TokenProvider;
use crate::document::{Document, DocumentStore};
use crate::error::{CloudError, CloudResult};

/// Connection settings for the document store REST API.
#[derive(Clone, Debug)]
pub struct FirestoreConfig {
    pub api_base: String,
    pub project: String,
    pub database: String,
}

impl FirestoreConfig {
    pub const DEFAULT_API_BASE: &'static str = "https://firestore.googleapis.com";
    pub const DEFAULT_DATABASE: &'static str = "(default)";

    pub fn new(project: impl Into<String>) -> Self {
        Self {
            api_base: Self::DEFAULT_API_BASE.to_string(),
            project: project.into(),
            database: Self::DEFAULT_DATABASE.to_string(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn database_path(&self) -> String {
        format!("projects/{}/databases/{}", self.project, self.database)
    }

    fn document_name(&self, collection: &str, id: &str) -> String {
        format!("{}/documents/{collection}/{id}", self.database_path())
    }
}

/// [`DocumentStore`] over the Firestore REST API.
pub struct FirestoreClient {
    config: FirestoreConfig,
    tokens: Arc<dyn TokenProvider>,
    http: Client,
}

impl FirestoreClient {
    pub fn new(config: FirestoreConfig, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            config,
            tokens,
            http: Client::new(),
        }
    }

    fn base(&self) -> &str {
        self.config.api_base.trim_end_matches('/')
    }

    fn check(operation: &str, response: Response) -> CloudResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        Err(CloudError::Http {
            operation: operation.to_string(),
            status: status.as_u16(),
            body: response.text().unwrap_or_default(),
        })
    }

    /// The `documents:commit` body for one merge write.
    pub fn commit_body(
        &self,
        collection: &str,
        id: &str,
        fields: &Document,
        server_time_field: Option<&str>,
    ) -> Value {
        let encoded: Map<String, Value> = fields
            .iter()
            .map(|(k, v)| (k.clone(), to_firestore_value(v)))
            .collect();
        let mask: Vec<String> = fields.keys().map(|k| field_path(k)).collect();

        let mut write = json!({
            "update": {
                "name": self.config.document_name(collection, id),
                "fields": encoded,
            },
            "updateMask": { "fieldPaths": mask },
        });
        if let Some(field) = server_time_field {
            write["updateTransforms"] = json!([{
                "fieldPath": field_path(field),
                "setToServerValue": "REQUEST_TIME",
            }]);
        }
        json!({ "writes": [write] })
    }
}

impl DocumentStore for FirestoreClient {
    fn merge_upsert(
        &self,
        collection: &str,
        id: &str,
        fields: &Document,
        server_time_field: Option<&str>,
    ) -> CloudResult<()> {
        let operation = format!("commit {collection}/{id}");
        let token = self.tokens.access_token()?;
        let url = format!(
            "{}/v1/{}/documents:commit",
            self.base(),
            self.config.database_path()
        );
        debug!(collection, id, fields = fields.len(), "committing document");
        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(&self.commit_body(collection, id, fields, server_time_field))
            .send()
            .map_err(|e| CloudError::transport(&operation, e))?;
        Self::check(&operation, response)?;
        Ok(())
    }

    fn get(&self, collection: &str, id: &str) -> CloudResult<Option<Document>> {
        let operation = format!("get {collection}/{id}");
        let token = self.tokens.access_token()?;
        let url = format!(
            "{}/v1/{}",
            self.base(),
            self.config.document_name(collection, id)
        );
        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .send()
            .map_err(|e| CloudError::transport(&operation, e))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body: Value = Self::check(&operation, response)?
            .json()
            .map_err(|e| CloudError::transport(&operation, e))?;

        let fields = match body.get("fields") {
            None => return Ok(Some(Document::new())),
            Some(Value::Object(fields)) => fields,
            Some(_) => {
                return Err(CloudError::Protocol {
                    operation,
                    reason: "`fields` is not an object".into(),
                })
            }
        };
        let mut document = Document::new();
        for (name, value) in fields {
            let decoded = from_firestore_value(value).ok_or_else(|| CloudError::Protocol {
                operation: operation.clone(),
                reason: format!("unsupported value for field `{name}`"),
            })?;
            document.insert(name.clone(), decoded);
        }
        Ok(Some(document))
    }
}

/// Field names that are not plain identifiers must be backquoted in masks.
fn field_path(name: &str) -> String {
    let mut chars = name.chars();
    let simple = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if simple {
        name.to_string()
    } else {
        format!("`{}`", name.replace('\\', "\\\\").replace('`', "\\`"))
    }
}

fn to_firestore_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) if n.is_i64() || n.is_u64() => json!({ "integerValue": n.to_string() }),
        Value::Number(n) => json!({ "doubleValue": n }),
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(to_firestore_value).collect::<Vec<_>>() }
        }),
        Value::Object(map) => json!({
            "mapValue": {
                "fields": map
                    .iter()
                    .map(|(k, v)| (k.clone(), to_firestore_value(v)))
                    .collect::<Map<String, Value>>()
            }
        }),
    }
}

fn from_firestore_value(value: &Value) -> Option<Value> {
    let (kind, inner) = value.as_object()?.iter().next()?;
    match kind.as_str() {
        "nullValue" => Some(Value::Null),
        "booleanValue" => inner.as_bool().map(Value::Bool),
        "integerValue" => inner
            .as_str()
            .and_then(|s| s.parse::<i64>().ok())
            .map(Value::from),
        "doubleValue" => inner.as_f64().map(Value::from),
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => {
            inner.as_str().map(|s| Value::String(s.to_string()))
        }
        "arrayValue" => {
            let values = match inner.get("values") {
                Some(Value::Array(values)) => values
                    .iter()
                    .map(from_firestore_value)
                    .collect::<Option<Vec<_>>>()?,
                _ => Vec::new(),
            };
            Some(Value::Array(values))
        }
        "mapValue" => {
            let mut out = Map::new();
            if let Some(Value::Object(fields)) = inner.get("fields") {
                for (k, v) in fields {
                    out.insert(k.clone(), from_firestore_value(v)?);
                }
            }
            Some(Value::Object(out))
        }
        _ => None,
    }
}
