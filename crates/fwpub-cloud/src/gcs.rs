use std::fs;
use std::path::Path;
use std::sync::Arc;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use serde_json::json;
use tracing::debug;

use crate::auth::TokenProvider;
use crate::error::{CloudError, CloudResult};
use crate::storage::ObjectStorage;

/// Connection settings for the storage JSON API.
#[derive(Clone, Debug)]
pub struct GcsConfig {
    pub api_base: String,
    /// Project that owns newly created buckets.
    pub project: String,
}

impl GcsConfig {
    pub const DEFAULT_API_BASE: &'static str = "https://storage.googleapis.com";

    pub fn new(project: impl Into<String>) -> Self {
        Self {
            api_base: Self::DEFAULT_API_BASE.to_string(),
            project: project.into(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

/// [`ObjectStorage`] over the storage JSON API.
pub struct GcsClient {
    config: GcsConfig,
    tokens: Arc<dyn TokenProvider>,
    http: Client,
}

impl GcsClient {
    pub fn new(config: GcsConfig, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            config,
            tokens,
            http: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base.trim_end_matches('/'), path)
    }

    fn send(&self, operation: &str, request: RequestBuilder) -> CloudResult<Response> {
        let token = self.tokens.access_token()?;
        request
            .bearer_auth(token)
            .send()
            .map_err(|e| CloudError::transport(operation, e))
    }

    fn expect_success(operation: &str, response: Response) -> CloudResult<Response> {
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
}

impl ObjectStorage for GcsClient {
    fn bucket_exists(&self, bucket: &str) -> CloudResult<bool> {
        let operation = format!("bucket lookup {bucket}");
        let url = self.url(&format!("/storage/v1/b/{}", urlencoding::encode(bucket)));
        let response = self.send(&operation, self.http.get(url))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        Self::expect_success(&operation, response)?;
        Ok(true)
    }

    fn create_bucket(&self, bucket: &str, location: &str) -> CloudResult<()> {
        let operation = format!("bucket create {bucket}");
        debug!(bucket, location, "creating bucket");
        let url = self.url(&format!(
            "/storage/v1/b?project={}",
            urlencoding::encode(&self.config.project)
        ));
        let body = json!({ "name": bucket, "location": location });
        let response = self.send(&operation, self.http.post(url).json(&body))?;
        Self::expect_success(&operation, response)?;
        Ok(())
    }

    fn upload_file(&self, bucket: &str, key: &str, path: &Path) -> CloudResult<()> {
        let operation = format!("upload {bucket}/{key}");
        let data = fs::read(path)?;
        debug!(bucket, key, bytes = data.len(), "uploading object");
        let url = self.url(&format!(
            "/upload/storage/v1/b/{}/o?uploadType=media&name={}",
            urlencoding::encode(bucket),
            urlencoding::encode(key)
        ));
        let request = self
            .http
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(data);
        let response = self.send(&operation, request)?;
        Self::expect_success(&operation, response)?;
        Ok(())
    }

    fn make_public(&self, bucket: &str, key: &str) -> CloudResult<()> {
        let operation = format!("public ACL {bucket}/{key}");
        let url = self.url(&format!(
            "/storage/v1/b/{}/o/{}/acl",
            urlencoding::encode(bucket),
            urlencoding::encode(key)
        ));
        let body = json!({ "entity": "allUsers", "role": "READER" });
        let response = self.send(&operation, self.http.post(url).json(&body))?;
        Self::expect_success(&operation, response)?;
        Ok(())
    }
}
