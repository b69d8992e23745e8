use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{CloudError, CloudResult};

/// Where credentials come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CredentialSource {
    /// A service account key file.
    ServiceAccount(PathBuf),
    /// Whatever the environment provides.
    Ambient,
}

/// Resolve credentials from an ordered list of candidate key files.
///
/// The first candidate that exists as a file wins; if none do, ambient
/// credentials are used.
pub fn discover_credentials<P: AsRef<Path>>(candidates: &[P]) -> CredentialSource {
    candidates
        .iter()
        .map(AsRef::as_ref)
        .find(|p| p.is_file())
        .map(|p| CredentialSource::ServiceAccount(p.to_path_buf()))
        .unwrap_or(CredentialSource::Ambient)
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

/// The fields of a service account key file this crate uses.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub project_id: Option<String>,
}

impl ServiceAccountKey {
    pub fn load(path: &Path) -> CloudResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CloudError::Credentials(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&content)
            .map_err(|e| CloudError::Credentials(format!("{}: {e}", path.display())))
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .field("project_id", &self.project_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_existing_candidate_wins() {
        let dir = tempfile::tempdir().unwrap();
        let second = dir.path().join("b.json");
        let third = dir.path().join("c.json");
        fs::write(&second, "{}").unwrap();
        fs::write(&third, "{}").unwrap();

        let candidates = [dir.path().join("a.json"), second.clone(), third];
        assert_eq!(
            discover_credentials(&candidates),
            CredentialSource::ServiceAccount(second)
        );
    }

    #[test]
    fn no_candidate_means_ambient() {
        let candidates: [&str; 2] = ["/nonexistent/a.json", "/nonexistent/b.json"];
        assert_eq!(discover_credentials(&candidates), CredentialSource::Ambient);
        let none: [&Path; 0] = [];
        assert_eq!(discover_credentials(&none), CredentialSource::Ambient);
    }

    #[test]
    fn parses_key_with_default_token_uri() {
        let key = ServiceAccountKey::from_json(
            r#"{"client_email":"svc@p.iam.gserviceaccount.com","private_key":"pem","project_id":"hoctrl"}"#,
        )
        .unwrap();
        assert_eq!(key.token_uri, "https://oauth2.googleapis.com/token");
        assert_eq!(key.project_id.as_deref(), Some("hoctrl"));
    }

    #[test]
    fn debug_hides_private_key() {
        let key = ServiceAccountKey::from_json(
            r#"{"client_email":"svc@p","private_key":"SECRET"}"#,
        )
        .unwrap();
        assert!(!format!("{key:?}").contains("SECRET"));
    }

    #[test]
    fn malformed_key_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("serviceAccountKey.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            ServiceAccountKey::load(&path).unwrap_err(),
            CloudError::Credentials(_)
        ));
    }
}
