use std::env;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use fwpub_exec::{CommandRunner, Invocation, ToolLocator};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::credentials::{CredentialSource, ServiceAccountKey};
use crate::error::{CloudError, CloudResult};

/// OAuth scope covering both storage and the document store.
pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Environment variable holding a ready-made access token.
pub const ACCESS_TOKEN_ENV: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Refresh this long before the token actually expires.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Supplies bearer tokens for service requests.
pub trait TokenProvider: Send + Sync {
    fn access_token(&self) -> CloudResult<String>;
}

/// A fixed token.
#[derive(Clone, Debug)]
pub struct StaticToken(pub String);

impl TokenProvider for StaticToken {
    fn access_token(&self) -> CloudResult<String> {
        Ok(self.0.clone())
    }
}

/// Build the provider for a credential source.
pub fn token_provider(
    source: &CredentialSource,
    runner: Arc<dyn CommandRunner>,
    locator: &ToolLocator,
) -> Arc<dyn TokenProvider> {
    match source {
        CredentialSource::ServiceAccount(path) => {
            Arc::new(ServiceAccountTokenProvider::from_file(path.clone()))
        }
        CredentialSource::Ambient => Arc::new(AmbientTokenProvider::from_env(runner, locator)),
    }
}

#[derive(Clone)]
struct CachedToken {
    token: String,
    expires_at: Instant,
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

enum KeySource {
    File(PathBuf),
    Loaded(ServiceAccountKey),
}

/// Exchanges a signed service-account assertion for an access token.
///
/// The key file is read on first use.
pub struct ServiceAccountTokenProvider {
    key: KeySource,
    scope: String,
    client: reqwest::blocking::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountTokenProvider {
    pub fn from_file(path: PathBuf) -> Self {
        Self::with_source(KeySource::File(path))
    }

    pub fn from_key(key: ServiceAccountKey) -> Self {
        Self::with_source(KeySource::Loaded(key))
    }

    fn with_source(key: KeySource) -> Self {
        Self {
            key,
            scope: CLOUD_PLATFORM_SCOPE.to_string(),
            client: reqwest::blocking::Client::new(),
            cached: Mutex::new(None),
        }
    }

    fn load_key(&self) -> CloudResult<ServiceAccountKey> {
        match &self.key {
            KeySource::File(path) => ServiceAccountKey::load(path),
            KeySource::Loaded(key) => Ok(key.clone()),
        }
    }

    fn signed_assertion(&self, key: &ServiceAccountKey) -> CloudResult<String> {
        let iat = chrono::Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &key.client_email,
            scope: &self.scope,
            aud: &key.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| CloudError::Credentials(format!("invalid private key: {e}")))?;
        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &signing_key)
            .map_err(|e| CloudError::Credentials(format!("cannot sign assertion: {e}")))
    }

    fn fetch(&self) -> CloudResult<CachedToken> {
        let key = self.load_key()?;
        let assertion = self.signed_assertion(&key)?;
        debug!(account = %key.client_email, "requesting access token");

        let response = self
            .client
            .post(&key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .map_err(|e| CloudError::transport("token request", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(CloudError::Auth(format!("HTTP {}: {}", status.as_u16(), body)));
        }
        let token: TokenResponse = response
            .json()
            .map_err(|e| CloudError::transport("token response", e))?;

        let lifetime = Duration::from_secs(token.expires_in.unwrap_or(3600));
        Ok(CachedToken {
            token: token.access_token,
            expires_at: Instant::now() + lifetime.saturating_sub(EXPIRY_MARGIN),
        })
    }
}

impl TokenProvider for ServiceAccountTokenProvider {
    fn access_token(&self) -> CloudResult<String> {
        let mut cached = self.cached.lock().expect("lock poisoned");
        if let Some(token) = cached.as_ref().filter(|t| t.expires_at > Instant::now()) {
            return Ok(token.token.clone());
        }
        let fresh = self.fetch()?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }
}

/// Tokens from the environment: [`ACCESS_TOKEN_ENV`] if set, otherwise
/// `gcloud auth print-access-token`.
pub struct AmbientTokenProvider {
    env_token: Option<String>,
    gcloud: Option<PathBuf>,
    runner: Arc<dyn CommandRunner>,
    /// The first outcome, success or failure, is kept for the run.
    cached: Mutex<Option<Result<String, String>>>,
}

impl AmbientTokenProvider {
    pub fn new(
        env_token: Option<String>,
        gcloud: Option<PathBuf>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            env_token: env_token.filter(|t| !t.trim().is_empty()),
            gcloud,
            runner,
            cached: Mutex::new(None),
        }
    }

    pub fn from_env(runner: Arc<dyn CommandRunner>, locator: &ToolLocator) -> Self {
        Self::new(
            env::var(ACCESS_TOKEN_ENV).ok(),
            locator.locate("gcloud"),
            runner,
        )
    }

    fn fetch(&self) -> CloudResult<String> {
        if let Some(token) = &self.env_token {
            return Ok(token.trim().to_string());
        }
        let gcloud = self.gcloud.as_ref().ok_or_else(|| {
            CloudError::Credentials(format!(
                "no service account key found, {ACCESS_TOKEN_ENV} is not set and gcloud is not installed"
            ))
        })?;

        let invocation = Invocation::new(gcloud).args(["auth", "print-access-token"]);
        let output = self
            .runner
            .run(&invocation)
            .map_err(|e| CloudError::Credentials(e.to_string()))?
            .into_result(&invocation)
            .map_err(|e| CloudError::Credentials(e.to_string()))?;

        let token = output.stdout.trim().to_string();
        if token.is_empty() {
            return Err(CloudError::Credentials(
                "gcloud returned an empty access token".into(),
            ));
        }
        Ok(token)
    }
}

impl TokenProvider for AmbientTokenProvider {
    fn access_token(&self) -> CloudResult<String> {
        let mut cached = self.cached.lock().expect("lock poisoned");
        let outcome = cached.get_or_insert_with(|| {
            self.fetch().map_err(|err| match err {
                CloudError::Credentials(message) => message,
                other => other.to_string(),
            })
        });
        match outcome {
            Ok(token) => Ok(token.clone()),
            Err(message) => Err(CloudError::Credentials(message.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fwpub_exec::{CommandOutput, ScriptedRunner};
    use mockito::Matcher;

    const TEST_KEY: &str = include_str!("../testdata/test-key.pem");

    fn key_for(server: &mockito::Server) -> ServiceAccountKey {
        ServiceAccountKey {
            client_email: "publisher@hoctrl.iam.gserviceaccount.com".into(),
            private_key: TEST_KEY.into(),
            token_uri: format!("{}/token", server.url()),
            project_id: Some("hoctrl".into()),
        }
    }

    #[test]
    fn service_account_exchanges_assertion_once() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/token")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), JWT_BEARER_GRANT.into()),
                Matcher::Regex("assertion=".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"ya29.test","expires_in":3599,"token_type":"Bearer"}"#)
            .expect(1)
            .create();

        let provider = ServiceAccountTokenProvider::from_key(key_for(&server));
        assert_eq!(provider.access_token().unwrap(), "ya29.test");
        assert_eq!(provider.access_token().unwrap(), "ya29.test");
        mock.assert();
    }

    #[test]
    fn service_account_rejected() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", "/token")
            .with_status(400)
            .with_body(r#"{"error":"invalid_grant"}"#)
            .create();

        let provider = ServiceAccountTokenProvider::from_key(key_for(&server));
        let err = provider.access_token().unwrap_err();
        assert!(matches!(err, CloudError::Auth(_)));
        assert!(err.to_string().contains("invalid_grant"));
    }

    #[test]
    fn missing_key_file_fails_on_first_use() {
        let provider = ServiceAccountTokenProvider::from_file("/nonexistent/key.json".into());
        assert!(matches!(
            provider.access_token().unwrap_err(),
            CloudError::Credentials(_)
        ));
    }

    #[test]
    fn bad_private_key() {
        let server = mockito::Server::new();
        let mut key = key_for(&server);
        key.private_key = "not a pem".into();
        let provider = ServiceAccountTokenProvider::from_key(key);
        let err = provider.access_token().unwrap_err();
        assert!(err.to_string().contains("invalid private key"));
    }

    #[test]
    fn ambient_prefers_env_token() {
        let runner = Arc::new(ScriptedRunner::new());
        let provider = AmbientTokenProvider::new(Some("env-token".into()), Some("gcloud".into()), runner.clone());
        assert_eq!(provider.access_token().unwrap(), "env-token");
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn ambient_uses_gcloud() {
        let runner = Arc::new(ScriptedRunner::new().respond(
            "gcloud",
            &["auth", "print-access-token"],
            CommandOutput::success().with_stdout("ya29.cli\n"),
        ));
        let provider = AmbientTokenProvider::new(None, Some("gcloud".into()), runner.clone());
        assert_eq!(provider.access_token().unwrap(), "ya29.cli");
        assert_eq!(provider.access_token().unwrap(), "ya29.cli");
        assert_eq!(runner.calls().len(), 1);
    }

    #[test]
    fn ambient_without_anything() {
        let provider = AmbientTokenProvider::new(Some("  ".into()), None, Arc::new(ScriptedRunner::new()));
        assert!(matches!(
            provider.access_token().unwrap_err(),
            CloudError::Credentials(_)
        ));
    }

    #[test]
    fn ambient_gcloud_failure_keeps_stderr() {
        let runner = Arc::new(ScriptedRunner::new().respond(
            "gcloud",
            &["auth"],
            CommandOutput::failure(1, "You do not currently have an active account selected."),
        ));
        let provider = AmbientTokenProvider::new(None, Some("gcloud".into()), runner);
        let err = provider.access_token().unwrap_err();
        assert!(err.to_string().contains("active account"));
    }

    #[test]
    fn ambient_failure_is_remembered() {
        let runner = Arc::new(ScriptedRunner::new().respond(
            "gcloud",
            &["auth"],
            CommandOutput::failure(1, "You do not currently have an active account selected."),
        ));
        let provider = AmbientTokenProvider::new(None, Some("gcloud".into()), runner.clone());
        for _ in 0..4 {
            let err = provider.access_token().unwrap_err();
            assert!(err.is_credentials());
            assert!(err.to_string().contains("active account"));
        }
        assert_eq!(runner.calls_to("gcloud").len(), 1);
    }
}
