//! # Credentials
//!
//! Bearer tokens for the Google APIs. A [`CredentialProvider`] hands out a
//! [`Credential`] that is valid right now; [`TokenFileCredentials`] keeps an
//! OAuth2 authorized-user token in a JSON file, refreshing and persisting it as
//! needed. Interactive consent is not performed here: when no usable token
//! exists the provider reports [`CredentialError::AuthorizationRequired`].
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;

/// Scopes requested for spreadsheet and drive access
pub const DEFAULT_SCOPES: [&str; 3] = [
    "https://www.googleapis.com/auth/drive",
    "https://www.googleapis.com/auth/drive.file",
    "https://www.googleapis.com/auth/spreadsheets",
];

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Tokens this close to expiry are treated as expired
const EXPIRY_SKEW_SECONDS: i64 = 60;

#[derive(Error, Debug)]
pub enum CredentialError {
    /// No usable token; a user has to authorize the application again
    #[error("Authorization required: {0}")]
    AuthorizationRequired(String),

    #[error("Refresh access token failed: {0}")]
    Refresh(String),

    #[error("Token store error: {0}")]
    Store(String),
}

/// OAuth2 authorized-user credential, in the JSON layout of Google's `token.json`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    #[serde(rename = "token", alias = "access_token", default)]
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_owned()
}

impl Credential {
    /// A bare access token that never expires
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Credential {
            access_token: access_token.into(),
            refresh_token: None,
            token_uri: default_token_uri(),
            client_id: None,
            client_secret: None,
            scopes: Vec::new(),
            expiry: None,
        }
    }

    /// True when the expiry time (minus a small skew) has passed
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry
            .map(|expiry| expiry - Duration::seconds(EXPIRY_SKEW_SECONDS) <= now)
            .unwrap_or(false)
    }

    /// True when the credential carries an access token that has not expired
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        !self.access_token.is_empty() && !self.is_expired(now)
    }
}

/// Source of bearer credentials for API requests.
pub trait CredentialProvider {
    /// Returns a credential that is valid now.
    ///
    /// # Errors
    ///
    /// [`CredentialError::AuthorizationRequired`] when no usable token exists,
    /// [`CredentialError::Refresh`] when the token endpoint rejects a refresh.
    fn acquire(&mut self) -> Result<Credential, CredentialError>;
}

impl<P: CredentialProvider + ?Sized> CredentialProvider for Box<P> {
    fn acquire(&mut self) -> Result<Credential, CredentialError> {
        (**self).acquire()
    }
}

/// A fixed credential, handed out unchanged.
pub struct StaticCredentials {
    credential: Credential,
}

impl StaticCredentials {
    pub fn new(access_token: impl Into<String>) -> Self {
        StaticCredentials {
            credential: Credential::bearer(access_token),
        }
    }
}

impl CredentialProvider for StaticCredentials {
    fn acquire(&mut self) -> Result<Credential, CredentialError> {
        Ok(self.credential.clone())
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
    refresh_token: Option<String>,
    scope: Option<String>,
}

#[derive(Deserialize)]
struct TokenErrorResponse {
    error: String,
    error_description: Option<String>,
}

/// Authorized-user token kept in a JSON file.
///
/// On [`acquire`](CredentialProvider::acquire) the token is loaded from the file,
/// used as is while valid, refreshed at its `token_uri` once expired and then
/// written back. A refresh rejected with `invalid_scope` deletes the file.
pub struct TokenFileCredentials {
    path: PathBuf,
    scopes: Vec<String>,
    cached: Option<Credential>,
}

impl TokenFileCredentials {
    const REFRESH_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

    pub fn new(path: impl AsRef<Path>) -> Self {
        TokenFileCredentials {
            path: path.as_ref().to_path_buf(),
            scopes: DEFAULT_SCOPES.iter().map(|scope| scope.to_string()).collect(),
            cached: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Option<Credential>, CredentialError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(CredentialError::Store(format!("{}: {}", self.path.display(), error))),
        };
        match serde_json::from_str::<Credential>(&content) {
            Ok(mut credential) => {
                if credential.scopes.is_empty() {
                    credential.scopes = self.scopes.clone();
                }
                Ok(Some(credential))
            }
            Err(error) => {
                tracing::warn!(path = %self.path.display(), %error, "ignoring unreadable token file");
                Ok(None)
            }
        }
    }

    fn save(&self, credential: &Credential) -> Result<(), CredentialError> {
        let json = serde_json::to_string_pretty(credential)
            .map_err(|e| CredentialError::Store(e.to_string()))?;
        std::fs::write(&self.path, json)
            .map_err(|e| CredentialError::Store(format!("{}: {}", self.path.display(), e)))
    }

    fn delete(&self) {
        if let Err(error) = std::fs::remove_file(&self.path) {
            if error.kind() != ErrorKind::NotFound {
                tracing::warn!(path = %self.path.display(), %error, "failed to delete token file");
            }
        }
    }

    /// Exchanges the refresh token for a new access token
    fn refresh(&self, mut credential: Credential, now: DateTime<Utc>) -> Result<Credential, CredentialError> {
        let Some(refresh_token) = credential.refresh_token.clone() else {
            return Err(CredentialError::AuthorizationRequired(format!(
                "token in '{}' has no refresh token",
                self.path.display()
            )));
        };
        let mut form = vec![
            ("grant_type", "refresh_token".to_owned()),
            ("refresh_token", refresh_token),
        ];
        if let Some(client_id) = &credential.client_id {
            form.push(("client_id", client_id.to_owned()));
        }
        if let Some(client_secret) = &credential.client_secret {
            form.push(("client_secret", client_secret.to_owned()));
        }
        if !credential.scopes.is_empty() {
            form.push(("scope", credential.scopes.join(" ")));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(Self::REFRESH_TIMEOUT)
            .build()
            .map_err(|e| CredentialError::Refresh(e.to_string()))?;
        let response = client
            .post(&credential.token_uri)
            .form(&form)
            .send()
            .map_err(|e| CredentialError::Refresh(e.to_string()))?;
        let status = response.status();
        let body = response.text().map_err(|e| CredentialError::Refresh(e.to_string()))?;

        if !status.is_success() {
            let rejection = serde_json::from_str::<TokenErrorResponse>(&body).ok();
            if rejection.as_ref().map(|it| it.error == "invalid_scope").unwrap_or(false) {
                tracing::warn!(path = %self.path.display(), "refresh rejected with invalid_scope, deleting stored token");
                self.delete();
                return Err(CredentialError::AuthorizationRequired(
                    "stored token does not cover the requested scopes".to_owned(),
                ));
            }
            let reason = rejection
                .map(|it| match it.error_description {
                    Some(description) => format!("{}: {}", it.error, description),
                    None => it.error,
                })
                .unwrap_or(body);
            return Err(CredentialError::Refresh(format!("HTTP {}: {}", status.as_u16(), reason)));
        }

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| CredentialError::Refresh(e.to_string()))?;
        credential.access_token = token.access_token;
        credential.expiry = token.expires_in.map(|seconds| now + Duration::seconds(seconds));
        if let Some(refresh_token) = token.refresh_token {
            credential.refresh_token = Some(refresh_token);
        }
        if let Some(scope) = token.scope {
            credential.scopes = scope.split_whitespace().map(str::to_owned).collect();
        }
        tracing::info!(path = %self.path.display(), "refreshed access token");
        Ok(credential)
    }
}

impl CredentialProvider for TokenFileCredentials {
    fn acquire(&mut self) -> Result<Credential, CredentialError> {
        let now = Utc::now();
        if let Some(credential) = self.cached.as_ref().filter(|it| it.is_valid(now)) {
            return Ok(credential.clone());
        }

        let stored = match self.cached.take() {
            Some(credential) => Some(credential),
            None => self.load()?,
        };
        let credential = match stored {
            Some(credential) if credential.is_valid(now) => {
                self.cached = Some(credential.clone());
                return Ok(credential);
            }
            Some(credential) if credential.is_expired(now) && credential.refresh_token.is_some() => {
                self.refresh(credential, now)?
            }
            Some(_) => Err(CredentialError::AuthorizationRequired(format!(
                "token in '{}' is invalid and cannot be refreshed",
                self.path.display()
            )))?,
            None => Err(CredentialError::AuthorizationRequired(format!(
                "no token found at '{}'",
                self.path.display()
            )))?,
        };

        self.save(&credential)?;
        self.cached = Some(credential.clone());
        Ok(credential)
    }
}
