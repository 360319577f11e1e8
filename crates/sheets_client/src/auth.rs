//! OAuth credentials for the Sheets API.
//!
//! Two Google credential files are understood:
//!
//! - `authorized_user` (written by `gcloud auth application-default login`):
//!   the refresh token is exchanged for an access token.
//! - `service_account` (a JSON key downloaded from the Cloud console): an
//!   RS256-signed JWT assertion is exchanged for an access token
//!   (`urn:ietf:params:oauth:grant-type:jwt-bearer`).

use std::path::Path;

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::client::SheetsError;

/// Scope requested for service-account tokens.
pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthorizedUser {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    /// Token endpoint; falls back to the configured default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_uri: Option<String>,
}

#[derive(Clone, Deserialize)]
pub struct ServiceAccount {
    pub client_email: String,
    /// PEM-encoded PKCS#8 RSA key.
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default)]
    pub token_uri: Option<String>,
}

// Keep the private key out of debug output.
impl std::fmt::Debug for ServiceAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccount")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

/// A parsed credentials file.
#[derive(Debug, Clone)]
pub enum Credentials {
    AuthorizedUser(AuthorizedUser),
    ServiceAccount(ServiceAccount),
}

impl Credentials {
    /// Obtain a fresh access token with whichever grant fits these credentials.
    pub fn fetch_access_token(
        &self,
        http: &reqwest::blocking::Client,
        default_token_uri: &str,
    ) -> Result<String, SheetsError> {
        match self {
            Credentials::AuthorizedUser(user) => refresh_access_token(user, http, default_token_uri),
            Credentials::ServiceAccount(sa) => service_account_token(sa, http, default_token_uri),
        }
    }
}

impl From<AuthorizedUser> for Credentials {
    fn from(user: AuthorizedUser) -> Self {
        Credentials::AuthorizedUser(user)
    }
}

impl From<ServiceAccount> for Credentials {
    fn from(sa: ServiceAccount) -> Self {
        Credentials::ServiceAccount(sa)
    }
}

/// Load an `authorized_user` or `service_account` credentials file.
pub fn load_credentials(path: &Path) -> Result<Credentials, SheetsError> {
    let invalid = |e: serde_json::Error| {
        SheetsError::NotAuthenticated(format!(
            "invalid credentials JSON in {}: {}",
            path.display(),
            e,
        ))
    };

    let content = std::fs::read_to_string(path).map_err(|e| {
        SheetsError::NotAuthenticated(format!(
            "cannot read credentials file {}: {}",
            path.display(),
            e,
        ))
    })?;

    // Warn if file is world-readable (Unix only)
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(meta) = std::fs::metadata(path) {
            let mode = meta.permissions().mode();
            if mode & 0o077 != 0 {
                log::warn!(
                    "credentials file {} is accessible by others (mode {:o}), consider chmod 600",
                    path.display(),
                    mode & 0o777,
                );
            }
        }
    }

    let value: serde_json::Value = serde_json::from_str(&content).map_err(invalid)?;

    match value["type"].as_str() {
        None | Some("authorized_user") => serde_json::from_value(value)
            .map(Credentials::AuthorizedUser)
            .map_err(invalid),
        Some("service_account") => {
            let sa: ServiceAccount = serde_json::from_value(value).map_err(invalid)?;
            // Reject a bad key now rather than at the first request.
            EncodingKey::from_rsa_pem(sa.private_key.as_bytes()).map_err(|e| {
                SheetsError::NotAuthenticated(format!(
                    "invalid private_key in {}: {}",
                    path.display(),
                    e,
                ))
            })?;
            Ok(Credentials::ServiceAccount(sa))
        }
        Some(other) => Err(SheetsError::NotAuthenticated(format!(
            "unsupported credentials type {:?} in {}",
            other,
            path.display(),
        ))),
    }
}

/// Exchange the refresh token for an access token.
pub fn refresh_access_token(
    creds: &AuthorizedUser,
    http: &reqwest::blocking::Client,
    default_token_uri: &str,
) -> Result<String, SheetsError> {
    let url = creds.token_uri.as_deref().unwrap_or(default_token_uri);
    log::debug!("refreshing access token via {}", url);

    exchange(
        http,
        url,
        &[
            ("grant_type", "refresh_token"),
            ("client_id", creds.client_id.as_str()),
            ("client_secret", creds.client_secret.as_str()),
            ("refresh_token", creds.refresh_token.as_str()),
        ],
    )
}

/// Claims of a service-account assertion.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// Sign the RS256 JWT assertion a service account presents to `token_uri`.
pub fn sign_assertion(
    sa: &ServiceAccount,
    token_uri: &str,
    issued_at: i64,
) -> Result<String, SheetsError> {
    let key = EncodingKey::from_rsa_pem(sa.private_key.as_bytes())
        .map_err(|e| SheetsError::NotAuthenticated(format!("invalid service account key: {}", e)))?;

    let mut header = Header::new(Algorithm::RS256);
    header.kid = sa.private_key_id.clone();

    let claims = AssertionClaims {
        iss: sa.client_email.clone(),
        scope: SPREADSHEETS_SCOPE.to_string(),
        aud: token_uri.to_string(),
        iat: issued_at,
        exp: issued_at + ASSERTION_LIFETIME_SECS,
    };

    jsonwebtoken::encode(&header, &claims, &key)
        .map_err(|e| SheetsError::TokenRefresh(format!("cannot sign assertion: {}", e)))
}

/// Exchange a signed assertion for an access token.
pub fn service_account_token(
    sa: &ServiceAccount,
    http: &reqwest::blocking::Client,
    default_token_uri: &str,
) -> Result<String, SheetsError> {
    let url = sa.token_uri.as_deref().unwrap_or(default_token_uri);
    log::debug!("requesting service account token for {} via {}", sa.client_email, url);

    let assertion = sign_assertion(sa, url, chrono::Utc::now().timestamp())?;
    exchange(http, url, &[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
}

/// POST a token request form and pull `access_token` out of the reply.
fn exchange(
    http: &reqwest::blocking::Client,
    url: &str,
    form: &[(&str, &str)],
) -> Result<String, SheetsError> {
    let resp = http
        .post(url)
        .form(form)
        .send()
        .map_err(|e| SheetsError::TokenRefresh(format!("request failed: {}", e)))?;

    let status = resp.status().as_u16();
    if status != 200 {
        let body: serde_json::Value = resp.json().unwrap_or(serde_json::Value::Null);
        let msg = body["error_description"]
            .as_str()
            .or_else(|| body["error"].as_str())
            .unwrap_or("unknown error");
        return Err(SheetsError::TokenRefresh(format!("({}) {}", status, msg)));
    }

    let body: serde_json::Value = resp
        .json()
        .map_err(|e| SheetsError::TokenRefresh(format!("response invalid: {}", e)))?;

    body["access_token"]
        .as_str()
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .ok_or_else(|| SheetsError::TokenRefresh("response missing access_token".into()))
}
