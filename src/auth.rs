//! Ambient Google credentials.
//!
//! Credentials are never passed on the command line. They are looked up, in order, from:
//!
//! 1. an access token in `CLOUDSDK_AUTH_ACCESS_TOKEN` or `GOOGLE_OAUTH_ACCESS_TOKEN`
//!    (for example `$(gcloud auth print-access-token)`),
//! 2. the credentials file named by `GOOGLE_APPLICATION_CREDENTIALS`,
//! 3. gcloud's application default credentials, written by
//!    `gcloud auth application-default login`.
//!
//! Only `authorized_user` credential files are understood, they are exchanged for an access
//! token with the OAuth refresh token grant.
use crate::{util, Error};
use directories::BaseDirs;
use serde::Deserialize;
use std::{
    fmt,
    path::{Path, PathBuf},
};

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const ACCESS_TOKEN_VARS: [&str; 2] = ["CLOUDSDK_AUTH_ACCESS_TOKEN", "GOOGLE_OAUTH_ACCESS_TOKEN"];
const CREDENTIALS_FILE_VAR: &str = "GOOGLE_APPLICATION_CREDENTIALS";
const GCLOUD_CONFIG_VAR: &str = "CLOUDSDK_CONFIG";
const ADC_FILE: &str = "application_default_credentials.json";

#[derive(Debug, Clone)]
pub enum Credentials {
    AccessToken(AccessToken),
    AuthorizedUser(AuthorizedUser),
}

/// A bearer token that is used as is.
#[derive(Clone)]
pub struct AccessToken(String);

#[derive(Clone, Deserialize)]
pub struct AuthorizedUser {
    client_id: String,
    client_secret: String,
    refresh_token: String,
    #[serde(default)]
    quota_project_id: Option<String>,
    #[serde(default)]
    token_uri: Option<String>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum CredentialsFile {
    AuthorizedUser(AuthorizedUser),
    ServiceAccount {
        #[serde(default)]
        client_email: String,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl Credentials {
    /// Finds credentials using `lookup` to read environment variables.
    pub async fn discover<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.is_empty());

        for name in ACCESS_TOKEN_VARS {
            if let Some(token) = var(name) {
                tracing::debug!(source = name, "using access token from environment");
                return Ok(Credentials::AccessToken(AccessToken(token)));
            }
        }

        let path = match var(CREDENTIALS_FILE_VAR) {
            Some(path) => PathBuf::from(path),
            None => {
                let path = default_credentials_path(var(GCLOUD_CONFIG_VAR))?;
                if !path.exists() {
                    return Err(Error::Msg(
                        format!(
                            "no credentials found, run `gcloud auth application-default login` \
                             or set {} (looked for {})",
                            ACCESS_TOKEN_VARS[0],
                            path.display()
                        )
                        .into(),
                    ));
                }
                path
            }
        };
        Self::from_file(&path).await
    }

    /// Reads a credentials JSON file.
    pub async fn from_file(path: &Path) -> crate::Result<Self> {
        tracing::debug!(path = %path.display(), "reading credentials file");
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            Error::Msg(format!("could not read credentials file {}: {}", path.display(), e).into())
        })?;
        Self::from_slice(&bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> crate::Result<Self> {
        match serde_json::from_slice(bytes)? {
            CredentialsFile::AuthorizedUser(user) => Ok(Credentials::AuthorizedUser(user)),
            CredentialsFile::ServiceAccount { client_email } => Err(Error::Msg(
                format!(
                    "service account keys are not supported ({}), set {} to a token minted \
                     for the account instead",
                    client_email, ACCESS_TOKEN_VARS[0]
                )
                .into(),
            )),
            CredentialsFile::Unsupported => {
                Err(Error::Msg("unsupported credentials file type".into()))
            }
        }
    }

    /// The quota project recorded alongside the credentials, if any.
    pub fn quota_project(&self) -> Option<&str> {
        match self {
            Credentials::AccessToken(_) => None,
            Credentials::AuthorizedUser(user) => user.quota_project_id.as_deref(),
        }
    }

    /// Produces a bearer token, exchanging a refresh token over `http` when needed.
    pub async fn access_token(&self, http: &reqwest::Client) -> crate::Result<String> {
        match self {
            Credentials::AccessToken(AccessToken(token)) => Ok(token.clone()),
            Credentials::AuthorizedUser(user) => user.refresh(http).await,
        }
    }
}

impl AuthorizedUser {
    async fn refresh(&self, http: &reqwest::Client) -> crate::Result<String> {
        let uri = self.token_uri.as_deref().unwrap_or(DEFAULT_TOKEN_URI);
        tracing::debug!(token_uri = uri, "exchanging refresh token");
        let params = [
            ("grant_type", "refresh_token"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", self.refresh_token.as_str()),
        ];
        let resp = http.post(uri).form(&params).send().await?;
        let TokenResponse { access_token } = util::handle(resp).await?.json().await?;
        Ok(access_token)
    }
}

fn default_credentials_path(gcloud_config: Option<String>) -> crate::Result<PathBuf> {
    if let Some(dir) = gcloud_config {
        return Ok(PathBuf::from(dir).join(ADC_FILE));
    }
    let dirs = BaseDirs::new().ok_or_else(|| Error::Msg("cannot find home dir".into()))?;
    let config = if cfg!(windows) {
        dirs.config_dir().to_path_buf()
    } else {
        dirs.home_dir().join(".config")
    };
    Ok(config.join("gcloud").join(ADC_FILE))
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

impl fmt::Debug for AuthorizedUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizedUser")
            .field("client_id", &self.client_id)
            .field("quota_project_id", &self.quota_project_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}
