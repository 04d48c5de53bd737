//! Settings read from the environment. There is no configuration file.
use crate::{Client, ClientBuilder, Error};
use std::time::Duration;

const ENDPOINT_VAR: &str = "CLOUDBILLING_ENDPOINT";
const TIMEOUT_VAR: &str = "CLOUDBILLING_TIMEOUT_SECS";
const QUOTA_PROJECT_VAR: &str = "GOOGLE_CLOUD_QUOTA_PROJECT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Overrides the Cloud Billing service URL.
    pub endpoint: Option<String>,
    /// Request timeout, for both the billing and token endpoints.
    pub timeout: Duration,
    pub quota_project: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout: Duration::from_secs(60),
            quota_project: None,
        }
    }
}

impl Settings {
    pub fn from_env() -> crate::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds settings using `lookup` to read environment variables; unset and empty variables
    /// keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let timeout = match var(TIMEOUT_VAR) {
            None => Settings::default().timeout,
            Some(secs) => match secs.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(Error::Msg(
                        format!(
                            "{} must be a positive number of seconds, got {:?}",
                            TIMEOUT_VAR, secs
                        )
                        .into(),
                    ))
                }
            },
        };
        Ok(Settings {
            endpoint: var(ENDPOINT_VAR),
            timeout,
            quota_project: var(QUOTA_PROJECT_VAR),
        })
    }

    /// Applies these settings to a client builder. `fallback_quota_project` is used when no
    /// quota project was configured explicitly.
    pub fn client(
        &self,
        token: impl Into<String>,
        fallback_quota_project: Option<&str>,
    ) -> crate::Result<Client> {
        let mut builder: ClientBuilder = Client::builder(token).timeout(self.timeout);
        if let Some(url) = &self.endpoint {
            builder = builder.service_url(url)?;
        }
        if let Some(project) = self.quota_project.as_deref().or(fallback_quota_project) {
            builder = builder.quota_project(project);
        }
        builder.build()
    }
}
