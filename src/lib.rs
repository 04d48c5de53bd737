use reqwest::header;
use std::{sync::Arc, time::Duration};

pub mod auth;
pub mod billing;
pub mod config;
pub mod migrate;
mod util;

pub use billing::ProjectBillingInfo;

const DEFAULT_BILLING_URI: &str = "https://cloudbilling.googleapis.com";
const QUOTA_PROJECT_HEADER: &str = "x-goog-user-project";

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("{0}")]
    Header(#[from] header::InvalidHeaderValue),
    #[error("{0}")]
    Request(#[from] reqwest::Error),
    #[error("{0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Msg(std::borrow::Cow<'static, str>),
    #[error("{request_error} [{extra}]")]
    Service {
        extra: String,
        request_error: reqwest::Error,
    },
    #[error("error getting projects for billing account [{account}]")]
    List {
        account: String,
        #[source]
        source: Box<Error>,
    },
    #[error("error reading keyboard input")]
    Input(#[source] std::io::Error),
    #[error("error moving project [{project}] to another billing account")]
    Update {
        project: String,
        #[source]
        source: Box<Error>,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone)]
pub struct Client {
    client: reqwest::Client,
    data: Arc<ClientData>,
}

#[derive(Debug, Clone)]
struct ClientData {
    base_url: reqwest::Url,
    quota_project: Option<String>,
}

pub struct ClientBuilder {
    quota_project: Option<String>,
    base_url: reqwest::Url,
    token: String,
    timeout: Duration,
    headers: header::HeaderMap,
}

impl Client {
    pub fn builder(token: impl Into<String>) -> ClientBuilder {
        ClientBuilder {
            token: token.into(),
            ..ClientBuilder::new()
        }
    }

    pub fn url(&self) -> &reqwest::Url {
        &self.data.base_url
    }

    /// The project billed for API quota, if one was configured.
    pub fn quota_project(&self) -> Option<&str> {
        self.data.quota_project.as_deref()
    }

    fn join_url(&self, path: &str) -> reqwest::Url {
        let mut url = self.url().clone();
        url.set_path(path);
        url
    }

    async fn get_query<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        Q: serde::Serialize + ?Sized,
    {
        let url = self.join_url(path);
        let resp = self.client.get(url).query(query).send().await?;
        util::handle(resp)
            .await?
            .json()
            .await
            .map_err(Error::Request)
    }

    async fn put_json<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        let url = self.join_url(path);
        let resp = self.client.put(url).json(body).send().await?;
        util::handle(resp)
            .await?
            .json()
            .await
            .map_err(Error::Request)
    }
}

impl ClientBuilder {
    fn new() -> Self {
        Self {
            quota_project: None,
            base_url: reqwest::Url::parse(DEFAULT_BILLING_URI).unwrap(),
            timeout: Duration::from_secs(60),
            token: String::new(),
            headers: header::HeaderMap::new(),
        }
    }

    /// Sets the project charged for API quota, sent as the `x-goog-user-project` header.
    /// User credentials from gcloud usually need one.
    pub fn quota_project(mut self, project: impl Into<String>) -> Self {
        self.quota_project = Some(project.into());
        self
    }

    /// Sets the base url used for all api requests.
    ///
    /// # Default Value
    /// `https://cloudbilling.googleapis.com`
    ///
    /// # Notes
    /// The client will set the path when making requests, as such, any path component will be
    /// overridden. This must also be a valid http URI, like all URLs used with reqwest.
    pub fn service_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        self.base_url = reqwest::Url::parse(url.as_ref())?;
        Ok(self)
    }

    /// Sets the request timeout for requests issued by the client
    ///
    /// # Default Value
    /// 60 Seconds
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(mut self) -> Result<Client> {
        if self.token.is_empty() {
            return Err(Error::Msg("cannot build a client without an access token".into()));
        }
        let mut token = header::HeaderValue::try_from(format!("Bearer {}", self.token))?;
        token.set_sensitive(true);
        self.headers.insert(header::AUTHORIZATION, token);
        if let Some(project) = &self.quota_project {
            let value = header::HeaderValue::try_from(project.as_str())?;
            self.headers.insert(QUOTA_PROJECT_HEADER, value);
        }
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .default_headers(self.headers)
            .build()?;
        Ok(Client {
            client,
            data: Arc::new(ClientData {
                base_url: self.base_url,
                quota_project: self.quota_project,
            }),
        })
    }
}
