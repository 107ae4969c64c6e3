use super::Session;
use crate::error::{self, Error, Result};
use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Certificate, ClientBuilder, Identity, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use snafu::{ensure, ResultExt};
use std::path::{Path, PathBuf};

/// The log target used by an `HttpClient` unless another one is configured.
pub const DEFAULT_LOG_TARGET: &str = "kuberlab_sdk::http";

/// TLS settings for a client that builds its own transport. They are ignored when an externally
/// supplied [`Session`] is used, since that session already carries its TLS configuration.
#[derive(Debug, Clone, Default)]
pub struct TlsOptions {
    /// Do not verify the server certificate.
    pub insecure: bool,
    /// A PEM bundle used to verify the server certificate.
    pub cacert: Option<PathBuf>,
    /// A PEM client certificate, used together with `key`.
    pub cert: Option<PathBuf>,
    /// The PEM private key for `cert`.
    pub key: Option<PathBuf>,
}

impl TlsOptions {
    /// Fails if `base_url` is https and `cacert` points at a file that does not exist. Setting
    /// `insecure` together with `cacert` is allowed but logged.
    pub(crate) fn validate(&self, base_url: &str) -> Result<()> {
        if !base_url.starts_with("https") {
            return Ok(());
        }
        if let Some(cacert) = &self.cacert {
            ensure!(
                cacert.exists(),
                error::CaCertNotFoundSnafu {
                    path: cacert.clone(),
                }
            );
            if self.insecure {
                warn!("Client is set to not verify even though cacert is provided.");
            }
        }
        Ok(())
    }

    /// Create a `reqwest::ClientBuilder` with these options applied for `base_url`.
    pub(crate) fn client_builder(&self, base_url: &str) -> Result<ClientBuilder> {
        self.validate(base_url)?;
        let mut builder = reqwest::Client::builder();
        if !base_url.starts_with("https") {
            return Ok(builder);
        }
        if self.insecure {
            builder = builder.danger_accept_invalid_certs(true);
        } else if let Some(cacert) = &self.cacert {
            let pem = read_pem("cacert", cacert)?;
            let certificate =
                Certificate::from_pem(&pem).context(error::TlsConfigSnafu { what: "cacert" })?;
            builder = builder.add_root_certificate(certificate);
        }
        if let (Some(cert), Some(key)) = (&self.cert, &self.key) {
            let mut pem = read_pem("client certificate", cert)?;
            pem.extend(read_pem("client key", key)?);
            let identity = Identity::from_pem(&pem).context(error::TlsConfigSnafu {
                what: "client certificate",
            })?;
            builder = builder.identity(identity);
        }
        Ok(builder)
    }
}

fn read_pem(what: &str, path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).context(error::TlsFileSnafu { what, path })
}

/// A fully read HTTP response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub method: Method,
    pub url: String,
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    /// `true` for any status below 400.
    pub fn is_ok(&self) -> bool {
        self.status.as_u16() < 400
    }

    /// Parse the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).context(error::DeserializeSnafu {
            what: format!("response from {} {}", self.method, self.url),
        })
    }

    /// Parse the body as JSON, optionally scoped to a top-level key. A missing key yields `null`.
    pub fn json_at(&self, response_key: Option<&str>) -> Result<Value> {
        let value: Value = self.json()?;
        Ok(match response_key {
            Some(key) => value.get(key).cloned().unwrap_or(Value::Null),
            None => value,
        })
    }

    /// Convert a failed response into [`Error::Api`]. The message is the `Error` field of a JSON
    /// body, or the raw body text when there is no such field or the body is not JSON.
    pub fn api_error(&self) -> Error {
        let message = serde_json::from_str::<Value>(&self.body)
            .ok()
            .and_then(|value| match value.get("Error") {
                Some(Value::String(message)) => Some(message.clone()),
                Some(Value::Null) | None => None,
                Some(other) => Some(other.to_string()),
            })
            .unwrap_or_else(|| self.body.clone());
        Error::Api {
            status: self.status.as_u16(),
            message,
        }
    }
}

/// `HttpClient` prefixes every path with the base URL, sends the request with the authenticated
/// transport and returns the fully read response. It holds no per-call state and is cheap to clone,
/// so many managers can share one.
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
    client: reqwest::Client,
    log_target: String,
}

impl HttpClient {
    /// Create a client for `base_url`. When `session` is `None` a new transport is built from
    /// `tls`; otherwise the session's transport is used unchanged.
    pub fn new<S>(base_url: S, session: Option<Session>, tls: &TlsOptions) -> Result<Self>
    where
        S: Into<String>,
    {
        let base_url = base_url.into();
        let client = match session {
            Some(session) => {
                tls.validate(&base_url)?;
                session.into_client()
            }
            None => tls
                .client_builder(&base_url)?
                .build()
                .context(error::HttpClientBuildSnafu)?,
        };
        Ok(Self {
            base_url,
            client,
            log_target: DEFAULT_LOG_TARGET.to_string(),
        })
    }

    /// Route this client's request logs to `target`.
    pub fn with_log_target<S: Into<String>>(mut self, target: S) -> Self {
        self.log_target = target.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn log_target(&self) -> &str {
        &self.log_target
    }

    pub async fn get(&self, path: &str, headers: Option<HeaderMap>) -> Result<ApiResponse> {
        self.send(Method::GET, path, None, headers).await
    }

    pub async fn post<B>(
        &self,
        path: &str,
        body: B,
        headers: Option<HeaderMap>,
    ) -> Result<ApiResponse>
    where
        B: Into<String>,
    {
        self.send(Method::POST, path, Some(body.into()), headers)
            .await
    }

    pub async fn put<B>(
        &self,
        path: &str,
        body: B,
        headers: Option<HeaderMap>,
    ) -> Result<ApiResponse>
    where
        B: Into<String>,
    {
        self.send(Method::PUT, path, Some(body.into()), headers)
            .await
    }

    pub async fn delete(&self, path: &str, headers: Option<HeaderMap>) -> Result<ApiResponse> {
        self.send(Method::DELETE, path, None, headers).await
    }

    /// Upload `data` as the multipart field `file` named `filename`, along with plain form fields.
    pub async fn post_file(
        &self,
        path: &str,
        form_data: &[(&str, &str)],
        filename: &str,
        data: Vec<u8>,
    ) -> Result<ApiResponse> {
        let url = self.url(path);
        let form = form_data
            .iter()
            .fold(Form::new(), |form, (name, value)| {
                form.text(name.to_string(), value.to_string())
            })
            .part("file", Part::bytes(data).file_name(filename.to_string()));
        let request = self.client.post(&url).multipart(form);
        self.execute(Method::POST, url, request).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
        headers: Option<HeaderMap>,
    ) -> Result<ApiResponse> {
        let url = self.url(path);
        let mut headers = headers.unwrap_or_default();
        if matches!(method, Method::POST | Method::PUT) && !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        let mut request = self.client.request(method.clone(), &url).headers(headers);
        if let Some(body) = body {
            request = request.body(body);
        }
        self.execute(method, url, request).await
    }

    async fn execute(
        &self,
        method: Method,
        url: String,
        request: RequestBuilder,
    ) -> Result<ApiResponse> {
        let response = request.send().await.context(error::TransportSnafu {
            method: method.as_str(),
            url: &url,
        })?;
        let status = response.status();
        let url = response.url().to_string();
        let body = response.text().await.context(error::TransportSnafu {
            method: method.as_str(),
            url: &url,
        })?;
        debug!(target: self.log_target.as_str(), "HTTP {} {} {}", method, url, status.as_u16());
        debug!(target: self.log_target.as_str(), "RESP BODY {}", body);
        Ok(ApiResponse {
            method,
            url,
            status,
            body,
        })
    }
}
