use crate::error::{self, Result};
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{ClientBuilder, StatusCode};
use serde::Serialize;
use snafu::ResultExt;
use std::fmt::{Debug, Formatter};

/// An authenticated transport shared by every manager created from the same client.
///
/// A `Session` obtained from [`create_session`] either carries a bearer token on every request or
/// holds the cookie handed out by the login endpoint. A session built by the caller with
/// [`Session::from_client`] is used as-is, including its TLS configuration.
#[derive(Clone, Debug)]
pub struct Session {
    client: reqwest::Client,
}

impl Session {
    /// Wrap an externally configured `reqwest::Client`.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub(crate) fn into_client(self) -> reqwest::Client {
        self.client
    }
}

/// The credentials used to open a [`Session`]. A token takes precedence over a username and
/// password when both are present.
#[derive(Clone, Default)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
    pub token: Option<String>,
}

impl Credentials {
    pub fn token<S: Into<String>>(token: S) -> Self {
        Self {
            token: Some(token.into()),
            ..Default::default()
        }
    }

    pub fn login<S1, S2>(username: S1, password: S2) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        Self {
            username: Some(username.into()),
            password: Some(password.into()),
            token: None,
        }
    }

    /// `true` if either credential form is complete.
    pub fn is_complete(&self) -> bool {
        non_empty(&self.token).is_some()
            || (non_empty(&self.username).is_some() && non_empty(&self.password).is_some())
    }
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    #[serde(rename = "LoginOrEmail")]
    login_or_email: &'a str,
    #[serde(rename = "Password")]
    password: &'a str,
}

/// Create a new session against `base_url` using default TLS settings.
///
/// With a token, the session attaches `Authorization: Bearer <token>` to every request and no
/// network call is made. With a username and password, a single login request is sent to
/// `{base_url}/auth/login` and anything but `200 OK` fails with [`Error::Authentication`].
///
/// [`Error::Authentication`]: crate::Error::Authentication
pub async fn create_session(base_url: &str, credentials: &Credentials) -> Result<Session> {
    create_session_with(base_url, credentials, reqwest::Client::builder()).await
}

pub(crate) async fn create_session_with(
    base_url: &str,
    credentials: &Credentials,
    builder: ClientBuilder,
) -> Result<Session> {
    if let Some(token) = non_empty(&credentials.token) {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
            .context(error::HeaderValueSnafu {
                name: AUTHORIZATION.as_str(),
            })?;
        value.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value);
        let client = builder
            .default_headers(headers)
            .build()
            .context(error::HttpClientBuildSnafu)?;
        return Ok(Session { client });
    }

    let username = non_empty(&credentials.username);
    let password = non_empty(&credentials.password);
    match (username, password) {
        (Some(username), Some(password)) => {
            let client = builder
                .cookie_store(true)
                .build()
                .context(error::HttpClientBuildSnafu)?;
            let url = format!("{}/auth/login", base_url);
            debug!("logging in as '{}' at {}", username, url);
            let response = client
                .post(&url)
                .json(&LoginRequest {
                    login_or_email: username,
                    password,
                })
                .send()
                .await
                .context(error::TransportSnafu {
                    method: "POST",
                    url: &url,
                })?;
            if response.status() != StatusCode::OK {
                let body = response.text().await.unwrap_or_default();
                return error::AuthenticationSnafu { body }.fail();
            }
            Ok(Session { client })
        }
        _ => error::MissingCredentialsSnafu.fail(),
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Error;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn token_session_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/workspace"))
            .and(header("Authorization", "Bearer s3cr3t"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let session = create_session(&server.uri(), &Credentials::token("s3cr3t"))
            .await
            .unwrap();
        let response = session
            .client()
            .get(format!("{}/workspace", server.uri()))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn token_wins_over_login() {
        let server = MockServer::start().await;
        Mock::given(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let credentials = Credentials {
            username: Some("test".into()),
            password: Some("test".into()),
            token: Some("abc".into()),
        };
        assert!(create_session(&server.uri(), &credentials).await.is_ok());
    }

    #[tokio::test]
    async fn login_posts_credentials_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(header("content-type", "application/json"))
            .and(body_json(
                serde_json::json!({"LoginOrEmail": "test", "Password": "pass"}),
            ))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        create_session(&server.uri(), &Credentials::login("test", "pass"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn login_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad password"))
            .expect(1)
            .mount(&server)
            .await;

        let error = create_session(&server.uri(), &Credentials::login("test", "nope"))
            .await
            .unwrap_err();
        match error {
            Error::Authentication { body } => assert_eq!(body, "bad password"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn missing_credentials() {
        let credentials = Credentials {
            username: Some("only-user".into()),
            ..Default::default()
        };
        assert!(!credentials.is_complete());
        let error = create_session("http://localhost:1", &credentials)
            .await
            .unwrap_err();
        assert!(matches!(error, Error::MissingCredentials));
    }

    #[test]
    fn debug_redacts_secrets() {
        let debug = format!("{:?}", Credentials::login("user", "hunter2"));
        assert!(debug.contains("user"));
        assert!(!debug.contains("hunter2"));
    }
}
