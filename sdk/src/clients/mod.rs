mod http_client;
mod http_status_code;
mod session;

pub use http_client::{ApiResponse, HttpClient, TlsOptions, DEFAULT_LOG_TARGET};
pub use http_status_code::{HttpStatusCode, StatusCode};
pub(crate) use session::create_session_with;
pub use session::{create_session, Credentials, Session};
