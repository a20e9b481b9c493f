//! Session client for the backend's credential endpoints.
//!
//! The backend authorizes `/system-stats` with an HTTP-only cookie set by
//! `POST /login`. A [`Session`] owns the cookie jar; sources built from it
//! send the cookie automatically.
//!
//! ## Example
//!
//! ```rust,no_run
//! use statwatch_feed::{Session, TelemetryFeed};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = Session::new("http://localhost:8080/api", Duration::from_secs(10))?;
//!     session.login("admin", "hunter2").await?;
//!
//!     let feed = TelemetryFeed::new(session.stats_source());
//!     feed.start()?;
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::source::RemoteSource;
use crate::SessionError;

/// An authenticated (or not yet authenticated) connection to the backend.
#[derive(Debug, Clone)]
pub struct Session {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

/// Error body the backend sends with 4xx/5xx answers.
#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl Session {
    /// Create a session with its own cookie jar.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SessionError> {
        let client = Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .build()
            .map_err(|e| SessionError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// The API base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Exchange credentials for a session cookie.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), SessionError> {
        let response = self
            .post("/login", Some(Credentials { username, password }))
            .await?;
        check(response).await?;
        info!("logged in as {}", username);
        Ok(())
    }

    /// Tear down the session on the backend.
    ///
    /// The cookie is cleared by the backend's response; callers usually
    /// move on to the login screen even if this fails, and decide how to
    /// report the error.
    pub async fn logout(&self) -> Result<(), SessionError> {
        let response = self.post::<Credentials>("/logout", None).await?;
        check(response).await?;
        info!("logged out");
        Ok(())
    }

    /// Create an account.
    pub async fn register(&self, username: &str, password: &str) -> Result<(), SessionError> {
        let response = self
            .post("/register", Some(Credentials { username, password }))
            .await?;
        check(response).await?;
        info!("registered {}", username);
        Ok(())
    }

    /// A stats source that sends this session's cookie.
    pub fn stats_source(&self) -> RemoteSource {
        RemoteSource::with_client(self.client.clone(), &self.base_url)
    }

    async fn post<T: Serialize>(
        &self,
        path: &str,
        body: Option<T>,
    ) -> Result<Response, SessionError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.post(&url);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await?;
        debug!("POST {} -> {}", url, response.status());
        Ok(response)
    }
}

/// Turn a non-2xx answer into a [`SessionError`], keeping the backend's message.
async fn check(response: Response) -> Result<(), SessionError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let message = response
        .json::<ErrorBody>()
        .await
        .map(|body| body.error)
        .unwrap_or_else(|_| status.to_string());

    Err(match status {
        StatusCode::UNAUTHORIZED => SessionError::InvalidCredentials(message),
        s if s.is_client_error() => SessionError::Rejected {
            status: s.as_u16(),
            message,
        },
        _ => SessionError::ServerError(message),
    })
}
