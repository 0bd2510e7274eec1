// src/client.rs

//! Transport to the practice server.
//!
//! Two calls:
//! - `POST /run` with a [`RunRequest`], answered by a [`Verdict`]
//! - `GET /switch_track/{id}`, answered by `{"status": "ok"}` on success
//!
//! There is no documented error contract: a transport failure, a non-2xx
//! status or a body that is not the expected JSON are all errors. No
//! client-side timeout and no retries.

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, COOKIE};
use serde::Deserialize;
use thiserror::Error;

use crate::identity::cookie_pair;
use crate::verdict::{RunRequest, Verdict};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server responded {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid client setup: {0}")]
    Setup(String),
}

/// Outcome of a track switch request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TrackSwitch {
    pub status: String,
}

impl TrackSwitch {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// The server as seen by the page.
///
/// Futures are not required to be `Send`: everything runs on one thread.
#[allow(async_fn_in_trait)]
pub trait ExecutionClient {
    async fn execute(&self, request: &RunRequest) -> Result<Verdict, ClientError>;

    async fn switch_track(&self, track_id: &str) -> Result<TrackSwitch, ClientError>;
}

/// HTTP implementation backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpExecutionClient {
    client: reqwest::Client,
    base_url: String,
    headers: HeaderMap,
}

impl HttpExecutionClient {
    /// `user_id` is sent as the identity cookie on every request.
    pub fn new(base_url: &str, user_id: &str) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&cookie_pair(user_id))
                .map_err(|e| ClientError::Setup(format!("user id is not a valid cookie: {}", e)))?,
        );

        Ok(Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            headers,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read_body(resp: reqwest::Response) -> Result<String, ClientError> {
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(text)
    }
}

impl ExecutionClient for HttpExecutionClient {
    async fn execute(&self, request: &RunRequest) -> Result<Verdict, ClientError> {
        let resp = self
            .client
            .post(self.url("/run"))
            .headers(self.headers.clone())
            .json(request)
            .send()
            .await?;

        let text = Self::read_body(resp).await?;
        let verdict: Verdict = serde_json::from_str(&text)?;
        Ok(verdict)
    }

    async fn switch_track(&self, track_id: &str) -> Result<TrackSwitch, ClientError> {
        let resp = self
            .client
            .get(self.url(&format!("/switch_track/{}", track_id)))
            .headers(self.headers.clone())
            .send()
            .await?;

        let text = Self::read_body(resp).await?;
        let outcome: TrackSwitch = serde_json::from_str(&text)?;
        Ok(outcome)
    }
}
