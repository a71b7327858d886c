//! Video URL signing
//!
//! Stored nominations reference videos by private object key. Before the
//! report is returned, each key is exchanged for a short-lived playback URL
//! by the internal signing service.
//!
//! # Failure policy
//! - One attempt per video, no retries
//! - A failed exchange never fails the report: the row keeps its stored key
//!   and carries the failure reason in its outcome
//!
//! # API Reference
//! - `POST {base_url}/api/internal/v1/video/presigned-url`
//! - Header `X-Internal-API-Key`
//! - Body `{"videoKey": "..."}`, response `{"url": "..."}`

use async_trait::async_trait;
use futures::future::join_all;
use nomboard_common::config::SigningConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::db::Nomination;

/// Path of the signing endpoint relative to the service base URL
pub const PRESIGN_PATH: &str = "/api/internal/v1/video/presigned-url";

/// Header carrying the internal API key
pub const API_KEY_HEADER: &str = "X-Internal-API-Key";

/// Signing error types
#[derive(Debug, Error)]
pub enum SignError {
    /// Connection, timeout or other transport failure
    #[error("Signing request failed: {0}")]
    Transport(String),

    /// Non-2xx response
    #[error("Signing service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// 2xx response without a usable URL
    #[error("Malformed signing response: {0}")]
    MalformedBody(String),
}

/// Exchanges stored object keys for playback URLs
#[async_trait]
pub trait MediaSigner: Send + Sync {
    async fn presign(&self, object_key: &str) -> Result<String, SignError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PresignRequest<'a> {
    video_key: &'a str,
}

#[derive(Deserialize)]
struct PresignResponse {
    url: Option<String>,
}

/// HTTP client for the internal signing service
pub struct HttpMediaSigner {
    http_client: Client,
    endpoint: String,
    api_key: String,
}

impl HttpMediaSigner {
    /// Build a signer from validated configuration
    pub fn new(config: &SigningConfig) -> Result<Self, SignError> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SignError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            endpoint: format!("{}{}", config.base_url, PRESIGN_PATH),
            api_key: config.api_key.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl MediaSigner for HttpMediaSigner {
    async fn presign(&self, object_key: &str) -> Result<String, SignError> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&PresignRequest { video_key: object_key })
            .send()
            .await
            .map_err(|e| SignError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SignError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: PresignResponse = response
            .json()
            .await
            .map_err(|e| SignError::MalformedBody(e.to_string()))?;

        match body.url {
            Some(url) if !url.trim().is_empty() => Ok(url),
            _ => Err(SignError::MalformedBody("missing url field".to_string())),
        }
    }
}

/// What happened to a row's video reference
///
/// Serialized next to the row fields as `video_status` (plus `video_error`
/// for failures) so clients can tell a playable URL from a stored key.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "video_status", rename_all = "snake_case")]
pub enum EnrichmentOutcome {
    /// `video` now holds a signed playback URL
    Signed,
    /// Signing failed; `video` still holds the stored key
    Failed { video_error: String },
    /// Row has no video
    NoMedia,
    /// Signing service not configured; `video` holds the stored key
    Disabled,
}

/// Nomination after the signing step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedNomination {
    #[serde(flatten)]
    pub nomination: Nomination,
    #[serde(flatten)]
    pub outcome: EnrichmentOutcome,
}

/// Sign every row's video concurrently
///
/// Output order equals input order whatever order the calls complete in.
/// Rows are independent: one failure affects only its own row.
pub async fn enrich(
    signer: Option<&dyn MediaSigner>,
    nominations: Vec<Nomination>,
) -> Vec<EnrichedNomination> {
    join_all(
        nominations
            .into_iter()
            .map(|nomination| enrich_one(signer, nomination)),
    )
    .await
}

async fn enrich_one(signer: Option<&dyn MediaSigner>, mut nomination: Nomination) -> EnrichedNomination {
    let object_key = match nomination.video.as_deref() {
        Some(key) if !key.trim().is_empty() => key.to_string(),
        _ => {
            return EnrichedNomination {
                nomination,
                outcome: EnrichmentOutcome::NoMedia,
            }
        }
    };

    let Some(signer) = signer else {
        return EnrichedNomination {
            nomination,
            outcome: EnrichmentOutcome::Disabled,
        };
    };

    let outcome = match signer.presign(&object_key).await {
        Ok(url) => {
            debug!(nomination_id = nomination.id, "Signed video URL");
            nomination.video = Some(url);
            EnrichmentOutcome::Signed
        }
        Err(e) => {
            warn!(
                nomination_id = nomination.id,
                video_key = %object_key,
                "Failed to sign video URL: {}",
                e
            );
            EnrichmentOutcome::Failed {
                video_error: e.to_string(),
            }
        }
    };

    EnrichedNomination { nomination, outcome }
}
