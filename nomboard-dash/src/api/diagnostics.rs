//! Outbound IP probe
//!
//! Reports the public address this service egresses from, so operators can
//! allow-list it on the database and signing service. The probe is best
//! effort: failures are logged and reported as `null`.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundIpResponse {
    pub outbound_ip: Option<String>,
}

#[derive(Deserialize)]
struct EchoResponse {
    ip: String,
}

/// GET /api/my-ip
pub async fn get_outbound_ip(State(state): State<AppState>) -> Json<OutboundIpResponse> {
    let outbound_ip = match probe(&state.http_client, &state.config.ip_echo_url).await {
        Ok(ip) => Some(ip),
        Err(e) => {
            warn!("Outbound IP probe failed: {}", e);
            None
        }
    };

    Json(OutboundIpResponse { outbound_ip })
}

async fn probe(client: &reqwest::Client, url: &str) -> Result<String, reqwest::Error> {
    let echo: EchoResponse = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    Ok(echo.ip)
}
