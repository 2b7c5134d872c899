// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! HTTP API
//!
//! - `GET /balance/largest-change`: scan the latest window and report the
//!   address with the largest net balance change
//! - `GET /health`: liveness probe

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::balance::BalanceDirection;
use crate::errors::ScanError;
use crate::scanner::{BalanceChangeReport, BalanceChangeScanner};

/// Body of a successful `GET /balance/largest-change`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LargestChangeResponse {
    /// Lower-case `0x` address, `""` when no balance changed
    pub address: String,
    /// Magnitude in wei
    pub balance_change: String,
    pub balance_change_gwei: String,
    pub balance_change_ether: String,
    pub direction: BalanceDirection,
    pub window: WindowSummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowSummary {
    pub latest_block: u64,
    pub blocks_requested: usize,
    pub blocks_aggregated: usize,
    pub blocks_failed: usize,
}

impl From<&BalanceChangeReport> for LargestChangeResponse {
    fn from(report: &BalanceChangeReport) -> Self {
        let largest = &report.largest;
        Self {
            address: largest.address_hex(),
            balance_change: largest.change.wei(),
            balance_change_gwei: largest.change.gwei(),
            balance_change_ether: largest.change.ether(),
            direction: largest.direction,
            window: WindowSummary {
                latest_block: report.latest_block,
                blocks_requested: report.requested.len(),
                blocks_aggregated: report.aggregated_blocks,
                blocks_failed: report.failures.len(),
            },
        }
    }
}

/// Fatal scan failure as seen by HTTP clients
///
/// The cause is logged; the response body never carries it.
#[derive(Debug)]
pub struct ApiError(ScanError);

impl From<ScanError> for ApiError {
    fn from(error: ScanError) -> Self {
        Self(error)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    status_code: u16,
    message: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!(error = %self.0, cause = ?self.0, "Balance change scan failed");
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        let body = ErrorBody {
            status_code: status.as_u16(),
            message: "Internal server error",
        };
        (status, Json(body)).into_response()
    }
}

/// Handler for `GET /balance/largest-change`.
async fn largest_change(
    State(scanner): State<Arc<BalanceChangeScanner>>,
) -> Result<Json<LargestChangeResponse>, ApiError> {
    info!("Received largest balance change request");
    let report = scanner.find_address_with_largest_balance_change().await?;
    Ok(Json(LargestChangeResponse::from(&report)))
}

/// Handler for `GET /health`.
async fn health() -> &'static str {
    "ok"
}

/// Routes of the API, without binding a socket.
pub fn router(scanner: Arc<BalanceChangeScanner>) -> Router {
    Router::new()
        .route("/balance/largest-change", get(largest_change))
        .route("/health", get(health))
        .with_state(scanner)
}

/// Starts the API server.
pub async fn serve_api(
    listener: TcpListener,
    scanner: Arc<BalanceChangeScanner>,
) -> anyhow::Result<()> {
    let app = router(scanner);

    let addr = listener.local_addr()?;

    info!(address = ?addr, "Starting server");

    axum::serve(listener, app).await?;

    Ok(())
}
