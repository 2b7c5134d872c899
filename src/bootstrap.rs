// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing::info;

use crate::{api::serve_api, BalanceChangeScanner, DeltascanConfig};

/// Main entry point for the application.
pub async fn run() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let config = DeltascanConfig::from_env().context("Invalid configuration")?;
    info!(
        api_url = %config.api_url,
        chain = ?config.chain,
        window_size = %config.window_size,
        max_concurrency = %config.max_concurrency,
        max_attempts = config.retry.max_attempts,
        rate_limit_per_second = ?config.rate_limit_per_second,
        "Loaded configuration"
    );

    let scanner = Arc::new(BalanceChangeScanner::from_config(&config));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    // Start the API server
    serve_api(listener, scanner).await?;

    Ok(())
}
