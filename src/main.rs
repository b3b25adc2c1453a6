// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use collateral_provider::{
    api::router,
    blockchain::{enterprise_address, KeySigner, MaestroClient},
    collateral::{RequestValidator, ReserveDiscovery},
    config::AppConfig,
    logging,
    state::AppState,
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init(config.log_format) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Collateral provider stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let network = config.network.config();
    let signer = Arc::new(KeySigner::from_hex(&config.private_key)?);
    let address = enterprise_address(&signer.verifying_key(), &network)?;
    let provider = Arc::new(MaestroClient::new(
        network,
        config.maestro_key.clone(),
        config.provider_timeout,
    )?);
    let bind_address = config.bind_address()?;

    info!(
        network = provider.network().name,
        address = %address,
        "Collateral provider starting"
    );

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown signal received");
            }
            shutdown.cancel();
        }
    });

    // Nothing is served until a reserve exists.
    let discovery = ReserveDiscovery::new(provider.clone(), address);
    let reserve = tokio::select! {
        reserve = discovery.discover() => reserve,
        _ = shutdown.cancelled() => {
            info!("Shutdown before a collateral reserve was found");
            return Ok(());
        }
    };

    let validator =
        RequestValidator::new(provider, signer).with_call_timeout(config.provider_timeout);
    let app = router(AppState::new(reserve, validator));

    let listener = TcpListener::bind(bind_address).await?;
    info!(addr = %bind_address, "Collateral provider listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    info!("Collateral provider shut down");
    Ok(())
}
