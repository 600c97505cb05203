use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, anyhow};
use futures::stream::StreamExt;
use signal_hook::consts::*;
use signal_hook_tokio::Signals;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use coind_common::provider::{FauxProvider, ProviderRegistry, SkyProvider, WavesProvider};
use coind_common::upstream::{SkyExplorerClient, WavesNodeClient};

use crate::StdResult;
use crate::configuration::Configuration;
use crate::deposit_service::{DepositService, RegistryDepositService};
use crate::http_api::{self, AppState};
use crate::rpc::{RpcDispatcher, RpcServer, RpcServerConfig};

/// Structure to hold signal listener
pub struct OsSignalHandler;

impl OsSignalHandler {
    /// Cancel `shutdown` on a termination signal, stop when `shutdown` is cancelled elsewhere.
    pub async fn handle_signal(mut signals: Signals, shutdown: CancellationToken) {
        loop {
            let signal = tokio::select! {
                _ = shutdown.cancelled() => break,
                signal = signals.next() => signal,
            };

            match signal {
                Some(signal @ (SIGTERM | SIGINT | SIGQUIT)) => {
                    warn!("Signal caught: {signal}, exiting…");
                    shutdown.cancel();

                    break;
                }
                Some(SIGHUP) => {
                    info!("SIGHUP signal caught.");
                }
                Some(other) => debug!("Ignoring signal {other}"),
                None => break,
            }
        }
    }
}

/// Providers of the supported coins, talking to the configured upstreams.
pub fn build_provider_registry(configuration: &Configuration) -> StdResult<ProviderRegistry> {
    let sky_client = SkyExplorerClient::new(&configuration.sky_explorer_url)
        .with_context(|| "could not build the Skycoin explorer client")?;
    let waves_client = WavesNodeClient::new(&configuration.waves_node_url)
        .with_context(|| "could not build the Waves node client")?;

    Ok(ProviderRegistry::new()
        .with_provider(Arc::new(SkyProvider::new(Arc::new(sky_client))))
        .with_provider(Arc::new(WavesProvider::new(Arc::new(waves_client))))
        .with_provider(Arc::new(FauxProvider)))
}

/// Application controller
pub struct Application {
    configuration: Configuration,
    registry: ProviderRegistry,
}

impl Application {
    /// Application serving the providers of the configured upstreams
    pub fn new(configuration: Configuration) -> StdResult<Self> {
        let registry = build_provider_registry(&configuration)?;

        Ok(Self::with_registry(configuration, registry))
    }

    /// Application serving the given providers
    pub fn with_registry(configuration: Configuration, registry: ProviderRegistry) -> Self {
        Self {
            configuration,
            registry,
        }
    }

    /// main async runner
    pub async fn run(self) -> StdResult<()> {
        info!("starting coind version {}", env!("CARGO_PKG_VERSION"));

        trace!("setting up signal hook…");
        let signals = Signals::new([SIGTERM, SIGINT, SIGQUIT, SIGHUP])?;
        let signal_handle = signals.handle();
        let shutdown = CancellationToken::new();

        let servers = self.bind().await?;
        let signal_task = tokio::spawn(OsSignalHandler::handle_signal(signals, shutdown.clone()));
        let result = servers.serve(shutdown.clone()).await;

        trace!("closing signal handler…");
        shutdown.cancel();
        signal_handle.close();
        if let Err(err) = signal_task.await {
            warn!("Signal handler task failed: {err}");
        }
        info!("coind stopped");

        result
    }

    /// Bind both front ends.
    pub async fn bind(self) -> StdResult<BoundServers> {
        let configuration = self.configuration;
        if configuration.rpc_key.is_some() || configuration.rpc_cert.is_some() {
            warn!("TLS key and certificate are ignored, the JSON-RPC server only serves plain HTTP");
        }
        info!(
            coin_types = ?self.registry.coin_types(),
            "Providers registered"
        );

        let deposit_service: Arc<dyn DepositService> =
            Arc::new(RegistryDepositService::new(Arc::new(self.registry)));

        let rpc_server = RpcServer::bind(
            RpcServerConfig::new(
                configuration.rpc_address.clone(),
                configuration.max_concurrent_requests,
            ),
            RpcDispatcher::new(
                deposit_service.clone(),
                configuration.default_coin_type.clone(),
                configuration.rpc_quirks,
            ),
        )
        .await?;

        let api_listener = {
            debug!("binding on {}", configuration.api_address);
            TcpListener::bind(&configuration.api_address)
                .await
                .with_context(|| format!("Could not listen on '{}'.", configuration.api_address))?
        };
        info!("HTTP API listening on {}", api_listener.local_addr()?);

        Ok(BoundServers {
            rpc_server,
            api_listener,
            api_router: http_api::router(Arc::new(AppState::new(deposit_service))),
        })
    }
}

/// Front ends bound to their listen addresses, not serving yet.
pub struct BoundServers {
    rpc_server: RpcServer,
    api_listener: TcpListener,
    api_router: axum::Router,
}

impl BoundServers {
    /// JSON-RPC listen addresses
    pub fn rpc_addresses(&self) -> Vec<SocketAddr> {
        self.rpc_server.local_addrs()
    }

    /// HTTP API listen address
    pub fn api_address(&self) -> StdResult<SocketAddr> {
        Ok(self.api_listener.local_addr()?)
    }

    /// Serve both front ends until `shutdown` is cancelled.
    ///
    /// A failing front end cancels `shutdown`, the other one then drains and stops too.
    pub async fn serve(self, shutdown: CancellationToken) -> StdResult<()> {
        let Self {
            rpc_server,
            api_listener,
            api_router,
        } = self;
        let api_shutdown = shutdown.clone();
        let api_server = async move {
            let graceful_shutdown = api_shutdown.clone();
            let result = axum::serve(api_listener, api_router)
                .with_graceful_shutdown(async move { graceful_shutdown.cancelled().await })
                .await
                .map_err(|e| anyhow!(e));
            if let Err(err) = &result {
                error!("HTTP API failed: {err}, requesting shutdown");
                api_shutdown.cancel();
            }
            info!("HTTP API stopped");

            result
        };

        let (rpc_result, api_result) =
            tokio::join!(rpc_server.serve(shutdown.clone()), api_server);

        rpc_result.and(api_result)
    }
}
