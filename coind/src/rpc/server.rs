use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use axum::http::StatusCode;
use tokio::io::AsyncReadExt;
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, trace, warn};

use crate::StdResult;
use crate::rpc::commands::RpcDispatcher;
use crate::rpc::framing::{
    FramingError, RawHttpRequest, build_json_response, build_text_response, read_http_request,
    write_response,
};
use crate::rpc::listeners::parse_listeners;
use crate::rpc::protocol::{RpcError, RpcResponse};

/// Timeouts and limits of the JSON-RPC server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcServerConfig {
    /// Comma separated `host:port` listen addresses
    pub listen_addresses: String,

    /// Maximum number of connections served at once
    pub max_concurrent_requests: usize,

    /// Deadline to receive a full request
    pub read_timeout: Duration,

    /// Deadline to send the response
    pub write_timeout: Duration,
}

impl RpcServerConfig {
    /// Read deadline of a request
    pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(10);

    /// Write deadline of a response
    pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(20);

    /// RpcServerConfig factory with the default timeouts
    pub fn new<A: Into<String>>(listen_addresses: A, max_concurrent_requests: usize) -> Self {
        Self {
            listen_addresses: listen_addresses.into(),
            max_concurrent_requests,
            read_timeout: Self::DEFAULT_READ_TIMEOUT,
            write_timeout: Self::DEFAULT_WRITE_TIMEOUT,
        }
    }
}

/// JSON-RPC server answering one request per connection.
pub struct RpcServer {
    listeners: Vec<TcpListener>,
    connection_handler: Arc<ConnectionHandler>,
    max_concurrent_requests: usize,
}

impl RpcServer {
    /// Bind every listen address of the configuration.
    ///
    /// Addresses that can't be bound are skipped, binding none of them is an error.
    pub async fn bind(config: RpcServerConfig, dispatcher: RpcDispatcher) -> StdResult<Self> {
        let mut listeners = Vec::new();
        for address in parse_listeners(&config.listen_addresses)? {
            match TcpListener::bind(address).await {
                Ok(listener) => {
                    info!("RPC server listening on {address}");
                    listeners.push(listener);
                }
                Err(err) => warn!("Can't listen on {address}: {err}"),
            }
        }
        if listeners.is_empty() {
            return Err(anyhow!(
                "RPC server: no valid listen address in '{}'",
                config.listen_addresses
            ));
        }

        Ok(Self {
            listeners,
            connection_handler: Arc::new(ConnectionHandler {
                dispatcher,
                read_timeout: config.read_timeout,
                write_timeout: config.write_timeout,
            }),
            max_concurrent_requests: config.max_concurrent_requests.max(1),
        })
    }

    /// Addresses actually bound
    pub fn local_addrs(&self) -> Vec<SocketAddr> {
        self.listeners
            .iter()
            .filter_map(|listener| listener.local_addr().ok())
            .collect()
    }

    /// Serve until `shutdown` is cancelled, then drain the in-flight connections.
    ///
    /// A listener failure cancels `shutdown` so the whole application stops.
    pub async fn serve(self, shutdown: CancellationToken) -> StdResult<()> {
        let tracker = TaskTracker::new();
        let permits = Arc::new(Semaphore::new(self.max_concurrent_requests));
        let mut accept_loops = Vec::new();

        for listener in self.listeners {
            accept_loops.push(tokio::spawn(accept_loop(
                listener,
                self.connection_handler.clone(),
                permits.clone(),
                tracker.clone(),
                shutdown.clone(),
            )));
        }

        let mut result = Ok(());
        for accept_loop in accept_loops {
            match accept_loop.await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => result = Err(err),
                Err(join_error) => result = Err(anyhow!(join_error)),
            }
        }

        trace!("RPC server: draining in-flight connections…");
        tracker.close();
        tracker.wait().await;
        info!("RPC server stopped");

        result
    }
}

async fn accept_loop(
    listener: TcpListener,
    connection_handler: Arc<ConnectionHandler>,
    permits: Arc<Semaphore>,
    tracker: TaskTracker,
    shutdown: CancellationToken,
) -> StdResult<()> {
    loop {
        let permit = tokio::select! {
            _ = shutdown.cancelled() => return Ok(()),
            permit = permits.clone().acquire_owned() => permit?,
        };
        let (stream, peer) = tokio::select! {
            _ = shutdown.cancelled() => return Ok(()),
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(err) => {
                    error!("RPC server: accept failed: {err}, requesting shutdown");
                    shutdown.cancel();
                    return Err(anyhow!(err));
                }
            },
        };

        trace!(%peer, "RPC connection accepted");
        let connection_handler = connection_handler.clone();
        tracker.spawn(async move {
            connection_handler.handle(stream, peer).await;
            drop(permit);
        });
    }
}

struct ConnectionHandler {
    dispatcher: RpcDispatcher,
    read_timeout: Duration,
    write_timeout: Duration,
}

impl ConnectionHandler {
    async fn handle(&self, stream: TcpStream, peer: SocketAddr) {
        let (mut reader, mut writer) = stream.into_split();

        let read_request = read_http_request(&mut reader, &mut writer);
        let request = match timeout(self.read_timeout, read_request).await {
            Ok(Ok(request)) => request,
            Ok(Err(FramingError::ConnectionClosed)) => {
                trace!(%peer, "Peer left before sending a request");
                return;
            }
            Ok(Err(err)) => {
                warn!(%peer, "Rejected RPC request: {err}");
                let response =
                    build_text_response("HTTP/1.1", StatusCode::BAD_REQUEST, &format!("400 {err}"));
                self.write(&mut writer, peer, &response).await;
                return;
            }
            Err(_) => {
                warn!(%peer, "RPC request not received within {:?}", self.read_timeout);
                return;
            }
        };

        if request.method != "POST" {
            warn!(%peer, method = %request.method, "Rejected RPC request: method not allowed");
            let response = build_text_response(
                request.response_version(),
                StatusCode::METHOD_NOT_ALLOWED,
                "405 method not allowed",
            );
            self.write(&mut writer, peer, &response).await;
            return;
        }

        let peer_closed = CancellationToken::new();
        let watcher = tokio::spawn(watch_peer_close(reader, peer_closed.clone()));

        let response = self.dispatcher.dispatch(&request.body, &peer_closed).await;
        watcher.abort();

        let Some(response) = response else {
            return;
        };
        if peer_closed.is_cancelled() {
            debug!(%peer, "Peer left, response dropped");
            return;
        }

        let response = frame_rpc_response(&request, &response);
        self.write(&mut writer, peer, &response).await;
    }

    async fn write(
        &self,
        writer: &mut tokio::net::tcp::OwnedWriteHalf,
        peer: SocketAddr,
        response: &[u8],
    ) {
        match timeout(self.write_timeout, write_response(writer, response)).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => warn!(%peer, "Failed to write RPC response: {err}"),
            Err(_) => warn!(%peer, "RPC response not sent within {:?}", self.write_timeout),
        }
    }
}

fn frame_rpc_response(request: &RawHttpRequest, response: &RpcResponse) -> Vec<u8> {
    let body = match serde_json::to_vec(response) {
        Ok(body) => body,
        Err(err) => {
            error!("Failed to serialize RPC response: {err}");
            let fallback = RpcResponse {
                outcome: Err(RpcError::internal(err.to_string())),
                ..response.clone()
            };
            serde_json::to_vec(&fallback).unwrap_or_default()
        }
    };

    build_json_response(request.response_version(), &body)
}

/// Fire `peer_closed` when a read on the connection returns no byte or fails.
///
/// A half closed write side can't be told apart from a departed peer: such clients get no
/// answer.
async fn watch_peer_close(mut reader: OwnedReadHalf, peer_closed: CancellationToken) {
    let mut buffer = [0u8; 1];
    match reader.read(&mut buffer).await {
        Ok(0) | Err(_) => peer_closed.cancel(),
        Ok(_) => {}
    }
}
