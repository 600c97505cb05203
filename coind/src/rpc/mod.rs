//! JSON-RPC front end.
//!
//! Connections are read and answered by hand: one request per connection, the response being
//! framed manually before the connection is closed.

mod commands;
mod framing;
mod listeners;
mod protocol;
mod server;

pub use commands::{RpcCommand, RpcDispatcher};
pub use framing::{FramingError, MAX_REQUEST_BYTES, RawHttpRequest, read_http_request};
pub use listeners::{ListenerAddressError, parse_listeners};
pub use protocol::*;
pub use server::{RpcServer, RpcServerConfig};
