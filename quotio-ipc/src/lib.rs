//! Newline-delimited JSON-RPC 2.0 over a Unix domain socket: the wire
//! protocol daemon and CLI processes speak to each other.

mod error;
mod framing;
mod protocol;
mod registry;
mod server;

pub use error::IpcError;
pub use framing::{MessageReader, MessageWriter};
pub use protocol::{
    CODE_AGENT_NOT_FOUND, CODE_AUTH_FAILED, CODE_CONFIG_ERROR, CODE_DAEMON_ALREADY_RUNNING,
    CODE_DAEMON_NOT_RUNNING, CODE_INTERNAL_ERROR, CODE_INVALID_PARAMS, CODE_INVALID_REQUEST,
    CODE_METHOD_NOT_FOUND, CODE_PARSE_ERROR, CODE_PROVIDER_NOT_FOUND, CODE_PROXY_NOT_RUNNING,
    JsonRpcRequest, JsonRpcResponse, RpcError,
};
pub use registry::{MethodHandler, MethodRegistry};
pub use server::{IpcServer, SHUTDOWN_DRAIN};
