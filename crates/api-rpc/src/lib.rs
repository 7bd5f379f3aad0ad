//! JSON-RPC API Layer
//!
//! Implements the JSON-RPC 2.0 server for the Playdeck run orchestrator.

pub mod caller;
pub mod error;
pub mod handler;
pub mod server;
pub mod types;

pub use caller::CallerAddress;
pub use handler::RpcHandler;
pub use server::{RpcServer, RpcServerConfig};
