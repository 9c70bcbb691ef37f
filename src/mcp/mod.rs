//! Model Context Protocol (MCP) server implementation.
//!
//! This module exposes the widget catalog as MCP tools and resources. Two
//! transports share one [`Dispatcher`]: stdio (JSON-RPC 2.0, one message per
//! line, with the MCP lifecycle) and stateless HTTP.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          MCP Server                          │
//! │                                                              │
//! │   ┌─────────────┐                                            │
//! │   │  Transport  │──┐                                         │
//! │   │   (stdio)   │  │   ┌─────────────┐    ┌─────────────┐    │
//! │   └─────────────┘  ├──▶│ Dispatcher  │───▶│   Catalog   │    │
//! │   ┌─────────────┐  │   │  (routing)  │    │  (widgets)  │    │
//! │   │  Transport  │──┘   └─────────────┘    └─────────────┘    │
//! │   │   (HTTP)    │                                            │
//! │   └─────────────┘                                            │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Protocol Version
//!
//! This implementation targets MCP protocol version 2025-06-18.

pub mod dispatcher;
pub mod http;
pub mod protocol;
pub mod server;
pub mod shutdown;
pub mod transport;
pub mod types;

pub use dispatcher::Dispatcher;
pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, MCP_PROTOCOL_VERSION};
pub use server::McpServer;
pub use transport::StdioTransport;
