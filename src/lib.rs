//! pizzaz-mcp: MCP server for widget-backed tools
//!
//! Each tool is paired with a compiled HTML widget. Listing a tool advertises
//! the widget's template URI, reading that URI returns the markup, and a
//! successful call embeds the markup next to the structured result so the
//! host can render it immediately.
//!
//! # Architecture
//!
//! - **Widgets**: a [`widget::Widget`] declares its identifier, input schema
//!   and presentation hints, and executes against validated arguments
//! - **Catalog**: binds every widget to its compiled artifact at startup and
//!   is immutable afterwards
//! - **Dispatcher**: answers MCP requests from the catalog; transports only
//!   move bytes
//!
//! # Modules
//!
//! - [`assets`] — Compiled widget markup discovery
//! - [`catalog`] — Widget-to-artifact bindings
//! - [`config`] — Configuration loading and validation
//! - [`error`] — Error types
//! - [`mcp`] — MCP protocol implementation and transports
//! - [`pizzeria`] — Upstream place lookup
//! - [`tools`] — The shipped widgets
//! - [`widget`] — Widget trait, schemas and `_meta` composition

pub mod assets;
pub mod catalog;
pub mod config;
pub mod error;
pub mod mcp;
pub mod pizzeria;
pub mod tools;
pub mod widget;
