//! MCP server over stdio.
//!
//! This module implements the MCP server lifecycle:
//!
//! 1. **Initialisation**: `initialize` request, then the client's
//!    `notifications/initialized`
//! 2. **Operation**: every other request is spawned onto the runtime and
//!    answered when it finishes, so a slow tool never blocks the loop
//! 3. **Shutdown**: EOF drains outstanding requests; a signal abandons them
//!
//! The lifecycle rules live in [`Session`], which has no I/O and is tested
//! directly. [`McpServer`] wires a session to the stdio transport.

use std::collections::HashMap;
use std::future::Future;
use std::io;
use std::sync::Arc;

use serde_json::json;
use tokio::io::{AsyncRead, AsyncWrite, Stdin, Stdout};
use tokio::task::{self, JoinError, JoinSet};

use crate::mcp::dispatcher::Dispatcher;
use crate::mcp::protocol::{
    parse_message, IncomingMessage, JsonRpcError, JsonRpcNotification, JsonRpcRequest,
    JsonRpcResponse, Reply, RequestId, MCP_PROTOCOL_VERSION,
};
use crate::mcp::shutdown::Shutdown;
use crate::mcp::transport::StdioTransport;

/// Server state in the MCP lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Waiting for initialize request.
    AwaitingInit,
    /// Initialize received, waiting for initialized notification.
    Initialising,
    /// Ready for normal operation.
    Running,
    /// Shutdown in progress.
    ShuttingDown,
}

/// What the read loop should do with an incoming message.
#[derive(Debug)]
pub enum Admission {
    /// Answer immediately.
    Reply(Reply),
    /// Hand the request to the dispatcher on its own task.
    Dispatch(JsonRpcRequest),
    /// Nothing to send.
    Ignore,
}

/// Lifecycle state for one stdio connection.
#[derive(Debug)]
pub struct Session {
    state: ServerState,
    /// Negotiated protocol version (set after initialisation).
    protocol_version: Option<String>,
    dispatcher: Arc<Dispatcher>,
}

impl Session {
    /// Creates a session awaiting `initialize`.
    #[must_use]
    pub const fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            state: ServerState::AwaitingInit,
            protocol_version: None,
            dispatcher,
        }
    }

    /// Returns the current server state.
    #[must_use]
    pub const fn state(&self) -> ServerState {
        self.state
    }

    /// The protocol version agreed during initialisation.
    #[must_use]
    pub fn protocol_version(&self) -> Option<&str> {
        self.protocol_version.as_deref()
    }

    /// The shared dispatcher.
    #[must_use]
    pub const fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Applies lifecycle rules to a message.
    pub async fn admit(&mut self, msg: IncomingMessage) -> Admission {
        match msg {
            IncomingMessage::Request(req) => self.admit_request(req).await,
            IncomingMessage::Notification(ref notif) => {
                self.handle_notification(notif);
                Admission::Ignore
            }
        }
    }

    async fn admit_request(&mut self, req: JsonRpcRequest) -> Admission {
        match req.method.as_str() {
            "initialize" => Admission::Reply(self.handle_initialize(&req).await),
            "ping" => Admission::Reply(Ok(JsonRpcResponse::success(req.id, json!({})))),
            _ => match self.require_running(&req.id) {
                Ok(()) => Admission::Dispatch(req),
                Err(e) => Admission::Reply(Err(e)),
            },
        }
    }

    /// Handles an incoming notification.
    fn handle_notification(&mut self, notif: &JsonRpcNotification) {
        match notif.method.as_str() {
            "notifications/initialized" if self.state == ServerState::Initialising => {
                tracing::info!("Client initialised");
                self.state = ServerState::Running;
            }
            method => tracing::debug!(method = %method, "Ignoring notification"),
        }
    }

    /// Handles the initialize request.
    async fn handle_initialize(&mut self, req: &JsonRpcRequest) -> Reply {
        if self.state != ServerState::AwaitingInit {
            return Err(JsonRpcError::invalid_request_with(
                req.id.clone(),
                "Server already initialised",
            ));
        }

        let response = self.dispatcher.handle_request(req).await?;

        self.protocol_version = Some(MCP_PROTOCOL_VERSION.to_string());
        self.state = ServerState::Initialising;

        Ok(response)
    }

    /// Ensures the server is in the Running state.
    fn require_running(&self, id: &RequestId) -> Result<(), JsonRpcError> {
        if self.state != ServerState::Running {
            return Err(JsonRpcError::invalid_request_with(
                id.clone(),
                "Server not initialised",
            ));
        }
        Ok(())
    }
}

/// The MCP server on stdin/stdout.
///
/// Generic over the transport's ends so tests can run the loop over pipes.
pub struct McpServer<R = Stdin, W = Stdout> {
    session: Session,
    /// The transport layer.
    transport: StdioTransport<R, W>,
    /// Requests being executed.
    in_flight: JoinSet<Reply>,
    /// Request id of each in-flight task, so a task that dies still gets an
    /// answer.
    pending: HashMap<task::Id, RequestId>,
}

impl McpServer {
    /// Creates a server on stdin/stdout answering from `dispatcher`.
    #[must_use]
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self::with_transport(dispatcher, StdioTransport::new())
    }

    /// Runs the MCP server main loop with graceful shutdown handling.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails or the signal handlers cannot
    /// be installed.
    pub async fn run(&mut self) -> io::Result<()> {
        let mut shutdown = Shutdown::install()?;
        self.run_until(shutdown.recv()).await
    }
}

impl<R: AsyncRead + Unpin, W: AsyncWrite + Unpin> McpServer<R, W> {
    /// Creates a server over an existing transport.
    #[must_use]
    pub fn with_transport(dispatcher: Arc<Dispatcher>, transport: StdioTransport<R, W>) -> Self {
        Self {
            session: Session::new(dispatcher),
            transport,
            in_flight: JoinSet::new(),
            pending: HashMap::new(),
        }
    }

    /// Returns the current server state.
    #[must_use]
    pub const fn state(&self) -> ServerState {
        self.session.state()
    }

    /// Serves until the input closes or `shutdown` resolves.
    ///
    /// On EOF every outstanding request is finished and answered. When
    /// `shutdown` resolves first, outstanding requests are abandoned.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails.
    pub async fn run_until<F>(&mut self, shutdown: F) -> io::Result<()>
    where
        F: Future<Output = &'static str>,
    {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                signal = &mut shutdown => {
                    tracing::info!(
                        signal,
                        abandoned = self.in_flight.len(),
                        "Received signal, initiating graceful shutdown"
                    );
                    self.session.state = ServerState::ShuttingDown;
                    self.in_flight.shutdown().await;
                    self.pending.clear();
                    return Ok(());
                }

                Some(joined) = self.in_flight.join_next_with_id() => {
                    self.deliver(joined).await?;
                }

                line_result = self.transport.read_line() => {
                    let Some(line) = line_result? else {
                        break;
                    };
                    if !line.trim().is_empty() {
                        self.handle_line(&line).await?;
                    }
                }
            }
        }

        tracing::info!(
            pending = self.in_flight.len(),
            "Input closed, finishing outstanding requests"
        );
        self.session.state = ServerState::ShuttingDown;
        while let Some(joined) = self.in_flight.join_next_with_id().await {
            self.deliver(joined).await?;
        }
        Ok(())
    }

    /// Handles a single line of input.
    async fn handle_line(&mut self, line: &str) -> io::Result<()> {
        let msg = match parse_message(line) {
            Ok(msg) => msg,
            Err(error) => return self.transport.write_error(&error).await,
        };

        match self.session.admit(msg).await {
            Admission::Reply(reply) => self.transport.write_reply(&reply).await,
            Admission::Dispatch(req) => {
                let dispatcher = Arc::clone(self.session.dispatcher());
                let id = req.id.clone();
                let handle = self
                    .in_flight
                    .spawn(async move { dispatcher.handle_request(&req).await });
                self.pending.insert(handle.id(), id);
                Ok(())
            }
            Admission::Ignore => Ok(()),
        }
    }

    /// Writes the reply of a finished request.
    ///
    /// A task that died without a reply is answered with an internal error.
    async fn deliver(&mut self, joined: Result<(task::Id, Reply), JoinError>) -> io::Result<()> {
        match joined {
            Ok((task_id, reply)) => {
                self.pending.remove(&task_id);
                self.transport.write_reply(&reply).await
            }
            Err(e) => {
                tracing::error!(error = %e, "Request task did not complete");
                match self.pending.remove(&e.id()) {
                    Some(id) => {
                        let error =
                            JsonRpcError::internal_error(id, "Internal error: request failed");
                        self.transport.write_error(&error).await
                    }
                    None => Ok(()),
                }
            }
        }
    }
}
