//! Handle for communicating with the shell actor.
//!
//! The `ShellActorHandle` is a cheap, cloneable interface for sending
//! requests to the actor and awaiting their outcome.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

use super::messages::{QueryResult, ShellMessage, ShellQuery};
use crate::modules::shell::error::ShellResult;
use crate::modules::shell::policy::{ClientInfo, RuleId};
use crate::modules::shell::shell::ShellSnapshot;
use crate::modules::shell::state::{ClientId, SurfaceId};

/// Error types for actor communication.
#[derive(Debug, thiserror::Error)]
pub enum ActorError {
    /// Failed to send message to actor.
    #[error("Failed to send message to actor: channel closed")]
    SendFailed,

    /// Failed to receive response from actor.
    #[error("Failed to receive response from actor: channel closed")]
    ReceiveFailed,

    /// Query timed out.
    #[error("Query timed out after {0:?}")]
    Timeout(Duration),
}

/// Handle for communicating with the shell actor.
#[derive(Clone, Debug)]
pub struct ShellActorHandle {
    sender: mpsc::Sender<ShellMessage>,
}

impl ShellActorHandle {
    /// Create a new handle with the given sender.
    pub(crate) const fn new(sender: mpsc::Sender<ShellMessage>) -> Self { Self { sender } }

    // ========================================================================
    // Fire-and-forget sending
    // ========================================================================

    /// Send a message to the actor without waiting for delivery.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the channel is closed or full.
    pub fn send(&self, msg: ShellMessage) -> Result<(), ActorError> {
        self.sender.try_send(msg).map_err(|_| ActorError::SendFailed)
    }

    /// Send a message to the actor, waiting for buffer space.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the channel is closed.
    pub async fn send_async(&self, msg: ShellMessage) -> Result<(), ActorError> {
        self.sender.send(msg).await.map_err(|_| ActorError::SendFailed)
    }

    /// Ask the actor to stop after the messages already queued.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the actor already stopped.
    pub async fn shutdown(&self) -> Result<(), ActorError> {
        self.send_async(ShellMessage::Shutdown).await
    }

    // ========================================================================
    // Requests with a reply
    // ========================================================================

    async fn request<T>(
        &self,
        build: impl FnOnce(Option<oneshot::Sender<ShellResult<T>>>) -> ShellMessage,
    ) -> Result<ShellResult<T>, ActorError> {
        let (tx, rx) = oneshot::channel();
        self.send_async(build(Some(tx))).await?;
        rx.await.map_err(|_| ActorError::ReceiveFailed)
    }

    /// Register a new surface and return its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the actor fails.
    pub async fn surface_added(
        &self,
        client: ClientId,
        app_id: Option<String>,
    ) -> Result<ShellResult<SurfaceId>, ActorError> {
        self.request(|respond_to| ShellMessage::SurfaceAdded { client, app_id, respond_to })
            .await
    }

    /// Bind the shell interface.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the actor fails.
    pub async fn bind_shell(&self, client: ClientInfo) -> Result<ShellResult<()>, ActorError> {
        self.request(|respond_to| ShellMessage::BindShell { client, respond_to }).await
    }

    /// Bind the desktop interface.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the actor fails.
    pub async fn bind_desktop(&self, client: ClientInfo) -> Result<ShellResult<()>, ActorError> {
        self.request(|respond_to| ShellMessage::BindDesktop { client, respond_to }).await
    }

    /// Register a policy rule.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the actor fails.
    pub async fn policy_add(
        &self,
        app_id: &str,
        state: u32,
        event: u32,
        timeout_ms: u32,
        output: &str,
    ) -> Result<ShellResult<RuleId>, ActorError> {
        let app_id = app_id.to_string();
        let output = output.to_string();
        self.request(|respond_to| ShellMessage::PolicyAdd {
            app_id,
            state,
            event,
            timeout_ms,
            output,
            respond_to,
        })
        .await
    }

    /// Switch the policy state. Returns the number of rules applied at once.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the actor fails.
    pub async fn state_change(&self, state: u32) -> Result<ShellResult<usize>, ActorError> {
        self.request(|respond_to| ShellMessage::StateChange { state, respond_to }).await
    }

    // ========================================================================
    // Query methods
    // ========================================================================

    /// Execute a query and wait for the result.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the channel is closed, or
    /// [`ActorError::ReceiveFailed`] if the response channel is closed.
    pub async fn query(&self, query: ShellQuery) -> Result<QueryResult, ActorError> {
        let (tx, rx) = oneshot::channel();

        self.sender
            .send(ShellMessage::Query { query, respond_to: tx })
            .await
            .map_err(|_| ActorError::SendFailed)?;

        rx.await.map_err(|_| ActorError::ReceiveFailed)
    }

    /// Execute a query with a timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::Timeout`] if the query doesn't complete in time,
    /// or any error from [`Self::query`].
    pub async fn query_timeout(
        &self,
        query: ShellQuery,
        timeout: Duration,
    ) -> Result<QueryResult, ActorError> {
        tokio::time::timeout(timeout, self.query(query))
            .await
            .map_err(|_| ActorError::Timeout(timeout))?
    }

    /// Get a snapshot of the whole shell.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the actor fails.
    pub async fn snapshot(&self) -> Result<ShellSnapshot, ActorError> {
        self.query(ShellQuery::Snapshot)
            .await?
            .into_snapshot()
            .ok_or(ActorError::ReceiveFailed)
    }

    /// Whether the shell client signalled `ready`.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the actor fails.
    pub async fn is_ready(&self) -> Result<bool, ActorError> {
        self.query(ShellQuery::Ready).await?.into_ready().ok_or(ActorError::ReceiveFailed)
    }
}
