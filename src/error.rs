use thiserror::Error;

/// Failures surfaced to callers of `SessionController::start`.
///
/// Everything below this surface is contained: malformed control messages
/// are dropped by the router and tool failures become error-shaped result
/// payloads, so an active session is never aborted by channel-level
/// anomalies.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The credential fetcher could not supply an ephemeral credential
    #[error("credential error: {0}")]
    Credential(String),

    /// The offer/answer exchange with the remote service failed
    #[error("negotiation error: {0}")]
    Negotiation(String),
}

/// An inbound control message that could not be parsed.
///
/// Recovered locally: the router logs the error and drops the message.
#[derive(Debug, Error)]
#[error("malformed control event: {0}")]
pub struct MalformedEventError(#[from] serde_json::Error);

/// Function-call failures contained within the dispatcher.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The call names a tool with no registered handler
    #[error("unknown function")]
    UnknownTool,

    /// The handler ran and failed
    #[error("tool execution failed: {0}")]
    ToolExecution(String),
}
