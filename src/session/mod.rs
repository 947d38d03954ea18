//! Voice session lifecycle
//!
//! This module provides the `SessionController` state machine that composes
//! the credential fetcher, transport session, control channel router and
//! function call dispatcher:
//! - `start()` runs Idle → AwaitingCredential → Negotiating → Active
//! - `stop()` is an idempotent teardown reaching Closed from any state
//! - the transcript is observable at any time, including after Closed

mod config;
mod controller;

pub use config::SessionConfig;
pub use controller::SessionController;

use serde::Serialize;

/// Lifecycle states of a voice session.
///
/// Transitions are monotonic except for `stop()`, which is legal from any
/// state and always reaches `Closed`. `Closed` and `Failed` are terminal for
/// the session itself, but a fresh `start()` may begin a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    AwaitingCredential,
    Negotiating,
    Active,
    Closed,
    Failed,
}

impl SessionState {
    /// States from which `start()` may begin a new session
    pub fn can_start(self) -> bool {
        matches!(self, Self::Idle | Self::Closed | Self::Failed)
    }
}
