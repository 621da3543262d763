//! Output surfaces driven on every parking state change.
//!
//! These traits decouple the controller from the platform's notification
//! manager, broadcast bus and foreground-service machinery, so the core can
//! be exercised without any of them.

use std::sync::Arc;
use thiserror::Error;

/// Errors raised by an output surface.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SinkError {
    #[error("notification failed: {0}")]
    Notification(String),

    #[error("broadcast failed: {0}")]
    Broadcast(String),

    #[error("lifecycle registration failed: {0}")]
    Lifecycle(String),
}

/// Opaque reference to a rendered notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NotificationHandle(pub u32);

/// Renders the persistent status notification.
///
/// Calls are made from the controller's serialized context and must return
/// quickly; slow work belongs behind the implementation.
pub trait NotificationSink: Send + Sync {
    /// Create the notification channel if the platform needs one.
    fn ensure_channel(&self) -> Result<(), SinkError>;

    /// Build a notification showing `message`.
    fn render(&self, message: &str) -> Result<NotificationHandle, SinkError>;

    /// Replace the text of the shown notification.
    fn update(&self, message: &str) -> Result<(), SinkError>;
}

/// Announces whether the vehicle is parked to other components.
pub trait BroadcastSink: Send + Sync {
    fn publish(&self, is_parked: bool) -> Result<(), SinkError>;
}

/// Keeps the host process alive while monitoring.
pub trait LifecycleSink: Send + Sync {
    /// Register as a foreground/long-running worker showing `handle`.
    fn enter_foreground(&self, handle: NotificationHandle) -> Result<(), SinkError>;

    /// Release the registration.
    fn exit_foreground(&self) -> Result<(), SinkError>;
}

pub type NotificationSinkRef = Arc<dyn NotificationSink>;
pub type BroadcastSinkRef = Arc<dyn BroadcastSink>;
pub type LifecycleSinkRef = Arc<dyn LifecycleSink>;
