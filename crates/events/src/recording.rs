//! In-memory sinks for tests and headless hosts.
//!
//! Each sink captures every call for later inspection and can be told to
//! fail, to exercise fault isolation in the caller.

use crate::sink::{BroadcastSink, LifecycleSink, NotificationHandle, NotificationSink, SinkError};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A captured notification call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationCall {
    EnsureChannel,
    Render(String),
    Update(String),
}

/// Notification sink that records calls.
#[derive(Default)]
pub struct RecordingNotificationSink {
    calls: Mutex<Vec<NotificationCall>>,
    next_handle: AtomicU32,
    failing: AtomicBool,
}

impl RecordingNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<NotificationCall> {
        lock(&self.calls).clone()
    }

    /// Messages passed to `update`, in order.
    pub fn updates(&self) -> Vec<String> {
        lock(&self.calls)
            .iter()
            .filter_map(|call| match call {
                NotificationCall::Update(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: NotificationCall) -> Result<(), SinkError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(SinkError::Notification("sink set to fail".to_string()));
        }
        lock(&self.calls).push(call);
        Ok(())
    }
}

impl NotificationSink for RecordingNotificationSink {
    fn ensure_channel(&self) -> Result<(), SinkError> {
        self.record(NotificationCall::EnsureChannel)
    }

    fn render(&self, message: &str) -> Result<NotificationHandle, SinkError> {
        self.record(NotificationCall::Render(message.to_string()))?;
        Ok(NotificationHandle(
            self.next_handle.fetch_add(1, Ordering::SeqCst) + 1,
        ))
    }

    fn update(&self, message: &str) -> Result<(), SinkError> {
        self.record(NotificationCall::Update(message.to_string()))
    }
}

/// Broadcast sink that records every published flag.
#[derive(Default)]
pub struct RecordingBroadcastSink {
    published: Mutex<Vec<bool>>,
    failing: AtomicBool,
}

impl RecordingBroadcastSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn published(&self) -> Vec<bool> {
        lock(&self.published).clone()
    }
}

impl BroadcastSink for RecordingBroadcastSink {
    fn publish(&self, is_parked: bool) -> Result<(), SinkError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(SinkError::Broadcast("sink set to fail".to_string()));
        }
        lock(&self.published).push(is_parked);
        Ok(())
    }
}

/// A captured lifecycle call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleCall {
    EnterForeground(NotificationHandle),
    ExitForeground,
}

/// Lifecycle sink that records calls.
#[derive(Default)]
pub struct RecordingLifecycleSink {
    calls: Mutex<Vec<LifecycleCall>>,
    failing: AtomicBool,
}

impl RecordingLifecycleSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<LifecycleCall> {
        lock(&self.calls).clone()
    }

    /// Whether the last recorded call left the process in the foreground.
    pub fn is_foreground(&self) -> bool {
        matches!(
            lock(&self.calls).last(),
            Some(LifecycleCall::EnterForeground(_))
        )
    }

    pub fn exit_count(&self) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|call| matches!(call, LifecycleCall::ExitForeground))
            .count()
    }

    fn record(&self, call: LifecycleCall) -> Result<(), SinkError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(SinkError::Lifecycle("sink set to fail".to_string()));
        }
        lock(&self.calls).push(call);
        Ok(())
    }
}

impl LifecycleSink for RecordingLifecycleSink {
    fn enter_foreground(&self, handle: NotificationHandle) -> Result<(), SinkError> {
        self.record(LifecycleCall::EnterForeground(handle))
    }

    fn exit_foreground(&self) -> Result<(), SinkError> {
        self.record(LifecycleCall::ExitForeground)
    }
}
