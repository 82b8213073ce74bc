//! Registry of in-flight tool calls, keyed by caller-assigned call id.

use std::collections::HashMap;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// A live call: its cancellation token and, once spawned, the task handle.
struct CallRecord {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

/// Outcome of a registration attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// The call was registered.
    Registered,
    /// The id already names a live call; the existing record is untouched.
    DuplicateId,
    /// The configured in-flight bound was reached.
    AtCapacity,
}

/// The only shared mutable state in the agent.
///
/// One lock covers every operation, so register/cancel/remove for a given id
/// are totally ordered with respect to concurrent invoke and cancel
/// processing, however many calls are in flight across other ids.
#[derive(Default)]
pub struct CallRegistry {
    calls: Mutex<HashMap<String, CallRecord>>,
}

impl CallRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new call under `call_id`, enforcing `max_inflight` when
    /// given. A duplicate id never overwrites the existing record; that is a
    /// caller bug, reported to the caller by the dispatcher.
    pub async fn register(
        &self,
        call_id: &str,
        cancel: CancellationToken,
        max_inflight: Option<usize>,
    ) -> RegisterOutcome {
        let mut calls = self.calls.lock().await;
        if calls.contains_key(call_id) {
            return RegisterOutcome::DuplicateId;
        }
        if let Some(max) = max_inflight {
            if calls.len() >= max {
                return RegisterOutcome::AtCapacity;
            }
        }
        calls.insert(
            call_id.to_string(),
            CallRecord {
                cancel,
                handle: None,
            },
        );
        RegisterOutcome::Registered
    }

    /// Attach the spawned task handle to a registered call.
    ///
    /// A no-op when the call already finished and removed itself; the handle
    /// is dropped and the finished task detaches.
    pub async fn attach(&self, call_id: &str, handle: JoinHandle<()>) {
        let mut calls = self.calls.lock().await;
        if let Some(record) = calls.get_mut(call_id) {
            record.handle = Some(handle);
        }
    }

    /// Request cancellation of a live call.
    ///
    /// Returns false when the id is not registered (already finished, never
    /// existed, or malformed); the caller must then emit the terminal
    /// `CANCELLED` itself so the remote side is never left waiting.
    pub async fn cancel(&self, call_id: &str, reason: Option<&str>) -> bool {
        let calls = self.calls.lock().await;
        match calls.get(call_id) {
            Some(record) => {
                tracing::debug!(
                    call_id,
                    reason = reason.unwrap_or("none"),
                    "requesting cancellation"
                );
                record.cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Remove a call record. Idempotent; called exactly once by the owning
    /// task's completion path, whatever the outcome.
    pub async fn remove(&self, call_id: &str) {
        self.calls.lock().await.remove(call_id);
    }

    /// Whether `call_id` names a live call.
    pub async fn contains(&self, call_id: &str) -> bool {
        self.calls.lock().await.contains_key(call_id)
    }

    /// Number of live calls.
    pub async fn len(&self) -> usize {
        self.calls.lock().await.len()
    }

    /// Whether no calls are in flight.
    pub async fn is_empty(&self) -> bool {
        self.calls.lock().await.is_empty()
    }

    /// Request cancellation of every live call.
    pub async fn cancel_all(&self) {
        let calls = self.calls.lock().await;
        for (call_id, record) in calls.iter() {
            tracing::debug!(call_id, "requesting cancellation (shutdown)");
            record.cancel.cancel();
        }
    }

    /// Await the completion path of every tracked task.
    ///
    /// Tasks remove their own records as they finish; this only drains the
    /// handles so shutdown can wait for terminal notifications to go out.
    pub async fn join_all(&self) {
        let handles: Vec<JoinHandle<()>> = {
            let mut calls = self.calls.lock().await;
            calls
                .values_mut()
                .filter_map(|record| record.handle.take())
                .collect()
        };
        for handle in handles {
            let _ = handle.await;
        }
    }
}
