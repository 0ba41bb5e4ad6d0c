// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
use crate::util::Address;

/// Event severity, matching the teacher's `monitoring` convention of
/// tagging every event with a level independent of its variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Debug,
    Info,
    Warn,
}

/// Structured runtime events a [`super::Monitor`] records.
///
/// Every variant carries its own `at: DateTime<Utc>` timestamp, following
/// the teacher's convention of stamping events at the point of emission
/// rather than relying on log-line ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FrameworkEvent {
    ActorRegistered {
        address: Address,
        name: Option<String>,
        at: DateTime<Utc>,
    },
    ActorGarbageCollected {
        address: Address,
        at: DateTime<Utc>,
    },
    MessageEnqueued {
        from: Address,
        to: Address,
        at: DateTime<Utc>,
    },
    MessageDispatched {
        to: Address,
        at: DateTime<Utc>,
    },
    MessageDropped {
        to: Address,
        reason: DropReason,
        at: DateTime<Utc>,
    },
    WorkerSpawned {
        worker_id: usize,
        at: DateTime<Utc>,
    },
    WorkerTerminated {
        worker_id: usize,
        at: DateTime<Utc>,
    },
    ThreadTargetChanged {
        target: u32,
        at: DateTime<Utc>,
    },
    FallbackInvoked {
        from: Address,
        at: DateTime<Utc>,
    },
}

/// Why a message was dropped rather than dispatched (spec.md §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropReason {
    AllocationExhausted,
    UnknownDestination,
    UnhandledMessageType,
}

impl FrameworkEvent {
    pub fn severity(&self) -> Severity {
        match self {
            FrameworkEvent::MessageDropped { .. } => Severity::Warn,
            FrameworkEvent::MessageEnqueued { .. } | FrameworkEvent::MessageDispatched { .. } => {
                Severity::Debug
            }
            _ => Severity::Info,
        }
    }

    pub fn actor_registered(address: Address, name: Option<String>) -> Self {
        FrameworkEvent::ActorRegistered {
            address,
            name,
            at: Utc::now(),
        }
    }

    pub fn actor_garbage_collected(address: Address) -> Self {
        FrameworkEvent::ActorGarbageCollected {
            address,
            at: Utc::now(),
        }
    }

    pub fn message_enqueued(from: Address, to: Address) -> Self {
        FrameworkEvent::MessageEnqueued {
            from,
            to,
            at: Utc::now(),
        }
    }

    pub fn message_dispatched(to: Address) -> Self {
        FrameworkEvent::MessageDispatched { to, at: Utc::now() }
    }

    pub fn message_dropped(to: Address, reason: DropReason) -> Self {
        FrameworkEvent::MessageDropped {
            to,
            reason,
            at: Utc::now(),
        }
    }

    pub fn worker_spawned(worker_id: usize) -> Self {
        FrameworkEvent::WorkerSpawned {
            worker_id,
            at: Utc::now(),
        }
    }

    pub fn worker_terminated(worker_id: usize) -> Self {
        FrameworkEvent::WorkerTerminated {
            worker_id,
            at: Utc::now(),
        }
    }

    pub fn thread_target_changed(target: u32) -> Self {
        FrameworkEvent::ThreadTargetChanged {
            target,
            at: Utc::now(),
        }
    }

    pub fn fallback_invoked(from: Address) -> Self {
        FrameworkEvent::FallbackInvoked { from, at: Utc::now() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_dropped_is_warn_severity() {
        let event = FrameworkEvent::message_dropped(Address::NULL, DropReason::UnknownDestination);
        assert_eq!(event.severity(), Severity::Warn);
    }

    #[test]
    fn worker_spawned_is_info_severity() {
        let event = FrameworkEvent::worker_spawned(0);
        assert_eq!(event.severity(), Severity::Info);
    }

    #[test]
    fn message_dropped_roundtrips_through_json() {
        let event = FrameworkEvent::message_dropped(Address::NULL, DropReason::AllocationExhausted);
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("MessageDropped"));
        assert!(json.contains("AllocationExhausted"));

        let deserialized: FrameworkEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.severity(), event.severity());
    }
}
